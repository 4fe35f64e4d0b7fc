//! Cursor-driven page writer: owns the Y position, decides page breaks and
//! repeats running headers and table column headers after each break.

use crate::export::surface::{Surface, TextStyle, text_width};
use crate::export::template::{Align, ColumnFlag, ColumnSpec, RowField, TemplateMeta};
use crate::utils::formatting::truncate_chars;

const CELL_PADDING: f32 = 4.0;
const FOOTER_SIZE: f32 = 8.0;
const BORDER: [f32; 3] = [0.65, 0.65, 0.65];
const HEADER_FILL: [f32; 3] = [0.85, 0.87, 0.90];
const ZEBRA_FILL: [f32; 3] = [0.96, 0.96, 0.96];

/// Page size and the areas the writer must keep free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    pub reserved_footer: f32,
}

impl PageGeometry {
    pub fn from_meta(meta: &TemplateMeta) -> Self {
        let (width, height) = meta.page_size.dimensions();
        Self {
            width,
            height,
            top: meta.margins.top,
            bottom: meta.margins.bottom,
            left: meta.margins.left,
            right: meta.margins.right,
            reserved_footer: meta.reserved_footer,
        }
    }

    /// Lowest Y the body may reach.
    pub fn body_limit(&self) -> f32 {
        self.height - self.bottom - self.reserved_footer
    }

    pub fn usable_width(&self) -> f32 {
        self.width - self.left - self.right
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub label: String,
    pub field: RowField,
    pub x: f32,
    pub width: f32,
    pub align: Align,
}

/// Column offsets and widths, computed once per group.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub columns: Vec<ColumnLayout>,
}

impl TableLayout {
    /// Split the space between `left` and `right` proportionally to the
    /// column weights. Gated columns whose flag is off are left out entirely.
    pub fn compute(specs: &[ColumnSpec], include_passwords: bool, left: f32, right: f32) -> Self {
        let active: Vec<&ColumnSpec> = specs
            .iter()
            .filter(|c| match c.requires {
                Some(ColumnFlag::IncludePasswords) => include_passwords,
                None => true,
            })
            .collect();

        let total_weight: f32 = active.iter().map(|c| c.weight).sum();
        let usable = (right - left).max(0.0);

        let mut x = left;
        let columns = active
            .into_iter()
            .map(|spec| {
                let width = if total_weight > 0.0 {
                    usable * spec.weight / total_weight
                } else {
                    0.0
                };
                let col = ColumnLayout {
                    label: spec.label.clone(),
                    field: spec.field,
                    x,
                    width,
                    align: spec.align.unwrap_or_default(),
                };
                x += width;
                col
            })
            .collect();

        Self { columns }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn width_of(&self, label: &str) -> Option<f32> {
        self.columns.iter().find(|c| c.label == label).map(|c| c.width)
    }

    pub fn total_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    fn left(&self) -> f32 {
        self.columns.first().map(|c| c.x).unwrap_or_default()
    }
}

/// Result of writing one table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Written,
    /// A page break happened first; column headers were redrawn.
    BrokePage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    PageOpen,
    HeaderJustDrawn,
    RowWriting,
}

/// Table currently being written.
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub header_style: TextStyle,
    pub body_style: TextStyle,
    pub row_height: f32,
    pub zebra: bool,
}

struct ActiveTable {
    layout: TableLayout,
    format: TableFormat,
    rows: usize,
}

#[derive(Debug, Clone)]
struct RunningHeader {
    text: String,
    style: TextStyle,
    align: Align,
    advance: f32,
}

pub struct PageWriter<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    geometry: PageGeometry,
    y: f32,
    state: WriterState,
    groups: usize,
    running: Vec<RunningHeader>,
    table: Option<ActiveTable>,
    footer_label: String,
}

impl<'a, S: Surface + ?Sized> PageWriter<'a, S> {
    /// Open the document's first page.
    pub fn new(surface: &'a mut S, geometry: PageGeometry) -> Self {
        surface.begin_page();
        Self {
            surface,
            geometry,
            y: geometry.top,
            state: WriterState::PageOpen,
            groups: 0,
            running: Vec::new(),
            table: None,
            footer_label: "Página".to_string(),
        }
    }

    pub fn cursor(&self) -> f32 {
        self.y
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Start a report group. The first group reuses the page opened by
    /// `new`; every later group starts on a fresh page.
    pub fn begin_group(&mut self) {
        self.table = None;
        self.running.clear();
        if self.groups > 0 {
            self.draw_footer();
            self.surface.begin_page();
            self.y = self.geometry.top;
        }
        self.groups += 1;
        self.state = WriterState::PageOpen;
    }

    /// Draw a header line now and again at the top of every continuation
    /// page of the current group.
    pub fn running_header(&mut self, text: &str, style: TextStyle, align: Align, advance: f32) {
        let header = RunningHeader {
            text: text.to_string(),
            style,
            align,
            advance,
        };
        self.draw_running(&header);
        self.running.push(header);
    }

    fn draw_running(&mut self, header: &RunningHeader) {
        self.text_at(&header.text, &header.style, header.align, self.y + header.style.size);
        self.y += header.advance;
    }

    fn draw_footer(&mut self) {
        let style = TextStyle {
            color: [0.4, 0.4, 0.4],
            ..TextStyle::regular(FOOTER_SIZE)
        };
        let label = format!("{} {}", self.footer_label, self.surface.page_count());
        let y = self.geometry.height - self.geometry.bottom;
        self.text_at(&label, &style, Align::Right, y);
    }

    /// Close the current page and continue the group on a new one.
    pub fn page_break(&mut self) {
        self.draw_footer();
        self.surface.begin_page();
        self.y = self.geometry.top;
        self.state = WriterState::PageOpen;

        let running = self.running.clone();
        for header in &running {
            self.draw_running(header);
        }

        if self.table.is_some() {
            self.draw_column_headers();
        }
    }

    /// Break the page when `height` more points would cross the body limit.
    /// Returns whether a break happened.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if self.y + height > self.geometry.body_limit() && self.y > self.geometry.top {
            self.page_break();
            true
        } else {
            false
        }
    }

    pub fn space(&mut self, height: f32) {
        self.y += height.max(0.0);
    }

    fn text_at(&mut self, text: &str, style: &TextStyle, align: Align, baseline: f32) {
        let left = self.geometry.left;
        let right = self.geometry.width - self.geometry.right;
        let x = aligned_x(text, style, align, left, right);
        self.surface.text(x, baseline, style, text);
    }

    /// One line of text; breaks the page first when it does not fit.
    pub fn text_line(&mut self, text: &str, style: &TextStyle, align: Align, advance: f32) {
        self.ensure_space(advance);
        self.text_at(text, style, align, self.y + style.size);
        self.y += advance;
        self.state = WriterState::PageOpen;
    }

    /// Wrapped paragraph over the usable width.
    pub fn paragraph(&mut self, text: &str, style: &TextStyle, align: Align, advance: f32) {
        let per_char = text_width("n", style).max(0.1);
        let max_chars = ((self.geometry.usable_width() / per_char).floor() as usize).max(1);

        for source_line in text.lines() {
            if source_line.trim().is_empty() {
                self.y += advance;
                continue;
            }
            for line in textwrap::wrap(source_line, max_chars) {
                self.text_line(&line, style, align, advance);
            }
        }
    }

    /// Draw a preloaded image. Absent buffers are skipped without leaving
    /// any space. Returns whether something was drawn.
    pub fn image(&mut self, name: &str, width: f32, height: f32, align: Align) -> bool {
        if !self.surface.has_image(name) {
            return false;
        }
        self.ensure_space(height);

        let left = self.geometry.left;
        let right = self.geometry.width - self.geometry.right;
        let x = match align {
            Align::Left => left,
            Align::Center => left + ((right - left) - width) / 2.0,
            Align::Right => right - width,
        };
        self.surface.image(name, x, self.y, width, height);
        self.y += height;
        true
    }

    // ---------------------------
    // Tables
    // ---------------------------

    /// Start a table: column headers are drawn at the current position
    /// (on a new page if not even one row would fit below them).
    pub fn begin_table(&mut self, layout: TableLayout, format: TableFormat) {
        let needed = format.row_height * 2.0;
        self.table = Some(ActiveTable {
            layout,
            format,
            rows: 0,
        });
        if !self.ensure_space(needed) {
            self.draw_column_headers();
        }
    }

    fn draw_column_headers(&mut self) {
        let Some(table) = self.table.as_ref() else {
            return;
        };
        let y = self.y;
        let h = table.format.row_height;
        let style = table.format.header_style;
        let left = table.layout.left();
        let total = table.layout.total_width();
        let cells: Vec<(ColumnLayout, String)> = table
            .layout
            .columns
            .iter()
            .map(|c| (c.clone(), c.label.clone()))
            .collect();

        self.surface.fill_rect(left, y, total, h, HEADER_FILL);
        self.draw_cells(&cells, &style, y, h);

        self.y += h;
        self.state = WriterState::HeaderJustDrawn;
    }

    fn draw_cells(&mut self, cells: &[(ColumnLayout, String)], style: &TextStyle, y: f32, h: f32) {
        let baseline = y + (h + style.size) / 2.0 - 1.0;
        for (col, text) in cells {
            let fitted = fit_text(text, style, col.width - 2.0 * CELL_PADDING);
            let x = aligned_x(
                &fitted,
                style,
                col.align,
                col.x + CELL_PADDING,
                col.x + col.width - CELL_PADDING,
            );
            self.surface.text(x, baseline, style, &fitted);
            self.surface.stroke_rect(col.x, y, col.width, h, BORDER);
        }
    }

    /// Write one data row. If it would cross the body limit, the page is
    /// broken first and the column headers are redrawn.
    pub fn write_line(&mut self, values: &[String]) -> LineOutcome {
        let Some(table) = self.table.as_ref() else {
            return LineOutcome::Written;
        };
        let h = table.format.row_height;

        let outcome = if self.y + h > self.geometry.body_limit() {
            self.page_break();
            LineOutcome::BrokePage
        } else {
            LineOutcome::Written
        };

        let Some(table) = self.table.as_mut() else {
            return outcome;
        };
        let y = self.y;
        let style = table.format.body_style;
        let stripe = table.format.zebra && table.rows % 2 == 0;
        let left = table.layout.left();
        let total = table.layout.total_width();
        let cells: Vec<(ColumnLayout, String)> = table
            .layout
            .columns
            .iter()
            .cloned()
            .zip(values.iter().cloned().chain(std::iter::repeat(String::new())))
            .collect();
        table.rows += 1;

        if stripe {
            self.surface.fill_rect(left, y, total, h, ZEBRA_FILL);
        }
        self.draw_cells(&cells, &style, y, h);

        self.y += h;
        self.state = WriterState::RowWriting;
        outcome
    }

    pub fn end_table(&mut self) {
        self.table = None;
        self.state = WriterState::PageOpen;
    }

    /// Footer of the last page. Consumes the writer.
    pub fn finish(mut self) -> usize {
        self.draw_footer();
        self.surface.page_count()
    }
}

fn aligned_x(text: &str, style: &TextStyle, align: Align, left: f32, right: f32) -> f32 {
    let w = text_width(text, style);
    match align {
        Align::Left => left,
        Align::Center => left + ((right - left) - w).max(0.0) / 2.0,
        Align::Right => (right - w).max(left),
    }
}

/// Cut text so that it fits `max_width`, marking the cut with "...".
fn fit_text(text: &str, style: &TextStyle, max_width: f32) -> String {
    if text_width(text, style) <= max_width {
        return text.to_string();
    }
    let per_char = text_width("n", style).max(0.1);
    let max_chars = (max_width / per_char).floor().max(0.0) as usize;
    truncate_chars(text, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::surface::RecordingSurface;
    use crate::export::template::{Margins, PageSize};

    fn geometry() -> PageGeometry {
        PageGeometry::from_meta(&TemplateMeta {
            id: "t".into(),
            title: String::new(),
            page_size: PageSize::A4,
            margins: Margins::default(),
            reserved_footer: 30.0,
        })
    }

    #[test]
    fn body_limit_keeps_footer_free() {
        assert_eq!(geometry().body_limit(), 842.0 - 50.0 - 30.0);
    }

    #[test]
    fn fit_text_truncates_long_cells() {
        let style = TextStyle::regular(10.0);
        assert_eq!(fit_text("abc", &style, 100.0), "abc");
        let cut = fit_text("abcdefghijklmnopqrstuvwxyz", &style, 50.0);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= 10);
    }

    #[test]
    fn first_group_reuses_opening_page() {
        let mut surface = RecordingSurface::new();
        let mut writer = PageWriter::new(&mut surface, geometry());
        writer.begin_group();
        writer.text_line("a", &TextStyle::regular(10.0), Align::Left, 14.0);
        writer.begin_group();
        writer.text_line("b", &TextStyle::regular(10.0), Align::Left, 14.0);
        assert_eq!(writer.finish(), 2);
    }

    #[test]
    fn missing_image_takes_no_space() {
        let mut surface = RecordingSurface::new();
        let mut writer = PageWriter::new(&mut surface, geometry());
        writer.begin_group();
        let before = writer.cursor();
        assert!(!writer.image("logo", 100.0, 40.0, Align::Left));
        assert_eq!(writer.cursor(), before);
    }
}
