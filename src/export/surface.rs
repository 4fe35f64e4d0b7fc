//! Page-writing primitive shared by the PDF backend and the layout recorder.
//!
//! Coordinates are in points, measured from the top-left corner of the page.

use crate::export::template::FontWeight;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub color: [f32; 3],
}

impl TextStyle {
    pub fn regular(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
            color: [0.0, 0.0, 0.0],
        }
    }
}

/// Approximate Helvetica advance width; good enough for column fitting.
pub fn text_width(text: &str, style: &TextStyle) -> f32 {
    let factor = match style.weight {
        FontWeight::Regular => 0.50,
        FontWeight::Bold => 0.55,
    };
    text.chars().count() as f32 * style.size * factor
}

pub trait Surface {
    /// Open a new page; subsequent drawing targets it.
    fn begin_page(&mut self);

    /// Text whose baseline sits at `y`.
    fn text(&mut self, x: f32, y: f32, style: &TextStyle, text: &str);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgb: [f32; 3]);

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgb: [f32; 3]);

    /// Whether an image buffer named `name` was preloaded.
    fn has_image(&self, name: &str) -> bool;

    /// Draw a preloaded image; absent names draw nothing.
    fn image(&mut self, name: &str, x: f32, y: f32, w: f32, h: f32);

    fn page_count(&self) -> usize;
}

/// One drawing operation captured by `RecordingSurface`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        page: usize,
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Rect {
        page: usize,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        filled: bool,
    },
    Image {
        page: usize,
        name: String,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
}

/// Surface that records operations instead of producing bytes.
/// Used for dry runs and for layout assertions.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    images: Vec<String>,
    pages: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend these image buffers were preloaded.
    pub fn with_images<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            images: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Texts drawn on `page` (0-based), in drawing order.
    pub fn texts_on(&self, page: usize) -> Vec<(f32, f32, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    page: p, x, y, text, ..
                } if *p == page => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect()
    }

    /// X offsets of every occurrence of `text`, with their page.
    pub fn positions_of(&self, text: &str) -> Vec<(usize, f32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { page, x, text: t, .. } if t == text => Some((*page, *x)),
                _ => None,
            })
            .collect()
    }

    pub fn images_drawn(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    fn current(&self) -> usize {
        self.pages.saturating_sub(1)
    }
}

impl Surface for RecordingSurface {
    fn begin_page(&mut self) {
        self.pages += 1;
    }

    fn text(&mut self, x: f32, y: f32, style: &TextStyle, text: &str) {
        self.ops.push(DrawOp::Text {
            page: self.current(),
            x,
            y,
            size: style.size,
            bold: style.weight == FontWeight::Bold,
            text: text.to_string(),
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, _rgb: [f32; 3]) {
        self.ops.push(DrawOp::Rect {
            page: self.current(),
            x,
            y,
            w,
            h,
            filled: true,
        });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, _rgb: [f32; 3]) {
        self.ops.push(DrawOp::Rect {
            page: self.current(),
            x,
            y,
            w,
            h,
            filled: false,
        });
    }

    fn has_image(&self, name: &str) -> bool {
        self.images.iter().any(|i| i == name)
    }

    fn image(&mut self, name: &str, x: f32, y: f32, w: f32, h: f32) {
        if self.has_image(name) {
            self.ops.push(DrawOp::Image {
                page: self.current(),
                name: name.to_string(),
                x,
                y,
                w,
                h,
            });
        }
    }

    fn page_count(&self) -> usize {
        self.pages
    }
}
