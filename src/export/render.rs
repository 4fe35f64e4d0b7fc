//! Template interpretation: one pass per report group over the template's
//! element tree, driving a `PageWriter`.

use crate::export::assets::Branding;
use crate::export::grouping::ReportGroup;
use crate::export::surface::{Surface, TextStyle};
use crate::export::template::{
    EffectiveStyle, Element, ElementKind, FontWeight, RenderVars, Style, TableElement, Template,
    merge,
};
use crate::export::writer::{PageGeometry, PageWriter, TableFormat, TableLayout};
use crate::models::ReportType;
use crate::utils::date::{format_es, today};

/// Printed on the only page of an export that matched no rows.
pub const EMPTY_NOTICE: &str = "No hay registros que coincidan con la selección.";

pub fn text_style(style: &EffectiveStyle) -> TextStyle {
    TextStyle {
        size: style.font_size,
        weight: style.weight,
        color: style.color,
    }
}

pub struct TemplateRenderer<'t> {
    template: &'t Template,
    branding: &'t Branding,
    report_type: ReportType,
    include_passwords: bool,
    generated_at: String,
}

impl<'t> TemplateRenderer<'t> {
    pub fn new(
        template: &'t Template,
        branding: &'t Branding,
        report_type: ReportType,
        include_passwords: bool,
    ) -> Self {
        Self {
            template,
            branding,
            report_type,
            include_passwords,
            generated_at: today().format("%d/%m/%Y").to_string(),
        }
    }

    /// Fixed generation date, for reproducible output.
    pub fn with_generated_at(mut self, date: &str) -> Self {
        self.generated_at = date.to_string();
        self
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::from_meta(&self.template.meta)
    }

    /// Variables available to `{{...}}` tokens and bindings for one group.
    pub fn group_vars(&self, group: &ReportGroup) -> RenderVars {
        let mut vars = RenderVars::new();
        let mut set = |k: &str, v: String| {
            vars.insert(k.to_string(), v);
        };

        set("report_title", self.template.meta.title.clone());
        set("report_type", self.report_type.as_str().to_string());
        set("center_name", group.center_name.clone());
        set("course_name", group.course_name.clone());
        set("group_name", group.group_name().to_string());
        set(
            "group_id",
            group.group_id.map(|id| id.to_string()).unwrap_or_default(),
        );
        set(
            "start_date",
            group.start_date().map(format_es).unwrap_or_default(),
        );
        set("end_date", group.end_date().map(format_es).unwrap_or_default());
        set("company_names", group.company_names().join(", "));
        set("total_rows", group.rows.len().to_string());
        set("generated_at", self.generated_at.clone());
        set("organization_name", self.branding.organization_name.clone());
        set("responsible_name", self.branding.responsible_name.clone());
        set("responsible_text", self.branding.responsible_text.clone());

        vars
    }

    /// Render every group into `surface`, which must be empty. Returns the
    /// number of pages written.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, groups: &[ReportGroup]) -> usize {
        let mut writer = PageWriter::new(surface, self.geometry());

        if groups.is_empty() {
            writer.begin_group();
            let title = merge(ElementKind::Title, &Style::default(), None);
            writer.text_line(
                &self.template.meta.title,
                &text_style(&title),
                title.align,
                title.line_advance() + title.space_after,
            );
            let body = merge(ElementKind::Paragraph, &Style::default(), None);
            writer.paragraph(EMPTY_NOTICE, &text_style(&body), body.align, body.line_advance());
            return writer.finish();
        }

        for group in groups {
            self.render_group(&mut writer, group);
        }

        writer.finish()
    }

    fn render_group<S: Surface + ?Sized>(&self, writer: &mut PageWriter<'_, S>, group: &ReportGroup) {
        let vars = self.group_vars(group);
        writer.begin_group();

        for (index, page) in self.template.pages.iter().enumerate() {
            if index > 0 {
                writer.page_break();
            }
            for element in &page.elements {
                self.render_element(writer, element, group, &vars);
            }
        }
    }

    fn render_element<S: Surface + ?Sized>(
        &self,
        writer: &mut PageWriter<'_, S>,
        element: &Element,
        group: &ReportGroup,
        vars: &RenderVars,
    ) {
        match element {
            Element::Header(el) => {
                let style = self.template.text_style(ElementKind::Header, el);
                let text = el.content.resolve(vars);
                writer.running_header(
                    &text,
                    text_style(&style),
                    style.align,
                    style.line_advance() + style.space_after,
                );
            }
            Element::Title(el) | Element::Paragraph(el) => {
                let style = self.template.text_style(element.kind(), el);
                let text = el.content.resolve(vars);
                if text.trim().is_empty() {
                    return;
                }
                writer.space(style.space_before);
                writer.paragraph(&text, &text_style(&style), style.align, style.line_advance());
                writer.space(style.space_after);
            }
            Element::Image(img) => {
                let align = img.align.unwrap_or_default();
                if writer.image(&img.source, img.width, img.height, align) {
                    writer.space(img.space_after.unwrap_or(6.0));
                }
            }
            Element::Table(table) => self.render_table(writer, table, group),
        }
    }

    /// Column layout for one table of this export.
    pub fn table_layout(&self, table: &TableElement) -> TableLayout {
        let geometry = self.geometry();
        TableLayout::compute(
            &table.columns,
            self.include_passwords,
            geometry.left,
            geometry.width - geometry.right,
        )
    }

    fn table_format(&self, table: &TableElement) -> TableFormat {
        let body = merge(
            ElementKind::Table,
            &Style::default(),
            self.template.style(table.style.as_deref()),
        );

        let named_header = self.template.style(table.header_style.as_deref());
        let mut header = merge(ElementKind::Table, &Style::default(), named_header);
        if named_header.and_then(|s| s.bold).is_none() {
            header.weight = FontWeight::Bold;
        }

        TableFormat {
            header_style: text_style(&header),
            body_style: text_style(&body),
            row_height: table.row_height,
            zebra: table.zebra,
        }
    }

    fn render_table<S: Surface + ?Sized>(
        &self,
        writer: &mut PageWriter<'_, S>,
        table: &TableElement,
        group: &ReportGroup,
    ) {
        let layout = self.table_layout(table);
        let fields: Vec<_> = layout.columns.iter().map(|c| c.field).collect();
        let format = self.table_format(table);
        let space_after = merge(ElementKind::Table, &Style::default(), None).space_after;

        writer.begin_table(layout, format);
        for (index, row) in group.rows.iter().enumerate() {
            let values: Vec<String> = fields.iter().map(|f| f.value(row, index)).collect();
            writer.write_line(&values);
        }
        writer.end_table();
        writer.space(space_after);
    }
}
