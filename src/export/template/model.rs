use crate::errors::{AppError, AppResult};
use crate::models::ReportRow;
use crate::utils::date::format_es;
use crate::utils::{format_percentage, format_time_spent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete document description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub meta: TemplateMeta,
    #[serde(default)]
    pub styles: HashMap<String, Style>,
    pub pages: Vec<TemplatePage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateMeta {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub margins: Margins,
    /// Space kept free above the bottom margin for the page footer.
    #[serde(default = "default_reserved_footer")]
    pub reserved_footer: f32,
}

fn default_reserved_footer() -> f32 {
    30.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 50.0,
            bottom: 50.0,
            left: 50.0,
            right: 50.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatePage {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Closed set of element kinds; each carries only what it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Title(TextElement),
    Paragraph(TextElement),
    /// Running header, repeated at the top of every page of a group.
    Header(TextElement),
    Table(TableElement),
    Image(ImageElement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Title,
    Paragraph,
    Header,
    Table,
    Image,
}

/// Literal text (with `{{var}}` tokens) or a binding to one context variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Content {
    Text(String),
    Bind(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextElement {
    pub content: Content,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(flatten)]
    pub overrides: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableElement {
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub header_style: Option<String>,
    #[serde(default = "default_row_height")]
    pub row_height: f32,
    #[serde(default = "default_true")]
    pub zebra: bool,
}

fn default_row_height() -> f32 {
    20.0
}

fn default_true() -> bool {
    true
}

fn default_weight() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub label: String,
    pub field: RowField,
    /// Relative share of the usable width.
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub align: Option<Align>,
    /// The column exists only when this export flag is on.
    #[serde(default)]
    pub requires: Option<ColumnFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnFlag {
    IncludePasswords,
}

/// Row values a table column can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowField {
    Index,
    Username,
    FullName,
    Name,
    Surnames,
    Password,
    Dni,
    Email,
    Phone,
    Completion,
    TimeSpent,
    GroupName,
    CompanyName,
    StartDate,
    EndDate,
}

impl RowField {
    /// Cell text for `row`, which is the `index`-th (0-based) row of its group.
    pub fn value(&self, row: &ReportRow, index: usize) -> String {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        match self {
            RowField::Index => (index + 1).to_string(),
            RowField::Username => opt(&row.moodle_username),
            RowField::FullName => row.full_name(),
            RowField::Name => row.name.clone(),
            RowField::Surnames => row.surnames(),
            RowField::Password => opt(&row.moodle_password),
            RowField::Dni => opt(&row.dni),
            RowField::Email => opt(&row.email),
            RowField::Phone => opt(&row.phone),
            RowField::Completion => format_percentage(row.completion_percentage),
            RowField::TimeSpent => format_time_spent(row.time_spent),
            RowField::GroupName => opt(&row.group_name),
            RowField::CompanyName => opt(&row.company_name),
            RowField::StartDate => row.group_start_date.as_deref().map(format_es).unwrap_or_default(),
            RowField::EndDate => row.group_end_date.as_deref().map(format_es).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageElement {
    /// Context variable naming a preloaded buffer: `logo`, `signature`.
    pub source: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub align: Option<Align>,
    #[serde(default)]
    pub space_after: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Named style or element-level overrides. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_before: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_after: Option<f32>,
    /// Multiplier of the font size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
}

/// Fully resolved style, no optional fields left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStyle {
    pub font_size: f32,
    pub weight: FontWeight,
    pub color: [f32; 3],
    pub align: Align,
    pub space_before: f32,
    pub space_after: f32,
    pub line_height: f32,
}

impl EffectiveStyle {
    pub fn line_advance(&self) -> f32 {
        self.font_size * self.line_height
    }
}

impl ElementKind {
    pub fn default_style(&self) -> EffectiveStyle {
        let base = EffectiveStyle {
            font_size: 10.0,
            weight: FontWeight::Regular,
            color: [0.0, 0.0, 0.0],
            align: Align::Left,
            space_before: 0.0,
            space_after: 6.0,
            line_height: 1.35,
        };
        match self {
            ElementKind::Title => EffectiveStyle {
                font_size: 16.0,
                weight: FontWeight::Bold,
                align: Align::Center,
                space_before: 4.0,
                space_after: 12.0,
                ..base
            },
            ElementKind::Header => EffectiveStyle {
                font_size: 8.0,
                color: [0.4, 0.4, 0.4],
                space_after: 10.0,
                ..base
            },
            ElementKind::Table => EffectiveStyle {
                font_size: 9.0,
                space_after: 10.0,
                ..base
            },
            ElementKind::Paragraph | ElementKind::Image => base,
        }
    }
}

/// Element-level fields win over the named style, which wins over the
/// kind's defaults.
pub fn merge(kind: ElementKind, overrides: &Style, named: Option<&Style>) -> EffectiveStyle {
    let def = kind.default_style();
    let empty = Style::default();
    let named = named.unwrap_or(&empty);

    EffectiveStyle {
        font_size: overrides.font_size.or(named.font_size).unwrap_or(def.font_size),
        weight: match overrides.bold.or(named.bold) {
            Some(true) => FontWeight::Bold,
            Some(false) => FontWeight::Regular,
            None => def.weight,
        },
        color: overrides.color.or(named.color).unwrap_or(def.color),
        align: overrides.align.or(named.align).unwrap_or(def.align),
        space_before: overrides.space_before.or(named.space_before).unwrap_or(def.space_before),
        space_after: overrides.space_after.or(named.space_after).unwrap_or(def.space_after),
        line_height: overrides.line_height.or(named.line_height).unwrap_or(def.line_height),
    }
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Title(_) => ElementKind::Title,
            Element::Paragraph(_) => ElementKind::Paragraph,
            Element::Header(_) => ElementKind::Header,
            Element::Table(_) => ElementKind::Table,
            Element::Image(_) => ElementKind::Image,
        }
    }
}

impl Template {
    /// Look up a named style. Unknown names are caught by `validate`.
    pub fn style(&self, name: Option<&str>) -> Option<&Style> {
        name.and_then(|n| self.styles.get(n))
    }

    /// Effective style of a text element.
    pub fn text_style(&self, kind: ElementKind, el: &TextElement) -> EffectiveStyle {
        merge(kind, &el.overrides, self.style(el.style.as_deref()))
    }

    /// Structural checks run once when the template is loaded.
    pub fn validate(&self) -> AppResult<()> {
        let id = &self.meta.id;
        if self.pages.is_empty() {
            return Err(AppError::Template(format!("{id}: template has no pages")));
        }

        let known = |name: &Option<String>| -> AppResult<()> {
            match name {
                Some(n) if !self.styles.contains_key(n) => Err(AppError::Template(format!(
                    "{id}: unknown style '{n}'"
                ))),
                _ => Ok(()),
            }
        };

        for page in &self.pages {
            for el in &page.elements {
                match el {
                    Element::Title(t) | Element::Paragraph(t) | Element::Header(t) => {
                        known(&t.style)?
                    }
                    Element::Table(t) => {
                        known(&t.style)?;
                        known(&t.header_style)?;
                        if t.columns.is_empty() {
                            return Err(AppError::Template(format!("{id}: table without columns")));
                        }
                        if t.columns.iter().any(|c| c.weight <= 0.0) {
                            return Err(AppError::Template(format!(
                                "{id}: column weights must be positive"
                            )));
                        }
                        if t.row_height <= 0.0 {
                            return Err(AppError::Template(format!(
                                "{id}: row_height must be positive"
                            )));
                        }
                    }
                    Element::Image(img) => {
                        if img.width <= 0.0 || img.height <= 0.0 {
                            return Err(AppError::Template(format!(
                                "{id}: image '{}' needs a positive size",
                                img.source
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
