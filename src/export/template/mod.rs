//! Declarative document templates: typed element tree, style merging,
//! variable interpolation and lookup by id.

mod interpolate;
mod loader;
mod model;

pub use interpolate::{interpolate, RenderVars};
pub use loader::TemplateStore;
pub use model::{
    Align, ColumnFlag, ColumnSpec, Content, EffectiveStyle, Element, ElementKind, FontWeight, ImageElement,
    Margins, PageSize, RowField, Style, TableElement, Template, TemplateMeta, TemplatePage,
    TextElement, merge,
};
