use crate::export::template::Content;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Per-group variables available to text elements.
pub type RenderVars = HashMap<String, String>;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("static regex"));

/// Replace every `{{name}}` with its value. Unknown names become "".
pub fn interpolate(text: &str, vars: &RenderVars) -> String {
    TOKEN
        .replace_all(text, |caps: &Captures<'_>| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

impl Content {
    pub fn resolve(&self, vars: &RenderVars) -> String {
        match self {
            Content::Text(text) => interpolate(text, vars),
            Content::Bind(name) => vars.get(name).cloned().unwrap_or_default(),
        }
    }
}
