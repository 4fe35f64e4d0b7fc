use crate::errors::{AppError, AppResult};
use crate::export::template::Template;
use crate::utils::path::expand_tilde;
use std::fs;
use std::path::PathBuf;

const BUILTIN_DEDICATION: &str = include_str!("../../../templates/dedication.json");
const BUILTIN_CERTIFICATION: &str = include_str!("../../../templates/certification.json");

/// Resolves template ids: `<dir>/<id>.json` first, then the built-ins.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: Option<PathBuf>,
}

impl TemplateStore {
    pub fn new(dir: &str) -> Self {
        Self {
            dir: Some(expand_tilde(dir)),
        }
    }

    /// Only the templates compiled into the binary.
    pub fn builtin_only() -> Self {
        Self { dir: None }
    }

    fn builtin(id: &str) -> Option<&'static str> {
        match id {
            "dedication" => Some(BUILTIN_DEDICATION),
            "certification" => Some(BUILTIN_CERTIFICATION),
            _ => None,
        }
    }

    /// Load and validate a template. Unknown ids are a fatal error.
    pub fn load(&self, id: &str) -> AppResult<Template> {
        let (source, origin) = match self.dir.as_ref().map(|d| d.join(format!("{id}.json"))) {
            Some(path) if path.is_file() => (
                fs::read_to_string(&path)?,
                path.to_string_lossy().to_string(),
            ),
            _ => match Self::builtin(id) {
                Some(text) => (text.to_string(), format!("built-in:{id}")),
                None => return Err(AppError::TemplateNotFound(id.to_string())),
            },
        };

        let template: Template = serde_json::from_str(&source)
            .map_err(|e| AppError::Template(format!("{origin}: {e}")))?;
        template.validate()?;
        Ok(template)
    }

    /// Ids visible to this store, built-ins included.
    pub fn available(&self) -> Vec<String> {
        let mut ids: Vec<String> = vec!["certification".into(), "dedication".into()];

        if let Some(dir) = &self.dir
            && let Ok(entries) = fs::read_dir(dir)
        {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "json")
                    && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                    && !ids.iter().any(|i| i == stem)
                {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        ids
    }
}
