//! Detect and fill configuration keys missing from the YAML file on disk.
//! Older config files predate the organization block and template ids.

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Dotted paths present in the defaults but absent from the file.
pub fn missing_fields(path: &Path) -> AppResult<Vec<String>> {
    let on_disk = read_yaml(path)?;
    let defaults = defaults_yaml()?;

    let mut missing = Vec::new();
    collect_missing(&defaults, &on_disk, "", &mut missing);
    Ok(missing)
}

/// Write the default value of every missing key back to the file.
/// Existing values are never touched. Returns the keys that were added.
pub fn fill_missing_fields(path: &Path) -> AppResult<Vec<String>> {
    let mut on_disk = read_yaml(path)?;
    let defaults = defaults_yaml()?;

    let mut added = Vec::new();
    merge_missing(&defaults, &mut on_disk, "", &mut added);

    if added.is_empty() {
        info("Configuration file is up to date.");
        return Ok(added);
    }

    let serialized = serde_yaml::to_string(&on_disk).map_err(|_| AppError::ConfigSave)?;
    fs::write(path, serialized)?;

    success(format!("Configuration updated: added {}", added.join(", ")));
    Ok(added)
}

fn read_yaml(path: &Path) -> AppResult<Value> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))?;

    if value.is_mapping() {
        Ok(value)
    } else if value.is_null() {
        Ok(Value::Mapping(Mapping::new()))
    } else {
        Err(AppError::Config("top level is not a mapping".into()))
    }
}

fn defaults_yaml() -> AppResult<Value> {
    serde_yaml::to_value(Config::default()).map_err(|e| AppError::Config(e.to_string()))
}

fn dotted(prefix: &str, key: &Value) -> String {
    let k = key.as_str().unwrap_or("?");
    if prefix.is_empty() {
        k.to_string()
    } else {
        format!("{prefix}.{k}")
    }
}

fn collect_missing(defaults: &Value, actual: &Value, prefix: &str, out: &mut Vec<String>) {
    let (Some(def_map), Some(act_map)) = (defaults.as_mapping(), actual.as_mapping()) else {
        return;
    };

    for (key, def_val) in def_map {
        match act_map.get(key) {
            None => out.push(dotted(prefix, key)),
            Some(act_val) => collect_missing(def_val, act_val, &dotted(prefix, key), out),
        }
    }
}

fn merge_missing(defaults: &Value, actual: &mut Value, prefix: &str, out: &mut Vec<String>) {
    let (Some(def_map), Some(act_map)) = (defaults.as_mapping(), actual.as_mapping_mut()) else {
        return;
    };

    for (key, def_val) in def_map {
        let path = dotted(prefix, key);
        match act_map.get_mut(key) {
            None => {
                act_map.insert(key.clone(), def_val.clone());
                out.push(path);
            }
            Some(act_val) => merge_missing(def_val, act_val, &path, out),
        }
    }
}
