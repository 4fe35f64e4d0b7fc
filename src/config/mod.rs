use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub mod check;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    #[serde(default = "default_dedication_template")]
    pub dedication_template: String,
    #[serde(default = "default_certification_template")]
    pub certification_template: String,
    /// Rows per page for `list`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default)]
    pub organization: OrganizationConfig,
}

/// Branding resolved once per export and shared by every report group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationConfig {
    #[serde(default = "default_org_name")]
    pub name: String,
    #[serde(default)]
    pub responsible_name: String,
    /// Legal text printed under certificates.
    #[serde(default)]
    pub responsible_text: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub signature_path: Option<String>,
}

fn default_templates_dir() -> String {
    Config::config_dir()
        .join("templates")
        .to_string_lossy()
        .to_string()
}
fn default_dedication_template() -> String {
    "dedication".to_string()
}
fn default_certification_template() -> String {
    "certification".to_string()
}
fn default_page_size() -> u32 {
    100
}
fn default_org_name() -> String {
    "Centro de Formación".to_string()
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            name: default_org_name(),
            responsible_name: String::new(),
            responsible_text: String::new(),
            logo_path: None,
            signature_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            templates_dir: default_templates_dir(),
            dedication_template: default_dedication_template(),
            certification_template: default_certification_template(),
            default_page_size: default_page_size(),
            organization: OrganizationConfig::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("coursereport")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".coursereport")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("coursereport.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("coursereport.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    /// Template id configured for a report type.
    pub fn template_for(&self, report_type: crate::models::ReportType) -> &str {
        match report_type {
            crate::models::ReportType::Dedication => &self.dedication_template,
            crate::models::ReportType::Certification => &self.certification_template,
        }
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = std::path::Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            Self::database_file()
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(|_| AppError::ConfigSave)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}
