use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::model::{DocumentStyle, IssuerConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output_dir: String,
    pub currency_symbol: String,
    pub currency_code: String,
    pub issuer: IssuerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let style = DocumentStyle::default();
        Settings {
            output_dir: "~/Documents/Invoices".to_string(),
            currency_symbol: style.currency_symbol,
            currency_code: style.currency_code,
            issuer: style.issuer,
        }
    }
}

impl Settings {
    pub fn document_style(&self) -> DocumentStyle {
        DocumentStyle {
            issuer: self.issuer.clone(),
            currency_symbol: self.currency_symbol.clone(),
            currency_code: self.currency_code.clone(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.output_dir))
    }

    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, AppError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content).map(Some)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Loads the settings file, writing the defaults on first run.
    pub fn load_or_init() -> Result<Self, AppError> {
        let path = config_path();
        debug!(path = %path.display(), "loading settings");
        match Self::load_from(&path)? {
            Some(settings) => Ok(settings),
            None => {
                println!("✨ Initializing default settings at {}", path.display());
                let settings = Settings::default();
                settings.save_to(&path)?;
                Ok(settings)
            }
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "bill-maker", "app") {
        return proj_dirs.config_dir().join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_use_defaults() {
        let settings = Settings::from_toml("currency_code = \"USD\"\ncurrency_symbol = \"$\"").unwrap();
        assert_eq!(settings.currency_code, "USD");
        assert_eq!(settings.issuer.name, "ProtoHub");
        assert_eq!(settings.output_dir, "~/Documents/Invoices");
    }

    #[test]
    fn issuer_table_overrides_name() {
        let settings = Settings::from_toml("[issuer]\nname = \"Acme Studio\"").unwrap();
        assert_eq!(settings.document_style().issuer.name, "Acme Studio");
        assert_eq!(settings.document_style().currency_symbol, "₹");
    }

    #[test]
    fn empty_issuer_table_keeps_the_default_name() {
        let settings = Settings::from_toml("[issuer]\n").unwrap();
        assert_eq!(settings.issuer.name, "ProtoHub");
        assert_eq!(settings.currency_code, "INR");
    }

    #[test]
    fn round_trips_through_a_file() {
        let path = std::env::temp_dir()
            .join(format!("bill-maker-settings-{}", std::process::id()))
            .join("settings.toml");
        let mut settings = Settings::default();
        settings.output_dir = "/tmp/invoices".to_string();
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), Some(settings));
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn absent_file_is_none() {
        let path = std::env::temp_dir().join("bill-maker-does-not-exist/settings.toml");
        assert_eq!(Settings::load_from(&path).unwrap(), None);
    }

    #[test]
    fn plain_paths_are_left_alone() {
        assert_eq!(expand_home_dir("/srv/invoices"), "/srv/invoices");
    }
}
