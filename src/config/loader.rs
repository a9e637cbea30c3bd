use crate::config::schema::RunConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use validator::Validate;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a config file, overlays the `OTG_*` environment variables, and
    /// validates the result.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
        let mut config = Self::load_file(path.as_ref())?;
        Self::overlay(&mut config, |name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from hardcoded fallbacks and the `OTG_*` environment
    /// variables alone.
    pub fn from_env() -> Result<RunConfig> {
        let mut config = RunConfig::default();
        Self::overlay(&mut config, |name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<RunConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config: RunConfig = serde_json::from_str(&content)?;
                Ok(config)
            }
            Some("yaml") | Some("yml") => {
                let config: RunConfig = serde_yaml::from_str(&content)?;
                Ok(config)
            }
            Some("toml") => {
                let config: RunConfig = toml::from_str(&content)?;
                Ok(config)
            }
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    /// Environment variables win over file values and fallbacks. The lookup
    /// is injected so tests never have to mutate process state.
    fn overlay(config: &mut RunConfig, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api) = lookup("OTG_API") {
            config.api = api;
        }
        if let Some(location) = lookup("OTG_LOCATION_P1") {
            config.p1_location = location;
        }
        if let Some(location) = lookup("OTG_LOCATION_P2") {
            config.p2_location = location;
        }
    }
}
