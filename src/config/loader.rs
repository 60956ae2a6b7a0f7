use anyhow::{Context, Result};
use std::path::Path;

use super::schema::Config;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::load_from_string(&content)
    }

    pub fn load_from_string(content: &str) -> Result<Config> {
        let config: Config =
            serde_yaml::from_str(content).context("Failed to parse YAML config")?;

        Ok(config)
    }
}
