use anyhow::{Result, anyhow};

use super::schema::Config;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> Result<()> {
        // Validate endpoint
        let endpoint = config.endpoint.trim();
        if endpoint.is_empty() {
            return Err(anyhow!("Endpoint cannot be empty"));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(anyhow!(
                "Endpoint '{}' must start with http:// or https://",
                endpoint
            ));
        }

        // Validate timeout
        config
            .timeout_duration()
            .map_err(|e| anyhow!("Invalid timeout '{}': {}", config.timeout, e))?;

        // Validate export directory
        if config.export_dir.as_os_str().is_empty() {
            return Err(anyhow!("Export directory cannot be empty"));
        }

        Ok(())
    }
}
