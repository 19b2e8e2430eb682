use super::Config;
use crate::error::BundleDlError;
use config::Config as ConfigBuilder;

/// Loads the config file, if any. Missing keys take their defaults.
pub fn load_config(config_path: Option<&str>) -> Result<Config, BundleDlError> {
    let Some(config_path) = config_path else {
        return Ok(Config::default());
    };

    tracing::debug!("Loading configuration from {}", config_path);
    let config_builder = ConfigBuilder::builder()
        .add_source(config::File::with_name(config_path))
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}
