//! Configuration loading
//!
//! Layers, lowest first: built-in defaults, an optional
//! `config/buildtrack.{toml,yaml,json}` file, `BUILDTRACK__SECTION__KEY`
//! variables, then the conventional variables (`DATABASE_URL`, `PORT`, ...).

use bt_core::config::AppConfig;
use config::{Config, Environment, File};

pub fn load() -> anyhow::Result<AppConfig> {
    load_from("config/buildtrack")
}

pub fn load_from(file: &str) -> anyhow::Result<AppConfig> {
    let mut config: AppConfig = Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix("BUILDTRACK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.apply_env_overrides()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_keeps_defaults() {
        let config = load_from("does/not/exist").unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.server.max_body_size_bytes, defaults.server.max_body_size_bytes);
        assert_eq!(config.auth.cookie_name, defaults.auth.cookie_name);
        assert_eq!(config.storage.allowed_photo_types.len(), 4);
    }
}
