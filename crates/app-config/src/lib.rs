use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::Settings;

/// Loads and validates the application settings.
///
/// Layered sources, later ones overriding earlier:
/// 1. `config/base.toml`
/// 2. an environment-specific file, e.g. `config/development.toml`
/// 3. environment variables with the `APP` prefix (`APP_RISK__MAX_POSITIONS=3`)
pub fn load_settings() -> Result<Settings> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{environment}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}

/// Parses settings from a TOML document. Used by tests and one-off tooling;
/// the same validation applies.
pub fn from_toml_str(raw: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(raw)?;
    settings.validate()?;
    Ok(settings)
}
