use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Environment prefix shared by every mall binary (`APP_API__BASE_URL`, ...).
pub const ENV_PREFIX: &str = "APP";

/// Loads layered settings: `<config_dir>/base.yaml` when present, then
/// environment variables under `env_prefix` with `__` as the nesting
/// separator. A `.env` file in the working directory is read first.
pub fn load_settings<T: DeserializeOwned>(
    config_dir: &Path,
    env_prefix: &str,
) -> Result<T, config::ConfigError> {
    dotenvy::dotenv().ok();

    let settings = Config::builder()
        .add_source(File::from(config_dir.join("base.yaml")).required(false))
        .add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<T>()
}
