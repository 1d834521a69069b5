use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};
use tracing_log::log::LevelFilter;

#[derive(Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db()
            .database(&self.database_name)
            .log_statements(LevelFilter::Trace)
    }

    pub fn without_db(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .ssl_mode(PgSslMode::Prefer)
    }
}

/// Defaults are overridable through `DB_HOST`, `DB_PORT`, `DB_USER`,
/// `DB_PASSWORD`, `DB_NAME` and `APP_PORT`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", "8080")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", "5432")?
        .set_default("database.username", "subtrack")?
        .set_default("database.password", "subtrack")?
        .set_default("database.database_name", "subtrack")?
        .set_override_option("application.port", std::env::var("APP_PORT").ok())?
        .set_override_option("database.host", std::env::var("DB_HOST").ok())?
        .set_override_option("database.port", std::env::var("DB_PORT").ok())?
        .set_override_option("database.username", std::env::var("DB_USER").ok())?
        .set_override_option("database.password", std::env::var("DB_PASSWORD").ok())?
        .set_override_option("database.database_name", std::env::var("DB_NAME").ok())?
        .build()?;

    settings.try_deserialize()
}
