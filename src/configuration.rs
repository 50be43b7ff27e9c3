use crate::constant::{LOCAL_ENVIRONMENT, PRODUCTION_ENVIRONMENT};
use crate::controller::ControllerConfig;
use crate::error::AppError;
use crate::store::RetryConfig;
use config::{Config, File};
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time::Duration;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    /// Absent in environments without a provisioned store; the in-memory
    /// stub stands in.
    pub store: Option<StoreSettings>,
    pub retry: RetrySettings,
    pub form: FormSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub name: String,
    /// Tag recorded on every submission to identify the UI placement it
    /// came from.
    pub default_source: String,
}

#[derive(Deserialize, Clone)]
pub struct StoreSettings {
    pub api_url: String,
    pub api_key: Secret<String>,
    pub table: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl StoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Deserialize, Clone)]
pub struct RetrySettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_attempts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub initial_delay_milliseconds: u64,
    pub backoff_multiplier: f64,
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_milliseconds),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct FormSettings {
    pub validate_on_change: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub validation_debounce_milliseconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub email_check_debounce_milliseconds: u64,
    /// Absent disables the auto-reset after a successful submission.
    pub auto_reset_milliseconds: Option<u64>,
}

impl FormSettings {
    pub fn to_controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            validate_on_change: self.validate_on_change,
            validation_debounce: Duration::from_millis(self.validation_debounce_milliseconds),
            email_check_debounce: Duration::from_millis(self.email_check_debounce_milliseconds),
            auto_reset_after: self.auto_reset_milliseconds.map(Duration::from_millis),
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir().map_err(|e| {
        tracing::error!("Failed to get current dir.");
        AppError::GetCurrentDirError(e)
    })?;
    let config_dir = base_path.join("configuration");
    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| LOCAL_ENVIRONMENT.into())
        .try_into()
        .map_err(|e| {
            tracing::error!("Failed to parse APP_ENVIRONMENT: {:?}", e);
            AppError::ParseEnvironmentVariableError(e)
        })?;
    let environment_filename = format!("{}.yaml", environment.as_str());
    let settings = Config::builder()
        .add_source(File::from(config_dir.join("base.yaml")))
        .add_source(File::from(config_dir.join(environment_filename)))
        .build()
        .map_err(|e| {
            tracing::error!("Failed to build config sources.");
            AppError::BuildConfigSourcesError(e)
        })?;
    settings.try_deserialize().map_err(|e| {
        tracing::error!("Failed to deserialize config file.");
        AppError::DeserializeConfigurationFileError(e)
    })
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => LOCAL_ENVIRONMENT,
            Environment::Production => PRODUCTION_ENVIRONMENT,
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            LOCAL_ENVIRONMENT => Ok(Self::Local),
            PRODUCTION_ENVIRONMENT => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either 'local' or 'production'.",
                other
            )),
        }
    }
}
