//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::infra::{eligibility, mailer};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Eligibility scorer configuration.
    pub eligibility: Eligibility,

    /// Mail transport configuration.
    pub mail: Mail,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the `CONF.`-prefixed environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// If the configuration cannot be read or is malformed.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret the [JWT]s of the identity layer are signed with.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Calendar months a business waits before being submitted again.
    #[default(service::domain::application::Cooldown::MONTHS)]
    pub cooldown_months: u32,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            cooldown_months,
        } = value;
        Self {
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            cooldown_months,
        }
    }
}

/// Eligibility scorer configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Eligibility {
    /// URL of the scorer's prediction endpoint.
    #[default(
        "https://loan-eligibility-api-production.up.railway.app/predict"
            .to_owned()
    )]
    pub endpoint: String,

    /// Timeout of a single scoring request.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Eligibility> for eligibility::Config {
    fn from(value: Eligibility) -> Self {
        let Eligibility { endpoint, timeout } = value;
        Self { endpoint, timeout }
    }
}

/// Mail transport configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Mail {
    /// Address emails are sent from.
    #[default("loans@localhost".to_owned())]
    pub sender: String,

    /// URL of the HTTP mail relay.
    ///
    /// Emails are only logged when omitted.
    pub relay: Option<String>,

    /// Timeout of a single relay request.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Mail> for mailer::Config {
    fn from(value: Mail) -> Self {
        let Mail {
            sender,
            relay,
            timeout,
        } = value;
        Self {
            sender,
            endpoint: relay,
            timeout,
        }
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("loans".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Very verbose tracing of every step.
    Trace,

    /// Diagnostics useful while debugging.
    Debug,

    /// Lifecycle transitions and server events.
    #[default]
    Info,

    /// Degraded behavior, such as a fail-closed eligibility verdict.
    Warn,

    /// Failures, such as undelivered notifications.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use service::infra::mailer;

    use super::{Config, Mail};

    #[test]
    fn defaults_point_to_public_scorer() {
        let conf = Config::default();

        assert_eq!(
            conf.eligibility.endpoint,
            "https://loan-eligibility-api-production.up.railway.app/predict",
        );
        assert_eq!(conf.eligibility.timeout, Duration::from_secs(10));
        assert_eq!(conf.service.cooldown_months, 3);
        assert_eq!(conf.server.port, 8080);
    }

    #[test]
    fn mail_without_relay_only_logs() {
        let conf = mailer::Config::from(Mail::default());

        assert_eq!(conf.endpoint, None);
        assert_eq!(conf.sender, "loans@localhost");
    }
}
