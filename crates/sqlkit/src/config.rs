//! Grouped configuration and pool descriptors.
//!
//! The configuration source is a TOML document where each top-level table is
//! one named group of flat key/value pairs:
//!
//! ```toml
//! [primary]
//! url = "mysql://db.internal:3306/app"
//! user = "app"
//! pass = "secret"
//! maxActive = 16
//! showSql = true
//! ```
//!
//! [`Settings::load`] turns a group into a validated [`PoolConfig`];
//! [`Settings::sql_log`] extracts the display flags consumed by the
//! diagnostics side. Loading never opens a connection; the only I/O in this
//! module is [`Settings::from_path`] reading the document itself.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{DbError, DbResult};
use crate::sqllog::SqlLog;

/// Default maximum number of active connections.
pub const DEFAULT_MAX_ACTIVE: u32 = 8;
/// Default connection-acquisition wait limit.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(6000);

/// A validated connection-pool descriptor for one configuration group.
///
/// `max_wait` bounds connection acquisition only; in-flight statements are
/// not subject to any timeout from this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Connection URL; always present.
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Driver identifier, configured or detected from the URL scheme.
    pub driver: String,
    /// Connections opened eagerly at pool creation (default 0).
    pub initial_size: u32,
    /// Idle connections the pool keeps around (default 0).
    pub min_idle: u32,
    /// Upper bound on simultaneously checked-out connections (default 8).
    pub max_active: u32,
    /// How long acquisition may block before giving up (default 6000ms).
    pub max_wait: Duration,
}

/// A parsed grouped configuration source.
#[derive(Debug, Clone)]
pub struct Settings {
    groups: toml::Table,
}

impl Settings {
    /// Parse a configuration document from TOML text.
    pub fn from_toml_str(text: &str) -> DbResult<Self> {
        let groups: toml::Table = text.parse().map_err(|err: toml::de::Error| {
            DbError::config(format!("malformed configuration: {err}"))
        })?;
        Ok(Self { groups })
    }

    /// Read and parse a configuration document from a file.
    pub fn from_path(path: impl AsRef<Path>) -> DbResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|err| {
            DbError::config(format!(
                "cannot read configuration file '{}': {err}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Names of the configured groups.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Build the pool descriptor for `group`.
    ///
    /// Fails with [`DbError::UnknownConfigGroup`] when the group does not
    /// exist, [`DbError::MissingUrl`] when its URL is blank or absent,
    /// [`DbError::UnknownDriver`] when no driver is configured and the URL
    /// scheme is not recognized, and [`DbError::InvalidPoolSetting`] for
    /// negative pool numbers. Display flags in the group are left to
    /// [`Settings::sql_log`] and never interpreted here.
    pub fn load(&self, group: &str) -> DbResult<PoolConfig> {
        let raw = self.raw_group(group)?;

        let url = raw
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| DbError::MissingUrl(group.to_string()))?
            .to_string();

        let driver = match raw.driver {
            Some(driver) if !driver.trim().is_empty() => driver,
            _ => identify_driver(&url)?.to_string(),
        };

        let max_wait = match raw.max_wait {
            None => DEFAULT_MAX_WAIT,
            Some(ms) => Duration::from_millis(u64::try_from(ms).map_err(|_| {
                DbError::InvalidPoolSetting {
                    key: "maxWait".to_string(),
                    value: ms.to_string(),
                }
            })?),
        };

        Ok(PoolConfig {
            driver,
            user: raw.user,
            password: raw.password,
            initial_size: pool_size("initialSize", raw.initial_size, 0)?,
            min_idle: pool_size("minIdle", raw.min_idle, 0)?,
            max_active: pool_size("maxActive", raw.max_active, DEFAULT_MAX_ACTIVE)?,
            max_wait,
            url,
        })
    }

    /// Extract the SQL display flags for `group`.
    ///
    /// Absent flags default to off.
    pub fn sql_log(&self, group: &str) -> DbResult<SqlLog> {
        let raw = self.raw_group(group)?;
        Ok(SqlLog {
            show_sql: raw.show_sql.unwrap_or(false),
            format_sql: raw.format_sql.unwrap_or(false),
            show_params: raw.show_params.unwrap_or(false),
        })
    }

    fn raw_group(&self, group: &str) -> DbResult<RawGroup> {
        let value = self
            .groups
            .get(group)
            .ok_or_else(|| DbError::UnknownConfigGroup(group.to_string()))?;
        value.clone().try_into().map_err(|err: toml::de::Error| {
            DbError::config(format!("group '{group}': {err}"))
        })
    }
}

/// One configuration group as written, before validation.
///
/// Key aliases mirror the common JDBC-ish spellings; unknown keys are
/// treated as driver connection properties and ignored here.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGroup {
    #[serde(alias = "jdbcUrl")]
    url: Option<String>,
    #[serde(alias = "username")]
    user: Option<String>,
    #[serde(rename = "pass", alias = "password")]
    password: Option<String>,
    #[serde(alias = "driverClassName")]
    driver: Option<String>,
    #[serde(rename = "initialSize")]
    initial_size: Option<i64>,
    #[serde(rename = "minIdle")]
    min_idle: Option<i64>,
    #[serde(rename = "maxActive")]
    max_active: Option<i64>,
    #[serde(rename = "maxWait")]
    max_wait: Option<i64>,
    #[serde(rename = "showSql")]
    show_sql: Option<bool>,
    #[serde(rename = "formatSql")]
    format_sql: Option<bool>,
    #[serde(rename = "showParams")]
    show_params: Option<bool>,
}

fn pool_size(key: &str, value: Option<i64>, default: u32) -> DbResult<u32> {
    match value {
        None => Ok(default),
        Some(n) => u32::try_from(n).map_err(|_| DbError::InvalidPoolSetting {
            key: key.to_string(),
            value: n.to_string(),
        }),
    }
}

/// Detect the driver identifier from a connection URL's scheme.
///
/// A leading `jdbc:` prefix is stripped before matching, so both
/// `mysql://host/db` and `jdbc:mysql://host/db` detect `mysql`.
pub fn identify_driver(url: &str) -> DbResult<&'static str> {
    let trimmed = url.trim();
    let rest = trimmed.strip_prefix("jdbc:").unwrap_or(trimmed);
    let scheme = rest.split(':').next().unwrap_or("").to_ascii_lowercase();
    match scheme.as_str() {
        "mysql" => Ok("mysql"),
        "mariadb" => Ok("mariadb"),
        "postgres" | "postgresql" => Ok("postgres"),
        "sqlite" => Ok("sqlite"),
        "oracle" => Ok("oracle"),
        "sqlserver" | "mssql" => Ok("sqlserver"),
        "h2" => Ok("h2"),
        "derby" => Ok("derby"),
        _ => Err(DbError::UnknownDriver(url.to_string())),
    }
}
