//! Process-wide tracing setup shared by the server and the CLI.
//!
//! Console output is filtered by `RUST_LOG` (default `info`). Setting
//! `SITEPLAN_ACCESS_LOG_ROLL=1` additionally writes `http.access` events to a
//! rolling file.

use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// Target used by the server's request logging.
pub const ACCESS_TARGET: &str = "http.access";

static ACCESS_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Minutely,
    Hourly,
    Daily,
}

/// Rolling access-log destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogSettings {
    pub directory: PathBuf,
    pub prefix: String,
    pub rotation: Rotation,
}

impl AccessLogSettings {
    /// `None` unless `SITEPLAN_ACCESS_LOG_ROLL=1`.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup("SITEPLAN_ACCESS_LOG_ROLL").as_deref() != Some("1") {
            return None;
        }
        let directory = lookup("SITEPLAN_ACCESS_LOG_DIR")
            .or_else(|| lookup("SITEPLAN_LOGS_DIR"))
            .unwrap_or_else(|| "logs".to_string());
        let prefix = lookup("SITEPLAN_ACCESS_LOG_PREFIX").unwrap_or_else(|| "http-access".into());
        let rotation = match lookup("SITEPLAN_ACCESS_LOG_ROTATION")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "hourly" => Rotation::Hourly,
            "minutely" => Rotation::Minutely,
            _ => Rotation::Daily,
        };
        Some(Self {
            directory: PathBuf::from(directory),
            prefix,
            rotation,
        })
    }

    fn appender(&self) -> tracing_appender::rolling::RollingFileAppender {
        let dir = &self.directory;
        let prefix = self.prefix.as_str();
        match self.rotation {
            Rotation::Hourly => tracing_appender::rolling::hourly(dir, prefix),
            Rotation::Minutely => tracing_appender::rolling::minutely(dir, prefix),
            Rotation::Daily => tracing_appender::rolling::daily(dir, prefix),
        }
    }
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(fmt::layer().with_filter(filter));

    let Some(access) = AccessLogSettings::from_lookup(|key| std::env::var(key).ok()) else {
        let _ = registry.try_init();
        return;
    };

    if std::fs::create_dir_all(&access.directory).is_err() {
        tracing::warn!(
            directory = %access.directory.display(),
            "failed to create access log directory"
        );
    }
    let (writer, guard) = tracing_appender::non_blocking(access.appender());
    let _ = ACCESS_GUARD.set(guard);
    let access_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .with_filter(Targets::new().with_target(ACCESS_TARGET, tracing::Level::INFO));
    let _ = registry.with(access_layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn access_log_is_opt_in() {
        let vars = HashMap::from([("SITEPLAN_ACCESS_LOG_DIR", "/tmp/x")]);
        assert_eq!(AccessLogSettings::from_lookup(lookup(&vars)), None);
    }

    #[test]
    fn access_log_defaults() {
        let vars = HashMap::from([("SITEPLAN_ACCESS_LOG_ROLL", "1")]);
        let settings = AccessLogSettings::from_lookup(lookup(&vars)).expect("enabled");
        assert_eq!(settings.directory, PathBuf::from("logs"));
        assert_eq!(settings.prefix, "http-access");
        assert_eq!(settings.rotation, Rotation::Daily);
    }

    #[test]
    fn access_log_overrides() {
        let vars = HashMap::from([
            ("SITEPLAN_ACCESS_LOG_ROLL", "1"),
            ("SITEPLAN_LOGS_DIR", "/var/log/siteplan"),
            ("SITEPLAN_ACCESS_LOG_PREFIX", "planner"),
            ("SITEPLAN_ACCESS_LOG_ROTATION", "HOURLY"),
        ]);
        let settings = AccessLogSettings::from_lookup(lookup(&vars)).expect("enabled");
        assert_eq!(settings.directory, PathBuf::from("/var/log/siteplan"));
        assert_eq!(settings.prefix, "planner");
        assert_eq!(settings.rotation, Rotation::Hourly);
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::info!(target: "siteplan::planning", "subscriber installed");
    }
}
