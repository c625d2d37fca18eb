use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use roomlog_search::links::DEFAULT_LINK_BASE;

use crate::auth::AccessList;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub link_base: String,
    pub query_timeout: Duration,
    pub access_list: AccessList,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("ROOMLOG_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("ROOMLOG_PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .context("ROOMLOG_PORT must be a port number")?;
        let db_path: PathBuf = var("ROOMLOG_DB_PATH")
            .unwrap_or_else(|| "roomlog.db".into())
            .into();
        let link_base = var("ROOMLOG_LINK_BASE").unwrap_or_else(|| DEFAULT_LINK_BASE.into());
        let timeout_ms: u64 = var("ROOMLOG_QUERY_TIMEOUT_MS")
            .unwrap_or_else(|| "10000".into())
            .parse()
            .context("ROOMLOG_QUERY_TIMEOUT_MS must be a number of milliseconds")?;
        let access_list = AccessList::parse(&var("ACCESS_LIST").unwrap_or_default())?;

        Ok(Self {
            host,
            port,
            db_path,
            link_base,
            query_timeout: Duration::from_millis(timeout_ms),
            access_list,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

/// Version and build metadata baked in at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub built_at: Option<DateTime<Utc>>,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self::new(
            option_env!("ROOMLOG_TAG").unwrap_or(""),
            option_env!("ROOMLOG_COMMIT").unwrap_or("unknown"),
            option_env!("ROOMLOG_BUILD_TIME").unwrap_or("unknown"),
        )
    }

    /// Untagged builds get a `+dev.<commit>` suffix.
    pub fn new(tag: &str, commit: &str, build_time: &str) -> Self {
        let static_version = env!("CARGO_PKG_VERSION");
        let tag = tag.strip_prefix('v').unwrap_or(tag);

        let version = if tag == static_version {
            static_version.to_string()
        } else if let Some(short) = commit.get(..8).filter(|_| commit.len() > 8) {
            format!("{static_version}+dev.{short}")
        } else {
            format!("{static_version}+dev.unknown")
        };

        let built_at = DateTime::parse_from_rfc3339(build_time)
            .ok()
            .map(|t| t.with_timezone(&Utc));

        Self {
            version,
            commit: commit.to_string(),
            built_at,
        }
    }

    pub fn description(&self) -> String {
        match self.built_at {
            Some(t) => format!(
                "roomlog {} (built at {})",
                self.version,
                t.format("%a, %d %b %Y %H:%M:%S UTC")
            ),
            None => format!("roomlog {}", self.version),
        }
    }
}
