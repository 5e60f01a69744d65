// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::net::SocketAddr;

use anyhow::{Context, Result};

pub const DATABASE_URL_VAR: &str = "STUDY_PLANNER_DATABASE_URL";
pub const LISTEN_ADDR_VAR: &str = "STUDY_PLANNER_ADDR";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://database/study_planner.db";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source, falling back to
    /// the defaults for unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url =
            lookup(DATABASE_URL_VAR).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let raw_addr = lookup(LISTEN_ADDR_VAR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = raw_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid {} value '{}'", LISTEN_ADDR_VAR, raw_addr))?;

        Ok(Self {
            database_url,
            listen_addr,
        })
    }

    /// Local directory holding a file-backed SQLite database, if any.
    pub fn database_dir(&self) -> Option<&str> {
        let path = self.database_url.strip_prefix("sqlite://")?;
        let (dir, _) = path.rsplit_once('/')?;
        (!dir.is_empty()).then_some(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.listen_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.database_dir(), Some("database"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (DATABASE_URL_VAR, "sqlite::memory:"),
            (LISTEN_ADDR_VAR, "127.0.0.1:8080"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.database_dir(), None);
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[(LISTEN_ADDR_VAR, "not-an-address")]))
            .unwrap_err();
        assert!(err.to_string().contains(LISTEN_ADDR_VAR));
    }
}
