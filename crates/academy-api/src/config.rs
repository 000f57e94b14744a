//! Configuration types for the Academy content API.
//!
//! Configuration is read from `academy.json` (camelCase keys). Every field
//! has a default, so a missing file yields a working local setup.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AcademyError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "academy.json";

/// Default bind host.
fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Default HTTP port.
const fn default_port() -> u16 {
    5000
}

/// Default languages that titles must be filled in.
fn default_required_languages() -> Vec<String> {
    vec!["en".to_string(), "ar".to_string()]
}

/// Main configuration for the Academy server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Host address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the HTTP server to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Snapshot file for the document store. `None` keeps the catalog in memory only.
    #[serde(default)]
    pub data_file: Option<String>,

    /// Bearer token required on mutating requests. `None` disables the check.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Languages whose title text must be non-empty on module and lesson submissions.
    #[serde(default = "default_required_languages")]
    pub required_languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_file: None,
            auth_token: None,
            required_languages: default_required_languages(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `academy.json` in the current directory. If not found,
    /// returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            AcademyError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `academy.json` inside a specific directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `AcademyError::ConfigParseError` if the file exists but contains
    /// invalid JSON, and `AcademyError::ConfigValidationError` if the values
    /// do not pass [`Config::validate`].
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(AcademyError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| AcademyError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - `host` must parse as an IP address
    /// - `requiredLanguages` must include `en`, the slug source language
    /// - `authToken`, when present, must not be blank
    /// - `dataFile`, when present, must not be blank
    pub fn validate(&self) -> Result<()> {
        if self.host.parse::<IpAddr>().is_err() {
            return Err(AcademyError::config_validation(
                format!("host '{}' is not a valid IP address", self.host),
                "Set host to an address such as 127.0.0.1 or 0.0.0.0 in your academy.json",
            ));
        }

        if !self.required_languages.iter().any(|lang| lang == "en") {
            return Err(AcademyError::config_validation(
                "requiredLanguages must include \"en\"",
                "Course slugs are derived from the English title; add \"en\" to requiredLanguages",
            ));
        }

        if self
            .auth_token
            .as_deref()
            .is_some_and(|token| token.trim().is_empty())
        {
            return Err(AcademyError::config_validation(
                "authToken must not be blank",
                "Remove authToken to disable authentication, or set a non-empty token",
            ));
        }

        if self
            .data_file
            .as_deref()
            .is_some_and(|path| path.trim().is_empty())
        {
            return Err(AcademyError::config_validation(
                "dataFile must not be blank",
                "Remove dataFile to keep the catalog in memory, or provide a file path",
            ));
        }

        Ok(())
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            AcademyError::config_validation(
                format!("host '{}' is not a valid IP address", self.host),
                "Set host to an address such as 127.0.0.1 or 0.0.0.0",
            )
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
