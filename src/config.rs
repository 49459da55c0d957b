//! Exporter Configuration
//!
//! Filers are listed in a YAML file:
//!
//! ```yaml
//! filers:
//!   - name: stnpca1-qa-de-1
//!     host: stnpca1-qa-de-1.example.com
//!     username: monitor
//!     vserver: ma_vs1
//! ```
//!
//! A password missing from the file is read from `FILER_<NAME>_PASSWORD`,
//! with the filer name upper-cased and non-alphanumerics replaced by `_`.

use crate::error::{Error, Result};
use crate::filer::query::VserverFilter;
use crate::ontap::OntapConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// One filer to poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilerConfig {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Restrict polling to one virtual server by name
    #[serde(default)]
    pub vserver: Option<String>,
    /// Restrict polling to one virtual server by UUID; wins over `vserver`
    #[serde(default)]
    pub vserver_uuid: Option<String>,
    /// Skip TLS certificate verification
    #[serde(default = "default_insecure_tls")]
    pub insecure_tls: bool,
    /// Per-page request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_insecure_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl FilerConfig {
    /// Environment variable consulted for a missing password
    pub fn password_env_var(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("FILER_{}_PASSWORD", name)
    }

    /// Vserver scope of this filer's listing
    pub fn vserver_filter(&self) -> Option<VserverFilter> {
        match (&self.vserver_uuid, &self.vserver) {
            (Some(uuid), _) => Some(VserverFilter::Uuid(uuid.clone())),
            (None, Some(name)) => Some(VserverFilter::Name(name.clone())),
            (None, None) => None,
        }
    }

    /// Connection settings for this filer
    pub fn connection(&self) -> OntapConfig {
        OntapConfig {
            host: self.host.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            insecure_tls: self.insecure_tls,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    pub filers: Vec<FilerConfig>,
}

impl ExporterConfig {
    /// Load, fill in passwords from the environment, and validate
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&text)
    }

    /// Parse from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        let mut config: ExporterConfig = serde_yaml::from_str(text)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        for filer in self.filers.iter_mut().filter(|f| f.password.is_empty()) {
            if let Ok(password) = std::env::var(filer.password_env_var()) {
                filer.password = password;
            }
        }
    }

    /// Reject empty or duplicate names and empty hosts
    pub fn validate(&self) -> Result<()> {
        if self.filers.is_empty() {
            return Err(Error::Configuration("No filers configured".into()));
        }

        let mut names = HashSet::new();
        for filer in &self.filers {
            if filer.name.trim().is_empty() {
                return Err(Error::Configuration("Filer with empty name".into()));
            }
            if filer.host.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "Filer {} has no host",
                    filer.name
                )));
            }
            if !names.insert(filer.name.as_str()) {
                return Err(Error::Configuration(format!(
                    "Duplicate filer name: {}",
                    filer.name
                )));
            }
        }
        Ok(())
    }
}
