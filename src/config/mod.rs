#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::DEFAULT_COLUMNS;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://spanner.googleapis.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub database: DatabaseConfig,
    pub source: SourceConfig,
    pub destination: DestinationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub endpoint: String,
    pub project_id: String,
    pub instance_id: String,
    pub database_id: String,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: "demo-project".to_string(),
            instance_id: "demo-spanner".to_string(),
            database_id: "demo-spanner-db".to_string(),
            access_token: None,
            timeout_seconds: None,
        }
    }
}

impl DatabaseConfig {
    /// `projects/{p}/instances/{i}/databases/{d}`
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project_id, self.instance_id, self.database_id
        )
    }

    /// The configured token, unless it is blank or an unresolved `${VAR}`.
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty() && !(token.starts_with("${") && token.ends_with('}')))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("activity_data.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    pub table: String,
    pub columns: Vec<String>,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            table: "account_activity_raw".to_string(),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl LoaderConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the variable's value. Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }
}

impl Validate for LoaderConfig {
    fn validate(&self) -> Result<()> {
        let db = &self.database;
        validation::validate_url("database.endpoint", &db.endpoint)?;
        validation::validate_non_empty_string("database.project_id", &db.project_id)?;
        validation::validate_non_empty_string("database.instance_id", &db.instance_id)?;
        validation::validate_non_empty_string("database.database_id", &db.database_id)?;
        if let Some(timeout) = db.timeout_seconds {
            validation::validate_range("database.timeout_seconds", timeout, 1, 3600)?;
        }

        let path = self.source.path.to_str().ok_or_else(|| EtlError::ConfigValidationError {
            field: "source.path".to_string(),
            message: "Path is not valid UTF-8".to_string(),
        })?;
        validation::validate_path("source.path", path)?;

        validation::validate_non_empty_string("destination.table", &self.destination.table)?;
        validation::validate_unique_names("destination.columns", &self.destination.columns)?;

        Ok(())
    }
}
