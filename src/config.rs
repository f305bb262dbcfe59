use config::{Config as ConfigBuilder, ConfigError, Environment as EnvSource, File};
use serde::Deserialize;
use std::env;
use strum::Display;

use crate::routing::RoutingTable;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub notify: NotifyConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub columns: ColumnConfig,
    pub routing: RoutingConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which routing table is live. A config-time choice, never runtime-detected.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoutingEnvironment {
    Production,
    Testing,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    /// Recipient of the administrative error channel.
    pub admin_email: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_environment")]
    pub environment: RoutingEnvironment,
    /// Exact urgency string that makes an eligible request a broadcast.
    #[serde(default = "default_emergency_urgency")]
    pub emergency_urgency: String,
}

fn default_subject() -> String {
    "REQUEST TO SEE COUNSELOR".to_string()
}

fn default_environment() -> RoutingEnvironment {
    RoutingEnvironment::Testing
}

fn default_emergency_urgency() -> String {
    "Red (It is an emergency, I need you as soon as possible, safety concern.)".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default = "default_from_email")]
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_email() -> String {
    "noreply@school.example".to_string()
}

fn default_from_name() -> String {
    "Counselor Request Notifier".to_string()
}

/// 0-based positions of the named fields inside the submitted row.
///
/// Must be kept in lock-step with the upstream form layout; `validate`
/// catches duplicate or out-of-range indices at startup so schema drift
/// fails fast instead of silently misreading fields.
#[derive(Debug, Deserialize, Clone)]
pub struct ColumnConfig {
    #[serde(default = "default_col_student_email")]
    pub student_email: usize,
    #[serde(default = "default_col_counselor_name")]
    pub counselor_name: usize,
    #[serde(default = "default_col_student_id")]
    pub student_id: usize,
    #[serde(default = "default_col_last_name")]
    pub last_name: usize,
    #[serde(default = "default_col_first_name")]
    pub first_name: usize,
    #[serde(default = "default_col_reason")]
    pub reason: usize,
    #[serde(default = "default_col_urgency")]
    pub urgency: usize,
    #[serde(default = "default_col_person_completing")]
    pub person_completing: usize,
    #[serde(default = "default_col_description")]
    pub description: usize,
    /// Total width of a full form row, timestamp column included.
    #[serde(default = "default_expected_len")]
    pub expected_len: usize,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            student_email: default_col_student_email(),
            counselor_name: default_col_counselor_name(),
            student_id: default_col_student_id(),
            last_name: default_col_last_name(),
            first_name: default_col_first_name(),
            reason: default_col_reason(),
            urgency: default_col_urgency(),
            person_completing: default_col_person_completing(),
            description: default_col_description(),
            expected_len: default_expected_len(),
        }
    }
}

fn default_col_student_email() -> usize {
    1
}

fn default_col_counselor_name() -> usize {
    2
}

fn default_col_student_id() -> usize {
    3
}

fn default_col_last_name() -> usize {
    4
}

fn default_col_first_name() -> usize {
    5
}

fn default_col_reason() -> usize {
    6
}

fn default_col_urgency() -> usize {
    7
}

fn default_col_person_completing() -> usize {
    8
}

fn default_col_description() -> usize {
    9
}

fn default_expected_len() -> usize {
    10
}

impl ColumnConfig {
    fn indices(&self) -> [usize; 9] {
        [
            self.student_email,
            self.counselor_name,
            self.student_id,
            self.last_name,
            self.first_name,
            self.reason,
            self.urgency,
            self.person_completing,
            self.description,
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        let indices = self.indices();
        for (i, a) in indices.iter().enumerate() {
            if *a >= self.expected_len {
                return Err(format!(
                    "column index {} is outside the expected form width {}",
                    a, self.expected_len
                ));
            }
            if indices[i + 1..].contains(a) {
                return Err(format!("column index {} is assigned to two fields", a));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub counselor: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    pub production: Vec<RouteEntry>,
    pub testing: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsConfig {
    /// Counselor tracking sheets that carry the completed-request checkbox.
    #[serde(default)]
    pub names: Vec<String>,
    /// 1-based checkbox column, default 12 (column L).
    #[serde(default = "default_checkbox_column")]
    pub checkbox_column: u32,
    /// First row holding submission data; row 1 is the header.
    #[serde(default = "default_first_data_row")]
    pub first_data_row: u32,
    #[serde(default = "default_workbook_path")]
    pub workbook_path: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            checkbox_column: default_checkbox_column(),
            first_data_row: default_first_data_row(),
            workbook_path: default_workbook_path(),
        }
    }
}

fn default_checkbox_column() -> u32 {
    12
}

fn default_first_data_row() -> u32 {
    2
}

fn default_workbook_path() -> String {
    "counselor_sheets.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (COUNSELOR_NOTIFY__NOTIFY__ADMIN_EMAIL, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Config file is optional; defaults and env vars may be enough
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            EnvSource::with_prefix("COUNSELOR_NOTIFY")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Routes for the configured environment. Tables are never merged.
    pub fn active_routes(&self) -> &[RouteEntry] {
        match self.notify.environment {
            RoutingEnvironment::Production => &self.routing.production,
            RoutingEnvironment::Testing => &self.routing.testing,
        }
    }

    pub fn routing_table(&self) -> RoutingTable {
        RoutingTable::new(self.active_routes())
    }

    /// Validate configuration, failing fast on anything that would only
    /// surface mid-submission otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if !self.notify.admin_email.contains('@') {
            return Err("notify.admin_email must be a valid email address".to_string());
        }
        if self.notify.subject.trim().is_empty() {
            return Err("notify.subject must not be empty".to_string());
        }
        if self.notify.emergency_urgency.trim().is_empty() {
            return Err("notify.emergency_urgency must not be empty".to_string());
        }
        if self.active_routes().is_empty() {
            return Err(format!(
                "routing.{} has no entries",
                self.notify.environment
            ));
        }
        self.columns.validate()?;
        if self.sheets.checkbox_column == 0 {
            return Err("sheets.checkbox_column is 1-based and must be at least 1".to_string());
        }
        if self.sheets.first_data_row == 0 {
            return Err("sheets.first_data_row is 1-based and must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            notify: NotifyConfig {
                admin_email: "admin@school.example".to_string(),
                subject: default_subject(),
                environment: RoutingEnvironment::Testing,
                emergency_urgency: default_emergency_urgency(),
            },
            smtp: SmtpConfig::default(),
            columns: ColumnConfig::default(),
            routing: RoutingConfig {
                production: vec![RouteEntry {
                    counselor: "Gomez (Cas-Fl)".to_string(),
                    email: "wendy.gomez@school.example".to_string(),
                }],
                testing: vec![RouteEntry {
                    counselor: "Gomez (Cas-Fl)".to_string(),
                    email: "admin@school.example".to_string(),
                }],
            },
            sheets: SheetsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validation_bad_admin_email() {
        let mut config = test_config();
        config.notify.admin_email = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_active_routes() {
        let mut config = test_config();
        config.routing.testing.clear();
        assert!(config.validate().is_err());
        // The other environment's table must not paper over the hole
        assert!(!config.routing.production.is_empty());
    }

    #[test]
    fn test_validation_duplicate_column_index() {
        let mut config = test_config();
        config.columns.first_name = config.columns.last_name;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_column_outside_form_width() {
        let mut config = test_config();
        config.columns.description = config.columns.expected_len;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_active_routes_follow_environment() {
        let mut config = test_config();
        assert_eq!(
            config.active_routes()[0].email,
            "admin@school.example"
        );
        config.notify.environment = RoutingEnvironment::Production;
        assert_eq!(
            config.active_routes()[0].email,
            "wendy.gomez@school.example"
        );
    }
}
