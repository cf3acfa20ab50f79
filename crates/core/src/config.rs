use crate::types::StaffParams;
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `KOL_PLANNER__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub staff: StaffConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// ─── Planner Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Optional TOML/JSON catalog file; the built-in benchmark table is used otherwise.
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default = "default_budget")]
    pub default_budget: f64,
    #[serde(default = "default_content_units")]
    pub default_content_units: u32,
    #[serde(default = "default_max_content_units")]
    pub max_content_units: u32,
    /// Working hours of one full-time employee per month.
    #[serde(default = "default_full_time_hours")]
    pub full_time_hours_per_month: f64,
}

fn default_budget() -> f64 { 22_000.0 }
fn default_content_units() -> u32 { 1 }
fn default_max_content_units() -> u32 { 5 }
fn default_full_time_hours() -> f64 { 160.0 }

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            default_budget: default_budget(),
            default_content_units: default_content_units(),
            max_content_units: default_max_content_units(),
            full_time_hours_per_month: default_full_time_hours(),
        }
    }
}

// ─── Staff Config ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct StaffConfig {
    #[serde(default = "default_hourly_rate")]
    pub hourly_rate: f64,
    #[serde(default = "default_setup_hours")]
    pub setup_hours_per_offer: f64,
    #[serde(default = "default_manage_hours")]
    pub manage_hours_per_content_unit: f64,
}

fn default_hourly_rate() -> f64 { 20.0 }
fn default_setup_hours() -> f64 { 2.0 }
fn default_manage_hours() -> f64 { 1.5 }

impl Default for StaffConfig {
    fn default() -> Self {
        Self {
            hourly_rate: default_hourly_rate(),
            setup_hours_per_offer: default_setup_hours(),
            manage_hours_per_content_unit: default_manage_hours(),
        }
    }
}

impl StaffConfig {
    pub fn params(&self) -> StaffParams {
        StaffParams {
            hourly_rate: self.hourly_rate,
            setup_hours_per_offer: self.setup_hours_per_offer,
            manage_hours_per_content_unit: self.manage_hours_per_content_unit,
        }
    }
}

// Default functions
fn default_node_id() -> String {
    "planner-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            planner: PlannerConfig::default(),
            staff: StaffConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("KOL_PLANNER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
