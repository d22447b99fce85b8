use crate::estimator::{ConditionSources, FamilyHistoryRiskTable, DEFAULT_DISCOUNT_RATE};
use crate::estimator::tables::{DEFAULT_INSURANCE_SOURCE, DEFAULT_LIFESTYLE_SOURCE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `HEALTH_COST__ADVICE__API_KEY`
pub const ENV_PREFIX: &str = "HEALTH_COST";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub advice: AdviceConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
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

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_costs_path")]
    pub costs_path: PathBuf,
    #[serde(default = "default_weights_path")]
    pub weights_path: PathBuf,
    /// Write the built-in tables to the paths above when the files are missing
    #[serde(default = "default_true")]
    pub write_defaults: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            costs_path: default_costs_path(),
            weights_path: default_weights_path(),
            write_defaults: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EstimatorConfig {
    #[serde(default = "default_discount_rate")]
    pub insurance_discount_rate: f64,
    #[serde(default = "default_lifestyle_source")]
    pub lifestyle_source: String,
    #[serde(default = "default_insurance_source")]
    pub insurance_source: String,
    /// Replaces the built-in family history risks when set
    #[serde(default)]
    pub family_history: Option<BTreeMap<String, f64>>,
    /// Merged over the built-in condition citations
    #[serde(default)]
    pub condition_sources: BTreeMap<String, String>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            insurance_discount_rate: default_discount_rate(),
            lifestyle_source: default_lifestyle_source(),
            insurance_source: default_insurance_source(),
            family_history: None,
            condition_sources: BTreeMap::new(),
        }
    }
}

impl EstimatorConfig {
    pub fn family_history_table(&self) -> FamilyHistoryRiskTable {
        match &self.family_history {
            Some(risks) => FamilyHistoryRiskTable::new(risks.clone()),
            None => FamilyHistoryRiskTable::default(),
        }
    }

    pub fn condition_source_map(&self) -> ConditionSources {
        let mut sources = ConditionSources::default();
        if !self.condition_sources.is_empty() {
            sources = sources.merged(self.condition_sources.clone());
        }
        sources
    }
}

/// Gemini text generation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdviceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            timeout_seconds: default_timeout(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_report_dir")]
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_report_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_costs_path() -> PathBuf {
    PathBuf::from("data/health_costs_by_region.json")
}

fn default_weights_path() -> PathBuf {
    PathBuf::from("data/chronic_condition_weights.json")
}

fn default_true() -> bool {
    true
}

fn default_discount_rate() -> f64 {
    DEFAULT_DISCOUNT_RATE
}

fn default_lifestyle_source() -> String {
    DEFAULT_LIFESTYLE_SOURCE.to_string()
}

fn default_insurance_source() -> String {
    DEFAULT_INSURANCE_SOURCE.to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// Load configuration: built-in defaults, then the optional TOML file, then
/// `HEALTH_COST__*` environment variables.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    match cfg.logging.format.as_str() {
        "pretty" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}': expected 'pretty' or 'json'", other),
    }

    let rate = cfg.estimator.insurance_discount_rate;
    if !(0.0..=1.0).contains(&rate) {
        anyhow::bail!("Insurance discount rate must be between 0 and 1, got {}", rate);
    }

    if let Some(risks) = &cfg.estimator.family_history {
        for (condition, risk) in risks {
            if !(risk.is_finite() && *risk >= 0.0) {
                anyhow::bail!(
                    "Family history risk for '{}' must be non-negative, got {}",
                    condition,
                    risk
                );
            }
        }
    }

    if cfg.advice.enabled {
        if cfg.advice.api_key.trim().is_empty() {
            anyhow::bail!("Advice is enabled but no API key is configured");
        }
        if cfg.advice.base_url.trim().is_empty() {
            anyhow::bail!("Advice base_url cannot be empty");
        }
        if cfg.advice.model.trim().is_empty() {
            anyhow::bail!("Advice model cannot be empty");
        }
        if cfg.advice.timeout_seconds == 0 {
            anyhow::bail!("Advice timeout_seconds must be greater than 0");
        }
    }

    Ok(())
}
