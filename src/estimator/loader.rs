use crate::error::AppError;
use crate::estimator::tables::{
    default_condition_weights, default_cost_rows, CostRow, ReferenceCostTable,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Condition name -> risk weight, as stored on disk
pub type ConditionWeights = BTreeMap<String, f64>;

/// Supported reference data file formats, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Toml,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(DataFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(DataFormat::Toml),
            _ => Err(AppError::DataLoad(format!(
                "Unsupported data file format: {} (expected .json or .toml)",
                path.display()
            ))),
        }
    }
}

/// TOML layout of the cost table: a `[[costs]]` array of tables
#[derive(Debug, Serialize, Deserialize)]
struct CostTableFile {
    costs: Vec<CostRow>,
}

/// Both reference tables, ready to hand to the estimator
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub costs: ReferenceCostTable,
    pub weights: ConditionWeights,
}

/// Parse cost rows. Empty input yields no rows.
pub fn parse_cost_rows(content: &str, format: DataFormat) -> Result<Vec<CostRow>, AppError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    match format {
        DataFormat::Json => serde_json::from_str(content)
            .map_err(|e| AppError::DataLoad(format!("Failed to parse cost table JSON: {}", e))),
        DataFormat::Toml => toml::from_str::<CostTableFile>(content)
            .map(|file| file.costs)
            .map_err(|e| AppError::DataLoad(format!("Failed to parse cost table TOML: {}", e))),
    }
}

/// Parse condition weights. Negative or non-finite weights are rejected.
pub fn parse_condition_weights(
    content: &str,
    format: DataFormat,
) -> Result<ConditionWeights, AppError> {
    if content.trim().is_empty() {
        return Ok(ConditionWeights::new());
    }

    let weights: ConditionWeights = match format {
        DataFormat::Json => serde_json::from_str(content)
            .map_err(|e| AppError::DataLoad(format!("Failed to parse weights JSON: {}", e)))?,
        DataFormat::Toml => toml::from_str(content)
            .map_err(|e| AppError::DataLoad(format!("Failed to parse weights TOML: {}", e)))?,
    };

    for (condition, weight) in &weights {
        if !(weight.is_finite() && *weight >= 0.0) {
            return Err(AppError::DataLoad(format!(
                "Weight for '{}' must be a non-negative number, got {}",
                condition, weight
            )));
        }
    }

    Ok(weights)
}

pub fn render_cost_rows(rows: &[CostRow], format: DataFormat) -> Result<String, AppError> {
    match format {
        DataFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        DataFormat::Toml => toml::to_string_pretty(&CostTableFile {
            costs: rows.to_vec(),
        })
        .map_err(|e| AppError::DataLoad(format!("Failed to render cost table: {}", e))),
    }
}

pub fn render_condition_weights(
    weights: &ConditionWeights,
    format: DataFormat,
) -> Result<String, AppError> {
    match format {
        DataFormat::Json => Ok(serde_json::to_string_pretty(weights)?),
        DataFormat::Toml => toml::to_string_pretty(weights)
            .map_err(|e| AppError::DataLoad(format!("Failed to render weights: {}", e))),
    }
}

/// Read a data file, returning `None` when it does not exist
async fn read_optional(path: &Path) -> Result<Option<String>, AppError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::DataLoad(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

async fn write_file(path: &Path, content: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::DataLoad(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|e| AppError::DataLoad(format!("Failed to write {}: {}", path.display(), e)))
}

/// Load the regional cost table.
///
/// A missing or empty file yields the built-in table; with `write_defaults`
/// the built-in rows are also written to `path`. A malformed file is an error.
pub async fn load_cost_table(
    path: &Path,
    write_defaults: bool,
) -> Result<ReferenceCostTable, AppError> {
    let format = DataFormat::from_path(path)?;

    let rows = match read_optional(path).await? {
        Some(content) => parse_cost_rows(&content, format)?,
        None => Vec::new(),
    };

    if rows.is_empty() {
        warn!(path = %path.display(), "Cost table missing or empty, using built-in data");
        if write_defaults {
            write_file(path, &render_cost_rows(&default_cost_rows(), format)?).await?;
            info!(path = %path.display(), "Wrote built-in cost table");
        }
        return Ok(ReferenceCostTable::builtin());
    }

    let table = ReferenceCostTable::from_rows(rows)?;
    info!(path = %path.display(), rows = table.len(), "Loaded cost table");
    Ok(table)
}

/// Load chronic condition weights.
///
/// Unlike the cost table, a weights file that cannot be parsed is treated
/// like a missing one: the built-in weights are used (and written back when
/// `write_defaults` is set).
pub async fn load_condition_weights(
    path: &Path,
    write_defaults: bool,
) -> Result<ConditionWeights, AppError> {
    let format = DataFormat::from_path(path)?;

    let weights = match read_optional(path).await? {
        Some(content) => match parse_condition_weights(&content, format) {
            Ok(weights) => weights,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable condition weights");
                ConditionWeights::new()
            }
        },
        None => ConditionWeights::new(),
    };

    if weights.is_empty() {
        warn!(path = %path.display(), "Condition weights missing or empty, using built-in data");
        let defaults = default_condition_weights();
        if write_defaults {
            write_file(path, &render_condition_weights(&defaults, format)?).await?;
            info!(path = %path.display(), "Wrote built-in condition weights");
        }
        return Ok(defaults);
    }

    info!(path = %path.display(), conditions = weights.len(), "Loaded condition weights");
    Ok(weights)
}

pub async fn load_reference_data(
    costs_path: &Path,
    weights_path: &Path,
    write_defaults: bool,
) -> Result<ReferenceData, AppError> {
    let costs = load_cost_table(costs_path, write_defaults).await?;
    let weights = load_condition_weights(weights_path, write_defaults).await?;
    Ok(ReferenceData { costs, weights })
}

/// Write the built-in tables to disk. Existing files are kept unless `force`.
///
/// Returns the paths that were written.
pub async fn write_builtin_data(
    costs_path: &Path,
    weights_path: &Path,
    force: bool,
) -> Result<Vec<PathBuf>, AppError> {
    let mut written = Vec::new();

    let outputs = [
        (
            costs_path,
            render_cost_rows(&default_cost_rows(), DataFormat::from_path(costs_path)?)?,
        ),
        (
            weights_path,
            render_condition_weights(
                &default_condition_weights(),
                DataFormat::from_path(weights_path)?,
            )?,
        ),
    ];

    for (path, content) in outputs {
        let exists = tokio::fs::try_exists(path).await.map_err(|e| {
            AppError::DataLoad(format!("Failed to check {}: {}", path.display(), e))
        })?;
        if !force && exists {
            debug!(path = %path.display(), "Data file exists, skipping");
            continue;
        }
        write_file(path, &content).await?;
        written.push(path.to_path_buf());
    }

    Ok(written)
}
