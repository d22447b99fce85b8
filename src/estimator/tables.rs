//! Reference tables consumed by the estimator
//!
//! All tables are built once and never mutated afterwards.

use crate::error::AppError;
use crate::estimator::models::AgeBracket;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

pub const DEFAULT_LIFESTYLE_SOURCE: &str =
    "https://www.who.int/data/gho/data/themes/topics/health-behaviours";
pub const DEFAULT_INSURANCE_SOURCE: &str = "https://www.oecd.org/health/health-data.htm";
pub const GENERAL_RESEARCH_SOURCE: &str = "General medical research data";
pub const NO_DATA_SOURCE: &str = "Data not available";
pub const INTERNAL_CALCULATION_SOURCE: &str = "Internal Model Calculation";

/// One row of the regional cost reference data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub region: String,
    pub age_group: AgeBracket,
    pub base_cost: f64,
}

impl CostRow {
    pub fn new(region: impl Into<String>, age_group: AgeBracket, base_cost: f64) -> Self {
        Self {
            region: region.into(),
            age_group,
            base_cost,
        }
    }
}

/// Base annual cost by region and age bracket
#[derive(Debug, Clone)]
pub struct ReferenceCostTable {
    rows: Vec<CostRow>,
    index: HashMap<(String, AgeBracket), f64>,
    mean: f64,
}

impl ReferenceCostTable {
    /// Build the table. Rejects empty input and non-positive costs.
    ///
    /// If a (region, bracket) pair repeats, the first row answers lookups
    /// while every row still counts towards the mean.
    pub fn from_rows(rows: Vec<CostRow>) -> Result<Self, AppError> {
        if rows.is_empty() {
            return Err(AppError::DataLoad(
                "cost table must contain at least one row".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(rows.len());
        let mut sum = 0.0;

        for row in &rows {
            if !(row.base_cost.is_finite() && row.base_cost > 0.0) {
                return Err(AppError::DataLoad(format!(
                    "base cost for {} / {} must be positive, got {}",
                    row.region, row.age_group, row.base_cost
                )));
            }

            sum += row.base_cost;

            let key = (row.region.clone(), row.age_group);
            if index.contains_key(&key) {
                warn!(
                    region = %row.region,
                    age_group = %row.age_group,
                    "Duplicate cost row ignored for lookup"
                );
                continue;
            }
            index.insert(key, row.base_cost);
        }

        let mean = sum / rows.len() as f64;

        Ok(Self { rows, index, mean })
    }

    /// Exact lookup, without fallback
    pub fn get(&self, region: &str, bracket: AgeBracket) -> Option<f64> {
        self.index.get(&(region.to_string(), bracket)).copied()
    }

    /// Unweighted mean over every row
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn rows(&self) -> &[CostRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Built-in regional data set
    pub fn builtin() -> Self {
        let rows = default_cost_rows();
        let sum: f64 = rows.iter().map(|r| r.base_cost).sum();
        let mean = sum / rows.len() as f64;
        let index = rows
            .iter()
            .map(|r| ((r.region.clone(), r.age_group), r.base_cost))
            .collect();
        Self { rows, index, mean }
    }
}

/// The 16 built-in rows: four regions across the four brackets
pub fn default_cost_rows() -> Vec<CostRow> {
    let regions: [(&str, [f64; 4]); 4] = [
        ("USA", [2000.0, 3000.0, 4000.0, 6000.0]),
        ("Europe", [1500.0, 2250.0, 3000.0, 4500.0]),
        ("Asia", [1000.0, 1500.0, 2000.0, 3000.0]),
        ("Turkey", [800.0, 1200.0, 1600.0, 2400.0]),
    ];

    regions
        .iter()
        .flat_map(|(region, costs)| {
            AgeBracket::ALL
                .iter()
                .zip(costs.iter())
                .map(move |(bracket, cost)| CostRow::new(*region, *bracket, *cost))
        })
        .collect()
}

/// The 8 built-in chronic condition weights
pub fn default_condition_weights() -> BTreeMap<String, f64> {
    [
        ("diabetes", 0.96),
        ("hypertension", 0.72),
        ("heart_disease", 1.20),
        ("asthma", 0.33),
        ("cancer", 1.44),
        ("copd", 0.96),
        ("depression", 0.48),
        ("obesity", 0.72),
    ]
    .into_iter()
    .map(|(name, weight)| (name.to_string(), weight))
    .collect()
}

/// Citation for each known condition, keyed by lower-cased name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSources(BTreeMap<String, String>);

impl ConditionSources {
    pub fn new(sources: impl IntoIterator<Item = (String, String)>) -> Self {
        Self(
            sources
                .into_iter()
                .map(|(name, source)| (name.to_lowercase(), source))
                .collect(),
        )
    }

    /// Citation for a condition, or the general research attribution
    pub fn attribution(&self, condition: &str) -> &str {
        self.0
            .get(&condition.to_lowercase())
            .map(String::as_str)
            .unwrap_or(GENERAL_RESEARCH_SOURCE)
    }

    /// Overlay extra citations; entries in `overrides` win.
    pub fn merged(mut self, overrides: impl IntoIterator<Item = (String, String)>) -> Self {
        for (name, source) in overrides {
            self.0.insert(name.to_lowercase(), source);
        }
        self
    }
}

impl Default for ConditionSources {
    fn default() -> Self {
        Self::new(
            [
                ("diabetes", "https://www.cdc.gov/diabetes/data/statistics-report/index.html"),
                ("hypertension", "https://www.heart.org/en/health-topics/high-blood-pressure"),
                (
                    "heart_disease",
                    "https://www.heart.org/en/health-topics/consumer-healthcare/what-is-cardiovascular-disease",
                ),
                ("asthma", "https://www.lung.org/lung-health-diseases/lung-disease-lookup/asthma"),
                (
                    "cancer",
                    "https://www.cancer.org/cancer/cancer-basics/cancer-facts-and-figures.html",
                ),
                ("copd", "https://www.lung.org/lung-health-diseases/lung-disease-lookup/copd"),
                ("depression", "https://www.nimh.nih.gov/health/statistics/major-depression"),
                ("obesity", "https://www.cdc.gov/obesity/data/index.html"),
            ]
            .into_iter()
            .map(|(name, source)| (name.to_string(), source.to_string())),
        )
    }
}

/// Risk weight with its attribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionWeight {
    pub risk_value: f64,
    pub source: String,
}

/// Chronic condition risk weights, keyed by lower-cased name
#[derive(Debug, Clone, Default)]
pub struct ConditionWeightTable {
    weights: BTreeMap<String, ConditionWeight>,
}

impl ConditionWeightTable {
    /// Attach a source to every weight. Conditions missing from `sources`
    /// are attributed to general medical research.
    pub fn from_weights(
        weights: impl IntoIterator<Item = (String, f64)>,
        sources: &ConditionSources,
    ) -> Self {
        let weights = weights
            .into_iter()
            .map(|(name, risk_value)| {
                let key = name.to_lowercase();
                let source = sources.attribution(&key).to_string();
                (key, ConditionWeight { risk_value, source })
            })
            .collect();
        Self { weights }
    }

    pub fn get(&self, condition: &str) -> Option<&ConditionWeight> {
        self.weights.get(&condition.to_lowercase())
    }

    /// Weight and source for a condition; unknown names weigh nothing.
    pub fn resolve(&self, condition: &str) -> (f64, &str) {
        match self.get(condition) {
            Some(w) => (w.risk_value, w.source.as_str()),
            None => (0.0, NO_DATA_SOURCE),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionWeight)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Additive risk for conditions present in the family history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyHistoryRiskTable(BTreeMap<String, f64>);

impl FamilyHistoryRiskTable {
    pub fn new(risks: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self(
            risks
                .into_iter()
                .map(|(name, risk)| (name.to_lowercase(), risk))
                .collect(),
        )
    }

    pub fn get(&self, condition: &str) -> Option<f64> {
        self.0.get(&condition.to_lowercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for FamilyHistoryRiskTable {
    fn default() -> Self {
        Self::new(
            [("cancer", 0.15), ("heart_disease", 0.20), ("diabetes", 0.15)]
                .into_iter()
                .map(|(name, risk)| (name.to_string(), risk)),
        )
    }
}
