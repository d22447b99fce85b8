use crate::estimator::models::{format_amount, AgeBracket, EstimateResult, StepKind};
use crate::estimator::tables::{
    default_condition_weights, ConditionSources, ConditionWeightTable, FamilyHistoryRiskTable,
    ReferenceCostTable, DEFAULT_INSURANCE_SOURCE, DEFAULT_LIFESTYLE_SOURCE,
    INTERNAL_CALCULATION_SOURCE, NO_DATA_SOURCE,
};
use crate::estimator::trail::AuditTrail;
use crate::lifestyle::MAX_SCORE;
use tracing::debug;

pub const DEFAULT_DISCOUNT_RATE: f64 = 0.30;

/// Risk added per lifestyle point below the maximum
pub const LIFESTYLE_RISK_PER_POINT: f64 = 0.03;

/// Rule-based annual cost estimator.
///
/// Holds its reference tables for its whole lifetime and never mutates
/// them, so one instance can serve any number of concurrent `predict` calls.
#[derive(Debug, Clone)]
pub struct CostEstimator {
    costs: ReferenceCostTable,
    weights: ConditionWeightTable,
    condition_sources: ConditionSources,
    family_history: FamilyHistoryRiskTable,
    lifestyle_source: String,
    insurance_source: String,
    discount_rate: f64,
}

/// Builder for [`CostEstimator`] overrides
#[derive(Debug, Clone)]
pub struct EstimatorBuilder {
    costs: ReferenceCostTable,
    weights: Vec<(String, f64)>,
    condition_sources: ConditionSources,
    family_history: FamilyHistoryRiskTable,
    lifestyle_source: String,
    insurance_source: String,
    discount_rate: f64,
}

impl EstimatorBuilder {
    /// Replace the condition citation map
    pub fn condition_sources(mut self, sources: ConditionSources) -> Self {
        self.condition_sources = sources;
        self
    }

    /// Replace the family history risk table
    pub fn family_history(mut self, table: FamilyHistoryRiskTable) -> Self {
        self.family_history = table;
        self
    }

    /// Set the source cited on the lifestyle step
    pub fn lifestyle_source(mut self, source: impl Into<String>) -> Self {
        self.lifestyle_source = source.into();
        self
    }

    /// Set the source cited on the base cost and insurance steps
    pub fn insurance_source(mut self, source: impl Into<String>) -> Self {
        self.insurance_source = source.into();
        self
    }

    /// Set the insurance discount, a fraction in [0, 1]
    pub fn discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    /// Create the estimator, attaching a source to every condition weight
    pub fn build(self) -> CostEstimator {
        let weights = ConditionWeightTable::from_weights(self.weights, &self.condition_sources);
        CostEstimator {
            costs: self.costs,
            weights,
            condition_sources: self.condition_sources,
            family_history: self.family_history,
            lifestyle_source: self.lifestyle_source,
            insurance_source: self.insurance_source,
            discount_rate: self.discount_rate,
        }
    }
}

impl CostEstimator {
    /// Start a builder from the two reference tables
    pub fn builder(
        costs: ReferenceCostTable,
        weights: impl IntoIterator<Item = (String, f64)>,
    ) -> EstimatorBuilder {
        EstimatorBuilder {
            costs,
            weights: weights.into_iter().collect(),
            condition_sources: ConditionSources::default(),
            family_history: FamilyHistoryRiskTable::default(),
            lifestyle_source: DEFAULT_LIFESTYLE_SOURCE.to_string(),
            insurance_source: DEFAULT_INSURANCE_SOURCE.to_string(),
            discount_rate: DEFAULT_DISCOUNT_RATE,
        }
    }

    /// Create a new estimator with default sources, family history and discount
    pub fn new(
        costs: ReferenceCostTable,
        weights: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        Self::builder(costs, weights).build()
    }

    /// Estimator over the built-in data set
    pub fn with_builtin_data() -> Self {
        Self::new(ReferenceCostTable::builtin(), default_condition_weights())
    }

    pub fn costs(&self) -> &ReferenceCostTable {
        &self.costs
    }

    pub fn weights(&self) -> &ConditionWeightTable {
        &self.weights
    }

    pub fn family_history(&self) -> &FamilyHistoryRiskTable {
        &self.family_history
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    /// Estimate annual cost and record how it was derived.
    ///
    /// Never fails: a missing region/bracket falls back to the table mean,
    /// unknown conditions weigh zero and unknown family-history terms are
    /// skipped.
    pub fn predict<S: AsRef<str>>(
        &self,
        age: u32,
        region: &str,
        chronic_conditions: &[S],
        family_history: &[S],
        lifestyle_score: u8,
        has_insurance: bool,
    ) -> EstimateResult {
        let mut trail = AuditTrail::new();

        // Base cost for the region and age bracket, or the table mean
        let bracket = AgeBracket::for_age(age);
        let base_cost = self.base_cost(region, bracket);
        trail.record(
            StepKind::BaseCost,
            format!("Region: {}, Age Group: {}", region, bracket),
            base_cost,
            self.insurance_source.as_str(),
        );

        // Additive risk factors
        let chronic_risk = self.record_chronic_conditions(&mut trail, chronic_conditions);
        let family_risk = self.record_family_history(&mut trail, family_history);

        let lifestyle_risk = lifestyle_risk(lifestyle_score);
        trail.record(
            StepKind::LifestyleScore,
            format!("Score: {}/10 -> Risk: +{:.2}", lifestyle_score, lifestyle_risk),
            lifestyle_risk,
            self.lifestyle_source.as_str(),
        );

        let total_risk = chronic_risk + family_risk + lifestyle_risk;
        trail.record(
            StepKind::TotalRiskFactor,
            "Sum of all risk factors (Chronic Conditions + Family History + Lifestyle)",
            total_risk,
            INTERNAL_CALCULATION_SOURCE,
        );

        // Apply risk to the base cost
        let pre_cost = base_cost * (1.0 + total_risk);
        trail.record(
            StepKind::CostBeforeInsurance,
            format!(
                "Base Cost (${}) x (1 + Total Risk {:.2})",
                format_amount(base_cost),
                total_risk
            ),
            pre_cost,
            INTERNAL_CALCULATION_SOURCE,
        );

        // Insurance discount (the step is recorded either way)
        let (final_cost, description) = if has_insurance {
            (
                pre_cost * (1.0 - self.discount_rate),
                format!(
                    "Applied {:.0}% discount for insurance",
                    self.discount_rate * 100.0
                ),
            )
        } else {
            (pre_cost, "No insurance discount applied".to_string())
        };
        trail.record(
            StepKind::InsuranceDiscount,
            description,
            final_cost,
            self.insurance_source.as_str(),
        );

        debug!(
            region = region,
            age_group = %bracket,
            total_risk,
            final_cost,
            steps = trail.len(),
            "Estimate computed"
        );

        trail.finish(final_cost)
    }

    fn base_cost(&self, region: &str, bracket: AgeBracket) -> f64 {
        match self.costs.get(region, bracket) {
            Some(cost) => cost,
            None => {
                debug!(
                    region = region,
                    age_group = %bracket,
                    mean = self.costs.mean(),
                    "No cost row, falling back to table mean"
                );
                self.costs.mean()
            }
        }
    }

    fn record_chronic_conditions<S: AsRef<str>>(
        &self,
        trail: &mut AuditTrail,
        conditions: &[S],
    ) -> f64 {
        if conditions.is_empty() {
            return 0.0;
        }

        let mut total = 0.0;
        let mut parts = Vec::with_capacity(conditions.len());
        let mut sources = Vec::with_capacity(conditions.len());

        for condition in conditions {
            let name = condition.as_ref();
            let (risk, source) = self.weights.resolve(name);
            if source == NO_DATA_SOURCE {
                debug!(condition = name, "Unknown chronic condition, weight 0");
            }
            total += risk;
            parts.push(format!("{}: +{:.2} (Source: {})", name, risk, source));
            sources.push(source);
        }

        trail.record(
            StepKind::ChronicConditions,
            parts.join(", "),
            total,
            sources.join("; "),
        );
        total
    }

    fn record_family_history<S: AsRef<str>>(&self, trail: &mut AuditTrail, terms: &[S]) -> f64 {
        let mut total = 0.0;
        let mut parts = Vec::new();
        let mut sources = Vec::new();

        for term in terms {
            let name = term.as_ref();
            let Some(risk) = self.family_history.get(name) else {
                continue;
            };
            let source = self.condition_sources.attribution(name);
            total += risk;
            parts.push(format!("{}: +{:.2} (Source: {})", name, risk, source));
            sources.push(source);
        }

        if !parts.is_empty() {
            trail.record(
                StepKind::FamilyHistory,
                parts.join(", "),
                total,
                sources.join("; "),
            );
        }
        total
    }
}

/// Risk contributed by a lifestyle score: 0.03 per point below 10
pub fn lifestyle_risk(score: u8) -> f64 {
    f64::from(i32::from(MAX_SCORE) - i32::from(score)) * LIFESTYLE_RISK_PER_POINT
}
