use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Age bracket used to key the reference cost table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "30-39")]
    Thirties,
    #[serde(rename = "40-49")]
    Forties,
    #[serde(rename = "50-59")]
    Fifties,
    #[serde(rename = "60+")]
    SixtyPlus,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::Thirties,
        AgeBracket::Forties,
        AgeBracket::Fifties,
        AgeBracket::SixtyPlus,
    ];

    /// Map an age to its bracket. Anything under 40 lands in the first bracket.
    pub fn for_age(age: u32) -> Self {
        match age {
            a if a < 40 => AgeBracket::Thirties,
            a if a < 50 => AgeBracket::Forties,
            a if a < 60 => AgeBracket::Fifties,
            _ => AgeBracket::SixtyPlus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::Thirties => "30-39",
            AgeBracket::Forties => "40-49",
            AgeBracket::Fifties => "50-59",
            AgeBracket::SixtyPlus => "60+",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeBracket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeBracket::ALL
            .into_iter()
            .find(|b| b.label() == s.trim())
            .ok_or_else(|| format!("unknown age group '{}'", s))
    }
}

/// Named step of the calculation, in the order they are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    #[serde(rename = "Base Cost")]
    BaseCost,
    #[serde(rename = "Chronic Conditions")]
    ChronicConditions,
    #[serde(rename = "Family History")]
    FamilyHistory,
    #[serde(rename = "Lifestyle Score")]
    LifestyleScore,
    #[serde(rename = "Total Risk Factor")]
    TotalRiskFactor,
    #[serde(rename = "Cost Before Insurance")]
    CostBeforeInsurance,
    #[serde(rename = "Insurance Discount")]
    InsuranceDiscount,
}

impl StepKind {
    pub fn name(&self) -> &'static str {
        match self {
            StepKind::BaseCost => "Base Cost",
            StepKind::ChronicConditions => "Chronic Conditions",
            StepKind::FamilyHistory => "Family History",
            StepKind::LifestyleScore => "Lifestyle Score",
            StepKind::TotalRiskFactor => "Total Risk Factor",
            StepKind::CostBeforeInsurance => "Cost Before Insurance",
            StepKind::InsuranceDiscount => "Insurance Discount",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One audited step of an estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    #[serde(rename = "step")]
    pub kind: StepKind,
    pub description: String,
    pub value: f64,
    pub source: String,
}

impl CalculationStep {
    pub fn step_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Result of a single estimate: the rounded cost and the ordered audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    final_cost: f64,
    details: Vec<CalculationStep>,
}

impl EstimateResult {
    pub(crate) fn new(final_cost: f64, details: Vec<CalculationStep>) -> Self {
        Self {
            final_cost: round_cents(final_cost),
            details,
        }
    }

    /// Final cost, rounded to two decimals
    pub fn final_cost(&self) -> f64 {
        self.final_cost
    }

    /// Calculation steps in the order they were computed
    pub fn details(&self) -> &[CalculationStep] {
        &self.details
    }

    /// First step of the given kind, if recorded
    pub fn step(&self, kind: StepKind) -> Option<&CalculationStep> {
        self.details.iter().find(|s| s.kind == kind)
    }
}

/// Round to two decimal places, exact ties going to the even cent
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Format an amount as `1,234.56`
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}
