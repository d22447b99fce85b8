pub mod calculator;
pub mod loader;
pub mod models;
pub mod tables;
pub mod trail;

pub use calculator::{CostEstimator, EstimatorBuilder, DEFAULT_DISCOUNT_RATE};
pub use loader::{load_reference_data, write_builtin_data, ConditionWeights, ReferenceData};
pub use models::{AgeBracket, CalculationStep, EstimateResult, StepKind};
pub use tables::{
    ConditionSources, ConditionWeightTable, CostRow, FamilyHistoryRiskTable, ReferenceCostTable,
};
pub use trail::AuditTrail;
