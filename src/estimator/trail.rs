use crate::estimator::models::{CalculationStep, EstimateResult, StepKind};

/// Append-only record of calculation steps for a single estimate.
///
/// Steps keep the order they were recorded in; the trail is consumed when
/// the estimate is finalized.
#[derive(Debug, Default)]
pub struct AuditTrail {
    steps: Vec<CalculationStep>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self {
            steps: Vec::with_capacity(7),
        }
    }

    pub fn record(
        &mut self,
        kind: StepKind,
        description: impl Into<String>,
        value: f64,
        source: impl Into<String>,
    ) -> &mut Self {
        self.steps.push(CalculationStep {
            kind,
            description: description.into(),
            value,
            source: source.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Seal the trail into a result with the given (unrounded) final cost
    pub fn finish(self, final_cost: f64) -> EstimateResult {
        EstimateResult::new(final_cost, self.steps)
    }
}
