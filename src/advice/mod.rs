//! Free-text recommendations from an external text-generation service
//!
//! The estimator never depends on this module. Callers hand the full
//! ordered calculation steps to an [`AdviceGenerator`] and use
//! [`recommend_or_fallback`] so that any failure degrades to a static
//! message instead of propagating.

pub mod gemini;
pub mod models;
pub mod prompt;

use crate::error::AppError;
use crate::estimator::CalculationStep;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::warn;

pub use gemini::GeminiAdvisor;
pub use prompt::build_prompt;

pub const FALLBACK_MESSAGE: &str = "Unable to generate recommendations at this time. \
     Please consult with your healthcare provider.";

/// Everything an advisor may use to tailor recommendations
#[derive(Debug, Clone, Copy)]
pub struct AdviceRequest<'a> {
    pub age: u32,
    pub region: &'a str,
    pub chronic_conditions: &'a [String],
    pub family_history: &'a [String],
    pub lifestyle_score: u8,
    pub has_insurance: bool,
    pub details: &'a [CalculationStep],
}

#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    async fn recommend(&self, request: &AdviceRequest<'_>) -> Result<Vec<String>, AppError>;
}

/// Ask the generator for recommendations, falling back to a static message
/// on any error or an empty answer.
pub async fn recommend_or_fallback(
    generator: &dyn AdviceGenerator,
    request: &AdviceRequest<'_>,
) -> Vec<String> {
    match generator.recommend(request).await {
        Ok(lines) if !lines.is_empty() => lines,
        Ok(_) => {
            warn!(advisor = generator.name(), "Advisor returned no recommendations");
            vec![FALLBACK_MESSAGE.to_string()]
        }
        Err(e) => {
            warn!(
                advisor = generator.name(),
                error = %e,
                kind = e.kind(),
                "Failed to generate recommendations"
            );
            vec![FALLBACK_MESSAGE.to_string()]
        }
    }
}

/// Split generated text into unique, non-empty recommendation lines.
///
/// Surrounding whitespace plus leading and trailing `-` and spaces are
/// stripped; first occurrence wins.
pub fn parse_recommendations(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut recommendations = Vec::new();

    for line in text.trim().lines() {
        let clean = line
            .trim_matches(|c: char| c == '-' || c == ' ')
            .trim();
        if clean.is_empty() {
            continue;
        }
        if seen.insert(clean.to_string()) {
            recommendations.push(clean.to_string());
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingAdvisor;

    #[async_trait]
    impl AdviceGenerator for FailingAdvisor {
        fn name(&self) -> &str {
            "failing"
        }

        async fn recommend(&self, _request: &AdviceRequest<'_>) -> Result<Vec<String>, AppError> {
            Err(AppError::EmptyResponse("failing".to_string()))
        }
    }

    struct FixedAdvisor(Vec<String>);

    #[async_trait]
    impl AdviceGenerator for FixedAdvisor {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn recommend(&self, request: &AdviceRequest<'_>) -> Result<Vec<String>, AppError> {
            assert!(!request.details.is_empty());
            Ok(self.0.clone())
        }
    }

    fn request_with<'a>(details: &'a [CalculationStep]) -> AdviceRequest<'a> {
        AdviceRequest {
            age: 40,
            region: "Asia",
            chronic_conditions: &[],
            family_history: &[],
            lifestyle_score: 5,
            has_insurance: false,
            details,
        }
    }

    #[test]
    fn test_parse_recommendations_dedupes_and_strips() {
        let text = "\n- Walk 30 minutes a day\n\n  - Eat five portions of vegetables -\n- Walk 30 minutes a day\n---\n";
        assert_eq!(
            parse_recommendations(text),
            vec![
                "Walk 30 minutes a day".to_string(),
                "Eat five portions of vegetables".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_recommendations_keeps_inner_markup() {
        assert_eq!(
            parse_recommendations("* **Screening**: annual HbA1c (ADA)"),
            vec!["* **Screening**: annual HbA1c (ADA)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_fallback_on_error() {
        let result = crate::estimator::CostEstimator::with_builtin_data().predict(
            40,
            "Asia",
            &[] as &[&str],
            &[],
            5,
            false,
        );
        let lines = recommend_or_fallback(&FailingAdvisor, &request_with(result.details())).await;
        assert_eq!(lines, vec![FALLBACK_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_fallback_on_empty_answer() {
        let result = crate::estimator::CostEstimator::with_builtin_data().predict(
            40,
            "Asia",
            &[] as &[&str],
            &[],
            5,
            false,
        );
        let lines =
            recommend_or_fallback(&FixedAdvisor(Vec::new()), &request_with(result.details())).await;
        assert_eq!(lines, vec![FALLBACK_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_recommendations_pass_through() {
        let result = crate::estimator::CostEstimator::with_builtin_data().predict(
            40,
            "Asia",
            &[] as &[&str],
            &[],
            5,
            false,
        );
        let advisor = FixedAdvisor(vec!["Get a yearly check-up".to_string()]);
        let lines = recommend_or_fallback(&advisor, &request_with(result.details())).await;
        assert_eq!(lines, vec!["Get a yearly check-up".to_string()]);
    }
}
