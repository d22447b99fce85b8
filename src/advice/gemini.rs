use crate::advice::models::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::advice::{build_prompt, parse_recommendations, AdviceGenerator, AdviceRequest};
use crate::config::AdviceConfig;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Recommendations from the Gemini `generateContent` API
pub struct GeminiAdvisor {
    client: Client,
    config: AdviceConfig,
}

impl GeminiAdvisor {
    pub fn new(config: AdviceConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(self.config.temperature),
            top_p: Some(self.config.top_p),
            top_k: Some(self.config.top_k),
        }
    }

    /// Call Generate Content and return the raw text of the first candidate.
    /// Model name is part of the URL path.
    pub async fn generate_content(&self, prompt: String) -> Result<String, AppError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let request = GenerateContentRequest::from_prompt(prompt, Some(self.generation_config()));

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError {
                status,
                message: error_text,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        body.text()
            .ok_or_else(|| AppError::EmptyResponse(format!("gemini/{}", self.config.model)))
    }
}

#[async_trait]
impl AdviceGenerator for GeminiAdvisor {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn recommend(&self, request: &AdviceRequest<'_>) -> Result<Vec<String>, AppError> {
        let prompt = build_prompt(request);
        debug!(model = %self.config.model, prompt_len = prompt.len(), "Requesting recommendations");

        let text = self.generate_content(prompt).await?;
        let recommendations = parse_recommendations(&text);

        info!(
            model = %self.config.model,
            count = recommendations.len(),
            "Received recommendations"
        );
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::CostEstimator;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(base_url: String) -> AdviceConfig {
        AdviceConfig {
            enabled: true,
            api_key: "test-key".to_string(),
            base_url,
            model: "gemini-test".to_string(),
            timeout_seconds: 5,
            ..AdviceConfig::default()
        }
    }

    async fn recommend_against(server: &MockServer) -> Result<Vec<String>, AppError> {
        let advisor = GeminiAdvisor::new(create_test_config(server.uri())).unwrap();
        let conditions = vec!["asthma".to_string()];
        let family = vec!["cancer".to_string()];
        let result = CostEstimator::with_builtin_data().predict(
            44,
            "Europe",
            conditions.as_slice(),
            family.as_slice(),
            6,
            true,
        );
        let request = AdviceRequest {
            age: 44,
            region: "Europe",
            chronic_conditions: &conditions,
            family_history: &family,
            lifestyle_score: 6,
            has_insurance: true,
            details: result.details(),
        };
        advisor.recommend(&request).await
    }

    #[tokio::test]
    async fn test_recommend_parses_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"topK": 40}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "- Use a peak flow meter daily\n- Schedule a mammogram\n- Use a peak flow meter daily"}]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lines = recommend_against(&server).await.unwrap();
        assert_eq!(
            lines,
            vec![
                "Use a peak flow meter daily".to_string(),
                "Schedule a mammogram".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_recommend_sends_calculation_steps() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(|req: &wiremock::Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap_or_default();
                let prompt = body["contents"][0]["parts"][0]["text"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let answer = if prompt.contains("- Family History: cancer: +0.15") {
                    "steps received"
                } else {
                    ""
                };
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "candidates": [{"content": {"role": "model", "parts": [{"text": answer}]}}]
                }))
            })
            .mount(&server)
            .await;

        let lines = recommend_against(&server).await.unwrap();
        assert_eq!(lines, vec!["steps received".to_string()]);
    }

    #[tokio::test]
    async fn test_upstream_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = recommend_against(&server).await.unwrap_err();
        match err {
            AppError::UpstreamError { status, message } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("Expected UpstreamError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let err = recommend_against(&server).await.unwrap_err();
        assert!(matches!(err, AppError::EmptyResponse(_)));
    }
}
