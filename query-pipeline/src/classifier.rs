use std::sync::Arc;
use std::time::{Duration, Instant};

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use common::error::AppError;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::classifier_prompt::{
    build_classification_message, classification_response_schema, CLASSIFIER_SYSTEM_PROMPT,
};
use crate::context::CategoryContext;

/// Wire format of the classification content returned by the model.
#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(default)]
    q: String,
    #[serde(default)]
    filter_by: String,
    #[serde(default)]
    sort_by: String,
    #[serde(default)]
    per_page: Option<u32>,
    detected_category: Option<String>,
    #[serde(default)]
    category_confidence: f64,
    #[serde(default)]
    category_reasoning: String,
}

/// Parsed classification result. Produced once per request; the pipeline
/// treats the confidence value as authoritative and only gates on the
/// threshold comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Rewritten query text (falls back to the original query).
    pub query: String,
    /// Machine-extracted non-category filters, if any.
    pub filter_by: Option<String>,
    pub sort_by: Option<String>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    /// Always within [0, 1].
    pub confidence: f64,
    /// Free-form reasoning, for observability only.
    pub reasoning: String,
    pub llm_time_ms: f64,
}

impl Classification {
    fn from_raw(raw: RawClassification, original_query: &str, llm_time_ms: f64) -> Self {
        let query = if raw.q.trim().is_empty() {
            original_query.to_owned()
        } else {
            raw.q
        };

        Self {
            query,
            filter_by: none_if_blank(raw.filter_by),
            sort_by: none_if_blank(raw.sort_by),
            per_page: raw.per_page,
            category: raw.detected_category.filter(|c| !c.trim().is_empty()),
            confidence: raw.category_confidence.clamp(0.0, 1.0),
            reasoning: raw.category_reasoning,
            llm_time_ms,
        }
    }

    /// The conservative no-category result used whenever the model call or
    /// its output cannot be trusted.
    fn fallback(original_query: &str, reasoning: String, llm_time_ms: f64) -> Self {
        Self {
            query: original_query.to_owned(),
            filter_by: None,
            sort_by: None,
            per_page: None,
            category: None,
            confidence: 0.0,
            reasoning,
            llm_time_ms,
        }
    }
}

fn none_if_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Category classifier backed by the language-model service.
///
/// Model id and timeout are explicit construction-time configuration so
/// multiple setups can run side by side in one process.
#[derive(Clone)]
pub struct Classifier {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    timeout: Duration,
}

impl Classifier {
    pub fn new(
        client: Arc<Client<OpenAIConfig>>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            timeout,
        }
    }

    /// Classifies the query against the retrieved context.
    ///
    /// Never fails the request: transport errors, timeouts, and schema
    /// mismatches all degrade to the null-category fallback instead of a
    /// retry loop, so classification latency stays bounded.
    pub async fn classify(&self, query: &str, context: &CategoryContext) -> Classification {
        let started = Instant::now();
        let outcome =
            tokio::time::timeout(self.timeout, self.request_classification(query, context)).await;
        let llm_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(Ok(raw)) => {
                let classification = Classification::from_raw(raw, query, llm_time_ms);
                debug!(
                    category = classification.category.as_deref().unwrap_or("none"),
                    confidence = classification.confidence,
                    llm_time_ms,
                    "classification completed"
                );
                classification
            }
            Ok(Err(err)) => {
                warn!(%err, "classification degraded to null category");
                Classification::fallback(query, format!("classification failed: {err}"), llm_time_ms)
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis(), "classification timed out");
                Classification::fallback(
                    query,
                    "classification timed out".to_string(),
                    llm_time_ms,
                )
            }
        }
    }

    async fn request_classification(
        &self,
        query: &str,
        context: &CategoryContext,
    ) -> Result<RawClassification, AppError> {
        let request = create_classification_request(&self.model, query, context)?;
        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or(AppError::LLMParsing(
                "no content in classification response".to_string(),
            ))?;

        parse_classification_content(content)
    }
}

fn create_classification_request(
    model: &str,
    query: &str,
    context: &CategoryContext,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let response_format = ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: Some("Product search parameter extraction and category classification".into()),
            name: "search_parameter_classification".into(),
            schema: Some(classification_response_schema()),
            strict: Some(true),
        },
    };

    CreateChatCompletionRequestArgs::default()
        .model(model)
        .temperature(0.0)
        .messages([
            ChatCompletionRequestSystemMessage::from(CLASSIFIER_SYSTEM_PROMPT).into(),
            ChatCompletionRequestUserMessage::from(build_classification_message(query, context))
                .into(),
        ])
        .response_format(response_format)
        .build()
}

fn parse_classification_content(content: &str) -> Result<RawClassification, AppError> {
    serde_json::from_str::<RawClassification>(content).map_err(|e| {
        warn!(raw = %content, "classification content did not match schema");
        AppError::LLMParsing(format!("failed to parse classification: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_classification() {
        let content = r#"{
            "q": "nitrile glove",
            "filter_by": "price:<50",
            "sort_by": "",
            "per_page": 20,
            "detected_category": "Products/Gloves & Apparel/Gloves",
            "category_confidence": 0.85,
            "category_reasoning": "Clear product type match"
        }"#;
        let raw = parse_classification_content(content).expect("valid content parses");
        let classification = Classification::from_raw(raw, "nitrile gloves under $50", 12.0);

        assert_eq!(classification.query, "nitrile glove");
        assert_eq!(classification.filter_by.as_deref(), Some("price:<50"));
        assert_eq!(classification.sort_by, None);
        assert_eq!(
            classification.category.as_deref(),
            Some("Products/Gloves & Apparel/Gloves")
        );
        assert!((classification.confidence - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_null_category() {
        let content = r#"{
            "q": "clear",
            "filter_by": "",
            "sort_by": "",
            "per_page": 20,
            "detected_category": null,
            "category_confidence": 0.2,
            "category_reasoning": "Single attribute word without product type"
        }"#;
        let raw = parse_classification_content(content).expect("valid content parses");
        let classification = Classification::from_raw(raw, "clear", 5.0);

        assert_eq!(classification.category, None);
        assert!(classification.confidence < 0.5);
        assert_eq!(classification.filter_by, None);
    }

    #[test]
    fn test_non_json_content_is_rejected() {
        let err = parse_classification_content("not json").expect_err("should fail");
        assert!(matches!(err, AppError::LLMParsing(_)));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let content = r#"{
            "q": "gloves",
            "detected_category": "Gloves",
            "category_confidence": 1.8
        }"#;
        let raw = parse_classification_content(content).expect("missing fields take defaults");
        let classification = Classification::from_raw(raw, "gloves", 1.0);
        assert!((classification.confidence - 1.0).abs() < f64::EPSILON);

        let content = r#"{"q": "gloves", "category_confidence": -0.3, "detected_category": "Gloves"}"#;
        let raw = parse_classification_content(content).expect("parses");
        let classification = Classification::from_raw(raw, "gloves", 1.0);
        assert!(classification.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_rewritten_query_falls_back_to_original() {
        let content = r#"{"q": "  ", "category_confidence": 0.1, "detected_category": null}"#;
        let raw = parse_classification_content(content).expect("parses");
        let classification = Classification::from_raw(raw, "original query", 1.0);
        assert_eq!(classification.query, "original query");
    }

    #[test]
    fn test_blank_detected_category_becomes_none() {
        let content = r#"{"q": "gloves", "category_confidence": 0.9, "detected_category": "  "}"#;
        let raw = parse_classification_content(content).expect("parses");
        let classification = Classification::from_raw(raw, "gloves", 1.0);
        assert_eq!(classification.category, None);
    }

    #[test]
    fn test_fallback_is_conservative() {
        let fallback = Classification::fallback("gloves", "boom".to_string(), 2.0);
        assert_eq!(fallback.category, None);
        assert!(fallback.confidence.abs() < f64::EPSILON);
        assert_eq!(fallback.query, "gloves");
        assert_eq!(fallback.reasoning, "boom");
    }
}
