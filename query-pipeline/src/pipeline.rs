use std::sync::Arc;
use std::time::Instant;

use common::{
    catalog::types::{
        product::Product, retrieved_item::RetrievedItem, search_response::SearchResponse,
    },
    error::AppError,
    index::{
        client::SearchIndexClient,
        types::{IndexSearchRequest, IndexSearchResults},
    },
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    classifier::{Classification, Classifier},
    context::{build_category_context, CategoryContext},
    filter::{merge_category_filter, strip_category_clauses},
    gate::apply_category,
    limit::extract_limit,
    partition::{empirical_confidence, partition_by_category},
};

// Field lists for the two index calls. The context call searches wide with
// typo tolerance; the final call weights exact identifiers heavily.
const RETRIEVAL_QUERY_BY: &str =
    "name,description,short_description,sku,categories,brand,size,color";
const RETRIEVAL_PREFIX: &str = "true,true,true,false,false,false,false,false";
const RETRIEVAL_SORT: &str = "_text_match:desc";
const FINAL_QUERY_BY: &str =
    "name,sku,name_normalized,sku_normalized,description,short_description,categories";
const FINAL_QUERY_BY_WEIGHTS: &str = "100,100,4,4,3,3,1";
const DEFAULT_SORT: &str = "_text_match:desc,brand_priority:desc,price:asc";

// Queries shorter than this are validation-style probes; retrieval is
// skipped and the classifier runs with an empty context.
const MIN_CONTEXT_QUERY_CHARS: usize = 3;

/// Per-request options. Immutable once the request starts.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub max_results: u32,
    pub debug: bool,
    pub confidence_threshold: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 20,
            debug: false,
            confidence_threshold: 0.75,
        }
    }
}

/// Context-sizing knobs for the retrieval-for-context step.
#[derive(Debug, Clone)]
pub struct PipelineTuning {
    /// Items retrieved to build the classification context.
    pub retrieval_count: u32,
    /// Category buckets handed to the classifier.
    pub max_categories: usize,
    /// Sample items per bucket.
    pub samples_per_category: usize,
}

impl Default for PipelineTuning {
    fn default() -> Self {
        Self {
            retrieval_count: 20,
            max_categories: 5,
            samples_per_category: 3,
        }
    }
}

struct FinalSearch {
    products: Vec<Product>,
    total: u64,
    degraded: bool,
}

/// The query-interpretation pipeline: a strict linear chain of steps per
/// request, orchestrated entirely in this layer so the classification call
/// never triggers another classification-enabled search.
#[derive(Clone)]
pub struct QueryPipeline {
    index: Arc<SearchIndexClient>,
    classifier: Classifier,
    tuning: PipelineTuning,
}

impl QueryPipeline {
    pub fn new(
        index: Arc<SearchIndexClient>,
        classifier: Classifier,
        tuning: PipelineTuning,
    ) -> Self {
        Self {
            index,
            classifier,
            tuning,
        }
    }

    /// Runs one search request end to end.
    ///
    /// Steps: extract limit, retrieve context (classification disabled),
    /// summarize, classify, gate, merge filters, final search. When the gate
    /// fails but a category was detected, the result is partitioned rather
    /// than the classification being discarded outright.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("query must not be empty".to_string()));
        }

        let started = Instant::now();
        let max_results = extract_limit(query).unwrap_or(options.max_results);

        let retrieved = self.retrieve_context(query).await;
        let context = build_category_context(
            &retrieved,
            self.tuning.max_categories,
            self.tuning.samples_per_category,
        );
        info!(
            query = %query,
            retrieved = retrieved.len(),
            categories = context.buckets.len(),
            "built classification context"
        );

        let classification = self.classifier.classify(query, &context).await;

        let gate_passed = apply_category(
            classification.category.as_deref(),
            classification.confidence,
            options.confidence_threshold,
        );

        let outcome = if gate_passed {
            self.search_with_category(query, &classification, max_results)
                .await?
        } else {
            self.search_without_category(query, &classification, &retrieved, options, max_results)
                .await?
        };

        let query_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            query = %query,
            category = classification.category.as_deref().unwrap_or("none"),
            confidence = classification.confidence,
            category_applied = gate_passed,
            total = outcome.total,
            query_time_ms,
            "search completed"
        );

        Ok(build_response(
            query,
            &classification,
            &context,
            &retrieved,
            outcome,
            gate_passed,
            options,
            query_time_ms,
        ))
    }

    /// Context retrieval. Best effort only: the index is queried by literal
    /// text match with typo tolerance and classification explicitly
    /// disabled, and unavailability yields an empty context instead of an
    /// error.
    async fn retrieve_context(&self, query: &str) -> Vec<RetrievedItem> {
        if query.chars().count() < MIN_CONTEXT_QUERY_CHARS {
            return Vec::new();
        }

        let request = IndexSearchRequest {
            q: query.to_string(),
            query_by: RETRIEVAL_QUERY_BY.to_string(),
            query_by_weights: None,
            filter_by: None,
            sort_by: Some(RETRIEVAL_SORT.to_string()),
            per_page: self.tuning.retrieval_count,
            num_typos: Some(2),
            prefix: Some(RETRIEVAL_PREFIX.to_string()),
            classify: false,
        };

        match self.index.search(&request).await {
            Ok(results) => results
                .hits
                .into_iter()
                .map(|hit| RetrievedItem::from(hit.document))
                .collect(),
            Err(err) => {
                warn!(%err, "context retrieval failed, classifying without context");
                Vec::new()
            }
        }
    }

    /// Gate passed: merge the category into the extracted filters and run
    /// the final search.
    async fn search_with_category(
        &self,
        query: &str,
        classification: &Classification,
        max_results: u32,
    ) -> Result<SearchOutcome, AppError> {
        let category = classification.category.as_deref();
        let filter_by = merge_category_filter(classification.filter_by.as_deref(), category);

        let FinalSearch {
            products,
            total,
            degraded,
        } = self
            .final_search(query, classification, filter_by.as_deref(), max_results)
            .await?;

        Ok(SearchOutcome {
            primary: None,
            additional: None,
            merged_filter: filter_by,
            empirical: None,
            products,
            total,
            degraded,
        })
    }

    /// Gate failed: run the final search without a category clause. When a
    /// category was still detected and even the empirical signal from the
    /// retrieved items is weak, the results are split into primary (matches
    /// the category) and additional (does not) instead of discarding the
    /// classification entirely.
    async fn search_without_category(
        &self,
        query: &str,
        classification: &Classification,
        retrieved: &[RetrievedItem],
        options: &SearchOptions,
        max_results: u32,
    ) -> Result<SearchOutcome, AppError> {
        let filter_by = classification
            .filter_by
            .as_deref()
            .map(strip_category_clauses)
            .filter(|f| !f.is_empty());

        let FinalSearch {
            products,
            total,
            degraded,
        } = self
            .final_search(query, classification, filter_by.as_deref(), max_results)
            .await?;

        let mut outcome = SearchOutcome {
            primary: None,
            additional: None,
            merged_filter: filter_by,
            empirical: None,
            products,
            total,
            degraded,
        };

        if let Some(category) = classification.category.as_deref() {
            let empirical = empirical_confidence(retrieved, category);
            outcome.empirical = Some(empirical);

            if empirical < options.confidence_threshold && !retrieved.is_empty() {
                info!(
                    category = %category,
                    empirical,
                    threshold = options.confidence_threshold,
                    "partitioning results by weakly detected category"
                );
                let (primary, additional) = partition_by_category(
                    std::mem::take(&mut outcome.products),
                    category,
                    max_results as usize,
                );
                outcome.products = primary
                    .iter()
                    .chain(additional.iter())
                    .cloned()
                    .collect();
                outcome.primary = Some(primary);
                outcome.additional = Some(additional);
            }
        }

        Ok(outcome)
    }

    /// The real search. Classification stays disabled here for the same
    /// reentrancy reason as in retrieval. A transient failure re-issues the
    /// query once as plain keyword search with no filters; auth failures
    /// propagate untouched.
    async fn final_search(
        &self,
        query: &str,
        classification: &Classification,
        filter_by: Option<&str>,
        max_results: u32,
    ) -> Result<FinalSearch, AppError> {
        let request = IndexSearchRequest {
            q: classification.query.clone(),
            query_by: FINAL_QUERY_BY.to_string(),
            query_by_weights: Some(FINAL_QUERY_BY_WEIGHTS.to_string()),
            filter_by: filter_by.map(str::to_string),
            sort_by: Some(
                classification
                    .sort_by
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SORT.to_string()),
            ),
            per_page: max_results,
            num_typos: None,
            prefix: None,
            classify: false,
        };

        match self.index.search(&request).await {
            Ok(results) => Ok(finish(results, false)),
            Err(AppError::Auth(msg)) => Err(AppError::Auth(msg)),
            Err(err) => {
                warn!(%err, "final search failed, falling back to plain keyword search");
                let fallback =
                    IndexSearchRequest::keyword(query, RETRIEVAL_QUERY_BY, max_results);
                let results = self.index.search(&fallback).await?;
                Ok(finish(results, true))
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_response(
    query: &str,
    classification: &Classification,
    context: &CategoryContext,
    retrieved: &[RetrievedItem],
    outcome: SearchOutcome,
    category_applied: bool,
    options: &SearchOptions,
    query_time_ms: f64,
) -> SearchResponse {
    let debug_metadata = build_debug_metadata(
        query,
        classification,
        context,
        retrieved.len(),
        &outcome,
        category_applied,
        options.debug,
    );

    let primary_results = match outcome.primary {
        Some(primary) => Some(primary),
        None => Some(outcome.products.clone()),
    };

    SearchResponse {
        results: outcome.products,
        primary_results,
        additional_results: outcome.additional,
        detected_category: classification.category.clone(),
        category_confidence: classification.confidence,
        category_applied,
        confidence_threshold: options.confidence_threshold,
        total: outcome.total,
        query_time_ms,
        debug_metadata,
    }
}

struct SearchOutcome {
    products: Vec<Product>,
    primary: Option<Vec<Product>>,
    additional: Option<Vec<Product>>,
    merged_filter: Option<String>,
    empirical: Option<f64>,
    total: u64,
    degraded: bool,
}

fn finish(results: IndexSearchResults, degraded: bool) -> FinalSearch {
    let products = results
        .hits
        .into_iter()
        .map(|hit| Product::from(hit.document))
        .collect();
    FinalSearch {
        products,
        total: results.found,
        degraded,
    }
}

fn build_debug_metadata(
    query: &str,
    classification: &Classification,
    context: &CategoryContext,
    retrieval_count: usize,
    outcome: &SearchOutcome,
    category_applied: bool,
    debug: bool,
) -> Value {
    let mut metadata = json!({
        "approach": "decoupled",
        "original_query": query,
        "search_query": &classification.query,
        "filter_by": outcome.merged_filter.as_deref().unwrap_or(""),
        "sort_by": classification.sort_by.as_deref().unwrap_or(DEFAULT_SORT),
        "retrieval_count": retrieval_count,
        "classifier_time_ms": classification.llm_time_ms,
        "degraded": outcome.degraded,
    });

    // Reasoning stays visible whenever it influenced the response shape.
    if debug || category_applied {
        metadata["category_reasoning"] = json!(&classification.reasoning);
    }
    if debug {
        metadata["top_categories"] = json!(context.categories());
        if let Some(empirical) = outcome.empirical {
            metadata["empirical_confidence"] = json!(empirical);
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_openai::{config::OpenAIConfig, Client};

    use super::*;

    fn pipeline() -> QueryPipeline {
        let index = Arc::new(
            SearchIndexClient::new("http://127.0.0.1:9", "key", "products", Duration::from_secs(1))
                .expect("client builds"),
        );
        let openai = Arc::new(Client::with_config(
            OpenAIConfig::new().with_api_key("test"),
        ));
        let classifier = Classifier::new(openai, "gpt-4o-mini", Duration::from_secs(1));
        QueryPipeline::new(index, classifier, PipelineTuning::default())
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let pipeline = pipeline();
        let err = pipeline
            .search("   ", &SearchOptions::default())
            .await
            .expect_err("blank query should fail validation");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_default_options() {
        let options = SearchOptions::default();
        assert_eq!(options.max_results, 20);
        assert!(!options.debug);
        assert!((options.confidence_threshold - 0.75).abs() < f64::EPSILON);
    }
}
