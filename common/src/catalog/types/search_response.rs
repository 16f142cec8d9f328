use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::product::Product;

/// Response envelope for one search request. Constructed once per request
/// and never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// All results, in rank order.
    pub results: Vec<Product>,
    /// Results matching the detected category, when a split was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_results: Option<Vec<Product>>,
    /// Results from other categories, when a split was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_results: Option<Vec<Product>>,
    pub detected_category: Option<String>,
    pub category_confidence: f64,
    pub category_applied: bool,
    pub confidence_threshold: f64,
    pub total: u64,
    pub query_time_ms: f64,
    pub debug_metadata: Value,
}
