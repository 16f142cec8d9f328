use serde::{Deserialize, Serialize};

/// Parameters for one search call against the index.
///
/// `classify` maps onto the index's natural-language classification flag.
/// Every call issued by this service sends it as `false`: the classification
/// step must never trigger another classification-enabled search, or the
/// index and the model service can call each other indefinitely.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexSearchRequest {
    pub q: String,
    pub query_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_by_weights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_typos: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(rename = "nl_query")]
    pub classify: bool,
}

impl IndexSearchRequest {
    /// Plain keyword search over the given fields, everything else off.
    pub fn keyword(q: impl Into<String>, query_by: impl Into<String>, per_page: u32) -> Self {
        Self {
            q: q.into(),
            query_by: query_by.into(),
            query_by_weights: None,
            filter_by: None,
            sort_by: None,
            per_page,
            num_typos: None,
            prefix: None,
            classify: false,
        }
    }
}

/// Index document projection. Fields the catalog does not populate stay
/// `None`/empty rather than failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProductDocument {
    pub product_id: Option<String>,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url_key: String,
    pub stock_status: Option<String>,
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IndexHit {
    pub document: ProductDocument,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IndexSearchResults {
    #[serde(default)]
    pub hits: Vec<IndexHit>,
    #[serde(default)]
    pub found: u64,
    pub search_time_ms: Option<f64>,
}
