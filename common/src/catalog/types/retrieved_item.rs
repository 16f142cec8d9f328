use serde::{Deserialize, Serialize};

use super::category_contains;
use crate::index::types::ProductDocument;

/// Maximum number of description characters carried into the classification
/// context.
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Compact projection of an index document used only while building the
/// classification context. Never persisted; lives for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedItem {
    pub name: String,
    pub sku: String,
    pub price: Option<f64>,
    pub categories: Vec<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub stock_status: Option<String>,
    pub description: String,
}

impl RetrievedItem {
    pub fn matches_category(&self, label: &str) -> bool {
        category_contains(&self.categories, label)
    }
}

impl From<ProductDocument> for RetrievedItem {
    fn from(doc: ProductDocument) -> Self {
        let description = doc
            .short_description
            .or(doc.description)
            .unwrap_or_default()
            .chars()
            .take(DESCRIPTION_PREVIEW_CHARS)
            .collect();

        Self {
            name: doc.name,
            sku: doc.sku,
            price: doc.price,
            categories: doc.categories,
            brand: doc.brand,
            size: doc.size,
            color: doc.color,
            stock_status: doc.stock_status,
            description,
        }
    }
}
