use std::collections::HashMap;

use common::catalog::types::retrieved_item::RetrievedItem;
use serde::Serialize;
use serde_json::{json, Value};

/// One sample item inside a category bucket, projected down for prompt
/// compactness.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContextSample {
    pub name: String,
    pub sku: String,
    pub price: String,
    pub brand: String,
    pub size: String,
    pub color: String,
}

impl ContextSample {
    fn from_item(item: &RetrievedItem) -> Self {
        Self {
            name: item.name.clone(),
            sku: item.sku.clone(),
            price: item
                .price
                .map_or_else(|| "N/A".to_string(), |p| format!("${p:.2}")),
            brand: item.brand.clone().unwrap_or_default(),
            size: item.size.clone().unwrap_or_default(),
            color: item.color.clone().unwrap_or_default(),
        }
    }
}

/// A category path with its representative sample items.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryBucket {
    pub category: String,
    pub item_count: usize,
    pub samples: Vec<ContextSample>,
}

/// Compact, ordered classification context: top categories by item count,
/// each with a small sample of items in relevance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryContext {
    pub buckets: Vec<CategoryBucket>,
}

impl CategoryContext {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn categories(&self) -> Vec<&str> {
        self.buckets
            .iter()
            .map(|bucket| bucket.category.as_str())
            .collect()
    }

    /// Renders the context block embedded in the classification prompt.
    pub fn to_json(&self) -> Value {
        json!(self
            .buckets
            .iter()
            .map(|bucket| {
                json!({
                    "category": &bucket.category,
                    "sample_products": &bucket.samples,
                })
            })
            .collect::<Vec<_>>())
    }
}

/// Groups retrieved items by category path and samples the densest buckets.
///
/// An item with multiple category tags contributes to every one of them.
/// Buckets are ranked by item count descending; ties keep the order in which
/// the category first appeared, which preserves the retriever's relevance
/// order. Deterministic given the same input.
pub fn build_category_context(
    items: &[RetrievedItem],
    max_categories: usize,
    samples_per_category: usize,
) -> CategoryContext {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&RetrievedItem>> = HashMap::new();

    for item in items {
        for category in &item.categories {
            let entry = groups.entry(category.as_str()).or_default();
            if entry.is_empty() {
                order.push(category.as_str());
            }
            entry.push(item);
        }
    }

    let mut ranked: Vec<(&str, Vec<&RetrievedItem>)> = order
        .into_iter()
        .filter_map(|category| groups.remove(category).map(|items| (category, items)))
        .collect();
    // Stable sort keeps first-appearance order for equal counts.
    ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    ranked.truncate(max_categories);

    let buckets = ranked
        .into_iter()
        .map(|(category, bucket_items)| CategoryBucket {
            category: category.to_string(),
            item_count: bucket_items.len(),
            samples: bucket_items
                .iter()
                .take(samples_per_category)
                .map(|item| ContextSample::from_item(item))
                .collect(),
        })
        .collect();

    CategoryContext { buckets }
}
