use common::catalog::types::{product::Product, retrieved_item::RetrievedItem};

/// Empirical category confidence: the fraction of already-retrieved items
/// whose category list contains the detected label, rounded to two decimals.
///
/// This is the recovery signal used when the classifier's own confidence
/// fell short of the threshold.
pub fn empirical_confidence(items: &[RetrievedItem], category: &str) -> f64 {
    if category.is_empty() || items.is_empty() {
        return 0.0;
    }

    let matching = items
        .iter()
        .filter(|item| item.matches_category(category))
        .count();

    round2(matching as f64 / items.len() as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Splits results into those matching the detected category and the rest,
/// preserving rank order. The additional bucket is capped at
/// `max_additional`.
pub fn partition_by_category(
    products: Vec<Product>,
    category: &str,
    max_additional: usize,
) -> (Vec<Product>, Vec<Product>) {
    let (primary, mut additional): (Vec<_>, Vec<_>) = products
        .into_iter()
        .partition(|product| product.matches_category(category));
    additional.truncate(max_additional);
    (primary, additional)
}
