use std::sync::LazyLock;

use regex::Regex;

// Ordered: the first pattern whose captured value lands in range wins.
static LIMIT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(\d+)\s+(?:most|least|top|best|worst|cheapest|expensive)",
        r"top\s+(\d+)",
        r"first\s+(\d+)",
        r"^(\d+)\s+\w+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("limit pattern is valid"))
    .collect()
});

/// Extracts an explicit result-count hint from the raw query.
///
/// "5 most expensive" -> 5, "top 10 reagents" -> 10, "first 3 gloves" -> 3.
/// Values outside [1, 100] are discarded. Absence of a match falls back to
/// the caller-supplied default.
pub fn extract_limit(query: &str) -> Option<u32> {
    let query = query.trim().to_lowercase();

    for pattern in LIMIT_PATTERNS.iter() {
        if let Some(value) = pattern
            .captures(&query)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            if (1..=100).contains(&value) {
                return Some(value);
            }
        }
    }

    None
}
