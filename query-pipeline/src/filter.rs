//! Filter-expression merging for the index's boolean-AND grammar.

const CLAUSE_SEPARATOR: &str = " && ";

/// Removes every clause expressing a category constraint.
///
/// The classifier is instructed not to emit one, but its output is untrusted
/// and must be sanitized before a category clause is injected.
pub fn strip_category_clauses(filter_by: &str) -> String {
    filter_by
        .split(CLAUSE_SEPARATOR)
        .filter(|clause| !clause.trim_start().starts_with("categories"))
        .collect::<Vec<_>>()
        .join(CLAUSE_SEPARATOR)
        .trim()
        .to_string()
}

// Backticks delimit the category value in the filter grammar; an unescaped
// one in a crafted label could terminate the clause early.
fn escape_category(category: &str) -> String {
    category.replace('`', "\\`")
}

/// Merges machine-extracted filters with the optional category clause.
///
/// The category clause, if any, comes first. Existing category clauses are
/// dropped, so re-merging the same category is a no-op and the result never
/// carries more than one. An empty merge collapses to `None` rather than an
/// empty-string clause.
pub fn merge_category_filter(filter_by: Option<&str>, category: Option<&str>) -> Option<String> {
    let existing = filter_by.map(strip_category_clauses).unwrap_or_default();

    let mut clauses: Vec<String> = Vec::new();
    if let Some(category) = category {
        clauses.push(format!("categories:=`{}`", escape_category(category)));
    }
    if !existing.is_empty() {
        clauses.push(existing);
    }

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(CLAUSE_SEPARATOR))
    }
}
