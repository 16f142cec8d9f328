pub mod product;
pub mod retrieved_item;
pub mod search_response;

/// Case-insensitive containment test used for category matching.
///
/// This is deliberately a substring test, not equality: upstream taxonomies
/// embed parent paths ("Products/Gloves & Apparel/Gloves"), so a detected
/// label matches whenever it appears anywhere within one of the item's
/// category paths.
pub fn category_contains(categories: &[String], label: &str) -> bool {
    if label.is_empty() {
        return false;
    }
    let needle = label.to_lowercase();
    categories
        .iter()
        .any(|category| category.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_contains_is_case_insensitive() {
        let categories = vec!["Products/Gloves & Apparel/Gloves".to_string()];
        assert!(category_contains(&categories, "gloves"));
        assert!(category_contains(&categories, "GLOVES"));
    }

    #[test]
    fn test_category_contains_matches_embedded_paths() {
        let categories = vec!["Products/Lab Plasticware/Centrifuge Tubes".to_string()];
        assert!(category_contains(&categories, "Centrifuge Tubes"));
        assert!(category_contains(&categories, "Lab Plasticware"));
        assert!(!category_contains(&categories, "Gloves"));
    }

    #[test]
    fn test_category_contains_empty_inputs() {
        assert!(!category_contains(&[], "Gloves"));
        let categories = vec!["Gloves".to_string()];
        assert!(!category_contains(&categories, ""));
    }
}
