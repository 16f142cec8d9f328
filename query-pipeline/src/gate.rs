/// Decides whether the detected category becomes a hard filter.
///
/// Inclusive at the boundary: confidence exactly equal to the threshold
/// applies the filter. Malformed confidence values are normalized upstream,
/// so this comparison cannot error.
pub fn apply_category(category: Option<&str>, confidence: f64, threshold: f64) -> bool {
    category.is_some() && confidence >= threshold
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_applies_when_confident() {
        assert!(apply_category(Some("Gloves"), 0.9, 0.75));
    }

    #[test]
    fn test_rejects_below_threshold() {
        assert!(!apply_category(Some("Gloves"), 0.5, 0.75));
    }

    #[test]
    fn test_rejects_missing_category_regardless_of_confidence() {
        assert!(!apply_category(None, 1.0, 0.0));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        assert!(apply_category(Some("Gloves"), 0.75, 0.75));
    }

    proptest! {
        #[test]
        fn prop_applied_iff_category_and_confidence_clears(
            has_category in any::<bool>(),
            confidence in 0.0f64..=1.0,
            threshold in 0.0f64..=1.0,
        ) {
            let category = has_category.then_some("Products/Gloves");
            let applied = apply_category(category, confidence, threshold);
            prop_assert_eq!(applied, has_category && confidence >= threshold);
        }
    }
}
