use std::collections::HashSet;

/// Jaccard index over whitespace-separated token sets.
///
/// Two values with no tokens at all are fully similar (1.0).
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = left.intersection(&right).count();

    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_values_score_one() {
        assert_eq!(jaccard_similarity("Truck A", "Truck A"), 1.0);
        assert_eq!(jaccard_similarity("a b a", "b a"), 1.0);
    }

    #[test]
    fn empty_inputs_are_fully_similar() {
        assert_eq!(jaccard_similarity("", ""), 1.0);
        assert_eq!(jaccard_similarity("  ", "\t"), 1.0);
    }

    #[test]
    fn one_empty_side_scores_zero() {
        assert_eq!(jaccard_similarity("", "red"), 0.0);
    }

    #[test]
    fn token_overlap() {
        // {Main, Street, 5} vs {Main, St, 5}: 2 shared of 4
        assert_eq!(jaccard_similarity("Main Street 5", "Main St 5"), 0.5);
        assert_eq!(jaccard_similarity("red", "blue"), 0.0);
    }

    #[test]
    fn tokens_not_characters() {
        assert_eq!(jaccard_similarity("abc", "cba"), 0.0);
    }

    proptest! {
        #[test]
        fn symmetric(a in "[a-c ]{0,12}", b in "[a-c ]{0,12}") {
            prop_assert_eq!(jaccard_similarity(&a, &b), jaccard_similarity(&b, &a));
        }

        #[test]
        fn bounded(a in "\\PC{0,16}", b in "\\PC{0,16}") {
            let s = jaccard_similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
        }

        #[test]
        fn reflexive(a in "\\PC{0,16}") {
            prop_assert_eq!(jaccard_similarity(&a, &a), 1.0);
        }
    }
}
