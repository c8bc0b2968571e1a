use serde::Serialize;
use serde_json::Value;

use crate::config::MergeConfig;
use crate::similarity::jaccard_similarity;
use crate::value::{is_absent, parse_int, to_text, values_equal};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_CONFLICT_SEPARATOR: &str = "/";

/// Which precedence rule settled a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Equal,
    Coalesced,
    BothAbsent,
    Numeric,
    Similar,
    Conflict,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equal => write!(f, "equal"),
            Self::Coalesced => write!(f, "coalesced"),
            Self::BothAbsent => write!(f, "both_absent"),
            Self::Numeric => write!(f, "numeric"),
            Self::Similar => write!(f, "similar"),
            Self::Conflict => write!(f, "conflict"),
        }
    }
}

/// Field-level conflict policy for two candidate values of the same key.
#[derive(Debug, Clone)]
pub struct Reconciler {
    threshold: f64,
    separator: String,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            separator: DEFAULT_CONFLICT_SEPARATOR.to_string(),
        }
    }
}

impl Reconciler {
    pub fn new(threshold: f64, separator: impl Into<String>) -> Self {
        Self {
            threshold,
            separator: separator.into(),
        }
    }

    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(config.similarity_threshold, config.conflict_separator.clone())
    }

    pub fn resolve(&self, field: &str, left: &Value, right: &Value) -> Value {
        self.resolve_with_rule(field, left, right).0
    }

    /// Resolve one field, first matching rule wins:
    /// equal, one side absent, both absent, same integer, similar text
    /// (longer wins), otherwise both joined by the separator.
    ///
    /// Total over every pair of values.
    pub fn resolve_with_rule(&self, field: &str, left: &Value, right: &Value) -> (Value, Resolution) {
        match (is_absent(left), is_absent(right)) {
            (true, true) => return (Value::Null, Resolution::BothAbsent),
            (false, true) => return (left.clone(), Resolution::Coalesced),
            (true, false) => return (right.clone(), Resolution::Coalesced),
            (false, false) => {}
        }

        if values_equal(left, right) {
            return (left.clone(), Resolution::Equal);
        }

        if let (Some(a), Some(b)) = (parse_int(left), parse_int(right)) {
            if a == b {
                return (Value::from(a), Resolution::Numeric);
            }
        }

        let left_text = to_text(left);
        let right_text = to_text(right);

        if jaccard_similarity(&left_text, &right_text) >= self.threshold {
            let longer = if left_text.chars().count() >= right_text.chars().count() {
                left_text
            } else {
                right_text
            };
            return (Value::String(longer.into_owned()), Resolution::Similar);
        }

        log::debug!("field '{field}': unresolved conflict {left_text:?} vs {right_text:?}");
        (
            Value::String(format!("{left_text}{}{right_text}", self.separator)),
            Resolution::Conflict,
        )
    }
}

/// Resolve with the default threshold and separator.
pub fn resolve(field: &str, left: &Value, right: &Value) -> Value {
    Reconciler::default().resolve(field, left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn equal_values() {
        assert_eq!(resolve("f", &json!(5), &json!(5)), json!(5));
        assert_eq!(resolve("f", &json!("Truck A"), &json!("Truck A")), json!("Truck A"));
    }

    #[test]
    fn null_coalescing() {
        assert_eq!(resolve("f", &json!(null), &json!("x")), json!("x"));
        assert_eq!(resolve("f", &json!("x"), &json!(null)), json!("x"));
        assert_eq!(resolve("f", &json!(null), &json!(null)), json!(null));
    }

    #[test]
    fn numeric_equivalence() {
        assert_eq!(resolve("f", &json!("7"), &json!(7)), json!(7));
        assert_eq!(resolve("f", &json!(7), &json!(" 7")), json!(7));
        assert_eq!(resolve("f", &json!(7.0), &json!("7")), json!(7));
    }

    #[test]
    fn similar_text_keeps_longer() {
        assert_eq!(
            resolve("street", &json!("Main Street 5"), &json!("Main St 5")),
            json!("Main Street 5")
        );
        assert_eq!(
            resolve("street", &json!("Main St 5"), &json!("Main Street 5")),
            json!("Main Street 5")
        );
    }

    #[test]
    fn similar_tie_prefers_left() {
        // same tokens, same length, different spacing
        assert_eq!(resolve("f", &json!("a  b"), &json!("b  a")), json!("a  b"));
    }

    #[test]
    fn dissimilar_text_is_joined() {
        assert_eq!(resolve("color", &json!("red"), &json!("blue")), json!("red/blue"));
    }

    #[test]
    fn mismatched_integers_fall_through_to_text() {
        assert_eq!(resolve("rnr", &json!(7), &json!("8")), json!("7/8"));
    }

    #[test]
    fn booleans_and_fractions_are_not_integers() {
        let r = Reconciler::default();
        assert_eq!(r.resolve_with_rule("f", &json!(true), &json!(1)), (json!("true/1"), Resolution::Conflict));
        assert_eq!(r.resolve_with_rule("f", &json!(false), &json!(0)), (json!("false/0"), Resolution::Conflict));
        assert_eq!(r.resolve_with_rule("f", &json!(7.5), &json!(7)), (json!("7.5/7"), Resolution::Conflict));
    }

    #[test]
    fn mixed_types_fall_back_to_text() {
        assert_eq!(resolve("f", &json!(true), &json!("true")), json!("true"));
        assert_eq!(resolve("f", &json!(1.5), &json!("x")), json!("1.5/x"));
        assert_eq!(resolve("f", &json!([1, 2]), &json!({"a": 1})), json!(r#"[1,2]/{"a":1}"#));
    }

    #[test]
    fn rules_are_reported() {
        let r = Reconciler::default();
        assert_eq!(r.resolve_with_rule("f", &json!(1), &json!(1)).1, Resolution::Equal);
        assert_eq!(r.resolve_with_rule("f", &json!(null), &json!(1)).1, Resolution::Coalesced);
        assert_eq!(r.resolve_with_rule("f", &json!(null), &json!(null)).1, Resolution::BothAbsent);
        assert_eq!(r.resolve_with_rule("f", &json!("1"), &json!(1)).1, Resolution::Numeric);
        assert_eq!(r.resolve_with_rule("f", &json!("a b"), &json!("a")).1, Resolution::Similar);
        assert_eq!(r.resolve_with_rule("f", &json!("a"), &json!("b")).1, Resolution::Conflict);
    }

    #[test]
    fn custom_threshold_and_separator() {
        let strict = Reconciler::new(0.9, " | ");
        assert_eq!(
            strict.resolve("street", &json!("Main Street 5"), &json!("Main St 5")),
            json!("Main Street 5 | Main St 5")
        );
    }

    fn any_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            (-1.0e6f64..1.0e6).prop_map(Value::from),
            "[a-z0-9 ]{0,10}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn total_over_mixed_inputs(a in any_value(), b in any_value()) {
            let (value, rule) = Reconciler::default().resolve_with_rule("f", &a, &b);
            if a.is_null() && b.is_null() {
                prop_assert!(value.is_null());
                prop_assert_eq!(rule, Resolution::BothAbsent);
            } else {
                prop_assert!(!value.is_null());
            }
        }
    }
}
