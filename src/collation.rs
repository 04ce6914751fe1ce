//! Total ordering over JSON values
//!
//! Index entries sort by key using a fixed cross-type ordering:
//! null < false < true < number < string < array < object.
//! Within a type, natural ordering applies. Strings compare by code point,
//! not by locale-aware collation weights.

use serde_json::Value;
use std::cmp::Ordering;

/// Rank of a JSON value's type in the cross-type ordering.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Compares two JSON values deterministically.
///
/// Ordering rules:
/// - Different types: null < false < true < number < string < array < object
/// - Numbers: integer comparison when both fit i64, otherwise f64
/// - Strings: code-point order
/// - Arrays: elementwise, shorter array first on a shared prefix
/// - Objects: sorted key order, key then value, fewer entries first
pub fn collate(a: &Value, b: &Value) -> Ordering {
    let a_rank = type_rank(a);
    let b_rank = type_rank(b);
    if a_rank != b_rank {
        return a_rank.cmp(&b_rank);
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
        (Value::Number(a_n), Value::Number(b_n)) => {
            if let (Some(a_i), Some(b_i)) = (a_n.as_i64(), b_n.as_i64()) {
                return a_i.cmp(&b_i);
            }
            let a_f = a_n.as_f64().unwrap_or(0.0);
            let b_f = b_n.as_f64().unwrap_or(0.0);
            a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
        }
        (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
        (Value::Array(a_items), Value::Array(b_items)) => {
            for (a_item, b_item) in a_items.iter().zip(b_items.iter()) {
                let ordering = collate(a_item, b_item);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a_items.len().cmp(&b_items.len())
        }
        (Value::Object(a_map), Value::Object(b_map)) => {
            // Map iteration is key-ordered, so zipped pairs line up.
            for ((a_key, a_val), (b_key, b_val)) in a_map.iter().zip(b_map.iter()) {
                let key_ordering = a_key.cmp(b_key);
                if key_ordering != Ordering::Equal {
                    return key_ordering;
                }
                let val_ordering = collate(a_val, b_val);
                if val_ordering != Ordering::Equal {
                    return val_ordering;
                }
            }
            a_map.len().cmp(&b_map.len())
        }
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cross_type_ordering() {
        let values = vec![
            json!(null),
            json!(false),
            json!(true),
            json!(-10),
            json!(0),
            json!(3.5),
            json!(100),
            json!(""),
            json!("apple"),
            json!("banana"),
            json!([]),
            json!([1]),
            json!({}),
            json!({"a": 1}),
        ];

        for i in 1..values.len() {
            assert!(
                collate(&values[i - 1], &values[i]) != Ordering::Greater,
                "{} should not sort after {}",
                values[i - 1],
                values[i]
            );
        }
    }

    #[test]
    fn test_numbers_mixed_int_float() {
        assert_eq!(collate(&json!(1), &json!(1.0)), Ordering::Equal);
        assert_eq!(collate(&json!(1), &json!(1.5)), Ordering::Less);
        assert_eq!(collate(&json!(2.5), &json!(2)), Ordering::Greater);
        assert_eq!(collate(&json!(-1), &json!(1)), Ordering::Less);
    }

    #[test]
    fn test_large_integers_exact() {
        // Beyond f64's 53-bit mantissa, adjacent i64s must still order.
        let a = json!(9_007_199_254_740_993_i64);
        let b = json!(9_007_199_254_740_992_i64);
        assert_eq!(collate(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_strings_code_point() {
        assert_eq!(collate(&json!("a"), &json!("b")), Ordering::Less);
        assert_eq!(collate(&json!("Z"), &json!("a")), Ordering::Less);
        assert_eq!(collate(&json!("abc"), &json!("abd")), Ordering::Less);
        assert_eq!(collate(&json!("ab"), &json!("abc")), Ordering::Less);
    }

    #[test]
    fn test_arrays_elementwise() {
        assert_eq!(collate(&json!([1, 2]), &json!([1, 3])), Ordering::Less);
        assert_eq!(collate(&json!([1, 2]), &json!([1, 2])), Ordering::Equal);
        assert_eq!(collate(&json!([1, 2]), &json!([1, 2, 0])), Ordering::Less);
        assert_eq!(collate(&json!([2]), &json!([1, 9, 9])), Ordering::Greater);
        // Any array sorts after any scalar
        assert_eq!(collate(&json!([]), &json!("zzz")), Ordering::Greater);
    }

    #[test]
    fn test_objects() {
        assert_eq!(
            collate(&json!({"a": 1}), &json!({"a": 2})),
            Ordering::Less
        );
        assert_eq!(
            collate(&json!({"a": 1}), &json!({"b": 1})),
            Ordering::Less
        );
        assert_eq!(
            collate(&json!({"a": 1}), &json!({"a": 1, "b": 2})),
            Ordering::Less
        );
        assert_eq!(
            collate(&json!({"x": [1, 2]}), &json!({"x": [1, 2]})),
            Ordering::Equal
        );
    }

    #[test]
    fn test_nested_structures() {
        let a = json!(["group", {"seq": 1}]);
        let b = json!(["group", {"seq": 2}]);
        assert_eq!(collate(&a, &b), Ordering::Less);
    }
}
