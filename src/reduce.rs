//! Reduce functions
//!
//! A reduce function aggregates the keys and values of one group into a
//! single value. The engine calls it with two equal-length slices plus a
//! `rereduce` flag; the engine itself never sets that flag (group buffers
//! are unbounded), but the built-ins implement both arms so they stand on
//! their own.
//!
//! Reduce failures are contained by the caller: a failing group yields a
//! JSON-null value in its row, never an aborted scan.

use serde_json::{json, Value};
use thiserror::Error;

/// A caller-supplied aggregation over one group's keys and values.
pub type ReduceFn<'a> =
    dyn Fn(&[Value], &[Value], bool) -> Result<Value, ReduceError> + Send + Sync + 'a;

/// Failures raised by a reduce function
#[derive(Debug, Clone, Error)]
pub enum ReduceError {
    /// A value was not of a type the function can aggregate
    #[error("Cannot aggregate non-numeric value: {0}")]
    NonNumeric(String),

    /// The input did not have the shape the function expects
    #[error("Malformed reduce input: {0}")]
    Malformed(String),

    /// Catch-all for caller-supplied functions
    #[error("Reduce failed: {0}")]
    Failed(String),
}

/// Numeric accumulator that stays integral until a float appears.
#[derive(Debug, Clone, Copy)]
struct NumberSum {
    total: f64,
    integral: bool,
}

impl NumberSum {
    fn new() -> Self {
        Self {
            total: 0.0,
            integral: true,
        }
    }

    fn add(&mut self, value: &Value) -> Result<(), ReduceError> {
        let number = value
            .as_f64()
            .ok_or_else(|| ReduceError::NonNumeric(value.to_string()))?;
        self.integral = self.integral && value.as_i64().is_some();
        self.total += number;
        Ok(())
    }

    fn into_value(self) -> Value {
        if self.integral {
            json!(self.total as i64)
        } else {
            json!(self.total)
        }
    }
}

/// Counts the values in the group.
///
/// On re-reduce the inputs are already counts, so they are summed.
pub fn count(keys: &[Value], values: &[Value], rereduce: bool) -> Result<Value, ReduceError> {
    if !rereduce {
        return Ok(json!(values.len()));
    }
    sum(keys, values, false)
}

/// Sums numeric values; any non-numeric value fails the group.
pub fn sum(_keys: &[Value], values: &[Value], _rereduce: bool) -> Result<Value, ReduceError> {
    let mut acc = NumberSum::new();
    for value in values {
        acc.add(value)?;
    }
    Ok(acc.into_value())
}

/// Numeric statistics: sum, count, min, max, sum of squares.
///
/// On re-reduce the inputs are stats objects, merged field by field.
pub fn stats(_keys: &[Value], values: &[Value], rereduce: bool) -> Result<Value, ReduceError> {
    let mut sum = 0.0;
    let mut count: u64 = 0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sumsqr = 0.0;

    for value in values {
        if rereduce {
            let piece = value.as_object().ok_or_else(|| {
                ReduceError::Malformed(format!("not a stats object: {}", value))
            })?;
            let field = |name: &str| -> Result<f64, ReduceError> {
                piece.get(name).and_then(Value::as_f64).ok_or_else(|| {
                    ReduceError::Malformed(format!("stats object missing {}", name))
                })
            };
            sum += field("sum")?;
            count += piece
                .get("count")
                .and_then(Value::as_u64)
                .ok_or_else(|| ReduceError::Malformed("stats object missing count".to_string()))?;
            min = min.min(field("min")?);
            max = max.max(field("max")?);
            sumsqr += field("sumsqr")?;
        } else {
            let number = value
                .as_f64()
                .ok_or_else(|| ReduceError::NonNumeric(value.to_string()))?;
            sum += number;
            count += 1;
            min = min.min(number);
            max = max.max(number);
            sumsqr += number * number;
        }
    }

    if count == 0 {
        return Ok(json!({ "sum": 0.0, "count": 0, "min": null, "max": null, "sumsqr": 0.0 }));
    }
    Ok(json!({ "sum": sum, "count": count, "min": min, "max": max, "sumsqr": sumsqr }))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Keys are ignored by the built-ins but the contract wants matching lengths
    fn no_keys(len: usize) -> Vec<Value> {
        vec![Value::Null; len]
    }

    #[test]
    fn test_count_counts_values() {
        let vals = [json!(1), json!("x"), json!(null)];
        assert_eq!(count(&no_keys(3), &vals, false).unwrap(), json!(3));
    }

    #[test]
    fn test_count_rereduce_sums_counts() {
        let vals = [json!(3), json!(4)];
        assert_eq!(count(&no_keys(2), &vals, true).unwrap(), json!(7));
    }

    #[test]
    fn test_sum_stays_integral_for_integers() {
        let vals = [json!(1), json!(2), json!(39)];
        assert_eq!(sum(&no_keys(3), &vals, false).unwrap(), json!(42));
    }

    #[test]
    fn test_sum_goes_float_when_any_input_is() {
        let vals = [json!(1), json!(0.5)];
        assert_eq!(sum(&no_keys(2), &vals, false).unwrap(), json!(1.5));
    }

    #[test]
    fn test_sum_of_nothing_is_integral_zero() {
        assert_eq!(sum(&[], &[], false).unwrap(), json!(0));
    }

    #[test]
    fn test_sum_rejects_non_numeric() {
        let vals = [json!(1), json!("two")];
        let err = sum(&no_keys(2), &vals, false).unwrap_err();
        assert!(matches!(err, ReduceError::NonNumeric(_)));
    }

    #[test]
    fn test_stats_over_numbers() {
        let vals = [json!(1), json!(3), json!(2)];
        let value = stats(&no_keys(3), &vals, false).unwrap();
        assert_eq!(value["sum"], json!(6.0));
        assert_eq!(value["count"], json!(3));
        assert_eq!(value["min"], json!(1.0));
        assert_eq!(value["max"], json!(3.0));
        assert_eq!(value["sumsqr"], json!(14.0));
    }

    #[test]
    fn test_stats_rereduce_merges() {
        let parts = [
            json!({ "sum": 6.0, "count": 3, "min": 1.0, "max": 3.0, "sumsqr": 14.0 }),
            json!({ "sum": 10.0, "count": 2, "min": 4.0, "max": 6.0, "sumsqr": 52.0 }),
        ];
        let merged = stats(&no_keys(2), &parts, true).unwrap();
        assert_eq!(merged["sum"], json!(16.0));
        assert_eq!(merged["count"], json!(5));
        assert_eq!(merged["min"], json!(1.0));
        assert_eq!(merged["max"], json!(6.0));
        assert_eq!(merged["sumsqr"], json!(66.0));
    }

    #[test]
    fn test_stats_rereduce_rejects_malformed() {
        let parts = [json!({ "sum": 6.0 })];
        let err = stats(&no_keys(1), &parts, true).unwrap_err();
        assert!(matches!(err, ReduceError::Malformed(_)));
    }
}
