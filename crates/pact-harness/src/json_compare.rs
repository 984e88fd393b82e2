// crates/pact-harness/src/json_compare.rs
// ============================================================================
// Module: Lenient JSON Comparison
// Description: Structural comparison of expected and actual JSON bodies.
// Purpose: Decide whether a response body satisfies a declared pact body.
// Dependencies: bigdecimal, serde_json
// ============================================================================

//! ## Overview
//! Comparison is lenient in the way contract bodies are usually checked:
//! - Objects are extensible: the actual object may carry extra members.
//! - Arrays must have the same length; element order does not matter.
//! - Numbers compare as decimals, so `1` and `1.0` are equal.
//! - Every other value must be equal.
//!
//! Unordered arrays are matched with augmenting paths, so an element is only
//! reported missing when no one-to-one assignment exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Comparison
// ============================================================================

/// Returns every difference between `expected` and `actual`.
///
/// An empty result means the actual value satisfies the expectation. Paths
/// use `$` for the root, `.name` for members, and `[i]` for array elements.
#[must_use]
pub fn lenient_mismatches(expected: &Value, actual: &Value) -> Vec<String> {
    let mut mismatches = Vec::new();
    compare(expected, actual, "$", &mut mismatches);
    mismatches
}

/// Returns true when `actual` satisfies `expected`.
#[must_use]
pub fn lenient_matches(expected: &Value, actual: &Value) -> bool {
    lenient_mismatches(expected, actual).is_empty()
}

/// Compares one value pair, recording differences under `path`.
fn compare(expected: &Value, actual: &Value, path: &str, out: &mut Vec<String>) {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            for (name, expected_value) in expected {
                let member = format!("{path}.{name}");
                match actual.get(name) {
                    Some(actual_value) => compare(expected_value, actual_value, &member, out),
                    None => out.push(format!("{member}: expected {expected_value} but was missing")),
                }
            }
        }
        (Value::Array(expected), Value::Array(actual)) => {
            if expected.len() != actual.len() {
                out.push(format!(
                    "{path}: expected {} element(s) but found {}",
                    expected.len(),
                    actual.len()
                ));
                return;
            }
            for index in unmatched_elements(expected, actual) {
                if let Some(element) = expected.get(index) {
                    out.push(format!("{path}[{index}]: no matching element for {element}"));
                }
            }
        }
        (Value::Number(expected_number), Value::Number(actual_number)) => {
            if !decimal_equals(expected_number, actual_number) {
                out.push(format!("{path}: expected {expected} but was {actual}"));
            }
        }
        _ => {
            if expected != actual {
                out.push(format!("{path}: expected {expected} but was {actual}"));
            }
        }
    }
}

/// Returns the indices of expected elements left without an actual partner.
fn unmatched_elements(expected: &[Value], actual: &[Value]) -> Vec<usize> {
    let candidates: Vec<Vec<usize>> = expected
        .iter()
        .map(|element| {
            actual
                .iter()
                .enumerate()
                .filter(|(_, candidate)| lenient_matches(element, candidate))
                .map(|(index, _)| index)
                .collect()
        })
        .collect();
    let mut owners: Vec<Option<usize>> = vec![None; actual.len()];
    let mut unmatched = Vec::new();
    for index in 0 .. expected.len() {
        let mut visited = vec![false; actual.len()];
        if !assign(index, &candidates, &mut owners, &mut visited) {
            unmatched.push(index);
        }
    }
    unmatched
}

/// Tries to assign an expected element, displacing earlier owners if needed.
fn assign(
    index: usize,
    candidates: &[Vec<usize>],
    owners: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    let Some(options) = candidates.get(index) else {
        return false;
    };
    for &slot in options {
        if visited.get(slot).copied().unwrap_or(true) {
            continue;
        }
        if let Some(seen) = visited.get_mut(slot) {
            *seen = true;
        }
        let free = match owners.get(slot).copied().flatten() {
            None => true,
            Some(owner) => assign(owner, candidates, owners, visited),
        };
        if free {
            if let Some(entry) = owners.get_mut(slot) {
                *entry = Some(index);
            }
            return true;
        }
    }
    false
}

/// Compares numbers by parsing them into `BigDecimal` values.
fn decimal_equals(left: &Number, right: &Number) -> bool {
    if left == right {
        return true;
    }
    match (decimal_from_number(left), decimal_from_number(right)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Parses a JSON number into `BigDecimal` with a stable string representation.
fn decimal_from_number(number: &Number) -> Option<BigDecimal> {
    BigDecimal::from_str(&number.to_string()).ok()
}
