//! Value comparison and verb application
//!
//! Two fallible entry points:
//! - [`compare`] gives a total order across compatible value types and is
//!   what `gt`/`gte`/`lt`/`lte` and result ordering build on.
//! - [`apply_verb`] evaluates one comparison verb against a resolved value
//!   and its operand.
//!
//! Both surface [`Error::TypeMismatch`] when the operand types cannot
//! support the operation; the caller decides where that error stops. All
//! type conflicts are evaluation-time, never parse-time.

use crate::lookup::Verb;
use reposit_core::{Error, Result, Value};
use std::cmp::Ordering;

fn mismatch(op: &'static str, lhs: &Value, rhs: &Value) -> Error {
    Error::TypeMismatch {
        op,
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

// IEEE order where defined; NaN falls back to the total order
fn float_cmp(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
}

/// Compare two values, if their types admit an order
///
/// Int and Float compare numerically. Strings, bytes and booleans compare
/// by their natural orders, lists lexicographically element by element, and
/// Null equals Null. Every other pairing, Map and Ref included, is a
/// `TypeMismatch`.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => Ok(float_cmp(*x, *y)),
        (Value::Int(x), Value::Float(y)) => Ok(float_cmp(*x as f64, *y)),
        (Value::Float(x), Value::Int(y)) => Ok(float_cmp(*x, *y as f64)),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Bytes(x), Value::Bytes(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::List(x), Value::List(y)) => {
            for (xi, yi) in x.iter().zip(y.iter()) {
                match compare(xi, yi)? {
                    Ordering::Equal => continue,
                    decided => return Ok(decided),
                }
            }
            Ok(x.len().cmp(&y.len()))
        }
        _ => Err(mismatch("ordering", a, b)),
    }
}

/// Apply a comparison verb to a resolved value and its operand
///
/// `IsNone` here only sees resolved values, so absence reduces to a Null
/// check; the predicate layer handles unresolved paths before calling in.
pub fn apply_verb(verb: Verb, resolved: &Value, operand: &Value) -> Result<bool> {
    let op = verb.as_str();
    match verb {
        Verb::Exact => Ok(resolved == operand),
        Verb::IExact => Ok(folded_eq(resolved, operand)),
        Verb::Contains => contains(op, resolved, operand, false),
        Verb::IContains => contains(op, resolved, operand, true),
        Verb::StartsWith => affix(op, resolved, operand, false, false),
        Verb::IStartsWith => affix(op, resolved, operand, false, true),
        Verb::EndsWith => affix(op, resolved, operand, true, false),
        Verb::IEndsWith => affix(op, resolved, operand, true, true),
        Verb::Gt => Ok(compare(resolved, operand)? == Ordering::Greater),
        Verb::Gte => Ok(compare(resolved, operand)? != Ordering::Less),
        Verb::Lt => Ok(compare(resolved, operand)? == Ordering::Less),
        Verb::Lte => Ok(compare(resolved, operand)? != Ordering::Greater),
        Verb::In => member_of(op, resolved, operand, false),
        Verb::IIn => member_of(op, resolved, operand, true),
        Verb::IsNone => match operand {
            Value::Bool(want) => Ok(resolved.is_null() == *want),
            _ => Err(mismatch(op, resolved, operand)),
        },
    }
}

/// Case-insensitive equality; non-string pairs fall back to plain equality
fn folded_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.to_lowercase() == y.to_lowercase(),
        _ => a == b,
    }
}

fn subslice(haystack: &[u8], needle: &[u8], fold: bool) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| {
        if fold {
            w.eq_ignore_ascii_case(needle)
        } else {
            w == needle
        }
    })
}

/// `resolved` is the container: substring, byte subslice, list element, map key
fn contains(op: &'static str, resolved: &Value, operand: &Value, fold: bool) -> Result<bool> {
    match resolved {
        Value::String(s) => match operand {
            Value::String(sub) => Ok(if fold {
                s.to_lowercase().contains(&sub.to_lowercase())
            } else {
                s.contains(sub.as_str())
            }),
            _ => Err(mismatch(op, resolved, operand)),
        },
        Value::Bytes(b) => match operand {
            Value::Bytes(sub) => Ok(subslice(b, sub, fold)),
            _ => Err(mismatch(op, resolved, operand)),
        },
        Value::List(items) => Ok(items.iter().any(|item| {
            if fold {
                folded_eq(item, operand)
            } else {
                item == operand
            }
        })),
        Value::Map(map) => match operand {
            Value::String(key) => Ok(if fold {
                let folded = key.to_lowercase();
                map.keys().any(|k| k.to_lowercase() == folded)
            } else {
                map.contains_key(key)
            }),
            // Map keys are strings; anything else is never a member
            _ => Ok(false),
        },
        _ => Err(mismatch(op, resolved, operand)),
    }
}

/// `operand` is the container; mirrors [`contains`] with the sides swapped
fn member_of(op: &'static str, resolved: &Value, operand: &Value, fold: bool) -> Result<bool> {
    match operand {
        Value::List(items) => Ok(items.iter().any(|item| {
            if fold {
                folded_eq(item, resolved)
            } else {
                item == resolved
            }
        })),
        Value::String(s) => match resolved {
            Value::String(sub) => Ok(if fold {
                s.to_lowercase().contains(&sub.to_lowercase())
            } else {
                s.contains(sub.as_str())
            }),
            _ => Err(mismatch(op, resolved, operand)),
        },
        Value::Bytes(b) => match resolved {
            Value::Bytes(sub) => Ok(subslice(b, sub, fold)),
            _ => Err(mismatch(op, resolved, operand)),
        },
        Value::Map(map) => match resolved {
            Value::String(key) => Ok(if fold {
                let folded = key.to_lowercase();
                map.keys().any(|k| k.to_lowercase() == folded)
            } else {
                map.contains_key(key)
            }),
            _ => Ok(false),
        },
        _ => Err(mismatch(op, resolved, operand)),
    }
}

fn affix(
    op: &'static str,
    resolved: &Value,
    operand: &Value,
    suffix: bool,
    fold: bool,
) -> Result<bool> {
    match (resolved, operand) {
        (Value::String(s), Value::String(a)) => Ok(if fold {
            let (s, a) = (s.to_lowercase(), a.to_lowercase());
            if suffix {
                s.ends_with(&a)
            } else {
                s.starts_with(&a)
            }
        } else if suffix {
            s.ends_with(a.as_str())
        } else {
            s.starts_with(a.as_str())
        }),
        (Value::Bytes(b), Value::Bytes(a)) => {
            if a.len() > b.len() {
                return Ok(false);
            }
            let window = if suffix {
                &b[b.len() - a.len()..]
            } else {
                &b[..a.len()]
            };
            Ok(if fold {
                window.eq_ignore_ascii_case(a)
            } else {
                window == a.as_slice()
            })
        }
        _ => Err(mismatch(op, resolved, operand)),
    }
}
