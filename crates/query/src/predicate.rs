//! Composable predicate trees
//!
//! A [`Predicate`] is an immutable expression tree over lookup atoms.
//! Construction never fails; all type conflicts surface when the predicate
//! is evaluated against a record. Atoms whose path does not resolve are
//! simply non-matching, except under the `isnone` verb where absence is the
//! condition being tested.
//!
//! Predicates compose with [`and`](Predicate::and), [`or`](Predicate::or)
//! and [`negate`](Predicate::negate), or the `&`, `|` and `!` operators.
//! [`Predicate::Everything`] is the neutral element for conjunction, which
//! is what makes an empty filter spec mean "match all".

use crate::compare::apply_verb;
use crate::lookup::{parse_lookup, Verb};
use reposit_core::{AttributeResolver, Error, Record, RefSource, Resolution, Result, Value};
use std::ops::{BitAnd, BitOr, Not};

/// Immutable predicate expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record; conjunction-neutral
    Everything,
    /// One lookup: a dotted path, a verb, and the operand to compare with
    Atom {
        /// Dotted attribute path
        path: String,
        /// Comparison verb
        verb: Verb,
        /// Right-hand operand
        operand: Value,
    },
    /// Both sides must match; evaluates left to right, short-circuits
    And(Box<Predicate>, Box<Predicate>),
    /// Either side must match; evaluates left to right, short-circuits
    Or(Box<Predicate>, Box<Predicate>),
    /// Inverts the inner predicate
    Not(Box<Predicate>),
}

impl Predicate {
    /// Build an atom from a lookup spec and operand
    ///
    /// ```
    /// use reposit_query::{Predicate, Verb};
    ///
    /// let p = Predicate::new("pages__gte", 100);
    /// assert!(matches!(p, Predicate::Atom { verb: Verb::Gte, .. }));
    /// ```
    pub fn new(spec: &str, operand: impl Into<Value>) -> Self {
        let (path, verb) = parse_lookup(spec);
        Predicate::Atom {
            path: path.to_string(),
            verb,
            operand: operand.into(),
        }
    }

    /// The predicate that matches every record
    pub fn everything() -> Self {
        Predicate::Everything
    }

    /// Conjunction; `Everything` operands are elided
    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::Everything, p) | (p, Predicate::Everything) => p,
            (l, r) => Predicate::And(Box::new(l), Box::new(r)),
        }
    }

    /// Disjunction; a side matching everything makes the whole match everything
    pub fn or(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::Everything, _) | (_, Predicate::Everything) => Predicate::Everything,
            (l, r) => Predicate::Or(Box::new(l), Box::new(r)),
        }
    }

    /// Negation; double negation unwraps
    pub fn negate(self) -> Self {
        match self {
            Predicate::Not(inner) => *inner,
            p => Predicate::Not(Box::new(p)),
        }
    }

    /// Evaluate against one record
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when a verb meets operand types it cannot
    /// compare. Unresolvable paths do not error here; they make the atom
    /// non-matching.
    pub fn matches(&self, record: &Record, refs: &dyn RefSource) -> Result<bool> {
        match self {
            Predicate::Everything => Ok(true),
            Predicate::Atom {
                path,
                verb,
                operand,
            } => {
                let resolution = AttributeResolver::new(refs).resolve(record, path);
                match resolution {
                    Resolution::Absent => match verb {
                        Verb::IsNone => match operand {
                            Value::Bool(want) => Ok(*want),
                            _ => Err(Error::TypeMismatch {
                                op: "isnone",
                                lhs: "Null",
                                rhs: operand.type_name(),
                            }),
                        },
                        _ => Ok(false),
                    },
                    Resolution::Found(value) => apply_verb(*verb, &value, operand),
                }
            }
            Predicate::And(l, r) => Ok(l.matches(record, refs)? && r.matches(record, refs)?),
            Predicate::Or(l, r) => Ok(l.matches(record, refs)? || r.matches(record, refs)?),
            Predicate::Not(p) => Ok(!p.matches(record, refs)?),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

// ============================================================================
// Filter specification conversions
// ============================================================================

/// Anything that can stand where a filter specification is expected
///
/// Covers a ready-made [`Predicate`], a single `(spec, operand)` pair, and
/// collections of pairs (AND-combined, so a multi-pair spec reads like a
/// keyword-argument lookup).
pub trait IntoPredicate {
    /// Build the predicate this specification describes
    fn into_predicate(self) -> Predicate;
}

impl IntoPredicate for Predicate {
    fn into_predicate(self) -> Predicate {
        self
    }
}

impl IntoPredicate for &Predicate {
    fn into_predicate(self) -> Predicate {
        self.clone()
    }
}

impl<V: Into<Value>> IntoPredicate for (&str, V) {
    fn into_predicate(self) -> Predicate {
        Predicate::new(self.0, self.1)
    }
}

impl<V: Into<Value>, const N: usize> IntoPredicate for [(&str, V); N] {
    fn into_predicate(self) -> Predicate {
        self.into_iter()
            .fold(Predicate::everything(), |acc, (spec, operand)| {
                acc.and(Predicate::new(spec, operand))
            })
    }
}

impl<V: Into<Value> + Clone> IntoPredicate for &[(&str, V)] {
    fn into_predicate(self) -> Predicate {
        self.iter()
            .fold(Predicate::everything(), |acc, (spec, operand)| {
                acc.and(Predicate::new(spec, operand.clone()))
            })
    }
}

impl<V: Into<Value>> IntoPredicate for Vec<(&str, V)> {
    fn into_predicate(self) -> Predicate {
        self.into_iter()
            .fold(Predicate::everything(), |acc, (spec, operand)| {
                acc.and(Predicate::new(spec, operand))
            })
    }
}
