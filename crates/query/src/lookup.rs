//! Lookup specification parsing
//!
//! A lookup spec is a dotted attribute path with an optional comparison verb
//! suffix: `path[__verb]`. The double underscore is the reserved separator;
//! the final `__`-delimited segment is treated as a verb only when it names
//! one, so attributes whose names happen to contain underscores still
//! resolve. Without a verb the lookup is an equality test.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// Comparison verb recognized in a lookup specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Equality (the default when no verb is given)
    Exact,
    /// Case-insensitive equality
    IExact,
    /// Containment: substring, subslice, list element, or map key
    Contains,
    /// Case-insensitive containment
    IContains,
    /// String or bytes prefix
    StartsWith,
    /// Case-insensitive prefix
    IStartsWith,
    /// String or bytes suffix
    EndsWith,
    /// Case-insensitive suffix
    IEndsWith,
    /// Strictly greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Strictly less than
    Lt,
    /// Less than or equal
    Lte,
    /// Membership of the resolved value in the operand container
    In,
    /// Case-insensitive membership
    IIn,
    /// Absence test: path unresolved or resolved to Null
    IsNone,
}

impl Verb {
    /// The spelling used in lookup specs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Exact => "exact",
            Verb::IExact => "iexact",
            Verb::Contains => "contains",
            Verb::IContains => "icontains",
            Verb::StartsWith => "startswith",
            Verb::IStartsWith => "istartswith",
            Verb::EndsWith => "endswith",
            Verb::IEndsWith => "iendswith",
            Verb::Gt => "gt",
            Verb::Gte => "gte",
            Verb::Lt => "lt",
            Verb::Lte => "lte",
            Verb::In => "in",
            Verb::IIn => "iin",
            Verb::IsNone => "isnone",
        }
    }
}

static VERB_TABLE: Lazy<FxHashMap<&'static str, Verb>> = Lazy::new(|| {
    let mut table = FxHashMap::default();
    for verb in [
        Verb::Exact,
        Verb::IExact,
        Verb::Contains,
        Verb::IContains,
        Verb::StartsWith,
        Verb::IStartsWith,
        Verb::EndsWith,
        Verb::IEndsWith,
        Verb::Gt,
        Verb::Gte,
        Verb::Lt,
        Verb::Lte,
        Verb::In,
        Verb::IIn,
        Verb::IsNone,
    ] {
        table.insert(verb.as_str(), verb);
    }
    table
});

/// Split a lookup spec into its path and verb
///
/// The split happens at the last `__`; anything else in the spec, dots
/// included, belongs to the path. A suffix that is not a known verb keeps
/// the whole spec as the path with an equality verb.
pub fn parse_lookup(spec: &str) -> (&str, Verb) {
    match spec.rsplit_once("__") {
        Some((path, suffix)) => match VERB_TABLE.get(suffix) {
            Some(verb) => (path, *verb),
            None => (spec, Verb::Exact),
        },
        None => (spec, Verb::Exact),
    }
}
