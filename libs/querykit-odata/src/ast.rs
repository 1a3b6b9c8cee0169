//! Tagged-variant AST for filter and expand expressions.
//!
//! The wire grammar is a dynamically shaped object language; here every
//! shape gets its own constructor so that operator-vs-property-vs-combinator
//! ambiguity is resolved when a value is built, not when it is compiled.

use std::fmt;

use crate::ODataOptions;
use crate::value::{IntoValue, Value};

/// A filter predicate over resource properties.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// A bare literal used as a positional condition.
    Literal(Value),
    /// A property-path expression (`a/b/c`), letting a string denote a
    /// property instead of a quoted literal.
    Reference(Vec<String>),
    /// An ordered sequence of conditions ANDed positionally; parenthesized
    /// when it holds more than one element.
    Group(Vec<Filter>),
    /// Implicit conjunction of sibling conditions from one filter object;
    /// joined with ` and ` but never parenthesized itself.
    AllOf(Vec<Filter>),
    /// Explicit conjunction, always parenthesized.
    And(Vec<Filter>),
    /// Explicit disjunction, always parenthesized.
    Or(Vec<Filter>),
    /// Negation: `not (<operand>)`.
    Not(Box<Filter>),
    /// A condition anchored on a property path.
    Field { path: Vec<String>, op: FieldOp },
    /// A standalone function expression, e.g. `now()`.
    Call(FilterFunction, Vec<Filter>),
    /// Grammar escape hatch: emitted verbatim after placeholder
    /// substitution, never re-parsed.
    Raw(RawFilter),
}

impl Filter {
    /// Combine two filters with AND: `(left and right)`.
    #[must_use]
    pub fn and(self, other: Filter) -> Filter {
        Filter::And(vec![self, other])
    }

    /// Combine two filters with OR: `(left or right)`.
    #[must_use]
    pub fn or(self, other: Filter) -> Filter {
        Filter::Or(vec![self, other])
    }

    /// Negate a filter: `not (expr)`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Filter {
        !self
    }

    /// A literal condition from any convertible value.
    pub fn literal(value: impl IntoValue) -> Filter {
        Filter::Literal(value.into_value())
    }

    /// A verbatim raw fragment that bypasses the grammar entirely.
    pub fn raw(text: impl Into<String>) -> Filter {
        Filter::Raw(RawFilter::Verbatim(text.into()))
    }
}

impl std::ops::Not for Filter {
    type Output = Filter;

    fn not(self) -> Self::Output {
        Filter::Not(Box::new(self))
    }
}

/// The condition applied to a property path inside [`Filter::Field`].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldOp {
    /// Infix form: `path <op> <operand>`. Bare scalars imply `Eq`.
    Infix(InfixOperator, Box<Filter>),
    /// Functional form with the property as first argument:
    /// `contains(name,'x')`; unary functions take the property only.
    Call(FilterFunction, Vec<Filter>),
    /// Membership: `path in (v1, v2)`.
    In(Vec<Filter>),
    /// Collection lambda: `path/any(alias:expr)`.
    Any(Lambda),
    /// Collection lambda: `path/all(alias:expr)`.
    All(Lambda),
}

/// A bound-alias sub-expression for filtering over a related collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Lambda {
    pub alias: String,
    pub expr: Box<Filter>,
}

impl Lambda {
    pub fn new(alias: impl Into<String>, expr: Filter) -> Self {
        Self {
            alias: alias.into(),
            expr: Box::new(expr),
        }
    }
}

/// Infix comparison and arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfixOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl InfixOperator {
    /// Look up an operator by its bare key name (`"gt"` for `$gt`).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "eq" => InfixOperator::Eq,
            "ne" => InfixOperator::Ne,
            "gt" => InfixOperator::Gt,
            "ge" => InfixOperator::Ge,
            "lt" => InfixOperator::Lt,
            "le" => InfixOperator::Le,
            "add" => InfixOperator::Add,
            "sub" => InfixOperator::Sub,
            "mul" => InfixOperator::Mul,
            "div" => InfixOperator::Div,
            "mod" => InfixOperator::Mod,
            _ => return None,
        })
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfixOperator::Eq => write!(f, "eq"),
            InfixOperator::Ne => write!(f, "ne"),
            InfixOperator::Gt => write!(f, "gt"),
            InfixOperator::Ge => write!(f, "ge"),
            InfixOperator::Lt => write!(f, "lt"),
            InfixOperator::Le => write!(f, "le"),
            InfixOperator::Add => write!(f, "add"),
            InfixOperator::Sub => write!(f, "sub"),
            InfixOperator::Mul => write!(f, "mul"),
            InfixOperator::Div => write!(f, "div"),
            InfixOperator::Mod => write!(f, "mod"),
        }
    }
}

/// The OData function vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterFunction {
    Contains,
    EndsWith,
    StartsWith,
    Length,
    IndexOf,
    Substring,
    ToLower,
    ToUpper,
    Trim,
    Concat,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    FractionalSeconds,
    Date,
    Time,
    TotalOffsetMinutes,
    Now,
    MaxDateTime,
    MinDateTime,
    TotalSeconds,
    Round,
    Floor,
    Ceiling,
    IsOf,
    Cast,
}

impl FilterFunction {
    /// Look up a function by its bare key name (`"contains"` for
    /// `$contains`).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "contains" => FilterFunction::Contains,
            "endswith" => FilterFunction::EndsWith,
            "startswith" => FilterFunction::StartsWith,
            "length" => FilterFunction::Length,
            "indexof" => FilterFunction::IndexOf,
            "substring" => FilterFunction::Substring,
            "tolower" => FilterFunction::ToLower,
            "toupper" => FilterFunction::ToUpper,
            "trim" => FilterFunction::Trim,
            "concat" => FilterFunction::Concat,
            "year" => FilterFunction::Year,
            "month" => FilterFunction::Month,
            "day" => FilterFunction::Day,
            "hour" => FilterFunction::Hour,
            "minute" => FilterFunction::Minute,
            "second" => FilterFunction::Second,
            "fractionalseconds" => FilterFunction::FractionalSeconds,
            "date" => FilterFunction::Date,
            "time" => FilterFunction::Time,
            "totaloffsetminutes" => FilterFunction::TotalOffsetMinutes,
            "now" => FilterFunction::Now,
            "maxdatetime" => FilterFunction::MaxDateTime,
            "mindatetime" => FilterFunction::MinDateTime,
            "totalseconds" => FilterFunction::TotalSeconds,
            "round" => FilterFunction::Round,
            "floor" => FilterFunction::Floor,
            "ceiling" => FilterFunction::Ceiling,
            "isof" => FilterFunction::IsOf,
            "cast" => FilterFunction::Cast,
            _ => return None,
        })
    }
}

impl fmt::Display for FilterFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterFunction::Contains => "contains",
            FilterFunction::EndsWith => "endswith",
            FilterFunction::StartsWith => "startswith",
            FilterFunction::Length => "length",
            FilterFunction::IndexOf => "indexof",
            FilterFunction::Substring => "substring",
            FilterFunction::ToLower => "tolower",
            FilterFunction::ToUpper => "toupper",
            FilterFunction::Trim => "trim",
            FilterFunction::Concat => "concat",
            FilterFunction::Year => "year",
            FilterFunction::Month => "month",
            FilterFunction::Day => "day",
            FilterFunction::Hour => "hour",
            FilterFunction::Minute => "minute",
            FilterFunction::Second => "second",
            FilterFunction::FractionalSeconds => "fractionalseconds",
            FilterFunction::Date => "date",
            FilterFunction::Time => "time",
            FilterFunction::TotalOffsetMinutes => "totaloffsetminutes",
            FilterFunction::Now => "now",
            FilterFunction::MaxDateTime => "maxdatetime",
            FilterFunction::MinDateTime => "mindatetime",
            FilterFunction::TotalSeconds => "totalseconds",
            FilterFunction::Round => "round",
            FilterFunction::Floor => "floor",
            FilterFunction::Ceiling => "ceiling",
            FilterFunction::IsOf => "isof",
            FilterFunction::Cast => "cast",
        };
        write!(f, "{name}")
    }
}

/// Free-form raw filter text with optional placeholder substitution.
///
/// The one place where arbitrary text bypasses escaping; what goes in comes
/// out verbatim, so the caller owns its correctness.
#[derive(Clone, Debug, PartialEq)]
pub enum RawFilter {
    /// Emitted unchanged.
    Verbatim(String),
    /// `$1`-based positional placeholders replaced by compiled operands.
    Positional {
        template: String,
        operands: Vec<Filter>,
    },
    /// `$name` placeholders replaced by compiled bindings.
    Named {
        template: String,
        bindings: Vec<(String, Filter)>,
    },
}

/// A directive to inline related-resource data.
#[derive(Clone, Debug, PartialEq)]
pub enum Expand {
    /// A bare relation name.
    Resource(String),
    /// Comma-joined entries (array form or sibling keys).
    Many(Vec<Expand>),
    /// A relation expanded with its own nested query options:
    /// `resource($filter=...;$select=...)`.
    Nested {
        resource: String,
        options: Box<ODataOptions>,
    },
}

impl Expand {
    /// Expand a relation by name.
    pub fn resource(name: impl Into<String>) -> Expand {
        Expand::Resource(name.into())
    }

    /// Expand a relation with nested query options.
    pub fn nested(name: impl Into<String>, options: ODataOptions) -> Expand {
        Expand::Nested {
            resource: name.into(),
            options: Box::new(options),
        }
    }
}
