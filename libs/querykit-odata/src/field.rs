//! Ergonomic filter constructors anchored on a property path.
//!
//! ```
//! use querykit_odata::{compile_filter, field};
//!
//! let filter = field("age").ge(18).and(field("name").contains("jo"));
//! assert_eq!(
//!     compile_filter(&filter).unwrap(),
//!     "(age ge 18 and contains(name,'jo'))"
//! );
//! ```

use crate::ast::{FieldOp, Filter, FilterFunction, InfixOperator, Lambda};
use crate::value::{IntoValue, Value};

/// Start a filter condition on the named property.
pub fn field(name: impl Into<String>) -> Field {
    Field {
        path: vec![name.into()],
    }
}

/// A property path under construction.
#[derive(Clone, Debug)]
pub struct Field {
    path: Vec<String>,
}

impl Field {
    /// Descend into a nested property: `field("a").child("b")` → `a/b`.
    #[must_use]
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.path.push(name.into());
        self
    }

    /// Use the path itself as an expression operand (`a eq b/c`).
    #[must_use]
    pub fn reference(self) -> Filter {
        Filter::Reference(self.path)
    }

    /// Apply an arbitrary infix operator with a pre-built operand.
    #[must_use]
    pub fn cmp(self, operator: InfixOperator, operand: Filter) -> Filter {
        Filter::Field {
            path: self.path,
            op: FieldOp::Infix(operator, Box::new(operand)),
        }
    }

    /// Equality comparison: `field eq value`.
    pub fn eq(self, value: impl IntoValue) -> Filter {
        self.cmp(InfixOperator::Eq, Filter::Literal(value.into_value()))
    }

    /// Not-equal comparison: `field ne value`.
    pub fn ne(self, value: impl IntoValue) -> Filter {
        self.cmp(InfixOperator::Ne, Filter::Literal(value.into_value()))
    }

    /// Greater-than comparison: `field gt value`.
    pub fn gt(self, value: impl IntoValue) -> Filter {
        self.cmp(InfixOperator::Gt, Filter::Literal(value.into_value()))
    }

    /// Greater-or-equal comparison: `field ge value`.
    pub fn ge(self, value: impl IntoValue) -> Filter {
        self.cmp(InfixOperator::Ge, Filter::Literal(value.into_value()))
    }

    /// Less-than comparison: `field lt value`.
    pub fn lt(self, value: impl IntoValue) -> Filter {
        self.cmp(InfixOperator::Lt, Filter::Literal(value.into_value()))
    }

    /// Less-or-equal comparison: `field le value`.
    pub fn le(self, value: impl IntoValue) -> Filter {
        self.cmp(InfixOperator::Le, Filter::Literal(value.into_value()))
    }

    /// Null check: `field eq null`.
    #[must_use]
    pub fn is_null(self) -> Filter {
        self.cmp(InfixOperator::Eq, Filter::Literal(Value::Null))
    }

    /// Not-null check: `field ne null`.
    #[must_use]
    pub fn is_not_null(self) -> Filter {
        self.cmp(InfixOperator::Ne, Filter::Literal(Value::Null))
    }

    /// Membership test: `field in (v1, v2)`.
    pub fn in_values<I, V>(self, values: I) -> Filter
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        Filter::Field {
            path: self.path,
            op: FieldOp::In(
                values
                    .into_iter()
                    .map(|v| Filter::Literal(v.into_value()))
                    .collect(),
            ),
        }
    }

    /// Substring test: `contains(field, 'value')`.
    #[must_use]
    pub fn contains(self, substring: &str) -> Filter {
        self.call(
            FilterFunction::Contains,
            vec![Filter::literal(substring)],
        )
    }

    /// Prefix test: `startswith(field, 'prefix')`.
    #[must_use]
    pub fn startswith(self, prefix: &str) -> Filter {
        self.call(
            FilterFunction::StartsWith,
            vec![Filter::literal(prefix)],
        )
    }

    /// Suffix test: `endswith(field, 'suffix')`.
    #[must_use]
    pub fn endswith(self, suffix: &str) -> Filter {
        self.call(FilterFunction::EndsWith, vec![Filter::literal(suffix)])
    }

    /// Functional form with this property as first argument.
    #[must_use]
    pub fn call(self, function: FilterFunction, args: Vec<Filter>) -> Filter {
        Filter::Field {
            path: self.path,
            op: FieldOp::Call(function, args),
        }
    }

    /// Collection lambda: `field/any(alias:expr)`.
    #[must_use]
    pub fn any(self, alias: impl Into<String>, expr: Filter) -> Filter {
        Filter::Field {
            path: self.path,
            op: FieldOp::Any(Lambda::new(alias, expr)),
        }
    }

    /// Collection lambda: `field/all(alias:expr)`.
    #[must_use]
    pub fn all(self, alias: impl Into<String>, expr: Filter) -> Filter {
        Filter::Field {
            path: self.path,
            op: FieldOp::All(Lambda::new(alias, expr)),
        }
    }
}
