//! Typed OData query AST and query-string compiler.
//!
//! This crate is the grammar half of the querykit workspace: it models
//! filter predicates, expansion trees, ordering, paging, and projection as
//! a tagged-variant AST, decodes the loosely shaped JSON form of that
//! grammar into the AST, and compiles the AST into OData query-string
//! text.
//!
//! Compilation is pure, synchronous, and deterministic: identical input
//! always yields byte-identical output, so compiled strings are safe to
//! cache and compare. Syntactic correctness of the emitted text is
//! guaranteed; semantic satisfiability against a remote schema is not
//! checked here.
//!
//! # Example
//!
//! ```
//! use querykit_odata::{field, ODataOptions, SortDir};
//!
//! let options = ODataOptions::new()
//!     .with_filter(field("age").gt(18).and(field("name").contains("jo")))
//!     .with_order_by_field("name", SortDir::Asc)
//!     .with_top(25);
//!
//! let qs = options.to_query_string().unwrap();
//! assert_eq!(
//!     qs,
//!     "$filter=(age gt 18 and contains(name,'jo'))&$orderby=name asc&$top=25"
//! );
//! ```

pub mod ast;
mod compile;
mod decode;
pub mod errors;
mod field;
mod value;

pub use ast::{Expand, FieldOp, Filter, FilterFunction, InfixOperator, Lambda, RawFilter};
pub use compile::{compile_expand, compile_filter};
pub use errors::Error;
pub use field::{Field, field};
pub use value::{IntoValue, Value};

// Ordering primitives
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl std::fmt::Display for SortDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDir::Asc => write!(f, "asc"),
            SortDir::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderKey {
    pub field: String,
    pub dir: SortDir,
}

/// Ordered list of sort keys for `$orderby`.
///
/// Bare-string and string-array input imply ascending order for every
/// field listed.
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct OrderBy(pub Vec<OrderKey>);

impl OrderBy {
    /// A single ascending key.
    pub fn asc(field: impl Into<String>) -> Self {
        Self(vec![OrderKey {
            field: field.into(),
            dir: SortDir::Asc,
        }])
    }

    /// Append a sort key.
    pub fn then(mut self, field: impl Into<String>, dir: SortDir) -> Self {
        self.0.push(OrderKey {
            field: field.into(),
            dir,
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The bundle of query facets attached to one request.
///
/// All facets are optional; an absent facet contributes no fragment to the
/// compiled string (an empty `$filter=` is never emitted).
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct ODataOptions {
    pub filter: Option<Filter>,
    pub expand: Option<Expand>,
    pub select: Option<Vec<String>>,
    pub order_by: Option<OrderBy>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
}

impl ODataOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_expand(mut self, expand: Expand) -> Self {
        self.expand = Some(expand);
        self
    }

    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    /// Append a single sort key, creating the `$orderby` facet on first use.
    pub fn with_order_by_field(mut self, field: impl Into<String>, dir: SortDir) -> Self {
        let order = self.order_by.take().unwrap_or_default();
        self.order_by = Some(order.then(field, dir));
        self
    }

    pub fn with_top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Check whether any facet is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filter.is_none()
            && self.expand.is_none()
            && self.select.is_none()
            && self.order_by.as_ref().is_none_or(OrderBy::is_empty)
            && self.top.is_none()
            && self.skip.is_none()
    }
}
