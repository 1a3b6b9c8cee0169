//! AST-to-text compilation.
//!
//! Everything here is pure and deterministic: the same AST always compiles
//! to the same string. Malformed shapes that the AST can still represent
//! (empty groups, empty `$in` sets, raw-template arity mismatches) are
//! rejected rather than silently dropped.

use crate::ODataOptions;
use crate::ast::{Expand, FieldOp, Filter, RawFilter};
use crate::errors::Error;

/// Compile a filter predicate into `$filter` fragment text.
pub fn compile_filter(filter: &Filter) -> Result<String, Error> {
    match filter {
        Filter::Literal(value) => Ok(value.to_odata_literal()),
        Filter::Reference(path) => compile_path(path),
        Filter::Group(items) => {
            let parts = compile_list(items, "filter group")?;
            if parts.len() == 1 {
                Ok(parts.into_iter().next().unwrap_or_default())
            } else {
                Ok(format!("({})", parts.join(" and ")))
            }
        }
        Filter::AllOf(items) => {
            let parts = compile_list(items, "filter object")?;
            Ok(parts.join(" and "))
        }
        Filter::And(items) => {
            let parts = compile_list(items, "$and")?;
            Ok(format!("({})", parts.join(" and ")))
        }
        Filter::Or(items) => {
            let parts = compile_list(items, "$or")?;
            Ok(format!("({})", parts.join(" or ")))
        }
        Filter::Not(inner) => Ok(format!("not ({})", compile_filter(inner)?)),
        Filter::Field { path, op } => compile_field(path, op),
        Filter::Call(function, args) => {
            let compiled: Vec<String> = args
                .iter()
                .map(compile_filter)
                .collect::<Result<_, _>>()?;
            Ok(format!("{function}({})", compiled.join(",")))
        }
        Filter::Raw(raw) => compile_raw(raw),
    }
}

fn compile_list(items: &[Filter], what: &str) -> Result<Vec<String>, Error> {
    if items.is_empty() {
        return Err(Error::MalformedFilter(format!("empty {what}")));
    }
    items.iter().map(compile_filter).collect()
}

fn compile_path(path: &[String]) -> Result<String, Error> {
    if path.is_empty() {
        return Err(Error::MalformedFilter("empty property path".to_owned()));
    }
    Ok(path.join("/"))
}

fn compile_field(path: &[String], op: &FieldOp) -> Result<String, Error> {
    let property = compile_path(path)?;
    match op {
        FieldOp::Infix(operator, operand) => {
            Ok(format!("{property} {operator} {}", compile_filter(operand)?))
        }
        FieldOp::Call(function, args) => {
            let mut compiled = Vec::with_capacity(args.len() + 1);
            compiled.push(property);
            for arg in args {
                compiled.push(compile_filter(arg)?);
            }
            Ok(format!("{function}({})", compiled.join(",")))
        }
        FieldOp::In(values) => {
            if values.is_empty() {
                return Err(Error::MalformedFilter("empty $in set".to_owned()));
            }
            let compiled: Vec<String> = values
                .iter()
                .map(compile_filter)
                .collect::<Result<_, _>>()?;
            Ok(format!("{property} in ({})", compiled.join(", ")))
        }
        FieldOp::Any(lambda) => Ok(format!(
            "{property}/any({}:{})",
            lambda.alias,
            compile_filter(&lambda.expr)?
        )),
        FieldOp::All(lambda) => Ok(format!(
            "{property}/all({}:{})",
            lambda.alias,
            compile_filter(&lambda.expr)?
        )),
    }
}

fn compile_raw(raw: &RawFilter) -> Result<String, Error> {
    match raw {
        RawFilter::Verbatim(text) => Ok(text.clone()),
        RawFilter::Positional { template, operands } => {
            substitute(template, |name| {
                let index: usize = name.parse().ok()?;
                index.checked_sub(1).and_then(|i| operands.get(i))
            })
        }
        RawFilter::Named { template, bindings } => substitute_named(template, bindings),
    }
}

/// Replace `$<digits>` placeholders via the lookup; a placeholder with no
/// matching operand is an arity mismatch.
fn substitute<'a>(
    template: &str,
    lookup: impl Fn(&str) -> Option<&'a Filter>,
) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&d) = chars.peek() {
            if d.is_ascii_digit() {
                name.push(d);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            out.push('$');
            continue;
        }
        let operand = lookup(&name).ok_or_else(|| {
            Error::MalformedFilter(format!("raw template references ${name} with no operand"))
        })?;
        out.push_str(&compile_filter(operand)?);
    }
    Ok(out)
}

/// Replace `$name` placeholders from the bindings; unknown names are left
/// verbatim so raw text may still mention `$`-prefixed protocol tokens.
fn substitute_named(template: &str, bindings: &[(String, Filter)]) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&d) = chars.peek() {
            if d.is_ascii_alphanumeric() || d == '_' {
                name.push(d);
                chars.next();
            } else {
                break;
            }
        }
        match bindings.iter().find(|(key, _)| *key == name) {
            Some((_, operand)) => out.push_str(&compile_filter(operand)?),
            None => {
                out.push('$');
                out.push_str(&name);
            }
        }
    }
    Ok(out)
}

/// Compile an expansion tree into `$expand` fragment text.
pub fn compile_expand(expand: &Expand) -> Result<String, Error> {
    match expand {
        Expand::Resource(name) => Ok(name.clone()),
        Expand::Many(entries) => {
            if entries.is_empty() {
                return Err(Error::MalformedFilter("empty $expand list".to_owned()));
            }
            let compiled: Vec<String> = entries
                .iter()
                .map(compile_expand)
                .collect::<Result<_, _>>()?;
            Ok(compiled.join(","))
        }
        Expand::Nested { resource, options } => {
            if options.is_empty() {
                return Ok(resource.clone());
            }
            Ok(format!("{resource}({})", options.fragments()?.join(";")))
        }
    }
}

impl ODataOptions {
    /// Compile the facet bundle into a `&`-joined query string.
    ///
    /// The fragment order is fixed (`$filter`, `$expand`, `$select`,
    /// `$orderby`, `$top`, `$skip`) and only facets present in the input
    /// appear. Downstream systems may depend on this ordering bit for bit.
    pub fn to_query_string(&self) -> Result<String, Error> {
        Ok(self.fragments()?.join("&"))
    }

    pub(crate) fn fragments(&self) -> Result<Vec<String>, Error> {
        let mut fragments = Vec::new();
        if let Some(filter) = &self.filter {
            fragments.push(format!("$filter={}", compile_filter(filter)?));
        }
        if let Some(expand) = &self.expand {
            fragments.push(format!("$expand={}", compile_expand(expand)?));
        }
        if let Some(select) = &self.select {
            if !select.is_empty() {
                fragments.push(format!("$select={}", select.join(",")));
            }
        }
        if let Some(order) = &self.order_by {
            if !order.is_empty() {
                let keys: Vec<String> = order
                    .0
                    .iter()
                    .map(|key| format!("{} {}", key.field, key.dir))
                    .collect();
                fragments.push(format!("$orderby={}", keys.join(",")));
            }
        }
        if let Some(top) = self.top {
            fragments.push(format!("$top={top}"));
        }
        if let Some(skip) = self.skip {
            fragments.push(format!("$skip={skip}"));
        }
        Ok(fragments)
    }
}
