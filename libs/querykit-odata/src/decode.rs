//! Decoding the loosely shaped JSON form of the grammar into the AST.
//!
//! The wire grammar dispatches on `$`-prefixed key names inside nested
//! objects. This module is the single place where that shape is validated:
//! every key resolves to exactly one AST constructor, and multiple keys in
//! one object are conjoined in key order (the implicit-AND rule). Key order
//! is preserved by serde_json's ordered map, which compilation depends on.

use serde_json::{Map, Value as Json};

use crate::ast::{Expand, FieldOp, Filter, FilterFunction, InfixOperator, Lambda, RawFilter};
use crate::errors::Error;
use crate::value::Value;
use crate::{ODataOptions, OrderBy, OrderKey, SortDir};

impl Value {
    /// Decode a single JSON scalar into a literal.
    ///
    /// # Errors
    /// Returns `Error::UnsupportedLiteralType` for arrays and objects, which
    /// have no literal rendering.
    pub fn from_json(value: &Json) -> Result<Self, Error> {
        match value {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => n
                .to_string()
                .parse()
                .map(Value::Number)
                .map_err(|_| Error::UnsupportedLiteralType(format!("unrepresentable number {n}"))),
            Json::String(s) => Ok(Value::String(s.clone())),
            Json::Array(_) => Err(Error::UnsupportedLiteralType(
                "an array is not a literal".to_owned(),
            )),
            Json::Object(_) => Err(Error::UnsupportedLiteralType(
                "an object is not a literal".to_owned(),
            )),
        }
    }
}

impl Filter {
    /// Decode a JSON filter expression into the AST.
    ///
    /// # Errors
    /// Returns `Error::MalformedFilter` for grammar violations: empty
    /// objects or arrays, operator keys with no enclosing property,
    /// lambdas outside `$any`/`$all`, and unrecognized `$`-keys.
    pub fn from_json(value: &Json) -> Result<Self, Error> {
        decode_filter(value)
    }
}

fn decode_filter(value: &Json) -> Result<Filter, Error> {
    match value {
        Json::Null | Json::Bool(_) | Json::Number(_) | Json::String(_) => {
            Ok(Filter::Literal(Value::from_json(value)?))
        }
        Json::Array(items) => {
            if items.is_empty() {
                return Err(Error::MalformedFilter("empty filter array".to_owned()));
            }
            Ok(Filter::Group(
                items.iter().map(decode_filter).collect::<Result<_, _>>()?,
            ))
        }
        Json::Object(map) => combine(decode_object_fragments(map)?),
    }
}

/// Collapse per-key fragments: a single fragment stands alone, siblings are
/// conjoined in key order.
fn combine(mut fragments: Vec<Filter>) -> Result<Filter, Error> {
    if fragments.len() == 1 {
        Ok(fragments.remove(0))
    } else {
        Ok(Filter::AllOf(fragments))
    }
}

/// Decode a top-level filter object (no enclosing property) into one
/// fragment per key.
fn decode_object_fragments(map: &Map<String, Json>) -> Result<Vec<Filter>, Error> {
    if map.is_empty() {
        return Err(Error::MalformedFilter("empty filter object".to_owned()));
    }
    map.iter()
        .map(|(key, value)| decode_object_entry(key, value))
        .collect()
}

fn decode_object_entry(key: &str, value: &Json) -> Result<Filter, Error> {
    let Some(bare) = key.strip_prefix('$') else {
        return decode_property(vec![key.to_owned()], value);
    };
    match bare {
        "" => Ok(Filter::Reference(decode_path_segments(value)?)),
        "raw" => decode_raw(value),
        "and" => Ok(Filter::And(decode_operand_list(value, "$and", None)?)),
        "or" => Ok(Filter::Or(decode_operand_list(value, "$or", None)?)),
        "not" => Ok(Filter::Not(Box::new(decode_filter(value)?))),
        "in" | "any" | "all" => Err(Error::MalformedFilter(format!(
            "${bare} requires an enclosing property"
        ))),
        "alias" | "expr" => Err(Error::MalformedFilter(format!(
            "${bare} is only valid inside $any/$all"
        ))),
        _ => {
            if InfixOperator::from_key(bare).is_some() {
                return Err(Error::MalformedFilter(format!(
                    "operator ${bare} requires an enclosing property"
                )));
            }
            if let Some(function) = FilterFunction::from_key(bare) {
                return Ok(Filter::Call(function, decode_args(value)?));
            }
            Err(Error::MalformedFilter(format!(
                "unrecognized filter key ${bare}"
            )))
        }
    }
}

/// Decode the value of a plain property key relative to its path.
fn decode_property(path: Vec<String>, value: &Json) -> Result<Filter, Error> {
    match value {
        Json::Null | Json::Bool(_) | Json::Number(_) | Json::String(_) => Ok(Filter::Field {
            path,
            op: FieldOp::Infix(
                InfixOperator::Eq,
                Box::new(Filter::Literal(Value::from_json(value)?)),
            ),
        }),
        Json::Array(items) => {
            if items.is_empty() {
                return Err(Error::MalformedFilter("empty filter array".to_owned()));
            }
            Ok(Filter::Group(
                items
                    .iter()
                    .map(|item| decode_property(path.clone(), item))
                    .collect::<Result<_, _>>()?,
            ))
        }
        Json::Object(map) => combine(decode_property_fragments(&path, map)?),
    }
}

fn decode_property_fragments(
    path: &[String],
    map: &Map<String, Json>,
) -> Result<Vec<Filter>, Error> {
    if map.is_empty() {
        return Err(Error::MalformedFilter("empty filter object".to_owned()));
    }
    map.iter()
        .map(|(key, value)| decode_property_entry(path, key, value))
        .collect()
}

fn decode_property_entry(path: &[String], key: &str, value: &Json) -> Result<Filter, Error> {
    let Some(bare) = key.strip_prefix('$') else {
        let mut extended = path.to_vec();
        extended.push(key.to_owned());
        return decode_property(extended, value);
    };
    match bare {
        "" => {
            let mut extended = path.to_vec();
            extended.extend(decode_path_segments(value)?);
            Ok(Filter::Reference(extended))
        }
        "raw" => decode_raw(value),
        "and" => Ok(Filter::And(decode_operand_list(value, "$and", Some(path))?)),
        "or" => Ok(Filter::Or(decode_operand_list(value, "$or", Some(path))?)),
        "not" => Ok(Filter::Not(Box::new(decode_property(
            path.to_vec(),
            value,
        )?))),
        "in" => {
            let values = match value {
                Json::Array(items) => {
                    if items.is_empty() {
                        return Err(Error::MalformedFilter("empty $in set".to_owned()));
                    }
                    items.iter().map(decode_filter).collect::<Result<_, _>>()?
                }
                other => vec![decode_filter(other)?],
            };
            Ok(Filter::Field {
                path: path.to_vec(),
                op: FieldOp::In(values),
            })
        }
        "any" => Ok(Filter::Field {
            path: path.to_vec(),
            op: FieldOp::Any(decode_lambda(value)?),
        }),
        "all" => Ok(Filter::Field {
            path: path.to_vec(),
            op: FieldOp::All(decode_lambda(value)?),
        }),
        "alias" | "expr" => Err(Error::MalformedFilter(format!(
            "${bare} is only valid inside $any/$all"
        ))),
        _ => {
            if let Some(operator) = InfixOperator::from_key(bare) {
                return Ok(Filter::Field {
                    path: path.to_vec(),
                    op: FieldOp::Infix(operator, Box::new(decode_filter(value)?)),
                });
            }
            if let Some(function) = FilterFunction::from_key(bare) {
                return Ok(Filter::Field {
                    path: path.to_vec(),
                    op: FieldOp::Call(function, decode_args(value)?),
                });
            }
            Err(Error::MalformedFilter(format!(
                "unrecognized filter key ${bare}"
            )))
        }
    }
}

/// Operands of `$and`/`$or`: an array contributes one operand per element,
/// an object one operand per key, anything else a single operand. With a
/// property context the operands stay relative to that property.
fn decode_operand_list(
    value: &Json,
    what: &str,
    path: Option<&[String]>,
) -> Result<Vec<Filter>, Error> {
    let decode_one = |v: &Json| match path {
        Some(p) => decode_property(p.to_vec(), v),
        None => decode_filter(v),
    };
    match value {
        Json::Array(items) => {
            if items.is_empty() {
                return Err(Error::MalformedFilter(format!("empty {what}")));
            }
            items.iter().map(decode_one).collect()
        }
        Json::Object(map) => match path {
            Some(p) => decode_property_fragments(p, map),
            None => decode_object_fragments(map),
        },
        other => Ok(vec![decode_one(other)?]),
    }
}

/// Function arguments: absent for `null` or `{}` (niladic and unary forms),
/// one per element for arrays, a single operand otherwise.
fn decode_args(value: &Json) -> Result<Vec<Filter>, Error> {
    match value {
        Json::Null => Ok(vec![]),
        Json::Object(map) if map.is_empty() => Ok(vec![]),
        Json::Array(items) => items.iter().map(decode_filter).collect(),
        other => Ok(vec![decode_filter(other)?]),
    }
}

fn decode_lambda(value: &Json) -> Result<Lambda, Error> {
    let map = value
        .as_object()
        .ok_or_else(|| Error::MalformedFilter("lambda must be an object".to_owned()))?;
    let alias = map
        .get("$alias")
        .and_then(Json::as_str)
        .ok_or_else(|| Error::MalformedFilter("lambda requires a string $alias".to_owned()))?;
    let expr = map
        .get("$expr")
        .ok_or_else(|| Error::MalformedFilter("lambda requires $expr".to_owned()))?;
    if map.len() != 2 {
        return Err(Error::MalformedFilter(
            "lambda accepts only $alias and $expr".to_owned(),
        ));
    }
    Ok(Lambda::new(alias, decode_filter(expr)?))
}

fn decode_raw(value: &Json) -> Result<Filter, Error> {
    match value {
        Json::String(text) => Ok(Filter::Raw(RawFilter::Verbatim(text.clone()))),
        Json::Array(items) => {
            let Some((template, operands)) = items.split_first() else {
                return Err(Error::MalformedFilter("empty $raw template".to_owned()));
            };
            let template = template
                .as_str()
                .ok_or_else(|| {
                    Error::MalformedFilter("raw template must start with a string".to_owned())
                })?
                .to_owned();
            Ok(Filter::Raw(RawFilter::Positional {
                template,
                operands: operands.iter().map(decode_filter).collect::<Result<_, _>>()?,
            }))
        }
        Json::Object(map) => {
            let template = map
                .get("$string")
                .and_then(Json::as_str)
                .ok_or_else(|| {
                    Error::MalformedFilter("raw object requires a $string template".to_owned())
                })?
                .to_owned();
            let bindings = map
                .iter()
                .filter(|(key, _)| *key != "$string")
                .map(|(key, v)| Ok((key.clone(), decode_filter(v)?)))
                .collect::<Result<_, Error>>()?;
            Ok(Filter::Raw(RawFilter::Named { template, bindings }))
        }
        _ => Err(Error::MalformedFilter(
            "raw filter must be a string, array, or object".to_owned(),
        )),
    }
}

fn decode_path_segments(value: &Json) -> Result<Vec<String>, Error> {
    match value {
        Json::String(s) => Ok(vec![s.clone()]),
        Json::Array(items) => {
            if items.is_empty() {
                return Err(Error::MalformedFilter("empty property path".to_owned()));
            }
            items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_owned).ok_or_else(|| {
                        Error::MalformedFilter(
                            "property path segments must be strings".to_owned(),
                        )
                    })
                })
                .collect()
        }
        _ => Err(Error::MalformedFilter(
            "$ expects a property name or path".to_owned(),
        )),
    }
}

impl Expand {
    /// Decode a JSON expand directive into the AST.
    ///
    /// # Errors
    /// Returns `Error::MalformedFilter` for empty expands and non-object
    /// nested options, `Error::InvalidOption` for bad nested options.
    pub fn from_json(value: &Json) -> Result<Self, Error> {
        match value {
            Json::String(name) => Ok(Expand::Resource(name.clone())),
            Json::Array(items) => {
                if items.is_empty() {
                    return Err(Error::MalformedFilter("empty $expand list".to_owned()));
                }
                Ok(Expand::Many(
                    items
                        .iter()
                        .map(Expand::from_json)
                        .collect::<Result<_, _>>()?,
                ))
            }
            Json::Object(map) => {
                if map.is_empty() {
                    return Err(Error::MalformedFilter("empty $expand object".to_owned()));
                }
                let mut entries = Vec::with_capacity(map.len());
                for (resource, nested) in map {
                    if resource.starts_with('$') {
                        return Err(Error::MalformedFilter(format!(
                            "expand target {resource} is not a resource name"
                        )));
                    }
                    let entry = match nested {
                        Json::Null => Expand::Resource(resource.clone()),
                        Json::Object(_) => {
                            let options = ODataOptions::from_json(nested)?;
                            if options.is_empty() {
                                Expand::Resource(resource.clone())
                            } else {
                                Expand::nested(resource.clone(), options)
                            }
                        }
                        _ => {
                            return Err(Error::MalformedFilter(
                                "expand options must be an object".to_owned(),
                            ));
                        }
                    };
                    entries.push(entry);
                }
                if entries.len() == 1 {
                    Ok(entries.remove(0))
                } else {
                    Ok(Expand::Many(entries))
                }
            }
            _ => Err(Error::MalformedFilter(
                "expand must be a string, array, or object".to_owned(),
            )),
        }
    }
}

impl OrderBy {
    /// Decode a JSON orderby directive. Bare strings and string arrays
    /// imply ascending order.
    ///
    /// # Errors
    /// Returns `Error::InvalidOption` for empty orderings, non-string
    /// fields, and directions other than `asc`/`desc`.
    pub fn from_json(value: &Json) -> Result<Self, Error> {
        match value {
            Json::String(name) => Ok(OrderBy::asc(name.clone())),
            Json::Array(items) => {
                if items.is_empty() {
                    return Err(Error::InvalidOption("empty $orderby".to_owned()));
                }
                let keys = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map(|field| OrderKey {
                                field: field.to_owned(),
                                dir: SortDir::Asc,
                            })
                            .ok_or_else(|| {
                                Error::InvalidOption(
                                    "orderby entries must be field names".to_owned(),
                                )
                            })
                    })
                    .collect::<Result<_, _>>()?;
                Ok(OrderBy(keys))
            }
            Json::Object(map) => {
                if map.is_empty() {
                    return Err(Error::InvalidOption("empty $orderby".to_owned()));
                }
                let keys = map
                    .iter()
                    .map(|(field, dir)| {
                        let dir = match dir.as_str() {
                            Some("asc") => SortDir::Asc,
                            Some("desc") => SortDir::Desc,
                            _ => {
                                return Err(Error::InvalidOption(format!(
                                    "sort direction for {field} must be asc or desc"
                                )));
                            }
                        };
                        Ok(OrderKey {
                            field: field.clone(),
                            dir,
                        })
                    })
                    .collect::<Result<_, _>>()?;
                Ok(OrderBy(keys))
            }
            _ => Err(Error::InvalidOption(
                "orderby must be a field name, array, or direction map".to_owned(),
            )),
        }
    }
}

impl ODataOptions {
    /// Decode a JSON options object covering the `$filter`, `$expand`,
    /// `$select`, `$orderby`, `$top`, and `$skip` facets.
    ///
    /// # Errors
    /// Returns `Error::InvalidOption` for unrecognized keys and for
    /// negative or non-integer `$top`/`$skip`; filter and expand facets
    /// propagate their own errors.
    pub fn from_json(value: &Json) -> Result<Self, Error> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::InvalidOption("options must be an object".to_owned()))?;
        let mut options = ODataOptions::new();
        for (key, facet) in map {
            match key.as_str() {
                "$filter" => options.filter = Some(Filter::from_json(facet)?),
                "$expand" => options.expand = Some(Expand::from_json(facet)?),
                "$select" => options.select = Some(decode_select(facet)?),
                "$orderby" => options.order_by = Some(OrderBy::from_json(facet)?),
                "$top" => options.top = Some(decode_count(key, facet)?),
                "$skip" => options.skip = Some(decode_count(key, facet)?),
                other => {
                    return Err(Error::InvalidOption(format!(
                        "unrecognized option {other}"
                    )));
                }
            }
        }
        Ok(options)
    }
}

fn decode_select(value: &Json) -> Result<Vec<String>, Error> {
    match value {
        Json::String(field) => Ok(vec![field.clone()]),
        Json::Array(items) => {
            if items.is_empty() {
                return Err(Error::InvalidOption("empty $select".to_owned()));
            }
            items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_owned).ok_or_else(|| {
                        Error::InvalidOption("select entries must be field names".to_owned())
                    })
                })
                .collect()
        }
        _ => Err(Error::InvalidOption(
            "select must be a field name or an array of field names".to_owned(),
        )),
    }
}

fn decode_count(key: &str, value: &Json) -> Result<u64, Error> {
    value
        .as_u64()
        .ok_or_else(|| Error::InvalidOption(format!("{key} must be a non-negative integer")))
}
