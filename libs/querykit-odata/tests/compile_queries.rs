//! End-to-end grammar checks: JSON input through decode and compile.

use querykit_odata::{Error, Filter, ODataOptions, compile_filter};
use serde_json::json;

fn compiled(value: serde_json::Value) -> String {
    compile_filter(&Filter::from_json(&value).unwrap()).unwrap()
}

#[test]
fn implicit_and_combines_sibling_keys_in_order() {
    assert_eq!(compiled(json!({"a": 1, "b": 2})), "a eq 1 and b eq 2");
}

#[test]
fn nested_operator_compiles_infix() {
    assert_eq!(compiled(json!({"age": {"$gt": 18}})), "age gt 18");
}

#[test]
fn logical_combinator_parenthesizes() {
    assert_eq!(
        compiled(json!({"$and": [{"a": 1}, {"b": 2}]})),
        "(a eq 1 and b eq 2)"
    );
}

#[test]
fn lambda_compiles_with_alias_scope() {
    assert_eq!(
        compiled(json!({"tags": {"$any": {"$alias": "t", "$expr": {"t": {"$eq": "x"}}}}})),
        "tags/any(t:t eq 'x')"
    );
}

#[test]
fn raw_escape_bypasses_the_grammar() {
    // The fragment would not survive re-parsing ('and' binds differently),
    // which is the point: raw text is never reprocessed.
    assert_eq!(compiled(json!({"$raw": "a eq 1"})), "a eq 1");
    assert_eq!(
        compiled(json!({"$raw": "a eq 1 or (b eq 2)"})),
        "a eq 1 or (b eq 2)"
    );
}

#[test]
fn nested_expand_carries_its_own_options() {
    let options = ODataOptions::from_json(&json!({
        "$expand": {"children": {"$filter": {"active": true}}}
    }))
    .unwrap();
    assert_eq!(
        options.to_query_string().unwrap(),
        "$expand=children($filter=active eq true)"
    );
}

#[test]
fn compile_is_deterministic() {
    let input = json!({
        "$or": [{"a": {"$startswith": "x"}}, {"b": {"$in": [1, 2, 3]}}],
        "c": {"$ne": null}
    });
    let first = compiled(input.clone());
    let second = compiled(input);
    assert_eq!(first, second);
}

#[test]
fn deep_nesting_compiles_inside_out() {
    let input = json!({
        "$not": {
            "a": {"$or": [{"$lt": 1}, {"$gt": 9}]},
            "b": {"c": {"$contains": "x"}}
        }
    });
    assert_eq!(
        compiled(input),
        "not ((a lt 1 or a gt 9) and contains(b/c,'x'))"
    );
}

#[test]
fn empty_filter_object_is_malformed() {
    assert!(matches!(
        Filter::from_json(&json!({})),
        Err(Error::MalformedFilter(_))
    ));
}

#[test]
fn top_level_operator_key_is_malformed() {
    assert!(matches!(
        Filter::from_json(&json!({"$eq": 1})),
        Err(Error::MalformedFilter(_))
    ));
}

#[test]
fn negative_top_is_invalid() {
    assert!(matches!(
        ODataOptions::from_json(&json!({"$top": -5})),
        Err(Error::InvalidOption(_))
    ));
}

#[test]
fn full_option_bundle_renders_in_fixed_order() {
    let options = ODataOptions::from_json(&json!({
        "$skip": 20,
        "$top": 10,
        "$orderby": ["name", "id"],
        "$select": "id",
        "$expand": "children",
        "$filter": {"active": true}
    }))
    .unwrap();
    assert_eq!(
        options.to_query_string().unwrap(),
        "$filter=active eq true&$expand=children&$select=id&$orderby=name asc,id asc&$top=10&$skip=20"
    );
}
