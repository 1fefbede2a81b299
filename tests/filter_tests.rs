// tests/filter_tests.rs

use serde_json::{Value, json};
use sq_filter::{FilterOptions, Group, GroupError, ParseOptions, filter, parse};

fn matches(condition: Value, record: Value) -> bool {
    let options = ParseOptions::default();
    parse(&condition, &options)
        .expect("condition should parse")
        .filter(&record, &options.dialect)
}

// ============================================================================
// Loose Comparison
// ============================================================================

#[test]
fn test_equal_same_type() {
    assert!(matches(json!({"name": "Alice"}), json!({"name": "Alice"})));
    assert!(!matches(json!({"name": "Alice"}), json!({"name": "Bob"})));
    assert!(matches(json!({"age": 30}), json!({"age": 30})));
}

#[test]
fn test_equal_numeric_string_coercion() {
    assert!(matches(json!({"age": "30"}), json!({"age": 30})));
    assert!(matches(json!({"age": 30}), json!({"age": "30"})));
    assert!(matches(json!({"age": 30.0}), json!({"age": 30})));
    assert!(!matches(json!({"age": "30"}), json!({"age": 31})));
}

#[test]
fn test_equal_bool_numeric_coercion() {
    assert!(matches(json!({"active": true}), json!({"active": 1})));
    assert!(matches(json!({"active": false}), json!({"active": 0})));
    assert!(!matches(json!({"active": true}), json!({"active": 0})));
}

#[test]
fn test_not_equal() {
    assert!(matches(
        json!([["[name]", "Alice", "notEqual"]]),
        json!({"name": "Bob"})
    ));
    assert!(!matches(
        json!([["[name]", "Alice", "notEqual"]]),
        json!({"name": "Alice"})
    ));
}

#[test]
fn test_ordering_operators() {
    assert!(matches(json!({"age": {"greater": 18}}), json!({"age": 21})));
    assert!(!matches(json!({"age": {"greater": 18}}), json!({"age": 18})));
    assert!(matches(
        json!({"age": {"greaterOrEqual": 18}}),
        json!({"age": 18})
    ));
    assert!(matches(json!({"age": {"lesser": 18}}), json!({"age": 17})));
    assert!(!matches(json!({"age": {"lesser": 18}}), json!({"age": 18})));
    assert!(matches(
        json!({"age": {"lesserOrEqual": 18}}),
        json!({"age": 18})
    ));
}

#[test]
fn test_ordering_coerces_string_against_number() {
    // A numeric string compares numerically against a number.
    assert!(matches(json!({"n": {"lesser": 10}}), json!({"n": "9"})));
    assert!(!matches(json!({"n": {"greater": 10}}), json!({"n": "9"})));
}

#[test]
fn test_ordering_two_strings_is_lexicographic() {
    assert!(matches(
        json!({"name": {"lesser": "Bob"}}),
        json!({"name": "Alice"})
    ));
    assert!(!matches(
        json!({"name": {"lesser": "Alice"}}),
        json!({"name": "Bob"})
    ));
}

#[test]
fn test_incomparable_ordering_is_false() {
    assert!(!matches(
        json!({"age": {"greater": 18}}),
        json!({"age": "unknown"})
    ));
    assert!(!matches(json!({"age": {"greater": 18}}), json!({})));
}

// ============================================================================
// Text and Membership Operators
// ============================================================================

#[test]
fn test_starts_and_ends_with() {
    assert!(matches(
        json!({"name": {"startsWith": "Al"}}),
        json!({"name": "Alice"})
    ));
    assert!(!matches(
        json!({"name": {"startsWith": "Bo"}}),
        json!({"name": "Alice"})
    ));
    assert!(matches(
        json!({"name": {"endsWith": "ce"}}),
        json!({"name": "Alice"})
    ));
}

#[test]
fn test_contains_substring_and_array() {
    assert!(matches(
        json!({"name": {"contains": "lic"}}),
        json!({"name": "Alice"})
    ));
    assert!(matches(
        json!({"tags": {"contains": "x"}}),
        json!({"tags": ["x", "y"]})
    ));
    assert!(!matches(
        json!({"tags": {"contains": "z"}}),
        json!({"tags": ["x", "y"]})
    ));
}

#[test]
fn test_in_and_not_in() {
    assert!(matches(
        json!([["[role]", ["admin", "editor"], "in"]]),
        json!({"role": "admin"})
    ));
    assert!(!matches(
        json!([["[role]", ["admin", "editor"], "in"]]),
        json!({"role": "viewer"})
    ));
    assert!(matches(
        json!([["[role]", ["admin", "editor"], "notIn"]]),
        json!({"role": "viewer"})
    ));
    assert!(!matches(
        json!([["[role]", ["admin", "editor"], "notIn"]]),
        json!({"role": "admin"})
    ));
}

#[test]
fn test_capability_fallback_asymmetry() {
    // A non-string cannot start with anything; the negated variant
    // holds vacuously.
    assert!(!matches(
        json!({"name": {"startsWith": "Al"}}),
        json!({"name": 42})
    ));
    assert!(matches(
        json!({"name": {"notStartsWith": "Al"}}),
        json!({"name": 42})
    ));
    assert!(!matches(
        json!({"tags": {"contains": "x"}}),
        json!({"tags": 42})
    ));
    assert!(matches(
        json!({"tags": {"notContains": "x"}}),
        json!({"tags": 42})
    ));
    assert!(matches(
        json!([["[role]", 42, "notIn"]]),
        json!({"role": "admin"})
    ));
}

#[test]
fn test_negated_text_operators_on_strings() {
    assert!(matches(
        json!({"name": {"notStartsWith": "Bo"}}),
        json!({"name": "Alice"})
    ));
    assert!(!matches(
        json!({"name": {"notStartsWith": "Al"}}),
        json!({"name": "Alice"})
    ));
    assert!(matches(
        json!({"name": {"notEndsWith": "ob"}}),
        json!({"name": "Alice"})
    ));
}

// ============================================================================
// Null Checks
// ============================================================================

#[test]
fn test_null_operator() {
    assert!(matches(json!(["[email]", null, "null"]), json!({})));
    assert!(matches(
        json!(["[email]", null, "null"]),
        json!({"email": null})
    ));
    assert!(!matches(
        json!(["[email]", null, "null"]),
        json!({"email": "a@b.c"})
    ));
}

#[test]
fn test_not_null_operator() {
    assert!(matches(
        json!(["[email]", null, "notNull"]),
        json!({"email": "a@b.c"})
    ));
    assert!(!matches(json!(["[email]", null, "notNull"]), json!({})));
}

// ============================================================================
// Group Semantics
// ============================================================================

#[test]
fn test_every_group_requires_all_members() {
    let condition = json!({"name": "Alice", "age": {"greater": 18}});

    assert!(matches(condition.clone(), json!({"name": "Alice", "age": 30})));
    assert!(!matches(condition.clone(), json!({"name": "Alice", "age": 10})));
    assert!(!matches(condition, json!({"name": "Bob", "age": 30})));
}

#[test]
fn test_any_group_requires_one_member() {
    let condition = json!({"any": [{"name": "Alice"}, {"name": "Bob"}]});

    assert!(matches(condition.clone(), json!({"name": "Alice"})));
    assert!(matches(condition.clone(), json!({"name": "Bob"})));
    assert!(!matches(condition, json!({"name": "Carol"})));
}

#[test]
fn test_nested_mixed_polarity() {
    let condition = json!({
        "any": [
            {"every": [{"role": "admin"}, {"active": true}]},
            {"role": "owner"},
        ]
    });

    assert!(matches(
        condition.clone(),
        json!({"role": "admin", "active": true})
    ));
    assert!(matches(condition.clone(), json!({"role": "owner"})));
    assert!(!matches(condition, json!({"role": "admin", "active": false})));
}

#[test]
fn test_empty_group_matches_nothing() {
    let options = ParseOptions::default();

    let every = Group::new(vec![], false);
    let any = Group::new(vec![], true);

    assert!(!every.filter(&json!({"a": 1}), &options.dialect));
    assert!(!any.filter(&json!({"a": 1}), &options.dialect));
}

#[test]
fn test_missing_field_reads_as_null() {
    assert!(!matches(json!({"name": "Alice"}), json!({})));
    assert!(matches(json!([["[name]", null]]), json!({})));
}

#[test]
fn test_both_sides_can_be_references() {
    assert!(matches(
        json!([["[a]", "[b]"]]),
        json!({"a": 5, "b": 5})
    ));
    assert!(!matches(
        json!([["[a]", "[b]"]]),
        json!({"a": 5, "b": 6})
    ));
}

// ============================================================================
// Predicate Helpers
// ============================================================================

#[test]
fn test_filter_helper_over_records() {
    let options = ParseOptions::default();
    let keep = filter(&json!({"age": {"greater": 18}}), &options);

    let records = vec![
        json!({"name": "Alice", "age": 30}),
        json!({"name": "Bob", "age": 10}),
        json!({"name": "Carol", "age": 19}),
    ];
    let kept: Vec<&Value> = records.iter().filter(|r| keep(r)).collect();

    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0]["name"], json!("Alice"));
    assert_eq!(kept[1]["name"], json!("Carol"));
}

#[test]
fn test_filter_helper_fails_closed() {
    let keep = filter(&json!("not a condition"), &ParseOptions::default());

    assert!(!keep(&json!({"anything": true})));
}

#[test]
fn test_filter_fn_fails_open_by_default() {
    let keep = Group::filter_fn(&json!("not a condition"), &FilterOptions::default())
        .expect("lenient mode should not error");

    assert!(keep(&json!({"anything": true})));
}

#[test]
fn test_filter_fn_throw_error_mode() {
    let options = FilterOptions {
        throw_error: true,
        ..FilterOptions::default()
    };

    let err = match Group::filter_fn(&json!("not a condition"), &options) {
        Ok(_) => panic!("strict mode should reject unparseable input"),
        Err(e) => e,
    };
    assert_eq!(err, GroupError::Unparseable);

    let keep = Group::filter_fn(&json!({"age": {"greater": 18}}), &options)
        .expect("valid condition should build a predicate");
    assert!(keep(&json!({"age": 30})));
    assert!(!keep(&json!({"age": 10})));
}
