use form_spec::{
    Condition, FieldSchema, FieldType, Logic, Operator, VisibilityRule, is_present, is_visible,
    resolve_visibility,
};
use serde_json::{Value, json};

fn rule(logic: Logic, conditions: Vec<Condition>) -> VisibilityRule {
    VisibilityRule { logic, conditions }
}

#[test]
fn no_rule_means_visible() {
    assert!(is_visible(None, &json!({})));
    assert!(is_visible(Some(&VisibilityRule::default()), &json!({})));
}

#[test]
fn and_requires_every_condition() {
    let values = json!({ "country": "US", "plan": "pro" });
    let both = rule(
        Logic::And,
        vec![
            Condition::equals("country", json!("US")),
            Condition::equals("plan", json!("pro")),
        ],
    );
    assert!(is_visible(Some(&both), &values));

    let one_off = rule(
        Logic::And,
        vec![
            Condition::equals("country", json!("US")),
            Condition::equals("plan", json!("free")),
        ],
    );
    assert!(!is_visible(Some(&one_off), &values));
}

#[test]
fn or_requires_any_condition() {
    let values = json!({ "country": "CA" });
    let either = rule(
        Logic::Or,
        vec![
            Condition::equals("country", json!("US")),
            Condition::equals("country", json!("CA")),
        ],
    );
    assert!(is_visible(Some(&either), &values));

    let neither = rule(
        Logic::Or,
        vec![
            Condition::equals("country", json!("US")),
            Condition::equals("country", json!("MX")),
        ],
    );
    assert!(!is_visible(Some(&neither), &values));
}

#[test]
fn equality_is_strict() {
    let values = json!({ "count": 1, "flag": true });
    assert!(is_visible(
        Some(&VisibilityRule::all(vec![Condition::equals("count", json!(1.0))])),
        &values
    ));
    assert!(!is_visible(
        Some(&VisibilityRule::all(vec![Condition::equals("count", json!("1"))])),
        &values
    ));
    assert!(!is_visible(
        Some(&VisibilityRule::all(vec![Condition::equals("flag", json!("true"))])),
        &values
    ));
    let not_equals = Condition::new("flag", Operator::NotEquals, Some(json!(false)));
    assert!(is_visible(Some(&VisibilityRule::all(vec![not_equals])), &values));
}

#[test]
fn exists_treats_empty_and_null_as_missing() {
    let visible_when = VisibilityRule::all(vec![Condition::exists("age")]);
    assert!(!is_visible(Some(&visible_when), &json!({})));
    assert!(!is_visible(Some(&visible_when), &json!({ "age": null })));
    assert!(!is_visible(Some(&visible_when), &json!({ "age": "" })));
    assert!(is_visible(Some(&visible_when), &json!({ "age": 0 })));
    assert!(is_visible(Some(&visible_when), &json!({ "age": false })));

    let missing = VisibilityRule::all(vec![Condition::new("age", Operator::NotExists, None)]);
    assert!(is_visible(Some(&missing), &json!({ "age": "" })));
    assert!(!is_visible(Some(&missing), &json!({ "age": 0 })));
}

#[test]
fn membership_needs_a_list() {
    let values = json!({ "country": "US" });
    let member = Condition::new("country", Operator::In, Some(json!(["US", "CA"])));
    assert!(is_visible(Some(&VisibilityRule::all(vec![member])), &values));

    let outsider = Condition::new("country", Operator::NotIn, Some(json!(["US", "CA"])));
    assert!(!is_visible(Some(&VisibilityRule::all(vec![outsider])), &values));

    let malformed_in = Condition::new("country", Operator::In, Some(json!("US")));
    assert!(!is_visible(Some(&VisibilityRule::all(vec![malformed_in])), &values));
    let malformed_not_in = Condition::new("country", Operator::NotIn, Some(json!("MX")));
    assert!(!is_visible(
        Some(&VisibilityRule::all(vec![malformed_not_in])),
        &values
    ));

    let absent = Condition::new("region", Operator::NotIn, Some(json!(["EU"])));
    assert!(is_visible(Some(&VisibilityRule::all(vec![absent])), &values));
}

#[test]
fn unknown_operator_fails_closed() {
    let condition = Condition::new(
        "country",
        Operator::Unknown("startsWith".into()),
        Some(json!("U")),
    );
    let values = json!({ "country": "US" });
    assert!(!is_visible(
        Some(&VisibilityRule::all(vec![condition.clone()])),
        &values
    ));
    let or_rule = VisibilityRule::any(vec![condition, Condition::exists("country")]);
    assert!(is_visible(Some(&or_rule), &values));
}

#[test]
fn condition_without_operator_never_holds() {
    let rule: VisibilityRule = serde_json::from_value(json!({
        "conditions": [ { "field": "x", "value": "a" } ]
    }))
    .expect("parse");
    assert_eq!(rule.conditions[0].operator, Operator::Missing);
    assert!(!is_visible(Some(&rule), &json!({ "x": "a" })));
    assert!(!is_visible(Some(&rule), &json!({})));
}

#[test]
fn omitted_value_only_equals_absent() {
    let condition = Condition::new("nickname", Operator::Equals, None);
    let visible_when = VisibilityRule::all(vec![condition]);
    assert!(is_visible(Some(&visible_when), &json!({})));
    assert!(!is_visible(Some(&visible_when), &json!({ "nickname": null })));
}

#[test]
fn nested_targets_resolve_through_groups() {
    let values = json!({ "g": { "A": true, "B": false } });
    let visible_when = VisibilityRule::all(vec![Condition::equals("g.A", json!(true))]);
    assert!(is_visible(Some(&visible_when), &values));
    assert!(!is_visible(
        Some(&visible_when),
        &json!({ "g": { "A": false } })
    ));
}

#[test]
fn hidden_group_hides_descendants() {
    let fields = vec![
        FieldSchema::new("toggle", FieldType::Checkbox),
        FieldSchema::group(
            "extra",
            vec![
                FieldSchema::new("notes", FieldType::Textarea),
                FieldSchema::group("inner", vec![FieldSchema::new("deep", "text")]),
            ],
        )
        .with_visibility(VisibilityRule::all(vec![Condition::equals(
            "toggle",
            json!(true),
        )])),
    ];

    let hidden = resolve_visibility(&fields, &json!({ "toggle": false }));
    assert_eq!(hidden.get("toggle"), Some(&true));
    assert_eq!(hidden.get("extra"), Some(&false));
    assert_eq!(hidden.get("extra.notes"), Some(&false));
    assert_eq!(hidden.get("extra.inner.deep"), Some(&false));

    let shown = resolve_visibility(&fields, &json!({ "toggle": true }));
    assert!(shown.values().all(|visible| *visible));
}

#[test]
fn presence_helper() {
    assert!(!is_present(None));
    assert!(!is_present(Some(&Value::Null)));
    assert!(!is_present(Some(&json!(""))));
    assert!(is_present(Some(&json!([]))));
    assert!(is_present(Some(&json!(0))));
}
