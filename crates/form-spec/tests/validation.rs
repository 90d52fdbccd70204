use form_spec::{
    Condition, FieldError, FieldOption, FieldSchema, FieldType, RuleKind, RuleValue,
    VisibilityRule, validate_field, validate_form,
};
use serde_json::json;

#[test]
fn required_catches_every_empty_shape() {
    let mut text = FieldSchema::new("name", FieldType::Text);
    text.required = true;
    for empty in [None, Some(json!(null)), Some(json!("")), Some(json!([]))] {
        assert_eq!(
            validate_field(&text, empty.as_ref()).map(|err| err.kind),
            Some(RuleKind::Required),
            "value {empty:?}"
        );
    }
    assert_eq!(validate_field(&text, Some(&json!("Ada"))), None);

    let mut consent = FieldSchema::new("consent", FieldType::Checkbox);
    consent.required = true;
    assert!(validate_field(&consent, Some(&json!(false))).is_some());
    assert!(validate_field(&consent, Some(&json!(true))).is_none());
}

#[test]
fn pattern_and_lengths_apply_to_present_text() {
    let mut code = FieldSchema::new("code", FieldType::Text);
    code.validation.pattern = Some(RuleValue::with_message(r"^[A-Z]+$".into(), "caps only"));
    code.validation.min_length = Some(RuleValue::new(2));
    code.validation.max_length = Some(RuleValue::new(4));

    assert_eq!(validate_field(&code, Some(&json!(""))), None);
    assert_eq!(
        validate_field(&code, Some(&json!("ab"))),
        Some(FieldError::new(RuleKind::Pattern, Some("caps only".into())))
    );
    assert_eq!(
        validate_field(&code, Some(&json!("A"))).map(|err| err.kind),
        Some(RuleKind::MinLength)
    );
    assert_eq!(
        validate_field(&code, Some(&json!("ABCDE"))).map(|err| err.kind),
        Some(RuleKind::MaxLength)
    );
    assert_eq!(validate_field(&code, Some(&json!("ABC"))), None);
}

#[test]
fn lengths_count_characters() {
    let mut name = FieldSchema::new("name", FieldType::Text);
    name.validation.max_length = Some(RuleValue::new(3));
    assert_eq!(validate_field(&name, Some(&json!("éèê"))), None);
}

#[test]
fn numeric_bounds_accept_numbers_and_numeric_strings() {
    let mut age = FieldSchema::new("age", FieldType::Number);
    age.validation.min = Some(RuleValue::new(18.0));
    age.validation.max = Some(RuleValue::new(120.0));

    assert_eq!(
        validate_field(&age, Some(&json!(17))).map(|err| err.kind),
        Some(RuleKind::Min)
    );
    assert_eq!(
        validate_field(&age, Some(&json!("130"))).map(|err| err.kind),
        Some(RuleKind::Max)
    );
    assert_eq!(validate_field(&age, Some(&json!(42))), None);
}

#[test]
fn custom_validator_runs_last() {
    let field = FieldSchema::new("email", FieldType::Email).with_custom_validator(|value| {
        match value.and_then(|value| value.as_str()) {
            Some(text) if text.ends_with("@example.com") => Ok(()),
            _ => Err(Some("use your work address".into())),
        }
    });
    assert_eq!(
        validate_field(&field, Some(&json!("me@gmail.com"))),
        Some(FieldError::new(
            RuleKind::Custom,
            Some("use your work address".into())
        ))
    );
    assert_eq!(validate_field(&field, Some(&json!("me@example.com"))), None);
}

#[test]
fn form_validation_skips_hidden_subtrees() {
    let mut secret = FieldSchema::new("secret", FieldType::Text);
    secret.required = true;
    let mut topics = FieldSchema::new("topics", FieldType::Checkbox)
        .with_options(vec![FieldOption::new("News", "news")]);
    topics.required = true;

    let fields = vec![
        FieldSchema::new("advanced", FieldType::Checkbox),
        FieldSchema::group("extra", vec![secret]).with_visibility(VisibilityRule::all(vec![
            Condition::equals("advanced", json!(true)),
        ])),
        FieldSchema::group("prefs", vec![topics]),
    ];

    let report = validate_form(&fields, &json!({ "advanced": false, "prefs": { "topics": [] } }));
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors["prefs.topics"].kind, RuleKind::Required);

    let report = validate_form(
        &fields,
        &json!({ "advanced": true, "prefs": { "topics": ["news"] } }),
    );
    assert_eq!(report.errors.keys().collect::<Vec<_>>(), vec!["extra.secret"]);
}
