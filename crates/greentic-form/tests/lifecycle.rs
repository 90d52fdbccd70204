use form_spec::{FieldSchema, FieldType, FormRead, FormStore, MemoryStore};
use greentic_form::{LifecycleManager, Presence, Transition};
use serde_json::json;

#[test]
fn transitions_fire_only_on_edges() {
    let mut lifecycle = LifecycleManager::new();
    assert_eq!(lifecycle.observe("c", true), None);
    assert_eq!(lifecycle.observe("c", true), None);
    assert_eq!(lifecycle.observe("c", false), Some(Transition::Hidden));
    assert_eq!(lifecycle.observe("c", false), None);
    assert_eq!(lifecycle.observe("c", true), Some(Transition::Shown));
    assert_eq!(lifecycle.state("c"), Some(Presence::Shown));
}

#[test]
fn first_hidden_observation_counts_as_hide() {
    let mut lifecycle = LifecycleManager::new();
    assert_eq!(lifecycle.observe("c", false), Some(Transition::Hidden));
    assert_eq!(lifecycle.observe("c", false), None);
}

#[test]
fn hide_resets_leaf_to_default_or_empty() {
    let mut lifecycle = LifecycleManager::new();
    let mut store = MemoryStore::new().with_values(json!({ "plan": "pro", "note": "hi" }));

    let plan = FieldSchema::new("plan", FieldType::Radio).with_default(json!("free"));
    assert_eq!(lifecycle.hide(&plan, "plan", &mut store), vec!["plan"]);
    assert_eq!(store.get_value("plan"), Some(&json!("free")));

    let note = FieldSchema::new("note", FieldType::Text);
    lifecycle.hide(&note, "note", &mut store);
    assert_eq!(store.get_value("note"), Some(&json!("")));
}

#[test]
fn hide_never_fabricates_absent_values() {
    let mut lifecycle = LifecycleManager::new();
    let mut store = MemoryStore::new();
    let field = FieldSchema::new("note", FieldType::Text).with_default(json!("x"));
    assert!(lifecycle.hide(&field, "note", &mut store).is_empty());
    assert_eq!(store.get_value("note"), None);
}

#[test]
fn preserved_leaf_is_untouched() {
    let mut lifecycle = LifecycleManager::new();
    let mut store = MemoryStore::new().with_values(json!({ "note": "keep me" }));
    let field = FieldSchema::new("note", FieldType::Text).preserve_value(true);
    assert!(lifecycle.hide(&field, "note", &mut store).is_empty());
    assert_eq!(store.get_value("note"), Some(&json!("keep me")));
}

#[test]
fn checkbox_fallbacks_match_shape() {
    let mut lifecycle = LifecycleManager::new();
    let mut store = MemoryStore::new().with_values(json!({ "agree": true, "topics": ["a"] }));
    let agree = FieldSchema::new("agree", FieldType::Checkbox);
    let topics = FieldSchema::new("topics", FieldType::Checkbox)
        .with_options(vec![form_spec::FieldOption::new("A", "a")]);
    lifecycle.hide(&agree, "agree", &mut store);
    lifecycle.hide(&topics, "topics", &mut store);
    assert_eq!(store.values(), &json!({ "agree": false, "topics": [] }));
}

fn extra_group() -> FieldSchema {
    FieldSchema::group(
        "extra",
        vec![
            FieldSchema::new("notes", FieldType::Textarea),
            FieldSchema::new("keep", FieldType::Text).preserve_value(true),
            FieldSchema::group("inner", vec![FieldSchema::new("deep", FieldType::Number)]),
        ],
    )
}

#[test]
fn hiding_a_group_clears_its_subtree() {
    let mut lifecycle = LifecycleManager::new();
    let mut store = MemoryStore::new().with_values(json!({
        "extra": { "notes": "n", "keep": "k", "inner": { "deep": 7 } }
    }));

    let mut cleared = lifecycle.hide(&extra_group(), "extra", &mut store);
    cleared.sort();
    assert_eq!(cleared, vec!["extra.inner.deep", "extra.notes"]);
    assert_eq!(
        store.values(),
        &json!({ "extra": { "notes": "", "keep": "k", "inner": { "deep": "" } } })
    );
    assert_eq!(lifecycle.state("extra.inner.deep"), None);
    assert_eq!(lifecycle.state("extra.keep"), None);
}

#[test]
fn preserving_group_keeps_everything() {
    let mut lifecycle = LifecycleManager::new();
    let before = json!({ "extra": { "notes": "n", "inner": { "deep": 7 } } });
    let mut store = MemoryStore::new().with_values(before.clone());
    let group = extra_group().preserve_value(true);
    assert!(lifecycle.hide(&group, "extra", &mut store).is_empty());
    assert_eq!(store.values(), &before);
    assert_eq!(lifecycle.state("extra.notes"), None);
}

#[test]
fn reshown_preserving_group_remounts_children() {
    let mut lifecycle = LifecycleManager::new();
    let mut store = MemoryStore::new().with_values(json!({ "extra": { "notes": "n" } }));
    let group = extra_group().preserve_value(true);

    lifecycle.observe("extra", true);
    lifecycle.observe("extra.notes", true);
    assert_eq!(lifecycle.observe("extra", false), Some(Transition::Hidden));
    lifecycle.hide(&group, "extra", &mut store);

    assert_eq!(lifecycle.observe("extra", true), Some(Transition::Shown));
    assert_eq!(
        lifecycle.observe("extra.notes", false),
        Some(Transition::Hidden)
    );
}

#[test]
fn descendants_already_hidden_are_not_cleared_again() {
    let mut lifecycle = LifecycleManager::new();
    let mut store = MemoryStore::new();

    lifecycle.observe("extra", true);
    lifecycle.observe("extra.notes", false);
    store.set_value("extra.notes", json!("typed while hidden"));
    store.set_value("extra.keep", json!("k"));

    let cleared = lifecycle.hide(&extra_group(), "extra", &mut store);
    assert!(cleared.is_empty());
    assert_eq!(store.get_value("extra.notes"), Some(&json!("typed while hidden")));
}

#[test]
fn forget_drops_a_subtree() {
    let mut lifecycle = LifecycleManager::new();
    lifecycle.observe("extra", false);
    lifecycle.observe("extra.notes", false);
    lifecycle.observe("other", true);
    lifecycle.forget("extra");
    assert_eq!(lifecycle.state("extra"), None);
    assert_eq!(lifecycle.state("extra.notes"), None);
    assert_eq!(lifecycle.state("other"), Some(Presence::Shown));
}
