use super::*;
use crate::reconcile::reconcile;
use crate::schema::PropertyConfig;
use serde_json::json;

fn enumerated(name: &str, kind: &str, options: &[&str]) -> (String, PropertyConfig) {
    let options: Vec<_> = options.iter().map(|o| json!({"name": o, "color": "blue"})).collect();
    let value = json!({"name": name, "type": kind, kind: {"options": options}});
    (name.to_string(), PropertyConfig::from_value(name, value).unwrap())
}

fn plain(name: &str, kind: &str) -> (String, PropertyConfig) {
    let value = json!({"name": name, "type": kind, kind: {}});
    (name.to_string(), PropertyConfig::from_value(name, value).unwrap())
}

fn record(id: &str, properties: serde_json::Value) -> Record {
    serde_json::from_value(json!({"id": id, "properties": properties})).unwrap()
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn merge_options_unions_first_seen() {
    let a: Schema = vec![enumerated("Status", "select", &["todo", "done"]), plain("Name", "title")]
        .into_iter()
        .collect();
    let b: Schema = vec![enumerated("Status", "select", &["todo", "blocked"]), plain("Priority", "number")]
        .into_iter()
        .collect();

    let merged = merge_options(&[a, b]);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged["Status"], strings(&["todo", "done", "blocked"]));
}

#[test]
fn merge_options_is_idempotent() {
    let schemas: Vec<Schema> = vec![
        vec![enumerated("Tags", "multi_select", &["a", "b"])].into_iter().collect(),
        vec![enumerated("Tags", "multi_select", &["c", "a"])].into_iter().collect(),
    ];

    let first = merge_options(&schemas);
    let second = merge_options(&schemas);

    assert_eq!(first, second);
    assert_eq!(first["Tags"], strings(&["a", "b", "c"]));
}

#[test]
fn merge_options_keeps_empty_enumerated_properties() {
    let a: Schema = vec![enumerated("Stage", "select", &[])].into_iter().collect();
    let merged = merge_options(&[a]);
    assert_eq!(merged["Stage"], Vec::<String>::new());
}

#[test]
fn merged_property_options_follow_sources() {
    let a: Schema = vec![enumerated("Kind", "select", &["bug", "task"])].into_iter().collect();
    let b: Schema = vec![enumerated("Kind", "multi_select", &["ui", "api"])].into_iter().collect();
    let c: Schema = vec![enumerated("Kind", "select", &["task", "epic"])].into_iter().collect();
    let schemas = vec![a, b, c];
    let (merged, sources) = reconcile(&schemas);

    let options = merged_property_options(&schemas, &sources, &merged);

    assert_eq!(options["Kind"], strings(&["bug", "task", "epic"]));
    assert_eq!(options["Kind_db2"], strings(&["ui", "api"]));
}

#[test]
fn missing_options_preserves_desired_order() {
    let desired = strings(&["c", "a", "d", "c"]);
    let current = strings(&["a", "b"]);
    assert_eq!(missing_options(&desired, &current), strings(&["c", "d"]));
}

#[test]
fn missing_options_empty_when_subset() {
    let desired = strings(&["a"]);
    let current = strings(&["a", "b"]);
    assert!(missing_options(&desired, &current).is_empty());
}

#[test]
fn observed_options_scan_select_and_multi_select() {
    let mut special = IndexMap::new();
    special.insert("Status".to_string(), PropertyType::Select);
    special.insert("Tags".to_string(), PropertyType::MultiSelect);
    special.insert("Link".to_string(), PropertyType::Url);

    let records = vec![
        record("r1", json!({
            "Status": {"type": "select", "select": {"id": "x", "name": "todo", "color": "red"}},
            "Tags": {"type": "multi_select", "multi_select": [{"name": "ui"}, {"name": "api"}]},
            "Link": {"type": "url", "url": "https://example.com"}
        })),
        record("r2", json!({
            "Status": {"type": "select", "select": null},
            "Tags": {"type": "multi_select", "multi_select": [{"name": "api"}, {"id": "nameless"}, {"name": "db"}]}
        })),
        record("r3", json!({
            "Status": {"type": "select", "select": {"name": "done"}}
        })),
    ];

    let observed = collect_observed_options(&records, &special);

    let status: Vec<&str> = observed["Status"].iter().map(String::as_str).collect();
    let tags: Vec<&str> = observed["Tags"].iter().map(String::as_str).collect();
    assert_eq!(status, vec!["todo", "done"]);
    assert_eq!(tags, vec!["ui", "api", "db"]);
    assert!(!observed.contains_key("Link"));
}

#[test]
fn observed_options_track_present_but_empty_properties() {
    let mut special = IndexMap::new();
    special.insert("Status".to_string(), PropertyType::Select);
    let records = vec![record("r1", json!({"Status": {"type": "select", "select": null}}))];

    let observed = collect_observed_options(&records, &special);

    assert!(observed["Status"].is_empty());
}
