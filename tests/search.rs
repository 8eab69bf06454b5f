use std::collections::HashSet;

use blastview::engine::{DEFAULT_RESULT_LIMIT, SearchIndex};
use blastview::graph::{Catalog, FocusKind};

const CATALOG: &str = r#"{
  "organizationId": "acme",
  "services": [
    { "id": "checkout", "name": "Checkout", "domain": "commerce",
      "dependencies": [{ "name": "postgres", "kind": "runtime" }, { "name": "serde" }] },
    { "id": "payments", "name": "Payments", "domain": "commerce",
      "dependencies": [{ "name": "postgres", "kind": "runtime" }, { "name": "serde" }] },
    { "id": "post-office", "name": "Post Office", "domain": "Commerce ",
      "dependencies": [{ "name": "postgres", "kind": "runtime" }] },
    { "id": "ledger", "name": "Ledger", "domain": "" }
  ]
}"#;

fn index() -> SearchIndex {
    SearchIndex::build(&Catalog::from_json(CATALOG).unwrap())
}

#[test]
fn entries_are_unique_per_kind_and_id() {
    let index = index();
    let keys = index
        .entries()
        .iter()
        .map(|entry| (entry.kind, entry.id.clone()))
        .collect::<HashSet<_>>();
    assert_eq!(keys.len(), index.len());

    let dependencies = index
        .entries()
        .iter()
        .filter(|entry| entry.kind == FocusKind::Dependency)
        .count();
    assert_eq!(dependencies, 2);
}

#[test]
fn blank_domains_are_not_indexed() {
    let index = index();
    assert!(
        index
            .entries()
            .iter()
            .all(|entry| !(entry.kind == FocusKind::Domain && entry.id.trim().is_empty()))
    );
}

#[test]
fn domains_differing_only_in_case_share_one_entry() {
    let domains = index()
        .entries()
        .iter()
        .filter(|entry| entry.kind == FocusKind::Domain)
        .map(|entry| entry.id.clone())
        .collect::<Vec<_>>();
    assert_eq!(domains, vec!["commerce".to_owned()]);
}

#[test]
fn query_is_case_insensitive_substring() {
    let index = index();
    let hits = index.query("LEDG", DEFAULT_RESULT_LIMIT);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "ledger");

    let hits = index.query("gres", DEFAULT_RESULT_LIMIT);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, FocusKind::Dependency);

    assert!(index.query("zzz", DEFAULT_RESULT_LIMIT).is_empty());
    assert!(index.query("   ", DEFAULT_RESULT_LIMIT).is_empty());
}

#[test]
fn prefix_matches_rank_before_inner_matches() {
    let index = index();
    let hits = index.query("pos", DEFAULT_RESULT_LIMIT);
    let names = hits
        .iter()
        .map(|entry| entry.display_name.as_str())
        .collect::<Vec<_>>();
    assert!(names.contains(&"Post Office"));
    assert!(names.contains(&"postgres"));
    assert!(hits.iter().all(|entry| entry.display_name.to_lowercase().starts_with("pos")));
}

#[test]
fn results_are_capped() {
    let index = index();
    assert_eq!(index.query("e", 2).len(), 2);
    assert!(index.query("e", 0).is_empty());
}

#[test]
fn selecting_an_entry_yields_its_focus() {
    let index = index();
    let hit = index.query("payments", DEFAULT_RESULT_LIMIT)[0];
    let focus = hit.focus_ref();
    assert_eq!(focus.kind, FocusKind::Service);
    assert_eq!(focus.id, "payments");
    assert_eq!(focus.display_name, "Payments");
}
