use std::fs;
use std::path::PathBuf;

use blastview::config::Config;
use blastview::engine::ViewMode;
use blastview::graph::{DEFAULT_HOPS, DEFAULT_NODE_LIMIT};

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("blastview-test-{}", std::process::id()))
        .join(name)
}

#[test]
fn empty_file_gives_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.default_hops, DEFAULT_HOPS);
    assert_eq!(config.node_limit, DEFAULT_NODE_LIMIT);
    assert_eq!(config.default_view, ViewMode::ThreeD);
}

#[test]
fn partial_file_overrides_only_named_keys() {
    let config = Config::from_toml_str(
        r#"
default_hops = 2
default_view = "2d"
organization_id = "  acme "
"#,
    )
    .unwrap();

    assert_eq!(config.default_hops, 2);
    assert_eq!(config.default_view, ViewMode::TwoD);
    assert_eq!(config.organization_id.as_deref(), Some("acme"));
    assert_eq!(config.node_limit, DEFAULT_NODE_LIMIT);
}

#[test]
fn out_of_range_values_are_sanitized() {
    let config = Config::from_toml_str(
        r#"
default_hops = 9
node_limit = 0
vertical_lift = -2.0
search_result_limit = 0
color_cache_capacity = 0
camera_transition_secs = -1.0
organization_id = "   "
"#,
    )
    .unwrap();
    let defaults = Config::default();

    assert_eq!(config.default_hops, 5);
    assert_eq!(config.node_limit, defaults.node_limit);
    assert_eq!(config.vertical_lift, defaults.vertical_lift);
    assert_eq!(config.search_result_limit, defaults.search_result_limit);
    assert_eq!(config.color_cache_capacity, defaults.color_cache_capacity);
    assert_eq!(config.camera_transition_secs, defaults.camera_transition_secs);
    assert_eq!(config.organization_id, None);

    let zero_hops = Config::from_toml_str("default_hops = 0").unwrap();
    assert_eq!(zero_hops.default_hops, 1);

    let oversized = Config::from_toml_str("node_limit = 5000").unwrap();
    assert_eq!(oversized.node_limit, DEFAULT_NODE_LIMIT);
    let small = Config::from_toml_str("node_limit = 40").unwrap();
    assert_eq!(small.node_limit, 40);
}

#[test]
fn invalid_toml_is_an_error() {
    assert!(Config::from_toml_str("default_hops = \"three\"").is_err());
    assert!(Config::from_toml_str("default_view = \"4d\"").is_err());
}

#[test]
fn save_and_load_round_trip() {
    let path = scratch_path("config.toml");
    let config = Config {
        default_hops: 4,
        default_view: ViewMode::TwoD,
        catalog_path: Some(PathBuf::from("/srv/catalog.json")),
        organization_id: Some("acme".to_owned()),
        ..Config::default()
    };

    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);

    if let Some(parent) = path.parent() {
        let _ = fs::remove_dir_all(parent);
    }
}

#[test]
fn missing_file_is_an_error() {
    assert!(Config::load_from(&scratch_path("does-not-exist.toml")).is_err());
}
