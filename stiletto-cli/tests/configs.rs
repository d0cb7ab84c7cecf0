use serde::{Deserialize, Serialize};
use std::fs;
use stiletto::Markers;
use stiletto_cli::{Config, ConfigSection, OutputConfig, SymbolUniverse, TracingConfig};
use tempfile::NamedTempFile;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
struct PoolConfig {
    size: u32,
    #[serde(default)]
    names: Vec<String>,
}

impl ConfigSection for PoolConfig {
    fn key() -> &'static str {
        "pool"
    }
}

fn config_file(text: &str) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), text).unwrap();
    file
}

#[tokio::test]
async fn test_config_new() {
    let config = Config::new();
    assert!(config.is_empty());
    assert_eq!(config.len(), 0);
}

#[tokio::test]
async fn test_config_set_and_get() {
    let mut config = Config::new();
    let pool = PoolConfig {
        size: 4,
        names: vec!["a".into()],
    };
    config.set("pool", &pool).unwrap();
    let retrieved: PoolConfig = config.get("pool").unwrap();
    assert_eq!(retrieved, pool);
    assert_eq!(config.len(), 1);
}

#[tokio::test]
async fn test_config_get_nonexistent() {
    let config = Config::new();
    let result: Result<PoolConfig, _> = config.get("pool");
    assert!(result.is_err());
    let value: Option<PoolConfig> = config.get("pool").unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
async fn test_config_section_defaults_when_absent() {
    let config = Config::new();
    assert_eq!(config.section::<PoolConfig>().unwrap(), PoolConfig::default());
    assert_eq!(config.section::<Markers>().unwrap(), Markers::default());
    assert_eq!(config.section::<OutputConfig>().unwrap().directory, None);
}

#[tokio::test]
async fn test_markers_section_keeps_unset_defaults() {
    let config = Config::parse(
        r#"{"markers": {"module": "a.Generate", "nullable": ["Nullable", "CheckForNull"]}}"#,
    )
    .unwrap();
    let markers: Markers = config.section().unwrap();
    assert_eq!(markers.module, "a.Generate");
    assert_eq!(markers.nullable, ["Nullable", "CheckForNull"]);
    assert_eq!(markers.runtime, Markers::default().runtime);
    assert_eq!(markers.dagger_module, "dagger.Module");
}

#[tokio::test]
async fn test_config_merge() {
    let mut config = Config::parse(
        r#"{"pool": {"size": 1, "names": ["a"]}, "output": {"directory": "out"}}"#,
    )
    .unwrap();
    config
        .merge_from(Config::parse(r#"{"pool": {"size": 2, "names": ["b"]}}"#).unwrap())
        .unwrap();
    let pool: PoolConfig = config.section().unwrap();
    assert_eq!(pool.size, 2);
    assert_eq!(pool.names, ["a", "b"]);
    let output: OutputConfig = config.section().unwrap();
    assert_eq!(output.directory.unwrap().to_str(), Some("out"));
}

#[tokio::test]
async fn test_config_merge_replaces_mismatched_values() {
    let mut config = Config::parse(r#"{"pool": {"size": 1}, "mode": "fast"}"#).unwrap();
    config
        .merge_from(Config::parse(r#"{"pool": 3, "mode": {"name": "slow"}}"#).unwrap())
        .unwrap();
    let pool: u32 = config.get("pool").unwrap();
    assert_eq!(pool, 3);
    let mode: serde_json::Value = config.get("mode").unwrap();
    assert_eq!(mode, serde_json::json!({"name": "slow"}));
}

#[tokio::test]
async fn test_config_parse_invalid() {
    assert!(Config::parse("not json").is_err());
    assert!(Config::parse("[1, 2]").is_err());
}

#[tokio::test]
async fn test_config_load_with_overrides() {
    let base = config_file(r#"{"pool": {"size": 1, "names": ["a"]}}"#);
    let first = config_file(r#"{"pool": {"names": ["b"]}}"#);
    let second = config_file(r#"{"pool": {"size": 5}, "output": {"directory": "gen"}}"#);
    let config = Config::load(Some(base.path()), [first.path(), second.path()])
        .await
        .unwrap();
    let pool: PoolConfig = config.section().unwrap();
    assert_eq!(pool.size, 5);
    assert_eq!(pool.names, ["a", "b"]);
    assert_eq!(config.len(), 2);
}

#[tokio::test]
async fn test_config_load_without_base() {
    let patch = config_file(r#"{"output": {"directory": "gen"}}"#);
    let config = Config::load(None::<&std::path::Path>, [patch.path()])
        .await
        .unwrap();
    let output: OutputConfig = config.section().unwrap();
    assert!(output.directory.is_some());
}

#[tokio::test]
async fn test_config_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = Config::load(Some(&missing), Vec::<std::path::PathBuf>::new())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Cannot read config"));
}

#[tokio::test]
async fn test_config_to_json_pretty() {
    let config = Config::new().with("pool", PoolConfig::default()).unwrap();
    let text = config.to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value, serde_json::json!({"pool": {"size": 0, "names": []}}));
}

#[tokio::test]
async fn test_tracing_config() {
    let config =
        Config::parse(r#"{"tracing": {"level": "debug", "directives": ["stiletto=trace"]}}"#)
            .unwrap();
    let section: TracingConfig = config.section().unwrap();
    assert_eq!(section.level, tracing::Level::DEBUG);
    assert_eq!(section.directives, ["stiletto=trace"]);
    assert!(section.env_filter().is_ok());

    let section: TracingConfig = Config::new().section().unwrap();
    assert_eq!(section.level, tracing::Level::INFO);
}

#[tokio::test]
async fn test_tracing_config_invalid_level() {
    let config = Config::parse(r#"{"tracing": {"level": "loud"}}"#).unwrap();
    assert!(config.section::<TracingConfig>().is_err());
}

#[tokio::test]
async fn test_symbol_universe_default_round() {
    let universe = SymbolUniverse::parse(
        r#"{"types": [{"name": "app.A"}, {"name": "app.B<T>", "kind": "interface"}]}"#,
    )
    .unwrap();
    assert_eq!(universe.symbol_table().len(), 2);
    let rounds = universe.round_environments();
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].root_elements(), ["app.A", "app.B"]);
    assert!(!rounds[0].processing_over());
}

#[tokio::test]
async fn test_symbol_universe_explicit_rounds() {
    let universe =
        SymbolUniverse::parse(r#"{"types": [], "rounds": [["app.A"], ["app.B", "app.C"]]}"#)
            .unwrap();
    let rounds = universe.round_environments();
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[1].root_elements(), ["app.B", "app.C"]);
}

#[tokio::test]
async fn test_symbol_universe_parse_file_errors() {
    let file = config_file("{ broken");
    let err = SymbolUniverse::parse_file(file.path()).await.unwrap_err();
    assert!(err.to_string().starts_with("Invalid input"));
}
