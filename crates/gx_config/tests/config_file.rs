//! 搜索配置文件读写测试
//!
//! 通过临时目录验证 `save_to_file` / `from_file` 的往返与错误路径。

use gx_config::{
    AreaOfInterest, ConfigError, IntermediateCrsUse, SearchConfig, SpatialCriterion,
};

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("search.json");

    let config = SearchConfig {
        authority: Some("EPSG".into()),
        area_of_interest: Some(AreaOfInterest::new(2.0, 48.0, 3.0, 49.0)),
        desired_accuracy: Some(2.5),
        spatial_criterion: SpatialCriterion::StrictContainment,
        intermediate_crs_use: IntermediateCrsUse::Always,
        restrict_to_best: true,
        ..SearchConfig::default()
    };
    config.save_to_file(&path).unwrap();

    let loaded = SearchConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SearchConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "authority": "  " }"#).unwrap();

    match SearchConfig::from_file(&path) {
        Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "authority"),
        other => panic!("错误的结果: {other:?}"),
    }
}

#[test]
fn test_partial_json() {
    let config = SearchConfig::from_json_str(
        r#"{ "intermediate_crs_use": "never", "allow_ballpark": false }"#,
    )
    .unwrap();
    assert_eq!(config.intermediate_crs_use, IntermediateCrsUse::Never);
    assert!(!config.allow_ballpark);
    assert!(config.discard_superseded);
}
