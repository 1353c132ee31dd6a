//! 绑定 CRS（附带到 WGS 84 的 Helmert 参数）
//!
//! 经由枢纽的操作、与注册表的优先关系以及两个绑定 CRS 之间的操作。

use std::sync::Arc;

use gx_geo::crs::wellknown;
use gx_geo::prelude::*;

fn ntf_towgs84() -> Arc<Crs> {
    Crs::create_bound_to_wgs84(wellknown::epsg_4807(), &[-168.0, -60.0, 320.0]).unwrap()
}

fn best(source: &Arc<Crs>, target: &Arc<Crs>, ctx: &OperationContext) -> Arc<CoordinateOperation> {
    CoordinateOperationFactory::new()
        .create_operation(source, target, ctx)
        .unwrap()
}

#[test]
fn test_bound_construction() {
    let bound = ntf_towgs84();
    assert!(bound.is_bound());
    let inner = bound.as_bound().unwrap();
    assert_eq!(inner.base().name(), "NTF (Paris)");
    assert_eq!(inner.hub().name(), "WGS 84");
    assert_eq!(
        inner.transformation().name(),
        "Transformation from NTF (Paris) to WGS84"
    );

    let err = Crs::create_bound_to_wgs84(wellknown::epsg_4807(), &[1.0, 2.0]).unwrap_err();
    match &err {
        GeoError::InvalidParameter { .. } => {}
        _ => panic!("错误的错误类型"),
    }
}

#[test]
fn test_to_hub_uses_towgs84() {
    let op = best(&ntf_towgs84(), &wellknown::epsg_4326(), &OperationContext::new());
    assert!(!op.has_ballpark_transformation());
    let pipeline = op.to_pipeline_string().unwrap();
    assert!(pipeline.contains("+proj=helmert +x=-168 +y=-60 +z=320"));
    assert!(pipeline.contains("+proj=push +v_3"));
}

#[test]
fn test_from_hub_is_inverse() {
    let backward = best(&wellknown::epsg_4326(), &ntf_towgs84(), &OperationContext::new());
    assert_eq!(backward.source_crs().unwrap().name(), "WGS 84");
    assert_eq!(backward.target_crs().unwrap().name(), "NTF (Paris)");
    assert!(backward
        .to_pipeline_string()
        .unwrap()
        .contains("+proj=helmert +x=168 +y=60 +z=-320"));
}

#[test]
fn test_beyond_hub() {
    let op = best(&ntf_towgs84(), &wellknown::epsg_4978(), &OperationContext::new());
    assert!(!op.has_ballpark_transformation());
    let pipeline = op.to_pipeline_string().unwrap();
    assert!(pipeline.contains("+proj=helmert +x=-168 +y=-60 +z=320"));
    assert!(pipeline.ends_with("+proj=cart +ellps=WGS84"));
}

#[test]
fn test_registry_operation_preferred() {
    let registered = CoordinateOperation::create_geocentric_translations(
        ObjectMeta::named("NTF (Paris) to WGS 84 (1)").with_epsg(8094),
        wellknown::epsg_4807(),
        wellknown::epsg_4979(),
        -168.0,
        -60.0,
        320.0,
        Some(PositionalAccuracy::new(2.0).unwrap()),
    );
    let ctx = OperationContext::new().with_registry(Arc::new(
        InMemoryRegistry::with_epsg_defaults().with_operation(registered),
    ));
    let op = best(&ntf_towgs84(), &wellknown::epsg_4979(), &ctx);
    assert_eq!(op.name(), "NTF (Paris) to WGS 84 (1)");
    assert_eq!(op.accuracy(), Some(2.0));
}

#[test]
fn test_two_bound_crs() {
    let nad27 = Crs::geographic(
        ObjectMeta::named("NAD27").with_epsg(4267),
        wellknown::datum_nad27(),
        CoordinateSystem::ellipsoidal_lat_long(UnitOfMeasure::DEGREE),
    )
    .unwrap();
    let nad27_towgs84 = Crs::create_bound_to_wgs84(nad27, &[-8.0, 160.0, 176.0]).unwrap();
    let op = best(&ntf_towgs84(), &nad27_towgs84, &OperationContext::new());
    assert_eq!(op.source_crs().unwrap().name(), "NTF (Paris)");
    assert_eq!(op.target_crs().unwrap().name(), "NAD27");
    let pipeline = op.to_pipeline_string().unwrap();
    assert!(pipeline.contains("+proj=helmert +x=-168 +y=-60 +z=320"));
    assert!(pipeline.contains("+ellps=clrk66"));
    assert!(!op.has_ballpark_transformation());

    // 同一绑定 CRS 两端等价
    let same = best(&ntf_towgs84(), &ntf_towgs84(), &OperationContext::new());
    assert_eq!(same.to_pipeline_string().unwrap(), "+proj=noop");
}
