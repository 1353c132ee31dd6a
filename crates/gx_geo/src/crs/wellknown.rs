// geodex\crates\gx_geo\src\crs\wellknown.rs
//! 常用 CRS 与基准的进程级单例
//!
//! 首次访问时构造，之后返回同一个 `Arc`，因此可以用 `Arc::ptr_eq` 快速比较。

use super::{Crs, CrsKind, DatumSource, SingleCrs};
use crate::cs::CoordinateSystem;
use crate::datum::{Datum, Ellipsoid, PrimeMeridian};
use crate::metadata::{GeographicBoundingBox, Identifier, ObjectMeta};
use crate::units::UnitOfMeasure;
use std::sync::{Arc, OnceLock};

// ============================================================================
// 基准
// ============================================================================

/// World Geodetic System 1984 (EPSG:6326)
pub fn datum_wgs84() -> Arc<Datum> {
    static CELL: OnceLock<Arc<Datum>> = OnceLock::new();
    CELL.get_or_init(|| {
        Arc::new(Datum::geodetic(
            ObjectMeta::named("World Geodetic System 1984")
                .with_epsg(6326)
                .with_alias("WGS_1984"),
            Ellipsoid::WGS84,
            PrimeMeridian::GREENWICH,
        ))
    })
    .clone()
}

/// North American Datum 1983 (EPSG:6269)
pub fn datum_nad83() -> Arc<Datum> {
    static CELL: OnceLock<Arc<Datum>> = OnceLock::new();
    CELL.get_or_init(|| {
        Arc::new(Datum::geodetic(
            ObjectMeta::named("North American Datum 1983").with_epsg(6269),
            Ellipsoid::GRS80,
            PrimeMeridian::GREENWICH,
        ))
    })
    .clone()
}

/// North American Datum 1927 (EPSG:6267)
pub fn datum_nad27() -> Arc<Datum> {
    static CELL: OnceLock<Arc<Datum>> = OnceLock::new();
    CELL.get_or_init(|| {
        Arc::new(Datum::geodetic(
            ObjectMeta::named("North American Datum 1927").with_epsg(6267),
            Ellipsoid::CLARKE_1866,
            PrimeMeridian::GREENWICH,
        ))
    })
    .clone()
}

/// Nouvelle Triangulation Francaise (Paris) (EPSG:6807)
pub fn datum_ntf_paris() -> Arc<Datum> {
    static CELL: OnceLock<Arc<Datum>> = OnceLock::new();
    CELL.get_or_init(|| {
        Arc::new(Datum::geodetic(
            ObjectMeta::named("Nouvelle Triangulation Francaise (Paris)").with_epsg(6807),
            Ellipsoid::CLARKE_1880_IGN,
            PrimeMeridian::PARIS,
        ))
    })
    .clone()
}

/// EGM96 大地水准面 (EPSG:5171)
pub fn datum_egm96() -> Arc<Datum> {
    static CELL: OnceLock<Arc<Datum>> = OnceLock::new();
    CELL.get_or_init(|| Arc::new(Datum::vertical(ObjectMeta::named("EGM96 geoid").with_epsg(5171))))
        .clone()
}

// ============================================================================
// CRS
// ============================================================================

fn single(meta: ObjectMeta, datum: Arc<Datum>, cs: CoordinateSystem, wrap: fn(SingleCrs) -> CrsKind) -> Arc<Crs> {
    Crs::from_kind(meta, wrap(SingleCrs::new(DatumSource::Datum(datum), cs)))
}

fn wgs84_meta(name: &str, code: u32) -> ObjectMeta {
    ObjectMeta::named(name)
        .with_epsg(code)
        .with_extent(GeographicBoundingBox::world())
}

/// WGS 84 地理 2D，纬度在前 (EPSG:4326)
pub fn epsg_4326() -> Arc<Crs> {
    static CELL: OnceLock<Arc<Crs>> = OnceLock::new();
    CELL.get_or_init(|| {
        single(
            wgs84_meta("WGS 84", 4326),
            datum_wgs84(),
            CoordinateSystem::ellipsoidal_lat_long(UnitOfMeasure::DEGREE),
            CrsKind::Geographic,
        )
    })
    .clone()
}

/// WGS 84 地理 3D (EPSG:4979)
pub fn epsg_4979() -> Arc<Crs> {
    static CELL: OnceLock<Arc<Crs>> = OnceLock::new();
    CELL.get_or_init(|| {
        single(
            wgs84_meta("WGS 84", 4979),
            datum_wgs84(),
            CoordinateSystem::ellipsoidal_lat_long_h(UnitOfMeasure::DEGREE, UnitOfMeasure::METRE),
            CrsKind::Geographic,
        )
    })
    .clone()
}

/// WGS 84 地心 (EPSG:4978)
pub fn epsg_4978() -> Arc<Crs> {
    static CELL: OnceLock<Arc<Crs>> = OnceLock::new();
    CELL.get_or_init(|| {
        single(
            wgs84_meta("WGS 84", 4978),
            datum_wgs84(),
            CoordinateSystem::geocentric(UnitOfMeasure::METRE),
            CrsKind::Geodetic,
        )
    })
    .clone()
}

/// WGS 84 地理 2D，经度在前 (OGC:CRS84)
pub fn ogc_crs84() -> Arc<Crs> {
    static CELL: OnceLock<Arc<Crs>> = OnceLock::new();
    CELL.get_or_init(|| {
        single(
            ObjectMeta::named("WGS 84 (CRS84)")
                .with_identifier(Identifier::new("OGC", "CRS84"))
                .with_extent(GeographicBoundingBox::world()),
            datum_wgs84(),
            CoordinateSystem::ellipsoidal_long_lat(UnitOfMeasure::DEGREE),
            CrsKind::Geographic,
        )
    })
    .clone()
}

/// NTF (Paris)，百分度，巴黎子午线 (EPSG:4807)
pub fn epsg_4807() -> Arc<Crs> {
    static CELL: OnceLock<Arc<Crs>> = OnceLock::new();
    CELL.get_or_init(|| {
        single(
            ObjectMeta::named("NTF (Paris)")
                .with_epsg(4807)
                .with_extent(GeographicBoundingBox::new(-4.87, 41.31, 9.63, 51.14)),
            datum_ntf_paris(),
            CoordinateSystem::ellipsoidal_lat_long(UnitOfMeasure::GRAD),
            CrsKind::Geographic,
        )
    })
    .clone()
}

/// EGM96 正高 (EPSG:5773)
pub fn egm96_height() -> Arc<Crs> {
    static CELL: OnceLock<Arc<Crs>> = OnceLock::new();
    CELL.get_or_init(|| {
        single(
            ObjectMeta::named("EGM96 height")
                .with_epsg(5773)
                .with_extent(GeographicBoundingBox::world()),
            datum_egm96(),
            CoordinateSystem::gravity_related_height(UnitOfMeasure::METRE),
            CrsKind::Vertical,
        )
    })
    .clone()
}

/// EGM96 深度（轴向下）
pub fn egm96_depth() -> Arc<Crs> {
    static CELL: OnceLock<Arc<Crs>> = OnceLock::new();
    CELL.get_or_init(|| {
        single(
            ObjectMeta::named("EGM96 depth").with_extent(GeographicBoundingBox::world()),
            datum_egm96(),
            CoordinateSystem::depth(UnitOfMeasure::METRE),
            CrsKind::Vertical,
        )
    })
    .clone()
}

/// 本地工程 CRS（东、北，米）
pub fn local_engineering() -> Arc<Crs> {
    static CELL: OnceLock<Arc<Crs>> = OnceLock::new();
    CELL.get_or_init(|| {
        single(
            ObjectMeta::named("Local engineering"),
            Arc::new(Datum::engineering(ObjectMeta::named("Local datum"))),
            CoordinateSystem::easting_northing(UnitOfMeasure::METRE),
            CrsKind::Engineering,
        )
    })
    .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons_are_shared() {
        assert!(Arc::ptr_eq(&epsg_4326(), &epsg_4326()));
        assert!(Arc::ptr_eq(&datum_wgs84(), &epsg_4979().datum().unwrap()));
    }

    #[test]
    fn test_kinds() {
        assert!(epsg_4326().is_geographic());
        assert!(epsg_4979().is_geographic_3d());
        assert!(epsg_4978().is_geocentric());
        assert!(egm96_height().is_vertical());
        assert_eq!(epsg_4807().prime_meridian().unwrap().name(), "Paris");
        assert_eq!(datum_nad83().ellipsoid().unwrap().name(), "GRS 1980");
        assert_eq!(datum_nad27().ellipsoid().unwrap().name(), "Clarke 1866");
    }
}
