// geodex\crates\gx_geo\src\crs\bound.rs
//! 绑定（Bound）CRS
//!
//! 基础 CRS 附带一个到枢纽 CRS（通常是 WGS 84）的变换，
//! 对应旧式字符串中的 `+towgs84` 与 `+nadgrids`。

use super::{Crs, CrsKind};
use crate::error::{GeoError, GeoResult};
use crate::operation::CoordinateOperation;
use std::sync::Arc;

/// 绑定 CRS 的内容
#[derive(Debug, Clone)]
pub struct BoundCrs {
    base: Arc<Crs>,
    hub: Arc<Crs>,
    transformation: Arc<CoordinateOperation>,
}

impl BoundCrs {
    /// 基础 CRS
    pub fn base(&self) -> &Arc<Crs> {
        &self.base
    }

    /// 枢纽 CRS
    pub fn hub(&self) -> &Arc<Crs> {
        &self.hub
    }

    /// 基础 CRS（的大地部分）到枢纽 CRS 的变换
    pub fn transformation(&self) -> &Arc<CoordinateOperation> {
        &self.transformation
    }
}

/// 以新的基础与枢纽重建，变换端点随之更新
pub(super) fn rebind(base: Arc<Crs>, hub: Arc<Crs>, previous: &BoundCrs) -> Arc<Crs> {
    let source = base.extract_geodetic_crs().unwrap_or_else(|| base.clone());
    let transformation = previous
        .transformation
        .rebound(Some(source), Some(hub.clone()));
    let meta = base.meta.clone();
    Crs::from_kind(
        meta,
        CrsKind::Bound(BoundCrs {
            base,
            hub,
            transformation,
        }),
    )
}

impl Crs {
    /// 创建绑定 CRS，元数据取自基础 CRS
    ///
    /// 基础 CRS 不能本身是绑定 CRS，`transformation` 不能是转换。
    pub fn bound(
        base: Arc<Crs>,
        hub: Arc<Crs>,
        transformation: Arc<CoordinateOperation>,
    ) -> GeoResult<Arc<Crs>> {
        GeoError::check_construction(!base.is_bound(), "绑定 CRS", || {
            format!("基础 CRS '{}' 已是绑定 CRS", base.name())
        })?;
        GeoError::check_construction(!transformation.is_conversion(), "绑定 CRS", || {
            format!("'{}' 是转换而不是变换", transformation.name())
        })?;
        let meta = base.meta.clone();
        Ok(Crs::from_kind(
            meta,
            CrsKind::Bound(BoundCrs {
                base,
                hub,
                transformation,
            }),
        ))
    }

    /// 由 TOWGS84 参数（3 或 7 个）创建到 WGS 84 的绑定 CRS
    pub fn create_bound_to_wgs84(base: Arc<Crs>, towgs84: &[f64]) -> GeoResult<Arc<Crs>> {
        let geodetic = base.extract_geodetic_crs().ok_or_else(|| {
            GeoError::invalid_construction(
                "绑定 CRS",
                format!("'{}' 没有大地 CRS 分量", base.name()),
            )
        })?;
        let transformation = CoordinateOperation::create_towgs84(&geodetic, towgs84)?;
        let hub = transformation.target_crs().ok_or_else(|| {
            GeoError::invalid_construction("绑定 CRS", "towgs84 变换缺少目标 CRS")
        })?;
        Self::bound(base, hub, transformation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::operation::epsg;
    use crate::pipeline::Convention;

    #[test]
    fn test_bound_takes_base_metadata() {
        let bound =
            Crs::create_bound_to_wgs84(wellknown::epsg_4807(), &[-168.0, -60.0, 320.0]).unwrap();
        assert_eq!(bound.name(), "NTF (Paris)");
        let b = bound.as_bound().unwrap();
        assert_eq!(b.hub().name(), "WGS 84");
        assert_eq!(
            b.transformation().method_code(),
            Some(epsg::GEOCENTRIC_TRANSLATION_GEOG2D)
        );
        assert_eq!(
            b.transformation().name(),
            "Transformation from NTF (Paris) to WGS84"
        );
    }

    #[test]
    fn test_bound_of_bound_rejected() {
        let bound =
            Crs::create_bound_to_wgs84(wellknown::epsg_4807(), &[-168.0, -60.0, 320.0]).unwrap();
        let tr = bound.as_bound().unwrap().transformation().clone();
        let err = Crs::bound(bound, wellknown::epsg_4326(), tr).unwrap_err();
        match &err {
            GeoError::InvalidConstruction { what, .. } => assert_eq!(*what, "绑定 CRS"),
            _ => panic!("错误的错误类型"),
        }
    }

    #[test]
    fn test_towgs84_arity() {
        let err = Crs::create_bound_to_wgs84(wellknown::epsg_4807(), &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, GeoError::InvalidParameter { .. }));
    }

    #[test]
    fn test_bound_crs_string() {
        let bound =
            Crs::create_bound_to_wgs84(wellknown::epsg_4807(), &[-168.0, -60.0, 320.0]).unwrap();
        assert_eq!(
            bound.to_proj_crs_string(Convention::Proj5).unwrap(),
            "+proj=longlat +ellps=clrk80ign +towgs84=-168,-60,320,0,0,0,0 +pm=paris +no_defs +type=crs"
        );
    }

    #[test]
    fn test_promote_rebinds_transformation() {
        let bound =
            Crs::create_bound_to_wgs84(wellknown::epsg_4807(), &[-168.0, -60.0, 320.0]).unwrap();
        let promoted = bound.promote_to_3d(None);
        let b = promoted.as_bound().unwrap();
        assert_eq!(b.base().dimension(), 3);
        assert_eq!(b.hub().dimension(), 3);
        assert_eq!(b.transformation().target_crs().unwrap().dimension(), 3);
    }
}
