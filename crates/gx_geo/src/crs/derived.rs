// geodex\crates\gx_geo\src\crs\derived.rs
//! 派生 CRS 与投影 CRS
//!
//! 派生 CRS 持有基础 CRS（强引用）和定义转换；转换反过来以弱引用指向所属 CRS，
//! 用 `Arc::new_cyclic` 一次建立，避免引用环。

use super::{Crs, CrsKind};
use crate::cs::{CoordinateSystem, CsKind};
use crate::error::{GeoError, GeoResult};
use crate::metadata::ObjectMeta;
use crate::operation::{CoordinateOperation, CrsLink};
use std::sync::{Arc, Weak};

/// 派生 CRS 的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedKind {
    /// 派生大地
    Geodetic,
    /// 派生地理
    Geographic,
    /// 派生投影
    Projected,
    /// 派生垂直
    Vertical,
    /// 派生时间
    Temporal,
    /// 派生工程
    Engineering,
    /// 派生参数
    Parametric,
}

/// 派生 CRS 的内容
#[derive(Debug, Clone)]
pub struct DerivedCrs {
    base: Arc<Crs>,
    conversion: Arc<CoordinateOperation>,
    cs: CoordinateSystem,
}

impl DerivedCrs {
    /// 基础 CRS
    pub fn base(&self) -> &Arc<Crs> {
        &self.base
    }

    /// 定义转换（目标端为弱引用；需要完整端点时用 [`Crs::deriving_conversion`]）
    pub fn conversion(&self) -> &Arc<CoordinateOperation> {
        &self.conversion
    }

    /// 坐标系
    pub fn cs(&self) -> &CoordinateSystem {
        &self.cs
    }
}

fn wrap_for(kind: Option<DerivedKind>) -> fn(DerivedCrs) -> CrsKind {
    match kind {
        None => CrsKind::Projected,
        Some(DerivedKind::Geodetic) => CrsKind::DerivedGeodetic,
        Some(DerivedKind::Geographic) => CrsKind::DerivedGeographic,
        Some(DerivedKind::Projected) => CrsKind::DerivedProjected,
        Some(DerivedKind::Vertical) => CrsKind::DerivedVertical,
        Some(DerivedKind::Temporal) => CrsKind::DerivedTemporal,
        Some(DerivedKind::Engineering) => CrsKind::DerivedEngineering,
        Some(DerivedKind::Parametric) => CrsKind::DerivedParametric,
    }
}

fn is_temporal(crs: &Crs) -> bool {
    matches!(crs.kind(), CrsKind::Temporal(_) | CrsKind::DerivedTemporal(_))
}

fn is_parametric(crs: &Crs) -> bool {
    matches!(crs.kind(), CrsKind::Parametric(_) | CrsKind::DerivedParametric(_))
}

/// 校验基础 CRS 与坐标系是否适合该派生类别
fn validate(kind: Option<DerivedKind>, base: &Crs, cs: &CoordinateSystem) -> Result<(), String> {
    let (base_ok, cs_ok) = match kind {
        None => (base.is_geodetic_family(), cs.kind() == CsKind::Cartesian),
        Some(DerivedKind::Geodetic) => (
            base.is_geodetic_family(),
            matches!(cs.kind(), CsKind::Cartesian | CsKind::Spherical),
        ),
        Some(DerivedKind::Geographic) => {
            (base.is_geodetic_family(), cs.kind() == CsKind::Ellipsoidal)
        }
        Some(DerivedKind::Projected) => (base.is_projected(), cs.kind() == CsKind::Cartesian),
        Some(DerivedKind::Vertical) => (base.is_vertical(), cs.kind() == CsKind::Vertical),
        Some(DerivedKind::Temporal) => (is_temporal(base), cs.kind() == CsKind::Temporal),
        Some(DerivedKind::Engineering) => (!base.is_compound() && !base.is_bound(), true),
        Some(DerivedKind::Parametric) => (is_parametric(base), cs.kind() == CsKind::Parametric),
    };
    if !base_ok {
        return Err(format!("基础 CRS '{}' 类别不适合 {kind:?}", base.name()));
    }
    if !cs_ok {
        return Err(format!("坐标系类别 {:?} 不适合 {kind:?}", cs.kind()));
    }
    Ok(())
}

impl Crs {
    /// 创建投影 CRS
    ///
    /// 基础 CRS 必须为大地族，坐标系必须为笛卡尔，`conversion` 必须为转换。
    pub fn projected(
        meta: ObjectMeta,
        base: Arc<Crs>,
        conversion: CoordinateOperation,
        cs: CoordinateSystem,
    ) -> GeoResult<Arc<Crs>> {
        Self::create_derived(None, meta, base, conversion, cs)
    }

    /// 创建派生 CRS
    pub fn derived(
        kind: DerivedKind,
        meta: ObjectMeta,
        base: Arc<Crs>,
        conversion: CoordinateOperation,
        cs: CoordinateSystem,
    ) -> GeoResult<Arc<Crs>> {
        Self::create_derived(Some(kind), meta, base, conversion, cs)
    }

    fn create_derived(
        kind: Option<DerivedKind>,
        meta: ObjectMeta,
        base: Arc<Crs>,
        conversion: CoordinateOperation,
        cs: CoordinateSystem,
    ) -> GeoResult<Arc<Crs>> {
        GeoError::check_construction(conversion.is_conversion(), "派生 CRS", || {
            format!("定义操作 '{}' 不是转换", conversion.name())
        })?;
        validate(kind, &base, &cs)
            .map_err(|reason| GeoError::invalid_construction("派生 CRS", reason))?;
        Ok(Self::assemble_derived(wrap_for(kind), meta, base, conversion, cs))
    }

    fn assemble_derived(
        wrap: fn(DerivedCrs) -> CrsKind,
        meta: ObjectMeta,
        base: Arc<Crs>,
        conversion: CoordinateOperation,
        cs: CoordinateSystem,
    ) -> Arc<Crs> {
        Arc::new_cyclic(|me: &Weak<Crs>| {
            let conversion = Arc::new(
                conversion.bound_to(CrsLink::Strong(base.clone()), CrsLink::Weak(me.clone())),
            );
            Crs {
                meta,
                kind: wrap(DerivedCrs {
                    base,
                    conversion,
                    cs,
                }),
            }
        })
    }

    /// 以新的元数据、基础 CRS 和坐标系重建派生 CRS
    pub(crate) fn rebuild_derived(
        &self,
        meta: ObjectMeta,
        base: Arc<Crs>,
        cs: CoordinateSystem,
    ) -> Option<Arc<Crs>> {
        let derived = self.as_derived()?;
        let wrap: fn(DerivedCrs) -> CrsKind = match self.kind() {
            CrsKind::Projected(_) => CrsKind::Projected,
            CrsKind::DerivedGeodetic(_) => CrsKind::DerivedGeodetic,
            CrsKind::DerivedGeographic(_) => CrsKind::DerivedGeographic,
            CrsKind::DerivedProjected(_) => CrsKind::DerivedProjected,
            CrsKind::DerivedVertical(_) => CrsKind::DerivedVertical,
            CrsKind::DerivedTemporal(_) => CrsKind::DerivedTemporal,
            CrsKind::DerivedEngineering(_) => CrsKind::DerivedEngineering,
            CrsKind::DerivedParametric(_) => CrsKind::DerivedParametric,
            _ => return None,
        };
        let conversion = derived.conversion().as_ref().clone();
        Some(Self::assemble_derived(wrap, meta, base, conversion, cs))
    }

    /// 定义转换（源端为基础 CRS，目标端为强引用的自身）
    pub fn deriving_conversion(self: &Arc<Self>) -> Option<Arc<CoordinateOperation>> {
        let derived = self.as_derived()?;
        Some(Arc::new(derived.conversion().as_ref().clone().bound_to(
            CrsLink::Strong(derived.base().clone()),
            CrsLink::Strong(self.clone()),
        )))
    }

    /// 基础 CRS（派生或绑定）
    pub fn base_crs(&self) -> Option<&Arc<Crs>> {
        match self.kind() {
            CrsKind::Bound(b) => Some(b.base()),
            _ => self.as_derived().map(DerivedCrs::base),
        }
    }

    /// 浅拷贝；派生 CRS 重建以便定义转换指向新对象
    pub fn shallow_clone(self: &Arc<Self>) -> Arc<Self> {
        if let Some(d) = self.as_derived() {
            if let Some(copy) =
                self.rebuild_derived(self.meta.clone(), d.base().clone(), d.cs().clone())
            {
                return copy;
            }
        }
        Crs::from_kind(self.meta.clone(), self.kind().clone())
    }
}
