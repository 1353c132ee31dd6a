// geodex\crates\gx_geo\src\crs\mod.rs
//! 坐标参考系统（CRS）模型
//!
//! [`Crs`] 是封闭的和类型：单一 CRS（大地、地理、垂直、时间、工程、参数）、
//! 派生 CRS（投影及各类派生）、复合 CRS 和绑定（Bound）CRS。
//! 所有 CRS 以 `Arc<Crs>` 共享，构造后不可变。
//!
//! # 不变量
//!
//! - 单一 CRS 恰好持有基准或基准集合之一
//! - 派生 CRS 的定义转换以弱引用指回所属 CRS
//! - 复合 CRS 展平嵌套，至少两个分量
//!
//! # 示例
//!
//! ```
//! use gx_geo::crs::wellknown;
//!
//! let wgs84 = wellknown::epsg_4326();
//! assert!(wgs84.is_geographic());
//! assert_eq!(wgs84.dimension(), 2);
//! assert_eq!(wgs84.promote_to_3d(None).dimension(), 3);
//! ```

mod bound;
mod compound;
mod derived;
mod equivalence;
mod export;
mod identify;
pub mod wellknown;

pub use bound::BoundCrs;
pub use compound::CompoundCrs;
pub use derived::{DerivedCrs, DerivedKind};
pub use identify::{CONFIDENCE_EQUIVALENT, CONFIDENCE_EXACT, CONFIDENCE_NAME_ONLY};

pub(crate) use export::{
    add_angular_unit_convert_and_axis_swap, add_datum_info, add_geocentric_unit_conversion,
    add_projected_unit_convert_and_axis_swap, export_crs,
};

use crate::cs::{AxisDirection, CoordinateSystem, CsKind};
use crate::datum::{Datum, DatumEnsemble, Ellipsoid, PrimeMeridian};
use crate::equivalence::{Criterion, Equivalence};
use crate::error::{GeoError, GeoResult};
use crate::metadata::{GeographicBoundingBox, ObjectMeta, PositionalAccuracy};
use crate::pipeline::{Convention, PipelineFormatter};
use crate::units::UnitOfMeasure;
use std::sync::Arc;

// ============================================================================
// 基准来源
// ============================================================================

/// 单一 CRS 的基准：基准或基准集合
#[derive(Debug, Clone, PartialEq)]
pub enum DatumSource {
    /// 基准
    Datum(Arc<Datum>),
    /// 基准集合
    Ensemble(Arc<DatumEnsemble>),
}

impl DatumSource {
    /// 从可选的基准与基准集合构造，必须恰好给出一个
    pub fn from_parts(
        datum: Option<Arc<Datum>>,
        ensemble: Option<Arc<DatumEnsemble>>,
    ) -> GeoResult<Self> {
        match (datum, ensemble) {
            (Some(d), None) => Ok(Self::Datum(d)),
            (None, Some(e)) => Ok(Self::Ensemble(e)),
            (Some(_), Some(_)) => Err(GeoError::invalid_construction(
                "CRS",
                "不能同时给出基准和基准集合",
            )),
            (None, None) => Err(GeoError::invalid_construction("CRS", "缺少基准或基准集合")),
        }
    }

    /// 代表性基准（集合取第一个成员的内容）
    pub fn as_datum(&self) -> Arc<Datum> {
        match self {
            Self::Datum(d) => d.clone(),
            Self::Ensemble(e) => e.as_datum(),
        }
    }

    /// 名称
    pub fn name(&self) -> &str {
        match self {
            Self::Datum(d) => d.name(),
            Self::Ensemble(e) => &e.meta.name,
        }
    }

    /// 元数据
    pub fn meta(&self) -> &ObjectMeta {
        match self {
            Self::Datum(d) => &d.meta,
            Self::Ensemble(e) => &e.meta,
        }
    }
}

impl From<Arc<Datum>> for DatumSource {
    fn from(datum: Arc<Datum>) -> Self {
        Self::Datum(datum)
    }
}

impl From<Datum> for DatumSource {
    fn from(datum: Datum) -> Self {
        Self::Datum(Arc::new(datum))
    }
}

impl From<Arc<DatumEnsemble>> for DatumSource {
    fn from(ensemble: Arc<DatumEnsemble>) -> Self {
        Self::Ensemble(ensemble)
    }
}

impl Equivalence for DatumSource {
    fn is_equivalent_to(&self, other: &Self, criterion: Criterion) -> bool {
        match (self, other) {
            (Self::Datum(a), Self::Datum(b)) => a.is_equivalent_to(b, criterion),
            (Self::Ensemble(a), Self::Ensemble(b)) => a.is_equivalent_to(b, criterion),
            (Self::Datum(d), Self::Ensemble(e)) | (Self::Ensemble(e), Self::Datum(d)) => {
                !criterion.is_strict() && e.contains(d, criterion)
            }
        }
    }
}

// ============================================================================
// 大地水准面模型
// ============================================================================

/// 挂在垂直 CRS 上的大地水准面模型
///
/// 描述从地理 3D CRS（插值 CRS）到该垂直 CRS 的格网变换。
#[derive(Debug, Clone)]
pub struct GeoidModel {
    /// 元数据
    pub meta: ObjectMeta,
    /// 格网文件名
    pub grid_file: String,
    /// 插值 CRS（地理 3D）
    pub interpolation_crs: Arc<Crs>,
    /// 精度
    pub accuracy: Option<PositionalAccuracy>,
}

impl GeoidModel {
    /// 创建大地水准面模型，插值 CRS 必须为地理 3D
    pub fn new(
        meta: ObjectMeta,
        grid_file: impl Into<String>,
        interpolation_crs: Arc<Crs>,
    ) -> GeoResult<Self> {
        GeoError::check_construction(interpolation_crs.is_geographic_3d(), "大地水准面模型", || {
            format!("插值 CRS '{}' 不是地理 3D CRS", interpolation_crs.name())
        })?;
        Ok(Self {
            meta,
            grid_file: grid_file.into(),
            interpolation_crs,
            accuracy: None,
        })
    }

    /// 设置精度
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: PositionalAccuracy) -> Self {
        self.accuracy = Some(accuracy);
        self
    }
}

// ============================================================================
// 单一 CRS
// ============================================================================

/// 单一 CRS 的内容：基准 + 坐标系
#[derive(Debug, Clone)]
pub struct SingleCrs {
    datum: DatumSource,
    cs: CoordinateSystem,
    geoid_models: Vec<GeoidModel>,
}

impl SingleCrs {
    pub(crate) fn new(datum: DatumSource, cs: CoordinateSystem) -> Self {
        Self {
            datum,
            cs,
            geoid_models: Vec::new(),
        }
    }

    /// 基准来源
    pub fn datum(&self) -> &DatumSource {
        &self.datum
    }

    /// 坐标系
    pub fn cs(&self) -> &CoordinateSystem {
        &self.cs
    }

    /// 大地水准面模型
    pub fn geoid_models(&self) -> &[GeoidModel] {
        &self.geoid_models
    }
}

// ============================================================================
// CRS
// ============================================================================

/// CRS 类别
#[derive(Debug, Clone)]
pub enum CrsKind {
    /// 大地 CRS（地心笛卡尔或球面）
    Geodetic(SingleCrs),
    /// 地理 CRS（椭球坐标系）
    Geographic(SingleCrs),
    /// 垂直 CRS
    Vertical(SingleCrs),
    /// 时间 CRS
    Temporal(SingleCrs),
    /// 工程 CRS
    Engineering(SingleCrs),
    /// 参数 CRS
    Parametric(SingleCrs),
    /// 投影 CRS
    Projected(DerivedCrs),
    /// 派生大地 CRS
    DerivedGeodetic(DerivedCrs),
    /// 派生地理 CRS
    DerivedGeographic(DerivedCrs),
    /// 派生投影 CRS
    DerivedProjected(DerivedCrs),
    /// 派生垂直 CRS
    DerivedVertical(DerivedCrs),
    /// 派生时间 CRS
    DerivedTemporal(DerivedCrs),
    /// 派生工程 CRS
    DerivedEngineering(DerivedCrs),
    /// 派生参数 CRS
    DerivedParametric(DerivedCrs),
    /// 复合 CRS
    Compound(CompoundCrs),
    /// 绑定 CRS
    Bound(BoundCrs),
}

/// 坐标参考系统
#[derive(Debug, Clone)]
pub struct Crs {
    /// 元数据
    pub meta: ObjectMeta,
    kind: CrsKind,
}

impl Crs {
    /// 不做校验的内部构造
    pub(crate) fn from_kind(meta: ObjectMeta, kind: CrsKind) -> Arc<Self> {
        Arc::new(Self { meta, kind })
    }

    fn create_single(
        meta: ObjectMeta,
        datum: DatumSource,
        cs: CoordinateSystem,
        wrap: fn(SingleCrs) -> CrsKind,
        label: &'static str,
        cs_ok: impl Fn(&CoordinateSystem) -> bool,
        datum_ok: impl Fn(&Datum) -> bool,
    ) -> GeoResult<Arc<Self>> {
        GeoError::check_construction(cs_ok(&cs), "CRS", || {
            format!("{label} '{}' 的坐标系类别 {:?} 不匹配", meta.name, cs.kind())
        })?;
        GeoError::check_construction(datum_ok(&datum.as_datum()), "CRS", || {
            format!("{label} '{}' 的基准 '{}' 类别不匹配", meta.name, datum.name())
        })?;
        Ok(Self::from_kind(meta, wrap(SingleCrs::new(datum, cs))))
    }

    /// 大地 CRS（地心笛卡尔或球面坐标系）
    pub fn geodetic(
        meta: ObjectMeta,
        datum: impl Into<DatumSource>,
        cs: CoordinateSystem,
    ) -> GeoResult<Arc<Self>> {
        Self::create_single(
            meta,
            datum.into(),
            cs,
            CrsKind::Geodetic,
            "大地 CRS",
            |cs| matches!(cs.kind(), CsKind::Cartesian | CsKind::Spherical),
            Datum::is_geodetic,
        )
    }

    /// 地理 CRS（椭球坐标系）
    pub fn geographic(
        meta: ObjectMeta,
        datum: impl Into<DatumSource>,
        cs: CoordinateSystem,
    ) -> GeoResult<Arc<Self>> {
        Self::create_single(
            meta,
            datum.into(),
            cs,
            CrsKind::Geographic,
            "地理 CRS",
            |cs| cs.kind() == CsKind::Ellipsoidal,
            Datum::is_geodetic,
        )
    }

    /// 垂直 CRS
    pub fn vertical(
        meta: ObjectMeta,
        datum: impl Into<DatumSource>,
        cs: CoordinateSystem,
    ) -> GeoResult<Arc<Self>> {
        Self::vertical_with_geoids(meta, datum, cs, Vec::new())
    }

    /// 带大地水准面模型的垂直 CRS
    pub fn vertical_with_geoids(
        meta: ObjectMeta,
        datum: impl Into<DatumSource>,
        cs: CoordinateSystem,
        geoid_models: Vec<GeoidModel>,
    ) -> GeoResult<Arc<Self>> {
        let datum = datum.into();
        GeoError::check_construction(cs.kind() == CsKind::Vertical, "CRS", || {
            format!("垂直 CRS '{}' 需要垂直坐标系", meta.name)
        })?;
        GeoError::check_construction(datum.as_datum().is_vertical(), "CRS", || {
            format!("垂直 CRS '{}' 需要垂直基准", meta.name)
        })?;
        let mut single = SingleCrs::new(datum, cs);
        single.geoid_models = geoid_models;
        Ok(Self::from_kind(meta, CrsKind::Vertical(single)))
    }

    /// 时间 CRS
    pub fn temporal(
        meta: ObjectMeta,
        datum: impl Into<DatumSource>,
        cs: CoordinateSystem,
    ) -> GeoResult<Arc<Self>> {
        Self::create_single(
            meta,
            datum.into(),
            cs,
            CrsKind::Temporal,
            "时间 CRS",
            |cs| cs.kind() == CsKind::Temporal,
            |d| matches!(d.kind(), crate::datum::DatumKind::Temporal { .. }),
        )
    }

    /// 工程 CRS
    pub fn engineering(
        meta: ObjectMeta,
        datum: impl Into<DatumSource>,
        cs: CoordinateSystem,
    ) -> GeoResult<Arc<Self>> {
        Self::create_single(
            meta,
            datum.into(),
            cs,
            CrsKind::Engineering,
            "工程 CRS",
            |_| true,
            |d| matches!(d.kind(), crate::datum::DatumKind::Engineering),
        )
    }

    /// 参数 CRS
    pub fn parametric(
        meta: ObjectMeta,
        datum: impl Into<DatumSource>,
        cs: CoordinateSystem,
    ) -> GeoResult<Arc<Self>> {
        Self::create_single(
            meta,
            datum.into(),
            cs,
            CrsKind::Parametric,
            "参数 CRS",
            |cs| cs.kind() == CsKind::Parametric,
            |d| matches!(d.kind(), crate::datum::DatumKind::Parametric),
        )
    }

    // ========================================================================
    // 访问器
    // ========================================================================

    /// 名称
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// 类别
    pub fn kind(&self) -> &CrsKind {
        &self.kind
    }

    /// 单一 CRS 内容
    pub fn as_single(&self) -> Option<&SingleCrs> {
        match &self.kind {
            CrsKind::Geodetic(s)
            | CrsKind::Geographic(s)
            | CrsKind::Vertical(s)
            | CrsKind::Temporal(s)
            | CrsKind::Engineering(s)
            | CrsKind::Parametric(s) => Some(s),
            _ => None,
        }
    }

    /// 派生 CRS 内容
    pub fn as_derived(&self) -> Option<&DerivedCrs> {
        match &self.kind {
            CrsKind::Projected(d)
            | CrsKind::DerivedGeodetic(d)
            | CrsKind::DerivedGeographic(d)
            | CrsKind::DerivedProjected(d)
            | CrsKind::DerivedVertical(d)
            | CrsKind::DerivedTemporal(d)
            | CrsKind::DerivedEngineering(d)
            | CrsKind::DerivedParametric(d) => Some(d),
            _ => None,
        }
    }

    /// 复合 CRS 内容
    pub fn as_compound(&self) -> Option<&CompoundCrs> {
        match &self.kind {
            CrsKind::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// 绑定 CRS 内容
    pub fn as_bound(&self) -> Option<&BoundCrs> {
        match &self.kind {
            CrsKind::Bound(b) => Some(b),
            _ => None,
        }
    }

    /// 坐标系（单一或派生 CRS）
    pub fn coordinate_system(&self) -> Option<&CoordinateSystem> {
        self.as_single()
            .map(SingleCrs::cs)
            .or_else(|| self.as_derived().map(DerivedCrs::cs))
    }

    /// 维度
    pub fn dimension(&self) -> usize {
        match &self.kind {
            CrsKind::Compound(c) => c.components().iter().map(|c| c.dimension()).sum(),
            CrsKind::Bound(b) => b.base().dimension(),
            _ => self.coordinate_system().map_or(0, CoordinateSystem::dimension),
        }
    }

    /// 基准来源（派生 CRS 取基础 CRS 的基准）
    pub fn datum_source(&self) -> Option<&DatumSource> {
        if let Some(single) = self.as_single() {
            return Some(single.datum());
        }
        self.as_derived().and_then(|d| d.base().datum_source())
    }

    /// 代表性基准
    pub fn datum(&self) -> Option<Arc<Datum>> {
        self.datum_source().map(DatumSource::as_datum)
    }

    /// 基准集合
    pub fn datum_ensemble(&self) -> Option<&Arc<DatumEnsemble>> {
        match self.datum_source() {
            Some(DatumSource::Ensemble(e)) => Some(e),
            _ => None,
        }
    }

    /// 椭球
    pub fn ellipsoid(&self) -> Option<Ellipsoid> {
        self.datum().and_then(|d| d.ellipsoid().cloned())
    }

    /// 本初子午线
    pub fn prime_meridian(&self) -> Option<PrimeMeridian> {
        self.datum().and_then(|d| d.prime_meridian().cloned())
    }

    /// 大地水准面模型（垂直 CRS）
    pub fn geoid_models(&self) -> &[GeoidModel] {
        match &self.kind {
            CrsKind::Vertical(s) => s.geoid_models(),
            _ => &[],
        }
    }

    /// 地理 CRS（含派生地理）
    pub fn is_geographic(&self) -> bool {
        matches!(self.kind, CrsKind::Geographic(_) | CrsKind::DerivedGeographic(_))
    }

    /// 地理 3D CRS
    pub fn is_geographic_3d(&self) -> bool {
        self.is_geographic() && self.dimension() == 3
    }

    /// 大地族 CRS（大地、地理及其派生）
    pub fn is_geodetic_family(&self) -> bool {
        matches!(
            self.kind,
            CrsKind::Geodetic(_)
                | CrsKind::Geographic(_)
                | CrsKind::DerivedGeodetic(_)
                | CrsKind::DerivedGeographic(_)
        )
    }

    /// 地心笛卡尔 CRS
    pub fn is_geocentric(&self) -> bool {
        matches!(self.kind, CrsKind::Geodetic(_) | CrsKind::DerivedGeodetic(_))
            && self
                .coordinate_system()
                .map_or(false, CoordinateSystem::is_geocentric)
    }

    /// 球面行星中心 CRS（球面坐标系的纬度、经度）
    pub fn is_spherical_planetocentric(&self) -> bool {
        matches!(self.kind, CrsKind::Geodetic(_))
            && self.coordinate_system().map_or(false, |cs| {
                cs.kind() == CsKind::Spherical && cs.dimension() == 2
            })
    }

    /// 投影 CRS（含派生投影）
    pub fn is_projected(&self) -> bool {
        matches!(self.kind, CrsKind::Projected(_) | CrsKind::DerivedProjected(_))
    }

    /// 垂直 CRS（含派生垂直）
    pub fn is_vertical(&self) -> bool {
        matches!(self.kind, CrsKind::Vertical(_) | CrsKind::DerivedVertical(_))
    }

    /// 复合 CRS
    pub fn is_compound(&self) -> bool {
        matches!(self.kind, CrsKind::Compound(_))
    }

    /// 绑定 CRS
    pub fn is_bound(&self) -> bool {
        matches!(self.kind, CrsKind::Bound(_))
    }

    /// 派生 CRS（含投影）
    pub fn is_derived(&self) -> bool {
        self.as_derived().is_some()
    }

    /// 有效范围（绑定 CRS 取基础 CRS 的范围）
    pub fn domain_of_validity(&self) -> Option<GeographicBoundingBox> {
        self.meta.domain_of_validity().or_else(|| match &self.kind {
            CrsKind::Bound(b) => b.base().domain_of_validity(),
            _ => None,
        })
    }

    // ========================================================================
    // 提取分量
    // ========================================================================

    /// 大地 CRS：自身、派生/投影的基础、复合的分量、绑定的基础
    pub fn extract_geodetic_crs(self: &Arc<Self>) -> Option<Arc<Self>> {
        match &self.kind {
            CrsKind::Geodetic(_)
            | CrsKind::Geographic(_)
            | CrsKind::DerivedGeodetic(_)
            | CrsKind::DerivedGeographic(_) => Some(self.clone()),
            CrsKind::Projected(d) | CrsKind::DerivedProjected(d) => d.base().extract_geodetic_crs(),
            CrsKind::Compound(c) => c.components().iter().find_map(|c| c.extract_geodetic_crs()),
            CrsKind::Bound(b) => b.base().extract_geodetic_crs(),
            _ => None,
        }
    }

    /// 地理 CRS
    pub fn extract_geographic_crs(self: &Arc<Self>) -> Option<Arc<Self>> {
        self.extract_geodetic_crs().filter(|c| c.is_geographic())
    }

    /// 垂直 CRS
    pub fn extract_vertical_crs(self: &Arc<Self>) -> Option<Arc<Self>> {
        match &self.kind {
            CrsKind::Vertical(_) | CrsKind::DerivedVertical(_) => Some(self.clone()),
            CrsKind::Compound(c) => c.components().iter().find_map(|c| c.extract_vertical_crs()),
            CrsKind::Bound(b) => b.base().extract_vertical_crs(),
            _ => None,
        }
    }

    // ========================================================================
    // 变体
    // ========================================================================

    fn with_single(&self, meta: ObjectMeta, cs: CoordinateSystem) -> Option<Arc<Self>> {
        let single = self.as_single()?;
        let mut copy = single.clone();
        copy.cs = cs;
        let kind = match &self.kind {
            CrsKind::Geodetic(_) => CrsKind::Geodetic(copy),
            CrsKind::Geographic(_) => CrsKind::Geographic(copy),
            CrsKind::Vertical(_) => CrsKind::Vertical(copy),
            CrsKind::Temporal(_) => CrsKind::Temporal(copy),
            CrsKind::Engineering(_) => CrsKind::Engineering(copy),
            CrsKind::Parametric(_) => CrsKind::Parametric(copy),
            _ => return None,
        };
        Some(Self::from_kind(meta, kind))
    }

    fn renamed_meta(&self, new_name: Option<&str>) -> ObjectMeta {
        let mut meta = self.meta.clone();
        meta.identifiers.clear();
        if let Some(name) = new_name {
            meta.name = name.to_string();
        }
        meta
    }

    /// 3D 降为 2D；其他 CRS 原样返回
    pub fn demote_to_2d(self: &Arc<Self>, new_name: Option<&str>) -> Arc<Self> {
        match &self.kind {
            CrsKind::Geographic(s) if s.cs().dimension() == 3 => self
                .with_single(self.renamed_meta(new_name), s.cs().demote_to_2d())
                .unwrap_or_else(|| self.clone()),
            CrsKind::Projected(d) if d.cs().dimension() == 3 => {
                let base = d.base().demote_to_2d(None);
                self.rebuild_derived(self.renamed_meta(new_name), base, d.cs().demote_to_2d())
                    .unwrap_or_else(|| self.clone())
            }
            CrsKind::Compound(c) => c.components()[0].clone(),
            CrsKind::Bound(b) => {
                bound::rebind(b.base().demote_to_2d(None), b.hub().demote_to_2d(None), b)
            }
            _ => self.clone(),
        }
    }

    /// 2D 升为 3D（追加米制椭球高）；其他 CRS 原样返回
    pub fn promote_to_3d(self: &Arc<Self>, new_name: Option<&str>) -> Arc<Self> {
        match &self.kind {
            CrsKind::Geographic(s) if s.cs().dimension() == 2 => self
                .with_single(
                    self.renamed_meta(new_name),
                    s.cs().promote_to_3d(UnitOfMeasure::METRE),
                )
                .unwrap_or_else(|| self.clone()),
            CrsKind::Projected(d) if d.cs().dimension() == 2 => {
                let base = d.base().promote_to_3d(None);
                self.rebuild_derived(
                    self.renamed_meta(new_name),
                    base,
                    d.cs().promote_to_3d(UnitOfMeasure::METRE),
                )
                .unwrap_or_else(|| self.clone())
            }
            CrsKind::Bound(b) => {
                bound::rebind(b.base().promote_to_3d(None), b.hub().promote_to_3d(None), b)
            }
            _ => self.clone(),
        }
    }

    /// 改名后的浅拷贝（标识清空）
    pub fn alter_name(self: &Arc<Self>, name: &str) -> Arc<Self> {
        let meta = self.renamed_meta(Some(name));
        if let Some(d) = self.as_derived() {
            if let Some(crs) = self.rebuild_derived(meta.clone(), d.base().clone(), d.cs().clone()) {
                return crs;
            }
        }
        Self::from_kind(meta, self.kind.clone())
    }

    /// 可视化轴序：东/北在前
    ///
    /// 地理 CRS 变为经度在前，北东轴序的投影 CRS 变为东北轴序。
    pub fn normalized_for_visualization(self: &Arc<Self>) -> Arc<Self> {
        match &self.kind {
            CrsKind::Geographic(s) if starts_north_or_south(s.cs()) => self
                .with_single(self.renamed_meta(None), s.cs().axis_order_reversed())
                .unwrap_or_else(|| self.clone()),
            CrsKind::Projected(d) if starts_north_or_south(d.cs()) => self
                .rebuild_derived(self.renamed_meta(None), d.base().clone(), d.cs().axis_order_reversed())
                .unwrap_or_else(|| self.clone()),
            CrsKind::Compound(c) => {
                let components: Vec<_> = c
                    .components()
                    .iter()
                    .map(|c| c.normalized_for_visualization())
                    .collect();
                compound::from_components(self.renamed_meta(None), components)
            }
            CrsKind::Bound(b) => bound::rebind(b.base().normalized_for_visualization(), b.hub().clone(), b),
            _ => self.clone(),
        }
    }

    // ========================================================================
    // 导出
    // ========================================================================

    /// 导出为 CRS 字符串（`+proj=longlat +datum=WGS84 +no_defs +type=crs` 形式）
    pub fn to_proj_crs_string(self: &Arc<Self>, convention: Convention) -> GeoResult<String> {
        let mut f = PipelineFormatter::for_crs(convention);
        export_crs(self, &mut f)?;
        f.add_param_flag("no_defs");
        if convention == Convention::Proj5 {
            f.add_param("type", "crs");
        }
        Ok(f.to_pipeline_string())
    }
}

fn starts_north_or_south(cs: &CoordinateSystem) -> bool {
    cs.dimension() >= 2
        && matches!(
            cs.axes()[0].direction,
            AxisDirection::North | AxisDirection::South
        )
}
