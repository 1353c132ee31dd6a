// geodex\crates\gx_geo\src\operation\mod.rs
//! 坐标操作模型
//!
//! [`CoordinateOperation`] 是封闭枚举式的操作：转换（Conversion）、
//! 变换（Transformation）、点运动、串联操作和逆操作包装。
//! 每个操作持有源/目标 CRS 链接；派生 CRS 的定义转换以弱引用指向
//! 所属 CRS，避免引用环。
//!
//! # 逆操作
//!
//! - 平移、Molodensky、偏移、经度旋转等可精确取逆的方法生成参数取反的新操作
//! - 投影与其他方法生成 `Inverse` 包装，导出时整体取逆
//! - 逆操作的逆总是原操作

mod concatenated;
mod conversion;
mod export;
mod method;
mod naming;
mod transformation;

pub use method::{
    epsg, OperationMethod, OperationParameter, OperationParameterValue, ParameterValue,
};
pub use transformation::{HelmertParams, HelmertRates};

pub(crate) use export::export_operation;

use crate::crs::Crs;
use crate::equivalence::{Criterion, Equivalence};
use crate::error::{GeoError, GeoResult};
use crate::grid::{GridDescription, GridResolver};
use crate::metadata::{names_equivalent, GeographicBoundingBox, ObjectMeta, PositionalAccuracy};
use crate::pipeline::{Convention, PipelineFormatter};
use crate::units::{Measure, UnitOfMeasure};
use std::sync::{Arc, Weak};

// ============================================================================
// CRS 链接
// ============================================================================

/// 指向 CRS 的强引用或弱引用
#[derive(Debug, Clone)]
pub enum CrsLink {
    /// 强引用
    Strong(Arc<Crs>),
    /// 弱引用（派生 CRS 的定义转换指回所属 CRS）
    Weak(Weak<Crs>),
}

impl CrsLink {
    /// 取得 CRS；弱引用失效时为 `None`
    pub fn upgrade(&self) -> Option<Arc<Crs>> {
        match self {
            Self::Strong(crs) => Some(crs.clone()),
            Self::Weak(weak) => weak.upgrade(),
        }
    }
}

// ============================================================================
// 操作
// ============================================================================

/// 单步操作：方法 + 参数值
#[derive(Debug, Clone)]
pub struct SingleOperation {
    /// 方法
    pub method: OperationMethod,
    /// 参数值
    pub values: Vec<OperationParameterValue>,
    /// 精确逆操作记录其正向操作
    pub(crate) forward: Option<Arc<CoordinateOperation>>,
}

impl SingleOperation {
    /// 创建单步操作
    pub fn new(method: OperationMethod, values: Vec<OperationParameterValue>) -> Self {
        Self {
            method,
            values,
            forward: None,
        }
    }
}

/// 操作类别
#[derive(Debug, Clone)]
pub enum OperationKind {
    /// 同一基准内的转换
    Conversion(SingleOperation),
    /// 跨基准的变换
    Transformation(SingleOperation),
    /// 同一 CRS 内的点运动
    PointMotion(SingleOperation),
    /// 串联操作（至少两步）
    Concatenated(Vec<Arc<CoordinateOperation>>),
    /// 逆操作包装
    Inverse(Arc<CoordinateOperation>),
}

/// 坐标操作
#[derive(Debug, Clone)]
pub struct CoordinateOperation {
    /// 元数据
    pub meta: ObjectMeta,
    source: Option<CrsLink>,
    target: Option<CrsLink>,
    interpolation_crs: Option<Arc<Crs>>,
    accuracies: Vec<PositionalAccuracy>,
    has_ballpark: bool,
    kind: OperationKind,
}

impl CoordinateOperation {
    pub(crate) fn from_parts(
        meta: ObjectMeta,
        source: Option<Arc<Crs>>,
        target: Option<Arc<Crs>>,
        kind: OperationKind,
    ) -> Self {
        let has_ballpark = matches!(kind, OperationKind::Transformation(_))
            && naming::is_ballpark_name(&meta.name);
        Self {
            meta,
            source: source.map(CrsLink::Strong),
            target: target.map(CrsLink::Strong),
            interpolation_crs: None,
            accuracies: Vec::new(),
            has_ballpark,
            kind,
        }
    }

    #[must_use]
    pub(crate) fn with_accuracy(mut self, accuracy: Option<PositionalAccuracy>) -> Self {
        self.accuracies = accuracy.into_iter().collect();
        self
    }

    #[must_use]
    pub(crate) fn with_interpolation_crs(mut self, crs: Option<Arc<Crs>>) -> Self {
        self.interpolation_crs = crs;
        self
    }

    #[must_use]
    pub(crate) fn with_ballpark(mut self, ballpark: bool) -> Self {
        self.has_ballpark = ballpark;
        self
    }

    /// 绑定源/目标链接（派生 CRS 构造时使用）
    pub(crate) fn bound_to(&self, source: CrsLink, target: CrsLink) -> Self {
        let mut op = self.clone();
        op.source = Some(source);
        op.target = Some(target);
        op
    }

    /// 替换源/目标 CRS（`None` 保持原值）
    pub fn rebound(
        self: &Arc<Self>,
        source: Option<Arc<Crs>>,
        target: Option<Arc<Crs>>,
    ) -> Arc<Self> {
        let mut op = (**self).clone();
        if let Some(src) = source {
            op.source = Some(CrsLink::Strong(src));
        }
        if let Some(tgt) = target {
            op.target = Some(CrsLink::Strong(tgt));
        }
        if let OperationKind::Conversion(s)
        | OperationKind::Transformation(s)
        | OperationKind::PointMotion(s) = &mut op.kind
        {
            s.forward = None;
        }
        Arc::new(op)
    }

    // ========================================================================
    // 访问器
    // ========================================================================

    /// 名称
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// 源 CRS；弱引用失效后为 `None`
    pub fn source_crs(&self) -> Option<Arc<Crs>> {
        self.source.as_ref().and_then(CrsLink::upgrade)
    }

    /// 目标 CRS；弱引用失效后为 `None`
    pub fn target_crs(&self) -> Option<Arc<Crs>> {
        self.target.as_ref().and_then(CrsLink::upgrade)
    }

    /// 插值 CRS
    pub fn interpolation_crs(&self) -> Option<&Arc<Crs>> {
        self.interpolation_crs.as_ref()
    }

    /// 类别
    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    /// 是否为转换
    pub fn is_conversion(&self) -> bool {
        matches!(self.kind, OperationKind::Conversion(_))
    }

    /// 是否为变换
    pub fn is_transformation(&self) -> bool {
        matches!(self.kind, OperationKind::Transformation(_))
    }

    /// 是否为串联操作
    pub fn is_concatenated(&self) -> bool {
        matches!(self.kind, OperationKind::Concatenated(_))
    }

    /// 单步操作内容
    pub fn single(&self) -> Option<&SingleOperation> {
        match &self.kind {
            OperationKind::Conversion(s)
            | OperationKind::Transformation(s)
            | OperationKind::PointMotion(s) => Some(s),
            _ => None,
        }
    }

    /// 方法
    pub fn method(&self) -> Option<&OperationMethod> {
        self.single().map(|s| &s.method)
    }

    /// 方法 EPSG 代码
    pub fn method_code(&self) -> Option<u32> {
        self.method().and_then(OperationMethod::epsg_code)
    }

    /// 参数值列表
    pub fn parameter_values(&self) -> &[OperationParameterValue] {
        self.single().map(|s| s.values.as_slice()).unwrap_or(&[])
    }

    /// 按 EPSG 参数代码取值
    pub fn parameter_value(&self, code: u32) -> Option<&ParameterValue> {
        self.parameter_values()
            .iter()
            .find(|v| v.parameter.epsg_code() == Some(code))
            .map(|v| &v.value)
    }

    /// 按 EPSG 参数代码取量值
    pub fn parameter_measure(&self, code: u32) -> Option<&Measure> {
        self.parameter_value(code).and_then(ParameterValue::as_measure)
    }

    /// 按 EPSG 参数代码取值并换算到指定单位
    pub fn parameter_in(&self, code: u32, unit: &UnitOfMeasure) -> Option<f64> {
        self.parameter_measure(code).map(|m| m.convert_to_unit(unit))
    }

    /// 按 EPSG 参数代码取文件名
    pub fn parameter_filename(&self, code: u32) -> Option<&str> {
        self.parameter_value(code).and_then(ParameterValue::as_filename)
    }

    /// 串联操作的步骤；其他操作为空
    pub fn steps(&self) -> &[Arc<CoordinateOperation>] {
        match &self.kind {
            OperationKind::Concatenated(steps) => steps,
            _ => &[],
        }
    }

    /// 显式给出的精度
    pub fn accuracies(&self) -> &[PositionalAccuracy] {
        &self.accuracies
    }

    /// 精度（米）；`None` 表示未知
    ///
    /// 显式精度优先；转换为 0，串联为各步之和，逆操作同正向。
    pub fn accuracy(&self) -> Option<f64> {
        if let Some(acc) = self.accuracies.first() {
            return Some(acc.metres());
        }
        match &self.kind {
            OperationKind::Conversion(_) => Some(0.0),
            OperationKind::Concatenated(steps) => steps
                .iter()
                .map(|s| s.accuracy())
                .try_fold(0.0, |sum, acc| acc.map(|a| sum + a)),
            OperationKind::Inverse(inner) => inner.accuracy(),
            OperationKind::Transformation(_) | OperationKind::PointMotion(_) => None,
        }
    }

    /// 是否含粗略（ballpark）变换
    pub fn has_ballpark_transformation(&self) -> bool {
        self.has_ballpark
    }

    /// 是否已废弃
    pub fn is_deprecated(&self) -> bool {
        self.meta.deprecated
    }

    /// 有效范围
    pub fn domain_of_validity(&self) -> Option<GeographicBoundingBox> {
        if let Some(bbox) = self.meta.domain_of_validity() {
            return Some(bbox);
        }
        match &self.kind {
            OperationKind::Inverse(inner) => inner.domain_of_validity(),
            _ => None,
        }
    }

    /// 叶子操作（展开串联与逆包装）
    pub fn leaf_operations(&self) -> Vec<&CoordinateOperation> {
        match &self.kind {
            OperationKind::Concatenated(steps) => {
                steps.iter().flat_map(|s| s.leaf_operations()).collect()
            }
            OperationKind::Inverse(inner) => inner.leaf_operations(),
            _ => vec![self],
        }
    }

    /// 是否含变换步骤
    pub fn contains_transformation(&self) -> bool {
        self.leaf_operations()
            .iter()
            .any(|op| op.is_transformation())
    }

    // ========================================================================
    // 逆操作
    // ========================================================================

    /// 逆操作
    pub fn inverse(self: &Arc<Self>) -> Arc<Self> {
        match &self.kind {
            OperationKind::Inverse(inner) => return inner.clone(),
            OperationKind::Conversion(s)
            | OperationKind::Transformation(s)
            | OperationKind::PointMotion(s) => {
                if let Some(forward) = &s.forward {
                    return forward.clone();
                }
            }
            OperationKind::Concatenated(steps) => {
                let inverted: Vec<_> = steps.iter().rev().map(|s| s.inverse()).collect();
                return Arc::new(concatenated::assemble(
                    ObjectMeta::named(naming::inverse_name(self.name())),
                    inverted,
                    self.accuracies.clone(),
                    self.has_ballpark,
                ));
            }
        }
        if let Some(exact) = transformation::exact_inverse(self) {
            return exact;
        }
        Arc::new(Self {
            meta: ObjectMeta::named(naming::inverse_name(self.name())),
            source: self.target_crs().map(CrsLink::Strong),
            target: self.source_crs().map(CrsLink::Strong),
            interpolation_crs: self.interpolation_crs.clone(),
            accuracies: self.accuracies.clone(),
            has_ballpark: self.has_ballpark,
            kind: OperationKind::Inverse(self.clone()),
        })
    }

    // ========================================================================
    // 格网
    // ========================================================================

    /// 引用的格网文件名（去重，保持顺序）
    pub fn grid_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for op in self.leaf_operations() {
            for value in op.parameter_values() {
                if let ParameterValue::Filename(f) = &value.value {
                    if !names.contains(f) {
                        names.push(f.clone());
                    }
                }
            }
        }
        names
    }

    /// 所需格网描述；解析器未知的格网标记为不可用
    pub fn grids_needed(&self, resolver: Option<&dyn GridResolver>) -> Vec<GridDescription> {
        self.grid_names()
            .into_iter()
            .map(|name| {
                resolver
                    .and_then(|r| r.grid_info(&name))
                    .unwrap_or_else(|| GridDescription::unknown(&name))
            })
            .collect()
    }

    // ========================================================================
    // 导出
    // ========================================================================

    /// 导出为管线字符串
    pub fn to_pipeline_string(&self) -> GeoResult<String> {
        self.to_pipeline_string_with(Convention::Proj5)
    }

    /// 按指定约定导出
    ///
    /// 旧式约定无法表达变换，遇到变换步骤返回 `Formatting` 错误。
    pub fn to_pipeline_string_with(&self, convention: Convention) -> GeoResult<String> {
        if convention == Convention::Proj4 && self.contains_transformation() {
            return Err(GeoError::formatting(format!(
                "旧式约定不能表达变换 '{}'",
                self.name()
            )));
        }
        let mut f = PipelineFormatter::with_convention(convention);
        export_operation(self, &mut f)?;
        Ok(f.to_pipeline_string())
    }

    // ========================================================================
    // 等价
    // ========================================================================

    /// 只比较方法与参数值（不比较源/目标）
    pub(crate) fn is_equivalent_ignoring_endpoints(&self, other: &Self, criterion: Criterion) -> bool {
        if criterion.is_strict() && !names_equivalent(self.name(), other.name()) {
            return false;
        }
        match (&self.kind, &other.kind) {
            (OperationKind::Conversion(a), OperationKind::Conversion(b))
            | (OperationKind::Transformation(a), OperationKind::Transformation(b))
            | (OperationKind::PointMotion(a), OperationKind::PointMotion(b)) => {
                single_equivalent(a, b)
            }
            (OperationKind::Concatenated(a), OperationKind::Concatenated(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.is_equivalent_to(y, criterion))
            }
            (OperationKind::Inverse(a), OperationKind::Inverse(b)) => a.is_equivalent_to(b, criterion),
            _ => false,
        }
    }
}

fn single_equivalent(a: &SingleOperation, b: &SingleOperation) -> bool {
    let same_method = match (a.method.epsg_code(), b.method.epsg_code()) {
        (Some(x), Some(y)) => x == y,
        _ => names_equivalent(a.method.name(), b.method.name()),
    };
    same_method
        && a.values.len() == b.values.len()
        && a.values
            .iter()
            .all(|v| b.values.iter().any(|w| v.is_equivalent(w)))
}

fn endpoints_equivalent(a: Option<Arc<Crs>>, b: Option<Arc<Crs>>, criterion: Criterion) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x.is_equivalent_to(&y, criterion),
        _ => false,
    }
}

impl Equivalence for CoordinateOperation {
    fn is_equivalent_to(&self, other: &Self, criterion: Criterion) -> bool {
        let components = criterion.for_components();
        self.is_equivalent_ignoring_endpoints(other, criterion)
            && endpoints_equivalent(self.source_crs(), other.source_crs(), components)
            && endpoints_equivalent(self.target_crs(), other.target_crs(), components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;

    fn ballpark() -> Arc<CoordinateOperation> {
        CoordinateOperation::create_geographic_2d_offsets(
            ObjectMeta::named("Ballpark geographic offset from WGS 84 to NTF (Paris)"),
            wellknown::epsg_4326(),
            wellknown::epsg_4807(),
            0.0,
            0.0,
            None,
        )
    }

    #[test]
    fn test_ballpark_flag_from_name() {
        let op = ballpark();
        assert!(op.has_ballpark_transformation());
        assert_eq!(op.accuracy(), None);
        assert!(op.is_transformation());
    }

    #[test]
    fn test_double_inverse_returns_same_operation() {
        let op = ballpark();
        let inv = op.inverse();
        assert_eq!(inv.name(), "Ballpark geographic offset from NTF (Paris) to WGS 84");
        assert!(Arc::ptr_eq(&inv.inverse(), &op));
    }

    #[test]
    fn test_wrapper_inverse() {
        let utm = Arc::new(CoordinateOperation::create_utm(31, true).unwrap());
        let inv = utm.inverse();
        assert!(matches!(inv.kind(), OperationKind::Inverse(_)));
        assert_eq!(inv.name(), "Inverse of UTM zone 31N");
        assert!(Arc::ptr_eq(&inv.inverse(), &utm));
    }

    #[test]
    fn test_conversion_accuracy_zero() {
        let utm = CoordinateOperation::create_utm(31, true).unwrap();
        assert_eq!(utm.accuracy(), Some(0.0));
        assert!(!utm.has_ballpark_transformation());
    }

    #[test]
    fn test_rebound_replaces_endpoints() {
        let op = ballpark();
        let other = op.rebound(Some(wellknown::ogc_crs84()), None);
        assert_eq!(other.source_crs().unwrap().meta.name, "WGS 84 (CRS84)");
        assert_eq!(other.target_crs().unwrap().meta.name, "NTF (Paris)");
    }

    #[test]
    fn test_proj4_refuses_transformations() {
        let err = ballpark().to_pipeline_string_with(Convention::Proj4).unwrap_err();
        assert!(err.is_formatting());
        let utm = CoordinateOperation::create_utm(31, true).unwrap();
        assert!(utm.to_pipeline_string_with(Convention::Proj4).is_ok());
    }

    #[test]
    fn test_grid_names() {
        let op = CoordinateOperation::create_ntv2(
            ObjectMeta::named("NTF to RGF93 v1 (1)"),
            wellknown::epsg_4807(),
            wellknown::epsg_4326(),
            "ntf_r93.gsb",
            Some(PositionalAccuracy::new(1.0).unwrap()),
        );
        assert_eq!(op.grid_names(), vec!["ntf_r93.gsb".to_string()]);
        let grids = op.grids_needed(None);
        assert_eq!(grids.len(), 1);
        assert!(!grids[0].available);
    }
}
