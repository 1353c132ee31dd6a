// geodex\crates\gx_geo\src\context.rs
//! 操作搜索上下文
//!
//! [`OperationContext`] 是 `gx_config::SearchConfig` 的运行时形态：
//! 策略枚举直接沿用配置层的定义，另外持有注册表与格网解析器。

use crate::crs::Crs;
use crate::error::{GeoError, GeoResult};
use crate::grid::GridResolver;
use crate::metadata::{GeographicBoundingBox, Identifier};
use crate::registry::Registry;
use gx_config::SearchConfig;
use std::fmt;
use std::sync::Arc;

pub use gx_config::{
    GridAvailabilityUse, IntermediateCrsUse, SourceTargetExtentUse, SpatialCriterion,
};

/// 操作搜索上下文
#[derive(Clone)]
pub struct OperationContext {
    registry: Option<Arc<dyn Registry>>,
    grid_resolver: Option<Arc<dyn GridResolver>>,
    authority: Option<String>,
    area_of_interest: Option<GeographicBoundingBox>,
    desired_accuracy: Option<f64>,
    source_target_extent_use: SourceTargetExtentUse,
    spatial_criterion: SpatialCriterion,
    grid_availability: GridAvailabilityUse,
    intermediate_crs_use: IntermediateCrsUse,
    allowed_intermediate_crs: Vec<Identifier>,
    allow_ballpark: bool,
    restrict_to_best: bool,
    discard_superseded: bool,
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("registry", &self.registry.as_ref().map(|r| r.authority().to_string()))
            .field("grid_resolver", &self.grid_resolver.is_some())
            .field("authority", &self.authority)
            .field("area_of_interest", &self.area_of_interest)
            .field("desired_accuracy", &self.desired_accuracy)
            .field("spatial_criterion", &self.spatial_criterion)
            .field("grid_availability", &self.grid_availability)
            .field("intermediate_crs_use", &self.intermediate_crs_use)
            .field("allow_ballpark", &self.allow_ballpark)
            .field("restrict_to_best", &self.restrict_to_best)
            .finish()
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationContext {
    /// 默认上下文：无注册表、无格网解析器，策略取配置默认值
    pub fn new() -> Self {
        Self::from_parts(&SearchConfig::default(), None, None)
    }

    fn from_parts(
        config: &SearchConfig,
        registry: Option<Arc<dyn Registry>>,
        grid_resolver: Option<Arc<dyn GridResolver>>,
    ) -> Self {
        Self {
            registry,
            grid_resolver,
            authority: config.authority.clone(),
            area_of_interest: config.area_of_interest.map(GeographicBoundingBox::from),
            desired_accuracy: config.desired_accuracy,
            source_target_extent_use: config.source_target_extent_use,
            spatial_criterion: config.spatial_criterion,
            grid_availability: config.grid_availability,
            intermediate_crs_use: config.intermediate_crs_use,
            allowed_intermediate_crs: config
                .allowed_intermediate_crs
                .iter()
                .filter_map(|s| Identifier::parse(s))
                .collect(),
            allow_ballpark: config.allow_ballpark,
            restrict_to_best: config.restrict_to_best,
            discard_superseded: config.discard_superseded,
        }
    }

    /// 由配置构建；配置先经过校验
    pub fn from_config(
        config: &SearchConfig,
        registry: Option<Arc<dyn Registry>>,
        grid_resolver: Option<Arc<dyn GridResolver>>,
    ) -> GeoResult<Self> {
        config
            .validate()
            .map_err(|e| GeoError::Foundation(e.into()))?;
        log::debug!(
            "搜索上下文: authority={:?}, accuracy={:?}, intermediate={:?}",
            config.authority,
            config.desired_accuracy,
            config.intermediate_crs_use
        );
        Ok(Self::from_parts(config, registry, grid_resolver))
    }

    // ========================================================================
    // 构建器
    // ========================================================================

    /// 设置注册表
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 设置格网解析器
    #[must_use]
    pub fn with_grid_resolver(mut self, resolver: Arc<dyn GridResolver>) -> Self {
        self.grid_resolver = Some(resolver);
        self
    }

    /// 设置感兴趣区域
    #[must_use]
    pub fn with_area_of_interest(mut self, area: GeographicBoundingBox) -> Self {
        self.area_of_interest = Some(area);
        self
    }

    /// 设置期望精度（米）
    #[must_use]
    pub fn with_desired_accuracy(mut self, metres: f64) -> Self {
        self.desired_accuracy = Some(metres);
        self
    }

    /// 设置空间判定准则
    #[must_use]
    pub fn with_spatial_criterion(mut self, criterion: SpatialCriterion) -> Self {
        self.spatial_criterion = criterion;
        self
    }

    /// 设置源/目标范围使用方式
    #[must_use]
    pub fn with_source_target_extent_use(mut self, usage: SourceTargetExtentUse) -> Self {
        self.source_target_extent_use = usage;
        self
    }

    /// 设置格网可用性策略
    #[must_use]
    pub fn with_grid_availability(mut self, usage: GridAvailabilityUse) -> Self {
        self.grid_availability = usage;
        self
    }

    /// 设置中间 CRS 策略
    #[must_use]
    pub fn with_intermediate_crs_use(mut self, usage: IntermediateCrsUse) -> Self {
        self.intermediate_crs_use = usage;
        self
    }

    /// 限定可用的中间 CRS
    #[must_use]
    pub fn with_allowed_intermediate_crs(mut self, ids: Vec<Identifier>) -> Self {
        self.allowed_intermediate_crs = ids;
        self
    }

    /// 是否允许粗略操作
    #[must_use]
    pub fn with_allow_ballpark(mut self, allow: bool) -> Self {
        self.allow_ballpark = allow;
        self
    }

    /// 只保留最优一档
    #[must_use]
    pub fn with_restrict_to_best(mut self, restrict: bool) -> Self {
        self.restrict_to_best = restrict;
        self
    }

    /// 限定权威机构
    #[must_use]
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    // ========================================================================
    // 访问器
    // ========================================================================

    /// 注册表
    pub fn registry(&self) -> Option<&dyn Registry> {
        self.registry.as_deref()
    }

    /// 格网解析器
    pub fn grid_resolver(&self) -> Option<&dyn GridResolver> {
        self.grid_resolver.as_deref()
    }

    /// 权威限制
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// 显式的感兴趣区域
    pub fn area_of_interest(&self) -> Option<GeographicBoundingBox> {
        self.area_of_interest
    }

    /// 期望精度
    pub fn desired_accuracy(&self) -> Option<f64> {
        self.desired_accuracy
    }

    /// 空间判定准则
    pub fn spatial_criterion(&self) -> SpatialCriterion {
        self.spatial_criterion
    }

    /// 格网可用性策略
    pub fn grid_availability(&self) -> GridAvailabilityUse {
        self.grid_availability
    }

    /// 中间 CRS 策略
    pub fn intermediate_crs_use(&self) -> IntermediateCrsUse {
        self.intermediate_crs_use
    }

    /// 是否允许粗略操作
    pub fn allow_ballpark(&self) -> bool {
        self.allow_ballpark
    }

    /// 是否只保留最优一档
    pub fn restrict_to_best(&self) -> bool {
        self.restrict_to_best
    }

    /// 是否丢弃已废弃的注册表操作
    pub fn discard_superseded(&self) -> bool {
        self.discard_superseded
    }

    /// 中间 CRS 是否被允许
    pub fn is_intermediate_allowed(&self, crs: &Crs) -> bool {
        self.allowed_intermediate_crs.is_empty()
            || crs
                .meta
                .identifiers
                .iter()
                .any(|id| self.allowed_intermediate_crs.contains(id))
    }

    /// 用于过滤和排序的区域
    ///
    /// 显式的感兴趣区域优先；否则按 `source_target_extent_use` 组合源与目标的范围。
    pub fn areas_of_interest(&self, source: &Crs, target: &Crs) -> Option<GeographicBoundingBox> {
        if self.area_of_interest.is_some() {
            return self.area_of_interest;
        }
        let (s, t) = (source.domain_of_validity(), target.domain_of_validity());
        match self.source_target_extent_use {
            SourceTargetExtentUse::None => None,
            SourceTargetExtentUse::Both | SourceTargetExtentUse::Intersection => match (s, t) {
                (Some(a), Some(b)) => a.intersection(&b),
                (a, b) => a.or(b),
            },
            SourceTargetExtentUse::Smallest => match (s, t) {
                (Some(a), Some(b)) => Some(if area(&a) <= area(&b) { a } else { b }),
                (a, b) => a.or(b),
            },
        }
    }
}

/// 包围盒的经纬度面积（度²），仅用于比较大小
fn area(bbox: &GeographicBoundingBox) -> f64 {
    let width = if bbox.crosses_antimeridian() {
        bbox.east + 360.0 - bbox.west
    } else {
        bbox.east - bbox.west
    };
    width * (bbox.north - bbox.south)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::registry::InMemoryRegistry;
    use gx_config::AreaOfInterest;

    #[test]
    fn test_default_context() {
        let ctx = OperationContext::new();
        assert!(ctx.registry().is_none());
        assert!(ctx.allow_ballpark());
        assert_eq!(ctx.intermediate_crs_use(), IntermediateCrsUse::IfNoDirectTransformation);
    }

    #[test]
    fn test_from_config() {
        let mut config = SearchConfig::default();
        config.desired_accuracy = Some(1.0);
        config.area_of_interest = Some(AreaOfInterest::new(2.0, 48.0, 3.0, 49.0));
        config.allowed_intermediate_crs = vec!["EPSG:4326".into()];
        let ctx = OperationContext::from_config(
            &config,
            Some(Arc::new(InMemoryRegistry::with_epsg_defaults())),
            None,
        )
        .unwrap();
        assert_eq!(ctx.desired_accuracy(), Some(1.0));
        assert_eq!(ctx.registry().unwrap().authority(), "EPSG");
        assert!(ctx.is_intermediate_allowed(&wellknown::epsg_4326()));
        assert!(!ctx.is_intermediate_allowed(&wellknown::epsg_4807()));
    }

    #[test]
    fn test_from_invalid_config() {
        let mut config = SearchConfig::default();
        config.desired_accuracy = Some(-1.0);
        let err = OperationContext::from_config(&config, None, None).unwrap_err();
        assert!(matches!(err, GeoError::Foundation(_)));
    }

    #[test]
    fn test_areas_of_interest() {
        let ctx = OperationContext::new();
        let area = ctx
            .areas_of_interest(&wellknown::epsg_4326(), &wellknown::epsg_4807())
            .unwrap();
        assert_eq!(area, wellknown::epsg_4807().domain_of_validity().unwrap());

        let explicit = GeographicBoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let ctx = ctx.with_area_of_interest(explicit);
        assert_eq!(
            ctx.areas_of_interest(&wellknown::epsg_4326(), &wellknown::epsg_4807()),
            Some(explicit)
        );
        let ctx = OperationContext::new().with_source_target_extent_use(SourceTargetExtentUse::None);
        assert!(ctx
            .areas_of_interest(&wellknown::epsg_4326(), &wellknown::epsg_4807())
            .is_none());
    }
}
