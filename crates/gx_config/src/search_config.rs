// crates/gx_config/src/search_config.rs

//! SearchConfig - 坐标操作搜索参数
//!
//! 描述一次"源 CRS → 目标 CRS"操作搜索的全部策略：
//! 感兴趣区域、精度要求、格网可用性策略、中间 CRS 策略等。
//! 所有字段都有默认值，空 JSON 对象即是合法配置。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// 坐标操作搜索配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// 权威机构限制（如 "EPSG"），`None` 表示任意权威
    #[serde(default)]
    pub authority: Option<String>,

    /// 感兴趣区域（经纬度，度）
    #[serde(default)]
    pub area_of_interest: Option<AreaOfInterest>,

    /// 期望精度 [m]，`None` 表示不限
    #[serde(default)]
    pub desired_accuracy: Option<f64>,

    /// 源/目标 CRS 范围的使用方式
    #[serde(default)]
    pub source_target_extent_use: SourceTargetExtentUse,

    /// 空间判定准则
    #[serde(default)]
    pub spatial_criterion: SpatialCriterion,

    /// 格网可用性策略
    #[serde(default)]
    pub grid_availability: GridAvailabilityUse,

    /// 中间（枢纽）CRS 策略
    #[serde(default)]
    pub intermediate_crs_use: IntermediateCrsUse,

    /// 允许作为枢纽的 CRS 标识（"AUTH:CODE"），空表示不限
    #[serde(default)]
    pub allowed_intermediate_crs: Vec<String>,

    /// 是否允许近似（ballpark）操作
    #[serde(default = "default_allow_ballpark")]
    pub allow_ballpark: bool,

    /// 只保留排名最优的一档结果
    #[serde(default)]
    pub restrict_to_best: bool,

    /// 是否丢弃已被取代的注册表操作
    #[serde(default = "default_discard_superseded")]
    pub discard_superseded: bool,
}

fn default_allow_ballpark() -> bool { true }
fn default_discard_superseded() -> bool { true }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            authority: None,
            area_of_interest: None,
            desired_accuracy: None,
            source_target_extent_use: SourceTargetExtentUse::default(),
            spatial_criterion: SpatialCriterion::default(),
            grid_availability: GridAvailabilityUse::default(),
            intermediate_crs_use: IntermediateCrsUse::default(),
            allowed_intermediate_crs: Vec::new(),
            allow_ballpark: default_allow_ballpark(),
            restrict_to_best: false,
            discard_superseded: default_discard_superseded(),
        }
    }
}

/// 感兴趣区域（地理经纬度包围盒，单位：度）
///
/// `west > east` 表示跨越 180° 经线。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    /// 西边界经度
    pub west: f64,
    /// 南边界纬度
    pub south: f64,
    /// 东边界经度
    pub east: f64,
    /// 北边界纬度
    pub north: f64,
}

impl AreaOfInterest {
    /// 创建区域
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    /// 全球范围
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// 验证区域有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value, limit) in [
            ("area_of_interest.west", self.west, 180.0),
            ("area_of_interest.east", self.east, 180.0),
            ("area_of_interest.south", self.south, 90.0),
            ("area_of_interest.north", self.north, 90.0),
        ] {
            if !value.is_finite() || value.abs() > limit {
                return Err(ConfigError::invalid_value(
                    key,
                    value,
                    format!("必须在 [-{limit}, {limit}] 范围内"),
                ));
            }
        }
        if self.south > self.north {
            return Err(ConfigError::invalid_value(
                "area_of_interest.south",
                self.south,
                "南边界不能大于北边界",
            ));
        }
        Ok(())
    }
}

/// 源/目标 CRS 范围的使用方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceTargetExtentUse {
    /// 忽略源/目标 CRS 的范围
    None,
    /// 操作必须同时满足源和目标的范围
    Both,
    /// 使用源与目标范围中较小的一个
    #[default]
    Smallest,
    /// 使用源与目标范围的交集
    Intersection,
}

/// 空间判定准则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpatialCriterion {
    /// 操作范围必须完全包含感兴趣区域
    StrictContainment,
    /// 操作范围与感兴趣区域相交即可
    #[default]
    PartialIntersection,
}

/// 格网可用性策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GridAvailabilityUse {
    /// 格网可用性只影响排序
    #[default]
    UseForSorting,
    /// 丢弃缺少格网的操作
    DiscardOperationIfMissingGrid,
    /// 完全忽略格网可用性
    Ignore,
    /// 只保留格网已知可用的操作
    KnownAvailable,
}

/// 中间（枢纽）CRS 策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntermediateCrsUse {
    /// 总是尝试经由中间 CRS
    Always,
    /// 仅当没有直接变换时尝试
    #[default]
    IfNoDirectTransformation,
    /// 从不使用中间 CRS
    Never,
}

impl SearchConfig {
    /// 从 JSON 文本解析并验证
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = serde_json::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(ConfigError::Io)?;
        log::debug!("加载搜索配置: {}", path.as_ref().display());
        Self::from_json_str(&content)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(acc) = self.desired_accuracy {
            if !acc.is_finite() || acc < 0.0 {
                return Err(ConfigError::invalid_value(
                    "desired_accuracy",
                    acc,
                    "精度必须为非负有限值",
                ));
            }
        }

        if let Some(authority) = &self.authority {
            if authority.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "authority",
                    authority,
                    "权威名称不能为空字符串",
                ));
            }
        }

        if let Some(area) = &self.area_of_interest {
            area.validate()?;
        }

        for id in &self.allowed_intermediate_crs {
            if !id.contains(':') {
                return Err(ConfigError::invalid_value(
                    "allowed_intermediate_crs",
                    id,
                    "标识必须形如 AUTH:CODE",
                ));
            }
        }

        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.allow_ballpark);
        assert_eq!(config.spatial_criterion, SpatialCriterion::PartialIntersection);
        assert_eq!(config.grid_availability, GridAvailabilityUse::UseForSorting);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = SearchConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SearchConfig::default());
    }

    #[test]
    fn test_invalid_accuracy() {
        let mut config = SearchConfig::default();
        config.desired_accuracy = Some(-1.0);
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "desired_accuracy"),
            _ => panic!("错误的错误类型"),
        }
    }

    #[test]
    fn test_invalid_area() {
        let mut config = SearchConfig::default();
        config.area_of_interest = Some(AreaOfInterest::new(0.0, 50.0, 10.0, 40.0));
        assert!(config.validate().is_err());

        config.area_of_interest = Some(AreaOfInterest::new(170.0, -10.0, -170.0, 10.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_intermediate_id() {
        let mut config = SearchConfig::default();
        config.allowed_intermediate_crs = vec!["4326".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enum_serialization() {
        let json = serde_json::to_string(&IntermediateCrsUse::IfNoDirectTransformation).unwrap();
        assert_eq!(json, "\"if_no_direct_transformation\"");
        let parsed: GridAvailabilityUse =
            serde_json::from_str("\"discard_operation_if_missing_grid\"").unwrap();
        assert_eq!(parsed, GridAvailabilityUse::DiscardOperationIfMissingGrid);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            SearchConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
