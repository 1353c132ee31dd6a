// geodex\crates\gx_geo\src\metadata.rs
//! 对象元数据：标识、用途、范围与精度
//!
//! 每个 CRS、基准、操作都携带 [`ObjectMeta`]：名称、零个或多个
//! `(codespace, code)` 标识、别名、备注以及用途（范围 + 适用场景）。

use crate::error::{GeoError, GeoResult};
use gx_config::AreaOfInterest;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// 标识
// ============================================================================

/// 权威标识 `(codespace, code)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    /// 代码空间（如 "EPSG"）
    pub codespace: String,
    /// 代码
    pub code: String,
}

impl Identifier {
    /// 创建标识
    pub fn new(codespace: impl Into<String>, code: impl ToString) -> Self {
        Self {
            codespace: codespace.into(),
            code: code.to_string(),
        }
    }

    /// EPSG 标识
    pub fn epsg(code: u32) -> Self {
        Self::new("EPSG", code)
    }

    /// 解析 "AUTH:CODE"
    pub fn parse(text: &str) -> Option<Self> {
        let (codespace, code) = text.split_once(':')?;
        let (codespace, code) = (codespace.trim(), code.trim());
        if codespace.is_empty() || code.is_empty() {
            return None;
        }
        Some(Self::new(codespace, code))
    }

    /// 代码空间相同（忽略大小写）
    pub fn in_codespace(&self, codespace: &str) -> bool {
        self.codespace.eq_ignore_ascii_case(codespace)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.codespace, self.code)
    }
}

// ============================================================================
// 地理范围
// ============================================================================

/// 地理经纬度包围盒（度）
///
/// `west > east` 表示跨越 180° 经线。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicBoundingBox {
    /// 西边界经度
    pub west: f64,
    /// 南边界纬度
    pub south: f64,
    /// 东边界经度
    pub east: f64,
    /// 北边界纬度
    pub north: f64,
}

impl GeographicBoundingBox {
    /// 创建包围盒
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south: south.min(north),
            east,
            north: south.max(north),
        }
    }

    /// 全球
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// 是否跨越 180° 经线
    #[inline]
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// 经度区间（跨越 180° 经线时拆成两段）
    fn lon_ranges(&self) -> Vec<(f64, f64)> {
        if self.crosses_antimeridian() {
            vec![(self.west, 180.0), (-180.0, self.east)]
        } else {
            vec![(self.west, self.east)]
        }
    }

    /// 完全包含另一个包围盒
    pub fn contains(&self, other: &Self) -> bool {
        if other.south < self.south || other.north > self.north {
            return false;
        }
        let mine = self.lon_ranges();
        other
            .lon_ranges()
            .iter()
            .all(|(w, e)| mine.iter().any(|(mw, me)| *w >= *mw && *e <= *me))
    }

    /// 与另一个包围盒相交
    pub fn intersects(&self, other: &Self) -> bool {
        if other.south > self.north || other.north < self.south {
            return false;
        }
        let mine = self.lon_ranges();
        other
            .lon_ranges()
            .iter()
            .any(|(w, e)| mine.iter().any(|(mw, me)| *w <= *me && *e >= *mw))
    }

    /// 交集
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        let south = self.south.max(other.south);
        let north = self.north.min(other.north);

        let mut pieces: Vec<(f64, f64)> = Vec::new();
        for (w, e) in other.lon_ranges() {
            for (mw, me) in self.lon_ranges() {
                let (lo, hi) = (w.max(mw), e.min(me));
                if lo <= hi {
                    pieces.push((lo, hi));
                }
            }
        }
        match pieces.as_slice() {
            [] => None,
            [(w, e)] => Some(Self::new(*w, south, *e, north)),
            [first, second, ..] => {
                // 两段分别贴着 180° 和 -180° 时合并为跨线包围盒
                let (east_part, west_part) = if first.1 >= 180.0 {
                    (first, second)
                } else {
                    (second, first)
                };
                if east_part.1 >= 180.0 && west_part.0 <= -180.0 {
                    Some(Self::new(east_part.0, south, west_part.1, north))
                } else {
                    Some(Self::new(first.0, south, first.1, north))
                }
            }
        }
    }
}

impl From<AreaOfInterest> for GeographicBoundingBox {
    fn from(area: AreaOfInterest) -> Self {
        Self::new(area.west, area.south, area.east, area.north)
    }
}

/// 范围
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extent {
    /// 文字描述
    pub description: Option<String>,
    /// 地理包围盒
    pub bbox: Option<GeographicBoundingBox>,
}

/// 用途：适用场景 + 范围
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Usage {
    /// 适用场景
    pub scope: Option<String>,
    /// 范围
    pub extent: Extent,
}

// ============================================================================
// 对象元数据
// ============================================================================

/// 对象元数据
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectMeta {
    /// 名称
    pub name: String,
    /// 权威标识
    pub identifiers: Vec<Identifier>,
    /// 别名
    pub aliases: Vec<String>,
    /// 备注
    pub remarks: Option<String>,
    /// 用途
    pub usages: Vec<Usage>,
    /// 是否已废弃（或被取代）
    pub deprecated: bool,
}

impl ObjectMeta {
    /// 仅带名称的元数据
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 追加标识
    #[must_use]
    pub fn with_identifier(mut self, id: Identifier) -> Self {
        self.identifiers.push(id);
        self
    }

    /// 追加 EPSG 标识
    #[must_use]
    pub fn with_epsg(self, code: u32) -> Self {
        self.with_identifier(Identifier::epsg(code))
    }

    /// 追加别名
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// 设置备注
    #[must_use]
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// 追加带包围盒的用途
    #[must_use]
    pub fn with_extent(mut self, bbox: GeographicBoundingBox) -> Self {
        self.usages.push(Usage {
            scope: None,
            extent: Extent {
                description: None,
                bbox: Some(bbox),
            },
        });
        self
    }

    /// 标记为废弃
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// 第一个带包围盒的用途范围
    pub fn domain_of_validity(&self) -> Option<GeographicBoundingBox> {
        self.usages.iter().find_map(|u| u.extent.bbox)
    }

    /// 恰好一个标识时返回它
    pub fn single_identifier(&self) -> Option<&Identifier> {
        match self.identifiers.as_slice() {
            [id] => Some(id),
            _ => None,
        }
    }

    /// 在指定代码空间中的标识
    pub fn identifier_in(&self, codespace: &str) -> Option<&Identifier> {
        self.identifiers.iter().find(|id| id.in_codespace(codespace))
    }

    /// 两者有共同标识
    pub fn shares_identifier(&self, other: &Self) -> bool {
        self.identifiers
            .iter()
            .any(|id| other.identifiers.contains(id))
    }

    /// 名称为空或 "unknown"
    pub fn has_unknown_name(&self) -> bool {
        let n = normalize_name(&self.name);
        n.is_empty() || n == "unknown"
    }
}

/// 名称归一化：小写，只保留字母数字
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// 归一化后名称相同
pub fn names_equivalent(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

// ============================================================================
// 位置精度
// ============================================================================

/// 位置精度（米）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionalAccuracy {
    metres: f64,
}

impl PositionalAccuracy {
    /// 创建精度，必须为非负有限值
    pub fn new(metres: f64) -> GeoResult<Self> {
        if !metres.is_finite() || metres < 0.0 {
            return Err(GeoError::invalid_parameter(
                "accuracy",
                format!("精度必须为非负有限值: {metres}"),
            ));
        }
        Ok(Self { metres })
    }

    /// 精度值（米）
    #[inline]
    pub fn metres(&self) -> f64 {
        self.metres
    }
}
