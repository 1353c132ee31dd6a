// geodex\crates\gx_geo\src\cs.rs
//! 坐标系（CS）与坐标轴
//!
//! 坐标系由类别和有序轴列表组成；每个轴带方向和单位。
//! 常用坐标系通过具名构造函数创建。
//!
//! # 示例
//!
//! ```
//! use gx_geo::cs::{AxisDirection, CoordinateSystem};
//! use gx_geo::units::UnitOfMeasure;
//!
//! let cs = CoordinateSystem::ellipsoidal_lat_long(UnitOfMeasure::DEGREE);
//! assert_eq!(cs.dimension(), 2);
//! assert_eq!(cs.axes()[0].direction, AxisDirection::North);
//!
//! let swapped = cs.axis_order_reversed();
//! assert_eq!(swapped.axes()[0].direction, AxisDirection::East);
//! ```

use crate::equivalence::{Criterion, Equivalence};
use crate::error::{GeoError, GeoResult};
use crate::metadata::names_equivalent;
use crate::units::UnitOfMeasure;
use serde::{Deserialize, Serialize};

/// 坐标轴方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisDirection {
    /// 北
    North,
    /// 南
    South,
    /// 东
    East,
    /// 西
    West,
    /// 上
    Up,
    /// 下
    Down,
    /// 地心 X
    GeocentricX,
    /// 地心 Y
    GeocentricY,
    /// 地心 Z
    GeocentricZ,
    /// 未来
    Future,
    /// 过去
    Past,
    /// 未指定
    Unspecified,
}

impl AxisDirection {
    /// `axisswap` 中的轴编号
    pub fn proj_axis_code(self) -> Option<&'static str> {
        match self {
            Self::East => Some("1"),
            Self::West => Some("-1"),
            Self::North => Some("2"),
            Self::South => Some("-2"),
            _ => None,
        }
    }
}

/// 坐标轴
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystemAxis {
    /// 轴名
    pub name: String,
    /// 缩写
    pub abbreviation: String,
    /// 方向
    pub direction: AxisDirection,
    /// 单位
    pub unit: UnitOfMeasure,
}

impl CoordinateSystemAxis {
    /// 创建坐标轴
    pub fn new(
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        direction: AxisDirection,
        unit: UnitOfMeasure,
    ) -> Self {
        Self {
            name: name.into(),
            abbreviation: abbreviation.into(),
            direction,
            unit,
        }
    }

    fn latitude(unit: &UnitOfMeasure) -> Self {
        Self::new("Latitude", "lat", AxisDirection::North, unit.clone())
    }

    fn longitude(unit: &UnitOfMeasure) -> Self {
        Self::new("Longitude", "lon", AxisDirection::East, unit.clone())
    }

    fn ellipsoidal_height(unit: &UnitOfMeasure) -> Self {
        Self::new("Ellipsoidal height", "h", AxisDirection::Up, unit.clone())
    }
}

/// 坐标系类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CsKind {
    /// 椭球坐标系（经纬度 [+ 椭球高]）
    Ellipsoidal,
    /// 笛卡尔坐标系
    Cartesian,
    /// 球面坐标系
    Spherical,
    /// 垂直坐标系
    Vertical,
    /// 时间坐标系
    Temporal,
    /// 参数坐标系
    Parametric,
    /// 序数坐标系
    Ordinal,
}

/// 坐标系
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    kind: CsKind,
    axes: Vec<CoordinateSystemAxis>,
}

impl CoordinateSystem {
    /// 创建并校验维度
    pub fn new(kind: CsKind, axes: Vec<CoordinateSystemAxis>) -> GeoResult<Self> {
        let n = axes.len();
        let valid = match kind {
            CsKind::Ellipsoidal => n == 2 || n == 3,
            CsKind::Cartesian => n == 2 || n == 3,
            CsKind::Spherical => n == 2 || n == 3,
            CsKind::Vertical | CsKind::Temporal | CsKind::Parametric => n == 1,
            CsKind::Ordinal => n >= 1,
        };
        if !valid {
            return Err(GeoError::invalid_construction(
                "坐标系",
                format!("{kind:?} 坐标系不能有 {n} 个轴"),
            ));
        }
        Ok(Self { kind, axes })
    }

    // ========================================================================
    // 常用坐标系
    // ========================================================================

    /// 纬度、经度
    pub fn ellipsoidal_lat_long(unit: UnitOfMeasure) -> Self {
        Self {
            kind: CsKind::Ellipsoidal,
            axes: vec![
                CoordinateSystemAxis::latitude(&unit),
                CoordinateSystemAxis::longitude(&unit),
            ],
        }
    }

    /// 经度、纬度
    pub fn ellipsoidal_long_lat(unit: UnitOfMeasure) -> Self {
        Self::ellipsoidal_lat_long(unit).axis_order_reversed()
    }

    /// 纬度、经度、椭球高
    pub fn ellipsoidal_lat_long_h(angular: UnitOfMeasure, linear: UnitOfMeasure) -> Self {
        Self {
            kind: CsKind::Ellipsoidal,
            axes: vec![
                CoordinateSystemAxis::latitude(&angular),
                CoordinateSystemAxis::longitude(&angular),
                CoordinateSystemAxis::ellipsoidal_height(&linear),
            ],
        }
    }

    /// 经度、纬度、椭球高
    pub fn ellipsoidal_long_lat_h(angular: UnitOfMeasure, linear: UnitOfMeasure) -> Self {
        Self::ellipsoidal_lat_long_h(angular, linear).axis_order_reversed()
    }

    /// 地心笛卡尔 X/Y/Z
    pub fn geocentric(unit: UnitOfMeasure) -> Self {
        Self {
            kind: CsKind::Cartesian,
            axes: vec![
                CoordinateSystemAxis::new("Geocentric X", "X", AxisDirection::GeocentricX, unit.clone()),
                CoordinateSystemAxis::new("Geocentric Y", "Y", AxisDirection::GeocentricY, unit.clone()),
                CoordinateSystemAxis::new("Geocentric Z", "Z", AxisDirection::GeocentricZ, unit),
            ],
        }
    }

    /// 东、北
    pub fn easting_northing(unit: UnitOfMeasure) -> Self {
        Self {
            kind: CsKind::Cartesian,
            axes: vec![
                CoordinateSystemAxis::new("Easting", "E", AxisDirection::East, unit.clone()),
                CoordinateSystemAxis::new("Northing", "N", AxisDirection::North, unit),
            ],
        }
    }

    /// 北、东
    pub fn northing_easting(unit: UnitOfMeasure) -> Self {
        Self::easting_northing(unit).axis_order_reversed()
    }

    /// 重力相关高
    pub fn gravity_related_height(unit: UnitOfMeasure) -> Self {
        Self {
            kind: CsKind::Vertical,
            axes: vec![CoordinateSystemAxis::new(
                "Gravity-related height",
                "H",
                AxisDirection::Up,
                unit,
            )],
        }
    }

    /// 深度
    pub fn depth(unit: UnitOfMeasure) -> Self {
        Self {
            kind: CsKind::Vertical,
            axes: vec![CoordinateSystemAxis::new("Depth", "D", AxisDirection::Down, unit)],
        }
    }

    /// 时间
    pub fn temporal(unit: UnitOfMeasure) -> Self {
        Self {
            kind: CsKind::Temporal,
            axes: vec![CoordinateSystemAxis::new("Time", "T", AxisDirection::Future, unit)],
        }
    }

    /// 单轴参数坐标系
    pub fn parametric(name: impl Into<String>, unit: UnitOfMeasure) -> Self {
        let name = name.into();
        Self {
            kind: CsKind::Parametric,
            axes: vec![CoordinateSystemAxis::new(name.clone(), name, AxisDirection::Unspecified, unit)],
        }
    }

    // ========================================================================
    // 访问器
    // ========================================================================

    /// 类别
    #[inline]
    pub fn kind(&self) -> CsKind {
        self.kind
    }

    /// 轴列表
    #[inline]
    pub fn axes(&self) -> &[CoordinateSystemAxis] {
        &self.axes
    }

    /// 维度
    #[inline]
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// 第一个轴的单位
    pub fn first_unit(&self) -> &UnitOfMeasure {
        // 构造时保证至少一个轴
        &self.axes[0].unit
    }

    /// 是否为地心笛卡尔坐标系
    pub fn is_geocentric(&self) -> bool {
        self.kind == CsKind::Cartesian
            && self.axes.len() == 3
            && self.axes[0].direction == AxisDirection::GeocentricX
            && self.axes[1].direction == AxisDirection::GeocentricY
            && self.axes[2].direction == AxisDirection::GeocentricZ
    }

    // ========================================================================
    // 变换
    // ========================================================================

    /// 交换前两个轴
    pub fn axis_order_reversed(&self) -> Self {
        let mut axes = self.axes.clone();
        if axes.len() >= 2 {
            axes.swap(0, 1);
        }
        Self {
            kind: self.kind,
            axes,
        }
    }

    /// 3D 椭球坐标系降为 2D
    pub fn demote_to_2d(&self) -> Self {
        let mut axes = self.axes.clone();
        if self.kind == CsKind::Ellipsoidal || self.kind == CsKind::Cartesian {
            axes.truncate(2);
        }
        Self {
            kind: self.kind,
            axes,
        }
    }

    /// 2D 椭球坐标系升为 3D（追加椭球高）
    pub fn promote_to_3d(&self, linear: UnitOfMeasure) -> Self {
        let mut axes = self.axes.clone();
        if self.kind == CsKind::Ellipsoidal && axes.len() == 2 {
            axes.push(CoordinateSystemAxis::ellipsoidal_height(&linear));
        } else if self.kind == CsKind::Cartesian && axes.len() == 2 {
            axes.push(CoordinateSystemAxis::new(
                "Ellipsoidal height",
                "h",
                AxisDirection::Up,
                linear,
            ));
        }
        Self {
            kind: self.kind,
            axes,
        }
    }
}

impl Equivalence for CoordinateSystem {
    fn is_equivalent_to(&self, other: &Self, criterion: Criterion) -> bool {
        let same = |a: &CoordinateSystem, b: &CoordinateSystem| {
            a.kind == b.kind
                && a.axes.len() == b.axes.len()
                && a.axes.iter().zip(&b.axes).all(|(x, y)| {
                    x.direction == y.direction
                        && x.unit.is_equivalent(&y.unit)
                        && (!criterion.is_strict() || names_equivalent(&x.name, &y.name))
                })
        };
        if same(self, other) {
            return true;
        }
        criterion == Criterion::EquivalentIgnoringAxisOrderForGeographic
            && self.kind == CsKind::Ellipsoidal
            && same(&self.axis_order_reversed(), other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_validation() {
        let axis = CoordinateSystemAxis::new("H", "H", AxisDirection::Up, UnitOfMeasure::METRE);
        assert!(CoordinateSystem::new(CsKind::Vertical, vec![axis.clone()]).is_ok());
        let err = CoordinateSystem::new(CsKind::Vertical, vec![axis.clone(), axis]).unwrap_err();
        assert!(matches!(err, GeoError::InvalidConstruction { .. }));
    }

    #[test]
    fn test_geocentric() {
        let cs = CoordinateSystem::geocentric(UnitOfMeasure::METRE);
        assert!(cs.is_geocentric());
        assert!(!CoordinateSystem::easting_northing(UnitOfMeasure::METRE).is_geocentric());
    }

    #[test]
    fn test_demote_promote() {
        let cs3 = CoordinateSystem::ellipsoidal_lat_long_h(UnitOfMeasure::DEGREE, UnitOfMeasure::METRE);
        let cs2 = cs3.demote_to_2d();
        assert_eq!(cs2, CoordinateSystem::ellipsoidal_lat_long(UnitOfMeasure::DEGREE));
        assert_eq!(cs2.promote_to_3d(UnitOfMeasure::METRE), cs3);
    }

    #[test]
    fn test_equivalence_axis_order() {
        let latlon = CoordinateSystem::ellipsoidal_lat_long(UnitOfMeasure::DEGREE);
        let lonlat = CoordinateSystem::ellipsoidal_long_lat(UnitOfMeasure::DEGREE);
        assert!(!latlon.is_equivalent_to(&lonlat, Criterion::Equivalent));
        assert!(latlon.is_equivalent_to(
            &lonlat,
            Criterion::EquivalentIgnoringAxisOrderForGeographic
        ));
        let grad = CoordinateSystem::ellipsoidal_lat_long(UnitOfMeasure::GRAD);
        assert!(!latlon.is_equivalent_to(&grad, Criterion::Equivalent));
    }

    #[test]
    fn test_proj_axis_codes() {
        assert_eq!(AxisDirection::West.proj_axis_code(), Some("-1"));
        assert_eq!(AxisDirection::Up.proj_axis_code(), None);
    }
}
