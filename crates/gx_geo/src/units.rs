// geodex\crates\gx_geo\src\units.rs
//! 计量单位与量值
//!
//! 单位由类别和到 SI 的换算因子确定；名称只用于展示。
//! 两个单位类别相同且换算因子相对误差不超过 1e-10 即视为等价。
//!
//! # 示例
//!
//! ```
//! use gx_geo::units::{Measure, UnitOfMeasure};
//!
//! let pm = Measure::new(2.5969213, UnitOfMeasure::GRAD);
//! assert!((pm.convert_to_unit(&UnitOfMeasure::DEGREE) - 2.33722917).abs() < 1e-12);
//! assert_eq!(UnitOfMeasure::GRAD.proj_name(), Some("grad"));
//! ```

use gx_foundation::float::{approx_eq_rel, format_number};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::f64::consts::PI;

/// 单位等价判定的相对容差
pub const UNIT_RELATIVE_TOLERANCE: f64 = 1e-10;

/// 回归年秒数
const SECONDS_PER_YEAR: f64 = 31_556_925.445;

/// 单位类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    /// 角度
    Angular,
    /// 长度
    Linear,
    /// 比例
    Scale,
    /// 时间
    Time,
    /// 参数化量
    Parametric,
    /// 无单位
    None,
}

/// 计量单位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOfMeasure {
    name: Cow<'static, str>,
    to_si: f64,
    unit_type: UnitType,
    code: Option<u32>,
}

impl UnitOfMeasure {
    // ========================================================================
    // 预定义单位
    // ========================================================================

    /// 米 (EPSG:9001)
    pub const METRE: Self = Self::builtin("metre", 1.0, UnitType::Linear, 9001);
    /// 千米 (EPSG:9036)
    pub const KILOMETRE: Self = Self::builtin("kilometre", 1000.0, UnitType::Linear, 9036);
    /// 国际英尺 (EPSG:9002)
    pub const FOOT: Self = Self::builtin("foot", 0.3048, UnitType::Linear, 9002);
    /// 美国测量英尺 (EPSG:9003)
    pub const US_FOOT: Self =
        Self::builtin("US survey foot", 0.304_800_609_601_219_2, UnitType::Linear, 9003);
    /// 度 (EPSG:9122)
    pub const DEGREE: Self = Self::builtin("degree", PI / 180.0, UnitType::Angular, 9122);
    /// 百分度 (EPSG:9105)
    pub const GRAD: Self = Self::builtin("grad", PI / 200.0, UnitType::Angular, 9105);
    /// 弧度 (EPSG:9101)
    pub const RADIAN: Self = Self::builtin("radian", 1.0, UnitType::Angular, 9101);
    /// 角秒 (EPSG:9104)
    pub const ARC_SECOND: Self =
        Self::builtin("arc-second", PI / 648_000.0, UnitType::Angular, 9104);
    /// 微弧度 (EPSG:9109)
    pub const MICRORADIAN: Self = Self::builtin("microradian", 1e-6, UnitType::Angular, 9109);
    /// 单位比例 (EPSG:9201)
    pub const SCALE_UNITY: Self = Self::builtin("unity", 1.0, UnitType::Scale, 9201);
    /// 百万分之一 (EPSG:9202)
    pub const PARTS_PER_MILLION: Self =
        Self::builtin("parts per million", 1e-6, UnitType::Scale, 9202);
    /// 年 (EPSG:1029)
    pub const YEAR: Self = Self::builtin("year", SECONDS_PER_YEAR, UnitType::Time, 1029);
    /// 米/年 (EPSG:1042)
    pub const METRE_PER_YEAR: Self =
        Self::builtin("metres per year", 1.0 / SECONDS_PER_YEAR, UnitType::Linear, 1042);
    /// 角秒/年 (EPSG:1043)
    pub const ARC_SECOND_PER_YEAR: Self = Self::builtin(
        "arc-seconds per year",
        PI / 648_000.0 / SECONDS_PER_YEAR,
        UnitType::Angular,
        1043,
    );
    /// 百万分之一/年 (EPSG:1036)
    pub const PPM_PER_YEAR: Self = Self::builtin(
        "parts per million per year",
        1e-6 / SECONDS_PER_YEAR,
        UnitType::Scale,
        1036,
    );
    /// 无单位
    pub const NONE: Self = Self {
        name: Cow::Borrowed(""),
        to_si: 1.0,
        unit_type: UnitType::None,
        code: None,
    };

    const fn builtin(name: &'static str, to_si: f64, unit_type: UnitType, code: u32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            to_si,
            unit_type,
            code: Some(code),
        }
    }

    /// 创建自定义单位
    pub fn new(name: impl Into<String>, to_si: f64, unit_type: UnitType) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            to_si,
            unit_type,
            code: None,
        }
    }

    /// 单位名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 到 SI 单位的换算因子
    #[inline]
    pub fn conversion_to_si(&self) -> f64 {
        self.to_si
    }

    /// 单位类别
    #[inline]
    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    /// EPSG 代码
    #[inline]
    pub fn code(&self) -> Option<u32> {
        self.code
    }

    /// 类别与换算因子均一致
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.unit_type == other.unit_type
            && approx_eq_rel(self.to_si, other.to_si, UNIT_RELATIVE_TOLERANCE)
    }

    /// 管线中使用的单位短名（按换算因子识别）
    pub fn proj_name(&self) -> Option<&'static str> {
        let table: &[(&'static str, f64)] = match self.unit_type {
            UnitType::Linear => LINEAR_PROJ_UNITS,
            UnitType::Angular => ANGULAR_PROJ_UNITS,
            _ => return None,
        };
        table
            .iter()
            .find(|(_, factor)| approx_eq_rel(*factor, self.to_si, UNIT_RELATIVE_TOLERANCE))
            .map(|(name, _)| *name)
    }

    /// 管线单位标记：已知短名，否则为换算因子
    pub fn proj_token(&self) -> String {
        match self.proj_name() {
            Some(name) => name.to_string(),
            None => format_number(self.to_si),
        }
    }
}

const LINEAR_PROJ_UNITS: &[(&str, f64)] = &[
    ("m", 1.0),
    ("km", 1000.0),
    ("dm", 0.1),
    ("cm", 0.01),
    ("mm", 0.001),
    ("kmi", 1852.0),
    ("in", 0.0254),
    ("ft", 0.3048),
    ("yd", 0.9144),
    ("mi", 1609.344),
    ("fath", 1.8288),
    ("ch", 20.1168),
    ("link", 0.201168),
    ("us-in", 1.0 / 39.37),
    ("us-ft", 0.304_800_609_601_219_2),
    ("us-yd", 0.914_401_828_803_657_6),
    ("us-ch", 20.116_840_233_680_47),
    ("us-mi", 1609.347_218_694_437),
    ("ind-yd", 0.914_398_53),
    ("ind-ft", 0.304_799_51),
    ("ind-ch", 20.116_695_8),
];

const ANGULAR_PROJ_UNITS: &[(&str, f64)] = &[
    ("rad", 1.0),
    ("deg", PI / 180.0),
    ("grad", PI / 200.0),
];

// ============================================================================
// 量值
// ============================================================================

/// 带单位的数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// 数值
    pub value: f64,
    /// 单位
    pub unit: UnitOfMeasure,
}

impl Measure {
    /// 创建量值
    pub fn new(value: f64, unit: UnitOfMeasure) -> Self {
        Self { value, unit }
    }

    /// 米
    pub fn metres(value: f64) -> Self {
        Self::new(value, UnitOfMeasure::METRE)
    }

    /// 度
    pub fn degrees(value: f64) -> Self {
        Self::new(value, UnitOfMeasure::DEGREE)
    }

    /// SI 值（长度为米，角度为弧度）
    #[inline]
    pub fn si_value(&self) -> f64 {
        self.value * self.unit.conversion_to_si()
    }

    /// 换算到指定单位
    #[inline]
    pub fn convert_to_unit(&self, unit: &UnitOfMeasure) -> f64 {
        if self.unit.is_equivalent(unit) {
            self.value
        } else {
            self.si_value() / unit.conversion_to_si()
        }
    }

    /// SI 值一致
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.unit.unit_type() == other.unit.unit_type()
            && approx_eq_rel(self.si_value(), other.si_value(), UNIT_RELATIVE_TOLERANCE)
    }

    /// 取反
    pub fn negated(&self) -> Self {
        Self::new(-self.value, self.unit.clone())
    }
}
