// geodex\crates\gx_geo\src\datum\ellipsoid.rs
//! 椭球体定义
//!
//! 椭球体由长半轴和形状参数（反扁率、短半轴或正球）确定，
//! 派生参数 b、f、e²、e'² 统一由长半轴和扁率计算。
//!
//! # 示例
//!
//! ```
//! use gx_geo::datum::Ellipsoid;
//!
//! let e = Ellipsoid::CLARKE_1880_IGN;
//! assert_eq!(e.proj_name(), Some("clrk80ign"));
//! assert!((e.inverse_flattening() - 293.466_021_293_627).abs() < 1e-9);
//! ```

use crate::equivalence::{Criterion, Equivalence};
use crate::metadata::{names_equivalent, Identifier};
use crate::pipeline::PipelineFormatter;
use gx_foundation::float::approx_eq_rel;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 椭球参数比较的相对容差
const ELLIPSOID_RELATIVE_TOLERANCE: f64 = 1e-10;

/// 椭球形状参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EllipsoidShape {
    /// 反扁率 1/f
    InverseFlattening(f64),
    /// 短半轴 (m)
    SemiMinor(f64),
    /// 正球
    Sphere,
}

/// 地球椭球体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    name: Cow<'static, str>,
    code: Option<u32>,
    /// 长半轴 (m)
    semi_major: f64,
    shape: EllipsoidShape,
}

impl Ellipsoid {
    // ========================================================================
    // 预定义椭球体
    // ========================================================================

    /// WGS84 椭球体 (EPSG:7030)
    pub const WGS84: Self = Self::builtin("WGS 84", 7030, 6_378_137.0, 298.257_223_563);

    /// GRS80 椭球体 (EPSG:7019)
    pub const GRS80: Self = Self::builtin("GRS 1980", 7019, 6_378_137.0, 298.257_222_101);

    /// Clarke 1880 (IGN) 椭球体 (EPSG:7011)
    ///
    /// EPSG 以短半轴 6356515 m 定义。
    pub const CLARKE_1880_IGN: Self = Self {
        name: Cow::Borrowed("Clarke 1880 (IGN)"),
        code: Some(7011),
        semi_major: 6_378_249.2,
        shape: EllipsoidShape::SemiMinor(6_356_515.0),
    };

    /// Clarke 1866 椭球体 (EPSG:7008)
    pub const CLARKE_1866: Self = Self {
        name: Cow::Borrowed("Clarke 1866"),
        code: Some(7008),
        semi_major: 6_378_206.4,
        shape: EllipsoidShape::SemiMinor(6_356_583.8),
    };

    /// 克拉索夫斯基椭球体 (EPSG:7024)
    pub const KRASSOVSKY: Self = Self::builtin("Krassowsky 1940", 7024, 6_378_245.0, 298.3);

    /// 国际椭球体 1924 (EPSG:7022)
    pub const INTERNATIONAL_1924: Self =
        Self::builtin("International 1924", 7022, 6_378_388.0, 297.0);

    /// Bessel 1841 椭球体 (EPSG:7004)
    pub const BESSEL_1841: Self =
        Self::builtin("Bessel 1841", 7004, 6_377_397.155, 299.152_812_8);

    /// Airy 1830 椭球体 (EPSG:7001)
    pub const AIRY_1830: Self = Self::builtin("Airy 1830", 7001, 6_377_563.396, 299.324_964_6);

    const fn builtin(name: &'static str, code: u32, a: f64, rf: f64) -> Self {
        Self {
            name: Cow::Borrowed(name),
            code: Some(code),
            semi_major: a,
            shape: EllipsoidShape::InverseFlattening(rf),
        }
    }

    // ========================================================================
    // 构造方法
    // ========================================================================

    /// 从长半轴和反扁率创建
    pub fn from_inverse_flattening(name: impl Into<String>, a: f64, rf: f64) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            code: None,
            semi_major: a,
            shape: if rf == 0.0 {
                EllipsoidShape::Sphere
            } else {
                EllipsoidShape::InverseFlattening(rf)
            },
        }
    }

    /// 从长半轴和短半轴创建
    pub fn from_semi_axes(name: impl Into<String>, a: f64, b: f64) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            code: None,
            semi_major: a,
            shape: if a == b {
                EllipsoidShape::Sphere
            } else {
                EllipsoidShape::SemiMinor(b)
            },
        }
    }

    /// 正球
    pub fn sphere(name: impl Into<String>, radius: f64) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            code: None,
            semi_major: radius,
            shape: EllipsoidShape::Sphere,
        }
    }

    /// 从 EPSG 椭球体代码获取
    #[must_use]
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            7030 => Some(Self::WGS84),
            7019 => Some(Self::GRS80),
            7011 => Some(Self::CLARKE_1880_IGN),
            7008 => Some(Self::CLARKE_1866),
            7024 => Some(Self::KRASSOVSKY),
            7022 => Some(Self::INTERNATIONAL_1924),
            7004 => Some(Self::BESSEL_1841),
            7001 => Some(Self::AIRY_1830),
            _ => None,
        }
    }

    // ========================================================================
    // 访问器与派生参数
    // ========================================================================

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// EPSG 标识
    pub fn identifier(&self) -> Option<Identifier> {
        self.code.map(Identifier::epsg)
    }

    /// 形状参数
    #[inline]
    pub fn shape(&self) -> EllipsoidShape {
        self.shape
    }

    /// 长半轴 a (m)
    #[inline]
    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    /// 是否为正球
    #[inline]
    pub fn is_sphere(&self) -> bool {
        matches!(self.shape, EllipsoidShape::Sphere)
    }

    /// 反扁率 1/f，正球为 0
    pub fn inverse_flattening(&self) -> f64 {
        match self.shape {
            EllipsoidShape::InverseFlattening(rf) => rf,
            EllipsoidShape::SemiMinor(b) => self.semi_major / (self.semi_major - b),
            EllipsoidShape::Sphere => 0.0,
        }
    }

    /// 扁率 f
    #[inline]
    pub fn flattening(&self) -> f64 {
        match self.shape {
            EllipsoidShape::InverseFlattening(rf) => 1.0 / rf,
            EllipsoidShape::SemiMinor(b) => (self.semi_major - b) / self.semi_major,
            EllipsoidShape::Sphere => 0.0,
        }
    }

    /// 短半轴 b = a(1-f)
    #[inline]
    pub fn semi_minor(&self) -> f64 {
        match self.shape {
            EllipsoidShape::SemiMinor(b) => b,
            _ => self.semi_major * (1.0 - self.flattening()),
        }
    }

    /// 第一偏心率的平方 e² = 2f - f²
    #[inline]
    pub fn e2(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    /// 第二偏心率的平方 e'² = e²/(1-e²)
    #[inline]
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }

    // ========================================================================
    // 管线导出
    // ========================================================================

    /// 管线中的椭球短名
    pub fn proj_name(&self) -> Option<&'static str> {
        let rf = self.inverse_flattening();
        WELL_KNOWN_ELLIPSOIDS
            .iter()
            .find(|(_, a, known_rf)| {
                (self.semi_major - a).abs() < ELLIPSOID_RELATIVE_TOLERANCE * a
                    && (rf - known_rf).abs() < ELLIPSOID_RELATIVE_TOLERANCE * known_rf
            })
            .map(|(name, _, _)| *name)
    }

    /// 写入 `ellps=` 或 `R=` 或 `a= rf=`
    pub(crate) fn export(&self, f: &mut PipelineFormatter) {
        if let Some(name) = self.proj_name() {
            f.add_param("ellps", name);
        } else if self.is_sphere() {
            f.add_param_num("R", self.semi_major);
        } else {
            f.add_param_num("a", self.semi_major);
            f.add_param_num("rf", self.inverse_flattening());
        }
    }
}

const WELL_KNOWN_ELLIPSOIDS: &[(&str, f64, f64)] = &[
    ("WGS84", 6_378_137.0, 298.257_223_563),
    ("GRS80", 6_378_137.0, 298.257_222_101),
    ("clrk80ign", 6_378_249.2, 293.466_021_293_626_9),
    ("clrk66", 6_378_206.4, 294.978_698_213_898),
    ("krass", 6_378_245.0, 298.3),
    ("intl", 6_378_388.0, 297.0),
    ("bessel", 6_377_397.155, 299.152_812_8),
    ("airy", 6_377_563.396, 299.324_964_6),
];

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl std::fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_sphere() {
            write!(f, "{}(R={})", self.name, self.semi_major)
        } else {
            write!(f, "{}(a={}, rf={:.9})", self.name, self.semi_major, self.inverse_flattening())
        }
    }
}

impl Equivalence for Ellipsoid {
    fn is_equivalent_to(&self, other: &Self, criterion: Criterion) -> bool {
        if criterion.is_strict() && !names_equivalent(&self.name, &other.name) {
            return false;
        }
        approx_eq_rel(self.semi_major, other.semi_major, ELLIPSOID_RELATIVE_TOLERANCE)
            && approx_eq_rel(
                self.inverse_flattening(),
                other.inverse_flattening(),
                ELLIPSOID_RELATIVE_TOLERANCE,
            )
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_parameters() {
        let e = Ellipsoid::WGS84;
        assert!((e.semi_major() - 6_378_137.0).abs() < 1e-6);
        // 标准值约 6356752.314245
        assert!((e.semi_minor() - 6_356_752.314_245).abs() < 0.001);
        assert!((e.e2() - 0.006_694_379_990_14).abs() < 1e-12);
    }

    #[test]
    fn test_semi_minor_definition() {
        let e = Ellipsoid::CLARKE_1866;
        assert!((e.inverse_flattening() - 294.978_698_213_898).abs() < 1e-9);
        assert_eq!(e.proj_name(), Some("clrk66"));
    }

    #[test]
    fn test_from_epsg() {
        assert_eq!(Ellipsoid::from_epsg(7030), Some(Ellipsoid::WGS84));
        assert_eq!(Ellipsoid::from_epsg(7011), Some(Ellipsoid::CLARKE_1880_IGN));
        assert_eq!(Ellipsoid::from_epsg(9999), None);
    }

    #[test]
    fn test_equivalence_ignores_name() {
        let custom = Ellipsoid::from_inverse_flattening("my wgs", 6_378_137.0, 298.257_223_563);
        assert!(custom.is_equivalent_to(&Ellipsoid::WGS84, Criterion::Equivalent));
        assert!(!custom.is_equivalent_to(&Ellipsoid::WGS84, Criterion::Strict));
        assert!(!Ellipsoid::WGS84.is_equivalent_to(&Ellipsoid::GRS80, Criterion::Equivalent));
        assert_eq!(custom.proj_name(), Some("WGS84"));
    }

    #[test]
    fn test_equivalence_by_inverse_flattening() {
        // 短半轴只差约 0.1 mm，按反扁率仍可区分
        let b_wgs84 = Ellipsoid::WGS84.semi_minor();
        let b_grs80 = Ellipsoid::GRS80.semi_minor();
        assert!((b_wgs84 - b_grs80).abs() < 1e-3);
        assert!(!Ellipsoid::GRS80.is_equivalent_to(&Ellipsoid::WGS84, Criterion::Equivalent));

        let from_axes = Ellipsoid::from_semi_axes("axes", 6_378_137.0, b_wgs84);
        assert!(from_axes.is_equivalent_to(&Ellipsoid::WGS84, Criterion::Equivalent));

        let sphere = Ellipsoid::sphere("s", 6_378_137.0);
        assert!(sphere.is_equivalent_to(&Ellipsoid::sphere("t", 6_378_137.0), Criterion::Equivalent));
        assert!(!sphere.is_equivalent_to(&Ellipsoid::WGS84, Criterion::Equivalent));
    }

    #[test]
    fn test_export_forms() {
        let mut f = PipelineFormatter::new();
        f.add_step("cart");
        Ellipsoid::sphere("s", 6_371_000.0).export(&mut f);
        assert_eq!(f.to_pipeline_string(), "+proj=cart +R=6371000");

        let mut f = PipelineFormatter::new();
        f.add_step("cart");
        Ellipsoid::from_inverse_flattening("odd", 6_378_000.0, 300.0).export(&mut f);
        assert_eq!(f.to_pipeline_string(), "+proj=cart +a=6378000 +rf=300");
    }
}
