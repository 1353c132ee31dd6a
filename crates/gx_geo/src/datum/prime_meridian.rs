// geodex\crates\gx_geo\src\datum\prime_meridian.rs
//! 本初子午线

use crate::equivalence::{Criterion, Equivalence};
use crate::metadata::{names_equivalent, Identifier};
use crate::pipeline::PipelineFormatter;
use crate::units::{Measure, UnitOfMeasure};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 子午线经度比较容差（弧度）
const MERIDIAN_TOLERANCE_RAD: f64 = 1e-10;

/// 本初子午线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimeMeridian {
    name: Cow<'static, str>,
    code: Option<u32>,
    longitude: Measure,
}

impl PrimeMeridian {
    /// 格林尼治 (EPSG:8901)
    pub const GREENWICH: Self = Self {
        name: Cow::Borrowed("Greenwich"),
        code: Some(8901),
        longitude: Measure {
            value: 0.0,
            unit: UnitOfMeasure::DEGREE,
        },
    };

    /// 巴黎 (EPSG:8903)，2.5969213 grad
    pub const PARIS: Self = Self {
        name: Cow::Borrowed("Paris"),
        code: Some(8903),
        longitude: Measure {
            value: 2.596_921_3,
            unit: UnitOfMeasure::GRAD,
        },
    };

    /// 创建自定义子午线
    pub fn new(name: impl Into<String>, longitude: Measure) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            code: None,
            longitude,
        }
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// EPSG 标识
    pub fn identifier(&self) -> Option<Identifier> {
        self.code.map(Identifier::epsg)
    }

    /// 相对格林尼治的经度
    pub fn longitude(&self) -> &Measure {
        &self.longitude
    }

    /// 经度（弧度）
    #[inline]
    pub fn longitude_rad(&self) -> f64 {
        self.longitude.si_value()
    }

    /// 经度（度）
    #[inline]
    pub fn longitude_deg(&self) -> f64 {
        self.longitude.convert_to_unit(&UnitOfMeasure::DEGREE)
    }

    /// 写入 `pm=`，经度为 0 时不写
    pub(crate) fn export(&self, f: &mut PipelineFormatter) {
        if self.longitude.value != 0.0 {
            add_pm_param(f, self.longitude_deg());
        }
    }
}

impl Equivalence for PrimeMeridian {
    fn is_equivalent_to(&self, other: &Self, criterion: Criterion) -> bool {
        if criterion.is_strict() && !names_equivalent(&self.name, &other.name) {
            return false;
        }
        (self.longitude_rad() - other.longitude_rad()).abs() <= MERIDIAN_TOLERANCE_RAD
    }
}

// ============================================================================
// 知名子午线
// ============================================================================

const WELL_KNOWN_MERIDIANS: &[(&str, f64)] = &[
    ("greenwich", 0.0),
    ("lisbon", -9.131_906_111_111),
    ("paris", 2.337_229_166_667),
    ("bogota", -74.080_916_666_667),
    ("madrid", -3.687_938_888_889),
    ("rome", 12.452_333_333_333),
    ("bern", 7.439_583_333_333),
    ("jakarta", 106.807_719_444_444),
    ("ferro", -17.666_666_666_667),
    ("brussels", 4.367_975),
    ("stockholm", 18.058_277_777_778),
    ("athens", 23.716_337_5),
    ("oslo", 10.722_916_666_667),
    ("copenhagen", 12.577_88),
];

/// 经度（度）对应的知名子午线短名
pub fn well_known_meridian_name(longitude_deg: f64) -> Option<&'static str> {
    let rad = longitude_deg.to_radians();
    WELL_KNOWN_MERIDIANS
        .iter()
        .find(|(_, deg)| (deg.to_radians() - rad).abs() < MERIDIAN_TOLERANCE_RAD)
        .map(|(name, _)| *name)
}

/// 写入 `pm=<知名短名|度数>`
pub(crate) fn add_pm_param(f: &mut PipelineFormatter, longitude_deg: f64) {
    match well_known_meridian_name(longitude_deg) {
        Some(name) => f.add_param("pm", name),
        None => f.add_param_num("pm", longitude_deg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paris_longitude() {
        let pm = PrimeMeridian::PARIS;
        assert!((pm.longitude_deg() - 2.337_229_17).abs() < 1e-8);
        assert_eq!(well_known_meridian_name(pm.longitude_deg()), Some("paris"));
        assert_eq!(well_known_meridian_name(-pm.longitude_deg()), None);
    }

    #[test]
    fn test_export() {
        let mut f = PipelineFormatter::new();
        f.add_step("longlat");
        PrimeMeridian::GREENWICH.export(&mut f);
        PrimeMeridian::PARIS.export(&mut f);
        assert_eq!(f.to_pipeline_string(), "+proj=longlat +pm=paris");

        let mut f = PipelineFormatter::new();
        f.add_step("longlat");
        PrimeMeridian::new("odd", Measure::degrees(1.5)).export(&mut f);
        assert_eq!(f.to_pipeline_string(), "+proj=longlat +pm=1.5");
    }

    #[test]
    fn test_equivalence() {
        let paris_deg = PrimeMeridian::new("Paris", Measure::degrees(2.337_229_166_666_667));
        assert!(paris_deg.is_equivalent_to(&PrimeMeridian::PARIS, Criterion::Strict));
        assert!(!PrimeMeridian::GREENWICH.is_equivalent_to(&PrimeMeridian::PARIS, Criterion::Equivalent));
    }
}
