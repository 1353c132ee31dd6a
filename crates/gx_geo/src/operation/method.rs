// geodex\crates\gx_geo\src\operation\method.rs
//! 操作方法、参数与参数值
//!
//! 方法和参数都以 EPSG 代码识别；名称只用于展示。

use crate::metadata::{Identifier, ObjectMeta};
use crate::units::{Measure, UnitOfMeasure};

/// EPSG 方法与参数代码
pub mod epsg {
    // ========================================================================
    // 方法
    // ========================================================================

    /// Transverse Mercator
    pub const TRANSVERSE_MERCATOR: u32 = 9807;
    /// Lambert Conic Conformal (1SP)
    pub const LAMBERT_CONIC_CONFORMAL_1SP: u32 = 9801;
    /// Lambert Conic Conformal (2SP)
    pub const LAMBERT_CONIC_CONFORMAL_2SP: u32 = 9802;
    /// Mercator (variant A)
    pub const MERCATOR_VARIANT_A: u32 = 9804;
    /// Popular Visualisation Pseudo Mercator
    pub const POPULAR_VISUALISATION_PSEUDO_MERCATOR: u32 = 1024;
    /// Axis Order Reversal (2D)
    pub const AXIS_ORDER_REVERSAL_2D: u32 = 9843;
    /// Axis Order Reversal (Geographic3D horizontal)
    pub const AXIS_ORDER_REVERSAL_3D: u32 = 9844;
    /// Geographic/geocentric conversions
    pub const GEOGRAPHIC_GEOCENTRIC: u32 = 9602;
    /// Geographic3D to 2D conversion
    pub const GEOGRAPHIC_3D_TO_2D: u32 = 9659;
    /// Change of Vertical Unit
    pub const CHANGE_VERTICAL_UNIT: u32 = 1069;
    /// Height Depth Reversal
    pub const HEIGHT_DEPTH_REVERSAL: u32 = 1068;
    /// Geocentric translations (geocentric domain)
    pub const GEOCENTRIC_TRANSLATION_GEOCENTRIC: u32 = 1031;
    /// Geocentric translations (geog2D domain)
    pub const GEOCENTRIC_TRANSLATION_GEOG2D: u32 = 9603;
    /// Geocentric translations (geog3D domain)
    pub const GEOCENTRIC_TRANSLATION_GEOG3D: u32 = 1035;
    /// Position Vector transformation (geocentric domain)
    pub const POSITION_VECTOR_GEOCENTRIC: u32 = 1033;
    /// Position Vector transformation (geog2D domain)
    pub const POSITION_VECTOR_GEOG2D: u32 = 9606;
    /// Position Vector transformation (geog3D domain)
    pub const POSITION_VECTOR_GEOG3D: u32 = 1037;
    /// Coordinate Frame rotation (geocentric domain)
    pub const COORDINATE_FRAME_GEOCENTRIC: u32 = 1032;
    /// Coordinate Frame rotation (geog2D domain)
    pub const COORDINATE_FRAME_GEOG2D: u32 = 9607;
    /// Coordinate Frame rotation (geog3D domain)
    pub const COORDINATE_FRAME_GEOG3D: u32 = 1038;
    /// Time-dependent Position Vector tfm (geocentric)
    pub const TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC: u32 = 1053;
    /// Time-dependent Position Vector tfm (geog3D)
    pub const TIME_DEPENDENT_POSITION_VECTOR_GEOG3D: u32 = 1054;
    /// Time-dependent Position Vector tfm (geog2D)
    pub const TIME_DEPENDENT_POSITION_VECTOR_GEOG2D: u32 = 1055;
    /// Time-dependent Coordinate Frame rotation (geocentric)
    pub const TIME_DEPENDENT_COORDINATE_FRAME_GEOCENTRIC: u32 = 1056;
    /// Time-dependent Coordinate Frame rotation (geog2D)
    pub const TIME_DEPENDENT_COORDINATE_FRAME_GEOG2D: u32 = 1057;
    /// Time-dependent Coordinate Frame rotation (geog3D)
    pub const TIME_DEPENDENT_COORDINATE_FRAME_GEOG3D: u32 = 1058;
    /// Molodensky
    pub const MOLODENSKY: u32 = 9604;
    /// Abridged Molodensky
    pub const ABRIDGED_MOLODENSKY: u32 = 9605;
    /// Geographic2D offsets
    pub const GEOGRAPHIC_2D_OFFSETS: u32 = 9619;
    /// Geographic3D offsets
    pub const GEOGRAPHIC_3D_OFFSETS: u32 = 9660;
    /// Geographic2D with Height Offsets
    pub const GEOGRAPHIC_2D_WITH_HEIGHT_OFFSETS: u32 = 9618;
    /// Vertical Offset
    pub const VERTICAL_OFFSET: u32 = 9616;
    /// NTv2
    pub const NTV2: u32 = 9615;
    /// Geocentric translation by Grid Interpolation (IGN)
    pub const GEOCENTRIC_TRANSLATION_BY_GRID_IGN: u32 = 9655;
    /// Geographic3D to GravityRelatedHeight
    pub const GEOGRAPHIC3D_TO_GRAVITY_RELATED_HEIGHT: u32 = 9665;
    /// Vertical Offset by Grid Interpolation
    pub const VERTICAL_OFFSET_BY_GRID: u32 = 1084;
    /// Longitude rotation
    pub const LONGITUDE_ROTATION: u32 = 9601;

    // ========================================================================
    // 参数
    // ========================================================================

    /// Latitude of natural origin
    pub const LATITUDE_OF_NATURAL_ORIGIN: u32 = 8801;
    /// Longitude of natural origin
    pub const LONGITUDE_OF_NATURAL_ORIGIN: u32 = 8802;
    /// Scale factor at natural origin
    pub const SCALE_FACTOR_AT_NATURAL_ORIGIN: u32 = 8805;
    /// False easting
    pub const FALSE_EASTING: u32 = 8806;
    /// False northing
    pub const FALSE_NORTHING: u32 = 8807;
    /// Latitude of false origin
    pub const LATITUDE_FALSE_ORIGIN: u32 = 8821;
    /// Longitude of false origin
    pub const LONGITUDE_FALSE_ORIGIN: u32 = 8822;
    /// Latitude of 1st standard parallel
    pub const LATITUDE_1ST_STD_PARALLEL: u32 = 8823;
    /// Latitude of 2nd standard parallel
    pub const LATITUDE_2ND_STD_PARALLEL: u32 = 8824;
    /// Easting at false origin
    pub const EASTING_FALSE_ORIGIN: u32 = 8826;
    /// Northing at false origin
    pub const NORTHING_FALSE_ORIGIN: u32 = 8827;
    /// Unit conversion scalar
    pub const UNIT_CONVERSION_SCALAR: u32 = 1051;
    /// X-axis translation
    pub const X_AXIS_TRANSLATION: u32 = 8605;
    /// Y-axis translation
    pub const Y_AXIS_TRANSLATION: u32 = 8606;
    /// Z-axis translation
    pub const Z_AXIS_TRANSLATION: u32 = 8607;
    /// X-axis rotation
    pub const X_AXIS_ROTATION: u32 = 8608;
    /// Y-axis rotation
    pub const Y_AXIS_ROTATION: u32 = 8609;
    /// Z-axis rotation
    pub const Z_AXIS_ROTATION: u32 = 8610;
    /// Scale difference
    pub const SCALE_DIFFERENCE: u32 = 8611;
    /// Rate of change of X-axis translation
    pub const RATE_X_TRANSLATION: u32 = 1040;
    /// Rate of change of Y-axis translation
    pub const RATE_Y_TRANSLATION: u32 = 1041;
    /// Rate of change of Z-axis translation
    pub const RATE_Z_TRANSLATION: u32 = 1042;
    /// Rate of change of X-axis rotation
    pub const RATE_X_ROTATION: u32 = 1043;
    /// Rate of change of Y-axis rotation
    pub const RATE_Y_ROTATION: u32 = 1044;
    /// Rate of change of Z-axis rotation
    pub const RATE_Z_ROTATION: u32 = 1045;
    /// Rate of change of Scale difference
    pub const RATE_SCALE_DIFFERENCE: u32 = 1046;
    /// Parameter reference epoch
    pub const REFERENCE_EPOCH: u32 = 1047;
    /// Semi-major axis length difference
    pub const SEMI_MAJOR_AXIS_DIFFERENCE: u32 = 8654;
    /// Flattening difference
    pub const FLATTENING_DIFFERENCE: u32 = 8655;
    /// Latitude offset
    pub const LATITUDE_OFFSET: u32 = 8601;
    /// Longitude offset
    pub const LONGITUDE_OFFSET: u32 = 8602;
    /// Vertical offset
    pub const VERTICAL_OFFSET_PARAM: u32 = 8603;
    /// Latitude and longitude difference file
    pub const LAT_LON_DIFFERENCE_FILE: u32 = 8656;
    /// Geocentric translation file
    pub const GEOCENTRIC_TRANSLATION_FILE: u32 = 8727;
    /// Geoid (height correction) model file
    pub const GEOID_MODEL_FILE: u32 = 8666;
    /// Vertical offset file
    pub const VERTICAL_OFFSET_FILE: u32 = 8732;
}

/// 已知方法名称
const METHOD_NAMES: &[(u32, &str)] = &[
    (epsg::TRANSVERSE_MERCATOR, "Transverse Mercator"),
    (epsg::LAMBERT_CONIC_CONFORMAL_1SP, "Lambert Conic Conformal (1SP)"),
    (epsg::LAMBERT_CONIC_CONFORMAL_2SP, "Lambert Conic Conformal (2SP)"),
    (epsg::MERCATOR_VARIANT_A, "Mercator (variant A)"),
    (epsg::POPULAR_VISUALISATION_PSEUDO_MERCATOR, "Popular Visualisation Pseudo Mercator"),
    (epsg::AXIS_ORDER_REVERSAL_2D, "Axis Order Reversal (2D)"),
    (epsg::AXIS_ORDER_REVERSAL_3D, "Axis Order Reversal (Geographic3D horizontal)"),
    (epsg::GEOGRAPHIC_GEOCENTRIC, "Geographic/geocentric conversions"),
    (epsg::GEOGRAPHIC_3D_TO_2D, "Geographic3D to 2D conversion"),
    (epsg::CHANGE_VERTICAL_UNIT, "Change of Vertical Unit"),
    (epsg::HEIGHT_DEPTH_REVERSAL, "Height Depth Reversal"),
    (epsg::GEOCENTRIC_TRANSLATION_GEOCENTRIC, "Geocentric translations (geocentric domain)"),
    (epsg::GEOCENTRIC_TRANSLATION_GEOG2D, "Geocentric translations (geog2D domain)"),
    (epsg::GEOCENTRIC_TRANSLATION_GEOG3D, "Geocentric translations (geog3D domain)"),
    (epsg::POSITION_VECTOR_GEOCENTRIC, "Position Vector transformation (geocentric domain)"),
    (epsg::POSITION_VECTOR_GEOG2D, "Position Vector transformation (geog2D domain)"),
    (epsg::POSITION_VECTOR_GEOG3D, "Position Vector transformation (geog3D domain)"),
    (epsg::COORDINATE_FRAME_GEOCENTRIC, "Coordinate Frame rotation (geocentric domain)"),
    (epsg::COORDINATE_FRAME_GEOG2D, "Coordinate Frame rotation (geog2D domain)"),
    (epsg::COORDINATE_FRAME_GEOG3D, "Coordinate Frame rotation (geog3D domain)"),
    (epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC, "Time-dependent Position Vector tfm (geocentric)"),
    (epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOG3D, "Time-dependent Position Vector tfm (geog3D)"),
    (epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOG2D, "Time-dependent Position Vector tfm (geog2D)"),
    (epsg::TIME_DEPENDENT_COORDINATE_FRAME_GEOCENTRIC, "Time-dependent Coordinate Frame rotation (geocen)"),
    (epsg::TIME_DEPENDENT_COORDINATE_FRAME_GEOG2D, "Time-dependent Coordinate Frame rotation (geog2D)"),
    (epsg::TIME_DEPENDENT_COORDINATE_FRAME_GEOG3D, "Time-dependent Coordinate Frame rotation (geog3D)"),
    (epsg::MOLODENSKY, "Molodensky"),
    (epsg::ABRIDGED_MOLODENSKY, "Abridged Molodensky"),
    (epsg::GEOGRAPHIC_2D_OFFSETS, "Geographic2D offsets"),
    (epsg::GEOGRAPHIC_3D_OFFSETS, "Geographic3D offsets"),
    (epsg::GEOGRAPHIC_2D_WITH_HEIGHT_OFFSETS, "Geographic2D with Height Offsets"),
    (epsg::VERTICAL_OFFSET, "Vertical Offset"),
    (epsg::NTV2, "NTv2"),
    (epsg::GEOCENTRIC_TRANSLATION_BY_GRID_IGN, "Geocentric translation by Grid Interpolation (IGN)"),
    (epsg::GEOGRAPHIC3D_TO_GRAVITY_RELATED_HEIGHT, "Geographic3D to GravityRelatedHeight"),
    (epsg::VERTICAL_OFFSET_BY_GRID, "Vertical Offset by Grid Interpolation"),
    (epsg::LONGITUDE_ROTATION, "Longitude rotation"),
];

/// 已知参数名称
const PARAMETER_NAMES: &[(u32, &str)] = &[
    (epsg::LATITUDE_OF_NATURAL_ORIGIN, "Latitude of natural origin"),
    (epsg::LONGITUDE_OF_NATURAL_ORIGIN, "Longitude of natural origin"),
    (epsg::SCALE_FACTOR_AT_NATURAL_ORIGIN, "Scale factor at natural origin"),
    (epsg::FALSE_EASTING, "False easting"),
    (epsg::FALSE_NORTHING, "False northing"),
    (epsg::LATITUDE_FALSE_ORIGIN, "Latitude of false origin"),
    (epsg::LONGITUDE_FALSE_ORIGIN, "Longitude of false origin"),
    (epsg::LATITUDE_1ST_STD_PARALLEL, "Latitude of 1st standard parallel"),
    (epsg::LATITUDE_2ND_STD_PARALLEL, "Latitude of 2nd standard parallel"),
    (epsg::EASTING_FALSE_ORIGIN, "Easting at false origin"),
    (epsg::NORTHING_FALSE_ORIGIN, "Northing at false origin"),
    (epsg::UNIT_CONVERSION_SCALAR, "Unit conversion scalar"),
    (epsg::X_AXIS_TRANSLATION, "X-axis translation"),
    (epsg::Y_AXIS_TRANSLATION, "Y-axis translation"),
    (epsg::Z_AXIS_TRANSLATION, "Z-axis translation"),
    (epsg::X_AXIS_ROTATION, "X-axis rotation"),
    (epsg::Y_AXIS_ROTATION, "Y-axis rotation"),
    (epsg::Z_AXIS_ROTATION, "Z-axis rotation"),
    (epsg::SCALE_DIFFERENCE, "Scale difference"),
    (epsg::RATE_X_TRANSLATION, "Rate of change of X-axis translation"),
    (epsg::RATE_Y_TRANSLATION, "Rate of change of Y-axis translation"),
    (epsg::RATE_Z_TRANSLATION, "Rate of change of Z-axis translation"),
    (epsg::RATE_X_ROTATION, "Rate of change of X-axis rotation"),
    (epsg::RATE_Y_ROTATION, "Rate of change of Y-axis rotation"),
    (epsg::RATE_Z_ROTATION, "Rate of change of Z-axis rotation"),
    (epsg::RATE_SCALE_DIFFERENCE, "Rate of change of Scale difference"),
    (epsg::REFERENCE_EPOCH, "Parameter reference epoch"),
    (epsg::SEMI_MAJOR_AXIS_DIFFERENCE, "Semi-major axis length difference"),
    (epsg::FLATTENING_DIFFERENCE, "Flattening difference"),
    (epsg::LATITUDE_OFFSET, "Latitude offset"),
    (epsg::LONGITUDE_OFFSET, "Longitude offset"),
    (epsg::VERTICAL_OFFSET_PARAM, "Vertical Offset"),
    (epsg::LAT_LON_DIFFERENCE_FILE, "Latitude and longitude difference file"),
    (epsg::GEOCENTRIC_TRANSLATION_FILE, "Geocentric translation file"),
    (epsg::GEOID_MODEL_FILE, "Geoid (height correction) model file"),
    (epsg::VERTICAL_OFFSET_FILE, "Vertical offset file"),
];

fn epsg_code_of(meta: &ObjectMeta) -> Option<u32> {
    meta.identifier_in("EPSG").and_then(|id| id.code.parse().ok())
}

// ============================================================================
// 方法
// ============================================================================

/// 操作方法
#[derive(Debug, Clone, PartialEq)]
pub struct OperationMethod {
    /// 元数据
    pub meta: ObjectMeta,
    /// 公式描述
    pub formula: Option<String>,
    /// 参数定义
    pub parameters: Vec<OperationParameter>,
}

impl OperationMethod {
    /// 自定义方法
    pub fn new(meta: ObjectMeta, parameters: Vec<OperationParameter>) -> Self {
        Self {
            meta,
            formula: None,
            parameters,
        }
    }

    /// EPSG 方法，名称取自内置表
    pub fn epsg(code: u32, parameter_codes: &[u32]) -> Self {
        let name = METHOD_NAMES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, n)| n.to_string())
            .unwrap_or_else(|| format!("EPSG method {code}"));
        Self::new(
            ObjectMeta::named(name).with_epsg(code),
            parameter_codes.iter().map(|c| OperationParameter::epsg(*c)).collect(),
        )
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// EPSG 代码
    pub fn epsg_code(&self) -> Option<u32> {
        epsg_code_of(&self.meta)
    }
}

// ============================================================================
// 参数
// ============================================================================

/// 操作参数定义
#[derive(Debug, Clone, PartialEq)]
pub struct OperationParameter {
    /// 元数据
    pub meta: ObjectMeta,
}

impl OperationParameter {
    /// 自定义参数
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
        }
    }

    /// EPSG 参数
    pub fn epsg(code: u32) -> Self {
        let name = PARAMETER_NAMES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, n)| n.to_string())
            .unwrap_or_else(|| format!("EPSG parameter {code}"));
        Self {
            meta: ObjectMeta::named(name).with_identifier(Identifier::epsg(code)),
        }
    }

    /// EPSG 代码
    pub fn epsg_code(&self) -> Option<u32> {
        epsg_code_of(&self.meta)
    }
}

/// 参数值
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// 量值
    Measure(Measure),
    /// 文本
    String(String),
    /// 文件名（格网）
    Filename(String),
    /// 整数
    Integer(i64),
    /// 布尔
    Boolean(bool),
}

impl ParameterValue {
    /// 作为量值
    pub fn as_measure(&self) -> Option<&Measure> {
        match self {
            Self::Measure(m) => Some(m),
            _ => None,
        }
    }

    /// 作为文件名
    pub fn as_filename(&self) -> Option<&str> {
        match self {
            Self::Filename(f) => Some(f),
            _ => None,
        }
    }

    fn is_equivalent(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Measure(a), Self::Measure(b)) => a.is_equivalent(b),
            _ => self == other,
        }
    }
}

/// 参数 + 值
#[derive(Debug, Clone, PartialEq)]
pub struct OperationParameterValue {
    /// 参数
    pub parameter: OperationParameter,
    /// 值
    pub value: ParameterValue,
}

impl OperationParameterValue {
    /// EPSG 参数的量值
    pub fn measure(code: u32, value: f64, unit: UnitOfMeasure) -> Self {
        Self {
            parameter: OperationParameter::epsg(code),
            value: ParameterValue::Measure(Measure::new(value, unit)),
        }
    }

    /// EPSG 参数的文件名
    pub fn filename(code: u32, file: impl Into<String>) -> Self {
        Self {
            parameter: OperationParameter::epsg(code),
            value: ParameterValue::Filename(file.into()),
        }
    }

    /// 参数代码相同且值等价
    pub(crate) fn is_equivalent(&self, other: &Self) -> bool {
        let same_param = match (self.parameter.epsg_code(), other.parameter.epsg_code()) {
            (Some(a), Some(b)) => a == b,
            _ => self.parameter.meta.name == other.parameter.meta.name,
        };
        same_param && self.value.is_equivalent(&other.value)
    }
}
