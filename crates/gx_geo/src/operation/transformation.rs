// geodex\crates\gx_geo\src\operation\transformation.rs
//! 变换（Transformation）构造与精确逆
//!
//! 赫尔默特族方法按源 CRS 的域（地心 / 地理 2D / 地理 3D）选择 EPSG 方法代码。

use super::conversion::GEODETIC_CRS_CHANGE;
use super::method::epsg;
use super::{
    naming, CoordinateOperation, CrsLink, OperationKind, OperationMethod,
    OperationParameterValue, ParameterValue, SingleOperation,
};
use crate::crs::{wellknown, Crs};
use crate::error::{GeoError, GeoResult};
use crate::metadata::{ObjectMeta, PositionalAccuracy};
use crate::units::{Measure, UnitOfMeasure};
use std::sync::Arc;

// ============================================================================
// 赫尔默特参数
// ============================================================================

/// 赫尔默特七参数：平移（米）、旋转（角秒）、尺度（ppm）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HelmertParams {
    /// X 平移
    pub tx: f64,
    /// Y 平移
    pub ty: f64,
    /// Z 平移
    pub tz: f64,
    /// X 旋转
    pub rx: f64,
    /// Y 旋转
    pub ry: f64,
    /// Z 旋转
    pub rz: f64,
    /// 尺度差
    pub scale_ppm: f64,
}

impl HelmertParams {
    /// 仅平移
    pub fn translation(tx: f64, ty: f64, tz: f64) -> Self {
        Self {
            tx,
            ty,
            tz,
            ..Self::default()
        }
    }

    fn values(&self) -> Vec<OperationParameterValue> {
        let mut values = translation_values(self.tx, self.ty, self.tz);
        values.extend([
            arcsec(epsg::X_AXIS_ROTATION, self.rx),
            arcsec(epsg::Y_AXIS_ROTATION, self.ry),
            arcsec(epsg::Z_AXIS_ROTATION, self.rz),
            OperationParameterValue::measure(
                epsg::SCALE_DIFFERENCE,
                self.scale_ppm,
                UnitOfMeasure::PARTS_PER_MILLION,
            ),
        ]);
        values
    }
}

/// 赫尔默特参数的年变化率
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HelmertRates {
    /// X 平移速率（米/年）
    pub dtx: f64,
    /// Y 平移速率
    pub dty: f64,
    /// Z 平移速率
    pub dtz: f64,
    /// X 旋转速率（角秒/年）
    pub drx: f64,
    /// Y 旋转速率
    pub dry: f64,
    /// Z 旋转速率
    pub drz: f64,
    /// 尺度速率（ppm/年）
    pub dscale_ppm: f64,
}

impl HelmertRates {
    fn values(&self, epoch_year: f64) -> Vec<OperationParameterValue> {
        let linear = |code, v| OperationParameterValue::measure(code, v, UnitOfMeasure::METRE_PER_YEAR);
        let angular =
            |code, v| OperationParameterValue::measure(code, v, UnitOfMeasure::ARC_SECOND_PER_YEAR);
        vec![
            linear(epsg::RATE_X_TRANSLATION, self.dtx),
            linear(epsg::RATE_Y_TRANSLATION, self.dty),
            linear(epsg::RATE_Z_TRANSLATION, self.dtz),
            angular(epsg::RATE_X_ROTATION, self.drx),
            angular(epsg::RATE_Y_ROTATION, self.dry),
            angular(epsg::RATE_Z_ROTATION, self.drz),
            OperationParameterValue::measure(
                epsg::RATE_SCALE_DIFFERENCE,
                self.dscale_ppm,
                UnitOfMeasure::PPM_PER_YEAR,
            ),
            OperationParameterValue::measure(epsg::REFERENCE_EPOCH, epoch_year, UnitOfMeasure::YEAR),
        ]
    }
}

fn metres(code: u32, v: f64) -> OperationParameterValue {
    OperationParameterValue::measure(code, v, UnitOfMeasure::METRE)
}

fn arcsec(code: u32, v: f64) -> OperationParameterValue {
    OperationParameterValue::measure(code, v, UnitOfMeasure::ARC_SECOND)
}

fn translation_values(tx: f64, ty: f64, tz: f64) -> Vec<OperationParameterValue> {
    vec![
        metres(epsg::X_AXIS_TRANSLATION, tx),
        metres(epsg::Y_AXIS_TRANSLATION, ty),
        metres(epsg::Z_AXIS_TRANSLATION, tz),
    ]
}

#[derive(Clone, Copy)]
enum HelmertFamily {
    Translation,
    PositionVector,
    CoordinateFrame,
    TimeDependentPositionVector,
    TimeDependentCoordinateFrame,
}

/// 按源 CRS 的域选择方法代码
fn helmert_method(family: HelmertFamily, source: &Arc<Crs>) -> u32 {
    let geodetic = source.extract_geodetic_crs();
    let geocentric = geodetic.as_ref().map_or(false, |g| g.is_geocentric());
    let geog3d = geodetic.as_ref().map_or(false, |g| g.is_geographic_3d());
    match family {
        HelmertFamily::Translation if geocentric => epsg::GEOCENTRIC_TRANSLATION_GEOCENTRIC,
        HelmertFamily::Translation if geog3d => epsg::GEOCENTRIC_TRANSLATION_GEOG3D,
        HelmertFamily::Translation => epsg::GEOCENTRIC_TRANSLATION_GEOG2D,
        HelmertFamily::PositionVector if geocentric => epsg::POSITION_VECTOR_GEOCENTRIC,
        HelmertFamily::PositionVector if geog3d => epsg::POSITION_VECTOR_GEOG3D,
        HelmertFamily::PositionVector => epsg::POSITION_VECTOR_GEOG2D,
        HelmertFamily::CoordinateFrame if geocentric => epsg::COORDINATE_FRAME_GEOCENTRIC,
        HelmertFamily::CoordinateFrame if geog3d => epsg::COORDINATE_FRAME_GEOG3D,
        HelmertFamily::CoordinateFrame => epsg::COORDINATE_FRAME_GEOG2D,
        HelmertFamily::TimeDependentPositionVector if geocentric => {
            epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC
        }
        HelmertFamily::TimeDependentPositionVector if geog3d => {
            epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOG3D
        }
        HelmertFamily::TimeDependentPositionVector => epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOG2D,
        HelmertFamily::TimeDependentCoordinateFrame if geocentric => {
            epsg::TIME_DEPENDENT_COORDINATE_FRAME_GEOCENTRIC
        }
        HelmertFamily::TimeDependentCoordinateFrame if geog3d => {
            epsg::TIME_DEPENDENT_COORDINATE_FRAME_GEOG3D
        }
        HelmertFamily::TimeDependentCoordinateFrame => {
            epsg::TIME_DEPENDENT_COORDINATE_FRAME_GEOG2D
        }
    }
}

fn both_3d(source: &Crs, target: &Crs) -> bool {
    source.dimension() == 3 && target.dimension() == 3
}

// ============================================================================
// 构造
// ============================================================================

impl CoordinateOperation {
    /// 通用变换
    pub fn create_transformation(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        interpolation_crs: Option<Arc<Crs>>,
        method: OperationMethod,
        values: Vec<OperationParameterValue>,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        Arc::new(
            Self::from_parts(
                meta,
                Some(source),
                Some(target),
                OperationKind::Transformation(SingleOperation::new(method, values)),
            )
            .with_interpolation_crs(interpolation_crs)
            .with_accuracy(accuracy),
        )
    }

    fn epsg_transformation(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        code: u32,
        values: Vec<OperationParameterValue>,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let codes: Vec<u32> = values
            .iter()
            .filter_map(|v| v.parameter.epsg_code())
            .collect();
        Self::create_transformation(
            meta,
            source,
            target,
            None,
            OperationMethod::epsg(code, &codes),
            values,
            accuracy,
        )
    }

    /// 地心平移（三参数）
    pub fn create_geocentric_translations(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        tx: f64,
        ty: f64,
        tz: f64,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let code = helmert_method(HelmertFamily::Translation, &source);
        Self::epsg_transformation(meta, source, target, code, translation_values(tx, ty, tz), accuracy)
    }

    /// 位置向量七参数
    pub fn create_position_vector(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        params: HelmertParams,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let code = helmert_method(HelmertFamily::PositionVector, &source);
        Self::epsg_transformation(meta, source, target, code, params.values(), accuracy)
    }

    /// 坐标框架旋转七参数
    pub fn create_coordinate_frame(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        params: HelmertParams,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let code = helmert_method(HelmertFamily::CoordinateFrame, &source);
        Self::epsg_transformation(meta, source, target, code, params.values(), accuracy)
    }

    /// 时间相关位置向量（十五参数）
    pub fn create_time_dependent_position_vector(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        params: HelmertParams,
        rates: HelmertRates,
        epoch_year: f64,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let code = helmert_method(HelmertFamily::TimeDependentPositionVector, &source);
        let mut values = params.values();
        values.extend(rates.values(epoch_year));
        Self::epsg_transformation(meta, source, target, code, values, accuracy)
    }

    /// 时间相关坐标框架旋转（十五参数）
    pub fn create_time_dependent_coordinate_frame(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        params: HelmertParams,
        rates: HelmertRates,
        epoch_year: f64,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let code = helmert_method(HelmertFamily::TimeDependentCoordinateFrame, &source);
        let mut values = params.values();
        values.extend(rates.values(epoch_year));
        Self::epsg_transformation(meta, source, target, code, values, accuracy)
    }

    fn molodensky_values(translation: [f64; 3], da: f64, df: f64) -> Vec<OperationParameterValue> {
        let mut values = translation_values(translation[0], translation[1], translation[2]);
        values.push(metres(epsg::SEMI_MAJOR_AXIS_DIFFERENCE, da));
        values.push(OperationParameterValue::measure(
            epsg::FLATTENING_DIFFERENCE,
            df,
            UnitOfMeasure::SCALE_UNITY,
        ));
        values
    }

    /// Molodensky 变换；`translation` 为米，`da` 为米，`df` 无量纲
    pub fn create_molodensky(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        translation: [f64; 3],
        da: f64,
        df: f64,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let values = Self::molodensky_values(translation, da, df);
        Self::epsg_transformation(meta, source, target, epsg::MOLODENSKY, values, accuracy)
    }

    /// 简化 Molodensky 变换
    pub fn create_abridged_molodensky(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        translation: [f64; 3],
        da: f64,
        df: f64,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let values = Self::molodensky_values(translation, da, df);
        Self::epsg_transformation(meta, source, target, epsg::ABRIDGED_MOLODENSKY, values, accuracy)
    }

    /// 经度旋转（精度为 0）
    pub fn create_longitude_rotation(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        offset: Measure,
    ) -> Arc<Self> {
        let value = OperationParameterValue {
            value: ParameterValue::Measure(offset),
            ..OperationParameterValue::measure(epsg::LONGITUDE_OFFSET, 0.0, UnitOfMeasure::DEGREE)
        };
        Self::epsg_transformation(
            meta,
            source,
            target,
            epsg::LONGITUDE_ROTATION,
            vec![value],
            PositionalAccuracy::new(0.0).ok(),
        )
    }

    /// 地理 2D 偏移（角秒）
    pub fn create_geographic_2d_offsets(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        dlat_arcsec: f64,
        dlon_arcsec: f64,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let values = vec![
            arcsec(epsg::LATITUDE_OFFSET, dlat_arcsec),
            arcsec(epsg::LONGITUDE_OFFSET, dlon_arcsec),
        ];
        Self::epsg_transformation(meta, source, target, epsg::GEOGRAPHIC_2D_OFFSETS, values, accuracy)
    }

    /// 地理 3D 偏移（角秒、米）
    pub fn create_geographic_3d_offsets(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        dlat_arcsec: f64,
        dlon_arcsec: f64,
        dh_metres: f64,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let values = vec![
            arcsec(epsg::LATITUDE_OFFSET, dlat_arcsec),
            arcsec(epsg::LONGITUDE_OFFSET, dlon_arcsec),
            metres(epsg::VERTICAL_OFFSET_PARAM, dh_metres),
        ];
        Self::epsg_transformation(meta, source, target, epsg::GEOGRAPHIC_3D_OFFSETS, values, accuracy)
    }

    /// 带高程的地理 2D 偏移（角秒、米）
    pub fn create_geographic_2d_with_height_offsets(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        dlat_arcsec: f64,
        dlon_arcsec: f64,
        dh_metres: f64,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let values = vec![
            arcsec(epsg::LATITUDE_OFFSET, dlat_arcsec),
            arcsec(epsg::LONGITUDE_OFFSET, dlon_arcsec),
            metres(epsg::VERTICAL_OFFSET_PARAM, dh_metres),
        ];
        Self::epsg_transformation(
            meta,
            source,
            target,
            epsg::GEOGRAPHIC_2D_WITH_HEIGHT_OFFSETS,
            values,
            accuracy,
        )
    }

    /// 垂直偏移（米）
    pub fn create_vertical_offset(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        dh_metres: f64,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let values = vec![metres(epsg::VERTICAL_OFFSET_PARAM, dh_metres)];
        Self::epsg_transformation(meta, source, target, epsg::VERTICAL_OFFSET, values, accuracy)
    }

    /// NTv2 水平格网
    pub fn create_ntv2(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        grid: &str,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let values = vec![OperationParameterValue::filename(epsg::LAT_LON_DIFFERENCE_FILE, grid)];
        Self::epsg_transformation(meta, source, target, epsg::NTV2, values, accuracy)
    }

    /// 格网地心平移（IGN）；插值 CRS 决定格网参考端
    pub fn create_geocentric_translation_by_grid(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        interpolation_crs: Arc<Crs>,
        grid: &str,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let code = epsg::GEOCENTRIC_TRANSLATION_BY_GRID_IGN;
        Self::create_transformation(
            meta,
            source,
            target,
            Some(interpolation_crs),
            OperationMethod::epsg(code, &[epsg::GEOCENTRIC_TRANSLATION_FILE]),
            vec![OperationParameterValue::filename(epsg::GEOCENTRIC_TRANSLATION_FILE, grid)],
            accuracy,
        )
    }

    /// 地理 3D 到重力相关高（大地水准面格网）
    pub fn create_geographic_3d_to_gravity_related_height(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        grid: &str,
        accuracy: Option<PositionalAccuracy>,
    ) -> GeoResult<Arc<Self>> {
        GeoError::check_construction(source.is_geographic_3d(), "大地水准面变换", || {
            format!("源 CRS '{}' 不是地理 3D CRS", source.name())
        })?;
        GeoError::check_construction(target.extract_vertical_crs().is_some(), "大地水准面变换", || {
            format!("目标 CRS '{}' 不含垂直分量", target.name())
        })?;
        let code = epsg::GEOGRAPHIC3D_TO_GRAVITY_RELATED_HEIGHT;
        let values = vec![OperationParameterValue::filename(epsg::GEOID_MODEL_FILE, grid)];
        Ok(Self::epsg_transformation(meta, source, target, code, values, accuracy))
    }

    /// 重力相关高到地理 3D：正向操作的逆包装，使用给定元数据
    pub fn create_gravity_related_height_to_geographic_3d(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        grid: &str,
        accuracy: Option<PositionalAccuracy>,
    ) -> GeoResult<Arc<Self>> {
        let forward = Self::create_geographic_3d_to_gravity_related_height(
            ObjectMeta::named(naming::inverse_name(&meta.name)),
            target.clone(),
            source.clone(),
            grid,
            accuracy,
        )?;
        Ok(Arc::new(Self {
            meta,
            source: Some(CrsLink::Strong(source)),
            target: Some(CrsLink::Strong(target)),
            interpolation_crs: None,
            accuracies: accuracy.into_iter().collect(),
            has_ballpark: false,
            kind: OperationKind::Inverse(forward),
        }))
    }

    /// 格网垂直偏移
    pub fn create_vertical_grid(
        meta: ObjectMeta,
        source: Arc<Crs>,
        target: Arc<Crs>,
        grid: &str,
        accuracy: Option<PositionalAccuracy>,
    ) -> Arc<Self> {
        let values = vec![OperationParameterValue::filename(epsg::VERTICAL_OFFSET_FILE, grid)];
        Self::epsg_transformation(meta, source, target, epsg::VERTICAL_OFFSET_BY_GRID, values, accuracy)
    }

    /// 由 TOWGS84 参数创建到 WGS 84 的变换
    ///
    /// 接受 3 个（平移）或 7 个（位置向量）数值。地心源对应 EPSG:4978，
    /// 地理 3D 源对应 EPSG:4979，其余对应 EPSG:4326。
    pub fn create_towgs84(source: &Arc<Crs>, params: &[f64]) -> GeoResult<Arc<Self>> {
        if params.len() != 3 && params.len() != 7 {
            return Err(GeoError::invalid_parameter(
                "towgs84",
                format!("需要 3 或 7 个数值，实际 {}", params.len()),
            ));
        }
        for value in params {
            GeoError::check_finite("towgs84", *value)?;
        }
        let target = if source.is_geocentric() {
            wellknown::epsg_4978()
        } else if source.is_geographic_3d() {
            wellknown::epsg_4979()
        } else {
            wellknown::epsg_4326()
        };
        let meta = ObjectMeta::named(format!("Transformation from {} to WGS84", source.name()));
        if params.len() == 3 {
            return Ok(Self::create_geocentric_translations(
                meta,
                source.clone(),
                target,
                params[0],
                params[1],
                params[2],
                None,
            ));
        }
        let helmert = HelmertParams {
            tx: params[0],
            ty: params[1],
            tz: params[2],
            rx: params[3],
            ry: params[4],
            rz: params[5],
            scale_ppm: params[6],
        };
        Ok(Self::create_position_vector(meta, source.clone(), target, helmert, None))
    }

    /// 点运动（源与目标为同一 CRS）
    pub fn create_point_motion(
        meta: ObjectMeta,
        crs: Arc<Crs>,
        method: OperationMethod,
        values: Vec<OperationParameterValue>,
    ) -> Arc<Self> {
        Arc::new(Self::from_parts(
            meta,
            Some(crs.clone()),
            Some(crs),
            OperationKind::PointMotion(SingleOperation::new(method, values)),
        ))
    }

    // ========================================================================
    // 空操作与粗略操作
    // ========================================================================

    /// 等价 CRS 之间的空操作（精度 0，非粗略）
    pub fn create_null(source: Arc<Crs>, target: Arc<Crs>) -> Arc<Self> {
        let zero = PositionalAccuracy::new(0.0).ok();
        let geocentric = source
            .extract_geodetic_crs()
            .map_or(false, |g| g.is_geocentric());
        if geocentric {
            let meta = ObjectMeta::named(format!(
                "Null geocentric translation from {} to {}",
                source.name(),
                target.name()
            ));
            return Self::create_geocentric_translations(meta, source, target, 0.0, 0.0, 0.0, zero);
        }
        if source.is_vertical() {
            let meta = ObjectMeta::named(format!(
                "Null vertical offset from {} to {}",
                source.name(),
                target.name()
            ));
            return Self::create_vertical_offset(meta, source, target, 0.0, zero);
        }
        let meta = ObjectMeta::named(format!(
            "Null geographic offset from {} to {}",
            source.name(),
            target.name()
        ));
        if both_3d(&source, &target) {
            Self::create_geographic_3d_offsets(meta, source, target, 0.0, 0.0, 0.0, zero)
        } else {
            Self::create_geographic_2d_offsets(meta, source, target, 0.0, 0.0, zero)
        }
    }

    /// 粗略地理偏移（零偏移，精度未知）
    pub fn create_ballpark_geographic_offset(source: Arc<Crs>, target: Arc<Crs>) -> Arc<Self> {
        let meta = ObjectMeta::named(format!(
            "Ballpark geographic offset from {} to {}",
            source.name(),
            target.name()
        ));
        if both_3d(&source, &target) {
            Self::create_geographic_3d_offsets(meta, source, target, 0.0, 0.0, 0.0, None)
        } else {
            Self::create_geographic_2d_offsets(meta, source, target, 0.0, 0.0, None)
        }
    }

    /// 粗略地心平移
    pub fn create_ballpark_geocentric_translation(source: Arc<Crs>, target: Arc<Crs>) -> Arc<Self> {
        let meta = ObjectMeta::named(format!(
            "Ballpark geocentric translation from {} to {}",
            source.name(),
            target.name()
        ));
        Self::create_geocentric_translations(meta, source, target, 0.0, 0.0, 0.0, None)
    }

    /// 粗略垂直变换：按单位比例换算，方向相反时取负
    pub fn create_ballpark_vertical(source: Arc<Crs>, target: Arc<Crs>) -> Arc<Self> {
        let axis_of = |crs: &Arc<Crs>| {
            crs.extract_vertical_crs()
                .and_then(|v| v.coordinate_system().map(|cs| cs.axes()[0].clone()))
        };
        let factor = match (axis_of(&source), axis_of(&target)) {
            (Some(s), Some(t)) => {
                let ratio = s.unit.conversion_to_si() / t.unit.conversion_to_si();
                if s.direction == t.direction {
                    ratio
                } else {
                    -ratio
                }
            }
            _ => 1.0,
        };
        let meta = ObjectMeta::named(format!(
            "Ballpark vertical transformation from {} to {}",
            source.name(),
            target.name()
        ));
        Self::epsg_transformation(
            meta,
            source,
            target,
            epsg::CHANGE_VERTICAL_UNIT,
            vec![OperationParameterValue::measure(
                epsg::UNIT_CONVERSION_SCALAR,
                factor,
                UnitOfMeasure::SCALE_UNITY,
            )],
            None,
        )
    }
}

// ============================================================================
// 精确逆
// ============================================================================

/// 参数取反即为逆的方法
const NEGATED_METHODS: &[u32] = &[
    epsg::GEOCENTRIC_TRANSLATION_GEOG2D,
    epsg::GEOCENTRIC_TRANSLATION_GEOCENTRIC,
    epsg::GEOCENTRIC_TRANSLATION_GEOG3D,
    epsg::MOLODENSKY,
    epsg::ABRIDGED_MOLODENSKY,
    epsg::GEOGRAPHIC_2D_OFFSETS,
    epsg::GEOGRAPHIC_3D_OFFSETS,
    epsg::GEOGRAPHIC_2D_WITH_HEIGHT_OFFSETS,
    epsg::VERTICAL_OFFSET,
    epsg::LONGITUDE_ROTATION,
];

/// 交换端点即为逆的方法
const SELF_INVERSE_METHODS: &[u32] = &[
    epsg::GEOGRAPHIC_GEOCENTRIC,
    epsg::GEOGRAPHIC_3D_TO_2D,
    epsg::AXIS_ORDER_REVERSAL_2D,
    epsg::AXIS_ORDER_REVERSAL_3D,
    epsg::HEIGHT_DEPTH_REVERSAL,
];

fn negated(value: &OperationParameterValue) -> OperationParameterValue {
    match &value.value {
        ParameterValue::Measure(m) => OperationParameterValue {
            parameter: value.parameter.clone(),
            value: ParameterValue::Measure(m.negated()),
        },
        _ => value.clone(),
    }
}

fn reciprocal(value: &OperationParameterValue) -> Option<OperationParameterValue> {
    let m = value.value.as_measure()?;
    if m.value == 0.0 {
        return None;
    }
    Some(OperationParameterValue {
        parameter: value.parameter.clone(),
        value: ParameterValue::Measure(Measure::new(1.0 / m.value, m.unit.clone())),
    })
}

/// 能精确表达的逆操作；其他方法返回 `None`，由调用方生成逆包装
pub(super) fn exact_inverse(op: &Arc<CoordinateOperation>) -> Option<Arc<CoordinateOperation>> {
    let single = op.single()?;
    let values = match single.method.epsg_code() {
        Some(code) if NEGATED_METHODS.contains(&code) => {
            single.values.iter().map(negated).collect()
        }
        Some(epsg::CHANGE_VERTICAL_UNIT) => single
            .values
            .iter()
            .map(reciprocal)
            .collect::<Option<Vec<_>>>()?,
        Some(code) if SELF_INVERSE_METHODS.contains(&code) => single.values.clone(),
        None if single.method.name() == GEODETIC_CRS_CHANGE => single.values.clone(),
        _ => return None,
    };
    let mut inverted = SingleOperation::new(single.method.clone(), values);
    inverted.forward = Some(op.clone());
    let kind = match op.kind() {
        OperationKind::Conversion(_) => OperationKind::Conversion(inverted),
        OperationKind::Transformation(_) => OperationKind::Transformation(inverted),
        _ => return None,
    };
    let mut meta = ObjectMeta::named(naming::inverse_name(op.name()));
    meta.usages = op.meta.usages.clone();
    Some(Arc::new(
        CoordinateOperation::from_parts(meta, op.target_crs(), op.source_crs(), kind)
            .with_interpolation_crs(op.interpolation_crs().cloned())
            .with_accuracy(op.accuracies().first().copied())
            .with_ballpark(op.has_ballpark_transformation()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;

    #[test]
    fn test_translation_method_by_domain() {
        let op = CoordinateOperation::create_geocentric_translations(
            ObjectMeta::named("t"),
            wellknown::epsg_4978(),
            wellknown::epsg_4978(),
            1.0,
            2.0,
            3.0,
            None,
        );
        assert_eq!(op.method_code(), Some(epsg::GEOCENTRIC_TRANSLATION_GEOCENTRIC));
        let op = CoordinateOperation::create_geocentric_translations(
            ObjectMeta::named("t"),
            wellknown::epsg_4979(),
            wellknown::epsg_4979(),
            1.0,
            2.0,
            3.0,
            None,
        );
        assert_eq!(op.method_code(), Some(epsg::GEOCENTRIC_TRANSLATION_GEOG3D));
    }

    #[test]
    fn test_exact_inverse_negates_translation() {
        let op = CoordinateOperation::create_geocentric_translations(
            ObjectMeta::named("Transformation from NTF (Paris) to WGS 84"),
            wellknown::epsg_4807(),
            wellknown::epsg_4326(),
            -168.0,
            -60.0,
            320.0,
            Some(PositionalAccuracy::new(2.0).unwrap()),
        );
        let inv = op.inverse();
        assert_eq!(inv.name(), "Transformation from WGS 84 to NTF (Paris)");
        assert_eq!(
            inv.parameter_in(epsg::X_AXIS_TRANSLATION, &UnitOfMeasure::METRE),
            Some(168.0)
        );
        assert_eq!(inv.accuracy(), Some(2.0));
        assert_eq!(inv.source_crs().unwrap().name(), "WGS 84");
        assert!(Arc::ptr_eq(&inv.inverse(), &op));
    }

    #[test]
    fn test_seven_parameter_inverse_is_wrapper() {
        let op = CoordinateOperation::create_position_vector(
            ObjectMeta::named("pv"),
            wellknown::epsg_4326(),
            wellknown::epsg_4326(),
            HelmertParams {
                rx: 1.0,
                ..HelmertParams::translation(1.0, 2.0, 3.0)
            },
            None,
        );
        assert!(matches!(op.inverse().kind(), OperationKind::Inverse(_)));
    }

    #[test]
    fn test_vertical_unit_reciprocal() {
        let op = CoordinateOperation::create_change_vertical_unit(0.3048)
            .unwrap()
            .with_endpoints(wellknown::egm96_height(), wellknown::egm96_height());
        let inv = op.inverse();
        let factor = inv
            .parameter_in(epsg::UNIT_CONVERSION_SCALAR, &UnitOfMeasure::SCALE_UNITY)
            .unwrap();
        assert!((factor - 1.0 / 0.3048).abs() < 1e-12);
    }

    #[test]
    fn test_towgs84_arity() {
        let err = CoordinateOperation::create_towgs84(&wellknown::epsg_4807(), &[1.0, 2.0]).unwrap_err();
        match &err {
            GeoError::InvalidParameter { name, .. } => assert_eq!(name, "towgs84"),
            _ => panic!("错误的错误类型"),
        }
        let op = CoordinateOperation::create_towgs84(&wellknown::epsg_4807(), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(op.name(), "Transformation from NTF (Paris) to WGS84");
        assert_eq!(op.target_crs().unwrap().name(), "WGS 84");
    }

    #[test]
    fn test_null_operation_metadata() {
        let op = CoordinateOperation::create_null(wellknown::epsg_4326(), wellknown::epsg_4326());
        assert_eq!(op.name(), "Null geographic offset from WGS 84 to WGS 84");
        assert_eq!(op.accuracy(), Some(0.0));
        assert!(!op.has_ballpark_transformation());
    }

    #[test]
    fn test_null_vertical_offset_name() {
        let op = CoordinateOperation::create_null(wellknown::egm96_height(), wellknown::egm96_height());
        assert_eq!(op.name(), "Null vertical offset from EGM96 height to EGM96 height");
        assert_eq!(op.accuracy(), Some(0.0));
        assert_eq!(op.to_pipeline_string().unwrap(), "+proj=noop");
        assert_eq!(
            op.inverse().name(),
            "Null vertical offset from EGM96 height to EGM96 height"
        );
    }

    #[test]
    fn test_vertical_grid_converts_feet() {
        let feet = Crs::vertical(
            ObjectMeta::named("EGM96 height (ft)"),
            wellknown::datum_egm96(),
            crate::cs::CoordinateSystem::gravity_related_height(UnitOfMeasure::FOOT),
        )
        .unwrap();
        let op = CoordinateOperation::create_vertical_grid(
            ObjectMeta::named("EGM96 to EGM96 (ft) by grid"),
            wellknown::egm96_height(),
            feet,
            "offset.gtx",
            None,
        );
        assert_eq!(
            op.to_pipeline_string().unwrap(),
            "+proj=pipeline +step +proj=vgridshift +grids=offset.gtx +multiplier=1 \
             +step +proj=unitconvert +z_in=m +z_out=ft"
        );
        assert_eq!(
            op.inverse().to_pipeline_string().unwrap(),
            "+proj=pipeline +step +proj=unitconvert +z_in=ft +z_out=m \
             +step +inv +proj=vgridshift +grids=offset.gtx +multiplier=1"
        );
    }

    #[test]
    fn test_ballpark_vertical_factor_sign() {
        let op = CoordinateOperation::create_ballpark_vertical(
            wellknown::egm96_height(),
            wellknown::egm96_depth(),
        );
        assert!(op.has_ballpark_transformation());
        assert_eq!(
            op.parameter_in(epsg::UNIT_CONVERSION_SCALAR, &UnitOfMeasure::SCALE_UNITY),
            Some(-1.0)
        );
    }

    #[test]
    fn test_geoid_requires_geographic_3d_source() {
        let err = CoordinateOperation::create_geographic_3d_to_gravity_related_height(
            ObjectMeta::named("g"),
            wellknown::epsg_4326(),
            wellknown::egm96_height(),
            "egm96_15.gtx",
            None,
        );
        assert!(err.is_err());
    }
}
