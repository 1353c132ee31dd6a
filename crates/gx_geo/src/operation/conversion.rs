// geodex\crates\gx_geo\src\operation\conversion.rs
//! 转换（Conversion）构造
//!
//! 投影转换构造时不带端点，由 [`Crs::projected`] 绑定；
//! 同一基准内的轴序、维度、单位转换由工厂绑定端点后使用。

use super::method::epsg;
use super::{
    naming, CoordinateOperation, CrsLink, OperationKind, OperationMethod, OperationParameterValue,
    SingleOperation,
};
use crate::crs::Crs;
use crate::error::{GeoError, GeoResult};
use crate::metadata::{Identifier, ObjectMeta};
use crate::units::UnitOfMeasure;
use std::sync::Arc;

/// 自定义方法名：同一基准内的大地 CRS 间转换（单位或轴的一般变化）
pub(crate) const GEODETIC_CRS_CHANGE: &str = "Change of geodetic CRS";

fn angle(code: u32, degrees: f64) -> OperationParameterValue {
    OperationParameterValue::measure(code, degrees, UnitOfMeasure::DEGREE)
}

fn length(code: u32, metres: f64) -> OperationParameterValue {
    OperationParameterValue::measure(code, metres, UnitOfMeasure::METRE)
}

fn scale(code: u32, k: f64) -> OperationParameterValue {
    OperationParameterValue::measure(code, k, UnitOfMeasure::SCALE_UNITY)
}

fn check_finite_all(values: &[(&str, f64)]) -> GeoResult<()> {
    for (name, value) in values {
        GeoError::check_finite(name, *value)?;
    }
    Ok(())
}

impl CoordinateOperation {
    /// 通用转换（不带端点）
    pub fn create_conversion(
        meta: ObjectMeta,
        method: OperationMethod,
        values: Vec<OperationParameterValue>,
    ) -> Self {
        Self::from_parts(
            meta,
            None,
            None,
            OperationKind::Conversion(SingleOperation::new(method, values)),
        )
    }

    fn epsg_conversion(meta: ObjectMeta, code: u32, values: Vec<OperationParameterValue>) -> Self {
        let codes: Vec<u32> = values
            .iter()
            .filter_map(|v| v.parameter.epsg_code())
            .collect();
        Self::create_conversion(meta, OperationMethod::epsg(code, &codes), values)
    }

    /// 绑定端点
    pub fn with_endpoints(self, source: Arc<Crs>, target: Arc<Crs>) -> Arc<Self> {
        Arc::new(self.bound_to(CrsLink::Strong(source), CrsLink::Strong(target)))
    }

    // ========================================================================
    // 投影
    // ========================================================================

    /// UTM 投影
    ///
    /// `zone` 取 1..=60，否则返回 `InvalidParameter`。
    ///
    /// # 示例
    ///
    /// ```
    /// use gx_geo::operation::CoordinateOperation;
    ///
    /// let utm = CoordinateOperation::create_utm(31, true).unwrap();
    /// assert_eq!(utm.name(), "UTM zone 31N");
    /// assert!(CoordinateOperation::create_utm(61, true).is_err());
    /// ```
    pub fn create_utm(zone: u8, north: bool) -> GeoResult<Self> {
        if !(1..=60).contains(&zone) {
            return Err(GeoError::invalid_parameter(
                "zone",
                format!("UTM 带号 {zone} 超出 1..=60"),
            ));
        }
        let code = if north { 16000 } else { 17000 } + u32::from(zone);
        let meta = ObjectMeta::named(format!(
            "UTM zone {zone}{}",
            if north { 'N' } else { 'S' }
        ))
        .with_identifier(Identifier::epsg(code));
        let central_meridian = f64::from(zone) * 6.0 - 183.0;
        let false_northing = if north { 0.0 } else { 10_000_000.0 };
        Self::create_transverse_mercator(meta, 0.0, central_meridian, 0.9996, 500_000.0, false_northing)
    }

    /// 横轴墨卡托（角度以度、长度以米给出）
    pub fn create_transverse_mercator(
        meta: ObjectMeta,
        lat_0: f64,
        lon_0: f64,
        k: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> GeoResult<Self> {
        check_finite_all(&[
            ("lat_0", lat_0),
            ("lon_0", lon_0),
            ("k", k),
            ("x_0", false_easting),
            ("y_0", false_northing),
        ])?;
        Ok(Self::epsg_conversion(
            meta,
            epsg::TRANSVERSE_MERCATOR,
            vec![
                angle(epsg::LATITUDE_OF_NATURAL_ORIGIN, lat_0),
                angle(epsg::LONGITUDE_OF_NATURAL_ORIGIN, lon_0),
                scale(epsg::SCALE_FACTOR_AT_NATURAL_ORIGIN, k),
                length(epsg::FALSE_EASTING, false_easting),
                length(epsg::FALSE_NORTHING, false_northing),
            ],
        ))
    }

    /// 单标准纬线兰伯特等角圆锥
    pub fn create_lambert_conic_conformal_1sp(
        meta: ObjectMeta,
        lat_0: f64,
        lon_0: f64,
        k: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> GeoResult<Self> {
        check_finite_all(&[("lat_0", lat_0), ("lon_0", lon_0), ("k", k)])?;
        Ok(Self::epsg_conversion(
            meta,
            epsg::LAMBERT_CONIC_CONFORMAL_1SP,
            vec![
                angle(epsg::LATITUDE_OF_NATURAL_ORIGIN, lat_0),
                angle(epsg::LONGITUDE_OF_NATURAL_ORIGIN, lon_0),
                scale(epsg::SCALE_FACTOR_AT_NATURAL_ORIGIN, k),
                length(epsg::FALSE_EASTING, false_easting),
                length(epsg::FALSE_NORTHING, false_northing),
            ],
        ))
    }

    /// 双标准纬线兰伯特等角圆锥
    #[allow(clippy::too_many_arguments)]
    pub fn create_lambert_conic_conformal_2sp(
        meta: ObjectMeta,
        lat_false_origin: f64,
        lon_false_origin: f64,
        lat_1: f64,
        lat_2: f64,
        easting_false_origin: f64,
        northing_false_origin: f64,
    ) -> GeoResult<Self> {
        check_finite_all(&[
            ("lat_0", lat_false_origin),
            ("lon_0", lon_false_origin),
            ("lat_1", lat_1),
            ("lat_2", lat_2),
        ])?;
        Ok(Self::epsg_conversion(
            meta,
            epsg::LAMBERT_CONIC_CONFORMAL_2SP,
            vec![
                angle(epsg::LATITUDE_FALSE_ORIGIN, lat_false_origin),
                angle(epsg::LONGITUDE_FALSE_ORIGIN, lon_false_origin),
                angle(epsg::LATITUDE_1ST_STD_PARALLEL, lat_1),
                angle(epsg::LATITUDE_2ND_STD_PARALLEL, lat_2),
                length(epsg::EASTING_FALSE_ORIGIN, easting_false_origin),
                length(epsg::NORTHING_FALSE_ORIGIN, northing_false_origin),
            ],
        ))
    }

    /// 墨卡托（A 型）；原点纬度必须为 0
    pub fn create_mercator_variant_a(
        meta: ObjectMeta,
        lat_0: f64,
        lon_0: f64,
        k: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> GeoResult<Self> {
        if lat_0 != 0.0 {
            return Err(GeoError::invalid_parameter(
                "lat_0",
                "墨卡托 A 型的原点纬度必须为 0",
            ));
        }
        check_finite_all(&[("lon_0", lon_0), ("k", k)])?;
        Ok(Self::epsg_conversion(
            meta,
            epsg::MERCATOR_VARIANT_A,
            vec![
                angle(epsg::LATITUDE_OF_NATURAL_ORIGIN, lat_0),
                angle(epsg::LONGITUDE_OF_NATURAL_ORIGIN, lon_0),
                scale(epsg::SCALE_FACTOR_AT_NATURAL_ORIGIN, k),
                length(epsg::FALSE_EASTING, false_easting),
                length(epsg::FALSE_NORTHING, false_northing),
            ],
        ))
    }

    /// 网络墨卡托（Popular Visualisation Pseudo Mercator）
    pub fn create_popular_visualisation_pseudo_mercator(
        meta: ObjectMeta,
        lat_0: f64,
        lon_0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> GeoResult<Self> {
        check_finite_all(&[("lat_0", lat_0), ("lon_0", lon_0)])?;
        Ok(Self::epsg_conversion(
            meta,
            epsg::POPULAR_VISUALISATION_PSEUDO_MERCATOR,
            vec![
                angle(epsg::LATITUDE_OF_NATURAL_ORIGIN, lat_0),
                angle(epsg::LONGITUDE_OF_NATURAL_ORIGIN, lon_0),
                length(epsg::FALSE_EASTING, false_easting),
                length(epsg::FALSE_NORTHING, false_northing),
            ],
        ))
    }

    // ========================================================================
    // 同一基准内的转换
    // ========================================================================

    /// 轴序交换（2D 或地理 3D 水平部分）
    pub fn create_axis_order_reversal(is_3d: bool) -> Self {
        let (name, code) = if is_3d {
            (
                "axis order change (geographic3D horizontal)",
                epsg::AXIS_ORDER_REVERSAL_3D,
            )
        } else {
            ("axis order change (2D)", epsg::AXIS_ORDER_REVERSAL_2D)
        };
        Self::epsg_conversion(
            ObjectMeta::named(name).with_identifier(Identifier::epsg(if is_3d { 15499 } else { 15498 })),
            code,
            Vec::new(),
        )
    }

    /// 地理与地心之间的转换
    pub fn create_geographic_geocentric(source: Arc<Crs>, target: Arc<Crs>) -> Arc<Self> {
        let meta = ObjectMeta::named(naming::conversion_name(&source, &target));
        Self::epsg_conversion(meta, epsg::GEOGRAPHIC_GEOCENTRIC, Vec::new())
            .with_endpoints(source, target)
    }

    /// 地理 3D 到 2D（或相反）
    pub fn create_geographic_3d_to_2d(source: Arc<Crs>, target: Arc<Crs>) -> Arc<Self> {
        let meta = ObjectMeta::named(naming::conversion_name(&source, &target));
        Self::epsg_conversion(meta, epsg::GEOGRAPHIC_3D_TO_2D, Vec::new())
            .with_endpoints(source, target)
    }

    /// 同一基准内大地 CRS 间的一般转换（单位、轴序的组合变化）
    pub fn create_geodetic_crs_change(source: Arc<Crs>, target: Arc<Crs>) -> Arc<Self> {
        let meta = ObjectMeta::named(naming::conversion_name(&source, &target));
        let method = OperationMethod::new(ObjectMeta::named(GEODETIC_CRS_CHANGE), Vec::new());
        Self::create_conversion(meta, method, Vec::new()).with_endpoints(source, target)
    }

    /// 垂直单位变化，`factor` 为源单位到目标单位的比例
    pub fn create_change_vertical_unit(factor: f64) -> GeoResult<Self> {
        GeoError::check_finite("factor", factor)?;
        if factor == 0.0 {
            return Err(GeoError::invalid_parameter("factor", "比例不能为 0"));
        }
        Ok(Self::epsg_conversion(
            ObjectMeta::named("Change of Vertical Unit"),
            epsg::CHANGE_VERTICAL_UNIT,
            vec![scale(epsg::UNIT_CONVERSION_SCALAR, factor)],
        ))
    }

    /// 高程与深度互换
    pub fn create_height_depth_reversal() -> Self {
        Self::epsg_conversion(
            ObjectMeta::named("Height Depth Reversal").with_identifier(Identifier::epsg(7812)),
            epsg::HEIGHT_DEPTH_REVERSAL,
            Vec::new(),
        )
    }
}
