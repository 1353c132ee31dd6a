// geodex\crates\gx_geo\src\operation\export.rs
//! 操作导出为管线步骤
//!
//! 每个方法先把源坐标变换到弧度/米的规范形式，执行方法步骤，
//! 再变换到目标 CRS 的单位和轴序。相邻的互逆步骤由格式化器消去。

use super::conversion::GEODETIC_CRS_CHANGE;
use super::method::epsg;
use super::{CoordinateOperation, OperationKind, SingleOperation};
use crate::crs::{
    add_angular_unit_convert_and_axis_swap, add_datum_info, add_geocentric_unit_conversion,
    add_projected_unit_convert_and_axis_swap, export_crs, Crs,
};
use crate::cs::AxisDirection;
use crate::datum::{add_pm_param, well_known_meridian_name};
use crate::equivalence::{Criterion, Equivalence};
use crate::error::{GeoError, GeoResult};
use crate::pipeline::PipelineFormatter;
use crate::units::{UnitOfMeasure, UnitType};
use std::sync::Arc;

/// 导出操作
pub(crate) fn export_operation(op: &CoordinateOperation, f: &mut PipelineFormatter) -> GeoResult<()> {
    match op.kind() {
        OperationKind::Concatenated(steps) => {
            for step in steps {
                export_operation(step, f)?;
            }
            Ok(())
        }
        OperationKind::Inverse(inner) => {
            f.start_inversion();
            let result = export_operation(inner, f);
            f.stop_inversion();
            result
        }
        OperationKind::PointMotion(_) => Err(GeoError::formatting(format!(
            "点运动操作 '{}' 不能导出为管线",
            op.name()
        ))),
        OperationKind::Conversion(single) | OperationKind::Transformation(single) => {
            export_single(op, single, f)
        }
    }
}

// ============================================================================
// 公共辅助
// ============================================================================

fn require(crs: Option<Arc<Crs>>, op: &CoordinateOperation, side: &str) -> GeoResult<Arc<Crs>> {
    crs.ok_or_else(|| GeoError::formatting(format!("操作 '{}' 缺少{side} CRS", op.name())))
}

fn require_geographic(crs: &Arc<Crs>, op: &CoordinateOperation) -> GeoResult<Arc<Crs>> {
    crs.extract_geographic_crs().ok_or_else(|| {
        GeoError::formatting(format!(
            "操作 '{}' 的 CRS '{}' 不含地理 CRS",
            op.name(),
            crs.name()
        ))
    })
}

fn require_geodetic(crs: &Arc<Crs>, op: &CoordinateOperation) -> GeoResult<Arc<Crs>> {
    crs.extract_geodetic_crs().ok_or_else(|| {
        GeoError::formatting(format!(
            "操作 '{}' 的 CRS '{}' 不含大地 CRS",
            op.name(),
            crs.name()
        ))
    })
}

fn require_param(op: &CoordinateOperation, code: u32, unit: &UnitOfMeasure) -> GeoResult<f64> {
    op.parameter_in(code, unit).ok_or_else(|| {
        GeoError::formatting(format!("操作 '{}' 缺少参数 {code}", op.name()))
    })
}

fn require_file(op: &CoordinateOperation, code: u32) -> GeoResult<String> {
    op.parameter_filename(code)
        .map(str::to_string)
        .ok_or_else(|| GeoError::formatting(format!("操作 '{}' 缺少格网参数 {code}", op.name())))
}

fn param_or_zero(op: &CoordinateOperation, code: u32, unit: &UnitOfMeasure) -> f64 {
    op.parameter_in(code, unit).unwrap_or(0.0)
}

fn export_ellipsoid(crs: &Crs, f: &mut PipelineFormatter) -> GeoResult<()> {
    let ellipsoid = crs
        .ellipsoid()
        .ok_or_else(|| GeoError::formatting(format!("CRS '{}' 没有椭球", crs.name())))?;
    ellipsoid.export(f);
    Ok(())
}

/// 以逆方向导出 CRS
fn export_crs_inverted(crs: &Arc<Crs>, f: &mut PipelineFormatter) -> GeoResult<()> {
    f.start_inversion();
    let result = export_crs(crs, f);
    f.stop_inversion();
    result
}

fn add_angular_inverted(crs: &Arc<Crs>, f: &mut PipelineFormatter) -> GeoResult<()> {
    f.start_inversion();
    let result = add_angular_unit_convert_and_axis_swap(crs, f);
    f.stop_inversion();
    result
}

fn linear_unit_of(crs: &Arc<Crs>) -> UnitOfMeasure {
    crs.extract_vertical_crs()
        .and_then(|v| v.coordinate_system().map(|cs| cs.first_unit().clone()))
        .unwrap_or(UnitOfMeasure::METRE)
}

fn is_metre(unit: &UnitOfMeasure) -> bool {
    unit.is_equivalent(&UnitOfMeasure::METRE)
}

// ============================================================================
// 分派
// ============================================================================

const HELMERT_METHODS: &[u32] = &[
    epsg::GEOCENTRIC_TRANSLATION_GEOG2D,
    epsg::GEOCENTRIC_TRANSLATION_GEOCENTRIC,
    epsg::GEOCENTRIC_TRANSLATION_GEOG3D,
    epsg::POSITION_VECTOR_GEOG2D,
    epsg::POSITION_VECTOR_GEOCENTRIC,
    epsg::POSITION_VECTOR_GEOG3D,
    epsg::COORDINATE_FRAME_GEOG2D,
    epsg::COORDINATE_FRAME_GEOCENTRIC,
    epsg::COORDINATE_FRAME_GEOG3D,
    epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC,
    epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOG3D,
    epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOG2D,
    epsg::TIME_DEPENDENT_COORDINATE_FRAME_GEOCENTRIC,
    epsg::TIME_DEPENDENT_COORDINATE_FRAME_GEOG2D,
    epsg::TIME_DEPENDENT_COORDINATE_FRAME_GEOG3D,
];

const PROJECTION_METHODS: &[u32] = &[
    epsg::TRANSVERSE_MERCATOR,
    epsg::LAMBERT_CONIC_CONFORMAL_1SP,
    epsg::LAMBERT_CONIC_CONFORMAL_2SP,
    epsg::MERCATOR_VARIANT_A,
    epsg::POPULAR_VISUALISATION_PSEUDO_MERCATOR,
];

fn export_single(
    op: &CoordinateOperation,
    single: &SingleOperation,
    f: &mut PipelineFormatter,
) -> GeoResult<()> {
    let code = single.method.epsg_code();
    match code {
        Some(c) if PROJECTION_METHODS.contains(&c) => export_projection(op, c, f),
        Some(c) if HELMERT_METHODS.contains(&c) => export_helmert(op, c, f),
        Some(epsg::AXIS_ORDER_REVERSAL_2D) | Some(epsg::AXIS_ORDER_REVERSAL_3D) => {
            export_axis_order_reversal(op, f)
        }
        Some(epsg::GEOGRAPHIC_GEOCENTRIC) | Some(epsg::GEOGRAPHIC_3D_TO_2D) => {
            export_crs_change(op, f)
        }
        None if single.method.name() == GEODETIC_CRS_CHANGE => export_crs_change(op, f),
        Some(epsg::CHANGE_VERTICAL_UNIT) => export_change_vertical_unit(op, f),
        Some(epsg::HEIGHT_DEPTH_REVERSAL) => {
            f.add_step("axisswap");
            f.add_param("order", "1,2,-3");
            Ok(())
        }
        Some(epsg::MOLODENSKY) | Some(epsg::ABRIDGED_MOLODENSKY) => {
            export_molodensky(op, code == Some(epsg::ABRIDGED_MOLODENSKY), f)
        }
        Some(epsg::GEOGRAPHIC_2D_OFFSETS)
        | Some(epsg::GEOGRAPHIC_3D_OFFSETS)
        | Some(epsg::GEOGRAPHIC_2D_WITH_HEIGHT_OFFSETS) => {
            export_geographic_offsets(op, code != Some(epsg::GEOGRAPHIC_2D_OFFSETS), f)
        }
        Some(epsg::VERTICAL_OFFSET) => export_vertical_offset(op, f),
        Some(epsg::NTV2) => export_ntv2(op, single, f),
        Some(epsg::GEOCENTRIC_TRANSLATION_BY_GRID_IGN) => export_xyz_grid(op, f),
        Some(epsg::GEOGRAPHIC3D_TO_GRAVITY_RELATED_HEIGHT) => export_geoid(op, f),
        Some(epsg::VERTICAL_OFFSET_BY_GRID) => export_vertical_grid(op, f),
        Some(epsg::LONGITUDE_ROTATION) => export_longitude_rotation(op, f),
        _ => Err(GeoError::formatting(format!(
            "不支持导出方法 '{}'",
            single.method.name()
        ))),
    }
}

// ============================================================================
// 投影
// ============================================================================

fn is_utm(lat_0: f64, lon_0: f64, k: f64, x_0: f64, y_0: f64) -> Option<(i32, bool)> {
    let zone = (lon_0 + 183.0) / 6.0;
    let is_integral_zone = (zone - zone.round()).abs() < 1e-10 && (1.0..=60.0).contains(&zone.round());
    if lat_0 == 0.0
        && (k - 0.9996).abs() < 1e-10
        && x_0 == 500_000.0
        && (y_0 == 0.0 || y_0 == 10_000_000.0)
        && is_integral_zone
    {
        Some((zone.round() as i32, y_0 == 0.0))
    } else {
        None
    }
}

fn export_projection(op: &CoordinateOperation, code: u32, f: &mut PipelineFormatter) -> GeoResult<()> {
    let source = op.source_crs();
    let target = op.target_crs();

    if !f.is_crs_export() {
        if let Some(src) = &source {
            if src.is_geographic() {
                f.set_omit_longlat(true);
                let result = export_crs_inverted(src, f);
                f.set_omit_longlat(false);
                result?;
            } else if let Some(conv) = src.deriving_conversion() {
                f.start_inversion();
                let result = export_operation(&conv, f);
                f.stop_inversion();
                result?;
            } else {
                export_crs_inverted(src, f)?;
            }
        }
    }

    let deg = UnitOfMeasure::DEGREE;
    let m = UnitOfMeasure::METRE;
    let unity = UnitOfMeasure::SCALE_UNITY;
    match code {
        epsg::TRANSVERSE_MERCATOR => {
            let lat_0 = require_param(op, epsg::LATITUDE_OF_NATURAL_ORIGIN, &deg)?;
            let lon_0 = require_param(op, epsg::LONGITUDE_OF_NATURAL_ORIGIN, &deg)?;
            let k = require_param(op, epsg::SCALE_FACTOR_AT_NATURAL_ORIGIN, &unity)?;
            let x_0 = require_param(op, epsg::FALSE_EASTING, &m)?;
            let y_0 = require_param(op, epsg::FALSE_NORTHING, &m)?;
            if let Some((zone, north)) = is_utm(lat_0, lon_0, k, x_0, y_0) {
                f.add_step("utm");
                f.add_param_int("zone", i64::from(zone));
                if !north {
                    f.add_param_flag("south");
                }
            } else {
                f.add_step("tmerc");
                f.add_param_num("lat_0", lat_0);
                f.add_param_num("lon_0", lon_0);
                f.add_param_num("k", k);
                f.add_param_num("x_0", x_0);
                f.add_param_num("y_0", y_0);
            }
        }
        epsg::LAMBERT_CONIC_CONFORMAL_1SP => {
            let lat_0 = require_param(op, epsg::LATITUDE_OF_NATURAL_ORIGIN, &deg)?;
            f.add_step("lcc");
            f.add_param_num("lat_1", lat_0);
            f.add_param_num("lat_0", lat_0);
            f.add_param_num("lon_0", require_param(op, epsg::LONGITUDE_OF_NATURAL_ORIGIN, &deg)?);
            f.add_param_num("k_0", require_param(op, epsg::SCALE_FACTOR_AT_NATURAL_ORIGIN, &unity)?);
            f.add_param_num("x_0", require_param(op, epsg::FALSE_EASTING, &m)?);
            f.add_param_num("y_0", require_param(op, epsg::FALSE_NORTHING, &m)?);
        }
        epsg::LAMBERT_CONIC_CONFORMAL_2SP => {
            f.add_step("lcc");
            f.add_param_num("lat_0", require_param(op, epsg::LATITUDE_FALSE_ORIGIN, &deg)?);
            f.add_param_num("lon_0", require_param(op, epsg::LONGITUDE_FALSE_ORIGIN, &deg)?);
            f.add_param_num("lat_1", require_param(op, epsg::LATITUDE_1ST_STD_PARALLEL, &deg)?);
            f.add_param_num("lat_2", require_param(op, epsg::LATITUDE_2ND_STD_PARALLEL, &deg)?);
            f.add_param_num("x_0", require_param(op, epsg::EASTING_FALSE_ORIGIN, &m)?);
            f.add_param_num("y_0", require_param(op, epsg::NORTHING_FALSE_ORIGIN, &m)?);
        }
        epsg::MERCATOR_VARIANT_A => {
            f.add_step("merc");
            f.add_param_num("lon_0", require_param(op, epsg::LONGITUDE_OF_NATURAL_ORIGIN, &deg)?);
            f.add_param_num("k", require_param(op, epsg::SCALE_FACTOR_AT_NATURAL_ORIGIN, &unity)?);
            f.add_param_num("x_0", require_param(op, epsg::FALSE_EASTING, &m)?);
            f.add_param_num("y_0", require_param(op, epsg::FALSE_NORTHING, &m)?);
        }
        _ => {
            f.add_step("webmerc");
            f.add_param_num("lat_0", require_param(op, epsg::LATITUDE_OF_NATURAL_ORIGIN, &deg)?);
            f.add_param_num("lon_0", require_param(op, epsg::LONGITUDE_OF_NATURAL_ORIGIN, &deg)?);
            f.add_param_num("x_0", require_param(op, epsg::FALSE_EASTING, &m)?);
            f.add_param_num("y_0", require_param(op, epsg::FALSE_NORTHING, &m)?);
        }
    }

    let geodetic = target
        .as_ref()
        .and_then(|t| t.extract_geodetic_crs())
        .or_else(|| source.as_ref().and_then(|s| s.extract_geodetic_crs()));
    if let Some(g) = geodetic {
        add_datum_info(&g, f)?;
    }
    if let Some(tgt) = &target {
        add_projected_unit_convert_and_axis_swap(tgt, f)?;
    }
    Ok(())
}

// ============================================================================
// 同一基准内的转换
// ============================================================================

fn export_axis_order_reversal(op: &CoordinateOperation, f: &mut PipelineFormatter) -> GeoResult<()> {
    f.add_step("axisswap");
    f.add_param("order", "2,1");
    let unit_of = |crs: Option<Arc<Crs>>| {
        crs.and_then(|c| c.coordinate_system().map(|cs| cs.first_unit().clone()))
    };
    if let (Some(src_unit), Some(tgt_unit)) = (unit_of(op.source_crs()), unit_of(op.target_crs())) {
        if !src_unit.is_equivalent(&tgt_unit) {
            f.add_step("unitconvert");
            f.add_param("xy_in", &src_unit.proj_token());
            f.add_param("xy_out", &tgt_unit.proj_token());
        }
    }
    Ok(())
}

/// 源 CRS 的逆导出后接目标 CRS 的导出
fn export_crs_change(op: &CoordinateOperation, f: &mut PipelineFormatter) -> GeoResult<()> {
    let src = require(op.source_crs(), op, "源")?;
    let tgt = require(op.target_crs(), op, "目标")?;
    export_crs_inverted(&src, f)?;
    export_crs(&tgt, f)
}

fn export_change_vertical_unit(op: &CoordinateOperation, f: &mut PipelineFormatter) -> GeoResult<()> {
    let factor = require_param(op, epsg::UNIT_CONVERSION_SCALAR, &UnitOfMeasure::SCALE_UNITY)?;
    let unit = UnitOfMeasure::new("", factor, UnitType::Linear);
    if let Some(name) = unit.proj_name() {
        if name != "m" {
            f.add_step("unitconvert");
            f.add_param("z_in", name);
            f.add_param("z_out", "m");
        }
        return Ok(());
    }
    let reciprocal = UnitOfMeasure::new("", 1.0 / factor, UnitType::Linear);
    if let Some(name) = reciprocal.proj_name() {
        f.add_step("unitconvert");
        f.add_param("z_in", "m");
        f.add_param("z_out", name);
    } else {
        f.add_step("affine");
        f.add_param_num("s33", factor);
    }
    Ok(())
}

// ============================================================================
// 赫尔默特族
// ============================================================================

fn helmert_parameter_count(code: u32) -> usize {
    match code {
        epsg::GEOCENTRIC_TRANSLATION_GEOG2D
        | epsg::GEOCENTRIC_TRANSLATION_GEOCENTRIC
        | epsg::GEOCENTRIC_TRANSLATION_GEOG3D => 3,
        epsg::POSITION_VECTOR_GEOG2D
        | epsg::POSITION_VECTOR_GEOCENTRIC
        | epsg::POSITION_VECTOR_GEOG3D
        | epsg::COORDINATE_FRAME_GEOG2D
        | epsg::COORDINATE_FRAME_GEOCENTRIC
        | epsg::COORDINATE_FRAME_GEOG3D => 7,
        _ => 15,
    }
}

fn is_position_vector(code: u32) -> bool {
    matches!(
        code,
        epsg::POSITION_VECTOR_GEOG2D
            | epsg::POSITION_VECTOR_GEOCENTRIC
            | epsg::POSITION_VECTOR_GEOG3D
            | epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC
            | epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOG3D
            | epsg::TIME_DEPENDENT_POSITION_VECTOR_GEOG2D
    )
}

fn export_helmert(op: &CoordinateOperation, code: u32, f: &mut PipelineFormatter) -> GeoResult<()> {
    let src = require(op.source_crs(), op, "源")?;
    let tgt = require(op.target_crs(), op, "目标")?;
    let src_geodetic = require_geodetic(&src, op)?;
    let tgt_geodetic = require_geodetic(&tgt, op)?;
    let src_geog = src_geodetic.is_geographic().then(|| src_geodetic.clone());
    let tgt_geog = tgt_geodetic.is_geographic().then(|| tgt_geodetic.clone());
    let push_pop_v3 = src_geog.as_ref().map_or(false, |g| g.dimension() == 2)
        || tgt_geog.as_ref().map_or(false, |g| g.dimension() == 2);

    match &src_geog {
        Some(g) => {
            export_crs_inverted(g, f)?;
            if push_pop_v3 {
                f.add_step("push");
                f.add_param_flag("v_3");
            }
            f.add_step("cart");
            export_ellipsoid(g, f)?;
        }
        None => {
            f.start_inversion();
            let result = add_geocentric_unit_conversion(&src_geodetic, f);
            f.stop_inversion();
            result?;
        }
    }

    let count = helmert_parameter_count(code);
    let m = UnitOfMeasure::METRE;
    let sec = UnitOfMeasure::ARC_SECOND;
    let mut values = vec![
        ("x", param_or_zero(op, epsg::X_AXIS_TRANSLATION, &m)),
        ("y", param_or_zero(op, epsg::Y_AXIS_TRANSLATION, &m)),
        ("z", param_or_zero(op, epsg::Z_AXIS_TRANSLATION, &m)),
    ];
    if count >= 7 {
        values.extend([
            ("rx", param_or_zero(op, epsg::X_AXIS_ROTATION, &sec)),
            ("ry", param_or_zero(op, epsg::Y_AXIS_ROTATION, &sec)),
            ("rz", param_or_zero(op, epsg::Z_AXIS_ROTATION, &sec)),
            ("s", param_or_zero(op, epsg::SCALE_DIFFERENCE, &UnitOfMeasure::PARTS_PER_MILLION)),
        ]);
    }
    if count == 15 {
        let mpy = UnitOfMeasure::METRE_PER_YEAR;
        let spy = UnitOfMeasure::ARC_SECOND_PER_YEAR;
        values.extend([
            ("dx", param_or_zero(op, epsg::RATE_X_TRANSLATION, &mpy)),
            ("dy", param_or_zero(op, epsg::RATE_Y_TRANSLATION, &mpy)),
            ("dz", param_or_zero(op, epsg::RATE_Z_TRANSLATION, &mpy)),
            ("drx", param_or_zero(op, epsg::RATE_X_ROTATION, &spy)),
            ("dry", param_or_zero(op, epsg::RATE_Y_ROTATION, &spy)),
            ("drz", param_or_zero(op, epsg::RATE_Z_ROTATION, &spy)),
            ("ds", param_or_zero(op, epsg::RATE_SCALE_DIFFERENCE, &UnitOfMeasure::PPM_PER_YEAR)),
        ]);
    }
    if values.iter().any(|(_, v)| *v != 0.0) {
        f.add_step("helmert");
        for (name, value) in &values {
            f.add_param_num(name, *value);
        }
        if count == 15 {
            f.add_param_num("t_epoch", param_or_zero(op, epsg::REFERENCE_EPOCH, &UnitOfMeasure::YEAR));
        }
        if count >= 7 {
            let convention = if is_position_vector(code) {
                "position_vector"
            } else {
                "coordinate_frame"
            };
            f.add_param("convention", convention);
        }
    }

    match &tgt_geog {
        Some(g) => {
            f.add_step("cart");
            export_ellipsoid(g, f)?;
            f.set_current_step_inverted(true);
            if push_pop_v3 {
                f.add_step("pop");
                f.add_param_flag("v_3");
            }
            export_crs(g, f)?;
        }
        None => add_geocentric_unit_conversion(&tgt_geodetic, f)?,
    }
    Ok(())
}

// ============================================================================
// Molodensky 与偏移
// ============================================================================

fn export_molodensky(
    op: &CoordinateOperation,
    abridged: bool,
    f: &mut PipelineFormatter,
) -> GeoResult<()> {
    let src = require_geographic(&require(op.source_crs(), op, "源")?, op)?;
    let tgt = require_geographic(&require(op.target_crs(), op, "目标")?, op)?;
    export_crs_inverted(&src, f)?;
    let m = UnitOfMeasure::METRE;
    f.add_step("molodensky");
    export_ellipsoid(&src, f)?;
    f.add_param_num("dx", require_param(op, epsg::X_AXIS_TRANSLATION, &m)?);
    f.add_param_num("dy", require_param(op, epsg::Y_AXIS_TRANSLATION, &m)?);
    f.add_param_num("dz", require_param(op, epsg::Z_AXIS_TRANSLATION, &m)?);
    f.add_param_num("da", require_param(op, epsg::SEMI_MAJOR_AXIS_DIFFERENCE, &m)?);
    f.add_param_num(
        "df",
        require_param(op, epsg::FLATTENING_DIFFERENCE, &UnitOfMeasure::SCALE_UNITY)?,
    );
    if abridged {
        f.add_param_flag("abridged");
    }
    export_crs(&tgt, f)
}

fn export_geographic_offsets(
    op: &CoordinateOperation,
    with_height: bool,
    f: &mut PipelineFormatter,
) -> GeoResult<()> {
    let src = require(op.source_crs(), op, "源")?;
    let tgt = require(op.target_crs(), op, "目标")?;
    let sec = UnitOfMeasure::ARC_SECOND;
    let dlat = param_or_zero(op, epsg::LATITUDE_OFFSET, &sec);
    let dlon = param_or_zero(op, epsg::LONGITUDE_OFFSET, &sec);
    let dh = if with_height {
        param_or_zero(op, epsg::VERTICAL_OFFSET_PARAM, &UnitOfMeasure::METRE)
    } else {
        0.0
    };
    let all_zero = dlat == 0.0 && dlon == 0.0 && dh == 0.0;
    if all_zero && src.is_equivalent_to(&tgt, Criterion::Equivalent) {
        return Ok(());
    }
    let src_geog = require_geographic(&src, op)?;
    let tgt_geog = require_geographic(&tgt, op)?;
    add_angular_inverted(&src_geog, f)?;
    if !all_zero {
        f.add_step("geogoffset");
        f.add_param_num("dlat", dlat);
        f.add_param_num("dlon", dlon);
        if with_height {
            f.add_param_num("dh", dh);
        }
    }
    add_angular_unit_convert_and_axis_swap(&tgt_geog, f)
}

fn vertical_unit_step(unit: &UnitOfMeasure, f: &mut PipelineFormatter) {
    if !is_metre(unit) {
        f.add_step("unitconvert");
        f.add_param("z_in", "m");
        f.add_param("z_out", &unit.proj_token());
    }
}

fn export_vertical_offset(op: &CoordinateOperation, f: &mut PipelineFormatter) -> GeoResult<()> {
    let mut src = require(op.source_crs(), op, "源")?;
    let mut tgt = require(op.target_crs(), op, "目标")?;
    let vertical_parts = match (src.as_compound(), tgt.as_compound()) {
        (Some(a), Some(b))
            if a.components().len() == 2
                && b.components().len() == 2
                && a.components()[0].is_equivalent_to(&b.components()[0], Criterion::Equivalent) =>
        {
            Some((a.components()[1].clone(), b.components()[1].clone()))
        }
        _ => None,
    };
    if let Some((a, b)) = vertical_parts {
        src = a;
        tgt = b;
    }
    f.start_inversion();
    vertical_unit_step(&linear_unit_of(&src), f);
    f.stop_inversion();
    let dh = param_or_zero(op, epsg::VERTICAL_OFFSET_PARAM, &UnitOfMeasure::METRE);
    if dh != 0.0 {
        f.add_step("geogoffset");
        f.add_param_num("dh", dh);
    }
    vertical_unit_step(&linear_unit_of(&tgt), f);
    Ok(())
}

// ============================================================================
// 格网
// ============================================================================

fn export_ntv2(
    op: &CoordinateOperation,
    single: &SingleOperation,
    f: &mut PipelineFormatter,
) -> GeoResult<()> {
    let grid = require_file(op, epsg::LAT_LON_DIFFERENCE_FILE)?;
    let src = require_geographic(&require(op.source_crs(), op, "源")?, op)?;
    let tgt = require_geographic(&require(op.target_crs(), op, "目标")?, op)?;
    add_angular_inverted(&src, f)?;
    f.add_step("hgridshift");
    f.add_param("grids", &grid);
    if single.method.name().starts_with("Inverse of ") {
        f.set_current_step_inverted(true);
    }
    add_angular_unit_convert_and_axis_swap(&tgt, f)
}

fn export_xyz_grid(op: &CoordinateOperation, f: &mut PipelineFormatter) -> GeoResult<()> {
    let grid = require_file(op, epsg::GEOCENTRIC_TRANSLATION_FILE)?;
    let interpolation = op.interpolation_crs().cloned().ok_or_else(|| {
        GeoError::formatting(format!("操作 '{}' 缺少插值 CRS", op.name()))
    })?;
    let src = require_geographic(&require(op.source_crs(), op, "源")?, op)?;
    let tgt = require_geographic(&require(op.target_crs(), op, "目标")?, op)?;

    add_angular_inverted(&src, f)?;
    f.add_step("push");
    f.add_param_flag("v_3");
    f.add_step("cart");
    export_ellipsoid(&src, f)?;

    let grid_ref = match (interpolation.datum_source(), tgt.datum_source()) {
        (Some(a), Some(b)) if a.is_equivalent_to(b, Criterion::Equivalent) => "output_crs",
        _ => "input_crs",
    };
    f.add_step("xyzgridshift");
    f.add_param("grids", &grid);
    f.add_param("grid_ref", grid_ref);
    export_ellipsoid(&interpolation, f)?;

    f.add_step("cart");
    export_ellipsoid(&tgt, f)?;
    f.set_current_step_inverted(true);
    f.add_step("pop");
    f.add_param_flag("v_3");
    add_angular_unit_convert_and_axis_swap(&tgt, f)
}

fn export_geoid(op: &CoordinateOperation, f: &mut PipelineFormatter) -> GeoResult<()> {
    let grid = require_file(op, epsg::GEOID_MODEL_FILE)?;
    let src = require(op.source_crs(), op, "源")?;
    let tgt = require(op.target_crs(), op, "目标")?;
    let src_geog = require_geographic(&src, op)?;
    let depth = tgt
        .extract_vertical_crs()
        .and_then(|v| v.coordinate_system().map(|cs| cs.axes()[0].direction))
        == Some(AxisDirection::Down);

    f.push_omit_z(true);
    let result = (|| -> GeoResult<()> {
        add_angular_inverted(&src_geog, f)?;
        f.start_inversion();
        if depth {
            f.add_step("axisswap");
            f.add_param("order", "1,2,-3");
        }
        f.add_step("vgridshift");
        f.add_param("grids", &grid);
        f.add_param_int("multiplier", 1);
        f.stop_inversion();
        // 格网给出的是米制高程
        vertical_unit_step(&linear_unit_of(&tgt), f);
        add_angular_unit_convert_and_axis_swap(&src_geog, f)
    })();
    f.pop_omit_z();
    result
}

/// 水平分量到弧度（地理直接换算；投影先逆投影到基础地理 CRS）
fn horizontal_to_radians(horizontal: &Arc<Crs>, f: &mut PipelineFormatter) -> GeoResult<()> {
    f.start_inversion();
    let result = radians_to_horizontal(horizontal, f);
    f.stop_inversion();
    result
}

fn radians_to_horizontal(horizontal: &Arc<Crs>, f: &mut PipelineFormatter) -> GeoResult<()> {
    if horizontal.is_geographic() {
        return add_angular_unit_convert_and_axis_swap(horizontal, f);
    }
    let conversion = horizontal.deriving_conversion().ok_or_else(|| {
        GeoError::formatting(format!("水平 CRS '{}' 不是地理或投影 CRS", horizontal.name()))
    })?;
    let base = horizontal.base_crs().cloned().ok_or_else(|| {
        GeoError::formatting(format!("投影 CRS '{}' 缺少基础 CRS", horizontal.name()))
    })?;
    add_angular_unit_convert_and_axis_swap(&base, f)?;
    export_operation(&conversion, f)
}

fn export_vertical_grid(op: &CoordinateOperation, f: &mut PipelineFormatter) -> GeoResult<()> {
    let grid = require_file(op, epsg::VERTICAL_OFFSET_FILE)?;
    let src = require(op.source_crs(), op, "源")?;
    let tgt = require(op.target_crs(), op, "目标")?;
    let horizontal = |crs: &Arc<Crs>| crs.as_compound().map(|c| c.components()[0].clone());
    f.push_omit_z(true);
    let result = (|| -> GeoResult<()> {
        if let Some(h) = horizontal(&src) {
            horizontal_to_radians(&h, f)?;
        }
        f.start_inversion();
        vertical_unit_step(&linear_unit_of(&src), f);
        f.stop_inversion();
        f.add_step("vgridshift");
        f.add_param("grids", &grid);
        f.add_param_int("multiplier", 1);
        vertical_unit_step(&linear_unit_of(&tgt), f);
        if let Some(h) = horizontal(&tgt) {
            radians_to_horizontal(&h, f)?;
        }
        Ok(())
    })();
    f.pop_omit_z();
    result
}

fn export_longitude_rotation(op: &CoordinateOperation, f: &mut PipelineFormatter) -> GeoResult<()> {
    let src = require_geographic(&require(op.source_crs(), op, "源")?, op)?;
    let tgt = require_geographic(&require(op.target_crs(), op, "目标")?, op)?;
    let ellipsoid = src
        .ellipsoid()
        .ok_or_else(|| GeoError::formatting(format!("CRS '{}' 没有椭球", src.name())))?;
    let same_ellipsoid = tgt
        .ellipsoid()
        .map_or(false, |e| e.is_equivalent_to(&ellipsoid, Criterion::Equivalent));
    if !same_ellipsoid {
        return Err(GeoError::formatting(format!(
            "经度旋转 '{}' 两端椭球不同",
            op.name()
        )));
    }
    let offset = require_param(op, epsg::LONGITUDE_OFFSET, &UnitOfMeasure::DEGREE)?;

    add_angular_inverted(&src, f)?;
    f.add_step("longlat");
    ellipsoid.export(f);
    match well_known_meridian_name(-offset) {
        Some(name) if offset != 0.0 => f.add_param("pm", name),
        _ => {
            if offset != 0.0 {
                add_pm_param(f, offset);
            }
            f.set_current_step_inverted(true);
        }
    }
    add_angular_unit_convert_and_axis_swap(&tgt, f)
}
