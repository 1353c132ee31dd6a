// geodex\crates\gx_geo\src\crs\export.rs
//! CRS 导出
//!
//! 两种模式：
//! - 操作模式：从弧度/米的规范坐标到该 CRS 坐标的步骤
//! - CRS 模式（`PipelineFormatter::for_crs`）：单个描述 CRS 的步骤，
//!   如 `+proj=longlat +datum=WGS84`

use super::{BoundCrs, Crs, CrsKind};
use crate::error::{GeoError, GeoResult};
use crate::operation::{epsg, export_operation};
use crate::pipeline::PipelineFormatter;
use crate::units::UnitOfMeasure;
use std::sync::Arc;

/// 导出 CRS
pub(crate) fn export_crs(crs: &Arc<Crs>, f: &mut PipelineFormatter) -> GeoResult<()> {
    match crs.kind() {
        CrsKind::Geographic(_) => export_geographic(crs, f),
        CrsKind::Geodetic(_) if crs.is_geocentric() => export_geocentric(crs, f),
        CrsKind::Projected(_) => export_projected(crs, f),
        CrsKind::Vertical(_) => export_vertical(crs, f),
        CrsKind::Compound(c) => {
            let components = c.components();
            if !f.is_crs_export() {
                return export_crs(&components[0], f);
            }
            export_crs(&components[0], f)?;
            for component in &components[1..] {
                if component.is_vertical() {
                    export_vertical(component, f)?;
                }
            }
            Ok(())
        }
        CrsKind::Bound(b) => {
            if f.is_crs_export() {
                export_bound(b, f)
            } else {
                export_crs(b.base(), f)
            }
        }
        _ => Err(GeoError::formatting(format!(
            "CRS '{}' 不能导出为管线",
            crs.name()
        ))),
    }
}

// ============================================================================
// 基准信息
// ============================================================================

/// 写入椭球、TOWGS84/格网、本初子午线；CRS 模式下常见基准简写为 `datum=`
pub(crate) fn add_datum_info(crs: &Crs, f: &mut PipelineFormatter) -> GeoResult<()> {
    let datum = crs
        .datum()
        .ok_or_else(|| GeoError::formatting(format!("CRS '{}' 没有基准", crs.name())))?;
    if f.is_crs_export() && f.towgs84().is_none() && f.nadgrids().is_none() {
        let shorthand = datum
            .meta
            .identifier_in("EPSG")
            .and_then(|id| match id.code.as_str() {
                "6326" => Some("WGS84"),
                "6267" => Some("NAD27"),
                "6269" => Some("NAD83"),
                _ => None,
            });
        if let Some(name) = shorthand {
            f.add_param("datum", name);
            return Ok(());
        }
    }
    let ellipsoid = datum
        .ellipsoid()
        .ok_or_else(|| GeoError::formatting(format!("基准 '{}' 没有椭球", datum.name())))?;
    ellipsoid.export(f);
    if f.is_crs_export() {
        if let Some(values) = f.towgs84().map(<[f64]>::to_vec) {
            f.add_param_nums("towgs84", &values);
        }
        if let Some(grid) = f.nadgrids().map(str::to_string) {
            f.add_param("nadgrids", &grid);
        }
    }
    if let Some(pm) = datum.prime_meridian() {
        pm.export(f);
    }
    Ok(())
}

// ============================================================================
// 地理
// ============================================================================

fn export_geographic(crs: &Arc<Crs>, f: &mut PipelineFormatter) -> GeoResult<()> {
    if f.is_crs_export() {
        f.add_step("longlat");
        return add_datum_info(crs, f);
    }
    let pm_is_zero = crs
        .prime_meridian()
        .map_or(true, |pm| pm.longitude_rad() == 0.0);
    if !(f.omit_longlat() && pm_is_zero) {
        f.add_step("longlat");
        add_datum_info(crs, f)?;
    }
    add_angular_unit_convert_and_axis_swap(crs, f)
}

/// 弧度到该地理 CRS 的单位与轴序
///
/// 高程单位非米且未忽略 z 时才写入 `z_in`/`z_out`。
pub(crate) fn add_angular_unit_convert_and_axis_swap(
    crs: &Arc<Crs>,
    f: &mut PipelineFormatter,
) -> GeoResult<()> {
    let geographic = crs.extract_geographic_crs().ok_or_else(|| {
        GeoError::formatting(format!("CRS '{}' 不含地理 CRS", crs.name()))
    })?;
    let cs = geographic
        .coordinate_system()
        .ok_or_else(|| GeoError::formatting(format!("CRS '{}' 没有坐标系", crs.name())))?;
    let axes = cs.axes();
    let unit = &axes[0].unit;
    let z_unit = (axes.len() == 3 && !f.omit_z())
        .then(|| &axes[2].unit)
        .filter(|u| !u.is_equivalent(&UnitOfMeasure::METRE));

    if !unit.is_equivalent(&UnitOfMeasure::RADIAN) || z_unit.is_some() {
        f.add_step("unitconvert");
        f.add_param("xy_in", "rad");
        if z_unit.is_some() {
            f.add_param("z_in", "m");
        }
        f.add_param("xy_out", &unit.proj_token());
        if let Some(z) = z_unit {
            f.add_param("z_out", &z.proj_token());
        }
    }

    if let (Some(a), Some(b)) = (
        axes[0].direction.proj_axis_code(),
        axes[1].direction.proj_axis_code(),
    ) {
        if (a, b) != ("1", "2") {
            f.add_step("axisswap");
            f.add_param("order", &format!("{a},{b}"));
        }
    }
    Ok(())
}

// ============================================================================
// 地心
// ============================================================================

fn export_geocentric(crs: &Arc<Crs>, f: &mut PipelineFormatter) -> GeoResult<()> {
    if f.is_crs_export() {
        f.add_step("geocent");
        add_datum_info(crs, f)?;
        add_crs_units(crs, f);
        return Ok(());
    }
    f.add_step("cart");
    add_datum_info(crs, f)?;
    add_geocentric_unit_conversion(crs, f)
}

/// 米到地心 CRS 的线性单位
pub(crate) fn add_geocentric_unit_conversion(crs: &Crs, f: &mut PipelineFormatter) -> GeoResult<()> {
    let unit = crs
        .coordinate_system()
        .map(|cs| cs.first_unit().clone())
        .ok_or_else(|| GeoError::formatting(format!("CRS '{}' 没有坐标系", crs.name())))?;
    if !unit.is_equivalent(&UnitOfMeasure::METRE) {
        let token = unit.proj_token();
        f.add_step("unitconvert");
        f.add_param("xy_in", "m");
        f.add_param("z_in", "m");
        f.add_param("xy_out", &token);
        f.add_param("z_out", &token);
    }
    Ok(())
}

/// CRS 模式的 `units=` 或 `to_meter=`
fn add_crs_units(crs: &Crs, f: &mut PipelineFormatter) {
    let unit = crs
        .coordinate_system()
        .map_or(UnitOfMeasure::METRE, |cs| cs.first_unit().clone());
    match unit.proj_name() {
        Some(name) => f.add_param("units", name),
        None => f.add_param_num("to_meter", unit.conversion_to_si()),
    }
}

// ============================================================================
// 投影
// ============================================================================

fn export_projected(crs: &Arc<Crs>, f: &mut PipelineFormatter) -> GeoResult<()> {
    let conversion = crs
        .deriving_conversion()
        .ok_or_else(|| GeoError::formatting(format!("CRS '{}' 没有定义转换", crs.name())))?;
    if !f.is_crs_export() {
        if let Some(base) = crs.base_crs() {
            export_crs(base, f)?;
        }
    }
    export_operation(&conversion, f)
}

/// 米到投影 CRS 的单位与轴序；CRS 模式只写单位
pub(crate) fn add_projected_unit_convert_and_axis_swap(
    crs: &Crs,
    f: &mut PipelineFormatter,
) -> GeoResult<()> {
    if f.is_crs_export() {
        add_crs_units(crs, f);
        return Ok(());
    }
    let cs = crs
        .coordinate_system()
        .ok_or_else(|| GeoError::formatting(format!("CRS '{}' 没有坐标系", crs.name())))?;
    let axes = cs.axes();
    let unit = cs.first_unit();
    if !unit.is_equivalent(&UnitOfMeasure::METRE) {
        let token = unit.proj_token();
        f.add_step("unitconvert");
        f.add_param("xy_in", "m");
        f.add_param("z_in", "m");
        f.add_param("xy_out", &token);
        f.add_param("z_out", &token);
    }
    if axes.len() >= 2 {
        if let (Some(a), Some(b)) = (
            axes[0].direction.proj_axis_code(),
            axes[1].direction.proj_axis_code(),
        ) {
            if (a, b) != ("1", "2") {
                f.add_step("axisswap");
                f.add_param("order", &format!("{a},{b}"));
            }
        }
    }
    Ok(())
}

// ============================================================================
// 垂直与绑定
// ============================================================================

fn export_vertical(crs: &Arc<Crs>, f: &mut PipelineFormatter) -> GeoResult<()> {
    if !f.is_crs_export() {
        return Ok(());
    }
    if let Some(model) = crs.geoid_models().first() {
        f.add_param("geoidgrids", &model.grid_file);
    }
    let unit = crs
        .coordinate_system()
        .map_or(UnitOfMeasure::METRE, |cs| cs.first_unit().clone());
    match unit.proj_name() {
        Some(name) => f.add_param("vunits", name),
        None => f.add_param_num("vto_meter", unit.conversion_to_si()),
    }
    Ok(())
}

fn export_bound(bound: &BoundCrs, f: &mut PipelineFormatter) -> GeoResult<()> {
    let tr = bound.transformation();
    let m = UnitOfMeasure::METRE;
    let sec = UnitOfMeasure::ARC_SECOND;
    let value = |code| tr.parameter_in(code, &m).unwrap_or(0.0);
    let rotation = |code| tr.parameter_in(code, &sec).unwrap_or(0.0);
    let scale = || {
        tr.parameter_in(epsg::SCALE_DIFFERENCE, &UnitOfMeasure::PARTS_PER_MILLION)
            .unwrap_or(0.0)
    };
    let translation = [
        value(epsg::X_AXIS_TRANSLATION),
        value(epsg::Y_AXIS_TRANSLATION),
        value(epsg::Z_AXIS_TRANSLATION),
    ];
    match tr.method_code() {
        Some(epsg::GEOCENTRIC_TRANSLATION_GEOG2D)
        | Some(epsg::GEOCENTRIC_TRANSLATION_GEOCENTRIC)
        | Some(epsg::GEOCENTRIC_TRANSLATION_GEOG3D) => {
            let mut values = translation.to_vec();
            values.extend([0.0; 4]);
            f.set_towgs84(Some(values));
        }
        Some(epsg::POSITION_VECTOR_GEOG2D)
        | Some(epsg::POSITION_VECTOR_GEOCENTRIC)
        | Some(epsg::POSITION_VECTOR_GEOG3D) => {
            let mut values = translation.to_vec();
            values.extend([
                rotation(epsg::X_AXIS_ROTATION),
                rotation(epsg::Y_AXIS_ROTATION),
                rotation(epsg::Z_AXIS_ROTATION),
                scale(),
            ]);
            f.set_towgs84(Some(values));
        }
        Some(epsg::COORDINATE_FRAME_GEOG2D)
        | Some(epsg::COORDINATE_FRAME_GEOCENTRIC)
        | Some(epsg::COORDINATE_FRAME_GEOG3D) => {
            let mut values = translation.to_vec();
            values.extend([
                -rotation(epsg::X_AXIS_ROTATION),
                -rotation(epsg::Y_AXIS_ROTATION),
                -rotation(epsg::Z_AXIS_ROTATION),
                scale(),
            ]);
            f.set_towgs84(Some(values));
        }
        Some(epsg::NTV2) => {
            let grid = tr.parameter_filename(epsg::LAT_LON_DIFFERENCE_FILE).ok_or_else(|| {
                GeoError::formatting(format!("变换 '{}' 缺少格网文件", tr.name()))
            })?;
            f.set_nadgrids(Some(grid.to_string()));
        }
        _ => {
            return Err(GeoError::formatting(format!(
                "绑定 CRS 的变换 '{}' 不能表达为 towgs84 或 nadgrids",
                tr.name()
            )))
        }
    }
    let result = export_crs(bound.base(), f);
    f.set_towgs84(None);
    f.set_nadgrids(None);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::pipeline::Convention;

    #[test]
    fn test_geographic_operation_mode() {
        let mut f = PipelineFormatter::new();
        export_crs(&wellknown::epsg_4326(), &mut f).unwrap();
        assert_eq!(
            f.to_pipeline_string(),
            "+proj=pipeline +step +proj=longlat +ellps=WGS84 +step +proj=unitconvert +xy_in=rad +xy_out=deg +step +proj=axisswap +order=2,1"
        );
    }

    #[test]
    fn test_omit_longlat_keeps_non_greenwich() {
        let mut f = PipelineFormatter::new();
        f.set_omit_longlat(true);
        export_crs(&wellknown::ogc_crs84(), &mut f).unwrap();
        assert_eq!(
            f.to_pipeline_string(),
            "+proj=unitconvert +xy_in=rad +xy_out=deg"
        );
    }

    #[test]
    fn test_vertical_crs_string() {
        assert_eq!(
            wellknown::egm96_height().to_proj_crs_string(Convention::Proj5).unwrap(),
            "+vunits=m +no_defs +type=crs"
        );
    }

    #[test]
    fn test_engineering_not_exportable() {
        let crs = wellknown::local_engineering();
        let err = crs.to_proj_crs_string(Convention::Proj5).unwrap_err();
        assert!(err.is_formatting());
    }
}
