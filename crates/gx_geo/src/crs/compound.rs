// geodex\crates\gx_geo\src\crs\compound.rs
//! 复合 CRS

use super::{Crs, CrsKind};
use crate::error::{GeoError, GeoResult};
use crate::metadata::ObjectMeta;
use std::sync::Arc;

/// 复合 CRS 的分量（已展平）
#[derive(Debug, Clone)]
pub struct CompoundCrs {
    components: Vec<Arc<Crs>>,
}

impl CompoundCrs {
    /// 分量
    pub fn components(&self) -> &[Arc<Crs>] {
        &self.components
    }

    /// 水平分量
    pub fn horizontal(&self) -> &Arc<Crs> {
        &self.components[0]
    }
}

/// 不做校验的内部构造
pub(super) fn from_components(meta: ObjectMeta, components: Vec<Arc<Crs>>) -> Arc<Crs> {
    Crs::from_kind(meta, CrsKind::Compound(CompoundCrs { components }))
}

impl Crs {
    /// 创建复合 CRS
    ///
    /// 嵌套的复合分量被展平；展平后至少两个分量。
    pub fn compound(meta: ObjectMeta, components: Vec<Arc<Crs>>) -> GeoResult<Arc<Crs>> {
        let mut flat = Vec::with_capacity(components.len());
        for component in components {
            match component.as_compound() {
                Some(nested) => flat.extend(nested.components().iter().cloned()),
                None => flat.push(component),
            }
        }
        GeoError::check_construction(flat.len() >= 2, "复合 CRS", || {
            format!("'{}' 至少需要两个分量，实际 {}", meta.name, flat.len())
        })?;
        Ok(from_components(meta, flat))
    }

    /// 分量；非复合 CRS 返回空切片
    pub fn components(&self) -> &[Arc<Crs>] {
        self.as_compound().map_or(&[], CompoundCrs::components)
    }
}
