// geodex\crates\gx_geo\src\crs\identify.rs
//! 在注册表中识别 CRS

use super::Crs;
use crate::equivalence::{Criterion, Equivalence};
use crate::metadata::names_equivalent;
use crate::registry::Registry;
use std::sync::Arc;

/// 等价且同名
pub const CONFIDENCE_EXACT: u8 = 100;
/// 等价
pub const CONFIDENCE_EQUIVALENT: u8 = 90;
/// 只有名称相同
pub const CONFIDENCE_NAME_ONLY: u8 = 70;

fn push(crs: Arc<Crs>, list: &mut Vec<Arc<Crs>>) {
    if !list.iter().any(|c| Arc::ptr_eq(c, &crs)) {
        list.push(crs);
    }
}

impl Crs {
    /// 在注册表中查找与自身对应的 CRS，附带置信度（百分比），按置信度降序
    ///
    /// 绑定 CRS 按其基础 CRS 识别。注册表错误记录为警告并忽略。
    pub fn identify(self: &Arc<Self>, registry: &dyn Registry) -> Vec<(Arc<Crs>, u8)> {
        if let Some(bound) = self.as_bound() {
            return bound.base().identify(registry);
        }
        let mut candidates: Vec<Arc<Crs>> = Vec::new();
        for id in self
            .meta
            .identifiers
            .iter()
            .filter(|id| id.in_codespace(registry.authority()))
        {
            match registry.crs_by_identifier(id) {
                Ok(crs) => push(crs, &mut candidates),
                Err(err) => log::warn!("识别 '{}' 时按标识 {id} 查询失败: {err}", self.name()),
            }
        }
        match registry.crs_by_name(self.name(), true) {
            Ok(found) => {
                for crs in found {
                    push(crs, &mut candidates);
                }
            }
            Err(err) => log::warn!("识别 '{}' 时按名称查询失败: {err}", self.name()),
        }

        let mut scored: Vec<(Arc<Crs>, u8)> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let same_name = names_equivalent(candidate.name(), self.name());
                let equivalent = self.is_equivalent_to(&candidate, Criterion::Equivalent);
                let confidence = match (equivalent, same_name) {
                    (true, true) => CONFIDENCE_EXACT,
                    (true, false) => CONFIDENCE_EQUIVALENT,
                    (false, true) => CONFIDENCE_NAME_ONLY,
                    (false, false) => return None,
                };
                log::trace!("候选 '{}' 置信度 {confidence}", candidate.name());
                Some((candidate, confidence))
            })
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::registry::InMemoryRegistry;

    #[test]
    fn test_identify_by_identifier() {
        let registry = InMemoryRegistry::with_epsg_defaults();
        let found = wellknown::epsg_4807().identify(&registry);
        assert_eq!(found[0].1, CONFIDENCE_EXACT);
        assert_eq!(found[0].0.name(), "NTF (Paris)");
    }

    #[test]
    fn test_identify_renamed_and_same_name() {
        let registry = InMemoryRegistry::with_epsg_defaults();
        // 改名后标识被清空，只能靠名称找
        let renamed = wellknown::epsg_4979().alter_name("WGS 84");
        let found = renamed.identify(&registry);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].1, CONFIDENCE_EXACT);
        assert!(Arc::ptr_eq(&found[0].0, &wellknown::epsg_4979()));
        assert!(found[1..].iter().all(|(_, c)| *c == CONFIDENCE_NAME_ONLY));
    }

    #[test]
    fn test_identify_bound_uses_base() {
        let registry = InMemoryRegistry::with_epsg_defaults();
        let bound =
            Crs::create_bound_to_wgs84(wellknown::epsg_4807(), &[-168.0, -60.0, 320.0]).unwrap();
        assert_eq!(bound.identify(&registry)[0].1, CONFIDENCE_EXACT);
        let unknown = wellknown::local_engineering().alter_name("nowhere");
        assert!(unknown.identify(&registry).is_empty());
    }
}
