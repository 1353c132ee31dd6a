// geodex\crates\gx_geo\src\registry.rs
//! 权威注册表查询接口
//!
//! 操作工厂通过 [`Registry`] 查询已知的 CRS 与坐标操作。
//! 实际的数据库后端在外部实现；[`InMemoryRegistry`] 是用构建器填充的内存实现，
//! 供测试和嵌入式场景使用。
//!
//! 工厂把查询失败记录为警告并视为没有候选，不会中断搜索。

use crate::crs::{wellknown, Crs};
use crate::datum::Datum;
use crate::error::GeoError;
use crate::metadata::{names_equivalent, Identifier};
use crate::operation::CoordinateOperation;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// 注册表查询错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// 对象不存在
    #[error("注册表中不存在: {what}")]
    NotFound {
        /// 查询的对象
        what: String,
    },

    /// 后端失败
    #[error("注册表后端错误: {0}")]
    Backend(String),
}

impl RegistryError {
    /// 创建未找到错误
    #[inline]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// 附上权威名称转换为 [`GeoError`]
    pub fn into_geo(self, authority: &str) -> GeoError {
        GeoError::registry_lookup(authority, self.to_string())
    }
}

/// 注册表查询结果
pub type RegistryResult<T> = Result<T, RegistryError>;

/// 权威注册表
pub trait Registry: Send + Sync {
    /// 权威名称（如 "EPSG"）
    fn authority(&self) -> &str;

    /// 源、目标标识之间登记的操作（只查正向）
    fn operations_between(
        &self,
        source: &Identifier,
        target: &Identifier,
    ) -> RegistryResult<Vec<Arc<CoordinateOperation>>>;

    /// 以该 CRS 为源或目标的全部操作（用于寻找枢纽 CRS）
    fn operations_involving(&self, crs: &Identifier) -> RegistryResult<Vec<Arc<CoordinateOperation>>>;

    /// 按标识查 CRS
    fn crs_by_identifier(&self, id: &Identifier) -> RegistryResult<Arc<Crs>>;

    /// 按名称查 CRS；`approximate` 时做归一化及包含匹配
    fn crs_by_name(&self, name: &str, approximate: bool) -> RegistryResult<Vec<Arc<Crs>>>;

    /// 基准集合的成员
    fn ensemble_members(&self, ensemble: &Identifier) -> RegistryResult<Vec<Arc<Datum>>>;

    /// 别名解析为正式名称
    fn resolve_alias(&self, alias: &str, dialect: &str) -> RegistryResult<Option<String>>;
}

// ============================================================================
// 内存实现
// ============================================================================

fn endpoint_id(crs: Option<Arc<Crs>>, authority: &str) -> Option<Identifier> {
    let crs = crs?;
    crs.meta.identifier_in(authority).cloned()
}

/// 构建器填充的内存注册表
#[derive(Debug, Clone)]
pub struct InMemoryRegistry {
    authority: String,
    crs: Vec<Arc<Crs>>,
    operations: Vec<Arc<CoordinateOperation>>,
    ensembles: HashMap<Identifier, Vec<Arc<Datum>>>,
    aliases: Vec<(String, String, String)>,
}

impl InMemoryRegistry {
    /// 空注册表
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            crs: Vec::new(),
            operations: Vec::new(),
            ensembles: HashMap::new(),
            aliases: Vec::new(),
        }
    }

    /// 预置常用 EPSG CRS 的注册表
    pub fn with_epsg_defaults() -> Self {
        Self::new("EPSG")
            .with_crs(wellknown::epsg_4326())
            .with_crs(wellknown::epsg_4979())
            .with_crs(wellknown::epsg_4978())
            .with_crs(wellknown::epsg_4807())
            .with_crs(wellknown::egm96_height())
    }

    /// 登记 CRS
    #[must_use]
    pub fn with_crs(mut self, crs: Arc<Crs>) -> Self {
        self.crs.push(crs);
        self
    }

    /// 登记操作；源和目标 CRS 同时登记
    #[must_use]
    pub fn with_operation(mut self, op: Arc<CoordinateOperation>) -> Self {
        for crs in [op.source_crs(), op.target_crs()].into_iter().flatten() {
            if !self.crs.iter().any(|c| Arc::ptr_eq(c, &crs)) {
                self.crs.push(crs);
            }
        }
        self.operations.push(op);
        self
    }

    /// 登记基准集合成员
    #[must_use]
    pub fn with_ensemble(mut self, id: Identifier, members: Vec<Arc<Datum>>) -> Self {
        self.ensembles.insert(id, members);
        self
    }

    /// 登记别名
    #[must_use]
    pub fn with_alias(
        mut self,
        alias: impl Into<String>,
        dialect: impl Into<String>,
        official: impl Into<String>,
    ) -> Self {
        self.aliases.push((alias.into(), dialect.into(), official.into()));
        self
    }

    /// 已登记的 CRS
    pub fn crs_list(&self) -> &[Arc<Crs>] {
        &self.crs
    }

    /// 已登记的操作
    pub fn operations(&self) -> &[Arc<CoordinateOperation>] {
        &self.operations
    }
}

impl Registry for InMemoryRegistry {
    fn authority(&self) -> &str {
        &self.authority
    }

    fn operations_between(
        &self,
        source: &Identifier,
        target: &Identifier,
    ) -> RegistryResult<Vec<Arc<CoordinateOperation>>> {
        Ok(self
            .operations
            .iter()
            .filter(|op| {
                endpoint_id(op.source_crs(), &self.authority).as_ref() == Some(source)
                    && endpoint_id(op.target_crs(), &self.authority).as_ref() == Some(target)
            })
            .cloned()
            .collect())
    }

    fn operations_involving(&self, crs: &Identifier) -> RegistryResult<Vec<Arc<CoordinateOperation>>> {
        Ok(self
            .operations
            .iter()
            .filter(|op| {
                endpoint_id(op.source_crs(), &self.authority).as_ref() == Some(crs)
                    || endpoint_id(op.target_crs(), &self.authority).as_ref() == Some(crs)
            })
            .cloned()
            .collect())
    }

    fn crs_by_identifier(&self, id: &Identifier) -> RegistryResult<Arc<Crs>> {
        self.crs
            .iter()
            .find(|c| c.meta.identifiers.contains(id))
            .cloned()
            .ok_or_else(|| RegistryError::not_found(id.to_string()))
    }

    fn crs_by_name(&self, name: &str, approximate: bool) -> RegistryResult<Vec<Arc<Crs>>> {
        let wanted = crate::metadata::normalize_name(name);
        Ok(self
            .crs
            .iter()
            .filter(|c| {
                if approximate {
                    let have = crate::metadata::normalize_name(c.name());
                    have == wanted || have.contains(&wanted)
                } else {
                    c.name() == name
                }
            })
            .cloned()
            .collect())
    }

    fn ensemble_members(&self, ensemble: &Identifier) -> RegistryResult<Vec<Arc<Datum>>> {
        self.ensembles
            .get(ensemble)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(ensemble.to_string()))
    }

    fn resolve_alias(&self, alias: &str, dialect: &str) -> RegistryResult<Option<String>> {
        Ok(self
            .aliases
            .iter()
            .find(|(a, d, _)| names_equivalent(a, alias) && (dialect.is_empty() || d == dialect))
            .map(|(_, _, official)| official.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ObjectMeta, PositionalAccuracy};

    fn registry() -> InMemoryRegistry {
        let op = CoordinateOperation::create_geocentric_translations(
            ObjectMeta::named("NTF (Paris) to WGS 84 (1)").with_epsg(8094),
            wellknown::epsg_4807(),
            wellknown::epsg_4326(),
            -168.0,
            -60.0,
            320.0,
            Some(PositionalAccuracy::new(2.0).unwrap()),
        );
        InMemoryRegistry::with_epsg_defaults()
            .with_operation(op)
            .with_alias("WGS_1984", "ESRI", "World Geodetic System 1984")
    }

    #[test]
    fn test_operations_between_is_directional() {
        let reg = registry();
        let fwd = reg
            .operations_between(&Identifier::epsg(4807), &Identifier::epsg(4326))
            .unwrap();
        assert_eq!(fwd.len(), 1);
        let back = reg
            .operations_between(&Identifier::epsg(4326), &Identifier::epsg(4807))
            .unwrap();
        assert!(back.is_empty());
        assert_eq!(reg.operations_involving(&Identifier::epsg(4326)).unwrap().len(), 1);
    }

    #[test]
    fn test_crs_lookup() {
        let reg = registry();
        let crs = reg.crs_by_identifier(&Identifier::epsg(4807)).unwrap();
        assert_eq!(crs.name(), "NTF (Paris)");
        match reg.crs_by_identifier(&Identifier::epsg(1)) {
            Err(RegistryError::NotFound { what }) => assert_eq!(what, "EPSG:1"),
            _ => panic!("错误的错误类型"),
        }
        assert_eq!(reg.crs_by_name("WGS 84", false).unwrap().len(), 3);
        assert_eq!(reg.crs_by_name("ntf", true).unwrap().len(), 1);
    }

    #[test]
    fn test_alias_and_ensemble() {
        let reg = registry().with_ensemble(
            Identifier::epsg(6326),
            vec![wellknown::datum_wgs84()],
        );
        assert_eq!(
            reg.resolve_alias("wgs_1984", "ESRI").unwrap().as_deref(),
            Some("World Geodetic System 1984")
        );
        assert_eq!(reg.resolve_alias("wgs_1984", "OGC").unwrap(), None);
        assert_eq!(reg.ensemble_members(&Identifier::epsg(6326)).unwrap().len(), 1);
        assert!(reg.ensemble_members(&Identifier::epsg(1)).is_err());
    }

    #[test]
    fn test_error_conversion() {
        let err = RegistryError::Backend("连接断开".into()).into_geo("EPSG");
        match &err {
            GeoError::RegistryLookup { authority, .. } => assert_eq!(authority, "EPSG"),
            _ => panic!("错误的错误类型"),
        }
    }
}
