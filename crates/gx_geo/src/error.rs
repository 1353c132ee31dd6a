// geodex\crates\gx_geo\src\error.rs
//! 坐标参考系统与坐标操作错误类型
//!
//! 包含对象构造、管线格式化、注册表查询和操作搜索相关的错误。
//! 所有错误可转换为 `gx_foundation::GxError` 向上传播。
//!
//! # 错误分类
//!
//! - **构造错误**：违反对象不变量（如同时给出基准和基准集合）
//! - **格式化错误**：对象无法表达为管线字符串
//! - **查询错误**：注册表后端失败
//! - **搜索错误**：两个 CRS 之间找不到任何操作
//! - **基础错误**：IO 等（来自 Foundation）

use gx_foundation::GxError;
use thiserror::Error;

/// Geo 模块结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 坐标参考系统处理错误
#[derive(Error, Debug)]
pub enum GeoError {
    /// 对象构造违反不变量
    #[error("无效的{what}构造: {reason}")]
    InvalidConstruction {
        /// 被构造的对象类别（如 "CRS"、"基准集合"）
        what: &'static str,
        /// 失败原因
        reason: String,
    },

    /// 管线字符串格式化失败
    #[error("管线格式化失败: {reason}")]
    Formatting {
        /// 失败原因
        reason: String,
    },

    /// 找不到坐标操作
    #[error("找不到从 '{source_name}' 到 '{target_name}' 的坐标操作")]
    NoOperationFound {
        /// 源 CRS 名称
        source_name: String,
        /// 目标 CRS 名称
        target_name: String,
    },

    /// 注册表查询失败
    #[error("注册表查询失败 [{authority}]: {message}")]
    RegistryLookup {
        /// 权威机构
        authority: String,
        /// 错误详情
        message: String,
    },

    /// 参数无效或缺失
    #[error("参数 '{name}' 无效: {reason}")]
    InvalidParameter {
        /// 参数名
        name: String,
        /// 失败原因
        reason: String,
    },

    /// 基础层错误（向下聚合）
    #[error("基础层错误: {0}")]
    Foundation(#[from] GxError),
}

// ============================================================================
// 转换实现
// ============================================================================

impl From<GeoError> for GxError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::InvalidConstruction { what, reason } => {
                GxError::invalid_input(format!("无效的{what}构造: {reason}"))
            }
            GeoError::Formatting { reason } => {
                GxError::operation(format!("管线格式化失败: {reason}"))
            }
            GeoError::NoOperationFound {
                source_name,
                target_name,
            } => GxError::not_found(format!("坐标操作 {source_name} -> {target_name}")),
            GeoError::RegistryLookup { authority, message } => {
                GxError::registry(format!("[{authority}] {message}"))
            }
            GeoError::InvalidParameter { name, reason } => {
                GxError::invalid_input(format!("参数 '{name}' 无效: {reason}"))
            }
            GeoError::Foundation(err) => err,
        }
    }
}

// ============================================================================
// 便捷构造函数
// ============================================================================

impl GeoError {
    /// 创建对象构造错误
    #[inline]
    pub fn invalid_construction(what: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConstruction {
            what,
            reason: reason.into(),
        }
    }

    /// 创建格式化错误
    #[inline]
    pub fn formatting(reason: impl Into<String>) -> Self {
        Self::Formatting {
            reason: reason.into(),
        }
    }

    /// 创建操作未找到错误
    #[inline]
    pub fn no_operation_found(source_name: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self::NoOperationFound {
            source_name: source_name.into(),
            target_name: target_name.into(),
        }
    }

    /// 创建注册表查询错误
    #[inline]
    pub fn registry_lookup(authority: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RegistryLookup {
            authority: authority.into(),
            message: message.into(),
        }
    }

    /// 创建参数错误
    #[inline]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// 是否为格式化错误
    #[inline]
    pub fn is_formatting(&self) -> bool {
        matches!(self, Self::Formatting { .. })
    }
}

// ============================================================================
// 验证辅助方法
// ============================================================================

impl GeoError {
    /// 条件不满足时返回构造错误
    #[inline]
    pub fn check_construction(
        cond: bool,
        what: &'static str,
        reason: impl FnOnce() -> String,
    ) -> GeoResult<()> {
        if cond {
            Ok(())
        } else {
            Err(Self::invalid_construction(what, reason()))
        }
    }

    /// 检查参数为有限值
    #[inline]
    pub fn check_finite(name: &str, value: f64) -> GeoResult<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::invalid_parameter(name, format!("非有限值 {value}")))
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
