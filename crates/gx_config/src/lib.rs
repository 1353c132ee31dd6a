// crates/gx_config/src/lib.rs

//! Geodex Config Layer
//!
//! 配置层，提供坐标操作搜索参数的可序列化描述。
//! 运行时上下文（`gx_geo::context::OperationContext`）由这里的
//! [`SearchConfig`] 构建。
//!
//! # 模块概览
//!
//! - [`search_config`]: 搜索参数及其枚举策略
//! - [`error`]: 配置错误类型
//!
//! # 示例
//!
//! ```
//! use gx_config::{SearchConfig, IntermediateCrsUse};
//!
//! let config = SearchConfig::from_json_str(r#"{ "desired_accuracy": 1.0 }"#).unwrap();
//! assert_eq!(config.desired_accuracy, Some(1.0));
//! assert_eq!(config.intermediate_crs_use, IntermediateCrsUse::IfNoDirectTransformation);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod search_config;

// 重导出核心类型
pub use error::ConfigError;
pub use search_config::{
    AreaOfInterest, GridAvailabilityUse, IntermediateCrsUse, SearchConfig,
    SourceTargetExtentUse, SpatialCriterion,
};
