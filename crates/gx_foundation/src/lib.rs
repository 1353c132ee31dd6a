// geodex\crates\gx_foundation\src/lib.rs

//! Geodex Foundation Layer
//!
//! 基础层，提供整个工作区共享的错误类型与数值工具。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`float`]: 浮点比较与逐位稳定的数值格式化
//!
//! # 示例
//!
//! ```
//! use gx_foundation::{
//!     error::{GxError, GxResult},
//!     float::format_number,
//! };
//!
//! fn zone_text(zone: u8) -> GxResult<String> {
//!     if !(1..=60).contains(&zone) {
//!         return Err(GxError::invalid_input("UTM 带号超出范围"));
//!     }
//!     Ok(format_number(f64::from(zone)))
//! }
//!
//! assert_eq!(zone_text(31).unwrap(), "31");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;

// 重导出常用类型
pub use error::{GxError, GxResult};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{GxError, GxResult};
    pub use crate::float::{approx_eq, approx_eq_rel, format_number};
}
