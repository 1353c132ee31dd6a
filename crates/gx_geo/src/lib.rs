// geodex\crates\gx_geo\src\lib.rs

//! Geodex Geo Layer
//!
//! 坐标参考系统（CRS）模型与坐标操作合成。
//!
//! 给定源与目标 CRS，[`CoordinateOperationFactory`] 枚举可行的坐标操作
//! （转换、变换及其串联），按上下文过滤排序，并可导出为 PROJ 风格的
//! 管线字符串。本层不执行坐标计算。
//!
//! # 模块概览
//!
//! - [`units`]、[`cs`]: 计量单位、坐标轴与坐标系
//! - [`datum`]: 椭球、本初子午线、基准与基准集合
//! - [`crs`]: CRS 和类型及常用 CRS
//! - [`operation`]: 坐标操作模型、取逆与串联
//! - [`factory`]: 操作合成、排序与去重
//! - [`context`]: 搜索上下文
//! - [`registry`]、[`grid`]: 权威注册表与格网信息接口
//! - [`pipeline`]: 管线字符串格式化与优化
//! - [`equivalence`]: 结构等价比较
//!
//! # 示例
//!
//! ```
//! use gx_geo::prelude::*;
//! use gx_geo::crs::wellknown;
//!
//! let factory = CoordinateOperationFactory::new();
//! let ctx = OperationContext::new();
//! let op = factory
//!     .create_operation(&wellknown::epsg_4326(), &wellknown::ogc_crs84(), &ctx)
//!     .unwrap();
//! assert_eq!(op.name(), "axis order change (2D)");
//! assert_eq!(op.to_pipeline_string().unwrap(), "+proj=axisswap +order=2,1");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod crs;
pub mod cs;
pub mod datum;
pub mod equivalence;
pub mod error;
pub mod factory;
pub mod grid;
pub mod metadata;
pub mod operation;
pub mod pipeline;
pub mod registry;
pub mod units;

// 重导出核心类型
pub use context::OperationContext;
pub use crs::Crs;
pub use equivalence::{Criterion, Equivalence};
pub use error::{GeoError, GeoResult};
pub use factory::CoordinateOperationFactory;
pub use operation::CoordinateOperation;
pub use registry::{InMemoryRegistry, Registry};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::context::{
        GridAvailabilityUse, IntermediateCrsUse, OperationContext, SourceTargetExtentUse,
        SpatialCriterion,
    };
    pub use crate::crs::{Crs, GeoidModel};
    pub use crate::cs::{AxisDirection, CoordinateSystem};
    pub use crate::datum::{Datum, Ellipsoid, PrimeMeridian};
    pub use crate::equivalence::{Criterion, Equivalence};
    pub use crate::error::{GeoError, GeoResult};
    pub use crate::factory::CoordinateOperationFactory;
    pub use crate::grid::{GridDescription, GridResolver, InMemoryGridResolver};
    pub use crate::metadata::{GeographicBoundingBox, Identifier, ObjectMeta, PositionalAccuracy};
    pub use crate::operation::CoordinateOperation;
    pub use crate::pipeline::Convention;
    pub use crate::registry::{InMemoryRegistry, Registry};
    pub use crate::units::{Measure, UnitOfMeasure};
}
