// geodex\crates\gx_geo\src\datum\mod.rs
//! 基准模型：椭球、本初子午线、参考框架与基准集合

mod ellipsoid;
mod ensemble;
mod frames;
mod prime_meridian;

pub use ellipsoid::{Ellipsoid, EllipsoidShape};
pub use ensemble::DatumEnsemble;
pub use frames::{Datum, DatumKind};
pub use prime_meridian::{well_known_meridian_name, PrimeMeridian};

pub(crate) use prime_meridian::add_pm_param;
