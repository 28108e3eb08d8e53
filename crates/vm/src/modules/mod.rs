//! Built-in modules

pub mod aragonos;
pub mod standard;

pub use aragonos::AragonOs;
pub use standard::Standard;
