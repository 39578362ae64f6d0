pub mod cache;
pub mod core;
pub mod schema;
pub mod status;
pub mod sync;

pub use cache::CachedDataSource;
pub use core::*;
