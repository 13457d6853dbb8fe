//! Resource pool and the errors raised while allocating from it.

pub mod error;
pub mod pool;

pub use error::ResourceError;
pub use pool::ResourcePool;
