pub mod product;
pub mod proxy;

// Re-exports for convenience
pub use product::*;
pub use proxy::*;
