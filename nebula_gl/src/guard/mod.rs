/// Guard module - error-checked driver calls

pub mod error_guard;

pub use error_guard::*;
