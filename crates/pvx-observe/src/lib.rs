//! Logger initialisation for the pvx tools.
mod logger;
pub use logger::*;
