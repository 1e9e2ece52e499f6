//! Preview query assembly: request shape, pagination and SQL rendering for display.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
