//! Report designer state: join and field models and the session that ties them together.

pub mod fields;
pub mod joins;
pub mod session;

pub use fields::*;
pub use joins::*;
pub use session::*;
