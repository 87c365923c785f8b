//! SQL text for item queries: fixed column lists, filters as bound parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
