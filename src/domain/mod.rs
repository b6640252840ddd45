pub mod curve;
pub mod measurement;
pub mod panel;
pub mod power;
pub mod types;

pub use curve::*;
pub use measurement::*;
pub use panel::*;
pub use types::*;
