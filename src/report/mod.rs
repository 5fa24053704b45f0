pub mod types;
pub mod confidence;
pub mod severity;
pub mod classify;
pub mod normalize;

pub use types::*;
pub use confidence::*;
pub use severity::*;
pub use classify::*;
pub use normalize::*;
