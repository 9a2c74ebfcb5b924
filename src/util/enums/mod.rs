pub mod axis;
pub mod motion_state;
pub mod repeat;

pub use axis::*;
pub use motion_state::*;
pub use repeat::*;
