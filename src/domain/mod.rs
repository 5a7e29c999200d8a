pub mod booking;
pub mod ground;
pub mod slot;

pub use booking::*;
pub use ground::*;
pub use slot::*;
