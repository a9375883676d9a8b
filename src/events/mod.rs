pub mod event;
pub use event::*;

pub mod sink;
pub use sink::*;
