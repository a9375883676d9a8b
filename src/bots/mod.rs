pub mod api;
pub use api::*;

pub mod bot;
pub use bot::*;

pub mod builtin;
pub use builtin::*;
