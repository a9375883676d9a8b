pub mod repository;
pub use repository::*;

pub mod server;
pub use server::*;

pub mod table;
pub use table::*;
