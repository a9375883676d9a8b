pub mod card;
pub use card::*;

pub mod character;
pub use character::*;
