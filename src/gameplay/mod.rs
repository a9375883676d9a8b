pub mod aggregate;
pub use aggregate::*;

pub mod game;
pub use game::*;

pub mod player;
pub use player::*;

pub mod resolve;
pub use resolve::*;

pub mod round;
pub use round::*;

pub mod rules;
pub use rules::*;

pub mod winners;
pub use winners::*;
