pub mod player;
pub mod prediction;
pub mod value_bet;

pub use player::*;
pub use prediction::*;
pub use value_bet::*;
