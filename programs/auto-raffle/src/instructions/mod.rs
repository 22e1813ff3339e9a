pub use create_raffle::*;
pub use enter_raffle::*;
pub use perform_upkeep::*;
pub use reveal_winner::*;

pub mod create_raffle;
pub mod enter_raffle;
pub mod perform_upkeep;
pub mod reveal_winner;
