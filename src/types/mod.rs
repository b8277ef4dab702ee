pub mod game;
pub mod rewards;
pub mod room;
pub mod ws;

pub use game::*;
pub use rewards::*;
pub use room::*;
pub use ws::*;
