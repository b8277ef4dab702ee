mod handler;
mod hub;

pub use handler::ws_handler;
pub use hub::{Hub, LOBBY};
