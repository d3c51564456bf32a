//! Live reload: WebSocket broadcast to browsers viewing the dev server.

mod message;
mod server;

pub use message::ReloadMessage;
pub use server::ReloadHandle;
