//! Process-wide state shared by the dev server and the watcher.

mod state;

pub use state::{
    begin_update, end_update, is_busy, is_shutdown, register_server, request_shutdown,
    setup_shutdown_handler,
};
