//! Web server: serves the browser chat page and the JSON API it polls.

mod protocol;
mod server;

pub use protocol::{SendParams, StatusView};
pub use server::run_server;
