//! Find out whether a Minecraft: Java Edition server is up, what it says about
//! itself in the server list, and whether it's in online mode, without fully
//! logging in.

pub mod config;
pub mod error;
pub mod protocol;
pub mod query;
pub mod status;
pub mod terminal_colors;
pub mod tracing;

pub use config::QueryConfig;
pub use error::{Error, Result};
pub use query::{OnlineMode, ServerQuery};
pub use status::StatusResponse;
