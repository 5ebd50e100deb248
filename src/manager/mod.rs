pub mod api;
pub mod client;
pub mod types;

pub use api::{ConfigReader, ConfigWriter};
pub use client::ManagerClient;
pub use types::{PolicyKind, ServerInfo};
