pub mod config;
pub mod download;

pub use config::handle_config;
pub use download::{GetArgs, handle_get};
