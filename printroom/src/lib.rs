pub mod cli;
pub mod http_store;
pub mod load_config;
pub mod print_host;

pub use cli::{run, Cli, Commands};
