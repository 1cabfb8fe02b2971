pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod export;
pub mod session;
pub mod util;
