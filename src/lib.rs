pub mod config;
pub mod errors;
pub mod logger;
pub mod webserver;
pub mod ws;
