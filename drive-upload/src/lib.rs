pub mod auth;
pub mod cli;
pub mod drive;
pub mod inputs;
pub mod load_config;
pub mod logging;
