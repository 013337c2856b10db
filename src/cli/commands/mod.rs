pub mod config;
pub mod generate;
pub mod kinds;
pub mod show;
