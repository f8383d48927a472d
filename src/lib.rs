pub mod api;
pub mod config;
pub mod error;
pub mod location;
pub mod schedule;
pub mod test;
pub mod time;
pub mod utils;
