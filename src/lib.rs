pub mod config;
pub mod synthesis;
pub mod version;
