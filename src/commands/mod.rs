pub mod config;
pub mod link;
pub mod providers;
pub mod render;
