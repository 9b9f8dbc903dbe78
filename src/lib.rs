pub mod config;
pub mod fetch;
pub mod load;
pub mod page;
pub mod render;
