pub mod commands;
pub mod definition;
pub mod platform;
pub mod render;
pub mod resolver;
pub mod runtime;
pub mod smoke;
