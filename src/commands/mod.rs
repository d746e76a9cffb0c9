pub mod config;
mod check;
mod list;
mod render;
mod resolve;

pub use check::check;
pub use list::list;
pub use render::render;
pub use resolve::resolve;
