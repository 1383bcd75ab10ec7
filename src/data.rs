pub mod book;
mod loader;
pub mod offer;
pub mod selection;
