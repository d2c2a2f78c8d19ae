mod health;
mod links;

pub use health::{favicon_handler, health_handler};
pub use links::{api_links_handler, index_handler, redirect_handler};
