//! HTTP gateway serving an account's short links.
//!
//! The router answers `/{shortcode}` with a permanent redirect and exposes
//! the link list as JSON. See [`App::router`].

pub mod app;
pub mod check;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::{AppState, LinkDirectory};
