//! HTTP surface of the short-link service.
//!
//! - `GET  /{short_uri}`: redirect (302) or 404
//! - `POST /api/short-link/v1/recycle-bin/{save,recover,remove}`
//! - `GET  /api/short-link/v1/recycle-bin/page`
//! - `GET  /api/short-link/v1/title`
//! - `GET  /health`

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::{AppError, Result};
pub use state::AppState;
