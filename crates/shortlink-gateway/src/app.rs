use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    health_handler, page_recycle_bin_handler, recover_recycle_bin_handler, redirect_handler,
    remove_recycle_bin_handler, save_recycle_bin_handler, title_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .nest(
                "/api/short-link/v1",
                Router::new()
                    .route("/title", get(title_handler))
                    .route("/recycle-bin/save", post(save_recycle_bin_handler))
                    .route("/recycle-bin/recover", post(recover_recycle_bin_handler))
                    .route("/recycle-bin/remove", post(remove_recycle_bin_handler))
                    .route("/recycle-bin/page", get(page_recycle_bin_handler)),
            )
            .route("/{short_uri}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
