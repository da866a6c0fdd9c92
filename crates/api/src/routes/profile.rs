use axum::routing::get;
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/profile`.
///
/// ```text
/// GET    /characters       -> get_characters
/// GET    /refresh          -> refresh_characters
/// GET    /main             -> get_main
/// PUT    /main             -> set_main
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/characters", get(profile::get_characters))
        .route("/refresh", get(profile::refresh_characters))
        .route("/main", get(profile::get_main).put(profile::set_main))
}
