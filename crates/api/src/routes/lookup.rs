use axum::routing::get;
use axum::Router;

use crate::handlers::lookup;
use crate::state::AppState;

/// Public lookup routes, mounted at the root.
///
/// ```text
/// GET    /owners/{owner_id}/main   -> owner_main
/// GET    /characters/{name}        -> character_by_name
/// GET    /guilds/{name_slug}       -> guild_by_slug
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/owners/{owner_id}/main", get(lookup::owner_main))
        .route("/characters/{name}", get(lookup::character_by_name))
        .route("/guilds/{name_slug}", get(lookup::guild_by_slug))
}
