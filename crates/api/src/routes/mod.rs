pub mod health;
pub mod lookup;
pub mod profile;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree (health excluded).
///
/// Route hierarchy:
///
/// ```text
/// /profile/characters                 cached roster (auth)
/// /profile/refresh                    forced refresh (auth)
/// /profile/main                       get main (GET), set main (PUT ?character=) (auth)
///
/// /owners/{owner_id}/main             main character of an owner
/// /characters/{name}                  character by name, with guild
/// /guilds/{name_slug}                 guild by slug
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/profile", profile::router())
        .merge(lookup::router())
}
