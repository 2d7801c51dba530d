//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod agents;
pub mod caisse;
pub mod clients;
pub mod compagnies;
pub mod factures;
pub mod fournisseurs;
pub mod health;

#[cfg(test)]
pub(crate) mod test_support;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(caisse::routes())
        .merge(fournisseurs::routes())
        .merge(clients::routes())
        .merge(agents::routes())
        .merge(factures::routes())
        .merge(compagnies::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
