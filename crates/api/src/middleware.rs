//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use templatehub_common::{config::AuthConfig, token};
use templatehub_core::{CatalogService, IdentityService, MediaService, OrderService, ReviewService};
use templatehub_db::entities::Role;

use crate::extractors::Identity;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub identity_service: IdentityService,
    pub catalog_service: CatalogService,
    pub media_service: MediaService,
    pub order_service: OrderService,
    pub review_service: ReviewService,
    pub auth: AuthConfig,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token into an [`Identity`] in the request
/// extensions. Requests with no token, or an invalid one, just proceed
/// unauthenticated — protected endpoints answer 401 uniformly via the
/// extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(bearer) = auth_str.strip_prefix("Bearer ")
        && let Ok(claims) = token::validate_token(&state.auth, bearer)
        && let Some(role) = Role::parse(&claims.role)
    {
        req.extensions_mut().insert(Identity {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role,
        });
    }

    next.run(req).await
}
