//! Navigation menu handler.

use axum::{extract::Extension, response::Json, routing::get, Router};

use crate::api::AppState;
use crate::domain::{build_menu, MenuItem, Principal};

pub fn menu_routes() -> Router<AppState> {
    Router::new().route("/", get(get_menu))
}

/// Menu entries visible to the caller
#[utoipa::path(
    get,
    path = "/api/menu",
    tag = "Menu",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visible navigation tree", body = Vec<MenuItem>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_menu(Extension(principal): Extension<Principal>) -> Json<Vec<MenuItem>> {
    Json(build_menu(&principal.permissions))
}
