use crate::error::ApiError;
use crate::models::{ContactsResponse, SearchContactsRequest};
use crate::services::contacts;
use crate::state::AppState;
use axum::{extract::State, response::Json};
use std::sync::Arc;

pub async fn search_contacts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchContactsRequest>,
) -> Result<Json<ContactsResponse>, ApiError> {
    let conn = state.store_conn()?;
    let contacts = contacts::search_contacts(&conn, &req.query)?;
    Ok(Json(ContactsResponse {
        success: true,
        contacts,
    }))
}
