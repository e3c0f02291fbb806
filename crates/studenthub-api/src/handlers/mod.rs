pub mod document_tools;
pub mod download;
pub mod image_tools;
pub mod sessions;
pub mod text_tools;

use crate::constants::API_PREFIX;
use axum::{http::StatusCode, response::IntoResponse, Json};
use studenthub_core::models::SessionTicketResponse;
use studenthub_core::SessionTicket;

/// 202 with the ticket the client polls and downloads with
pub(crate) fn accepted(ticket: SessionTicket) -> impl IntoResponse {
    let id = ticket.id.to_string();
    (
        StatusCode::ACCEPTED,
        Json(SessionTicketResponse {
            status_url: format!("{}/sessions/{}", API_PREFIX, id),
            download_url: format!("{}/download/{}", API_PREFIX, id),
            session_id: id,
            expires_at: ticket.expires_at,
        }),
    )
}
