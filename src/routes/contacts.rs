/**
 * Contact Routes
 * Public inquiry submission and the admin inbox
 */
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::db::models::{Contact, NewContact};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /api/contacts
pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    let full_name = payload.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }

    let contact = state
        .store
        .create_contact(NewContact {
            full_name,
            phone: optional(payload.phone),
            email: optional(payload.email),
            note: optional(payload.note),
        })
        .await?;

    tracing::info!("Contact inquiry received: {}", contact.id);
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /api/admin/contacts - newest first
pub async fn list_contacts(State(state): State<AppState>) -> Result<Json<Vec<Contact>>, AppError> {
    Ok(Json(state.store.list_contacts().await?))
}

#[cfg(test)]
mod tests {
    use crate::create_app;
    use crate::routes::testing::{self, admin_state, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_public_submit_then_admin_lists_newest_first() {
        let (state, token) = admin_state().await;
        for name in ["First", "Second"] {
            let body = json!({ "fullName": name, "phone": "0900 000 000", "email": "" });
            let (status, created) =
                send(create_app(state.clone()), testing::json("POST", "/api/contacts", None, &body)).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(created["status"], "pending");
            assert!(created["email"].is_null());
        }

        let (status, list) = send(
            create_app(state),
            testing::authed("GET", "/api/admin/contacts", &token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["fullName"], "Second");
        assert_eq!(list[1]["fullName"], "First");
    }

    #[tokio::test]
    async fn test_full_name_required() {
        let state = testing::state();
        let body = json!({ "fullName": "  ", "email": "a@b.c" });
        let (status, response) =
            send(create_app(state), testing::json("POST", "/api/contacts", None, &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Full name is required");
    }

    #[tokio::test]
    async fn test_email_is_stored_as_given() {
        let state = testing::state();
        let body = json!({ "fullName": "Lan", "email": "zalo 0900" });
        let (status, created) =
            send(create_app(state), testing::json("POST", "/api/contacts", None, &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["email"], "zalo 0900");
    }
}
