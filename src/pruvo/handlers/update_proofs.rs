use crate::supabase::{self, ProofId};
use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdateProofs {
    email: String,
    #[schema(value_type = Vec<i64>)]
    proofs: Vec<ProofId>,
}

#[utoipa::path(
    post,
    path= "/update-proofs",
    responses (
        (status = 200, description = "Stored set replaced with the validated ids", body = [UpdateProofs], content_type = "application/json"),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing email"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Store failure"),
    ),
    tag= "update-proofs"
)]
// axum handler for update-proofs
#[instrument(skip_all)]
pub async fn update_proofs(
    store: Extension<supabase::Client>,
    payload: Option<Json<UpdateProofs>>,
) -> (StatusCode, Json<Value>) {
    let UpdateProofs { email, proofs } = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid input"})));
        }
    };

    debug!("update-proofs for {}: {:?}", email, proofs);

    if email.is_empty() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "User must be logged in"})),
        );
    }

    match store.find_user(&email).await {
        Ok(Some(_)) => (),
        Ok(None) => {
            return (StatusCode::NOT_FOUND, Json(json!({"error": "User not found"})));
        }
        Err(e) => {
            error!("Error checking existing user: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("Failed to check user existence: {e}")})),
            );
        }
    }

    // unknown ids are dropped, never stored
    let valid = match store.existing_proofs(&proofs).await {
        Ok(valid) => valid,
        Err(e) => {
            error!("Error fetching proof templates: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("Failed to fetch proof templates: {e}")})),
            );
        }
    };

    // full replace, an empty validated list clears the stored set
    match store.update_proofs(&email, &valid).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": "Proofs updated successfully",
                "proofs": valid.iter().map(ToString::to_string).collect::<Vec<_>>(),
            })),
        ),
        Err(e) => {
            error!("Error updating proofs: {:?}", e);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("Failed to update proofs: {e}")})),
            )
        }
    }
}
