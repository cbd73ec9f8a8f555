use crate::{pruvo::password, supabase};
use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Login {
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path= "/login",
    responses (
        (status = 200, description = "Login successful", body = [Login], content_type = "application/json"),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unknown email or incorrect password"),
        (status = 500, description = "Store failure"),
    ),
    tag= "login"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    store: Extension<supabase::Client>,
    payload: Option<Json<Login>>,
) -> (StatusCode, Json<Value>) {
    let Login { email, password } = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid input"})));
        }
    };

    debug!("login attempt: {}", email);

    if email.is_empty() || password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Email and password are required"})),
        );
    }

    let user = match store.find_user(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "No account found with this email. Please sign up first."
                })),
            );
        }
        Err(e) => {
            error!("Error checking existing user: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("Failed to check user existence: {e}")})),
            );
        }
    };

    match password::verify(user.password, password).await {
        Ok(true) => (),
        Ok(false) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Incorrect password. Please try again."})),
            );
        }
        Err(e) => {
            error!("Error verifying password: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to verify password"})),
            );
        }
    }

    // ids no longer present in the catalog are dropped from the response
    let proofs = match store.existing_proofs(&user.proofs_completed).await {
        Ok(proofs) => proofs,
        Err(e) => {
            error!("Error fetching proof templates: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("Failed to fetch proof templates: {e}")})),
            );
        }
    };

    debug!("Login successful");

    (
        StatusCode::OK,
        Json(json!({
            "message": "Login successful",
            "user": {
                "email": email,
                "proofs_completed": proofs,
            }
        })),
    )
}
