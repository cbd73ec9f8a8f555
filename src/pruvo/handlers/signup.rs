use crate::{
    pruvo::handlers::{valid_email, valid_password},
    pruvo::password,
    supabase,
};
use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Signup {
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path= "/signup",
    responses (
        (status = 200, description = "Account created", body = [Signup], content_type = "application/json"),
        (status = 400, description = "Invalid input or an account with that email already exists"),
        (status = 500, description = "Store failure"),
    ),
    tag= "signup"
)]
// axum handler for signup
#[instrument(skip_all)]
pub async fn signup(
    store: Extension<supabase::Client>,
    payload: Option<Json<Signup>>,
) -> (StatusCode, Json<Value>) {
    let Signup { email, password } = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid input"})));
        }
    };

    debug!("signup attempt: {}", email);

    if email.is_empty() || password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Email and password are required"})),
        );
    }

    // existence check runs first, a taken email reports as taken no matter
    // what password was submitted
    match store.find_user(&email).await {
        Ok(Some(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "An account with this email already exists. Please log in instead."
                })),
            );
        }
        Ok(None) => (),
        Err(e) => {
            error!("Error checking existing user: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("Failed to check if user exists: {e}")})),
            );
        }
    }

    if !valid_password(&password) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Password must be at least 6 characters long"})),
        );
    }

    if !valid_email(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Please enter a valid email address"})),
        );
    }

    let hashed = match password::hash(password).await {
        Ok(hash) => hash,
        Err(e) => {
            error!("Error hashing password: {:?}", e);

            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to process password"})),
            );
        }
    };

    match store.insert_user(&email, &hashed).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": "User created successfully",
                "user": {
                    "email": email,
                    "proofs_completed": [],
                }
            })),
        ),
        Err(e) => {
            error!("Error creating user: {:?}", e);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("Failed to create user: {e}")})),
            )
        }
    }
}
