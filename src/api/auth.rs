// src/api/auth.rs
//
// Accounts live on the hosting panel; this layer only looks them up and
// creates them. No local sessions are issued.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::api::require_email;
use crate::error::ApiError;
use crate::panel::{NewPanelUser, PanelError, PanelUser};
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email or panel username
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub root_admin: bool,
    pub panel_url: String,
}

impl UserProfile {
    fn from_panel(user: PanelUser, panel_url: &str) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            root_admin: user.root_admin,
            panel_url: panel_url.to_string(),
        }
    }
}

fn valid_username(username: &str) -> bool {
    (3..=191).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Panel account created", body = UserProfile),
        (status = 400, description = "Invalid input or account already exists")
    )
)]
#[post("/api/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let email = require_email(Some(&payload.email))?;
    let username = payload.username.trim().to_string();

    if !valid_username(&username) {
        return Err(ApiError::bad_request(
            "Username must be 3+ characters: letters, digits, '.', '_' or '-'",
        ));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if state.panel.find_user(&email).await?.is_some() {
        return Err(ApiError::bad_request("An account with this email already exists"));
    }

    let new_user = NewPanelUser {
        first_name: payload
            .first_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| username.clone()),
        last_name: payload
            .last_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "User".to_string()),
        email,
        username,
        password: payload.password,
    };

    let user = match state.panel.create_user(&new_user).await {
        Ok(u) => u,
        Err(PanelError::Api { status: 422, detail }) => {
            log::warn!("panel rejected registration email={} detail={detail}", new_user.email);
            return Err(ApiError::BadRequest(detail));
        }
        Err(e) => return Err(e.into()),
    };

    log::info!("registered panel user id={} email={}", user.id, user.email);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Account created",
        "user": UserProfile::from_panel(user, &state.config.panel_base_url),
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Panel account found", body = UserProfile),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "No such account")
    )
)]
#[post("/api/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let login = payload.email.trim();
    if login.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let Some(user) = state.panel.find_user(login).await? else {
        return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
    };

    log::info!("login panel user id={}", user.id);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": UserProfile::from_panel(user, &state.config.panel_base_url),
    })))
}
