// src/api/servers.rs

use actix_web::{HttpResponse, delete, get, post, web};
use futures_util::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::ledger::SpendingRecord;
use crate::panel::{AllocationRequest, NewServer, PanelServer, PanelUser};
use crate::servers::{plan_of, summarize};
use crate::tiers::Tier;
use crate::wallet::{self, compute_balance};
use crate::AppState;

const MAX_NAME_LEN: usize = 191;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerRequest {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    /// Limited, Unlimited or Admin
    pub plan: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListServersQuery {
    pub user_id: Option<i64>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OwnerQuery {
    pub user_id: i64,
}

#[utoipa::path(
    post,
    path = "/api/servers/create",
    tag = "servers",
    request_body = CreateServerRequest,
    responses(
        (status = 200, description = "Server created and charged"),
        (status = 400, description = "Invalid input or unknown plan"),
        (status = 402, description = "Insufficient balance"),
        (status = 403, description = "Email does not match the panel account"),
        (status = 404, description = "Panel account not found"),
        (status = 503, description = "No free allocation on the node")
    )
)]
#[post("/api/servers/create")]
pub async fn create_server(
    state: web::Data<AppState>,
    payload: web::Json<CreateServerRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();

    let name = payload.name.trim().to_string();
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(ApiError::bad_request("Server name is required (max 191 characters)"));
    }
    let tier: Tier = payload
        .plan
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid plan: {}", payload.plan)))?;
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    let Some(user) = state.panel.get_user(payload.user_id).await? else {
        return Err(ApiError::NotFound("User not found".to_string()));
    };
    if !user.email.eq_ignore_ascii_case(&email) {
        log::warn!(
            "create server ownership mismatch user_id={} email={email}",
            payload.user_id
        );
        return Err(ApiError::Forbidden("Email does not match this account".to_string()));
    }

    let price = tier.price();

    // Held until the spending record is written so concurrent purchases
    // cannot spend the same balance twice.
    let _purchase = state.purchase_lock.lock().await;

    let summary = wallet::summarize(&state.paystack, &state.ledger, &email).await?;
    if summary.balance < price {
        return Err(ApiError::PaymentRequired(format!(
            "Insufficient balance: the {tier} plan costs KES {price}, your balance is KES {}",
            summary.balance
        )));
    }

    let allocation = state
        .panel
        .free_allocations(state.config.node_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            log::error!("no free allocation on node {}", state.config.node_id);
            ApiError::Unavailable("No server capacity available right now, try again later".to_string())
        })?;

    let request = NewServer {
        name: name.clone(),
        description: tier.description_tag(),
        user: user.id,
        egg: state.config.egg_id,
        docker_image: state.config.docker_image.clone(),
        startup: state.config.startup.clone(),
        environment: state.config.egg_environment.clone(),
        limits: tier.limits(),
        feature_limits: tier.feature_limits(),
        allocation: AllocationRequest { default: allocation.id },
        start_on_completion: true,
    };
    let created = state.panel.create_server(&request).await?;
    log::info!(
        "created server id={} user_id={} plan={tier} allocation={}",
        created.id,
        user.id,
        allocation.address()
    );

    let record = SpendingRecord::new(
        &email,
        price,
        format!("Server purchase: {name} ({tier} plan)"),
        created.id.to_string(),
    );
    match state.ledger.record(record).await {
        Ok(replaced) if !replaced.is_empty() => log::warn!(
            "purchase of server {} replaced {} backfilled record(s)",
            created.id,
            replaced.len()
        ),
        Ok(_) => {}
        Err(e) => {
            log::error!("recording purchase of server {} failed: {e}", created.id);
            match state.panel.delete_server(created.id).await {
                Ok(_) => log::warn!("rolled back server {} after failed charge", created.id),
                Err(de) => log::error!(
                    "rollback of server {} failed, server is unbilled: {de}",
                    created.id
                ),
            }
            return Err(ApiError::Internal(
                "Could not record the purchase; the server was not created".to_string(),
            ));
        }
    }

    let mut created = created;
    if created.allocations.is_empty() {
        created.allocations.push(allocation);
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("{tier} server created"),
        "server": summarize(&created),
        "balance": compute_balance(summary.total_deposits, summary.total_spending + price),
    })))
}

async fn resolve_owner(
    state: &AppState,
    query: &ListServersQuery,
) -> Result<(PanelUser, Vec<PanelServer>), ApiError> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let user_id = match (query.user_id, email) {
        (Some(id), _) => id,
        (None, Some(email)) => match state.panel.find_user(email).await? {
            Some(u) => u.id,
            None => return Err(ApiError::NotFound("User not found".to_string())),
        },
        (None, None) => return Err(ApiError::bad_request("userId or email is required")),
    };

    let Some((user, servers)) = state.panel.get_user_with_servers(user_id).await? else {
        return Err(ApiError::NotFound("User not found".to_string()));
    };
    if let Some(email) = email {
        if !user.email.eq_ignore_ascii_case(email) {
            return Err(ApiError::Forbidden("Email does not match this account".to_string()));
        }
    }
    Ok((user, servers))
}

#[utoipa::path(
    get,
    path = "/api/servers",
    tag = "servers",
    params(ListServersQuery),
    responses(
        (status = 200, description = "Servers owned by the account"),
        (status = 400, description = "Neither userId nor email given"),
        (status = 404, description = "Panel account not found")
    )
)]
#[get("/api/servers")]
pub async fn list_servers(
    state: web::Data<AppState>,
    query: web::Query<ListServersQuery>,
) -> Result<HttpResponse, ApiError> {
    let (user, servers) = resolve_owner(&state, &query).await?;

    let panel = &state.panel;
    let detailed: Vec<PanelServer> = stream::iter(servers)
        .map(|server| async move {
            match panel.get_server(server.id).await {
                Ok(Some(detail)) => detail,
                Ok(None) => server,
                Err(e) => {
                    log::warn!("server {} detail fetch failed: {e}", server.id);
                    server
                }
            }
        })
        .buffered(state.config.panel_fanout)
        .collect()
        .await;

    for server in &detailed {
        let plan = plan_of(server);
        let record = SpendingRecord::new(
            &user.email,
            plan.price(),
            format!("Server purchase: {} ({plan} plan)", server.name),
            server.id.to_string(),
        );
        match state.ledger.record_untracked(record).await {
            Ok(true) => log::info!(
                "backfilled spending for untracked server id={} user_id={}",
                server.id,
                user.id
            ),
            Ok(false) => {}
            Err(e) => log::warn!("backfill for server {} failed: {e}", server.id),
        }
    }

    let summaries: Vec<_> = detailed.iter().map(summarize).collect();
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": summaries.len(),
        "servers": summaries,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/servers/{server_id}",
    tag = "servers",
    params(
        ("server_id" = i64, Path, description = "Panel server id"),
        OwnerQuery
    ),
    responses(
        (status = 200, description = "Server deleted and refunded"),
        (status = 403, description = "Server belongs to another account"),
        (status = 404, description = "Server not found")
    )
)]
#[delete("/api/servers/{server_id}")]
pub async fn delete_server(
    state: web::Data<AppState>,
    server_id: web::Path<i64>,
    query: web::Query<OwnerQuery>,
) -> Result<HttpResponse, ApiError> {
    let server_id = server_id.into_inner();

    let Some(server) = state.panel.get_server(server_id).await? else {
        return Err(ApiError::NotFound("Server not found".to_string()));
    };
    if server.user != query.user_id {
        log::warn!(
            "delete server {server_id} denied: owner={} requester={}",
            server.user,
            query.user_id
        );
        return Err(ApiError::Forbidden("You do not own this server".to_string()));
    }

    if !state.panel.delete_server(server_id).await? {
        return Err(ApiError::NotFound("Server not found".to_string()));
    }

    let removed = state
        .ledger
        .refund_server(&server_id.to_string())
        .await
        .map_err(|e| {
            log::error!("server {server_id} deleted but refund failed: {e}");
            ApiError::Internal("Server deleted but the refund could not be recorded".to_string())
        })?;
    let refunded: f64 = removed.iter().map(|r| r.amount).sum();

    log::info!("deleted server id={server_id} refunded={refunded}");
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Server deleted",
        "refunded": refunded,
    })))
}
