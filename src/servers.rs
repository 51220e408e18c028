// src/servers.rs
//
// Reshapes panel servers into what the dashboard shows.

use serde::Serialize;
use utoipa::ToSchema;

use crate::panel::PanelServer;
use crate::tiers::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Online,
    Suspended,
    Installing,
    Error,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerSummary {
    pub id: i64,
    pub identifier: String,
    pub uuid: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub status: ServerStatus,
    pub memory: String,
    pub disk: String,
    pub cpu: String,
    pub plan: Tier,
    pub price: f64,
    pub node: i64,
    pub address: Option<String>,
    pub created_at: Option<String>,
}

pub fn bucket_status(status: Option<&str>, suspended: bool) -> ServerStatus {
    if suspended {
        return ServerStatus::Suspended;
    }
    match status {
        Some("suspended") => ServerStatus::Suspended,
        Some("installing") | Some("restoring_backup") => ServerStatus::Installing,
        Some("install_failed") | Some("reinstall_failed") => ServerStatus::Error,
        _ => ServerStatus::Online,
    }
}

/// Formats a panel size in MB; `0` is unlimited on the panel.
pub fn format_megabytes(mb: i64) -> String {
    if mb <= 0 {
        return "Unlimited".to_string();
    }
    if mb < 1024 {
        return format!("{mb} MB");
    }
    if mb % 1024 == 0 {
        format!("{} GB", mb / 1024)
    } else {
        format!("{:.1} GB", mb as f64 / 1024.0)
    }
}

pub fn format_cpu(cpu: i64) -> String {
    if cpu <= 0 {
        "Unlimited".to_string()
    } else {
        format!("{cpu}%")
    }
}

/// Plan tag from the description, else the legacy guess from limits.
pub fn plan_of(server: &PanelServer) -> Tier {
    server
        .description
        .as_deref()
        .and_then(Tier::from_description)
        .unwrap_or_else(|| Tier::infer_from_limits(server.limits.memory, server.limits.cpu))
}

pub fn summarize(server: &PanelServer) -> ServerSummary {
    let plan = plan_of(server);
    ServerSummary {
        id: server.id,
        identifier: server.identifier.clone(),
        uuid: server.uuid.clone(),
        name: server.name.clone(),
        description: server.description.clone().filter(|d| !d.is_empty()),
        status: bucket_status(server.status.as_deref(), server.suspended),
        memory: format_megabytes(server.limits.memory),
        disk: format_megabytes(server.limits.disk),
        cpu: format_cpu(server.limits.cpu),
        plan,
        price: plan.price(),
        node: server.node,
        address: server.primary_address(),
        created_at: server.created_at.clone(),
    }
}
