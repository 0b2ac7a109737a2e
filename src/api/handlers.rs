use crate::api::AppState;
use crate::directory::NewParticipant;
use crate::error::{AppError, Result};
use crate::models::{BusinessCategory, Participant, ParticipantStatus};
use crate::search::SearchResult;
use crate::state::ParticipantScope;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Register a participant in a tenant
pub async fn register_participant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(request): Json<NewParticipant>,
) -> Result<(StatusCode, Json<Participant>)> {
    let participant = state
        .directory
        .register_participant(&tenant_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(participant)))
}

/// Get a participant by ID
pub async fn get_participant(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(String, Uuid)>,
) -> Result<Json<Participant>> {
    let participant = state.directory.get_participant(&tenant_id, &id).await?;
    Ok(Json(participant))
}

/// List participants of a tenant
pub async fn list_participants(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(params): Query<ListParticipantsQuery>,
) -> Result<Json<ListParticipantsResponse>> {
    let scope = match parse_statuses(params.status.as_deref())? {
        Some(statuses) => ParticipantScope::new(tenant_id, statuses),
        None => ParticipantScope::tenant(tenant_id),
    };

    let page = params.page.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(20).min(100); // Max 100 per page

    let (participants, total) = state
        .directory
        .list_participants(&scope, page, page_size)
        .await?;

    Ok(Json(ListParticipantsResponse {
        participants,
        total,
        page,
        page_size,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListParticipantsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Comma separated statuses, e.g. `member,visitor`
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListParticipantsResponse {
    pub participants: Vec<Participant>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Move a participant to another lifecycle status
pub async fn change_status(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(String, Uuid)>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<Participant>> {
    let participant = state
        .directory
        .change_status(&tenant_id, &id, request.status)
        .await?;

    Ok(Json(participant))
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: ParticipantStatus,
}

/// Replace a participant's tags
pub async fn update_tags(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(String, Uuid)>,
    Json(request): Json<UpdateTagsRequest>,
) -> Result<Json<Participant>> {
    request.validate()?;

    let participant = state
        .directory
        .update_tags(&tenant_id, &id, request.tags)
        .await?;

    Ok(Json(participant))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagsRequest {
    #[validate(length(max = 50))]
    pub tags: Vec<String>,
}

/// Keyword search over a tenant's participants
pub async fn search_participants(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let config = state.directory.search_config();
    let mut options = config.options_for(tenant_id, params.q.unwrap_or_default());

    if let Some(limit) = params.limit {
        options = options.with_limit(limit);
    }
    if let Some(statuses) = parse_statuses(params.status.as_deref())? {
        options = options.with_status_filter(statuses);
    }
    if let Some(categories) = params.categories {
        options = options.with_category_matching(categories);
    }

    let result = state.directory.search(options).await?;

    Ok(Json(SearchResponse {
        degraded: result.is_degraded(),
        result,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
    /// Comma separated statuses; defaults to members and visitors
    pub status: Option<String>,
    /// Also match participants by business category name
    pub categories: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub result: SearchResult,
    /// True when at least one sub-query timed out
    pub degraded: bool,
}

/// Insert or replace a business category
pub async fn register_category(
    State(state): State<AppState>,
    Json(request): Json<BusinessCategory>,
) -> Result<(StatusCode, Json<BusinessCategory>)> {
    let category = state.directory.register_category(request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// List business categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<BusinessCategory>>> {
    let categories = state.directory.list_categories().await?;
    Ok(Json(categories))
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}

fn parse_statuses(raw: Option<&str>) -> Result<Option<Vec<ParticipantStatus>>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => ParticipantStatus::parse_list(raw)
            .map(Some)
            .map_err(|e| AppError::Validation(format!("Invalid status filter '{}': {}", raw, e))),
        _ => Ok(None),
    }
}
