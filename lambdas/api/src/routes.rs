use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use domain::{
    drugs::{
        self,
        inputs::{ByNamesInput, InteractionInput, QueryInput, SearchParams},
        stats, Direction, NewDrug, OrderBy, RecordStore, SortField,
    },
    family::{attach_drugs, EmergencyInfo, FamilyStore, NewFamilyMember, NewMedication},
    interactions,
};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiJson, Envelope};

const TRENDING_COUNT: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub family: Arc<dyn FamilyStore>,
    pub environment: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/drugs", get(list_drugs).post(create_drug))
        .route("/api/drugs/by-names", post(drugs_by_names))
        .route("/api/search", get(search_drugs))
        .route("/api/categories", get(list_categories))
        .route("/api/trending", get(trending_drugs))
        .route("/api/stats", get(category_stats))
        .route("/api/query", post(natural_language_query))
        .route("/api/interactions", post(check_interaction))
        .route("/api/interactions/family-check", post(check_family_interactions))
        .route("/api/family-members", get(list_members).post(create_member))
        .route("/api/family-members/:id", delete(delete_member))
        .route("/api/family-medications", post(add_medication))
        // GET takes a member id, PUT and DELETE a medication id
        .route(
            "/api/family-medications/:id",
            get(member_medications)
                .put(update_medication)
                .delete(delete_medication),
        )
        .route("/api/emergency/:id", get(emergency_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn elapsed_ms(started: Instant) -> u128 {
    started.elapsed().as_millis()
}

// Health check
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.environment,
    }))
}

// List every drug
async fn list_drugs(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    let drugs = state.store.all().await?;

    tracing::info!("get_drugs: {} drugs in {}ms", drugs.len(), elapsed_ms(started));

    Ok(Envelope::ok(drugs, "Drugs retrieved successfully"))
}

// Faceted search by name and category
async fn search_drugs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    let filter = drugs::build_filter(params.query.as_deref(), params.category.as_deref())?;
    let drugs = state.store.find(&filter).await?;

    tracing::info!(
        "search_drugs: query={:?} category={:?} -> {} drugs in {}ms",
        params.query,
        params.category,
        drugs.len(),
        elapsed_ms(started)
    );

    Ok(Envelope::ok(drugs, "Search completed successfully"))
}

// Categories, prefixed with "all"
async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state.store.distinct_categories().await?;

    let mut names = vec![drugs::ALL_CATEGORIES.to_string()];
    names.extend(categories.iter().map(|c| c.as_str().to_string()));

    Ok(Envelope::ok(names, "Categories retrieved successfully"))
}

// Most expensive drugs
async fn trending_drugs(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let drugs = state
        .store
        .top(
            TRENDING_COUNT,
            OrderBy::new(SortField::Price, Direction::Descending),
        )
        .await?;

    Ok(Envelope::ok(drugs, "Trending drugs retrieved successfully"))
}

// Count and average price per category
async fn category_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    let stats = stats::summarize(&state.store.all().await?);

    tracing::info!("get_stats: {} categories in {}ms", stats.len(), elapsed_ms(started));

    Ok(Envelope::ok(stats, "Statistics retrieved successfully"))
}

// Look up drugs by exact name
async fn drugs_by_names(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ByNamesInput>,
) -> Result<impl IntoResponse, ApiError> {
    let drugs = state.store.find_by_names(&input.names).await?;

    tracing::info!(
        "get_drugs_by_names: {} requested, {} found",
        input.names.len(),
        drugs.len()
    );

    Ok(Envelope::ok(drugs, "Drugs retrieved successfully"))
}

// Add a drug
async fn create_drug(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewDrug>,
) -> Result<impl IntoResponse, ApiError> {
    let drug = state.store.insert(input).await?;

    tracing::info!("Added drug {} ({})", drug.name, drug.id);

    Ok((
        StatusCode::CREATED,
        Envelope::ok(drug, "Drug added successfully"),
    ))
}

// Free-text query
async fn natural_language_query(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<QueryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    let interpretation = drugs::interpret(&input.query)?;
    let results = state.store.find(&interpretation.filter).await?;

    tracing::info!(
        "nl_query: {:?} -> {} ({} drugs in {}ms)",
        input.query,
        interpretation.interpretation,
        results.len(),
        elapsed_ms(started)
    );

    Ok(Envelope::ok(
        serde_json::json!({
            "query": input.query,
            "interpretation": interpretation.interpretation,
            "filter": interpretation.filter,
            "results": results,
        }),
        "Query processed successfully",
    ))
}

// Interaction check, not backed by any data source yet
async fn check_interaction(
    ApiJson(input): ApiJson<InteractionInput>,
) -> Result<impl IntoResponse, ApiError> {
    let report = interactions::check_interaction(&input.drug1, &input.drug2)?;

    Ok((
        StatusCode::NOT_IMPLEMENTED,
        Envelope::failure(Some(report), "Interaction checking is not available yet"),
    ))
}

// Interaction check across every family medication
async fn check_family_interactions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let medications = state.family.medications().await?;
    let report = interactions::check_family(&medications);

    tracing::info!("family_check: {} distinct drugs", report.drugs_checked);

    Ok((
        StatusCode::NOT_IMPLEMENTED,
        Envelope::failure(Some(report), "Interaction checking is not available yet"),
    ))
}

async fn list_members(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let members = state.family.members().await?;

    Ok(Envelope::ok(members, "Family members retrieved successfully"))
}

async fn create_member(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewFamilyMember>,
) -> Result<impl IntoResponse, ApiError> {
    let member = state.family.add_member(input).await?;

    tracing::info!("Added family member {}", member.id);

    Ok((
        StatusCode::CREATED,
        Envelope::ok(member, "Family member created successfully"),
    ))
}

async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.family.remove_member(&id).await?;

    tracing::info!("Deleted family member {}", id);

    Ok(Envelope::ok(
        serde_json::json!({ "id": id }),
        "Family member deleted successfully",
    ))
}

// Record a drug a member takes; the drug must be in the catalogue
async fn add_medication(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewMedication>,
) -> Result<impl IntoResponse, ApiError> {
    input.validate()?;
    let drug = state.store.get(input.drug_id.trim()).await?;
    let medication = state.family.add_medication(input).await?;

    tracing::info!(
        "Added {} for family member {}",
        drug.name,
        medication.family_member_id
    );

    let view = attach_drugs(vec![medication], &[drug]);
    Ok((
        StatusCode::CREATED,
        Envelope::ok(view, "Medication added successfully"),
    ))
}

async fn member_medications(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let medications = state.family.medications_for(&member_id).await?;
    let views = attach_drugs(medications, &state.store.all().await?);

    Ok(Envelope::ok(views, "Medications retrieved successfully"))
}

async fn update_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<NewMedication>,
) -> Result<impl IntoResponse, ApiError> {
    input.validate()?;
    let drug = state.store.get(input.drug_id.trim()).await?;
    let medication = state.family.update_medication(&id, input).await?;

    let view = attach_drugs(vec![medication], &[drug]);
    Ok(Envelope::ok(view, "Medication updated successfully"))
}

async fn delete_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.family.remove_medication(&id).await?;

    Ok(Envelope::ok(
        serde_json::json!({ "id": id }),
        "Medication removed successfully",
    ))
}

// Allergies, conditions, contacts and current medications for one member
async fn emergency_info(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let member = state.family.member(&member_id).await?;
    let medications = state.family.medications_for(&member_id).await?;
    let views = attach_drugs(medications, &state.store.all().await?);

    Ok(Envelope::ok(
        EmergencyInfo::from_member(member, views),
        "Emergency information retrieved successfully",
    ))
}
