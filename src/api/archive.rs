use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{ApiError, AppState, auth, validation};
use crate::archive::{ArchivePlan, archived_name, build_migration};
use crate::constants::archive as probe;

#[derive(Debug, Serialize)]
pub struct ArchiveEntry {
    pub year: String,
    pub prefix: String,
}

#[derive(Debug, Serialize)]
pub struct ListArchivesResponse {
    pub archives: Vec<ArchiveEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    pub year: Option<String>,
    pub prefix: Option<String>,
    #[serde(default)]
    pub tables_to_archive: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveResponse {
    pub message: String,
    pub year: String,
    pub prefix: String,
    pub migration_name: String,
    pub sql: String,
    pub tables_to_archive: Vec<String>,
    pub note: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSeason {
    pub active_year: String,
    pub active_prefix: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArchiveConfigResponse {
    pub config: ActiveSeason,
}

/// `GET /api/list-archives`
///
/// Probes the candidate year/prefix space for archived `vass_vann` copies
/// and reports which season snapshots exist. The live table set is always
/// listed first as `{"year": "current", "prefix": ""}`.
pub async fn list_archives(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListArchivesResponse>, ApiError> {
    let current_year = Utc::now().year();

    let mut archives = vec![ArchiveEntry {
        year: "current".to_string(),
        prefix: String::new(),
    }];

    let first = current_year - probe::PROBE_YEARS_BACK;
    let last = current_year + probe::PROBE_YEARS_FORWARD;
    for year in first..=last {
        for prefix in probe::PROBE_PREFIXES {
            let table = archived_name(&year.to_string(), prefix, probe::PROBE_TABLE);
            if state.store.archive_table_exists(&table).await? {
                archives.push(ArchiveEntry {
                    year: year.to_string(),
                    prefix: (*prefix).to_string(),
                });
            }
        }
    }

    Ok(Json(ListArchivesResponse { archives }))
}

/// `POST /api/archive`
///
/// Generates the season-archive migration and returns it as SQL text.
/// Nothing is executed here; the operator reviews the script and runs it in
/// the hosted backend's SQL editor.
///
/// Check order is part of the contract: credential, then capability, then
/// body. The body arrives as raw bytes so a credential-less request gets its
/// 401 even when no valid JSON was sent.
pub async fn generate_archive(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ArchiveResponse>, ApiError> {
    let user = auth::require_user(&state, &headers).await?;

    if !state.store.can_edit_markers(user.id).await? {
        return Err(ApiError::AuthorizationDenied(
            "You do not have permission to archive tables".to_string(),
        ));
    }

    let request: ArchiveRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::validation("Request body must be valid JSON"))?;

    let year = validation::validate_year(request.year.as_deref().unwrap_or(""))?;
    let prefix = validation::validate_prefix(request.prefix.as_deref().unwrap_or(""))?;

    if request.tables_to_archive.is_empty() {
        return Err(ApiError::validation("tablesToArchive must not be empty"));
    }
    for table in &request.tables_to_archive {
        validation::validate_table_name(table)?;
    }

    let plan = ArchivePlan {
        year: year.to_string(),
        prefix: prefix.to_string(),
        tables: request.tables_to_archive,
        requested_by: user.email,
    };
    let migration = build_migration(&plan, Utc::now());
    let sql = migration.sql();

    info!(
        "Generated archive migration {} covering {} tables for {}",
        migration.name,
        plan.tables.len(),
        plan.requested_by
    );

    Ok(Json(ArchiveResponse {
        message: format!(
            "Archive SQL for {} generated. Review it and run it manually in the SQL editor.",
            plan.year
        ),
        year: plan.year,
        prefix: plan.prefix,
        migration_name: migration.name,
        sql,
        tables_to_archive: plan.tables,
        note: "Nothing has been executed. CREATE TABLE IF NOT EXISTS is safe to re-run, \
               but the INSERT .. SELECT copies rows again if the script runs twice."
            .to_string(),
    }))
}

/// `GET /api/archive`
///
/// Current active-season pointer from the `app_config` singleton.
pub async fn get_archive_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ArchiveConfigResponse>, ApiError> {
    let row = state
        .store
        .app_config()
        .await?
        .ok_or_else(|| ApiError::internal("app_config row is missing"))?;

    Ok(Json(ArchiveConfigResponse {
        config: ActiveSeason {
            active_year: row.active_year,
            active_prefix: row.active_prefix,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        },
    }))
}
