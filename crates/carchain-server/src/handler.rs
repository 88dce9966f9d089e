use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use carchain_ledger::{Ledger, LedgerError, LedgerReader, LedgerWriter};
use carchain_types::{SubjectId, TelemetryRecord};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// JSON key carrying the subject identifier in submissions.
pub const SUBJECT_FIELD: &str = "car_id";

/// Run a ledger call on the blocking pool.
///
/// Every ledger operation takes a std lock, and appends hold it across an
/// fsync, so none of them run on the async workers.
async fn with_ledger<T, F>(state: &AppState, f: F) -> ServerResult<T>
where
    F: FnOnce(&Ledger) -> Result<T, LedgerError> + Send + 'static,
    T: Send + 'static,
{
    let ledger = state.ledger.clone();
    let result = tokio::task::spawn_blocking(move || f(&ledger))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(result?)
}

/// POST /add_car_data
pub async fn add_car_data(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let Json(body) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let (subject, record) = parse_submission(&body)?;

    let receipt = with_ledger(&state, move |ledger| ledger.append(subject, record)).await?;

    tracing::info!(
        index = receipt.block.index(),
        persisted = receipt.is_persisted(),
        "telemetry recorded"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "car data added",
            "block": receipt.block,
            "blockchain_size": receipt.block.index() + 1,
            "persisted": receipt.is_persisted(),
        })),
    ))
}

fn subject_from(raw: &str) -> ServerResult<SubjectId> {
    SubjectId::new(raw.trim()).map_err(|e| ServerError::BadRequest(e.to_string()))
}

/// Split a submission into its subject and telemetry record.
///
/// Keys other than the subject and the telemetry fields are ignored.
fn parse_submission(body: &Value) -> ServerResult<(SubjectId, TelemetryRecord)> {
    let obj = body
        .as_object()
        .ok_or_else(|| ServerError::BadRequest("expected a JSON object".into()))?;

    let missing: Vec<&str> = std::iter::once(SUBJECT_FIELD)
        .chain(TelemetryRecord::REQUIRED_FIELDS)
        .filter(|field| !obj.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(ServerError::BadRequest(format!(
            "missing fields: {}",
            missing.join(", ")
        )));
    }

    let subject = match &obj[SUBJECT_FIELD] {
        Value::String(s) => subject_from(s)?,
        Value::Number(n) => subject_from(&n.to_string())?,
        _ => {
            return Err(ServerError::BadRequest(format!(
                "{SUBJECT_FIELD} must be a string"
            )))
        }
    };

    let fields: Map<String, Value> = TelemetryRecord::REQUIRED_FIELDS
        .iter()
        .map(|name| (name.to_string(), obj[*name].clone()))
        .collect();
    let record: TelemetryRecord = serde_json::from_value(Value::Object(fields))
        .map_err(|e| ServerError::BadRequest(format!("invalid telemetry: {e}")))?;
    record
        .validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    Ok((subject, record))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub date: Option<String>,
}

/// GET /get_car_history/:car_id
pub async fn get_car_history(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ServerResult<Json<Value>> {
    let subject = subject_from(&car_id)?;
    let date = match query.date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
            ServerError::BadRequest(format!("date must be YYYY-MM-DD: {e}"))
        })?),
    };

    let query_subject = subject.clone();
    let history = with_ledger(&state, move |ledger| ledger.history(&query_subject, date)).await?;
    Ok(Json(json!({
        "car_id": subject,
        "count": history.len(),
        "history": history,
        "date_filter": date.map(|d| d.to_string()).unwrap_or_else(|| "None".into()),
    })))
}

/// GET /validate_chain
pub async fn validate_chain(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    let status = with_ledger(&state, |ledger| ledger.status()).await?;
    if !status.valid {
        tracing::warn!(blocks = status.size, "chain validation failed");
    }
    Ok(Json(json!({
        "valid": status.valid,
        "chain_length": status.size,
    })))
}

/// GET /status
pub async fn status(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    let status = with_ledger(&state, |ledger| ledger.status()).await?;
    Ok(Json(json!({
        "status": "online",
        "blockchain_size": status.size,
        "genesis_block": status.genesis,
        "latest_block": status.latest,
        "is_valid": status.valid,
    })))
}

/// GET /blocks
pub async fn blocks(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    let blocks = with_ledger(&state, |ledger| ledger.blocks()).await?;
    Ok(Json(json!({
        "count": blocks.len(),
        "blocks": blocks,
    })))
}

/// Health check handler.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Info handler.
pub async fn info() -> Json<Value> {
    Json(json!({
        "name": "carchain-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
