use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tally_ledger::{
    AccountCombination, AccountInsert, DimensionValue, FinancialDimension, Ledger, LineInput,
    MainAccount, TrialBalanceRow,
};

use crate::config::PaginationConfig;
use crate::error::ApiError;
use crate::schemas::{
    CreateAccountRequest, CreateJournalRequest, DeleteAccountsRequest, DeletedBody, JournalBody,
    JournalPageBody, LineBody, LineUpsertBody, ListJournalsQuery, TrialBalanceQuery,
};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub pagination: PaginationConfig,
}

pub async fn create_journal(
    State(state): State<AppState>,
    Json(body): Json<CreateJournalRequest>,
) -> Result<(StatusCode, Json<JournalBody>), ApiError> {
    let header =
        state
            .ledger
            .create_journal(body.document_date, body.journal_type, body.description)?;
    Ok((StatusCode::CREATED, Json(header.into())))
}

pub async fn list_journals(
    State(state): State<AppState>,
    Query(query): Query<ListJournalsQuery>,
) -> Result<Json<JournalPageBody>, ApiError> {
    let limit = state.pagination.clamp(query.limit);
    let page = state.ledger.journals(limit, query.cursor.as_deref())?;
    Ok(Json(page.into()))
}

pub async fn get_journal(
    State(state): State<AppState>,
    Path(journal_id): Path<String>,
) -> Result<Json<JournalBody>, ApiError> {
    let header = state.ledger.journal(&journal_id)?;
    Ok(Json(header.into()))
}

pub async fn post_journal(
    State(state): State<AppState>,
    Path(journal_id): Path<String>,
) -> Result<Json<JournalBody>, ApiError> {
    let header = state.ledger.post_journal(&journal_id)?;
    Ok(Json(header.into()))
}

pub async fn list_lines(
    State(state): State<AppState>,
    Path(journal_id): Path<String>,
) -> Result<Json<Vec<LineBody>>, ApiError> {
    state.ledger.journal(&journal_id)?;
    let lines = state.ledger.lines(&journal_id)?;
    if lines.is_empty() {
        return Err(ApiError::not_found(format!(
            "journal {journal_id} has no lines"
        )));
    }
    Ok(Json(lines.into_iter().map(LineBody::from).collect()))
}

pub async fn upsert_lines(
    State(state): State<AppState>,
    Path(journal_id): Path<String>,
    Json(body): Json<Vec<LineUpsertBody>>,
) -> Result<Json<Vec<LineBody>>, ApiError> {
    let incoming: Vec<LineInput> = body.into_iter().map(LineInput::from).collect();
    let result = state.ledger.upsert_lines(&journal_id, incoming)?;
    Ok(Json(result.into_iter().map(LineBody::from).collect()))
}

pub async fn delete_line(
    State(state): State<AppState>,
    Path((journal_id, line_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    if state.ledger.delete_line(&journal_id, &line_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "line {line_id} not found in journal {journal_id}"
        )))
    }
}

pub async fn trial_balance(
    State(state): State<AppState>,
    Query(query): Query<TrialBalanceQuery>,
) -> Result<Json<Vec<TrialBalanceRow>>, ApiError> {
    let rows = state.ledger.trial_balance(query.from_date, query.to_date)?;
    Ok(Json(rows))
}

pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<MainAccount>>, ApiError> {
    Ok(Json(state.ledger.accounts()?))
}

pub async fn create_account(
    State(state): State<AppState>,
    Json(body): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<MainAccount>), ApiError> {
    let code = body.account.clone();
    match state.ledger.create_account(body.into())? {
        AccountInsert::Created(account) => Ok((StatusCode::CREATED, Json(account))),
        AccountInsert::Duplicate => Err(ApiError::duplicate_key(format!(
            "account {code} already exists"
        ))),
    }
}

pub async fn delete_accounts(
    State(state): State<AppState>,
    Json(body): Json<DeleteAccountsRequest>,
) -> Result<Json<DeletedBody>, ApiError> {
    let deleted = state.ledger.delete_accounts(&body.accounts)?;
    Ok(Json(DeletedBody { deleted }))
}

pub async fn list_dimensions(
    State(state): State<AppState>,
) -> Result<Json<Vec<FinancialDimension>>, ApiError> {
    Ok(Json(state.ledger.dimensions()?))
}

pub async fn update_dimension(
    State(state): State<AppState>,
    Json(body): Json<FinancialDimension>,
) -> Result<Json<FinancialDimension>, ApiError> {
    Ok(Json(state.ledger.update_dimension(body)?))
}

pub async fn list_dimension_values(
    State(state): State<AppState>,
    Path(dimension_id): Path<u32>,
) -> Result<Json<Vec<DimensionValue>>, ApiError> {
    Ok(Json(state.ledger.dimension_values(dimension_id)?))
}

pub async fn add_dimension_value(
    State(state): State<AppState>,
    Path(dimension_id): Path<u32>,
    Json(body): Json<DimensionValue>,
) -> Result<StatusCode, ApiError> {
    state.ledger.add_dimension_value(dimension_id, body)?;
    Ok(StatusCode::CREATED)
}

pub async fn delete_dimension_value(
    State(state): State<AppState>,
    Path((dimension_id, code)): Path<(u32, String)>,
) -> Result<StatusCode, ApiError> {
    if state.ledger.delete_dimension_value(dimension_id, &code)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "value {code} not found in dimension {dimension_id}"
        )))
    }
}

pub async fn list_account_combinations(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountCombination>>, ApiError> {
    Ok(Json(state.ledger.account_combinations()?))
}

pub async fn save_account_combinations(
    State(state): State<AppState>,
    Json(body): Json<Vec<AccountCombination>>,
) -> Result<StatusCode, ApiError> {
    state.ledger.save_account_combinations(body)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn healthz() -> &'static str {
    "ok"
}
