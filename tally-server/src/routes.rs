use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{self, AppState};

/// Builds the full application router. The ledger surface sits under
/// `/api/v1/general_ledger`, matching the original API prefix.
pub fn build_router(state: AppState) -> Router {
    let ledger = Router::new()
        .route(
            "/general_journals",
            post(handlers::create_journal).get(handlers::list_journals),
        )
        .route(
            "/general_journals/:journal_id",
            get(handlers::get_journal).patch(handlers::post_journal),
        )
        .route(
            "/general_journals/:journal_id/lines",
            get(handlers::list_lines).put(handlers::upsert_lines),
        )
        .route(
            "/general_journals/:journal_id/lines/:line_id",
            delete(handlers::delete_line),
        )
        .route("/trial_balance", get(handlers::trial_balance))
        .route(
            "/main_accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route("/main_accounts/delete", post(handlers::delete_accounts))
        .route(
            "/financial_dimensions",
            get(handlers::list_dimensions).put(handlers::update_dimension),
        )
        .route(
            "/financial_dimensions/:dimension_id/values",
            get(handlers::list_dimension_values).post(handlers::add_dimension_value),
        )
        .route(
            "/financial_dimensions/:dimension_id/values/:code",
            delete(handlers::delete_dimension_value),
        )
        .route(
            "/account_combinations",
            get(handlers::list_account_combinations).post(handlers::save_account_combinations),
        );

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .nest("/api/v1/general_ledger", ledger)
        .with_state(state)
}
