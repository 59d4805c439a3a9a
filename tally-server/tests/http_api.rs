use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tally_ledger::{Ledger, MemoryLedgerStore};
use tally_server::{seed, AppState, PaginationConfig};
use tower::ServiceExt;

const PREFIX: &str = "/api/v1/general_ledger";

fn app() -> Router {
    app_with_seed(false)
}

fn app_with_seed(seed_demo: bool) -> Router {
    let store = Arc::new(MemoryLedgerStore::new());
    if seed_demo {
        seed::apply(store.as_ref()).unwrap();
    }
    let ledger = Arc::new(Ledger::open(store).unwrap());
    tally_server::build_router(AppState {
        ledger,
        pagination: PaginationConfig {
            default_limit: 50,
            max_limit: 200,
        },
    })
}

async fn send(app: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn balanced_lines(amount: &str) -> Value {
    json!([
        { "account": "1000", "debit": amount, "credit": "0" },
        { "account": "4000", "debit": "0", "credit": amount },
    ])
}

#[tokio::test]
async fn create_returns_201_with_draft_header() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{PREFIX}/general_journals"),
        Some(json!({
            "document_date": "2025-01-15",
            "type": "Accrual",
            "description": "Accrual for utilities"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["journalID"], "GJ-000001");
    assert_eq!(body["status"], "draft");
    assert_eq!(body["type"], "Accrual");
}

#[tokio::test]
async fn unknown_journal_is_404() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("{PREFIX}/general_journals/GJ-000404"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn posting_balanced_journal_succeeds() {
    let app = app();
    send(
        &app,
        Method::POST,
        &format!("{PREFIX}/general_journals"),
        Some(json!({
            "document_date": "2025-01-15",
            "type": "Accrual",
            "description": "test"
        })),
    )
    .await;
    send(
        &app,
        Method::PUT,
        &format!("{PREFIX}/general_journals/GJ-000001/lines"),
        Some(balanced_lines("3000.00")),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("{PREFIX}/general_journals/GJ-000001"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "posted");
}

#[tokio::test]
async fn posting_unbalanced_journal_reports_both_totals() {
    let app = app();
    send(
        &app,
        Method::POST,
        &format!("{PREFIX}/general_journals"),
        Some(json!({
            "document_date": "2025-01-15",
            "type": "Accrual",
            "description": "test"
        })),
    )
    .await;
    send(
        &app,
        Method::PUT,
        &format!("{PREFIX}/general_journals/GJ-000001/lines"),
        Some(json!([
            { "account": "1000", "debit": "10000.00", "credit": "0" },
            { "account": "4000", "debit": "0", "credit": "9999.99" },
        ])),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("{PREFIX}/general_journals/GJ-000001"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("10000.00"), "message: {message}");
    assert!(message.contains("9999.99"), "message: {message}");
}

#[tokio::test]
async fn posting_empty_journal_is_rejected() {
    let app = app();
    send(
        &app,
        Method::POST,
        &format!("{PREFIX}/general_journals"),
        Some(json!({
            "document_date": "2025-01-15",
            "type": "Accrual",
            "description": "no lines"
        })),
    )
    .await;
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("{PREFIX}/general_journals/GJ-000001"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation");
}

#[tokio::test]
async fn lines_of_empty_journal_are_404() {
    let app = app();
    send(
        &app,
        Method::POST,
        &format!("{PREFIX}/general_journals"),
        Some(json!({
            "document_date": "2025-01-15",
            "type": "Accrual",
            "description": "no lines"
        })),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("{PREFIX}/general_journals/GJ-000001/lines"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upsert_mints_ids_and_drops_omitted_lines() {
    let app = app();
    send(
        &app,
        Method::POST,
        &format!("{PREFIX}/general_journals"),
        Some(json!({
            "document_date": "2025-02-01",
            "type": "Payroll",
            "description": "payroll"
        })),
    )
    .await;
    let (_, first) = send(
        &app,
        Method::PUT,
        &format!("{PREFIX}/general_journals/GJ-000001/lines"),
        Some(balanced_lines("100.00")),
    )
    .await;
    assert_eq!(first[0]["lineID"], "1");
    assert_eq!(first[1]["lineID"], "2");

    // Resend only line 2 with an edit; line 1 must vanish.
    let (_, second) = send(
        &app,
        Method::PUT,
        &format!("{PREFIX}/general_journals/GJ-000001/lines"),
        Some(json!([
            { "lineID": "2", "account": "4000", "debit": "0", "credit": "250.00" },
        ])),
    )
    .await;
    assert_eq!(second.as_array().unwrap().len(), 1);
    assert_eq!(second[0]["lineID"], "2");

    let (_, stored) = send(
        &app,
        Method::GET,
        &format!("{PREFIX}/general_journals/GJ-000001/lines"),
        None,
    )
    .await;
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["credit"], "250.00");
}

#[tokio::test]
async fn delete_line_is_204_then_404() {
    let app = app();
    send(
        &app,
        Method::POST,
        &format!("{PREFIX}/general_journals"),
        Some(json!({
            "document_date": "2025-02-01",
            "type": "Payroll",
            "description": "payroll"
        })),
    )
    .await;
    send(
        &app,
        Method::PUT,
        &format!("{PREFIX}/general_journals/GJ-000001/lines"),
        Some(balanced_lines("5.00")),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("{PREFIX}/general_journals/GJ-000001/lines/1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("{PREFIX}/general_journals/GJ-000001/lines/1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pagination_walks_pages_without_overlap() {
    let app = app();
    for day in 1..=4 {
        send(
            &app,
            Method::POST,
            &format!("{PREFIX}/general_journals"),
            Some(json!({
                "document_date": format!("2025-01-{day:02}"),
                "type": "Accrual",
                "description": "page test"
            })),
        )
        .await;
    }

    let (_, first) = send(
        &app,
        Method::GET,
        &format!("{PREFIX}/general_journals?limit=2"),
        None,
    )
    .await;
    assert_eq!(first["items"].as_array().unwrap().len(), 2);
    assert_eq!(first["has_next"], true);
    assert_eq!(first["items"][0]["journalID"], "GJ-000004");

    let cursor = first["next_cursor"].as_str().unwrap();
    let (_, second) = send(
        &app,
        Method::GET,
        &format!("{PREFIX}/general_journals?limit=2&cursor={cursor}"),
        None,
    )
    .await;
    assert_eq!(second["items"].as_array().unwrap().len(), 2);
    assert_eq!(second["has_next"], false);
    assert_eq!(second["next_cursor"], Value::Null);
    assert_eq!(second["items"][1]["journalID"], "GJ-000001");
}

#[tokio::test]
async fn trial_balance_matches_seeded_activity() {
    let app = app_with_seed(true);
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("{PREFIX}/trial_balance?from_date=2025-01-01&to_date=2025-12-31"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    // 2025 demo entries touch Cash, Sales Revenue, and COGS.
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["account"], "1000");
    assert_eq!(rows[0]["debit"], "10000.00");
    assert_eq!(rows[0]["credit"], "4000.00");
    assert_eq!(rows[0]["balance"], "6000.00");
    assert_eq!(rows[1]["account"], "4000");
    assert_eq!(rows[1]["balance"], "-10000.00");
}

#[tokio::test]
async fn duplicate_account_is_400_and_count_is_unchanged() {
    let app = app_with_seed(true);
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{PREFIX}/main_accounts"),
        Some(json!({
            "account": "1000",
            "description": "Cash again",
            "type": "Asset"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "duplicate_key");

    let (_, accounts) = send(&app, Method::GET, &format!("{PREFIX}/main_accounts"), None).await;
    assert_eq!(accounts.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn bulk_account_delete_reports_removed_count() {
    let app = app_with_seed(true);
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{PREFIX}/main_accounts/delete"),
        Some(json!({ "accounts": ["2000", "3000", "9999"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);
}

#[tokio::test]
async fn dimension_value_lifecycle() {
    let app = app_with_seed(true);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{PREFIX}/financial_dimensions/1/values"),
        Some(json!({ "code": "03", "description": "Operations" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Duplicate within the same dimension is rejected.
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{PREFIX}/financial_dimensions/1/values"),
        Some(json!({ "code": "03", "description": "Operations" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "duplicate_key");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("{PREFIX}/financial_dimensions/1/values/03"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, values) = send(
        &app,
        Method::GET,
        &format!("{PREFIX}/financial_dimensions/1/values"),
        None,
    )
    .await;
    assert_eq!(values.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn account_combinations_list_and_save() {
    let app = app_with_seed(true);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("{PREFIX}/account_combinations"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let combos = body.as_array().unwrap();
    assert_eq!(combos.len(), 2);
    assert_eq!(combos[0]["account"], "4000");
    assert_eq!(combos[0]["dimensions"]["FD_1"], "01");
    assert_eq!(combos[0]["dimensions"]["FD_3"], Value::Null);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{PREFIX}/account_combinations"),
        Some(json!([{
            "account": "1000",
            "dimensions": { "FD_1": "02", "FD_2": null }
        }])),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("{PREFIX}/account_combinations"),
        None,
    )
    .await;
    let combos = body.as_array().unwrap();
    assert_eq!(combos.len(), 3);
    assert_eq!(combos[0]["account"], "1000");
}

#[tokio::test]
async fn updating_unknown_dimension_is_404() {
    let app = app_with_seed(true);
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("{PREFIX}/financial_dimensions"),
        Some(json!({ "id": 99, "name": "Ghost", "in_use": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn decimal_wire_format_is_exact() {
    // Guard against any float drift sneaking into serialization.
    assert_eq!(serde_json::to_string(&dec!(9999.99)).unwrap(), "\"9999.99\"");
}
