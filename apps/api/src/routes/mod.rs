pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::lists::handlers as lists;
use crate::notify::handlers as notifications;
use crate::state::AppState;
use crate::support::handlers as support;
use crate::tasks::handlers as tasks;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Lists
        .route("/api/v1/lists/:list", get(lists::handle_list))
        .route(
            "/api/v1/lists/:list/:id/template",
            post(lists::handle_assign_template),
        )
        .route(
            "/api/v1/lists/:list/:id/status",
            post(lists::handle_advance_status).delete(lists::handle_revert_status),
        )
        .route(
            "/api/v1/lists/:list/:id/discard",
            post(lists::handle_discard),
        )
        .route(
            "/api/v1/lists/:list/:id/promote",
            post(lists::handle_promote),
        )
        .route(
            "/api/v1/lists/:list/:id/copy-template",
            post(lists::handle_copy_template),
        )
        .route("/api/v1/dashboard", get(lists::handle_dashboard))
        // Templates
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route("/api/v1/templates/:id", put(templates::handle_save_template))
        // Notifications
        .route(
            "/api/v1/notifications",
            get(notifications::handle_list_notifications),
        )
        .route(
            "/api/v1/notifications/:id",
            delete(notifications::handle_dismiss_notification),
        )
        // Outbound tasks
        .route(
            "/api/v1/support-tickets",
            post(support::handle_submit_ticket),
        )
        .route(
            "/api/v1/tasks/:id",
            get(tasks::handle_get_task).delete(tasks::handle_cancel_task),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::clock::FixedClock;
    use crate::config::Config;
    use crate::lists::clipboard::{Clipboard, ClipboardError, MemoryClipboard};
    use crate::models::record::RecordId;
    use crate::notify::NotificationRelay;
    use crate::seed::{build_workspace, demo_seed};
    use crate::support::SimulatedDesk;

    struct BrokenClipboard;

    #[async_trait::async_trait]
    impl Clipboard for BrokenClipboard {
        async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError("no display attached".to_string()))
        }
    }

    struct StuckClipboard;

    #[async_trait::async_trait]
    impl Clipboard for StuckClipboard {
        async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    struct TestApp {
        state: AppState,
        clipboard: Arc<MemoryClipboard>,
    }

    impl TestApp {
        fn new() -> Self {
            let clipboard = Arc::new(MemoryClipboard::default());
            TestApp {
                state: Self::state_with(clipboard.clone()),
                clipboard,
            }
        }

        /// App whose copy-template calls go to `clipboard` instead.
        fn with_clipboard(clipboard: Arc<dyn Clipboard>) -> Self {
            TestApp {
                state: Self::state_with(clipboard),
                clipboard: Arc::new(MemoryClipboard::default()),
            }
        }

        fn state_with(clipboard: Arc<dyn Clipboard>) -> AppState {
            let config = Config::default();
            let workspace = build_workspace(demo_seed(), &config).unwrap();
            AppState::new(
                workspace,
                NotificationRelay::new(config.notification_ttl),
                Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap())),
                clipboard,
                Arc::new(SimulatedDesk::new(Duration::from_millis(1000))),
                config,
            )
        }

        async fn all_lists(&self) -> Vec<Value> {
            let mut lists = Vec::new();
            for list in ["prospects", "outbounds", "discarded"] {
                let (_, body) = self.get(&format!("/api/v1/lists/{list}")).await;
                lists.push(body["records"].clone());
            }
            lists
        }

        async fn prospect_id(&self, name: &str) -> RecordId {
            let ws = self.state.workspace.read().await;
            ws.lists
                .prospects
                .records()
                .iter()
                .find(|r| r.contact.name == name)
                .unwrap()
                .id
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = build_router(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Request::get(uri).body(Body::empty()).unwrap())
                .await
        }

        async fn call(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let (status, body) = app.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "everleads-api");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/v1/lists/prospects?search=CHEN").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        let records = body["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Mike Chen");
        assert_eq!(records[0]["followers_display"], "1.5K");
    }

    #[tokio::test]
    async fn test_sort_descending_by_followers() {
        let app = TestApp::new();
        let (_, body) = app
            .get("/api/v1/lists/discarded?sort=followers&direction=desc")
            .await;
        let names: Vec<&str> = body["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Lisa Wang", "John Smith"]);
    }

    #[tokio::test]
    async fn test_toggle_flips_direction_of_current_sort() {
        let app = TestApp::new();
        let (status, body) = app
            .get("/api/v1/lists/discarded?sort=name&direction=asc&toggle=name")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"]["sort"]["direction"], "desc");
        assert_eq!(body["records"][0]["name"], "Lisa Wang");
    }

    #[tokio::test]
    async fn test_bad_path_segments_use_error_envelope() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/v1/lists/archived").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = app
            .call("POST", "/api/v1/lists/prospects/not-a-uuid/discard", json!({}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = app
            .call("POST", &format!("/api/v1/lists/discarded/{}/discard", RecordId::new()), json!({}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = app.get("/api/v1/tasks/12345").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_bad_query_and_body_use_error_envelope() {
        let app = TestApp::new();
        let (status, body) = app
            .get("/api/v1/lists/prospects?sort=name&direction=sideways")
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let id = app.prospect_id("Sarah Johnson").await;
        let (status, body) = app
            .send(
                Request::post(format!("/api/v1/lists/prospects/{id}/status"))
                    .header("content-type", "application/json")
                    .body(Body::from("{\"status\": "))
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_sort_field_is_rejected() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/v1/lists/prospects?sort=zzz").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_discard_moves_record_and_notifies() {
        let app = TestApp::new();
        let id = app.prospect_id("Sarah Johnson").await;

        let (status, body) = app
            .call("POST", &format!("/api/v1/lists/prospects/{id}/discard"), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], true);
        assert_eq!(body["record"]["discarded_date"], "2024-03-20");

        let (_, prospects) = app.get("/api/v1/lists/prospects").await;
        assert_eq!(prospects["total"], 1);
        let (_, discarded) = app.get("/api/v1/lists/discarded").await;
        assert_eq!(discarded["total"], 3);

        let (_, notes) = app.get("/api/v1/notifications").await;
        assert_eq!(notes[0]["message"], "Sarah Johnson moved to Discarded");
        assert_eq!(notes[0]["severity"], "success");
    }

    #[tokio::test]
    async fn test_action_on_missing_record_is_noop() {
        let app = TestApp::new();
        let id = RecordId::new();
        let (status, body) = app
            .call("POST", &format!("/api/v1/lists/outbounds/{id}/discard"), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);
        let (_, discarded) = app.get("/api/v1/lists/discarded").await;
        assert_eq!(discarded["total"], 2);
    }

    #[tokio::test]
    async fn test_advance_status_stamps_date() {
        let app = TestApp::new();
        let id = app.prospect_id("Sarah Johnson").await;
        let (status, body) = app
            .call(
                "POST",
                &format!("/api/v1/lists/prospects/{id}/status"),
                json!({"status": "contacted"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["status"], "contacted");
        assert_eq!(body["record"]["status_changed_at"], "2024-03-20");

        let (status, body) = app
            .call("DELETE", &format!("/api/v1/lists/prospects/{id}/status"), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["status"], "new");
        assert!(body["record"]["status_changed_at"].is_null());
    }

    #[tokio::test]
    async fn test_illegal_transition_is_unprocessable() {
        let app = TestApp::new();
        let id = app.prospect_id("Sarah Johnson").await;
        let (status, _) = app
            .call(
                "POST",
                &format!("/api/v1/lists/prospects/{id}/status"),
                json!({"status": "responded"}),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_idempotency_key_replays_receipt() {
        let app = TestApp::new();
        let id = app.prospect_id("Mike Chen").await;
        let uri = format!("/api/v1/lists/prospects/{id}/promote");
        let request = || {
            Request::post(uri.as_str())
                .header("idempotency-key", "promote-mike")
                .body(Body::empty())
                .unwrap()
        };

        let (first_status, first) = app.send(request()).await;
        let (second_status, second) = app.send(request()).await;
        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(first["applied"], true);
        assert_eq!(first["record"]["status"], "not_contacted");
        assert_eq!(first["record"]["assigned_template"], "A");

        let (_, outbounds) = app.get("/api/v1/lists/outbounds").await;
        assert_eq!(outbounds["total"], 3);

        let (status, _) = app
            .send(
                Request::post(format!("/api/v1/lists/prospects/{id}/discard"))
                    .header("idempotency-key", "promote-mike")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_promote_only_from_prospects() {
        let app = TestApp::new();
        let id = RecordId::new();
        let (status, _) = app
            .call("POST", &format!("/api/v1/lists/outbounds/{id}/promote"), json!({}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_copy_template_fills_first_name() {
        let app = TestApp::new();
        let id = app.prospect_id("Mike Chen").await;
        let (status, body) = app
            .call(
                "POST",
                &format!("/api/v1/lists/prospects/{id}/copy-template"),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["copied"], true);
        let copied = app.clipboard.contents().unwrap();
        assert!(copied.starts_with("Hi Mike,"));
        assert_eq!(body["text"], copied.as_str());
    }

    #[tokio::test]
    async fn test_clipboard_failure_reports_error_and_keeps_lists() {
        let app = TestApp::with_clipboard(Arc::new(BrokenClipboard));
        let id = app.prospect_id("Mike Chen").await;
        let before = app.all_lists().await;

        let (status, body) = app
            .call(
                "POST",
                &format!("/api/v1/lists/prospects/{id}/copy-template"),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "EXTERNAL_ERROR");

        let (_, notes) = app.get("/api/v1/notifications").await;
        assert_eq!(notes.as_array().unwrap().len(), 1);
        assert_eq!(notes[0]["severity"], "error");
        assert!(notes[0]["message"]
            .as_str()
            .unwrap()
            .contains("no display attached"));
        assert_eq!(app.all_lists().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clipboard_timeout_reports_error_and_keeps_lists() {
        let app = TestApp::with_clipboard(Arc::new(StuckClipboard));
        let id = app.prospect_id("Mike Chen").await;
        let before = app.all_lists().await;

        let (status, body) = app
            .call(
                "POST",
                &format!("/api/v1/lists/prospects/{id}/copy-template"),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "TIMEOUT");

        let notes = app.state.relay.pending();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, crate::notify::relay::Severity::Error);
        assert_eq!(app.all_lists().await, before);
    }

    #[tokio::test]
    async fn test_copy_without_template_is_unprocessable() {
        let app = TestApp::new();
        let id = app.prospect_id("Sarah Johnson").await;
        let (status, _) = app
            .call(
                "POST",
                &format!("/api/v1/lists/prospects/{id}/copy-template"),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(app.clipboard.contents().is_none());
    }

    #[tokio::test]
    async fn test_assign_unknown_template_rejected() {
        let app = TestApp::new();
        let id = app.prospect_id("Sarah Johnson").await;
        let (status, _) = app
            .call(
                "POST",
                &format!("/api/v1/lists/prospects/{id}/template"),
                json!({"template_id": "E"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_save_template_reports_each_field() {
        let app = TestApp::new();
        let (status, body) = app
            .call(
                "PUT",
                "/api/v1/templates/C",
                json!({"descriptor": "", "body": "x".repeat(305)}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["descriptor", "body"]);

        let (_, listing) = app.get("/api/v1/templates").await;
        assert_eq!(listing["templates"].as_array().unwrap().len(), 2);
        assert_eq!(listing["body_max"], 300);
    }

    #[tokio::test]
    async fn test_save_template_then_assign() {
        let app = TestApp::new();
        let (status, body) = app
            .call(
                "PUT",
                "/api/v1/templates/e",
                json!({"descriptor": "Breakup", "body": "Hi {first_name}, closing the loop."}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "E");

        let id = app.prospect_id("Sarah Johnson").await;
        let (status, body) = app
            .call(
                "POST",
                &format!("/api/v1/lists/prospects/{id}/template"),
                json!({"template_id": "E"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["assigned_template"], "E");
    }

    #[tokio::test]
    async fn test_dismiss_notification() {
        let app = TestApp::new();
        let note = app.state.relay.success("Saved").unwrap();
        let (status, _) = app
            .call("DELETE", &format!("/api/v1/notifications/{}", note.0), json!({}))
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app
            .call("DELETE", &format!("/api/v1/notifications/{}", note.0), json!({}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_support_ticket_rejected() {
        let app = TestApp::new();
        let (status, body) = app
            .call(
                "POST",
                "/api/v1/support-tickets",
                json!({"subject": " ", "message": "help"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"][0]["field"], "subject");
    }

    #[tokio::test(start_paused = true)]
    async fn test_support_ticket_runs_as_task() {
        let app = TestApp::new();
        let (status, body) = app
            .call(
                "POST",
                "/api/v1/support-tickets",
                json!({"subject": "Billing", "message": "Invoice is wrong"}),
            )
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let task = body["task_id"].as_str().unwrap().to_string();

        let (_, pending) = app.get(&format!("/api/v1/tasks/{task}")).await;
        assert_eq!(pending["state"], "pending");

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let (_, done) = app.get(&format!("/api/v1/tasks/{task}")).await;
        assert_eq!(done["state"], "resolved");
        assert!(app
            .state
            .relay
            .pending()
            .iter()
            .any(|n| n.message == "Support ticket submitted successfully!"));
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/v1/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prospects"]["total"], 2);
        assert_eq!(body["prospects"]["by_status"]["contacted"], 1);
        assert_eq!(body["outbounds"]["by_status"]["responded"], 1);
        assert_eq!(body["discarded"], 2);
        assert_eq!(body["templates"], 2);
    }
}
