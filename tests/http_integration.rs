//! Integration tests for the resource managers against a mocked admin API
//!
//! These tests drive `ResourceManager` and `ApiClient` end to end over HTTP,
//! checking request shapes, notification counts and session handling.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tshop::api::session::TOKEN_KEY;
use tshop::api::{ApiClient, ApiError, CredentialStore, MemoryCredentialStore, SessionContext};
use tshop::entity::{open_view, Faq, OrderEntry, Tag, Variant, ViewContext};
use tshop::notification::{Severity, SharedNotifications};
use tshop::resource::{LoadOutcome, ManagerSettings, ResourceManager, SubmitOutcome};
use wiremock::matchers::{bearer_token, body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

struct Harness {
    client: ApiClient,
    notifications: SharedNotifications,
    store: Arc<MemoryCredentialStore>,
}

fn harness(server: &MockServer, token: Option<&str>) -> Harness {
    let store = Arc::new(match token {
        Some(token) => MemoryCredentialStore::with_token(token),
        None => MemoryCredentialStore::new(),
    });
    let notifications = SharedNotifications::default();
    let session = Arc::new(SessionContext::restore(store.clone()));
    let client = ApiClient::new(
        &server.uri(),
        Duration::from_secs(5),
        session,
        Arc::new(notifications.clone()),
    )
    .expect("mock server URI should be valid");
    Harness {
        client,
        notifications,
        store,
    }
}

impl Harness {
    fn manager<R: tshop::entity::Record>(&self) -> ResourceManager<R> {
        ResourceManager::new(
            self.client.clone(),
            Arc::new(self.notifications.clone()),
            ManagerSettings::default(),
        )
        .expect("resource should be registered")
    }
}

fn tag_json(id: &str, name: &str) -> serde_json::Value {
    json!({"id": id, "name": name, "slug": name.to_lowercase(), "active": true})
}

mod loading {
    use super::*;

    /// A failed list fetch shows exactly one error and leaves the list empty
    #[tokio::test]
    async fn test_load_failure_notifies_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let tags = h.manager::<Tag>();

        assert_eq!(tags.load().await, LoadOutcome::Failed);
        assert!(tags.items().is_empty());
        assert!(!tags.is_loading());
        assert!(!tags.has_loaded());

        let history = h.notifications.snapshot();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].severity, Severity::Error);
    }

    /// A failed re-fetch keeps the last good collection on screen
    #[tokio::test]
    async fn test_failure_after_load_keeps_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([tag_json("t1", "Summer"), tag_json("t2", "Winter")])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let tags = h.manager::<Tag>();
        assert_eq!(tags.load().await, LoadOutcome::Applied);
        assert!(h.notifications.is_empty());

        assert_eq!(tags.load().await, LoadOutcome::Failed);
        let ids: Vec<String> = tags.items().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert!(tags.has_loaded());
        assert!(!tags.is_loading());

        let history = h.notifications.snapshot();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].severity, Severity::Error);
    }

    /// Bare arrays and `data` envelopes both decode
    #[tokio::test]
    async fn test_load_sends_token_and_decodes_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .and(bearer_token(TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                tag_json("t1", "Summer"),
                tag_json("t2", "Winter"),
                {"name": "missing id"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let tags = h.manager::<Tag>();

        assert_eq!(tags.load().await, LoadOutcome::Applied);
        let names: Vec<String> = tags.items().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Summer", "Winter"]);
        assert!(h.notifications.is_empty());
    }

    /// A scoped view sends its parent id as a query parameter
    #[tokio::test]
    async fn test_scoped_view_sends_parent_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/variants"))
            .and(query_param("productId", "p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "v1", "productId": "p1", "name": "Small", "status": true}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "p1", "title": "Shirt"}]
            })))
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let ctx = ViewContext {
            client: h.client.clone(),
            notifier: Arc::new(h.notifications.clone()),
            settings: ManagerSettings::default(),
        };
        let view = open_view("variants", &ctx, Some(("productId".into(), "p1".into())))
            .expect("variants view");

        assert_eq!(view.load().await, LoadOutcome::Applied);
        let page = view.page_view();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].id, "v1");
        assert_eq!(view.dependency_options("productId"), vec![("p1".into(), "Shirt".into())]);
    }

    /// An older response arriving after a newer one is dropped
    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([tag_json("old", "Old")]))
                    .set_delay(Duration::from_millis(500)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([tag_json("new", "New")])))
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let tags = h.manager::<Tag>();

        let slow = tokio::spawn({
            let tags = tags.clone();
            async move { tags.load().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(tags.load().await, LoadOutcome::Applied);
        assert_eq!(slow.await.unwrap(), LoadOutcome::Discarded);

        let ids: Vec<String> = tags.items().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["new"]);
    }

    /// Closing the view abandons the in-flight load without side effects
    #[tokio::test]
    async fn test_close_cancels_in_flight_load() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"message": "late failure"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let tags = h.manager::<Tag>();

        let pending = tokio::spawn({
            let tags = tags.clone();
            async move { tags.load().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        tags.close();

        let outcome = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .expect("load should stop promptly after close")
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(h.notifications.is_empty());
        assert_eq!(tags.load().await, LoadOutcome::Discarded);
    }
}

mod mutations {
    use super::*;

    fn variant_list(status: bool) -> serde_json::Value {
        json!({"data": [{"id": "v1", "productId": "p1", "name": "Small", "status": status}]})
    }

    /// Toggle sends only the flipped status, then re-fetches the list
    #[tokio::test]
    async fn test_toggle_patches_status_and_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/variants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(variant_list(true)))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/variants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(variant_list(false)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/admin/variants/v1"))
            .and(body_json(json!({"status": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let variants = h.manager::<Variant>();
        assert_eq!(variants.load().await, LoadOutcome::Applied);

        assert!(variants.toggle_status("v1").await);
        assert!(!variants.find("v1").unwrap().status);
        assert!(!variants.is_mutating());

        let history = h.notifications.snapshot();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].severity, Severity::Success);
    }

    /// Client-side validation failures never reach the server
    #[tokio::test]
    async fn test_invalid_faq_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/faqs"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let faqs = h.manager::<Faq>();

        let mut draft = faqs.template();
        draft.set("question", "Too short");
        draft.set("answer", "Long enough to pass validation");

        match faqs.create(draft).await {
            SubmitOutcome::Rejected(draft) => {
                assert_eq!(
                    draft.error("question"),
                    Some("Question must be at least 10 characters")
                );
                assert_eq!(draft.error("answer"), None);
            }
            SubmitOutcome::Saved => panic!("invalid draft was saved"),
        }
        assert!(h.notifications.is_empty());
    }

    /// A 409 naming a field lands on that field instead of a toast
    #[tokio::test]
    async fn test_conflict_maps_to_field_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/tags"))
            .and(body_partial_json(json!({"name": "Summer Sale", "slug": "summer-sale"})))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "Slug already exists",
                "field": "slug"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let tags = h.manager::<Tag>();

        let mut draft = tags.template();
        draft.set("name", "Summer Sale");
        assert_eq!(draft.value("slug"), "summer-sale");

        match tags.create(draft).await {
            SubmitOutcome::Rejected(draft) => {
                assert_eq!(draft.error("slug"), Some("Slug already exists"));
            }
            SubmitOutcome::Saved => panic!("conflicting draft was saved"),
        }
        assert!(h.notifications.is_empty());
        assert!(!tags.is_mutating());
    }

    /// Order edits only carry the status, so they go out as PATCH
    #[tokio::test]
    async fn test_order_edit_patches_status() {
        let order = |status: &str| {
            json!({"data": {"orders": [{
                "id": "o1",
                "orderNumber": "ORD-1001",
                "customerName": "Ada",
                "total": 42.0,
                "status": status
            }]}})
        };
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(order("pending")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(order("shipped")))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/admin/orders/o1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/admin/orders/o1"))
            .and(body_json(json!({"status": "shipped"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let orders = h.manager::<OrderEntry>();
        assert_eq!(orders.load().await, LoadOutcome::Applied);

        let mut draft = orders.draft_for("o1").expect("o1 is loaded");
        assert_eq!(draft.value("status"), "pending");
        draft.set("status", "shipped");

        assert!(matches!(orders.update("o1", draft).await, SubmitOutcome::Saved));
        assert_eq!(orders.find("o1").unwrap().status, "shipped");
    }

    /// Delete goes out only with a confirmed request, then re-fetches
    #[tokio::test]
    async fn test_delete_after_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([tag_json("t1", "Summer"), tag_json("t2", "Winter")])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([tag_json("t2", "Winter")])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/admin/tags/t1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let tags = h.manager::<Tag>();
        assert_eq!(tags.load().await, LoadOutcome::Applied);

        assert!(tags.delete_request("missing").is_none());
        let request = tags.delete_request("t1").expect("t1 is loaded");
        assert!(request.message().contains("Summer"));

        assert!(tags.delete(request.confirm()).await);
        assert_eq!(tags.items().len(), 1);
        assert!(tags.find("t1").is_none());
    }
}

mod session {
    use super::*;

    /// Sign-in stores the token and later calls carry it
    #[tokio::test]
    async fn test_sign_in_stores_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/auth/login"))
            .and(body_json(json!({"email": "ada@shop.test", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "token": "fresh-token",
                    "user": {"email": "ada@shop.test", "name": "Ada"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/tags"))
            .and(bearer_token("fresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, None);
        let tags = h.manager::<Tag>();
        assert_eq!(tags.load().await, LoadOutcome::SignedOut);

        let user = h.client.sign_in("ada@shop.test", "secret").await.unwrap();
        assert_eq!(user.display_name(), "Ada");
        assert!(h.client.session().is_active());
        assert_eq!(h.store.get(TOKEN_KEY).as_deref(), Some("fresh-token"));

        assert_eq!(tags.load().await, LoadOutcome::Applied);
    }

    /// Bad credentials are returned to the caller without a global toast
    #[tokio::test]
    async fn test_sign_in_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
            .mount(&server)
            .await;

        let h = harness(&server, None);
        let result = h.client.sign_in("ada@shop.test", "wrong").await;

        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert!(!h.client.session().is_active());
        assert!(h.notifications.is_empty());
        assert!(h.store.get(TOKEN_KEY).is_none());
    }

    /// Parallel 401s end the session once and show one notification
    #[tokio::test]
    async fn test_unauthorized_tears_down_session_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let h = harness(&server, Some(TOKEN));
        let variants = h.manager::<Variant>();

        assert_eq!(variants.load().await, LoadOutcome::Failed);
        assert!(!h.client.session().is_active());
        assert!(h.store.get(TOKEN_KEY).is_none());
        assert_eq!(h.notifications.len(), 1);

        // Signed out now, so nothing more is sent
        assert_eq!(variants.load().await, LoadOutcome::SignedOut);
        assert_eq!(h.notifications.len(), 1);
    }
}
