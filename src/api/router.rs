//! REST router over the mock store.
//!
//! Returns a composable `Router` with every route under `/api/v1`.
//!
//! Middleware stack for protected routes (outermost → innermost):
//! 1. Extension(ApiContext) → 2. Auth validator → 3. Access logger

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::auth::AuthService;
use crate::store::MockStore;

/// Mount point of every route.
pub const API_PREFIX: &str = "/api/v1";

/// Build the REST router over `store` and `auth`.
pub fn api_router(store: Arc<MockStore>, auth: Arc<AuthService>) -> Router {
    build_router(ApiContext::new(store, auth))
}

/// Build router from a pre-constructed `ApiContext`.
pub fn api_router_with_ctx(ctx: ApiContext) -> Router {
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // Layers wrap the routes added before them, bottom-most outermost.
    // Extension must be outermost so the auth middleware can read ApiContext.
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/me", get(endpoints::auth::me))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::remove),
        )
        .route(
            "/prescriptions",
            get(endpoints::prescriptions::list).post(endpoints::prescriptions::create),
        )
        .route(
            "/prescriptions/:id",
            get(endpoints::prescriptions::detail)
                .put(endpoints::prescriptions::update)
                .delete(endpoints::prescriptions::remove),
        )
        .route("/analytics", get(endpoints::analytics::summary))
        .route("/integrity", get(endpoints::analytics::integrity))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/medications", get(endpoints::medications::list))
        .route("/medications/search", get(endpoints::medications::search))
        .route("/medications/classes/", get(endpoints::medications::classes))
        .route("/medications/:id", get(endpoints::medications::detail))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    Router::new()
        .nest(API_PREFIX, protected.merge(public))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AuthLatency;
    use crate::db::{KeyValueStorage, MemoryStorage};
    use crate::store::SeedData;

    fn test_ctx() -> ApiContext {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let store = MockStore::open(
            storage.clone(),
            SeedData::demo(),
            crate::config::StoreOptions::instant(),
        )
        .unwrap();
        let auth = AuthService::new(storage, AuthLatency::none()).unwrap();
        ApiContext::new(Arc::new(store), Arc::new(auth))
    }

    async fn demo_token(ctx: &ApiContext) -> String {
        ctx.auth
            .login(crate::auth::DEMO_EMAIL, "")
            .await
            .unwrap()
            .token
            .access_token
    }

    fn make_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = api_router_with_ctx(test_ctx());
        let response = app
            .oneshot(make_request("GET", "/api/v1/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn patients_require_auth() {
        let app = api_router_with_ctx(test_ctx());
        let response = app
            .oneshot(make_request("GET", "/api/v1/patients", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let app = api_router_with_ctx(test_ctx());
        let response = app
            .oneshot(make_request("GET", "/api/v1/patients", Some("demo_token_nope"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn form_login_then_list_patients() {
        let ctx = test_ctx();
        let app = api_router_with_ctx(ctx);

        let login = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from("username=doctor1%40medai.com&password=x"))
            .unwrap();
        let response = app.clone().oneshot(login).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["token_type"], "bearer");
        let token = json["access_token"].as_str().unwrap().to_string();
        assert!(token.starts_with("demo_token_"));

        let response = app
            .oneshot(make_request("GET", "/api/v1/patients", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 8);
        assert_eq!(json[0]["lab_results"]["МНО"], 2.1);
    }

    #[tokio::test]
    async fn login_unknown_email_is_401() {
        let app = api_router_with_ctx(test_ctx());
        let login = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from("username=ghost%40medai.com&password=x"))
            .unwrap();
        let response = app.oneshot(login).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn register_then_duplicate_conflicts() {
        let app = api_router_with_ctx(test_ctx());
        let payload = json!({"email": "new@medai.com", "password": "pw", "full_name": "Новый Врач"});

        let response = app
            .clone()
            .oneshot(make_request("POST", "/api/v1/auth/register", None, Some(payload.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["email"], "new@medai.com");

        let response = app
            .oneshot(make_request("POST", "/api/v1/auth/register", None, Some(payload)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn me_returns_authenticated_doctor() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);
        let response = app
            .oneshot(make_request("GET", "/api/v1/auth/me", Some(&token), None))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["id"], 1);
        assert_eq!(json["email"], "doctor1@medai.com");
    }

    #[tokio::test]
    async fn missing_patient_is_localized_404() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);
        let response = app
            .oneshot(make_request("GET", "/api/v1/patients/999", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Пациент не найден");
    }

    #[tokio::test]
    async fn patient_crud_round() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);

        let create = json!({"full_name": "Орлова Вера", "age": 71, "gender": "female"});
        let response = app
            .clone()
            .oneshot(make_request("POST", "/api/v1/patients", Some(&token), Some(create)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["doctor_id"], 1);
        let id = created["id"].as_i64().unwrap();
        assert!(id > 8);

        let uri = format!("/api/v1/patients/{id}");
        let response = app
            .clone()
            .oneshot(make_request("PUT", &uri, Some(&token), Some(json!({"diagnosis": "ТГВ"}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["diagnosis"], "ТГВ");
        assert_eq!(updated["full_name"], "Орлова Вера");

        let response = app
            .clone()
            .oneshot(make_request("DELETE", &uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Пациент удален");

        let response = app
            .oneshot(make_request("DELETE", &uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_patient_is_422() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);
        let create = json!({"full_name": " ", "age": 40, "gender": "male"});
        let response = app
            .oneshot(make_request("POST", "/api/v1/patients", Some(&token), Some(create)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn other_doctor_sees_nothing() {
        let ctx = test_ctx();
        let session = ctx
            .auth
            .register(crate::models::RegisterData {
                email: "other@medai.com".into(),
                password: "pw".into(),
                full_name: None,
                specialty: None,
                workplace: None,
                medical_license: None,
                phone: None,
            })
            .await
            .unwrap();
        let token = session.token.access_token;
        let app = api_router_with_ctx(ctx);

        let response = app
            .clone()
            .oneshot(make_request("GET", "/api/v1/patients", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!([]));

        let response = app
            .clone()
            .oneshot(make_request("GET", "/api/v1/patients/1", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(make_request("DELETE", "/api/v1/prescriptions/1", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn creates_answer_200_with_the_record() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);

        let create = json!({"patient_id": 1, "instructions": "Принимать утром"});
        let response = app
            .oneshot(make_request("POST", "/api/v1/prescriptions", Some(&token), Some(create)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["patient_id"], 1);
        assert_eq!(created["doctor_id"], 1);
        assert_eq!(created["status"], "draft");
    }

    #[tokio::test]
    async fn medication_catalog_is_open_and_filterable() {
        let app = api_router_with_ctx(test_ctx());

        let response = app
            .clone()
            .oneshot(make_request("GET", "/api/v1/medications", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);

        let uri = "/api/v1/medications?drug_class=%D0%9D%D0%9F%D0%92%D0%A1";
        let json = body_json(app.clone().oneshot(make_request("GET", uri, None, None)).await.unwrap()).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["name"], "Аспирин");

        let json = body_json(
            app.clone()
                .oneshot(make_request("GET", "/api/v1/medications?skip=1&limit=1", None, None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], 2);

        let json = body_json(
            app.oneshot(make_request("GET", "/api/v1/medications/classes/", None, None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json, json!(["Бигуаниды", "Блокаторы кальциевых каналов", "НПВС"]));
    }

    #[tokio::test]
    async fn medication_search_and_detail() {
        let app = api_router_with_ctx(test_ctx());

        // q=мет
        let uri = "/api/v1/medications/search?q=%D0%BC%D0%B5%D1%82";
        let response = app.clone().oneshot(make_request("GET", uri, None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["name"], "Метформин");
        assert_eq!(json[0]["available_dosages"][2], "1000 мг");
        assert!(json[0].get("drug_interactions").is_none());

        let response = app
            .clone()
            .oneshot(make_request("GET", "/api/v1/medications/search?q=a&limit=51", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .clone()
            .oneshot(make_request("GET", "/api/v1/medications/3", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["generic_name"], "Амлодипин безилат");

        let response = app
            .oneshot(make_request("GET", "/api/v1/medications/42", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["message"], "Препарат не найден");
    }

    #[tokio::test]
    async fn prescriptions_filter_by_query() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);

        let response = app
            .clone()
            .oneshot(make_request("GET", "/api/v1/prescriptions?status=draft", Some(&token), None))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], 8);

        let response = app
            .oneshot(make_request(
                "GET",
                "/api/v1/prescriptions?sort_by=date&order=asc&limit=2",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        let ids: Vec<i64> = body_json(response)
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|rx| rx["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![8, 7]);
    }

    #[tokio::test]
    async fn prescription_for_unknown_patient_is_404() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);
        let create = json!({"patient_id": 404, "instructions": "test"});
        let response = app
            .oneshot(make_request("POST", "/api/v1/prescriptions", Some(&token), Some(create)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn illegal_status_change_is_422() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);
        let response = app
            .oneshot(make_request(
                "PUT",
                "/api/v1/prescriptions/7",
                Some(&token),
                Some(json!({"status": "draft"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn analytics_summarizes_doctor_data() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);
        let response = app
            .oneshot(make_request("GET", "/api/v1/analytics", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_patients"], 8);
        assert_eq!(json["age_groups"]["71+"], 2);
        assert_eq!(json["prescription_stats"]["draft"], 1);
    }

    #[tokio::test]
    async fn integrity_reports_orphans_after_patient_delete() {
        let ctx = test_ctx();
        let token = demo_token(&ctx).await;
        let app = api_router_with_ctx(ctx);

        let response = app
            .clone()
            .oneshot(make_request("DELETE", "/api/v1/patients/2", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(make_request("GET", "/api/v1/integrity", Some(&token), None))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["issues"][0]["category"], "orphan_prescription");
        assert_eq!(json["issues"][0]["prescription_id"], 2);
    }
}
