//! API routes

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::extractors::AppState;
use crate::handlers::{
    auth, dashboard, directory, material_requests, materials, photos, projects, users, work_logs,
};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api", api_router())
}

/// The API router bound to its state, with the configured body limit
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.server.max_body_size_bytes;
    router()
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .nest("/auth", auth_router())
        .nest("/users", users_router())
        .nest("/projects", projects_router())
        .nest("/work_logs", work_logs_router())
        .nest("/materials", materials_router())
        .nest("/material_requests", material_requests_router())
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/workers", get(directory::list_workers))
        .route("/suppliers", get(directory::list_suppliers))
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/password/forgot", post(auth::forgot_password))
        .route("/password/reset", post(auth::reset_password))
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user))
        .route("/me", get(users::me))
        .route(
            "/me/preferences",
            get(users::get_preferences).put(users::update_preferences),
        )
        .route(
            "/me/photo",
            get(photos::get_photo)
                .put(photos::upload_photo)
                .delete(photos::delete_photo),
        )
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route("/counts", get(projects::project_counts))
        .route("/loggable", get(projects::loggable_projects))
        .route("/:id", get(projects::get_project).put(projects::update_project))
}

fn work_logs_router() -> Router<AppState> {
    Router::new().route("/", get(work_logs::list_work_logs).post(work_logs::create_work_log))
}

fn materials_router() -> Router<AppState> {
    Router::new()
        .route("/", get(materials::list_materials))
        .route("/counts", get(materials::material_counts))
        .route("/logs", get(materials::list_movements).post(materials::log_material))
}

fn material_requests_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(material_requests::list_requests).post(material_requests::submit_request),
        )
        .route("/:id/approve", post(material_requests::approve_request))
        .route("/:id/reject", post(material_requests::reject_request))
        .route("/:id/fulfill", post(material_requests::fulfill_request))
}

async fn api_root(State(state): State<AppState>) -> Json<ApiRoot> {
    Json(ApiRoot {
        instance_name: state.config.instance.app_title.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRoot {
    instance_name: String,
    version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use bt_attachments::MemoryStorage;
    use bt_auth::{hash_password, MemorySessionStore};
    use bt_core::config::AppConfig;
    use bt_db::{seed_demo_data, MemoryStore};
    use bt_models::fixtures::{self, DEMO_PASSWORD};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    async fn test_app() -> Router {
        let hash = hash_password(DEMO_PASSWORD).unwrap();
        let users = fixtures::users()
            .into_iter()
            .map(|u| u.with_password_hash(hash.clone()))
            .collect();
        let store = MemoryStore::new();
        seed_demo_data(&store, users).await.unwrap();

        let mut config = AppConfig::default();
        config.auth.jwt_secret = "test-secret-key-at-least-32-bytes".into();
        app(AppState::new(
            config,
            Arc::new(store),
            Arc::new(MemorySessionStore::new()),
            Arc::new(MemoryStorage::new()),
        ))
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn read_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, read_json(response).await)
    }

    async fn login(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": DEMO_PASSWORD })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_requests_without_credentials_are_rejected() {
        let app = test_app().await;

        let (status, body) = send(&app, request(Method::GET, "/api/projects", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let (status, _) = send(
            &app,
            request(Method::GET, "/api/dashboard", Some("not-a-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_failures_share_one_answer() {
        let app = test_app().await;

        let wrong_password = json!({ "email": "farid@worker.tj", "password": "nope" });
        let (status, body) = send(&app, request(Method::POST, "/api/auth/login", None, Some(wrong_password))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let message = body["message"].clone();

        let wrong_role = json!({ "email": "farid@worker.tj", "password": DEMO_PASSWORD, "role": "employer" });
        let (status, body) = send(&app, request(Method::POST, "/api/auth/login", None, Some(wrong_role))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], message);
    }

    #[tokio::test]
    async fn test_session_cookie_and_logout() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "ahmad@construction.tj", "password": DEMO_PASSWORD })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        let cookie = set_cookie.split(';').next().unwrap().to_string();
        let token = read_json(response).await["token"].as_str().unwrap().to_string();

        let with_cookie = Request::builder()
            .uri("/api/users/me")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let (status, me) = send(&app, with_cookie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], "employer-1");
        assert!(me.get("passwordHash").is_none());

        let (status, _) = send(&app, request(Method::POST, "/api/auth/logout", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, request(Method::GET, "/api/users/me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_worker_logs_work() {
        let app = test_app().await;
        let token = login(&app, "farid@worker.tj").await;

        let entry = json!({ "projectId": "proj-1", "areaCompleted": 25.0, "description": "Ground floor wall" });
        let (status, log) = send(&app, request(Method::POST, "/api/work_logs", Some(&token), Some(entry))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(log["workerId"], "worker-1");
        assert_eq!(log["earnings"], 375.0);

        let elsewhere = json!({ "projectId": "proj-2", "areaCompleted": 10.0 });
        let (status, body) = send(&app, request(Method::POST, "/api/work_logs", Some(&token), Some(elsewhere))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "access_denied");
    }

    #[tokio::test]
    async fn test_material_usage_cannot_overdraw() {
        let app = test_app().await;
        let token = login(&app, "farid@worker.tj").await;

        let too_much = json!({ "projectId": "proj-1", "materialId": "mat-1", "quantity": 1800.1 });
        let (status, body) = send(&app, request(Method::POST, "/api/materials/logs", Some(&token), Some(too_much))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "insufficient_stock");
        assert_eq!(body["field"], "quantity");

        let all_of_it = json!({ "projectId": "proj-1", "materialId": "mat-1", "quantity": 1800.0 });
        let (status, outcome) = send(&app, request(Method::POST, "/api/materials/logs", Some(&token), Some(all_of_it))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(outcome["material"]["remainingQuantity"], 0.0);
    }

    #[tokio::test]
    async fn test_request_lifecycle() {
        let app = test_app().await;
        let worker = login(&app, "farid@worker.tj").await;
        let employer = login(&app, "ahmad@construction.tj").await;

        let (status, _) = send(&app, request(Method::POST, "/api/material_requests/req-1/approve", Some(&worker), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            request(Method::POST, "/api/material_requests/req-1/reject", Some(&employer), Some(json!({ "reason": "  " }))),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "missing_rejection_reason");

        let (status, approved) = send(&app, request(Method::POST, "/api/material_requests/req-1/approve", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["status"], "approved");
        assert_eq!(approved["approvedBy"], "Ahmad Rahimi");

        let (status, body) = send(&app, request(Method::POST, "/api/material_requests/req-1/approve", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "invalid_state_transition");

        let (status, fulfilled) = send(&app, request(Method::POST, "/api/material_requests/req-1/fulfill", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fulfilled["status"], "fulfilled");
    }

    #[tokio::test]
    async fn test_request_filters() {
        let app = test_app().await;
        let employer = login(&app, "ahmad@construction.tj").await;

        let (status, pending) = send(&app, request(Method::GET, "/api/material_requests?status=pending", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pending.as_array().unwrap().len(), 2);

        let (status, body) = send(&app, request(Method::GET, "/api/material_requests?status=lost", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");

        let (status, low) = send(&app, request(Method::GET, "/api/materials?stockLevel=low-stock", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(low.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hidden_project_is_not_found() {
        let app = test_app().await;
        let rustam = login(&app, "rustam@worker.tj").await;

        let (status, _) = send(&app, request(Method::GET, "/api/projects/proj-2", Some(&rustam), None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, request(Method::GET, "/api/projects/proj-1", Some(&rustam), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_employer_creates_project() {
        let app = test_app().await;
        let employer = login(&app, "ahmad@construction.tj").await;

        let params = json!({
            "name": "School Annex",
            "totalArea": 400.0,
            "budget": 90000.0,
            "location": "Khujand",
            "assignedWorkers": ["worker-2"]
        });
        let (status, project) = send(&app, request(Method::POST, "/api/projects", Some(&employer), Some(params))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(project["status"], "planning");

        let id = project["id"].as_str().unwrap().to_string();
        let (status, updated) = send(
            &app,
            request(Method::PUT, &format!("/api/projects/{}", id), Some(&employer), Some(json!({ "status": "active" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "active");
        assert_eq!(updated["name"], "School Annex");

        let worker = login(&app, "farid@worker.tj").await;
        let (status, _) = send(&app, request(Method::POST, "/api/projects", Some(&worker), Some(json!({ "name": "Mine" })))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_dashboard_and_directories() {
        let app = test_app().await;
        let supplier = login(&app, "info@gulnora.tj").await;

        let (status, dashboard) = send(&app, request(Method::GET, "/api/dashboard", Some(&supplier), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dashboard["role"], "supplier");

        let (status, _) = send(&app, request(Method::GET, "/api/workers", Some(&supplier), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, suppliers) = send(&app, request(Method::GET, "/api/suppliers", Some(&supplier), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(suppliers.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let app = test_app().await;

        let signup = json!({
            "firstName": "Dilshod",
            "lastName": "Umarov",
            "email": "dilshod@example.com",
            "phone": "+992 90 555 1122",
            "password": "secret1",
            "confirmPassword": "secret1",
            "role": "worker",
            "specialization": "Plumber",
            "agreeToTerms": true
        });
        let (status, user) = send(&app, request(Method::POST, "/api/auth/signup", None, Some(signup.clone()))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["role"], "worker");

        let (status, body) = send(&app, request(Method::POST, "/api/auth/signup", None, Some(signup))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["email"][0], "has already been taken");

        let login = json!({ "email": "dilshod@example.com", "password": "secret1", "role": "worker" });
        let (status, _) = send(&app, request(Method::POST, "/api/auth/login", None, Some(login))).await;
        assert_eq!(status, StatusCode::OK);
    }

    fn signup_form(role: &str, email: &str) -> Value {
        json!({
            "firstName": "Dilshod",
            "lastName": "Umarov",
            "email": email,
            "phone": "+992 90 555 1122",
            "password": "secret1",
            "confirmPassword": "secret1",
            "role": role,
            "specialization": "Plumber",
            "companyName": "Umarov Build",
            "agreeToTerms": true
        })
    }

    async fn sign_in(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
        let credentials = json!({ "email": email, "password": password });
        send(app, request(Method::POST, "/api/auth/login", None, Some(credentials))).await
    }

    #[tokio::test]
    async fn test_self_signup_cannot_claim_approver_roles() {
        let app = test_app().await;

        for role in ["employer", "supplier"] {
            let email = format!("{}@umarov.tj", role);
            let (status, body) = send(&app, request(Method::POST, "/api/auth/signup", None, Some(signup_form(role, &email)))).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{}", role);
            assert_eq!(body["error"], "access_denied");

            let (status, _) = sign_in(&app, &email, "secret1").await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        let (status, _) = send(&app, request(Method::POST, "/api/auth/signup", None, Some(signup_form("worker", "helper@umarov.tj")))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = sign_in(&app, "helper@umarov.tj", "secret1").await;
        assert_eq!(status, StatusCode::OK);
        let helper = body["token"].as_str().unwrap().to_string();

        let (status, _) = send(&app, request(Method::POST, "/api/material_requests/req-1/approve", Some(&helper), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_employer_opens_accounts() {
        let app = test_app().await;
        let employer = login(&app, "ahmad@construction.tj").await;
        let worker = login(&app, "farid@worker.tj").await;

        let form = signup_form("supplier", "orders@umarov.tj");
        let (status, _) = send(&app, request(Method::POST, "/api/users", None, Some(form.clone()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, request(Method::POST, "/api/users", Some(&worker), Some(form.clone()))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, created) = send(&app, request(Method::POST, "/api/users", Some(&employer), Some(form))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["role"], "supplier");
        assert_eq!(created["companyName"], "Umarov Build");

        let (status, _) = sign_in(&app, "orders@umarov.tj", "secret1").await;
        assert_eq!(status, StatusCode::OK);

        let (_, suppliers) = send(&app, request(Method::GET, "/api/suppliers", Some(&employer), None)).await;
        assert_eq!(suppliers.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_reject_needs_a_reason_even_without_body() {
        let app = test_app().await;
        let employer = login(&app, "ahmad@construction.tj").await;

        let (status, body) = send(&app, request(Method::POST, "/api/material_requests/req-1/reject", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "missing_rejection_reason");

        let (status, body) = send(&app, request(Method::POST, "/api/material_requests/req-1/reject", Some(&employer), Some(json!({})))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "missing_rejection_reason");

        // already decided, still a reason problem first
        let (status, body) = send(&app, request(Method::POST, "/api/material_requests/req-2/reject", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "missing_rejection_reason");

        let with_reason = json!({ "reason": "Order from the other site" });
        let (status, rejected) = send(&app, request(Method::POST, "/api/material_requests/req-1/reject", Some(&employer), Some(with_reason))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rejected["status"], "rejected");
        assert_eq!(rejected["rejectionReason"], "Order from the other site");
    }

    #[tokio::test]
    async fn test_project_detail_and_counts() {
        let app = test_app().await;
        let employer = login(&app, "ahmad@construction.tj").await;

        let (status, detail) = send(&app, request(Method::GET, "/api/projects/proj-1", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["id"], "proj-1");
        assert_eq!(detail["progressPercentage"], 65.0);
        assert_eq!(detail["workLogs"].as_array().unwrap().len(), 3);
        assert_eq!(detail["team"][0]["workerId"], "worker-1");
        assert_eq!(detail["team"][0]["earnings"], 825.0);

        let (status, counts) = send(&app, request(Method::GET, "/api/projects/counts", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(counts["all"], 3);
        assert_eq!(counts["active"], 2);
        assert_eq!(counts["completed"], 1);

        let (status, logs) = send(&app, request(Method::GET, "/api/work_logs?projectId=proj-2", Some(&employer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(logs.as_array().unwrap().is_empty());
        let (_, logs) = send(&app, request(Method::GET, "/api/work_logs?projectId=proj-1&workerId=worker-2", Some(&employer), None)).await;
        assert_eq!(logs.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_material_stock_views() {
        let app = test_app().await;
        let worker = login(&app, "farid@worker.tj").await;

        let (status, materials) = send(&app, request(Method::GET, "/api/materials", Some(&worker), None)).await;
        assert_eq!(status, StatusCode::OK);
        let paint = materials.as_array().unwrap().iter().find(|m| m["id"] == "mat-4").unwrap();
        assert_eq!(paint["stockLevel"], "well-stocked");
        assert_eq!(paint["stockRatio"], 0.85);

        let (status, counts) = send(&app, request(Method::GET, "/api/materials/counts", Some(&worker), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(counts["stockLevels"]["medium-stock"], 3);
        assert_eq!(counts["stockLevels"]["well-stocked"], 1);
        assert_eq!(counts["requests"]["pending"], 1);
        assert_eq!(counts["requests"]["approved"], 0);
    }

    #[tokio::test]
    async fn test_forgot_password_does_not_disclose_accounts() {
        let app = test_app().await;

        for email in ["farid@worker.tj", "nobody@example.com"] {
            let (status, _) = send(
                &app,
                request(Method::POST, "/api/auth/password/forgot", None, Some(json!({ "email": email }))),
            )
            .await;
            assert_eq!(status, StatusCode::ACCEPTED);
        }

        let reset = json!({ "token": "bogus", "password": "longenough", "passwordConfirmation": "longenough" });
        let (status, body) = send(&app, request(Method::POST, "/api/auth/password/reset", None, Some(reset))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["token"].is_array());
    }

    #[tokio::test]
    async fn test_preferences_round_trip() {
        let app = test_app().await;
        let token = login(&app, "farid@worker.tj").await;

        let (status, prefs) = send(
            &app,
            request(Method::PUT, "/api/users/me/preferences", Some(&token), Some(json!({ "darkMode": true }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(prefs["darkMode"], true);

        let (_, prefs) = send(&app, request(Method::GET, "/api/users/me/preferences", Some(&token), None)).await;
        assert_eq!(prefs["darkMode"], true);
    }

    #[tokio::test]
    async fn test_profile_photo() {
        let app = test_app().await;
        let token = login(&app, "farid@worker.tj").await;
        let bearer = format!("Bearer {}", token);

        let upload = Request::builder()
            .method(Method::PUT)
            .uri("/api/users/me/photo")
            .header(header::AUTHORIZATION, &bearer)
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(PNG))
            .unwrap();
        let (status, photo) = send(&app, upload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(photo["contentType"], "image/png");

        let as_json = Request::builder()
            .uri("/api/users/me/photo")
            .header(header::AUTHORIZATION, &bearer)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, as_json).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["dataUri"].as_str().unwrap().starts_with("data:image/png;base64,"));

        let pdf = Request::builder()
            .method(Method::PUT)
            .uri("/api/users/me/photo")
            .header(header::AUTHORIZATION, &bearer)
            .header(header::CONTENT_TYPE, "application/pdf")
            .body(Body::from("%PDF-1.7"))
            .unwrap();
        let (status, _) = send(&app, pdf).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app, request(Method::DELETE, "/api/users/me/photo", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, request(Method::GET, "/api/users/me/photo", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
