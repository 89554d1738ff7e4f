use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::{
        gate::require_auth,
        handlers::{auth_routes, profile_routes},
    },
    categories::handlers::category_routes,
    state::AppState,
    transactions::handlers::transaction_routes,
};

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(profile_routes())
        .merge(category_routes())
        .merge(transaction_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/api", auth_routes().merge(protected))
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn serve(app: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, JwtConfig};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        build_app(AppState::in_memory(&AppConfig {
            database_url: String::new(),
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "router-test-secret".into(),
                ttl_hours: 24,
            },
        }))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn sign_up(app: &Router, email: &str) -> String {
        let (status, _) = send(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": "secret1",
                "first_name": "Jane",
                "last_name": "Doe"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn new_category(app: &Router, token: &str, name: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/categories",
            Some(token),
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let app = app();
        for uri in ["/api/profile", "/api/categories", "/api/transactions", "/api/transactions/summary"] {
            let (status, body) = send(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"], "authorization header required");
        }
    }

    #[tokio::test]
    async fn register_login_and_profile() {
        let app = app();
        let token = sign_up(&app, "jane@example.com").await;

        let (status, body) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "jane@example.com");
        assert!(body.get("password_hash").is_none());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "jane@example.com",
                "password": "another1",
                "first_name": "J",
                "last_name": "D"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "jane@example.com", "password": "wrong-one" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid credentials");
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_400() {
        let app = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn category_crud_round() {
        let app = app();
        let token = sign_up(&app, "cat@example.com").await;
        let id = new_category(&app, &token, "Food").await;

        let uri = format!("/api/categories/{id}");
        let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["color"], "#007bff");

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({ "color": "#000" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["color"], "#000");
        assert_eq!(body["name"], "Food");

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "category deleted");

        let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let app = app();
        let alice = sign_up(&app, "alice@example.com").await;
        let bob = sign_up(&app, "bob@example.com").await;
        let alice_cat = new_category(&app, &alice, "Food").await;

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/categories/{alice_cat}"),
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/transactions",
            Some(&bob),
            Some(json!({
                "category_id": alice_cat,
                "amount": 10.0,
                "type": "expense",
                "date": "2024-01-01T12:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "category not found or does not belong to user");
    }

    #[tokio::test]
    async fn transactions_flow_with_filters_and_summary() {
        let app = app();
        let token = sign_up(&app, "tx@example.com").await;
        let cat = new_category(&app, &token, "General").await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/transactions",
            Some(&token),
            Some(json!({
                "category_id": cat,
                "amount": 50.0,
                "type": "expense",
                "description": "groceries",
                "date": "2024-01-01T12:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["type"], "expense");
        assert_eq!(created["category"]["name"], "General");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/transactions",
            Some(&token),
            Some(json!({
                "category_id": cat,
                "amount": 1000.0,
                "type": "income",
                "date": "2024-01-02T12:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, list) = send(
            &app,
            Method::GET,
            "/api/transactions?type=expense&limit=",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["amount"], 50.0);

        let (status, summary) = send(
            &app,
            Method::GET,
            "/api/transactions/summary",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            summary,
            json!({ "total_income": 1000.0, "total_expense": 50.0, "net_balance": 950.0 })
        );

        let (_, day1) = send(
            &app,
            Method::GET,
            "/api/transactions/summary?start_date=2024-01-01&end_date=2024-01-01",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(
            day1,
            json!({ "total_income": 0.0, "total_expense": 50.0, "net_balance": -50.0 })
        );

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/transactions?limit=-1",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/api/transactions/{}", created["id"].as_str().unwrap());
        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({ "amount": 55.5 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["amount"], 55.5);
        assert_eq!(updated["description"], "groceries");

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "transaction deleted");
        let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
