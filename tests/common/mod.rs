#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use gigboard::{
    config::SESSION_SECRET_HEADER,
    db,
    models::{Job, Role, User},
    users::{create_user, NewUser},
    AppState, Config,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SESSION_SECRET: &str = "shared-with-the-identity-provider";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_pool = db::memory().await.expect("in-memory database");
        let config = Config {
            session_secret: Some(SESSION_SECRET.to_owned()),
            ..Config::default()
        };
        let state = AppState::new(db_pool, config);
        let app = gigboard::router(state.clone());
        Self { app, state }
    }

    pub async fn user(&self, name: &str, role: Role) -> User {
        create_user(
            &self.state.db_pool,
            NewUser {
                name: name.to_owned(),
                email: format!("{}@example.com", name.to_lowercase()),
                role,
                skills: vec!["rust".to_owned()],
                bio: String::new(),
            },
        )
        .await
        .expect("create user")
    }

    /// Logs `user` in and returns the cookie to send back.
    pub async fn login(&self, user: &User) -> String {
        let res = self
            .app
            .clone()
            .oneshot(
                Request::post("/api/auth/session")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(SESSION_SECRET_HEADER, SESSION_SECRET)
                    .body(Body::from(json!({ "email": user.email }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let set_cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_owned()
    }

    pub async fn put(&self, uri: &str, cookie: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(cookie), Some(body)).await
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(body) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let res = self.app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, cookie: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(cookie), None).await
    }

    pub async fn post(&self, uri: &str, cookie: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(cookie), Some(body)).await
    }

    pub async fn post_job(&self, admin_cookie: &str, title: &str) -> Job {
        let (status, body) = self
            .post(
                "/api/jobs",
                admin_cookie,
                json!({
                    "title": title,
                    "description": "Port the billing service",
                    "budget": 1500,
                    "deadline": "2030-01-01T00:00:00Z",
                    "category": "backend",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        serde_json::from_value(body).expect("job json")
    }

    pub async fn bid(&self, cookie: &str, job: &Job, amount: f64) -> Value {
        let (status, body) = self
            .post(
                &format!("/api/bids/{}", job.id),
                cookie,
                json!({ "bid_amount": amount, "timeline": "2 weeks", "message": "I can do this" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    pub async fn count(&self, sql: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as(sql)
            .fetch_one(&self.state.db_pool)
            .await
            .unwrap();
        n
    }
}

pub fn id_of(value: &Value) -> &str {
    value["id"].as_str().expect("id")
}
