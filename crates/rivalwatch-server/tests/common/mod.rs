#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use rivalwatch_ai::{GenerationRequest, TextGenerator};
use rivalwatch_enrich::error::EnrichError;
use rivalwatch_enrich::{CompanyDataProvider, CompanyProfile};
use rivalwatch_server::app;
use rivalwatch_server::auth::SESSION_COOKIE;
use rivalwatch_server::config::ServerConfig;
use rivalwatch_server::state::AppState;
use rivalwatch_storage::IntelStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::util::ServiceExt;

/// Company-data provider backed by in-memory profiles. Counts calls.
#[derive(Default)]
pub struct FakeEnricher {
    pub enrich_calls: AtomicUsize,
    pub similar_calls: AtomicUsize,
    pub similar_limits: Mutex<Vec<usize>>,
    profiles: Mutex<HashMap<String, CompanyProfile>>,
    similar: Mutex<Vec<CompanyProfile>>,
}

impl FakeEnricher {
    pub fn set_profile(&self, domain: &str, profile: CompanyProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(domain.to_string(), profile);
    }

    /// Makes `enrich` fail for `domain` from now on.
    pub fn remove_profile(&self, domain: &str) {
        self.profiles.lock().unwrap().remove(domain);
    }

    pub fn set_similar(&self, items: Vec<CompanyProfile>) {
        *self.similar.lock().unwrap() = items;
    }

    pub fn enrich_count(&self) -> usize {
        self.enrich_calls.load(Ordering::SeqCst)
    }

    pub fn similar_count(&self) -> usize {
        self.similar_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompanyDataProvider for FakeEnricher {
    fn name(&self) -> &str {
        "fake"
    }

    async fn enrich(&self, domain: &str) -> rivalwatch_enrich::error::Result<CompanyProfile> {
        self.enrich_calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .ok_or_else(|| EnrichError::InvalidDomain(domain.to_string()))
    }

    async fn similar(
        &self,
        _domain: &str,
        limit: usize,
    ) -> rivalwatch_enrich::error::Result<Vec<CompanyProfile>> {
        self.similar_calls.fetch_add(1, Ordering::SeqCst);
        self.similar_limits.lock().unwrap().push(limit);
        Ok(self.similar.lock().unwrap().clone())
    }
}

/// Text generator returning a fixed answer. Counts calls.
pub struct FakeGenerator {
    pub calls: AtomicUsize,
    pub answer: String,
}

impl FakeGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: answer.to_string(),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn provider(&self) -> &str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, _request: &GenerationRequest) -> rivalwatch_ai::error::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

pub fn profile(name: &str, domain: &str, employees: i64) -> CompanyProfile {
    CompanyProfile {
        name: Some(name.to_string()),
        domain: Some(domain.to_string()),
        website: Some(format!("https://{domain}")),
        headline: Some(format!("{name} builds things")),
        employees: Some(employees),
        industries: vec!["SaaS".to_string()],
        industry: Some("SaaS".to_string()),
        ..Default::default()
    }
}

/// Acme plus five similar companies, none of them filtered out.
pub fn acme_enricher() -> Arc<FakeEnricher> {
    let enricher = FakeEnricher::default();
    enricher.set_profile("acme.com", profile("Acme", "acme.com", 40));
    enricher.set_similar(vec![
        profile("Zeta", "zeta.io", 100),
        profile("Globex", "globex.com", 250),
        profile("Initech", "initech.com", 80),
        profile("Umbrella", "umbrella.co", 1200),
        profile("Hooli", "hooli.xyz", 3000),
    ]);
    Arc::new(enricher)
}

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

pub async fn build_test_context(
    enricher: Option<Arc<FakeEnricher>>,
    generator: Option<Arc<FakeGenerator>>,
) -> Result<TestContext> {
    build_test_context_with_config(enricher, generator, ServerConfig::default()).await
}

pub async fn build_test_context_with_config(
    enricher: Option<Arc<FakeEnricher>>,
    generator: Option<Arc<FakeGenerator>>,
    mut config: ServerConfig,
) -> Result<TestContext> {
    rivalwatch_common::id::init(1, 1);

    let temp_dir = tempfile::tempdir()?;
    let store = Arc::new(
        IntelStore::new(&IntelStore::sqlite_url(temp_dir.path()), temp_dir.path()).await?,
    );
    config.database.data_dir = temp_dir.path().to_string_lossy().to_string();

    let state = AppState::new(
        store,
        config,
        "test-secret".to_string(),
        enricher.map(|e| e as Arc<dyn CompanyDataProvider>),
        generator.map(|g| g as Arc<dyn TextGenerator>),
    );
    let app = app::build_http_app(state.clone());

    Ok(TestContext {
        temp_dir,
        state,
        app,
    })
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|h| h.to_str().ok())
    }

    /// `name=value` of the session cookie set by this response.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .filter(|c| c.starts_with(&format!("{SESSION_COOKIE}=")))
            .map(|c| c.split(';').next().unwrap_or(c).to_string())
            .next()
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

fn form_encode(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

async fn send(app: &axum::Router, req: Request<Body>) -> TestResponse {
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).to_string(),
    }
}

pub async fn get(app: &axum::Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).expect("request should build")).await
}

pub async fn post_form(
    app: &axum::Router,
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(
        app,
        builder
            .body(Body::from(form_encode(fields)))
            .expect("request should build"),
    )
    .await
}

/// Signs a user up and returns the session cookie.
pub async fn signup(
    app: &axum::Router,
    email: &str,
    company_name: &str,
    company_domain: &str,
) -> String {
    let resp = post_form(
        app,
        "/signup",
        None,
        &[
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
            ("email", email),
            ("role", "CTO"),
            ("company_name", company_name),
            ("company_domain", company_domain),
        ],
    )
    .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER, "signup failed: {}", resp.body);
    assert_eq!(resp.location(), Some("/"));
    resp.session_cookie().expect("signup should set a session cookie")
}
