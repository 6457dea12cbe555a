mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acme_enricher, build_test_context, get, post_form, profile, signup};

#[tokio::test]
async fn health_is_public_and_traced() -> Result<()> {
    let ctx = build_test_context(None, None).await?;
    let resp = get(&ctx.app, "/health", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["err_code"], 0);
    assert_eq!(body["data"]["storage_status"], "ok");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));

    let trace_id = resp
        .headers
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .expect("trace id header");
    assert_eq!(trace_id.len(), 16);
    assert_eq!(body["trace_id"], trace_id);
    Ok(())
}

#[tokio::test]
async fn json_api_requires_a_session() -> Result<()> {
    let ctx = build_test_context(None, None).await?;
    let resp = get(&ctx.app, "/v1/dashboard", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json()["err_code"], 1002);

    let resp = get(&ctx.app, "/v1/dashboard", Some("rivalwatch_session=garbage")).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn dashboard_and_competitor_signals_endpoints() -> Result<()> {
    let enricher = acme_enricher();
    let ctx = build_test_context(Some(enricher.clone()), None).await?;
    let cookie = signup(&ctx.app, "ada@acme.com", "Acme", "acme.com").await;

    let resp = get(&ctx.app, "/v1/dashboard", Some(&cookie)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let data = &resp.json()["data"];
    assert_eq!(data["company"]["name"], "Acme");
    assert_eq!(data["user_count"], 1);
    assert_eq!(data["competitor_count"], 5);
    assert_eq!(data["credits_used"], 26);
    assert_eq!(data["unread"]["total"], 0);

    enricher.set_profile("zeta.io", profile("Zeta", "zeta.io", 150));
    post_form(&ctx.app, "/signals/refresh", Some(&cookie), &[]).await;

    let zeta = ctx
        .state
        .store
        .find_company_by_domain("zeta.io")
        .await?
        .expect("zeta");
    let resp = get(
        &ctx.app,
        &format!("/v1/competitors/{}/signals", zeta.id),
        Some(&cookie),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    let items = resp.json()["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["category"], "hiring");
    assert_eq!(items[0]["severity"], "high");
    assert_eq!(items[0]["details"]["new"], 150);

    let resp = get(&ctx.app, "/v1/competitors/424242/signals", Some(&cookie)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["err_code"], 1004);
    Ok(())
}

#[tokio::test]
async fn openapi_document_lists_json_endpoints() -> Result<()> {
    let ctx = build_test_context(None, None).await?;
    let resp = get(&ctx.app, "/v1/openapi.json", None).await;
    assert_eq!(resp.status, StatusCode::OK);

    let doc = resp.json();
    let paths = doc["paths"].as_object().expect("paths object");
    for path in ["/health", "/v1/dashboard", "/v1/competitors/{id}/signals"] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(doc["components"]["securitySchemes"]["session_cookie"].is_object());
    Ok(())
}
