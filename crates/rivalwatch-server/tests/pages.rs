mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use common::{acme_enricher, build_test_context, get, post_form, profile, signup, FakeGenerator};
use rivalwatch_common::types::{SignalCategory, SignalSeverity};
use std::sync::Arc;

#[tokio::test]
async fn guests_see_landing_page_and_are_sent_to_login() -> Result<()> {
    let ctx = build_test_context(None, None).await?;

    let home = get(&ctx.app, "/", None).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Know what your competitors are doing"));

    let company = get(&ctx.app, "/company", None).await;
    assert_eq!(company.status, StatusCode::SEE_OTHER);
    assert_eq!(company.location(), Some("/login?next=%2Fcompany"));

    let signals = get(&ctx.app, "/signals?category=hiring", None).await;
    assert_eq!(
        signals.location(),
        Some("/login?next=%2Fsignals%3Fcategory%3Dhiring")
    );

    let missing = get(&ctx.app, "/no-such-page", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn signup_form_reports_missing_fields_and_duplicates() -> Result<()> {
    let ctx = build_test_context(None, None).await?;

    let resp = post_form(&ctx.app, "/signup", None, &[("email", "ada@acme.com")]).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body.contains("First name is required."));
    assert!(resp.body.contains("Company name is required."));
    assert!(resp.body.contains("Company domain is required."));
    assert!(!resp.body.contains("Email is required."));
    // submitted values are kept
    assert!(resp.body.contains(r#"value="ada@acme.com""#));

    let resp = post_form(
        &ctx.app,
        "/signup",
        None,
        &[
            ("first_name", "Ada"),
            ("last_name", "L"),
            ("email", "ada@acme.com"),
            ("company_name", "Acme"),
            ("company_domain", "https://"),
        ],
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body.contains("Company domain must look like example.com."));
    assert!(ctx.state.store.find_company_by_name("Acme").await?.is_none());

    signup(&ctx.app, "ada@acme.com", "Acme", "acme.com").await;
    let resp = post_form(
        &ctx.app,
        "/signup",
        None,
        &[
            ("first_name", "Ada"),
            ("last_name", "L"),
            ("email", "ADA@acme.com"),
            ("company_name", "Acme"),
            ("company_domain", "acme.com"),
        ],
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body.contains("already exists. Please log in instead."));
    assert!(resp.session_cookie().is_none());
    Ok(())
}

#[tokio::test]
async fn login_validates_email_and_account_state() -> Result<()> {
    let ctx = build_test_context(None, None).await?;
    signup(&ctx.app, "ada@acme.com", "Acme", "acme.com").await;

    let empty = post_form(&ctx.app, "/login", None, &[("email", " ")]).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert!(empty.body.contains("Email is required to log in."));

    let unknown = post_form(&ctx.app, "/login", None, &[("email", "nobody@acme.com")]).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert!(unknown.body.contains("find an account with that email"));

    let ok = post_form(
        &ctx.app,
        "/login",
        None,
        &[("email", "Ada@Acme.com"), ("next", "/company")],
    )
    .await;
    assert_eq!(ok.status, StatusCode::SEE_OTHER);
    assert_eq!(ok.location(), Some("/company"));
    assert!(ok.session_cookie().is_some());

    let offsite = post_form(
        &ctx.app,
        "/login",
        None,
        &[("email", "ada@acme.com"), ("next", "https://evil.example")],
    )
    .await;
    assert_eq!(offsite.location(), Some("/"));

    let ada = ctx
        .state
        .store
        .get_user_by_email("ada@acme.com")
        .await?
        .expect("user exists");
    ctx.state.store.set_user_active(&ada.id, false).await?;
    let disabled = post_form(&ctx.app, "/login", None, &[("email", "ada@acme.com")]).await;
    assert_eq!(disabled.status, StatusCode::BAD_REQUEST);
    assert!(disabled.body.contains("This account is disabled."));

    // an existing session stops working once the account is disabled
    let cookie = ok.session_cookie().expect("cookie");
    let home = get(&ctx.app, "/company", Some(&cookie)).await;
    assert_eq!(home.status, StatusCode::SEE_OTHER);
    Ok(())
}

#[tokio::test]
async fn signed_in_users_skip_auth_pages_and_can_log_out() -> Result<()> {
    let ctx = build_test_context(None, None).await?;
    let cookie = signup(&ctx.app, "ada@acme.com", "Acme", "acme.com").await;

    let login = get(&ctx.app, "/login", Some(&cookie)).await;
    assert_eq!(login.location(), Some("/"));
    let signup_page = get(&ctx.app, "/signup", Some(&cookie)).await;
    assert_eq!(signup_page.location(), Some("/"));

    let logout = post_form(&ctx.app, "/logout", Some(&cookie), &[]).await;
    assert_eq!(logout.status, StatusCode::SEE_OTHER);
    assert_eq!(logout.location(), Some("/login"));
    let cleared = logout
        .headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .any(|c| c.starts_with("rivalwatch_session=;") || c.starts_with("rivalwatch_session=\"\""));
    assert!(cleared);
    Ok(())
}

#[tokio::test]
async fn dashboard_and_competitor_pages_show_tracked_companies() -> Result<()> {
    let ctx = build_test_context(Some(acme_enricher()), None).await?;
    let cookie = signup(&ctx.app, "ada@acme.com", "Acme", "acme.com").await;

    let home = get(&ctx.app, "/", Some(&cookie)).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Ada Lovelace"));
    assert!(home.body.contains("Zeta"));
    assert!(home.body.contains(r#"<div class="metric">26</div>"#));
    assert!(home.body.contains("Competitive landscape analysis is being prepared."));

    let store = &ctx.state.store;
    let acme = store.find_company_by_name("Acme").await?.expect("company");
    let zeta = store.find_company_by_domain("zeta.io").await?.expect("zeta");

    let page = get(&ctx.app, &format!("/competitor/{}", zeta.id), Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Zeta builds things"));
    assert!(page.body.contains("1 snapshot(s)"));

    let unknown = get(&ctx.app, "/competitor/424242", Some(&cookie)).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    let own = get(&ctx.app, &format!("/competitor/{}", acme.id), Some(&cookie)).await;
    assert_eq!(own.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn ai_text_is_generated_once_and_cached() -> Result<()> {
    let generator = Arc::new(FakeGenerator::new("**Acme** leads a crowded market."));
    let ctx = build_test_context(Some(acme_enricher()), Some(generator.clone())).await?;
    let cookie = signup(&ctx.app, "ada@acme.com", "Acme", "acme.com").await;
    assert_eq!(generator.count(), 1);

    for _ in 0..2 {
        let home = get(&ctx.app, "/", Some(&cookie)).await;
        assert!(home.body.contains("<strong>Acme</strong> leads a crowded market."));
    }
    assert_eq!(generator.count(), 1);

    // positioning: the answer is not JSON, so every field falls back
    let company = get(&ctx.app, "/company", Some(&cookie)).await;
    assert_eq!(company.status, StatusCode::OK);
    assert!(company.body.contains("Analysis not available."));
    assert!(company.body.contains("Market positioning analysis is being prepared."));
    assert_eq!(generator.count(), 2);

    get(&ctx.app, "/company", Some(&cookie)).await;
    assert_eq!(generator.count(), 2);
    Ok(())
}

#[tokio::test]
async fn refresh_turns_headcount_growth_into_a_hiring_signal() -> Result<()> {
    let enricher = acme_enricher();
    let ctx = build_test_context(Some(enricher.clone()), None).await?;
    let cookie = signup(&ctx.app, "ada@acme.com", "Acme", "acme.com").await;

    enricher.set_profile("zeta.io", profile("Zeta", "zeta.io", 150));
    let refresh = post_form(&ctx.app, "/signals/refresh", Some(&cookie), &[]).await;
    assert_eq!(refresh.status, StatusCode::SEE_OTHER);
    assert_eq!(refresh.location(), Some("/?refreshed=1"));

    let store = &ctx.state.store;
    let acme = store.find_company_by_name("Acme").await?.expect("company");
    let signals = store.list_signals(&acme.id, None, 10).await?;
    assert_eq!(signals.len(), 1);
    let signal = &signals[0];
    assert_eq!(signal.category, SignalCategory::Hiring);
    assert_eq!(signal.severity, SignalSeverity::High);
    assert_eq!(signal.message, "Zeta headcount grew from 100 to 150 (+50%)");
    assert!(signal.is_new);
    // one paid lookup for zeta; the others are unknown to the provider
    assert_eq!(store.credits_for_company(&acme.id).await?, 27);

    let home = get(&ctx.app, "/?refreshed=1", Some(&cookie)).await;
    assert!(home.body.contains("Signals refreshed. 1 new signal(s)."));
    assert!(home.body.contains("Hiring: 1"));

    let page = get(&ctx.app, "/signals?category=hiring", Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Zeta headcount grew from 100 to 150 (+50%)"));
    assert!(page.body.contains(r#"<span class="badge new">new</span>"#));
    assert_eq!(store.count_unread_signals(&acme.id).await?.total(), 0);

    // nothing changed since: no new signals
    let again = post_form(&ctx.app, "/signals/refresh", Some(&cookie), &[]).await;
    assert_eq!(again.location(), Some("/?refreshed=0"));
    Ok(())
}

#[tokio::test]
async fn refresh_without_fresh_data_reports_no_change() -> Result<()> {
    let enricher = acme_enricher();
    let ctx = build_test_context(Some(enricher.clone()), None).await?;
    let cookie = signup(&ctx.app, "ada@acme.com", "Acme", "acme.com").await;

    enricher.set_profile("zeta.io", profile("Zeta", "zeta.io", 150));
    let refresh = post_form(&ctx.app, "/signals/refresh", Some(&cookie), &[]).await;
    assert_eq!(refresh.location(), Some("/?refreshed=1"));

    // the stored record still says 100; a failed lookup must not roll back to it
    enricher.remove_profile("zeta.io");
    let failing = post_form(&ctx.app, "/signals/refresh", Some(&cookie), &[]).await;
    assert_eq!(failing.location(), Some("/?refreshed=0"));

    // fields the provider leaves out keep their last observed value
    let mut partial = profile("Zeta", "zeta.io", 0);
    partial.employees = None;
    enricher.set_profile("zeta.io", partial);
    let partial_refresh = post_form(&ctx.app, "/signals/refresh", Some(&cookie), &[]).await;
    assert_eq!(partial_refresh.location(), Some("/?refreshed=0"));

    let store = &ctx.state.store;
    let acme = store.find_company_by_name("Acme").await?.expect("company");
    let signals = store.list_signals(&acme.id, None, 10).await?;
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].message, "Zeta headcount grew from 100 to 150 (+50%)");
    // the failed lookup is not charged: 26 + 1 + 1
    assert_eq!(store.credits_for_company(&acme.id).await?, 28);
    Ok(())
}

#[tokio::test]
async fn refresh_without_provider_observes_nothing() -> Result<()> {
    let ctx = build_test_context(None, None).await?;
    let cookie = signup(&ctx.app, "ada@acme.com", "Acme", "acme.com").await;

    let refresh = post_form(&ctx.app, "/signals/refresh", Some(&cookie), &[]).await;
    assert_eq!(refresh.status, StatusCode::SEE_OTHER);
    assert_eq!(refresh.location(), Some("/?refreshed=0"));
    Ok(())
}
