use crate::diff::{diff, Change, MEANINGFUL_KEYS};
use crate::engine::{derive_signals, SignalEngine};
use crate::rules::funding::format_amount;
use crate::rules::headcount::HeadcountRule;
use crate::snapshot::Observation;
use crate::SignalRule;
use rivalwatch_common::types::{Company, SignalCategory, SignalSeverity};
use serde_json::json;

fn company(id: &str, name: &str) -> Company {
    Company::new(id.to_string(), name)
}

fn observation() -> Observation {
    Observation {
        name: "Zeta".into(),
        domain: Some("zeta.io".into()),
        country: Some("NL".into()),
        headline: Some("Widgets for everyone".into()),
        employees: Some(100),
        industries: vec!["SaaS".into(), "Analytics".into()],
        funding: Some(5_000_000),
        funding_stage: Some("Series A".into()),
    }
}

#[test]
fn document_has_fixed_keys_and_sorted_industries() {
    let doc = observation().to_document();
    let keys: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
    for key in MEANINGFUL_KEYS {
        assert!(keys.contains(&key), "missing {key}");
    }
    assert!(keys.contains(&"name"));
    assert!(keys.contains(&"domain"));
    assert!(keys.contains(&"country"));
    assert_eq!(doc["industries"], json!(["Analytics", "SaaS"]));
}

#[test]
fn observation_from_company_falls_back_to_primary_industry() {
    let mut zeta = company("2", "Zeta");
    zeta.industry = Some("Fintech".into());
    zeta.headline = Some("  ".into());
    let obs = Observation::from_company(&zeta);
    assert_eq!(obs.industries, vec!["Fintech"]);
    assert!(obs.headline.is_none());

    zeta.industries = vec!["b2b".into(), "B2B".into(), "Payments".into()];
    let obs = Observation::from_company(&zeta);
    assert_eq!(obs.industries, vec!["b2b", "Payments"]);
}

#[test]
fn stored_document_restores_the_observed_company() {
    let doc = observation().to_document();
    let restored = Observation::from_document(&doc).expect("observation document");
    assert_eq!(restored.employees, Some(100));

    let mut zeta = company("2", "Zeta");
    zeta.number_of_employees = Some(80);
    zeta.city = Some("Delft".into());
    restored.apply_to(&mut zeta);
    assert_eq!(zeta.number_of_employees, Some(100));
    assert_eq!(zeta.funding_stage.as_deref(), Some("Series A"));
    assert_eq!(zeta.city.as_deref(), Some("Delft"));
    assert!(diff(Some(&doc), &Observation::from_company(&zeta).to_document()).is_empty());

    assert!(Observation::from_document(&json!({"unexpected": true})).is_none());
}

#[test]
fn first_snapshot_is_baseline_only() {
    let doc = observation().to_document();
    assert!(diff(None, &doc).is_empty());
}

#[test]
fn identical_snapshots_produce_no_changes() {
    let doc = observation().to_document();
    assert!(diff(Some(&doc), &doc.clone()).is_empty());
}

#[test]
fn employees_change_yields_single_change() {
    let before = observation().to_document();
    let mut obs = observation();
    obs.employees = Some(150);
    let after = obs.to_document();

    let changes = diff(Some(&before), &after);
    assert_eq!(changes, vec![Change::new("employees", json!(100), json!(150))]);
}

#[test]
fn non_meaningful_keys_are_ignored() {
    let before = observation().to_document();
    let mut obs = observation();
    obs.country = Some("DE".into());
    obs.domain = Some("zeta.com".into());
    obs.name = "Zeta Inc".into();
    let after = obs.to_document();

    assert!(diff(Some(&before), &after).is_empty());
}

#[test]
fn every_meaningful_key_is_detected() {
    let before = observation().to_document();
    let after = Observation {
        employees: Some(90),
        industries: vec!["SaaS".into()],
        funding: Some(12_000_000),
        funding_stage: Some("Series B".into()),
        headline: Some("Enterprise widgets".into()),
        ..observation()
    }
    .to_document();

    let keys: Vec<String> = diff(Some(&before), &after).into_iter().map(|c| c.key).collect();
    assert_eq!(keys, MEANINGFUL_KEYS.iter().map(|k| k.to_string()).collect::<Vec<_>>());
}

#[test]
fn missing_key_counts_as_null() {
    let before = json!({"employees": 10});
    let after = json!({});
    let changes = diff(Some(&before), &after);
    assert_eq!(changes, vec![Change::new("employees", json!(10), json!(null))]);
}

#[test]
fn headcount_growth_becomes_hiring_signal() {
    let acme = company("1", "Acme");
    let zeta = company("2", "Zeta");
    let changes = vec![Change::new("employees", json!(100), json!(150))];

    let signals = derive_signals(&acme, &zeta, &changes);
    assert_eq!(signals.len(), 1);
    let signal = &signals[0];
    assert_eq!(signal.company_id, "1");
    assert_eq!(signal.competitor_id, "2");
    assert_eq!(signal.category, SignalCategory::Hiring);
    assert_eq!(signal.signal_type, "headcount_change");
    assert_eq!(signal.severity, SignalSeverity::High);
    assert_eq!(signal.message, "Zeta headcount grew from 100 to 150 (+50%)");
    assert_eq!(
        signal.details,
        Some(json!({"key": "employees", "old": 100, "new": 150}))
    );
}

#[test]
fn headcount_severity_follows_magnitude() {
    let rule = HeadcountRule::default();
    let sev = |old, new| rule.severity(&Change::new("employees", old, new));

    assert_eq!(sev(json!(100), json!(105)), SignalSeverity::Low);
    assert_eq!(sev(json!(100), json!(90)), SignalSeverity::Medium);
    assert_eq!(sev(json!(100), json!(125)), SignalSeverity::High);
    assert_eq!(sev(json!(100), json!(40)), SignalSeverity::High);
    assert_eq!(sev(json!(null), json!(40)), SignalSeverity::Medium);
    assert_eq!(sev(json!(0), json!(3)), SignalSeverity::High);
}

#[test]
fn extreme_headcounts_do_not_overflow() {
    let rule = HeadcountRule::default();
    let zeta = company("2", "Zeta");
    let change = Change::new("employees", json!(-1), json!(i64::MAX));
    assert_eq!(rule.severity(&change), SignalSeverity::High);

    let change = Change::new("employees", json!(1), json!(i64::MIN));
    assert_eq!(rule.severity(&change), SignalSeverity::High);
    assert!(rule.message(&zeta, &change).starts_with("Zeta headcount shrank from 1 to"));
}

#[test]
fn categories_follow_changed_key() {
    let acme = company("1", "Acme");
    let zeta = company("2", "Zeta");
    let changes = vec![
        Change::new("industries", json!(["SaaS"]), json!(["AI", "SaaS"])),
        Change::new("funding", json!(5_000_000), json!(12_500_000)),
        Change::new("funding_stage", json!("Series A"), json!("Series B")),
        Change::new("headline", json!("Old"), json!("New")),
    ];

    let signals = derive_signals(&acme, &zeta, &changes);
    let summary: Vec<(SignalCategory, &str, SignalSeverity)> = signals
        .iter()
        .map(|s| (s.category, s.signal_type.as_str(), s.severity))
        .collect();
    assert_eq!(
        summary,
        vec![
            (SignalCategory::Product, "industry_shift", SignalSeverity::Medium),
            (SignalCategory::Funding, "funding_change", SignalSeverity::High),
            (SignalCategory::Funding, "funding_round", SignalSeverity::High),
            (SignalCategory::Product, "positioning_change", SignalSeverity::Low),
        ]
    );
    assert_eq!(signals[0].message, "Zeta entered AI");
    assert_eq!(signals[1].message, "Zeta total funding changed from $5.0M to $12.5M");
    assert_eq!(signals[2].message, "Zeta moved from Series A to Series B");
}

#[test]
fn unknown_keys_are_skipped() {
    let engine = SignalEngine::new(vec![Box::new(HeadcountRule::default())]);
    let changes = vec![Change::new("headline", json!("a"), json!("b"))];
    assert!(engine
        .derive(&company("1", "Acme"), &company("2", "Zeta"), &changes)
        .is_empty());
}

#[test]
fn amounts_format_compactly() {
    assert_eq!(format_amount(950), "$950");
    assert_eq!(format_amount(25_000), "$25K");
    assert_eq!(format_amount(2_500_000_000), "$2.5B");
}
