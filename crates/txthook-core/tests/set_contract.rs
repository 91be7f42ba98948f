//! Contract Test: `set` transitions
//!
//! Constraints verified:
//! - Absent RRSet → exactly one Create with a single quoted record, TTL 3600
//! - Present RRSet → Append of the new value, existing values untouched
//! - Value already present → no mutation at all
//! - Zone lookup failure or absence → nothing is mutated
//! - Remote failures surface as errors, with no follow-up calls

mod common;

use common::*;
use tokio_test::assert_err;
use txthook_core::error::Error;
use txthook_core::reconciler::{ChallengeTarget, SetOutcome};

#[tokio::test]
async fn absent_rrset_is_created_with_default_ttl() {
    let provider = RecordingProvider::with_zone("example.com").await;
    let reconciler = reconciler(&provider);
    let target = challenge("sub.example.com");
    assert_eq!(target.record_name, "_acme-challenge.sub");

    let outcome = reconciler.set(&target, "TOKEN").await.unwrap();
    assert_eq!(outcome, SetOutcome::Created { ttl: 3600 });

    assert_eq!(
        provider.calls(),
        vec![
            Call::GetZone("example.com".to_string()),
            Call::GetRRSet("_acme-challenge.sub".to_string()),
            Call::Create {
                name: "_acme-challenge.sub".to_string(),
                ttl: 3600,
                records: vec![quoted("TOKEN")],
            },
        ]
    );
}

#[tokio::test]
async fn present_rrset_gets_value_appended() {
    let provider = RecordingProvider::with_zone("example.com").await;
    provider
        .seed_txt("example.com", "_acme-challenge.sub", &["\"OLD\""])
        .await;
    let reconciler = reconciler(&provider);

    let outcome = reconciler
        .set(&challenge("sub.example.com"), "NEW")
        .await
        .unwrap();
    assert_eq!(outcome, SetOutcome::Appended { existing: 1 });

    assert_eq!(
        provider.mutations(),
        vec![Call::Add {
            name: "_acme-challenge.sub".to_string(),
            records: vec![quoted("NEW")],
        }]
    );
    assert_eq!(
        provider.txt("example.com", "_acme-challenge.sub").await,
        Some(vec![quoted("OLD"), quoted("NEW")])
    );
}

#[tokio::test]
async fn second_distinct_value_appends_instead_of_overwriting() {
    let provider = RecordingProvider::with_zone("example.co.uk").await;
    let reconciler = reconciler(&provider);
    let target = challenge("www.example.co.uk");

    reconciler.set(&target, "first").await.unwrap();
    reconciler.set(&target, "second").await.unwrap();

    let records = provider
        .txt("example.co.uk", "_acme-challenge.www")
        .await
        .expect("rrset exists");
    assert_eq!(records, vec![quoted("first"), quoted("second")]);
}

#[tokio::test]
async fn repeated_value_is_a_no_op() {
    let provider = RecordingProvider::with_zone("example.com").await;
    provider
        .seed_txt("example.com", "_acme-challenge", &["\"SAME\""])
        .await;
    let reconciler = reconciler(&provider);

    let outcome = reconciler
        .set(&challenge("example.com"), "SAME")
        .await
        .unwrap();

    assert_eq!(outcome, SetOutcome::Unchanged);
    assert!(provider.mutations().is_empty());
}

#[tokio::test]
async fn apex_challenge_uses_empty_record_name() {
    let provider = RecordingProvider::with_zone("example.com").await;
    let reconciler = reconciler(&provider);
    let target = ChallengeTarget::from_fqdns("example.com", "example.com.").unwrap();

    reconciler.set(&target, "apex").await.unwrap();

    assert_eq!(
        provider.txt("example.com", "").await,
        Some(vec![quoted("apex")])
    );
}

#[tokio::test]
async fn missing_zone_aborts_without_mutation() {
    let provider = RecordingProvider::with_zone("example.org").await;
    let reconciler = reconciler(&provider);

    let result = reconciler.set(&challenge("example.com"), "TOKEN").await;

    match result {
        Err(Error::ZoneNotFound(zone)) => assert_eq!(zone, "example.com"),
        other => panic!("expected ZoneNotFound, got {:?}", other),
    }
    assert_eq!(provider.calls(), vec![Call::GetZone("example.com".to_string())]);
}

#[tokio::test]
async fn zone_lookup_failure_aborts_without_mutation() {
    let provider = RecordingProvider::with_zone("example.com").await;
    provider.fail(Op::GetZone, 1);
    let reconciler = reconciler(&provider);

    let result = reconciler.set(&challenge("example.com"), "TOKEN").await;

    assert!(matches!(result, Err(Error::Provider { .. })));
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn rrset_lookup_failure_aborts_without_mutation() {
    let provider = RecordingProvider::with_zone("example.com").await;
    provider.fail(Op::GetRRSet, 1);
    let reconciler = reconciler(&provider);

    let result = reconciler.set(&challenge("example.com"), "TOKEN").await;

    assert!(result.is_err());
    assert!(provider.mutations().is_empty());
}

#[tokio::test]
async fn create_failure_is_returned_and_rerun_recovers() {
    let provider = RecordingProvider::with_zone("example.com").await;
    provider.fail(Op::Create, 1);
    let reconciler = reconciler(&provider);
    let target = challenge("example.com");

    assert_err!(reconciler.set(&target, "TOKEN").await);
    assert_eq!(provider.txt("example.com", "_acme-challenge").await, None);

    // Re-running the same command is the recovery path
    let outcome = reconciler.set(&target, "TOKEN").await.unwrap();
    assert_eq!(outcome, SetOutcome::Created { ttl: 3600 });
}

#[tokio::test]
async fn append_failure_is_returned() {
    let provider = RecordingProvider::with_zone("example.com").await;
    provider
        .seed_txt("example.com", "_acme-challenge", &["\"OLD\""])
        .await;
    provider.fail(Op::Add, 1);
    let reconciler = reconciler(&provider);

    let result = reconciler.set(&challenge("example.com"), "NEW").await;

    assert!(result.is_err());
    assert_eq!(
        provider.txt("example.com", "_acme-challenge").await,
        Some(vec![quoted("OLD")])
    );
}

#[tokio::test]
async fn unquotable_value_is_rejected_before_any_call() {
    let provider = RecordingProvider::with_zone("example.com").await;
    let reconciler = reconciler(&provider);

    let result = reconciler
        .set(&challenge("example.com"), "bad\"value")
        .await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(provider.calls().is_empty());
}
