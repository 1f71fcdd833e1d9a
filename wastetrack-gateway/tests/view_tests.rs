use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::time::sleep;
use wastetrack_gateway::{LoadOutcome, ViewQuery};
use wastetrack_store::{StoreError, StoreResult};

fn rows(names: &[&str]) -> StoreResult<Vec<String>> {
    Ok(names.iter().map(|n| (*n).to_string()).collect())
}

#[tokio::test]
async fn single_load_applies() {
    let view: ViewQuery<String> = ViewQuery::new();
    let outcome = view.load(async { rows(&["a", "b"]) }).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Applied);
    assert_eq!(view.rows(), vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn sequential_loads_each_apply() {
    let view: ViewQuery<String> = ViewQuery::new();
    assert_eq!(
        view.load(async { rows(&["first"]) }).await.unwrap(),
        LoadOutcome::Applied
    );
    assert_eq!(
        view.load(async { rows(&["second"]) }).await.unwrap(),
        LoadOutcome::Applied
    );
    assert_eq!(view.rows(), vec!["second".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn late_completion_of_superseded_load_is_discarded() {
    let view: ViewQuery<String> = ViewQuery::new();

    // The slow load is issued first; the user re-filters before it lands.
    let slow = view.load(async {
        sleep(Duration::from_secs(2)).await;
        rows(&["stale"])
    });
    let fast = view.load(async { rows(&["fresh"]) });

    let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);
    assert_eq!(fast_outcome.unwrap(), LoadOutcome::Applied);
    assert_eq!(slow_outcome.unwrap(), LoadOutcome::Superseded);
    assert_eq!(view.rows(), vec!["fresh".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn error_in_superseded_load_is_swallowed() {
    let view: ViewQuery<String> = ViewQuery::new();

    let slow = view.load(async {
        sleep(Duration::from_secs(2)).await;
        Err::<Vec<String>, _>(StoreError::Task("backend went away".into()))
    });
    let fast = view.load(async { rows(&["fresh"]) });

    let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);
    assert_eq!(fast_outcome.unwrap(), LoadOutcome::Applied);
    assert_eq!(slow_outcome.unwrap(), LoadOutcome::Superseded);
    assert_eq!(view.rows(), vec!["fresh".to_string()]);
}

#[tokio::test]
async fn error_in_latest_load_surfaces_and_keeps_rows() {
    let view: ViewQuery<String> = ViewQuery::new();
    view.load(async { rows(&["kept"]) }).await.unwrap();

    let err = view
        .load(async { Err::<Vec<String>, _>(StoreError::NotFound("table gone".into())) })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(view.rows(), vec!["kept".to_string()]);
}
