use pledge::prelude::*;
use pledge_io::tokio;
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn fulfilled_after<T: Clone + Send + 'static>(after: Duration, value: T) -> Promise<T> {
    delay(after).map(&Inline, move |_| Ok(value))
}

#[tokio::test]
async fn all_of_nothing_is_empty() {
    pledge_logging::setup_log_no_panic_hook();
    let values = all(Vec::<Promise<u8>>::new()).await.unwrap();
    assert!(values.is_empty());
}

#[tokio::test]
async fn all_keeps_input_order() {
    pledge_logging::setup_log_no_panic_hook();
    let values = all(vec![
        fulfilled_after(Duration::from_millis(30), 1),
        Promise::fulfilled(2),
        fulfilled_after(Duration::from_millis(10), 3),
    ])
    .await
    .unwrap();

    assert_eq!(values, vec![1, 2, 3]);
}

#[tokio::test]
async fn all_rejects_with_the_failing_input() {
    pledge_logging::setup_log_no_panic_hook();
    let error = all(vec![Promise::fulfilled(1), Promise::rejected(Error::msg("E"))])
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "E");
}

#[tokio::test]
async fn all_settled_never_rejects() {
    pledge_logging::setup_log_no_panic_hook();
    let slots = all_settled(vec![
        fulfilled_after(Duration::from_millis(10), "late"),
        Promise::rejected(PromiseError::Timeout),
        timeout(Duration::from_millis(5)),
    ])
    .await
    .unwrap();

    assert_eq!(slots, vec![Some("late"), None, None]);
}

#[tokio::test]
async fn race_settles_with_the_fastest() {
    pledge_logging::setup_log_no_panic_hook();
    let slow = fulfilled_after(Duration::from_millis(300), "slow");
    let fast = fulfilled_after(Duration::ZERO, "fast");
    let winner = race(vec![slow.clone(), fast]);

    assert_eq!(winner.clone().await.unwrap(), "fast");

    // the loser settling later leaves the outcome alone
    assert_eq!(slow.await.unwrap(), "slow");
    assert_eq!(winner.value(), Some("fast"));
}

#[rstest]
#[case(0, 1)]
#[case(2, 3)]
#[tokio::test]
async fn retry_makes_count_plus_one_attempts(#[case] count: usize, #[case] attempts: usize) {
    pledge_logging::setup_log_no_panic_hook();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let error = retry(count, Duration::ZERO, move || {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        Promise::<()>::rejected(Error::msg(format!("attempt {call}")))
    })
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), attempts);
    assert_eq!(error.to_string(), format!("attempt {}", attempts - 1));
}

#[rstest]
#[case(200, false)]
#[case(50, true)]
#[tokio::test]
async fn add_timeout_races_a_timer(#[case] settles_after_ms: u64, #[case] fulfills: bool) {
    pledge_logging::setup_log_no_panic_hook();
    let outcome = fulfilled_after(Duration::from_millis(settles_after_ms), 1u8)
        .add_timeout(Duration::from_millis(100))
        .await;

    match outcome {
        Ok(value) => {
            assert!(fulfills);
            assert_eq!(value, 1);
        }
        Err(error) => {
            assert!(!fulfills);
            assert_eq!(error.downcast_ref::<PromiseError>(), Some(&PromiseError::Timeout));
        }
    }
}

#[tokio::test]
async fn then_doubles() {
    pledge_logging::setup_log_no_panic_hook();
    let doubled = Promise::fulfilled(5).map(&SharedQueue::global(), |value| Ok(value * 2));
    assert_eq!(doubled.await.unwrap(), 10);
}

#[tokio::test]
async fn zip_pairs_values() {
    pledge_logging::setup_log_no_panic_hook();
    let pair = zip(&Promise::fulfilled("a"), &Promise::fulfilled(1)).await.unwrap();
    assert_eq!(pair, ("a", 1));
}

#[tokio::test]
async fn kickoff_chain_recovers_and_filters() {
    pledge_logging::setup_log_no_panic_hook();
    let queue = SharedQueue::global();
    let value = kickoff(|| -> Result<u32, Error> { Err(Error::msg("cold cache")) })
        .recover(&queue, |_| kickoff(|| Ok::<_, Error>(40)))
        .map(&queue, |value| Ok(value + 2))
        .filter(&queue, |value| *value == 42)
        .await
        .unwrap();

    assert_eq!(value, 42);
}

#[tokio::test]
async fn steps_tell_which_link_failed() {
    pledge_logging::setup_log_no_panic_hook();
    let queue = SharedQueue::global();
    let error = Promise::fulfilled(1)
        .map(&queue, |value| Ok(value + 1))
        .step(&queue, 1)
        .filter(&queue, |value| *value > 10)
        .step(&queue, 2)
        .await
        .unwrap_err();

    let step = error.downcast_ref::<StepError>().unwrap();
    assert_eq!(step.step, 2);
    assert!(step.error.is::<PromiseError>());
}

#[tokio::test]
async fn async_map_reports_failing_index() {
    pledge_logging::setup_log_no_panic_hook();
    let error = async_map(vec!["1", "2", "three", "4"], &SharedQueue::global(), |text, _| {
        text.parse::<u8>().map_err(Error::from)
    })
    .await
    .unwrap_err();

    let failed = error.downcast_ref::<IndexError>().unwrap();
    assert_eq!(failed.index, 2);
    assert!(failed.error.downcast_ref::<std::num::ParseIntError>().is_some());
}

#[tokio::test]
async fn spawned_futures_join_promises() {
    pledge_logging::setup_log_no_panic_hook();
    let queue = SharedQueue::global();
    let (left, right) = (
        Promise::spawn(&queue, async { Ok(String::from("left")) }),
        Promise::spawn(&queue, async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(2usize)
        }),
    );

    let (text, number, _) = zip3(&left, &right, &delay(Duration::from_millis(5))).await.unwrap();
    assert_eq!((text.as_str(), number), ("left", 2));
}
