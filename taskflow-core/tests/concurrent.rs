use std::sync::Arc;
use std::thread;

use taskflow_core::{BuiltinStatus, StatusTransitionPolicy};

fn assert_send_sync<T: Send + Sync>() {}

fn all_answers(policy: &StatusTransitionPolicy) -> Vec<(Vec<String>, Vec<bool>)> {
    let mut names: Vec<&str> = BuiltinStatus::ALL.iter().map(|s| s.as_str()).collect();
    names.push("archived");

    names
        .iter()
        .map(|from| {
            let transitions: Vec<String> = policy
                .transitions(from)
                .iter()
                .map(|s| s.to_string())
                .collect();
            let allowed: Vec<bool> = names.iter().map(|to| policy.is_allowed(from, to)).collect();
            (transitions, allowed)
        })
        .collect()
}

#[test]
fn policy_is_send_and_sync() {
    assert_send_sync::<StatusTransitionPolicy>();
}

#[test]
fn threads_sharing_a_policy_see_sequential_results() {
    let policy = Arc::new(StatusTransitionPolicy::builtin());
    let expected = all_answers(&policy);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let policy = Arc::clone(&policy);
            thread::spawn(move || {
                (0..200)
                    .map(|_| all_answers(&policy))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for answers in handle.join().unwrap() {
            assert_eq!(answers, expected);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tasks_sharing_a_static_policy_see_sequential_results() {
    static POLICY: std::sync::OnceLock<StatusTransitionPolicy> = std::sync::OnceLock::new();
    let policy = POLICY.get_or_init(StatusTransitionPolicy::builtin);
    let expected = all_answers(policy);

    let tasks = (0..64).map(|_| tokio::spawn(async move { all_answers(policy) }));
    let results = futures::future::join_all(tasks).await;

    for result in results {
        assert_eq!(result.unwrap(), expected);
    }
}
