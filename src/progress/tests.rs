//! Progress Module Tests
//!
//! ## Test Scopes
//! - **Counters**: attribution, consistency of snapshots, stranded-work
//!   accounting.
//! - **Rate limiting**: minimum publish interval and the `force` bypass.
//! - **Rendering**: progress and final report text, success-rate math.

#[cfg(test)]
mod tests {
    use crate::client::types::WorkerId;
    use crate::progress::report::{build_report, render_final, render_progress};
    use crate::progress::types::{success_rate, ProgressSnapshot, WorkerStatus};
    use crate::progress::{ProgressBoard, ProgressSink};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Counts publishes and keeps the last snapshot for inspection.
    struct CaptureSink {
        publishes: AtomicUsize,
        last: std::sync::Mutex<Option<(String, ProgressSnapshot)>>,
    }

    impl CaptureSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                publishes: AtomicUsize::new(0),
                last: std::sync::Mutex::new(None),
            })
        }

        fn count(&self) -> usize {
            self.publishes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProgressSink for CaptureSink {
        async fn publish(&self, text: &str, snapshot: &ProgressSnapshot) {
            self.publishes.fetch_add(1, Ordering::SeqCst);
            let mut last = self.last.lock().unwrap();
            *last = Some((text.to_string(), snapshot.clone()));
        }
    }

    fn worker(label: &str) -> WorkerId {
        WorkerId(label.to_string())
    }

    // ============================================================
    // TEST 1: Counters and snapshots
    // ============================================================

    #[tokio::test]
    async fn test_counters_are_attributed_to_the_given_owner() {
        // ARRANGE
        let board = ProgressBoard::new(CaptureSink::new(), Duration::from_secs(3));
        board.register(worker("a")).await;
        board.register(worker("b")).await;

        // ACT: a helper crediting work to "b"
        board.record_invited(&worker("b")).await;
        board.record_invited(&worker("b")).await;
        board.record_failed(&worker("a")).await;

        // ASSERT
        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.workers.len(), 2);
        let (_, a) = &snapshot.workers[0];
        let (_, b) = &snapshot.workers[1];
        assert_eq!((a.invited, a.failed), (0, 1));
        assert_eq!((b.invited, b.failed), (2, 0));
        assert_eq!(snapshot.total_invited(), 2);
        assert_eq!(snapshot.total_failed(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted_by_worker_id() {
        let board = ProgressBoard::new(CaptureSink::new(), Duration::from_secs(3));
        board.register(worker("zeta")).await;
        board.register(worker("alpha")).await;
        board.register(worker("mid")).await;

        let snapshot = board.snapshot().await;
        let order: Vec<&str> = snapshot.workers.iter().map(|(w, _)| w.0.as_str()).collect();
        assert_eq!(order, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn test_add_failed_accounts_stranded_work_in_bulk() {
        let board = ProgressBoard::new(CaptureSink::new(), Duration::from_secs(3));
        board.register(worker("a")).await;

        board.add_failed(&worker("a"), 4).await;

        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.total_failed(), 4);
    }

    #[tokio::test]
    async fn test_counters_for_unknown_worker_are_ignored() {
        let board = ProgressBoard::new(CaptureSink::new(), Duration::from_secs(3));
        board.register(worker("a")).await;

        board.record_invited(&worker("ghost")).await;

        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.total_invited(), 0);
    }

    #[tokio::test]
    async fn test_status_transitions_are_visible() {
        let board = ProgressBoard::new(CaptureSink::new(), Duration::from_secs(3));
        board.register(worker("a")).await;

        board
            .set_status(&worker("a"), WorkerStatus::Cooldown { wait_secs: 120 })
            .await;

        assert_eq!(
            board.status_of(&worker("a")).await,
            Some(WorkerStatus::Cooldown { wait_secs: 120 })
        );
        assert!(!board.any_active().await);
    }

    // ============================================================
    // TEST 2: Publish rate limiting
    // ============================================================

    #[tokio::test]
    async fn test_non_forced_publish_is_rate_limited() {
        // ARRANGE: a long minimum interval
        let sink = CaptureSink::new();
        let board = ProgressBoard::new(sink.clone(), Duration::from_secs(60));
        board.register(worker("a")).await;

        // ACT: two non-forced publishes back to back
        board.publish_progress(false).await;
        board.publish_progress(false).await;

        // ASSERT: only the first one went out
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test]
    async fn test_forced_publish_bypasses_the_interval() {
        let sink = CaptureSink::new();
        let board = ProgressBoard::new(sink.clone(), Duration::from_secs(60));
        board.register(worker("a")).await;

        board.publish_progress(false).await;
        board.publish_progress(true).await;
        board.publish_progress(true).await;

        assert_eq!(sink.count(), 3);
    }

    #[tokio::test]
    async fn test_zero_interval_publishes_every_time() {
        let sink = CaptureSink::new();
        let board = ProgressBoard::new(sink.clone(), Duration::ZERO);
        board.register(worker("a")).await;

        board.publish_progress(false).await;
        board.publish_progress(false).await;

        assert_eq!(sink.count(), 2);
    }

    #[tokio::test]
    async fn test_skipped_publish_loses_no_data() {
        // ARRANGE
        let sink = CaptureSink::new();
        let board = ProgressBoard::new(sink.clone(), Duration::from_secs(60));
        board.register(worker("a")).await;

        // ACT: mutate between a suppressed publish and a forced one
        board.publish_progress(false).await;
        board.record_invited(&worker("a")).await;
        board.publish_progress(false).await; // suppressed
        board.publish_progress(true).await;

        // ASSERT: the forced publish carries the counter
        let last = sink.last.lock().unwrap();
        let (_, snapshot) = last.as_ref().unwrap();
        assert_eq!(snapshot.total_invited(), 1);
    }

    // ============================================================
    // TEST 3: Success rate
    // ============================================================

    #[test]
    fn test_success_rate_rounds_to_two_decimals() {
        assert_eq!(success_rate(1, 2), 33.33);
        assert_eq!(success_rate(2, 1), 66.67);
        assert_eq!(success_rate(5, 0), 100.0);
        assert_eq!(success_rate(0, 5), 0.0);
    }

    #[test]
    fn test_success_rate_with_no_operations_is_zero() {
        assert_eq!(success_rate(0, 0), 0.0);
    }

    // ============================================================
    // TEST 4: Rendering and the final report
    // ============================================================

    #[tokio::test]
    async fn test_render_progress_contains_workers_and_totals() {
        let board = ProgressBoard::new(CaptureSink::new(), Duration::ZERO);
        board.register(worker("+341111")).await;
        board.register(worker("+342222")).await;
        board.record_invited(&worker("+341111")).await;
        board.record_failed(&worker("+342222")).await;

        let text = render_progress(&board.snapshot().await);

        assert!(text.contains("+341111: invited 1, failed 0"));
        assert!(text.contains("+342222: invited 0, failed 1"));
        assert!(text.contains("total: invited 1, failed 1, success rate 50%"));
    }

    #[tokio::test]
    async fn test_build_report_totals_and_per_worker_rates() {
        let board = ProgressBoard::new(CaptureSink::new(), Duration::ZERO);
        board.register(worker("a")).await;
        board.register(worker("b")).await;
        for _ in 0..3 {
            board.record_invited(&worker("a")).await;
        }
        board.record_failed(&worker("a")).await;
        board
            .set_status(&worker("b"), WorkerStatus::Errored { reason: "dead".into() })
            .await;

        let report = build_report(&board.snapshot().await);

        assert_eq!(report.total_invited, 3);
        assert_eq!(report.total_failed, 1);
        assert_eq!(report.success_rate, 75.0);
        let a = report.workers.iter().find(|w| w.worker.0 == "a").unwrap();
        assert_eq!(a.success_rate, 75.0);
        let b = report.workers.iter().find(|w| w.worker.0 == "b").unwrap();
        assert_eq!(b.final_status, WorkerStatus::Errored { reason: "dead".into() });
    }

    #[tokio::test]
    async fn test_finalize_publishes_even_with_zero_successes() {
        let sink = CaptureSink::new();
        let board = ProgressBoard::new(sink.clone(), Duration::from_secs(60));
        board.register(worker("a")).await;

        let report = board.finalize().await;

        assert_eq!(report.total_invited, 0);
        assert_eq!(sink.count(), 1);
        let last = sink.last.lock().unwrap();
        let (text, _) = last.as_ref().unwrap();
        assert!(text.contains("Invite process completed"));
    }

    #[test]
    fn test_final_report_serializes() {
        let report = build_report(&ProgressSnapshot {
            workers: vec![],
            elapsed_secs: 7,
        });

        let json = serde_json::to_string(&report).expect("serialization failed");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["duration_secs"], 7);
        assert_eq!(value["total_invited"], 0);
    }
}
