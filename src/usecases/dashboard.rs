//! Dashboard aggregation: fan-out fetch of independent sources, fan-in to one
//! render-ready snapshot.
//!
//! - Metrics and recommendations are fetched concurrently, no ordering dependency
//! - The aggregate load state only finalizes once every source has reported
//! - Last-trigger-wins: results carrying a stale trigger sequence are discarded

use crate::domain::{ApiError, DashboardLoadState, DashboardView, DateRange, MetricsSnapshot};
use crate::ports::AnalyticsGateway;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Per-source results for the in-flight trigger. A slot is `Some` once that
/// source has reported, success or failure.
#[derive(Default)]
struct PendingFetch {
    metrics: Option<Result<MetricsSnapshot, ApiError>>,
    recommendations: Option<Result<Vec<String>, ApiError>>,
}

struct AggregateState {
    view: DashboardView,
    /// Trigger sequence, bumped at every dispatch. Resolutions compare
    /// against it; superseded fetches are cancelled logically, not aborted.
    seq: u64,
    pending: PendingFetch,
}

enum SourceResult {
    Metrics(Result<MetricsSnapshot, ApiError>),
    Recommendations(Result<Vec<String>, ApiError>),
}

/// Owns the dashboard view. Observers read cloned snapshots.
pub struct DashboardAggregator {
    api: Arc<dyn AnalyticsGateway>,
    state: Mutex<AggregateState>,
}

impl DashboardAggregator {
    pub fn new(api: Arc<dyn AnalyticsGateway>) -> Self {
        Self {
            api,
            state: Mutex::new(AggregateState {
                view: DashboardView::default(),
                seq: 0,
                pending: PendingFetch::default(),
            }),
        }
    }

    /// Immutable snapshot of the current view.
    pub async fn view(&self) -> DashboardView {
        self.state.lock().await.view.clone()
    }

    /// Dispatch a fresh aggregate fetch. Supersedes any in-flight trigger.
    pub async fn refresh(&self) {
        let seq = {
            let mut st = self.state.lock().await;
            st.seq += 1;
            st.pending = PendingFetch::default();
            st.view.metrics = None;
            st.view.recommendations = None;
            st.view.load_state = DashboardLoadState::Loading;
            st.seq
        };
        debug!(seq, "dashboard refresh dispatched");

        tokio::join!(
            async {
                let result = self.api.metrics_summary().await;
                self.record(seq, SourceResult::Metrics(result)).await;
            },
            async {
                let result = self.api.recommendations(None).await;
                self.record(seq, SourceResult::Recommendations(result)).await;
            }
        );
    }

    /// Change the reporting window. Invalidates the snapshot and re-triggers;
    /// selecting the already-current range does nothing.
    pub async fn set_date_range(&self, range: DateRange) {
        {
            let mut st = self.state.lock().await;
            if st.view.date_range == range {
                return;
            }
            st.view.date_range = range;
        }
        info!(%range, "date range changed; refreshing dashboard");
        self.refresh().await;
    }

    /// Return the view to its initial state and orphan any in-flight fetch.
    /// The date range is a view preference and survives the reset.
    pub async fn reset(&self) {
        let mut st = self.state.lock().await;
        st.seq += 1;
        st.pending = PendingFetch::default();
        st.view = DashboardView {
            date_range: st.view.date_range,
            ..DashboardView::default()
        };
        debug!(seq = st.seq, "dashboard reset");
    }

    /// Record one source's result for the given trigger. The view only
    /// transitions once both sources of the current trigger have reported.
    async fn record(&self, seq: u64, result: SourceResult) {
        let mut st = self.state.lock().await;
        if st.seq != seq {
            debug!(stale = seq, current = st.seq, "discarding result of superseded fetch");
            return;
        }

        match result {
            SourceResult::Metrics(r) => st.pending.metrics = Some(r),
            SourceResult::Recommendations(r) => st.pending.recommendations = Some(r),
        }
        if st.pending.metrics.is_none() || st.pending.recommendations.is_none() {
            return;
        }
        let (Some(metrics), Some(recommendations)) =
            (st.pending.metrics.take(), st.pending.recommendations.take())
        else {
            return;
        };

        st.view.load_state = match (metrics, recommendations) {
            (Ok(m), Ok(r)) => {
                st.view.metrics = Some(m);
                st.view.recommendations = Some(r);
                DashboardLoadState::Loaded
            }
            (Ok(m), Err(e)) => {
                warn!(error = %e, "recommendations fetch failed; rendering metrics only");
                st.view.metrics = Some(m);
                DashboardLoadState::PartiallyLoaded
            }
            (Err(e), Ok(r)) => {
                warn!(error = %e, "metrics fetch failed; rendering recommendations only");
                st.view.recommendations = Some(r);
                DashboardLoadState::PartiallyLoaded
            }
            (Err(me), Err(re)) => {
                warn!(metrics_error = %me, recommendations_error = %re, "dashboard fetch failed");
                DashboardLoadState::Failed
            }
        };
        info!(seq, state = ?st.view.load_state, "dashboard fetch finalized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BestTimes, HistoryTurn, UploadReceipt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn snapshot(total: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            total_engagements: total,
            avg_engagement_rate: 4.2,
            best_post_type: "Reels".into(),
            best_time_overall: "6pm".into(),
        }
    }

    /// Gateway double with one scripted metrics result per call, keyed by call
    /// index. A gate on the first metrics call lets tests hold trigger A open
    /// while trigger B runs to completion.
    struct ScriptedGateway {
        metrics: Vec<Result<MetricsSnapshot, ApiError>>,
        recommendations: Result<Vec<String>, ApiError>,
        first_metrics_gate: Option<Arc<Notify>>,
        metrics_calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(
            metrics: Vec<Result<MetricsSnapshot, ApiError>>,
            recommendations: Result<Vec<String>, ApiError>,
        ) -> Self {
            Self {
                metrics,
                recommendations,
                first_metrics_gate: None,
                metrics_calls: AtomicUsize::new(0),
            }
        }

        fn gate_first_metrics(mut self, gate: Arc<Notify>) -> Self {
            self.first_metrics_gate = Some(gate);
            self
        }
    }

    #[async_trait::async_trait]
    impl AnalyticsGateway for ScriptedGateway {
        async fn send_chat(&self, _message: &str) -> Result<String, ApiError> {
            Err(ApiError::Network("not scripted".into()))
        }

        async fn chat_history(&self) -> Result<Vec<HistoryTurn>, ApiError> {
            Err(ApiError::Network("not scripted".into()))
        }

        async fn metrics_summary(&self) -> Result<MetricsSnapshot, ApiError> {
            let call = self.metrics_calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                if let Some(gate) = &self.first_metrics_gate {
                    gate.notified().await;
                }
            }
            self.metrics
                .get(call)
                .cloned()
                .unwrap_or_else(|| Err(ApiError::Network("script exhausted".into())))
        }

        async fn recommendations(&self, _post_type: Option<&str>) -> Result<Vec<String>, ApiError> {
            self.recommendations.clone()
        }

        async fn best_times(&self, _post_type: Option<&str>) -> Result<BestTimes, ApiError> {
            Err(ApiError::Network("not scripted".into()))
        }

        async fn upload(&self, _name: &str, _bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
            Err(ApiError::Network("not scripted".into()))
        }

        async fn health(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn aggregator(gateway: ScriptedGateway) -> (Arc<DashboardAggregator>, Arc<ScriptedGateway>) {
        let gw = Arc::new(gateway);
        (Arc::new(DashboardAggregator::new(gw.clone())), gw)
    }

    #[tokio::test]
    async fn both_sources_succeeding_yields_loaded() {
        let (agg, _gw) = aggregator(ScriptedGateway::new(
            vec![Ok(snapshot(2000))],
            Ok(vec!["post more reels".into()]),
        ));
        agg.refresh().await;

        let view = agg.view().await;
        assert_eq!(view.load_state, DashboardLoadState::Loaded);
        assert_eq!(view.metrics, Some(snapshot(2000)));
        assert_eq!(view.recommendations, Some(vec!["post more reels".into()]));
    }

    #[tokio::test]
    async fn one_failed_source_yields_partially_loaded() {
        let (agg, _gw) = aggregator(ScriptedGateway::new(
            vec![Ok(snapshot(2000))],
            Err(ApiError::Server {
                status: 500,
                message: "boom".into(),
            }),
        ));
        agg.refresh().await;

        let view = agg.view().await;
        assert_eq!(view.load_state, DashboardLoadState::PartiallyLoaded);
        assert_eq!(view.metrics, Some(snapshot(2000)));
        assert_eq!(view.recommendations, None);
    }

    #[tokio::test]
    async fn all_sources_failing_yields_failed() {
        let (agg, _gw) = aggregator(ScriptedGateway::new(
            vec![Err(ApiError::Network("down".into()))],
            Err(ApiError::Network("down".into())),
        ));
        agg.refresh().await;

        let view = agg.view().await;
        assert_eq!(view.load_state, DashboardLoadState::Failed);
        assert_eq!(view.metrics, None);
        assert_eq!(view.recommendations, None);
    }

    #[tokio::test]
    async fn view_stays_loading_until_every_source_reports() {
        let gate = Arc::new(Notify::new());
        let (agg, _gw) = aggregator(
            ScriptedGateway::new(vec![Ok(snapshot(1))], Ok(vec!["r".into()]))
                .gate_first_metrics(gate.clone()),
        );

        let task = {
            let agg = agg.clone();
            tokio::spawn(async move { agg.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Recommendations already resolved, but no visible transition yet.
        let mid = agg.view().await;
        assert_eq!(mid.load_state, DashboardLoadState::Loading);
        assert_eq!(mid.recommendations, None);

        gate.notify_one();
        task.await.unwrap();
        assert_eq!(agg.view().await.load_state, DashboardLoadState::Loaded);
    }

    #[tokio::test]
    async fn superseded_trigger_never_overwrites_newer_state() {
        // Trigger A's metrics are held at the gate; trigger B runs to
        // completion; then A resolves and must be discarded.
        let gate = Arc::new(Notify::new());
        let (agg, gw) = aggregator(
            ScriptedGateway::new(
                vec![Ok(snapshot(111)), Ok(snapshot(222))],
                Ok(vec!["fresh".into()]),
            )
            .gate_first_metrics(gate.clone()),
        );

        let trigger_a = {
            let agg = agg.clone();
            tokio::spawn(async move { agg.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        agg.refresh().await; // trigger B
        let after_b = agg.view().await;
        assert_eq!(after_b.load_state, DashboardLoadState::Loaded);
        assert_eq!(after_b.metrics, Some(snapshot(222)));

        gate.notify_one(); // let A's metrics resolve late
        trigger_a.await.unwrap();

        let final_view = agg.view().await;
        assert_eq!(final_view.load_state, DashboardLoadState::Loaded);
        assert_eq!(final_view.metrics, Some(snapshot(222)));
        assert_eq!(final_view.recommendations, Some(vec!["fresh".into()]));
        assert_eq!(gw.metrics_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn date_range_change_invalidates_and_refetches() {
        let (agg, gw) = aggregator(ScriptedGateway::new(
            vec![Ok(snapshot(1)), Ok(snapshot(2))],
            Ok(vec![]),
        ));
        agg.refresh().await;

        // Selecting the current range is a no-op.
        agg.set_date_range(DateRange::Month).await;
        assert_eq!(gw.metrics_calls.load(Ordering::SeqCst), 1);

        agg.set_date_range(DateRange::Quarter).await;
        let view = agg.view().await;
        assert_eq!(view.date_range, DateRange::Quarter);
        assert_eq!(view.metrics, Some(snapshot(2)));
        assert_eq!(gw.metrics_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reset_orphans_in_flight_fetch() {
        let gate = Arc::new(Notify::new());
        let (agg, _gw) = aggregator(
            ScriptedGateway::new(vec![Ok(snapshot(1))], Ok(vec!["r".into()]))
                .gate_first_metrics(gate.clone()),
        );

        let task = {
            let agg = agg.clone();
            tokio::spawn(async move { agg.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        agg.reset().await;
        gate.notify_one();
        task.await.unwrap();

        let view = agg.view().await;
        assert_eq!(view.load_state, DashboardLoadState::Idle);
        assert_eq!(view.metrics, None);
        assert_eq!(view.recommendations, None);
    }
}
