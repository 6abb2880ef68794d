use crate::config::LabConfig;
use crate::core::session::{DripToken, TickOutcome, TitrationSession};
use crate::domain::events::{CommandResult, LabEvent, Notice, Rejection};
use crate::domain::model::{BenchItem, IndicatorColor, Readouts, Vessel, VesselKind};
use crate::domain::ports::Notifier;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Handle to the running drip process. Dropping it cancels the process.
struct DripTask {
    handle: JoinHandle<()>,
}

impl Drop for DripTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct BenchState {
    session: TitrationSession,
    drip: Option<DripTask>,
}

struct BenchInner {
    state: Mutex<BenchState>,
    notifier: Arc<dyn Notifier>,
    readouts: watch::Sender<Readouts>,
}

impl BenchInner {
    /// Reports a command outcome. Called with the state lock held so that
    /// notices and readouts come out in the order the session changed.
    fn settle(&self, session: &TitrationSession, result: CommandResult) -> CommandResult {
        match &result {
            Ok(event) => {
                tracing::info!(event = ?event, "{}", event);
                self.readouts.send_replace(session.readouts());
            }
            Err(rejection) => tracing::warn!(rejection = ?rejection, "{}", rejection),
        }
        self.notifier.notify(&Notice::from(&result));
        result
    }
}

/// The bench controller: owns the titration session, runs the drip process
/// while the burette valve is open and reports every change to a [`Notifier`].
///
/// Cloning is cheap and every clone drives the same bench. Must be used from
/// within a tokio runtime.
#[derive(Clone)]
pub struct LabBench {
    inner: Arc<BenchInner>,
}

impl LabBench {
    pub fn new(config: LabConfig, notifier: Arc<dyn Notifier>) -> Self {
        let session = TitrationSession::new(config);
        let (readouts, _) = watch::channel(session.readouts());
        Self {
            inner: Arc::new(BenchInner {
                state: Mutex::new(BenchState {
                    session,
                    drip: None,
                }),
                notifier,
                readouts,
            }),
        }
    }

    pub async fn place_vessel(&self, kind: VesselKind) -> CommandResult {
        let mut state = self.inner.state.lock().await;
        let result = state.session.place_vessel(kind);
        self.inner.settle(&state.session, result)
    }

    pub async fn place_burette(&self) -> CommandResult {
        let mut state = self.inner.state.lock().await;
        let result = state.session.place_burette();
        self.inner.settle(&state.session, result)
    }

    pub async fn add_sample(&self) -> CommandResult {
        let mut state = self.inner.state.lock().await;
        let result = state.session.add_sample();
        self.inner.settle(&state.session, result)
    }

    pub async fn add_indicator(&self) -> CommandResult {
        let mut state = self.inner.state.lock().await;
        let result = state.session.add_indicator();
        self.inner.settle(&state.session, result)
    }

    pub async fn open_valve(&self) -> CommandResult {
        let mut state = self.inner.state.lock().await;
        let result = self.open_locked(&mut state);
        self.inner.settle(&state.session, result)
    }

    pub async fn close_valve(&self) -> CommandResult {
        let mut state = self.inner.state.lock().await;
        let result = Self::close_locked(&mut state);
        self.inner.settle(&state.session, result)
    }

    pub async fn toggle_valve(&self) -> CommandResult {
        let mut state = self.inner.state.lock().await;
        let result = if state.session.valve_open() {
            Self::close_locked(&mut state)
        } else {
            self.open_locked(&mut state)
        };
        self.inner.settle(&state.session, result)
    }

    /// Clears the bench. Any running drip process is cancelled first.
    pub async fn reset(&self) -> LabEvent {
        let mut state = self.inner.state.lock().await;
        state.drip.take();
        let event = state.session.reset();
        let _ = self.inner.settle(&state.session, Ok(event.clone()));
        event
    }

    /// Places an item by name, the way dropping it on the bench would.
    pub async fn drop_item(&self, name: &str) -> CommandResult {
        match BenchItem::from_name(name) {
            Some(BenchItem::Flask) => self.place_vessel(VesselKind::Flask).await,
            Some(BenchItem::Beaker) => self.place_vessel(VesselKind::Beaker).await,
            Some(BenchItem::Burette) => self.place_burette().await,
            Some(BenchItem::Sample) => self.add_sample().await,
            Some(BenchItem::Indicator) => self.add_indicator().await,
            None => {
                let state = self.inner.state.lock().await;
                self.inner.settle(
                    &state.session,
                    Err(Rejection::CannotPlace(name.trim().to_string())),
                )
            }
        }
    }

    pub async fn current_ph(&self) -> Option<f64> {
        self.inner.state.lock().await.session.current_ph()
    }

    pub async fn current_volume_added_ml(&self) -> f64 {
        self.inner.state.lock().await.session.total_titrant_ml()
    }

    pub async fn current_indicator_color(&self) -> Option<IndicatorColor> {
        self.inner.state.lock().await.session.indicator_color()
    }

    pub async fn vessel(&self) -> Option<Vessel> {
        self.inner.state.lock().await.session.vessel().cloned()
    }

    pub async fn is_valve_open(&self) -> bool {
        self.inner.state.lock().await.session.valve_open()
    }

    pub async fn is_dripping(&self) -> bool {
        self.inner.state.lock().await.drip.is_some()
    }

    pub async fn readouts(&self) -> Readouts {
        self.inner.state.lock().await.session.readouts()
    }

    /// Receives a fresh [`Readouts`] after every change, drip ticks included.
    pub fn subscribe(&self) -> watch::Receiver<Readouts> {
        self.inner.readouts.subscribe()
    }

    fn open_locked(&self, state: &mut BenchState) -> CommandResult {
        let token = state.session.open_valve()?;
        // tokio intervals panic on a zero period
        let period = state
            .session
            .config()
            .drip
            .interval()
            .max(Duration::from_millis(1));
        // replacing the handle aborts any leftover process
        state.drip = Some(spawn_drip(Arc::downgrade(&self.inner), token, period));
        Ok(LabEvent::ValveOpened)
    }

    fn close_locked(state: &mut BenchState) -> CommandResult {
        let event = state.session.close_valve()?;
        state.drip.take();
        Ok(event)
    }
}

/// 定時滴定：每個週期滴入一次，直到閥門關閉或滴定管見底
fn spawn_drip(bench: Weak<BenchInner>, token: DripToken, period: Duration) -> DripTask {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(inner) = bench.upgrade() else {
                break;
            };
            let mut state = inner.state.lock().await;

            match state.session.drip_tick(token) {
                TickOutcome::Dripped { added_ml } => {
                    tracing::trace!(
                        added_ml,
                        total_ml = state.session.total_titrant_ml(),
                        "drip"
                    );
                    inner.readouts.send_replace(state.session.readouts());
                }
                TickOutcome::Emptied { added_ml } => {
                    tracing::debug!(added_ml, "burette ran dry");
                    let finished = state.drip.take();
                    let _ = inner.settle(&state.session, Ok(LabEvent::BuretteEmptied));
                    drop(state);
                    drop(finished);
                    break;
                }
                TickOutcome::Ignored => {
                    tracing::debug!("drip process outlived its valve opening");
                    break;
                }
            }
        }
    });

    DripTask { handle }
}
