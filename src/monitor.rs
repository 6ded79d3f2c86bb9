use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::error::{AppError, FailureClass};
use crate::kalshi::rest::KalshiRestClient;
use crate::model::calibration::CalibratedModel;
use crate::model::signal::{self, SignalDirection, SignalEvent};

/// Where the monitor loop gets its live mid prices. The real implementation
/// hits the venue; tests plug in a mock and never touch the network.
pub trait QuoteSource {
    /// Fetch both legs back-to-back so one tick observes a single,
    /// temporally coherent snapshot. Returns (mid_x, mid_y) in dollars.
    fn mid_prices(
        &self,
        ticker_x: &str,
        ticker_y: &str,
    ) -> impl std::future::Future<Output = Result<(f64, f64), AppError>> + Send;
}

impl QuoteSource for KalshiRestClient {
    async fn mid_prices(&self, ticker_x: &str, ticker_y: &str) -> Result<(f64, f64), AppError> {
        let book_x = self.fetch_order_book(ticker_x).await?;
        let book_y = self.fetch_order_book(ticker_y).await?;

        let mid_x = book_x
            .mid_price()
            .ok_or_else(|| AppError::QuotesUnavailable(format!("{ticker_x} missing a bid or ask")))?;
        let mid_y = book_y
            .mid_price()
            .ok_or_else(|| AppError::QuotesUnavailable(format!("{ticker_y} missing a bid or ask")))?;
        Ok((mid_x, mid_y))
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Nominal sleep between successful ticks.
    pub poll_interval: Duration,
    /// Short sleep when one leg has no quotes (not an error).
    pub skip_interval: Duration,
    /// Baseline retry delay after a transient failure.
    pub base_retry_delay: Duration,
    /// Backoff ceiling.
    pub max_retry_delay: Duration,
    /// Consecutive transient failures tolerated before the delay doubles.
    pub error_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            skip_interval: Duration::from_secs(5),
            base_retry_delay: Duration::from_secs(10),
            max_retry_delay: Duration::from_secs(300),
            error_threshold: 3,
        }
    }
}

/// Loop-local retry bookkeeping, threaded explicitly so backoff behavior is
/// testable without sleeping or networking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    pub consecutive_errors: u32,
    pub delay: Duration,
}

impl RetryState {
    pub fn new(base_delay: Duration) -> Self {
        Self {
            consecutive_errors: 0,
            delay: base_delay,
        }
    }

    /// Record one transient failure and return the delay to sleep before the
    /// next attempt. Once the consecutive count exceeds the threshold the
    /// delay doubles, capped at the configured ceiling. The loop never gives
    /// up on transient errors; it only slows down.
    pub fn record_failure(&mut self, cfg: &MonitorConfig) -> Duration {
        self.consecutive_errors += 1;
        if self.consecutive_errors > cfg.error_threshold {
            self.delay = (self.delay * 2).min(cfg.max_retry_delay);
        }
        self.delay
    }

    pub fn record_success(&mut self, cfg: &MonitorConfig) {
        self.consecutive_errors = 0;
        self.delay = cfg.base_retry_delay;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    ShuttingDown,
    Stopped,
}

/// Single-threaded, cooperative polling loop: fetch both mid prices, run the
/// signal detector, log, sleep, repeat. The shutdown receiver is the only
/// external control; it is observed between ticks, never mid-fetch.
pub struct MonitorLoop<S: QuoteSource> {
    source: S,
    model: CalibratedModel,
    cfg: MonitorConfig,
    shutdown: watch::Receiver<bool>,
    events: Option<mpsc::UnboundedSender<SignalEvent>>,
    halt: bool,
}

impl<S: QuoteSource> MonitorLoop<S> {
    pub fn new(
        source: S,
        model: CalibratedModel,
        cfg: MonitorConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            model,
            cfg,
            shutdown,
            events: None,
            halt: false,
        }
    }

    /// Mirror every emitted SignalEvent to a channel (the log remains the
    /// primary output; nothing is persisted).
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SignalEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.halt || *self.shutdown.borrow()
    }

    /// Run until shutdown. Returns Err only for fatal conditions detected
    /// before the first tick; transient trouble never exits the loop.
    pub async fn run(mut self) -> Result<LoopState, AppError> {
        // An invalid model must stop us here, before any network call.
        self.model.validate()?;

        info!(
            ticker_x = %self.model.ticker_x,
            ticker_y = %self.model.ticker_y,
            slope = self.model.slope,
            intercept = self.model.intercept,
            threshold = self.model.threshold,
            "Live monitor starting"
        );

        let mut retry = RetryState::new(self.cfg.base_retry_delay);

        while !self.shutdown_requested() {
            match self
                .source
                .mid_prices(&self.model.ticker_x, &self.model.ticker_y)
                .await
            {
                Ok((mid_x, mid_y)) => {
                    retry.record_success(&self.cfg);
                    let event = signal::detect(mid_x, mid_y, &self.model);
                    self.emit(mid_x, mid_y, event);
                    self.sleep(self.cfg.poll_interval).await;
                }
                Err(err) => match err.failure_class() {
                    FailureClass::SkipTick => {
                        warn!(error = %err, "One leg has no live quotes, skipping tick");
                        self.sleep(self.cfg.skip_interval).await;
                    }
                    FailureClass::Transient => {
                        let delay = retry.record_failure(&self.cfg);
                        warn!(
                            error = %err,
                            consecutive_errors = retry.consecutive_errors,
                            retry_delay_secs = delay.as_secs_f64(),
                            "Transient failure, backing off"
                        );
                        self.sleep(delay).await;
                    }
                    FailureClass::Fatal => return Err(err),
                },
            }
        }

        info!(state = ?LoopState::ShuttingDown, "Shutdown requested, no further requests will be issued");
        info!(state = ?LoopState::Stopped, "Live monitor stopped");
        Ok(LoopState::Stopped)
    }

    fn emit(&mut self, mid_x: f64, mid_y: f64, event: SignalEvent) {
        match event.direction {
            SignalDirection::NoSignal => info!(
                mid_x,
                mid_y,
                live_error = event.live_error,
                threshold = event.threshold,
                "No signal"
            ),
            SignalDirection::SellPair => warn!(
                mid_x,
                mid_y,
                live_error = event.live_error,
                threshold = event.threshold,
                ticker_y = %self.model.ticker_y,
                ticker_x = %self.model.ticker_x,
                "TRADE SIGNAL: SELL PAIR (sell Y, buy X)"
            ),
            SignalDirection::BuyPair => warn!(
                mid_x,
                mid_y,
                live_error = event.live_error,
                threshold = event.threshold,
                ticker_y = %self.model.ticker_y,
                ticker_x = %self.model.ticker_x,
                "TRADE SIGNAL: BUY PAIR (buy Y, sell X)"
            ),
        }
        if let Some(events) = &self.events {
            // Receiver gone means nobody is listening anymore; not an error.
            let _ = events.send(event);
        }
    }

    /// Sleep that wakes early on a shutdown request. A closed shutdown
    /// channel counts as a request: with the operator gone, keep stopping.
    async fn sleep(&mut self, duration: Duration) {
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        self.halt = true;
                        break;
                    }
                    if *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
