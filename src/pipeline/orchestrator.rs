//! Merger pipeline that runs from startup until shutdown.

use crate::config::Config;
use crate::error::Result;
use crate::merge::AccumulatorConfig;
use crate::pipeline::emitters::{EmitterBank, Outputs};
use crate::pipeline::error::{ErrorReporter, LogReporter};
use crate::pipeline::feed::RecognizerFeed;
use crate::pipeline::merger_station::MergerStation;
use crate::pipeline::station::StationRunner;
use crate::time::{Clock, SystemClock};
use crate::timing::AdjustPolicy;
use crossbeam_channel::bounded;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Accumulator configuration
    pub merge: AccumulatorConfig,
    /// Originating-time adjustment policy
    pub policy: AdjustPolicy,
    /// Ingress channel buffer size
    pub event_buffer: usize,
    /// Per-output-stream channel buffer size
    pub output_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            merge: AccumulatorConfig::default(),
            policy: AdjustPolicy::default(),
            event_buffer: crate::defaults::CHANNEL_CAPACITY,
            output_buffer: crate::defaults::CHANNEL_CAPACITY,
        }
    }
}

impl PipelineConfig {
    /// Derives a pipeline configuration from the loaded TOML configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            merge: AccumulatorConfig {
                min_silence: Duration::from_millis(config.merge.min_silence_ms),
                max_alternates: config.merge.max_alternates,
                separator: config.merge.separator.clone(),
            },
            policy: config.timing.policy,
            event_buffer: config.pipeline.event_buffer,
            output_buffer: config.pipeline.output_buffer,
        }
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    /// Flag to signal shutdown
    running: Arc<AtomicBool>,
    /// Join handles for spawned threads
    threads: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Stops the pipeline gracefully.
    ///
    /// Signals the feed to reject further events, then waits up to 1s for
    /// the merger thread to finish. The merger exits once every
    /// [`RecognizerFeed`] clone has been dropped and the ingress channel has
    /// drained; drop the feed before calling this for a clean join. After
    /// the deadline, remaining threads are detached — they die with the
    /// process.
    pub fn stop(mut self) {
        // Signal shutdown
        self.running.store(false, Ordering::SeqCst);

        let deadline = Instant::now() + Duration::from_secs(1);
        let poll_interval = Duration::from_millis(50);

        loop {
            // Drain finished threads, joining each to catch panics
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    if let Err(panic_info) = handle.join() {
                        let msg = panic_info
                            .downcast_ref::<&str>()
                            .copied()
                            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                            .unwrap_or("unknown panic");
                        eprintln!("utterflow: pipeline thread panicked: {msg}");
                    }
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }

            if Instant::now() >= deadline {
                eprintln!(
                    "utterflow: shutdown timeout — {} thread(s) still running, detaching",
                    self.threads.len()
                );
                // Dropping JoinHandles detaches threads; they die with the process.
                break;
            }

            thread::sleep(poll_interval);
        }
    }

    /// Returns true if the pipeline is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Merger pipeline: RecognizerFeed → MergerStation → reconciled outputs.
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    /// Creates a new pipeline with default error reporter.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LogReporter),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Sets a custom clock (for deterministic testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Starts the pipeline.
    ///
    /// # Returns
    /// The ingress feed for recognizer events, the typed output receivers,
    /// and a handle to control and stop the pipeline.
    pub fn start(self) -> Result<(RecognizerFeed, Outputs, PipelineHandle)> {
        let running = Arc::new(AtomicBool::new(true));

        // Ingress channel between the feed and the merger station
        let (event_tx, event_rx) = bounded(self.config.event_buffer);

        let (emitters, outputs) = EmitterBank::new(self.config.policy, self.config.output_buffer)?;
        let station = MergerStation::with_clock(self.config.merge, emitters, self.clock.clone());

        // The merger is terminal and emits through the bank's out-of-band
        // channels; its station output never fires, so the dummy channel's
        // receiving side is dropped immediately.
        let (merger_out_tx, _) = bounded::<()>(1);

        let merger_runner =
            StationRunner::spawn(station, event_rx, merger_out_tx, self.error_reporter.clone());

        let feed = RecognizerFeed::new(event_tx, running.clone());

        // Wrap the runner join handle to surface panics on shutdown
        let threads = vec![thread::spawn(move || {
            if let Err(msg) = merger_runner.join() {
                eprintln!("utterflow: {msg}");
            }
        })];

        Ok((feed, outputs, PipelineHandle { running, threads }))
    }
}
