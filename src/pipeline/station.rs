//! Station abstraction and runner.
//!
//! A station is a single-threaded event processor: it owns its state, runs
//! on a dedicated thread, and talks to the rest of the pipeline only through
//! channels. This gives the accumulator and reconciler the serialized
//! delivery context their contracts require without any locking.

use crate::pipeline::error::{ErrorReporter, StationError};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A processing station in the pipeline.
pub trait Station: Send + 'static {
    /// The input type this station receives.
    type Input: Send + 'static;
    /// The output type this station produces.
    type Output: Send + 'static;

    /// Processes a single input item.
    ///
    /// Returns:
    /// - `Ok(Some(output))` - Successfully processed and produced output
    /// - `Ok(None)` - Successfully processed but no output (e.g., filtered, or
    ///   emitted through out-of-band senders)
    /// - `Err(StationError)` - Processing failed
    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StationError>;

    /// Returns the name of this station for error reporting.
    fn name(&self) -> &'static str;

    /// Called when the station is shutting down.
    fn shutdown(&mut self) {}
}

/// Runs a station on a dedicated thread.
///
/// The thread exits when the input channel closes, the output channel
/// closes, or the station reports a fatal error. Recoverable errors are
/// reported and processing continues.
pub struct StationRunner {
    handle: Option<JoinHandle<()>>,
    station_name: &'static str,
}

impl StationRunner {
    /// Spawns a station on its own thread.
    pub fn spawn<S: Station>(
        mut station: S,
        input_rx: Receiver<S::Input>,
        output_tx: Sender<S::Output>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let station_name = station.name();

        let handle = thread::spawn(move || {
            run_station(&mut station, input_rx, output_tx, error_reporter);
        });

        Self {
            handle: Some(handle),
            station_name,
        }
    }

    /// Waits for the station thread to complete.
    pub fn join(mut self) -> Result<(), String> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| format!("Station '{}' thread panicked", self.station_name)),
            None => Ok(()),
        }
    }

    /// Returns the name of the station.
    pub fn name(&self) -> &'static str {
        self.station_name
    }
}

fn run_station<S: Station>(
    station: &mut S,
    input_rx: Receiver<S::Input>,
    output_tx: Sender<S::Output>,
    error_reporter: Arc<dyn ErrorReporter>,
) {
    let station_name = station.name();

    while let Ok(input) = input_rx.recv() {
        match station.process(input) {
            Ok(Some(output)) => {
                if output_tx.send(output).is_err() {
                    // Downstream gone, shut down
                    break;
                }
            }
            Ok(None) => {}
            Err(error @ StationError::Recoverable(_)) => {
                error_reporter.report(station_name, &error);
            }
            Err(error @ StationError::Fatal(_)) => {
                error_reporter.report(station_name, &error);
                break;
            }
        }
    }

    station.shutdown();
}
