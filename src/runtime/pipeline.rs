//! Pipeline coordinator: owns the buffer, spawns and joins the workers.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use handoff::runtime::pipeline::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig {
//!     producers: 2,
//!     items_per_producer: 3,
//!     producer_interval: Duration::ZERO,
//!     consumer_interval: Duration::ZERO,
//!     echo: false,
//! };
//!
//! let pipeline = Pipeline::<u64, 10>::spawn(config, |_, seq| seq as u64).unwrap();
//! let report = pipeline.join().unwrap();
//! assert_eq!(report.drained.len(), 6);
//! assert_eq!(report.final_occupancy, 0);
//! ```

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::buffer::BoundedBuffer;
use crate::runtime::consumer::Consumer;
use crate::runtime::producer::{ItemFn, Producer};

/// Default producer pacing interval.
pub const DEFAULT_PRODUCER_INTERVAL: Duration = Duration::from_millis(50);

/// Configuration for a pipeline run.
///
/// The buffer capacity is the pipeline's const parameter `C`; everything
/// else is runtime configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of producer threads (`N`).
    pub producers: usize,
    /// Items each producer emits (`K`).
    pub items_per_producer: usize,
    /// Sleep after each put, simulating production latency.
    pub producer_interval: Duration,
    /// Sleep after each take. Longer than the producer interval so the
    /// buffer fills and producers feel backpressure.
    pub consumer_interval: Duration,
    /// Emit the per-item console lines.
    pub echo: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            producers: 10,
            items_per_producer: 10,
            producer_interval: DEFAULT_PRODUCER_INTERVAL,
            consumer_interval: DEFAULT_PRODUCER_INTERVAL * 3,
            echo: true,
        }
    }
}

/// Error starting or finishing a pipeline run.
///
/// Both variants are fatal: there is no partial-failure recovery. A pipeline
/// that fails to spawn is abandoned, and callers are expected to exit.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A worker thread could not be created.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: String,
        source: std::io::Error,
    },
    /// A worker thread panicked before completing its iteration count.
    #[error("{name} thread panicked")]
    WorkerPanic { name: String },
}

/// Outcome of a completed run.
pub struct RunReport<T> {
    /// Every item the consumer took, in consumption order. Length is always
    /// `N × K` for a run that returned without error.
    pub drained: Vec<T>,
    /// Buffer occupancy after all workers were joined. Always 0: the
    /// consumer drains exactly what the producers emit.
    pub final_occupancy: usize,
}

/// Handle to a running pipeline.
///
/// Created by [`Pipeline::spawn`]; [`Pipeline::join`] waits for the run to
/// finish and returns the [`RunReport`].
pub struct Pipeline<T: Send + 'static, const C: usize> {
    buffer: Arc<BoundedBuffer<T, C>>,
    consumer_handle: JoinHandle<Vec<T>>,
    producer_handles: Vec<(usize, JoinHandle<()>)>,
}

impl<T: Send + fmt::Debug + 'static, const C: usize> Pipeline<T, C> {
    /// Creates the shared buffer and spawns the consumer thread plus
    /// `config.producers` producer threads.
    ///
    /// `make_item` builds the item a producer emits at each sequence
    /// position, called with `(producer_id, seq)`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if any thread cannot be created.
    /// Workers spawned before the failure are abandoned; spawn failure is a
    /// fatal startup error and the caller is expected to exit.
    pub fn spawn<F>(config: PipelineConfig, make_item: F) -> Result<Self, PipelineError>
    where
        F: Fn(usize, usize) -> T + Send + Sync + 'static,
    {
        info!(
            producers = config.producers,
            items_per_producer = config.items_per_producer,
            capacity = C,
            producer_interval_ms = config.producer_interval.as_millis() as u64,
            consumer_interval_ms = config.consumer_interval.as_millis() as u64,
            "pipeline starting"
        );

        let buffer: Arc<BoundedBuffer<T, C>> = Arc::new(BoundedBuffer::new());
        let make_item: ItemFn<T> = Arc::new(make_item);
        let expected = config.producers * config.items_per_producer;

        debug!("spawning consumer thread");
        let consumer = Consumer::new(
            Arc::clone(&buffer),
            expected,
            config.consumer_interval,
            config.echo,
        );
        let consumer_handle = thread::Builder::new()
            .name("handoff-consumer".into())
            .spawn(move || consumer.run())
            .map_err(|source| PipelineError::Spawn {
                name: "consumer".into(),
                source,
            })?;

        let mut producer_handles = Vec::with_capacity(config.producers);
        for id in 0..config.producers {
            debug!(producer = id, "spawning producer thread");
            let producer = Producer::new(
                id,
                Arc::clone(&buffer),
                config.items_per_producer,
                config.producer_interval,
                config.echo,
                Arc::clone(&make_item),
            );
            let handle = thread::Builder::new()
                .name(format!("handoff-producer-{id}"))
                .spawn(move || producer.run())
                .map_err(|source| PipelineError::Spawn {
                    name: format!("producer {id}"),
                    source,
                })?;
            producer_handles.push((id, handle));
        }

        info!("pipeline started");

        Ok(Self {
            buffer,
            consumer_handle,
            producer_handles,
        })
    }

    /// The shared buffer, for observing occupancy while the run is live.
    #[must_use]
    pub fn buffer(&self) -> Arc<BoundedBuffer<T, C>> {
        Arc::clone(&self.buffer)
    }

    /// Waits for the consumer, then every producer in spawn order, and
    /// returns the run report.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::WorkerPanic`] if any worker panicked.
    pub fn join(self) -> Result<RunReport<T>, PipelineError> {
        let Self {
            buffer,
            consumer_handle,
            producer_handles,
        } = self;

        debug!("waiting for consumer thread to exit");
        let drained = consumer_handle
            .join()
            .map_err(|_| PipelineError::WorkerPanic {
                name: "consumer".into(),
            })?;

        for (id, handle) in producer_handles {
            debug!(producer = id, "waiting for producer thread to exit");
            handle.join().map_err(|_| PipelineError::WorkerPanic {
                name: format!("producer {id}"),
            })?;
        }

        let final_occupancy = buffer.len();
        info!(
            drained = drained.len(),
            final_occupancy, "pipeline run complete"
        );

        Ok(RunReport {
            drained,
            final_occupancy,
        })
    }
}

/// Spawns a pipeline and waits for it to finish.
///
/// # Errors
///
/// Returns [`PipelineError`] if a worker cannot be spawned or panics.
pub fn run<T, const C: usize, F>(
    config: PipelineConfig,
    make_item: F,
) -> Result<RunReport<T>, PipelineError>
where
    T: Send + fmt::Debug + 'static,
    F: Fn(usize, usize) -> T + Send + Sync + 'static,
{
    Pipeline::<T, C>::spawn(config, make_item)?.join()
}
