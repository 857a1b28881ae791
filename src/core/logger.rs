//! Main logger implementation

use super::{
    appender::Appender,
    detail::DetailValue,
    error::{LoggerError, Result},
    exception::LogException,
    log_event::{LogEvent, LogEventBuilder},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    panic_message,
};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// Used when the logger is dropped without explicit shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Called with the running drop count when the async queue overflows
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

type SharedAppenders = Arc<RwLock<Vec<Box<dyn Appender>>>>;

const BATCH_SIZE: usize = 50;
const BATCH_TIMEOUT: Duration = Duration::from_millis(10);

pub struct Logger {
    min_level: Arc<RwLock<LogLevel>>,
    appenders: SharedAppenders,
    sender: Option<Sender<LogEvent>>,
    async_handle: Option<thread::JoinHandle<()>>,
    metrics: Arc<LoggerMetrics>,
    on_overflow: Option<OverflowCallback>,
}

impl Logger {
    /// Synchronous logger: appenders run on the calling thread
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_level: Arc::new(RwLock::new(LogLevel::Info)),
            appenders: Arc::new(RwLock::new(Vec::new())),
            sender: None,
            async_handle: None,
            metrics: Arc::new(LoggerMetrics::new()),
            on_overflow: None,
        }
    }

    /// Logger that queues events for a background dispatch thread
    #[must_use]
    pub fn with_async(buffer_size: usize) -> Self {
        Self::with_async_config(buffer_size, None)
    }

    #[must_use]
    pub fn with_async_config(buffer_size: usize, on_overflow: Option<OverflowCallback>) -> Self {
        let (sender, receiver) = bounded(buffer_size.max(1));
        let appenders: SharedAppenders = Arc::new(RwLock::new(Vec::new()));
        let metrics = Arc::new(LoggerMetrics::new());

        let worker_appenders = Arc::clone(&appenders);
        let worker_metrics = Arc::clone(&metrics);
        let handle = thread::spawn(move || {
            Self::run_worker(&receiver, &worker_appenders, &worker_metrics);
        });

        Self {
            min_level: Arc::new(RwLock::new(LogLevel::Info)),
            appenders,
            sender: Some(sender),
            async_handle: Some(handle),
            metrics,
            on_overflow,
        }
    }

    /// Drain the queue in batches until every sender is gone
    fn run_worker(
        receiver: &Receiver<LogEvent>,
        appenders: &SharedAppenders,
        metrics: &LoggerMetrics,
    ) {
        let mut batch = Vec::with_capacity(BATCH_SIZE);

        while let Ok(event) = receiver.recv() {
            batch.push(event);
            batch.extend(receiver.try_iter().take(BATCH_SIZE - batch.len()));

            if batch.len() < BATCH_SIZE {
                // Small batch: give producers a moment to fill it
                thread::sleep(BATCH_TIMEOUT);
                batch.extend(receiver.try_iter().take(BATCH_SIZE - batch.len()));
            }

            Self::process_batch(appenders, &batch, metrics);
            batch.clear();
        }
    }

    fn process_batch(appenders: &SharedAppenders, batch: &[LogEvent], metrics: &LoggerMetrics) {
        let mut guard = appenders.write();
        for event in batch {
            Self::dispatch(&mut guard, event, metrics);
        }

        // Flush after each batch to ensure timely writes
        for (idx, appender) in guard.iter_mut().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| appender.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender #{} flush failed: {}", idx, e);
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked during flush: {}. \
                         Other appenders continue to function.",
                        idx,
                        panic_message(panic_info.as_ref())
                    );
                }
            }
        }
    }

    /// Hand one event to every appender, isolating each from the others'
    /// errors and panics
    fn dispatch(appenders: &mut [Box<dyn Appender>], event: &LogEvent, metrics: &LoggerMetrics) {
        let mut has_error = false;

        for (idx, appender) in appenders.iter_mut().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| appender.append(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        appender.name(),
                        e
                    );
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked: {}. \
                         Other appenders continue to function.",
                        idx,
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }
    }

    pub fn add_appender(&mut self, appender: Box<dyn Appender>) {
        self.appenders.write().push(appender);
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    pub fn min_level(&self) -> LogLevel {
        *self.min_level.read()
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= *self.min_level.read()
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }
        self.submit(LogEvent::new(level, message));
    }

    /// Log a fully built event
    ///
    /// Events with neither message nor exception are discarded and counted
    /// in [`LoggerMetrics::invalid_events`].
    pub fn log_event(&self, event: LogEvent) {
        if !self.is_enabled(event.level()) {
            return;
        }
        self.submit(event);
    }

    /// Start a structured event that is logged by [`EventLogger::log`]
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_transport::prelude::*;
    ///
    /// let logger = Logger::new();
    /// logger
    ///     .event(LogLevel::Warn)
    ///     .context("billing")
    ///     .message("invoice retry")
    ///     .detail("attempt", 3)
    ///     .log();
    /// ```
    pub fn event(&self, level: LogLevel) -> EventLogger<'_> {
        EventLogger {
            logger: self,
            builder: LogEvent::builder(level),
        }
    }

    /// Log `error` as the event's exception
    pub fn log_error<E: Error + 'static>(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        error: &E,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        self.submit(LogEvent::builder(level).message(message).error(error).build());
    }

    fn submit(&self, event: LogEvent) {
        if !event.is_valid() {
            self.metrics.record_invalid();
            return;
        }

        match self.sender {
            Some(ref sender) => match sender.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => self.handle_overflow(),
                Err(TrySendError::Disconnected(_)) => {
                    // Logger is shutting down
                    self.metrics.record_dropped();
                }
            },
            None => {
                let mut appenders = self.appenders.write();
                Self::dispatch(&mut appenders, &event, &self.metrics);
            }
        }
    }

    fn handle_overflow(&self) {
        self.metrics.record_queue_full();
        let dropped_count = self.metrics.record_dropped() + 1;

        // Alert on the first drop and every thousandth after
        if dropped_count == 1 || dropped_count.is_multiple_of(1000) {
            eprintln!(
                "[LOGGER WARNING] Queue full, {} logs dropped. \
                 Consider increasing buffer size.",
                dropped_count
            );
            if let Some(ref callback) = self.on_overflow {
                callback(dropped_count);
            }
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    pub fn queue_full_count(&self) -> u64 {
        self.metrics.queue_full_events()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_transport::Logger;
    ///
    /// let logger = Logger::with_async(100);
    ///
    /// let metrics = logger.metrics();
    /// println!("Dropped: {}", metrics.dropped_count());
    /// println!("Invalid: {}", metrics.invalid_events());
    /// println!("Drop rate: {:.2}%", metrics.drop_rate());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Flush every appender; the first failure is returned after all were tried
    pub fn flush(&self) -> Result<()> {
        let mut first_error: Option<LoggerError> = None;
        for appender in self.appenders.write().iter_mut() {
            if let Err(e) = appender.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Close the queue and wait up to `timeout` for the worker to drain it
    ///
    /// Returns `true` if every queued event was processed and the final
    /// flush succeeded.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_log_transport::Logger;
    /// use std::time::Duration;
    ///
    /// let mut logger = Logger::with_async(1000);
    /// logger.info("Important message");
    ///
    /// if !logger.shutdown(Duration::from_secs(10)) {
    ///     eprintln!("Warning: Logger shutdown timed out");
    /// }
    /// ```
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        let drained = self.join_worker(timeout);

        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            return false;
        }
        drained
    }

    fn join_worker(&mut self, timeout: Duration) -> bool {
        // Closing the channel lets the worker drain and exit
        drop(self.sender.take());

        let Some(handle) = self.async_handle.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!(
                        "[LOGGER ERROR] Async worker thread panicked during shutdown: {}",
                        panic_message(e.as_ref())
                    );
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Async worker thread did not finish within {:?}. \
                     Some logs may be lost.",
                    timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.join_worker(DEFAULT_SHUTDOWN_TIMEOUT);

        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Fluent event under construction, bound to the logger that will emit it
#[must_use = "the event is only logged by calling .log()"]
pub struct EventLogger<'a> {
    logger: &'a Logger,
    builder: LogEventBuilder,
}

impl EventLogger<'_> {
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.builder = self.builder.timestamp(timestamp);
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.builder = self.builder.context(context);
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.builder = self.builder.scope(scope);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.builder = self.builder.message(message);
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.builder = self.builder.template(template);
        self
    }

    pub fn exception(mut self, exception: LogException) -> Self {
        self.builder = self.builder.exception(exception);
        self
    }

    pub fn error<E: Error + 'static>(mut self, error: &E) -> Self {
        self.builder = self.builder.error(error);
        self
    }

    pub fn detail(mut self, label: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        self.builder = self.builder.detail(label, value);
        self
    }

    /// Build the event and hand it to the logger
    pub fn log(self) {
        self.logger.log_event(self.builder.build());
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_log_transport::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .appender(ConsoleAppender::new(FormatterSettings::default()))
///     .async_mode(1000)
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} logs dropped", count);
///     }))
///     .build();
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    appenders: Vec<Box<dyn Appender>>,
    async_buffer: Option<usize>,
    on_overflow: Option<OverflowCallback>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            appenders: Vec::new(),
            async_buffer: None,
            on_overflow: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_appender(mut self, appender: Box<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Enable async mode with specified buffer size
    ///
    /// If not called, the logger will use synchronous mode.
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, buffer_size: usize) -> Self {
        self.async_buffer = Some(buffer_size);
        self
    }

    /// Called when events are dropped because the async queue is full
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    pub fn build(self) -> Logger {
        let mut logger = match self.async_buffer {
            Some(size) => Logger::with_async_config(size, self.on_overflow),
            None => Logger::new(),
        };

        logger.set_min_level(self.min_level);
        for appender in self.appenders {
            logger.add_appender(appender);
        }
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::fmt;

    #[derive(Clone, Default)]
    struct Collecting(Arc<Mutex<Vec<LogEvent>>>);

    impl Appender for Collecting {
        fn append(&mut self, event: &LogEvent) -> Result<()> {
            self.0.lock().push(event.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "collecting"
        }
    }

    struct Failing;

    impl Appender for Failing {
        fn append(&mut self, _event: &LogEvent) -> Result<()> {
            Err(LoggerError::writer("disk on fire"))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Panicking;

    impl Appender for Panicking {
        fn append(&mut self, _event: &LogEvent) -> Result<()> {
            panic!("appender bug");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[derive(Debug)]
    struct Timeout;

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "upstream timed out")
        }
    }

    impl Error for Timeout {}

    #[test]
    fn test_min_level_filters() {
        let sink = Collecting::default();
        let logger = Logger::builder()
            .min_level(LogLevel::Warn)
            .appender(sink.clone())
            .build();

        logger.info("ignored");
        logger.warn("kept");
        logger.fatal("kept too");

        let events = sink.0.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message(), "kept");
        assert_eq!(logger.metrics().total_logged(), 2);
    }

    #[test]
    fn test_invalid_events_are_discarded() {
        let sink = Collecting::default();
        let logger = Logger::builder().appender(sink.clone()).build();

        logger.info("   ");
        logger.log_event(LogEvent::builder(LogLevel::Error).context("db").build());

        assert!(sink.0.lock().is_empty());
        assert_eq!(logger.metrics().invalid_events(), 2);
        assert_eq!(logger.metrics().total_logged(), 0);
    }

    #[test]
    fn test_event_builder_and_error() {
        let sink = Collecting::default();
        let logger = Logger::builder().appender(sink.clone()).build();

        logger
            .event(LogLevel::Warn)
            .context(" billing ")
            .message("invoice retry")
            .detail("attempt", 3)
            .log();
        logger.log_error(LogLevel::Error, "", &Timeout);

        let events = sink.0.lock();
        assert_eq!(events[0].context(), "billing");
        assert_eq!(events[0].details()[0].to_string(), "attempt=3");
        assert_eq!(events[1].message(), "upstream timed out");
        assert_eq!(events[1].exception().map(|e| e.type_name()), Some("Timeout"));
    }

    #[test]
    fn test_appender_isolation() {
        let sink = Collecting::default();
        let logger = Logger::builder()
            .appender(Failing)
            .appender(Panicking)
            .appender(sink.clone())
            .build();

        logger.error("still delivered");

        assert_eq!(sink.0.lock().len(), 1);
        assert_eq!(logger.dropped_count(), 1);
    }

    #[test]
    fn test_async_drains_on_shutdown() {
        let sink = Collecting::default();
        let mut logger = Logger::builder()
            .async_mode(1000)
            .appender(sink.clone())
            .build();

        for i in 0..200 {
            logger.info(format!("message {}", i));
        }

        assert!(logger.shutdown(Duration::from_secs(5)));
        assert_eq!(sink.0.lock().len(), 200);
        assert_eq!(logger.metrics().total_logged(), 200);
    }

    #[test]
    fn test_overflow_is_counted() {
        use std::sync::atomic::{AtomicU64, Ordering};

        let alerts = Arc::new(AtomicU64::new(0));
        let alerts_clone = Arc::clone(&alerts);
        let logger = Logger::builder()
            .async_mode(1)
            .appender(Collecting::default())
            .on_overflow(Arc::new(move |_| {
                alerts_clone.fetch_add(1, Ordering::Relaxed);
            }))
            .build();

        for i in 0..500 {
            logger.info(format!("burst {}", i));
        }

        let metrics = logger.metrics();
        assert_eq!(metrics.queue_full_events(), metrics.dropped_count());
        if metrics.dropped_count() > 0 {
            assert!(alerts.load(Ordering::Relaxed) >= 1);
        }
    }
}
