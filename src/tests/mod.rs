use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};


thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Forwards to env_logger and keeps this crate's records for the calling
/// test thread.
struct CaptureLogger {
    inner: env_logger::Logger,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("fanwatch") || self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.target().starts_with("fanwatch") {
            CAPTURED.with(|c| {
                c.borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

pub fn init_logger() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let inner = env_logger::builder()
            .filter_level(LevelFilter::Error)
            .filter(Some("fanwatch"), LevelFilter::Trace)
            .is_test(true)
            .build();
        let logger: &'static CaptureLogger = Box::leak(Box::new(CaptureLogger { inner }));
        if log::set_logger(logger).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
}

/// Drain the records logged so far on this thread.
pub fn take_logs() -> Vec<(Level, String)> {
    CAPTURED.with(|c| c.borrow_mut().drain(..).collect())
}
