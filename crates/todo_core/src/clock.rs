//! Time source for services.
//!
//! # Responsibility
//! - Supply "today" (server-local calendar day) for window filters.
//! - Supply creation timestamps in epoch milliseconds.
//!
//! # Invariants
//! - `SystemClock` never panics; when the local UTC offset cannot be
//!   determined it falls back to UTC.
//! - The local offset is read at most once per process and then reused.

use log::warn;
use once_cell::sync::OnceCell;
use time::{Date, OffsetDateTime, UtcOffset};

static LOCAL_OFFSET: OnceCell<UtcOffset> = OnceCell::new();
static LOCAL_OFFSET_WARNED: OnceCell<()> = OnceCell::new();

/// Source of the current date and time.
pub trait Clock {
    /// Current calendar day used for time-window evaluation.
    fn today(&self) -> Date;
    /// Current instant in Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall clock in the server's local timezone.
///
/// On Unix, `time` refuses to read the local offset once the process has
/// more than one thread. Call [`SystemClock::capture_local_offset`] at
/// startup, before spawning threads; otherwise a multi-threaded process
/// (including the test harness) evaluates "today" in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Reads and caches the local UTC offset. Returns `None` when it cannot
    /// be determined, in which case `today()` uses UTC.
    pub fn capture_local_offset() -> Option<UtcOffset> {
        if let Some(offset) = LOCAL_OFFSET.get() {
            return Some(*offset);
        }
        match UtcOffset::current_local_offset() {
            Ok(offset) => Some(*LOCAL_OFFSET.get_or_init(|| offset)),
            Err(err) => {
                if LOCAL_OFFSET_WARNED.set(()).is_ok() {
                    warn!(
                        "event=clock_local_offset module=clock status=fallback fallback=utc error={}",
                        err
                    );
                }
                None
            }
        }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> Date {
        let offset = Self::capture_local_offset().unwrap_or(UtcOffset::UTC);
        OffsetDateTime::now_utc().to_offset(offset).date()
    }

    fn now_ms(&self) -> i64 {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        i64::try_from(nanos).unwrap_or(i64::MAX)
    }
}

/// Clock frozen at a given day and instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub today: Date,
    pub now_ms: i64,
}

impl FixedClock {
    pub fn new(today: Date, now_ms: i64) -> Self {
        Self { today, now_ms }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.today
    }

    fn now_ms(&self) -> i64 {
        self.now_ms
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> Date {
        (**self).today()
    }

    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}
