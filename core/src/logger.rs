// Global logging for the vtoy module
//
// `log` records are formatted on the stack and kept in a small ring until the
// console is ready to take them. The debug flag decides how chatty we are:
// warnings and errors always land, debug output only when it is set.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;

use crate::fmt::FmtBuf;

const MAX_LOG_ENTRIES: usize = 64;

/// Longest log line kept; longer lines are cut.
pub const LOG_LINE_CAPACITY: usize = 128;

pub type LogLine = FmtBuf<LOG_LINE_CAPACITY>;

const EMPTY_LINE: LogLine = FmtBuf::new();

static DEBUG: AtomicBool = AtomicBool::new(false);
static DROPPED: AtomicUsize = AtomicUsize::new(0);
static RING: Mutex<LogRing> = Mutex::new(LogRing::new());
static LOGGER: BootLogger = BootLogger;

// ═══════════════════════════════════════════════════════════════════════════
// RING
// ═══════════════════════════════════════════════════════════════════════════

/// Bounded line store, oldest entry overwritten first.
pub struct LogRing {
    lines: [LogLine; MAX_LOG_ENTRIES],
    next: usize,
    count: usize,
}

impl LogRing {
    pub const fn new() -> Self {
        Self {
            lines: [EMPTY_LINE; MAX_LOG_ENTRIES],
            next: 0,
            count: 0,
        }
    }

    /// Store a line; returns `true` if an older line was overwritten.
    pub fn push(&mut self, line: LogLine) -> bool {
        let overwrote = self.count == MAX_LOG_ENTRIES;
        self.lines[self.next] = line;
        self.next = (self.next + 1) % MAX_LOG_ENTRIES;
        if !overwrote {
            self.count += 1;
        }
        overwrote
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Take the oldest line out.
    pub fn pop_front(&mut self) -> Option<LogLine> {
        if self.count == 0 {
            return None;
        }
        let start = (self.next + MAX_LOG_ENTRIES - self.count) % MAX_LOG_ENTRIES;
        self.count -= 1;
        Some(self.lines[start].clone())
    }

    /// Visit lines oldest first.
    pub fn for_each<F: FnMut(&str)>(&self, mut f: F) {
        let start = (self.next + MAX_LOG_ENTRIES - self.count) % MAX_LOG_ENTRIES;
        for i in 0..self.count {
            f(self.lines[(start + i) % MAX_LOG_ENTRIES].as_str());
        }
    }

    pub fn clear(&mut self) {
        self.next = 0;
        self.count = 0;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LOGGER
// ═══════════════════════════════════════════════════════════════════════════

/// `log::Log` backend feeding the global ring.
pub struct BootLogger;

impl Log for BootLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn || is_debug()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record);
        if RING.lock().push(line) {
            DROPPED.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn flush(&self) {}
}

/// Render a record as `[VTOY] LEVEL message`.
pub fn format_record(record: &Record) -> LogLine {
    let mut line = LogLine::new();
    let _ = write!(line, "[VTOY] {} {}", record.level(), record.args());
    line
}

/// Install the logger and apply the debug flag.
///
/// Only the first call installs; later calls just move the level.
pub fn init(debug: bool) {
    let _ = log::set_logger(&LOGGER);
    set_debug(debug);
}

pub fn set_debug(on: bool) {
    DEBUG.store(on, Ordering::SeqCst);
    log::set_max_level(if on { LevelFilter::Debug } else { LevelFilter::Warn });
}

#[inline]
pub fn is_debug() -> bool {
    DEBUG.load(Ordering::SeqCst)
}

pub fn log_count() -> usize {
    RING.lock().len()
}

/// Lines lost to ring overflow since boot.
pub fn dropped_count() -> usize {
    DROPPED.load(Ordering::Relaxed)
}

/// Write the lines pending at the time of the call to `out`, oldest first.
///
/// The ring lock is not held while `out` is written. Lines the console logs
/// itself stay queued for the next drain. A failed write stops the drain and
/// loses the line being written.
pub fn drain_to<W: Write + ?Sized>(out: &mut W) -> fmt::Result {
    let pending = log_count();
    for _ in 0..pending {
        let Some(line) = RING.lock().pop_front() else {
            break;
        };
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// `log::debug!` under the module's target.
#[macro_export]
macro_rules! vtoy_dbg {
    ($($arg:tt)*) => {
        $crate::__log::debug!(target: "vtoy", $($arg)*)
    };
}
