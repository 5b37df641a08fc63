//! Labels used to name content directories and staging symlinks.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const LABEL_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Source of the label appended to each cycle's content directory and staging symlink.
///
/// Labels only need to be unique per cycle and sort in creation order; they carry no
/// other meaning. Tests inject fixed labels to get predictable paths.
pub trait Clock: Send + Sync {
    /// Returns the label for the current cycle.
    fn now(&self) -> String;
}

/// Wall-clock UTC time with second precision, e.g. `2024-05-01T12:00:00Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        format_label(OffsetDateTime::now_utc())
    }
}

fn format_label(at: OffsetDateTime) -> String {
    // The format description only uses components every `OffsetDateTime` has.
    at.format(LABEL_FORMAT)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

impl<F> Clock for F
where
    F: Fn() -> String + Send + Sync,
{
    fn now(&self) -> String {
        self()
    }
}
