use std::io::{self, Write};

/// Something that can write its current snapshot in exposition format.
///
/// The metrics handler holds one writer per enabled resource and calls them
/// in order on every scrape.
pub trait MetricsWriter: Send + Sync {
    fn write_all(&self, w: &mut dyn Write) -> io::Result<()>;
}
