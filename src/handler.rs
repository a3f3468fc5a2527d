//! Renders every store into one exposition document.

use std::io::{self, Write};
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use tokio::sync::RwLock;

use crate::store::MetricsWriter;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// A rendered scrape body.
#[derive(Debug)]
pub struct Rendered {
    pub body: Vec<u8>,
    /// Whether `body` is gzip compressed.
    pub gzip: bool,
}

pub struct MetricsHandler {
    writers: RwLock<Vec<Arc<dyn MetricsWriter>>>,
    enable_gzip: bool,
}

impl MetricsHandler {
    pub fn new(writers: Vec<Arc<dyn MetricsWriter>>, enable_gzip: bool) -> Self {
        MetricsHandler {
            writers: RwLock::new(writers),
            enable_gzip,
        }
    }

    /// Writes every store in order, compressed when gzip is enabled and the
    /// client's `Accept-Encoding` allows it.
    pub async fn render(&self, accept_encoding: Option<&str>) -> io::Result<Rendered> {
        let writers = self.writers.read().await;
        let gzip = self.enable_gzip && accept_encoding.is_some_and(accepts_gzip);

        if gzip {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            write_all(&writers, &mut encoder)?;
            return Ok(Rendered {
                body: encoder.finish()?,
                gzip,
            });
        }

        let mut body = Vec::new();
        write_all(&writers, &mut body)?;
        Ok(Rendered { body, gzip })
    }
}

fn write_all(writers: &[Arc<dyn MetricsWriter>], w: &mut dyn Write) -> io::Result<()> {
    for writer in writers {
        writer.write_all(w)?;
    }
    Ok(())
}

/// True if any comma separated coding is `gzip`, ignoring case and
/// parameters such as `;q=0.5`.
pub fn accepts_gzip(accept_encoding: &str) -> bool {
    accept_encoding.split(',').any(|part| {
        part.split(';')
            .next()
            .is_some_and(|coding| coding.trim().eq_ignore_ascii_case("gzip"))
    })
}
