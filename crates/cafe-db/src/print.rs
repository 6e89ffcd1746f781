//! # Print Dispatch
//!
//! Trait seams between the billing flow and physical peripherals.
//!
//! ## Failure Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Printing is fire-and-forget: a dead kitchen printer must never roll   │
//! │  back a payment. Operations commit their transaction FIRST, then       │
//! │  dispatch documents; a sink failure is logged as a warning and the     │
//! │  operation still succeeds.                                             │
//! │                                                                         │
//! │  ops::checkout                                                          │
//! │     ├── tx.commit()              money is safe                         │
//! │     ├── pdf.render(invoice, ..)  idempotent per invoice number         │
//! │     └── sink.print(Cashier, ..)  warn! on failure, never Err           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use cafe_core::Station;

/// Errors a peripheral can report.
#[derive(Debug, Error)]
pub enum PrintError {
    /// No printer is reachable for the station.
    #[error("Printer unavailable for {station}: {reason}")]
    Unavailable { station: String, reason: String },

    /// The document was rejected or the write failed mid-stream.
    #[error("Print failed: {0}")]
    Io(String),
}

// =============================================================================
// Trait Seams
// =============================================================================

/// Sends a rendered document to a station's printer.
///
/// Implementations are free to spool, batch or drop; callers treat every
/// failure as a warning, never as an operation error.
pub trait PrintSink: Send + Sync {
    fn print(&self, station: Station, document: &str) -> Result<(), PrintError>;
}

/// Persists a rendered invoice as a PDF (or any archival format).
///
/// `invoice_key` is the payment id; rendering the same key twice must be
/// harmless so a re-print never duplicates the archive.
pub trait PdfRenderer: Send + Sync {
    fn render(&self, invoice_key: &str, document: &str) -> Result<(), PrintError>;
}

// =============================================================================
// Default Implementations
// =============================================================================

/// A sink that writes documents to the log instead of a printer.
///
/// The default for tests and headless deployments.
#[derive(Debug, Clone, Default)]
pub struct LogPrintSink;

impl PrintSink for LogPrintSink {
    fn print(&self, station: Station, document: &str) -> Result<(), PrintError> {
        info!(station = station.as_str(), "Dispatching document to log sink");
        debug!(document, "Document body");
        Ok(())
    }
}

/// A renderer that records the request and discards the document.
#[derive(Debug, Clone, Default)]
pub struct NoopPdfRenderer;

impl PdfRenderer for NoopPdfRenderer {
    fn render(&self, invoice_key: &str, _document: &str) -> Result<(), PrintError> {
        debug!(invoice_key, "Skipping PDF render (noop renderer)");
        Ok(())
    }
}

// =============================================================================
// Peripherals
// =============================================================================

/// The peripheral bundle operations dispatch through.
#[derive(Clone)]
pub struct Peripherals {
    pub sink: Arc<dyn PrintSink>,
    pub pdf: Arc<dyn PdfRenderer>,
}

impl Peripherals {
    /// Peripherals backed by real implementations.
    pub fn new(sink: Arc<dyn PrintSink>, pdf: Arc<dyn PdfRenderer>) -> Self {
        Peripherals { sink, pdf }
    }

    /// Log-only peripherals for tests and headless hosts.
    pub fn log_only() -> Self {
        Peripherals {
            sink: Arc::new(LogPrintSink),
            pdf: Arc::new(NoopPdfRenderer),
        }
    }

    /// Dispatches a document, downgrading failure to a warning.
    pub fn dispatch(&self, station: Station, document: &str) {
        if let Err(err) = self.sink.print(station, document) {
            warn!(station = station.as_str(), error = %err, "Print dispatch failed");
        }
    }

    /// Archives an invoice, downgrading failure to a warning.
    pub fn archive_invoice(&self, invoice_key: &str, document: &str) {
        if let Err(err) = self.pdf.render(invoice_key, document) {
            warn!(invoice_key, error = %err, "Invoice archive failed");
        }
    }
}

impl std::fmt::Debug for Peripherals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peripherals").finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sink that records what was printed, for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        pub printed: Mutex<Vec<(Station, String)>>,
    }

    impl PrintSink for RecordingSink {
        fn print(&self, station: Station, document: &str) -> Result<(), PrintError> {
            self.printed
                .lock()
                .unwrap()
                .push((station, document.to_string()));
            Ok(())
        }
    }

    struct FailingSink;

    impl PrintSink for FailingSink {
        fn print(&self, station: Station, _document: &str) -> Result<(), PrintError> {
            Err(PrintError::Unavailable {
                station: station.as_str().to_string(),
                reason: "cable unplugged".to_string(),
            })
        }
    }

    #[test]
    fn test_dispatch_records_document() {
        let sink = Arc::new(RecordingSink::default());
        let peripherals = Peripherals::new(sink.clone(), Arc::new(NoopPdfRenderer));

        peripherals.dispatch(Station::Kitchen, "ticket body");

        let printed = sink.printed.lock().unwrap();
        assert_eq!(printed.len(), 1);
        assert_eq!(printed[0].0, Station::Kitchen);
    }

    #[test]
    fn test_failing_sink_does_not_panic() {
        let peripherals = Peripherals::new(Arc::new(FailingSink), Arc::new(NoopPdfRenderer));
        peripherals.dispatch(Station::Barista, "ticket body");
    }
}
