//! # cafe-db: Persistence and Operations for CafePOS
//!
//! This crate provides database access and the use-case surface for the
//! CafePOS billing system. It uses SQLite for local storage with sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CafePOS Data Flow                                 │
//! │                                                                         │
//! │  Host (terminal UI, HTTP layer, ...)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cafe-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐   ┌──────────────┐   ┌───────────────────┐   │   │
//! │  │   │    ops     │──►│ repositories │──►│     Database      │   │   │
//! │  │   │ use cases, │   │ SQL lives    │   │ pool + embedded   │   │   │
//! │  │   │ one tx each│   │ here only    │   │ migrations        │   │   │
//! │  │   └─────┬──────┘   └──────────────┘   └───────────────────┘   │   │
//! │  │         │                                                      │   │
//! │  │         └──► print (PrintSink / PdfRenderer seams)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cafe-core: money, totals, receipts, reports (pure, no I/O)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - DbError and the OpsError surface
//! - [`repository`] - Repository implementations
//! - [`print`] - Printer and invoice archive seams
//! - [`ops`] - Order, billing, day and report operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cafe_db::{Database, DbConfig, Peripherals};
//! use cafe_db::ops::{orders, billing};
//! use cafe_core::PaymentMethod;
//!
//! let db = Database::new(DbConfig::new("path/to/cafe.db")).await?;
//! let peripherals = Peripherals::log_only();
//!
//! let order = orders::create_order(&db, &peripherals, Some(&table_id), 2, &lines, None).await?;
//! let (payment, invoice) =
//!     billing::checkout(&db, &peripherals, order.id, PaymentMethod::Cash, 0, 0).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod ops;
pub mod pool;
pub mod print;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, OpsError, OpsResult};
pub use pool::{Database, DbConfig};
pub use print::{LogPrintSink, NoopPdfRenderer, PdfRenderer, Peripherals, PrintError, PrintSink};

// Repository re-exports for convenience
pub use repository::business_day::BusinessDayRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::discount::DiscountRepository;
pub use repository::order::OrderRepository;
pub use repository::payment::PaymentRepository;
pub use repository::printer::PrinterRepository;
pub use repository::table::TableRepository;
