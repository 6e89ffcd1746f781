//! # Repository Module
//!
//! Database repository implementations for CafePOS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  ops::checkout                                                          │
//! │       │                                                                 │
//! │       │  db.orders().get_tx(&mut tx, 12)                                │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── get(&self, id)              plain pool queries                    │
//! │  └── get_tx(&self, conn, id)     *_tx variants compose inside one      │
//! │       │                          transaction owned by the operation    │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Operations own the transaction boundary, repositories never commit  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`table::TableRepository`] - Floor plan CRUD and occupancy
//! - [`catalog::CatalogRepository`] - Categories, products, station map
//! - [`discount::DiscountRepository`] - Discount rows
//! - [`order::OrderRepository`] - Orders and order items
//! - [`payment::PaymentRepository`] - Payments and the payment/order join
//! - [`business_day::BusinessDayRepository`] - The accounting day
//! - [`printer::PrinterRepository`] - Station printer registry

pub mod business_day;
pub mod catalog;
pub mod discount;
pub mod order;
pub mod payment;
pub mod printer;
pub mod table;
