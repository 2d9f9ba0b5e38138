//! # sello-db: Database Layer for Sello
//!
//! This crate provides database access for the Sello storefront backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sello Data Flow                                 │
//! │                                                                         │
//! │  Engine operation (create_order, adjust_stock, ...)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     sello-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (variant.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  movement.rs, │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  order.rs...) │    │ 001_init.sql │  │   │
//! │  │   │ Transactions  │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode, foreign keys ON)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration, transactions
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository modules (variant, movement, order, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sello_db::{Database, DbConfig};
//! use sello_db::repository::VariantRepository;
//!
//! let db = Database::new(DbConfig::new("path/to/sello.db")).await?;
//!
//! // Repositories run on a connection: pool-acquired for reads,
//! // transaction-owned for engine operations.
//! let mut conn = db.acquire().await?;
//! let variant = VariantRepository::get_by_id(&mut conn, "some-id").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{
    ColorRepository, MovementFilter, MovementRepository, OrderRepository, PackRepository,
    ProductTypeRepository, VariantRepository,
};
