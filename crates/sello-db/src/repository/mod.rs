//! # Repositories
//!
//! One module per entity. Repository functions take a
//! `&mut SqliteConnection` instead of holding the pool: the engine opens
//! one transaction per logical operation and threads its connection through
//! every repository call, so all writes in the operation share one commit
//! point. Non-transactional reads pass a connection acquired from the pool.

pub mod color;
pub mod movement;
pub mod order;
pub mod pack;
pub mod product_type;
pub mod variant;

pub use color::ColorRepository;
pub use movement::{MovementFilter, MovementRepository};
pub use order::OrderRepository;
pub use pack::PackRepository;
pub use product_type::ProductTypeRepository;
pub use variant::VariantRepository;
