//! Song catalog: accounts, songs, ratings and reviews.
//!
//! # Data Flow
//! ```text
//! controllers (one per resource, registered into routing::Router)
//!     → credentials.rs (Argon2id hashing, login checks)
//!     → repository.rs (CatalogRepository trait)
//!     → memory.rs (InMemoryCatalog)
//! ```
//!
//! # Design Decisions
//! - Storage sits behind an async trait so controllers never see the backend
//! - Failures are `CatalogError` values; controllers map them to status codes

pub mod controllers;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

pub use controllers::build_routes;
pub use credentials::{Argon2Hasher, Credentials, PasswordHasher};
pub use error::CatalogError;
pub use memory::InMemoryCatalog;
pub use models::{NewSong, RankedSong, Rating, Review, Song, User};
pub use repository::CatalogRepository;
