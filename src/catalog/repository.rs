//! Storage seam for the catalog.
//!
//! Controllers only ever talk to `dyn CatalogRepository`, so a SQL backend
//! can replace [`InMemoryCatalog`](super::memory::InMemoryCatalog) without
//! touching request handling.

use async_trait::async_trait;

use super::error::CatalogError;
use super::models::{NewRating, NewReview, NewSong, NewUser, RankedSong, Rating, Review, Song, User};

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fails with [`CatalogError::DuplicateEmail`] when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, CatalogError>;

    /// Email comparison is case-insensitive.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CatalogError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, CatalogError>;

    async fn create_song(&self, song: NewSong) -> Result<Song, CatalogError>;

    async fn find_song(&self, id: i64) -> Result<Option<Song>, CatalogError>;

    /// First song, in title order, whose title contains `query` ignoring case.
    async fn search_songs(&self, query: &str) -> Result<Option<Song>, CatalogError>;

    /// Rated songs ordered by mean rating, best first.
    async fn top_songs(&self, limit: usize) -> Result<Vec<RankedSong>, CatalogError>;

    /// Fails with [`CatalogError::NotFound`] when the song does not exist.
    async fn create_rating(&self, rating: NewRating) -> Result<Rating, CatalogError>;

    async fn ratings_for_song(&self, song_id: i64) -> Result<Vec<Rating>, CatalogError>;

    /// Fails with [`CatalogError::NotFound`] when the song does not exist.
    async fn create_review(&self, review: NewReview) -> Result<Review, CatalogError>;

    async fn find_review(&self, id: i64) -> Result<Option<Review>, CatalogError>;

    /// Fails with [`CatalogError::NotFound`] when the review does not exist.
    async fn delete_review(&self, id: i64) -> Result<(), CatalogError>;

    async fn reviews_for_song(&self, song_id: i64) -> Result<Vec<Review>, CatalogError>;
}
