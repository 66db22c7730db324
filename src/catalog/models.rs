//! Catalog records.
//!
//! Persisted records carry an `id`; the `New*` forms are what callers hand
//! to the repository before one is assigned.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub year: i32,
}

impl NewSong {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            year,
        }
    }
}

/// A song with its mean rating, as listed on the home page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedSong {
    #[serde(flatten)]
    pub song: Song,
    pub average_rating: f64,
    pub rating_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub song_id: i64,
    pub rating: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRating {
    pub user_id: i64,
    pub song_id: i64,
    pub rating: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub song_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub user_id: i64,
    pub song_id: i64,
    pub content: String,
}

/// Lowest and highest accepted star rating.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Mean of a set of ratings, `0.0` when there are none.
pub fn average_rating(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let total: u32 = ratings.iter().map(|r| u32::from(r.rating)).sum();
    f64::from(total) / ratings.len() as f64
}
