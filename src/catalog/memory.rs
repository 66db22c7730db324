//! In-process catalog storage.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::CatalogError;
use super::models::{
    average_rating, NewRating, NewReview, NewSong, NewUser, RankedSong, Rating, Review, Song, User,
};
use super::repository::CatalogRepository;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    songs: BTreeMap<i64, Song>,
    ratings: BTreeMap<i64, Rating>,
    reviews: BTreeMap<i64, Review>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// [`CatalogRepository`] backed by ordered maps behind one lock.
///
/// Identifiers start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    tables: RwLock<Tables>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog pre-filled with a handful of songs.
    pub async fn seeded() -> Result<Self, CatalogError> {
        let catalog = Self::new();
        for song in seed_songs() {
            catalog.create_song(song).await?;
        }
        Ok(catalog)
    }
}

fn seed_songs() -> Vec<NewSong> {
    vec![
        NewSong::new("Bohemian Rhapsody", "Queen", 1975),
        NewSong::new("Hotel California", "Eagles", 1976),
        NewSong::new("Heroes", "David Bowie", 1977),
        NewSong::new("Billie Jean", "Michael Jackson", 1982),
        NewSong::new("Smells Like Teen Spirit", "Nirvana", 1991),
        NewSong::new("Paranoid Android", "Radiohead", 1997),
    ]
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn create_user(&self, user: NewUser) -> Result<User, CatalogError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(CatalogError::DuplicateEmail);
        }
        let id = tables.next_id();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CatalogError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, CatalogError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_song(&self, song: NewSong) -> Result<Song, CatalogError> {
        if song.title.trim().is_empty() {
            return Err(CatalogError::InvalidInput("song title is empty".into()));
        }
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let song = Song {
            id,
            title: song.title,
            artist: song.artist,
            year: song.year,
        };
        tables.songs.insert(id, song.clone());
        Ok(song)
    }

    async fn find_song(&self, id: i64) -> Result<Option<Song>, CatalogError> {
        Ok(self.tables.read().await.songs.get(&id).cloned())
    }

    async fn search_songs(&self, query: &str) -> Result<Option<Song>, CatalogError> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .songs
            .values()
            .filter(|s| s.title.to_lowercase().contains(&needle))
            .min_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn top_songs(&self, limit: usize) -> Result<Vec<RankedSong>, CatalogError> {
        let tables = self.tables.read().await;
        let mut ranked: Vec<RankedSong> = tables
            .songs
            .values()
            .filter_map(|song| {
                let ratings: Vec<Rating> = tables
                    .ratings
                    .values()
                    .filter(|r| r.song_id == song.id)
                    .cloned()
                    .collect();
                (!ratings.is_empty()).then(|| RankedSong {
                    song: song.clone(),
                    average_rating: average_rating(&ratings),
                    rating_count: ratings.len(),
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(Ordering::Equal)
                .then(a.song.id.cmp(&b.song.id))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn create_rating(&self, rating: NewRating) -> Result<Rating, CatalogError> {
        let mut tables = self.tables.write().await;
        if !tables.songs.contains_key(&rating.song_id) {
            return Err(CatalogError::NotFound("song"));
        }
        let id = tables.next_id();
        let rating = Rating {
            id,
            user_id: rating.user_id,
            song_id: rating.song_id,
            rating: rating.rating,
        };
        tables.ratings.insert(id, rating.clone());
        Ok(rating)
    }

    async fn ratings_for_song(&self, song_id: i64) -> Result<Vec<Rating>, CatalogError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ratings
            .values()
            .filter(|r| r.song_id == song_id)
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, CatalogError> {
        let mut tables = self.tables.write().await;
        if !tables.songs.contains_key(&review.song_id) {
            return Err(CatalogError::NotFound("song"));
        }
        let id = tables.next_id();
        let review = Review {
            id,
            user_id: review.user_id,
            song_id: review.song_id,
            content: review.content,
        };
        tables.reviews.insert(id, review.clone());
        Ok(review)
    }

    async fn find_review(&self, id: i64) -> Result<Option<Review>, CatalogError> {
        Ok(self.tables.read().await.reviews.get(&id).cloned())
    }

    async fn delete_review(&self, id: i64) -> Result<(), CatalogError> {
        self.tables
            .write()
            .await
            .reviews
            .remove(&id)
            .map(|_| ())
            .ok_or(CatalogError::NotFound("review"))
    }

    async fn reviews_for_song(&self, song_id: i64) -> Result<Vec<Review>, CatalogError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .values()
            .filter(|r| r.song_id == song_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: "tester".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let catalog = InMemoryCatalog::new();
        let user = catalog.create_user(new_user("a@example.com")).await.unwrap();
        assert_eq!(user.id, 1);

        let err = catalog.create_user(new_user("A@Example.com")).await.unwrap_err();
        assert_eq!(err, CatalogError::DuplicateEmail);

        let found = catalog.find_user_by_email("a@EXAMPLE.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_ordered() {
        let catalog = InMemoryCatalog::new();
        catalog.create_song(NewSong::new("Purple Rain", "Prince", 1984)).await.unwrap();
        catalog.create_song(NewSong::new("Kiss", "Prince", 1986)).await.unwrap();
        catalog.create_song(NewSong::new("Purple Haze", "Jimi Hendrix", 1967)).await.unwrap();

        let hit = catalog.search_songs("PURPLE").await.unwrap().unwrap();
        assert_eq!(hit.title, "Purple Haze");
        assert!(catalog.search_songs("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_top_songs_ranks_by_average() {
        let catalog = InMemoryCatalog::new();
        let a = catalog.create_song(NewSong::new("A", "x", 2000)).await.unwrap();
        let b = catalog.create_song(NewSong::new("B", "x", 2000)).await.unwrap();
        catalog.create_song(NewSong::new("Unrated", "x", 2000)).await.unwrap();

        for (song_id, rating) in [(a.id, 3), (a.id, 4), (b.id, 5)] {
            catalog
                .create_rating(NewRating { user_id: 1, song_id, rating })
                .await
                .unwrap();
        }

        let top = catalog.top_songs(10).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].song.id, b.id);
        assert_eq!(top[1].average_rating, 3.5);
        assert_eq!(catalog.top_songs(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rating_and_review_need_existing_song() {
        let catalog = InMemoryCatalog::new();
        let err = catalog
            .create_rating(NewRating { user_id: 1, song_id: 99, rating: 4 })
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::NotFound("song"));

        let err = catalog
            .create_review(NewReview { user_id: 1, song_id: 99, content: "hi".into() })
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::NotFound("song"));
    }

    #[tokio::test]
    async fn test_review_lifecycle() {
        let catalog = InMemoryCatalog::new();
        let song = catalog.create_song(NewSong::new("Song", "x", 2000)).await.unwrap();
        let review = catalog
            .create_review(NewReview { user_id: 7, song_id: song.id, content: "Great song!".into() })
            .await
            .unwrap();

        assert_eq!(catalog.reviews_for_song(song.id).await.unwrap().len(), 1);
        assert_eq!(catalog.find_review(review.id).await.unwrap(), Some(review.clone()));

        catalog.delete_review(review.id).await.unwrap();
        assert!(catalog.reviews_for_song(song.id).await.unwrap().is_empty());
        assert_eq!(
            catalog.delete_review(review.id).await.unwrap_err(),
            CatalogError::NotFound("review")
        );
    }

    #[tokio::test]
    async fn test_seeded_catalog() {
        let catalog = InMemoryCatalog::seeded().await.unwrap();
        assert!(catalog.find_song(1).await.unwrap().is_some());
        assert!(catalog.search_songs("heroes").await.unwrap().is_some());
    }
}
