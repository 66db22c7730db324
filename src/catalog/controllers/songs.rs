use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use super::{current_user_id, finish, internal_error, positive_id};
use crate::catalog::error::CatalogError;
use crate::catalog::models::{average_rating, NewRating, RATING_RANGE};
use crate::catalog::repository::CatalogRepository;
use crate::http::{with_state, Handler, Reply, Request, Response};
use crate::routing::{RouteError, Router};

/// Songs shown on the home page.
const TOP_SONGS: usize = 10;

/// Home page, song details, search and ratings.
pub struct SongController {
    repo: Arc<dyn CatalogRepository>,
}

impl SongController {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    pub fn register_routes(self: &Arc<Self>, router: &mut Router<Handler>) -> Result<(), RouteError> {
        router.get("/", with_state(Arc::clone(self), Self::home))?;
        router.get("/songs/:id", with_state(Arc::clone(self), Self::show_song))?;
        router.post("/songs/search", with_state(Arc::clone(self), Self::search))?;
        router.post("/songs/:id/rate", with_state(Arc::clone(self), Self::rate))?;
        Ok(())
    }

    async fn home(self: Arc<Self>, req: Request, res: Response) -> Response {
        let top = match self.repo.top_songs(TOP_SONGS).await {
            Ok(top) => top,
            Err(e) => return internal_error(res, e),
        };
        finish(
            res,
            Reply::new(StatusCode::OK, "Top songs retrieved")
                .template("HomeView")
                .payload(json!({
                    "title": "Top Song List",
                    "topSongs": top,
                    "loggedIn": current_user_id(&req).is_some(),
                })),
        )
    }

    async fn show_song(self: Arc<Self>, req: Request, res: Response) -> Response {
        let Some(song_id) = positive_id(&req) else {
            return finish(res, Reply::new(StatusCode::BAD_REQUEST, "Invalid song ID"));
        };

        let song = match self.repo.find_song(song_id).await {
            Ok(Some(song)) => song,
            Ok(None) => return finish(res, Reply::new(StatusCode::NOT_FOUND, "Song not found")),
            Err(e) => return internal_error(res, e),
        };
        let ratings = match self.repo.ratings_for_song(song_id).await {
            Ok(ratings) => ratings,
            Err(e) => return internal_error(res, e),
        };

        let avg_rating = format!("{:.2}", average_rating(&ratings));
        finish(
            res,
            Reply::new(StatusCode::OK, "Song Details")
                .template("SongDetailView")
                .payload(json!({
                    "song": song,
                    "avgRating": avg_rating,
                    "ratings": ratings,
                    "loggedIn": current_user_id(&req).is_some(),
                })),
        )
    }

    async fn search(self: Arc<Self>, req: Request, res: Response) -> Response {
        let Some(query) = req.field("query") else {
            return finish(res, Reply::new(StatusCode::BAD_REQUEST, "Query parameter is missing"));
        };

        match self.repo.search_songs(query).await {
            Ok(Some(song)) => finish(
                res,
                Reply::new(StatusCode::OK, "Search Results")
                    .template("SongDetailView")
                    .payload(json!({ "song": song })),
            ),
            Ok(None) => finish(
                res,
                Reply::new(StatusCode::NOT_FOUND, "No song found matching the query")
                    .template("ErrorView")
                    .payload(json!({
                        "message": "No song found from the search",
                        "loggedIn": current_user_id(&req).is_some(),
                    })),
            ),
            Err(e) => internal_error(res, e),
        }
    }

    async fn rate(self: Arc<Self>, req: Request, res: Response) -> Response {
        let Some(user_id) = current_user_id(&req) else {
            return finish(
                res,
                Reply::new(StatusCode::UNAUTHORIZED, "Please log in to rate the song")
                    .redirect("/login"),
            );
        };
        let Some(song_id) = positive_id(&req) else {
            return finish(res, Reply::new(StatusCode::BAD_REQUEST, "Invalid song ID"));
        };
        let Some(rating) = req
            .field("rating")
            .and_then(|raw| raw.trim().parse::<u8>().ok())
            .filter(|r| RATING_RANGE.contains(r))
        else {
            return finish(
                res,
                Reply::new(StatusCode::BAD_REQUEST, "Rating must be between 1 and 5"),
            );
        };

        match self
            .repo
            .create_rating(NewRating {
                user_id,
                song_id,
                rating,
            })
            .await
        {
            Ok(_) => finish(
                res,
                Reply::new(StatusCode::CREATED, "Rating added successfully")
                    .redirect(format!("/songs/{song_id}")),
            ),
            Err(CatalogError::NotFound(_)) => {
                finish(res, Reply::new(StatusCode::BAD_REQUEST, "Error adding rating"))
            }
            Err(e) => internal_error(res, e),
        }
    }
}
