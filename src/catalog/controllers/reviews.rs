use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use super::{current_user_id, finish, internal_error, positive_id};
use crate::catalog::error::CatalogError;
use crate::catalog::models::NewReview;
use crate::catalog::repository::CatalogRepository;
use crate::http::{with_state, Handler, Reply, Request, Response};
use crate::routing::{RouteError, Router};

/// Writing, listing and deleting reviews.
pub struct ReviewController {
    repo: Arc<dyn CatalogRepository>,
}

impl ReviewController {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    pub fn register_routes(self: &Arc<Self>, router: &mut Router<Handler>) -> Result<(), RouteError> {
        router.post("/songs/:id/review", with_state(Arc::clone(self), Self::add_review))?;
        router.delete("/reviews/:id", with_state(Arc::clone(self), Self::delete_review))?;
        router.get("/songs/:id/reviews", with_state(Arc::clone(self), Self::list_reviews))?;
        Ok(())
    }

    async fn add_review(self: Arc<Self>, req: Request, res: Response) -> Response {
        let Some(user_id) = current_user_id(&req) else {
            return finish(
                res,
                Reply::new(StatusCode::UNAUTHORIZED, "Please log in to add a review")
                    .redirect("/login"),
            );
        };
        let Some(song_id) = positive_id(&req) else {
            return finish(res, Reply::new(StatusCode::BAD_REQUEST, "Invalid song ID"));
        };
        let Some(content) = req.field("content").map(str::trim).filter(|c| !c.is_empty()) else {
            return finish(res, Reply::new(StatusCode::BAD_REQUEST, "Review content is required"));
        };

        let review = NewReview {
            user_id,
            song_id,
            content: content.to_string(),
        };
        match self.repo.create_review(review).await {
            Ok(review) => {
                tracing::debug!(review_id = review.id, song_id, user_id, "Review added");
                finish(
                    res,
                    Reply::new(StatusCode::CREATED, "Review added successfully")
                        .payload(json!({ "review": review, "loggedIn": true }))
                        .redirect(format!("/songs/{song_id}/reviews")),
                )
            }
            Err(CatalogError::NotFound(_)) => {
                finish(res, Reply::new(StatusCode::BAD_REQUEST, "Error adding review"))
            }
            Err(e) => internal_error(res, e),
        }
    }

    async fn delete_review(self: Arc<Self>, req: Request, res: Response) -> Response {
        let Some(user_id) = current_user_id(&req) else {
            return finish(
                res,
                Reply::new(StatusCode::UNAUTHORIZED, "Please log in to delete a review")
                    .redirect("/login"),
            );
        };
        let Some(review_id) = positive_id(&req) else {
            return finish(res, Reply::new(StatusCode::BAD_REQUEST, "Invalid review ID"));
        };

        let review = match self.repo.find_review(review_id).await {
            Ok(Some(review)) => review,
            Ok(None) => {
                return finish(res, Reply::new(StatusCode::BAD_REQUEST, "Error deleting review"))
            }
            Err(e) => return internal_error(res, e),
        };
        if review.user_id != user_id {
            return finish(
                res,
                Reply::new(StatusCode::FORBIDDEN, "You can only delete your own reviews"),
            );
        }

        match self.repo.delete_review(review_id).await {
            Ok(()) => finish(res, Reply::new(StatusCode::OK, "Review deleted successfully")),
            // Deleted concurrently.
            Err(CatalogError::NotFound(_)) => {
                finish(res, Reply::new(StatusCode::BAD_REQUEST, "Error deleting review"))
            }
            Err(e) => internal_error(res, e),
        }
    }

    async fn list_reviews(self: Arc<Self>, req: Request, res: Response) -> Response {
        let Some(song_id) = positive_id(&req) else {
            return finish(res, Reply::new(StatusCode::BAD_REQUEST, "Invalid song ID"));
        };

        let song = match self.repo.find_song(song_id).await {
            Ok(Some(song)) => song,
            Ok(None) => return finish(res, Reply::new(StatusCode::NOT_FOUND, "Song not found")),
            Err(e) => return internal_error(res, e),
        };
        let reviews = match self.repo.reviews_for_song(song_id).await {
            Ok(reviews) => reviews,
            Err(e) => return internal_error(res, e),
        };

        finish(
            res,
            Reply::new(StatusCode::OK, "Song Reviews")
                .template("ReviewView")
                .payload(json!({
                    "reviews": reviews,
                    "song": song,
                    "loggedIn": current_user_id(&req).is_some(),
                })),
        )
    }
}
