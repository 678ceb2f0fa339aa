use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid_input_error, invalid_invocation_error, Error};

pub const MAX_COMMENT_LENGTH: usize = 1000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub driver_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Pending,
    Approved { moderator_id: Uuid },
    Rejected { moderator_id: Uuid },
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Approved { moderator_id: _ } => "approved".into(),
            Self::Rejected { moderator_id: _ } => "rejected".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

/// Approved reviews of a driver with their aggregate rating.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverReviews {
    pub driver_id: Uuid,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub reviews: Vec<Review>,
}

impl Review {
    pub fn new(
        ride_id: Uuid,
        driver_id: Uuid,
        author_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Self, Error> {
        let comment = comment.trim().to_string();

        if !(1..=5).contains(&rating) || comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(invalid_input_error());
        }

        if driver_id == author_id {
            return Err(invalid_invocation_error());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            ride_id,
            driver_id,
            author_id,
            rating,
            comment,
            status: Status::Pending,
            created_at: Utc::now(),
        })
    }

    #[tracing::instrument(skip(self), fields(review_id = %self.id))]
    pub fn moderate(&mut self, moderator_id: Uuid, decision: Decision) -> Result<(), Error> {
        match self.status {
            Status::Pending => {
                self.status = match decision {
                    Decision::Approve => Status::Approved { moderator_id },
                    Decision::Reject => Status::Rejected { moderator_id },
                };
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }
}

impl DriverReviews {
    pub fn new(driver_id: Uuid, reviews: Vec<Review>) -> Self {
        let review_count = reviews.len() as i64;
        let average_rating = match review_count {
            0 => None,
            n => Some(reviews.iter().map(|r| f64::from(r.rating)).sum::<f64>() / n as f64),
        };

        Self {
            driver_id,
            average_rating,
            review_count,
            reviews,
        }
    }
}

impl PolarClass for Review {
    fn get_polar_class_builder() -> oso::ClassBuilder<Review> {
        oso::Class::builder()
            .name("Review")
            .add_attribute_getter("id", |recv: &Review| recv.id.to_string())
            .add_attribute_getter("author_id", |recv: &Review| recv.author_id.to_string())
            .add_attribute_getter("driver_id", |recv: &Review| recv.driver_id.to_string())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Review::get_polar_class_builder();
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_review(rating: i32) -> Review {
        Review::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), rating, " great ".into()).unwrap()
    }

    #[test]
    fn new_validates_rating_test() {
        assert_eq!(pending_review(5).comment, "great");
        assert!(Review::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 0, "".into()).is_err());
        assert!(Review::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 6, "".into()).is_err());

        let long = "x".repeat(MAX_COMMENT_LENGTH + 1);
        assert!(Review::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 3, long).is_err());

        let driver_id = Uuid::new_v4();
        assert!(Review::new(Uuid::new_v4(), driver_id, driver_id, 3, "".into()).is_err());
    }

    #[test]
    fn moderation_is_final_test() {
        let moderator_id = Uuid::new_v4();
        let mut review = pending_review(4);

        review.moderate(moderator_id, Decision::Approve).unwrap();
        assert_eq!(review.status, Status::Approved { moderator_id });
        assert!(review.moderate(moderator_id, Decision::Reject).is_err());

        let mut review = pending_review(1);
        review.moderate(moderator_id, Decision::Reject).unwrap();
        assert_eq!(review.status.name(), "rejected");
    }

    #[test]
    fn driver_reviews_average_test() {
        let summary = DriverReviews::new(Uuid::new_v4(), vec![pending_review(5), pending_review(4), pending_review(3)]);
        assert_eq!(summary.review_count, 3);
        assert_eq!(summary.average_rating, Some(4.0));

        let empty = DriverReviews::new(Uuid::new_v4(), vec![]);
        assert_eq!(empty.average_rating, None);
    }
}
