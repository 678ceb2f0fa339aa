use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid_input_error, invalid_invocation_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Participation {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub passenger_id: Uuid,
    pub seats: i32,
    pub credits_paid: i32,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Confirmed,
    Cancelled { cancelled_at: DateTime<Utc> },
    Completed,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Confirmed => "confirmed".into(),
            Self::Cancelled { cancelled_at: _ } => "cancelled".into(),
            Self::Completed => "completed".into(),
        }
    }
}

impl Participation {
    pub fn new(ride_id: Uuid, passenger_id: Uuid, seats: i32, credits_paid: i32) -> Result<Self, Error> {
        if seats < 1 || credits_paid < 0 {
            return Err(invalid_input_error());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            ride_id,
            passenger_id,
            seats,
            credits_paid,
            status: Status::Confirmed,
            created_at: Utc::now(),
        })
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.status, Status::Confirmed)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, Status::Completed)
    }

    /// Credits the driver receives once the platform fee is withheld.
    pub fn driver_payout(&self, platform_fee: i32) -> i32 {
        (self.credits_paid - platform_fee).max(0)
    }

    /// Returns the credits to refund to the passenger.
    #[tracing::instrument(skip(self), fields(participation_id = %self.id))]
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<i32, Error> {
        match self.status {
            Status::Confirmed => {
                self.status = Status::Cancelled { cancelled_at: now };
                Ok(self.credits_paid)
            }
            _ => Err(invalid_invocation_error()),
        }
    }

    #[tracing::instrument(skip(self), fields(participation_id = %self.id))]
    pub fn complete(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Confirmed => {
                self.status = Status::Completed;
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }
}

/// What the driver earns from the completed participations of a ride.
pub fn total_driver_payout(participations: &[Participation], platform_fee: i32) -> Result<i32, Error> {
    participations
        .iter()
        .filter(|participation| participation.is_completed())
        .try_fold(0i32, |total, participation| {
            total
                .checked_add(participation.driver_payout(platform_fee))
                .ok_or_else(invalid_input_error)
        })
}

impl PolarClass for Participation {
    fn get_polar_class_builder() -> oso::ClassBuilder<Participation> {
        oso::Class::builder()
            .name("Participation")
            .add_attribute_getter("id", |recv: &Participation| recv.id.to_string())
            .add_attribute_getter("passenger_id", |recv: &Participation| {
                recv.passenger_id.to_string()
            })
            .add_attribute_getter("status", |recv: &Participation| recv.status.name())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Participation::get_polar_class_builder();
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_refunds_credits_paid_test() {
        let mut participation = Participation::new(Uuid::new_v4(), Uuid::new_v4(), 2, 20).unwrap();

        assert_eq!(participation.cancel(Utc::now()).unwrap(), 20);
        assert_eq!(participation.status.name(), "cancelled");
        assert!(participation.cancel(Utc::now()).is_err());
        assert!(participation.complete().is_err());
    }

    #[test]
    fn complete_test() {
        let mut participation = Participation::new(Uuid::new_v4(), Uuid::new_v4(), 1, 10).unwrap();

        participation.complete().unwrap();
        assert!(participation.is_completed());
        assert!(participation.cancel(Utc::now()).is_err());
    }

    #[test]
    fn driver_payout_test() {
        let participation = Participation::new(Uuid::new_v4(), Uuid::new_v4(), 1, 10).unwrap();
        assert_eq!(participation.driver_payout(2), 8);
        assert_eq!(participation.driver_payout(0), 10);

        let cheap = Participation::new(Uuid::new_v4(), Uuid::new_v4(), 1, 1).unwrap();
        assert_eq!(cheap.driver_payout(2), 0);
    }

    #[test]
    fn total_driver_payout_test() {
        let ride_id = Uuid::new_v4();
        let mut participations = vec![
            Participation::new(ride_id, Uuid::new_v4(), 1, 10).unwrap(),
            Participation::new(ride_id, Uuid::new_v4(), 2, 20).unwrap(),
            Participation::new(ride_id, Uuid::new_v4(), 1, 1).unwrap(),
            Participation::new(ride_id, Uuid::new_v4(), 1, 10).unwrap(),
        ];

        for participation in participations.iter_mut().take(3) {
            participation.complete().unwrap();
        }
        participations[3].cancel(Utc::now()).unwrap();

        // 8 + 18 + 0, the cancelled one earns nothing
        assert_eq!(total_driver_payout(&participations, 2).unwrap(), 26);
        assert_eq!(total_driver_payout(&participations, 0).unwrap(), 31);
        assert_eq!(total_driver_payout(&[], 2).unwrap(), 0);
    }

    #[test]
    fn total_driver_payout_overflow_test() {
        let ride_id = Uuid::new_v4();
        let mut participations = vec![
            Participation::new(ride_id, Uuid::new_v4(), 1, i32::MAX).unwrap(),
            Participation::new(ride_id, Uuid::new_v4(), 1, 10).unwrap(),
        ];

        for participation in participations.iter_mut() {
            participation.complete().unwrap();
        }

        assert_eq!(total_driver_payout(&participations, 0).unwrap_err().code, 101);
    }

    #[test]
    fn new_rejects_empty_booking_test() {
        assert!(Participation::new(Uuid::new_v4(), Uuid::new_v4(), 0, 0).is_err());
    }
}
