use chrono::{DateTime, Duration, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Energy, Place, Vehicle};
use crate::error::{insufficient_seats_error, invalid_input_error, invalid_invocation_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub departure: Place,
    pub arrival: Place,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    /// Credits charged per seat.
    pub price: i32,
    pub seats_total: i32,
    pub seats_available: i32,
    pub distance_km: f64,
    pub energy: Energy,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Planned,
    Ongoing { started_at: DateTime<Utc> },
    Completed { completed_at: DateTime<Utc> },
    Cancelled { cancelled_at: DateTime<Utc> },
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Planned => "planned".into(),
            Self::Ongoing { started_at: _ } => "ongoing".into(),
            Self::Completed { completed_at: _ } => "completed".into(),
            Self::Cancelled { cancelled_at: _ } => "cancelled".into(),
        }
    }
}

/// What a driver submits when publishing a ride.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RidePlan {
    pub vehicle_id: Uuid,
    pub departure: Place,
    pub arrival: Place,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: i32,
    pub seats: i32,
    pub distance_km: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarbonFootprint {
    pub total_grams: f64,
    pub per_occupant_grams: f64,
}

impl Ride {
    pub fn new(
        driver_id: Uuid,
        vehicle: &Vehicle,
        plan: RidePlan,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        if vehicle.owner_id != driver_id || vehicle.id != plan.vehicle_id {
            return Err(invalid_input_error());
        }

        let valid = plan.departure.is_valid()
            && plan.arrival.is_valid()
            && plan.departure_time > now
            && plan.arrival_time > plan.departure_time
            && plan.price >= 1
            && plan.seats >= 1
            && plan.seats <= vehicle.seats
            && plan.distance_km.is_finite()
            && plan.distance_km > 0.0;

        if !valid {
            return Err(invalid_input_error());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            driver_id,
            vehicle_id: vehicle.id,
            departure: plan.departure,
            arrival: plan.arrival,
            departure_time: plan.departure_time,
            arrival_time: plan.arrival_time,
            price: plan.price,
            seats_total: plan.seats,
            seats_available: plan.seats,
            distance_km: plan.distance_km,
            energy: vehicle.energy,
            status: Status::Planned,
            created_at: now,
        })
    }

    pub fn is_planned(&self) -> bool {
        matches!(self.status, Status::Planned)
    }

    pub fn is_eco(&self) -> bool {
        self.energy.is_eco()
    }

    pub fn duration(&self) -> Duration {
        self.arrival_time - self.departure_time
    }

    pub fn seats_booked(&self) -> i32 {
        self.seats_total - self.seats_available
    }

    /// Credits a passenger pays for `seats` seats on this ride.
    pub fn cost(&self, seats: i32) -> Result<i32, Error> {
        if seats < 1 {
            return Err(invalid_input_error());
        }

        self.price.checked_mul(seats).ok_or_else(invalid_input_error)
    }

    pub fn carbon_footprint(&self) -> CarbonFootprint {
        let total_grams = self.distance_km * self.energy.co2_grams_per_km();
        let occupants = 1 + self.seats_booked().max(0);

        CarbonFootprint {
            total_grams,
            per_occupant_grams: total_grams / f64::from(occupants),
        }
    }

    #[tracing::instrument(skip(self), fields(ride_id = %self.id))]
    pub fn book_seats(&mut self, seats: i32) -> Result<(), Error> {
        match self.status {
            Status::Planned => {
                if seats < 1 {
                    return Err(invalid_invocation_error());
                }

                if seats > self.seats_available {
                    return Err(insufficient_seats_error());
                }

                self.seats_available -= seats;
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }

    #[tracing::instrument(skip(self), fields(ride_id = %self.id))]
    pub fn release_seats(&mut self, seats: i32) -> Result<(), Error> {
        if seats < 1 || self.seats_available + seats > self.seats_total {
            return Err(invalid_input_error());
        }

        match self.status {
            Status::Planned => {
                self.seats_available += seats;
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }

    #[tracing::instrument(skip(self), fields(ride_id = %self.id))]
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        match self.status {
            Status::Planned => {
                self.status = Status::Ongoing { started_at: now };
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }

    #[tracing::instrument(skip(self), fields(ride_id = %self.id))]
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        match self.status {
            Status::Ongoing { started_at: _ } => {
                self.status = Status::Completed { completed_at: now };
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }

    #[tracing::instrument(skip(self), fields(ride_id = %self.id))]
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        match self.status {
            Status::Planned => {
                self.status = Status::Cancelled { cancelled_at: now };
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }
}

impl PolarClass for Ride {
    fn get_polar_class_builder() -> oso::ClassBuilder<Ride> {
        oso::Class::builder()
            .name("Ride")
            .add_attribute_getter("id", |recv: &Ride| recv.id.to_string())
            .add_attribute_getter("driver_id", |recv: &Ride| recv.driver_id.to_string())
            .add_attribute_getter("status", |recv: &Ride| recv.status.name())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Ride::get_polar_class_builder();
        builder.build()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub fn vehicle(owner_id: Uuid, energy: Energy, seats: i32) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            owner_id,
            brand: "Peugeot".into(),
            model: "208".into(),
            color: "grey".into(),
            plate: "AA-001-AA".into(),
            first_registration: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            energy,
            seats,
            created_at: Utc::now(),
        }
    }

    pub fn plan(vehicle: &Vehicle, seats: i32) -> RidePlan {
        let departure_time = Utc::now() + Duration::days(2);

        RidePlan {
            vehicle_id: vehicle.id,
            departure: Place::new("Paris".into(), "Gare de Lyon".into()),
            arrival: Place::new("Lyon".into(), "Part-Dieu".into()),
            departure_time,
            arrival_time: departure_time + Duration::hours(5),
            price: 10,
            seats,
            distance_km: 465.0,
        }
    }

    pub fn ride(seats: i32) -> Ride {
        let driver_id = Uuid::new_v4();
        let vehicle = vehicle(driver_id, Energy::Petrol, 4);

        Ride::new(driver_id, &vehicle, plan(&vehicle, seats), Utc::now()).unwrap()
    }

    #[test]
    fn new_test() {
        let ride = ride(3);

        assert!(ride.is_planned());
        assert_eq!(ride.seats_total, 3);
        assert_eq!(ride.seats_available, 3);
        assert_eq!(ride.duration(), Duration::hours(5));
        assert_eq!(ride.status.name(), "planned");
        assert!(!ride.is_eco());
    }

    #[test]
    fn new_rejects_invalid_plans_test() {
        let driver_id = Uuid::new_v4();
        let vehicle = vehicle(driver_id, Energy::Electric, 3);
        let now = Utc::now();

        // more seats than the vehicle has
        assert!(Ride::new(driver_id, &vehicle, plan(&vehicle, 4), now).is_err());
        assert!(Ride::new(driver_id, &vehicle, plan(&vehicle, 0), now).is_err());

        // someone else's vehicle
        assert!(Ride::new(Uuid::new_v4(), &vehicle, plan(&vehicle, 2), now).is_err());

        let mut p = plan(&vehicle, 2);
        p.departure_time = now - Duration::minutes(1);
        assert!(Ride::new(driver_id, &vehicle, p, now).is_err());

        let mut p = plan(&vehicle, 2);
        p.arrival_time = p.departure_time;
        assert!(Ride::new(driver_id, &vehicle, p, now).is_err());

        let mut p = plan(&vehicle, 2);
        p.price = 0;
        assert!(Ride::new(driver_id, &vehicle, p, now).is_err());

        let mut p = plan(&vehicle, 2);
        p.distance_km = f64::NAN;
        assert!(Ride::new(driver_id, &vehicle, p, now).is_err());

        let mut p = plan(&vehicle, 2);
        p.arrival.city = " ".into();
        assert!(Ride::new(driver_id, &vehicle, p, now).is_err());
    }

    #[test]
    fn book_and_release_seats_test() {
        let mut ride = ride(3);

        ride.book_seats(2).unwrap();
        assert_eq!(ride.seats_available, 1);
        assert_eq!(ride.seats_booked(), 2);

        let err = ride.book_seats(2).unwrap_err();
        assert_eq!(err.code, 105);
        assert_eq!(ride.seats_available, 1);

        ride.book_seats(1).unwrap();
        assert_eq!(ride.seats_available, 0);
        assert_eq!(ride.book_seats(1).unwrap_err().code, 105);

        ride.release_seats(2).unwrap();
        assert_eq!(ride.seats_available, 2);

        // never above the total
        assert!(ride.release_seats(2).is_err());
        assert_eq!(ride.seats_available, 2);

        assert_eq!(ride.book_seats(0).unwrap_err().code, 100);
        assert_eq!(ride.book_seats(-1).unwrap_err().code, 100);
        assert_eq!(ride.seats_available, 2);
        assert!(ride.release_seats(0).is_err());
    }

    #[test]
    fn booking_requires_planned_ride_test() {
        let mut ride = ride(3);
        ride.book_seats(1).unwrap();
        ride.start(Utc::now()).unwrap();

        assert_eq!(ride.book_seats(1).unwrap_err().code, 100);
        assert_eq!(ride.release_seats(1).unwrap_err().code, 100);
    }

    #[test]
    fn lifecycle_test() {
        let mut ride = ride(2);
        let now = Utc::now();

        assert!(ride.complete(now).is_err());

        ride.start(now).unwrap();
        assert_eq!(ride.status.name(), "ongoing");
        assert!(ride.start(now).is_err());
        assert!(ride.cancel(now).is_err());

        ride.complete(now).unwrap();
        assert_eq!(ride.status, Status::Completed { completed_at: now });
        assert!(ride.complete(now).is_err());
        assert!(ride.cancel(now).is_err());
    }

    #[test]
    fn cancel_test() {
        let mut ride = ride(2);
        let now = Utc::now();

        ride.cancel(now).unwrap();
        assert_eq!(ride.status.name(), "cancelled");
        assert!(ride.start(now).is_err());
        assert!(ride.cancel(now).is_err());
    }

    #[test]
    fn cost_test() {
        let ride = ride(2);

        assert_eq!(ride.cost(2).unwrap(), 20);
        assert!(ride.cost(0).is_err());

        let mut expensive = ride.clone();
        expensive.price = i32::MAX;
        assert!(expensive.cost(2).is_err());
    }

    #[test]
    fn carbon_footprint_test() {
        let mut ride = ride(3);

        let footprint = ride.carbon_footprint();
        assert_eq!(footprint.total_grams, 465.0 * 130.0);
        assert_eq!(footprint.per_occupant_grams, 465.0 * 130.0);

        ride.book_seats(3).unwrap();
        let footprint = ride.carbon_footprint();
        assert_eq!(footprint.per_occupant_grams, 465.0 * 130.0 / 4.0);
    }
}
