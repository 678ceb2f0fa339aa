use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{CarbonFootprint, Energy, Preferences, Ride, Vehicle};
use crate::entities::vehicle::MAX_PASSENGER_SEATS;
use crate::error::{invalid_input_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchQuery {
    pub departure_city: String,
    pub arrival_city: String,
    pub date: NaiveDate,
    pub seats: Option<i32>,
    pub max_price: Option<i32>,
    pub eco_only: Option<bool>,
    pub max_duration_minutes: Option<i64>,
    pub min_rating: Option<f64>,
}

impl SearchQuery {
    pub fn validate(&self) -> Result<(), Error> {
        let valid = !self.departure_city.trim().is_empty()
            && !self.arrival_city.trim().is_empty()
            && (1..=MAX_PASSENGER_SEATS).contains(&self.seats())
            && self.max_price.map_or(true, |p| p >= 0)
            && self.max_duration_minutes.map_or(true, |d| d > 0)
            && self
                .min_rating
                .map_or(true, |r| r.is_finite() && (0.0..=5.0).contains(&r));

        match valid {
            true => Ok(()),
            false => Err(invalid_input_error()),
        }
    }

    pub fn seats(&self) -> i32 {
        self.seats.unwrap_or(1)
    }

    pub fn eco_only(&self) -> bool {
        self.eco_only.unwrap_or(false)
    }

    /// Start and end (exclusive) of the searched calendar day, in UTC.
    pub fn day_bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), Error> {
        let midnight = self
            .date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(invalid_input_error)?;
        let start = Utc.from_utc_datetime(&midnight);

        Ok((start, start + Duration::days(1)))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: Uuid,
    pub pseudo: String,
    pub preferences: Preferences,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RideListing {
    pub ride: Ride,
    pub driver: DriverProfile,
    pub eco: bool,
    pub duration_minutes: i64,
    pub carbon_footprint: CarbonFootprint,
}

impl RideListing {
    pub fn new(ride: Ride, driver: DriverProfile) -> Self {
        Self {
            eco: ride.is_eco(),
            duration_minutes: ride.duration().num_minutes(),
            carbon_footprint: ride.carbon_footprint(),
            ride,
            driver,
        }
    }
}

/// Public view of the vehicle used for a ride; the plate is left out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub brand: String,
    pub model: String,
    pub color: String,
    pub energy: Energy,
    pub first_registration: NaiveDate,
}

impl From<Vehicle> for VehicleSummary {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            brand: vehicle.brand,
            model: vehicle.model,
            color: vehicle.color,
            energy: vehicle.energy,
            first_registration: vehicle.first_registration,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RideDetails {
    #[serde(flatten)]
    pub listing: RideListing,
    pub vehicle: VehicleSummary,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub rides: Vec<RideListing>,
    /// Set when nothing matched: the earliest later day with a matching ride.
    pub next_available_date: Option<NaiveDate>,
}
