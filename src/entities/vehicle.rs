use chrono::{DateTime, NaiveDate, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid_input_error, Error};

pub const MAX_PASSENGER_SEATS: i32 = 8;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub plate: String,
    pub first_registration: NaiveDate,
    pub energy: Energy,
    pub seats: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Energy {
    Electric,
    Hybrid,
    Petrol,
    Diesel,
    Lpg,
}

impl Energy {
    /// Average tailpipe and grid emissions, in grams of CO2 per kilometre.
    pub fn co2_grams_per_km(&self) -> f64 {
        match self {
            Self::Electric => 20.0,
            Self::Hybrid => 100.0,
            Self::Petrol => 130.0,
            Self::Diesel => 120.0,
            Self::Lpg => 110.0,
        }
    }

    pub fn is_eco(&self) -> bool {
        matches!(self, Self::Electric)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub brand: String,
    pub model: String,
    pub color: String,
    pub plate: String,
    pub first_registration: NaiveDate,
    pub energy: Energy,
    pub seats: i32,
}

impl Vehicle {
    pub fn new(owner_id: Uuid, spec: VehicleSpec) -> Result<Self, Error> {
        let plate: String = spec
            .plate
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        if plate.is_empty()
            || spec.brand.trim().is_empty()
            || spec.model.trim().is_empty()
            || !(1..=MAX_PASSENGER_SEATS).contains(&spec.seats)
            || spec.first_registration > Utc::now().date_naive()
        {
            return Err(invalid_input_error());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            brand: spec.brand.trim().to_string(),
            model: spec.model.trim().to_string(),
            color: spec.color.trim().to_string(),
            plate,
            first_registration: spec.first_registration,
            energy: spec.energy,
            seats: spec.seats,
            created_at: Utc::now(),
        })
    }
}

impl PolarClass for Vehicle {
    fn get_polar_class_builder() -> oso::ClassBuilder<Vehicle> {
        oso::Class::builder()
            .name("Vehicle")
            .add_attribute_getter("id", |recv: &Vehicle| recv.id.to_string())
            .add_attribute_getter("owner_id", |recv: &Vehicle| recv.owner_id.to_string())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Vehicle::get_polar_class_builder();
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> VehicleSpec {
        VehicleSpec {
            brand: "Renault".into(),
            model: "Zoe".into(),
            color: "blue".into(),
            plate: "ab-123 cd".into(),
            first_registration: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            energy: Energy::Electric,
            seats: 3,
        }
    }

    #[test]
    fn new_normalises_plate_test() {
        let vehicle = Vehicle::new(Uuid::new_v4(), spec()).unwrap();

        assert_eq!(vehicle.plate, "AB-123CD");
        assert!(vehicle.energy.is_eco());
    }

    #[test]
    fn new_rejects_invalid_seats_test() {
        let mut invalid = spec();
        invalid.seats = 0;
        assert!(Vehicle::new(Uuid::new_v4(), invalid).is_err());

        let mut invalid = spec();
        invalid.seats = MAX_PASSENGER_SEATS + 1;
        assert!(Vehicle::new(Uuid::new_v4(), invalid).is_err());

        let mut invalid = spec();
        invalid.plate = "  ".into();
        assert!(Vehicle::new(Uuid::new_v4(), invalid).is_err());
    }

    #[test]
    fn energy_factors_test() {
        assert!(Energy::Electric.co2_grams_per_km() < Energy::Hybrid.co2_grams_per_km());
        assert!(Energy::Hybrid.co2_grams_per_km() < Energy::Petrol.co2_grams_per_km());
        assert!(!Energy::Diesel.is_eco());
    }
}
