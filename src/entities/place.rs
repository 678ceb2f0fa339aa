use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub fn new(city: String, address: String) -> Self {
        Self {
            city,
            address,
            coordinates: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        let coordinates_valid = match &self.coordinates {
            Some(c) => (-90.0..=90.0).contains(&c.lat) && (-180.0..=180.0).contains(&c.lng),
            None => true,
        };

        !self.city.trim().is_empty() && coordinates_valid
    }
}
