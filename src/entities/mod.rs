mod account;
mod participation;
mod place;
mod review;
mod ride;
mod search;
mod session;
mod vehicle;

pub use account::{Account, Preferences, Role, Status as AccountStatus};
pub use participation::{total_driver_payout, Participation, Status as ParticipationStatus};
pub use place::{Coordinates, Place};
pub use review::{Decision, DriverReviews, Review, Status as ReviewStatus};
pub use ride::{CarbonFootprint, Ride, RidePlan, Status as RideStatus};
pub use search::{DriverProfile, RideDetails, RideListing, SearchQuery, SearchResult, VehicleSummary};
pub use session::Session;
pub use vehicle::{Energy, Vehicle, VehicleSpec};

#[cfg(test)]
pub(crate) use ride::tests as ride_fixtures;
