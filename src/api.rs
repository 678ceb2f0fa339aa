use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{
    Account, Decision, DriverReviews, Participation, Preferences, Review, Ride, RideDetails,
    RidePlan, Role, SearchQuery, SearchResult, Session, Vehicle, VehicleSpec,
};
use crate::error::Error;

#[derive(Clone)]
pub struct Registration {
    pub email: String,
    pub pseudo: String,
    pub password: String,
}

#[async_trait]
pub trait AccountAPI {
    async fn register(&self, registration: Registration) -> Result<Account, Error>;
    async fn login(&self, email: String, password: String) -> Result<Session, Error>;
    async fn logout(&self, token: Uuid) -> Result<(), Error>;
    async fn authenticate(&self, token: Uuid) -> Result<User, Error>;
    async fn find_account(&self, user: User, id: Uuid) -> Result<Account, Error>;
    async fn update_roles(&self, user: User, roles: Vec<Role>) -> Result<Account, Error>;
    async fn update_preferences(
        &self,
        user: User,
        preferences: Preferences,
    ) -> Result<Account, Error>;
    async fn bootstrap_admin(&self, registration: Registration) -> Result<Account, Error>;
}

#[async_trait]
pub trait ModerationAPI {
    async fn create_employee(&self, user: User, registration: Registration)
        -> Result<Account, Error>;
    async fn suspend_account(&self, user: User, id: Uuid) -> Result<Account, Error>;
    async fn reactivate_account(&self, user: User, id: Uuid) -> Result<Account, Error>;
}

#[async_trait]
pub trait VehicleAPI {
    async fn create_vehicle(&self, user: User, spec: VehicleSpec) -> Result<Vehicle, Error>;
    async fn find_vehicle(&self, user: User, id: Uuid) -> Result<Vehicle, Error>;
    async fn list_vehicles(&self, user: User) -> Result<Vec<Vehicle>, Error>;
    async fn delete_vehicle(&self, user: User, id: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait RideAPI {
    async fn create_ride(&self, user: User, plan: RidePlan) -> Result<Ride, Error>;
    async fn find_ride(&self, id: Uuid) -> Result<RideDetails, Error>;
    async fn search_rides(&self, query: SearchQuery) -> Result<SearchResult, Error>;
    async fn list_driver_rides(&self, user: User) -> Result<Vec<Ride>, Error>;
    async fn start_ride(&self, user: User, id: Uuid) -> Result<Ride, Error>;
    async fn complete_ride(&self, user: User, id: Uuid) -> Result<Ride, Error>;
    async fn cancel_ride(&self, user: User, id: Uuid) -> Result<Ride, Error>;
    async fn list_ride_passengers(&self, user: User, id: Uuid)
        -> Result<Vec<Participation>, Error>;
}

#[async_trait]
pub trait BookingAPI {
    async fn book_seats(&self, user: User, ride_id: Uuid, seats: i32)
        -> Result<Participation, Error>;
    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<Participation, Error>;
    async fn list_participations(&self, user: User) -> Result<Vec<Participation>, Error>;
}

#[async_trait]
pub trait ReviewAPI {
    async fn submit_review(
        &self,
        user: User,
        ride_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Review, Error>;
    async fn list_driver_reviews(&self, driver_id: Uuid) -> Result<DriverReviews, Error>;
    async fn list_pending_reviews(&self, user: User) -> Result<Vec<Review>, Error>;
    async fn moderate_review(&self, user: User, id: Uuid, decision: Decision)
        -> Result<Review, Error>;
}

pub trait API: AccountAPI + ModerationAPI + VehicleAPI + RideAPI + BookingAPI + ReviewAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
