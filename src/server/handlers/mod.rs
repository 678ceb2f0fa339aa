pub mod accounts;
pub mod admin;
pub mod participations;
pub mod reviews;
pub mod rides;
pub mod sessions;
pub mod vehicles;
