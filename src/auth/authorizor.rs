use oso::{Oso, PolarClass};

use crate::auth::{Platform, User};
use crate::entities::{Account, Participation, Review, Ride, Vehicle};
use crate::error::Error;

pub fn new() -> Result<Oso, Error> {
    let mut o = Oso::new();

    o.register_class(Platform::get_polar_class())?;
    o.register_class(User::get_polar_class())?;
    o.register_class(Account::get_polar_class())?;
    o.register_class(Vehicle::get_polar_class())?;
    o.register_class(Ride::get_polar_class())?;
    o.register_class(Participation::get_polar_class())?;
    o.register_class(Review::get_polar_class())?;

    o.load_str(include_str!("rules.polar"))?;

    Ok(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ride_fixtures, Energy, Role};
    use chrono::Utc;
    use uuid::Uuid;

    fn user(roles: &[&str]) -> User {
        User {
            id: Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn ride_driven_by(driver: &User) -> Ride {
        let vehicle = ride_fixtures::vehicle(driver.id, Energy::Hybrid, 4);
        let plan = ride_fixtures::plan(&vehicle, 3);

        Ride::new(driver.id, &vehicle, plan, Utc::now()).unwrap()
    }

    #[test]
    fn account_test() {
        let authorizor = new().unwrap();

        let account = Account::new("a@b.fr".into(), "alice".into(), vec![Role::Passenger], 20).unwrap();
        let owner = User::from(&account);
        let stranger = user(&["passenger"]);
        let admin = user(&["admin"]);

        assert!(authorizor.is_allowed(owner.clone(), "read", account.clone()).unwrap());
        assert!(authorizor.is_allowed(owner.clone(), "update", account.clone()).unwrap());
        assert!(!authorizor.is_allowed(stranger.clone(), "read", account.clone()).unwrap());

        assert!(authorizor.is_allowed(admin.clone(), "moderate", account.clone()).unwrap());
        assert!(!authorizor.is_allowed(owner.clone(), "moderate", account.clone()).unwrap());

        // admins cannot suspend themselves
        let admin_account = Account {
            id: admin.id,
            ..account.clone()
        };
        assert!(!authorizor.is_allowed(admin.clone(), "moderate", admin_account).unwrap());

        assert!(authorizor.is_allowed(admin, "create_employee", Platform::default()).unwrap());
        assert!(!authorizor.is_allowed(owner, "create_employee", Platform::default()).unwrap());
    }

    #[test]
    fn driver_platform_permissions_test() {
        let authorizor = new().unwrap();

        let driver = user(&["driver"]);
        let passenger = user(&["passenger"]);

        assert!(authorizor.is_allowed(driver.clone(), "create_vehicle", Platform::default()).unwrap());
        assert!(authorizor.is_allowed(driver, "create_ride", Platform::default()).unwrap());
        assert!(!authorizor.is_allowed(passenger.clone(), "create_vehicle", Platform::default()).unwrap());
        assert!(!authorizor.is_allowed(passenger, "create_ride", Platform::default()).unwrap());
    }

    #[test]
    fn vehicle_owner_test() {
        let authorizor = new().unwrap();

        let owner = user(&["driver"]);
        let other = user(&["driver"]);
        let vehicle = ride_fixtures::vehicle(owner.id, Energy::Diesel, 4);

        assert!(authorizor.is_allowed(owner.clone(), "read", vehicle.clone()).unwrap());
        assert!(authorizor.is_allowed(owner, "delete", vehicle.clone()).unwrap());
        assert!(!authorizor.is_allowed(other.clone(), "read", vehicle.clone()).unwrap());
        assert!(!authorizor.is_allowed(other, "delete", vehicle).unwrap());
    }

    #[test]
    fn ride_driver_test() {
        let authorizor = new().unwrap();

        let driver = user(&["driver", "passenger"]);
        let other_driver = user(&["driver"]);
        let ride = ride_driven_by(&driver);

        for action in ["start", "complete", "cancel", "read_passengers"] {
            assert!(authorizor.is_allowed(driver.clone(), action, ride.clone()).unwrap());
            assert!(!authorizor.is_allowed(other_driver.clone(), action, ride.clone()).unwrap());
        }

        // drivers cannot book their own ride
        assert!(!authorizor.is_allowed(driver, "book", ride).unwrap());
    }

    #[test]
    fn ride_admin_test() {
        let authorizor = new().unwrap();

        let driver = user(&["driver"]);
        let admin = user(&["admin"]);
        let ride = ride_driven_by(&driver);

        assert!(authorizor.is_allowed(admin.clone(), "cancel", ride.clone()).unwrap());
        assert!(authorizor.is_allowed(admin.clone(), "read_passengers", ride.clone()).unwrap());
        assert!(!authorizor.is_allowed(admin.clone(), "start", ride.clone()).unwrap());
        assert!(!authorizor.is_allowed(admin, "complete", ride).unwrap());
    }

    #[test]
    fn ride_booking_test() {
        let authorizor = new().unwrap();

        let driver = user(&["driver"]);
        let passenger = user(&["passenger"]);
        let driver_only = user(&["driver"]);
        let ride = ride_driven_by(&driver);

        assert!(authorizor.is_allowed(passenger, "book", ride.clone()).unwrap());
        assert!(!authorizor.is_allowed(driver_only, "book", ride).unwrap());
    }

    #[test]
    fn participation_test() {
        let authorizor = new().unwrap();

        let passenger = user(&["passenger"]);
        let other = user(&["passenger"]);
        let mut participation = Participation::new(Uuid::new_v4(), passenger.id, 1, 10).unwrap();

        assert!(authorizor.is_allowed(passenger.clone(), "cancel", participation.clone()).unwrap());
        assert!(!authorizor.is_allowed(other.clone(), "cancel", participation.clone()).unwrap());

        // reviews only after the ride is completed
        assert!(!authorizor.is_allowed(passenger.clone(), "review", participation.clone()).unwrap());

        participation.complete().unwrap();

        assert!(authorizor.is_allowed(passenger, "review", participation.clone()).unwrap());
        assert!(!authorizor.is_allowed(other, "review", participation).unwrap());
    }

    #[test]
    fn review_moderation_test() {
        let authorizor = new().unwrap();

        let employee = user(&["employee"]);
        let admin = user(&["admin"]);
        let passenger = user(&["passenger"]);

        let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), passenger.id, 4, "".into()).unwrap();

        assert!(authorizor.is_allowed(employee.clone(), "moderate_reviews", Platform::default()).unwrap());
        assert!(authorizor.is_allowed(admin.clone(), "moderate_reviews", Platform::default()).unwrap());
        assert!(!authorizor.is_allowed(passenger.clone(), "moderate_reviews", Platform::default()).unwrap());

        assert!(authorizor.is_allowed(employee.clone(), "moderate", review.clone()).unwrap());
        assert!(authorizor.is_allowed(admin, "moderate", review.clone()).unwrap());
        assert!(!authorizor.is_allowed(passenger, "moderate", review.clone()).unwrap());

        // staff cannot moderate reviews about themselves
        let about_employee = Review::new(Uuid::new_v4(), employee.id, Uuid::new_v4(), 1, "".into()).unwrap();
        assert!(!authorizor.is_allowed(employee, "moderate", about_employee).unwrap());
    }
}
