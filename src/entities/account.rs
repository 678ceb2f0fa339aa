use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{insufficient_credits_error, invalid_input_error, invalid_invocation_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub pseudo: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub status: Status,
    pub credits: i32,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Passenger,
    Driver,
    Employee,
    Admin,
}

impl Role {
    pub fn name(&self) -> String {
        match self {
            Self::Passenger => "passenger".into(),
            Self::Driver => "driver".into(),
            Self::Employee => "employee".into(),
            Self::Admin => "admin".into(),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Employee | Self::Admin)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Active,
    Suspended { since: DateTime<Utc> },
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Active => "active".into(),
            Self::Suspended { since: _ } => "suspended".into(),
        }
    }
}

/// Travel preferences a driver shows on their rides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub smoking: bool,
    #[serde(default)]
    pub pets: bool,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Account {
    pub fn new(email: String, pseudo: String, roles: Vec<Role>, credits: i32) -> Result<Self, Error> {
        let email = email.trim().to_lowercase();
        let pseudo = pseudo.trim().to_string();

        if !is_valid_email(&email) || pseudo.is_empty() || pseudo.len() > 50 || roles.is_empty() {
            return Err(invalid_input_error());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            pseudo,
            email,
            roles,
            status: Status::Active,
            credits,
            preferences: Preferences::default(),
            created_at: Utc::now(),
        })
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(Role::name).collect()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, Status::Active)
    }

    #[tracing::instrument(skip(self), fields(account_id = %self.id))]
    pub fn debit(&mut self, amount: i32) -> Result<(), Error> {
        if amount < 0 {
            return Err(invalid_input_error());
        }

        if self.credits < amount {
            return Err(insufficient_credits_error());
        }

        self.credits -= amount;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(account_id = %self.id))]
    pub fn credit(&mut self, amount: i32) -> Result<(), Error> {
        if amount < 0 {
            return Err(invalid_input_error());
        }

        self.credits = self
            .credits
            .checked_add(amount)
            .ok_or_else(invalid_input_error)?;
        Ok(())
    }

    /// Replaces the self-service roles (passenger, driver). Staff roles are kept.
    pub fn set_roles(&mut self, roles: Vec<Role>) -> Result<(), Error> {
        if roles.is_empty() || roles.iter().any(Role::is_staff) {
            return Err(invalid_input_error());
        }

        let mut next: Vec<Role> = self.roles.iter().copied().filter(Role::is_staff).collect();

        for role in [Role::Passenger, Role::Driver] {
            if roles.contains(&role) {
                next.push(role);
            }
        }

        self.roles = next;
        Ok(())
    }

    pub fn suspend(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Active => {
                self.status = Status::Suspended { since: Utc::now() };
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }

    pub fn reactivate(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Suspended { since: _ } => {
                self.status = Status::Active;
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

impl PolarClass for Account {
    fn get_polar_class_builder() -> oso::ClassBuilder<Account> {
        oso::Class::builder()
            .name("Account")
            .add_attribute_getter("id", |recv: &Account| recv.id.to_string())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Account::get_polar_class_builder();
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new("Jane@Example.com ".into(), "jane".into(), vec![Role::Passenger], 20).unwrap()
    }

    #[test]
    fn new_normalises_email_test() {
        let account = account();

        assert_eq!(account.email, "jane@example.com");
        assert_eq!(account.credits, 20);
        assert!(account.is_active());
    }

    #[test]
    fn new_rejects_invalid_input_test() {
        assert!(Account::new("nope".into(), "jane".into(), vec![Role::Passenger], 20).is_err());
        assert!(Account::new("a@b.c".into(), " ".into(), vec![Role::Passenger], 20).is_err());
        assert!(Account::new("a@b.c".into(), "jane".into(), vec![], 20).is_err());
    }

    #[test]
    fn debit_and_credit_test() {
        let mut account = account();

        account.debit(15).unwrap();
        assert_eq!(account.credits, 5);

        let err = account.debit(6).unwrap_err();
        assert_eq!(err.code, 106);
        assert_eq!(account.credits, 5);

        account.credit(10).unwrap();
        assert_eq!(account.credits, 15);

        assert!(account.debit(-1).is_err());
        assert!(account.credit(-1).is_err());
    }

    #[test]
    fn set_roles_keeps_staff_roles_test() {
        let mut account = account();
        account.roles.push(Role::Employee);

        account.set_roles(vec![Role::Driver, Role::Passenger]).unwrap();
        assert_eq!(account.roles, vec![Role::Employee, Role::Passenger, Role::Driver]);

        assert!(account.set_roles(vec![]).is_err());
        assert!(account.set_roles(vec![Role::Admin]).is_err());
    }

    #[test]
    fn suspension_test() {
        let mut account = account();

        assert!(account.reactivate().is_err());
        account.suspend().unwrap();
        assert!(!account.is_active());
        assert_eq!(account.status.name(), "suspended");
        assert!(account.suspend().is_err());
        account.reactivate().unwrap();
        assert!(account.is_active());
    }
}
