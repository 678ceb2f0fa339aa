use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug, Display};

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self.code {
            1..=99 => StatusCode::INTERNAL_SERVER_ERROR,
            100 | 105 | 106 | 107 => StatusCode::CONFLICT,
            102 => StatusCode::FORBIDDEN,
            103 => StatusCode::NOT_FOUND,
            104 => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return not_found_error();
        }

        // unique_violation
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return conflict_error();
            }
        }

        database_error(err)
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        authorizor_error(err)
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        password_hash_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self.code {
            1..=99 => "Internal Server Error",
            _ => self.message.as_str(),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_invocation_error() -> Error {
    Error {
        code: 100,
        message: "invalid invocation".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn unauthorized_error() -> Error {
    Error {
        code: 102,
        message: "unauthorized".into(),
    }
}

pub fn not_found_error() -> Error {
    Error {
        code: 103,
        message: "not found".into(),
    }
}

pub fn unauthenticated_error() -> Error {
    Error {
        code: 104,
        message: "unauthenticated".into(),
    }
}

pub fn insufficient_seats_error() -> Error {
    Error {
        code: 105,
        message: "not enough seats available".into(),
    }
}

pub fn insufficient_credits_error() -> Error {
    Error {
        code: 106,
        message: "not enough credits".into(),
    }
}

pub fn conflict_error() -> Error {
    Error {
        code: 107,
        message: "already exists".into(),
    }
}

pub fn env_var_error(err: env::VarError) -> Error {
    tracing::error!("environment variable error: {}", err);

    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!("database error: {:?}", err);

    Error {
        code: 2,
        message: "database error".into(),
    }
}

pub fn authorizor_error(err: oso::OsoError) -> Error {
    tracing::error!("authorization engine error: {}", err);

    Error {
        code: 3,
        message: "authorizor error".into(),
    }
}

pub fn password_hash_error(err: argon2::password_hash::Error) -> Error {
    tracing::error!("password hashing error: {}", err);

    Error {
        code: 4,
        message: "password hashing error".into(),
    }
}

pub fn config_error(key: &str) -> Error {
    tracing::error!("invalid configuration value for {}", key);

    Error {
        code: 5,
        message: format!("invalid configuration value for {}", key),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 6,
        message: "unexpected error".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_test() {
        assert_eq!(database_error(()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(invalid_invocation_error().status(), StatusCode::CONFLICT);
        assert_eq!(invalid_input_error().status(), StatusCode::BAD_REQUEST);
        assert_eq!(unauthorized_error().status(), StatusCode::FORBIDDEN);
        assert_eq!(not_found_error().status(), StatusCode::NOT_FOUND);
        assert_eq!(unauthenticated_error().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(insufficient_seats_error().status(), StatusCode::CONFLICT);
        assert_eq!(insufficient_credits_error().status(), StatusCode::CONFLICT);
        assert_eq!(conflict_error().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn row_not_found_maps_to_not_found_test() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code, 103);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.code, 2);
    }

    #[test]
    fn internal_errors_hide_message_test() {
        let response = config_error("DATABASE_URL").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = insufficient_seats_error().into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
