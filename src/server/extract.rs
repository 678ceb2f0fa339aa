use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequest, RequestParts},
    http::{header::AUTHORIZATION, HeaderMap},
};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::error::{unauthenticated_error, unexpected_error, Error};

/// Session token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<Uuid, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(unauthenticated_error)?
        .to_str()
        .map_err(|_| unauthenticated_error())?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(unauthenticated_error)?;

    Uuid::parse_str(token.trim()).map_err(|_| unauthenticated_error())
}

#[async_trait]
impl<B> FromRequest<B> for User
where
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let token = bearer_token(req.headers())?;

        let Extension(api) = Extension::<DynAPI>::from_request(req)
            .await
            .map_err(|_| unexpected_error())?;

        api.authenticate(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_test() {
        let token = Uuid::new_v4();

        assert_eq!(bearer_token(&headers(&format!("Bearer {}", token))).unwrap(), token);
        assert_eq!(bearer_token(&headers(&format!("Basic {}", token))).unwrap_err().code, 104);
        assert_eq!(bearer_token(&headers("Bearer not-a-uuid")).unwrap_err().code, 104);
        assert_eq!(bearer_token(&HeaderMap::new()).unwrap_err().code, 104);
    }

    #[test]
    fn missing_token_is_rejected_before_lookup_test() {
        let mut parts = RequestParts::new(Request::builder().body(()).unwrap());

        let result = tokio_test::block_on(User::from_request(&mut parts));

        assert_eq!(result.unwrap_err().code, 104);
    }
}
