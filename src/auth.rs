use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    config::AppConfig,
    error::{AuthzError, Resource},
    models::Actor,
    repository::Repository,
};

/// Claims
///
/// The JWT payload issued by the identity provider and validated on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the external identity id. Profiles reference it as `user_id`.
    pub sub: Uuid,
    /// Expiration Time (exp): tokens past this timestamp are rejected.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Principal
///
/// An authenticated external identity, before it has been mapped to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
}

/// authenticate
///
/// Validates an `Authorization` header value (`Bearer <jwt>`) against the
/// configured secret. Missing header, wrong scheme, bad signature and expired
/// tokens all come back as `Unauthenticated`.
pub fn authenticate(config: &AppConfig, header: Option<&str>) -> Result<Principal, AuthzError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthzError::Unauthenticated)?;

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(Principal {
            user_id: data.claims.sub,
        }),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                other => tracing::debug!("rejected token: {:?}", other),
            }
            Err(AuthzError::Unauthenticated)
        }
    }
}

/// resolve_actor
///
/// Maps a principal to its profile. An identity that was never provisioned a
/// profile yields `NotFound` for the profile keyed by the identity id.
pub async fn resolve_actor(
    repo: &dyn Repository,
    principal: &Principal,
) -> Result<Actor, AuthzError> {
    repo.find_profile_by_user(principal.user_id)
        .await?
        .ok_or(AuthzError::not_found(Resource::Profile, principal.user_id))
}

/// Both steps: header → principal → actor.
pub async fn authorize_request(
    state: &AppState,
    header: Option<&str>,
) -> Result<Actor, AuthzError> {
    let principal = authenticate(&state.config, header)?;
    resolve_actor(state.repo.as_ref(), &principal).await
}
