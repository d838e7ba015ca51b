mod common;

use chrono::{Duration, Utc};
use course_acl::{
    AuthzError, handlers,
    auth::{Claims, Principal, authenticate, authorize_request, resolve_actor},
    config::AppConfig,
    error::Resource,
    models::{CreateProfileRequest, Role, UpdateProfileRequest},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

// --- Token Helpers ---

fn token(secret: &str, sub: Uuid, expires_in: Duration) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub,
        exp: (now + expires_in).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encodes")
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

// --- authenticate ---

#[test]
fn test_valid_token_yields_principal() {
    let config = AppConfig::default();
    let user = Uuid::new_v4();
    let header = bearer(&token(&config.jwt_secret, user, Duration::hours(1)));

    let principal = authenticate(&config, Some(&header)).expect("valid token");
    assert_eq!(principal, Principal { user_id: user });
}

#[test]
fn test_expired_token_is_unauthenticated() {
    let config = AppConfig::default();
    let header = bearer(&token(&config.jwt_secret, Uuid::new_v4(), Duration::hours(-2)));

    assert!(matches!(
        authenticate(&config, Some(&header)),
        Err(AuthzError::Unauthenticated)
    ));
}

#[test]
fn test_foreign_signature_is_unauthenticated() {
    let config = AppConfig::default();
    let header = bearer(&token("some-other-secret", Uuid::new_v4(), Duration::hours(1)));

    assert!(matches!(
        authenticate(&config, Some(&header)),
        Err(AuthzError::Unauthenticated)
    ));
}

#[test]
fn test_missing_or_malformed_header_is_unauthenticated() {
    let config = AppConfig::default();
    let raw = token(&config.jwt_secret, Uuid::new_v4(), Duration::hours(1));

    for header in [None, Some(raw.as_str()), Some("Bearer not-a-jwt"), Some("")] {
        assert!(
            matches!(authenticate(&config, header), Err(AuthzError::Unauthenticated)),
            "header {header:?} should be rejected"
        );
    }
}

// --- resolve_actor / authorize_request ---

#[tokio::test]
async fn test_request_resolves_to_profile() {
    let state = common::state();
    let student = common::profile(&state, Role::Student).await;
    let header = bearer(&token(&state.config.jwt_secret, student.user_id, Duration::hours(1)));

    let actor = authorize_request(&state, Some(&header)).await.unwrap();
    assert_eq!(actor, student);
    assert!(actor.is_student());
}

#[tokio::test]
async fn test_identity_without_profile_is_not_found() {
    let state = common::state();
    let principal = Principal {
        user_id: Uuid::new_v4(),
    };

    match resolve_actor(state.repo.as_ref(), &principal).await {
        Err(AuthzError::NotFound { resource, id }) => {
            assert_eq!(resource, Resource::Profile);
            assert_eq!(id, principal.user_id);
        }
        other => panic!("expected profile NotFound, got {other:?}"),
    }
}

// --- Profile provisioning ---

#[tokio::test]
async fn test_profile_provisioning_is_self_only() {
    let state = common::state();
    let principal = Principal {
        user_id: Uuid::new_v4(),
    };

    let someone_else = handlers::create_profile(
        &state,
        &principal,
        CreateProfileRequest {
            user: Uuid::new_v4(),
            role: Role::Teacher,
        },
    )
    .await;
    assert!(matches!(
        someone_else,
        Err(AuthzError::Denied {
            resource: Resource::Profile,
            ..
        })
    ));

    let own = CreateProfileRequest {
        user: principal.user_id,
        role: Role::Teacher,
    };
    let profile = handlers::create_profile(&state, &principal, own.clone())
        .await
        .unwrap();
    assert_eq!(profile.user_id, principal.user_id);
    assert_eq!(resolve_actor(state.repo.as_ref(), &principal).await.unwrap(), profile);

    // One profile per identity.
    assert!(matches!(
        handlers::create_profile(&state, &principal, own).await,
        Err(AuthzError::Conflict {
            resource: Resource::Profile,
            ..
        })
    ));
}

#[tokio::test]
async fn test_profile_changes_are_owner_only() {
    let state = common::state();
    let owner = common::profile(&state, Role::Student).await;
    let other = common::profile(&state, Role::Teacher).await;

    let switch = || UpdateProfileRequest {
        role: Some(Role::Teacher),
    };
    assert!(matches!(
        handlers::update_profile(&state, &other, owner.id, switch()).await,
        Err(AuthzError::Denied { .. })
    ));

    let updated = handlers::update_profile(&state, &owner, owner.id, switch())
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Teacher);

    handlers::delete_profile(&state, &owner, owner.id).await.unwrap();
    assert_eq!(handlers::list_profiles(&state, &other).await.unwrap(), vec![other.clone()]);
}
