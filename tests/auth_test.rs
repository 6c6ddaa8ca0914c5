//! Integration test for JWT auth validation.
//!
//! This test mints a JWT locally using the same HS256 secret that the server
//! would use, then validates it through the `validate_token` function.
//! No running server or database is needed.
//!
//! Run with: `cargo test --test auth_test`
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use gig_agenda::auth::jwt::{Claims, validate_token};

/// A fake secret for testing; never use the real one in tests committed to git.
const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

fn claims_for(sub: &str, exp_offset: i64) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub: sub.to_string(),
        exp: (now + exp_offset) as usize,
        iat: Some(now as usize),
        email: Some("band@example.com".to_string()),
        name: Some("Mariachi Sol".to_string()),
    }
}

/// Helper: mint a JWT signed with HS256 using the test secret.
fn mint(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

#[test]
fn test_valid_token_decodes_correctly() {
    let user_id = Uuid::new_v4();
    let token = mint(&claims_for(&user_id.to_string(), 3600), TEST_SECRET);

    let claims = validate_token(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.actor(), "Mariachi Sol");
}

#[test]
fn test_expired_token_is_rejected() {
    // expired 5 minutes ago (well past the 60s default leeway)
    let token = mint(&claims_for(&Uuid::new_v4().to_string(), -300), TEST_SECRET);

    let result = validate_token(&token, TEST_SECRET);
    assert!(result.unwrap_err().contains("ExpiredSignature"));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let token = mint(&claims_for(&Uuid::new_v4().to_string(), 3600), TEST_SECRET);

    let result = validate_token(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx");
    assert!(result.unwrap_err().contains("InvalidSignature"));
}

#[test]
fn test_garbage_token_is_rejected() {
    let result = validate_token("not.a.valid.jwt", TEST_SECRET);
    assert!(result.is_err());
}

#[test]
fn test_actor_falls_back_to_email_then_subject() {
    let mut claims = claims_for("not-a-uuid", 3600);
    claims.name = None;
    assert_eq!(claims.actor(), "band@example.com");

    claims.email = None;
    assert_eq!(claims.actor(), "not-a-uuid");
    assert!(claims.user_id().is_err());
}
