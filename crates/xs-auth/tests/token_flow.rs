use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use xs_auth::{
    AuthError, Claims, Decision, KeyStore, Role, TokenIssuer, TokenSubject, TokenVerifier,
    authorize, ensure_role,
};

const K1: &str = include_str!("fixtures/k1_pkcs1.pem");
const K2: &str = include_str!("fixtures/k2_pkcs8.pem");

fn store_with(entries: &[(&str, &str)]) -> Arc<KeyStore> {
    let mut keys = KeyStore::new();
    for (kid, pem) in entries {
        keys.load(kid, pem.as_bytes()).unwrap();
    }
    Arc::new(keys)
}

/// Signs `claims` with k1 under kid "k1", bypassing the issuer's fixed policy.
fn sign_k1(claims: &Claims, algorithm: Algorithm) -> String {
    let mut header = Header::new(algorithm);
    header.kid = Some("k1".to_string());
    encode(&header, claims, &EncodingKey::from_rsa_pem(K1.as_bytes()).unwrap()).unwrap()
}

fn foreign_issuer_claims(issued: DateTime<Utc>) -> Claims {
    let mut claims = Claims::new(TokenSubject::new(7, Role::Admin), issued);
    claims.iss = "someone-else".to_string();
    claims
}

/// Replaces one character in the middle of the signature segment with a
/// different valid base64url character.
fn tamper_signature(token: &str) -> String {
    let (signed, signature) = token.rsplit_once('.').unwrap();
    let mut sig: Vec<char> = signature.chars().collect();
    let mid = sig.len() / 2;
    sig[mid] = if sig[mid] == 'A' { 'B' } else { 'A' };
    format!("{}.{}", signed, sig.into_iter().collect::<String>())
}

#[test]
fn test_issue_verify_round_trip() {
    let keys = store_with(&[("k1", K1)]);
    let issuer = TokenIssuer::new(keys.clone());
    let verifier = TokenVerifier::new(keys);

    let token = issuer
        .issue("k1", TokenSubject::new(7, Role::Admin))
        .unwrap();
    let claims = verifier.verify(&token).unwrap();

    assert_eq!(claims.subject(), TokenSubject::new(7, Role::Admin));
    assert_eq!(claims.iss, "xs-website");
    assert_eq!(claims.sub, "7");
}

#[test]
fn test_tampered_signature_is_rejected() {
    let keys = store_with(&[("k1", K1)]);
    let token = TokenIssuer::new(keys.clone())
        .issue("k1", TokenSubject::new(7, Role::Admin))
        .unwrap();

    let err = TokenVerifier::new(keys)
        .verify(&tamper_signature(&token))
        .unwrap_err();
    assert_eq!(err, AuthError::BadSignature);
}

#[test]
fn test_token_from_unknown_kid_is_rejected() {
    let token = TokenIssuer::new(store_with(&[("k1", K1)]))
        .issue("k1", TokenSubject::new(3, Role::Employee))
        .unwrap();

    let err = TokenVerifier::new(store_with(&[("k2", K2)]))
        .verify(&token)
        .unwrap_err();
    assert_eq!(err, AuthError::UnknownKey("k1".to_string()));
}

#[test]
fn test_same_kid_different_key_is_bad_signature() {
    let token = TokenIssuer::new(store_with(&[("k1", K1)]))
        .issue("k1", TokenSubject::new(3, Role::Employee))
        .unwrap();

    let err = TokenVerifier::new(store_with(&[("k1", K2)]))
        .verify(&token)
        .unwrap_err();
    assert_eq!(err, AuthError::BadSignature);
}

#[test]
fn test_expired_token_is_rejected() {
    let keys = store_with(&[("k1", K1)]);
    let two_years_ago = Utc::now() - Duration::days(730);
    let token = TokenIssuer::new(keys.clone())
        .issue_at("k1", TokenSubject::new(7, Role::Admin), two_years_ago)
        .unwrap();

    let err = TokenVerifier::new(keys).verify(&token).unwrap_err();
    assert_eq!(err, AuthError::Expired);
}

#[test]
fn test_validity_window_is_one_year() {
    let keys = store_with(&[("k1", K1)]);
    let issued = Utc::now();
    let token = TokenIssuer::new(keys.clone())
        .issue_at("k1", TokenSubject::new(7, Role::Admin), issued)
        .unwrap();
    let verifier = TokenVerifier::new(keys);

    assert!(verifier.verify_at(&token, issued + Duration::hours(8759)).is_ok());
    assert_eq!(
        verifier.verify_at(&token, issued + Duration::hours(8760)),
        Err(AuthError::Expired)
    );
}

#[test]
fn test_future_token_is_not_yet_valid() {
    let keys = store_with(&[("k1", K1)]);
    let tomorrow = Utc::now() + Duration::days(1);
    let token = TokenIssuer::new(keys.clone())
        .issue_at("k1", TokenSubject::new(7, Role::Admin), tomorrow)
        .unwrap();

    let err = TokenVerifier::new(keys).verify(&token).unwrap_err();
    assert_eq!(err, AuthError::NotYetValid);
}

#[test]
fn test_garbage_token_is_malformed() {
    let verifier = TokenVerifier::new(store_with(&[("k1", K1)]));
    for token in ["", "abc", "a.b.c", "not.a.token.at.all"] {
        let err = verifier.verify(token).unwrap_err();
        assert!(
            matches!(err, AuthError::MalformedToken(_)),
            "{token:?} gave {err:?}"
        );
    }
}

#[test]
fn test_zero_user_id_cannot_be_issued() {
    let err = TokenIssuer::new(store_with(&[("k1", K1)]))
        .issue("k1", TokenSubject::new(0, Role::Admin))
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidSubject);
}

#[test]
fn test_verified_claims_feed_the_role_gate() {
    let keys = store_with(&[("k1", K1)]);
    let issuer = TokenIssuer::new(keys.clone());
    let verifier = TokenVerifier::new(keys);

    let employee = verifier
        .verify(&issuer.issue("k1", TokenSubject::new(2, Role::Employee)).unwrap())
        .unwrap();
    let admin = verifier
        .verify(&issuer.issue("k1", TokenSubject::new(1, Role::Admin)).unwrap())
        .unwrap();

    assert_eq!(authorize(&employee, Role::Admin), Decision::Deny);
    assert_eq!(authorize(&admin, Role::Employee), Decision::Deny);
    assert_eq!(authorize(&admin, Role::Admin), Decision::Allow);
    assert_eq!(ensure_role(&employee, Role::Admin), Err(AuthError::Forbidden));
}

#[test]
fn test_multiple_keys_coexist() {
    let keys = store_with(&[("k1", K1), ("k2", K2)]);
    let issuer = TokenIssuer::new(keys.clone());
    let verifier = TokenVerifier::new(keys);

    for kid in ["k1", "k2"] {
        let token = issuer.issue(kid, TokenSubject::new(5, Role::Employee)).unwrap();
        assert_eq!(
            jsonwebtoken::decode_header(&token).unwrap().kid.as_deref(),
            Some(kid)
        );
        assert_eq!(verifier.verify(&token).unwrap().user_id, 5);
    }
}

#[test]
fn test_foreign_issuer_is_rejected() {
    let token = sign_k1(&foreign_issuer_claims(Utc::now()), Algorithm::RS256);

    let err = TokenVerifier::new(store_with(&[("k1", K1)]))
        .verify(&token)
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidClaim("iss"));
}

#[test]
fn test_expiry_is_reported_before_issuer() {
    let issued = Utc::now() - Duration::days(800);
    let token = sign_k1(&foreign_issuer_claims(issued), Algorithm::RS256);

    let err = TokenVerifier::new(store_with(&[("k1", K1)]))
        .verify(&token)
        .unwrap_err();
    assert_eq!(err, AuthError::Expired);
}

#[test]
fn test_algorithm_is_pinned_to_the_key() {
    let verifier = TokenVerifier::new(store_with(&[("k1", K1)]));
    let claims = Claims::new(TokenSubject::new(7, Role::Admin), Utc::now());

    // same key, different RSA digest
    let rs384 = sign_k1(&claims, Algorithm::RS384);
    assert_eq!(verifier.verify(&rs384).unwrap_err(), AuthError::BadSignature);

    // HMAC keyed with public material must never be accepted for an RSA key
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some("k1".to_string());
    let hs256 = encode(&header, &claims, &EncodingKey::from_secret(K1.as_bytes())).unwrap();
    assert_eq!(verifier.verify(&hs256).unwrap_err(), AuthError::BadSignature);
}
