// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! HS256 bearer token verification.

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::Sha256;
use std::env;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Configuration for bearer token verification.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY must be set")?,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("unsupported token algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Claims carried by a verified token.
pub type Claims = Map<String, Value>;

/// Verifies tokens signed with a shared secret.
pub struct TokenVerifier {
    secret: Vec<u8>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.as_bytes().to_vec(),
        }
    }

    /// Check signature, algorithm and `exp`, returning the payload claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
        self.mac(signing_input)
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_json(payload_b64)?;
        let now = chrono::Utc::now().timestamp() as f64;
        if let Some(exp) = numeric_claim(&claims, "exp")? {
            if exp <= now {
                return Err(TokenError::Expired);
            }
        }
        if let Some(nbf) = numeric_claim(&claims, "nbf")? {
            if nbf > now {
                return Err(TokenError::NotYetValid);
            }
        }

        Ok(claims)
    }

    /// Issue an HS256 token for `claims`.
    pub fn sign(&self, claims: &Claims) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(Value::Object(claims.clone()).to_string());
        let signing_input = format!("{header}.{payload}");
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&signing_input).finalize().into_bytes());
        format!("{signing_input}.{signature}")
    }

    fn mac(&self, signing_input: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length");
        mac.update(signing_input.as_bytes());
        mac
    }
}

/// A registered time claim as seconds since the epoch, integer or not.
fn numeric_claim(claims: &Claims, name: &str) -> Result<Option<f64>, TokenError> {
    claims
        .get(name)
        .map(|value| value.as_f64().ok_or(TokenError::Malformed))
        .transpose()
}

fn decode_json<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn verifier(secret: &str) -> TokenVerifier {
        TokenVerifier::new(&AuthConfig {
            jwt_secret: secret.to_string(),
        })
    }

    fn claims(value: Value) -> Claims {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_sign_then_verify() {
        let verifier = verifier("secret");
        let token = verifier.sign(&claims(json!({"sub": "user-1"})));

        let verified = verifier.verify(&token).unwrap();
        assert_eq!(verified["sub"], "user-1");
    }

    #[test]
    fn test_verifies_externally_issued_token() {
        // {"alg":"HS256","typ":"JWT"} / {"sub":"1234567890","name":"John Doe","iat":1516239022}
        // signed with "your-256-bit-secret"
        let token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
                     eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.\
                     SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

        let verified = verifier("your-256-bit-secret").verify(token).unwrap();
        assert_eq!(verified["name"], "John Doe");
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let token = verifier("secret").sign(&claims(json!({"sub": "user-1"})));
        assert_eq!(
            verifier("other").verify(&token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_rejects_tampered_payload() {
        let verifier = verifier("secret");
        let token = verifier.sign(&claims(json!({"role": "user"})));
        let forged_payload = URL_SAFE_NO_PAD.encode(br#"{"role":"admin"}"#);
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(verifier.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_rejects_expired_token() {
        let verifier = verifier("secret");
        let past = chrono::Utc::now().timestamp() - 60;
        let token = verifier.sign(&claims(json!({"sub": "user-1", "exp": past})));

        assert_eq!(verifier.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_accepts_unexpired_token() {
        let verifier = verifier("secret");
        let future = chrono::Utc::now().timestamp() + 3600;
        let token = verifier.sign(&claims(json!({"exp": future})));

        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn test_accepts_fractional_exp() {
        let verifier = verifier("secret");
        let future = chrono::Utc::now().timestamp() as f64 + 3600.5;
        let token = verifier.sign(&claims(json!({"exp": future})));

        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn test_rejects_fractional_exp_in_the_past() {
        let verifier = verifier("secret");
        let past = chrono::Utc::now().timestamp() as f64 - 60.5;
        let token = verifier.sign(&claims(json!({"exp": past})));

        assert_eq!(verifier.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_rejects_token_before_nbf() {
        let verifier = verifier("secret");
        let later = chrono::Utc::now().timestamp() + 3600;
        let token = verifier.sign(&claims(json!({"sub": "user-1", "nbf": later})));

        assert_eq!(verifier.verify(&token), Err(TokenError::NotYetValid));
    }

    #[test]
    fn test_accepts_token_after_nbf() {
        let verifier = verifier("secret");
        let earlier = chrono::Utc::now().timestamp() - 60;
        let token = verifier.sign(&claims(json!({"nbf": earlier})));

        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn test_rejects_non_numeric_time_claims() {
        let verifier = verifier("secret");
        let token = verifier.sign(&claims(json!({"exp": "tomorrow"})));
        assert_eq!(verifier.verify(&token), Err(TokenError::Malformed));

        let token = verifier.sign(&claims(json!({"nbf": null})));
        assert_eq!(verifier.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_rejects_other_algorithms() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"user-1"}"#);
        let token = format!("{header}.{payload}.");

        assert_eq!(
            verifier("secret").verify(&token),
            Err(TokenError::UnsupportedAlgorithm("none".to_string()))
        );
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        let verifier = verifier("secret");
        assert_eq!(verifier.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(verifier.verify("a.b.c.d"), Err(TokenError::Malformed));
        assert_eq!(verifier.verify("!!.??.##"), Err(TokenError::Malformed));
    }
}
