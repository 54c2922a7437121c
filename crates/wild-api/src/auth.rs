//! Authentication: Argon2id password hashes and JWT bearer tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ACCESS: &str = "access";
pub const REFRESH: &str = "refresh";

/// JWT claims embedded in both token kinds.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (profile ID)
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    /// `access` or `refresh`
    pub token_type: String,
}

impl Claims {
    pub fn profile_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Token pair returned on login/register/refresh.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn generate_token(
    profile_id: i64,
    username: &str,
    secret: &str,
    ttl_secs: u64,
    token_type: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: profile_id.to_string(),
        username: username.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_token_pair(
    profile_id: i64,
    username: &str,
    secret: &str,
    access_ttl: u64,
    refresh_ttl: u64,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    Ok(TokenPair {
        access_token: generate_token(profile_id, username, secret, access_ttl, ACCESS)?,
        refresh_token: generate_token(profile_id, username, secret, refresh_ttl, REFRESH)?,
        expires_in: access_ttl,
        token_type: "Bearer".to_string(),
    })
}

/// Validate signature and expiry, then decode.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
