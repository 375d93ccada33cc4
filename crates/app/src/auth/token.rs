//! Bearer API tokens.
//!
//! A token reads `sf_v1_<token uuid, simple>.<64 hex secret>`. Only a
//! SHA-256 verifier of the token bound to its owner is ever stored.

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use crate::auth::UserUuid;

/// API token identifier prefix.
pub const API_TOKEN_PREFIX: &str = "sf";

/// Number of secret bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiTokenError {
    #[error("api token format is invalid")]
    InvalidFormat,

    #[error("api token uses an unsupported version")]
    UnsupportedVersion,

    #[error("api token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTokenVersion {
    V1,
}

impl ApiTokenVersion {
    /// Stored column value.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl TryFrom<i16> for ApiTokenVersion {
    type Error = ApiTokenError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

/// A parsed or freshly generated bearer token.
///
/// The secret half is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct ApiToken {
    pub uuid: Uuid,
    pub version: ApiTokenVersion,
    secret: [u8; API_TOKEN_SECRET_BYTES],
}

impl ApiToken {
    /// A new v1 token with a random secret.
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

        OsRng.fill_bytes(&mut secret);

        Self {
            uuid: Uuid::now_v7(),
            version: ApiTokenVersion::V1,
            secret,
        }
    }

    /// Hex SHA-256 of `{token}:{version}:{owner}:{secret}`, binding the
    /// secret to the user it was issued for.
    #[must_use]
    pub fn verifier(&self, owner: UserUuid) -> String {
        let input = Zeroizing::new(format!(
            "{}:{}:{}:{}",
            self.uuid.simple(),
            self.version.as_i16(),
            owner.into_uuid().simple(),
            *self.secret_hex(),
        ));

        format!("{:x}", Sha256::digest(input.as_bytes()))
    }

    fn secret_hex(&self) -> Zeroizing<String> {
        let mut hex = Zeroizing::new(String::with_capacity(API_TOKEN_SECRET_BYTES * 2));

        for byte in &self.secret {
            hex.push_str(&format!("{byte:02x}"));
        }

        hex
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("uuid", &self.uuid)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{API_TOKEN_PREFIX}_{}_{}.{}",
            self.version.segment(),
            self.uuid.simple(),
            *self.secret_hex()
        )
    }
}

impl FromStr for ApiToken {
    type Err = ApiTokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (head, secret_hex) = token.split_once('.').ok_or(ApiTokenError::InvalidFormat)?;

        let Some((API_TOKEN_PREFIX, rest)) = head.split_once('_') else {
            return Err(ApiTokenError::InvalidFormat);
        };

        let (version, uuid) = rest.split_once('_').ok_or(ApiTokenError::InvalidFormat)?;

        let version = match version {
            "v1" => ApiTokenVersion::V1,
            _ => return Err(ApiTokenError::UnsupportedVersion),
        };

        let uuid = Uuid::try_parse(uuid).map_err(|_invalid| ApiTokenError::InvalidFormat)?;

        Ok(Self {
            uuid,
            version,
            secret: decode_secret(secret_hex)?,
        })
    }
}

impl Drop for ApiToken {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

fn decode_secret(hex: &str) -> Result<[u8; API_TOKEN_SECRET_BYTES], ApiTokenError> {
    if hex.len() != API_TOKEN_SECRET_BYTES * 2 || !hex.is_ascii() {
        return Err(ApiTokenError::InvalidSecretEncoding);
    }

    let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

    for (byte, pair) in secret.iter_mut().zip(hex.as_bytes().chunks_exact(2)) {
        let pair = std::str::from_utf8(pair).map_err(|_utf8| ApiTokenError::InvalidSecretEncoding)?;

        *byte = u8::from_str_radix(pair, 16).map_err(|_digit| ApiTokenError::InvalidSecretEncoding)?;
    }

    Ok(secret)
}

/// Compare a computed verifier against the stored one without short-circuiting.
#[must_use]
pub fn verifiers_match(computed: &str, stored: &str) -> bool {
    let (computed, stored) = (computed.as_bytes(), stored.as_bytes());

    computed.len() == stored.len()
        && computed
            .iter()
            .zip(stored)
            .fold(0_u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}
