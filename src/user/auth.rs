//! Authentication primitives: password hashing and opaque session tokens.

use anyhow::{bail, Result};

use rand::Rng;
use rand_distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use std::str::FromStr;

/// Access tokens are short-lived; a fresh pair is minted via the refresh flow.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60 * 24;
/// Refresh tokens are longer-lived and single-slot per user.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 10;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct AuthTokenValue(pub String);

impl AuthTokenValue {
    pub fn generate() -> AuthTokenValue {
        let rng = rand::rng();
        let random_string: String = rng
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        AuthTokenValue(random_string)
    }
}

/// A stored access token row.
#[derive(Clone, Debug)]
pub struct AuthToken {
    pub user_id: usize,
    pub value: AuthTokenValue,
    pub created: i64,
    pub expires: i64,
}

mod vidhub_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let argon2 = Argon2::default();
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        let hash_string = argon2
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let argon2 = Argon2::default();
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2.verify_password(plain_pw, &password_hash).is_ok())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum VidHubHasher {
    Argon2,
    /// Test-only hasher that skips key stretching entirely.
    #[cfg(feature = "test-fast-hasher")]
    FastInsecure,
}

impl VidHubHasher {
    /// The hasher used for newly created credentials.
    pub fn default_hasher() -> Self {
        #[cfg(feature = "test-fast-hasher")]
        return VidHubHasher::FastInsecure;
        #[cfg(not(feature = "test-fast-hasher"))]
        VidHubHasher::Argon2
    }

    pub fn generate_b64_salt(&self) -> String {
        vidhub_argon2::generate_b64_salt()
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            VidHubHasher::Argon2 => vidhub_argon2::hash(plain, b64_salt),
            #[cfg(feature = "test-fast-hasher")]
            VidHubHasher::FastInsecure => Ok(format!(
                "fast${}${}",
                b64_salt.as_ref(),
                String::from_utf8_lossy(plain)
            )),
        }
    }

    pub fn verify<T: AsRef<str>>(&self, plain_pw: T, target_hash: T, salt: T) -> Result<bool> {
        match self {
            VidHubHasher::Argon2 => {
                vidhub_argon2::verify(plain_pw.as_ref().as_bytes(), target_hash)
            }
            #[cfg(feature = "test-fast-hasher")]
            VidHubHasher::FastInsecure => Ok(self
                .hash(plain_pw.as_ref().as_bytes(), salt)
                .map(|h| h == target_hash.as_ref())
                .unwrap_or(false)),
        }
    }
}

impl FromStr for VidHubHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(VidHubHasher::Argon2),
            #[cfg(feature = "test-fast-hasher")]
            "fast-insecure" => Ok(VidHubHasher::FastInsecure),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl std::fmt::Display for VidHubHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VidHubHasher::Argon2 => write!(f, "argon2"),
            #[cfg(feature = "test-fast-hasher")]
            VidHubHasher::FastInsecure => write!(f, "fast-insecure"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PasswordCredentials {
    pub user_id: usize,
    pub salt: String,
    pub hash: String,
    pub hasher: VidHubHasher,
    pub created: i64,
}

impl PasswordCredentials {
    pub fn from_plain(user_id: usize, password: &str) -> Result<Self> {
        let hasher = VidHubHasher::default_hasher();
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(PasswordCredentials {
            user_id,
            salt,
            hash,
            hasher,
            created: chrono::Utc::now().timestamp(),
        })
    }

    pub fn verify(&self, password: &str) -> bool {
        self.hasher
            .verify(password, self.hash.as_str(), self.salt.as_str())
            .unwrap_or(false)
    }
}
