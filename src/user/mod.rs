pub mod auth;

pub use auth::{
    AuthToken, AuthTokenValue, PasswordCredentials, VidHubHasher, ACCESS_TOKEN_TTL_SECS,
    REFRESH_TOKEN_TTL_SECS,
};
