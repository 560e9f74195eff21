//! Test fixture creation: seeded users and synthetic media payloads
//!
//! Media helpers produce the smallest payloads the content sniffer accepts,
//! so upload tests never need binary files on disk.

use super::constants::*;
use anyhow::{anyhow, Result};
use vidhub_server::store::models::NewUser;
use vidhub_server::store::{SqliteStore, UserStore};
use vidhub_server::user::PasswordCredentials;

/// Seeds the two standard test users and returns their ids as
/// `(uploader_id, viewer_id)`.
pub fn seed_users(store: &SqliteStore) -> Result<(usize, usize)> {
    let uploader_id = seed_user(store, UPLOADER_USER, UPLOADER_EMAIL, UPLOADER_PASS)?;
    let viewer_id = seed_user(store, VIEWER_USER, VIEWER_EMAIL, VIEWER_PASS)?;
    Ok((uploader_id, viewer_id))
}

fn seed_user(store: &SqliteStore, username: &str, email: &str, password: &str) -> Result<usize> {
    let user_id = store
        .create_user(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            fullname: format!("{} Test", username),
            avatar_url: format!("/media/{}-avatar.png", username),
            cover_image_url: None,
        })?
        .ok_or_else(|| anyhow!("user {} already seeded", username))?;
    store.set_password_credentials(&PasswordCredentials::from_plain(user_id, password)?)?;
    Ok(user_id)
}

/// A minimal PNG payload: the 8-byte signature plus an IHDR chunk header.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&[0u8; 13]);
    bytes
}

/// A minimal MP4 payload: `ftyp` with an `isom` brand followed by a
/// `moov`/`mvhd` pair declaring the given duration at a 1000 Hz timescale.
pub fn mp4_bytes(duration_seconds: u32) -> Vec<u8> {
    let mut mvhd_content = Vec::new();
    mvhd_content.extend_from_slice(&[0u8; 4]); // version 0, no flags
    mvhd_content.extend_from_slice(&[0u8; 8]); // creation + modification times
    mvhd_content.extend_from_slice(&1000u32.to_be_bytes());
    mvhd_content.extend_from_slice(&(duration_seconds * 1000).to_be_bytes());
    mvhd_content.extend_from_slice(&[0u8; 80]);

    let mut moov_content = Vec::new();
    moov_content.extend_from_slice(&(8 + mvhd_content.len() as u32).to_be_bytes());
    moov_content.extend_from_slice(b"mvhd");
    moov_content.extend_from_slice(&mvhd_content);

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&16u32.to_be_bytes());
    bytes.extend_from_slice(b"ftyp");
    bytes.extend_from_slice(b"isom");
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(&(8 + moov_content.len() as u32).to_be_bytes());
    bytes.extend_from_slice(b"moov");
    bytes.extend_from_slice(&moov_content);
    bytes
}
