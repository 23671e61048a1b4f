use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{AppError, AppResult};

const VERSION_PREFIX: &str = "v1:";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 120_000;

/// Derives a salted PBKDF2-SHA256 hash and encodes it as
/// `v1:base64(salt || key)`.
pub fn hash_password(password: &str) -> AppResult<String> {
    if password.is_empty() {
        return Err(AppError::validation("密码不能为空"));
    }

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let key = derive_key(password.as_bytes(), &salt);

    let mut payload = Vec::with_capacity(SALT_LEN + KEY_LEN);
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&key);

    Ok(format!("{VERSION_PREFIX}{}", Base64.encode(payload)))
}

pub fn verify_password(password: &str, encoded: &str) -> AppResult<bool> {
    let encoded = encoded
        .strip_prefix(VERSION_PREFIX)
        .ok_or_else(|| AppError::other("凭据格式不受支持"))?;

    let payload = Base64
        .decode(encoded)
        .map_err(|_| AppError::other("凭据编码无效"))?;

    if payload.len() != SALT_LEN + KEY_LEN {
        return Err(AppError::other("凭据长度无效"));
    }

    let (salt, expected) = payload.split_at(SALT_LEN);
    let candidate = derive_key(password.as_bytes(), salt);

    // Fixed-time comparison over the derived key.
    let mut diff = 0u8;
    for (a, b) in candidate.iter().zip(expected.iter()) {
        diff |= a ^ b;
    }

    Ok(diff == 0)
}

fn derive_key(password: &[u8], salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut key);
    key
}
