// src/utils/room_code.rs

use rand::Rng;

use crate::config::{ROOM_CODE_LENGTH, ROOM_CODE_MAX_RETRIES};
use crate::error::AppError;

const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Draws one candidate code: uppercase base-36, fixed length.
fn candidate() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Generates a room code that `taken` does not already claim.
///
/// Retries are bounded: after `ROOM_CODE_MAX_RETRIES` collisions the caller
/// gets `CodeGenerationExhausted` instead of looping forever.
pub fn generate<F>(taken: F) -> Result<String, AppError>
where
    F: Fn(&str) -> bool,
{
    for _ in 0..ROOM_CODE_MAX_RETRIES {
        let code = candidate();
        if !taken(&code) {
            return Ok(code);
        }
    }
    Err(AppError::CodeGenerationExhausted)
}
