// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Questions sampled into every room at creation.
pub const ROOM_QUESTION_COUNT: usize = 10;

/// Length of a generated room code.
pub const ROOM_CODE_LENGTH: usize = 6;

/// Generation attempts before giving up with `CodeGenerationExhausted`.
pub const ROOM_CODE_MAX_RETRIES: usize = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub question_bank_path: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let question_bank_path = env::var("QUESTION_BANK_PATH")
            .unwrap_or_else(|_| "data/question_bank.json".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            question_bank_path,
            rust_log,
        }
    }
}
