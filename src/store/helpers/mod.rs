use anyhow::{anyhow, Error};
use rand::Rng;
use uuid::Uuid;

use crate::models::Page;

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_SUFFIX_LEN: usize = 8;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// `{appointment_id}-{8 random base36 chars}`. Not a security token.
pub fn confirmation_token(appointment_id: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..TOKEN_SUFFIX_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect();
    format!("{appointment_id}-{suffix}")
}

/// 1-based page slicing; page 0 is treated as page 1.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let total = items.len();
    let start = page.max(1).saturating_sub(1).saturating_mul(limit);
    let data = items.into_iter().skip(start).take(limit).collect();
    Page { data, total }
}

pub fn not_found(kind: &str, id: &str) -> Error {
    anyhow!("{kind} {id} not found")
}
