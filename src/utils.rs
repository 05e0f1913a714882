use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{Rng, RngCore};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::constants::{
    ACCOUNT_NAME_MAX_LENGTH, ACCOUNT_NAME_MIN_LENGTH, ACCOUNT_NUMBER_MAX, ACCOUNT_NUMBER_MIN,
    AMOUNT_SCALE, SALT_LENGTH,
};

pub fn validate_account_name(name: &str) -> bool {
    let length = name.chars().count();
    if !(ACCOUNT_NAME_MIN_LENGTH..=ACCOUNT_NAME_MAX_LENGTH).contains(&length) {
        return false;
    }
    if name.starts_with(char::is_whitespace) {
        return false;
    }
    !name.contains("  ")
}

pub fn validate_owner_id(owner_id: i32) -> bool {
    owner_id > 0
}

/// Draws a candidate account number. Callers retry on collision.
pub fn generate_account_number() -> i32 {
    rand::thread_rng().gen_range(ACCOUNT_NUMBER_MIN..ACCOUNT_NUMBER_MAX)
}

/// Positive and representable in the two-decimal money columns.
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount.normalize().scale() <= AMOUNT_SCALE
}

pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

pub fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

pub fn is_password_valid(password: &str, salt: &[u8], hash: &str) -> bool {
    hash_password(password, salt) == hash
}
