//! Card and account number generation

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Mutex;
use uuid::Uuid;

use crate::core::card::IssuedNumbers;

/// Issuer prefix shared by every card number this service generates
pub const CARD_SCHEME_PREFIX: &str = "777777";

/// Total length of a generated card number, check digit included
pub const CARD_NUMBER_LEN: usize = 16;

/// Length of a generated ledger account number
pub const ACCOUNT_NUMBER_LEN: usize = 20;

const CARD_RANDOM_DIGITS: u32 = 9;

/// Source of server-generated identifiers
///
/// Collisions are possible and are left to the caller's retry loop.
pub trait NumberGenerator: Send + Sync {
    /// A 16-digit, Luhn-valid card number
    fn card_number(&self) -> String;

    /// A 20-digit account number with no checksum
    fn account_number(&self) -> String;

    /// A fresh card or account identifier
    fn identifier(&self) -> Uuid;

    /// Everything one insertion attempt needs
    fn issue(&self) -> IssuedNumbers {
        IssuedNumbers {
            card_id: self.identifier(),
            account_id: self.identifier(),
            card_number: self.card_number(),
            account_number: self.account_number(),
        }
    }
}

/// Compute the Luhn check digit for `digits`.
///
/// Returns `None` if `digits` contains anything other than ASCII digits.
pub fn luhn_check_digit(digits: &str) -> Option<u8> {
    let mut sum = 0u32;
    // The check digit will sit to the right, so the rightmost payload
    // digit is the first one doubled.
    for (position, ch) in digits.chars().rev().enumerate() {
        let mut digit = ch.to_digit(10)?;
        if position % 2 == 0 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    Some(((10 - sum % 10) % 10) as u8)
}

/// Check that the last digit of `number` is the Luhn digit of the rest.
pub fn is_luhn_valid(number: &str) -> bool {
    if !number.is_ascii() {
        return false;
    }
    let Some((payload, check)) = number.len().checked_sub(1).map(|i| number.split_at(i)) else {
        return false;
    };
    match (luhn_check_digit(payload), check.chars().next().and_then(|c| c.to_digit(10))) {
        (Some(expected), Some(actual)) => u32::from(expected) == actual,
        _ => false,
    }
}

/// Number generator backed by a seedable RNG
pub struct RandomNumberGenerator {
    rng: Mutex<StdRng>,
}

impl RandomNumberGenerator {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator, mainly for tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A poisoned lock still holds a perfectly usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberGenerator for RandomNumberGenerator {
    fn card_number(&self) -> String {
        let random = self.with_rng(|rng| rng.gen_range(0..10u32.pow(CARD_RANDOM_DIGITS)));
        let mut number = format!(
            "{}{:0width$}",
            CARD_SCHEME_PREFIX,
            random,
            width = CARD_RANDOM_DIGITS as usize
        );
        // Always Some: the payload is built from digits only.
        let check = luhn_check_digit(&number).unwrap_or_default();
        number.push(char::from(b'0' + check));
        number
    }

    fn account_number(&self) -> String {
        self.with_rng(|rng| {
            (0..ACCOUNT_NUMBER_LEN)
                .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                .collect()
        })
    }

    fn identifier(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.with_rng(|rng| rng.fill_bytes(&mut bytes));
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}
