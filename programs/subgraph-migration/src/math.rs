use ethereum_types::U256;

use crate::error::{MigrationError, MigrationResult};

/// Parts per million.
pub const MAX_PPM: u32 = 1_000_000;

/// `a * b / d` with a 256-bit intermediate, floored.
pub fn mul_div(a: u128, b: u128, d: u128) -> MigrationResult<u128> {
    if d == 0 {
        return Err(MigrationError::ArithmeticOverflow);
    }
    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(MigrationError::ArithmeticOverflow)?;
    let quotient = product / U256::from(d);
    u128::try_from(quotient).map_err(|_| MigrationError::ArithmeticOverflow)
}

pub fn ppm_of(amount: u128, ppm: u32) -> MigrationResult<u128> {
    mul_div(amount, ppm as u128, MAX_PPM as u128)
}

pub fn checked_add(a: u128, b: u128) -> MigrationResult<u128> {
    a.checked_add(b).ok_or(MigrationError::ArithmeticOverflow)
}

pub fn checked_sub(a: u128, b: u128) -> MigrationResult<u128> {
    a.checked_sub(b).ok_or(MigrationError::ArithmeticOverflow)
}

pub fn u256_to_amount(value: U256) -> MigrationResult<u128> {
    u128::try_from(value).map_err(|_| MigrationError::AmountOverflow)
}
