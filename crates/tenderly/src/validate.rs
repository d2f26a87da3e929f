//! Syntax checks for caller supplied parameters.

use alloy_primitives::{Address, U256};

use crate::error::{Result, TenderlyError};

/// Whether `s` is an account address: 40 hex digits with an optional `0x`
/// prefix. Mixed case input must carry a valid EIP-55 checksum.
pub fn is_address(s: &str) -> bool {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }
    Address::parse_checksummed(format!("0x{}", digits), None).is_ok()
}

/// Whether `s` is `0x` prefixed hex encoding whole bytes. `0x` alone is empty calldata.
pub fn is_bytes_like(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(digits) => digits.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Parses a decimal or `0x` hex unsigned integer of at most 256 bits.
/// Signs, separators, whitespace and other radix prefixes are rejected.
pub fn parse_uint(s: &str) -> Option<U256> {
    let (digits, radix) = match s.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };
    let valid = match radix {
        16 => digits.bytes().all(|b| b.is_ascii_hexdigit()),
        _ => digits.bytes().all(|b| b.is_ascii_digit()),
    };
    if digits.is_empty() || !valid {
        return None;
    }
    U256::from_str_radix(digits, radix).ok()
}

pub(crate) fn require_address(what: &str, s: &str) -> Result<()> {
    if is_address(s) {
        Ok(())
    } else {
        Err(TenderlyError::validation(format!("invalid {} address: {}", what, s)))
    }
}

pub(crate) fn require_uint(what: &str, s: &str) -> Result<U256> {
    parse_uint(s).ok_or_else(|| TenderlyError::validation(format!("invalid {}: {}", what, s)))
}

/// Minimal `0x` hex, `0x0` for zero.
pub(crate) fn to_hex_quantity(v: U256) -> String {
    if v.is_zero() {
        "0x0".to_string()
    } else {
        format!("0x{:x}", v)
    }
}

/// `0x` hex padded to whole bytes, `0x00` for zero.
pub(crate) fn to_hex_bytes(v: u64) -> String {
    let digits = format!("{:x}", v);
    if digits.len() % 2 == 1 {
        format!("0x0{}", digits)
    } else {
        format!("0x{}", digits)
    }
}
