//! Amount conversion between two currencies of a [`RateTable`].

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};
use crate::rate_table::RateTable;

/// Fractional digits kept in a displayed result.
pub const DISPLAY_SCALE: u32 = 4;

/// Converts `amount` of `source` into `dest` through the table's base currency.
///
/// The result is rounded half-to-even to [`DISPLAY_SCALE`] digits with
/// trailing zeros removed, so `12.3000` comes back as `12.3`.
pub fn convert(table: &RateTable, amount: Decimal, source: &str, dest: &str) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidInput(format!("amount {amount} is negative")));
    }
    let k_src = lookup(table, source)?;
    let k_dest = lookup(table, dest)?;

    let amount = amount
        .to_f64()
        .ok_or_else(|| Error::InvalidInput(format!("amount {amount} is out of range")))?;
    let converted = amount / k_src * k_dest;

    let converted = Decimal::from_f64(converted)
        .ok_or_else(|| Error::InvalidInput(format!("result {converted} is out of range")))?;

    Ok(converted
        .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointNearestEven)
        .normalize())
}

/// Parses user-typed amount text: a non-negative decimal with `.` as separator.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidInput("amount is empty".to_string()));
    }

    let amount = Decimal::from_str(input)
        .map_err(|_| Error::InvalidInput(format!("{input:?} is not a number")))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidInput(format!("amount {input} is negative")));
    }

    Ok(amount)
}

/// [`convert`] for raw text input, formatted for display.
pub fn convert_input(table: &RateTable, amount: &str, source: &str, dest: &str) -> Result<String> {
    let amount = parse_amount(amount)?;
    convert(table, amount, source, dest).map(|converted| converted.to_string())
}

fn lookup(table: &RateTable, code: &str) -> Result<f64> {
    table
        .rate(code)
        .ok_or_else(|| Error::InvalidInput(format!("unknown currency {code:?}")))
}
