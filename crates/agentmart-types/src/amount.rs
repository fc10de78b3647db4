//! MNEE amounts with 18-decimal precision
//!
//! Prices in the catalog are small exact decimals (e.g. `0.05`), while the
//! escrow contract stores amounts in base units. Both directions go through
//! `rust_decimal` so that threshold comparisons never see float rounding.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{Result, TypeError};

/// Number of decimals of the MNEE token
pub const MNEE_DECIMALS: u32 = 18;

/// Symbol used when rendering amounts
pub const MNEE_SYMBOL: &str = "MNEE";

/// Convert raw base units into a human MNEE value
pub fn mnee_from_base_units(value: u128) -> Result<Decimal> {
    let signed = i128::try_from(value).map_err(|_| TypeError::AmountOverflow(value.to_string()))?;
    Decimal::try_from_i128_with_scale(signed, MNEE_DECIMALS)
        .map(|d| d.normalize())
        .map_err(|_| TypeError::AmountOverflow(value.to_string()))
}

/// Convert a human MNEE value into raw base units
pub fn mnee_to_base_units(value: Decimal) -> Result<u128> {
    if value.is_sign_negative() {
        return Err(TypeError::InvalidAmount(value.to_string()));
    }
    if value.scale() > MNEE_DECIMALS {
        return Err(TypeError::InvalidAmount(value.to_string()));
    }

    let mut scaled = value;
    scaled.rescale(MNEE_DECIMALS);
    if scaled.scale() != MNEE_DECIMALS {
        return Err(TypeError::AmountOverflow(value.to_string()));
    }
    u128::try_from(scaled.mantissa()).map_err(|_| TypeError::AmountOverflow(value.to_string()))
}

/// Parse a price string such as `"0.02"`
pub fn parse_price(raw: &str) -> Result<Decimal> {
    let price = Decimal::from_str(raw.trim()).map_err(|_| TypeError::InvalidAmount(raw.to_string()))?;
    if price.is_sign_negative() {
        return Err(TypeError::InvalidAmount(raw.to_string()));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_base_units_round_trip_for_catalog_price() {
        let wei = mnee_to_base_units(dec!(0.02)).unwrap();
        assert_eq!(wei, 20_000_000_000_000_000);
        assert_eq!(mnee_from_base_units(wei).unwrap(), dec!(0.02));
    }

    #[test]
    fn test_whole_amount_normalizes() {
        let one = mnee_from_base_units(1_000_000_000_000_000_000).unwrap();
        assert_eq!(one.to_string(), "1");
    }

    #[test]
    fn test_rejects_excess_precision_and_negative() {
        assert!(mnee_to_base_units(dec!(-1)).is_err());
        assert!(parse_price("-0.5").is_err());
        assert!(parse_price("abc").is_err());
    }

    #[test]
    fn test_parse_price_trims() {
        assert_eq!(parse_price(" 0.1 ").unwrap(), dec!(0.1));
    }
}
