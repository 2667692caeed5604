use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::error::Error;

/// Both tracked assets use 18 decimals.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Parses a raw on-chain integer amount (u256 range) from its decimal string.
pub fn parse_raw_amount(value: &str) -> Result<BigDecimal, Error> {
    let amount = BigDecimal::from_str(value.trim())?;
    if !amount.is_integer() {
        return Err(Error::InvalidAmount(value.to_owned()));
    }
    Ok(amount)
}

/// Native units to display units: `raw / 10^decimals`, exact.
pub fn to_display_amount(raw: &BigDecimal, decimals: u8) -> BigDecimal {
    let (digits, scale) = raw.as_bigint_and_exponent();
    BigDecimal::new(digits, scale + i64::from(decimals)).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_display_amount() {
        let raw = parse_raw_amount("3000000000000000000").unwrap();
        assert_eq!(
            to_display_amount(&raw, DEFAULT_DECIMALS),
            BigDecimal::from(3)
        );
    }

    #[test]
    fn test_to_display_amount_keeps_precision() {
        let raw = parse_raw_amount("1").unwrap();
        assert_eq!(
            to_display_amount(&raw, DEFAULT_DECIMALS),
            BigDecimal::from_str("0.000000000000000001").unwrap()
        );

        let raw = parse_raw_amount(
            "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        )
        .unwrap();
        assert_eq!(
            to_display_amount(&raw, DEFAULT_DECIMALS),
            BigDecimal::from_str(
                "115792089237316195423570985008687907853269984665640564039457.584007913129639935"
            )
            .unwrap()
        );
    }

    #[test]
    fn test_parse_raw_amount_rejects_fractions() {
        assert!(matches!(
            parse_raw_amount("1.5"),
            Err(Error::InvalidAmount(_))
        ));
        assert!(parse_raw_amount("abc").is_err());
    }
}
