//! Decimal policy for revenue amounts.
//!
//! Reservation amounts are stored at 3 fraction digits; reported totals carry
//! exactly 2. Quantization happens once, after summation - rounding per row
//! or mid-sum changes the result under large reservation counts. Amounts are
//! never represented in binary floating point.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ConfigError;

/// Fraction digits of stored reservation amounts (NUMERIC(13,3)).
pub const AMOUNT_SCALE: u32 = 3;

/// Fraction digits of reported totals.
pub const TOTAL_SCALE: u32 = 2;

/// The single rounding rule applied at the aggregation/response boundary.
const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Quantize a post-sum total to the reporting scale, round-half-up.
///
/// Call exactly once per computed total, after the full sum.
pub fn quantize_total(sum: Decimal) -> Decimal {
    sum.round_dp_with_strategy(TOTAL_SCALE, ROUNDING)
}

/// The recognized-but-fixed decimal configuration options.
///
/// `decimal.rounding_mode` and `decimal.scale` are part of the configuration
/// surface so that a deployment stating them explicitly is accepted, but the
/// only accepted values are the fixed ones: `half-up` and `2`. Anything else
/// is a configuration error, not a behavior change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalPolicy {
    pub rounding_mode: &'static str,
    pub scale: u32,
}

impl Default for DecimalPolicy {
    fn default() -> Self {
        Self {
            rounding_mode: "half-up",
            scale: TOTAL_SCALE,
        }
    }
}

impl DecimalPolicy {
    /// Read the decimal options from the environment, validating that any
    /// explicitly set value matches the fixed policy.
    ///
    /// Environment variables:
    /// - `INNKEEP_DECIMAL_ROUNDING_MODE`: must be "half-up" if set
    /// - `INNKEEP_DECIMAL_SCALE`: must be "2" if set
    pub fn from_env() -> Result<Self, ConfigError> {
        let policy = Self::default();

        if let Ok(mode) = std::env::var("INNKEEP_DECIMAL_ROUNDING_MODE") {
            if mode != policy.rounding_mode {
                return Err(ConfigError::InvalidValue {
                    field: "decimal.rounding_mode".to_string(),
                    value: mode,
                    reason: format!("fixed to {}", policy.rounding_mode),
                });
            }
        }

        if let Ok(scale) = std::env::var("INNKEEP_DECIMAL_SCALE") {
            if scale != policy.scale.to_string() {
                return Err(ConfigError::InvalidValue {
                    field: "decimal.scale".to_string(),
                    value: scale,
                    reason: format!("fixed to {}", policy.scale),
                });
            }
        }

        Ok(policy)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_midpoint_rounds_up_once_after_sum() {
        // Three amounts at stored 3-digit precision: the sum is 30.015,
        // which must quantize to 30.02. Rounding each row first would give
        // 10.01 * 3 = 30.03; rounding with binary floats drifts low.
        let sum = dec!(10.005) + dec!(10.005) + dec!(10.005);
        assert_eq!(sum, dec!(30.015));
        assert_eq!(quantize_total(sum), dec!(30.02));
    }

    #[test]
    fn test_quantize_is_stable_at_two_digits() {
        assert_eq!(quantize_total(dec!(0)), dec!(0.00));
        assert_eq!(quantize_total(dec!(1234.5)), dec!(1234.50));
        assert_eq!(quantize_total(dec!(99.994)), dec!(99.99));
        assert_eq!(quantize_total(dec!(99.995)), dec!(100.00));
    }

    #[test]
    fn test_quantized_total_has_reporting_scale() {
        let total = quantize_total(dec!(42.005));
        assert_eq!(total.scale(), TOTAL_SCALE);
        assert_eq!(total, dec!(42.01));
    }

    #[test]
    fn test_default_policy_accepts_empty_env() {
        // Unset variables mean the fixed policy.
        let policy = DecimalPolicy::default();
        assert_eq!(policy.rounding_mode, "half-up");
        assert_eq!(policy.scale, 2);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        // Stored precision: up to 10 integer digits, 3 fraction digits.
        (-9_999_999_999_999i64..=9_999_999_999_999).prop_map(|raw| Decimal::new(raw, AMOUNT_SCALE))
    }

    proptest! {
        /// Quantization is idempotent: a 2-digit value does not move again.
        #[test]
        fn prop_quantize_idempotent(amount in amount_strategy()) {
            let once = quantize_total(amount);
            prop_assert_eq!(once, quantize_total(once));
        }

        /// The quantized value is within half a cent of the exact sum.
        #[test]
        fn prop_quantize_error_bounded(amount in amount_strategy()) {
            let quantized = quantize_total(amount);
            let error = (quantized - amount).abs();
            prop_assert!(error <= Decimal::new(5, 3));
        }

        /// Quantizing a sum never equals summing per-row quantizations in
        /// general, but both stay within n/2 cents of each other.
        #[test]
        fn prop_sum_then_quantize_bounded_against_per_row(
            amounts in prop::collection::vec(amount_strategy(), 1..50)
        ) {
            let exact: Decimal = amounts.iter().copied().sum();
            let post_sum = quantize_total(exact);
            let per_row: Decimal = amounts.iter().map(|a| quantize_total(*a)).sum();
            let bound = Decimal::new(5, 3) * Decimal::from(amounts.len());
            prop_assert!((post_sum - per_row).abs() <= bound);
        }
    }
}
