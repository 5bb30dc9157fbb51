//! Fee computation and the operator/participant split.
//!
//! The fee is 0.1% of the trade input, truncating: the division remainder
//! stays with the trader, a deterministic under-collection. The operator
//! takes half of the fee (truncating) and the participant pool receives
//! the remainder, so the two sides always sum to the fee exactly. On odd
//! fees the extra unit lands on the participant side.

use serde::{Deserialize, Serialize};

/// Fee divisor: `fee = input / 1000` (0.1%).
pub const FEE_DIVISOR: u64 = 1_000;

/// Result of splitting one trade's fee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Total fee skimmed from the trade input.
    pub fee_total: u64,
    /// Portion earmarked for the module operator.
    pub operator_share: u64,
    /// Portion distributed to traders by contributed volume.
    pub participant_share: u64,
}

/// Split a trade's input amount into its fee components.
///
/// Pure and infallible; a zero input yields an all-zero split.
///
/// # Arguments
///
/// * `trade_input` - The trade's input amount in asset units
pub fn split_trade(trade_input: u64) -> FeeSplit {
    let fee_total = trade_input / FEE_DIVISOR;
    let operator_share = fee_total / 2;
    // Remainder, not a second halving: the sides must sum to the fee.
    let participant_share = fee_total - operator_share;

    FeeSplit {
        fee_total,
        operator_share,
        participant_share,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exact_sum() {
        for input in [0, 1, 999, 1_000, 1_001, 2_999, 3_000, 123_456_789, u64::MAX] {
            let split = split_trade(input);
            assert_eq!(
                split.operator_share + split.participant_share,
                split.fee_total,
                "shares must sum to the fee for input {input}"
            );
            assert_eq!(split.fee_total, input / FEE_DIVISOR);
        }
    }

    #[test]
    fn test_split_below_divisor_is_zero() {
        let split = split_trade(999);
        assert_eq!(split.fee_total, 0);
        assert_eq!(split.operator_share, 0);
        assert_eq!(split.participant_share, 0);
    }

    #[test]
    fn test_split_minimal_fee() {
        // Input 1000 produces the smallest nonzero fee: 1 unit, which the
        // operator half truncates away entirely.
        let split = split_trade(1_000);
        assert_eq!(split.fee_total, 1);
        assert_eq!(split.operator_share, 0);
        assert_eq!(split.participant_share, 1);
    }

    #[test]
    fn test_split_odd_fee_favors_participants() {
        // Fee 3: operator 1, participants 2.
        let split = split_trade(3_000);
        assert_eq!(split.fee_total, 3);
        assert_eq!(split.operator_share, 1);
        assert_eq!(split.participant_share, 2);
    }

    #[test]
    fn test_split_even_fee() {
        let split = split_trade(2_000_000);
        assert_eq!(split.fee_total, 2_000);
        assert_eq!(split.operator_share, 1_000);
        assert_eq!(split.participant_share, 1_000);
    }

    #[test]
    fn test_split_truncates_input_remainder() {
        // 1999 and 1000 produce the same fee; the remainder is never
        // collected.
        assert_eq!(split_trade(1_999), split_trade(1_000));
    }

    #[test]
    fn test_split_max_input_no_overflow() {
        let split = split_trade(u64::MAX);
        assert_eq!(split.fee_total, u64::MAX / FEE_DIVISOR);
        assert_eq!(
            split.operator_share + split.participant_share,
            split.fee_total
        );
    }

    #[test]
    fn test_fee_split_serde_shape() {
        let split = split_trade(3_000);
        let json = serde_json::to_string(&split).expect("serialize");
        assert_eq!(
            json,
            "{\"fee_total\":3,\"operator_share\":1,\"participant_share\":2}"
        );
        let back: FeeSplit = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, split);
    }
}
