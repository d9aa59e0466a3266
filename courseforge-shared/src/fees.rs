/// Platform fee calculation
///
/// Splits a gross charge into the platform fee and the creator payout, in
/// integer cents throughout. The rate is expressed in basis points (1/100th
/// of a percent) and is read from configuration once at startup — there are
/// no ambient lookups here.
///
/// # Example
///
/// ```
/// use courseforge_shared::fees::FeeSchedule;
///
/// let fees = FeeSchedule::new(1500); // 15%
/// let split = fees.split(10_000);
/// assert_eq!(split.platform_fee_cents, 1_500);
/// assert_eq!(split.creator_payout_cents, 8_500);
/// ```

use serde::{Deserialize, Serialize};

/// Default platform fee: 1500 bps = 15%
pub const DEFAULT_FEE_BASIS_POINTS: u32 = 1500;

/// Minimum aggregate for which a transfer is worth issuing (provider floor)
pub const MIN_TRANSFER_CENTS: i64 = 100;

/// Platform fee schedule, constructed once from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fee rate in basis points (1500 = 15%)
    pub basis_points: u32,
}

/// Result of splitting a gross charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Platform share in cents
    pub platform_fee_cents: i64,

    /// Creator share in cents
    pub creator_payout_cents: i64,
}

impl FeeSchedule {
    /// Creates a fee schedule with the given basis-point rate
    pub fn new(basis_points: u32) -> Self {
        Self { basis_points }
    }

    /// Splits a non-negative gross amount into platform fee and creator payout
    ///
    /// The fee is `round(amount * bps / 10000)` with round-half-up on the
    /// division; the payout is the exact remainder, so the two always sum to
    /// the input. Negative inputs are clamped to zero.
    pub fn split(&self, amount_cents: i64) -> FeeSplit {
        let amount = amount_cents.max(0);

        // Round-half-up integer division: floor((a * bps + 5000) / 10000)
        let platform_fee_cents = (amount * i64::from(self.basis_points) + 5_000) / 10_000;
        let creator_payout_cents = amount - platform_fee_cents;

        FeeSplit {
            platform_fee_cents,
            creator_payout_cents,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_FEE_BASIS_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_amount() {
        let split = FeeSchedule::default().split(0);
        assert_eq!(split.platform_fee_cents, 0);
        assert_eq!(split.creator_payout_cents, 0);
    }

    #[test]
    fn test_reference_split() {
        // $100.00 at 15% → $15.00 fee, $85.00 payout
        let split = FeeSchedule::new(1500).split(10_000);
        assert_eq!(split.platform_fee_cents, 1_500);
        assert_eq!(split.creator_payout_cents, 8_500);
    }

    #[test]
    fn test_rounds_half_up() {
        // 999 * 1500 / 10000 = 149.85 → 150
        let split = FeeSchedule::new(1500).split(999);
        assert_eq!(split.platform_fee_cents, 150);
        assert_eq!(split.creator_payout_cents, 849);

        // 30 * 1500 / 10000 = 4.5 → 5 (half rounds up)
        let split = FeeSchedule::new(1500).split(30);
        assert_eq!(split.platform_fee_cents, 5);
        assert_eq!(split.creator_payout_cents, 25);
    }

    #[test]
    fn test_split_always_sums_to_input() {
        for bps in [0u32, 1, 250, 1500, 5000, 9999, 10_000] {
            let fees = FeeSchedule::new(bps);
            for amount in [0i64, 1, 29, 99, 100, 101, 999, 10_000, 123_456_789] {
                let split = fees.split(amount);
                assert_eq!(
                    split.platform_fee_cents + split.creator_payout_cents,
                    amount,
                    "bps={} amount={}",
                    bps,
                    amount
                );
                assert!(split.platform_fee_cents >= 0);
                assert!(split.creator_payout_cents >= 0);
            }
        }
    }

    #[test]
    fn test_full_rate_takes_everything() {
        let split = FeeSchedule::new(10_000).split(777);
        assert_eq!(split.platform_fee_cents, 777);
        assert_eq!(split.creator_payout_cents, 0);
    }

    #[test]
    fn test_negative_amount_clamped() {
        let split = FeeSchedule::default().split(-500);
        assert_eq!(split.platform_fee_cents, 0);
        assert_eq!(split.creator_payout_cents, 0);
    }
}
