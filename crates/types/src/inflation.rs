// Path: crates/types/src/inflation.rs
use rust_decimal::Decimal;

/// Scheduled reissuance (inflation) policy, a pure function of height.
///
/// Constructed once from CLI input; `fedsign-inflation` owns the logic that
/// consumes this, this crate only holds the data.
#[derive(Debug, Clone)]
pub struct InflationConfig {
    /// Inflation rate `r` in `[0, 1)`, e.g. `0.01` for 1%.
    pub rate: Decimal,
    /// Inflation period `P`, in blocks. `0` disables inflation.
    pub period: u64,
    /// Destination address `A` for the reissuance output.
    pub destination_address: String,
    /// Reissuance token script `S_r`, the script controlling the funding
    /// UTXO, hex encoded.
    pub reissuance_script_hex: String,
    /// Reissuance private key `K_r`, WIF or hex encoded per the daemon's
    /// convention; treated as an opaque credential by this crate.
    pub reissuance_privkey: String,
}

impl InflationConfig {
    /// `None` unless both `rate` and `period` are nonzero: a zero rate or
    /// zero period disables inflation entirely.
    pub fn from_cli(
        rate: Decimal,
        period: u64,
        destination_address: String,
        reissuance_script_hex: String,
        reissuance_privkey: String,
    ) -> Option<Self> {
        if rate.is_zero() || period == 0 {
            return None;
        }
        Some(Self {
            rate,
            period,
            destination_address,
            reissuance_script_hex,
            reissuance_privkey,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn zero_rate_disables_inflation() {
        let cfg = InflationConfig::from_cli(
            Decimal::ZERO,
            10,
            "addr".into(),
            "51".into(),
            "key".into(),
        );
        assert!(cfg.is_none());
    }

    #[test]
    fn zero_period_disables_inflation() {
        let cfg = InflationConfig::from_cli(
            Decimal::from_str("0.01").expect("valid decimal"),
            0,
            "addr".into(),
            "51".into(),
            "key".into(),
        );
        assert!(cfg.is_none());
    }

    #[test]
    fn nonzero_rate_and_period_enables_inflation() {
        let cfg = InflationConfig::from_cli(
            Decimal::from_str("0.01").expect("valid decimal"),
            10,
            "addr".into(),
            "51".into(),
            "key".into(),
        );
        assert!(cfg.is_some());
    }
}
