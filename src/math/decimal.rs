//! 18-decimal fixed-point value, the unit every price, ratio and loan
//! amount in the protocol is expressed in.

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::manual_range_contains)]

use {
    crate::{
        error::Error,
        math::common::{TryAdd, TryDiv, TryMul, TrySub, HALF_WAD, PERCENT_SCALER, SCALE, WAD},
    },
    alloc::{string::ToString, vec},
    core::fmt,
    odra::casper_types::U256,
};

/// Large decimal values, precise to 18 digits
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Decimal(pub U256);

impl odra::casper_types::bytesrepr::ToBytes for Decimal {
    fn to_bytes(&self) -> Result<alloc::vec::Vec<u8>, odra::casper_types::bytesrepr::Error> {
        self.0.to_bytes()
    }

    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }
}

impl odra::casper_types::bytesrepr::FromBytes for Decimal {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), odra::casper_types::bytesrepr::Error> {
        let (value, remainder) = U256::from_bytes(bytes)?;
        Ok((Decimal(value), remainder))
    }
}

impl odra::casper_types::CLTyped for Decimal {
    fn cl_type() -> odra::casper_types::CLType {
        odra::casper_types::CLType::U256
    }
}

impl Decimal {
    /// One
    pub fn one() -> Self {
        Self(U256::from(WAD))
    }

    /// Zero
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    fn wad() -> U256 {
        U256::from(WAD)
    }

    fn half_wad() -> U256 {
        U256::from(HALF_WAD)
    }

    /// Create scaled decimal from a percent value
    pub fn from_percent(percent: u8) -> Self {
        Self(U256::from(percent as u64 * PERCENT_SCALER))
    }

    /// Return raw scaled value as u128 (assumes the value fits)
    #[allow(clippy::wrong_self_convention)]
    pub fn to_scaled_val(&self) -> u128 {
        self.0.as_u128()
    }

    /// Create decimal from a raw scaled value
    pub fn from_scaled_val(scaled_val: u128) -> Self {
        Self(U256::from(scaled_val))
    }

    /// Round scaled decimal to u64
    pub fn try_round_u64(&self) -> Result<u64, Error> {
        let rounded_val = Self::half_wad()
            .checked_add(self.0)
            .ok_or(Error::MathOverflow)?
            .checked_div(Self::wad())
            .ok_or(Error::MathOverflow)?;

        if rounded_val > U256::from(u64::MAX) {
            return Err(Error::MathOverflow);
        }
        Ok(rounded_val.as_u64())
    }

    /// Floor scaled decimal to u64
    pub fn try_floor_u64(&self) -> Result<u64, Error> {
        let floor_val = self.0.checked_div(Self::wad()).ok_or(Error::MathOverflow)?;

        if floor_val > U256::from(u64::MAX) {
            return Err(Error::MathOverflow);
        }
        Ok(floor_val.as_u64())
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= SCALE {
            scaled_val.insert_str(0, &vec!["0"; SCALE - scaled_val.len()].join(""));
            scaled_val.insert_str(0, "0.");
        } else {
            scaled_val.insert(scaled_val.len() - SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

impl From<u64> for Decimal {
    fn from(val: u64) -> Self {
        Self(Self::wad().checked_mul(U256::from(val)).unwrap_or(U256::zero()))
    }
}

impl From<u128> for Decimal {
    fn from(val: u128) -> Self {
        Self(Self::wad().checked_mul(U256::from(val)).unwrap_or(U256::zero()))
    }
}

impl TryAdd for Decimal {
    fn try_add(self, rhs: Self) -> Result<Self, Error> {
        Ok(Self(self.0.checked_add(rhs.0).ok_or(Error::MathOverflow)?))
    }
}

impl TrySub for Decimal {
    fn try_sub(self, rhs: Self) -> Result<Self, Error> {
        Ok(Self(self.0.checked_sub(rhs.0).ok_or(Error::MathOverflow)?))
    }
}

impl TryDiv<u64> for Decimal {
    fn try_div(self, rhs: u64) -> Result<Self, Error> {
        Ok(Self(self.0.checked_div(U256::from(rhs)).ok_or(Error::MathOverflow)?))
    }
}

impl TryDiv<Decimal> for Decimal {
    fn try_div(self, rhs: Self) -> Result<Self, Error> {
        Ok(Self(
            self.0
                .checked_mul(Self::wad())
                .ok_or(Error::MathOverflow)?
                .checked_div(rhs.0)
                .ok_or(Error::MathOverflow)?,
        ))
    }
}

impl TryMul<u64> for Decimal {
    fn try_mul(self, rhs: u64) -> Result<Self, Error> {
        Ok(Self(self.0.checked_mul(U256::from(rhs)).ok_or(Error::MathOverflow)?))
    }
}

impl TryMul<Decimal> for Decimal {
    fn try_mul(self, rhs: Self) -> Result<Self, Error> {
        Ok(Self(
            self.0
                .checked_mul(rhs.0)
                .ok_or(Error::MathOverflow)?
                .checked_div(Self::wad())
                .ok_or(Error::MathOverflow)?,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scaler() {
        assert_eq!(U256::from(WAD), Decimal::wad());
    }

    #[test]
    fn test_from_percent() {
        assert_eq!(Decimal::from_percent(100), Decimal::one());
        assert_eq!(Decimal::from_percent(50), Decimal(U256::from(HALF_WAD)));
        assert_eq!(Decimal::from_percent(0), Decimal::zero());
    }

    #[test]
    fn test_mul_divides_scale_back_out() {
        // 1000.0 * 0.5 = 500.0
        let half = Decimal::from_percent(50);
        let product = Decimal::from(1000u64).try_mul(half).unwrap();
        assert_eq!(product, Decimal::from(500u64));
    }

    #[test]
    fn test_div_widens_before_dividing() {
        // 800 / 1000 = 0.8
        let ratio = Decimal::from(800u64).try_div(Decimal::from(1000u64)).unwrap();
        assert_eq!(ratio.to_scaled_val(), 800_000_000_000_000_000);
        // 0.8 * 100 = 80.0
        let percent = ratio.try_mul(100u64).unwrap();
        assert_eq!(percent, Decimal::from(80u64));
    }

    #[test]
    fn test_div_by_zero_errs() {
        let res = Decimal::one().try_div(Decimal::zero());
        assert_eq!(res, Err(Error::MathOverflow));
    }

    #[test]
    fn test_sub_underflow_errs() {
        let res = Decimal::zero().try_sub(Decimal::one());
        assert_eq!(res, Err(Error::MathOverflow));
    }

    #[test]
    fn test_rounding() {
        let val = Decimal(U256::from(WAD) * U256::from(3u64) / U256::from(2u64));
        assert_eq!(val.try_round_u64().unwrap(), 2);
        assert_eq!(val.try_floor_u64().unwrap(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Decimal::from(5u64).to_string(), "5.000000000000000000");
    }
}
