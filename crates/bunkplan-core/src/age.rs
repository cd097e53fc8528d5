//! The camp-age fixed-point format.
//!
//! Camp ages are expressed as whole years plus months, written `Y.MM`:
//! `10.03` is ten years and three months. The months component is a real
//! month count, not a decimal fraction, so `10.11` is one month short of
//! eleven years.
//!
//! # Examples
//!
//! ```
//! use bunkplan_core::CampAge;
//!
//! let age: CampAge = "10.03".parse().unwrap();
//! assert_eq!(age, CampAge::new(10, 3).unwrap());
//! assert_eq!(age.total_months(), 123);
//! assert_eq!(age.to_string(), "10.03");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// An age in whole years plus months.
///
/// Ordering compares total months, so `9.11 < 10.00`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampAge {
    years: u8,
    months: u8,
}

impl CampAge {
    /// Creates a camp age from years and months.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidAge`] when `months >= 12`.
    pub fn new(years: u8, months: u8) -> Result<Self, ModelError> {
        if months >= 12 {
            return Err(ModelError::InvalidAge { years, months });
        }
        Ok(CampAge { years, months })
    }

    /// Creates a camp age from a total month count.
    pub fn from_total_months(total: u16) -> Self {
        CampAge {
            years: (total / 12) as u8,
            months: (total % 12) as u8,
        }
    }

    /// Returns the whole-years component.
    #[inline]
    pub const fn years(&self) -> u8 {
        self.years
    }

    /// Returns the months component (`0..12`).
    #[inline]
    pub const fn months(&self) -> u8 {
        self.months
    }

    /// Returns the age as a total month count.
    #[inline]
    pub const fn total_months(&self) -> u16 {
        self.years as u16 * 12 + self.months as u16
    }
}

impl Ord for CampAge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.total_months().cmp(&other.total_months())
    }
}

impl PartialOrd for CampAge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CampAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.years, self.months)
    }
}

impl fmt::Debug for CampAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CampAge({}.{:02})", self.years, self.months)
    }
}

impl FromStr for CampAge {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || ModelError::UnparseableAge(s.to_string());
        let (years, months) = match s.split_once('.') {
            Some((y, m)) => {
                if m.is_empty() || m.len() > 2 {
                    return Err(unparseable());
                }
                (
                    y.parse::<u8>().map_err(|_| unparseable())?,
                    m.parse::<u8>().map_err(|_| unparseable())?,
                )
            }
            None => (s.parse::<u8>().map_err(|_| unparseable())?, 0),
        };
        CampAge::new(years, months)
    }
}

/// An inclusive age range targeted by age-preference requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgeBand {
    min: CampAge,
    max: CampAge,
}

impl AgeBand {
    /// Creates an age band from its inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidAgeBand`] when `min > max`.
    pub fn new(min: CampAge, max: CampAge) -> Result<Self, ModelError> {
        if min > max {
            return Err(ModelError::InvalidAgeBand {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(AgeBand { min, max })
    }

    /// Returns the inclusive lower bound.
    #[inline]
    pub const fn min(&self) -> CampAge {
        self.min
    }

    /// Returns the inclusive upper bound.
    #[inline]
    pub const fn max(&self) -> CampAge {
        self.max
    }

    /// Returns true when `age` lies inside the band (inclusive).
    pub fn contains(&self, age: CampAge) -> bool {
        self.min <= age && age <= self.max
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_are_not_decimal_fractions() {
        let a: CampAge = "9.11".parse().unwrap();
        let b: CampAge = "10.00".parse().unwrap();
        assert!(a < b);
        assert_eq!(a.total_months(), 119);
    }

    #[test]
    fn rejects_month_overflow() {
        assert_eq!(
            CampAge::new(10, 12),
            Err(ModelError::InvalidAge {
                years: 10,
                months: 12
            })
        );
        assert!("10.12".parse::<CampAge>().is_err());
    }

    #[test]
    fn parses_bare_years() {
        let age: CampAge = "11".parse().unwrap();
        assert_eq!(age, CampAge::new(11, 0).unwrap());
    }

    #[test]
    fn display_round_trips() {
        let age = CampAge::new(10, 3).unwrap();
        assert_eq!(age.to_string().parse::<CampAge>().unwrap(), age);
    }

    #[test]
    fn from_total_months_round_trips() {
        let age = CampAge::from_total_months(123);
        assert_eq!(age, CampAge::new(10, 3).unwrap());
        assert_eq!(age.total_months(), 123);
    }

    #[test]
    fn band_contains_is_inclusive() {
        let band = AgeBand::new(
            CampAge::new(9, 0).unwrap(),
            CampAge::new(10, 6).unwrap(),
        )
        .unwrap();
        assert!(band.contains(CampAge::new(9, 0).unwrap()));
        assert!(band.contains(CampAge::new(10, 6).unwrap()));
        assert!(!band.contains(CampAge::new(10, 7).unwrap()));
        assert!(!band.contains(CampAge::new(8, 11).unwrap()));
    }

    #[test]
    fn band_rejects_inverted_bounds() {
        let min = CampAge::new(11, 0).unwrap();
        let max = CampAge::new(10, 0).unwrap();
        assert!(AgeBand::new(min, max).is_err());
    }
}
