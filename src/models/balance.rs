//! Dated, confidence-tagged monetary snapshots

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// How certain an amount is, ordered by increasing uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    /// Observed on a real statement
    Confirmed,
    /// Expected by the user
    Projected,
    /// Inferred by the system
    AutoProjected,
}

impl Confidence {
    /// The less certain of the two; ties resolve to `second`
    pub fn combine(first: Confidence, second: Confidence) -> Confidence {
        if first <= second {
            second
        } else {
            first
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed => write!(f, "CONFIRMED"),
            Self::Projected => write!(f, "PROJECTED"),
            Self::AutoProjected => write!(f, "AUTO_PROJECTED"),
        }
    }
}

/// An immutable (date, amount, confidence) snapshot
///
/// Field order gives the derived ordering: date, then amount, then
/// confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Balance {
    date: NaiveDate,
    amount: Money,
    confidence: Confidence,
}

impl Balance {
    pub fn new(amount: Money, date: NaiveDate, confidence: Confidence) -> Self {
        Self {
            date,
            amount,
            confidence,
        }
    }

    pub fn confirmed(amount: Money, date: NaiveDate) -> Self {
        Self::new(amount, date, Confidence::Confirmed)
    }

    pub fn projected(amount: Money, date: NaiveDate) -> Self {
        Self::new(amount, date, Confidence::Projected)
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// True only for PROJECTED; AUTO_PROJECTED does not count
    pub fn is_projected(&self) -> bool {
        self.confidence == Confidence::Projected
    }

    pub fn is_confirmed(&self) -> bool {
        self.confidence == Confidence::Confirmed
    }

    pub fn negate(&self) -> Self {
        Self {
            amount: -self.amount,
            ..*self
        }
    }

    /// Sum of amounts, later of the dates, less certain confidence
    pub fn add(&self, other: &Balance) -> Self {
        Self {
            date: self.date.max(other.date),
            amount: self.amount + other.amount,
            confidence: Confidence::combine(self.confidence, other.confidence),
        }
    }

    pub fn subtract(&self, other: &Balance) -> Self {
        self.add(&other.negate())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Balance{{amount={}, date={}, confidence={}}}",
            self.amount,
            self.date.format("%Y-%m-%d"),
            self.confidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Confidence; 3] = [
        Confidence::Confirmed,
        Confidence::Projected,
        Confidence::AutoProjected,
    ];

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_combine_is_commutative_and_idempotent() {
        for a in ALL {
            assert_eq!(Confidence::combine(a, a), a);
            for b in ALL {
                assert_eq!(Confidence::combine(a, b), Confidence::combine(b, a));
                let combined = Confidence::combine(a, b);
                assert!(combined >= a && combined >= b);
            }
        }
    }

    #[test]
    fn test_add_takes_later_date_and_weaker_confidence() {
        let a = Balance::confirmed(Money::from_cents(1000), day(2024, 1, 5));
        let b = Balance::projected(Money::from_cents(-250), day(2024, 1, 20));
        let sum = a.add(&b);
        assert_eq!(sum.amount().cents(), 750);
        assert_eq!(sum.date(), day(2024, 1, 20));
        assert_eq!(sum.confidence(), Confidence::Projected);
        assert_eq!(b.add(&a), sum);
    }

    #[test]
    fn test_negate_and_subtract() {
        let a = Balance::confirmed(Money::from_cents(1000), day(2024, 2, 1));
        assert_eq!(a.negate().amount().cents(), -1000);
        assert_eq!(a.negate().date(), a.date());
        assert_eq!(a.subtract(&a).amount(), Money::zero());
    }

    #[test]
    fn test_ordering_by_date_amount_confidence() {
        let early = Balance::projected(Money::from_cents(900), day(2024, 1, 1));
        let late = Balance::confirmed(Money::from_cents(100), day(2024, 1, 2));
        assert!(early < late);

        let small = Balance::confirmed(Money::from_cents(100), day(2024, 1, 2));
        let large = Balance::confirmed(Money::from_cents(200), day(2024, 1, 2));
        assert!(small < large);

        let confirmed = Balance::confirmed(Money::from_cents(100), day(2024, 1, 2));
        let projected = Balance::projected(Money::from_cents(100), day(2024, 1, 2));
        assert!(confirmed < projected);
    }

    #[test]
    fn test_is_projected_excludes_auto() {
        let auto = Balance::new(Money::zero(), day(2024, 1, 1), Confidence::AutoProjected);
        assert!(!auto.is_projected());
        assert!(!auto.is_confirmed());
    }

    #[test]
    fn test_serialization() {
        let b = Balance::confirmed(Money::from_cents(1050), day(2024, 3, 9));
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-03-09","amount":1050,"confidence":"CONFIRMED"}"#
        );
    }
}
