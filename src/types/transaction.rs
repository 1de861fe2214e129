//! Transaction types shared by the CSV parser and the QIF writer

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Normalized card transaction
///
/// Created by the CSV parser from one exported row and consumed once by the
/// QIF writer. Fields are private so a record cannot change after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    posted_date: NaiveDate,
    amount: Decimal,
    payee: String,
    memo: Option<String>,
}

impl TransactionRecord {
    /// Build a record; an empty memo is stored as `None`
    pub fn new(
        posted_date: NaiveDate,
        amount: Decimal,
        payee: impl Into<String>,
        memo: Option<String>,
    ) -> Self {
        Self {
            posted_date,
            amount,
            payee: payee.into(),
            memo: memo.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Date the transaction took effect
    pub fn posted_date(&self) -> NaiveDate {
        self.posted_date
    }

    /// Signed amount; negative values are charges
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn payee(&self) -> &str {
        &self.payee
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::absent(None, None)]
    #[case::empty(Some(""), None)]
    #[case::blank(Some("   "), None)]
    #[case::present(Some("USD 12.00"), Some("USD 12.00"))]
    fn test_memo_normalization(#[case] memo: Option<&str>, #[case] expected: Option<&str>) {
        let record = TransactionRecord::new(
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            Decimal::new(-1234, 2),
            "AMAZON",
            memo.map(str::to_string),
        );
        assert_eq!(record.memo(), expected);
    }
}
