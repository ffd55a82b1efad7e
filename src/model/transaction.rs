use crate::model::cell::STORAGE_DATE_FORMAT;
use crate::model::{Amount, Cell, Coercion, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Represents a single row from the transactions file.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub(crate) date: NaiveDate,
    pub(crate) kind: TransactionKind,
    pub(crate) category: String,
    pub(crate) amount: Amount,
    pub(crate) description: String,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            kind,
            category: category.into(),
            amount,
            description: description.into(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> &TransactionKind {
        &self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A transaction row under construction. `date` and `amount` are `None` when they have not been
/// set or could not be coerced.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct TransactionDraft {
    pub date: Option<NaiveDate>,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Option<Amount>,
    pub description: String,
}

impl From<Transaction> for TransactionDraft {
    fn from(t: Transaction) -> Self {
        Self {
            date: Some(t.date),
            kind: t.kind,
            category: t.category,
            amount: Some(t.amount),
            description: t.description,
        }
    }
}

impl Record for Transaction {
    type Column = TransactionColumn;
    type Draft = TransactionDraft;

    const NAME: &'static str = "transactions";

    const COLUMNS: &'static [TransactionColumn] = &[
        TransactionColumn::Date,
        TransactionColumn::Kind,
        TransactionColumn::Category,
        TransactionColumn::Amount,
        TransactionColumn::Description,
    ];

    fn blank() -> TransactionDraft {
        TransactionDraft {
            amount: Some(Amount::ZERO),
            ..TransactionDraft::default()
        }
    }

    fn set(draft: &mut TransactionDraft, column: TransactionColumn, cell: &Cell, c: &Coercion) {
        match column {
            TransactionColumn::Date => c.assign(&mut draft.date, c.date(cell), column),
            TransactionColumn::Kind => {
                draft.kind = TransactionKind::from_label(&cell.text_or_empty());
            }
            TransactionColumn::Category => draft.category = cell.text_or_empty(),
            TransactionColumn::Amount => c.assign(&mut draft.amount, c.amount(cell), column),
            TransactionColumn::Description => draft.description = cell.text_or_empty(),
        }
    }

    fn finish(draft: TransactionDraft) -> Option<Self> {
        Some(Self {
            date: draft.date?,
            kind: draft.kind,
            category: draft.category,
            amount: draft.amount?,
            description: draft.description,
        })
    }

    fn get(&self, column: TransactionColumn) -> String {
        match column {
            TransactionColumn::Date => self.date.format(STORAGE_DATE_FORMAT).to_string(),
            TransactionColumn::Kind => self.kind.to_string(),
            TransactionColumn::Category => self.category.clone(),
            TransactionColumn::Amount => self.amount.to_string(),
            TransactionColumn::Description => self.description.clone(),
        }
    }
}

/// The kind of money movement. Labels that are not one of the known kinds are kept verbatim in
/// `Other` so that saving a file never rewrites them.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
    /// Money moved into the travel reserve. It is neither income nor spending.
    TravelReserve,
    Other(String),
    #[default]
    Unset,
}

impl TransactionKind {
    pub fn from_label(s: &str) -> Self {
        match s.trim() {
            INCOME_LABEL => TransactionKind::Income,
            EXPENSE_LABEL => TransactionKind::Expense,
            TRAVEL_RESERVE_LABEL => TransactionKind::TravelReserve,
            "" => TransactionKind::Unset,
            other => TransactionKind::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TransactionKind::Income => INCOME_LABEL,
            TransactionKind::Expense => EXPENSE_LABEL,
            TransactionKind::TravelReserve => TRAVEL_RESERVE_LABEL,
            TransactionKind::Other(s) => s.as_str(),
            TransactionKind::Unset => "",
        }
    }

    /// The kinds a user can pick when adding a transaction.
    pub fn choices() -> [TransactionKind; 3] {
        [
            TransactionKind::Income,
            TransactionKind::Expense,
            TransactionKind::TravelReserve,
        ]
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for TransactionKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TransactionKind::from_label(s))
    }
}

impl Serialize for TransactionKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TransactionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TransactionKind::from_label(&s))
    }
}

/// Represents the known columns of the transactions file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TransactionColumn {
    #[serde(rename = "Data")]
    Date,
    #[serde(rename = "Tipo")]
    Kind,
    #[serde(rename = "Categoria")]
    Category,
    #[serde(rename = "Valor")]
    Amount,
    #[serde(rename = "Descrição")]
    Description,
}

serde_plain::derive_display_from_serialize!(TransactionColumn);
serde_plain::derive_fromstr_from_deserialize!(TransactionColumn);

pub(crate) const INCOME_LABEL: &str = "Receita";
pub(crate) const EXPENSE_LABEL: &str = "Despesa";
pub(crate) const TRAVEL_RESERVE_LABEL: &str = "Reserva para Viagem";

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_column_headers() {
        assert_eq!(TransactionColumn::Description.to_string(), "Descrição");
        assert_eq!(
            "Valor".parse::<TransactionColumn>().unwrap(),
            TransactionColumn::Amount
        );
        assert!("Amount".parse::<TransactionColumn>().is_err());
        assert_eq!(
            Transaction::headers(),
            vec!["Data", "Tipo", "Categoria", "Valor", "Descrição"]
        );
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(
            TransactionKind::from_label("Reserva para Viagem"),
            TransactionKind::TravelReserve
        );
        assert_eq!(TransactionKind::from_label(" Receita "), TransactionKind::Income);
        assert_eq!(
            TransactionKind::from_label("Transferência"),
            TransactionKind::Other("Transferência".into())
        );
        assert_eq!(TransactionKind::from_label(""), TransactionKind::Unset);
        assert_eq!(TransactionKind::Expense.to_string(), "Despesa");
    }

    #[test]
    fn test_set_and_finish() {
        let c = Coercion::storage();
        let mut draft = TransactionDraft::default();
        Transaction::set(&mut draft, TransactionColumn::Date, &"2025-01-15".into(), &c);
        Transaction::set(&mut draft, TransactionColumn::Kind, &"Despesa".into(), &c);
        Transaction::set(&mut draft, TransactionColumn::Category, &"Alimentação".into(), &c);
        Transaction::set(&mut draft, TransactionColumn::Amount, &"4.5".into(), &c);
        let txn = Transaction::finish(draft).unwrap();
        assert_eq!(txn.date(), date(2025, 1, 15));
        assert_eq!(txn.kind(), &TransactionKind::Expense);
        assert_eq!(
            txn.to_row(),
            vec!["2025-01-15", "Despesa", "Alimentação", "4.50", ""]
        );
    }

    #[test]
    fn test_finish_requires_date_and_amount() {
        let mut draft = Transaction::blank();
        assert!(Transaction::finish(draft.clone()).is_none());
        draft.date = Some(date(2025, 1, 1));
        let txn = Transaction::finish(draft).unwrap();
        assert!(txn.amount().is_zero());
    }

    #[test]
    fn test_serialize_json() {
        let txn = Transaction::new(
            date(2025, 2, 3),
            TransactionKind::Income,
            "Salário",
            Amount::from_str("3000").unwrap(),
            "",
        );
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["date"], "2025-02-03");
        assert_eq!(json["kind"], "Receita");
        assert_eq!(json["amount"], "3000.00");
    }
}
