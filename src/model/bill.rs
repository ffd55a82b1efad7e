use crate::model::cell::{format_flag, STORAGE_DATE_FORMAT};
use crate::model::{Amount, Cell, Coercion, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Represents a single row from the bills file: an amount to pay by a due date.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Bill {
    pub(crate) description: String,
    pub(crate) amount: Amount,
    pub(crate) due_date: NaiveDate,
    pub(crate) paid: bool,
}

impl Bill {
    /// Creates an unpaid bill.
    pub fn new(description: impl Into<String>, amount: Amount, due_date: NaiveDate) -> Self {
        Self {
            description: description.into(),
            amount,
            due_date,
            paid: false,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn paid(&self) -> bool {
        self.paid
    }

    pub fn with_paid(mut self, paid: bool) -> Self {
        self.paid = paid;
        self
    }
}

/// A bill row under construction.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct BillDraft {
    pub description: String,
    pub amount: Option<Amount>,
    pub due_date: Option<NaiveDate>,
    pub paid: bool,
}

impl From<Bill> for BillDraft {
    fn from(b: Bill) -> Self {
        Self {
            description: b.description,
            amount: Some(b.amount),
            due_date: Some(b.due_date),
            paid: b.paid,
        }
    }
}

impl Record for Bill {
    type Column = BillColumn;
    type Draft = BillDraft;

    const NAME: &'static str = "bills";

    const COLUMNS: &'static [BillColumn] = &[
        BillColumn::Description,
        BillColumn::Amount,
        BillColumn::DueDate,
        BillColumn::Paid,
    ];

    fn blank() -> BillDraft {
        BillDraft {
            amount: Some(Amount::ZERO),
            ..BillDraft::default()
        }
    }

    fn set(draft: &mut BillDraft, column: BillColumn, cell: &Cell, c: &Coercion) {
        match column {
            BillColumn::Description => draft.description = cell.text_or_empty(),
            BillColumn::Amount => c.assign(&mut draft.amount, c.amount(cell), column),
            BillColumn::DueDate => c.assign(&mut draft.due_date, c.date(cell), column),
            BillColumn::Paid => match c.flag(cell) {
                Some(paid) => draft.paid = paid,
                None => {
                    // Not a required field, so an unreadable flag never drops the row.
                    warn!(
                        "Unable to read '{}' as a yes/no value for '{column}', keeping {}",
                        cell.text_or_empty(),
                        format_flag(draft.paid)
                    );
                }
            },
        }
    }

    fn finish(draft: BillDraft) -> Option<Self> {
        Some(Self {
            description: draft.description,
            amount: draft.amount?,
            due_date: draft.due_date?,
            paid: draft.paid,
        })
    }

    fn get(&self, column: BillColumn) -> String {
        match column {
            BillColumn::Description => self.description.clone(),
            BillColumn::Amount => self.amount.to_string(),
            BillColumn::DueDate => self.due_date.format(STORAGE_DATE_FORMAT).to_string(),
            BillColumn::Paid => format_flag(self.paid).to_string(),
        }
    }
}

/// Represents the known columns of the bills file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum BillColumn {
    #[serde(rename = "Descrição")]
    Description,
    #[serde(rename = "Valor")]
    Amount,
    #[serde(rename = "Data de Vencimento")]
    DueDate,
    #[serde(rename = "Pago")]
    Paid,
}

serde_plain::derive_display_from_serialize!(BillColumn);
serde_plain::derive_fromstr_from_deserialize!(BillColumn);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_headers() {
        assert_eq!(
            Bill::headers(),
            vec!["Descrição", "Valor", "Data de Vencimento", "Pago"]
        );
        assert_eq!(
            "Data de Vencimento".parse::<BillColumn>().unwrap(),
            BillColumn::DueDate
        );
    }

    #[test]
    fn test_blank_defaults() {
        let draft = Bill::blank();
        assert_eq!(draft.amount, Some(Amount::ZERO));
        assert_eq!(draft.due_date, None);
        assert!(!draft.paid);
        assert!(Bill::finish(draft).is_none());
    }

    #[test]
    fn test_unreadable_paid_keeps_value() {
        let c = Coercion::display();
        let mut draft = BillDraft::from(
            Bill::new(
                "Internet",
                Amount::from_str("99.90").unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            )
            .with_paid(true),
        );
        Bill::set(&mut draft, BillColumn::Paid, &"talvez".into(), &c);
        assert!(draft.paid);
        Bill::set(&mut draft, BillColumn::Paid, &Cell::Bool(false), &c);
        assert!(!draft.paid);
    }

    #[test]
    fn test_to_row() {
        let bill = Bill::new(
            "Aluguel",
            Amount::from_str("1500").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
        );
        assert_eq!(bill.to_row(), vec!["Aluguel", "1500.00", "2025-06-05", "False"]);
    }
}
