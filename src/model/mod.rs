//! Types that represent the core data model, such as `Transaction` and `Bill`.
mod amount;
mod bill;
mod category;
mod cell;
mod record;
mod transaction;

pub use amount::{currency, Amount, AmountError, DEFAULT_CURRENCY, MAX_AMOUNT};
pub use bill::{Bill, BillColumn, BillDraft};
pub use category::{category_options, filter_by_category, normalize_new_category, CORE_CATEGORIES};
pub use cell::{
    format_flag, parse_flag, Cell, Coercion, InvalidEdit, DISPLAY_DATE_FORMAT, STORAGE_DATE_FORMAT,
};
pub use record::{column, Record};
pub use transaction::{Transaction, TransactionColumn, TransactionDraft, TransactionKind};
