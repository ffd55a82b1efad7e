//! Transaction categories.
//!
//! Categories are free text on each transaction. A fixed core set is always offered when adding a
//! transaction, and any other category already present in the data is offered as well. Matching
//! is exact and case-sensitive: `Lazer` and `lazer` are two categories.

use crate::model::Transaction;

/// Food, Travel, Income, Salary, Rent, Other.
pub const CORE_CATEGORIES: [&str; 6] = [
    "Alimentação",
    "Viagem",
    "Receita",
    "Salário",
    "Aluguel",
    "Outros",
];

/// The categories to offer in a picker: categories found in `transactions` that are not part of
/// the core set, in the order they first appear, followed by the core set.
pub fn category_options(transactions: &[Transaction]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for txn in transactions {
        let category = txn.category();
        if !is_meaningful(category) || CORE_CATEGORIES.contains(&category) {
            continue;
        }
        if !options.iter().any(|o| o == category) {
            options.push(category.to_string());
        }
    }
    options.extend(CORE_CATEGORIES.iter().map(|s| s.to_string()));
    options
}

/// The transactions whose category is exactly `category`.
pub fn filter_by_category<'a>(
    transactions: &'a [Transaction],
    category: &str,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| t.category() == category)
        .collect()
}

/// Cleans a category typed into the add form. Returns `None` if nothing is left.
pub fn normalize_new_category(category: &str) -> Option<String> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Blank cells and the literal `nan` left behind by spreadsheet tools are not categories.
fn is_meaningful(category: &str) -> bool {
    let trimmed = category.trim();
    !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("nan")
}
