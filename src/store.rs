//! Loading and saving the data files.
//!
//! Each collection lives in its own CSV file with a header row. Loading never fails: a missing
//! file is an empty collection, and an unreadable file is an empty collection together with the
//! problem that was encountered. Rows whose date or amount cannot be read are dropped.

use crate::error::{Error, ErrorType, IntoResult, Res};
use crate::model::{column, Cell, Coercion, Record};
use crate::utils;
use anyhow::{bail, Context};
use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The result of loading a data file.
#[derive(Debug)]
pub struct Loaded<R: Record> {
    /// The rows that could be read.
    pub records: Vec<R>,
    /// The number of rows dropped because a required field could not be coerced.
    pub dropped: usize,
    /// Set when the file exists but could not be read at all. `records` is empty in that case.
    pub problem: Option<Error>,
}

impl<R: Record> Loaded<R> {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            dropped: 0,
            problem: None,
        }
    }

    fn failed(problem: Error) -> Self {
        Self {
            problem: Some(problem),
            ..Self::empty()
        }
    }
}

/// Reads and writes the data files, keeping the most recently loaded collection of each file in
/// memory until it is saved.
#[derive(Default)]
pub struct Store {
    cache: HashMap<PathBuf, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("cached", &self.cache.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the records stored at `path`.
    pub async fn load<R: Record>(&mut self, path: &Path) -> Loaded<R> {
        if let Some(records) = self.cached::<R>(path) {
            debug!("Cache hit for {} at {}", R::NAME, path.display());
            return Loaded {
                records,
                dropped: 0,
                problem: None,
            };
        }

        let content = match utils::read_if_exists(path).await {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!("No {} file at {}, starting empty", R::NAME, path.display());
                return Loaded::empty();
            }
            Err(e) => {
                let problem = Error::new(ErrorType::Io, e);
                warn!("Unable to read {}: {problem}", R::NAME);
                return Loaded::failed(problem);
            }
        };

        match parse::<R>(&content) {
            Ok((records, dropped)) => {
                if dropped > 0 {
                    warn!(
                        "Dropped {dropped} {} from {} with an unreadable date or amount",
                        utils::plural(dropped, "row", "rows"),
                        path.display()
                    );
                }
                self.cache
                    .insert(path.to_path_buf(), Box::new(records.clone()));
                Loaded {
                    records,
                    dropped,
                    problem: None,
                }
            }
            Err(e) => {
                let problem = Error::new(
                    ErrorType::Parse,
                    e.context(format!("Unable to parse {}", path.display())),
                );
                warn!("Unable to load {}: {problem}", R::NAME);
                Loaded::failed(problem)
            }
        }
    }

    /// Replaces the contents of the file at `path` with `records` and forgets any cached copy.
    pub async fn save<R: Record>(&mut self, path: &Path, records: &[R]) -> crate::Result<()> {
        let data = serialize(records).pub_result(ErrorType::Internal)?;
        // The cached copy is stale whether or not the write succeeds.
        self.invalidate(path);
        utils::write_replace(path, data)
            .await
            .with_context(|| format!("Unable to save {}", R::NAME))
            .pub_result(ErrorType::Io)?;
        debug!(
            "Saved {} {} to {}",
            records.len(),
            R::NAME,
            path.display()
        );
        Ok(())
    }

    /// Forgets the cached copy of the file at `path`, if any.
    pub fn invalidate(&mut self, path: &Path) {
        if self.cache.remove(path).is_some() {
            debug!("Invalidated the cached copy of {}", path.display());
        }
    }

    fn cached<R: Record>(&self, path: &Path) -> Option<Vec<R>> {
        self.cache
            .get(path)
            .and_then(|entry| entry.downcast_ref::<Vec<R>>())
            .cloned()
    }
}

/// Parses CSV text into records, returning the records and the number of dropped rows.
fn parse<R: Record>(content: &str) -> Res<(Vec<R>, usize)> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Unable to read the header row")?.clone();
    let mut columns = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        let col = column::<R>(header);
        if col.is_none() {
            warn!("Ignoring unknown column '{header}' in {}", R::NAME);
        }
        columns.push(col);
    }
    let missing: Vec<String> = R::COLUMNS
        .iter()
        .filter(|c| !columns.contains(&Some(**c)))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        bail!(
            "The header row of {} is missing {}",
            R::NAME,
            missing.join(", ")
        );
    }

    let coercion = Coercion::storage();
    let mut records = Vec::new();
    let mut dropped = 0;
    for (i, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Unable to read row {}", i + 1))?;
        let mut draft = R::Draft::default();
        for (col, value) in columns.iter().zip(row.iter()) {
            if let Some(col) = col {
                R::set(&mut draft, *col, &Cell::from(value), &coercion);
            }
        }
        match R::finish(draft) {
            Some(record) => records.push(record),
            None => {
                // Line 1 is the header.
                warn!("Dropping {} row on line {}", R::NAME, i + 2);
                dropped += 1;
            }
        }
    }
    Ok((records, dropped))
}

fn serialize<R: Record>(records: &[R]) -> Res<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::headers())?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to flush the CSV writer: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Bill, Transaction, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    const TRANSACTIONS: &str = "\
Data,Tipo,Categoria,Valor,Descrição
2025-01-05,Receita,Salário,3000,Janeiro
2025-01-10,Despesa,Alimentação,45.5,Mercado
not a date,Despesa,Alimentação,10,Sem data
2025-01-12,Despesa,Lazer,abc,Sem valor
2025-01-20,Reserva para Viagem,Viagem,200,
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::new();
        let loaded = store
            .load::<Transaction>(&dir.path().join("transactions.csv"))
            .await;
        assert!(loaded.records.is_empty());
        assert!(loaded.problem.is_none());
    }

    #[tokio::test]
    async fn test_load_drops_unreadable_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.csv");
        utils::write(&path, TRANSACTIONS).await.unwrap();

        let mut store = Store::new();
        let loaded = store.load::<Transaction>(&path).await;
        assert!(loaded.problem.is_none());
        assert_eq!(loaded.dropped, 2);
        assert_eq!(loaded.records.len(), 3);
        assert_eq!(loaded.records[1].amount().to_string(), "45.50");
        assert_eq!(loaded.records[2].kind(), &TransactionKind::TravelReserve);
        assert_eq!(loaded.records[2].date(), date(2025, 1, 20));
    }

    #[tokio::test]
    async fn test_load_bad_header_is_a_problem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bills.csv");
        utils::write(&path, "Descrição,Valor\nLuz,100\n")
            .await
            .unwrap();

        let mut store = Store::new();
        let loaded = store.load::<Bill>(&path).await;
        assert!(loaded.records.is_empty());
        let problem = loaded.problem.unwrap();
        assert_eq!(problem.error_type(), ErrorType::Parse);
        assert!(problem.to_string().contains("Data de Vencimento"));

        // failed loads are not cached
        utils::write(&path, "Descrição,Valor,Data de Vencimento,Pago\nLuz,100,2025-02-01,sim\n")
            .await
            .unwrap();
        let loaded = store.load::<Bill>(&path).await;
        assert_eq!(loaded.records.len(), 1);
        assert!(loaded.records[0].paid());
    }

    #[tokio::test]
    async fn test_load_ignores_unknown_columns_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bills.csv");
        let csv = "Pago,Notas,Data de Vencimento,Valor,Descrição\n\
                   ,x,2025-03-10,80,Água\n\
                   talvez,,2025-03-12,20,Gás\n";
        utils::write(&path, csv).await.unwrap();

        let loaded = Store::new().load::<Bill>(&path).await;
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].description(), "Água");
        assert!(!loaded.records[0].paid());
        assert!(!loaded.records[1].paid());
    }

    #[tokio::test]
    async fn test_save_then_load_is_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.csv");
        utils::write(&path, TRANSACTIONS).await.unwrap();

        let mut store = Store::new();
        let first = store.load::<Transaction>(&path).await.records;
        store.save(&path, &first).await.unwrap();
        let second = store.load::<Transaction>(&path).await;
        assert_eq!(first, second.records);
        assert_eq!(second.dropped, 0);

        let text = utils::read(&path).await.unwrap();
        assert!(text.starts_with("Data,Tipo,Categoria,Valor,Descrição\n"));
        assert!(text.contains("2025-01-10,Despesa,Alimentação,45.50,Mercado"));
    }

    #[tokio::test]
    async fn test_save_invalidates_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bills.csv");
        let mut store = Store::new();

        let bill = Bill::new("Luz", Amount::from_str("120").unwrap(), date(2025, 4, 1));
        store.save(&path, &[bill.clone()]).await.unwrap();
        assert_eq!(store.load::<Bill>(&path).await.records.len(), 1);

        // a write behind the store's back is not seen while cached
        utils::write(&path, "Descrição,Valor,Data de Vencimento,Pago\n")
            .await
            .unwrap();
        assert_eq!(store.load::<Bill>(&path).await.records.len(), 1);

        let paid = bill.with_paid(true);
        store.save(&path, &[paid.clone()]).await.unwrap();
        assert_eq!(store.load::<Bill>(&path).await.records, vec![paid]);
    }

    #[tokio::test]
    async fn test_load_drops_amounts_too_large_to_total() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.csv");
        let csv = "Data,Tipo,Categoria,Valor,Descrição\n\
                   2025-01-05,Receita,Salário,79228162514264337593543950335,\n\
                   2025-01-06,Receita,Salário,79228162514264337593543950335,\n\
                   2025-01-07,Despesa,Lazer,10,\n";
        utils::write(&path, csv).await.unwrap();

        let loaded = Store::new().load::<Transaction>(&path).await;
        assert!(loaded.problem.is_none());
        assert_eq!(loaded.dropped, 2);
        assert_eq!(loaded.records.len(), 1);
        let balance = crate::report::cash_balance(&loaded.records, &[]);
        assert_eq!(balance, Decimal::from(-10));
    }

    #[tokio::test]
    async fn test_save_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("bills.csv");
        let result = Store::new().save::<Bill>(&path, &[]).await;
        assert_eq!(result.unwrap_err().error_type(), ErrorType::Io);
    }
}
