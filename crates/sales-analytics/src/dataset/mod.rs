//! Sales Dataset
//!
//! The in-memory table every tool reads. Loaded once, then shared read-only
//! behind an `Arc`.

mod loader;

pub use loader::{parse_date, parse_decimal};

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::{Dimension, SalesRecord};

/// Immutable collection of sales rows
#[derive(Clone, Debug, Default)]
pub struct SalesDataset {
    records: Vec<SalesRecord>,
}

impl SalesDataset {
    pub const fn from_records(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    /// Load a `;`-separated CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(BufReader::new(file))?;

        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            "Sales dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from_records(loader::read_records(reader)?))
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last date present
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    /// Number of distinct values in a column
    pub fn distinct(&self, dimension: Dimension) -> usize {
        self.records
            .iter()
            .map(|r| dimension.key(r))
            .collect::<BTreeSet<_>>()
            .len()
    }
}

impl<'a> IntoIterator for &'a SalesDataset {
    type Item = &'a SalesRecord;
    type IntoIter = std::slice::Iter<'a, SalesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "date;product_id;local;planned_quantity;actual_quantity;actual_price;promotion_type;service_level\n\
        01/01/2024;P1;SP;10;12;2.0;;0.98\n\
        03/01/2024;P2;SP;5;4;3.0;desconto;0.90\n\
        02/01/2024;P1;RJ;8;8;2.0;;0.99\n";

    #[test]
    fn test_from_reader() {
        let ds = SalesDataset::from_reader(CSV.as_bytes()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.distinct(Dimension::Product), 2);
        assert_eq!(ds.distinct(Dimension::Location), 2);

        let (first, last) = ds.date_range().unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn test_empty_dataset() {
        let ds = SalesDataset::default();
        assert!(ds.is_empty());
        assert_eq!(ds.date_range(), None);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SalesDataset::load("/definitely/not/here.csv"),
            Err(crate::error::AnalyticsError::Io(_))
        ));
    }
}
