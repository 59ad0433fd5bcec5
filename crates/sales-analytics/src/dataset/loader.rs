//! CSV loader
//!
//! The source file is `;`-separated with a header row. Dates may be day-first
//! (`15/01/2024`) or ISO, decimals may use `.` or `,`. Columns beyond the
//! required ones are ignored.

use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;

use crate::error::{AnalyticsError, Result};
use crate::model::SalesRecord;

const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

/// Header positions of the required columns
struct Columns {
    date: usize,
    product_id: usize,
    local: usize,
    planned_quantity: usize,
    actual_quantity: usize,
    actual_price: usize,
    promotion_type: usize,
    service_level: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(AnalyticsError::MissingColumn(name))
        };

        Ok(Self {
            date: find("date")?,
            product_id: find("product_id")?,
            local: find("local")?,
            planned_quantity: find("planned_quantity")?,
            actual_quantity: find("actual_quantity")?,
            actual_price: find("actual_price")?,
            promotion_type: find("promotion_type")?,
            service_level: find("service_level")?,
        })
    }

    fn parse(&self, row: &StringRecord, line: u64) -> Result<SalesRecord> {
        let cell = |idx: usize| row.get(idx).unwrap_or("").trim();
        let invalid = |field: &'static str, value: &str| AnalyticsError::InvalidField {
            line,
            field,
            value: value.to_string(),
        };

        let date = parse_date(cell(self.date)).ok_or_else(|| invalid("date", cell(self.date)))?;

        let text = |idx: usize, field: &'static str| {
            let value = cell(idx);
            if value.is_empty() {
                Err(invalid(field, value))
            } else {
                Ok(value.to_string())
            }
        };
        let number = |idx: usize, field: &'static str| {
            parse_decimal(cell(idx)).ok_or_else(|| invalid(field, cell(idx)))
        };

        let promotion = cell(self.promotion_type);
        let promotion_type = (!promotion.is_empty() && !promotion.eq_ignore_ascii_case("nan"))
            .then(|| promotion.to_string());

        Ok(SalesRecord {
            date,
            product_id: text(self.product_id, "product_id")?,
            local: text(self.local, "local")?,
            planned_quantity: number(self.planned_quantity, "planned_quantity")?,
            actual_quantity: number(self.actual_quantity, "actual_quantity")?,
            actual_price: number(self.actual_price, "actual_price")?,
            promotion_type,
            service_level: parse_service_level(cell(self.service_level))
                .ok_or_else(|| invalid("service_level", cell(self.service_level)))?,
        })
    }
}

/// Read every row from a `;`-separated source
pub fn read_records<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::resolve(csv.headers()?)?;

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line = row.position().map_or(0, csv::Position::line);
        records.push(columns.parse(&row, line)?);
    }
    Ok(records)
}

/// Day-first or ISO date, an optional time part is dropped
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.split_whitespace().next()?;
    let day = day.split('T').next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

/// Decimal with `.` or `,` as separator; `1.234,5` is read as 1234.5
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let normalized = if raw.contains(',') && raw.contains('.') {
        raw.replace('.', "").replace(',', ".")
    } else {
        raw.replace(',', ".")
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Service level as a fraction; `95%` is accepted as 0.95
fn parse_service_level(raw: &str) -> Option<Decimal> {
    match raw.strip_suffix('%') {
        Some(pct) => parse_decimal(pct).map(|v| v / Decimal::ONE_HUNDRED),
        None => parse_decimal(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str =
        "date;product_id;local;planned_quantity;actual_quantity;actual_price;promotion_type;service_level\n";

    #[test]
    fn test_reads_day_first_rows() {
        let data = format!("{HEADER}15/01/2024;P1;SP;100;120;2,50;desconto;0.97\n");
        let records = read_records(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(r.actual_price, dec!(2.50));
        assert_eq!(r.promotion_type.as_deref(), Some("desconto"));
    }

    #[test]
    fn test_blank_promotion_and_extra_columns() {
        let data = "extra;date;product_id;local;planned_quantity;actual_quantity;actual_price;promotion_type;service_level\n\
                    x;2024-02-01;P2;RJ;10;8;1.5;;95%\n";
        let records = read_records(data.as_bytes()).unwrap();

        assert_eq!(records[0].promotion_type, None);
        assert_eq!(records[0].service_level, dec!(0.95));
    }

    #[test]
    fn test_missing_column() {
        let data = "date;product_id;local\n01/01/2024;P1;SP\n";
        assert!(matches!(
            read_records(data.as_bytes()),
            Err(AnalyticsError::MissingColumn("planned_quantity"))
        ));
    }

    #[test]
    fn test_invalid_cell_reports_line() {
        let data = format!("{HEADER}15/01/2024;P1;SP;100;muito;2.5;;0.9\n");
        let err = read_records(data.as_bytes()).unwrap_err();

        assert!(matches!(
            err,
            AnalyticsError::InvalidField { line: 2, field: "actual_quantity", .. }
        ));
    }

    #[test]
    fn test_decimal_separators() {
        assert_eq!(parse_decimal("1.234,5"), Some(dec!(1234.5)));
        assert_eq!(parse_decimal("0,25"), Some(dec!(0.25)));
        assert_eq!(parse_decimal("12"), Some(dec!(12)));
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn test_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("05/03/2024"), Some(d));
        assert_eq!(parse_date("2024-03-05 00:00:00"), Some(d));
        assert_eq!(parse_date("ontem"), None);
    }
}
