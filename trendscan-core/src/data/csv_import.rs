//! CSV file provider.
//!
//! Reads `<dir>/<SYMBOL>.csv` with a header row naming at least `date`,
//! `open`, `high`, `low`, `close` (any case, any order) and optionally
//! `volume`. Extra columns are ignored.

use super::provider::{normalize_symbol, DataError, DataProvider, DataSource};
use crate::domain::{Bar, PriceSeries};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(symbol: &str, headers: &csv::StringRecord) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| DataError::Csv {
                symbol: symbol.to_string(),
                reason: format!("missing '{name}' column"),
            })
        };
        Ok(Self {
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", normalize_symbol(symbol)))
    }

    /// Parse CSV text into bars in file order.
    pub fn parse<R: std::io::Read>(symbol: &str, reader: R) -> Result<Vec<Bar>, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let csv_err = |line: u64, reason: String| DataError::Csv {
            symbol: symbol.to_string(),
            reason: format!("line {line}: {reason}"),
        };

        let headers = rdr
            .headers()
            .map_err(|e| csv_err(1, e.to_string()))?
            .clone();
        let cols = Columns::from_headers(symbol, &headers)?;

        let mut bars = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let line = i as u64 + 2;
            let record = record.map_err(|e| csv_err(line, e.to_string()))?;
            let cell = |idx: usize| record.get(idx).unwrap_or("");
            let number = |idx: usize, name: &str| {
                cell(idx)
                    .parse::<f64>()
                    .map_err(|_| csv_err(line, format!("bad {name} '{}'", cell(idx))))
            };

            // Exports often carry a time component: keep the leading date.
            let raw_date = cell(cols.date);
            let date = raw_date
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .ok_or_else(|| csv_err(line, format!("bad date '{raw_date}'")))?;

            let volume = match cols.volume.map(cell) {
                None | Some("") => None,
                Some(v) => Some(
                    v.parse::<f64>()
                        .map(|v| v.max(0.0) as u64)
                        .map_err(|_| csv_err(line, format!("bad volume '{v}'")))?,
                ),
            };

            let bar = Bar {
                date,
                open: number(cols.open, "open")?,
                high: number(cols.high, "high")?,
                low: number(cols.low, "low")?,
                close: number(cols.close, "close")?,
                volume,
            };
            if !bar.is_sane() {
                return Err(csv_err(
                    line,
                    format!(
                        "prices must be finite, positive and within high/low \
                         (open {}, high {}, low {}, close {})",
                        bar.open, bar.high, bar.low, bar.close
                    ),
                ));
            }
            bars.push(bar);
        }
        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let symbol = normalize_symbol(symbol);
        let path = self.path_for(&symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound { symbol });
        }
        let file = std::fs::File::open(&path)?;
        let bars = Self::parse(&symbol, file)?;
        let series = PriceSeries::canonicalize(&symbol, bars).between(start, end);
        if series.is_empty() {
            return Err(DataError::NoData { symbol });
        }
        tracing::debug!(
            symbol = %symbol,
            path = %path.display(),
            bars = series.len(),
            "loaded CSV"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive_and_unordered() {
        let text = "Close,Date,High,Low,Open,Volume,Adj Close\n\
                    101.5,2024-01-02,102,99,100,5000,101.4\n";
        let bars = CsvProvider::parse("SPY", text.as_bytes()).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 101.5);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].volume, Some(5000));
    }

    #[test]
    fn volume_is_optional() {
        let text = "date,open,high,low,close\n2024-01-02,1,2,0.5,1.5\n";
        let bars = CsvProvider::parse("X", text.as_bytes()).unwrap();
        assert_eq!(bars[0].volume, None);

        let text = "date,open,high,low,close,volume\n2024-01-02,1,2,0.5,1.5,\n";
        let bars = CsvProvider::parse("X", text.as_bytes()).unwrap();
        assert_eq!(bars[0].volume, None);
    }

    #[test]
    fn datetime_cells_keep_the_date() {
        let text = "date,open,high,low,close\n2024-01-02 00:00:00-05:00,1,2,0.5,1.5\n";
        let bars = CsvProvider::parse("X", text.as_bytes()).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn missing_column_is_reported() {
        let text = "date,open,high,close\n2024-01-02,1,2,1.5\n";
        let err = CsvProvider::parse("X", text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing 'low' column"), "{err}");
    }

    #[test]
    fn bad_number_reports_line() {
        let text = "date,open,high,low,close\n2024-01-02,1,2,0.5,1.5\n2024-01-03,1,2,0.5,n/a\n";
        let err = CsvProvider::parse("X", text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn non_finite_or_zero_prices_are_rejected() {
        let text = "date,open,high,low,close\n2024-01-02,1,2,0.5,1.5\n2024-01-03,1,2,0.5,NaN\n";
        let err = CsvProvider::parse("X", text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");

        let text = "date,open,high,low,close\n2024-01-02,0,0,0,0\n";
        let err = CsvProvider::parse("X", text.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Csv { .. }));
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn path_uses_normalized_symbol() {
        let provider = CsvProvider::new("/data");
        assert_eq!(provider.path_for(" spy "), PathBuf::from("/data/SPY.csv"));
    }
}
