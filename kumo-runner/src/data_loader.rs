//! Series loading for the runner.
//!
//! Two sources:
//! 1. A CSV file with `Date,Open,High,Low,Close,Volume` columns
//! 2. A deterministic synthetic random walk (tagged as synthetic)
//!
//! Loaded bars are sorted ascending and checked for duplicate timestamps and
//! OHLC sanity. Indicator warm-up is not handled here; that is annotation's job.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use kumo_core::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },
    #[error("duplicate timestamp {0}")]
    DuplicateTimestamp(NaiveDateTime),
    #[error("no usable bars in input")]
    Empty,
}

/// Bars plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedSeries {
    pub bars: Vec<Bar>,
    /// BLAKE3 over every timestamp and OHLCV value.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

impl LoadedSeries {
    pub fn from_bars(bars: Vec<Bar>, has_synthetic: bool) -> Self {
        let dataset_hash = dataset_hash(&bars);
        Self {
            bars,
            dataset_hash,
            has_synthetic,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Load an OHLCV CSV file.
pub fn load_csv(path: &Path) -> Result<LoadedSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_csv(file)?;
    debug!(path = %path.display(), bars = bars.len(), "loaded CSV series");
    Ok(LoadedSeries::from_bars(bars, false))
}

/// Parse OHLCV bars from any CSV reader.
///
/// Header names are matched case-insensitively; extra columns (such as
/// `Adj Close`) are ignored. Rows with an empty price or volume field are
/// skipped with a warning. Anything else malformed is an error.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(LoadError::MissingColumn(name))?;
    }

    let mut bars = Vec::new();
    let mut skipped = 0usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = i + 2;
        let field = |k: usize| record.get(idx[k]).unwrap_or("");

        if (1..6).any(|k| field(k).is_empty()) {
            skipped += 1;
            continue;
        }

        let timestamp = parse_timestamp(field(0)).ok_or_else(|| LoadError::Row {
            row,
            reason: format!("unrecognized date '{}'", field(0)),
        })?;
        let mut values = [0.0f64; 5];
        for (k, value) in values.iter_mut().enumerate() {
            let raw = field(k + 1);
            *value = raw.parse().map_err(|_| LoadError::Row {
                row,
                reason: format!("{} is not a number: '{raw}'", REQUIRED_COLUMNS[k + 1]),
            })?;
        }
        let [open, high, low, close, volume] = values;
        let bar = Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        };
        if !bar.is_sane() {
            return Err(LoadError::Row {
                row,
                reason: format!(
                    "inconsistent OHLCV (o={open}, h={high}, l={low}, c={close}, v={volume})"
                ),
            });
        }
        bars.push(bar);
    }

    if skipped > 0 {
        warn!(skipped, "skipped CSV rows with empty fields");
    }
    if bars.is_empty() {
        return Err(LoadError::Empty);
    }

    bars.sort_by_key(|b| b.timestamp);
    if let Some(pair) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
        return Err(LoadError::DuplicateTimestamp(pair[1].timestamp));
    }
    Ok(bars)
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())
}

/// Deterministic BLAKE3 hash over all bar data.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.timestamp.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Generate `n` weekday bars of a seeded random walk starting at 100.
pub fn synthetic_bars(n: usize, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;
    let mut day = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(NaiveDate::MIN);

    while bars.len() < n {
        if matches!(day.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            day += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.02..0.02);
        let open = price;
        let close = (price * (1.0 + daily_return)).max(1.0);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000.0..5_000_000.0_f64).round();

        bars.push(Bar {
            timestamp: day.and_time(chrono::NaiveTime::MIN),
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        day += Duration::days(1);
    }
    bars
}

/// A synthetic series tagged as such.
pub fn synthetic_series(n: usize, seed: u64) -> LoadedSeries {
    warn!(bars = n, seed, "generating synthetic data; results will be tagged as synthetic");
    LoadedSeries::from_bars(synthetic_bars(n, seed), true)
}
