//! CSV ingestion and the lookup index driving the map.
//!
//! The index turns raw rows into `(year -> country -> value)` maps and the
//! sorted distinct year set that bounds the slider. Country display names are
//! the join key across all sources; no normalization happens here, so a
//! spelling mismatch silently renders as "no data".

use crate::models::{MortalityRates, MortalityRow, Pm25Row};
use crate::Metric;
use ahash::AHashMap;
use std::io;
use std::path::Path;

/// Errors raised while loading the input tables.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("i/o error reading {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed csv in {name}: {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },
    #[error("malformed geojson in {name}: {source}")]
    GeoJson {
        name: String,
        #[source]
        source: geojson::Error,
    },
    #[error("{name} contained no usable rows")]
    Empty { name: String },
}

/// Read the PM2.5 table (`Location, Period, PM25`) from a reader.
/// Rows with an unparsable year are dropped (and logged); unparsable
/// values survive as missing so the country still appears in the index.
pub fn load_pm25_csv<R: io::Read>(reader: R) -> Result<Vec<Pm25Row>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.deserialize::<Pm25Row>() {
        match rec {
            Ok(row) if row.year.is_some() => rows.push(row),
            Ok(row) => {
                skipped += 1;
                log::warn!("pm25: dropping row for {:?} with unparsable year", row.location);
            }
            Err(e) => {
                return Err(LoadError::Csv {
                    name: "pm25".into(),
                    source: e,
                });
            }
        }
    }
    if rows.is_empty() {
        return Err(LoadError::Empty { name: "pm25".into() });
    }
    log::info!("pm25: loaded {} rows ({} skipped)", rows.len(), skipped);
    Ok(rows)
}

/// Read the mortality table from a reader. Same row policy as
/// [`load_pm25_csv`]: a bad year drops the row, a bad rate cell only
/// blanks that cell.
pub fn load_mortality_csv<R: io::Read>(reader: R) -> Result<Vec<MortalityRow>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.deserialize::<MortalityRow>() {
        match rec {
            Ok(row) if row.year.is_some() => rows.push(row),
            Ok(row) => {
                skipped += 1;
                log::warn!(
                    "mortality: dropping row for {:?} with unparsable year",
                    row.location
                );
            }
            Err(e) => {
                return Err(LoadError::Csv {
                    name: "mortality".into(),
                    source: e,
                });
            }
        }
    }
    if rows.is_empty() {
        return Err(LoadError::Empty {
            name: "mortality".into(),
        });
    }
    log::info!("mortality: loaded {} rows ({} skipped)", rows.len(), skipped);
    Ok(rows)
}

pub fn load_pm25_csv_path<P: AsRef<Path>>(path: P) -> Result<Vec<Pm25Row>, LoadError> {
    let name = path.as_ref().display().to_string();
    let f = std::fs::File::open(&path).map_err(|source| LoadError::Io {
        name: name.clone(),
        source,
    })?;
    load_pm25_csv(io::BufReader::new(f))
}

pub fn load_mortality_csv_path<P: AsRef<Path>>(path: P) -> Result<Vec<MortalityRow>, LoadError> {
    let name = path.as_ref().display().to_string();
    let f = std::fs::File::open(&path).map_err(|source| LoadError::Io {
        name: name.clone(),
        source,
    })?;
    load_mortality_csv(io::BufReader::new(f))
}

/// Lookup tables built once from the loaded rows; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    /// Sorted distinct years of the PM2.5 table. Mortality-only years are
    /// deliberately not included: lookups for them simply miss, matching
    /// the slider being bounded by the PM2.5 coverage.
    years: Vec<i32>,
    pm25: AHashMap<i32, AHashMap<String, f64>>,
    mortality: AHashMap<i32, AHashMap<String, MortalityRates>>,
}

impl DatasetIndex {
    /// Build the index. Duplicate (year, country) entries overwrite
    /// (last-write-wins), the usual CSV ingestion semantics.
    pub fn build(pm25_rows: &[Pm25Row], mortality_rows: &[MortalityRow]) -> Self {
        let mut pm25: AHashMap<i32, AHashMap<String, f64>> = AHashMap::new();
        let mut years: std::collections::BTreeSet<i32> = std::collections::BTreeSet::new();
        for row in pm25_rows {
            let Some(year) = row.year else { continue };
            let by_country = pm25.entry(year).or_default();
            if let Some(v) = row.pm25 {
                by_country.insert(row.location.clone(), v);
            }
            years.insert(year);
        }
        let years: Vec<i32> = years.into_iter().collect();

        let mut mortality: AHashMap<i32, AHashMap<String, MortalityRates>> = AHashMap::new();
        for row in mortality_rows {
            let Some(year) = row.year else { continue };
            mortality.entry(year).or_default().insert(
                row.location.clone(),
                MortalityRates {
                    acute: row.acute,
                    copd: row.copd,
                    heart: row.heart,
                    stroke: row.stroke,
                    lung: row.lung,
                },
            );
        }

        Self {
            years,
            pm25,
            mortality,
        }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn min_year(&self) -> Option<i32> {
        self.years.first().copied()
    }

    pub fn max_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    /// The value behind (metric, year, country), or `None` when the triple
    /// has no record. An explicit presence check: a stored 0.0 is returned
    /// as `Some(0.0)`, never conflated with missing.
    pub fn value(&self, metric: Metric, year: i32, country: &str) -> Option<f64> {
        match metric {
            Metric::Pm25 => self.pm25.get(&year)?.get(country).copied(),
            m => self.mortality.get(&year)?.get(country)?.get(m),
        }
    }

    /// All five mortality rates for a (year, country) cell, for tooltips.
    pub fn rates(&self, year: i32, country: &str) -> Option<&MortalityRates> {
        self.mortality.get(&year)?.get(country)
    }

    /// Maximum of a metric over all years and countries, ignoring missing
    /// cells. `None` when the metric has no data at all.
    pub fn metric_max(&self, metric: Metric) -> Option<f64> {
        let mut max: Option<f64> = None;
        let mut consider = |v: f64| {
            max = Some(match max {
                Some(m) if m >= v => m,
                _ => v,
            });
        };
        match metric {
            Metric::Pm25 => {
                for by_country in self.pm25.values() {
                    for v in by_country.values() {
                        consider(*v);
                    }
                }
            }
            m => {
                for by_country in self.mortality.values() {
                    for rates in by_country.values() {
                        if let Some(v) = rates.get(m) {
                            consider(v);
                        }
                    }
                }
            }
        }
        max
    }
}
