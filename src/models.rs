use serde::{Deserialize, Serialize};

/// The six switchable map metrics: PM2.5 exposure plus five
/// cause-specific mortality rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Pm25,
    Acute,
    Copd,
    Heart,
    Stroke,
    Lung,
}

impl Metric {
    /// All metrics in UI order (PM2.5 first, matching the selector).
    pub const ALL: [Metric; 6] = [
        Metric::Pm25,
        Metric::Acute,
        Metric::Copd,
        Metric::Heart,
        Metric::Stroke,
        Metric::Lung,
    ];

    /// Human-readable name as shown in the selector and legend title.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Pm25 => "PM2.5",
            Metric::Acute => "Acute Infections",
            Metric::Copd => "COPD",
            Metric::Heart => "Heart Disease",
            Metric::Stroke => "Stroke",
            Metric::Lung => "Lung Cancer",
        }
    }

    /// Unit suffix for the legend title.
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Pm25 => "µg/m³",
            _ => "/100k",
        }
    }

    /// Parse a selector key. Unknown keys yield `None` so a bad value
    /// degrades to "no data" rendering instead of panicking.
    pub fn from_key(key: &str) -> Option<Metric> {
        match key {
            "pm25" => Some(Metric::Pm25),
            "acute" => Some(Metric::Acute),
            "copd" => Some(Metric::Copd),
            "heart" => Some(Metric::Heart),
            "stroke" => Some(Metric::Stroke),
            "lung" => Some(Metric::Lung),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Metric::Pm25 => "pm25",
            Metric::Acute => "acute",
            Metric::Copd => "copd",
            Metric::Heart => "heart",
            Metric::Stroke => "stroke",
            Metric::Lung => "lung",
        }
    }
}

/// Raw row of the PM2.5 table (`Location, Period, PM25`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pm25Row {
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Period", default, deserialize_with = "de_opt_i32_lenient")]
    pub year: Option<i32>,
    #[serde(rename = "PM25", default, deserialize_with = "de_opt_f64_lenient")]
    pub pm25: Option<f64>,
}

/// Raw row of the mortality table: five per-100k rates, each
/// independently possibly missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MortalityRow {
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Period", default, deserialize_with = "de_opt_i32_lenient")]
    pub year: Option<i32>,
    #[serde(
        rename = "acute_lower_respiratoryinfections_per100k",
        default,
        deserialize_with = "de_opt_f64_lenient"
    )]
    pub acute: Option<f64>,
    #[serde(
        rename = "chronic_obstructive_pulmonary_disease_per100k",
        default,
        deserialize_with = "de_opt_f64_lenient"
    )]
    pub copd: Option<f64>,
    #[serde(
        rename = "ischaemic_heart_disease_per100k",
        default,
        deserialize_with = "de_opt_f64_lenient"
    )]
    pub heart: Option<f64>,
    #[serde(rename = "stroke_per100k", default, deserialize_with = "de_opt_f64_lenient")]
    pub stroke: Option<f64>,
    #[serde(
        rename = "trachea_bronchus_lung_cancers_per100k",
        default,
        deserialize_with = "de_opt_f64_lenient"
    )]
    pub lung: Option<f64>,
}

/// The five mortality rates for one (year, country) cell.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MortalityRates {
    pub acute: Option<f64>,
    pub copd: Option<f64>,
    pub heart: Option<f64>,
    pub stroke: Option<f64>,
    pub lung: Option<f64>,
}

impl MortalityRates {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Pm25 => None,
            Metric::Acute => self.acute,
            Metric::Copd => self.copd,
            Metric::Heart => self.heart,
            Metric::Stroke => self.stroke,
            Metric::Lung => self.lung,
        }
    }
}

/// The single mutable UI state for the session. Owned and mutated only
/// by the interaction controller; everything else reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub year: i32,
    pub metric: Metric,
    pub playing: bool,
}

impl ViewState {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            metric: Metric::Pm25,
            playing: false,
        }
    }
}

/// Serde helper: parse an optional `f64` from a number, a numeric string,
/// or anything else (empty cells, junk text, explicit null) as `None`.
/// CSV sources routinely mix these; a bad cell must never abort a load.
pub(crate) fn de_opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct LenientF64;

    impl<'de> Visitor<'de> for LenientF64 {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number, a numeric string, or an empty/missing value")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.is_finite().then_some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
            Ok(s.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientF64)
}

/// Same leniency for year columns: unparsable periods become `None` and
/// the row is skipped downstream.
pub(crate) fn de_opt_i32_lenient<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = de_opt_f64_lenient(deserializer)?;
    Ok(v.map(|f| f as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_keys_round_trip() {
        for m in Metric::ALL {
            assert_eq!(Metric::from_key(m.key()), Some(m));
        }
        assert_eq!(Metric::from_key("cholera"), None);
        assert_eq!(Metric::from_key(""), None);
    }

    #[test]
    fn view_state_serde_round_trip() {
        let state = ViewState {
            year: 2015,
            metric: Metric::Stroke,
            playing: true,
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn lenient_fields_accept_numbers_strings_and_nulls() {
        let row: Pm25Row =
            serde_json::from_str(r#"{"Location":"A","Period":"2010","PM25":null}"#).unwrap();
        assert_eq!(row.year, Some(2010));
        assert_eq!(row.pm25, None);

        let row: Pm25Row =
            serde_json::from_str(r#"{"Location":"B","Period":2011,"PM25":"12.5"}"#).unwrap();
        assert_eq!(row.year, Some(2011));
        assert_eq!(row.pm25, Some(12.5));

        // Absent optional columns default to None instead of erroring.
        let row: Pm25Row = serde_json::from_str(r#"{"Location":"C","Period":2012}"#).unwrap();
        assert_eq!(row.year, Some(2012));
        assert_eq!(row.pm25, None);

        let row: Pm25Row =
            serde_json::from_str(r#"{"Location":"D","Period":"junk","PM25":"NaN"}"#).unwrap();
        assert_eq!(row.year, None);
        assert_eq!(row.pm25, None);
    }

    #[test]
    fn metric_units() {
        assert_eq!(Metric::Pm25.unit(), "µg/m³");
        for m in [
            Metric::Acute,
            Metric::Copd,
            Metric::Heart,
            Metric::Stroke,
            Metric::Lung,
        ] {
            assert_eq!(m.unit(), "/100k");
        }
    }
}
