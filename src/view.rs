//! The one place that derives everything visible from the current state.
//!
//! `render` is a pure function of `(ViewState, hovered, index, countries)`;
//! calling it twice with the same inputs yields the same frame, which is what
//! makes year scrubbing, metric switching, and playback all just "rebuild the
//! frame" operations.

use crate::dataset::DatasetIndex;
use crate::models::{Metric, ViewState};
use crate::scale::{fill_for, ColorScale, Fill};
use num_format::{Locale, ToFormattedString};

/// Number of tick labels requested along the legend bar.
pub const LEGEND_TICKS: usize = 6;

/// Fixed heading phrase; the current year is appended in parentheses.
pub const TITLE_PHRASE: &str = "How Air Pollution Affects Health Over Time";

/// Legend description: the active domain plus its tick labels and title.
/// The gradient itself is sampled by the painter from [`ColorScale::sample`].
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: String,
    pub scale: ColorScale,
    pub ticks: Vec<f64>,
}

impl Legend {
    fn for_metric(metric: Metric, scale: ColorScale) -> Self {
        Self {
            title: format!("{} ({})", metric.label(), metric.unit()),
            scale,
            ticks: crate::scale::nice_ticks(scale.lo, scale.hi, LEGEND_TICKS),
        }
    }

    /// Tick label text, rounded to whole numbers with locale separators.
    pub fn tick_label(value: f64) -> String {
        (value.round() as i64).to_formatted_string(&Locale::en)
    }
}

/// Tooltip payload for the hovered country, rebuilt from state on every
/// frame so year/metric changes update an open tooltip in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub country: String,
    pub pm25: Option<f64>,
    pub acute: Option<f64>,
    pub copd: Option<f64>,
    pub heart: Option<f64>,
    pub stroke: Option<f64>,
    pub lung: Option<f64>,
}

impl Tooltip {
    fn from_index(country: &str, year: i32, index: &DatasetIndex) -> Self {
        let rates = index.rates(year, country).copied().unwrap_or_default();
        Self {
            country: country.to_string(),
            pm25: index.value(Metric::Pm25, year, country),
            acute: rates.acute,
            copd: rates.copd,
            heart: rates.heart,
            stroke: rates.stroke,
            lung: rates.lung,
        }
    }

    fn fmt(v: Option<f64>) -> String {
        match v {
            Some(v) => format!("{v:.2}"),
            None => "N/A".to_string(),
        }
    }

    /// Display lines in the order the map has always shown them.
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.country.clone(),
            format!("PM2.5: {} µg/m³", Self::fmt(self.pm25)),
            "Cause-Specific Death Rate (/100k):".to_string(),
            format!("Acute Infections: {}", Self::fmt(self.acute)),
            format!("COPD: {}", Self::fmt(self.copd)),
            format!("Heart Disease: {}", Self::fmt(self.heart)),
            format!("Stroke: {}", Self::fmt(self.stroke)),
            format!("Lung Cancer: {}", Self::fmt(self.lung)),
        ]
    }
}

/// Everything the presentation layer needs for one repaint.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Fill per named feature, in input order. The hovered country's fill
    /// is darkened here; the underlying color state is untouched.
    pub fills: Vec<(String, Fill)>,
    pub legend: Legend,
    pub tooltip: Option<Tooltip>,
    pub title: String,
    pub year_label: String,
}

/// Recompute the whole visible surface for the current state.
pub fn render(
    state: &ViewState,
    hovered: Option<&str>,
    index: &DatasetIndex,
    countries: &[String],
) -> RenderFrame {
    let scale = ColorScale::for_metric(state.metric, index);

    let fills = countries
        .iter()
        .map(|name| {
            let fill = fill_for(state.metric, state.year, name, scale, index);
            let fill = match hovered {
                // Emphasis also applies to the neutral fill so the hovered
                // shape always stands out.
                Some(h) if h == name => Fill::Value(fill.rgb().darken(0.8)),
                _ => fill,
            };
            (name.clone(), fill)
        })
        .collect();

    let tooltip = hovered.map(|c| Tooltip::from_index(c, state.year, index));

    RenderFrame {
        fills,
        legend: Legend::for_metric(state.metric, scale),
        tooltip,
        title: format!("{TITLE_PHRASE} ({})", state.year),
        year_label: state.year.to_string(),
    }
}
