use aqmap::dataset::DatasetIndex;
use aqmap::models::{MortalityRow, Pm25Row, ViewState};
use aqmap::scale::Fill;
use aqmap::view::{render, Legend, LEGEND_TICKS, TITLE_PHRASE};
use aqmap::Metric;

fn pm(location: &str, year: i32, pm25: f64) -> Pm25Row {
    Pm25Row {
        location: location.into(),
        year: Some(year),
        pm25: Some(pm25),
    }
}

fn mort(location: &str, year: i32) -> MortalityRow {
    MortalityRow {
        location: location.into(),
        year: Some(year),
        acute: Some(1.0),
        copd: Some(2.0),
        heart: None,
        stroke: Some(0.0),
        lung: Some(4.5),
    }
}

fn sample_index() -> DatasetIndex {
    DatasetIndex::build(
        &[
            pm("Testland", 2010, 12.5),
            pm("Testland", 2011, 20.0),
            pm("Farland", 2010, 7.0),
        ],
        &[mort("Testland", 2010), mort("Farland", 2011)],
    )
}

fn names() -> Vec<String> {
    vec!["Testland".into(), "Farland".into(), "Atlantis".into()]
}

#[test]
fn refresh_is_idempotent_for_unchanged_state() {
    let index = sample_index();
    let state = ViewState {
        year: 2010,
        metric: Metric::Pm25,
        playing: false,
    };
    let a = render(&state, Some("Testland"), &index, &names());
    let b = render(&state, Some("Testland"), &index, &names());
    assert_eq!(a, b);
}

#[test]
fn every_feature_gets_a_fill_and_unknowns_are_neutral() {
    let index = sample_index();
    let state = ViewState {
        year: 2010,
        metric: Metric::Pm25,
        playing: false,
    };
    let frame = render(&state, None, &index, &names());
    assert_eq!(frame.fills.len(), 3);
    let atlantis = frame.fills.iter().find(|(n, _)| n == "Atlantis").unwrap();
    assert_eq!(atlantis.1, Fill::NoData);
    let testland = frame.fills.iter().find(|(n, _)| n == "Testland").unwrap();
    assert!(matches!(testland.1, Fill::Value(_)));
}

#[test]
fn hover_darkens_without_mutating_stored_state() {
    let index = sample_index();
    let state = ViewState {
        year: 2010,
        metric: Metric::Pm25,
        playing: false,
    };
    let plain = render(&state, None, &index, &names());
    let hovered = render(&state, Some("Testland"), &index, &names());

    let base = plain.fills.iter().find(|(n, _)| n == "Testland").unwrap().1;
    let emph = hovered.fills.iter().find(|(n, _)| n == "Testland").unwrap().1;
    assert_eq!(emph.rgb(), base.rgb().darken(0.8));
    // Other countries are untouched by the emphasis.
    assert_eq!(
        plain.fills.iter().find(|(n, _)| n == "Farland").unwrap().1,
        hovered.fills.iter().find(|(n, _)| n == "Farland").unwrap().1,
    );
    // And re-rendering without hover restores the original fill.
    let restored = render(&state, None, &index, &names());
    assert_eq!(restored, plain);
}

#[test]
fn tooltip_tracks_year_changes_while_hovering() {
    let index = sample_index();
    let mut state = ViewState {
        year: 2010,
        metric: Metric::Pm25,
        playing: false,
    };
    let t1 = render(&state, Some("Testland"), &index, &names())
        .tooltip
        .unwrap();
    assert_eq!(t1.pm25, Some(12.5));
    assert_eq!(t1.copd, Some(2.0));

    // Year changes under the pointer; the tooltip must follow.
    state.year = 2011;
    let t2 = render(&state, Some("Testland"), &index, &names())
        .tooltip
        .unwrap();
    assert_eq!(t2.pm25, Some(20.0));
    assert_eq!(t2.copd, None);
}

#[test]
fn tooltip_lines_show_na_per_missing_field() {
    let index = sample_index();
    let state = ViewState {
        year: 2010,
        metric: Metric::Pm25,
        playing: false,
    };
    let tooltip = render(&state, Some("Testland"), &index, &names())
        .tooltip
        .unwrap();
    let lines = tooltip.lines();
    assert_eq!(lines[0], "Testland");
    assert_eq!(lines[1], "PM2.5: 12.50 µg/m³");
    assert_eq!(lines[4], "COPD: 2.00");
    assert_eq!(lines[5], "Heart Disease: N/A");
    // A stored 0.0 renders as a number, not as N/A.
    assert_eq!(lines[6], "Stroke: 0.00");
}

#[test]
fn no_tooltip_without_hover() {
    let index = sample_index();
    let state = ViewState {
        year: 2010,
        metric: Metric::Pm25,
        playing: false,
    };
    assert!(render(&state, None, &index, &names()).tooltip.is_none());
}

#[test]
fn legend_reflects_metric_name_and_unit() {
    let index = sample_index();
    let mut state = ViewState {
        year: 2010,
        metric: Metric::Pm25,
        playing: false,
    };
    let frame = render(&state, None, &index, &names());
    assert_eq!(frame.legend.title, "PM2.5 (µg/m³)");
    assert_eq!(frame.legend.scale.lo, 5.0);
    assert!(frame.legend.ticks.len() <= 2 * LEGEND_TICKS);

    state.metric = Metric::Lung;
    let frame = render(&state, None, &index, &names());
    assert_eq!(frame.legend.title, "Lung Cancer (/100k)");
    assert_eq!(frame.legend.scale.lo, 0.0);
}

#[test]
fn title_and_year_label_follow_state() {
    let index = sample_index();
    let state = ViewState {
        year: 2011,
        metric: Metric::Pm25,
        playing: false,
    };
    let frame = render(&state, None, &index, &names());
    assert_eq!(frame.title, format!("{TITLE_PHRASE} (2011)"));
    assert_eq!(frame.year_label, "2011");
}

#[test]
fn tick_labels_are_rounded_with_separators() {
    assert_eq!(Legend::tick_label(12.4), "12");
    assert_eq!(Legend::tick_label(30_000.0), "30,000");
}
