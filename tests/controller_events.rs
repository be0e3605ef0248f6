use aqmap::dataset::DatasetIndex;
use aqmap::models::Pm25Row;
use aqmap::{Controller, Event, Metric};
use std::time::{Duration, Instant};

fn pm(location: &str, year: i32, pm25: f64) -> Pm25Row {
    Pm25Row {
        location: location.into(),
        year: Some(year),
        pm25: Some(pm25),
    }
}

fn index_2010_2012() -> DatasetIndex {
    DatasetIndex::build(
        &[
            pm("A", 2010, 10.0),
            pm("A", 2011, 11.0),
            pm("A", 2012, 12.0),
        ],
        &[],
    )
}

#[test]
fn starts_at_min_year_paused_on_pm25() {
    let index = index_2010_2012();
    let ctl = Controller::new(&index);
    assert_eq!(ctl.state().year, 2010);
    assert_eq!(ctl.state().metric, Metric::Pm25);
    assert!(!ctl.state().playing);
    assert!(!ctl.playback_armed());
}

#[test]
fn set_year_clamps_into_indexed_range() {
    let index = index_2010_2012();
    let mut ctl = Controller::new(&index);
    let now = Instant::now();

    ctl.apply(Event::SetYear(2011), now);
    assert_eq!(ctl.state().year, 2011);
    ctl.apply(Event::SetYear(1900), now);
    assert_eq!(ctl.state().year, 2010);
    ctl.apply(Event::SetYear(3000), now);
    assert_eq!(ctl.state().year, 2012);
}

#[test]
fn tick_wraps_from_max_back_to_min() {
    let index = index_2010_2012();
    let mut ctl = Controller::new(&index);
    let now = Instant::now();

    ctl.apply(Event::SetYear(2012), now);
    ctl.apply(Event::Tick, now);
    assert_eq!(ctl.state().year, 2010, "wraps, does not overrun");
    ctl.apply(Event::Tick, now);
    assert_eq!(ctl.state().year, 2011);
}

#[test]
fn toggling_play_twice_leaves_no_armed_clock() {
    let index = index_2010_2012();
    let mut ctl = Controller::new(&index);
    let now = Instant::now();

    ctl.apply(Event::TogglePlay, now);
    assert!(ctl.state().playing);
    assert!(ctl.playback_armed());

    ctl.apply(Event::TogglePlay, now);
    assert!(!ctl.state().playing);
    assert!(!ctl.playback_armed());
    // Paused: no tick ever fires, however late we poll.
    assert!(!ctl.poll(now + Duration::from_secs(60)));
    assert_eq!(ctl.state().year, 2010);
}

#[test]
fn rapid_toggling_keeps_a_single_deadline() {
    let index = index_2010_2012();
    let mut ctl = Controller::with_interval(&index, Duration::from_millis(100));
    let t0 = Instant::now();

    for _ in 0..5 {
        ctl.apply(Event::TogglePlay, t0);
        ctl.apply(Event::TogglePlay, t0);
    }
    ctl.apply(Event::TogglePlay, t0);
    assert!(ctl.state().playing);

    // One interval elapsed: exactly one tick is due, not a backlog.
    assert!(ctl.poll(t0 + Duration::from_millis(150)));
    assert_eq!(ctl.state().year, 2011);
    assert!(!ctl.poll(t0 + Duration::from_millis(160)));
}

#[test]
fn poll_advances_only_when_due() {
    let index = index_2010_2012();
    let mut ctl = Controller::with_interval(&index, Duration::from_millis(100));
    let t0 = Instant::now();

    ctl.apply(Event::TogglePlay, t0);
    assert!(!ctl.poll(t0 + Duration::from_millis(10)));
    assert_eq!(ctl.state().year, 2010);

    assert!(ctl.poll(t0 + Duration::from_millis(120)));
    assert_eq!(ctl.state().year, 2011);

    // Playback ticks keep wrapping like manual ones.
    assert!(ctl.poll(t0 + Duration::from_millis(230)));
    assert!(ctl.poll(t0 + Duration::from_millis(340)));
    assert_eq!(ctl.state().year, 2010);
}

#[test]
fn unknown_metric_key_is_ignored() {
    let index = index_2010_2012();
    let mut ctl = Controller::new(&index);
    let now = Instant::now();

    ctl.apply(Event::SetMetricKey("copd".into()), now);
    assert_eq!(ctl.state().metric, Metric::Copd);
    ctl.apply(Event::SetMetricKey("plague".into()), now);
    assert_eq!(ctl.state().metric, Metric::Copd, "bad key leaves state alone");
}

#[test]
fn hover_and_unhover_are_transient() {
    let index = index_2010_2012();
    let mut ctl = Controller::new(&index);
    let now = Instant::now();

    ctl.apply(Event::Hover("A".into()), now);
    assert_eq!(ctl.hovered(), Some("A"));
    let frame = ctl.frame(&index, &["A".into()]);
    assert!(frame.tooltip.is_some());

    ctl.apply(Event::Unhover, now);
    assert_eq!(ctl.hovered(), None);
    assert!(ctl.frame(&index, &["A".into()]).tooltip.is_none());
}

#[test]
fn zoom_keeps_focus_point_fixed_and_pan_translates() {
    let index = index_2010_2012();
    let mut ctl = Controller::new(&index);
    let now = Instant::now();

    ctl.apply(
        Event::Zoom {
            factor: 2.0,
            focus: (100.0, 50.0),
        },
        now,
    );
    let t = ctl.transform();
    assert_eq!(t.scale, 2.0);
    // The focus point maps onto itself.
    assert_eq!(t.apply((100.0, 50.0)), (100.0, 50.0));

    ctl.apply(Event::Pan { dx: 10.0, dy: -5.0 }, now);
    let t = ctl.transform();
    assert_eq!(t.apply((100.0, 50.0)), (110.0, 45.0));
}

#[test]
fn empty_index_never_panics() {
    let index = DatasetIndex::build(&[], &[]);
    let mut ctl = Controller::new(&index);
    let now = Instant::now();

    ctl.apply(Event::SetYear(2010), now);
    ctl.apply(Event::Tick, now);
    ctl.apply(Event::TogglePlay, now);
    assert!(!ctl.poll(now + Duration::from_secs(2)) || ctl.state().year == 0);
    let frame = ctl.frame(&index, &["A".into()]);
    assert_eq!(frame.fills.len(), 1);
}
