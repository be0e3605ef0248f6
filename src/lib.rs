//! aqmap
//!
//! Data binding and interactive state for a choropleth world map of PM2.5
//! exposure and cause-specific mortality rates per country over time. Pairs
//! with the `aqmap-gui` binary, which paints it with egui.
//!
//! ### Pieces
//! - Build lookup tables from the PM2.5 and mortality CSVs, plus the world
//!   GeoJSON outlines
//! - Per-metric color domains and a sequential red ramp (neutral gray for
//!   missing data)
//! - A pure `render` that derives fills, legend, tooltip, and titles from
//!   the current state
//! - An event-driven controller with year scrubbing, metric switching,
//!   hover, zoom/pan, and wrap-around playback
//!
//! ### Example
//! ```no_run
//! use aqmap::{dataset, geo, Controller, Event};
//! use std::time::Instant;
//!
//! let pm25 = dataset::load_pm25_csv_path("data/pm25_final_aggregated.csv")?;
//! let mort = dataset::load_mortality_csv_path("data/cause_specific_death_rate_by_country.csv")?;
//! let shapes = geo::load_world_geojson_path("data/world.geojson")?;
//! let index = dataset::DatasetIndex::build(&pm25, &mort);
//!
//! let names: Vec<String> = shapes.iter().map(|s| s.name.clone()).collect();
//! let mut ctl = Controller::new(&index);
//! ctl.apply(Event::SetYear(2015), Instant::now());
//! let frame = ctl.frame(&index, &names);
//! println!("{}", frame.title);
//! # Ok::<(), aqmap::dataset::LoadError>(())
//! ```

pub mod controller;
pub mod dataset;
pub mod geo;
pub mod models;
pub mod scale;
pub mod view;

pub use controller::{Controller, Event, MapTransform};
pub use dataset::DatasetIndex;
pub use models::{Metric, ViewState};
pub use scale::{ColorScale, Fill, Rgb, NO_DATA};
pub use view::RenderFrame;
