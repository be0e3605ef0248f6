//! Country boundary parsing: GeoJSON features to named lon/lat outlines.
//!
//! Only the exterior rings survive; holes and non-areal geometries are
//! dropped. Projection to screen space is the presentation layer's job.

use crate::dataset::LoadError;
use geo_types::{Geometry, MultiPolygon};
use geojson::GeoJson;
use std::io::{self, Read};
use std::path::Path;

/// One named country outline: exterior rings in lon/lat order.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

/// Display-name property keys tried in order. The join against the CSV
/// tables happens on this exact string.
const NAME_KEYS: [&str; 3] = ["name", "NAME", "ADMIN"];

/// Parse a GeoJSON FeatureCollection into country shapes. Features without
/// a usable name or areal geometry are skipped (and logged), not fatal.
pub fn parse_world_geojson(src: &str) -> Result<Vec<CountryShape>, LoadError> {
    let gj: GeoJson = src.parse().map_err(|source| LoadError::GeoJson {
        name: "world".into(),
        source,
    })?;

    let GeoJson::FeatureCollection(fc) = gj else {
        return Err(LoadError::Empty {
            name: "world (not a FeatureCollection)".into(),
        });
    };

    let mut shapes = Vec::new();
    let mut skipped = 0usize;
    for feature in fc.features {
        let name = feature.properties.as_ref().and_then(|props| {
            NAME_KEYS
                .iter()
                .find_map(|k| props.get(*k).and_then(|v| v.as_str()))
                .map(str::to_owned)
        });
        let (Some(name), Some(gj_geom)) = (name, feature.geometry) else {
            skipped += 1;
            continue;
        };
        let Ok(geom) = Geometry::<f64>::try_from(gj_geom.value) else {
            skipped += 1;
            continue;
        };
        let mp: MultiPolygon<f64> = match geom {
            Geometry::Polygon(p) => p.into(),
            Geometry::MultiPolygon(m) => m,
            _ => {
                skipped += 1;
                continue;
            }
        };
        let rings: Vec<Vec<(f64, f64)>> = mp
            .0
            .iter()
            .map(|poly| poly.exterior().0.iter().map(|c| (c.x, c.y)).collect())
            .collect();
        if rings.is_empty() {
            skipped += 1;
            continue;
        }
        shapes.push(CountryShape { name, rings });
    }

    if shapes.is_empty() {
        return Err(LoadError::Empty {
            name: "world".into(),
        });
    }
    if skipped > 0 {
        log::warn!("world: skipped {skipped} unnamed or non-areal features");
    }
    log::info!("world: parsed {} country shapes", shapes.len());
    Ok(shapes)
}

pub fn load_world_geojson<R: Read>(mut reader: R) -> Result<Vec<CountryShape>, LoadError> {
    let mut src = String::new();
    reader
        .read_to_string(&mut src)
        .map_err(|source| LoadError::Io {
            name: "world".into(),
            source,
        })?;
    parse_world_geojson(&src)
}

pub fn load_world_geojson_path<P: AsRef<Path>>(path: P) -> Result<Vec<CountryShape>, LoadError> {
    let name = path.as_ref().display().to_string();
    let f = std::fs::File::open(&path).map_err(|source| LoadError::Io { name, source })?;
    load_world_geojson(io::BufReader::new(f))
}

/// Even-odd ray cast against one ring; used by the hover hit test.
pub fn point_in_ring(x: f64, y: f64, ring: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl CountryShape {
    /// Whether a lon/lat point falls inside any of the exterior rings.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.rings.iter().any(|r| point_in_ring(x, y, r))
    }
}
