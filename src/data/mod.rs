use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

use crate::geo::SpatialPoint;

/// A polyline in spatial lon/lat, drawn as great-circle segments
pub type Polyline = Vec<SpatialPoint>;

/// A labelled point
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub position: SpatialPoint,
    pub name: String,
    pub population: u64,
}

/// Vector data the viewer draws through the grid
#[derive(Debug, Default, Clone)]
pub struct Layers {
    pub coastlines: Vec<Polyline>,
    pub borders: Vec<Polyline>,
    pub cities: Vec<City>,
}

impl Layers {
    pub fn is_empty(&self) -> bool {
        self.coastlines.is_empty() && self.borders.is_empty() && self.cities.is_empty()
    }

    /// Cities at or above `min_population`
    pub fn cities_above(&self, min_population: u64) -> impl Iterator<Item = &City> {
        self.cities.iter().filter(move |c| c.population >= min_population)
    }
}

/// Load whatever Natural Earth GeoJSON files exist in `data_dir`.
///
/// A file that fails to parse is logged and skipped.
pub fn load_all_geojson(layers: &mut Layers, data_dir: &Path) -> Result<()> {
    if !data_dir.is_dir() {
        return Ok(());
    }

    for filename in ["ne_110m_coastline.json", "ne_50m_coastline.json"] {
        let path = data_dir.join(filename);
        if path.exists() {
            match read_geojson(&path) {
                Ok(gj) => layers.coastlines.extend(lines_from_geojson(&gj)),
                Err(e) => log::warn!("failed to load {filename}: {e:#}"),
            }
        }
    }

    let borders = data_dir.join("ne_50m_borders.json");
    if borders.exists() {
        match read_geojson(&borders) {
            Ok(gj) => layers.borders.extend(lines_from_geojson(&gj)),
            Err(e) => log::warn!("failed to load borders: {e:#}"),
        }
    }

    let cities = data_dir.join("ne_10m_cities.json");
    if cities.exists() {
        match read_geojson(&cities) {
            Ok(gj) => layers.cities.extend(cities_from_geojson(&gj)),
            Err(e) => log::warn!("failed to load cities: {e:#}"),
        }
    }

    log::debug!(
        "loaded {} coastlines, {} borders, {} cities from {}",
        layers.coastlines.len(),
        layers.borders.len(),
        layers.cities.len(),
        data_dir.display()
    );
    Ok(())
}

fn read_geojson(path: &Path) -> Result<GeoJson> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson = content.parse::<GeoJson>().with_context(|| format!("parsing {}", path.display()))?;
    Ok(geojson)
}

/// Every line-like geometry as a polyline. Polygons contribute their exterior ring.
pub fn lines_from_geojson(geojson: &GeoJson) -> Vec<Polyline> {
    let mut lines = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(geometry) = &feature.geometry {
                    collect_lines(geometry, &mut lines);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(geometry) = &f.geometry {
                collect_lines(geometry, &mut lines);
            }
        }
        GeoJson::Geometry(geometry) => collect_lines(geometry, &mut lines),
    }
    lines
}

fn to_polyline(coords: &[Vec<f64>]) -> Polyline {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| SpatialPoint::new(c[0], c[1]))
        .collect()
}

fn collect_lines(geometry: &Geometry, out: &mut Vec<Polyline>) {
    match &geometry.value {
        Value::LineString(coords) => out.push(to_polyline(coords)),
        Value::MultiLineString(lines) => out.extend(lines.iter().map(|l| to_polyline(l))),
        Value::Polygon(rings) => out.extend(rings.first().map(|r| to_polyline(r))),
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|rings| rings.first()).map(|r| to_polyline(r)))
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_lines(g, out);
            }
        }
        _ => {}
    }
}

/// Point features with a name and population
pub fn cities_from_geojson(geojson: &GeoJson) -> Vec<City> {
    let GeoJson::FeatureCollection(fc) = geojson else {
        return Vec::new();
    };

    fc.features
        .iter()
        .filter_map(|feature| {
            let Value::Point(coords) = &feature.geometry.as_ref()?.value else {
                return None;
            };
            if coords.len() < 2 {
                return None;
            }
            let props = feature.properties.as_ref();
            let name = props
                .and_then(|p| p.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string();
            // Natural Earth spreads population over a few fields
            let population = props
                .and_then(|p| {
                    p.get("pop_max")
                        .or_else(|| p.get("pop_min"))
                        .or_else(|| p.get("population"))
                })
                .and_then(|v| v.as_f64())
                .map(|v| v as u64)
                .unwrap_or(0);
            Some(City {
                position: SpatialPoint::new(coords[0], coords[1]),
                name,
                population,
            })
        })
        .collect()
}

/// Meridians and parallels every `step` degrees, parallels densified so their
/// great-circle pieces stay close to the true small circle.
pub fn graticule(step: f64) -> Vec<Polyline> {
    let step = step.clamp(1.0, 90.0);
    let count = |span: f64| (span / step).floor() as i32;
    let mut lines = Vec::new();

    for k in 0..count(360.0) {
        let lon = -180.0 + k as f64 * step;
        lines.push(vec![
            SpatialPoint::new(lon, -80.0),
            SpatialPoint::new(lon, 0.0),
            SpatialPoint::new(lon, 80.0),
        ]);
    }

    for k in 1..count(180.0) {
        let lat = -90.0 + k as f64 * step;
        if lat.abs() > 80.0 {
            continue;
        }
        lines.push((0..=36).map(|n| SpatialPoint::new(-180.0 + n as f64 * 10.0, lat)).collect());
    }
    lines
}

fn outline(points: &[(f64, f64)]) -> Polyline {
    points.iter().map(|&(lon, lat)| SpatialPoint::new(lon, lat)).collect()
}

/// Coarse built-in continents for when no data files are available
pub fn generate_simple_world(layers: &mut Layers) {
    // North America
    layers.coastlines.push(outline(&[
        (-165.0, 68.0), (-160.0, 58.0), (-150.0, 60.0), (-135.0, 57.0), (-124.0, 46.0),
        (-120.0, 34.0), (-109.0, 23.0), (-96.0, 20.0), (-87.0, 21.0), (-83.0, 29.0),
        (-80.0, 26.0), (-76.0, 36.0), (-70.0, 42.0), (-61.0, 46.0), (-56.0, 52.0),
        (-64.0, 59.0), (-78.0, 62.0), (-92.0, 67.0), (-115.0, 69.0), (-140.0, 70.0),
        (-165.0, 68.0),
    ]));
    // South America
    layers.coastlines.push(outline(&[
        (-78.0, 8.0), (-62.0, 10.0), (-50.0, 1.0), (-35.0, -6.0), (-40.0, -21.0),
        (-48.0, -27.0), (-57.0, -36.0), (-65.0, -45.0), (-70.0, -54.0), (-74.0, -47.0),
        (-72.0, -33.0), (-70.0, -18.0), (-81.0, -5.0), (-78.0, 8.0),
    ]));
    // Europe
    layers.coastlines.push(outline(&[
        (-9.0, 37.0), (-2.0, 37.0), (4.0, 43.0), (12.0, 44.0), (18.0, 40.0),
        (26.0, 38.0), (29.0, 41.0), (40.0, 47.0), (32.0, 60.0), (22.0, 66.0),
        (16.0, 69.0), (6.0, 62.0), (8.0, 57.0), (-4.0, 48.0), (-9.0, 43.0),
        (-9.0, 37.0),
    ]));
    // Africa
    layers.coastlines.push(outline(&[
        (-17.0, 21.0), (-10.0, 30.0), (10.0, 37.0), (32.0, 31.0), (43.0, 12.0),
        (51.0, 11.0), (40.0, -3.0), (35.0, -24.0), (20.0, -35.0), (12.0, -18.0),
        (9.0, 2.0), (-8.0, 4.0), (-17.0, 14.0), (-17.0, 21.0),
    ]));
    // Asia
    layers.coastlines.push(outline(&[
        (40.0, 47.0), (52.0, 42.0), (57.0, 25.0), (67.0, 24.0), (73.0, 17.0),
        (78.0, 8.0), (87.0, 21.0), (97.0, 16.0), (104.0, 9.0), (109.0, 21.0),
        (121.0, 31.0), (122.0, 40.0), (131.0, 43.0), (141.0, 52.0), (160.0, 61.0),
        (178.0, 66.0), (140.0, 73.0), (105.0, 77.0), (70.0, 73.0), (58.0, 68.0),
        (40.0, 66.0), (32.0, 60.0), (40.0, 47.0),
    ]));
    // Australia
    layers.coastlines.push(outline(&[
        (114.0, -22.0), (123.0, -17.0), (131.0, -12.0), (142.0, -11.0), (146.0, -19.0),
        (153.0, -27.0), (150.0, -37.0), (141.0, -38.0), (131.0, -31.0), (116.0, -35.0),
        (114.0, -22.0),
    ]));

    for (lon, lat, name, population) in [
        (-74.0, 40.7, "New York", 18_800_000),
        (-0.1, 51.5, "London", 9_000_000),
        (139.7, 35.7, "Tokyo", 37_400_000),
        (151.2, -33.9, "Sydney", 5_300_000),
        (-43.2, -22.9, "Rio", 13_500_000),
        (31.2, 30.0, "Cairo", 21_300_000),
        (77.2, 28.6, "Delhi", 32_900_000),
        (-99.1, 19.4, "Mexico City", 21_800_000),
        (-149.9, 61.2, "Anchorage", 290_000),
        (174.8, -36.8, "Auckland", 1_700_000),
    ] {
        layers.cities.push(City {
            position: SpatialPoint::new(lon, lat),
            name: name.to_string(),
            population,
        });
    }
}
