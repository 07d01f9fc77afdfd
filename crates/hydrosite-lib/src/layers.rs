//! Vector layers stored as GeoJSON feature collections.
//!
//! Rivers are read from `LineString`/`MultiLineString` features; the category
//! comes from the integer `cat` property, or the 1-based feature ordinal when
//! the property is missing. Results are written as `Point` (intakes and
//! restitutions) and `LineString` (plant extents) features.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::{Point, RiverLine};
use crate::pipeline::{LinePlan, Plant};

#[derive(Debug, Serialize, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: String,
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

impl FeatureCollection {
    fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

impl Feature {
    fn new(geometry: Geometry, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => Some(map),
            _ => None,
        };
        Self {
            kind: "Feature".to_string(),
            geometry: Some(geometry),
            properties,
        }
    }
}

impl Geometry {
    fn point(point: Point) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: json!([point.x, point.y]),
        }
    }

    fn line_string(points: &[Point]) -> Self {
        let coordinates: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        Self {
            kind: "LineString".to_string(),
            coordinates: json!(coordinates),
        }
    }
}

/// Read every river line of a GeoJSON layer.
pub fn read_river_layer(path: &Path) -> Result<Vec<RiverLine>> {
    let text = fs::read_to_string(path)?;
    let collection: FeatureCollection =
        serde_json::from_str(&text).map_err(|err| format_error(path, err.to_string()))?;
    if collection.kind != "FeatureCollection" {
        return Err(format_error(
            path,
            format!("expected a FeatureCollection, found {}", collection.kind),
        ));
    }

    let mut lines = Vec::new();
    for (ordinal, feature) in collection.features.into_iter().enumerate() {
        let category = category_of(&feature, ordinal, path)?;
        let Some(geometry) = feature.geometry else {
            warn!(path = %path.display(), category, "skipping feature without geometry");
            continue;
        };
        match geometry.kind.as_str() {
            "LineString" => {
                let coordinates: Vec<Vec<f64>> = serde_json::from_value(geometry.coordinates)
                    .map_err(|err| format_error(path, err.to_string()))?;
                lines.push(RiverLine::new(category, positions(&coordinates, path)?));
            }
            "MultiLineString" => {
                let parts: Vec<Vec<Vec<f64>>> = serde_json::from_value(geometry.coordinates)
                    .map_err(|err| format_error(path, err.to_string()))?;
                for part in parts {
                    lines.push(RiverLine::new(category, positions(&part, path)?));
                }
            }
            other => {
                warn!(path = %path.display(), category, geometry = other, "skipping non-line feature");
            }
        }
    }

    debug!(path = %path.display(), lines = lines.len(), "read river layer");
    Ok(lines)
}

fn category_of(feature: &Feature, ordinal: usize, path: &Path) -> Result<u32> {
    let value = feature.properties.as_ref().and_then(|props| props.get("cat"));
    match value {
        None | Some(Value::Null) => Ok(ordinal as u32 + 1),
        Some(value) => value
            .as_u64()
            .and_then(|cat| u32::try_from(cat).ok())
            .ok_or_else(|| {
                format_error(
                    path,
                    format!("feature {ordinal} has a non-integer cat {value}"),
                )
            }),
    }
}

fn positions(coordinates: &[Vec<f64>], path: &Path) -> Result<Vec<Point>> {
    coordinates
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Point::new(*x, *y)),
            _ => Err(format_error(
                path,
                format!("position {position:?} has fewer than two coordinates"),
            )),
        })
        .collect()
}

fn format_error(path: &Path, message: String) -> Error {
    Error::LayerFormat {
        path: path.to_path_buf(),
        message,
    }
}

fn write_collection(path: &Path, features: Vec<Feature>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let count = features.len();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &FeatureCollection::new(features))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), features = count, "wrote vector layer");
    Ok(())
}

/// Write river lines, keeping their categories.
pub fn write_river_layer(path: &Path, lines: &[RiverLine]) -> Result<()> {
    let features = lines
        .iter()
        .map(|line| {
            Feature::new(
                Geometry::line_string(&line.vertices),
                json!({ "cat": line.category }),
            )
        })
        .collect();
    write_collection(path, features)
}

/// Write one intake and one restitution point per plant.
pub fn write_point_layer(path: &Path, plants: &[Plant]) -> Result<()> {
    let mut features = Vec::with_capacity(plants.len() * 2);
    for plant in plants {
        for (kind, station) in [("intake", &plant.intake), ("restitution", &plant.restitution)] {
            features.push(Feature::new(
                Geometry::point(station.position),
                json!({
                    "cat": features.len() + 1,
                    "plant_id": plant.id,
                    "line_cat": plant.line_category,
                    "kind": kind,
                    "power": plant.power,
                    "potential_power": plant.potential_power,
                    "elevation": station.elevation,
                    "discharge": station.discharge,
                }),
            ));
        }
    }
    write_collection(path, features)
}

/// Write the river stretch covered by each plant.
pub fn write_plant_layer(path: &Path, plants: &[Plant]) -> Result<()> {
    let features = plants
        .iter()
        .map(|plant| {
            Feature::new(
                Geometry::line_string(&plant.path),
                json!({
                    "cat": plant.id,
                    "plant_id": plant.id,
                    "line_cat": plant.line_category,
                    "power": plant.power,
                    "potential_power": plant.potential_power,
                    "head_drop": plant.head_drop,
                    "discharge": plant.discharge,
                    "length": plant.length,
                }),
            )
        })
        .collect();
    write_collection(path, features)
}

/// Write every sampled station (debug output).
pub fn write_station_layer(path: &Path, lines: &[LinePlan]) -> Result<()> {
    let mut features = Vec::new();
    for line in lines {
        for station in &line.profile.stations {
            features.push(Feature::new(
                Geometry::point(station.position),
                json!({
                    "cat": features.len() + 1,
                    "line_cat": line.category,
                    "station": station.index,
                    "distance": station.distance,
                    "elevation": station.elevation,
                    "discharge": station.discharge,
                }),
            ));
        }
    }
    write_collection(path, features)
}
