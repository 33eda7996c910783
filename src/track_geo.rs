use color_eyre::eyre::{eyre, Result};
use geo::{BoundingRect, VincentyDistance};
use geo_types::{LineString, Point};
use geojson::{Bbox, Feature, FeatureCollection, Geometry};

use crate::types::{feature::FeatureProperties, track::GpxDocument};

pub trait IntoTrackFeatureCollection {
    fn into_track_feature_collection(&self) -> Result<FeatureCollection>;
}

/// One LineString feature holding every point of the document, in [lon, lat] order
impl IntoTrackFeatureCollection for GpxDocument {
    fn into_track_feature_collection(&self) -> Result<FeatureCollection> {
        let line = self.line_string();
        if line.0.is_empty() {
            return Err(eyre!("GPX document has no track points"));
        }
        let feature = Feature {
            bbox: line.extent(),
            geometry: Some(Geometry::new(geojson::Value::from(&line))),
            properties: Some(
                FeatureProperties {
                    distance: line.walked_metres(),
                    name: self.display_name(),
                }
                .try_into()?,
            ),
            ..Default::default()
        };
        Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        })
    }
}

/// `[min_lon, min_lat, max_lon, max_lat]` of a walked line, as written to the feature's `bbox`
pub trait TrackExtent {
    fn extent(&self) -> Option<Bbox>;
}

impl TrackExtent for LineString<f64> {
    fn extent(&self) -> Option<Bbox> {
        let rect = self.bounding_rect()?;
        Some(vec![rect.min().x, rect.min().y, rect.max().x, rect.max().y])
    }
}

/// Metres walked along a line, leg by leg. Legs where Vincenty does not converge count as zero.
pub trait WalkedLength {
    fn walked_metres(&self) -> f64;
}

impl WalkedLength for LineString<f64> {
    fn walked_metres(&self) -> f64 {
        self.lines()
            .filter_map(|leg| {
                Point::from(leg.start)
                    .vincenty_distance(&Point::from(leg.end))
                    .ok()
            })
            .sum()
    }
}
