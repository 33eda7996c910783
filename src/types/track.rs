use geo_types::{Coord, LineString};

/// Root of a parsed GPX file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GpxDocument {
    pub creator: String,
    pub version: String,
    pub tracks: Vec<Track>,
}

/// One recording session, possibly split into several segments
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Track {
    pub name: String,
    pub track_type: String,
    pub segments: Vec<Segment>,
}

/// Contiguous run of fixes as recorded by the device
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segment {
    pub points: Vec<LatLng>,
}

/// A single track point in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        LatLng {
            latitude,
            longitude,
        }
    }

    /// Planar coordinate in GeoJSON axis order (x = longitude, y = latitude)
    pub fn to_coord(self) -> Coord {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

impl GpxDocument {
    /// All points of all segments of all tracks, in document order
    pub fn points(&self) -> Vec<LatLng> {
        self.tracks
            .iter()
            .flat_map(|track| track.segments.iter())
            .flat_map(|segment| segment.points.iter().copied())
            .collect()
    }

    /// Track names joined for display, None when no track is named
    pub fn display_name(&self) -> Option<String> {
        let names: Vec<&str> = self
            .tracks
            .iter()
            .map(|track| track.name.as_str())
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(names.join(" / "))
        }
    }

    pub fn line_string(&self) -> LineString {
        self.points().into_iter().map(LatLng::to_coord).collect()
    }
}
