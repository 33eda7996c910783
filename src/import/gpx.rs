use std::{fs, path::Path};

use color_eyre::eyre::{eyre, Result, WrapErr};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use tracing::{debug, instrument};

use crate::types::track::{GpxDocument, LatLng, Segment, Track};

/// Decode a complete GPX document.
///
/// Only creator, version, track name/type and point coordinates are kept. Any other
/// element (elevation, time, extensions, vendor tags) is skipped along with its
/// children. Malformed, truncated or empty input fails.
pub fn decode(bytes: &[u8]) -> Result<GpxDocument> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(eyre!("GPX input is empty"));
    }

    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);
    let mut builder = DocumentBuilder::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Err(e) => {
                return Err(eyre!(
                    "malformed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) => builder.start(e)?,
            Ok(Event::Empty(ref e)) => {
                builder.start(e)?;
                builder.end();
            }
            Ok(Event::End(_)) => builder.end(),
            Ok(Event::Text(ref e)) => builder.text(&e.unescape()?)?,
            Ok(Event::CData(ref e)) => builder.text(&String::from_utf8_lossy(e))?,
            Ok(_) => {}
        }
        buf.clear();
    }
    builder.finish()
}

/// Tracks where the reader is in the element tree and fills in the document
#[derive(Default)]
struct DocumentBuilder {
    document: Option<GpxDocument>,
    path: Vec<String>,
    text: String,
}

impl DocumentBuilder {
    fn at(&self, expected: &[&str]) -> bool {
        self.path.len() == expected.len()
            && self.path.iter().zip(expected).all(|(name, want)| name == want)
    }

    fn start(&mut self, element: &BytesStart) -> Result<()> {
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        self.text.clear();
        let at_gpx = self.at(&["gpx"]);
        let at_trk = self.at(&["gpx", "trk"]);
        let at_trkseg = self.at(&["gpx", "trk", "trkseg"]);

        if self.path.is_empty() {
            if self.document.is_some() {
                return Err(eyre!("more than one root element"));
            }
            if name != "gpx" {
                return Err(eyre!("root element is <{}>, expected <gpx>", name));
            }
            let mut document = GpxDocument::default();
            for attr in element.attributes() {
                let attr = attr?;
                match attr.key.local_name().as_ref() {
                    b"creator" => document.creator = attr.unescape_value()?.into_owned(),
                    b"version" => document.version = attr.unescape_value()?.into_owned(),
                    _ => {}
                }
            }
            self.document = Some(document);
        } else if let Some(document) = self.document.as_mut() {
            if at_gpx && name == "trk" {
                document.tracks.push(Track::default());
            } else if at_trk && name == "trkseg" {
                if let Some(track) = document.tracks.last_mut() {
                    track.segments.push(Segment::default());
                }
            } else if at_trkseg && name == "trkpt" {
                let point = parse_point(element)?;
                if let Some(segment) = document
                    .tracks
                    .last_mut()
                    .and_then(|track| track.segments.last_mut())
                {
                    segment.points.push(point);
                }
            }
        }
        self.path.push(name);
        Ok(())
    }

    fn end(&mut self) {
        let is_name = self.at(&["gpx", "trk", "name"]);
        let is_type = self.at(&["gpx", "trk", "type"]);
        if is_name || is_type {
            let value = self.text.trim().to_string();
            if let Some(track) = self
                .document
                .as_mut()
                .and_then(|document| document.tracks.last_mut())
            {
                if is_name {
                    track.name = value;
                } else {
                    track.track_type = value;
                }
            }
        }
        self.text.clear();
        self.path.pop();
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.path.is_empty() {
            return Err(eyre!("text outside the root element"));
        }
        self.text.push_str(text);
        Ok(())
    }

    fn finish(self) -> Result<GpxDocument> {
        if let Some(open) = self.path.last() {
            return Err(eyre!("unexpected end of input inside <{}>", open));
        }
        self.document.ok_or(eyre!("no <gpx> root element"))
    }
}

/// Coordinates are taken as written, without range checks
fn parse_point(element: &BytesStart) -> Result<LatLng> {
    let mut latitude = None;
    let mut longitude = None;
    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.local_name().as_ref() {
            b"lat" => latitude = Some(value.trim().parse::<f64>().wrap_err("invalid lat")?),
            b"lon" => longitude = Some(value.trim().parse::<f64>().wrap_err("invalid lon")?),
            _ => {}
        }
    }
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(LatLng::new(latitude, longitude)),
        _ => Err(eyre!("<trkpt> needs both lat and lon attributes")),
    }
}

/// Read a file into memory and decode it. The handle is closed before decoding starts.
#[instrument]
pub fn read_file(path: &Path) -> Result<GpxDocument> {
    let bytes = fs::read(path).wrap_err_with(|| format!("cannot open {}", path.display()))?;
    let document =
        decode(&bytes).wrap_err_with(|| format!("cannot parse GPX in {}", path.display()))?;
    debug!(
        "GPX {} from {:?}, number of tracks: {}",
        document.version,
        document.creator,
        document.tracks.len()
    );
    for track in &document.tracks {
        debug!(
            "track {:?} ({}) with {} segment(s)",
            track.name,
            track.track_type,
            track.segments.len()
        );
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx creator="TestCreator" version="1.1" xmlns="http://www.topografix.com/GPX/1/1" xmlns:ns3="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
  <trk>
    <name>Rotterdam Walking</name>
    <type>walking</type>
    <trkseg>
      <trkpt lat="51.9237274490296840667724609375" lon="4.4737290032207965850830078125">
        <ele>23</ele>
        <time>2024-04-08T19:23:26.000Z</time>
        <extensions>
          <ns3:TrackPointExtension>
            <ns3:hr>119</ns3:hr>
          </ns3:TrackPointExtension>
        </extensions>
      </trkpt>
      <trkpt lat="51.924373269285844" lon="4.469002690910358"></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="51.92308253810835" lon="4.469793977934499"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_decode_valid_document() {
        let document = decode(VALID_GPX.as_bytes()).unwrap();
        assert_eq!(document.creator, "TestCreator");
        assert_eq!(document.version, "1.1");
        assert_eq!(document.tracks.len(), 1);

        let track = &document.tracks[0];
        assert_eq!(track.name, "Rotterdam Walking");
        assert_eq!(track.track_type, "walking");
        assert_eq!(track.segments.len(), 2);
        assert_eq!(
            track.segments[0].points[0],
            LatLng::new(
                51.9237274490296840667724609375,
                4.4737290032207965850830078125
            )
        );
    }

    #[test]
    fn test_decode_recovers_every_point_in_order() {
        let points = decode(VALID_GPX.as_bytes()).unwrap().points();
        assert_eq!(
            points,
            vec![
                LatLng::new(
                    "51.9237274490296840667724609375".parse().unwrap(),
                    "4.4737290032207965850830078125".parse().unwrap()
                ),
                LatLng::new(51.924373269285844, 4.469002690910358),
                LatLng::new(51.92308253810835, 4.469793977934499),
            ]
        );
    }

    #[test]
    fn test_decode_document_without_tracks() {
        let document =
            decode(br#"<gpx creator="Empty" version="1.1"></gpx>"#.as_slice()).unwrap();
        assert_eq!(document.creator, "Empty");
        assert!(document.tracks.is_empty());
        assert!(document.points().is_empty());
    }

    #[test]
    fn test_decode_truncated_xml_fails() {
        let truncated = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx creator="TestCreator" version="1.1">"#;
        assert!(decode(truncated.as_bytes()).is_err());
    }

    #[test]
    fn test_decode_empty_input_fails() {
        assert!(decode(b"").is_err());
        assert!(decode(b"  \n\t").is_err());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode(b"not xml at all").is_err());
    }

    #[test]
    fn test_decode_mismatched_tags_fail() {
        let mismatched = r#"<gpx version="1.1"><trk><trkseg></trk></trkseg></gpx>"#;
        assert!(decode(mismatched.as_bytes()).is_err());
    }

    #[test]
    fn test_decode_requires_gpx_root() {
        assert!(decode(br#"<kml><trk></trk></kml>"#.as_slice()).is_err());
    }

    #[test]
    fn test_decode_skips_unknown_elements() {
        let gpx = r#"<gpx creator="c" version="1.1">
  <metadata><name>ignored</name></metadata>
  <wpt lat="1" lon="1"><name>not a track</name></wpt>
  <trk>
    <name>n</name>
    <foo>bar</foo>
    <trkseg>
      <trkpt lat="51.92" lon="4.47"><hr>120</hr><vendor:cad xmlns:vendor="urn:x">80</vendor:cad></trkpt>
      <bogus lat="0" lon="0"/>
      <trkpt lat="51.93" lon="4.48"/>
    </trkseg>
  </trk>
</gpx>"#;
        let document = decode(gpx.as_bytes()).unwrap();
        assert_eq!(document.tracks.len(), 1);
        assert_eq!(document.tracks[0].name, "n");
        assert_eq!(document.tracks[0].track_type, "");
        assert_eq!(
            document.points(),
            vec![LatLng::new(51.92, 4.47), LatLng::new(51.93, 4.48)]
        );
    }

    #[test]
    fn test_decode_accepts_any_version() {
        let missing_version =
            r#"<gpx creator="c"><trk><trkseg><trkpt lat="1" lon="2"/></trkseg></trk></gpx>"#;
        let missing = decode(missing_version.as_bytes()).unwrap();
        assert_eq!(missing.version, "");
        assert_eq!(missing.points(), vec![LatLng::new(1.0, 2.0)]);

        let future = decode(br#"<gpx version="1.2"></gpx>"#.as_slice()).unwrap();
        assert_eq!(future.version, "1.2");
        assert_eq!(future.creator, "");
    }

    #[test]
    fn test_decode_keeps_out_of_range_coordinates() {
        let gpx = r#"<gpx version="1.1"><trk><trkseg><trkpt lat="95" lon="-200.5"/></trkseg></trk></gpx>"#;
        assert_eq!(
            decode(gpx.as_bytes()).unwrap().points(),
            vec![LatLng::new(95.0, -200.5)]
        );
    }

    #[test]
    fn test_decode_rejects_unusable_points() {
        let missing_lon = r#"<gpx version="1.1"><trk><trkseg><trkpt lat="1"/></trkseg></trk></gpx>"#;
        assert!(decode(missing_lon.as_bytes()).is_err());

        let not_a_number = r#"<gpx version="1.1"><trk><trkseg><trkpt lat="north" lon="2"/></trkseg></trk></gpx>"#;
        assert!(decode(not_a_number.as_bytes()).is_err());
    }
}
