use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Unique directory under the system temp dir, removed on drop
pub struct ScratchDir(PathBuf);

impl ScratchDir {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "walk-{}-{}-{}",
            label,
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(&path).unwrap();
        ScratchDir(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.0.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn mkdir(&self, name: &str) -> PathBuf {
        let path = self.0.join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Single-track, single-segment document from (lat, lon) pairs
pub fn sample_gpx(points: &[(f64, f64)]) -> String {
    let trkpts: String = points
        .iter()
        .map(|(lat, lon)| format!(r#"<trkpt lat="{}" lon="{}"></trkpt>"#, lat, lon))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx creator="walk-tests" version="1.1"><trk><name>Sample</name><type>walking</type><trkseg>{}</trkseg></trk></gpx>"#,
        trkpts
    )
}
