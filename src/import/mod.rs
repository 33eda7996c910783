pub mod folder;
pub mod gpx;
