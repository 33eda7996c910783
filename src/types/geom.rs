/// Spherical Mercator (EPSG:900913) position in metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meters {
    pub x: f64,
    pub y: f64,
}

/// Position on the pixel grid of one zoom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub fn new(x: f64, y: f64) -> Self {
        Pixel { x, y }
    }

    pub fn distance(&self, other: &Pixel) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Integer raster coordinate for the bitmap backend
    pub fn to_backend(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_distance() {
        let a = Pixel::new(0.0, 0.0);
        let b = Pixel::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_to_backend_rounds() {
        assert_eq!(Pixel::new(1.4, 2.6).to_backend(), (1, 3));
    }
}
