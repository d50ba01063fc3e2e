/// Surface appearance of a scene node
use nalgebra::Point3;

use crate::color::Color;

/// Which faces are drawn and hit-tested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

/// Vertex twist about the local Y axis that animates over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wobble {
    pub factor: f32,
    pub speed: f32,
    time: f32,
}

impl Wobble {
    pub fn new(factor: f32, speed: f32) -> Self {
        Self {
            factor,
            speed,
            time: 0.0,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn advance(&mut self, delta: f32) {
        self.time += delta * self.speed;
    }

    /// Displaced position of a local-space vertex
    pub fn displace(&self, p: &Point3<f32>) -> Point3<f32> {
        let theta = (self.time + p.y).sin() / 2.0 * self.factor;
        let (s, c) = theta.sin_cos();
        Point3::new(c * p.x - s * p.z, p.y, s * p.x + c * p.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub wireframe: bool,
    pub side: Side,
    pub wobble: Option<Wobble>,
}

impl Material {
    pub fn standard(color: Color) -> Self {
        Self {
            color,
            wireframe: false,
            side: Side::Front,
            wobble: None,
        }
    }

    pub fn wireframe(mut self, on: bool) -> Self {
        self.wireframe = on;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    pub fn with_wobble(mut self, wobble: Wobble) -> Self {
        self.wobble = Some(wobble);
        self
    }

    pub fn is_double_sided(&self) -> bool {
        self.side == Side::Double
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wobble_preserves_height_and_radius() {
        let mut wobble = Wobble::new(2.0, 5.0);
        wobble.advance(0.3);
        assert!((wobble.time() - 1.5).abs() < 1e-6);

        let p = Point3::new(1.0, 0.4, -0.5);
        let q = wobble.displace(&p);
        assert_eq!(q.y, p.y);
        let r0 = (p.x * p.x + p.z * p.z).sqrt();
        let r1 = (q.x * q.x + q.z * q.z).sqrt();
        assert!((r0 - r1).abs() < 1e-5);
    }

    #[test]
    fn test_zero_factor_is_identity() {
        let wobble = Wobble::new(0.0, 5.0);
        let p = Point3::new(0.3, 0.2, 0.1);
        assert!((wobble.displace(&p) - p).norm() < 1e-7);
    }
}
