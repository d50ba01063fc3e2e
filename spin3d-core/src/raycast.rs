/// Ray casting for pointer hit-testing
use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Unit length
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Möller-Trumbore. Returns the distance along the ray to the hit.
    /// With `cull_back` set, triangles facing away from the ray origin
    /// (clockwise as seen from it) are ignored.
    pub fn intersect_triangle(
        &self,
        a: &Point3<f32>,
        b: &Point3<f32>,
        c: &Point3<f32>,
        cull_back: bool,
    ) -> Option<f32> {
        const EPSILON: f32 = 1e-7;

        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(&edge2);
        let det = edge1.dot(&p);

        if cull_back {
            if det < EPSILON {
                return None;
            }
        } else if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = self.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(&q) * inv_det;
        (t > EPSILON).then_some(t)
    }

    /// Cheap reject test against a bounding sphere
    pub fn hits_sphere(&self, center: &Point3<f32>, radius: f32) -> bool {
        let to_center = center - self.origin;
        let along = to_center.dot(&self.direction);
        let closest_sq = to_center.norm_squared() - along * along;
        if closest_sq > radius * radius {
            return false;
        }
        // Sphere entirely behind the origin
        along >= -radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facing_ray() -> Ray {
        Ray::new(Point3::new(0.25, 0.25, 5.0), Vector3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_hits_front_face() {
        let (a, b, c) = (
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let t = facing_ray().intersect_triangle(&a, &b, &c, true).unwrap();
        assert!((t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_back_face_culling() {
        // Clockwise as seen from +z
        let (a, b, c) = (
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        );
        assert!(facing_ray().intersect_triangle(&a, &b, &c, true).is_none());
        assert!(facing_ray().intersect_triangle(&a, &b, &c, false).is_some());
    }

    #[test]
    fn test_miss_outside_triangle() {
        let ray = Ray::new(Point3::new(2.0, 2.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let (a, b, c) = (
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        assert!(ray.intersect_triangle(&a, &b, &c, false).is_none());
    }

    #[test]
    fn test_bounding_sphere() {
        let ray = facing_ray();
        assert!(ray.hits_sphere(&Point3::origin(), 1.0));
        assert!(!ray.hits_sphere(&Point3::new(5.0, 0.0, 0.0), 1.0));
        assert!(!ray.hits_sphere(&Point3::new(0.0, 0.0, 10.0), 1.0));
    }
}
