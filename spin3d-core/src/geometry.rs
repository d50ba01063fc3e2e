/// Geometry primitives and procedural mesh generators
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    fn from_parts(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Returns a zero vector for degenerate triangles instead of NaNs.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Distance from the local origin to the farthest vertex.
    pub fn bounding_radius(&self) -> f32 {
        self.triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .map(|v| v.position.coords.norm())
            .fold(0.0, f32::max)
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
        let mut mesh = Self::with_capacity(12);

        // Each face: normal, then four corners counter-clockwise seen from outside
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[-hx, -hy, hz], [hx, -hy, hz], [hx, hy, hz], [-hx, hy, hz]]),
            ([0.0, 0.0, -1.0], [[hx, -hy, -hz], [-hx, -hy, -hz], [-hx, hy, -hz], [hx, hy, -hz]]),
            ([0.0, 1.0, 0.0], [[-hx, hy, hz], [hx, hy, hz], [hx, hy, -hz], [-hx, hy, -hz]]),
            ([0.0, -1.0, 0.0], [[-hx, -hy, -hz], [hx, -hy, -hz], [hx, -hy, hz], [-hx, -hy, hz]]),
            ([1.0, 0.0, 0.0], [[hx, -hy, hz], [hx, -hy, -hz], [hx, hy, -hz], [hx, hy, hz]]),
            ([-1.0, 0.0, 0.0], [[-hx, -hy, -hz], [-hx, -hy, hz], [-hx, hy, hz], [-hx, hy, -hz]]),
        ];

        for (n, c) in faces {
            let v = |p: [f32; 3]| Vertex::new(p[0], p[1], p[2], n[0], n[1], n[2]);
            mesh.add_triangle(Triangle::new(v(c[0]), v(c[1]), v(c[2])));
            mesh.add_triangle(Triangle::new(v(c[0]), v(c[2]), v(c[3])));
        }

        mesh
    }

    /// UV sphere. Segment counts are floored and raised to at least 3 around
    /// and 2 from pole to pole.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3) as usize;
        let hs = height_segments.max(2) as usize;

        let mut grid = Vec::with_capacity((ws + 1) * (hs + 1));
        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let n = Vector3::new(
                    -(u * 2.0 * PI).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * 2.0 * PI).sin() * (v * PI).sin(),
                );
                grid.push(Vertex::from_parts(Point3::from(n * radius), n));
            }
        }

        let stride = ws + 1;
        let mut mesh = Self::with_capacity(ws * hs * 2);
        for iy in 0..hs {
            for ix in 0..ws {
                let a = grid[iy * stride + ix + 1];
                let b = grid[iy * stride + ix];
                let c = grid[(iy + 1) * stride + ix];
                let d = grid[(iy + 1) * stride + ix + 1];
                // The pole rows collapse to a point, one triangle per quad survives
                if iy != 0 {
                    mesh.add_triangle(Triangle::new(a, b, d));
                }
                if iy != hs - 1 {
                    mesh.add_triangle(Triangle::new(b, c, d));
                }
            }
        }

        mesh
    }

    /// Ring torus in the XY plane. Zero segments yield an empty mesh.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial = radial_segments as usize;
        let tubular = tubular_segments as usize;
        if radial == 0 || tubular == 0 {
            return Self::new();
        }

        let mut grid = Vec::with_capacity((radial + 1) * (tubular + 1));
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * PI * 2.0;
            for j in 0..=radial {
                let v = j as f32 / radial as f32 * PI * 2.0;
                let position = Point3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Point3::new(radius * u.cos(), radius * u.sin(), 0.0);
                let normal = (position - center)
                    .try_normalize(1e-12)
                    .unwrap_or_else(Vector3::z);
                grid.push(Vertex::from_parts(position, normal));
            }
        }

        Self::from_grid(&grid, tubular, radial)
    }

    /// (p, q) torus knot swept with a circular tube. Zero segments yield an
    /// empty mesh.
    pub fn torus_knot(
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    ) -> Self {
        let tubular = tubular_segments as usize;
        let radial = radial_segments as usize;
        if tubular == 0 || radial == 0 || p == 0 {
            return Self::new();
        }
        let (p, q) = (p as f32, q as f32);

        let mut grid = Vec::with_capacity((tubular + 1) * (radial + 1));
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * p * PI * 2.0;
            let p1 = knot_curve(u, p, q, radius);
            let p2 = knot_curve(u + 0.01, p, q, radius);

            // Frenet-like frame along the curve
            let t = p2 - p1;
            let n = p2.coords + p1.coords;
            let b = t.cross(&n);
            let n = b.cross(&t);
            let b = b.try_normalize(1e-12).unwrap_or_else(Vector3::z);
            let n = n.try_normalize(1e-12).unwrap_or_else(Vector3::y);

            for j in 0..=radial {
                let v = j as f32 / radial as f32 * PI * 2.0;
                let cx = -tube * v.cos();
                let cy = tube * v.sin();
                let position = p1 + n * cx + b * cy;
                let normal = (position - p1).try_normalize(1e-12).unwrap_or(n);
                grid.push(Vertex::from_parts(position, normal));
            }
        }

        Self::from_grid(&grid, tubular, radial)
    }

    /// Stitch a `(rows + 1) x (cols + 1)` vertex grid into two triangles per cell.
    fn from_grid(grid: &[Vertex], rows: usize, cols: usize) -> Self {
        let stride = cols + 1;
        let mut mesh = Self::with_capacity(rows * cols * 2);
        for r in 1..=rows {
            for c in 1..=cols {
                let a = grid[stride * (r - 1) + (c - 1)];
                let b = grid[stride * r + (c - 1)];
                let cc = grid[stride * r + c];
                let d = grid[stride * (r - 1) + c];
                mesh.add_triangle(Triangle::new(a, b, d));
                mesh.add_triangle(Triangle::new(b, cc, d));
            }
        }
        mesh
    }
}

fn knot_curve(u: f32, p: f32, q: f32, radius: f32) -> Point3<f32> {
    let qu_over_p = q / p * u;
    let cs = qu_over_p.cos();
    Point3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * qu_over_p.sin() * 0.5,
    )
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
