//! Host-independent render pass.
//!
//! Projects every attached node through the camera, applies material effects
//! and flat shading, and hands frontends a flat list of screen-space
//! triangles and lines to rasterize however they like.

use nalgebra::{Point3, Vector3};

use crate::color::Color;
use crate::error::RenderError;
use crate::lighting::Lighting;
use crate::node::NodePool;
use crate::projection::{Camera, ScreenPoint};

/// Result type alias for render operations
pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTriangle {
    pub points: [ScreenPoint; 3],
    pub color: Color,
}

impl DrawTriangle {
    /// Mean NDC depth, for painter's-order sorting
    pub fn depth(&self) -> f32 {
        (self.points[0].2 + self.points[1].2 + self.points[2].2) / 3.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawLine {
    pub from: ScreenPoint,
    pub to: ScreenPoint,
    pub color: Color,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub width: u32,
    pub height: u32,
    /// Sorted far to near
    pub triangles: Vec<DrawTriangle>,
    pub lines: Vec<DrawLine>,
}

impl DrawList {
    /// Queue a line, clipped to the viewport. Segments entirely off screen
    /// are dropped.
    pub fn push_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) {
        if let Some((from, to)) = clip_segment(from, to, self.width as f32, self.height as f32) {
            self.lines.push(DrawLine { from, to, color });
        }
    }
}

/// Liang-Barsky clip of a screen-space segment to `[0, width] x [0, height]`.
/// Depth is interpolated along with the endpoints.
pub fn clip_segment(
    from: ScreenPoint,
    to: ScreenPoint,
    width: f32,
    height: f32,
) -> Option<(ScreenPoint, ScreenPoint)> {
    let finite = |p: &ScreenPoint| p.0.is_finite() && p.1.is_finite() && p.2.is_finite();
    if !finite(&from) || !finite(&to) {
        return None;
    }

    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    let edges = [
        (-dx, from.0),
        (dx, width - from.0),
        (-dy, from.1),
        (dy, height - from.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            // Parallel to this edge and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f32| -> ScreenPoint {
        (
            (from.0 + dx * t).clamp(0.0, width),
            (from.1 + dy * t).clamp(0.0, height),
            from.2 + (to.2 - from.2) * t,
        )
    };
    Some((at(t0), at(t1)))
}

pub fn build_draw_list(
    pool: &NodePool,
    lighting: &Lighting,
    camera: &Camera,
    width: u32,
    height: u32,
) -> Result<DrawList> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyViewport { width, height });
    }
    if camera.is_degenerate() {
        return Err(RenderError::DegenerateCamera(format!(
            "eye {:?} target {:?}",
            camera.position, camera.target
        )));
    }

    let view_projection = camera.view_projection();
    let project = |p: &Point3<f32>| camera.project_world(&view_projection, p, width, height);
    let mut list = DrawList {
        width,
        height,
        ..DrawList::default()
    };

    for (_, node) in pool.iter() {
        if !node.transform.is_finite() {
            return Err(RenderError::NonFiniteTransform(node.name.clone()));
        }
        let model = node.transform.model_matrix();
        let material = &node.material;

        for tri in &node.mesh.triangles {
            let world = tri.vertices.map(|v| {
                let local = match &material.wobble {
                    Some(wobble) => wobble.displace(&v.position),
                    None => v.position,
                };
                model.transform_point(&local)
            });

            let mut normal: Vector3<f32> = (world[1] - world[0]).cross(&(world[2] - world[0]));
            let Some(n) = normal.try_normalize(1e-12) else {
                continue;
            };
            normal = n;
            let facing = normal.dot(&(camera.position - world[0])) > 0.0;
            if !facing {
                if !material.is_double_sided() && !material.wireframe {
                    continue;
                }
                normal = -normal;
            }

            let Some(points) = project_all(&world, &project) else {
                continue;
            };
            let color = lighting.shade(&normal, material.color);

            if material.wireframe {
                for i in 0..3 {
                    list.push_line(points[i], points[(i + 1) % 3], color);
                }
            } else {
                list.triangles.push(DrawTriangle { points, color });
            }
        }
    }

    if let Some(helper) = &lighting.helper {
        for (a, b) in helper.segments(&lighting.directional) {
            if let (Some(from), Some(to)) = (project(&a), project(&b)) {
                list.push_line(from, to, helper.color);
            }
        }
    }

    list.triangles
        .sort_by(|a, b| b.depth().total_cmp(&a.depth()));
    Ok(list)
}

fn project_all<F>(world: &[Point3<f32>; 3], project: &F) -> Option<[ScreenPoint; 3]>
where
    F: Fn(&Point3<f32>) -> Option<ScreenPoint>,
{
    Some([project(&world[0])?, project(&world[1])?, project(&world[2])?])
}
