/// Pointer hit-testing and enter/leave/click routing
use log::trace;
use nalgebra::Point3;

use crate::node::{NodeId, NodePool};
use crate::raycast::Ray;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Enter,
    Leave,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// World-space hit point; `None` for leave events
    pub point: Option<Point3<f32>>,
    pub distance: f32,
}

impl PointerEvent {
    pub fn enter(hit: &Hit) -> Self {
        Self {
            kind: PointerEventKind::Enter,
            point: Some(hit.point),
            distance: hit.distance,
        }
    }

    pub fn click(hit: &Hit) -> Self {
        Self {
            kind: PointerEventKind::Click,
            point: Some(hit.point),
            distance: hit.distance,
        }
    }

    pub fn leave() -> Self {
        Self {
            kind: PointerEventKind::Leave,
            point: None,
            distance: f32::INFINITY,
        }
    }
}

/// What a handler wants done with the objects behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    #[default]
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Point3<f32>,
}

/// Nearest intersection of `ray` with each node, sorted nearest-first.
/// Single-sided solid materials only register hits on their front faces.
pub fn pick(ray: &Ray, pool: &NodePool) -> Vec<Hit> {
    let mut hits: Vec<Hit> = pool
        .iter()
        .filter_map(|(id, node)| {
            let t = &node.transform;
            let center = Point3::from(t.position);
            if !ray.hits_sphere(&center, node.world_bounds()) {
                return None;
            }

            let model = t.model_matrix();
            let cull_back = !node.material.is_double_sided() && !node.material.wireframe;
            let nearest = node
                .mesh
                .triangles
                .iter()
                .filter_map(|tri| {
                    let [a, b, c] = tri.vertices.map(|v| model.transform_point(&v.position));
                    ray.intersect_triangle(&a, &b, &c, cull_back)
                })
                .fold(f32::INFINITY, f32::min);

            nearest.is_finite().then(|| Hit {
                node: id,
                distance: nearest,
                point: ray.at(nearest),
            })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Tracks which nodes are under the pointer and turns hit lists into
/// enter/leave/click deliveries.
#[derive(Debug, Default)]
pub struct PointerRouter {
    /// Hovered nodes with the propagation their enter handler returned
    hovered: Vec<(NodeId, Propagation)>,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hovered(&self, id: NodeId) -> bool {
        self.hovered.iter().any(|(h, _)| *h == id)
    }

    /// Pointer moved. `hits` must be nearest-first. Newly hovered nodes get
    /// an enter event; walking stops at the first node whose enter handler
    /// stopped propagation, so nodes behind it count as not hovered. Nodes
    /// no longer hovered get a leave event.
    pub fn update<F>(&mut self, hits: &[Hit], mut deliver: F)
    where
        F: FnMut(NodeId, PointerEvent) -> Propagation,
    {
        let mut next: Vec<(NodeId, Propagation)> = Vec::with_capacity(hits.len());
        for hit in hits {
            if next.iter().any(|(id, _)| *id == hit.node) {
                continue;
            }
            let propagation = match self.hovered.iter().find(|(id, _)| *id == hit.node) {
                Some((_, p)) => *p,
                None => {
                    trace!("pointer enter {:?}", hit.node);
                    deliver(hit.node, PointerEvent::enter(hit))
                }
            };
            next.push((hit.node, propagation));
            if propagation == Propagation::Stop {
                break;
            }
        }

        for (id, _) in &self.hovered {
            if !next.iter().any(|(n, _)| n == id) {
                trace!("pointer leave {:?}", id);
                deliver(*id, PointerEvent::leave());
            }
        }
        self.hovered = next;
    }

    /// Pointer left the canvas: every hovered node gets a leave event.
    pub fn leave_all<F>(&mut self, mut deliver: F)
    where
        F: FnMut(NodeId, PointerEvent) -> Propagation,
    {
        for (id, _) in self.hovered.drain(..) {
            deliver(id, PointerEvent::leave());
        }
    }

    /// Click at the pointer. Delivered nearest-first until a handler stops it.
    pub fn click<F>(&mut self, hits: &[Hit], mut deliver: F)
    where
        F: FnMut(NodeId, PointerEvent) -> Propagation,
    {
        for hit in hits {
            trace!("pointer click {:?}", hit.node);
            if deliver(hit.node, PointerEvent::click(hit)) == Propagation::Stop {
                break;
            }
        }
    }

    /// Forget a node that was unmounted while hovered
    pub fn forget(&mut self, id: NodeId) {
        self.hovered.retain(|(h, _)| *h != id);
    }
}
