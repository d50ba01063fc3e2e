/// Fault boundary: turns the first render failure into a permanent fallback view
use log::error;
use std::panic::{self, AssertUnwindSafe};

use crate::error::RenderError;

pub const FALLBACK_MESSAGE: &str = "Something went wrong.";

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryState {
    Healthy,
    /// Terminal until the boundary is remounted
    Failed(RenderError),
}

/// What the mount point shows for one render call
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<T> {
    View(T),
    Fallback(&'static str),
}

impl<T> Rendered<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Rendered::Fallback(_))
    }

    pub fn view(self) -> Option<T> {
        match self {
            Rendered::View(v) => Some(v),
            Rendered::Fallback(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct FaultBoundary {
    state: BoundaryState,
}

impl FaultBoundary {
    pub fn new() -> Self {
        Self {
            state: BoundaryState::Healthy,
        }
    }

    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    pub fn has_failed(&self) -> bool {
        matches!(self.state, BoundaryState::Failed(_))
    }

    /// Run one render of the wrapped tree.
    ///
    /// Errors and panics are caught here, logged once with `context`, and
    /// never reach the caller. Once failed, `render` is no longer called.
    pub fn render<T, F>(&mut self, context: &str, render: F) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, RenderError>,
    {
        if self.has_failed() {
            return Rendered::Fallback(FALLBACK_MESSAGE);
        }

        let outcome = match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(result) => result,
            Err(payload) => Err(RenderError::Panicked(panic_message(payload.as_ref()))),
        };

        match outcome {
            Ok(view) => Rendered::View(view),
            Err(err) => {
                error!("Error caught in fault boundary: {err} (while {context})");
                self.state = BoundaryState::Failed(err);
                Rendered::Fallback(FALLBACK_MESSAGE)
            }
        }
    }
}

impl Default for FaultBoundary {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_passes_view_through() {
        let mut boundary = FaultBoundary::new();
        assert_eq!(boundary.render("frame", || Ok(3)), Rendered::View(3));
        assert_eq!(boundary.state(), &BoundaryState::Healthy);
    }

    #[test]
    fn test_error_switches_to_fallback_for_good() {
        let mut boundary = FaultBoundary::new();
        let out: Rendered<()> = boundary.render("frame", || {
            Err(RenderError::EmptyViewport {
                width: 0,
                height: 0,
            })
        });
        assert_eq!(out, Rendered::Fallback(FALLBACK_MESSAGE));

        let mut called = false;
        let out = boundary.render("frame", || {
            called = true;
            Ok(1)
        });
        assert!(out.is_fallback());
        assert!(!called);
    }

    #[test]
    fn test_panic_is_contained() {
        let mut boundary = FaultBoundary::new();
        let out: Rendered<u8> = boundary.render("frame", || panic!("mesh exploded"));
        assert_eq!(out, Rendered::Fallback(FALLBACK_MESSAGE));
        assert_eq!(
            boundary.state(),
            &BoundaryState::Failed(RenderError::Panicked("mesh exploded".into()))
        );
    }
}
