//! Reactive parameter store backing the control panel.
//!
//! Consumers declare a schema once and get back a [`ParamView`]. Edits made
//! through [`ParameterStore::set`] only touch the panel-side descriptors; they
//! become visible to consumers when the host runs [`ParameterStore::publish`],
//! which swaps in a fresh immutable snapshot per changed group. A consumer
//! therefore always sees either the whole old value set or the whole new one.

use log::{debug, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::color::Color;
use crate::error::ParamError;

/// Result type alias for parameter operations
pub type Result<T> = std::result::Result<T, ParamError>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f32),
    Color(Color),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParamValue::Color(c) => Some(*c),
            ParamValue::Number(_) => None,
        }
    }
}

/// Widget domain of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    Number {
        min: Option<f32>,
        max: Option<f32>,
        step: Option<f32>,
    },
    Color,
}

/// One schema entry as declared by a consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDescriptor {
    pub key: String,
    pub label: String,
    pub value: ParamValue,
    pub default: ParamValue,
    pub kind: ParamKind,
}

impl ParamDescriptor {
    pub fn number(key: &str, label: &str, value: f32) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            value: ParamValue::Number(value),
            default: ParamValue::Number(value),
            kind: ParamKind::Number {
                min: None,
                max: None,
                step: None,
            },
        }
    }

    pub fn color(key: &str, label: &str, value: &str) -> Result<Self> {
        let color: Color = value.parse()?;
        Ok(Self {
            key: key.to_string(),
            label: label.to_string(),
            value: ParamValue::Color(color),
            default: ParamValue::Color(color),
            kind: ParamKind::Color,
        })
    }

    pub fn range(mut self, lo: f32, hi: f32) -> Self {
        if let ParamKind::Number { min, max, .. } = &mut self.kind {
            *min = Some(lo);
            *max = Some(hi);
        }
        self
    }

    pub fn step(mut self, s: f32) -> Self {
        if let ParamKind::Number { step, .. } = &mut self.kind {
            *step = Some(s);
        }
        self
    }

    pub fn step_size(&self) -> Option<f32> {
        match self.kind {
            ParamKind::Number { step, .. } => step,
            ParamKind::Color => None,
        }
    }

    /// Clamp into `[min, max]` and snap onto the step grid anchored at `min`.
    pub fn normalize(&self, value: ParamValue) -> Option<ParamValue> {
        match (self.kind, value) {
            (ParamKind::Number { min, max, step }, ParamValue::Number(mut n)) => {
                if !n.is_finite() {
                    return None;
                }
                if let Some(s) = step.filter(|s| *s > 0.0) {
                    let origin = min.unwrap_or(0.0);
                    n = origin + ((n - origin) / s).round() * s;
                }
                if let Some(lo) = min {
                    n = n.max(lo);
                }
                if let Some(hi) = max {
                    n = n.min(hi);
                }
                Some(ParamValue::Number(n))
            }
            (ParamKind::Color, ParamValue::Color(c)) => Some(ParamValue::Color(c)),
            _ => None,
        }
    }

    /// Value one step up or down, for keyboard-driven panels. Colors cycle
    /// through the palette.
    pub fn nudged(&self, forward: bool) -> ParamValue {
        match (self.kind, self.value) {
            (ParamKind::Number { min, max, step }, ParamValue::Number(n)) => {
                let s = step.unwrap_or_else(|| match (min, max) {
                    (Some(lo), Some(hi)) => (hi - lo) / 100.0,
                    _ => 0.1,
                });
                let next = if forward { n + s } else { n - s };
                self.normalize(ParamValue::Number(next))
                    .unwrap_or(self.value)
            }
            (_, ParamValue::Color(c)) => ParamValue::Color(c.cycle(forward)),
            (ParamKind::Color, v) => v,
        }
    }

    fn validate(&self) -> Result<()> {
        if let ParamKind::Number {
            min: Some(lo),
            max: Some(hi),
            ..
        } = self.kind
        {
            if lo > hi || !lo.is_finite() || !hi.is_finite() {
                return Err(ParamError::InvalidRange {
                    key: self.key.clone(),
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(())
    }

    fn expected(&self) -> &'static str {
        match self.kind {
            ParamKind::Number { .. } => "numeric",
            ParamKind::Color => "color",
        }
    }
}

/// Immutable, published values of one consumer's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSnapshot {
    revision: u64,
    values: Vec<(String, ParamValue)>,
}

impl ParamSnapshot {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, key: &str) -> Option<ParamValue> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Numeric value, or `fallback` if missing or of another type
    pub fn number(&self, key: &str, fallback: f32) -> f32 {
        self.get(key)
            .and_then(|v| v.as_number())
            .unwrap_or(fallback)
    }

    pub fn color(&self, key: &str, fallback: Color) -> Color {
        self.get(key).and_then(|v| v.as_color()).unwrap_or(fallback)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[derive(Debug)]
struct Group {
    id: u64,
    owner: String,
    descriptors: Vec<ParamDescriptor>,
    published: Arc<ParamSnapshot>,
    dirty: bool,
}

impl Group {
    fn snapshot(&self, revision: u64) -> ParamSnapshot {
        ParamSnapshot {
            revision,
            values: self
                .descriptors
                .iter()
                .map(|d| (d.key.clone(), d.value))
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    groups: Vec<Group>,
    next_group: u64,
}

impl StoreState {
    fn group(&self, id: u64) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    fn locate(&mut self, key: &str) -> Option<(&mut Group, usize)> {
        self.groups.iter_mut().find_map(|g| {
            let idx = g.descriptors.iter().position(|d| d.key == key)?;
            Some((g, idx))
        })
    }
}

/// Shared handle to the panel's parameter state. Cloning shares the store.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    state: Rc<RefCell<StoreState>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer's schema. Keys share one namespace across all
    /// consumers, like the panel they are shown in.
    pub fn declare(&self, owner: &str, schema: Vec<ParamDescriptor>) -> Result<ParamView> {
        let mut state = self.state.borrow_mut();
        for (i, descriptor) in schema.iter().enumerate() {
            descriptor.validate()?;
            let clash_in_store = state
                .groups
                .iter()
                .any(|g| g.descriptors.iter().any(|d| d.key == descriptor.key));
            let clash_in_schema = schema[..i].iter().any(|d| d.key == descriptor.key);
            if clash_in_store || clash_in_schema {
                return Err(ParamError::DuplicateKey(descriptor.key.clone()));
            }
        }

        // Defaults go through the same clamping as user edits
        let descriptors: Vec<ParamDescriptor> = schema
            .into_iter()
            .map(|mut d| {
                d.value = d.normalize(d.value).unwrap_or(d.value);
                d.default = d.value;
                d
            })
            .collect();

        let id = state.next_group;
        state.next_group += 1;
        let mut group = Group {
            id,
            owner: owner.to_string(),
            descriptors,
            published: Arc::new(ParamSnapshot {
                revision: 0,
                values: Vec::new(),
            }),
            dirty: false,
        };
        group.published = Arc::new(group.snapshot(0));
        debug!(
            "declared {} parameter(s) for `{}`",
            group.descriptors.len(),
            owner
        );
        state.groups.push(group);

        Ok(ParamView {
            store: self.clone(),
            group: id,
            seen: 0,
        })
    }

    /// Panel-side edit. Numeric values are clamped and snapped; the change is
    /// not visible to consumers until the next [`publish`](Self::publish).
    pub fn set(&self, key: &str, value: ParamValue) -> Result<ParamValue> {
        let mut state = self.state.borrow_mut();
        let Some((group, idx)) = state.locate(key) else {
            warn!("rejected write to unknown parameter `{key}`");
            return Err(ParamError::UnknownKey(key.to_string()));
        };
        let descriptor = &mut group.descriptors[idx];
        let Some(value) = descriptor.normalize(value) else {
            warn!("rejected {value:?} for parameter `{key}`");
            return Err(ParamError::TypeMismatch {
                key: key.to_string(),
                expected: descriptor.expected(),
            });
        };
        if descriptor.value != value {
            descriptor.value = value;
            group.dirty = true;
        }
        Ok(value)
    }

    /// Convenience for hosts that only have text: numbers or color strings.
    pub fn set_str(&self, key: &str, raw: &str) -> Result<ParamValue> {
        let expects_color = {
            let state = self.state.borrow();
            state
                .groups
                .iter()
                .flat_map(|g| g.descriptors.iter())
                .find(|d| d.key == key)
                .map(|d| d.kind == ParamKind::Color)
                .ok_or_else(|| ParamError::UnknownKey(key.to_string()))?
        };
        let value = if expects_color {
            ParamValue::Color(raw.parse()?)
        } else {
            let n = raw.trim().parse::<f32>().map_err(|_| ParamError::TypeMismatch {
                key: key.to_string(),
                expected: "numeric",
            })?;
            ParamValue::Number(n)
        };
        self.set(key, value)
    }

    /// Step a parameter by one increment (keyboard panels)
    pub fn nudge(&self, key: &str, forward: bool) -> Result<ParamValue> {
        let next = self
            .descriptor(key)
            .ok_or_else(|| ParamError::UnknownKey(key.to_string()))?
            .nudged(forward);
        self.set(key, next)
    }

    /// Restore every parameter to its declared default
    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();
        for group in &mut state.groups {
            for d in &mut group.descriptors {
                if d.value != d.default {
                    d.value = d.default;
                    group.dirty = true;
                }
            }
        }
    }

    /// Publish pending edits. Each changed group gets one new snapshot that
    /// replaces the old one as a whole. Returns the number of groups updated.
    pub fn publish(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let mut updated = 0;
        for group in state.groups.iter_mut().filter(|g| g.dirty) {
            let revision = group.published.revision + 1;
            group.published = Arc::new(group.snapshot(revision));
            group.dirty = false;
            updated += 1;
            debug!("published `{}` revision {}", group.owner, revision);
        }
        updated
    }

    pub fn has_pending(&self) -> bool {
        self.state.borrow().groups.iter().any(|g| g.dirty)
    }

    pub fn descriptor(&self, key: &str) -> Option<ParamDescriptor> {
        self.state
            .borrow()
            .groups
            .iter()
            .flat_map(|g| g.descriptors.iter())
            .find(|d| d.key == key)
            .cloned()
    }

    /// All declared descriptors in declaration order, with panel-side values
    pub fn schema(&self) -> Vec<ParamDescriptor> {
        self.state
            .borrow()
            .groups
            .iter()
            .flat_map(|g| g.descriptors.iter().cloned())
            .collect()
    }

    fn release(&self, group: u64) {
        // A panicking render may still hold a borrow while views unwind
        if let Ok(mut state) = self.state.try_borrow_mut() {
            if let Some(pos) = state.groups.iter().position(|g| g.id == group) {
                let removed = state.groups.remove(pos);
                debug!("released parameters of `{}`", removed.owner);
            }
        }
    }
}

/// Read-only view of one consumer's parameters plus a change subscription.
/// Dropping the view removes its parameters from the store.
#[derive(Debug)]
pub struct ParamView {
    store: ParameterStore,
    group: u64,
    seen: u64,
}

impl ParamView {
    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<ParamSnapshot> {
        self.store
            .state
            .borrow()
            .group(self.group)
            .map(|g| Arc::clone(&g.published))
            .unwrap_or_else(|| {
                Arc::new(ParamSnapshot {
                    revision: self.seen,
                    values: Vec::new(),
                })
            })
    }

    /// The new snapshot if one was published since the last call
    pub fn poll_changed(&mut self) -> Option<Arc<ParamSnapshot>> {
        let snapshot = self.snapshot();
        if snapshot.revision > self.seen {
            self.seen = snapshot.revision;
            Some(snapshot)
        } else {
            None
        }
    }
}

impl Drop for ParamView {
    fn drop(&mut self) {
        self.store.release(self.group);
    }
}
