//! Scroll progress tracking over named anchor regions.
//!
//! A binding maps the scroll range between two trigger points of an anchor
//! onto `[0, 1]`. Trigger points are `(element edge, viewport edge)` pairs:
//! `"top bottom"` fires when the element's top reaches the viewport's bottom.

use std::cell::Cell;
use std::rc::Rc;
use std::str::FromStr;

use log::{debug, warn};

use crate::error::TriggerParseError;

/// A horizontal line on an element or on the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Fraction of the height measured from the top, e.g. `0.5` for `50%`.
    Fraction(f32),
}

impl Edge {
    /// Offset of this edge from the top of a box of the given height.
    pub fn offset(self, height: f32) -> f32 {
        match self {
            Edge::Top => 0.0,
            Edge::Center => height * 0.5,
            Edge::Bottom => height,
            Edge::Fraction(f) => height * f,
        }
    }
}

impl FromStr for Edge {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" | "start" => Ok(Edge::Top),
            "center" => Ok(Edge::Center),
            "bottom" | "end" => Ok(Edge::Bottom),
            _ => s
                .strip_suffix('%')
                .and_then(|n| n.trim().parse::<f32>().ok())
                .filter(|n| n.is_finite())
                .map(|n| Edge::Fraction(n / 100.0))
                .ok_or_else(|| TriggerParseError::UnknownEdge(s.to_string())),
        }
    }
}

/// Fires when `element` edge of the anchor meets `viewport` edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerRule {
    pub element: Edge,
    pub viewport: Edge,
}

impl TriggerRule {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which this rule fires for `rect`.
    pub fn scroll_position(&self, rect: AnchorRect, viewport_height: f32) -> f32 {
        rect.top + self.element.offset(rect.height) - self.viewport.offset(viewport_height)
    }
}

impl FromStr for TriggerRule {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(TriggerParseError::MissingEdge(s.to_string()));
        };
        Ok(Self {
            element: element.parse()?,
            viewport: viewport.parse()?,
        })
    }
}

/// Anchor bounding box in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorRect {
    pub top: f32,
    pub height: f32,
}

/// Host layout queried on refresh.
pub trait LayoutSource {
    /// Document-space rect of the anchor, or `None` if it isn't mounted yet.
    fn anchor_rect(&self, anchor: &str) -> Option<AnchorRect>;

    fn viewport_height(&self) -> f32;
}

/// Normalized position of `scroll` between `start` and `end`.
///
/// Degenerate or non-finite ranges yield 0.
pub fn progress_between(scroll: f32, start: f32, end: f32) -> f32 {
    let span = end - start;
    if !span.is_finite() || span.abs() <= f32::EPSILON || !scroll.is_finite() {
        return 0.0;
    }
    ((scroll - start) / span).clamp(0.0, 1.0)
}

/// Single-writer, last-write-wins progress cell shared with the render loop.
#[derive(Clone, Debug, Default)]
pub struct SharedProgress(Rc<Cell<f32>>);

impl SharedProgress {
    pub fn new(value: f32) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set(&self, value: f32) {
        self.0.set(value);
    }
}

/// Handle returned by [`ScrollTracker::bind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct Binding {
    id: Subscription,
    anchor: String,
    start: TriggerRule,
    end: TriggerRule,
    /// Resolved `(start, end)` scroll offsets; `None` while deferred.
    range: Option<(f32, f32)>,
    progress: Option<f32>,
    on_update: Box<dyn FnMut(f32)>,
}

impl Binding {
    fn resolve(&mut self, layout: &dyn LayoutSource, viewport: f32) {
        self.range = layout.anchor_rect(&self.anchor).map(|rect| {
            (
                self.start.scroll_position(rect, viewport),
                self.end.scroll_position(rect, viewport),
            )
        });
    }

    fn evaluate(&mut self, scroll_y: f32) {
        let Some((start, end)) = self.range else {
            return;
        };
        let progress = progress_between(scroll_y, start, end);
        if self.progress != Some(progress) {
            self.progress = Some(progress);
            (self.on_update)(progress);
        }
    }
}

/// Converts scroll offsets into per-anchor progress values.
#[derive(Default)]
pub struct ScrollTracker {
    bindings: Vec<Binding>,
    next_id: u64,
    scroll_y: f32,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding. It stays deferred until a [`refresh`](Self::refresh)
    /// or [`retry_deferred`](Self::retry_deferred) finds its anchor.
    pub fn bind<F>(
        &mut self,
        anchor: impl Into<String>,
        start: TriggerRule,
        end: TriggerRule,
        on_update: F,
    ) -> Subscription
    where
        F: FnMut(f32) + 'static,
    {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.bindings.push(Binding {
            id,
            anchor: anchor.into(),
            start,
            end,
            range: None,
            progress: None,
            on_update: Box::new(on_update),
        });
        id
    }

    /// Bind an anchor whose progress is written straight into `cell`.
    pub fn bind_shared(
        &mut self,
        anchor: impl Into<String>,
        start: TriggerRule,
        end: TriggerRule,
        cell: SharedProgress,
    ) -> Subscription {
        self.bind(anchor, start, end, move |p| cell.set(p))
    }

    pub fn unbind(&mut self, sub: Subscription) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.id != sub);
        before != self.bindings.len()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings whose anchor hasn't been found yet.
    pub fn deferred_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.range.is_none()).count()
    }

    /// Last emitted progress of a binding.
    pub fn progress(&self, sub: Subscription) -> Option<f32> {
        self.bindings
            .iter()
            .find(|b| b.id == sub)
            .and_then(|b| b.progress)
    }

    /// Recompute trigger offsets from the current layout, then re-evaluate
    /// every binding at the last known scroll offset.
    ///
    /// Call after resize or any layout shift.
    pub fn refresh(&mut self, layout: &dyn LayoutSource) {
        let viewport = layout.viewport_height();
        if !viewport.is_finite() || viewport < 0.0 {
            warn!("ignoring refresh with invalid viewport height {viewport}");
            return;
        }
        for binding in &mut self.bindings {
            binding.resolve(layout, viewport);
            if binding.range.is_none() {
                warn!("scroll anchor '{}' not mounted, deferring", binding.anchor);
            }
        }
        let scroll_y = self.scroll_y;
        for binding in &mut self.bindings {
            binding.evaluate(scroll_y);
        }
    }

    /// Resolve only the deferred bindings, leaving measured ones untouched,
    /// and evaluate the newly resolved ones at the last scroll offset.
    ///
    /// Cheap enough to call every frame while anything is deferred. Returns
    /// how many bindings were resolved.
    pub fn retry_deferred(&mut self, layout: &dyn LayoutSource) -> usize {
        let viewport = layout.viewport_height();
        if !viewport.is_finite() || viewport < 0.0 {
            return 0;
        }
        let scroll_y = self.scroll_y;
        let mut resolved = 0;
        for binding in self.bindings.iter_mut().filter(|b| b.range.is_none()) {
            binding.resolve(layout, viewport);
            if binding.range.is_some() {
                debug!("scroll anchor '{}' mounted", binding.anchor);
                binding.evaluate(scroll_y);
                resolved += 1;
            }
        }
        resolved
    }

    /// Record a new scroll offset and notify bindings whose progress changed,
    /// in registration order.
    pub fn on_scroll(&mut self, scroll_y: f32) {
        if !scroll_y.is_finite() {
            return;
        }
        self.scroll_y = scroll_y;
        for binding in &mut self.bindings {
            binding.evaluate(scroll_y);
        }
    }
}
