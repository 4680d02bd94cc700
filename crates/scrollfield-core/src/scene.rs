//! Scene context: one particle field, its scroll bindings and its render
//! loop, created and destroyed together.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use glam::Vec3;
use log::debug;

use crate::config::FieldConfig;
use crate::error::ConfigError;
use crate::field::ParticleField;
use crate::frame::{FrameClock, FrameTime, RenderLoop, TaskId};
use crate::scroll::{
    Edge, LayoutSource, ScrollTracker, SharedProgress, Subscription, TriggerRule,
};

/// Which shape narrative the field plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldVariant {
    /// Chaos → stream → grid → core point background.
    Pipeline,
    /// Tensor → cloud → helix → sphere instanced boxes.
    Matrix,
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub field: FieldConfig,
    pub variant: FieldVariant,
    /// Anchor whose exit slides the field sideways.
    pub hero_anchor: String,
    /// Anchor whose scroll range drives the phase.
    pub pipeline_anchor: String,
    /// Horizontal offset reached once the hero has scrolled away.
    pub hero_offset_x: f32,
    /// Easing of the group offset toward its target per frame.
    pub offset_follow: f32,
    /// Largest frame delta in seconds.
    pub max_delta: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            variant: FieldVariant::Pipeline,
            hero_anchor: "hero-section".to_string(),
            pipeline_anchor: "pipeline-track".to_string(),
            hero_offset_x: 14.0,
            offset_follow: 0.05,
            max_delta: 0.1,
        }
    }
}

impl SceneConfig {
    pub fn matrix() -> Self {
        Self {
            field: FieldConfig::matrix(),
            variant: FieldVariant::Matrix,
            hero_offset_x: 12.0,
            ..Self::default()
        }
    }

    /// Trigger range of the phase binding for this variant.
    fn pipeline_rules(&self) -> (TriggerRule, TriggerRule) {
        let start = match self.variant {
            FieldVariant::Pipeline => TriggerRule::new(Edge::Top, Edge::Bottom),
            FieldVariant::Matrix => TriggerRule::new(Edge::Top, Edge::Center),
        };
        (start, TriggerRule::new(Edge::Bottom, Edge::Bottom))
    }
}

/// Explicit owner of everything one animated background needs.
pub struct Scene {
    field: Rc<RefCell<ParticleField>>,
    tracker: ScrollTracker,
    render_loop: RenderLoop,
    group_offset: Rc<Cell<f32>>,
    subscriptions: Vec<Subscription>,
    tasks: Vec<TaskId>,
    destroyed: bool,
}

impl Scene {
    pub fn create(config: SceneConfig) -> Result<Self, ConfigError> {
        let field = match config.variant {
            FieldVariant::Pipeline => ParticleField::pipeline(config.field.clone())?,
            FieldVariant::Matrix => ParticleField::matrix(config.field.clone())?,
        };
        let field = Rc::new(RefCell::new(field));

        let mut tracker = ScrollTracker::new();
        let phase_progress = SharedProgress::default();
        let hero_progress = SharedProgress::default();
        let (start, end) = config.pipeline_rules();
        let subscriptions = vec![
            tracker.bind_shared(
                config.hero_anchor.clone(),
                TriggerRule::new(Edge::Bottom, Edge::Bottom),
                TriggerRule::new(Edge::Bottom, Edge::Top),
                hero_progress.clone(),
            ),
            tracker.bind_shared(config.pipeline_anchor.clone(), start, end, phase_progress.clone()),
        ];

        let mut render_loop = RenderLoop::new(FrameClock::new(config.max_delta));
        let group_offset = Rc::new(Cell::new(0.0));

        let field_task = {
            let field = Rc::clone(&field);
            let group_offset = Rc::clone(&group_offset);
            render_loop.register(move |time: FrameTime| {
                let mut field = field.borrow_mut();
                field.set_scroll_progress(phase_progress.get());
                field.set_group_offset_x(group_offset.get());
                field.tick(time.elapsed, time.delta);
            })
        };
        let offset_task = {
            let group_offset = Rc::clone(&group_offset);
            let reach = config.hero_offset_x;
            let follow = config.offset_follow.clamp(0.0, 1.0);
            render_loop.register(move |_| {
                let target = hero_progress.get() * reach;
                let current = group_offset.get();
                group_offset.set(current + (target - current) * follow);
            })
        };

        debug!("scene created ({:?})", config.variant);
        Ok(Self {
            field,
            tracker,
            render_loop,
            group_offset,
            subscriptions,
            tasks: vec![field_task, offset_task],
            destroyed: false,
        })
    }

    pub fn field(&self) -> Ref<'_, ParticleField> {
        self.field.borrow()
    }

    /// Horizontal offset of the whole field.
    pub fn group_offset_x(&self) -> f32 {
        self.group_offset.get()
    }

    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ScrollTracker {
        &mut self.tracker
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Register an extra per-frame task that runs after the built-in ones.
    pub fn register_task<F>(&mut self, task: F) -> TaskId
    where
        F: FnMut(FrameTime) + 'static,
    {
        let id = self.render_loop.register(task);
        self.tasks.push(id);
        id
    }

    pub fn unregister_task(&mut self, id: TaskId) -> bool {
        self.tasks.retain(|t| *t != id);
        self.render_loop.unregister(id)
    }

    pub fn refresh(&mut self, layout: &dyn LayoutSource) {
        if !self.destroyed {
            self.tracker.refresh(layout);
        }
    }

    pub fn on_scroll(&mut self, scroll_y: f32) {
        if !self.destroyed {
            self.tracker.on_scroll(scroll_y);
        }
    }

    /// Pick up anchors mounted since the last measurement.
    pub fn retry_deferred(&mut self, layout: &dyn LayoutSource) -> usize {
        if self.destroyed || self.tracker.deferred_count() == 0 {
            return 0;
        }
        self.tracker.retry_deferred(layout)
    }

    /// Scroll handler for hosts that can query layout cheaply: resolves any
    /// deferred anchor before applying the new offset.
    pub fn on_scroll_with(&mut self, scroll_y: f32, layout: &dyn LayoutSource) {
        if self.destroyed {
            return;
        }
        self.on_scroll(scroll_y);
        self.retry_deferred(layout);
    }

    pub fn pointer_move(&mut self, world: Vec3) {
        self.field.borrow_mut().pointer_move(world);
    }

    pub fn pointer_leave(&mut self) {
        self.field.borrow_mut().pointer_leave();
    }

    pub fn click(&mut self) {
        self.field.borrow_mut().click();
    }

    pub fn set_interaction_enabled(&mut self, enabled: bool) {
        self.field.borrow_mut().set_interaction_enabled(enabled);
    }

    /// Run one frame at host time `now_ms`. No-op once destroyed.
    pub fn frame(&mut self, now_ms: f64) -> Option<FrameTime> {
        if self.destroyed {
            return None;
        }
        Some(self.render_loop.tick(now_ms))
    }

    /// Remove scroll bindings and per-frame tasks. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for sub in self.subscriptions.drain(..) {
            self.tracker.unbind(sub);
        }
        self.tracker.clear();
        for id in self.tasks.drain(..) {
            self.render_loop.unregister(id);
        }
        self.render_loop.clear();
        self.destroyed = true;
        debug!("scene destroyed");
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.destroy();
    }
}
