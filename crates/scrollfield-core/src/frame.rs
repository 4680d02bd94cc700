use log::trace;

/// Timing handed to every per-frame task.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Animation clock in seconds (sum of clamped deltas).
    pub elapsed: f32,
    /// Seconds since the previous frame, clamped.
    pub delta: f32,
    pub frame: u64,
}

/// Derives animation time from host timestamps in milliseconds.
///
/// Deltas are clamped so a suspended tab doesn't jump the animation.
pub struct FrameClock {
    last_ms: Option<f64>,
    elapsed: f32,
    frame: u64,
    max_delta: f32,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_ms: None,
            elapsed: 0.0,
            frame: 0,
            max_delta,
        }
    }

    pub fn advance(&mut self, now_ms: f64) -> FrameTime {
        let delta = match self.last_ms {
            Some(last) if now_ms.is_finite() && now_ms >= last => {
                (((now_ms - last) / 1000.0) as f32).min(self.max_delta)
            }
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
        }
        self.elapsed += delta;
        self.frame += 1;
        FrameTime {
            elapsed: self.elapsed,
            delta,
            frame: self.frame,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.1)
    }
}

/// Handle of a registered per-frame task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Owns the per-frame tasks and runs them in registration order.
#[derive(Default)]
pub struct RenderLoop {
    tasks: Vec<(TaskId, Box<dyn FnMut(FrameTime)>)>,
    next_id: u64,
    clock: FrameClock,
}

impl RenderLoop {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
            clock,
        }
    }

    pub fn register<F>(&mut self, task: F) -> TaskId
    where
        F: FnMut(FrameTime) + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push((id, Box::new(task)));
        id
    }

    pub fn unregister(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(task_id, _)| *task_id != id);
        before != self.tasks.len()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance the clock to `now_ms` and run every task once.
    pub fn tick(&mut self, now_ms: f64) -> FrameTime {
        let time = self.clock.advance(now_ms);
        trace!("frame {} dt={:.4}", time.frame, time.delta);
        for (_, task) in &mut self.tasks {
            task(time);
        }
        time
    }
}
