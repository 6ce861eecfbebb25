//! Window animator.
//!
//! Animations interpolate a window between two [`WindowVisualState`]s. A
//! fixed-rate frame loop calls [`Animator::tick`], which advances every active
//! animation, hands the interpolated states to the [`AnimationSink`] and
//! promotes queued animations into freed slots (highest priority first).
//!
//! At most one tick runs at a time; a tick that finds another in progress is
//! skipped.

mod easing;
mod state;

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
pub use easing::{Easing, lerp};
use parking_lot::{Mutex, RwLock};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use state::{Shadow, WindowVisualState};
use uuid::Uuid;

use super::WindowId;
use super::error::{PlacementError, PlacementResult};
use super::history::BoundedHistory;
use super::lifecycle::{ComponentStatus, Lifecycle, TaskGroup};
use crate::config::AnimationConfig;

/// Shortest duration allowed under reduced motion.
pub const REDUCED_MOTION_FLOOR: Duration = Duration::from_millis(50);

/// Reduced motion divides durations by this factor.
pub const REDUCED_MOTION_DIVISOR: u32 = 4;

/// Weight of the previous estimate in the rolling FPS.
const FPS_SMOOTHING: f64 = 0.9;

/// Completed animations kept for status reports.
const RECORD_LIMIT: usize = 200;

/// What an animation represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationKind {
    Move,
    Resize,
    Frame,
    Fade,
    Minimize,
    Maximize,
    Restore,
    Snap,
    Tile,
}

/// Effective duration for a request.
#[must_use]
pub fn effective_duration(requested: Duration, reduced_motion: bool) -> Duration {
    if reduced_motion {
        (requested / REDUCED_MOTION_DIVISOR).max(REDUCED_MOTION_FLOOR)
    } else {
        requested
    }
}

// ============================================================================
// Requests and records
// ============================================================================

/// Parameters for a new animation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub window_id: WindowId,
    pub kind: AnimationKind,
    pub from: WindowVisualState,
    pub to: WindowVisualState,
    /// Defaults to the configured duration.
    pub duration: Option<Duration>,
    /// Defaults to the configured easing.
    pub easing: Option<Easing>,
    pub priority: u8,
}

impl AnimationRequest {
    #[must_use]
    pub const fn new(
        window_id: WindowId,
        kind: AnimationKind,
        from: WindowVisualState,
        to: WindowVisualState,
    ) -> Self {
        Self { window_id, kind, from, to, duration: None, easing: None, priority: 0 }
    }

    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub const fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

/// A running or queued animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub id: Uuid,
    pub window_id: WindowId,
    pub kind: AnimationKind,
    pub from: WindowVisualState,
    pub to: WindowVisualState,
    pub duration: Duration,
    pub easing: Easing,
    pub priority: u8,
    /// Linear progress in `[0, 1]`.
    pub progress: f64,
    pub current: WindowVisualState,
    started_at: Option<Instant>,
}

impl Animation {
    /// Whether the animation has been given a slot.
    #[must_use]
    pub const fn is_started(&self) -> bool { self.started_at.is_some() }

    /// Advances to `now`; returns `true` once complete.
    fn advance(&mut self, now: Instant) -> bool {
        let started = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);
        self.progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        self.current = if self.progress >= 1.0 {
            self.to
        } else {
            self.from.lerp(&self.to, self.easing.apply(self.progress))
        };
        self.progress >= 1.0
    }
}

/// How an animation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationEnd {
    Completed,
    Replaced,
    Cancelled,
}

/// History entry for a finished animation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationRecord {
    pub id: Uuid,
    pub window_id: WindowId,
    pub kind: AnimationKind,
    pub duration: Duration,
    pub end: AnimationEnd,
    pub at: DateTime<Utc>,
}

impl AnimationRecord {
    fn of(animation: &Animation, end: AnimationEnd) -> Self {
        Self {
            id: animation.id,
            window_id: animation.window_id,
            kind: animation.kind,
            duration: animation.duration,
            end,
            at: Utc::now(),
        }
    }
}

/// Result of one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub advanced: usize,
    pub completed: Vec<Uuid>,
    pub promoted: usize,
}

/// Receives interpolated states.
pub trait AnimationSink: Send + Sync {
    /// Applies one frame of a window's animation.
    fn apply(&self, window: WindowId, state: &WindowVisualState);

    /// Called once an animation reaches its end state.
    fn completed(&self, _window: WindowId, _animation: Uuid) {}
}

/// Frame timing counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameStats {
    pub frames: u64,
    pub fps: f64,
    pub dropped_frames: u64,
}

/// Summary for status reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimatorStats {
    pub active: usize,
    pub queued: usize,
    pub completed: u64,
    pub replaced: u64,
    pub frames: FrameStats,
}

/// Animator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorSettings {
    pub enabled: bool,
    pub target_fps: u32,
    pub max_concurrent: usize,
    pub duration: Duration,
    pub easing: Easing,
    pub reduced_motion: bool,
}

impl AnimatorSettings {
    /// Interval between frames at the target FPS.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}

impl From<&AnimationConfig> for AnimatorSettings {
    fn from(config: &AnimationConfig) -> Self {
        Self {
            enabled: config.enabled,
            target_fps: config.target_fps,
            max_concurrent: config.max_concurrent,
            duration: Duration::from_millis(config.duration_ms),
            easing: config.easing,
            reduced_motion: config.reduced_motion,
        }
    }
}

// ============================================================================
// Animator
// ============================================================================

struct Pending {
    sequence: u64,
    animation: Animation,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == CmpOrdering::Equal }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> { Some(self.cmp(other)) }
}

impl Ord for Pending {
    // Max-heap: higher priority first, then older requests.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.animation
            .priority
            .cmp(&other.animation.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Default)]
struct Slots {
    active: HashMap<WindowId, Animation>,
    queued: BinaryHeap<Pending>,
    /// Last state applied per window.
    last: HashMap<WindowId, WindowVisualState>,
}

struct FrameClock {
    last_tick: Option<Instant>,
    stats: FrameStats,
}

struct AnimatorInner {
    slots: RwLock<Slots>,
    settings: AnimatorSettings,
    reduced_motion: AtomicBool,
    ticking: AtomicBool,
    clock: Mutex<FrameClock>,
    records: Mutex<BoundedHistory<AnimationRecord>>,
    sink: Option<Arc<dyn AnimationSink>>,
    sequence: AtomicU64,
    completed: AtomicU64,
    replaced: AtomicU64,
    tasks: TaskGroup,
}

/// Shared handle to the animator.
#[derive(Clone)]
pub struct Animator {
    inner: Arc<AnimatorInner>,
}

impl Animator {
    /// Creates an animator writing frames to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidConfiguration`] for a zero FPS or
    /// concurrency cap.
    pub fn new(settings: AnimatorSettings, sink: Option<Arc<dyn AnimationSink>>) -> PlacementResult<Self> {
        if settings.target_fps == 0 {
            return Err(PlacementError::invalid_config("animation.targetFps must be at least 1"));
        }
        if settings.max_concurrent == 0 {
            return Err(PlacementError::invalid_config("animation.maxConcurrent must be at least 1"));
        }
        Ok(Self {
            inner: Arc::new(AnimatorInner {
                slots: RwLock::new(Slots::default()),
                reduced_motion: AtomicBool::new(settings.reduced_motion),
                settings,
                ticking: AtomicBool::new(false),
                clock: Mutex::new(FrameClock { last_tick: None, stats: FrameStats::default() }),
                records: Mutex::new(BoundedHistory::new(RECORD_LIMIT)),
                sink,
                sequence: AtomicU64::new(0),
                completed: AtomicU64::new(0),
                replaced: AtomicU64::new(0),
                tasks: TaskGroup::new("animation"),
            }),
        })
    }

    #[must_use]
    pub fn settings(&self) -> &AnimatorSettings { &self.inner.settings }

    #[must_use]
    pub fn reduced_motion(&self) -> bool { self.inner.reduced_motion.load(Ordering::Relaxed) }

    pub fn set_reduced_motion(&self, enabled: bool) {
        self.inner.reduced_motion.store(enabled, Ordering::Relaxed);
    }

    /// Starts (or queues) an animation, replacing any animation of the same
    /// window. A replaced animation hands over its current interpolated state
    /// as the new starting point.
    ///
    /// With animations disabled the end state is applied immediately.
    pub fn animate(&self, request: AnimationRequest) -> Uuid {
        let id = Uuid::now_v7();
        let settings = &self.inner.settings;

        if !settings.enabled {
            self.inner.slots.write().last.insert(request.window_id, request.to);
            if let Some(sink) = &self.inner.sink {
                sink.apply(request.window_id, &request.to);
                sink.completed(request.window_id, id);
            }
            return id;
        }

        let duration =
            effective_duration(request.duration.unwrap_or(settings.duration), self.reduced_motion());
        let mut animation = Animation {
            id,
            window_id: request.window_id,
            kind: request.kind,
            from: request.from,
            to: request.to,
            duration,
            easing: request.easing.unwrap_or(settings.easing),
            priority: request.priority,
            progress: 0.0,
            current: request.from,
            started_at: None,
        };

        let mut slots = self.inner.slots.write();
        if let Some(previous) = self.take_window(&mut slots, request.window_id) {
            animation.from = previous.current;
            animation.current = previous.current;
            self.inner.replaced.fetch_add(1, Ordering::Relaxed);
            self.inner.records.lock().push(AnimationRecord::of(&previous, AnimationEnd::Replaced));
        }

        if slots.active.len() < settings.max_concurrent {
            animation.started_at = Some(Instant::now());
            slots.active.insert(animation.window_id, animation);
        } else {
            let sequence = self.inner.sequence.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("animation: window {} queued", animation.window_id);
            slots.queued.push(Pending { sequence, animation });
        }
        drop(slots);
        id
    }

    /// Removes the active or queued animation of `window`.
    fn take_window(&self, slots: &mut Slots, window: WindowId) -> Option<Animation> {
        if let Some(active) = slots.active.remove(&window) {
            return Some(active);
        }
        let mut taken = None;
        let remaining: Vec<Pending> = std::mem::take(&mut slots.queued)
            .into_iter()
            .filter_map(|pending| {
                if taken.is_none() && pending.animation.window_id == window {
                    taken = Some(pending.animation);
                    None
                } else {
                    Some(pending)
                }
            })
            .collect();
        slots.queued = remaining.into_iter().collect();
        taken
    }

    /// Stops a window's animation where it is.
    pub fn cancel(&self, window: WindowId) -> Option<Animation> {
        let mut slots = self.inner.slots.write();
        let cancelled = self.take_window(&mut slots, window)?;
        drop(slots);
        self.inner.records.lock().push(AnimationRecord::of(&cancelled, AnimationEnd::Cancelled));
        Some(cancelled)
    }

    /// Drops every trace of a closed window.
    pub fn forget_window(&self, window: WindowId) {
        let mut slots = self.inner.slots.write();
        let _ = self.take_window(&mut slots, window);
        slots.last.remove(&window);
    }

    /// Advances every active animation to `now`.
    ///
    /// Returns `None` if another tick is already running.
    pub fn tick(&self, now: Instant) -> Option<TickReport> {
        if self
            .inner
            .ticking
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }

        self.record_frame(now);
        let mut report = TickReport::default();
        let mut frames = Vec::new();
        let mut finished = Vec::new();

        {
            let mut slots = self.inner.slots.write();
            for animation in slots.active.values_mut() {
                report.advanced += 1;
                let done = animation.advance(now);
                frames.push((animation.window_id, animation.current));
                if done {
                    finished.push(animation.window_id);
                }
            }

            for window in &finished {
                if let Some(animation) = slots.active.remove(window) {
                    report.completed.push(animation.id);
                    self.inner.records.lock().push(AnimationRecord::of(&animation, AnimationEnd::Completed));
                }
            }
            for (window, state) in &frames {
                slots.last.insert(*window, *state);
            }

            while slots.active.len() < self.inner.settings.max_concurrent {
                let Some(Pending { mut animation, .. }) = slots.queued.pop() else {
                    break;
                };
                animation.started_at = Some(now);
                report.promoted += 1;
                slots.active.insert(animation.window_id, animation);
            }
        }

        self.inner.completed.fetch_add(report.completed.len() as u64, Ordering::Relaxed);
        if let Some(sink) = &self.inner.sink {
            for (window, state) in &frames {
                sink.apply(*window, state);
            }
            for (window, id) in finished.iter().zip(&report.completed) {
                sink.completed(*window, *id);
            }
        }

        self.inner.ticking.store(false, Ordering::Release);
        Some(report)
    }

    fn record_frame(&self, now: Instant) {
        let expected = self.inner.settings.frame_interval();
        let mut clock = self.inner.clock.lock();
        if let Some(last) = clock.last_tick {
            let interval = now.saturating_duration_since(last);
            if interval > expected * 2 {
                clock.stats.dropped_frames += 1;
            }
            if !interval.is_zero() {
                let instant_fps = 1.0 / interval.as_secs_f64();
                clock.stats.fps = if clock.stats.frames <= 1 {
                    instant_fps
                } else {
                    clock.stats.fps.mul_add(FPS_SMOOTHING, instant_fps * (1.0 - FPS_SMOOTHING))
                };
            }
        }
        clock.stats.frames += 1;
        clock.last_tick = Some(now);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn is_animating(&self, window: WindowId) -> bool {
        let slots = self.inner.slots.read();
        slots.active.contains_key(&window)
            || slots.queued.iter().any(|p| p.animation.window_id == window)
    }

    #[must_use]
    pub fn active_count(&self) -> usize { self.inner.slots.read().active.len() }

    #[must_use]
    pub fn queued_count(&self) -> usize { self.inner.slots.read().queued.len() }

    /// The active animation of `window`, if any.
    #[must_use]
    pub fn animation(&self, window: WindowId) -> Option<Animation> {
        self.inner.slots.read().active.get(&window).cloned()
    }

    /// The window's current interpolated state, else its last applied state.
    #[must_use]
    pub fn current_state(&self, window: WindowId) -> Option<WindowVisualState> {
        let slots = self.inner.slots.read();
        slots
            .active
            .get(&window)
            .map(|a| a.current)
            .or_else(|| slots.last.get(&window).copied())
    }

    #[must_use]
    pub fn frame_stats(&self) -> FrameStats { self.inner.clock.lock().stats }

    /// Finished, replaced and cancelled animations, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AnimationRecord> { self.inner.records.lock().to_vec() }

    #[must_use]
    pub fn stats(&self) -> AnimatorStats {
        let slots = self.inner.slots.read();
        AnimatorStats {
            active: slots.active.len(),
            queued: slots.queued.len(),
            completed: self.inner.completed.load(Ordering::Relaxed),
            replaced: self.inner.replaced.load(Ordering::Relaxed),
            frames: self.frame_stats(),
        }
    }
}

impl Lifecycle for Animator {
    fn name(&self) -> &'static str { "animation" }

    fn start(&self) -> PlacementResult<()> {
        let mut stop = self.inner.tasks.begin()?;
        let animator = self.clone();
        let period = self.inner.settings.frame_interval();

        self.inner.tasks.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let _ = animator.tick(Instant::now());
                    }
                    () = stop.stopped() => break,
                }
            }
            tracing::debug!("animation: frame loop stopped");
        });
        Ok(())
    }

    fn stop(&self) { self.inner.tasks.halt(); }

    fn status(&self) -> ComponentStatus { self.inner.tasks.status() }
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("settings", &self.inner.settings)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::geometry::Rect;

    #[derive(Default)]
    struct CollectingSink {
        frames: Mutex<Vec<(WindowId, WindowVisualState)>>,
        completed: Mutex<Vec<WindowId>>,
    }

    impl AnimationSink for CollectingSink {
        fn apply(&self, window: WindowId, state: &WindowVisualState) {
            self.frames.lock().push((window, *state));
        }

        fn completed(&self, window: WindowId, _animation: Uuid) { self.completed.lock().push(window); }
    }

    fn settings() -> AnimatorSettings {
        AnimatorSettings {
            enabled: true,
            target_fps: 60,
            max_concurrent: 2,
            duration: Duration::from_millis(200),
            easing: Easing::Linear,
            reduced_motion: false,
        }
    }

    fn request(window: WindowId, to_x: f64) -> AnimationRequest {
        AnimationRequest::new(
            window,
            AnimationKind::Move,
            WindowVisualState::at(Rect::new(0.0, 0.0, 100.0, 100.0)),
            WindowVisualState::at(Rect::new(to_x, 0.0, 100.0, 100.0)),
        )
    }

    fn started_at(animator: &Animator, window: WindowId) -> Instant {
        animator.inner.slots.read().active[&window].started_at.unwrap()
    }

    #[test]
    fn test_reduced_motion_duration() {
        assert_eq!(effective_duration(Duration::from_millis(400), true), Duration::from_millis(100));
        assert_eq!(effective_duration(Duration::from_millis(100), true), REDUCED_MOTION_FLOOR);
        assert_eq!(effective_duration(Duration::from_millis(100), false), Duration::from_millis(100));
    }

    #[test]
    fn test_progress_and_completion() {
        let sink = Arc::new(CollectingSink::default());
        let animator = Animator::new(settings(), Some(sink.clone())).unwrap();
        animator.animate(request(1, 200.0));
        let start = started_at(&animator, 1);

        let report = animator.tick(start + Duration::from_millis(100)).unwrap();
        assert_eq!(report.advanced, 1);
        assert!(report.completed.is_empty());
        let halfway = animator.current_state(1).unwrap();
        assert!((halfway.frame.x - 100.0).abs() < 1e-6);

        let report = animator.tick(start + Duration::from_millis(250)).unwrap();
        assert_eq!(report.completed.len(), 1);
        assert!(!animator.is_animating(1));
        assert!((animator.current_state(1).unwrap().frame.x - 200.0).abs() < f64::EPSILON);
        assert_eq!(sink.frames.lock().len(), 2);
        assert_eq!(*sink.completed.lock(), vec![1]);
    }

    #[test]
    fn test_overflow_is_queued_and_promoted_by_priority() {
        let animator = Animator::new(settings(), None).unwrap();
        animator.animate(request(1, 10.0));
        animator.animate(request(2, 10.0));
        animator.animate(request(3, 10.0).with_priority(1));
        animator.animate(request(4, 10.0).with_priority(9));
        assert_eq!(animator.active_count(), 2);
        assert_eq!(animator.queued_count(), 2);

        let later = started_at(&animator, 1) + Duration::from_secs(1);
        let report = animator.tick(later).unwrap();
        assert_eq!(report.completed.len(), 2);
        assert_eq!(report.promoted, 2);
        assert!(animator.animation(4).is_some());
        assert!(animator.animation(3).is_some());

        let animator = Animator::new(AnimatorSettings { max_concurrent: 1, ..settings() }, None).unwrap();
        animator.animate(request(1, 10.0));
        animator.animate(request(2, 10.0).with_priority(1));
        animator.animate(request(3, 10.0).with_priority(5));
        animator.tick(started_at(&animator, 1) + Duration::from_secs(1));
        assert!(animator.animation(3).is_some());
        assert!(animator.animation(2).is_none());
    }

    #[test]
    fn test_replacement_starts_from_current_state() {
        let animator = Animator::new(settings(), None).unwrap();
        animator.animate(request(1, 200.0));
        let start = started_at(&animator, 1);
        animator.tick(start + Duration::from_millis(100));

        animator.animate(request(1, 0.0));
        let replacement = animator.animation(1).unwrap();
        assert!((replacement.from.frame.x - 100.0).abs() < 1e-6);
        assert_eq!(animator.active_count(), 1);
        assert_eq!(animator.stats().replaced, 1);
        assert_eq!(animator.records()[0].end, AnimationEnd::Replaced);
    }

    #[test]
    fn test_reduced_motion_applies_to_new_animations() {
        let animator = Animator::new(settings(), None).unwrap();
        animator.set_reduced_motion(true);
        animator.animate(request(1, 10.0));
        assert_eq!(animator.animation(1).unwrap().duration, REDUCED_MOTION_FLOOR);
    }

    #[test]
    fn test_disabled_applies_end_state_immediately() {
        let sink = Arc::new(CollectingSink::default());
        let animator =
            Animator::new(AnimatorSettings { enabled: false, ..settings() }, Some(sink.clone())).unwrap();
        animator.animate(request(1, 50.0));
        assert_eq!(animator.active_count(), 0);
        assert!((sink.frames.lock()[0].1.frame.x - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_only_one_tick_at_a_time() {
        let animator = Animator::new(settings(), None).unwrap();
        animator.inner.ticking.store(true, Ordering::Release);
        assert!(animator.tick(Instant::now()).is_none());
        animator.inner.ticking.store(false, Ordering::Release);
        assert!(animator.tick(Instant::now()).is_some());
    }

    #[test]
    fn test_fps_and_dropped_frames() {
        let animator = Animator::new(settings(), None).unwrap();
        let start = Instant::now();
        for i in 0..10 {
            animator.tick(start + Duration::from_micros(16_667 * i));
        }
        let stats = animator.frame_stats();
        assert_eq!(stats.frames, 10);
        assert_eq!(stats.dropped_frames, 0);
        assert!((stats.fps - 60.0).abs() < 1.0);

        animator.tick(start + Duration::from_millis(400));
        assert_eq!(animator.frame_stats().dropped_frames, 1);
    }

    #[test]
    fn test_cancel_and_forget() {
        let animator = Animator::new(settings(), None).unwrap();
        animator.animate(request(1, 10.0));
        assert!(animator.cancel(1).is_some());
        assert!(animator.cancel(1).is_none());

        animator.animate(request(2, 10.0));
        animator.forget_window(2);
        assert!(!animator.is_animating(2));
        assert!(animator.current_state(2).is_none());
    }

    #[test]
    fn test_invalid_settings() {
        assert!(Animator::new(AnimatorSettings { target_fps: 0, ..settings() }, None).is_err());
        assert!(Animator::new(AnimatorSettings { max_concurrent: 0, ..settings() }, None).is_err());
    }

    #[tokio::test]
    async fn test_frame_loop_completes_animation() {
        let sink = Arc::new(CollectingSink::default());
        let animator = Animator::new(
            AnimatorSettings { duration: Duration::from_millis(20), ..settings() },
            Some(sink.clone()),
        )
        .unwrap();
        animator.start().unwrap();
        animator.animate(request(1, 30.0));

        tokio::time::sleep(Duration::from_millis(120)).await;
        animator.stop();
        assert_eq!(*sink.completed.lock(), vec![1]);
        assert!(animator.frame_stats().frames > 0);
    }
}
