//! A scene owns a surface and every firework in a show. It drives them all from a single clock,
//! then washes the surface to black once the last firework has gone out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng as _;

use crate::clock::{Clock, FrameScheduler, SystemClock};
use crate::colour::{Colour, BLACK};
use crate::firework::Firework;
use crate::surface::Surface;

/// The opacity of the translucent fill that leaves trails behind moving particles.
pub const CANVAS_FILL_OPACITY: f32 = 0.3;

/// The number of frames it takes to wash the surface to black at the end of a show.
pub const FADEOUT_STEPS: usize = 100;

/// Settings for the scene as a whole, as opposed to individual fireworks.
#[derive(bon::Builder, serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct SceneConfig {
    /// Painted over everything at the start of every frame, so that old frames linger as trails.
    #[builder(default = (0.0, 0.0, 0.0, 0.15))]
    pub trail_colour: Colour,
    /// Global alpha used when painting the trail colour.
    #[builder(default = CANVAS_FILL_OPACITY)]
    pub trail_alpha: f32,
    /// Painted over everything on each frame of the final fade to black.
    #[builder(default = (0.0, 0.0, 0.0, 0.2))]
    pub fadeout_colour: Colour,
    /// Global alpha used when painting the fade out colour.
    #[builder(default = CANVAS_FILL_OPACITY)]
    pub fadeout_alpha: f32,
    /// How many frames the final fade to black lasts.
    #[builder(default = FADEOUT_STEPS)]
    pub fadeout_steps: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Where the scene as a whole is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScenePhase {
    /// Fireworks can be added, the clock hasn't started.
    Idle,
    /// At least one firework is still active.
    Running,
    /// Every firework has finished, the surface is being washed to black.
    FadingOut {
        /// Fade frames left to draw.
        remaining: usize,
    },
    /// Nothing will ever be drawn again.
    Finished,
}

/// A cheap, cloneable flag for stopping a running scene from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancellationHandle(Arc<AtomicBool>);

impl CancellationHandle {
    /// Instantiate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the scene to stop before its next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been asked for.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A firework display on a single surface.
pub struct Scene<S: Surface> {
    /// Where everything is drawn.
    surface: S,
    /// Every firework in the show, whether it's started or not.
    fireworks: Vec<Firework>,
    /// Scene-wide settings.
    config: SceneConfig,
    /// Where the time comes from.
    clock: Box<dyn Clock + Send>,
    /// Shared by every firework, seedable so that shows can be replayed.
    rng: rand::rngs::StdRng,
    /// When `start()` was called.
    started_at: Option<Instant>,
    /// Current phase.
    phase: ScenePhase,
}

impl<S: Surface> Scene<S> {
    /// A scene using the system clock and entropy-seeded randomness.
    pub fn new(surface: S, config: SceneConfig) -> Self {
        Self {
            surface,
            fireworks: Vec::new(),
            config,
            clock: Box::new(SystemClock),
            rng: rand::rngs::StdRng::from_entropy(),
            started_at: None,
            phase: ScenePhase::Idle,
        }
    }

    /// Use a different source of time.
    #[must_use]
    pub fn with_clock<C: Clock + Send + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Make every random choice in the show reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = rand::rngs::StdRng::seed_from_u64(seed);
        self
    }

    /// Add a firework and place its ember at the bottom of the surface.
    pub fn add(&mut self, mut firework: Firework) {
        firework.initialise_launch(self.surface.dimensions(), &mut self.rng);
        self.fireworks.push(firework);
    }

    /// Start the clock. All firework delays are measured from now.
    pub fn start(&mut self) {
        tracing::info!("Starting show with {} fireworks", self.fireworks.len());
        self.started_at = Some(self.clock.now());
        self.phase = ScenePhase::Running;
    }

    /// Time since `start()`, zero if the scene hasn't started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map_or(Duration::ZERO, |started_at| {
                self.clock.now().saturating_duration_since(started_at)
            })
    }

    /// Render one frame of every firework at the current time. Returns the number of fireworks
    /// still active afterwards.
    pub fn tick(&mut self) -> usize {
        let elapsed = self.elapsed();
        self.tick_at(elapsed)
    }

    /// Render one frame of every firework as if `elapsed` time had passed since the start.
    pub fn tick_at(&mut self, elapsed: Duration) -> usize {
        self.surface.set_global_alpha(self.config.trail_alpha);
        self.surface.fill(self.config.trail_colour);

        for firework in &mut self.fireworks {
            firework.advance(elapsed, &mut self.surface, &mut self.rng);
        }

        self.active_count()
    }

    /// Do whatever the current phase calls for, for exactly one frame.
    pub fn step(&mut self) -> ScenePhase {
        match self.phase {
            ScenePhase::Idle => {
                self.start();
                self.run_frame();
            }
            ScenePhase::Running => self.run_frame(),
            ScenePhase::FadingOut { remaining } => self.fadeout_frame(remaining),
            ScenePhase::Finished => (),
        }

        self.phase
    }

    /// A normal frame. Starts the final fade once everything has gone out.
    fn run_frame(&mut self) {
        let active = self.tick();
        if active > 0 {
            return;
        }

        tracing::debug!(
            "All fireworks finished after {:?}, fading out",
            self.elapsed()
        );
        self.phase = if self.config.fadeout_steps == 0 {
            ScenePhase::Finished
        } else {
            ScenePhase::FadingOut {
                remaining: self.config.fadeout_steps,
            }
        };
    }

    /// One frame of washing the surface to black. The very last one is fully opaque, so no
    /// ghost of the show is left behind.
    fn fadeout_frame(&mut self, remaining: usize) {
        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.surface.set_global_alpha(1.0);
            self.surface.fill(BLACK);
            self.phase = ScenePhase::Finished;
            tracing::info!("Show finished");
            return;
        }

        self.surface.set_global_alpha(self.config.fadeout_alpha);
        self.surface.fill(self.config.fadeout_colour);
        self.phase = ScenePhase::FadingOut { remaining };
    }

    /// Keep stepping until the show finishes or is cancelled. Waits on `scheduler` before every
    /// frame.
    pub fn run<F: FrameScheduler + ?Sized>(
        &mut self,
        scheduler: &mut F,
        cancel: &CancellationHandle,
    ) -> ScenePhase {
        loop {
            if cancel.is_cancelled() {
                tracing::debug!("Show cancelled");
                break;
            }

            if self.step() == ScenePhase::Finished {
                break;
            }

            scheduler.wait_for_next_frame();
        }

        self.phase
    }

    /// The number of fireworks that still have something to do.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.fireworks
            .iter()
            .filter(|firework| firework.is_active())
            .count()
    }

    /// Whether any firework still has something to do.
    #[must_use]
    pub fn has_active_fireworks(&self) -> bool {
        self.fireworks.iter().any(Firework::is_active)
    }

    /// Whether the show, including the final fade, is completely over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == ScenePhase::Finished
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ScenePhase {
        self.phase
    }

    /// Every firework in the show.
    #[must_use]
    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    /// The surface being drawn onto.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// The surface being drawn onto, mutably, for example to flush it to a screen.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Give up the scene and keep the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::default_numeric_fallback,
    clippy::indexing_slicing,
    reason = "Tests aren't so strict"
)]
mod test {
    use super::*;
    use crate::clock::{ManualClock, SteppedScheduler};
    use crate::config::FireworkConfig;
    use crate::firework::Phase;
    use crate::tests::helpers::{RecordingSurface, TEST_SEED};

    fn scene(clock: &ManualClock) -> Scene<RecordingSurface> {
        Scene::new(RecordingSurface::new(200.0, 100.0), SceneConfig::default())
            .with_clock(clock.clone())
            .with_seed(TEST_SEED)
    }

    fn quick_firework(delay: u64) -> Firework {
        Firework::new(
            FireworkConfig::builder()
                .amount(5)
                .delay(Duration::from_millis(delay))
                .launch_duration(Duration::from_millis(20))
                .duration(Duration::from_millis(50))
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn adding_places_the_ember() {
        let clock = ManualClock::new();
        let mut scene = scene(&clock);
        scene.add(quick_firework(0));
        let ember = scene.fireworks()[0].launch_particle().position();
        assert_eq!(ember.x, 100.0);
        assert_eq!(ember.y, 100.0);
        assert_eq!(scene.phase(), ScenePhase::Idle);
    }

    #[test]
    fn every_tick_paints_trails_first() {
        let clock = ManualClock::new();
        let mut scene = scene(&clock);
        scene.add(quick_firework(0));
        scene.start();
        clock.advance(Duration::from_millis(1));

        let active = scene.tick();

        assert_eq!(active, 1);
        let calls = &scene.surface().calls;
        assert_eq!(
            calls[0],
            crate::tests::helpers::DrawCall::GlobalAlpha(CANVAS_FILL_OPACITY)
        );
        assert_eq!(
            calls[1],
            crate::tests::helpers::DrawCall::Fill((0.0, 0.0, 0.0, 0.15))
        );
        assert_eq!(scene.surface().sprite_count(), 1);
    }

    #[test]
    fn delayed_fireworks_wait() {
        let clock = ManualClock::new();
        let mut scene = scene(&clock);
        scene.add(quick_firework(0));
        scene.add(quick_firework(1000));
        scene.start();

        for _ in 0..10 {
            clock.advance(Duration::from_millis(10));
            scene.tick();
        }

        assert_eq!(scene.fireworks()[0].phase(), Phase::Fading);
        assert_eq!(scene.fireworks()[1].phase(), Phase::Launching);
        assert!(scene.fireworks()[1].particles().is_empty());
        assert!(scene.has_active_fireworks());
    }

    #[test]
    fn an_empty_scene_fades_straight_away() {
        let clock = ManualClock::new();
        let mut scene = scene(&clock);
        assert_eq!(
            scene.step(),
            ScenePhase::FadingOut {
                remaining: FADEOUT_STEPS
            }
        );
        assert!(!scene.has_active_fireworks());
    }

    #[test]
    fn fades_out_for_exactly_the_configured_frames() {
        let clock = ManualClock::new();
        let config = SceneConfig::builder().fadeout_steps(5).build();
        let mut scene = Scene::new(RecordingSurface::new(10.0, 10.0), config)
            .with_clock(clock.clone())
            .with_seed(TEST_SEED);
        scene.step();
        scene.surface_mut().clear();

        let mut frames = 0;
        while !scene.is_finished() {
            scene.step();
            frames += 1;
        }

        assert_eq!(frames, 5);
        let fills = scene.surface().fills();
        assert_eq!(fills.len(), 5);
        assert_eq!(fills[0], (0.0, 0.0, 0.0, 0.2));
        assert_eq!(fills[4], BLACK);
        assert_eq!(scene.surface().last_alpha(), Some(1.0));

        scene.surface_mut().clear();
        for _ in 0..10 {
            assert_eq!(scene.step(), ScenePhase::Finished);
        }
        assert!(scene.surface().calls.is_empty());
    }

    #[test]
    fn zero_fadeout_steps_finishes_immediately() {
        let clock = ManualClock::new();
        let config = SceneConfig::builder().fadeout_steps(0).build();
        let mut scene = Scene::new(RecordingSurface::new(10.0, 10.0), config).with_clock(clock);
        assert_eq!(scene.step(), ScenePhase::Finished);
    }

    #[test]
    fn runs_a_whole_show_to_the_end() {
        let clock = ManualClock::new();
        let mut scene = scene(&clock);
        scene.add(quick_firework(0));
        scene.add(quick_firework(30));
        let mut scheduler = SteppedScheduler::new(clock.clone(), Duration::from_millis(5));

        let phase = scene.run(&mut scheduler, &CancellationHandle::new());

        assert_eq!(phase, ScenePhase::Finished);
        assert!(scene.is_finished());
        assert!(!scene.has_active_fireworks());
        assert!(scene
            .fireworks()
            .iter()
            .all(|firework| firework.phase() == Phase::Inactive));
    }

    #[test]
    fn cancelling_stops_the_show() {
        let clock = ManualClock::new();
        let mut scene = scene(&clock);
        scene.add(quick_firework(0));
        let cancel = CancellationHandle::new();
        cancel.cancel();
        let mut scheduler = SteppedScheduler::new(clock, Duration::from_millis(5));

        let phase = scene.run(&mut scheduler, &cancel);

        assert_eq!(phase, ScenePhase::Idle);
        assert!(scene.surface().calls.is_empty());
        assert!(scene.has_active_fireworks());
    }

    #[test]
    fn scene_config_from_json() {
        let config: SceneConfig = serde_json::from_str(r#"{"fadeout_steps": 3}"#).unwrap();
        assert_eq!(config.fadeout_steps, 3);
        assert_eq!(config.trail_alpha, CANVAS_FILL_OPACITY);
    }
}
