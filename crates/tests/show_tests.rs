//! Whole shows, from the first launch to the final fade to black.
#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    reason = "Tests aren't so strict"
)]
mod shows {
    use std::time::Duration;

    use hanabi_core::tests::helpers::{DrawCall, RecordingSurface};
    use hanabi_core::{
        CancellationHandle, Firework, FireworkConfig, FireworkOverrides, ManualClock, Pattern,
        Phase, Scene, SceneConfig, ScenePhase, SteppedScheduler,
    };

    /// Roughly 60 frames per second.
    const FRAME: Duration = Duration::from_millis(16);

    fn firework(pattern: Pattern, delay: u64) -> Firework {
        Firework::new(
            FireworkConfig::builder()
                .pattern(pattern)
                .amount(30)
                .delay(Duration::from_millis(delay))
                .launch_duration(Duration::from_millis(200))
                .duration(Duration::from_millis(600))
                .build(),
        )
        .unwrap()
    }

    fn show(seed: u64, fireworks: Vec<Firework>) -> (Scene<RecordingSurface>, SteppedScheduler) {
        let clock = ManualClock::new();
        let mut scene = Scene::new(RecordingSurface::new(320.0, 200.0), SceneConfig::default())
            .with_clock(clock.clone())
            .with_seed(seed);
        for firework in fireworks {
            scene.add(firework);
        }
        (scene, SteppedScheduler::new(clock, FRAME))
    }

    #[test]
    fn a_whole_show_runs_to_the_end() {
        let fireworks = Pattern::ALL
            .iter()
            .enumerate()
            .map(|(index, pattern)| firework(*pattern, 300 * u64::try_from(index).unwrap()))
            .collect();
        let (mut scene, mut scheduler) = show(1, fireworks);

        let phase = scene.run(&mut scheduler, &CancellationHandle::new());

        assert_eq!(phase, ScenePhase::Finished);
        for firework in scene.fireworks() {
            assert_eq!(firework.phase(), Phase::Inactive);
            assert!(!firework.particles().is_empty());
        }
        let fills = scene.surface().fills();
        assert_eq!(*fills.last().unwrap(), hanabi_core::colour::BLACK);
    }

    #[test]
    fn the_same_seed_gives_the_same_show() {
        let run = |seed| {
            let fireworks = vec![
                firework(Pattern::Chrysanthemum, 0),
                firework(Pattern::Peony, 100),
            ];
            let (mut scene, mut scheduler) = show(seed, fireworks);
            scene.run(&mut scheduler, &CancellationHandle::new());
            scene.into_surface().calls
        };

        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }

    #[test]
    fn later_fireworks_wait_their_turn() {
        let fireworks = vec![
            firework(Pattern::Star, 0),
            firework(Pattern::Palm, 10_000),
        ];
        let (mut scene, mut scheduler) = show(3, fireworks);
        let cancel = CancellationHandle::new();

        for _ in 0..50 {
            scene.step();
            hanabi_core::FrameScheduler::wait_for_next_frame(&mut scheduler);
        }

        assert_eq!(scene.fireworks()[0].phase(), Phase::Inactive);
        assert_eq!(scene.fireworks()[1].phase(), Phase::Launching);
        assert_eq!(scene.phase(), ScenePhase::Running);

        cancel.cancel();
        assert_eq!(scene.run(&mut scheduler, &cancel), ScenePhase::Running);
    }

    #[test]
    fn fireworks_from_a_json_plan() {
        let plan: Vec<FireworkOverrides> = serde_json::from_str(
            r##"[
                {"delay": 0, "amount": 12, "pattern": "willow", "colour": "hsl(120, 100%, 50%)"},
                {"delay": 50, "amount": 20, "pattern": "star", "colour": "#ff00ff"}
            ]"##,
        )
        .unwrap();
        let fireworks = plan
            .iter()
            .map(|overrides| Firework::new(overrides.to_config().unwrap()).unwrap())
            .collect();
        let (mut scene, mut scheduler) = show(4, fireworks);

        scene.run(&mut scheduler, &CancellationHandle::new());

        assert!(scene.is_finished());
        assert_eq!(scene.fireworks()[0].particles().len(), 12);
        assert_eq!(scene.fireworks()[1].particles().len(), 20);
    }

    #[test]
    fn nothing_is_drawn_after_the_show_finishes() {
        let (mut scene, mut scheduler) = show(5, vec![firework(Pattern::Peony, 0)]);
        scene.run(&mut scheduler, &CancellationHandle::new());
        let drawn = scene.surface().calls.len();

        for _ in 0..20 {
            scene.step();
        }

        assert_eq!(scene.surface().calls.len(), drawn);
    }

    #[test]
    fn fading_particles_get_fainter() {
        let (mut scene, mut scheduler) = show(6, vec![firework(Pattern::Chrysanthemum, 0)]);
        scene.run(&mut scheduler, &CancellationHandle::new());

        let particle_alphas: Vec<f32> = scene
            .surface()
            .calls
            .windows(2)
            .filter_map(|pair| match (&pair[0], &pair[1]) {
                (DrawCall::GlobalAlpha(alpha), DrawCall::Sprite { .. }) if *alpha < 1.0 => {
                    Some(*alpha)
                }
                _ => None,
            })
            .collect();

        assert_eq!(particle_alphas.len(), 9);
        assert!(particle_alphas.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
