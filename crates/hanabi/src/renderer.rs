//! Step the scene at a fixed frame rate and render it to the user's terminal.

use color_eyre::eyre::Result;
use termwiz::surface::Change as TermwizChange;
use termwiz::terminal::buffered::BufferedTerminal;
use termwiz::terminal::{ScreenSize, Terminal as TermwizTerminal};

use hanabi_core::{CancellationHandle, FixedRateScheduler, Scene, ScenePhase};

use crate::canvas::Canvas;

/// `Render`
pub(crate) struct Renderer {
    /// The show
    scene: Scene<Canvas>,
    /// The time between frames at the target frame rate.
    frame_duration: std::time::Duration,
    /// The time at which the previous frame was rendererd.
    last_frame_tick: std::time::Instant,
    /// Set when the user asks to quit.
    cancel: CancellationHandle,
}

impl Renderer {
    /// Instantiate
    fn new(scene: Scene<Canvas>, frame_rate: u32, cancel: CancellationHandle) -> Self {
        Self {
            scene,
            frame_duration: FixedRateScheduler::new(frame_rate).frame_duration(),
            last_frame_tick: std::time::Instant::now(),
            cancel,
        }
    }

    /// Instantiate and run
    pub fn start(
        scene: Scene<Canvas>,
        frame_rate: u32,
        cancel: CancellationHandle,
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        let protocol_rx = protocol_tx.subscribe();
        tokio::spawn(async move {
            let mut renderer = Self::new(scene, frame_rate, cancel);

            let result = renderer.run(protocol_rx).await;
            if let Err(error) = result {
                crate::run::broadcast_protocol_end(&protocol_tx);
                return Err(error);
            }

            Ok(())
        })
    }

    /// We need this just because I can't figure out how to pass `Box<dyn Terminal>` to
    /// `BufferedTerminal::new()`
    fn get_termwiz_terminal() -> Result<impl TermwizTerminal> {
        let capabilities = termwiz::caps::Capabilities::new_from_env()?;
        Ok(termwiz::terminal::new_terminal(capabilities)?)
    }

    /// Just for initialisation
    pub fn get_users_tty_size() -> Result<ScreenSize> {
        let mut terminal = Self::get_termwiz_terminal()?;
        Ok(terminal.get_screen_size()?)
    }

    /// Take over the user's terminal and run the show. It lives in its own method so that we can
    /// catch any errors and ensure that the user's terminal is always returned to cooked mode.
    async fn run(
        &mut self,
        protocol_rx: tokio::sync::broadcast::Receiver<crate::run::Protocol>,
    ) -> Result<()> {
        tracing::debug!("Putting user's terminal into raw mode");
        let mut users_terminal = Self::get_termwiz_terminal()?;
        users_terminal.set_raw_mode()?;
        users_terminal.enter_alternate_screen()?;
        let mut composited_terminal = BufferedTerminal::new(users_terminal)?;
        composited_terminal.add_change(TermwizChange::CursorVisibility(
            termwiz::surface::CursorVisibility::Hidden,
        ));

        let result = self.render_loop(&mut composited_terminal, protocol_rx).await;

        tracing::debug!("Setting user's terminal to cooked mode");
        composited_terminal.add_changes(vec![
            TermwizChange::ClearScreen(termwiz::color::ColorAttribute::Default),
            TermwizChange::CursorVisibility(termwiz::surface::CursorVisibility::Visible),
        ]);
        composited_terminal.flush()?;
        composited_terminal.terminal().exit_alternate_screen()?;
        composited_terminal.terminal().set_cooked_mode()?;

        result
    }

    /// Step and render the scene once per frame until it finishes or we're told to stop.
    async fn render_loop<T: TermwizTerminal + Send>(
        &mut self,
        composited_terminal: &mut BufferedTerminal<T>,
        mut protocol_rx: tokio::sync::broadcast::Receiver<crate::run::Protocol>,
    ) -> Result<()> {
        tracing::debug!("Starting render loop");

        #[expect(
            clippy::integer_division_remainder_used,
            reason = "`tokio::select! generates this.`"
        )]
        while !self.cancel.is_cancelled() {
            let wait = self.time_until_next_frame();
            tokio::select! {
                () = tokio::time::sleep(wait) => {
                    self.last_frame_tick = std::time::Instant::now();
                    self.handle_resize(composited_terminal)?;
                    let phase = self.scene.step();
                    self.render(composited_terminal)?;
                    if phase == ScenePhase::Finished {
                        break;
                    }
                }
                Ok(message) = protocol_rx.recv() => {
                    if matches!(message, crate::run::Protocol::End) {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Exited render loop");
        Ok(())
    }

    /// How long to wait so that frames are rendered at the target frame rate.
    fn time_until_next_frame(&self) -> std::time::Duration {
        self.frame_duration
            .checked_sub(self.last_frame_tick.elapsed())
            .unwrap_or_default()
    }

    /// Match the canvas to the size of the user's terminal.
    fn handle_resize<T: TermwizTerminal>(
        &mut self,
        composited_terminal: &mut BufferedTerminal<T>,
    ) -> Result<()> {
        let is_resized = composited_terminal.check_for_resize()?;
        if !is_resized {
            return Ok(());
        }

        composited_terminal.repaint()?;
        let (width, height) = composited_terminal.dimensions();
        self.scene.surface_mut().resize(width, height * 2);

        Ok(())
    }

    /// Do a single render to the user's actual terminal. It uses a diffing algorithm to make
    /// the minimum number of changes.
    fn render<T: TermwizTerminal>(
        &self,
        composited_terminal: &mut BufferedTerminal<T>,
    ) -> Result<()> {
        let frame = self.scene.surface().to_termwiz_surface()?;
        composited_terminal.draw_from_screen(&frame, 0, 0);

        // This is where we actually render to the user's real terminal.
        composited_terminal.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn renderer(frame_rate: u32) -> Renderer {
        let scene = Scene::new(Canvas::new(4, 4), hanabi_core::SceneConfig::default());
        Renderer::new(scene, frame_rate, CancellationHandle::new())
    }

    #[test]
    fn frames_are_paced_by_the_frame_rate() {
        let renderer = renderer(50);
        assert_eq!(renderer.frame_duration, std::time::Duration::from_millis(20));
        assert!(renderer.time_until_next_frame() <= std::time::Duration::from_millis(20));
    }

    #[test]
    fn a_zero_frame_rate_is_one_frame_per_second() {
        let renderer = renderer(0);
        assert_eq!(renderer.frame_duration, std::time::Duration::from_secs(1));
    }

    #[test]
    fn late_frames_dont_wait() {
        let mut renderer = renderer(1000);
        renderer.last_frame_tick = std::time::Instant::now()
            .checked_sub(std::time::Duration::from_millis(50))
            .unwrap_or_else(std::time::Instant::now);
        assert_eq!(renderer.time_until_next_frame(), std::time::Duration::ZERO);
    }
}
