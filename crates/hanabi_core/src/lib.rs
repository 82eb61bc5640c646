//! # Hanabi Core
//! The physics, state machine and scheduling behind a fireworks display.
//!
//! A [`Scene`] owns a [`Surface`] and any number of [`Firework`]s. Each firework waits for its
//! delay, rises as a single ember, explodes into one of several [`Pattern`]s, then fades. Once
//! every firework has gone out the scene washes the surface to black and finishes.
//!
//! The library never touches a real screen. Anything that can fill itself with a translucent
//! colour and stamp a [`Sprite`] can be a surface, see the `hanabi` binary for one that renders
//! to a terminal.

#![expect(clippy::pub_use, reason = "How else are you supposed re-export??")]

pub mod clock;
pub mod colour;
pub mod config;
pub mod errors;
pub mod firework;
pub mod particle;
pub mod patterns;
pub mod scene;
pub mod sprite;
pub mod surface;

/// Helpers for testing code that uses this library.
pub mod tests {
    pub mod helpers;
}

pub use clock::{
    Clock, FixedRateScheduler, FrameScheduler, ManualClock, SteppedScheduler, SystemClock,
};
pub use config::{FireworkConfig, FireworkOverrides, Pattern};
pub use errors::{ConfigError, HanabiError};
pub use firework::{Firework, Phase};
pub use scene::{CancellationHandle, Scene, SceneConfig, ScenePhase};
pub use sprite::Sprite;
pub use surface::Surface;
