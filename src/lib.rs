//! Snake for framebuffer consoles.
//!
//! The console is reached through the traits in [`traits`]: a [`Screen`] with
//! a fixed-function pixel and text API, a [`Controller`] that reports newly
//! pressed buttons, a [`ProcessHost`] that owns the process lifecycle and a
//! monotonic [`Clock`]. [`GameEngine`] drives a [`Game`] at a fixed timestep on
//! top of them.
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod engine;
pub mod framebuffer;
pub mod game;
pub mod input;
pub mod render;
pub mod traits;

pub use config::{ConfigError, GameConfig};
pub use engine::{exit_code, EngineError, FrameTimer, GameEngine, Outcome};
pub use framebuffer::Framebuffer;
pub use game::{Collision, Direction, Game, Position, Snake};
pub use input::{Buttons, InputSampler, ReadError};
pub use traits::{Clock, Color, Controller, ProcessHost, Screen, ScreenId};
