use bitflags::bitflags;
use thiserror::Error;

use crate::game::Direction;
use crate::traits::Controller;

bitflags! {
    /// Buttons newly pressed in one controller sample.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u32 {
        const A = 1 << 0;
        const B = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const UP = 1 << 4;
        const DOWN = 1 << 5;
    }
}

impl Buttons {
    /// The direction pad entry with the highest priority: up, right, down, left.
    pub fn direction(&self) -> Option<Direction> {
        if self.contains(Buttons::UP) {
            Some(Direction::Up)
        } else if self.contains(Buttons::RIGHT) {
            Some(Direction::Right)
        } else if self.contains(Buttons::DOWN) {
            Some(Direction::Down)
        } else if self.contains(Buttons::LEFT) {
            Some(Direction::Left)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    #[error("controller disconnected or invalid")]
    InvalidController,
    #[error("unknown controller error {0:#x}")]
    Unknown(i32),
}

/// Turns raw controller reads into a pending direction.
#[derive(Debug, Default)]
pub struct InputSampler {
    pending: Option<Direction>,
    fatal: bool,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the controller once and fold the sample into the pending direction.
    pub fn sample<C: Controller>(&mut self, controller: &mut C) {
        match controller.read() {
            Ok(Some(buttons)) => {
                if let Some(direction) = buttons.direction() {
                    trace!("direction pressed: {:?}", direction);
                    self.pending = Some(direction);
                }
            }
            Ok(None) => {}
            Err(ReadError::InvalidController) => {
                warn!("Gamepad disconnected!");
                self.fatal = true;
            }
            Err(ReadError::Unknown(code)) => {
                error!("Unknown controller error! {:#x}", code);
                self.fatal = true;
            }
        }
    }

    /// Most recent direction pressed, if any.
    pub fn pending(&self) -> Option<Direction> {
        self.pending
    }

    /// Whether the controller has been lost.
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}
