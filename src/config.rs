//! Game configuration.
//!
//! [`GameConfig::DEFAULT`] reproduces the layout of a 1280x720 TV output with
//! 20 pixel blocks. Other displays build their own configuration with the
//! `with_*` setters and check it with [`GameConfig::validate`].

use thiserror::Error;

use crate::game::{Position, MAX_SEGMENTS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameConfig {
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Edge length of one grid cell; also the width of the border band.
    pub block_size: u32,
    /// Simulation steps per second.
    pub frames_per_second: u32,
    pub start_head: Position,
    pub start_length: usize,
    pub start_apple: Position,
    /// Draw the direction and frame counter under the score.
    pub show_debug: bool,
    /// Stop the game once the controller is reported invalid or fails with an
    /// unknown error.
    pub halt_on_controller_loss: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("block size must be non-zero")]
    ZeroBlockSize,
    #[error("frame rate must be non-zero")]
    ZeroFrameRate,
    #[error("screen size is not a multiple of the block size")]
    MisalignedScreen,
    #[error("playfield is empty")]
    EmptyPlayfield,
    #[error("playfield holds more cells than the snake can grow to")]
    PlayfieldTooLarge,
    #[error("start position is off the grid or outside the playfield")]
    BadStartPosition,
    #[error("start length must be at least 1 and leave the body inside the playfield")]
    BadStartLength,
}

impl GameConfig {
    pub const DEFAULT: GameConfig = GameConfig {
        screen_width: 1280,
        screen_height: 720,
        block_size: 20,
        frames_per_second: 5,
        start_head: Position::new(300, 340),
        start_length: 4,
        start_apple: Position::new(980, 340),
        show_debug: false,
        halt_on_controller_loss: true,
    };

    pub const fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub const fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub const fn with_frame_rate(mut self, fps: u32) -> Self {
        self.frames_per_second = fps;
        self
    }

    pub const fn with_start(mut self, head: Position, length: usize, apple: Position) -> Self {
        self.start_head = head;
        self.start_length = length;
        self.start_apple = apple;
        self
    }

    pub const fn with_debug(mut self, show_debug: bool) -> Self {
        self.show_debug = show_debug;
        self
    }

    pub const fn with_halt_on_controller_loss(mut self, halt: bool) -> Self {
        self.halt_on_controller_loss = halt;
        self
    }

    /// Width of the wall band along every edge.
    pub const fn border(&self) -> u32 {
        self.block_size
    }

    /// Number of grid columns inside the border.
    pub const fn columns(&self) -> u32 {
        (self.screen_width - 2 * self.border()) / self.block_size
    }

    /// Number of grid rows inside the border.
    pub const fn rows(&self) -> u32 {
        (self.screen_height - 2 * self.border()) / self.block_size
    }

    /// Duration of one simulation step.
    pub const fn frame_time_ns(&self) -> u64 {
        1_000_000_000 / self.frames_per_second as u64
    }

    /// Whether `pos` lies strictly inside the border band.
    pub fn in_playfield(&self, pos: Position) -> bool {
        let border = self.border() as i32;
        pos.x >= border
            && pos.y >= border
            && pos.x < self.screen_width as i32 - border
            && pos.y < self.screen_height as i32 - border
    }

    fn on_grid(&self, pos: Position) -> bool {
        let block = self.block_size as i32;
        pos.x % block == 0 && pos.y % block == 0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.frames_per_second == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        if self.screen_width % self.block_size != 0 || self.screen_height % self.block_size != 0 {
            return Err(ConfigError::MisalignedScreen);
        }
        if self.screen_width <= 2 * self.border() || self.screen_height <= 2 * self.border() {
            return Err(ConfigError::EmptyPlayfield);
        }
        if (self.columns() * self.rows()) as usize > MAX_SEGMENTS + 1 {
            return Err(ConfigError::PlayfieldTooLarge);
        }
        for pos in [self.start_head, self.start_apple] {
            if !self.on_grid(pos) || !self.in_playfield(pos) {
                return Err(ConfigError::BadStartPosition);
            }
        }
        // The initial body trails to the left of the head.
        if self.start_length == 0 || self.start_length > MAX_SEGMENTS + 1 {
            return Err(ConfigError::BadStartLength);
        }
        let tail = Position::new(
            self.start_head.x - (self.start_length as i32 - 1) * self.block_size as i32,
            self.start_head.y,
        );
        if !self.in_playfield(tail) {
            return Err(ConfigError::BadStartLength);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
