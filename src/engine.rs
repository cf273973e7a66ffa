use thiserror::Error;

use crate::config::{ConfigError, GameConfig};
use crate::game::Game;
use crate::input::InputSampler;
use crate::render::render_frame;
use crate::traits::{Clock, Controller, ProcessHost, Screen, ScreenId};

/// Fixed-timestep accumulator.
///
/// Elapsed ticks pile up between calls; each due frame consumes exactly one
/// period, so time left over carries into the next frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameTimer {
    period: u64,
    accumulated: u64,
    last: u64,
}

impl FrameTimer {
    pub fn new(period: u64, now: u64) -> Self {
        Self {
            period,
            accumulated: 0,
            last: now,
        }
    }

    /// Record the current tick; returns `true` when a frame is due.
    pub fn tick(&mut self, now: u64) -> bool {
        self.accumulated = self.accumulated.saturating_add(now.wrapping_sub(self.last));
        self.last = now;
        if self.accumulated > self.period {
            self.accumulated -= self.period;
            true
        } else {
            false
        }
    }
}

/// How a game that ran to completion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// The snake hit a wall or itself.
    SnakeDied { score: u32 },
    /// The host asked the process to stop.
    Stopped { score: u32 },
}

impl Outcome {
    pub fn score(&self) -> u32 {
        match *self {
            Outcome::SnakeDied { score } | Outcome::Stopped { score } => score,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError<E> {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("out of memory (screen buffer allocation failed)")]
    OutOfMemory,
    #[error("display error")]
    Display(E),
    #[error("controller lost")]
    ControllerLost,
}

/// Process exit status for the result of [`GameEngine::run`].
pub fn exit_code<E>(result: &Result<Outcome, EngineError<E>>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

pub struct GameEngine<S, C, H, K>
where
    S: Screen,
    C: Controller,
    H: ProcessHost,
    K: Clock,
{
    screen: S,
    controller: C,
    host: H,
    clock: K,
    config: GameConfig,
}

impl<S, C, H, K> GameEngine<S, C, H, K>
where
    S: Screen,
    C: Controller,
    H: ProcessHost,
    K: Clock,
{
    pub fn new(screen: S, controller: C, host: H, clock: K, config: GameConfig) -> Self {
        Self {
            screen,
            controller,
            host,
            clock,
            config,
        }
    }

    /// Bring the console up, play until the snake dies or the host quits, and
    /// tear everything down again. Shutdown runs on every path.
    pub fn run(&mut self) -> Result<Outcome, EngineError<S::Error>> {
        self.host.init();
        info!("Logging initialized");

        let result = self.start().and_then(|()| self.game_loop());
        self.shutdown();
        result
    }

    fn start(&mut self) -> Result<(), EngineError<S::Error>> {
        self.config.validate()?;
        self.screen.init().map_err(EngineError::Display)?;

        let tv_size = self.screen.buffer_size(ScreenId::Tv);
        let gamepad_size = self.screen.buffer_size(ScreenId::Gamepad);
        info!(
            "Will allocate {:#x} bytes for the TV, and {:#x} bytes for the gamepad.",
            tv_size,
            gamepad_size
        );

        let tv_buffer = self.host.allocate_buffer(tv_size);
        let gamepad_buffer = self.host.allocate_buffer(gamepad_size);
        let (Some(tv_buffer), Some(gamepad_buffer)) = (tv_buffer, gamepad_buffer) else {
            error!("Out of memory (screen buffer allocation failed)");
            return Err(EngineError::OutOfMemory);
        };

        self.screen.set_buffer(ScreenId::Tv, tv_buffer).map_err(EngineError::Display)?;
        self.screen
            .set_buffer(ScreenId::Gamepad, gamepad_buffer)
            .map_err(EngineError::Display)?;

        // The gamepad screen is sized and bound but stays dark.
        self.screen.enable(ScreenId::Tv, true).map_err(EngineError::Display)?;
        Ok(())
    }

    fn game_loop(&mut self) -> Result<Outcome, EngineError<S::Error>> {
        let mut game = Game::new(self.config, self.clock.seed())?;
        let mut input = InputSampler::new();

        let period = self.clock.nanos_to_ticks(self.config.frame_time_ns());
        let mut timer = FrameTimer::new(period, self.clock.now());
        let mut game_over = false;

        while self.host.is_running() {
            input.sample(&mut self.controller);
            if input.is_fatal() && self.config.halt_on_controller_loss {
                error!("Controller lost, stopping the game");
                return Err(EngineError::ControllerLost);
            }

            if timer.tick(self.clock.now()) {
                game_over = game.step(input.pending());
                render_frame(&mut self.screen, ScreenId::Tv, &game).map_err(EngineError::Display)?;
                self.screen.flip(ScreenId::Tv).map_err(EngineError::Display)?;
            }

            // TODO: show a game over screen with the high score instead of quitting
            if game_over {
                info!("Snake died with score {}", game.score());
                return Ok(Outcome::SnakeDied { score: game.score() });
            }
        }

        info!("Host requested exit");
        Ok(Outcome::Stopped { score: game.score() })
    }

    fn shutdown(&mut self) {
        info!("Quitting.");
        self.screen.shutdown();
        self.host.shutdown();
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_fires_only_after_a_full_period() {
        let mut timer = FrameTimer::new(100, 0);
        assert!(!timer.tick(50));
        assert!(!timer.tick(100));
        assert!(timer.tick(101));
    }

    #[test]
    fn leftover_time_carries_over() {
        let mut timer = FrameTimer::new(100, 0);
        assert!(timer.tick(250));
        // 150 ticks remain: one more frame is already due.
        assert!(timer.tick(250));
        // 50 left, so the next frame needs only 51 more ticks.
        assert!(!timer.tick(300));
        assert!(timer.tick(301));
    }

    #[test]
    fn backlog_drains_one_frame_per_tick() {
        let mut timer = FrameTimer::new(10, 0);
        let frames = (0..200).filter(|_| timer.tick(1_000)).count();
        assert_eq!(frames, 99);
    }

    #[test]
    fn exit_codes() {
        let ok: Result<Outcome, EngineError<()>> = Ok(Outcome::SnakeDied { score: 3 });
        assert_eq!(exit_code(&ok), 0);
        assert_eq!(ok.unwrap().score(), 3);

        let err: Result<Outcome, EngineError<()>> = Err(EngineError::OutOfMemory);
        assert_eq!(exit_code(&err), 1);
    }
}
