use core::fmt::Write;

use heapless::String;

use crate::config::GameConfig;
use crate::game::{Direction, Game, Position};
use crate::traits::{Color, Screen, ScreenId};

const SCORE_ROW: u32 = 1;
const DIRECTION_ROW: u32 = 2;
const FRAME_ROW: u32 = 3;

/// Draw one complete frame of `game` into the back buffer of `id`.
pub fn render_frame<S: Screen>(screen: &mut S, id: ScreenId, game: &Game) -> Result<(), S::Error> {
    let config = game.config();

    screen.clear(id, Color::BLACK)?;
    draw_border(screen, id, config)?;
    draw_snake(screen, id, game, config.block_size)?;
    draw_square(screen, id, game.apple(), config.block_size, Color::RED)?;
    show_score(screen, id, game.score())?;
    if config.show_debug {
        show_debug(screen, id, game)?;
    }
    Ok(())
}

/// Gray wall band along the screen edges. Only the TV shows the playfield.
pub fn draw_border<S: Screen>(screen: &mut S, id: ScreenId, config: &GameConfig) -> Result<(), S::Error> {
    if id != ScreenId::Tv {
        return Ok(());
    }

    let (width, height, band) = (config.screen_width, config.screen_height, config.border());

    for x in 0..width {
        for y in 0..band {
            screen.put_pixel(id, x, y, Color::GRAY)?; // top
            screen.put_pixel(id, x, height - band + y, Color::GRAY)?; // bottom
        }
    }
    for x in 0..band {
        for y in 0..height {
            screen.put_pixel(id, x, y, Color::GRAY)?; // left
            screen.put_pixel(id, width - band + x, y, Color::GRAY)?; // right
        }
    }
    Ok(())
}

/// Filled block with its top-left corner at `pos`.
pub fn draw_square<S: Screen>(
    screen: &mut S,
    id: ScreenId,
    pos: Position,
    size: u32,
    color: Color,
) -> Result<(), S::Error> {
    if pos.x < 0 || pos.y < 0 {
        return Ok(());
    }
    let (left, top) = (pos.x as u32, pos.y as u32);
    for x in 0..size {
        for y in 0..size {
            screen.put_pixel(id, left + x, top + y, color)?;
        }
    }
    Ok(())
}

pub fn draw_snake<S: Screen>(screen: &mut S, id: ScreenId, game: &Game, block_size: u32) -> Result<(), S::Error> {
    let snake = game.snake();
    draw_square(screen, id, snake.head(), block_size, Color::GREEN)?;
    for &segment in snake.body() {
        draw_square(screen, id, segment, block_size, Color::GREEN)?;
    }
    Ok(())
}

pub fn show_score<S: Screen>(screen: &mut S, id: ScreenId, score: u32) -> Result<(), S::Error> {
    let mut text = String::<32>::new();
    let _ = write!(text, "score: {}", score);
    screen.put_text(id, 0, SCORE_ROW, &text)
}

fn direction_label(direction: Option<Direction>) -> &'static str {
    match direction {
        Some(Direction::Up) => "snake is moving up",
        Some(Direction::Right) => "snake is moving right",
        Some(Direction::Down) => "snake is moving down",
        Some(Direction::Left) => "snake is moving left",
        None => "snake is not moving",
    }
}

/// Direction and frame counter, under the score.
pub fn show_debug<S: Screen>(screen: &mut S, id: ScreenId, game: &Game) -> Result<(), S::Error> {
    screen.put_text(id, 0, DIRECTION_ROW, direction_label(game.snake().direction()))?;

    let mut text = String::<16>::new();
    let _ = write!(text, "{}", game.frame());
    screen.put_text(id, 0, FRAME_ROW, &text)
}
