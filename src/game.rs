use heapless::Deque;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{ConfigError, GameConfig};

/// Body capacity: every cell of the default 62x34 playfield.
pub const MAX_SEGMENTS: usize = 62 * 34;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Resolve a requested direction against the last accepted one.
    ///
    /// A snake that has not moved yet (`previous == None`) cannot start
    /// towards the left: the initial body trails on that side.
    pub fn resolve(previous: Option<Direction>, requested: Option<Direction>) -> Option<Direction> {
        match (previous, requested) {
            (Some(prev), Some(req)) if req == prev.opposite() => Some(prev),
            (None, Some(Direction::Left)) => None,
            _ => requested,
        }
    }
}

/// Pixel coordinates of a grid cell's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn step(self, direction: Direction, distance: i32) -> Self {
        match direction {
            Direction::Up => Position::new(self.x, self.y - distance),
            Direction::Right => Position::new(self.x + distance, self.y),
            Direction::Down => Position::new(self.x, self.y + distance),
            Direction::Left => Position::new(self.x - distance, self.y),
        }
    }
}

/// What the head ran into on the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Collision {
    None,
    Apple,
    Body,
    Wall,
}

impl Collision {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Collision::Body | Collision::Wall)
    }
}

pub struct Snake {
    head: Position,
    length: usize,
    direction: Option<Direction>,
    previous: Option<Direction>,
    // Front is the segment right behind the head.
    body: Deque<Position, MAX_SEGMENTS>,
}

impl Snake {
    /// A motionless snake whose body trails to the left of `head`.
    pub fn new(head: Position, length: usize, block_size: i32) -> Self {
        let mut body = Deque::new();
        let segments = length.saturating_sub(1).min(MAX_SEGMENTS);
        for i in 1..=segments {
            let _ = body.push_back(Position::new(head.x - i as i32 * block_size, head.y));
        }

        Self {
            head,
            length: segments + 1,
            direction: None,
            previous: None,
            body,
        }
    }

    pub fn head(&self) -> Position {
        self.head
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Direction the snake moved on its last step, `None` before the first move.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Body segments ordered from the head towards the tail.
    pub fn body(&self) -> impl Iterator<Item = &Position> + '_ {
        self.body.iter()
    }

    pub fn contains_body(&self, pos: Position) -> bool {
        self.body.iter().any(|&segment| segment == pos)
    }

    pub fn steer(&mut self, requested: Direction) {
        self.direction = Some(requested);
    }

    /// Move one block in the steered direction. Returns whether the snake moved.
    pub fn advance(&mut self, block_size: i32) -> bool {
        self.direction = Direction::resolve(self.previous, self.direction);

        let Some(direction) = self.direction else {
            return false;
        };

        let previous_head = self.head;
        self.head = previous_head.step(direction, block_size);

        if self.body.pop_back().is_some() {
            // pop_back just made room
            let _ = self.body.push_front(previous_head);
        }

        self.previous = Some(direction);
        true
    }

    /// Lengthen by one segment. The new slot starts as a copy of the tail and
    /// separates from it on the next step. Returns `false` once the body is at
    /// capacity.
    pub fn grow(&mut self) -> bool {
        let tail = self.body.back().copied().unwrap_or(self.head);
        if self.body.push_back(tail).is_err() {
            return false;
        }
        self.length += 1;
        true
    }
}

pub struct Game {
    config: GameConfig,
    snake: Snake,
    apple: Position,
    score: u32,
    frame: u32,
    rng: SmallRng,
}

impl Game {
    /// Start a game on `config`, which must pass [`GameConfig::validate`].
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            snake: Snake::new(config.start_head, config.start_length, config.block_size as i32),
            apple: config.start_apple,
            score: 0,
            frame: 0,
            rng: SmallRng::seed_from_u64(seed),
            config,
        })
    }

    /// Run one simulation frame: steer, move, collide. Returns `true` when the
    /// snake died this frame.
    pub fn step(&mut self, requested: Option<Direction>) -> bool {
        self.frame = self.frame.wrapping_add(1);
        if let Some(direction) = requested {
            self.snake.steer(direction);
        }
        self.snake.advance(self.config.block_size as i32);
        self.check_collision().is_fatal()
    }

    /// Check the head against the body, the walls and the apple. Eating the
    /// apple grows the snake and moves the apple somewhere else.
    pub fn check_collision(&mut self) -> Collision {
        let head = self.snake.head();

        if self.snake.contains_body(head) {
            debug!("snake hit itself at ({}, {})", head.x, head.y);
            return Collision::Body;
        }

        if !self.config.in_playfield(head) {
            debug!("snake hit the wall at ({}, {})", head.x, head.y);
            return Collision::Wall;
        }

        if head == self.apple {
            // Score and length move together.
            if self.snake.grow() {
                self.score += 1;
                debug!("apple eaten, score {}", self.score);
            } else {
                warn!("snake is at full length, apple not scored");
            }
            self.relocate_apple();
            return Collision::Apple;
        }

        Collision::None
    }

    // The new spot may be under the snake.
    fn relocate_apple(&mut self) {
        let block = self.config.block_size as i32;
        let border = self.config.border() as i32;
        let column = self.rng.gen_range(0..self.config.columns()) as i32;
        let row = self.rng.gen_range(0..self.config.rows()) as i32;
        self.apple = Position::new(column * block + border, row * block + border);
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn apple(&self) -> Position {
        self.apple
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of simulation frames run so far.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(game: &Game) -> Vec<Position> {
        game.snake().body().copied().collect()
    }

    fn game_with(head: Position, length: usize, apple: Position) -> Game {
        Game::new(GameConfig::DEFAULT.with_start(head, length, apple), 7).unwrap()
    }

    #[test]
    fn starts_idle_with_body_trailing_left() {
        let game = Game::new(GameConfig::DEFAULT, 1).unwrap();
        assert_eq!(game.snake().head(), Position::new(300, 340));
        assert_eq!(game.snake().length(), 4);
        assert_eq!(game.snake().direction(), None);
        assert_eq!(
            body(&game),
            vec![Position::new(280, 340), Position::new(260, 340), Position::new(240, 340)]
        );
    }

    #[test]
    fn idle_snake_does_not_move() {
        let mut game = Game::new(GameConfig::DEFAULT, 1).unwrap();
        assert!(!game.step(None));
        assert_eq!(game.snake().head(), Position::new(300, 340));
        assert_eq!(body(&game).len(), 3);
    }

    #[test]
    fn first_right_moves_head_and_shifts_body() {
        let mut game = Game::new(GameConfig::DEFAULT, 1).unwrap();
        assert!(!game.step(Some(Direction::Right)));
        assert_eq!(game.snake().head(), Position::new(320, 340));
        assert_eq!(
            body(&game),
            vec![Position::new(300, 340), Position::new(280, 340), Position::new(260, 340)]
        );
    }

    #[test]
    fn initial_left_is_ignored() {
        let mut game = Game::new(GameConfig::DEFAULT, 1).unwrap();
        game.step(Some(Direction::Left));
        assert_eq!(game.snake().head(), Position::new(300, 340));
        assert_eq!(game.snake().direction(), None);

        game.step(Some(Direction::Up));
        assert_eq!(game.snake().head(), Position::new(300, 320));
    }

    #[test]
    fn reversal_is_rejected() {
        let mut game = Game::new(GameConfig::DEFAULT, 1).unwrap();
        game.step(Some(Direction::Right));
        game.step(Some(Direction::Left));
        assert_eq!(game.snake().direction(), Some(Direction::Right));
        assert_eq!(game.snake().head(), Position::new(340, 340));

        game.step(Some(Direction::Down));
        game.step(Some(Direction::Up));
        assert_eq!(game.snake().direction(), Some(Direction::Down));
        assert_eq!(game.snake().head(), Position::new(340, 380));
    }

    #[test]
    fn resolve_only_blocks_exact_opposites() {
        use Direction::*;
        assert_eq!(Direction::resolve(Some(Up), Some(Left)), Some(Left));
        assert_eq!(Direction::resolve(Some(Up), Some(Down)), Some(Up));
        assert_eq!(Direction::resolve(Some(Left), Some(Right)), Some(Left));
        assert_eq!(Direction::resolve(Some(Left), Some(Left)), Some(Left));
        assert_eq!(Direction::resolve(None, Some(Right)), Some(Right));
        assert_eq!(Direction::resolve(None, Some(Left)), None);
        assert_eq!(Direction::resolve(None, None), None);
    }

    #[test]
    fn straight_line_keeps_spacing() {
        let mut game = game_with(Position::new(300, 340), 4, Position::new(980, 100));
        for _ in 0..10 {
            assert!(!game.step(Some(Direction::Down)));
        }
        let head = game.snake().head();
        assert_eq!(head, Position::new(300, 540));
        for (i, segment) in game.snake().body().enumerate() {
            assert_eq!(*segment, Position::new(300, head.y - (i as i32 + 1) * 20));
        }
    }

    #[test]
    fn turning_into_the_body_kills() {
        let mut game = game_with(Position::new(300, 340), 5, Position::new(980, 100));
        assert!(!game.step(Some(Direction::Up)));
        assert!(!game.step(Some(Direction::Left)));
        assert!(game.step(Some(Direction::Down)));
        assert_eq!(game.check_collision(), Collision::Body);
    }

    #[test]
    fn tail_moves_out_of_the_way() {
        let mut game = game_with(Position::new(300, 340), 4, Position::new(980, 100));
        game.step(Some(Direction::Up));
        game.step(Some(Direction::Left));
        assert!(!game.step(Some(Direction::Down)));
        assert_eq!(game.snake().head(), Position::new(280, 340));
    }

    #[test]
    fn entering_the_border_band_kills() {
        let mut game = game_with(Position::new(40, 340), 1, Position::new(980, 100));
        assert!(!game.step(Some(Direction::Up)));
        assert!(!game.step(Some(Direction::Left)));
        assert_eq!(game.snake().head(), Position::new(20, 320));
        assert!(game.step(Some(Direction::Left)));
        assert_eq!(game.snake().head(), Position::new(0, 320));
        assert_eq!(game.check_collision(), Collision::Wall);
    }

    #[test]
    fn right_and_bottom_walls_kill() {
        let mut game = game_with(Position::new(1240, 340), 2, Position::new(980, 100));
        assert!(game.step(Some(Direction::Right)));

        let mut game = game_with(Position::new(300, 680), 2, Position::new(980, 100));
        assert!(game.step(Some(Direction::Down)));
    }

    #[test]
    fn eating_grows_scores_and_relocates() {
        let mut game = game_with(Position::new(300, 340), 4, Position::new(320, 340));
        assert!(!game.step(Some(Direction::Right)));
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().length(), 5);
        assert_eq!(body(&game).len(), 4);
        assert_eq!(body(&game)[3], Position::new(260, 340));

        let config = GameConfig::DEFAULT;
        let apple = game.apple();
        assert_eq!(apple.x % 20, 0);
        assert_eq!(apple.y % 20, 0);
        assert!(config.in_playfield(apple));
    }

    #[test]
    fn grown_segment_trails_the_old_tail() {
        let mut snake = Snake::new(Position::new(300, 340), 4, 20);
        snake.steer(Direction::Right);
        snake.advance(20);
        assert!(snake.grow());
        assert_eq!(snake.length(), 5);
        assert_eq!(snake.body().count(), 4);

        snake.advance(20);
        let body: Vec<Position> = snake.body().copied().collect();
        assert_eq!(
            body,
            vec![
                Position::new(320, 340),
                Position::new(300, 340),
                Position::new(280, 340),
                Position::new(260, 340),
            ]
        );
    }

    #[test]
    fn relocated_apples_stay_on_the_grid() {
        let config = GameConfig::DEFAULT;
        let mut game = Game::new(config, 42).unwrap();
        for _ in 0..500 {
            game.relocate_apple();
            let apple = game.apple();
            assert_eq!(apple.x % 20, 0);
            assert_eq!(apple.y % 20, 0);
            assert!(config.in_playfield(apple));
        }
    }

    #[test]
    fn top_wall_kills() {
        let mut game = game_with(Position::new(300, 20), 1, Position::new(980, 100));
        assert!(game.step(Some(Direction::Up)));
        assert_eq!(game.snake().head(), Position::new(300, 0));
        assert_eq!(game.check_collision(), Collision::Wall);
    }

    #[test]
    fn apple_may_land_on_the_body() {
        // Two cells: the head on one, the body on the other.
        let config = GameConfig::DEFAULT
            .with_screen_size(80, 60)
            .with_start(Position::new(40, 20), 2, Position::new(40, 20));
        let mut game = Game::new(config, 9).unwrap();
        let mut on_body = 0;
        for _ in 0..64 {
            game.relocate_apple();
            let apple = game.apple();
            assert!(apple == Position::new(20, 20) || apple == Position::new(40, 20));
            if game.snake().contains_body(apple) {
                on_body += 1;
            }
        }
        assert!(on_body > 0);
    }

    #[test]
    fn full_snake_does_not_score() {
        let mut snake = Snake::new(Position::new(300, 340), MAX_SEGMENTS + 1, 20);
        assert!(!snake.grow());
        assert_eq!(snake.length(), MAX_SEGMENTS + 1);

        let mut game = Game::new(GameConfig::DEFAULT, 1).unwrap();
        game.snake = snake;
        game.apple = Position::new(320, 340);
        assert!(!game.step(Some(Direction::Right)));
        assert_eq!(game.score(), 0);
        assert_eq!(game.snake().length(), MAX_SEGMENTS + 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig::DEFAULT.with_block_size(0);
        assert_eq!(Game::new(config, 1).err(), Some(ConfigError::ZeroBlockSize));
    }

    #[test]
    fn frame_counter_advances_every_step() {
        let mut game = Game::new(GameConfig::DEFAULT, 1).unwrap();
        game.step(None);
        game.step(Some(Direction::Right));
        assert_eq!(game.frame(), 2);
    }
}
