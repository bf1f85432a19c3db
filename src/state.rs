//! The game proper: timer-gated movement, apples, score and the
//! PLAYING / GAME_OVER phase. Knows nothing about terminals.

use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::snake::{Direction, MoveResult, Snake, Turn};
use crate::Coords;

const ORIGIN: Coords = (0, 0);
const INITIAL_DIRECTION: Direction = Direction::Right;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

/// What the input side sampled during one frame.
#[derive(Copy, Clone, Debug, Default)]
pub struct FrameInput {
    pub direction: Option<Direction>,
    pub restart: bool,
}

pub struct GameState {
    config: GameConfig,
    snake: Snake,
    timer: f32,
    apple: Option<Coords>,
    score: u32,
    phase: Phase,
    rng: StdRng,
}

impl GameState {
    pub fn new(config: GameConfig, rng: StdRng) -> Self {
        GameState {
            timer: config.move_interval,
            config,
            snake: Snake::new(ORIGIN, INITIAL_DIRECTION),
            apple: None,
            score: 0,
            phase: Phase::Playing,
            rng,
        }
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: GameConfig) -> Self {
        Self::new(config, StdRng::from_entropy())
    }

    /// One rendered frame: the sampled input followed by `advance`.
    pub fn frame(&mut self, delta: f32, input: FrameInput) {
        match self.phase {
            Phase::Playing => {
                if let Some(dir) = input.direction {
                    self.request_direction(dir);
                }
                self.advance(delta);
            }
            Phase::GameOver => {
                if input.restart {
                    self.restart();
                }
            }
        }
    }

    pub fn request_direction(&mut self, dir: Direction) {
        if self.phase != Phase::Playing {
            return;
        }

        match self.snake.set_direction(dir) {
            Turn::Accepted => debug!(?dir, "direction changed"),
            Turn::Reversal => debug!(?dir, body = self.snake.body().len(), "reversal rejected"),
            Turn::Latched => debug!(?dir, "direction already changed this step"),
            Turn::Unchanged => {}
        }
    }

    pub fn advance(&mut self, delta: f32) {
        if self.phase != Phase::Playing {
            return;
        }

        self.timer -= delta;
        if self.timer <= 0.0 {
            self.timer = self.config.move_interval;
            self.move_snake();
        }

        // Dying ends the frame too
        if self.phase == Phase::Playing {
            self.check_apple_collision();
            self.place_apple();
        }
    }

    pub fn restart(&mut self) {
        self.snake = Snake::new(ORIGIN, INITIAL_DIRECTION);
        self.timer = self.config.move_interval;
        self.apple = None;
        self.score = 0;
        self.phase = Phase::Playing;
        info!("game restarted");
    }

    pub fn head(&self) -> Coords {
        self.snake.head()
    }

    /// Trailing-most segment first.
    pub fn body(&self) -> &VecDeque<Coords> {
        self.snake.body()
    }

    pub fn direction(&self) -> Direction {
        self.snake.get_direction()
    }

    pub fn apple(&self) -> Option<Coords> {
        self.apple
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    ///////////////////////////////////////////////////////////////////////////

    fn move_snake(&mut self) {
        let GameConfig { cell, world_width, world_height, .. } = self.config;

        match self.snake.move_step(cell, world_width, world_height) {
            MoveResult::Moved { new_head, old_head } => {
                debug!(from = ?old_head, to = ?new_head, "snake moved");
            }
            MoveResult::Crashed { new_head } => {
                self.phase = Phase::GameOver;
                info!(
                    score = self.score,
                    length = self.snake.body().len(),
                    head = ?new_head,
                    "snake ran into itself"
                );
            }
        }
    }

    fn check_apple_collision(&mut self) {
        if self.apple == Some(self.snake.head()) {
            self.apple = None;
            self.score = self.score.saturating_add(self.config.apple_reward);
            self.snake.grow();
            info!(score = self.score, length = self.snake.body().len(), "apple eaten");
        }
    }

    fn place_apple(&mut self) {
        if self.apple.is_some() {
            return;
        }

        let (cols, rows) = (self.config.columns(), self.config.rows());
        let head = self.snake.head();

        // A 1x1 world has nowhere else to go
        if cols * rows <= 1 {
            return;
        }

        let pos = loop {
            let pos = (
                self.rng.gen_range(0..cols) * self.config.cell,
                self.rng.gen_range(0..rows) * self.config.cell,
            );
            if pos != head {
                break pos;
            }
        };

        debug!(apple = ?pos, "apple placed");
        self.apple = Some(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;

    const FAR_CORNER: Coords = (0, 448);

    fn new_game() -> GameState {
        GameState::with_seed(GameConfig::default(), 0xDEAD_BEEF)
    }

    /// Puts an apple under the head, lets the game eat it, then parks the
    /// respawned apple somewhere out of the way.
    fn feed(game: &mut GameState) {
        game.apple = Some(game.head());
        game.advance(0.0);
        game.apple = Some(FAR_CORNER);
    }

    fn step(game: &mut GameState) {
        let interval = game.config().move_interval;
        game.advance(interval);
    }

    #[test]
    fn first_step_moves_one_cell_right() {
        let mut game = new_game();
        game.advance(0.5);

        assert_eq!(game.head(), (32, 0));
        assert!(game.body().is_empty());
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn no_movement_before_interval_elapses() {
        let mut game = new_game();
        game.advance(0.2);
        game.advance(0.2);
        assert_eq!(game.head(), (0, 0));
        game.advance(0.2);
        assert_eq!(game.head(), (32, 0));
    }

    #[test]
    fn bodyless_snake_reverses_and_wraps() {
        let mut game = new_game();
        game.request_direction(Left);
        assert_eq!(game.direction(), Left);

        game.advance(0.5);
        assert_eq!(game.head(), (640 - 32, 0));
    }

    #[test]
    fn reversal_rejected_once_snake_has_a_body() {
        let mut game = new_game();
        feed(&mut game);
        assert_eq!(game.body().len(), 1);

        game.request_direction(Left);
        assert_eq!(game.direction(), Right);
    }

    #[test]
    fn eating_grows_by_one_and_scores() {
        let mut game = new_game();
        let before = game.body().len();
        feed(&mut game);

        assert_eq!(game.body().len(), before + 1);
        assert_eq!(game.score(), 20);
        assert_ne!(game.apple(), Some(game.head()));
    }

    #[test]
    fn consumed_apple_is_gone_until_respawn() {
        let mut game = new_game();
        game.apple = Some(game.head());
        game.check_apple_collision();
        assert_eq!(game.apple(), None);
        assert_eq!(game.score(), 20);
    }

    #[test]
    fn length_is_stable_without_apples() {
        let mut game = new_game();
        feed(&mut game);
        feed(&mut game);
        let len = game.body().len();

        for _ in 0..10 {
            step(&mut game);
            assert_eq!(game.body().len(), len);
        }
        assert_eq!(game.head(), (320, 0));
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn apple_never_spawns_on_head() {
        let mut game = new_game();
        for _ in 0..10_000 {
            game.apple = None;
            game.place_apple();
            let apple = game.apple().unwrap();
            assert_ne!(apple, game.head());
            assert_eq!((apple.0 % 32, apple.1 % 32), (0, 0));
            assert!(apple.0 >= 0 && apple.0 < 640 && apple.1 >= 0 && apple.1 < 480);
        }
    }

    #[test]
    fn apple_retries_until_off_head() {
        let config = GameConfig { world_width: 64, world_height: 32, ..GameConfig::default() };
        let mut game = GameState::with_seed(config, 7);
        for _ in 0..10_000 {
            game.apple = None;
            game.place_apple();
            assert_eq!(game.apple(), Some((32, 0)));
        }
    }

    #[test]
    fn self_collision_ends_game_until_restart() {
        let mut game = new_game();
        for _ in 0..4 {
            feed(&mut game);
        }

        step(&mut game);
        game.request_direction(Up);
        step(&mut game);
        game.request_direction(Left);
        step(&mut game);
        game.request_direction(Down);
        step(&mut game);

        assert_eq!(game.head(), (0, 0));
        assert_eq!(game.phase(), Phase::GameOver);

        for _ in 0..5 {
            step(&mut game);
            game.request_direction(Right);
        }
        assert_eq!(game.head(), (0, 0));
        assert_eq!(game.direction(), Down);
        assert_eq!(game.score(), 80);
    }

    #[test]
    fn score_saturates_instead_of_overflowing() {
        let config = GameConfig { apple_reward: u32::MAX, ..GameConfig::default() };
        assert!(config.validate().is_ok());

        let mut game = GameState::with_seed(config, 1);
        feed(&mut game);
        feed(&mut game);

        assert_eq!(game.score(), u32::MAX);
        assert_eq!(game.body().len(), 2);
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn head_runs_into_coiled_body() {
        let mut game = new_game();

        // Eat an apple on each of the next four cells so the body trails out straight
        for _ in 0..4 {
            let (x, y) = game.head();
            game.apple = Some((x + 32, y));
            step(&mut game);
            game.apple = Some(FAR_CORNER);
        }
        step(&mut game);

        assert_eq!(game.head(), (160, 0));
        assert_eq!(
            game.body().iter().copied().collect::<Vec<_>>(),
            vec![(32, 0), (64, 0), (96, 0), (128, 0)]
        );
        assert_eq!(game.score(), 80);

        game.request_direction(Up);
        step(&mut game);
        game.request_direction(Left);
        step(&mut game);
        assert_eq!(game.phase(), Phase::Playing);

        game.request_direction(Down);
        step(&mut game);

        assert_eq!(game.head(), (128, 0));
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(
            game.body().iter().copied().collect::<Vec<_>>(),
            vec![(128, 0), (160, 0), (160, 32), (128, 32)]
        );

        step(&mut game);
        assert_eq!(game.head(), (128, 0));
    }

    #[test]
    fn restart_resets_everything() {
        let mut game = new_game();
        feed(&mut game);
        game.request_direction(Up);
        step(&mut game);
        game.phase = Phase::GameOver;

        for _ in 0..2 {
            game.restart();
            assert_eq!(game.phase(), Phase::Playing);
            assert_eq!(game.score(), 0);
            assert!(game.body().is_empty());
            assert_eq!(game.head(), (0, 0));
            assert_eq!(game.direction(), Right);
            assert_eq!(game.apple(), None);
        }
    }

    #[test]
    fn frame_only_restarts_after_game_over() {
        let mut game = new_game();
        game.frame(0.5, FrameInput { direction: None, restart: true });
        assert_eq!(game.head(), (32, 0));

        game.phase = Phase::GameOver;
        game.frame(0.5, FrameInput { direction: Some(Up), restart: false });
        assert_eq!(game.head(), (32, 0));

        game.frame(0.0, FrameInput { direction: None, restart: true });
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.head(), (0, 0));
    }
}
