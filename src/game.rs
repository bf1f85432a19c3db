use std::{convert::TryFrom, thread::sleep, time::{Duration, Instant}};

use crate::{Coords, TermCoords, TermInt};
use crate::config::GameConfig;
use crate::term::TermManager;
use crate::snake::Direction::{self, *};
use crate::state::{FrameInput, GameState, Phase};

use anyhow::{anyhow, Context, Result};
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use tracing::info;

const SNAKE_BODY_CHAR: char = '█';
const APPLE_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';
const GAME_OVER_MSG: &str = "Game over... Press space to restart";

/// Whether the session should keep going after a call returns.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct SnakeGame {
    state: GameState,
    term: TermManager,
    frame_time: Duration,
    // Playfield size in cells, border excluded
    field: (TermInt, TermInt),
    // Top-left corner of the playfield border
    origin: TermCoords,
    paused: bool,
}

impl SnakeGame {
    pub fn new(state: GameState, fps: u32) -> Result<Self> {
        let frame_time = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        let field = field_size(state.config())?;
        Ok(SnakeGame { state, term: TermManager::new()?, frame_time, field, origin: (0, 0), paused: false })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.term.setup()?;

        let (w, h) = self.term.get_terminal_size();
        let (field_w, field_h) = self.field;

        // Border around the field plus one line for the score
        if w < field_w + 2 || h < field_h + 3 {
            return Err(anyhow!(
                "terminal is {}x{}, need at least {}x{} for a {}x{} grid",
                w, h, field_w + 2, field_h + 3, field_w, field_h
            ));
        }

        self.origin = ((w - field_w - 2) / 2, (h - field_h - 3) / 2);
        Ok(())
    }

    pub fn show_intro(&mut self) -> Result<Flow> {
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc to pause",
            "Space to restart after a game over",
            "q or CTRL+C to quit",
            "",
            "Press any key to begin"
        ];

        self.term.show_message(lines)?;

        if is_quit(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }

        self.term.hide_message()?;
        Ok(Flow::Continue)
    }

    /// Runs frames until the player quits.
    pub fn play(&mut self) -> Result<()> {
        self.term.clear()?;
        let (field_w, field_h) = self.field;
        self.term.draw_borders(self.origin, field_w + 2, field_h + 2)?;
        self.render()?;

        let mut last_frame = Instant::now();

        loop {
            sleep(self.frame_time);
            let now = Instant::now();
            let delta = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;

            let input = match self.read_input()? {
                (Flow::Quit, _) => return Ok(()),
                (Flow::Continue, input) => input,
            };

            if self.paused { continue; }

            let before = self.state.phase();
            self.state.frame(delta, input);

            match (before, self.state.phase()) {
                (Phase::Playing, Phase::GameOver) => {
                    self.render()?;
                    self.game_over()?;
                },
                (Phase::GameOver, Phase::Playing) => {
                    self.term.hide_message()?;
                    self.render()?;
                },
                (Phase::Playing, Phase::Playing) => self.render()?,
                (Phase::GameOver, Phase::GameOver) => {},
            }
        }
    }

    pub fn restore(&mut self) {
        self.term.restore();
    }

    ///////////////////////////////////////////////////////////////////////////

    fn read_input(&mut self) -> Result<(Flow, FrameInput)> {
        let mut input = FrameInput::default();

        for key_ev in self.term.read_key_events_queue()? {
            if is_quit(&key_ev) {
                return Ok((Flow::Quit, input));
            }

            match key_ev.code {
                KeyCode::Char('w') | KeyCode::Up => request(&mut input, Up),
                KeyCode::Char('a') | KeyCode::Left => request(&mut input, Left),
                KeyCode::Char('s') | KeyCode::Down => request(&mut input, Down),
                KeyCode::Char('d') | KeyCode::Right => request(&mut input, Right),
                KeyCode::Char(' ') => input.restart = true,
                KeyCode::Esc => self.toggle_pause()?,
                _ => {}
            }
        }

        Ok((Flow::Continue, input))
    }

    /// Terminal cell for a world position. World y grows upward.
    fn to_term(&self, pos: Coords) -> TermCoords {
        let config = self.state.config();
        let col = (pos.0 / config.cell) as TermInt;
        let row = (config.rows() - 1 - pos.1 / config.cell) as TermInt;
        (self.origin.0 + 1 + col, self.origin.1 + 1 + row)
    }

    fn render(&mut self) -> Result<()> {
        let (field_w, _) = self.field;
        let origin = self.origin;

        for (i, ch) in field_cells(&self.state, self.field).into_iter().enumerate() {
            let pos = (
                origin.0 + 1 + (i % field_w as usize) as TermInt,
                origin.1 + 1 + (i / field_w as usize) as TermInt,
            );
            self.term.print_at(pos, ch)?;
        }

        self.print_status(&format!("Score: {}", self.state.score()))?;
        self.term.flush()
    }

    fn print_status(&mut self, text: &str) -> Result<()> {
        let (field_w, field_h) = self.field;
        let width = field_w as usize + 2;
        let line = format!("{: ^width$}", text, width = width);
        self.term.print_str_at((self.origin.0, self.origin.1 + field_h + 2), &line)
    }

    fn game_over(&mut self) -> Result<()> {
        info!(score = self.state.score(), "game over");

        let head = self.state.head();
        for pos in self.state.body().iter().copied().collect::<Vec<_>>() {
            if pos != head {
                let term_pos = self.to_term(pos);
                self.term.print_at(term_pos, DEAD_SNAKE_CHAR)?;
            }
        }
        let term_head = self.to_term(head);
        self.term.print_at(term_head, DEAD_SNAKE_CHAR)?;
        self.print_status("")?;

        self.term.show_message(&[GAME_OVER_MSG])
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if self.state.phase() != Phase::Playing {
            return Ok(());
        }

        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or q to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        Ok(())
    }
}

fn head_char(dir: Direction) -> char {
    match dir {
        Up => '^',
        Down => 'v',
        Left => '<',
        Right => '>',
    }
}

/// What the playfield shows, row by row from the top.
fn field_cells(state: &GameState, (field_w, field_h): (TermInt, TermInt)) -> Vec<char> {
    let mut cells = vec![' '; field_w as usize * field_h as usize];
    let cell = state.config().cell;
    let index = |(x, y): Coords| {
        let row = field_h as usize - 1 - (y / cell) as usize;
        row * field_w as usize + (x / cell) as usize
    };
    let head = state.head();

    // A segment still sitting under the head is not drawn
    for pos in state.body().iter().filter(|pos| **pos != head) {
        cells[index(*pos)] = SNAKE_BODY_CHAR;
    }
    if let Some(apple) = state.apple() {
        cells[index(apple)] = APPLE_CHAR;
    }
    cells[index(head)] = head_char(state.direction());

    cells
}

/// Grid size in terminal cells. The border and the score line have to fit
/// in a terminal too.
fn field_size(config: &GameConfig) -> Result<(TermInt, TermInt)> {
    let too_big = || format!("a {}x{} grid does not fit in a terminal", config.columns(), config.rows());
    let cols = TermInt::try_from(config.columns()).with_context(too_big)?;
    let rows = TermInt::try_from(config.rows()).with_context(too_big)?;

    if cols.checked_add(2).is_none() || rows.checked_add(3).is_none() {
        return Err(anyhow!(too_big()));
    }
    Ok((cols, rows))
}

/// The first direction key of a frame is the one that counts.
fn request(input: &mut FrameInput, dir: Direction) {
    if input.direction.is_none() {
        input.direction = Some(dir);
    }
}

fn is_quit(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
        || ev.code == KeyCode::Char('q')
}
