use std::collections::VecDeque;

use crate::Coords;
use Direction::*;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Right => Left,
            Left => Right,
            Up => Down,
            Down => Up,
        }
    }

    /// Unit offset in grid cells. World y grows upward.
    fn offset(self) -> (i32, i32) {
        match self {
            Right => (1, 0),
            Left => (-1, 0),
            Up => (0, 1),
            Down => (0, -1),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Coords, old_head: Coords },
    Crashed { new_head: Coords },
}

/// Outcome of a direction request, mostly interesting for logging.
#[derive(Debug, PartialEq, Eq)]
pub enum Turn {
    Accepted,
    Reversal,
    Latched,
    Unchanged,
}

pub struct Snake {
    head: Coords,
    // Front is the trailing-most segment, back sits right behind the head.
    body: VecDeque<Coords>,
    direction: Direction,
    direction_set: bool,
}

impl Snake {
    pub fn new(head: Coords, direction: Direction) -> Self {
        Snake { head, body: VecDeque::new(), direction, direction_set: false }
    }

    pub fn head(&self) -> Coords {
        self.head
    }

    pub fn body(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    /// Only one differing request is considered between two movement steps;
    /// a rejected reversal still uses up that chance.
    pub fn set_direction(&mut self, new_direction: Direction) -> Turn {
        if self.direction_set {
            return Turn::Latched;
        }
        if new_direction == self.direction {
            return Turn::Unchanged;
        }

        self.direction_set = true;

        if new_direction == self.direction.opposite() && !self.body.is_empty() {
            Turn::Reversal
        } else {
            self.direction = new_direction;
            Turn::Accepted
        }
    }

    /// Moves the head one cell, wrapping around the `width` x `height` world,
    /// and drags the trailing segment into the spot the head just left.
    pub fn move_step(&mut self, cell: i32, width: i32, height: i32) -> MoveResult {
        let old_head = self.head;
        let (dx, dy) = self.direction.offset();

        let new_head = (
            wrap(old_head.0 + dx * cell, width, cell),
            wrap(old_head.1 + dy * cell, height, cell),
        );
        self.head = new_head;

        if self.body.pop_front().is_some() {
            self.body.push_back(old_head);
        }

        self.direction_set = false;

        if self.body.contains(&new_head) {
            Crashed { new_head }
        } else {
            Moved { new_head, old_head }
        }
    }

    /// Adds a segment under the head. It is the next one to be relocated,
    /// so the existing segments stay where they are.
    pub fn grow(&mut self) {
        self.body.push_front(self.head);
    }
}

fn wrap(v: i32, extent: i32, cell: i32) -> i32 {
    if v >= extent {
        0
    } else if v < 0 {
        extent - cell
    } else {
        v
    }
}
