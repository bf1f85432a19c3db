use anyhow::{anyhow, Result};

pub const WORLD_WIDTH: i32 = 640;
pub const WORLD_HEIGHT: i32 = 480;
pub const GRID_CELL: i32 = 32;
pub const MOVE_TIME: f32 = 0.5;
pub const POINTS_PER_APPLE: u32 = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub world_width: i32,
    pub world_height: i32,
    pub cell: i32,
    /// Seconds between two movement steps
    pub move_interval: f32,
    pub apple_reward: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            cell: GRID_CELL,
            move_interval: MOVE_TIME,
            apple_reward: POINTS_PER_APPLE,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cell <= 0 {
            return Err(anyhow!("cell size must be > 0, got {}", self.cell));
        }
        for (name, extent) in [("width", self.world_width), ("height", self.world_height)].iter() {
            if *extent <= 0 || extent % self.cell != 0 {
                return Err(anyhow!(
                    "world {} must be a positive multiple of the cell size {}, got {}",
                    name,
                    self.cell,
                    extent
                ));
            }
        }
        if !self.move_interval.is_finite() || self.move_interval <= 0.0 {
            return Err(anyhow!("move interval must be > 0 seconds, got {}", self.move_interval));
        }
        Ok(())
    }

    pub fn columns(&self) -> i32 {
        self.world_width / self.cell
    }

    pub fn rows(&self) -> i32 {
        self.world_height / self.cell
    }
}
