use crate::browser;
use crate::engine::DEFAULT_MAX_STEP;
use crate::sprite::{Direction, Status};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH: &str = "config.json";

/// Tunables read from `config.json`, every field is optional
/// ┌─────────────────┬──────────────────────────────────────────┐
/// │ gravity         │ px / s², pulls bodies with gravity on    │
/// │ max_clock_tick  │ cap on seconds handed to a single tick   │
/// │ seed            │ fixed RNG seed, entropy when absent      │
/// │ people          │ persons placed when the level starts     │
/// │ food            │ food positions                           │
/// │ portals         │ portal row layout                        │
/// └─────────────────┴──────────────────────────────────────────┘
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub gravity: f32,
    pub max_clock_tick: f32,
    pub seed: Option<u64>,
    pub people: Vec<PersonSpawn>,
    pub food: Vec<FoodSpawn>,
    pub portals: PortalLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSpawn {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub y_velocity: f32,
    /// index into the character roster, random when absent
    #[serde(default)]
    pub character: Option<usize>,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub direction: Direction,
    /// 0 walk, 1 jump, 2 stand, anything else leaves the person standing
    #[serde(default)]
    pub status: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSpawn {
    pub x: f32,
    pub y: f32,
}

/// Portals sit in one row, `spacing` apart, `floor_offset` above the bottom
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalLayout {
    pub count: usize,
    pub spacing: f32,
    pub floor_offset: f32,
}

fn default_speed() -> f32 {
    200.0
}

impl PersonSpawn {
    fn at(x: f32, y: f32, y_velocity: f32) -> Self {
        PersonSpawn {
            x,
            y,
            y_velocity,
            character: None,
            speed: default_speed(),
            direction: Direction::Right,
            status: Status::Walk.index(),
        }
    }
}

impl Default for PortalLayout {
    fn default() -> Self {
        PortalLayout {
            count: 4,
            spacing: 370.0,
            floor_offset: 219.0,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            gravity: 1800.0,
            max_clock_tick: DEFAULT_MAX_STEP,
            seed: None,
            people: vec![
                PersonSpawn::at(400.0, 50.0, 0.0),
                PersonSpawn::at(400.0, 500.0, -1500.0),
                PersonSpawn::at(400.0, 500.0, -1000.0),
                PersonSpawn::at(400.0, 500.0, -1000.0),
            ],
            food: vec![
                FoodSpawn { x: 450.0, y: 80.0 },
                FoodSpawn { x: 750.0, y: 80.0 },
                FoodSpawn { x: 370.0, y: 200.0 },
                FoodSpawn { x: 780.0, y: 200.0 },
            ],
            portals: PortalLayout::default(),
        }
    }
}

impl GameConfig {
    /// `max_clock_tick` when it is a positive finite number, the default cap
    /// otherwise
    pub fn max_step(&self) -> f32 {
        if self.max_clock_tick.is_finite() && self.max_clock_tick > 0.0 {
            self.max_clock_tick
        } else {
            log::warn!(
                "Ignoring max_clock_tick {}, using {}",
                self.max_clock_tick,
                DEFAULT_MAX_STEP
            );
            DEFAULT_MAX_STEP
        }
    }

    /// Seeded when `seed` is set, otherwise from browser entropy
    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }
}

/// Fetches `config.json`, a missing or broken file falls back to defaults
pub async fn load() -> GameConfig {
    match browser::fetch_json::<GameConfig>(CONFIG_PATH).await {
        Ok(config) => {
            log::info!("Loaded {}", CONFIG_PATH);
            config
        }
        Err(err) => {
            log::warn!("Using default config, {} unavailable : {:#}", CONFIG_PATH, err);
            GameConfig::default()
        }
    }
}
