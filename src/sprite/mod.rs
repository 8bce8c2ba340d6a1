// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Directory Structure                                 │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ sprite/           │                                                      │
// │ ├── mod.rs        │ Animation clock, frame geometry, loaded sprite book  │
// │ ├── object.rs     │ NonAnimatedObject / AnimatedObject building blocks   │
// │ ├── state.rs      │ Person status table + directional sheet sets         │
// │ ├── person.rs     │ Person physics, food, portals, death                 │
// │ ├── food.rs       │ Food pickup with cooldown                            │
// │ ├── portal.rs     │ Portal decoration + trigger box                      │
// │ └── tomb.rs       │ Tomb dropped where a person died                     │
// └───────────────────┴──────────────────────────────────────────────────────┘

pub mod food;
pub mod object;
pub mod person;
pub mod portal;
pub mod state;
pub mod tomb;

use crate::engine::{AssetSource, Blit, ImageHandle, Rect};
use anyhow::{Context, Result};
use rand::{Rng, RngCore};
use state::CharacterSheets;
use std::rc::Rc;

pub use food::{Food, FoodHandle};
pub use object::{AnimatedObject, Direction, FrameChoice, NonAnimatedObject};
pub use person::Person;
pub use portal::Portal;
pub use state::{Side, Status};
pub use tomb::Tomb;

/// How to cut a sprite sheet into frames
/// - sheet_width : frames per row
/// - frame_count : frames actually used, may leave the last row partial
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameGeometry {
    pub frame_width: f32,
    pub frame_height: f32,
    pub sheet_width: usize,
    pub frame_count: usize,
}

impl FrameGeometry {
    pub fn new(frame_width: f32, frame_height: f32, sheet_width: usize, frame_count: usize) -> Self {
        FrameGeometry {
            frame_width,
            frame_height,
            sheet_width: sheet_width.max(1),
            frame_count: frame_count.max(1),
        }
    }

    /// Whole image as a single frame
    pub fn single(image: &ImageHandle) -> Self {
        FrameGeometry::new(image.width, image.height, 1, 1)
    }

    /// Source rectangle of frame `index`, row major
    pub fn frame_rect(&self, index: usize) -> Rect {
        let column = index % self.sheet_width;
        let row = index / self.sheet_width;
        Rect::new(
            column as f32 * self.frame_width,
            row as f32 * self.frame_height,
            self.frame_width,
            self.frame_height,
        )
    }
}

/// Time based sprite sheet animation
/// ┌──────────────── Timeline ──────────────────────────┐
/// │ elapsed : 0 ──────────────────────────► total_time │
/// │ frame   : [ 0 ][ 1 ][ 2 ] ... [ frame_count - 1 ]  │
/// │ looping : elapsed >= total_time -> elapsed = 0     │
/// └────────────────────────────────────────────────────┘
#[derive(Debug, Clone)]
pub struct Animation {
    sprite_sheet: ImageHandle,
    geometry: FrameGeometry,
    frame_duration: f32,
    total_time: f32,
    elapsed_time: f32,
    looping: bool,
    scale: f32,
}

impl Animation {
    pub fn new(
        sprite_sheet: ImageHandle,
        geometry: FrameGeometry,
        frame_duration: f32,
        looping: bool,
        scale: f32,
    ) -> Self {
        Animation {
            sprite_sheet,
            geometry,
            frame_duration,
            total_time: frame_duration * geometry.frame_count as f32,
            elapsed_time: 0.0,
            looping,
            scale,
        }
    }

    /// Adds `clock_tick` seconds, a looping animation that reached its end
    /// restarts from 0 and drops the overshoot
    pub fn advance(&mut self, clock_tick: f32) {
        self.elapsed_time += clock_tick.max(0.0);
        if self.is_done() && self.looping {
            self.elapsed_time = 0.0;
        }
    }

    /// floor(elapsed / frame_duration)
    /// - non looping animations past their end report indices >= frame_count
    pub fn current_frame(&self) -> usize {
        if self.frame_duration <= 0.0 {
            return 0;
        }
        let index = (self.elapsed_time / self.frame_duration).floor() as usize;
        if self.looping {
            // f32 division can land on frame_count just before the wrap
            index.min(self.geometry.frame_count - 1)
        } else {
            index
        }
    }

    pub fn is_done(&self) -> bool {
        self.elapsed_time >= self.total_time
    }

    /// Source rectangle for the current frame, held on the last frame once a
    /// non looping animation is done
    pub fn frame_rect(&self) -> Rect {
        let index = self.current_frame().min(self.geometry.frame_count - 1);
        self.geometry.frame_rect(index)
    }

    pub fn draw_frame(&mut self, clock_tick: f32, renderer: &dyn Blit, x: f32, y: f32) {
        self.advance(clock_tick);
        let destination = Rect::new(
            x,
            y,
            self.geometry.frame_width * self.scale,
            self.geometry.frame_height * self.scale,
        );
        renderer.draw_image(&self.sprite_sheet, &self.frame_rect(), &destination);
    }

    /// Swaps the image only, timing and geometry stay
    pub fn set_sprite_sheet(&mut self, sprite_sheet: ImageHandle) {
        self.sprite_sheet = sprite_sheet;
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn frame_duration(&self) -> f32 {
        self.frame_duration
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

#[cfg(test)]
impl Animation {
    pub fn sprite_sheet(&self) -> &ImageHandle {
        &self.sprite_sheet
    }

    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }
}

// ==================== Sprite book ====================
mod paths {
    pub const FOOD: &str = "img/food/spritesheet.png";
    pub const TOMB: &str = "img/tomb.png";
}

pub const CHARACTER_COUNT: usize = 4;

/// Every image an entity may need after the level is built
/// - persons spawn offspring with a random character
/// - persons leave tombs, food re-rolls its frame
#[derive(Debug, Clone)]
pub struct Sprites {
    pub characters: Vec<Rc<CharacterSheets>>,
    pub food: ImageHandle,
    pub tomb: ImageHandle,
}

impl Sprites {
    pub fn load(assets: &dyn AssetSource) -> Result<Self> {
        let characters = (1..=CHARACTER_COUNT)
            .map(|number| {
                CharacterSheets::load(assets, number)
                    .map(Rc::new)
                    .with_context(|| format!("Failed to load character {}", number))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Sprites {
            characters,
            food: assets.get_asset(paths::FOOD)?,
            tomb: assets.get_asset(paths::TOMB)?,
        })
    }

    pub fn asset_paths() -> Vec<String> {
        let mut all: Vec<String> = (1..=CHARACTER_COUNT)
            .flat_map(CharacterSheets::asset_paths)
            .collect();
        all.push(paths::FOOD.to_string());
        all.push(paths::TOMB.to_string());
        all
    }

    /// `Some(index)` picks that character, `None` (or an unknown index) rolls one
    pub fn character(&self, index: Option<usize>, rng: &mut dyn RngCore) -> Rc<CharacterSheets> {
        match index.and_then(|i| self.characters.get(i)) {
            Some(sheets) => sheets.clone(),
            None => {
                let roll = rng.gen_range(0..self.characters.len());
                self.characters[roll].clone()
            }
        }
    }
}
