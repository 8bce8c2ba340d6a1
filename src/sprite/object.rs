use crate::engine::{Blit, ImageHandle, Point, Rect, Size};
use crate::entity::{Entity, Kind, UpdateContext};
use crate::sprite::{Animation, FrameGeometry};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Horizontal travel direction, screen x grows to the right
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

// ==================== NonAnimatedObject ====================
pub enum FrameChoice {
    Index(usize),
    Random,
}

/// One fixed frame of a sprite sheet, picked once at construction
#[derive(Debug, Clone)]
pub struct NonAnimatedObject {
    sprite_sheet: ImageHandle,
    position: Point,
    frame: Rect,
    size: Size,
    scale: f32,
}

impl NonAnimatedObject {
    pub fn new(
        sprite_sheet: ImageHandle,
        position: Point,
        geometry: FrameGeometry,
        choice: FrameChoice,
        scale: f32,
        rng: &mut dyn RngCore,
    ) -> Self {
        let index = match choice {
            FrameChoice::Index(index) => index,
            FrameChoice::Random => rng.gen_range(0..geometry.frame_count),
        };
        NonAnimatedObject {
            sprite_sheet,
            position,
            frame: geometry.frame_rect(index),
            size: Size {
                width: geometry.frame_width,
                height: geometry.frame_height,
            },
            scale,
        }
    }

    /// The whole image as its only frame, drawn at natural size
    pub fn whole(sprite_sheet: ImageHandle, position: Point) -> Self {
        let geometry = FrameGeometry::single(&sprite_sheet);
        NonAnimatedObject {
            sprite_sheet,
            position,
            frame: geometry.frame_rect(0),
            size: Size {
                width: geometry.frame_width,
                height: geometry.frame_height,
            },
            scale: 1.0,
        }
    }

    /// Destination size before scaling, the source frame is unchanged
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Size { width, height };
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_y(&mut self, y: f32) {
        self.position.y = y;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn draw(&self, renderer: &dyn Blit) {
        let destination = Rect::new(
            self.position.x,
            self.position.y,
            self.size.width * self.scale,
            self.size.height * self.scale,
        );
        renderer.draw_image(&self.sprite_sheet, &self.frame, &destination);
    }
}

impl Entity for NonAnimatedObject {
    fn update(&mut self, _ctx: &mut UpdateContext) {}

    fn draw(&mut self, renderer: &dyn Blit, _clock_tick: f32) {
        NonAnimatedObject::draw(self, renderer);
    }

    fn kind(&self) -> Kind {
        Kind::Scenery
    }

    fn position(&self) -> Point {
        self.position
    }
}

// ==================== AnimatedObject ====================
/// Animation + horizontal motion with screen wrap
/// - size is the hit box, reset to the frame size whenever the animation is
///   replaced
#[derive(Debug, Clone)]
pub struct AnimatedObject {
    animation: Animation,
    position: Point,
    size: Size,
    speed: f32,
    direction: Direction,
}

impl AnimatedObject {
    pub fn new(animation: Animation, position: Point) -> Self {
        let geometry = animation.geometry();
        AnimatedObject {
            animation,
            position,
            size: Size {
                width: geometry.frame_width,
                height: geometry.frame_height,
            },
            speed: 0.0,
            direction: Direction::Right,
        }
    }

    pub fn set_speed(&mut self, speed: f32, direction: Direction) {
        self.speed = speed.max(0.0);
        self.direction = direction;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Moves by speed * direction and wraps around the horizontal world edges
    /// ┌──────────── Wrap ──────────────────┐
    /// │ x > world_width  -> x = -width     │
    /// │ x < -width       -> x = world_width│
    /// └────────────────────────────────────┘
    pub fn update(&mut self, clock_tick: f32, world_width: f32) {
        self.position.x += clock_tick * self.speed * self.direction.sign();
        if self.position.x > world_width {
            self.position.x = -self.size.width;
        } else if self.position.x < -self.size.width {
            self.position.x = world_width;
        }
    }

    pub fn draw(&mut self, renderer: &dyn Blit, clock_tick: f32) {
        self.animation
            .draw_frame(clock_tick, renderer, self.position.x, self.position.y);
    }

    /// New sheet + geometry, keeps the current scale
    pub fn replace_animation(
        &mut self,
        sprite_sheet: ImageHandle,
        geometry: FrameGeometry,
        frame_duration: f32,
        looping: bool,
    ) {
        self.animation = Animation::new(
            sprite_sheet,
            geometry,
            frame_duration,
            looping,
            self.animation.scale(),
        );
        self.size = Size {
            width: geometry.frame_width,
            height: geometry.frame_height,
        };
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl Entity for AnimatedObject {
    fn update(&mut self, ctx: &mut UpdateContext) {
        AnimatedObject::update(self, ctx.clock_tick, ctx.world_width);
    }

    fn draw(&mut self, renderer: &dyn Blit, clock_tick: f32) {
        AnimatedObject::draw(self, renderer, clock_tick);
    }

    fn kind(&self) -> Kind {
        Kind::Scenery
    }

    fn position(&self) -> Point {
        self.position
    }
}

#[cfg(test)]
impl NonAnimatedObject {
    pub fn frame(&self) -> Rect {
        self.frame
    }
}
