use crate::engine::{Blit, ImageHandle, Point, Rect};
use crate::entity::{Entity, Fall, Kind, UpdateContext};
use crate::sprite::NonAnimatedObject;

// pops up a little before falling, negative because top left is origin
const LAUNCH_VELOCITY: f32 = -400.0;
// hit box under the headstone
const BOX_OFFSET: f32 = 33.0;
const BOX_WIDTH: f32 = 40.0;
const SPAWN_BOX_HEIGHT: f32 = 10.0;
const FALLING_BOX_HEIGHT: f32 = 5.0;

/// Headstone left where a person died
/// - falls until it first touches a ground box, then stays forever
#[derive(Debug)]
pub struct Tomb {
    image: NonAnimatedObject,
    fall: Fall,
    collise_box: Rect,
}

impl Tomb {
    pub fn new(sprite_sheet: ImageHandle, position: Point) -> Self {
        Tomb {
            image: NonAnimatedObject::whole(sprite_sheet, position),
            fall: Fall::new(LAUNCH_VELOCITY),
            collise_box: Rect::new(
                position.x,
                position.y + BOX_OFFSET,
                BOX_WIDTH,
                SPAWN_BOX_HEIGHT,
            ),
        }
    }
}

impl Entity for Tomb {
    fn update(&mut self, ctx: &mut UpdateContext) {
        if !self.fall.gravity {
            return;
        }
        let Point { x, y } = self.image.position();
        self.collise_box = Rect::new(x, y + BOX_OFFSET, BOX_WIDTH, FALLING_BOX_HEIGHT);

        if let Some(ground) = self.fall.landing(&self.collise_box, ctx.ground) {
            self.image.set_y(ground.y - self.image.size().height);
            self.fall.gravity = false;
            log::debug!("tomb landed at {:?}", self.image.position());
        }
    }

    fn draw(&mut self, renderer: &dyn Blit, _clock_tick: f32) {
        self.image.draw(renderer);
    }

    fn kind(&self) -> Kind {
        Kind::Tomb
    }

    fn position(&self) -> Point {
        self.image.position()
    }

    fn integrate(&mut self, gravity: f32, clock_tick: f32) {
        let mut y = self.image.position().y;
        self.fall.integrate(&mut y, gravity, clock_tick);
        self.image.set_y(y);
    }
}

#[cfg(test)]
impl Tomb {
    pub fn is_falling(&self) -> bool {
        self.fall.gravity
    }

    pub fn y_velocity(&self) -> f32 {
        self.fall.y_velocity
    }

    pub fn collision_box(&self) -> Rect {
        self.collise_box
    }
}
