use crate::engine::{Blit, ImageHandle, Point, Rect};
use crate::entity::{Entity, Kind, UpdateContext};
use crate::sprite::{AnimatedObject, Animation, FrameGeometry};

/// Animated doorway that launches persons upward
/// - never moves, only the animation runs
/// - the trigger box is a small window low in the middle of the frame
#[derive(Debug)]
pub struct Portal {
    body: AnimatedObject,
    collise_box: Rect,
}

impl Portal {
    pub fn new(
        sprite_sheet: ImageHandle,
        position: Point,
        sheet_width: usize,
        frame_duration: f32,
        frames: usize,
        looping: bool,
        scale: f32,
    ) -> Self {
        let sheet_width = sheet_width.max(1);
        let rows = (frames as f32 / sheet_width as f32).ceil().max(1.0);
        let frame_width = sprite_sheet.width / sheet_width as f32;
        let frame_height = sprite_sheet.height / rows;
        let geometry = FrameGeometry::new(frame_width, frame_height, sheet_width, frames);
        let animation = Animation::new(sprite_sheet, geometry, frame_duration, looping, scale);

        Portal {
            body: AnimatedObject::new(animation, position),
            collise_box: Rect::new(
                frame_width / 3.0 + position.x,
                frame_height / 1.5 + position.y,
                frame_width / 4.0,
                frame_height / 3.0,
            ),
        }
    }

    pub fn collision_box(&self) -> Rect {
        self.collise_box
    }
}

impl Entity for Portal {
    fn update(&mut self, _ctx: &mut UpdateContext) {}

    fn draw(&mut self, renderer: &dyn Blit, clock_tick: f32) {
        self.body.draw(renderer, clock_tick);
    }

    fn kind(&self) -> Kind {
        Kind::Portal
    }

    fn position(&self) -> Point {
        self.body.position()
    }
}

#[cfg(test)]
impl Portal {
    pub fn animation(&self) -> &Animation {
        self.body.animation()
    }
}
