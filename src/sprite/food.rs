use crate::engine::{Blit, ImageHandle, Point, Rect};
use crate::entity::{Entity, Kind, UpdateContext};
use crate::sprite::{FrameChoice, FrameGeometry, NonAnimatedObject};
use rand::RngCore;
use std::cell::RefCell;
use std::rc::Rc;

// food sheet : 4 dishes of 33 x 34 in one row
const FRAME_WIDTH: f32 = 33.0;
const FRAME_HEIGHT: f32 = 34.0;
const SHEET_WIDTH: usize = 4;
const FRAME_COUNT: usize = 4;

const BOX_SIZE: f32 = 30.0;
const COOLDOWN: f32 = 5.0;

/// Food is drawn as an entity and eaten by persons, both hold it
pub type FoodHandle = Rc<RefCell<Food>>;

/// A dish that disappears when eaten and comes back, with a freshly rolled
/// frame, once its cooldown runs out
#[derive(Debug)]
pub struct Food {
    position: Point,
    sprite_sheet: ImageHandle,
    active: bool,
    cooldown: f32,
    collise_box: Rect,
    dish: NonAnimatedObject,
}

impl Food {
    pub fn new(sprite_sheet: ImageHandle, position: Point, rng: &mut dyn RngCore) -> Self {
        let dish = Self::roll_dish(&sprite_sheet, position, rng);
        Food {
            position,
            sprite_sheet,
            active: true,
            cooldown: 0.0,
            collise_box: Rect::new(position.x, position.y, BOX_SIZE, BOX_SIZE),
            dish,
        }
    }

    pub fn into_handle(self) -> FoodHandle {
        Rc::new(RefCell::new(self))
    }

    fn roll_dish(sprite_sheet: &ImageHandle, position: Point, rng: &mut dyn RngCore) -> NonAnimatedObject {
        NonAnimatedObject::new(
            sprite_sheet.clone(),
            position,
            FrameGeometry::new(FRAME_WIDTH, FRAME_HEIGHT, SHEET_WIDTH, FRAME_COUNT),
            FrameChoice::Random,
            1.0,
            rng,
        )
    }

    /// Back on the table with a freshly picked dish
    pub fn activate(&mut self, rng: &mut dyn RngCore) {
        self.active = true;
        self.dish = Self::roll_dish(&self.sprite_sheet, self.position, rng);
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.cooldown = COOLDOWN;
    }

    pub fn update(&mut self, clock_tick: f32, rng: &mut dyn RngCore) {
        if self.cooldown > 0.0 {
            self.cooldown -= clock_tick;
        }
        if self.cooldown < 0.0 {
            self.cooldown = 0.0;
        }
        if self.cooldown <= 0.0 && !self.active {
            self.activate(rng);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn collision_box(&self) -> Rect {
        self.collise_box
    }
}

impl Entity for FoodHandle {
    fn update(&mut self, ctx: &mut UpdateContext) {
        self.borrow_mut().update(ctx.clock_tick, &mut *ctx.rng);
    }

    fn draw(&mut self, renderer: &dyn Blit, _clock_tick: f32) {
        let food = self.borrow();
        if food.active {
            food.dish.draw(renderer);
        }
    }

    fn kind(&self) -> Kind {
        Kind::Food
    }

    fn position(&self) -> Point {
        self.borrow().position
    }
}

#[cfg(test)]
impl Food {
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn dish(&self) -> &NonAnimatedObject {
        &self.dish
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{self, RecordingBlit};
    use approx::assert_relative_eq;

    fn dish() -> Food {
        let sheet = ImageHandle::new("img/food/spritesheet.png", 132.0, 34.0);
        Food::new(sheet, Point { x: 450.0, y: 80.0 }, &mut testutils::rng())
    }

    #[test]
    fn starts_active_with_fixed_box() {
        let food = dish();
        assert!(food.is_active());
        assert_relative_eq!(food.cooldown(), 0.0);
        assert_eq!(food.collision_box(), Rect::new(450.0, 80.0, 30.0, 30.0));
    }

    #[test]
    fn reactivates_once_after_cooldown() {
        let mut rng = testutils::rng();
        let mut food = dish();
        food.deactivate();
        assert_relative_eq!(food.cooldown(), 5.0);

        let mut activations = 0;
        let mut was_active = food.is_active();
        // 20 x 0.25 s = 5 s exactly, then keep ticking
        for _ in 0..40 {
            food.update(0.25, &mut rng);
            if food.is_active() && !was_active {
                activations += 1;
            }
            was_active = food.is_active();
        }
        assert_eq!(activations, 1);
        assert!(food.is_active());
        assert_relative_eq!(food.cooldown(), 0.0);
    }

    #[test]
    fn still_inactive_before_cooldown_ends() {
        let mut rng = testutils::rng();
        let mut food = dish();
        food.deactivate();
        for _ in 0..19 {
            food.update(0.25, &mut rng);
        }
        assert!(!food.is_active());
        assert_relative_eq!(food.cooldown(), 0.25);
    }

    #[test]
    fn cooldown_clamps_at_zero() {
        let mut rng = testutils::rng();
        let mut food = dish();
        food.deactivate();
        food.update(7.5, &mut rng);
        assert_relative_eq!(food.cooldown(), 0.0);
        assert!(food.is_active());
    }

    #[test]
    fn inactive_food_is_not_drawn() {
        let mut handle = dish().into_handle();
        let blit = RecordingBlit::default();
        handle.draw(&blit, 0.016);
        assert_eq!(blit.draws().len(), 1);

        handle.borrow_mut().deactivate();
        handle.draw(&blit, 0.016);
        assert_eq!(blit.draws().len(), 1);
    }

    #[test]
    fn dish_is_one_cell_of_the_sheet() {
        let food = dish();
        let frame = food.dish().frame();
        assert_relative_eq!(frame.width, 33.0);
        assert_relative_eq!(frame.height, 34.0);
        assert!(frame.right() <= 132.0);
    }
}
