use crate::engine::{Blit, Point, Rect, Size};
use crate::entity::{Entity, Fall, Kind, UpdateContext};
use crate::sprite::state::{CharacterSheets, Side, Status};
use crate::sprite::{AnimatedObject, Animation, Direction, Tomb};
use rand::Rng;
use std::rc::Rc;

// life consts, in seconds
const FULL_LIFE: f32 = 15.0;
const REPRODUCE_LIFE: f32 = 8.0;

// offspring consts
const OFFSPRING_FRAME_DURATION: f32 = 0.1;
const OFFSPRING_SPEED: f32 = 200.0;

// portal launch : -(floor(r * SPREAD) + MIN), negative because top left is origin
const PORTAL_LAUNCH_MIN: f32 = 500.0;
const PORTAL_LAUNCH_SPREAD: f32 = 1000.0;

// ground hit box : a thin strip around the feet
const FEET_OFFSET: f32 = 5.0;
const FEET_HEIGHT: f32 = 7.0;

/// A person walks, falls, eats, breeds and dies
/// - life counts down in real seconds, food refills it
/// - a person that eats while healthy leaves an offspring walking the
///   other way
/// - when life runs out the person is removed and a tomb drops in its place
#[derive(Debug)]
pub struct Person {
    body: AnimatedObject,
    status: Status,
    life: f32,
    sheets: Rc<CharacterSheets>,
    side: Side,
    fall: Fall,
    ground_hit_box: Rect,
    collise_box: Rect,
    removed: bool,
}

impl Person {
    pub fn new(sheets: Rc<CharacterSheets>, position: Point, frame_duration: f32, scale: f32) -> Self {
        let status = Status::Stand;
        let side = Side::Right;
        let sheet = sheets.sheet(side, status).clone();
        let geometry = status.geometry(&sheet);
        let animation = Animation::new(sheet, geometry, frame_duration, true, scale);
        let mut person = Person {
            body: AnimatedObject::new(animation, position),
            status,
            life: FULL_LIFE,
            sheets,
            side,
            fall: Fall::new(0.0),
            ground_hit_box: Rect::default(),
            collise_box: Rect::default(),
            removed: false,
        };
        person.refresh_boxes();
        person
    }

    /// No-op when already in `status`, otherwise swaps sheet and geometry
    /// keeping frame duration, scale and looping
    pub fn change_status(&mut self, status: Status) {
        if self.status == status {
            return;
        }
        self.status = status;
        let sheet = self.sheets.sheet(self.side, status).clone();
        let geometry = status.geometry(&sheet);
        let frame_duration = self.body.animation().frame_duration();
        self.body
            .replace_animation(sheet, geometry, frame_duration, true);
    }

    /// Turn around : the sheet set follows the travel direction
    pub fn flip(&mut self) {
        let direction = self.body.direction().reversed();
        self.side = match direction {
            Direction::Left => Side::Left,
            Direction::Right => Side::Right,
        };
        self.body.set_direction(direction);
        let sheet = self.sheets.sheet(self.side, self.status).clone();
        self.body.animation_mut().set_sprite_sheet(sheet);
    }

    pub fn set_speed(&mut self, speed: f32, direction: Direction) {
        self.body.set_speed(speed, direction);
    }

    pub fn set_y_velocity(&mut self, y_velocity: f32) {
        self.fall.y_velocity = y_velocity;
    }

    pub fn set_position(&mut self, position: Point) {
        self.body.set_position(position);
        self.refresh_boxes();
    }

    fn refresh_boxes(&mut self) {
        let Point { x, y } = self.body.position();
        let Size { width, height } = self.body.size();
        self.ground_hit_box = Rect::new(x, y + height - FEET_OFFSET, width, FEET_HEIGHT);
        self.collise_box = self.body.bounding_box();
    }

    fn age(&mut self, ctx: &mut UpdateContext) {
        if self.life > 0.0 {
            self.life -= ctx.clock_tick;
        }
        if self.life < 0.0 {
            self.removed = true;
            log::debug!("person died at {:?}", self.body.position());
            let tomb = Tomb::new(ctx.sprites.tomb.clone(), self.body.position());
            ctx.add_entity(Box::new(tomb));
        }
    }

    /// At most one food per tick, first in food list order wins
    fn eat(&mut self, ctx: &mut UpdateContext) {
        let food = ctx.food;
        for item in food.iter() {
            let mut item = item.borrow_mut();
            if !item.is_active() || !self.collise_box.intersects(&item.collision_box()) {
                continue;
            }
            item.deactivate();
            self.life = FULL_LIFE;

            if self.life >= REPRODUCE_LIFE {
                let sheets = ctx.sprites.character(None, &mut *ctx.rng);
                let mut child = Person::new(
                    sheets,
                    self.body.position(),
                    OFFSPRING_FRAME_DURATION,
                    1.0,
                );
                child.change_status(Status::Walk);
                child.set_speed(OFFSPRING_SPEED, self.body.direction());
                child.flip();
                ctx.add_entity(Box::new(child));
                break;
            }
        }
    }

    fn enter_portals(&mut self, ctx: &mut UpdateContext) {
        let portals = ctx.portals;
        for portal in portals.iter() {
            if !self.collise_box.intersects(portal) {
                continue;
            }
            let launch = (ctx.rng.gen::<f32>() * PORTAL_LAUNCH_SPREAD + PORTAL_LAUNCH_MIN).floor();
            self.fall.y_velocity = -launch;
            // floor of a [0, 1) roll is always 0, so this always turns around
            let roll = ctx.rng.gen::<f32>().floor();
            if roll == 0.0 {
                self.flip();
            }
        }
    }

    /// Unknown status indices are ignored, the person keeps its state
    pub fn change_status_index(&mut self, index: usize) {
        if let Some(status) = Status::from_index(index) {
            self.change_status(status);
        }
    }
}

#[cfg(test)]
impl Person {
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    pub fn set_life(&mut self, life: f32) {
        self.life = life;
    }

    pub fn gravity(&self) -> bool {
        self.fall.gravity
    }

    pub fn y_velocity(&self) -> f32 {
        self.fall.y_velocity
    }

    pub fn direction(&self) -> Direction {
        self.body.direction()
    }

    pub fn size(&self) -> Size {
        self.body.size()
    }

    pub fn animation(&self) -> &Animation {
        self.body.animation()
    }
}

impl Entity for Person {
    /// ┌──────────────── Update order ──────────────────┐
    /// │ 1. move + wrap                                 │
    /// │ 2. age, maybe die (drops a tomb)               │
    /// │ 3. refresh hit boxes                           │
    /// │ 4. eat (maybe breed)                           │
    /// │ 5. portals launch upward                       │
    /// │ 6. land on ground (only while not rising)      │
    /// │ 7. otherwise airborne                          │
    /// └────────────────────────────────────────────────┘
    fn update(&mut self, ctx: &mut UpdateContext) {
        self.body.update(ctx.clock_tick, ctx.world_width);
        self.age(ctx);
        self.refresh_boxes();
        self.eat(ctx);
        self.enter_portals(ctx);

        if let Some(ground) = self.fall.landing(&self.ground_hit_box, ctx.ground) {
            let y = ground.y - self.body.size().height;
            let x = self.body.position().x;
            self.body.set_position(Point { x, y });
            self.change_status(Status::Walk);
            self.fall.gravity = false;
            return;
        }
        self.change_status(Status::Jump);
        self.fall.gravity = true;
    }

    fn draw(&mut self, renderer: &dyn Blit, clock_tick: f32) {
        self.body.draw(renderer, clock_tick);
    }

    fn kind(&self) -> Kind {
        Kind::Person
    }

    fn position(&self) -> Point {
        self.body.position()
    }

    fn is_removed(&self) -> bool {
        self.removed
    }

    fn integrate(&mut self, gravity: f32, clock_tick: f32) {
        let mut position = self.body.position();
        self.fall.integrate(&mut position.y, gravity, clock_tick);
        self.body.set_position(position);
    }
}
