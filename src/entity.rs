use crate::engine::{Blit, Point, Rect};
use crate::sprite::{FoodHandle, Sprites};
use rand::RngCore;

/// What an entity is, for draw-order independent queries
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Kind {
    Scenery,
    Person,
    Food,
    Portal,
    Tomb,
}

/// Contract between the world and everything placed in it
/// ┌──────────────── One tick ────────────────────────────────┐
/// │ update(ctx)        every live entity, list order         │
/// │ integrate(g, dt)   bodies that fall                      │
/// │ draw(renderer, dt) every live entity, list order         │
/// │ is_removed()       swept at the end of the tick          │
/// └──────────────────────────────────────────────────────────┘
pub trait Entity {
    fn update(&mut self, ctx: &mut UpdateContext);
    fn draw(&mut self, renderer: &dyn Blit, clock_tick: f32);
    fn kind(&self) -> Kind;
    fn position(&self) -> Point;

    fn is_removed(&self) -> bool {
        false
    }

    /// Vertical integration, only entities with a [`Fall`] override this
    fn integrate(&mut self, _gravity: f32, _clock_tick: f32) {}
}

/// Vertical motion of a body that can rest on the ground
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fall {
    pub gravity: bool,
    pub y_velocity: f32,
}

impl Fall {
    pub fn new(y_velocity: f32) -> Self {
        Fall {
            gravity: true,
            y_velocity,
        }
    }

    /// Semi implicit euler while gravity is on, a resting body loses its
    /// vertical velocity
    pub fn integrate(&mut self, y: &mut f32, gravity: f32, clock_tick: f32) {
        if self.gravity {
            self.y_velocity += gravity * clock_tick;
            *y += self.y_velocity * clock_tick;
        } else {
            self.y_velocity = 0.0;
        }
    }

    /// First ground box hit while not moving upward
    pub fn landing<'g>(&self, hit_box: &Rect, ground: &'g [Rect]) -> Option<&'g Rect> {
        if self.y_velocity < 0.0 {
            return None;
        }
        ground.iter().find(|ground_box| hit_box.intersects(ground_box))
    }
}

/// Shared world state handed to each entity during its update
/// - the slices are read only views owned by the world
/// - entities never push into the world directly, spawns are queued here and
///   appended once every entity has been updated
pub struct UpdateContext<'a> {
    pub clock_tick: f32,
    pub world_width: f32,
    pub ground: &'a [Rect],
    pub food: &'a [FoodHandle],
    pub portals: &'a [Rect],
    pub sprites: &'a Sprites,
    pub rng: &'a mut dyn RngCore,
    spawned: Vec<Box<dyn Entity>>,
}

impl<'a> UpdateContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clock_tick: f32,
        world_width: f32,
        ground: &'a [Rect],
        food: &'a [FoodHandle],
        portals: &'a [Rect],
        sprites: &'a Sprites,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        UpdateContext {
            clock_tick,
            world_width,
            ground,
            food,
            portals,
            sprites,
            rng,
            spawned: Vec::new(),
        }
    }

    pub fn add_entity(&mut self, entity: Box<dyn Entity>) {
        log::debug!("spawn {:?} at {:?}", entity.kind(), entity.position());
        self.spawned.push(entity);
    }

    pub fn into_spawned(self) -> Vec<Box<dyn Entity>> {
        self.spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn falling_body_accelerates() {
        let mut fall = Fall::new(0.0);
        let mut y = 0.0;
        fall.integrate(&mut y, 1000.0, 0.5);
        assert_relative_eq!(fall.y_velocity, 500.0);
        assert_relative_eq!(y, 250.0);
    }

    #[test]
    fn resting_body_does_not_move() {
        let mut fall = Fall {
            gravity: false,
            y_velocity: 300.0,
        };
        let mut y = 40.0;
        fall.integrate(&mut y, 1000.0, 0.5);
        assert_relative_eq!(fall.y_velocity, 0.0);
        assert_relative_eq!(y, 40.0);
    }

    #[test]
    fn rising_body_never_lands() {
        let ground = [Rect::new(0.0, 100.0, 90.0, 20.0)];
        let hit_box = Rect::new(10.0, 95.0, 40.0, 7.0);
        assert!(Fall::new(-1.0).landing(&hit_box, &ground).is_none());
        assert_eq!(Fall::new(0.0).landing(&hit_box, &ground), Some(&ground[0]));
    }

    #[test]
    fn landing_picks_first_box_in_list_order() {
        let ground = [
            Rect::new(0.0, 200.0, 90.0, 20.0),
            Rect::new(0.0, 100.0, 90.0, 20.0),
            Rect::new(0.0, 98.0, 90.0, 20.0),
        ];
        let hit_box = Rect::new(10.0, 95.0, 40.0, 7.0);
        assert_eq!(Fall::new(10.0).landing(&hit_box, &ground), Some(&ground[1]));
    }
}
