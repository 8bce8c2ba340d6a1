use crate::browser;
use crate::config::GameConfig;
use crate::engine::{AssetManager, Blit, Canvas, Game, Rect, Renderer, Size};
use crate::entity::{Entity, UpdateContext};
#[cfg(test)]
use crate::entity::Kind;
use crate::level;
use crate::sprite::{Food, FoodHandle, Portal, Sprites};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::RngCore;

/// TABLE
/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌─────────────┐    │
/// │    │  engine.rs  │  update  │   game.rs   │   tick   │   World     │    │
/// │    │  GameLoop   ├─────────►│ PortalPeople├─────────►│  entities   │    │
/// │    │  raf loop   │          │             │          │  ground     │    │
/// │    └─────────────┘          └─────────────┘          │  food       │    │
/// │                                                      │  portals    │    │
/// │                                                      └─────────────┘    │
/// ├──────────────────────── Call Sequence ──────────────────────────────────┤
/// │  1. GameLoop measures clock_tick (capped)                               │
/// │  2. World::tick                                                         │
/// │     ├─► update every entity in list order                               │
/// │     ├─► integrate gravity                                               │
/// │     ├─► append spawned entities                                         │
/// │     └─► sweep removed entities                                          │
/// │  3. World::draw, list order is back to front                            │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum PortalPeople {
    /// Config is known, images are not loaded yet
    Loading(GameConfig),
    /// Level built, the world is running
    Loaded(Colony),
}

impl PortalPeople {
    pub fn new(config: GameConfig) -> Self {
        PortalPeople::Loading(config)
    }
}

pub struct Colony {
    world: World,
    assets: AssetManager,
}

#[async_trait(?Send)]
impl Game for PortalPeople {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            PortalPeople::Loading(config) => {
                let mut assets = AssetManager::new();
                for path in level::asset_paths() {
                    assets.queue_download(&path);
                }
                log::info!("Downloading {} images", assets.queued());
                assets.download_all().await;

                let (width, height) = browser::canvas_size()?;
                let world = level::build_world(
                    config,
                    Size { width, height },
                    &assets,
                    config.rng(),
                )?;
                Ok(Box::new(PortalPeople::Loaded(Colony { world, assets })))
            }
            PortalPeople::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, clock_tick: f32) {
        if let PortalPeople::Loaded(colony) = self {
            colony.world.tick(clock_tick);
        }
    }

    fn draw(&mut self, renderer: &Renderer, clock_tick: f32) {
        if let PortalPeople::Loaded(colony) = self {
            let canvas = Canvas::new(renderer, &colony.assets);
            let size = colony.world.size();
            canvas.clear(&Rect::new(0.0, 0.0, size.width, size.height));
            colony.world.draw(&canvas, clock_tick);
        }
    }
}

// ==================== World ====================
/// Owns everything in play
/// - `entities` is the draw list, back to front
/// - `ground`, `food` and `portals` are the collision views persons read
pub struct World {
    size: Size,
    gravity: f32,
    entities: Vec<Box<dyn Entity>>,
    ground: Vec<Rect>,
    food: Vec<FoodHandle>,
    portals: Vec<Rect>,
    sprites: Sprites,
    rng: SmallRng,
}

impl World {
    pub fn new(size: Size, gravity: f32, sprites: Sprites, rng: SmallRng) -> Self {
        World {
            size,
            gravity,
            entities: Vec::new(),
            ground: Vec::new(),
            food: Vec::new(),
            portals: Vec::new(),
            sprites,
            rng,
        }
    }

    pub fn add_entity(&mut self, entity: Box<dyn Entity>) {
        self.entities.push(entity);
    }

    pub fn add_ground(&mut self, ground_box: Rect) {
        self.ground.push(ground_box);
    }

    /// Food is drawn like any entity and also listed for persons to eat
    pub fn add_food(&mut self, food: Food) {
        let handle = food.into_handle();
        self.food.push(handle.clone());
        self.entities.push(Box::new(handle));
    }

    pub fn add_portal(&mut self, portal: Portal) {
        self.portals.push(portal.collision_box());
        self.entities.push(Box::new(portal));
    }

    /// One simulation step of `clock_tick` seconds
    pub fn tick(&mut self, clock_tick: f32) {
        let World {
            size,
            gravity,
            entities,
            ground,
            food,
            portals,
            sprites,
            rng,
        } = self;

        let mut ctx = UpdateContext::new(
            clock_tick,
            size.width,
            ground.as_slice(),
            food.as_slice(),
            portals.as_slice(),
            sprites,
            rng,
        );
        for entity in entities.iter_mut() {
            entity.update(&mut ctx);
        }
        for entity in entities.iter_mut() {
            entity.integrate(*gravity, clock_tick);
        }
        entities.extend(ctx.into_spawned());

        let before = entities.len();
        entities.retain(|entity| !entity.is_removed());
        if entities.len() != before {
            log::debug!("swept {} entities", before - entities.len());
        }
    }

    pub fn draw(&mut self, renderer: &dyn Blit, clock_tick: f32) {
        for entity in self.entities.iter_mut() {
            entity.draw(renderer, clock_tick);
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn ground(&self) -> &[Rect] {
        &self.ground
    }

    pub fn sprites(&self) -> &Sprites {
        &self.sprites
    }

    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    pub fn sprites_and_rng(&mut self) -> (&Sprites, &mut dyn RngCore) {
        (&self.sprites, &mut self.rng)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
impl World {
    pub fn count(&self, kind: Kind) -> usize {
        self.entities
            .iter()
            .filter(|entity| entity.kind() == kind)
            .count()
    }

    pub fn food(&self) -> &[FoodHandle] {
        &self.food
    }

    pub fn portals(&self) -> &[Rect] {
        &self.portals
    }

    pub fn positions(&self, kind: Kind) -> Vec<crate::engine::Point> {
        self.entities
            .iter()
            .filter(|entity| entity.kind() == kind)
            .map(|entity| entity.position())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ImageHandle, Point};
    use crate::sprite::{Direction, Person, Status};
    use crate::testutils::{self, RecordingBlit};
    use approx::assert_relative_eq;

    const SIZE: Size = Size {
        width: 1200.0,
        height: 700.0,
    };
    const GRAVITY: f32 = 1800.0;

    fn empty_world() -> World {
        World::new(SIZE, GRAVITY, testutils::sprites(), testutils::rng())
    }

    fn person(world: &World, x: f32, y: f32) -> Person {
        let sheets = world.sprites().characters[1].clone();
        let mut person = Person::new(sheets, Point { x, y }, 0.1, 1.0);
        person.change_status(Status::Walk);
        person
    }

    #[test]
    fn dead_person_is_swept_and_tomb_stays() {
        let mut world = empty_world();
        let mut dying = person(&world, 100.0, 100.0);
        dying.set_life(0.01);
        world.add_entity(Box::new(dying));

        world.tick(0.02);
        assert_eq!(world.count(Kind::Person), 0);
        assert_eq!(world.count(Kind::Tomb), 1);

        for _ in 0..10 {
            world.tick(0.02);
        }
        assert_eq!(world.count(Kind::Tomb), 1);
    }

    #[test]
    fn eating_person_breeds_into_the_world() {
        let mut world = empty_world();
        world.add_food(Food::new(
            world.sprites().food.clone(),
            Point { x: 110.0, y: 120.0 },
            &mut testutils::rng(),
        ));
        let mut hungry = person(&world, 100.0, 100.0);
        hungry.set_life(3.0);
        hungry.set_speed(200.0, Direction::Right);
        world.add_entity(Box::new(hungry));

        world.tick(0.016);

        assert_eq!(world.count(Kind::Person), 2);
        assert!(!world.food()[0].borrow().is_active());
    }

    #[test]
    fn offspring_walks_away_from_parent() {
        let mut world = empty_world();
        world.add_food(Food::new(
            world.sprites().food.clone(),
            Point { x: 110.0, y: 120.0 },
            &mut testutils::rng(),
        ));
        let mut parent = person(&world, 100.0, 100.0);
        parent.set_speed(200.0, Direction::Right);
        world.add_entity(Box::new(parent));

        world.tick(0.016);
        let born = world.positions(Kind::Person);
        assert_eq!(born.len(), 2);
        // the child starts where the parent stood after moving
        assert_relative_eq!(born[1].x, born[0].x);

        world.tick(0.05);
        let walked = world.positions(Kind::Person);
        assert_relative_eq!(walked[0].x, born[0].x + 200.0 * 0.05, epsilon = 1e-3);
        assert_relative_eq!(walked[1].x, born[1].x - 200.0 * 0.05, epsilon = 1e-3);
    }

    #[test]
    fn spawns_skip_gravity_on_their_first_tick() {
        let mut world = empty_world();
        let mut dying = person(&world, 100.0, 100.0);
        dying.set_life(0.01);
        world.add_entity(Box::new(dying));

        world.tick(0.02);
        assert_eq!(world.positions(Kind::Tomb), vec![Point { x: 100.0, y: 100.0 }]);

        world.tick(0.02);
        // launched upward at 400 px/s
        assert!(world.positions(Kind::Tomb)[0].y < 100.0);
    }

    #[test]
    fn eaten_food_comes_back_after_cooldown() {
        let mut world = empty_world();
        world.add_food(Food::new(
            world.sprites().food.clone(),
            Point { x: 110.0, y: 120.0 },
            &mut testutils::rng(),
        ));
        world.food()[0].borrow_mut().deactivate();
        for _ in 0..24 {
            world.tick(0.25);
        }
        assert!(world.food()[0].borrow().is_active());
    }

    #[test]
    fn falling_person_lands_on_floor() {
        let mut world = empty_world();
        world.add_ground(Rect::new(0.0, 613.0, 1200.0, 20.0));
        world.add_entity(Box::new(person(&world, 400.0, 400.0)));

        for _ in 0..200 {
            world.tick(0.01);
        }

        let positions = world.positions(Kind::Person);
        assert_eq!(positions.len(), 1);
        // character frames are 60 tall
        assert_relative_eq!(positions[0].y, 613.0 - 60.0);
    }

    #[test]
    fn spawned_entities_draw_after_existing_ones() {
        let mut world = empty_world();
        let mut dying = person(&world, 100.0, 100.0);
        dying.set_life(0.01);
        world.add_entity(Box::new(person(&world, 500.0, 100.0)));
        world.add_entity(Box::new(dying));

        world.tick(0.02);
        let blit = RecordingBlit::default();
        world.draw(&blit, 0.0);

        let draws = blit.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].path, "img/tomb.png");
    }

    #[test]
    fn portal_box_is_registered() {
        let mut world = empty_world();
        let portal = Portal::new(
            ImageHandle::new("img/back/portal.png", 480.0, 300.0),
            Point { x: 0.0, y: 481.0 },
            4,
            0.1,
            8,
            true,
            1.0,
        );
        let trigger = portal.collision_box();
        world.add_portal(portal);
        assert_eq!(world.portals(), &[trigger]);
        assert_eq!(world.count(Kind::Portal), 1);
    }
}
