//! Level layout : background, tiled floors, portals, food and the first
//! persons, in that draw order
use crate::config::GameConfig;
use crate::engine::{AssetSource, Point, Rect, Size};
use crate::game::World;
use crate::sprite::{
    AnimatedObject, Animation, Food, FrameChoice, FrameGeometry, NonAnimatedObject, Person,
    Portal, Sprites,
};
use anyhow::Result;
use rand::rngs::SmallRng;

mod paths {
    pub const CLOUD: &str = "img/back/cloud.png";
    pub const SKY: &str = "img/back/sky.png";
    pub const BACK: &str = "img/back/back.png";
    pub const DECOR_1: &str = "img/back/1.png";
    pub const DECOR_2: &str = "img/back/2.png";
    pub const PORTAL: &str = "img/back/portal.png";

    pub const TILE_TOP: &str = "img/tiles/en_spritesheet.png";
    pub const TILE_FILL: &str = "img/tiles/en1_spritesheet.png";
    pub const TILE_BASE: &str = "img/tiles/bsc_spritesheet.png";
}

pub const PERSON_FRAME_DURATION: f32 = 0.1;

// tiles are 90 px wide and start a little left of the screen
const TILE_WIDTH: f32 = 90.0;
const FIRST_TILE_X: f32 = -97.0;
const GROUND_BOX_HEIGHT: f32 = 20.0;

/// Every image the game needs, queued before anything is built
pub fn asset_paths() -> Vec<String> {
    let mut all: Vec<String> = [
        paths::CLOUD,
        paths::SKY,
        paths::BACK,
        paths::DECOR_1,
        paths::DECOR_2,
        paths::TILE_TOP,
        paths::TILE_FILL,
        paths::TILE_BASE,
        paths::PORTAL,
    ]
    .iter()
    .map(|path| path.to_string())
    .collect();
    all.extend(Sprites::asset_paths());
    all
}

/// Builds the whole level, any missing image is fatal
pub fn build_world(
    config: &GameConfig,
    size: Size,
    assets: &dyn AssetSource,
    rng: SmallRng,
) -> Result<World> {
    let sprites = Sprites::load(assets)?;
    let mut world = World::new(size, config.gravity, sprites, rng);

    build_background(&mut world, assets)?;
    build_tiles(&mut world, assets)?;
    spawn_people(&mut world, config);
    place_food(&mut world, config);
    place_portals(&mut world, config, assets)?;

    log::info!(
        "Level built : {} entities, {} ground boxes",
        world.entity_count(),
        world.ground().len()
    );
    Ok(world)
}

fn build_background(world: &mut World, assets: &dyn AssetSource) -> Result<()> {
    let size = world.size();
    let mut sky = NonAnimatedObject::whole(assets.get_asset(paths::SKY)?, Point::default());
    sky.set_size(size.width, size.height);
    world.add_entity(Box::new(sky));

    let cloud = NonAnimatedObject::whole(assets.get_asset(paths::CLOUD)?, Point::default());
    world.add_entity(Box::new(cloud));

    let back = NonAnimatedObject::whole(
        assets.get_asset(paths::BACK)?,
        Point { x: 0.0, y: 250.0 },
    );
    world.add_entity(Box::new(back));

    let decor = Animation::new(
        assets.get_asset(paths::DECOR_1)?,
        FrameGeometry::new(72.0, 168.0, 6, 6),
        0.1,
        true,
        1.0,
    );
    world.add_entity(Box::new(AnimatedObject::new(
        decor,
        Point { x: 100.0, y: 50.0 },
    )));

    let decor = Animation::new(
        assets.get_asset(paths::DECOR_2)?,
        FrameGeometry::new(267.0, 147.0, 2, 6),
        0.3,
        true,
        1.0,
    );
    world.add_entity(Box::new(AnimatedObject::new(
        decor,
        Point { x: 900.0, y: 50.0 },
    )));
    Ok(())
}

/// One floor of tiles : a collision box plus a top strip and a fill strip
struct Floor {
    /// ground box top, measured up from the bottom of the canvas
    box_offset: f32,
    top_offset: f32,
    fill_offset: f32,
    fill: &'static str,
    fill_geometry: FrameGeometry,
}

fn floors() -> [Floor; 5] {
    let base = FrameGeometry::new(90.0, 60.0, 2, 6);
    let fill = FrameGeometry::new(90.0, 32.0, 2, 3);
    let floor = |box_offset: f32| Floor {
        box_offset,
        top_offset: box_offset + 10.0,
        fill_offset: box_offset - 22.0,
        fill: paths::TILE_FILL,
        fill_geometry: fill,
    };
    [
        Floor {
            box_offset: 87.0,
            top_offset: 97.0,
            fill_offset: 60.0,
            fill: paths::TILE_BASE,
            fill_geometry: base,
        },
        floor(222.0),
        floor(342.0),
        floor(462.0),
        floor(582.0),
    ]
}

/// Which of the five floors column `column` of `columns` carries
/// - the bottom floor is solid
/// - upper floors leave gaps so persons can drop through
pub fn floor_columns(column: usize, columns: usize) -> [bool; 5] {
    // halves compare as floats, so odd column counts have no exact middle
    let i = column as f32;
    let n = columns as f32;
    let half = n / 2.0;
    let middle_gap = i == 1.0 || i == half || i == half - 1.0;
    [
        true,
        !middle_gap && i < n - 3.0,
        i < half - 3.0 || i == half || i == half - 1.0 || i > half + 2.0,
        !middle_gap && i < n - 2.0,
        i < half + 3.0 && i > half - 4.0,
    ]
}

pub fn column_count(width: f32) -> usize {
    (width / TILE_WIDTH).ceil() as usize + 2
}

fn build_tiles(world: &mut World, assets: &dyn AssetSource) -> Result<()> {
    let height = world.size().height;
    let columns = column_count(world.size().width);
    let top = assets.get_asset(paths::TILE_TOP)?;
    let top_geometry = FrameGeometry::new(90.0, 37.0, 2, 3);
    let floors = floors();
    let fills = floors
        .iter()
        .map(|floor| assets.get_asset(floor.fill))
        .collect::<Result<Vec<_>>>()?;

    let mut x = FIRST_TILE_X;
    for column in 0..columns {
        let present = floor_columns(column, columns);
        for ((floor, fill), _) in floors
            .iter()
            .zip(fills.iter())
            .zip(present.iter())
            .filter(|(_, present)| **present)
        {
            world.add_ground(Rect::new(
                x,
                height - floor.box_offset,
                TILE_WIDTH,
                GROUND_BOX_HEIGHT,
            ));
            let top_tile = NonAnimatedObject::new(
                top.clone(),
                Point {
                    x,
                    y: height - floor.top_offset,
                },
                top_geometry,
                FrameChoice::Random,
                1.0,
                world.rng(),
            );
            world.add_entity(Box::new(top_tile));
            let fill_tile = NonAnimatedObject::new(
                fill.clone(),
                Point {
                    x,
                    y: height - floor.fill_offset,
                },
                floor.fill_geometry,
                FrameChoice::Random,
                1.0,
                world.rng(),
            );
            world.add_entity(Box::new(fill_tile));
        }
        x += TILE_WIDTH;
    }
    Ok(())
}

fn spawn_people(world: &mut World, config: &GameConfig) {
    for spawn in config.people.iter() {
        let sheets = {
            let (sprites, rng) = world.sprites_and_rng();
            sprites.character(spawn.character, rng)
        };
        let mut person = Person::new(
            sheets,
            Point {
                x: spawn.x,
                y: spawn.y,
            },
            PERSON_FRAME_DURATION,
            1.0,
        );
        person.set_y_velocity(spawn.y_velocity);
        person.change_status_index(spawn.status);
        person.set_speed(spawn.speed, spawn.direction);
        world.add_entity(Box::new(person));
    }
}

fn place_food(world: &mut World, config: &GameConfig) {
    for spawn in config.food.iter() {
        let sheet = world.sprites().food.clone();
        let food = Food::new(
            sheet,
            Point {
                x: spawn.x,
                y: spawn.y,
            },
            world.rng(),
        );
        world.add_food(food);
    }
}

fn place_portals(world: &mut World, config: &GameConfig, assets: &dyn AssetSource) -> Result<()> {
    let sheet = assets.get_asset(paths::PORTAL)?;
    let y = world.size().height - config.portals.floor_offset;
    for index in 0..config.portals.count {
        let portal = Portal::new(
            sheet.clone(),
            Point {
                x: config.portals.spacing * index as f32,
                y,
            },
            4,
            0.1,
            8,
            true,
            1.0,
        );
        world.add_portal(portal);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Kind;
    use crate::testutils;

    const CANVAS: Size = Size {
        width: 1200.0,
        height: 700.0,
    };

    fn world() -> World {
        let config = GameConfig::default();
        build_world(&config, CANVAS, &testutils::assets(), testutils::rng()).expect("world")
    }

    #[test]
    fn sixteen_columns_for_a_wide_canvas() {
        assert_eq!(column_count(1200.0), 16);
        assert_eq!(column_count(900.0), 12);
    }

    #[test]
    fn bottom_floor_is_solid() {
        let columns = column_count(CANVAS.width);
        assert!((0..columns).all(|column| floor_columns(column, columns)[0]));
    }

    #[test]
    fn upper_floors_leave_gaps() {
        let columns = 16;
        let count = |floor: usize| {
            (0..columns)
                .filter(|column| floor_columns(*column, columns)[floor])
                .count()
        };
        assert_eq!(count(1), 10);
        assert_eq!(count(2), 12);
        assert_eq!(count(3), 11);
        assert_eq!(count(4), 6);
        // the middle pair is open on the second floor
        assert!(!floor_columns(7, columns)[1]);
        assert!(!floor_columns(8, columns)[1]);
    }

    #[test]
    fn level_has_all_ground_boxes() {
        let world = world();
        assert_eq!(world.ground().len(), 16 + 10 + 12 + 11 + 6);
        let bottom = world.ground()[0];
        assert_eq!(bottom, Rect::new(-97.0, 613.0, 90.0, 20.0));
    }

    #[test]
    fn level_places_people_food_and_portals() {
        let world = world();
        assert_eq!(world.count(Kind::Person), 4);
        assert_eq!(world.count(Kind::Food), 4);
        assert_eq!(world.count(Kind::Portal), 4);
        assert_eq!(world.portals().len(), 4);
        // sky, cloud, back hills, two animated decorations, two tiles per box
        assert_eq!(world.count(Kind::Scenery), 5 + 2 * world.ground().len());
    }

    #[test]
    fn portals_line_up_above_the_bottom() {
        let world = world();
        let first = world.portals()[0];
        // portal frame is 120 x 150
        assert_eq!(first, Rect::new(40.0, 481.0 + 100.0, 30.0, 50.0));
        assert_eq!(world.portals()[1].x, 370.0 + 40.0);
    }

    #[test]
    fn missing_tile_image_fails_the_build() {
        let mut assets = testutils::assets();
        assets.remove("img/tiles/en1_spritesheet.png");
        let result = build_world(
            &GameConfig::default(),
            CANVAS,
            &assets,
            testutils::rng(),
        );
        assert!(result.is_err());
    }
}
