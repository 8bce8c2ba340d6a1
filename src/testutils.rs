//! Test doubles for the browser side : sized images without pixels and a
//! blit target that records every draw call
use crate::engine::{AssetSource, Blit, ImageHandle, Rect};
use crate::level;
use crate::sprite::Sprites;
use anyhow::{anyhow, Result};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::collections::HashMap;

pub(crate) const SEED: u64 = 0x5eed;

pub(crate) fn rng() -> SmallRng {
    SmallRng::seed_from_u64(SEED)
}

/// Image sizes by path, lookups of anything else fail like a missing asset
#[derive(Default)]
pub(crate) struct FixedAssets {
    sizes: HashMap<String, (f32, f32)>,
}

impl FixedAssets {
    pub(crate) fn insert(&mut self, path: &str, width: f32, height: f32) {
        self.sizes.insert(path.to_string(), (width, height));
    }

    pub(crate) fn remove(&mut self, path: &str) {
        self.sizes.remove(path);
    }
}

impl AssetSource for FixedAssets {
    fn get_asset(&self, path: &str) -> Result<ImageHandle> {
        self.sizes
            .get(path)
            .map(|(width, height)| ImageHandle::new(path, *width, *height))
            .ok_or_else(|| anyhow!("Asset not loaded : {}", path))
    }
}

/// Every image the game queues, with plausible sizes
/// - character frames are all 40 x 60 (walk sheets hold 4 of them)
/// - portal sheet is 4 x 2 frames of 120 x 150
pub(crate) fn assets() -> FixedAssets {
    let mut assets = FixedAssets::default();
    for path in level::asset_paths() {
        let (width, height) = if path.contains("walk1") {
            (160.0, 60.0)
        } else if path.starts_with("img/character/") {
            (40.0, 60.0)
        } else if path.ends_with("portal.png") {
            (480.0, 300.0)
        } else if path.ends_with("food/spritesheet.png") {
            (132.0, 34.0)
        } else if path.ends_with("tomb.png") {
            (40.0, 43.0)
        } else {
            (180.0, 180.0)
        };
        assets.insert(&path, width, height);
    }
    assets
}

pub(crate) fn sprites() -> Sprites {
    match Sprites::load(&assets()) {
        Ok(sprites) => sprites,
        Err(err) => panic!("test sprites : {:#}", err),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Draw {
    pub path: String,
    pub frame: Rect,
    pub destination: Rect,
}

#[derive(Default)]
pub(crate) struct RecordingBlit {
    draws: RefCell<Vec<Draw>>,
}

impl RecordingBlit {
    pub(crate) fn draws(&self) -> Vec<Draw> {
        self.draws.borrow().clone()
    }
}

impl Blit for RecordingBlit {
    fn draw_image(&self, image: &ImageHandle, frame: &Rect, destination: &Rect) {
        self.draws.borrow_mut().push(Draw {
            path: image.path().to_string(),
            frame: *frame,
            destination: *destination,
        });
    }
}
