//! Person status table and the directional sheets each status draws from
//!
//! ┌──────── Status → frame layout ────────┐
//! │ Walk   4 frames per row, 4 frames     │
//! │ Jump   1 frame per row,  1 frame      │
//! │ Stand  1 frame per row,  1 frame      │
//! └───────────────────────────────────────┘
use crate::engine::{AssetSource, ImageHandle};
use crate::sprite::FrameGeometry;
use anyhow::Result;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Walk,
    Jump,
    Stand,
}

/// Frames per row and frames used, the pixel size comes from the sheet
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub sheet_width: usize,
    pub frames: usize,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Walk, Status::Jump, Status::Stand];

    pub fn index(self) -> usize {
        match self {
            Status::Walk => 0,
            Status::Jump => 1,
            Status::Stand => 2,
        }
    }

    /// `None` for anything outside the table, callers ignore it
    pub fn from_index(index: usize) -> Option<Status> {
        Status::ALL.get(index).copied()
    }

    pub fn frame_info(self) -> FrameInfo {
        match self {
            Status::Walk => FrameInfo {
                sheet_width: 4,
                frames: 4,
            },
            Status::Jump | Status::Stand => FrameInfo {
                sheet_width: 1,
                frames: 1,
            },
        }
    }

    /// Frames of one character differ in size, so the geometry is derived
    /// from the sheet image : one row, `sheet_width` columns
    pub fn geometry(self, sheet: &ImageHandle) -> FrameGeometry {
        let info = self.frame_info();
        FrameGeometry::new(
            sheet.width / info.sheet_width as f32,
            sheet.height,
            info.sheet_width,
            info.frames,
        )
    }

    fn file_stem(self) -> &'static str {
        match self {
            Status::Walk => "walk1",
            Status::Jump => "jump",
            Status::Stand => "stand",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn file_suffix(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Sheets of one character, indexed by side x status
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSheets {
    left: [ImageHandle; 3],
    right: [ImageHandle; 3],
}

impl CharacterSheets {
    pub fn path(number: usize, status: Status, side: Side) -> String {
        format!(
            "img/character/person{}_{}_{}.png",
            number,
            status.file_stem(),
            side.file_suffix()
        )
    }

    pub fn asset_paths(number: usize) -> Vec<String> {
        let mut paths = Vec::with_capacity(6);
        for side in [Side::Left, Side::Right] {
            for status in Status::ALL {
                paths.push(Self::path(number, status, side));
            }
        }
        paths
    }

    pub fn load(assets: &dyn AssetSource, number: usize) -> Result<Self> {
        let side = |side: Side| -> Result<[ImageHandle; 3]> {
            Ok([
                assets.get_asset(&Self::path(number, Status::Walk, side))?,
                assets.get_asset(&Self::path(number, Status::Jump, side))?,
                assets.get_asset(&Self::path(number, Status::Stand, side))?,
            ])
        };
        Ok(CharacterSheets {
            left: side(Side::Left)?,
            right: side(Side::Right)?,
        })
    }

    pub fn sheet(&self, side: Side, status: Status) -> &ImageHandle {
        match side {
            Side::Left => &self.left[status.index()],
            Side::Right => &self.right[status.index()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn status_round_trips_through_index() {
        for (position, status) in Status::ALL.iter().enumerate() {
            assert_eq!(status.index(), position);
            assert_eq!(Status::from_index(position), Some(*status));
        }
    }

    #[test]
    fn unknown_status_index_is_none() {
        assert_eq!(Status::from_index(3), None);
        assert_eq!(Status::from_index(usize::MAX), None);
    }

    #[test]
    fn walk_geometry_splits_sheet_into_four_columns() {
        let sheet = ImageHandle::new("walk.png", 168.0, 62.0);
        let geometry = Status::Walk.geometry(&sheet);
        assert_relative_eq!(geometry.frame_width, 42.0);
        assert_relative_eq!(geometry.frame_height, 62.0);
        assert_eq!(geometry.frame_count, 4);
    }

    #[test]
    fn sheet_paths_follow_character_layout() {
        assert_eq!(
            CharacterSheets::path(3, Status::Walk, Side::Left),
            "img/character/person3_walk1_left.png"
        );
        let paths = CharacterSheets::asset_paths(1);
        assert_eq!(paths.len(), 6);
        assert!(paths.contains(&"img/character/person1_stand_right.png".to_string()));
    }
}
