/// Scrolling entities: obstacles, collectibles, the end-of-round flag and
/// the ground strip. Everything scrolls left at one fixed speed.
///
/// Position is a pure function of time since spawn:
///   x(t) = start_x - round(speed · t)
/// so replaying the same frame deltas always lands on the same pixels.

use super::sprite::{Anchor, Rect, Sprite};

pub type EntityId = u32;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    Obstacle,
    Collectible,
    /// Round-end marker. Scrolls like an obstacle but never collides.
    Flag,
}

/// Obstacle images and their footprints.
pub const OBSTACLES: [(&str, (f32, f32)); 4] = [
    ("wall", (70.0, 140.0)),
    ("crate", (70.0, 70.0)),
    ("sign", (70.0, 70.0)),
    ("fence", (70.0, 70.0)),
];

/// Collectible images and their footprints.
pub const COLLECTIBLES: [(&str, (f32, f32)); 2] = [
    ("coin", (40.0, 40.0)),
    ("gem", (40.0, 40.0)),
];

pub const FLAG: (&str, (f32, f32)) = ("flag", (70.0, 140.0));

/// Horizontal distance past the right screen edge where entities appear.
pub const SPAWN_MARGIN: f32 = 100.0;

/// Scroll offset after `elapsed` seconds, rounded to whole pixels.
#[inline]
pub fn scroll_offset(speed: f32, elapsed: f32) -> f32 {
    (speed * elapsed).round()
}

#[derive(Clone, Debug)]
pub struct ScrollingEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub sprite: Sprite,
    pub start_x: f32,
    pub elapsed: f32,
}

impl ScrollingEntity {
    /// `y` is the entity's baseline: the bottom edge for obstacles and flags,
    /// the center for collectibles.
    pub fn new(id: EntityId, kind: EntityKind, image: &str, size: (f32, f32), start_x: f32, y: f32) -> Self {
        let anchor = match kind {
            EntityKind::Collectible => Anchor::Center,
            EntityKind::Obstacle | EntityKind::Flag => Anchor::Bottom,
        };
        ScrollingEntity {
            id,
            kind,
            sprite: Sprite::new(image, start_x, y, size, anchor),
            start_x,
            elapsed: 0.0,
        }
    }

    /// Advance by one frame. Returns false once the entity has scrolled
    /// completely off the left edge.
    pub fn advance(&mut self, dt: f32, speed: f32) -> bool {
        self.elapsed += dt;
        self.sprite.x = self.start_x - scroll_offset(speed, self.elapsed);
        !self.is_off_screen()
    }

    pub fn is_off_screen(&self) -> bool {
        self.sprite.bounds().map_or(true, |b| b.right() < 0.0)
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.sprite.bounds()
    }
}

/// The endlessly repeating ground under the characters.
#[derive(Clone, Debug)]
pub struct GroundStrip {
    pub tiles: Vec<Sprite>,
    pub tile_size: f32,
    pub elapsed: f32,
}

impl GroundStrip {
    pub const TILE: f32 = 70.0;

    pub fn new(screen_width: f32, floor: f32) -> Self {
        let count = (screen_width / Self::TILE) as usize + 2;
        let tiles = (0..count)
            .map(|i| Sprite::new("grass_mid", i as f32 * Self::TILE, floor, (Self::TILE, Self::TILE), Anchor::TopLeft))
            .collect();
        GroundStrip { tiles, tile_size: Self::TILE, elapsed: 0.0 }
    }

    /// Wrap every tile into `[-tile, strip_width - tile)`.
    pub fn advance(&mut self, dt: f32, speed: f32) {
        self.elapsed += dt;
        let off = scroll_offset(speed, self.elapsed);
        let strip = self.tile_size * self.tiles.len() as f32;
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            tile.x = (i as f32 * self.tile_size - off).rem_euclid(strip) - self.tile_size;
        }
    }
}
