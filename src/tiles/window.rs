//! Sliding W×W window over the unbounded tile grid.
//!
//! The window is the only owner of loaded tile data. Slots start unloaded and
//! are filled through the [`TileStore`] the first time a coordinate is
//! requested. When a request falls outside the window, the origin moves by the
//! smallest shift that brings it inside; slots still covered by the moved
//! window keep their data and the rest are dropped.
//!
//! Once a resolution is pinned, tiles of any other size load as empty.
//!
//! Mutation (`get`, `prefetch_around`, `clear`) needs `&mut self`, so the
//! single-writer rule is enforced by the borrow checker. Read-only access
//! through `peek` and `contains` can be shared, and loaded tiles can be cloned
//! out and handed to any number of readers.

use super::data::TileData;
use super::store::TileStore;
use crate::config::TerrainConfig;
use crate::coords::GridCoordinate;

/// Fallback for a slot that should have been filled.
static EMPTY_TILE: TileData = TileData::Empty;

/// Cache statistics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from a resident slot
    pub hits: usize,
    /// Requests that went to the store
    pub loads: usize,
    /// Loads that found no tile
    pub empty_loads: usize,
    /// Number of times the window moved
    pub repositions: usize,
    /// Resident tiles dropped by repositioning
    pub evictions: usize,
    /// Current number of resident slots (loaded or empty)
    pub resident: usize,
    /// Estimated memory held by resident tiles in bytes
    pub memory_bytes: usize,
}

impl CacheStats {
    /// Calculate hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.loads;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }

    /// Format as human-readable string
    pub fn summary(&self) -> String {
        format!(
            "Hits: {} | Loads: {} ({} empty) | Rate: {:.1}% | Moves: {} | Evicted: {} | Tiles: {} | Mem: {:.1}MB",
            self.hits,
            self.loads,
            self.empty_loads,
            self.hit_rate() * 100.0,
            self.repositions,
            self.evictions,
            self.resident,
            self.memory_bytes as f32 / (1024.0 * 1024.0)
        )
    }
}

/// State of one window slot.
#[derive(Clone, Debug, Default)]
enum Slot {
    /// Not requested since it entered the window
    #[default]
    Unloaded,
    /// Fetched from the store; may be `TileData::Empty`
    Resident(TileData),
}

impl Slot {
    fn is_resident(&self) -> bool {
        matches!(self, Slot::Resident(_))
    }

    fn data(&self) -> Option<&TileData> {
        match self {
            Slot::Unloaded => None,
            Slot::Resident(data) => Some(data),
        }
    }
}

/// New origin coordinate on one axis: the smallest move that puts `target`
/// inside `[origin, origin + size)`.
fn shift_axis(origin: i32, target: i32, size: usize) -> i32 {
    let origin = origin as i64;
    let target = target as i64;
    let size = size as i64;
    let shifted = if target < origin {
        target
    } else if target >= origin + size {
        target - size + 1
    } else {
        origin
    };
    shifted as i32
}

/// Slot index of `coord` in a window at `origin`, if it lies inside.
fn slot_index(origin: GridCoordinate, size: usize, coord: GridCoordinate) -> Option<usize> {
    let dx = coord.tile_x as i64 - origin.tile_x as i64;
    let dz = coord.tile_z as i64 - origin.tile_z as i64;
    let size = size as i64;
    if (0..size).contains(&dx) && (0..size).contains(&dz) {
        Some((dz * size + dx) as usize)
    } else {
        None
    }
}

/// Windowed tile cache.
pub struct TileWindow<S> {
    store: S,
    /// Tiles per side (W)
    size: usize,
    /// Coordinate of slot (0, 0)
    origin: GridCoordinate,
    /// W×W slots, row-major by z
    slots: Vec<Slot>,
    /// Samples per tile side the window accepts, once known
    sample_count: Option<usize>,
    stats: CacheStats,
}

impl<S: TileStore> TileWindow<S> {
    /// Create a window of `size`×`size` tiles with its origin at (0, 0).
    pub fn new(store: S, size: usize) -> Self {
        Self::with_origin(store, size, GridCoordinate::default())
    }

    /// Create a window with an explicit origin.
    pub fn with_origin(store: S, size: usize, origin: GridCoordinate) -> Self {
        let size = size.max(1);
        Self {
            store,
            size,
            origin,
            slots: vec![Slot::Unloaded; size * size],
            sample_count: None,
            stats: CacheStats::default(),
        }
    }

    /// Create a window sized by the configuration, accepting only tiles of
    /// its resolution.
    ///
    /// The config is expected to have passed [`TerrainConfig::validate`];
    /// debug builds panic otherwise. In release a window size of 0 is raised
    /// to 1 as in [`TileWindow::new`].
    pub fn from_config(store: S, config: &TerrainConfig) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "invalid terrain config {:?}: {:?}",
            config,
            config.validate()
        );
        Self::new(store, config.window_size).with_sample_count(config.sample_count)
    }

    /// Only accept tiles with `sample_count` samples per side.
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.set_sample_count(sample_count);
        self
    }

    /// Samples per tile side this window accepts, if pinned
    pub fn sample_count(&self) -> Option<usize> {
        self.sample_count
    }

    /// Pin the tile resolution. Tiles of any other resolution load as
    /// `TileData::Empty`; resident ones that no longer match are unloaded.
    pub fn set_sample_count(&mut self, sample_count: usize) {
        if self.sample_count == Some(sample_count) {
            return;
        }
        self.sample_count = Some(sample_count);

        let mut dropped = 0;
        for slot in &mut self.slots {
            let found = slot.data().and_then(TileData::samples).map(|samples| samples.sample_count());
            if found.is_some_and(|found| found != sample_count) {
                *slot = Slot::Unloaded;
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::debug!("Unloaded {} tiles not at {} samples per side", dropped, sample_count);
            self.update_stats();
        }
    }

    /// Coordinate of the window's first slot
    pub fn origin(&self) -> GridCoordinate {
        self.origin
    }

    /// Tiles per window side
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// True if `coord` lies inside the current window (loaded or not).
    pub fn contains(&self, coord: GridCoordinate) -> bool {
        slot_index(self.origin, self.size, coord).is_some()
    }

    /// True if `coord` is inside the window and has been fetched.
    pub fn is_loaded(&self, coord: GridCoordinate) -> bool {
        self.peek(coord).is_some()
    }

    /// Resident data for `coord` without loading or moving the window.
    pub fn peek(&self, coord: GridCoordinate) -> Option<&TileData> {
        slot_index(self.origin, self.size, coord).and_then(|index| self.slots[index].data())
    }

    /// Get the tile at `coord`, moving the window and loading it if needed.
    ///
    /// Never fails: a coordinate without a backing tile yields `TileData::Empty`.
    pub fn get(&mut self, coord: GridCoordinate) -> &TileData {
        if !self.contains(coord) {
            self.reposition(coord);
        }

        let index = match slot_index(self.origin, self.size, coord) {
            Some(index) => index,
            None => {
                debug_assert!(false, "{} outside window at {} after repositioning", coord, self.origin);
                return &EMPTY_TILE;
            }
        };

        if self.slots[index].is_resident() {
            self.stats.hits += 1;
        } else {
            let data = self.check_resolution(coord, self.store.load(coord));
            log::trace!(
                "Loaded tile {} ({})",
                coord,
                if data.is_empty() { "empty" } else { "present" }
            );
            self.stats.loads += 1;
            if data.is_empty() {
                self.stats.empty_loads += 1;
            }
            self.stats.resident += 1;
            self.stats.memory_bytes += data.memory_size();
            self.slots[index] = Slot::Resident(data);
        }

        match self.slots[index].data() {
            Some(data) => data,
            None => {
                debug_assert!(false, "slot for {} empty after load", coord);
                &EMPTY_TILE
            }
        }
    }

    /// Load the square of tiles within `radius` of `center`.
    ///
    /// The radius is clamped so the square fits in the window. Returns the
    /// number of tiles fetched from the store.
    pub fn prefetch_around(&mut self, center: GridCoordinate, radius: usize) -> usize {
        let radius = radius.min((self.size - 1) / 2) as i32;
        let loads_before = self.stats.loads;

        for dz in -radius..=radius {
            for dx in -radius..=radius {
                self.get(center.offset(dx, dz));
            }
        }

        self.stats.loads - loads_before
    }

    /// Drop every resident tile and reset statistics. The origin is kept.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = Slot::Unloaded);
        self.stats = CacheStats::default();
    }

    /// Replace a tile of the wrong resolution with an empty one.
    fn check_resolution(&self, coord: GridCoordinate, data: TileData) -> TileData {
        let found = data.samples().map(|samples| samples.sample_count());
        match (self.sample_count, found) {
            (Some(expected), Some(found)) if found != expected => {
                log::warn!(
                    "Tile {} has {} samples per side, expected {}; treating as empty",
                    coord,
                    found,
                    expected
                );
                TileData::Empty
            }
            _ => data,
        }
    }

    /// Move the window so that `coord` falls inside it, carrying over every
    /// slot covered by both the old and the new window.
    fn reposition(&mut self, coord: GridCoordinate) {
        let old_origin = self.origin;
        let new_origin = GridCoordinate::new(
            shift_axis(old_origin.tile_x, coord.tile_x, self.size),
            shift_axis(old_origin.tile_z, coord.tile_z, self.size),
        );

        let mut old_slots = std::mem::replace(&mut self.slots, vec![Slot::Unloaded; self.size * self.size]);
        let mut carried = 0;

        for dz in 0..self.size {
            for dx in 0..self.size {
                let absolute = new_origin.offset(dx as i32, dz as i32);
                if let Some(old_index) = slot_index(old_origin, self.size, absolute) {
                    let slot = std::mem::take(&mut old_slots[old_index]);
                    if slot.is_resident() {
                        carried += 1;
                    }
                    self.slots[dz * self.size + dx] = slot;
                }
            }
        }

        let evicted = old_slots.iter().filter(|slot| slot.is_resident()).count();

        log::debug!(
            "Tile window moved from {} to {} for {}: kept {}, evicted {}",
            old_origin,
            new_origin,
            coord,
            carried,
            evicted
        );

        self.origin = new_origin;
        self.stats.repositions += 1;
        self.stats.evictions += evicted;
        self.update_stats();

        debug_assert!(self.contains(coord), "{} not inside window at {}", coord, new_origin);
    }

    /// Update resident statistics
    fn update_stats(&mut self) {
        let resident = self.slots.iter().filter_map(Slot::data);
        let (count, bytes) = resident.fold((0, 0), |(count, bytes), data| (count + 1, bytes + data.memory_size()));
        self.stats.resident = count;
        self.stats.memory_bytes = bytes;
    }
}
