//! Per-frame memo of scene raycasts.

use glam::Vec2;
use navcam_math::RayHit;

/// Caches the pointer raycast for the current frame.
///
/// Pivot selection, pan-plane placement, and zoom scaling may all ask for the
/// hit under the pointer in the same frame. The entry is valid only for the
/// frame and pointer it was computed for, and until [`invalidate`](Self::invalidate)
/// is called (the camera moved outside the frame loop).
#[derive(Debug, Default)]
pub struct QueryCache {
    frame: u64,
    dirty: bool,
    pointer_hit: Option<(Vec2, Option<RayHit>)>,
    misses: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops stale entries when a new frame starts.
    pub fn begin_frame(&mut self, frame: u64) {
        if frame != self.frame || self.dirty {
            self.frame = frame;
            self.dirty = false;
            self.pointer_hit = None;
        }
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
        self.pointer_hit = None;
    }

    /// Hit under `pointer`, computed by `query` on a miss.
    pub fn pointer_hit(
        &mut self,
        pointer: Vec2,
        query: impl FnOnce() -> Option<RayHit>,
    ) -> Option<RayHit> {
        if !self.dirty
            && let Some((cached_pointer, hit)) = self.pointer_hit
            && cached_pointer == pointer
        {
            return hit;
        }
        self.misses += 1;
        let hit = query();
        self.dirty = false;
        self.pointer_hit = Some((pointer, hit));
        hit
    }

    /// Number of raycasts actually performed.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
