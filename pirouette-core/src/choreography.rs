//! Choreography containers
//!
//! A choreography is two independent timelines: waypoints for the motion
//! engine and color events for the lighting engine. Each list is assumed to
//! be sorted by timestamp; nothing in this crate enforces it.

use heapless::Vec;

use pirouette_protocol::{ColorEvent, Waypoint};

/// Maximum waypoints in one choreography
pub const MAX_MOVE_POINTS: usize = 64;

/// Maximum color events in one choreography
pub const MAX_COLOR_POINTS: usize = 110;

/// Waypoint timeline
pub type Moves = Vec<Waypoint, MAX_MOVE_POINTS>;

/// Color timeline
pub type Colors = Vec<ColorEvent, MAX_COLOR_POINTS>;

/// A complete dance: motion and color timelines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Choreography {
    pub moves: Moves,
    pub colors: Colors,
}

impl Choreography {
    pub const fn new() -> Self {
        Self {
            moves: Vec::new(),
            colors: Vec::new(),
        }
    }

    /// Build a choreography from slices, truncating each list to capacity
    pub fn from_slices(moves: &[Waypoint], colors: &[ColorEvent]) -> Self {
        let moves = &moves[..moves.len().min(MAX_MOVE_POINTS)];
        let colors = &colors[..colors.len().min(MAX_COLOR_POINTS)];
        let mut choreography = Self::new();
        // Both slices were truncated to capacity above
        let _ = choreography.moves.extend_from_slice(moves);
        let _ = choreography.colors.extend_from_slice(colors);
        choreography
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.colors.clear();
    }
}
