//! Lighting engine trait

use pirouette_protocol::ColorEvent;

/// Consumer of sequencer color actions
///
/// The engine fades from whatever it is showing towards `target`, reaching
/// it at `target.timestamp`.
pub trait ColorEngine {
    fn fade_to(&mut self, target: &ColorEvent);
}
