//! Motion engine trait
//!
//! The motion engine interpolates a bowed path between two waypoints and
//! drives the wheels along it. It is owned by the board crate; the sequencer
//! only tells it when a new segment starts.

use pirouette_protocol::Waypoint;

/// Consumer of sequencer motion actions
pub trait MotionEngine {
    /// A new path segment starts
    ///
    /// `from` is the waypoint the robot was heading to until now, or `None`
    /// if there was no current waypoint.
    fn begin_segment(&mut self, from: Option<&Waypoint>, to: &Waypoint);

    /// Return to the rest position and hold there
    fn reset_position(&mut self);
}
