//! Actions emitted by the sequencer for the motion and lighting engines

use heapless::Vec;

use pirouette_protocol::{ColorEvent, Waypoint};

use crate::traits::{ColorEngine, MotionEngine};

/// Maximum actions per tick (one motion and one color action)
pub const MAX_ACTIONS: usize = 2;

/// An action for a collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerAction {
    /// Return to the rest position (emitted on every disabled tick)
    ResetPosition,
    /// A new path segment starts: recompute the interpolation
    BeginSegment {
        from: Option<Waypoint>,
        to: Waypoint,
        index: usize,
    },
    /// Start fading towards a color event
    FadeColor { target: ColorEvent, index: usize },
}

impl SequencerAction {
    /// Check if this action is for the motion engine
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            SequencerAction::ResetPosition | SequencerAction::BeginSegment { .. }
        )
    }
}

/// Actions produced by one tick, in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actions(Vec<SequencerAction, MAX_ACTIONS>);

impl Actions {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, action: SequencerAction) {
        // A tick emits at most one motion and one color action
        let _ = self.0.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[SequencerAction] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SequencerAction> {
        self.0.iter()
    }

    /// Hand every action to its engine
    pub fn dispatch<M: MotionEngine, C: ColorEngine>(&self, motion: &mut M, lights: &mut C) {
        for action in self.iter() {
            match action {
                SequencerAction::ResetPosition => motion.reset_position(),
                SequencerAction::BeginSegment { from, to, .. } => {
                    motion.begin_segment(from.as_ref(), to)
                }
                SequencerAction::FadeColor { target, .. } => lights.fade_to(target),
            }
        }
    }
}
