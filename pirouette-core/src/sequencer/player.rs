//! Choreography sequencer
//!
//! Walks the stored timelines as the dance date advances. Each tick looks
//! for the first element whose timestamp is not yet in the past:
//!
//! - waypoints: adopting a new one starts a path segment towards it;
//! - color events: one is adopted once the date enters its fade window.
//!
//! Scans restart from the beginning of each list on every tick. Lists are
//! assumed sorted by timestamp; with unsorted input the chosen element is
//! simply the first match in storage order. A late tick never replays the
//! elements it skipped over.

use pirouette_protocol::{ColorEvent, Waypoint};

use super::events::{Actions, SequencerAction};
use super::state::{Cursor, SequencerState};
use crate::choreography::Choreography;

/// Timeline cursor state machine
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    state: SequencerState,
    move_cursor: Cursor,
    color_cursor: Cursor,
    /// The color under `color_cursor` has been handed to the lights
    color_announced: bool,
}

impl Sequencer {
    /// Create a sequencer with empty cursors
    pub const fn new() -> Self {
        Self {
            state: SequencerState::Disabled,
            move_cursor: Cursor::Empty,
            color_cursor: Cursor::Empty,
            color_announced: false,
        }
    }

    /// Create a sequencer with both cursors at rest on `choreography`
    pub fn seeded(choreography: &Choreography) -> Self {
        let mut sequencer = Self::new();
        sequencer.rest(choreography);
        sequencer
    }

    /// Pin both cursors to the start of their timelines
    pub fn rest(&mut self, choreography: &Choreography) {
        self.move_cursor = Cursor::rest(choreography.moves.len());
        self.color_cursor = Cursor::rest(choreography.colors.len());
        // A cursor pinned at rest has not been adopted yet
        self.color_announced = false;
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn move_cursor(&self) -> Cursor {
        self.move_cursor
    }

    pub fn color_cursor(&self) -> Cursor {
        self.color_cursor
    }

    /// Waypoint the robot is currently heading to
    pub fn current_move<'a>(&self, choreography: &'a Choreography) -> Option<&'a Waypoint> {
        self.move_cursor.resolve(&choreography.moves)
    }

    /// Color the lights are currently fading to
    pub fn current_color<'a>(&self, choreography: &'a Choreography) -> Option<&'a ColorEvent> {
        self.color_cursor.resolve(&choreography.colors)
    }

    /// Evaluate one tick at dance date `now`
    ///
    /// `enabled` is the gate flag sampled for this tick.
    pub fn tick(&mut self, now: u32, enabled: bool, choreography: &Choreography) -> Actions {
        let mut actions = Actions::new();
        let entering = !self.state.is_running() && enabled;
        self.state = SequencerState::from_gate(enabled);

        if !enabled {
            self.rest(choreography);
            actions.push(SequencerAction::ResetPosition);
            return actions;
        }

        if entering {
            self.color_announced = false;
        }

        self.advance_move(now, choreography, &mut actions);
        self.advance_color(now, choreography, &mut actions);
        actions
    }

    fn advance_move(&mut self, now: u32, choreography: &Choreography, actions: &mut Actions) {
        let moves = &choreography.moves;
        let Some(i) = first_not_before(moves.iter().map(|w| w.timestamp), now) else {
            return;
        };
        if self.move_cursor == Cursor::At(i) {
            return;
        }

        let from = self.move_cursor.resolve(moves).copied();
        self.move_cursor = Cursor::At(i);

        // The first waypoint is the starting pose: there is no segment to build
        if i != 0 {
            actions.push(SequencerAction::BeginSegment {
                from,
                to: moves[i],
                index: i,
            });
        }
    }

    fn advance_color(&mut self, now: u32, choreography: &Choreography, actions: &mut Actions) {
        let colors = &choreography.colors;
        let Some(j) = first_not_before(colors.iter().map(|c| c.timestamp), now) else {
            return;
        };
        let target = colors[j];
        if now < u32::from(target.fade_start()) {
            return;
        }

        let changed = self.color_cursor != Cursor::At(j);
        self.color_cursor = Cursor::At(j);

        if changed || !self.color_announced {
            self.color_announced = true;
            actions.push(SequencerAction::FadeColor { target, index: j });
        }
    }
}

/// Index of the first timestamp that is not before `now`
fn first_not_before(mut timestamps: impl Iterator<Item = u16>, now: u32) -> Option<usize> {
    timestamps.position(|ts| u32::from(ts) >= now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ColorEngine, MotionEngine};

    fn waypoint(ts: u16) -> Waypoint {
        Waypoint {
            timestamp: ts,
            x: ts,
            ..Default::default()
        }
    }

    fn color(ts: u16, fade: u8) -> ColorEvent {
        ColorEvent {
            timestamp: ts,
            hue: ts as u8,
            fade_duration: fade,
            ..Default::default()
        }
    }

    fn dance(move_ts: &[u16], colors: &[ColorEvent]) -> Choreography {
        let mut c = Choreography::new();
        for &ts in move_ts {
            c.moves.push(waypoint(ts)).unwrap();
        }
        c.colors.extend_from_slice(colors).unwrap();
        c
    }

    #[test]
    fn test_waypoint_selection_by_time() {
        let c = dance(&[10, 20, 30], &[]);
        let mut seq = Sequencer::seeded(&c);

        seq.tick(15, true, &c);
        assert_eq!(seq.move_cursor(), Cursor::At(1));
        assert_eq!(seq.current_move(&c), Some(&waypoint(20)));

        seq.tick(25, true, &c);
        assert_eq!(seq.move_cursor(), Cursor::At(2));

        let actions = seq.tick(35, true, &c);
        assert_eq!(seq.move_cursor(), Cursor::At(2));
        assert!(actions.is_empty());
    }

    #[test]
    fn test_new_segment_triggers_interpolation_once() {
        let c = dance(&[10, 20, 30], &[]);
        let mut seq = Sequencer::seeded(&c);

        let actions = seq.tick(15, true, &c);
        assert_eq!(
            actions.as_slice(),
            &[SequencerAction::BeginSegment {
                from: Some(waypoint(10)),
                to: waypoint(20),
                index: 1,
            }]
        );

        // Same segment on the next tick: nothing new
        assert!(seq.tick(16, true, &c).is_empty());
    }

    #[test]
    fn test_timestamp_equal_to_now_is_selected() {
        let c = dance(&[10, 20, 30], &[]);
        let mut seq = Sequencer::seeded(&c);
        seq.tick(20, true, &c);
        assert_eq!(seq.move_cursor(), Cursor::At(1));
    }

    #[test]
    fn test_first_waypoint_does_not_trigger_interpolation() {
        let c = dance(&[10, 20], &[]);
        // Cursor away from rest, e.g. left over from a previous dance
        let mut seq = Sequencer::new();
        seq.move_cursor = Cursor::At(1);

        let actions = seq.tick(5, true, &c);

        assert_eq!(seq.move_cursor(), Cursor::At(0));
        assert!(actions.is_empty());
    }

    #[test]
    fn test_late_tick_skips_intermediate_waypoints() {
        let c = dance(&[10, 20, 30, 40], &[]);
        let mut seq = Sequencer::seeded(&c);

        let actions = seq.tick(35, true, &c);

        assert_eq!(
            actions.as_slice(),
            &[SequencerAction::BeginSegment {
                from: Some(waypoint(10)),
                to: waypoint(40),
                index: 3,
            }]
        );
    }

    #[test]
    fn test_color_fade_window() {
        let c = dance(&[], &[color(100, 20)]);
        let mut seq = Sequencer::new();

        let actions = seq.tick(79, true, &c);
        assert_eq!(seq.color_cursor(), Cursor::Empty);
        assert!(actions.is_empty());

        let actions = seq.tick(80, true, &c);
        assert_eq!(seq.color_cursor(), Cursor::At(0));
        assert_eq!(
            actions.as_slice(),
            &[SequencerAction::FadeColor {
                target: color(100, 20),
                index: 0
            }]
        );

        // Still adopted, no new action
        assert!(seq.tick(90, true, &c).is_empty());
        assert_eq!(seq.current_color(&c), Some(&color(100, 20)));
    }

    #[test]
    fn test_first_color_announced_when_gate_opens_early() {
        let c = dance(&[], &[color(100, 20)]);
        let mut seq = Sequencer::seeded(&c);
        assert_eq!(seq.color_cursor(), Cursor::At(0));

        for t in [0, 50, 79] {
            assert!(seq.tick(t, true, &c).is_empty());
        }

        let actions = seq.tick(80, true, &c);
        assert_eq!(
            actions.as_slice(),
            &[SequencerAction::FadeColor {
                target: color(100, 20),
                index: 0
            }]
        );

        // Announced once
        assert!(seq.tick(90, true, &c).is_empty());
        assert!(seq.tick(100, true, &c).is_empty());
    }

    #[test]
    fn test_first_color_announced_again_after_reenable() {
        let c = dance(&[], &[color(100, 20)]);
        let mut seq = Sequencer::seeded(&c);
        seq.tick(85, true, &c);

        seq.tick(86, false, &c);
        assert!(seq.tick(0, true, &c).is_empty());

        let actions = seq.tick(80, true, &c);
        assert_eq!(
            actions.as_slice(),
            &[SequencerAction::FadeColor {
                target: color(100, 20),
                index: 0
            }]
        );
    }

    #[test]
    fn test_color_waits_for_next_fade_window() {
        let c = dance(&[], &[color(50, 10), color(100, 20)]);
        let mut seq = Sequencer::seeded(&c);
        seq.tick(45, true, &c);
        assert_eq!(seq.color_cursor(), Cursor::At(0));

        // Past the first event but before the second one's fade
        seq.tick(60, true, &c);
        assert_eq!(seq.color_cursor(), Cursor::At(0));

        seq.tick(80, true, &c);
        assert_eq!(seq.color_cursor(), Cursor::At(1));
    }

    #[test]
    fn test_fade_longer_than_timestamp() {
        let c = dance(&[], &[color(10, 200)]);
        let mut seq = Sequencer::new();
        seq.tick(0, true, &c);
        assert_eq!(seq.color_cursor(), Cursor::At(0));
    }

    #[test]
    fn test_disable_resets_cursors() {
        let c = dance(&[10, 20, 30], &[color(10, 10), color(20, 10), color(30, 10)]);
        let mut seq = Sequencer::seeded(&c);
        seq.tick(25, true, &c);
        assert_eq!(seq.move_cursor(), Cursor::At(2));
        assert_eq!(seq.color_cursor(), Cursor::At(2));

        let actions = seq.tick(26, false, &c);

        assert_eq!(seq.state(), SequencerState::Disabled);
        assert_eq!(seq.move_cursor(), Cursor::At(0));
        assert_eq!(seq.color_cursor(), Cursor::At(0));
        assert_eq!(actions.as_slice(), &[SequencerAction::ResetPosition]);
    }

    #[test]
    fn test_reset_position_every_disabled_tick() {
        let c = dance(&[10], &[]);
        let mut seq = Sequencer::seeded(&c);
        for t in 0..5 {
            let actions = seq.tick(t, false, &c);
            assert_eq!(actions.as_slice(), &[SequencerAction::ResetPosition]);
        }
    }

    #[test]
    fn test_empty_store_never_adopts() {
        let c = Choreography::new();
        let mut seq = Sequencer::seeded(&c);
        for t in [0, 1, 100, 65_535, 1_000_000] {
            let actions = seq.tick(t, true, &c);
            assert!(actions.is_empty());
            assert_eq!(seq.current_move(&c), None);
            assert_eq!(seq.current_color(&c), None);
        }
    }

    #[test]
    fn test_reenable_announces_current_color() {
        let c = dance(&[], &[color(10, 10)]);
        let mut seq = Sequencer::seeded(&c);
        seq.tick(0, false, &c);

        let actions = seq.tick(5, true, &c);
        assert_eq!(
            actions.as_slice(),
            &[SequencerAction::FadeColor {
                target: color(10, 10),
                index: 0
            }]
        );
    }

    #[test]
    fn test_store_swap_rechecks_cursor() {
        let long = dance(&[10, 20, 30, 40], &[]);
        let short = dance(&[100], &[]);
        let mut seq = Sequencer::seeded(&long);
        seq.tick(35, true, &long);
        assert_eq!(seq.move_cursor(), Cursor::At(3));

        // Cursor is out of range for the new dance
        assert_eq!(seq.current_move(&short), None);

        let actions = seq.tick(50, true, &short);
        assert_eq!(seq.move_cursor(), Cursor::At(0));
        assert!(actions.is_empty());
    }

    #[derive(Default)]
    struct Recorder {
        segments: heapless::Vec<(Option<u16>, u16), 8>,
        resets: u32,
        fades: heapless::Vec<u16, 8>,
    }

    impl MotionEngine for Recorder {
        fn begin_segment(&mut self, from: Option<&Waypoint>, to: &Waypoint) {
            self.segments
                .push((from.map(|w| w.timestamp), to.timestamp))
                .unwrap();
        }

        fn reset_position(&mut self) {
            self.resets += 1;
        }
    }

    impl ColorEngine for Recorder {
        fn fade_to(&mut self, target: &ColorEvent) {
            self.fades.push(target.timestamp).unwrap();
        }
    }

    #[test]
    fn test_dispatch_to_engines() {
        let c = dance(&[10, 20], &[color(20, 10)]);
        let mut seq = Sequencer::seeded(&c);
        let mut motion = Recorder::default();
        let mut lights = Recorder::default();

        seq.tick(0, false, &c).dispatch(&mut motion, &mut lights);
        seq.tick(15, true, &c).dispatch(&mut motion, &mut lights);

        assert_eq!(motion.resets, 1);
        assert_eq!(&motion.segments[..], &[(Some(10), 20)]);
        assert_eq!(&lights.fades[..], &[20]);
    }
}
