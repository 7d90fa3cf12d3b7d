//! Sequencer state and timeline cursors

/// Sequencer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerState {
    /// Gate closed: cursors pinned at rest, robot held at its rest position
    #[default]
    Disabled,
    /// Gate open: cursors advance along the stored timeline
    Running,
}

impl SequencerState {
    /// State selected by the gate flag
    ///
    /// The gate is sampled once per tick with no debounce, so the state is
    /// a pure function of the flag.
    pub fn from_gate(enabled: bool) -> Self {
        if enabled {
            SequencerState::Running
        } else {
            SequencerState::Disabled
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, SequencerState::Running)
    }
}

/// Position of the sequencer in one timeline
///
/// An index rather than a reference: the stored choreography can be
/// replaced under the cursor, so every read re-checks it against the
/// current list length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cursor {
    /// The timeline is empty
    #[default]
    Empty,
    /// Index into the timeline
    At(usize),
}

impl Cursor {
    /// Rest position for a timeline of `len` elements
    pub fn rest(len: usize) -> Self {
        if len == 0 {
            Cursor::Empty
        } else {
            Cursor::At(0)
        }
    }

    /// Index, if it is still inside a timeline of `len` elements
    pub fn index(self, len: usize) -> Option<usize> {
        match self {
            Cursor::At(i) if i < len => Some(i),
            _ => None,
        }
    }

    /// Element under the cursor
    pub fn resolve<T>(self, items: &[T]) -> Option<&T> {
        self.index(items.len()).map(|i| &items[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_gate() {
        assert_eq!(SequencerState::from_gate(true), SequencerState::Running);
        assert_eq!(SequencerState::from_gate(false), SequencerState::Disabled);
        assert!(SequencerState::Running.is_running());
        assert!(!SequencerState::default().is_running());
    }

    #[test]
    fn test_rest_cursor() {
        assert_eq!(Cursor::rest(0), Cursor::Empty);
        assert_eq!(Cursor::rest(3), Cursor::At(0));
    }

    #[test]
    fn test_stale_cursor_resolves_to_none() {
        let items = [1, 2, 3];
        assert_eq!(Cursor::At(2).resolve(&items), Some(&3));
        assert_eq!(Cursor::At(3).resolve(&items), None);
        assert_eq!(Cursor::Empty.resolve(&items), None);
        assert_eq!(Cursor::At(5).index(2), None);
    }
}
