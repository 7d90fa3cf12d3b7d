//! Durable choreography store
//!
//! Owns the flash region and a RAM mirror of what it holds. The sequencer
//! reads the mirror; only [`DurableStore::commit`] changes it, and only by
//! reloading from flash after the write sequence.

use pirouette_protocol::records::{decode_records, encode_records};
use pirouette_protocol::{ColorEvent, Waypoint, WireRecord};

use super::layout::{
    decode_count, encode_count, COLORS_OFFSET, COLOR_COUNT_OFFSET, COUNT_SIZE, MAX_ARRAY_SIZE,
    LAYOUT_SIZE, MOVES_OFFSET, MOVE_COUNT_OFFSET,
};
use crate::choreography::{Choreography, MAX_COLOR_POINTS, MAX_MOVE_POINTS};
use crate::staging::StagingBuffer;
use crate::traits::flash::{FlashError, FlashRegion};

/// Step of the commit sequence, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommitStep {
    Erase,
    Moves,
    MoveCount,
    Colors,
    ColorCount,
    /// Reading the region back and comparing with what was staged
    Verify,
}

/// A commit that did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommitError {
    /// First step that failed
    pub step: CommitStep,
    /// Medium error reported by that step
    pub source: FlashError,
}

impl CommitError {
    /// Whether the caller may retry the commit with the same staged data
    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

/// Flash-backed choreography with a RAM mirror
pub struct DurableStore<R: FlashRegion> {
    region: R,
    mirror: Choreography,
}

impl<R: FlashRegion> DurableStore<R> {
    /// Wrap a region; the mirror stays empty until [`reload`](Self::reload)
    pub fn new(region: R) -> Self {
        Self {
            region,
            mirror: Choreography::new(),
        }
    }

    /// Committed choreography
    pub fn choreography(&self) -> &Choreography {
        &self.mirror
    }

    /// Re-read the region into the mirror
    ///
    /// On a read error the mirror is left empty.
    pub fn reload(&mut self) -> Result<(), FlashError> {
        match read_choreography(&mut self.region) {
            Ok(choreography) => {
                self.mirror = choreography;
                Ok(())
            }
            Err(e) => {
                self.mirror.clear();
                Err(e)
            }
        }
    }

    /// Persist the staged choreography, replacing the stored one
    ///
    /// Erases the region, then writes the waypoints, their count, the color
    /// events and their count, in that order. The caller must hold exclusive
    /// access to the region for the whole call.
    ///
    /// On success the staging buffer is emptied. On failure it is kept so
    /// the commit can be retried, and the mirror holds whatever the region
    /// now reads back as.
    pub fn commit(&mut self, staging: &mut StagingBuffer) -> Result<(), CommitError> {
        let staged = staging.choreography();
        let written = write_choreography(&mut self.region, staged);

        let reloaded = self.reload();
        written?;
        reloaded.map_err(|source| CommitError {
            step: CommitStep::Verify,
            source,
        })?;
        if self.mirror != *staged {
            return Err(CommitError {
                step: CommitStep::Verify,
                source: FlashError::Program,
            });
        }

        staging.clear();
        Ok(())
    }

    /// Overwrite the staging buffer with the choreography held in flash
    pub fn export(&mut self, staging: &mut StagingBuffer) -> Result<(), FlashError> {
        let stored = read_choreography(&mut self.region)?;
        staging.load_from(&stored);
        Ok(())
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    pub fn region_mut(&mut self) -> &mut R {
        &mut self.region
    }
}

fn step<T>(step: CommitStep, result: Result<T, FlashError>) -> Result<T, CommitError> {
    result.map_err(|source| CommitError { step, source })
}

fn write_choreography<R: FlashRegion>(
    region: &mut R,
    choreography: &Choreography,
) -> Result<(), CommitError> {
    let mut buffer = [0u8; MAX_ARRAY_SIZE];

    step(CommitStep::Erase, check_capacity(region))?;
    step(CommitStep::Erase, region.erase())?;

    let moves = &choreography.moves;
    let len = encode_records(moves, &mut buffer).unwrap_or(0);
    step(CommitStep::Moves, region.program(MOVES_OFFSET, &buffer[..len]))?;
    step(
        CommitStep::MoveCount,
        region.program(MOVE_COUNT_OFFSET, &encode_count(moves.len())),
    )?;

    let colors = &choreography.colors;
    let len = encode_records(colors, &mut buffer).unwrap_or(0);
    step(CommitStep::Colors, region.program(COLORS_OFFSET, &buffer[..len]))?;
    step(
        CommitStep::ColorCount,
        region.program(COLOR_COUNT_OFFSET, &encode_count(colors.len())),
    )?;

    Ok(())
}

/// Read the choreography stored in `region`
///
/// Counts above capacity, including the all-ones pattern of an erased
/// sector, read as zero.
pub fn read_choreography<R: FlashRegion>(region: &mut R) -> Result<Choreography, FlashError> {
    check_capacity(region)?;

    let mut choreography = Choreography::new();
    let mut buffer = [0u8; MAX_ARRAY_SIZE];

    let n = read_count(region, MOVE_COUNT_OFFSET, MAX_MOVE_POINTS)?;
    let len = n * Waypoint::WIRE_SIZE;
    region.read(MOVES_OFFSET, &mut buffer[..len])?;
    for wp in decode_records::<Waypoint>(&buffer[..len], n) {
        let _ = choreography.moves.push(wp);
    }

    let n = read_count(region, COLOR_COUNT_OFFSET, MAX_COLOR_POINTS)?;
    let len = n * ColorEvent::WIRE_SIZE;
    region.read(COLORS_OFFSET, &mut buffer[..len])?;
    for color in decode_records::<ColorEvent>(&buffer[..len], n) {
        let _ = choreography.colors.push(color);
    }

    Ok(choreography)
}

/// The region must hold the whole layout
fn check_capacity<R: FlashRegion>(region: &R) -> Result<(), FlashError> {
    if region.capacity() < LAYOUT_SIZE {
        return Err(FlashError::OutOfBounds);
    }
    Ok(())
}

fn read_count<R: FlashRegion>(region: &mut R, offset: u32, capacity: usize) -> Result<usize, FlashError> {
    let mut raw = [0u8; COUNT_SIZE];
    region.read(offset, &mut raw)?;
    Ok(decode_count(raw, capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::flash::mock::MockRegion;
    use pirouette_protocol::encode_records;

    fn waypoint(ts: u16) -> Waypoint {
        Waypoint {
            timestamp: ts,
            x: ts * 2,
            y: ts * 3,
            angle: (ts % 256) as u8,
            start_radius: 100,
            end_radius: 200,
        }
    }

    fn color(ts: u16, fade: u8) -> ColorEvent {
        ColorEvent {
            timestamp: ts,
            hue: 10,
            saturation: 200,
            value: 255,
            fade_duration: fade,
        }
    }

    fn staged(moves: &[Waypoint], colors: &[ColorEvent]) -> StagingBuffer {
        let mut staging = StagingBuffer::new();
        let mut bytes = [0u8; MAX_ARRAY_SIZE];
        let len = encode_records(moves, &mut bytes).unwrap();
        staging.append_moves(&bytes[..len], moves.len()).unwrap();
        let len = encode_records(colors, &mut bytes).unwrap();
        staging.append_colors(&bytes[..len], colors.len()).unwrap();
        staging
    }

    #[test]
    fn test_erased_region_is_empty() {
        let mut store = DurableStore::new(MockRegion::new());
        store.reload().unwrap();
        assert!(store.choreography().is_empty());
    }

    #[test]
    fn test_commit_then_export_roundtrip() {
        let moves = [waypoint(10), waypoint(20), waypoint(30)];
        let colors = [color(100, 20), color(200, 0)];
        let mut staging = staged(&moves, &colors);
        let expected = staging.choreography().clone();

        let mut store = DurableStore::new(MockRegion::new());
        store.commit(&mut staging).unwrap();

        assert!(staging.is_empty());
        assert_eq!(store.choreography(), &expected);

        store.export(&mut staging).unwrap();
        assert_eq!(staging.choreography(), &expected);
    }

    #[test]
    fn test_commit_survives_reopen() {
        let mut staging = staged(&[waypoint(5)], &[color(7, 1)]);
        let mut store = DurableStore::new(MockRegion::new());
        store.commit(&mut staging).unwrap();

        let region = store.region().clone();
        let mut reopened = DurableStore::new(region);
        reopened.reload().unwrap();
        assert_eq!(reopened.choreography().moves[0], waypoint(5));
        assert_eq!(reopened.choreography().colors[0], color(7, 1));
    }

    #[test]
    fn test_commit_replaces_previous_dance() {
        let mut store = DurableStore::new(MockRegion::new());
        let mut first = staged(&[waypoint(1), waypoint(2)], &[color(3, 0)]);
        store.commit(&mut first).unwrap();

        let mut second = staged(&[waypoint(9)], &[]);
        store.commit(&mut second).unwrap();

        assert_eq!(store.choreography().moves.len(), 1);
        assert!(store.choreography().colors.is_empty());
        assert_eq!(store.region().erase_count, 2);
    }

    #[test]
    fn test_commit_empty_staging_clears_store() {
        let mut store = DurableStore::new(MockRegion::new());
        store.commit(&mut staged(&[waypoint(1)], &[])).unwrap();
        store.commit(&mut StagingBuffer::new()).unwrap();
        assert!(store.choreography().is_empty());
    }

    #[test]
    fn test_erase_failure_keeps_staging() {
        let mut store = DurableStore::new(MockRegion::new());
        store.region_mut().fail_erase(FlashError::Erase);
        let mut staging = staged(&[waypoint(1)], &[]);

        let err = store.commit(&mut staging).unwrap_err();

        assert_eq!(
            err,
            CommitError {
                step: CommitStep::Erase,
                source: FlashError::Erase
            }
        );
        assert!(err.is_retryable());
        assert_eq!(staging.moves().len(), 1);
    }

    #[test]
    fn test_failure_reports_failing_step() {
        let cases = [
            (0, CommitStep::Moves),
            (1, CommitStep::MoveCount),
            (2, CommitStep::Colors),
            (3, CommitStep::ColorCount),
        ];
        for (nth, expected_step) in cases {
            let mut store = DurableStore::new(MockRegion::new());
            store.region_mut().fail_program(nth, FlashError::Program);
            let mut staging = staged(&[waypoint(1)], &[color(2, 0)]);

            let err = store.commit(&mut staging).unwrap_err();
            assert_eq!(err.step, expected_step);
            assert!(!staging.is_empty());
        }
    }

    #[test]
    fn test_crash_before_color_count_leaves_colors_empty() {
        let mut store = DurableStore::new(MockRegion::new());
        store.region_mut().fail_program(3, FlashError::Program);
        let mut staging = staged(&[waypoint(1)], &[color(2, 0)]);

        assert!(store.commit(&mut staging).is_err());

        // Color count was never written, so the erased count reads as zero
        assert_eq!(store.choreography().moves.len(), 1);
        assert!(store.choreography().colors.is_empty());
    }

    #[test]
    fn test_timeout_is_fatal() {
        let mut store = DurableStore::new(MockRegion::new());
        store.region_mut().fail_program(0, FlashError::Timeout);
        let err = store.commit(&mut staged(&[waypoint(1)], &[])).unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_implausible_counts_read_as_empty() {
        let mut region = MockRegion::new();
        region.erase().unwrap();
        region.program(MOVE_COUNT_OFFSET, &encode_count(1000)).unwrap();
        region.program(COLOR_COUNT_OFFSET, &encode_count(111)).unwrap();

        let mut store = DurableStore::new(region);
        store.reload().unwrap();
        assert!(store.choreography().is_empty());

        let mut staging = staged(&[waypoint(4)], &[]);
        store.export(&mut staging).unwrap();
        assert!(staging.is_empty());
    }

    #[test]
    fn test_full_capacity_roundtrip() {
        let mut moves = [Waypoint::default(); MAX_MOVE_POINTS];
        for (i, wp) in moves.iter_mut().enumerate() {
            *wp = waypoint(i as u16);
        }
        let mut colors = [ColorEvent::default(); MAX_COLOR_POINTS];
        for (i, c) in colors.iter_mut().enumerate() {
            *c = color(i as u16, (i % 7) as u8);
        }
        let mut staging = staged(&moves, &colors);
        let mut store = DurableStore::new(MockRegion::new());

        store.commit(&mut staging).unwrap();

        assert_eq!(&store.choreography().moves[..], &moves[..]);
        assert_eq!(&store.choreography().colors[..], &colors[..]);
    }

    #[test]
    fn test_region_smaller_than_layout() {
        let mut store = DurableStore::new(MockRegion::truncated(LAYOUT_SIZE - 1));
        assert_eq!(store.reload(), Err(FlashError::OutOfBounds));

        let mut staging = staged(&[waypoint(1)], &[]);
        let err = store.commit(&mut staging).unwrap_err();
        assert_eq!(
            err,
            CommitError {
                step: CommitStep::Erase,
                source: FlashError::OutOfBounds
            }
        );
        assert!(!err.is_retryable());
        // Nothing touched the medium
        assert_eq!(store.region().erase_count, 0);
        assert_eq!(staging.moves().len(), 1);
    }

    #[test]
    fn test_region_exactly_layout_size() {
        let mut store = DurableStore::new(MockRegion::truncated(LAYOUT_SIZE));
        let mut staging = staged(&[waypoint(1)], &[color(2, 0)]);
        store.commit(&mut staging).unwrap();
        assert_eq!(store.choreography().moves.len(), 1);
        assert_eq!(store.choreography().colors.len(), 1);
    }
}
