//! Choreography wire records
//!
//! Waypoints and color events travel as fixed-width little-endian records:
//!
//! ```text
//! Waypoint (11 bytes)
//! ┌──────┬─────┬─────┬───────┬──────────────┬────────────┐
//! │ TS   │ X   │ Y   │ ANGLE │ START_RADIUS │ END_RADIUS │
//! │ 2B   │ 2B  │ 2B  │ 1B    │ 2B           │ 2B         │
//! └──────┴─────┴─────┴───────┴──────────────┴────────────┘
//!
//! ColorEvent (6 bytes)
//! ┌──────┬─────┬─────┬─────┬──────┐
//! │ TS   │ HUE │ SAT │ VAL │ FADE │
//! │ 2B   │ 1B  │ 1B  │ 1B  │ 1B   │
//! └──────┴─────┴─────┴─────┴──────┘
//! ```
//!
//! Decoding is total: field ranges and ordering are never checked.

/// A record with a fixed-width wire encoding
pub trait WireRecord: Sized + Copy {
    /// Encoded size in bytes
    const WIRE_SIZE: usize;

    /// Decode one record from the first `WIRE_SIZE` bytes of `bytes`
    ///
    /// Callers must pass at least `WIRE_SIZE` bytes.
    fn decode(bytes: &[u8]) -> Self;

    /// Encode this record into the first `WIRE_SIZE` bytes of `out`
    fn encode(&self, out: &mut [u8]);

    /// Timestamp at which this record takes effect
    fn timestamp(&self) -> u16;
}

/// A target pose to reach at `timestamp`
///
/// The radii bound the arc the motion interpolator bows the path along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Waypoint {
    pub timestamp: u16,
    pub x: u16,
    pub y: u16,
    pub angle: u8,
    pub start_radius: u16,
    pub end_radius: u16,
}

/// A target color fully reached at `timestamp`
///
/// The fade starts `fade_duration` time units earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorEvent {
    pub timestamp: u16,
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
    pub fade_duration: u8,
}

impl ColorEvent {
    /// Date at which the fade towards this color begins
    pub fn fade_start(&self) -> u16 {
        self.timestamp.saturating_sub(self.fade_duration as u16)
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn write_u16(out: &mut [u8], at: usize, value: u16) {
    out[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

impl WireRecord for Waypoint {
    const WIRE_SIZE: usize = 11;

    fn decode(bytes: &[u8]) -> Self {
        Self {
            timestamp: read_u16(bytes, 0),
            x: read_u16(bytes, 2),
            y: read_u16(bytes, 4),
            angle: bytes[6],
            start_radius: read_u16(bytes, 7),
            end_radius: read_u16(bytes, 9),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        write_u16(out, 0, self.timestamp);
        write_u16(out, 2, self.x);
        write_u16(out, 4, self.y);
        out[6] = self.angle;
        write_u16(out, 7, self.start_radius);
        write_u16(out, 9, self.end_radius);
    }

    fn timestamp(&self) -> u16 {
        self.timestamp
    }
}

impl WireRecord for ColorEvent {
    const WIRE_SIZE: usize = 6;

    fn decode(bytes: &[u8]) -> Self {
        Self {
            timestamp: read_u16(bytes, 0),
            hue: bytes[2],
            saturation: bytes[3],
            value: bytes[4],
            fade_duration: bytes[5],
        }
    }

    fn encode(&self, out: &mut [u8]) {
        write_u16(out, 0, self.timestamp);
        out[2] = self.hue;
        out[3] = self.saturation;
        out[4] = self.value;
        out[5] = self.fade_duration;
    }

    fn timestamp(&self) -> u16 {
        self.timestamp
    }
}

/// Decode up to `count` records from `bytes`
///
/// Only whole records are yielded, so a short buffer yields fewer than
/// `count` items instead of reading past its end.
pub fn decode_records<'a, R: WireRecord + 'a>(bytes: &'a [u8], count: usize) -> impl Iterator<Item = R> + 'a {
    bytes
        .chunks_exact(R::WIRE_SIZE)
        .take(count)
        .map(R::decode)
}

/// Number of whole records `decode_records` will yield
pub fn decodable_count<R: WireRecord>(bytes: &[u8], count: usize) -> usize {
    (bytes.len() / R::WIRE_SIZE).min(count)
}

/// Encode `records` back to back into `out`
///
/// Returns the number of bytes written, or `None` if `out` is too small.
pub fn encode_records<R: WireRecord>(records: &[R], out: &mut [u8]) -> Option<usize> {
    let len = records.len() * R::WIRE_SIZE;
    if out.len() < len {
        return None;
    }
    for (record, chunk) in records.iter().zip(out.chunks_exact_mut(R::WIRE_SIZE)) {
        record.encode(chunk);
    }
    Some(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_waypoint_little_endian() {
        let bytes = [0x34, 0x12, 0x10, 0x00, 0x20, 0x00, 90, 0xE8, 0x03, 0xD0, 0x07];
        let wp = Waypoint::decode(&bytes);

        assert_eq!(wp.timestamp, 0x1234);
        assert_eq!(wp.x, 16);
        assert_eq!(wp.y, 32);
        assert_eq!(wp.angle, 90);
        assert_eq!(wp.start_radius, 1000);
        assert_eq!(wp.end_radius, 2000);
    }

    #[test]
    fn test_decode_color_event() {
        let bytes = [100, 0, 10, 200, 255, 20];
        let color = ColorEvent::decode(&bytes);

        assert_eq!(color.timestamp, 100);
        assert_eq!(color.hue, 10);
        assert_eq!(color.saturation, 200);
        assert_eq!(color.value, 255);
        assert_eq!(color.fade_duration, 20);
        assert_eq!(color.fade_start(), 80);
    }

    #[test]
    fn test_fade_start_saturates() {
        let color = ColorEvent {
            timestamp: 5,
            fade_duration: 20,
            ..Default::default()
        };
        assert_eq!(color.fade_start(), 0);
    }

    #[test]
    fn test_short_buffer_yields_whole_records_only() {
        let bytes = [0u8; 11 * 2 + 5];
        assert_eq!(decode_records::<Waypoint>(&bytes, 3).count(), 2);
        assert_eq!(decodable_count::<Waypoint>(&bytes, 3), 2);
        assert_eq!(decodable_count::<Waypoint>(&bytes, 1), 1);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let records = [ColorEvent::default(); 3];
        let mut out = [0u8; 17];
        assert_eq!(encode_records(&records, &mut out), None);
    }

    proptest! {
        #[test]
        fn waypoint_bytes_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..=11 * 22)) {
            let whole = bytes.len() / Waypoint::WIRE_SIZE * Waypoint::WIRE_SIZE;
            let bytes = &bytes[..whole];
            let n = whole / Waypoint::WIRE_SIZE;

            let decoded: heapless::Vec<Waypoint, 22> = decode_records(bytes, n).collect();
            prop_assert_eq!(decoded.len(), n);

            let mut out = [0u8; 11 * 22];
            let written = encode_records(&decoded, &mut out).unwrap();
            prop_assert_eq!(&out[..written], bytes);
        }

        #[test]
        fn color_bytes_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..=6 * 41)) {
            let whole = bytes.len() / ColorEvent::WIRE_SIZE * ColorEvent::WIRE_SIZE;
            let bytes = &bytes[..whole];
            let n = whole / ColorEvent::WIRE_SIZE;

            let decoded: heapless::Vec<ColorEvent, 41> = decode_records(bytes, n).collect();
            let mut out = [0u8; 6 * 41];
            let written = encode_records(&decoded, &mut out).unwrap();
            prop_assert_eq!(&out[..written], bytes);
        }
    }
}
