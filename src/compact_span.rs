use crate::{direction::Direction, region::RegionId};

const CONNECTION_BITS: u32 = 6;
const NO_CONNECTION: u32 = (1 << CONNECTION_BITS) - 1;

/// One walkable span in a [`CompactHeightfield`](crate::CompactHeightfield) column.
///
/// The four neighbor connections are packed six bits apiece into a single
/// word; a connection value is the index of the mated span within the
/// neighboring column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactSpan {
    /// Height of the span's floor, measured from the field's base.
    pub floor: u16,
    /// The region the span belongs to, or [`RegionId::NONE`].
    pub region: RegionId,
    /// Amount of open space above the floor, clamped during field construction.
    pub height: u8,
    /// Packed per-direction connection values.
    connections: u32,
}

impl CompactSpan {
    /// The within-column index of the neighbor span in the given direction,
    /// or `None` if nothing is mated there.
    pub fn connection(&self, direction: Direction) -> Option<u8> {
        let raw = (self.connections >> Self::shift(direction)) & NO_CONNECTION;
        (raw != NO_CONNECTION).then_some(raw as u8)
    }

    /// Stores or clears the connection for the given direction.
    pub fn set_connection(&mut self, direction: Direction, neighbor: impl Into<Option<u8>>) {
        let raw = match neighbor.into() {
            Some(layer) => layer as u32 & NO_CONNECTION,
            None => NO_CONNECTION,
        };
        let shift = Self::shift(direction);
        self.connections = (self.connections & !(NO_CONNECTION << shift)) | (raw << shift);
    }

    fn shift(direction: Direction) -> u32 {
        direction as u32 * CONNECTION_BITS
    }
}

impl Default for CompactSpan {
    fn default() -> Self {
        let mut span = Self {
            floor: 0,
            region: RegionId::NONE,
            height: 0,
            connections: 0,
        };
        for direction in Direction::ALL {
            span.set_connection(direction, None);
        }
        span
    }
}
