/// The area type of a span. Regions never span more than one area type,
/// so contours inherit the area of the spans they trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AreaType(pub u8);

impl AreaType {
    /// The area type 0. Spans with this area type are not walkable.
    pub const NOT_WALKABLE: Self = Self(0);
    /// Default area type for walkable spans. The highest possible area type.
    pub const DEFAULT_WALKABLE: Self = Self(u8::MAX);
}

impl From<u8> for AreaType {
    fn from(value: u8) -> Self {
        AreaType(value)
    }
}
