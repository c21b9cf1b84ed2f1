bitflags::bitflags! {
    /// A region in a [`CompactHeightfield`](crate::compact_heightfield::CompactHeightfield).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[repr(transparent)]
    pub struct RegionId: u16 {
        /// The default region, which is used for spans that are not in a region, i.e. not walkable.
        const NONE = 0;
        /// Heightfield border flag.
        /// If a heightfield region ID has this bit set, then the region is a border
        /// region and its spans are considered un-walkable.
        /// (Used during the region and contour build process.)
        const BORDER_REGION = 0x8000;
        /// The maximum region ID. Doubles as the mask that extracts the region id
        /// portion out of a contour vertex tag.
        const MAX = u16::MAX;
    }
}

impl RegionId {
    /// Whether this span belongs to no region at all or to a heightfield border region.
    /// Such spans never seed a contour.
    #[inline]
    pub fn is_border_or_none(&self) -> bool {
        *self == Self::NONE || self.contains(Self::BORDER_REGION)
    }
}

impl Default for RegionId {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<u16> for RegionId {
    fn from(value: u16) -> Self {
        RegionId::from_bits_truncate(value)
    }
}
