//! Hardware memory region access
//!
//! Factory-programmed and provisioned data (unique ID, device signature)
//! lives at fixed addresses. Instead of reading raw pointers, the core reads
//! through a [`MemoryRegion`] so the decoding logic can be tested on the host.

/// Errors from memory region reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegionError {
    /// Requested more bytes than the region holds
    OutOfBounds,
    /// Underlying bus or flash read failed
    Read,
}

/// Fixed-size, read-only memory region
pub trait MemoryRegion {
    /// Size of the region in bytes
    fn size(&self) -> usize;

    /// Copy the first `out.len()` bytes of the region into `out`
    ///
    /// Fails with [`RegionError::OutOfBounds`] if `out` is longer than the region.
    fn read(&mut self, out: &mut [u8]) -> Result<(), RegionError>;
}

/// Region backed by a byte slice
///
/// Used for linker-placed storage and for host tests.
pub struct SliceRegion<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceRegion<'a> {
    /// Wrap a byte slice
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl MemoryRegion for SliceRegion<'_> {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn read(&mut self, out: &mut [u8]) -> Result<(), RegionError> {
        let src = self
            .bytes
            .get(..out.len())
            .ok_or(RegionError::OutOfBounds)?;
        out.copy_from_slice(src);
        Ok(())
    }
}

/// Decode a provisioned signature region
///
/// Erased flash reads as all `0xFF` and zero-filled storage as all `0x00`.
/// A region made up only of those two values is unprovisioned and yields
/// `None`; anything else is returned verbatim.
pub fn try_read_signature<const N: usize, R: MemoryRegion>(
    region: &mut R,
) -> Result<Option<[u8; N]>, RegionError> {
    let mut bytes = [0u8; N];
    region.read(&mut bytes)?;

    let provisioned = bytes.iter().any(|&b| b != 0xFF && b != 0x00);
    Ok(provisioned.then_some(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ff_is_unprovisioned() {
        let storage = [0xFFu8; 16];
        let mut region = SliceRegion::new(&storage);
        assert_eq!(try_read_signature::<16, _>(&mut region), Ok(None));
    }

    #[test]
    fn test_all_zero_is_unprovisioned() {
        let storage = [0x00u8; 16];
        let mut region = SliceRegion::new(&storage);
        assert_eq!(try_read_signature::<16, _>(&mut region), Ok(None));
    }

    #[test]
    fn test_mixed_erase_patterns_are_unprovisioned() {
        let mut storage = [0xFFu8; 16];
        storage[3] = 0x00;
        storage[15] = 0x00;
        let mut region = SliceRegion::new(&storage);
        assert_eq!(try_read_signature::<16, _>(&mut region), Ok(None));
    }

    #[test]
    fn test_single_real_byte_is_provisioned() {
        let mut storage = [0xFFu8; 16];
        storage[7] = 0x5A;
        let mut region = SliceRegion::new(&storage);

        let sig = try_read_signature::<16, _>(&mut region).unwrap();
        assert_eq!(sig, Some(storage));
    }

    #[test]
    fn test_region_too_small() {
        let storage = [0x42u8; 8];
        let mut region = SliceRegion::new(&storage);
        assert_eq!(
            try_read_signature::<16, _>(&mut region),
            Err(RegionError::OutOfBounds)
        );
    }

    #[test]
    fn test_reads_prefix_of_larger_region() {
        let storage: [u8; 4] = [1, 2, 3, 4];
        let mut region = SliceRegion::new(&storage);
        let mut out = [0u8; 2];
        region.read(&mut out).unwrap();
        assert_eq!(out, [1, 2]);
        assert_eq!(region.size(), 4);
    }
}
