/// The decomposition of a raw 32-bit address under one level's geometry
///
/// Each level decodes the same raw address with its own block size and set
/// count, so the same address can produce different tags and indices at
/// different levels. The decomposition is immutable once computed.
///
/// `block` is the raw address with the offset bits cleared. It identifies the
/// resident block independently of which byte inside it was touched, and is
/// the value used for line matching and for write-back addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub raw: u32,
    pub tag: u32,
    pub set_index: u32,
    pub offset: u32,
    pub block: u32,
}

impl Address {
    /// Decodes a raw address for a level with the given block size and number
    /// of sets
    ///
    /// Both must be powers of two; the configuration layer enforces this
    /// before any level is built, so here it is only a debug assertion
    ///
    /// # Arguments
    ///
    /// * `raw`: The raw 32-bit address
    /// * `block_size`: The level's block size in bytes
    /// * `num_sets`: The level's number of sets
    ///
    /// returns: Address
    pub fn decode(raw: u32, block_size: u32, num_sets: u32) -> Self {
        debug_assert!(block_size.is_power_of_two());
        debug_assert!(num_sets.is_power_of_two());
        let offset_bits = block_size.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        Self {
            raw,
            tag: raw >> (offset_bits + index_bits),
            set_index: (raw >> offset_bits) & (num_sets - 1),
            offset: raw & (block_size - 1),
            block: raw & !(block_size - 1),
        }
    }

    /// The block identity of a raw address, without a full decode
    pub fn block_of(raw: u32, block_size: u32) -> u32 {
        debug_assert!(block_size.is_power_of_two());
        raw & !(block_size - 1)
    }
}
