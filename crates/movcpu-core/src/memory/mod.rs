//! Memory model primitives: bounds policy and the flat byte store.

/// Bounds policy for width-aware accesses.
pub mod access;
/// Little-endian byte store.
pub mod store;

pub use access::validate_access;
pub use store::MemoryStore;

/// Default size of the flat memory region (8 × 512 bytes).
pub const DEFAULT_MEMORY_BYTES: usize = 8 * 512;

/// Largest memory region a context may allocate (16 MiB).
pub const MAX_MEMORY_BYTES: usize = 16 * 1024 * 1024;

/// Sample bytes pre-loaded at address zero for demonstration runs.
pub const SAMPLE_MEMORY_IMAGE: [u8; 48] = [
    0xE0, 0xEA, 0x64, 0xD4, 0xCE, 0x66, 0x55, 0x7C, //
    0x95, 0x48, 0x78, 0xC3, 0x3F, 0x97, 0x86, 0x39, //
    0xBA, 0x88, 0xF3, 0x5F, 0x79, 0x23, 0xF9, 0x52, //
    0x13, 0x71, 0xEC, 0x34, 0x61, 0x9A, 0x28, 0xCC, //
    0xB1, 0x0F, 0xE3, 0xEF, 0x5E, 0x9F, 0x0C, 0xF8, //
    0x7D, 0xDB, 0x16, 0x24, 0x2C, 0x8E, 0xAE, 0xCF, //
];
