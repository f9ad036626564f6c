//! Constants for the reconstruction engine

/// Default snapshot history budget (64 MB)
/// The fixed program needs well under a megabyte; the headroom covers larger sources
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 64 * 1024 * 1024;

/// Trace prefix for the returned value
pub const FLAG_PREFIX: &str = "FLAG: ";

/// Largest string `REPEAT` may build (16 MB)
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;
