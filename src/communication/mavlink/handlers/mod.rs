//! Per-message protocol handlers
//!
//! One module per protocol family. Handlers are synchronous: they read or
//! mutate the component registry and return reply batches for the server to
//! send.

pub mod camera;
pub mod param;

/// Truncate-and-pad a byte string into a fixed-width wire field.
pub(crate) fn pad_bytes<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let len = src.len().min(N);
    out[..len].copy_from_slice(&src[..len]);
    out
}
