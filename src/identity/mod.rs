//! Deterministic point identifiers.
//!
//! Each stored point's ID is a name-based UUID derived from the source
//! document and the chunk's 0-based position within it. Re-deriving the ID
//! for the same `(source_id, position)` pair always yields the same value,
//! which is what makes re-ingestion overwrite points instead of duplicating
//! them. Changing the `source_id` produces a fully disjoint ID set.


use uuid::Uuid;

/// Derive the stable point ID for one chunk of a source document.
///
/// The ID is a UUIDv5 over `NAMESPACE_URL` of `"{source_id}:{position}"`,
/// so any UUIDv5 implementation of the same scheme produces identical values.
#[inline]
pub fn chunk_id(source_id: &str, position: usize) -> String {
    let name = format!("{source_id}:{position}");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
}
