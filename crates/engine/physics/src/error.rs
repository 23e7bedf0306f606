use thiserror::Error;

/// Malformed level geometry, detected while classifying faces
///
/// `geometry` is the position of the offending buffer in the slice handed to
/// [`crate::classify_faces`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("geometry {geometry}: position buffer length {len} is not a multiple of 3")]
    PositionLength { geometry: usize, len: usize },

    #[error("geometry {geometry}: {len} indices do not form whole triangles")]
    IndexCount { geometry: usize, len: usize },

    #[error("geometry {geometry}: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        geometry: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("geometry {geometry}: vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex { geometry: usize, vertex: usize },
}
