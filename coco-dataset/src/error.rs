//! Failures that callers are expected to tell apart.
//!
//! These are returned inside [anyhow::Error] and can be recovered with
//! `error.downcast_ref::<DatasetError>()`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("index {index} is out of range for a dataset of {len} images")]
    IndexOutOfRange { index: isize, len: usize },
    #[error("category id {0} is not defined in the catalog")]
    UnknownCategory(usize),
    #[error("label {0} does not map to any catalog category")]
    UnknownLabel(usize),
    #[error("image id {0} has no metadata record in the catalog")]
    MissingImage(usize),
    #[error("annotation {0} has no keypoints while the first annotation of its image has")]
    MissingKeypoints(usize),
    #[error(
        "image '{file_name}' decodes to {actual_width}x{actual_height}, \
         but the catalog records {width}x{height}"
    )]
    DimensionMismatch {
        file_name: String,
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}
