//! Per-image training targets for COCO style instance catalogs.
//!
//! The [dataset::CocoDataset] ties an [catalog::AnnotationCatalog] and an
//! [storage::ImageStorage] together, filters out images without usable
//! supervision and builds a [target::Target] for every retrieved image.

mod common;
pub mod annotation;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod storage;
pub mod target;
pub mod transform;
