//! The image storage collaborator.

use crate::{annotation::ImageRecord, common::*, error::DatasetError};
use image::{DynamicImage, GenericImageView as _};

/// Decodes the pixels of a catalog image.
pub trait ImageStorage
where
    Self: Debug + Send + Sync,
{
    type Image;

    /// Load the decoded image. Its size must agree with the record.
    fn load(&self, record: &ImageRecord) -> Result<Self::Image>;
}

/// Images stored as files under one directory, named by `file_name`.
#[derive(Debug, Clone)]
pub struct DirImageStorage {
    root: PathBuf,
}

impl DirImageStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_owned(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageStorage for DirImageStorage {
    type Image = DynamicImage;

    fn load(&self, record: &ImageRecord) -> Result<Self::Image> {
        let path = self.root.join(&record.file_name);
        let image = image::open(&path)
            .with_context(|| format!("failed to decode image '{}'", path.display()))?;

        let (actual_width, actual_height) = image.dimensions();
        let (actual_width, actual_height) = (actual_width as usize, actual_height as usize);
        if actual_width != record.width || actual_height != record.height {
            return Err(DatasetError::DimensionMismatch {
                file_name: record.file_name.clone(),
                width: record.width,
                height: record.height,
                actual_width,
                actual_height,
            }
            .into());
        }

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn record(width: usize, height: usize) -> ImageRecord {
        ImageRecord {
            id: 1,
            width,
            height,
            file_name: "000001.png".into(),
            license: None,
            coco_url: None,
            flickr_url: None,
            date_captured: None,
        }
    }

    #[test]
    fn load_image_from_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        RgbImage::new(6, 4).save(dir.path().join("000001.png"))?;

        let storage = DirImageStorage::new(dir.path());
        let image = storage.load(&record(6, 4))?;
        assert_eq!(image.dimensions(), (6, 4));
        Ok(())
    }

    #[test]
    fn size_mismatch_is_reported() -> Result<()> {
        let dir = tempfile::tempdir()?;
        RgbImage::new(6, 4).save(dir.path().join("000001.png"))?;

        let storage = DirImageStorage::new(dir.path());
        let error = storage.load(&record(4, 6)).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DatasetError>(),
            Some(DatasetError::DimensionMismatch {
                actual_width: 6,
                actual_height: 4,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirImageStorage::new(dir.path());
        assert!(storage.load(&record(6, 4)).is_err());
    }
}
