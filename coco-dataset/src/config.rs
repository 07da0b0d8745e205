//! Dataset configuration format.

use crate::common::*;

/// Dataset options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// The COCO instances JSON file.
    pub annotation_file: PathBuf,
    /// The directory holding the image files.
    pub image_dir: PathBuf,
    /// Drop images that carry too little supervision.
    #[serde(default = "default_remove_images_without_annotations")]
    pub remove_images_without_annotations: bool,
}

impl DatasetConfig {
    /// Load a JSON5 config file.
    ///
    /// Relative paths in the file are resolved against the directory of the
    /// config file.
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = json5::from_str(&text)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;

        if let Some(base_dir) = path.parent() {
            config.annotation_file = base_dir.join(&config.annotation_file);
            config.image_dir = base_dir.join(&config.image_dir);
        }

        Ok(config)
    }
}

fn default_remove_images_without_annotations() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_json5_config() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dataset.json5");
        fs::write(
            &path,
            r#"{
                // paths are relative to this file
                annotation_file: "annotations/instances_val2017.json",
                image_dir: "/data/coco/val2017",
            }"#,
        )?;

        let config = DatasetConfig::open(&path)?;
        assert_eq!(
            config.annotation_file,
            dir.path().join("annotations/instances_val2017.json")
        );
        assert_eq!(config.image_dir, Path::new("/data/coco/val2017"));
        assert!(config.remove_images_without_annotations);
        Ok(())
    }

    #[test]
    fn disable_filtering() -> Result<()> {
        let config: DatasetConfig = json5::from_str(
            r#"{
                annotation_file: "a.json",
                image_dir: "images",
                remove_images_without_annotations: false,
            }"#,
        )?;
        assert!(!config.remove_images_without_annotations);
        Ok(())
    }
}
