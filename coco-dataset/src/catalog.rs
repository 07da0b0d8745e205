//! The annotation catalog collaborator.

use crate::{
    annotation::{AnnotationRecord, Category, ImageRecord},
    common::*,
};

/// Read access to an annotation catalog.
pub trait AnnotationCatalog
where
    Self: Debug + Send + Sync,
{
    /// Image ids in the native order of the catalog.
    fn image_ids(&self) -> Vec<usize>;

    /// The metadata record of an image.
    fn image(&self, image_id: usize) -> Option<&ImageRecord>;

    /// Annotations of an image in catalog order. Unknown images have none.
    fn annotations(&self, image_id: usize) -> &[AnnotationRecord];

    /// Category ids in the native enumeration order of the catalog.
    fn category_ids(&self) -> Vec<usize>;
}

/// Layout of a COCO instances JSON file. Unlisted sections such as `info`
/// and `licenses` are ignored.
#[derive(Debug, Clone, Deserialize)]
struct InstancesFile {
    images: Vec<ImageRecord>,
    #[serde(default)]
    annotations: Vec<AnnotationRecord>,
    categories: Vec<Category>,
}

/// An in-memory catalog loaded from a COCO instances file.
#[derive(Debug, Clone)]
pub struct CocoCatalog {
    images: IndexMap<usize, ImageRecord>,
    categories: IndexMap<usize, Category>,
    annotations: HashMap<usize, Vec<AnnotationRecord>>,
}

impl CocoCatalog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read annotation file '{}'", path.display()))?;
        let catalog = Self::from_json_str(&text)
            .with_context(|| format!("failed to load annotation file '{}'", path.display()))?;
        info!(
            "loaded {} images and {} categories from '{}'",
            catalog.images.len(),
            catalog.categories.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let InstancesFile {
            images,
            annotations,
            categories,
        } = serde_json::from_str(text)?;
        Self::from_parts(images, annotations, categories)
    }

    /// Index the records by image and category.
    ///
    /// Duplicated ids and annotations of unknown images are rejected.
    pub fn from_parts(
        images: Vec<ImageRecord>,
        annotations: Vec<AnnotationRecord>,
        categories: Vec<Category>,
    ) -> Result<Self> {
        let mut image_map = IndexMap::with_capacity(images.len());
        for image in images {
            let id = image.id;
            ensure!(
                image_map.insert(id, image).is_none(),
                "duplicated image id {}",
                id
            );
        }

        let mut category_map = IndexMap::with_capacity(categories.len());
        for category in categories {
            let id = category.id;
            ensure!(
                category_map.insert(id, category).is_none(),
                "duplicated category id {}",
                id
            );
        }

        let mut annotation_ids = HashSet::with_capacity(annotations.len());
        let mut unknown_categories = HashSet::new();
        let mut annotation_map: HashMap<usize, Vec<AnnotationRecord>> = HashMap::new();

        for ann in annotations {
            ensure!(
                annotation_ids.insert(ann.id),
                "duplicated annotation id {}",
                ann.id
            );
            ensure!(
                image_map.contains_key(&ann.image_id),
                "annotation {} refers to unknown image id {}",
                ann.id,
                ann.image_id
            );
            if !category_map.contains_key(&ann.category_id) {
                unknown_categories.insert(ann.category_id);
            }
            annotation_map.entry(ann.image_id).or_default().push(ann);
        }

        if !unknown_categories.is_empty() {
            warn!(
                "these category ids are used by annotations but not defined: {:?}",
                unknown_categories.iter().sorted().collect::<Vec<_>>()
            );
        }

        Ok(Self {
            images: image_map,
            categories: category_map,
            annotations: annotation_map,
        })
    }

    /// Categories in native enumeration order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn category(&self, category_id: usize) -> Option<&Category> {
        self.categories.get(&category_id)
    }

    pub fn stats(&self) -> CatalogStats {
        let all_annotations = || self.annotations.values().flatten();

        CatalogStats {
            num_images: self.images.len(),
            num_categories: self.categories.len(),
            num_annotations: all_annotations().count(),
            num_crowd_annotations: all_annotations().filter(|ann| ann.iscrowd).count(),
            num_keypoint_annotations: all_annotations()
                .filter(|ann| ann.keypoints.is_some())
                .count(),
            num_images_without_annotations: self
                .images
                .keys()
                .filter(|id| self.annotations(**id).is_empty())
                .count(),
        }
    }
}

impl AnnotationCatalog for CocoCatalog {
    fn image_ids(&self) -> Vec<usize> {
        self.images.keys().copied().collect()
    }

    fn image(&self, image_id: usize) -> Option<&ImageRecord> {
        self.images.get(&image_id)
    }

    fn annotations(&self, image_id: usize) -> &[AnnotationRecord] {
        self.annotations
            .get(&image_id)
            .map(|anns| anns.as_slice())
            .unwrap_or(&[])
    }

    fn category_ids(&self) -> Vec<usize> {
        self.categories.keys().copied().collect()
    }
}

/// Summary counts of a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub num_images: usize,
    pub num_categories: usize,
    pub num_annotations: usize,
    pub num_crowd_annotations: usize,
    pub num_keypoint_annotations: usize,
    pub num_images_without_annotations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "info": {"description": "sample"},
            "licenses": [],
            "images": [
                {"id": 9, "width": 64, "height": 48, "file_name": "9.png"},
                {"id": 3, "width": 32, "height": 32, "file_name": "3.png"},
                {"id": 5, "width": 32, "height": 32, "file_name": "5.png"}
            ],
            "annotations": [
                {"id": 1, "image_id": 9, "bbox": [1, 1, 10, 10], "category_id": 18, "iscrowd": 0},
                {"id": 2, "image_id": 3, "bbox": [2, 2, 5, 5], "category_id": 1, "iscrowd": 1},
                {"id": 3, "image_id": 9, "bbox": [4, 4, 8, 8], "category_id": 1, "iscrowd": 0}
            ],
            "categories": [
                {"id": 18, "name": "dog", "supercategory": "animal"},
                {"id": 1, "name": "person", "supercategory": "person"}
            ]
        })
    }

    #[test]
    fn native_order_is_file_order() -> Result<()> {
        let catalog = CocoCatalog::from_json_str(&sample().to_string())?;
        assert_eq!(catalog.image_ids(), vec![9, 3, 5]);
        assert_eq!(catalog.category_ids(), vec![18, 1]);
        assert_eq!(
            catalog
                .annotations(9)
                .iter()
                .map(|ann| ann.id)
                .collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert!(catalog.annotations(5).is_empty());
        assert!(catalog.annotations(404).is_empty());
        assert_eq!(catalog.image(3).map(|img| img.width), Some(32));
        assert_eq!(catalog.category(18).map(|cat| cat.name.as_str()), Some("dog"));
        Ok(())
    }

    #[test]
    fn catalog_stats() -> Result<()> {
        let catalog = CocoCatalog::from_json_str(&sample().to_string())?;
        assert_eq!(
            catalog.stats(),
            CatalogStats {
                num_images: 3,
                num_categories: 2,
                num_annotations: 3,
                num_crowd_annotations: 1,
                num_keypoint_annotations: 0,
                num_images_without_annotations: 1,
            }
        );
        Ok(())
    }

    #[test]
    fn reject_dangling_annotation() {
        let mut value = sample();
        value["annotations"][0]["image_id"] = json!(77);
        assert!(CocoCatalog::from_json_str(&value.to_string()).is_err());
    }

    #[test]
    fn reject_duplicated_ids() {
        let mut value = sample();
        value["images"][1]["id"] = json!(9);
        assert!(CocoCatalog::from_json_str(&value.to_string()).is_err());

        let mut value = sample();
        value["categories"][1]["id"] = json!(18);
        assert!(CocoCatalog::from_json_str(&value.to_string()).is_err());

        let mut value = sample();
        value["annotations"][1]["id"] = json!(1);
        assert!(CocoCatalog::from_json_str(&value.to_string()).is_err());
    }

    #[test]
    fn reject_annotation_without_crowd_flag() {
        let mut value = sample();
        value["annotations"][2]
            .as_object_mut()
            .unwrap()
            .remove("iscrowd");
        assert!(CocoCatalog::from_json_str(&value.to_string()).is_err());
    }

    #[test]
    fn unknown_category_is_loaded() -> Result<()> {
        let mut value = sample();
        value["annotations"][0]["category_id"] = json!(99);
        let catalog = CocoCatalog::from_json_str(&value.to_string())?;
        assert_eq!(catalog.annotations(9)[0].category_id, 99);
        Ok(())
    }
}
