//! Records of the COCO instances format.

use crate::common::*;
use bbox::HW;

/// One object instance as listed in the annotation catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: usize,
    pub image_id: usize,
    /// Box in `[x, y, width, height]` pixel units.
    pub bbox: [R64; 4],
    /// Raw mask representation. Box-only catalogs leave it empty.
    #[serde(default)]
    pub segmentation: Segmentation,
    pub category_id: usize,
    #[serde(with = "crowd_flag")]
    pub iscrowd: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<R64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypoints: Option<Keypoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_keypoints: Option<usize>,
}

/// The mask of an instance, either polygons or a run-length encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segmentation {
    /// Each polygon is a flat `[x0, y0, x1, y1, ...]` list.
    Polygons(Vec<Vec<R64>>),
    Rle(Rle),
}

impl Segmentation {
    /// True if no mask is attached at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Polygons(polygons) => polygons.is_empty(),
            Self::Rle(_) => false,
        }
    }
}

impl Default for Segmentation {
    fn default() -> Self {
        Self::Polygons(vec![])
    }
}

/// Run-length encoded mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rle {
    pub counts: RleCounts,
    /// `[height, width]` of the encoded mask.
    pub size: [usize; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RleCounts {
    Uncompressed(Vec<u32>),
    Compressed(String),
}

/// Ordered `(x, y, visibility)` triples of one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<R64>", into = "Vec<R64>")]
pub struct Keypoints {
    points: Vec<[R64; 3]>,
}

impl Keypoints {
    pub fn new(points: Vec<[R64; 3]>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[[R64; 3]] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of triples with positive visibility.
    pub fn num_visible(&self) -> usize {
        self.points.iter().filter(|[_, _, v]| *v > 0.0).count()
    }
}

impl TryFrom<Vec<R64>> for Keypoints {
    type Error = Error;

    fn try_from(flat: Vec<R64>) -> Result<Self> {
        ensure!(
            flat.len() % 3 == 0,
            "keypoints must come in (x, y, visibility) triples, but got {} values",
            flat.len()
        );
        let points = flat
            .into_iter()
            .tuples()
            .map(|(x, y, v)| [x, y, v])
            .collect();
        Ok(Self { points })
    }
}

impl From<Keypoints> for Vec<R64> {
    fn from(keypoints: Keypoints) -> Self {
        keypoints.points.into_iter().flatten().collect()
    }
}

/// The image metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: usize,
    pub width: usize,
    pub height: usize,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coco_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flickr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_captured: Option<String>,
}

impl ImageRecord {
    pub fn size(&self) -> HW<usize> {
        HW::new(self.height, self.width)
    }
}

/// An object category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: usize,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
    /// Keypoint names of person-keypoint catalogs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypoints: Option<Vec<String>>,
    /// 1-based keypoint index pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<Vec<[usize; 2]>>,
}

/// `iscrowd` is written as 0/1 in COCO files, but some tools emit booleans.
mod crowd_flag {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u64),
    }

    pub fn serialize<S>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*flag as u8)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Flag::deserialize(deserializer)? {
            Flag::Bool(flag) => Ok(flag),
            Flag::Int(0) => Ok(false),
            Flag::Int(1) => Ok(true),
            Flag::Int(value) => Err(D::Error::custom(format!(
                "iscrowd must be 0 or 1, but got {}",
                value
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_polygon_annotation() -> Result<()> {
        let ann: AnnotationRecord = serde_json::from_value(json!({
            "id": 284996,
            "image_id": 36,
            "bbox": [0.0, 50.12, 457.68, 430.35],
            "segmentation": [[164.5, 479.38, 120.26, 448.4, 93.7, 442.87]],
            "category_id": 28,
            "iscrowd": 0,
            "area": 97486.8
        }))?;
        assert_eq!(ann.category_id, 28);
        assert!(!ann.iscrowd);
        assert!(ann.keypoints.is_none());
        assert!(matches!(
            &ann.segmentation,
            Segmentation::Polygons(polygons) if polygons[0].len() == 6
        ));
        Ok(())
    }

    #[test]
    fn parse_crowd_rle_annotation() -> Result<()> {
        let ann: AnnotationRecord = serde_json::from_value(json!({
            "id": 1,
            "image_id": 2,
            "bbox": [1, 2, 3, 4],
            "segmentation": {"counts": [4, 2, 10], "size": [4, 4]},
            "category_id": 1,
            "iscrowd": 1
        }))?;
        assert!(ann.iscrowd);
        assert_eq!(
            ann.segmentation,
            Segmentation::Rle(Rle {
                counts: RleCounts::Uncompressed(vec![4, 2, 10]),
                size: [4, 4],
            })
        );

        let ann: AnnotationRecord = serde_json::from_value(json!({
            "id": 1,
            "image_id": 2,
            "bbox": [1, 2, 3, 4],
            "segmentation": {"counts": "PPYo0", "size": [4, 4]},
            "category_id": 1,
            "iscrowd": true
        }))?;
        assert!(ann.iscrowd);
        assert!(matches!(
            ann.segmentation,
            Segmentation::Rle(Rle {
                counts: RleCounts::Compressed(_),
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn missing_bbox_is_rejected() {
        let result = serde_json::from_value::<AnnotationRecord>(json!({
            "id": 1,
            "image_id": 2,
            "category_id": 1,
            "iscrowd": 0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn missing_crowd_flag_is_rejected() {
        let result = serde_json::from_value::<AnnotationRecord>(json!({
            "id": 1,
            "image_id": 2,
            "bbox": [1, 2, 3, 4],
            "category_id": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_crowd_flag_is_rejected() {
        let result = serde_json::from_value::<AnnotationRecord>(json!({
            "id": 1,
            "image_id": 2,
            "bbox": [1, 2, 3, 4],
            "category_id": 1,
            "iscrowd": 2
        }));
        assert!(result.is_err());
    }

    #[test]
    fn parse_keypoints() -> Result<()> {
        let ann: AnnotationRecord = serde_json::from_value(json!({
            "id": 1,
            "image_id": 2,
            "bbox": [1, 2, 3, 4],
            "category_id": 1,
            "iscrowd": 0,
            "keypoints": [10, 20, 2, 0, 0, 0, 30, 40, 1]
        }))?;
        let keypoints = ann.keypoints.unwrap();
        assert_eq!(keypoints.len(), 3);
        assert_eq!(keypoints.num_visible(), 2);
        assert!(ann.segmentation.is_empty());

        let flat: Vec<R64> = keypoints.into();
        assert_eq!(flat.len(), 9);
        Ok(())
    }

    #[test]
    fn truncated_keypoints_are_rejected() {
        let result = serde_json::from_value::<AnnotationRecord>(json!({
            "id": 1,
            "image_id": 2,
            "bbox": [1, 2, 3, 4],
            "category_id": 1,
            "iscrowd": 0,
            "keypoints": [10, 20, 2, 5]
        }));
        assert!(result.is_err());
    }
}
