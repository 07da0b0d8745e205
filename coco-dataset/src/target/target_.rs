use crate::{
    annotation::{Keypoints, Segmentation},
    common::*,
};
use bbox::{retain_by_mask, BoxList, BoxMode, HW};

/// Field name of the dense class labels.
pub const LABELS_FIELD: &str = "labels";
/// Field name of the raw instance masks.
pub const MASKS_FIELD: &str = "masks";
/// Field name of the person keypoints.
pub const KEYPOINTS_FIELD: &str = "keypoints";

/// The training target of one image.
///
/// Every attached field has exactly one entry per box, in box order. Rows
/// are only ever removed from boxes and fields together.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    boxes: BoxList<R64>,
    size: HW<usize>,
    labels: Vec<usize>,
    masks: Vec<Segmentation>,
    keypoints: Option<Vec<Keypoints>>,
}

impl Target {
    /// Assemble a target, checking that every field is aligned with the boxes.
    pub fn new(
        boxes: BoxList<R64>,
        size: HW<usize>,
        labels: Vec<usize>,
        masks: Vec<Segmentation>,
        keypoints: Option<Vec<Keypoints>>,
    ) -> Result<Self> {
        let num_boxes = boxes.len();
        let check = |name: &str, len: usize| -> Result<()> {
            ensure!(
                len == num_boxes,
                "field '{}' has {} entries, but there are {} boxes",
                name,
                len,
                num_boxes
            );
            Ok(())
        };

        check(LABELS_FIELD, labels.len())?;
        check(MASKS_FIELD, masks.len())?;
        if let Some(keypoints) = &keypoints {
            check(KEYPOINTS_FIELD, keypoints.len())?;
        }

        Ok(Self {
            boxes,
            size,
            labels,
            masks,
            keypoints,
        })
    }

    pub fn boxes(&self) -> &BoxList<R64> {
        &self.boxes
    }

    pub fn mode(&self) -> BoxMode {
        self.boxes.mode()
    }

    pub fn size(&self) -> &HW<usize> {
        &self.size
    }

    /// Number of boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn masks(&self) -> &[Segmentation] {
        &self.masks
    }

    pub fn keypoints(&self) -> Option<&[Keypoints]> {
        self.keypoints.as_deref()
    }

    /// Names of the attached fields in attachment order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = vec![LABELS_FIELD, MASKS_FIELD];
        if self.keypoints.is_some() {
            names.push(KEYPOINTS_FIELD);
        }
        names
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_names().contains(&name)
    }

    /// The same target with boxes expressed in `mode`.
    pub fn convert(&self, mode: BoxMode) -> Self {
        Self {
            boxes: self.boxes.convert(mode),
            ..self.clone()
        }
    }

    /// Keep the rows whose flag in `keep` is true, in every field at once.
    pub fn retain_rows(&mut self, keep: &[bool]) -> Result<()> {
        ensure!(
            keep.len() == self.len(),
            "keep mask has {} entries, but there are {} boxes",
            keep.len(),
            self.len()
        );
        self.retain_aligned(keep)
    }

    /// Remove the rows at the given indices from every field at once.
    pub fn remove_rows(&mut self, rows: &[usize]) -> Result<()> {
        let mut keep = vec![true; self.len()];
        for &row in rows {
            let flag = keep.get_mut(row).ok_or_else(|| {
                format_err!(
                    "row {} is out of range for a target of {} boxes",
                    row,
                    self.len()
                )
            })?;
            *flag = false;
        }
        self.retain_aligned(&keep)
    }

    /// Clip the boxes to the image.
    ///
    /// With `remove_empty`, rows whose clipped box has no area are dropped
    /// from every field.
    pub fn clip_to_image(mut self, remove_empty: bool) -> Result<Self> {
        let size = HW::try_from_hw([r64(self.size.h() as f64), r64(self.size.w() as f64)])?;
        let keep = self.boxes.clip_to_image(&size);
        if remove_empty {
            self.retain_aligned(&keep)?;
        }
        Ok(self)
    }

    /// A JSON view of the target.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let value = serde_json::json!({
            "mode": self.mode().as_str(),
            "size": {"width": self.size.w(), "height": self.size.h()},
            "boxes": self.boxes.rows(),
            LABELS_FIELD: self.labels,
            MASKS_FIELD: serde_json::to_value(&self.masks)?,
            KEYPOINTS_FIELD: serde_json::to_value(&self.keypoints)?,
        });
        Ok(value)
    }

    /// Boxes go first. Their length check fails before any field is touched.
    fn retain_aligned(&mut self, keep: &[bool]) -> Result<()> {
        let Self {
            boxes,
            labels,
            masks,
            keypoints,
            ..
        } = self;

        boxes.retain_rows(keep)?;
        retain_by_mask(labels, keep);
        retain_by_mask(masks, keep);
        if let Some(keypoints) = keypoints {
            retain_by_mask(keypoints, keep);
        }
        Ok(())
    }
}
