use super::Target;
use crate::{
    annotation::AnnotationRecord, common::*, dataset::CategoryRemapper, error::DatasetError,
};
use bbox::{BoxList, BoxMode, HW};

/// Builds the training target of one image from its raw annotations.
#[derive(Debug, Clone, Copy)]
pub struct TargetBuilder<'a> {
    remap: &'a CategoryRemapper,
}

impl<'a> TargetBuilder<'a> {
    pub fn new(remap: &'a CategoryRemapper) -> Self {
        Self { remap }
    }

    /// Build the target in `xyxy` mode.
    ///
    /// Crowd annotations are skipped. The presence of the keypoints field is
    /// decided by the first remaining annotation alone. Boxes are clipped to
    /// the image last, and rows without area are dropped from every field.
    pub fn build<'b, A>(&self, size: HW<usize>, annotations: A) -> Result<Target>
    where
        A: IntoIterator<Item = &'b AnnotationRecord>,
    {
        let annotations: Vec<_> = annotations.into_iter().filter(|ann| !ann.iscrowd).collect();

        let rows: Vec<_> = annotations.iter().map(|ann| ann.bbox).collect();
        let boxes = BoxList::new(BoxMode::Xywh, rows).convert(BoxMode::Xyxy);

        let labels: Vec<_> = annotations
            .iter()
            .map(|ann| self.remap.to_dense(ann.category_id))
            .try_collect()?;

        let masks: Vec<_> = annotations
            .iter()
            .map(|ann| ann.segmentation.clone())
            .collect();

        let keypoints = match annotations.first() {
            Some(first) if first.keypoints.is_some() => {
                let keypoints: Vec<_> = annotations
                    .iter()
                    .map(|ann| {
                        ann.keypoints
                            .clone()
                            .ok_or(DatasetError::MissingKeypoints(ann.id))
                    })
                    .try_collect()?;
                Some(keypoints)
            }
            _ => None,
        };

        let target = Target::new(boxes, size, labels, masks, keypoints)?;
        target.clip_to_image(true)
    }
}
