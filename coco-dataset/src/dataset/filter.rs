use crate::{annotation::AnnotationRecord, common::*};

/// Minimum number of visible keypoints for a keypoint-annotated image.
pub const MIN_KEYPOINTS_PER_IMAGE: usize = 10;

/// Tell whether an image carries enough supervision to train on.
///
/// Images without annotations or with only degenerate boxes are rejected.
/// When the first annotation has keypoints, every annotation must carry them
/// and the image must have at least [MIN_KEYPOINTS_PER_IMAGE] visible
/// keypoints in total.
pub fn is_valid(annotations: &[AnnotationRecord]) -> bool {
    let first = match annotations.first() {
        Some(first) => first,
        None => return false,
    };

    if has_only_empty_bbox(annotations) {
        return false;
    }

    // box and mask tasks
    if first.keypoints.is_none() {
        return true;
    }

    match count_visible_keypoints(annotations) {
        Some(count) => count >= MIN_KEYPOINTS_PER_IMAGE,
        None => {
            debug!(
                "image {} mixes annotations with and without keypoints",
                first.image_id
            );
            false
        }
    }
}

fn has_only_empty_bbox(annotations: &[AnnotationRecord]) -> bool {
    annotations.iter().all(|ann| {
        let [_, _, w, h] = ann.bbox;
        w <= 1.0 || h <= 1.0
    })
}

/// `None` if any annotation lacks keypoints.
fn count_visible_keypoints(annotations: &[AnnotationRecord]) -> Option<usize> {
    annotations
        .iter()
        .map(|ann| Some(ann.keypoints.as_ref()?.num_visible()))
        .sum()
}
