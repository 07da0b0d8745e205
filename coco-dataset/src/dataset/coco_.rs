use super::{is_valid, CategoryRemapper};
use crate::{
    annotation::ImageRecord,
    catalog::{AnnotationCatalog, CocoCatalog},
    common::*,
    config::DatasetConfig,
    error::DatasetError,
    storage::{DirImageStorage, ImageStorage},
    target::{Target, TargetBuilder},
    transform::TargetTransform,
};

/// The COCO style detection dataset.
///
/// Images are addressed by position in the sorted, optionally filtered, list
/// of catalog image ids. All state is fixed at construction, so retrieval
/// only reads it and may run from several threads at once.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CocoDataset<C, S>
where
    C: AnnotationCatalog,
    S: ImageStorage,
{
    catalog: Arc<C>,
    storage: S,
    remap: CategoryRemapper,
    image_ids: Vec<usize>,
    #[derivative(Debug = "ignore")]
    transform: Option<Box<dyn TargetTransform<S::Image>>>,
}

impl CocoDataset<CocoCatalog, DirImageStorage> {
    /// Load the catalog file and image directory named by the config.
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        let DatasetConfig {
            ref annotation_file,
            ref image_dir,
            remove_images_without_annotations,
        } = *config;

        let catalog = CocoCatalog::open(annotation_file)?;
        let storage = DirImageStorage::new(image_dir);
        Self::new(
            Arc::new(catalog),
            storage,
            remove_images_without_annotations,
            None,
        )
    }
}

impl<C, S> CocoDataset<C, S>
where
    C: AnnotationCatalog,
    S: ImageStorage,
{
    pub fn new(
        catalog: Arc<C>,
        storage: S,
        remove_images_without_annotations: bool,
        transform: Option<Box<dyn TargetTransform<S::Image>>>,
    ) -> Result<Self> {
        // sort ids for reproducible indexing
        let mut image_ids = catalog.image_ids();
        image_ids.sort_unstable();

        if remove_images_without_annotations {
            let num_images = image_ids.len();
            image_ids.retain(|&image_id| is_valid(catalog.annotations(image_id)));
            info!(
                "kept {} out of {} images with usable annotations",
                image_ids.len(),
                num_images
            );
        }

        let remap = CategoryRemapper::new(catalog.category_ids())?;
        debug!("mapped {} categories to dense labels", remap.num_classes());

        Ok(Self {
            catalog,
            storage,
            remap,
            image_ids,
            transform,
        })
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.image_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_ids.is_empty()
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn remap(&self) -> &CategoryRemapper {
        &self.remap
    }

    /// Image ids by position.
    pub fn image_ids(&self) -> &[usize] {
        &self.image_ids
    }

    /// Load the image at `index` and build its target.
    ///
    /// The index is echoed back so that callers can look up
    /// [get_img_info](Self::get_img_info) later.
    pub fn get_item(&self, index: isize) -> Result<(S::Image, Target, usize)> {
        let (index, record) = self.resolve(index)?;
        let image_id = record.id;

        let image = self
            .storage
            .load(record)
            .with_context(|| format!("failed to load image {}", image_id))?;

        let annotations = self
            .catalog
            .annotations(image_id)
            .iter()
            .filter(|ann| !ann.iscrowd);
        let target = TargetBuilder::new(&self.remap)
            .build(record.size(), annotations)
            .with_context(|| format!("failed to build the target of image {}", image_id))?;

        let (image, target) = match &self.transform {
            Some(transform) => transform.apply(image, target)?,
            None => (image, target),
        };

        Ok((image, target, index))
    }

    /// The metadata record of the image at `index`, without decoding it.
    pub fn get_img_info(&self, index: isize) -> Result<&ImageRecord> {
        let (_, record) = self.resolve(index)?;
        Ok(record)
    }

    fn resolve(&self, index: isize) -> Result<(usize, &ImageRecord)> {
        let len = self.image_ids.len();
        let (position, image_id) = usize::try_from(index)
            .ok()
            .and_then(|position| Some((position, *self.image_ids.get(position)?)))
            .ok_or(DatasetError::IndexOutOfRange { index, len })?;
        let record = self
            .catalog
            .image(image_id)
            .ok_or(DatasetError::MissingImage(image_id))?;
        Ok((position, record))
    }
}
