use crate::{common::*, error::DatasetError};

/// The bijection between catalog category ids and dense labels.
///
/// Labels start at 1 and follow the enumeration order of the catalog. Label
/// 0 is left for the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRemapper {
    category_ids: IndexSet<usize>,
}

impl CategoryRemapper {
    pub fn new<I>(category_ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut set = IndexSet::new();
        for id in category_ids {
            ensure!(set.insert(id), "duplicated category id {}", id);
        }
        Ok(Self { category_ids: set })
    }

    /// Number of categories, which is also the largest label.
    pub fn num_classes(&self) -> usize {
        self.category_ids.len()
    }

    pub fn to_dense(&self, category_id: usize) -> Result<usize> {
        let index = self
            .category_ids
            .get_index_of(&category_id)
            .ok_or(DatasetError::UnknownCategory(category_id))?;
        Ok(index + 1)
    }

    pub fn to_catalog(&self, label: usize) -> Result<usize> {
        let id = label
            .checked_sub(1)
            .and_then(|index| self.category_ids.get_index(index))
            .ok_or(DatasetError::UnknownLabel(label))?;
        Ok(*id)
    }

    /// `(label, category id)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.category_ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (index + 1, id))
    }
}
