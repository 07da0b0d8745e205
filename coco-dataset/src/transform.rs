//! The optional `(image, target) -> (image, target)` step after target building.

use crate::{common::*, target::Target};

/// A transform applied once to each retrieved image and its target.
pub trait TargetTransform<I>
where
    Self: Send + Sync,
{
    fn apply(&self, image: I, target: Target) -> Result<(I, Target)>;
}

impl<I, F> TargetTransform<I> for F
where
    F: Fn(I, Target) -> Result<(I, Target)> + Send + Sync,
{
    fn apply(&self, image: I, target: Target) -> Result<(I, Target)> {
        self(image, target)
    }
}

/// Transforms applied one after another.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Compose<I> {
    #[derivative(Debug = "ignore")]
    transforms: Vec<Box<dyn TargetTransform<I>>>,
}

impl<I> Compose<I> {
    pub fn new() -> Self {
        Self { transforms: vec![] }
    }

    pub fn then<T>(mut self, transform: T) -> Self
    where
        T: TargetTransform<I> + 'static,
    {
        self.transforms.push(Box::new(transform));
        self
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl<I> Default for Compose<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> TargetTransform<I> for Compose<I> {
    fn apply(&self, image: I, target: Target) -> Result<(I, Target)> {
        self.transforms
            .iter()
            .try_fold((image, target), |(image, target), transform| {
                transform.apply(image, target)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use bbox::{BoxList, BoxMode, HW};

    fn empty_target() -> Target {
        Target::new(
            BoxList::empty(BoxMode::Xyxy),
            HW::new(4, 4),
            vec![],
            vec![],
            None,
        )
        .unwrap()
    }

    #[test]
    fn compose_runs_in_order() -> Result<()> {
        let compose = Compose::<Vec<&'static str>>::new()
            .then(|image: Vec<&'static str>, target: Target| -> Result<_> {
                let mut image = image;
                image.push("first");
                Ok((image, target))
            })
            .then(|image: Vec<&'static str>, target: Target| -> Result<_> {
                let mut image = image;
                image.push("second");
                Ok((image, target.convert(BoxMode::Xywh)))
            });
        assert_eq!(compose.len(), 2);

        let (image, target) = compose.apply(vec![], empty_target())?;
        assert_eq!(image, vec!["first", "second"]);
        assert_eq!(target.mode(), BoxMode::Xywh);
        Ok(())
    }

    #[test]
    fn compose_stops_at_failure() {
        let compose = Compose::<()>::new()
            .then(|_image: (), _target: Target| -> Result<((), Target)> {
                bail!("rejected")
            })
            .then(|_image: (), _target: Target| -> Result<((), Target)> {
                panic!("must not run after a failure")
            });
        assert!(compose.apply((), empty_target()).is_err());
    }
}
