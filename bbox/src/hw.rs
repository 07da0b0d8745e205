use crate::common::*;

/// Height and width of an image, never negative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HW<T> {
    h: T,
    w: T,
}

impl HW<usize> {
    /// Pixel size as listed in image metadata.
    pub fn new(h: usize, w: usize) -> Self {
        Self { h, w }
    }
}

impl<T> HW<T>
where
    T: Num + PartialOrd + Copy,
{
    pub fn try_from_hw(hw: [T; 2]) -> Result<Self> {
        let [h, w] = hw;
        ensure!(
            h >= T::zero() && w >= T::zero(),
            "image size must be non-negative"
        );
        Ok(Self { h, w })
    }

    pub fn hw(&self) -> [T; 2] {
        [self.h, self.w]
    }

    pub fn h(&self) -> T {
        self.h
    }

    pub fn w(&self) -> T {
        self.w
    }

    pub fn area(&self) -> T {
        self.h * self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pixel_size() {
        let size = HW::new(480, 640);
        assert_eq!(size.hw(), [480, 640]);
        assert_eq!(size.area(), 307200);
    }

    #[test]
    fn float_size_area() {
        let size = HW::try_from_hw([3.0, 2.5]).unwrap();
        let area: f64 = size.area();
        assert_abs_diff_eq!(area, 7.5);
    }

    #[test]
    fn reject_negative_size() {
        assert!(HW::try_from_hw([-1, 3]).is_err());
        assert!(HW::try_from_hw([2.0, -0.5]).is_err());
    }
}
