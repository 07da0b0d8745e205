use super::{BoxMode, HW};
use crate::common::*;

/// An ordered list of box rows sharing one coordinate mode.
///
/// Rows are kept as raw arrays so that degenerate boxes coming from an
/// annotation file survive until they are clipped away.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxList<T> {
    mode: BoxMode,
    rows: Vec<[T; 4]>,
}

impl<T> BoxList<T> {
    pub fn new(mode: BoxMode, rows: Vec<[T; 4]>) -> Self {
        Self { mode, rows }
    }

    /// A list without rows.
    pub fn empty(mode: BoxMode) -> Self {
        Self::new(mode, vec![])
    }

    pub fn mode(&self) -> BoxMode {
        self.mode
    }

    pub fn rows(&self) -> &[[T; 4]] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep the rows whose flag in `keep` is true.
    pub fn retain_rows(&mut self, keep: &[bool]) -> Result<()> {
        ensure!(
            keep.len() == self.rows.len(),
            "keep mask has {} entries but the list has {} rows",
            keep.len(),
            self.rows.len()
        );
        retain_by_mask(&mut self.rows, keep);
        Ok(())
    }
}

impl<T> BoxList<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Re-express every row in `mode`.
    pub fn convert(&self, mode: BoxMode) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|&row| self.mode.convert(mode, row))
            .collect();
        Self { mode, rows }
    }

    /// Clamp every row into `[0, w] × [0, h]` in place.
    ///
    /// The returned mask flags the rows that still have a positive area. The
    /// rows themselves are not removed.
    pub fn clip_to_image(&mut self, size: &HW<T>) -> Vec<bool> {
        let mode = self.mode;
        self.rows
            .iter_mut()
            .map(|row| {
                let (xyxy, non_empty) = clamp_xyxy(mode.convert(BoxMode::Xyxy, *row), size);
                *row = BoxMode::Xyxy.convert(mode, xyxy);
                non_empty
            })
            .collect()
    }
}

/// Drop the items whose flag in `keep` is false, preserving order.
///
/// Items beyond the end of `keep` are dropped.
pub fn retain_by_mask<T>(items: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter().copied();
    items.retain(|_| flags.next().unwrap_or(false));
}

/// Clamp two-corner coordinates into the image and tell whether a positive
/// area remains.
fn clamp_xyxy<T>(row: [T; 4], size: &HW<T>) -> ([T; 4], bool)
where
    T: Copy + Num + PartialOrd,
{
    let [x1, y1, x2, y2] = row;
    let (w, h) = (size.w(), size.h());
    let x1 = clamp(x1, w);
    let y1 = clamp(y1, h);
    let x2 = clamp(x2, w);
    let y2 = clamp(y2, h);
    ([x1, y1, x2, y2], x2 > x1 && y2 > y1)
}

fn clamp<T>(value: T, max: T) -> T
where
    T: Num + PartialOrd,
{
    if value < T::zero() {
        T::zero()
    } else if value > max {
        max
    } else {
        value
    }
}
