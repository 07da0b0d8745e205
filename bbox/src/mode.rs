use crate::common::*;

/// The coordinate convention of a box row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxMode {
    /// Corner plus extent, `(x, y, w, h)`.
    Xywh,
    /// Two corners, `(x1, y1, x2, y2)`.
    Xyxy,
}

impl BoxMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xywh => "xywh",
            Self::Xyxy => "xyxy",
        }
    }

    /// Re-express a raw row given in `self` mode in the `to` mode.
    pub fn convert<T>(self, to: BoxMode, row: [T; 4]) -> [T; 4]
    where
        T: Copy + Num,
    {
        match (self, to) {
            (Self::Xywh, Self::Xyxy) => xywh_to_xyxy(row),
            (Self::Xyxy, Self::Xywh) => xyxy_to_xywh(row),
            _ => row,
        }
    }
}

fn xywh_to_xyxy<T>(row: [T; 4]) -> [T; 4]
where
    T: Copy + Num,
{
    let [x, y, w, h] = row;
    [x, y, x + w, y + h]
}

fn xyxy_to_xywh<T>(row: [T; 4]) -> [T; 4]
where
    T: Copy + Num,
{
    let [x1, y1, x2, y2] = row;
    [x1, y1, x2 - x1, y2 - y1]
}

impl FromStr for BoxMode {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let mode = match text {
            "xywh" => Self::Xywh,
            "xyxy" => Self::Xyxy,
            _ => bail!("unknown box mode '{}', expect 'xywh' or 'xyxy'", text),
        };
        Ok(mode)
    }
}

impl Display for BoxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
