/// Vertical bar of the table
pub const BAR: char = '│';

/// Horizontal bar of the table
pub const DASH: char = '─';

/// Position for lines inside the table
pub enum Position {
    Top,
    Middle,
    Bottom,
}

impl Position {
    /// Joints used by the line as (left, between cells, right)
    #[must_use]
    pub fn joints(&self) -> (char, char, char) {
        match *self {
            Self::Top => ('┌', '┬', '┐'),
            Self::Middle => ('├', '┼', '┤'),
            Self::Bottom => ('└', '┴', '┘'),
        }
    }
}
