use crate::error::GbError;

/// Longest line GraphBase tools expect in a data file.
pub const DEFAULT_LINE_WIDTH: usize = 79;

/// Narrowest width that still fits any unbreakable field.
pub const MIN_LINE_WIDTH: usize = 24;

/// Writer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbConfig {
    /// Maximum length of a record line. Section lines are never wrapped.
    pub line_width: usize,
}

impl Default for GbConfig {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl GbConfig {
    pub fn validate(&self) -> Result<(), GbError> {
        if self.line_width < MIN_LINE_WIDTH {
            return Err(GbError::InvalidConfig(format!(
                "line width {} is below the minimum of {}",
                self.line_width, MIN_LINE_WIDTH
            )));
        }
        Ok(())
    }
}
