use core::fmt::{Display, Formatter};

use crate::errors::{UTResult, UnitokError};

/// Dataset lifecycle; transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Declaring features.
    #[default]
    Initialized,

    /// Data populated, indices initialized.
    Tokenized,

    /// Filtered and/or unioned; no further raw tokenization.
    Organized,
}

impl Status {
    /// Everything but [`Status::Initialized`].
    pub const NOT_INITIALIZED: &'static [Status] = &[Status::Tokenized, Status::Organized];

    /// Everything but [`Status::Organized`].
    pub const NOT_ORGANIZED: &'static [Status] = &[Status::Initialized, Status::Tokenized];

    /// Only [`Status::Initialized`].
    pub const INITIALIZED: &'static [Status] = &[Status::Initialized];

    /// Fail with [`UnitokError::StateViolation`] unless `self` is one of `allowed`.
    pub fn require(
        self,
        operation: &'static str,
        allowed: &[Status],
    ) -> UTResult<()> {
        if allowed.contains(&self) {
            return Ok(());
        }
        Err(UnitokError::StateViolation {
            operation,
            expected: allowed
                .iter()
                .map(Status::to_string)
                .collect::<Vec<_>>()
                .join("/"),
            actual: self,
        })
    }
}

impl Display for Status {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        let name = match self {
            Status::Initialized => "initialized",
            Status::Tokenized => "tokenized",
            Status::Organized => "organized",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(
            Status::Tokenized
                .require("filter", Status::NOT_INITIALIZED)
                .is_ok()
        );

        let err = Status::Organized
            .require("tokenize", Status::NOT_ORGANIZED)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "tokenize requires status initialized/tokenized, but the dataset is organized"
        );
    }
}
