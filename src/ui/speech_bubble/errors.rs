//! Failures surfaced by per-tick bubble updates.
//!
//! None of these escape a system: the affected update is skipped for the
//! tick and the failure is reported through an [`ErrorLatch`].
use std::fmt;

use bevy::prelude::*;

/// Which collaborator an update needed but could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BubbleRole {
    Target,
    Reference,
    Content,
}

impl fmt::Display for BubbleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Target => "target",
            Self::Reference => "facing reference",
            Self::Content => "content panel",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BubbleError {
    MissingReference { role: BubbleRole },
    DegenerateGeometry { distance: f32 },
    InvalidDuration { field: &'static str, value: f32 },
}

impl BubbleError {
    pub fn missing(role: BubbleRole) -> Self {
        Self::MissingReference { role }
    }

    /// Degenerate geometry clears itself as soon as the objects move apart.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DegenerateGeometry { .. })
    }
}

impl fmt::Display for BubbleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingReference { role } => write!(f, "missing {}", role),
            Self::DegenerateGeometry { distance } => write!(
                f,
                "facing direction too short to normalise ({:.6})",
                distance
            ),
            Self::InvalidDuration { field, value } => {
                write!(f, "invalid duration for {}: {} (clamped to 0)", field, value)
            }
        }
    }
}

impl std::error::Error for BubbleError {}

/// Remembers the last failure of one update path so a persistent problem
/// is logged once instead of every tick.
#[derive(Debug, Clone, Default)]
pub struct ErrorLatch {
    last: Option<BubbleError>,
}

impl ErrorLatch {
    #[cfg(test)]
    pub fn last(&self) -> Option<&BubbleError> {
        self.last.as_ref()
    }

    pub fn report<T>(
        &mut self,
        bubble: Entity,
        operation: &str,
        outcome: Result<T, BubbleError>,
    ) -> Option<T> {
        match outcome {
            Ok(value) => {
                if let Some(previous) = self.last.take() {
                    debug!(
                        "Speech bubble {:?}: {} recovered ({})",
                        bubble, operation, previous
                    );
                }
                Some(value)
            }
            Err(err) => {
                if self.last.as_ref() != Some(&err) {
                    if err.is_transient() {
                        debug!("Speech bubble {:?}: skipping {}: {}", bubble, operation, err);
                    } else {
                        warn!("Speech bubble {:?}: skipping {}: {}", bubble, operation, err);
                    }
                }
                self.last = Some(err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_missing_role() {
        let error = BubbleError::missing(BubbleRole::Reference);
        assert_eq!(error.to_string(), "missing facing reference");

        let duration = BubbleError::InvalidDuration {
            field: "fade_in_seconds",
            value: -2.0,
        };
        assert!(duration.to_string().contains("fade_in_seconds"));
        assert!(BubbleError::DegenerateGeometry { distance: 0.0 }.is_transient());
        assert!(!error.is_transient());
    }

    #[test]
    fn latch_keeps_failure_until_recovery() {
        let mut latch = ErrorLatch::default();
        let bubble = Entity::PLACEHOLDER;

        let skipped: Option<()> =
            latch.report(bubble, "placement", Err(BubbleError::missing(BubbleRole::Target)));
        assert!(skipped.is_none());
        assert_eq!(
            latch.last(),
            Some(&BubbleError::missing(BubbleRole::Target))
        );

        assert_eq!(latch.report(bubble, "placement", Ok(3)), Some(3));
        assert!(latch.last().is_none());
    }
}
