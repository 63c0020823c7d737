//! Measurement constraints and external measurement callbacks.

use crate::{NodeId, Size};

/// Constraint on one axis of a node.
///
/// The available size travels inside the mode. For calls into the engine the
/// value is the space for the node's margin box; for calls into a [`Measure`]
/// callback it is the node's content box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MeasureMode {
    /// No constraint.
    #[default]
    Undefined,
    /// The size must be exactly this value.
    Exactly(f32),
    /// The size may be at most this value.
    AtMost(f32),
}

impl MeasureMode {
    /// The available size, if any.
    pub fn size(self) -> Option<f32> {
        match self {
            MeasureMode::Undefined => None,
            MeasureMode::Exactly(v) | MeasureMode::AtMost(v) => Some(v),
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, MeasureMode::Exactly(_))
    }

    /// Transform the carried size, keeping the mode.
    pub fn map(self, f: impl FnOnce(f32) -> f32) -> Self {
        match self {
            MeasureMode::Undefined => MeasureMode::Undefined,
            MeasureMode::Exactly(v) => MeasureMode::Exactly(f(v)),
            MeasureMode::AtMost(v) => MeasureMode::AtMost(f(v)),
        }
    }

    /// Apply a maximum size to this constraint.
    ///
    /// `Undefined` becomes `AtMost(max)`; other modes are capped.
    pub fn constrain_max(self, max: Option<f32>) -> Self {
        match (self, max) {
            (_, None) => self,
            (MeasureMode::Undefined, Some(max)) => MeasureMode::AtMost(max),
            (MeasureMode::Exactly(v), Some(max)) => MeasureMode::Exactly(v.min(max)),
            (MeasureMode::AtMost(v), Some(max)) => MeasureMode::AtMost(v.min(max)),
        }
    }
}

/// Measures the content of a leaf node.
///
/// Implemented for closures, so a leaf can be measured with
/// `|_, width, height| Size::new(..)`.
pub trait Measure {
    fn measure(&self, node: NodeId, width: MeasureMode, height: MeasureMode) -> Size;
}

impl<F> Measure for F
where
    F: Fn(NodeId, MeasureMode, MeasureMode) -> Size,
{
    fn measure(&self, node: NodeId, width: MeasureMode, height: MeasureMode) -> Size {
        self(node, width, height)
    }
}

/// Reports the baseline of a node, measured from its top border edge.
pub trait Baseline {
    fn baseline(&self, node: NodeId, width: f32, height: f32) -> f32;
}

impl<F> Baseline for F
where
    F: Fn(NodeId, f32, f32) -> f32,
{
    fn baseline(&self, node: NodeId, width: f32, height: f32) -> f32 {
        self(node, width, height)
    }
}

/// Clamp a value returned by a callback to a finite, non-negative number.
pub(crate) fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub(crate) fn sanitize_size(size: Size) -> Size {
    Size::new(sanitize(size.width), sanitize(size.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_size() {
        assert_eq!(MeasureMode::Undefined.size(), None);
        assert_eq!(MeasureMode::Exactly(10.0).size(), Some(10.0));
        assert_eq!(MeasureMode::AtMost(5.0).size(), Some(5.0));
    }

    #[test]
    fn test_constrain_max() {
        assert_eq!(
            MeasureMode::Undefined.constrain_max(Some(40.0)),
            MeasureMode::AtMost(40.0)
        );
        assert_eq!(
            MeasureMode::Exactly(60.0).constrain_max(Some(40.0)),
            MeasureMode::Exactly(40.0)
        );
        assert_eq!(
            MeasureMode::AtMost(20.0).constrain_max(Some(40.0)),
            MeasureMode::AtMost(20.0)
        );
        assert_eq!(
            MeasureMode::Undefined.constrain_max(None),
            MeasureMode::Undefined
        );
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(-3.0), 0.0);
        assert_eq!(sanitize(f32::NAN), 0.0);
        assert_eq!(sanitize(f32::INFINITY), 0.0);
        assert_eq!(sanitize(12.5), 12.5);
    }
}
