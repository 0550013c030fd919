use thiserror::Error;

use crate::dynamics::circulation::Axis;
use crate::units::Unit;

#[derive(Error, Debug, Clone)]
pub enum GaldynError {
    #[error("Unit {from} cannot be converted to {to}")]
    UnitMismatch { from: Unit, to: Unit },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Circulation detected about more than one axis: {axes:?}")]
    AmbiguousClassification { axes: Vec<Axis> },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Signal amplitude {amplitude:.3e} is below the threshold {threshold:.3e}")]
    NegligibleAmplitude { amplitude: f64, threshold: f64 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid sexagesimal angle: {0}")]
    InvalidSexagesimal(String),
}

impl PartialEq for GaldynError {
    fn eq(&self, other: &Self) -> bool {
        use GaldynError::*;
        match (self, other) {
            (UnitMismatch { from: a, to: b }, UnitMismatch { from: c, to: d }) => a == c && b == d,
            (DegenerateGeometry(a), DegenerateGeometry(b)) => a == b,
            (InsufficientData(a), InsufficientData(b)) => a == b,
            (AmbiguousClassification { axes: a }, AmbiguousClassification { axes: b }) => a == b,
            (ShapeMismatch(a), ShapeMismatch(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (InvalidSexagesimal(a), InvalidSexagesimal(b)) => a == b,

            // Measured amplitudes are not compared, only the variant
            (NegligibleAmplitude { .. }, NegligibleAmplitude { .. }) => true,

            _ => false,
        }
    }
}
