//! Metric engine - side incline and capacity derived from tub measurements
//!
//! A tub is modelled as a trapezoid in its long section: `top_width` at the rim,
//! `bottom_width` at the floor and `height` between them. Each side wall is the
//! hypotenuse of a right triangle whose horizontal leg is half the width
//! difference, so the incline from vertical is `atan(leg / height)`.
//!
//! All functions here are pure. Units are centimeters in, degrees and liters out.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places shown for an incline unless configured otherwise
pub const INCLINE_DECIMALS: usize = 2;

/// Decimal places kept for the capacity estimate
pub const LITERS_DECIMALS: u32 = 1;

/// Two inclines closer than this read the same at two decimals
pub const INCLINE_TOLERANCE: f64 = 0.005;

const CUBIC_CM_PER_LITER: f64 = 1000.0;

/// Errors raised when a metric cannot be derived
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum MetricError {
    #[error("Invalid measurement: {field} = {value} (must be a finite number greater than zero)")]
    #[diagnostic(
        code(tubmeter::metrics::invalid_measurement),
        help("the incline is undefined for this input; correct the measurement and retry")
    )]
    InvalidMeasurement { field: &'static str, value: f64 },
}

/// Compute the side incline from vertical, in degrees
///
/// The angle is returned at full precision; rounding to [`INCLINE_DECIMALS`]
/// happens only when it is displayed. A vertical wall (`top_width == bottom_width`) gives 0°. If the tub widens
/// toward the floor the result is negative; that value is returned as is so
/// callers can treat it as a data-quality signal.
pub fn compute_incline(top_width: f64, bottom_width: f64, height: f64) -> Result<f64, MetricError> {
    if !height.is_finite() || height <= 0.0 {
        return Err(MetricError::InvalidMeasurement {
            field: "height",
            value: height,
        });
    }
    if !top_width.is_finite() {
        return Err(MetricError::InvalidMeasurement {
            field: "top_width",
            value: top_width,
        });
    }
    if !bottom_width.is_finite() {
        return Err(MetricError::InvalidMeasurement {
            field: "bottom_width",
            value: bottom_width,
        });
    }

    let horizontal_leg = (top_width - bottom_width) / 2.0;
    Ok((horizontal_leg / height).atan().to_degrees())
}

/// Estimate the liquid capacity in liters
///
/// Uses the mean of the top and bottom lengths times the breadth as the average
/// cross-section, multiplied by the height. Wall thickness and the curvature of
/// the basin are ignored, so real tubs hold noticeably less; edge effects bias
/// the estimate upward.
///
/// Returns `None` when any dimension is missing, non-finite or not positive.
pub fn estimate_capacity(
    top_width: Option<f64>,
    bottom_width: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
) -> Option<f64> {
    let top = positive(top_width)?;
    let bottom = positive(bottom_width)?;
    let breadth = positive(width)?;
    let height = positive(height)?;

    let mean_length = (top + bottom) / 2.0;
    let cubic_cm = mean_length * breadth * height;

    Some(round_to(cubic_cm / CUBIC_CM_PER_LITER, LITERS_DECIMALS))
}

/// Check whether two incline values agree within rounding tolerance
pub fn inclines_match(a: f64, b: f64) -> bool {
    (a - b).abs() < INCLINE_TOLERANCE
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Raw geometric inputs of one tub, in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    /// Length at the rim
    pub top_width: f64,
    /// Length at the floor
    pub bottom_width: f64,
    /// Breadth of the tub, used only for capacity
    pub width: f64,
    /// Depth from rim to floor
    pub height: f64,
}

/// Values derived from a set of measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub incline_degrees: f64,
    pub liters: Option<f64>,
}

impl Measurements {
    pub fn new(top_width: f64, bottom_width: f64, width: f64, height: f64) -> Self {
        Self {
            top_width,
            bottom_width,
            width,
            height,
        }
    }

    /// Derive incline (always) and capacity (best effort)
    pub fn derive(&self) -> Result<DerivedMetrics, MetricError> {
        let incline_degrees = compute_incline(self.top_width, self.bottom_width, self.height)?;
        let liters = estimate_capacity(
            Some(self.top_width),
            Some(self.bottom_width),
            Some(self.width),
            Some(self.height),
        );

        Ok(DerivedMetrics {
            incline_degrees,
            liters,
        })
    }
}
