//! Per-call configuration and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::geometry::Point;

/// Default snap distance for near-duplicate points, in working units.
pub const DEFAULT_DEDUP_TOLERANCE: f64 = 1e-6;

/// Caller-supplied parameters of a surface build.
///
/// Filters are off unless a threshold or polygon is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    /// Planar distance under which raw points collapse onto one vertex.
    pub dedup_tolerance: f64,
    /// Triangles with a smaller internal angle (degrees) are removed.
    pub min_angle_deg: Option<f64>,
    /// Triangles with a longer XY edge are removed.
    pub max_edge_length: Option<f64>,
    /// Triangles whose centroid falls outside this polygon are removed.
    pub clip_polygon: Option<Vec<Point>>,
    /// Triangles whose centroid falls inside any of these are removed.
    pub exclusion_polygons: Vec<Vec<Point>>,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            dedup_tolerance: DEFAULT_DEDUP_TOLERANCE,
            min_angle_deg: None,
            max_edge_length: None,
            clip_polygon: None,
            exclusion_polygons: Vec::new(),
        }
    }
}

impl SurfaceOptions {
    pub fn with_dedup_tolerance(mut self, tolerance: f64) -> Self {
        self.dedup_tolerance = tolerance;
        self
    }

    pub fn with_min_angle(mut self, degrees: f64) -> Self {
        self.min_angle_deg = Some(degrees);
        self
    }

    pub fn with_max_edge_length(mut self, length: f64) -> Self {
        self.max_edge_length = Some(length);
        self
    }

    pub fn with_clip_polygon(mut self, polygon: Vec<Point>) -> Self {
        self.clip_polygon = Some(polygon);
        self
    }

    pub fn with_exclusion(mut self, polygon: Vec<Point>) -> Self {
        self.exclusion_polygons.push(polygon);
        self
    }

    /// Checks thresholds and polygons before any work is done.
    pub fn validate(&self) -> Result<(), SurfaceError> {
        if !(self.dedup_tolerance.is_finite() && self.dedup_tolerance > 0.0) {
            return Err(SurfaceError::InvalidOption {
                name: "dedup_tolerance",
                reason: format!("{} is not a positive finite distance", self.dedup_tolerance),
            });
        }
        if let Some(angle) = self.min_angle_deg {
            if !(angle.is_finite() && (0.0..=60.0).contains(&angle)) {
                return Err(SurfaceError::InvalidOption {
                    name: "min_angle_deg",
                    reason: format!("{angle} is outside 0..=60 degrees"),
                });
            }
        }
        if let Some(length) = self.max_edge_length {
            if !(length.is_finite() && length > 0.0) {
                return Err(SurfaceError::InvalidOption {
                    name: "max_edge_length",
                    reason: format!("{length} is not a positive finite length"),
                });
            }
        }
        if let Some(poly) = &self.clip_polygon {
            check_polygon("clip_polygon", poly)?;
        }
        for poly in &self.exclusion_polygons {
            check_polygon("exclusion_polygons", poly)?;
        }
        Ok(())
    }
}

fn check_polygon(name: &'static str, poly: &[Point]) -> Result<(), SurfaceError> {
    if poly.len() < 3 {
        return Err(SurfaceError::InvalidOption {
            name,
            reason: format!("polygon has {} vertices, at least 3 are required", poly.len()),
        });
    }
    if poly.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
        return Err(SurfaceError::InvalidOption {
            name,
            reason: "polygon has a non-finite vertex".into(),
        });
    }
    Ok(())
}

/// Shared flag a caller flips to abort a running build.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Caller-owned state for one invocation.
#[derive(Debug, Clone, Default)]
pub struct SurfaceContext {
    pub cancel: CancelToken,
    /// On cancellation, return the mesh built so far (flagged in the
    /// diagnostics) instead of [`SurfaceError::Cancelled`].
    pub best_effort_on_cancel: bool,
}

impl SurfaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self {
            cancel,
            best_effort_on_cancel: false,
        }
    }

    pub fn best_effort(mut self) -> Self {
        self.best_effort_on_cancel = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_do_not_filter() {
        let opts = SurfaceOptions::default();
        assert_eq!(opts.dedup_tolerance, DEFAULT_DEDUP_TOLERANCE);
        assert!(opts.min_angle_deg.is_none());
        assert!(opts.max_edge_length.is_none());
        assert!(opts.clip_polygon.is_none());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(SurfaceOptions::default()
            .with_dedup_tolerance(-1.0)
            .validate()
            .is_err());
        assert!(SurfaceOptions::default()
            .with_min_angle(f64::NAN)
            .validate()
            .is_err());
        assert!(SurfaceOptions::default()
            .with_min_angle(75.0)
            .validate()
            .is_err());
        assert!(SurfaceOptions::default()
            .with_max_edge_length(0.0)
            .validate()
            .is_err());
        let err = SurfaceOptions::default()
            .with_clip_polygon(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)])
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            SurfaceError::InvalidOption {
                name: "clip_polygon",
                ..
            }
        ));
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let ctx = SurfaceContext::with_cancel(token.clone());
        assert!(!ctx.cancel.is_cancelled());
        token.cancel();
        assert!(ctx.cancel.is_cancelled());
    }
}
