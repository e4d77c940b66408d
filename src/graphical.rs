//! Graphical password matching.
//!
//! Compares a submitted set of click-points against a stored template with
//! a per-axis pixel tolerance. A submitted point matches a template point
//! when BOTH its x-distance and y-distance are within the tolerance
//! (a Chebyshev-style box, not a Euclidean radius).
//!
//! The rule is deliberately permissive: a submitted point may match any
//! template point regardless of click order, and one template point may
//! satisfy several submitted points. This is many-to-one matching, not a
//! bijection; permuting the submitted points never changes the outcome.

use crate::domain::Point;

/// Default per-axis tolerance in pixels.
pub const DEFAULT_TOLERANCE_PX: i32 = 15;

/// Returns true when every submitted point lands within `tolerance` pixels
/// (per axis) of at least one template point.
///
/// Fails immediately if the point counts differ.
pub fn points_match(submitted: &[Point], template: &[Point], tolerance: i32) -> bool {
    // ---
    if submitted.len() != template.len() {
        return false;
    }

    submitted.iter().all(|entered| {
        // ---
        template.iter().any(|stored| {
            let x_diff = (entered.x - stored.x).abs();
            let y_diff = (entered.y - stored.y).abs();
            x_diff <= tolerance && y_diff <= tolerance
        })
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn pts(raw: &[(i32, i32)]) -> Vec<Point> {
        // ---
        raw.iter().map(|&(x, y)| Point { x, y }).collect()
    }

    #[test]
    fn exact_points_match() {
        // ---
        let template = pts(&[(10, 10), (50, 50), (90, 90), (130, 130)]);
        assert!(points_match(&template, &template, DEFAULT_TOLERANCE_PX));
    }

    #[test]
    fn far_point_fails() {
        // ---
        let submitted = pts(&[(10, 10), (50, 50), (90, 90), (130, 130)]);
        let template = pts(&[(12, 8), (48, 53), (88, 92), (200, 200)]);

        // (130,130) vs (200,200) is 70px off on both axes.
        assert!(!points_match(&submitted, &template, DEFAULT_TOLERANCE_PX));
    }

    #[test]
    fn near_point_within_tolerance_matches() {
        // ---
        let submitted = pts(&[(10, 10), (50, 50), (90, 90), (130, 130)]);
        let template = pts(&[(12, 8), (48, 53), (88, 92), (135, 125)]);

        assert!(points_match(&submitted, &template, DEFAULT_TOLERANCE_PX));
    }

    #[test]
    fn matching_is_order_independent() {
        // ---
        let submitted = pts(&[(130, 130), (90, 90), (10, 10), (50, 50)]);
        let template = pts(&[(12, 8), (48, 53), (88, 92), (135, 125)]);

        assert!(points_match(&submitted, &template, DEFAULT_TOLERANCE_PX));
    }

    #[test]
    fn length_mismatch_fails_fast() {
        // ---
        let submitted = pts(&[(10, 10), (50, 50), (90, 90)]);
        let template = pts(&[(10, 10), (50, 50), (90, 90), (130, 130)]);

        assert!(!points_match(&submitted, &template, DEFAULT_TOLERANCE_PX));
        assert!(!points_match(&template, &submitted, DEFAULT_TOLERANCE_PX));
    }

    #[test]
    fn many_to_one_reuse_is_allowed() {
        // ---
        // Two submitted clicks near the same stored point both count.
        let submitted = pts(&[(10, 10), (12, 12), (90, 90), (130, 130)]);
        let template = pts(&[(11, 11), (88, 92), (135, 125), (300, 300)]);

        // (10,10) and (12,12) both match (11,11); (300,300) is never
        // required to be hit.
        assert!(points_match(&submitted, &template, DEFAULT_TOLERANCE_PX));
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        // ---
        let submitted = pts(&[(0, 0)]);
        let template = pts(&[(15, 15)]);

        assert!(points_match(&submitted, &template, 15));
        assert!(!points_match(&submitted, &template, 14));
    }
}
