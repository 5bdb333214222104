use rayon::prelude::*;
use serde::Serialize;

use super::math::{HorizCoord, Point3D};

/// Point of 2D dial in screen pixels (Y axis goes down)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DialPoint {
    pub x: f64,
    pub y: f64,
}

impl DialPoint {
    pub fn distance(pt1: &DialPoint, pt2: &DialPoint) -> f64 {
        let diff_x = pt1.x - pt2.x;
        let diff_y = pt1.y - pt2.y;
        f64::sqrt(diff_x * diff_x + diff_y * diff_y)
    }
}

/// Polar to screen coordinates. Angle is counted counter-clockwise from +X,
/// so Y is subtracted to keep that look on screen.
pub fn polar_to_cartesian(angle: f64, radius: f64, center: &DialPoint) -> DialPoint {
    DialPoint {
        x: center.x + radius * f64::cos(angle),
        y: center.y - radius * f64::sin(angle),
    }
}

// Celestial sphere:
//  ^Z (zenith)
//  |   Y (az = 90°)
//  |  /
//  | /
//  |/
//  *----->X (az = 0°)
pub fn horiz_to_sphere_pt(az: f64, alt: f64) -> Point3D {
    let r = f64::cos(alt);
    Point3D {
        x: r * f64::cos(az),
        y: r * f64::sin(az),
        z: f64::sin(alt),
    }
}

impl HorizCoord {
    pub fn to_sphere_pt(&self) -> Point3D {
        horiz_to_sphere_pt(self.az, self.alt)
    }

    pub fn to_dial_pt(&self, radius: f64, center: &DialPoint) -> DialPoint {
        polar_to_cartesian(self.az, radius, center)
    }
}

pub fn project_to_sphere(coords: &[HorizCoord]) -> Vec<Point3D> {
    coords.par_iter()
        .map(HorizCoord::to_sphere_pt)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use rand::prelude::*;
    use super::*;

    const EPS: f64 = 1e-12;

    fn assert_pt(pt: &Point3D, x: f64, y: f64, z: f64) {
        assert!(f64::abs(pt.x - x) < EPS, "{:?}", pt);
        assert!(f64::abs(pt.y - y) < EPS, "{:?}", pt);
        assert!(f64::abs(pt.z - z) < EPS, "{:?}", pt);
    }

    #[test]
    fn test_polar_to_cartesian_axes() {
        let center = DialPoint { x: 250.0, y: 250.0 };
        let pt = polar_to_cartesian(0.0, 170.0, &center);
        assert!(f64::abs(pt.x - 420.0) < EPS);
        assert!(f64::abs(pt.y - 250.0) < EPS);

        let pt = polar_to_cartesian(PI / 2.0, 170.0, &center);
        assert!(f64::abs(pt.x - 250.0) < EPS);
        assert!(f64::abs(pt.y - 80.0) < EPS);

        let pt = polar_to_cartesian(PI, 10.0, &DialPoint::default());
        assert!(f64::abs(pt.x - -10.0) < EPS);
        assert!(f64::abs(pt.y) < EPS);
    }

    #[test]
    fn test_polar_to_cartesian_distance() {
        let mut rng = thread_rng();
        for _ in 0..10_000 {
            let angle = rng.gen_range(-100.0..100.0);
            let radius = rng.gen_range(0.001..1000.0);
            let center = DialPoint {
                x: rng.gen_range(-500.0..500.0),
                y: rng.gen_range(-500.0..500.0),
            };
            let pt = polar_to_cartesian(angle, radius, &center);
            let dist = DialPoint::distance(&pt, &center);
            assert!(f64::abs(dist - radius) < 1e-9 * radius.max(1.0), "{} != {}", dist, radius);
        }
    }

    #[test]
    fn test_sphere_pt_special_points() {
        assert_pt(&horiz_to_sphere_pt(0.0, 0.0), 1.0, 0.0, 0.0);
        assert_pt(&horiz_to_sphere_pt(PI / 2.0, 0.0), 0.0, 1.0, 0.0);
        for az in [0.0, 0.7, PI, 4.0, -2.5] {
            assert_pt(&horiz_to_sphere_pt(az, PI / 2.0), 0.0, 0.0, 1.0);
            assert_pt(&horiz_to_sphere_pt(az, -PI / 2.0), 0.0, 0.0, -1.0);
        }
    }

    #[test]
    fn test_sphere_pt_is_unit() {
        let mut rng = thread_rng();
        for _ in 0..10_000 {
            let az = rng.gen_range(-1000.0..1000.0);
            let alt = rng.gen_range(-1000.0..1000.0);
            let pt = horiz_to_sphere_pt(az, alt);
            assert!(f64::abs(pt.len() - 1.0) < 1e-12);
        }
    }

    #[test]
    fn test_projection_has_no_state() {
        let crd = HorizCoord { az: 1.2345, alt: -0.321 };
        assert_eq!(crd.to_sphere_pt(), crd.to_sphere_pt());
        let center = DialPoint { x: 10.0, y: 20.0 };
        assert_eq!(crd.to_dial_pt(55.0, &center), crd.to_dial_pt(55.0, &center));
    }

    #[test]
    fn test_project_to_sphere_keeps_order() {
        let coords: Vec<_> = (0..1000)
            .map(|i| HorizCoord { az: 0.01 * i as f64, alt: 0.001 * i as f64 - 0.5 })
            .collect();
        let points = project_to_sphere(&coords);
        assert_eq!(points.len(), coords.len());
        for (crd, pt) in coords.iter().zip(&points) {
            assert_eq!(crd.to_sphere_pt(), *pt);
        }
    }
}
