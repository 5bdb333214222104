use std::f64::consts::PI;
use serde::Serialize;

use crate::sky_math::{math::*, projection::*};
use super::snapshot::Snapshot;

const LABEL_RADIUS: f64 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MarkerShape {
    Circle,
    Triangle,
}

#[derive(Debug, Clone, Serialize)]
pub struct SphereMarker {
    pub name:          String,
    pub color:         String,
    pub shape:         MarkerShape,
    pub size:          f64,
    pub pos:           Point3D,
    pub above_horizon: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SphereLabel {
    pub text: &'static str,
    pub pos:  Point3D,
}

/// Markers and labels of 3D celestial sphere. Upper half (z >= 0) is sky,
/// lower half is ground.
#[derive(Debug, Clone, Serialize)]
pub struct SphereScene {
    pub markers: Vec<SphereMarker>,
    pub labels:  Vec<SphereLabel>,
}

impl SphereScene {
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut markers = vec![
            SphereMarker {
                name:          "Sun".to_string(),
                color:         "red".to_string(),
                shape:         MarkerShape::Circle,
                size:          100.0,
                pos:           snapshot.sun.to_sphere_pt(),
                above_horizon: snapshot.sun.is_above_horizon(),
            },
            SphereMarker {
                name:          "Moon".to_string(),
                color:         "blue".to_string(),
                shape:         MarkerShape::Circle,
                size:          100.0,
                pos:           snapshot.moon.to_sphere_pt(),
                above_horizon: snapshot.moon.is_above_horizon(),
            },
        ];

        let fixed_crds: Vec<_> = snapshot.fixed.iter().map(|body| body.crd).collect();
        let fixed_pts = project_to_sphere(&fixed_crds);
        markers.extend(snapshot.fixed.iter().zip(fixed_pts).map(|(body, pos)| {
            SphereMarker {
                name:          body.name.clone(),
                color:         body.color.clone(),
                shape:         MarkerShape::Triangle,
                size:          50.0,
                pos,
                above_horizon: body.crd.is_above_horizon(),
            }
        }));

        Self { markers, labels: Self::cardinal_labels() }
    }

    fn cardinal_labels() -> Vec<SphereLabel> {
        [("N", 0.0), ("E", 0.5 * PI), ("S", PI), ("W", 1.5 * PI)]
            .into_iter()
            .map(|(text, az)| {
                let pt = horiz_to_sphere_pt(az, 0.0);
                SphereLabel {
                    text,
                    pos: Point3D {
                        x: LABEL_RADIUS * pt.x,
                        y: LABEL_RADIUS * pt.y,
                        z: 0.0,
                    },
                }
            })
            .collect()
    }

    pub fn visible_markers(&self) -> impl Iterator<Item = &SphereMarker> {
        self.markers.iter().filter(|marker| marker.above_horizon)
    }
}

#[test]
fn test_sphere_scene() {
    use super::snapshot::tests::fake_snapshot;

    let scene = SphereScene::build(&fake_snapshot());
    assert_eq!(scene.markers.len(), 12);

    let sun = &scene.markers[0];
    assert_eq!(sun.shape, MarkerShape::Circle);
    assert!(sun.above_horizon);
    assert!(f64::abs(sun.pos.x - f64::cos(degree_to_radian(30.0))) < 1e-12);
    assert!(f64::abs(sun.pos.z - 0.5) < 1e-12);

    let moon = &scene.markers[1];
    assert!(!moon.above_horizon);
    assert!(moon.pos.z < 0.0);

    for marker in &scene.markers {
        assert!(f64::abs(marker.pos.len() - 1.0) < 1e-12);
    }

    // Ursa Major (dec = 56°) is above horizon, Crux (dec = -63°) is below
    let visible: Vec<_> = scene.visible_markers().map(|m| m.name.as_str()).collect();
    assert!(visible.contains(&"Ursa Major"));
    assert!(!visible.contains(&"Crux"));
    assert!(scene.markers.iter().filter(|m| m.shape == MarkerShape::Triangle).count() == 10);
}

#[test]
fn test_cardinal_labels() {
    let labels = SphereScene::cardinal_labels();
    let texts: Vec<_> = labels.iter().map(|l| l.text).collect();
    assert_eq!(texts, ["N", "E", "S", "W"]);
    assert!(f64::abs(labels[0].pos.x - 1.05) < 1e-12);
    assert!(f64::abs(labels[1].pos.y - 1.05) < 1e-12);
    assert!(f64::abs(labels[2].pos.x + 1.05) < 1e-12);
    assert!(f64::abs(labels[3].pos.y + 1.05) < 1e-12);
}
