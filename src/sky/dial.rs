use serde::Serialize;

use crate::{
    options::DialOptions,
    sky_math::{math::degree_to_radian, projection::*},
};
use super::snapshot::Snapshot;

#[derive(Debug, Clone, Serialize)]
pub struct DialTick {
    pub degrees:   u32,
    pub end:       DialPoint,
    pub label_pos: DialPoint,
    pub label:     String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DialPointer {
    pub name:  &'static str,
    pub color: &'static str,
    pub tip:   DialPoint,
}

/// Everything needed to paint 2D astrolab dial
#[derive(Debug, Clone, Serialize)]
pub struct DialScene {
    pub center:   DialPoint,
    pub radius:   f64,
    pub ticks:    Vec<DialTick>,
    pub pointers: Vec<DialPointer>,
}

impl DialScene {
    pub fn build(snapshot: &Snapshot, options: &DialOptions) -> Self {
        let center = DialPoint { x: options.center_x, y: options.center_y };
        let radius = options.radius;

        let ticks = (0..360)
            .step_by(options.tick_step.max(1) as usize)
            .map(|degrees| {
                let angle = degree_to_radian(degrees as f64);
                DialTick {
                    degrees,
                    end: polar_to_cartesian(angle, radius, &center),
                    label_pos: polar_to_cartesian(angle, radius + options.label_offset, &center),
                    label: format!("{}°", degrees),
                }
            })
            .collect();

        let sun_len = radius * options.sun_pointer;
        let moon_len = sun_len * options.moon_pointer;
        let pointers = vec![
            DialPointer {
                name:  "Sun",
                color: "red",
                tip:   snapshot.sun.to_dial_pt(sun_len, &center),
            },
            DialPointer {
                name:  "Moon",
                color: "blue",
                tip:   snapshot.moon.to_dial_pt(moon_len, &center),
            },
        ];

        Self { center, radius, ticks, pointers }
    }
}

#[test]
fn test_dial_scene() {
    use super::snapshot::tests::fake_snapshot;

    let options = DialOptions::default();
    let scene = DialScene::build(&fake_snapshot(), &options);
    assert_eq!(scene.ticks.len(), 12);
    assert_eq!(scene.ticks[3].degrees, 90);
    assert_eq!(scene.ticks[3].label, "90°");

    // 90° tick goes up
    let tick = &scene.ticks[3];
    assert!(f64::abs(tick.end.x - 250.0) < 1e-9);
    assert!(f64::abs(tick.end.y - 80.0) < 1e-9);
    assert!(f64::abs(tick.label_pos.y - 65.0) < 1e-9);

    // Sun at azimuth 0° points right with 0.9 of radius
    let sun = &scene.pointers[0];
    assert_eq!(sun.name, "Sun");
    assert!(f64::abs(sun.tip.x - (250.0 + 153.0)) < 1e-9);
    assert!(f64::abs(sun.tip.y - 250.0) < 1e-9);

    // Moon at azimuth 90° points up with 0.8 of sun pointer
    let moon = &scene.pointers[1];
    assert!(f64::abs(moon.tip.x - 250.0) < 1e-9);
    assert!(f64::abs(moon.tip.y - (250.0 - 122.4)) < 1e-9);
}

#[test]
fn test_dial_scene_zero_step() {
    use super::snapshot::tests::fake_snapshot;

    let options = DialOptions { tick_step: 0, ..DialOptions::default() };
    let scene = DialScene::build(&fake_snapshot(), &options);
    assert_eq!(scene.ticks.len(), 360);
}
