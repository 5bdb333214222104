use chrono::NaiveDateTime;
use serde::Serialize;

use crate::options::DialOptions;
use super::{catalog::Catalog, dial::DialScene, ephemeris::*, snapshot::Snapshot, sphere::SphereScene};

/// One refresh tick: positions plus both scenes ready for renderers
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub snapshot: Snapshot,
    pub dial:     DialScene,
    pub sphere:   SphereScene,
}

impl Frame {
    pub fn compute(
        ephem:    &dyn Ephemeris,
        observer: &Observer,
        utc:      &NaiveDateTime,
        catalog:  &Catalog,
        dial_opts: &DialOptions,
    ) -> Self {
        let snapshot = Snapshot::compute(ephem, observer, utc, catalog);
        let dial = DialScene::build(&snapshot, dial_opts);
        let sphere = SphereScene::build(&snapshot);
        Self { snapshot, dial, sphere }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[test]
fn test_frame_json() {
    use super::snapshot::tests::{FakeEphemeris, test_time};

    let observer = Observer::from_degrees(10.0, 20.0).unwrap();
    let frame = Frame::compute(
        &FakeEphemeris,
        &observer,
        &test_time(),
        &Catalog::default(),
        &DialOptions::default()
    );
    assert_eq!(frame.sphere.markers.len(), 2);

    let value: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
    assert_eq!(value["snapshot"]["utc"], "2025-01-01T12:00:00");
    assert_eq!(value["snapshot"]["moon_phase"], 0.25);
    assert_eq!(value["dial"]["pointers"][0]["name"], "Sun");
    assert_eq!(value["dial"]["ticks"].as_array().map(|t| t.len()), Some(12));
    assert_eq!(value["sphere"]["markers"][1]["shape"], "Circle");
    assert_eq!(value["sphere"]["labels"][0]["text"], "N");
    assert!(value["snapshot"]["sun_rise_set"]["rise"].is_null());
}
