use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;

use crate::sky_math::math::HorizCoord;
use super::{catalog::*, ephemeris::*};

#[derive(Debug, Clone, Serialize)]
pub struct FixedBodyPos {
    pub name:  String,
    pub color: String,
    pub crd:   HorizCoord,
}

/// Positions of everything shown for one refresh tick
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub utc:        NaiveDateTime,
    pub observer:   Observer,
    pub sun:        HorizCoord,
    pub moon:       HorizCoord,
    pub moon_phase: f64,
    pub sun_rise_set: RiseSet,
    pub fixed:      Vec<FixedBodyPos>,
}

impl Snapshot {
    pub fn compute(
        ephem:    &dyn Ephemeris,
        observer: &Observer,
        utc:      &NaiveDateTime,
        catalog:  &Catalog,
    ) -> Self {
        let sun = ephem.sun(observer, utc);
        let (moon, moon_phase) = ephem.moon(observer, utc);
        let sun_rise_set = sun_rise_and_set(ephem, observer, utc);
        let fixed = catalog.items()
            .par_iter()
            .map(|item| FixedBodyPos {
                name:  item.name.clone(),
                color: item.color.clone(),
                crd:   ephem.fixed_body(observer, utc, &item.crd),
            })
            .collect();
        Self {
            utc: *utc,
            observer: *observer,
            sun,
            moon,
            moon_phase,
            sun_rise_set,
            fixed,
        }
    }
}

#[cfg(test)]
pub(super) mod tests {
    use chrono::NaiveDate;
    use crate::sky_math::math::*;
    use super::*;

    /// Returns fixed positions so scenes can be checked exactly
    pub struct FakeEphemeris;

    impl Ephemeris for FakeEphemeris {
        fn sun(&self, _: &Observer, _: &NaiveDateTime) -> HorizCoord {
            HorizCoord { az: 0.0, alt: degree_to_radian(30.0) }
        }

        fn moon(&self, _: &Observer, _: &NaiveDateTime) -> (HorizCoord, f64) {
            (HorizCoord { az: degree_to_radian(90.0), alt: degree_to_radian(-10.0) }, 0.25)
        }

        fn fixed_body(&self, _: &Observer, _: &NaiveDateTime, crd: &EqCoord) -> HorizCoord {
            HorizCoord { az: crd.ra, alt: crd.dec }
        }
    }

    pub fn test_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    pub fn fake_snapshot() -> Snapshot {
        let observer = Observer::from_degrees(-6.2, 106.8166).unwrap();
        Snapshot::compute(&FakeEphemeris, &observer, &test_time(), &Catalog::new_constellations())
    }

    #[test]
    fn test_snapshot_compute() {
        let snapshot = fake_snapshot();
        assert_eq!(snapshot.utc, test_time());
        assert_eq!(snapshot.moon_phase, 0.25);
        assert_eq!(snapshot.sun.alt, degree_to_radian(30.0));
        assert_eq!(snapshot.fixed.len(), 10);
        assert_eq!(snapshot.fixed[3].name, "Crux");
        assert_eq!(snapshot.fixed[3].crd.alt, degree_to_radian(-63.0));

        // Sun which never moves never rises or sets
        assert_eq!(snapshot.sun_rise_set, RiseSet::default());
    }

    #[test]
    fn test_snapshot_real_ephemeris() {
        let observer = Observer::from_degrees(-6.2, 106.8166).unwrap();
        let snapshot = Snapshot::compute(
            &MiniEphemeris,
            &observer,
            &test_time(),
            &Catalog::new_constellations()
        );
        // 19:00 local time at Jakarta
        assert!(!snapshot.sun.is_above_horizon());
        assert!(snapshot.sun_rise_set.rise.is_some());
        assert!(snapshot.sun_rise_set.set.is_some());
        assert!((0.0..=1.0).contains(&snapshot.moon_phase));
        for body in &snapshot.fixed {
            assert!((0.0..2.0 * std::f64::consts::PI).contains(&body.crd.az));
        }
    }
}
