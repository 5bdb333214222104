use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::sky_math::{math::*, sexagesimal::parse_degrees, solar_system::*};
use super::error::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observer {
    pub latitude:  f64, // in radian
    pub longitude: f64, // in radian
}

impl Observer {
    pub fn from_degrees(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude: degree_to_radian(latitude),
            longitude: degree_to_radian(longitude),
        })
    }

    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let lat = parse_degrees(latitude)
            .ok_or_else(|| Error::WrongCoordinate(latitude.to_string()))?;
        let lon = parse_degrees(longitude)
            .ok_or_else(|| Error::WrongCoordinate(longitude.to_string()))?;
        Self::from_degrees(lat, lon)
    }

    pub fn latitude_degrees(&self) -> f64 {
        radian_to_degree(self.latitude)
    }

    pub fn longitude_degrees(&self) -> f64 {
        radian_to_degree(self.longitude)
    }
}

#[test]
fn test_observer_validation() {
    assert!(Observer::from_degrees(-6.2, 106.8166).is_ok());
    assert!(Observer::from_degrees(90.0, -180.0).is_ok());
    assert!(matches!(
        Observer::from_degrees(91.0, 0.0),
        Err(Error::LatitudeOutOfRange(_))
    ));
    assert!(matches!(
        Observer::from_degrees(0.0, 180.5),
        Err(Error::LongitudeOutOfRange(_))
    ));
    assert!(matches!(
        Observer::parse("abc", "10"),
        Err(Error::WrongCoordinate(_))
    ));
    let observer = Observer::parse("-06:12:00", "106.8166").unwrap();
    assert!(f64::abs(observer.latitude_degrees() - -6.2) < 1e-9);
}

/// Source of observer related positions of sky objects
pub trait Ephemeris: Sync {
    fn sun(&self, observer: &Observer, utc: &NaiveDateTime) -> HorizCoord;

    /// Position and illuminated fraction (0.0 - new moon, 1.0 - full moon)
    fn moon(&self, observer: &Observer, utc: &NaiveDateTime) -> (HorizCoord, f64);

    /// Position of object with J2000 coordinates
    fn fixed_body(&self, observer: &Observer, utc: &NaiveDateTime, crd: &EqCoord) -> HorizCoord;
}

/// Low precision series good for about one arcminute for the Sun
/// and several arcminutes for the Moon
#[derive(Default)]
pub struct MiniEphemeris;

impl MiniEphemeris {
    fn cvt(observer: &Observer, utc: &NaiveDateTime) -> EqToHorizCvt {
        EqToHorizCvt::new(observer.longitude, observer.latitude, utc)
    }
}

impl Ephemeris for MiniEphemeris {
    fn sun(&self, observer: &Observer, utc: &NaiveDateTime) -> HorizCoord {
        let sun_crd = mini_sun(calc_julian_centuries(utc));
        Self::cvt(observer, utc).eq_to_horiz(&sun_crd)
    }

    fn moon(&self, observer: &Observer, utc: &NaiveDateTime) -> (HorizCoord, f64) {
        let julian_centuries = calc_julian_centuries(utc);
        let moon_crd = mini_moon(julian_centuries);
        let horiz = Self::cvt(observer, utc).eq_to_horiz(&moon_crd);
        (horiz, moon_phase(julian_centuries))
    }

    fn fixed_body(&self, observer: &Observer, utc: &NaiveDateTime, crd: &EqCoord) -> HorizCoord {
        let crd_now = EpochCvt::from_j2000(utc).convert_eq(crd);
        Self::cvt(observer, utc).eq_to_horiz(&crd_now)
    }
}

#[test]
fn test_mini_ephemeris_sun() {
    use chrono::NaiveDate;
    let ephem = MiniEphemeris;

    // Equinox noon at Greenwich: the Sun is close to the south at altitude ≈ 90° - latitude
    let observer = Observer::from_degrees(51.48, 0.0).unwrap();
    let utc = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap().and_hms_opt(12, 7, 0).unwrap();
    let sun = ephem.sun(&observer, &utc);
    assert!(f64::abs(sun.az_degrees() - 180.0) < 1.0, "{:?}", sun);
    assert!(f64::abs(sun.alt_degrees() - 38.5) < 1.0, "{:?}", sun);

    // Midnight at Jakarta is night
    let observer = Observer::from_degrees(-6.2, 106.8166).unwrap();
    let utc = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(17, 0, 0).unwrap();
    assert!(!ephem.sun(&observer, &utc).is_above_horizon());
}

#[test]
fn test_mini_ephemeris_fixed_body() {
    use chrono::NaiveDate;
    let ephem = MiniEphemeris;

    // Polaris stays at altitude close to observer latitude
    let polaris = EqCoord::from_degrees(37.95, 89.264);
    let observer = Observer::from_degrees(45.0, 10.0).unwrap();
    for hour in [0, 6, 12, 18] {
        let utc = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(hour, 0, 0).unwrap();
        let crd = ephem.fixed_body(&observer, &utc, &polaris);
        assert!(f64::abs(crd.alt_degrees() - 45.0) < 1.0, "{:?}", crd);
    }
}

/// Apparent altitude of the Sun upper limb on horizon with standard refraction
pub fn sun_horizon_alt() -> f64 {
    -arcmin_to_radian(50.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RiseSet {
    pub rise: Option<NaiveDateTime>,
    pub set:  Option<NaiveDateTime>,
}

const RISE_SET_SEARCH_MINUTES: i64 = 48 * 60;
const RISE_SET_STEP_MINUTES: i64 = 10;

/// Next sunrise and sunset after `utc` (in UTC).
/// Search stops when both are found or after 48 hours, so
/// `None` means the Sun doesn't cross horizon (polar day or night).
pub fn sun_rise_and_set(
    ephem:    &dyn Ephemeris,
    observer: &Observer,
    utc:      &NaiveDateTime,
) -> RiseSet {
    let horizon = sun_horizon_alt();
    let alt_at = |time: &NaiveDateTime| ephem.sun(observer, time).alt - horizon;

    let mut result = RiseSet::default();
    let mut prev_time = *utc;
    let mut prev_alt = alt_at(&prev_time);
    let mut minutes = 0;
    while minutes < RISE_SET_SEARCH_MINUTES
    && (result.rise.is_none() || result.set.is_none()) {
        minutes += RISE_SET_STEP_MINUTES;
        let time = *utc + Duration::minutes(minutes);
        let alt = alt_at(&time);
        if prev_alt < 0.0 && alt >= 0.0 && result.rise.is_none() {
            result.rise = Some(bisect_horizon(&alt_at, prev_time, time));
        } else if prev_alt >= 0.0 && alt < 0.0 && result.set.is_none() {
            result.set = Some(bisect_horizon(&alt_at, prev_time, time));
        }
        prev_time = time;
        prev_alt = alt;
    }
    result
}

fn bisect_horizon(
    alt_at: &dyn Fn(&NaiveDateTime) -> f64,
    mut time1: NaiveDateTime,
    mut time2: NaiveDateTime,
) -> NaiveDateTime {
    let rising = alt_at(&time1) < 0.0;
    while time2 - time1 > Duration::seconds(1) {
        let middle = time1 + (time2 - time1) / 2;
        let is_below = alt_at(&middle) < 0.0;
        if is_below == rising {
            time1 = middle;
        } else {
            time2 = middle;
        }
    }
    time1 + (time2 - time1) / 2
}

#[test]
fn test_sun_rise_and_set() {
    use chrono::NaiveDate;
    let ephem = MiniEphemeris;

    // Jakarta, 2025-01-02: sunrise 05:42, sunset 18:11 local (UTC+7)
    let observer = Observer::from_degrees(-6.2, 106.8166).unwrap();
    let utc = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
    let rise_set = sun_rise_and_set(&ephem, &observer, &utc);
    let rise = rise_set.rise.unwrap();
    let set = rise_set.set.unwrap();
    let expected_rise = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(22, 42, 0).unwrap();
    let expected_set = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap().and_hms_opt(11, 11, 0).unwrap();
    assert!((rise - expected_rise).num_seconds().abs() < 180, "{}", rise);
    assert!((set - expected_set).num_seconds().abs() < 180, "{}", set);

    // Polar night: no sunrise at all
    let observer = Observer::from_degrees(80.0, 15.0).unwrap();
    let utc = NaiveDate::from_ymd_opt(2025, 12, 21).unwrap().and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(sun_rise_and_set(&ephem, &observer, &utc), RiseSet::default());

    // Polar day: no sunset
    let utc = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let rise_set = sun_rise_and_set(&ephem, &observer, &utc);
    assert!(rise_set.rise.is_none() && rise_set.set.is_none());
}

#[test]
fn test_sun_rise_just_after_sunrise() {
    use chrono::NaiveDate;
    let ephem = MiniEphemeris;
    let observer = Observer::from_degrees(50.0, 0.0).unwrap();
    let midnight = NaiveDate::from_ymd_opt(2025, 9, 22).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let sunrise = sun_rise_and_set(&ephem, &observer, &midnight).rise.unwrap();
    let expected = NaiveDate::from_ymd_opt(2025, 9, 22).unwrap().and_hms_opt(5, 46, 35).unwrap();
    assert!((sunrise - expected).num_seconds().abs() < 180, "{}", sunrise);

    // Next sunrise is more than 24 hours after the query time
    let utc = sunrise + Duration::seconds(30);
    let rise_set = sun_rise_and_set(&ephem, &observer, &utc);
    let next_rise = rise_set.rise.unwrap();
    let expected = NaiveDate::from_ymd_opt(2025, 9, 23).unwrap().and_hms_opt(5, 48, 5).unwrap();
    assert!((next_rise - expected).num_seconds().abs() < 180, "{}", next_rise);
    assert!(next_rise - utc > Duration::hours(24));
    let set = rise_set.set.unwrap();
    assert!(set > utc && set < next_rise, "{}", set);
}
