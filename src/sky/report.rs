use chrono::{FixedOffset, NaiveDateTime};
use itertools::Itertools;

use crate::sky_math::sexagesimal::value_to_sexagesimal;
use super::snapshot::Snapshot;

fn local_time_str(utc: &Option<NaiveDateTime>, tz: &FixedOffset, fmt: &str) -> String {
    match utc {
        Some(utc) => utc.and_utc().with_timezone(tz).format(fmt).to_string(),
        None => "N/A".to_string(),
    }
}

/// Multiline status text of snapshot with times in `tz`
pub fn status_text(snapshot: &Snapshot, tz: &FixedOffset) -> String {
    let visible = snapshot.fixed
        .iter()
        .filter(|body| body.crd.is_above_horizon())
        .map(|body| body.name.as_str())
        .join(", ");
    format!(
        "Location: {}, {}\n\
         Local time: {}\n\
         Sun  -> Azimuth: {:.1}°, Altitude: {:.1}°\n\
         Moon -> Azimuth: {:.1}°, Altitude: {:.1}°, Phase: {:.2}\n\
         Sunrise: {} | Sunset: {}\n\
         Constellations above horizon: {}",
        value_to_sexagesimal(snapshot.observer.latitude_degrees(), true, 6),
        value_to_sexagesimal(snapshot.observer.longitude_degrees(), true, 6),
        local_time_str(&Some(snapshot.utc), tz, "%Y-%m-%d %H:%M:%S"),
        snapshot.sun.az_degrees(), snapshot.sun.alt_degrees(),
        snapshot.moon.az_degrees(), snapshot.moon.alt_degrees(), snapshot.moon_phase,
        local_time_str(&snapshot.sun_rise_set.rise, tz, "%H:%M:%S"),
        local_time_str(&snapshot.sun_rise_set.set, tz, "%H:%M:%S"),
        if visible.is_empty() { "none" } else { visible.as_str() },
    )
}

#[test]
fn test_status_text() {
    use chrono::NaiveDate;
    use super::snapshot::tests::fake_snapshot;

    let mut snapshot = fake_snapshot();
    snapshot.sun_rise_set.rise = NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(22, 42, 29));
    let tz = FixedOffset::east_opt(7 * 3600).unwrap();
    let text = status_text(&snapshot, &tz);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "Location: -06:12:00, 106:49:00");
    assert_eq!(lines[1], "Local time: 2025-01-01 19:00:00");
    assert_eq!(lines[2], "Sun  -> Azimuth: 0.0°, Altitude: 30.0°");
    assert_eq!(lines[3], "Moon -> Azimuth: 90.0°, Altitude: -10.0°, Phase: 0.25");
    assert_eq!(lines[4], "Sunrise: 05:42:29 | Sunset: N/A");
    assert_eq!(lines[5], "Constellations above horizon: Ursa Major, Ursa Minor, Taurus, Leo");
}
