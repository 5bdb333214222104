use std::path::PathBuf;
use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteOptions {
    pub latitude:  f64, // in degrees
    pub longitude: f64, // in degrees
}

impl Default for SiteOptions {
    fn default() -> Self {
        // Jakarta
        Self {
            latitude: -6.2,
            longitude: 106.8166,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DialOptions {
    pub center_x:     f64, // in pixels
    pub center_y:     f64, // in pixels
    pub radius:       f64, // in pixels
    pub tick_step:    u32, // in degrees
    pub label_offset: f64, // in pixels
    pub sun_pointer:  f64, // part of radius
    pub moon_pointer: f64, // part of sun pointer
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            center_x:     250.0,
            center_y:     250.0,
            radius:       170.0,
            tick_step:    30,
            label_offset: 15.0,
            sun_pointer:  0.9,
            moon_pointer: 0.8,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RefreshOptions {
    pub interval_ms: u32,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SkyOptions {
    pub show_constellations: bool,
    pub catalog_file:        Option<PathBuf>,
}

impl Default for SkyOptions {
    fn default() -> Self {
        Self {
            show_constellations: true,
            catalog_file:        None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Options {
    pub site:    SiteOptions,
    pub dial:    DialOptions,
    pub refresh: RefreshOptions,
    pub sky:     SkyOptions,
}

#[test]
fn test_options_partial_json() {
    let options: Options = serde_json::from_str(r#"{
        "site": { "latitude": 55.75 },
        "dial": { "radius": 100.0 }
    }"#).unwrap();
    assert_eq!(options.site.latitude, 55.75);
    assert_eq!(options.site.longitude, 106.8166);
    assert_eq!(options.dial.radius, 100.0);
    assert_eq!(options.dial.tick_step, 30);
    assert_eq!(options.refresh.interval_ms, 1000);
    assert!(options.sky.show_constellations);
}

#[test]
fn test_options_json_round() {
    let mut options = Options::default();
    options.sky.catalog_file = Some(PathBuf::from("stars.csv"));
    let text = serde_json::to_string_pretty(&options).unwrap();
    let loaded: Options = serde_json::from_str(&text).unwrap();
    assert_eq!(options, loaded);
}
