use std::path::Path;
use serde::Serialize;

use crate::sky_math::math::EqCoord;
use super::error::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub name:  String,
    pub crd:   EqCoord, // J2000
    pub color: String,
}

impl CatalogItem {
    pub fn new(name: &str, ra: f64, dec: f64, color: &str) -> Self {
        Self {
            name: name.to_string(),
            crd: EqCoord::from_degrees(ra, dec),
            color: color.to_string(),
        }
    }
}

/// Fixed sky objects drawn as markers on celestial sphere
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new_constellations() -> Self {
        // name, RA (°), Dec (°), marker color
        const CONSTELLATIONS: &[(&str, f64, f64, &str)] = &[
            ("Orion",       83.8,  -5.9, "darkorange"),
            ("Ursa Major", 165.0,  56.0, "indigo"    ),
            ("Ursa Minor", 150.0,  75.0, "green"     ),
            ("Crux",       186.0, -63.0, "magenta"   ),
            ("Canis Major",101.0, -17.0, "cyan"      ),
            ("Taurus",      65.0,  16.0, "sienna"    ),
            ("Scorpius",   247.0, -26.0, "firebrick" ),
            ("Sagittarius",266.0, -29.0, "gold"      ),
            ("Capricornus",340.0, -20.0, "teal"      ),
            ("Leo",        170.0,  12.0, "navy"      ),
        ];
        let items = CONSTELLATIONS
            .iter()
            .map(|(name, ra, dec, color)| CatalogItem::new(name, *ra, *dec, color))
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn load_csv_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::open(path.as_ref())
            .map_err(|e| Error::Csv(csv::Error::from(e)))?;
        self.load_csv(file)
    }

    /// Appends items from `;` separated text with `name`, `ra`, `dec`
    /// and optional `color` columns. Angles are in degrees.
    pub fn load_csv(&mut self, reader: impl std::io::Read) -> Result<()> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let find_col = |name: &str| {
            headers.iter().position(|c| c.eq_ignore_ascii_case(name))
        };
        let missing_col = |name: &str| Error::WrongCatalogRow(0, format!("`{}` col not found", name));
        let name_col = find_col("name").ok_or_else(|| missing_col("name"))?;
        let ra_col = find_col("ra").ok_or_else(|| missing_col("ra"))?;
        let dec_col = find_col("dec").ok_or_else(|| missing_col("dec"))?;
        let color_col = find_col("color");

        for (index, record) in rdr.records().enumerate() {
            let record = record?;
            let row = index + 1;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            let parse_angle = |col: usize, range: std::ops::RangeInclusive<f64>| {
                let text = record.get(col).unwrap_or_default();
                text.parse::<f64>()
                    .ok()
                    .filter(|v| range.contains(v))
                    .ok_or_else(|| Error::WrongCatalogRow(row, format!("wrong angle `{}`", text)))
            };
            let name = record.get(name_col).unwrap_or_default();
            if name.is_empty() {
                return Err(Error::WrongCatalogRow(row, "empty name".to_string()));
            }
            let ra = parse_angle(ra_col, 0.0..=360.0)?;
            let dec = parse_angle(dec_col, -90.0..=90.0)?;
            let color = color_col
                .and_then(|col| record.get(col))
                .filter(|color| !color.is_empty())
                .unwrap_or("gray");
            self.items.push(CatalogItem::new(name, ra, dec, color));
        }
        Ok(())
    }
}

#[test]
fn test_constellations() {
    let catalog = Catalog::new_constellations();
    assert_eq!(catalog.len(), 10);
    let orion = &catalog.items()[0];
    assert_eq!(orion.name, "Orion");
    assert!(f64::abs(orion.crd.ra - 83.8_f64.to_radians()) < 1e-12);
    assert!(f64::abs(orion.crd.dec - (-5.9_f64).to_radians()) < 1e-12);
}

#[test]
fn test_load_csv() {
    let text = "\
        name; ra; dec; color\n\
        Sirius; 101.287; -16.716; white\n\
        ;;;\n\
        Vega; 279.235; 38.784;\n";
    let mut catalog = Catalog::default();
    catalog.load_csv(text.as_bytes()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.items()[0].name, "Sirius");
    assert_eq!(catalog.items()[0].color, "white");
    assert_eq!(catalog.items()[1].name, "Vega");
    assert_eq!(catalog.items()[1].color, "gray");
}

#[test]
fn test_load_csv_errors() {
    let mut catalog = Catalog::default();
    let result = catalog.load_csv("name;ra\nVega;279.2\n".as_bytes());
    assert!(matches!(result, Err(Error::WrongCatalogRow(0, _))));

    let result = catalog.load_csv("name;ra;dec\nVega;279.2;100.0\n".as_bytes());
    assert!(matches!(result, Err(Error::WrongCatalogRow(1, _))));

    let result = catalog.load_csv("name;ra;dec\nVega;abc;10.0\n".as_bytes());
    assert!(matches!(result, Err(Error::WrongCatalogRow(1, _))));
    assert!(catalog.is_empty());
}
