#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Latitude {0}° is out of range -90°..90°")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0}° is out of range -180°..180°")]
    LongitudeOutOfRange(f64),

    #[error("Can't parse `{0}` as coordinate")]
    WrongCoordinate(String),

    #[error("Catalog row {0}: {1}")]
    WrongCatalogRow(usize, String),

    #[error("CSV error: `{0}`")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
