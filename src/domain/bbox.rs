use anyhow::{Context, Result, bail};
use std::fmt;
use std::str::FromStr;

/// Bounding box in the order Overpass expects: `(min_lat, min_lon, max_lat, max_lon)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_lat, self.min_lon, self.max_lat, self.max_lon)
    }
}

impl From<(f64, f64, f64, f64)> for BoundingBox {
    fn from((min_lat, min_lon, max_lat, max_lon): (f64, f64, f64, f64)) -> Self {
        Self::new(min_lat, min_lon, max_lat, max_lon)
    }
}

/// Renders as `min_lat,min_lon,max_lat,max_lon`.
impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}

impl FromStr for BoundingBox {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .with_context(|| format!("Invalid bounding box value: {:?}", part))
            })
            .collect::<Result<Vec<f64>>>()?;

        match values.as_slice() {
            &[min_lat, min_lon, max_lat, max_lon] => {
                Ok(Self::new(min_lat, min_lon, max_lat, max_lon))
            }
            _ => bail!(
                "Bounding box needs 4 values (min_lat,min_lon,max_lat,max_lon), got {}",
                values.len()
            ),
        }
    }
}

/// OSM `key=value` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<(&str, &str)> for Tag {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}

impl FromStr for Tag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key, value)),
            _ => bail!("Tag must look like key=value, got {:?}", s),
        }
    }
}
