use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where to read the element sets from.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    Url(String),
    File(PathBuf),
}

impl CatalogSource {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            CatalogSource::Url(s.to_string())
        } else {
            CatalogSource::File(PathBuf::from(s))
        }
    }

    fn read(&self) -> Result<String, PredictError> {
        match self {
            CatalogSource::Url(url) => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(FETCH_TIMEOUT)
                    .build()?;
                let body = client.get(url).send()?.error_for_status()?.text()?;
                Ok(body)
            }
            CatalogSource::File(path) => Ok(fs::read_to_string(path)?),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Url(url) => write!(f, "{}", url),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl<'de> Deserialize<'de> for CatalogSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(CatalogSource::parse(&s))
    }
}

/// One propagatable satellite.
pub struct Satellite {
    pub name: String,
    pub norad_id: u64,
    pub elements: Elements,
    pub constants: Constants,
}

impl fmt::Debug for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Satellite")
            .field("name", &self.name)
            .field("norad_id", &self.norad_id)
            .field("epoch", &self.elements.datetime)
            .finish()
    }
}

pub struct Catalog {
    satellites: Vec<Satellite>,
}

impl Catalog {
    pub fn load(source: &CatalogSource) -> Result<Self, PredictError> {
        let content = source.read()?;
        let catalog = Self::parse(&content, &source.to_string())?;
        log::info!(
            "Loaded {} satellites from {}",
            catalog.satellites.len(),
            source
        );
        Ok(catalog)
    }

    /// Parse catalog text. Records sgp4 rejects are skipped.
    pub fn parse(content: &str, source_name: &str) -> Result<Self, PredictError> {
        let mut satellites = Vec::new();

        for (name, line1, line2) in parse_multi_tle(content) {
            match parse_satellite(name, &line1, &line2, source_name) {
                Ok(sat) => satellites.push(sat),
                Err(e) => log::warn!("Skipping record: {}", e),
            }
        }

        if satellites.is_empty() {
            return Err(PredictError::NoSatellites(source_name.to_string()));
        }
        Ok(Self { satellites })
    }

    /// Remove and return a satellite by exact name, or by NORAD id when the
    /// query is numeric.
    pub fn take(mut self, query: &str) -> Result<Satellite, PredictError> {
        let query = query.trim();
        let by_id: Option<u64> = query.parse().ok();
        let index = self
            .satellites
            .iter()
            .position(|s| s.name == query)
            .or_else(|| {
                by_id.and_then(|id| self.satellites.iter().position(|s| s.norad_id == id))
            })
            .ok_or_else(|| PredictError::SatelliteNotFound(query.to_string()))?;
        Ok(self.satellites.swap_remove(index))
    }
}

/// Fetch a catalog and pick a single satellite out of it.
pub fn load_satellite(source: &CatalogSource, name: &str) -> Result<Satellite, PredictError> {
    let satellite = Catalog::load(source)?.take(name)?;
    log::info!(
        "Using {} (NORAD {}), epoch {}",
        satellite.name,
        satellite.norad_id,
        satellite.elements.datetime
    );
    Ok(satellite)
}

fn parse_satellite(
    name: Option<String>,
    line1: &str,
    line2: &str,
    source_name: &str,
) -> Result<Satellite, PredictError> {
    let invalid = |message: String| PredictError::InvalidTle {
        source_name: source_name.to_string(),
        message,
    };

    let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
        .map_err(|e| invalid(e.to_string()))?;
    let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;
    let norad_id = elements.norad_id;
    let name = name.unwrap_or_else(|| format!("NORAD {}", norad_id));

    Ok(Satellite {
        name,
        norad_id,
        elements,
        constants,
    })
}

/// Split catalog text into `(name, line1, line2)` records.
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
