//! Candidate roster ingest from the operations team's CSV export.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{Badge, Candidate, CandidateId, PayRange, TaxType};
use super::geo::GeoPoint;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, issue: String },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Row { line, issue } => {
                write!(f, "roster row at line {} rejected: {}", line, issue)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads a worker roster export into candidate profiles. Badges and tax
/// types must parse; a typo in the export is a rejected row with a line
/// number, never a silently downgraded worker.
pub struct CandidateRosterImporter;

impl CandidateRosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Candidate>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Candidate>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut candidates = Vec::new();

        for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
            // Line 1 is the header row.
            let line = index as u64 + 2;
            let row = record?;
            candidates.push(row.into_candidate(line)?);
        }

        Ok(candidates)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Worker ID")]
    worker_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Badge")]
    badge: String,
    #[serde(rename = "Industries", default)]
    industries: String,
    #[serde(rename = "Preferred Roles", default)]
    preferred_roles: String,
    #[serde(rename = "Tax Types", default)]
    tax_types: String,
    #[serde(rename = "Radius Km")]
    radius_km: f64,
    #[serde(rename = "Pay Min")]
    pay_min: f64,
    #[serde(rename = "Pay Max")]
    pay_max: f64,
    #[serde(rename = "Experience", default, deserialize_with = "empty_string_as_none")]
    experience: Option<String>,
    #[serde(rename = "Acceptance Rating")]
    acceptance_rating: f64,
    #[serde(rename = "Latitude", default, deserialize_with = "empty_string_as_none")]
    latitude: Option<String>,
    #[serde(rename = "Longitude", default, deserialize_with = "empty_string_as_none")]
    longitude: Option<String>,
}

impl RosterRow {
    fn into_candidate(self, line: u64) -> Result<Candidate, RosterImportError> {
        let badge = Badge::parse(&self.badge).ok_or_else(|| RosterImportError::Row {
            line,
            issue: format!("unknown badge '{}'", self.badge),
        })?;

        let mut tax_types = Vec::new();
        for item in split_list(&self.tax_types) {
            let tax_type = TaxType::parse(&item).ok_or_else(|| RosterImportError::Row {
                line,
                issue: format!("unknown tax type '{}'", item),
            })?;
            tax_types.push(tax_type);
        }

        let experience_years = match self.experience.as_deref() {
            Some(value) => parse_experience(value).ok_or_else(|| RosterImportError::Row {
                line,
                issue: format!("unreadable experience '{}'", value),
            })?,
            None => 0.0,
        };

        let location = self.location(line)?;

        Ok(Candidate {
            id: CandidateId(self.worker_id),
            name: self.name,
            badge,
            industries: split_list(&self.industries),
            preferred_roles: split_list(&self.preferred_roles),
            tax_types,
            radius_km: self.radius_km,
            pay_preference: PayRange {
                min: self.pay_min,
                max: self.pay_max,
            },
            experience_years,
            acceptance_rating: self.acceptance_rating,
            location,
        })
    }

    /// A row needs both coordinates to place the worker; anything less is
    /// an unknown location, matching how the matcher treats the field.
    fn location(&self, line: u64) -> Result<Option<GeoPoint>, RosterImportError> {
        match (self.latitude.as_deref(), self.longitude.as_deref()) {
            (Some(latitude), Some(longitude)) => {
                let latitude = parse_coordinate(latitude, "latitude", line)?;
                let longitude = parse_coordinate(longitude, "longitude", line)?;
                Ok(Some(GeoPoint {
                    latitude,
                    longitude,
                }))
            }
            _ => Ok(None),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_coordinate(value: &str, axis: &str, line: u64) -> Result<f64, RosterImportError> {
    value.trim().parse().map_err(|_| RosterImportError::Row {
        line,
        issue: format!("unreadable {} '{}'", axis, value),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts "2 Years", "18 Months", or a plain fractional year count.
fn parse_experience(value: &str) -> Option<f64> {
    let lower = value.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return None;
    }

    if let Some(years) = lower.strip_suffix("years").or_else(|| lower.strip_suffix("year")) {
        return years.trim().parse::<f64>().ok();
    }

    if let Some(months) = lower
        .strip_suffix("months")
        .or_else(|| lower.strip_suffix("month"))
    {
        return months.trim().parse::<f64>().ok().map(|months| months / 12.0);
    }

    lower.parse::<f64>().ok()
}
