//! Read-only airline directory.
//!
//! Loaded once at startup and shared behind an `Arc`; never mutated
//! afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of results returned by [`AirlineDirectory::search`].
pub const MAX_SEARCH_RESULTS: usize = 20;

/// One airline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    /// Two-character IATA code.
    pub iata: String,
    /// Three-letter ICAO code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    /// Display name.
    pub nom: String,
    /// Country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pays: Option<String>,
}

/// Errors loading the directory.
#[derive(Debug, Error)]
pub enum AirlineError {
    /// File could not be read.
    #[error("cannot read airline directory {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// File is not a JSON array of airlines.
    #[error("invalid airline directory: {0}")]
    Parse(#[from] serde_json::Error),
    /// An entry has a blank IATA code or name.
    #[error("airline entry {0} has a blank code or name")]
    BlankEntry(usize),
}

/// Airline lookup table.
#[derive(Debug, Clone, Default)]
pub struct AirlineDirectory {
    airlines: Vec<Airline>,
}

impl AirlineDirectory {
    /// Builds a directory, normalizing codes to upper case and sorting by
    /// IATA code.
    pub fn new(airlines: Vec<Airline>) -> Result<Self, AirlineError> {
        let mut airlines = airlines
            .into_iter()
            .enumerate()
            .map(|(idx, mut a)| {
                a.iata = a.iata.trim().to_uppercase();
                a.nom = a.nom.trim().to_string();
                a.icao = a.icao.map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty());
                if a.iata.is_empty() || a.nom.is_empty() {
                    return Err(AirlineError::BlankEntry(idx));
                }
                Ok(a)
            })
            .collect::<Result<Vec<_>, _>>()?;
        airlines.sort_by(|a, b| a.iata.cmp(&b.iata).then_with(|| a.nom.cmp(&b.nom)));
        Ok(Self { airlines })
    }

    /// Parses a JSON array.
    pub fn from_json(json: &str) -> Result<Self, AirlineError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AirlineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| AirlineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Number of airlines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.airlines.len()
    }

    /// True when nothing was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airlines.is_empty()
    }

    /// Exact IATA lookup.
    #[must_use]
    pub fn by_iata(&self, code: &str) -> Option<&Airline> {
        let code = code.trim().to_uppercase();
        self.airlines.iter().find(|a| a.iata == code)
    }

    /// Case-insensitive search on codes and name.
    ///
    /// Exact code matches come first, then name matches, in directory
    /// order. A blank query returns the head of the directory.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Airline> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return self.airlines.iter().take(MAX_SEARCH_RESULTS).collect();
        }

        let exact_code = |a: &Airline| {
            a.iata.to_lowercase() == q || a.icao.as_deref().is_some_and(|c| c.to_lowercase() == q)
        };
        let partial = |a: &Airline| {
            a.nom.to_lowercase().contains(&q)
                || a.iata.to_lowercase().starts_with(&q)
                || a.icao
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().starts_with(&q))
        };

        self.airlines
            .iter()
            .filter(|a| exact_code(a))
            .chain(self.airlines.iter().filter(|a| !exact_code(a) && partial(a)))
            .take(MAX_SEARCH_RESULTS)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"iata": "af", "icao": "AFR", "nom": "Air France", "pays": "France"},
        {"iata": "AH", "icao": "DAH", "nom": "Air Algérie", "pays": "Algérie"},
        {"iata": "TU", "icao": "TAR", "nom": "Tunisair"},
        {"iata": "AT", "nom": "Royal Air Maroc"}
    ]"#;

    #[test]
    fn test_from_json_normalizes_and_sorts() {
        let dir = AirlineDirectory::from_json(SAMPLE).unwrap();
        assert_eq!(dir.len(), 4);
        assert_eq!(dir.by_iata("af").unwrap().nom, "Air France");
        assert_eq!(dir.search("")[0].iata, "AF");
    }

    #[test]
    fn test_search_exact_code_first() {
        let dir = AirlineDirectory::from_json(SAMPLE).unwrap();
        let hits = dir.search("ah");
        assert_eq!(hits[0].iata, "AH");

        let hits = dir.search("tar");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].nom, "Tunisair");
    }

    #[test]
    fn test_search_by_name() {
        let dir = AirlineDirectory::from_json(SAMPLE).unwrap();
        let names: Vec<_> = dir.search("air").iter().map(|a| a.nom.as_str()).collect();
        assert_eq!(names, vec!["Air France", "Air Algérie", "Royal Air Maroc", "Tunisair"]);
    }

    #[test]
    fn test_blank_entry_rejected() {
        let err = AirlineDirectory::from_json(r#"[{"iata": " ", "nom": "X"}]"#).unwrap_err();
        assert!(matches!(err, AirlineError::BlankEntry(0)));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            AirlineDirectory::from_json("{}"),
            Err(AirlineError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = AirlineDirectory::load("/nonexistent/airlines.json").unwrap_err();
        assert!(matches!(err, AirlineError::Io { .. }));
    }
}
