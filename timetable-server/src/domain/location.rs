//! Location types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of place a [`Location`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    /// A stop served by public transport.
    Station,
    /// A street address (walking legs to or from a door).
    Address,
    /// Free text or a coordinate the upstream has not resolved yet.
    Any,
}

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Builds a point from optional upstream coordinates.
    ///
    /// Both halves must be present; a lone latitude or longitude is dropped.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        Some(Self::new(lat?, lon?))
    }

    /// Parses the `"lat,lon"` form the upstream accepts as a query term.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::Point;
    ///
    /// let p = Point::parse("47.378177,8.540192").unwrap();
    /// assert_eq!(p.lat, 47.378177);
    /// assert!(Point::parse("Zürich HB").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let (lat, lon) = s.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self::new(lat, lon))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// A place: a station, an address, or an unresolved point.
///
/// Addresses reached by walking legs carry no id, and a few upstream
/// entries carry no coordinate, so every attribute but the kind is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub kind: LocationKind,
    pub id: Option<String>,
    pub coord: Option<Point>,
    pub name: Option<String>,
}

impl Location {
    /// Creates a station location with a known upstream id.
    pub fn station(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::Station,
            id: Some(id.into()),
            coord: None,
            name: Some(name.into()),
        }
    }

    /// Creates an address location, which has a coordinate but no id.
    pub fn address(coord: Point, name: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::Address,
            id: None,
            coord: Some(coord),
            name: Some(name.into()),
        }
    }

    /// Creates an unresolved location from free text.
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::Any,
            id: None,
            coord: None,
            name: Some(name.into()),
        }
    }

    /// Sets the coordinate.
    pub fn with_coord(mut self, coord: Point) -> Self {
        self.coord = Some(coord);
        self
    }

    /// Interprets a caller-supplied query term.
    ///
    /// All-digit terms are station ids, `"lat,lon"` terms are coordinates,
    /// anything else is free text for the upstream to resolve.
    pub fn from_query_term(term: &str) -> Self {
        let term = term.trim();
        if !term.is_empty() && term.bytes().all(|b| b.is_ascii_digit()) {
            return Self {
                kind: LocationKind::Station,
                id: Some(term.to_string()),
                coord: None,
                name: None,
            };
        }
        if let Some(point) = Point::parse(term) {
            return Self {
                kind: LocationKind::Any,
                id: None,
                coord: Some(point),
                name: None,
            };
        }
        Self::any(term)
    }

    /// The term to send upstream: the id, else the coordinate, else the name.
    pub fn query_term(&self) -> Option<String> {
        if let Some(id) = &self.id {
            return Some(id.clone());
        }
        if let Some(coord) = self.coord {
            return Some(coord.to_string());
        }
        self.name.clone().filter(|n| !n.trim().is_empty())
    }

    /// Whether two locations describe the same place.
    ///
    /// Ids decide when both sides have one, then coordinates, then names.
    pub fn same_place(&self, other: &Location) -> bool {
        if let (Some(a), Some(b)) = (&self.id, &other.id) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (self.coord, other.coord) {
            return a == b;
        }
        self.name.is_some() && self.name == other.name
    }

    /// Returns a name suitable for display, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("unknown location")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_from_parts_needs_both() {
        assert_eq!(
            Point::from_parts(Some(47.0), Some(8.0)),
            Some(Point::new(47.0, 8.0))
        );
        assert_eq!(Point::from_parts(Some(47.0), None), None);
        assert_eq!(Point::from_parts(None, Some(8.0)), None);
    }

    #[test]
    fn point_parse_rejects_out_of_range() {
        assert!(Point::parse("91.0,8.0").is_none());
        assert!(Point::parse("47.0,181.0").is_none());
        assert!(Point::parse("47.0").is_none());
        assert!(Point::parse("a,b").is_none());
    }

    #[test]
    fn query_term_prefers_id() {
        let loc = Location::station("8503000", "Zürich HB").with_coord(Point::new(47.378, 8.540));
        assert_eq!(loc.query_term().as_deref(), Some("8503000"));
    }

    #[test]
    fn query_term_falls_back_to_coord_then_name() {
        let addr = Location::address(Point::new(46.689354, 7.683444), "Spiez, Seestrasse 62");
        assert_eq!(addr.query_term().as_deref(), Some("46.689354,7.683444"));

        let free = Location::any("Bern");
        assert_eq!(free.query_term().as_deref(), Some("Bern"));

        let blank = Location::any("  ");
        assert_eq!(blank.query_term(), None);
    }

    #[test]
    fn from_query_term_classifies() {
        let station = Location::from_query_term("8507000");
        assert_eq!(station.kind, LocationKind::Station);
        assert_eq!(station.id.as_deref(), Some("8507000"));

        let coord = Location::from_query_term("47.1,8.7");
        assert_eq!(coord.coord, Some(Point::new(47.1, 8.7)));
        assert!(coord.id.is_none());

        let text = Location::from_query_term("Basel SBB");
        assert_eq!(text.kind, LocationKind::Any);
        assert_eq!(text.name.as_deref(), Some("Basel SBB"));
    }

    #[test]
    fn same_place_by_id() {
        let a = Location::station("8503000", "Zürich HB");
        let b = Location::station("8503000", "Zürich Hauptbahnhof");
        let c = Location::station("8507000", "Zürich HB");
        assert!(a.same_place(&b));
        assert!(!a.same_place(&c));
    }

    #[test]
    fn same_place_by_coord_when_id_missing() {
        let p = Point::new(46.948, 7.439);
        let a = Location::address(p, "Bundesplatz 3");
        let b = Location::station("8507000", "Bern").with_coord(p);
        assert!(a.same_place(&b));
    }

    #[test]
    fn same_place_by_name_last() {
        let a = Location::any("Bern");
        let b = Location::any("Bern");
        let c = Location::any("Basel");
        assert!(a.same_place(&b));
        assert!(!a.same_place(&c));

        let unnamed = Location {
            kind: LocationKind::Any,
            id: None,
            coord: None,
            name: None,
        };
        assert!(!unnamed.same_place(&unnamed.clone()));
    }

    #[test]
    fn display_falls_back_to_id() {
        let loc = Location::from_query_term("8503000");
        assert_eq!(loc.to_string(), "8503000");
    }
}
