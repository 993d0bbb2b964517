use service::{LocationRecord, PlaceId};

/// A search match as shown in the result list.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultItem {
    pub name: String,
    /// Longitude (degrees).
    pub x: f64,
    /// Latitude (degrees).
    pub y: f64,
    pub addr: String,
    pub id: PlaceId,
}

impl From<LocationRecord> for SearchResultItem {
    fn from(record: LocationRecord) -> Self {
        Self {
            name: record.name,
            x: record.x,
            y: record.y,
            addr: normalize_addr(record.addr),
            id: record.id,
        }
    }
}

/// The backend writes a missing address as the string `"null"`.
pub fn normalize_addr(raw: Option<String>) -> String {
    match raw {
        Some(s) if s == "null" => String::new(),
        Some(s) => s,
        None => String::new(),
    }
}
