//! Wire types for the place search backend.
//!
//! - `GET {base}/map/location?name=&page=&size=` returns `{ "list": [...] }`
//! - `GET {base}/map/baike?name=` returns `{ "wiki"?, "baidu"? }` or a falsy body
//!
//! Both parsers are shared by the native and the browser client.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ServiceError;

pub const LOCATION_PATH: &str = "/map/location";
pub const DETAIL_PATH: &str = "/map/baike";

/// Joins the configured base URI and an endpoint path.
pub fn endpoint(base_uri: &str, path: &str) -> String {
    format!("{}{}", base_uri.trim_end_matches('/'), path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuery {
    pub name: String,
    pub page: u32,
    pub size: u32,
}

impl LocationQuery {
    pub fn first_page(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            page: 1,
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailQuery {
    pub name: String,
}

/// Backend identifier; numeric or textual depending on the data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceId {
    Number(i64),
    Text(String),
}

impl Default for PlaceId {
    fn default() -> Self {
        PlaceId::Text(String::new())
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceId::Number(n) => write!(f, "{n}"),
            PlaceId::Text(s) => f.write_str(s),
        }
    }
}

/// One match as the backend sends it. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    /// Longitude (degrees).
    #[serde(deserialize_with = "lenient_f64")]
    pub x: f64,
    /// Latitude (degrees).
    #[serde(deserialize_with = "lenient_f64")]
    pub y: f64,
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub id: PlaceId,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationPage {
    #[serde(default, deserialize_with = "valid_records")]
    pub list: Vec<LocationRecord>,
}

/// Encyclopedia snippets for a place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(default)]
    pub wiki: Option<String>,
    #[serde(default)]
    pub baidu: Option<String>,
}

impl DetailRecord {
    /// `wiki` when non-empty, else `baidu` when non-empty.
    pub fn content(&self) -> Option<&str> {
        [self.wiki.as_deref(), self.baidu.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
    }
}

pub fn parse_location_body(body: &str) -> Result<LocationPage, ServiceError> {
    let value = parse_value(body)?;
    if is_falsy(&value) {
        return Ok(LocationPage::default());
    }
    serde_json::from_value(value).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Falsy bodies (`null`, `false`, `0`, `""`, nothing) mean "no detail".
pub fn parse_detail_body(body: &str) -> Result<Option<DetailRecord>, ServiceError> {
    let value = parse_value(body)?;
    if is_falsy(&value) {
        return Ok(None);
    }
    if !value.is_object() {
        return Err(ServiceError::Decode(format!("expected detail object, got {value}")));
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

fn parse_value(body: &str) -> Result<Value, ServiceError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed).map_err(|e| ServiceError::Decode(e.to_string()))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrText {
        Num(f64),
        Text(String),
    }

    match NumOrText::deserialize(d)? {
        NumOrText::Num(v) => Ok(v),
        NumOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A null list is empty; items that do not decode are dropped so one bad
/// record does not hide the rest of the page.
fn valid_records<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<LocationRecord>, D::Error> {
    let raw = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<LocationRecord>(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(%err, "dropping malformed location record");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(endpoint("http://h:8080/", LOCATION_PATH), "http://h:8080/map/location");
        assert_eq!(endpoint("http://h", DETAIL_PATH), "http://h/map/baike");
    }

    #[test]
    fn location_page_decodes_mixed_fields() {
        let page = parse_location_body(
            r#"{"list":[
                {"name":"Taipei 101","x":121.5645,"y":"25.0339","addr":"null","id":7,"type":"poi"},
                {"name":"Jiufen","x":"121.8443","y":25.1097,"id":"jf-1"}
            ],"total":2}"#,
        )
        .unwrap();
        assert_eq!(page.list.len(), 2);
        assert_eq!(page.list[0].y, 25.0339);
        assert_eq!(page.list[0].addr.as_deref(), Some("null"));
        assert_eq!(page.list[0].id, PlaceId::Number(7));
        assert_eq!(page.list[1].x, 121.8443);
        assert_eq!(page.list[1].addr, None);
        assert_eq!(page.list[1].id.to_string(), "jf-1");
    }

    #[test]
    fn missing_or_null_list_is_empty() {
        assert!(parse_location_body("{}").unwrap().list.is_empty());
        assert!(parse_location_body(r#"{"list":null}"#).unwrap().list.is_empty());
        assert!(parse_location_body("null").unwrap().list.is_empty());
    }

    #[test]
    fn malformed_records_are_dropped_from_page() {
        let page = parse_location_body(
            r#"{"list":[
                {"name":"Taipei 101","x":121.5645,"y":25.0339,"id":1},
                {"name":null,"x":121.0,"y":25.0},
                {"name":"Nowhere","x":"east","y":25.0},
                {"name":"Jiufen","x":121.8443,"y":25.1097,"id":2}
            ]}"#,
        )
        .unwrap();
        let names: Vec<_> = page.list.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Taipei 101", "Jiufen"]);
    }

    #[test]
    fn non_array_list_is_decode_error() {
        let err = parse_location_body(r#"{"list":"oops"}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[test]
    fn falsy_detail_bodies_mean_no_detail() {
        for body in ["", "null", "false", "0", "\"\""] {
            assert_eq!(parse_detail_body(body).unwrap(), None, "body {body:?}");
        }
    }

    #[test]
    fn detail_prefers_wiki() {
        let both = parse_detail_body(r#"{"wiki":"<p>w</p>","baidu":"<p>b</p>"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(both.content(), Some("<p>w</p>"));

        let fallback = parse_detail_body(r#"{"wiki":"","baidu":"<p>b</p>"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(fallback.content(), Some("<p>b</p>"));

        let empty = parse_detail_body(r#"{"wiki":null}"#).unwrap().unwrap();
        assert_eq!(empty.content(), None);
    }

    #[test]
    fn non_object_detail_is_decode_error() {
        assert!(matches!(
            parse_detail_body("[1]"),
            Err(ServiceError::Decode(_))
        ));
    }

    #[test]
    fn query_serializes_documented_fields() {
        let q = LocationQuery::first_page("taipei", 10);
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v, serde_json::json!({"name": "taipei", "page": 1, "size": 10}));
    }
}
