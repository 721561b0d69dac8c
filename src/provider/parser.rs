//! Response encodings used by beacon providers.
//!
//! Every parser is total: malformed, empty or unexpected payloads map to
//! [`TriBool::Unknown`], never to an error.

use serde_json::Value;

use crate::core::beacon::Beacon;
use crate::core::types::{ReferenceGenome, TriBool};

/// Path of object keys leading to a JSON field, outermost first
pub type JsonPath = &'static [&'static str];

/// Prefix stripped from Cafe Variome beacon ids to form their field name
pub const CAFE_BEACON_PREFIX: &str = "cafe-";

/// Suffix appended to form the Cafe Variome field name
pub const CAFE_FIELD_SUFFIX: &str = "_response";

/// Object Cafe Variome nests the per-beacon fields under
const CAFE_ENVELOPE: &str = "response";

/// How a provider encodes its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseParser {
    /// Body is `yes` or `no`, any case
    StringYesNo,
    /// `yes`/`no`, but only for reference genomes the beacon supports
    StringYesNoWithRefCheck,
    /// Body mentions `found` or `not found`
    StringFound,
    /// Boolean field; absent or null is unknown
    JsonFieldExists(JsonPath),
    /// Boolean field; absent or null counts as false
    JsonFieldExistsNullAsFalse(JsonPath),
    /// Numeric count field; positive is true, zero is false
    JsonFieldGreaterThanZero(JsonPath),
    /// Boolean field named after the beacon id, see [`cafe_field_name`]
    CafePrefixedJsonField,
}

impl ResponseParser {
    /// Interpret `body` as returned by `beacon` for a query against `reference`
    #[must_use]
    pub fn parse(&self, beacon: &Beacon, reference: Option<ReferenceGenome>, body: &str) -> TriBool {
        match self {
            Self::StringYesNo => parse_yes_no(body),
            Self::StringYesNoWithRefCheck => match reference {
                Some(r) if !beacon.supports(r) => TriBool::Unknown,
                _ => parse_yes_no(body),
            },
            Self::StringFound => parse_found(body),
            Self::JsonFieldExists(path) => parse_json_exists(body, path),
            Self::JsonFieldExistsNullAsFalse(path) => parse_json_exists_null_as_false(body, path),
            Self::JsonFieldGreaterThanZero(path) => parse_json_greater_than_zero(body, path),
            Self::CafePrefixedJsonField => parse_cafe(body, beacon.id.as_str()),
        }
    }

    /// Short name used in logs and the catalog listing
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StringYesNo => "string-yes-no",
            Self::StringYesNoWithRefCheck => "string-yes-no-ref",
            Self::StringFound => "string-found",
            Self::JsonFieldExists(_) => "json-exists",
            Self::JsonFieldExistsNullAsFalse(_) => "json-exists-null-as-false",
            Self::JsonFieldGreaterThanZero(_) => "json-greater-than-zero",
            Self::CafePrefixedJsonField => "json-cafe",
        }
    }
}

/// `yes` → true, `no` → false, anything else unknown
#[must_use]
pub fn parse_yes_no(body: &str) -> TriBool {
    let body = body.trim();
    if body.eq_ignore_ascii_case("yes") {
        TriBool::True
    } else if body.eq_ignore_ascii_case("no") {
        TriBool::False
    } else {
        TriBool::Unknown
    }
}

/// `not found` → false, otherwise `found` → true, else unknown
#[must_use]
pub fn parse_found(body: &str) -> TriBool {
    let lower = body.to_ascii_lowercase();
    if lower.contains("not found") {
        TriBool::False
    } else if lower.contains("found") {
        TriBool::True
    } else {
        TriBool::Unknown
    }
}

#[must_use]
pub fn parse_json_exists(body: &str, path: &[&str]) -> TriBool {
    parse_json(body)
        .and_then(|json| lookup(&json, path).and_then(as_bool))
        .into()
}

#[must_use]
pub fn parse_json_exists_null_as_false(body: &str, path: &[&str]) -> TriBool {
    let Some(json) = parse_json(body) else {
        return TriBool::Unknown;
    };
    match lookup(&json, path) {
        None | Some(Value::Null) => TriBool::False,
        Some(value) => as_bool(value).into(),
    }
}

#[must_use]
pub fn parse_json_greater_than_zero(body: &str, path: &[&str]) -> TriBool {
    parse_json(body)
        .and_then(|json| lookup(&json, path).and_then(as_number))
        .map(|n| n > 0.0)
        .into()
}

/// Field a Cafe Variome beacon reports under: `cafe-central` → `central_response`
#[must_use]
pub fn cafe_field_name(beacon_id: &str) -> String {
    let stem = beacon_id
        .strip_prefix(CAFE_BEACON_PREFIX)
        .unwrap_or(beacon_id);
    format!("{stem}{CAFE_FIELD_SUFFIX}")
}

/// Reads the beacon's field from the `response` envelope, or from the top
/// level when the envelope is missing
#[must_use]
pub fn parse_cafe(body: &str, beacon_id: &str) -> TriBool {
    let Some(json) = parse_json(body) else {
        return TriBool::Unknown;
    };
    let field = cafe_field_name(beacon_id);
    json.get(CAFE_ENVELOPE)
        .and_then(|envelope| envelope.get(&field))
        .or_else(|| json.get(&field))
        .and_then(as_bool)
        .into()
}

fn parse_json(body: &str) -> Option<Value> {
    serde_json::from_str(body.trim()).ok()
}

fn lookup<'a>(json: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(json, |value, key| value.get(key))
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
