//! Field-level decoding for CWA weather elements
//!
//! Every decoded value is nullable. A reading that is missing, unparseable,
//! or below the sentinel floor becomes `None` rather than zero.

use crate::ingest::RawField;

/// Raw values below this are station sentinels (e.g. `-99`, `-999`), not readings
pub const SENTINEL_FLOOR: f64 = -90.0;

/// The sixteen compass points, clockwise from north in 22.5 degree steps
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const COMPASS_STEP_DEGREES: f64 = 22.5;

/// Code the upstream uses for calm or unmeasurable wind (`"X,X"`)
const CALM_CODE: &str = "X";

#[derive(Debug, Clone, Copy, PartialEq)]
enum CompassLabel {
    Calm,
    Bearing(f64),
}

/// Decode a generic numeric element
pub fn parse_value(raw: Option<&RawField>) -> Option<f64> {
    match raw? {
        RawField::Number(value) => plausible(*value),
        RawField::Text(text) => parse_number(text),
        RawField::Other(_) => None,
    }
}

/// Decode a wind direction, accepting compass labels as well as plain degrees
///
/// Labels arrive bilingual (`"東,E"`); the code after the comma decides. A bare
/// code (`"E"`) is accepted too. Anything that is not a compass label goes
/// through [`parse_value`].
pub fn parse_wind_dir(raw: Option<&RawField>) -> Option<f64> {
    if let Some(RawField::Text(text)) = raw {
        match lookup_compass(text) {
            Some(CompassLabel::Calm) => return None,
            Some(CompassLabel::Bearing(degrees)) => return Some(degrees),
            None => {}
        }
    }
    parse_value(raw)
}

/// Strict decimal parse of a text value
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().and_then(plausible)
}

fn plausible(value: f64) -> Option<f64> {
    if value.is_finite() && value >= SENTINEL_FLOOR {
        Some(value)
    } else {
        None
    }
}

fn lookup_compass(label: &str) -> Option<CompassLabel> {
    let code = label.rsplit(',').next().unwrap_or(label).trim();

    if code.eq_ignore_ascii_case(CALM_CODE) {
        return Some(CompassLabel::Calm);
    }

    COMPASS_POINTS
        .iter()
        .position(|point| point.eq_ignore_ascii_case(code))
        .map(|index| CompassLabel::Bearing(index as f64 * COMPASS_STEP_DEGREES))
}
