//! `pathPoints:` annotation text.
//!
//! The resampled path is persisted as a single comment string on the source
//! path object: a fixed tag followed by `x0,y0,x1,y1,...`. Numbers use the
//! shortest decimal form that parses back to the same `f64` and never use an
//! exponent, so the payload is always a run of `[0-9.,-]`.

use std::fmt::Write as _;

use crate::foundation::core::Point;
use crate::foundation::error::{FlowError, FlowResult};
use crate::sampling::resample::ResampledPath;

/// Tag preceding the numeric payload.
pub const ANNOTATION_TAG: &str = "pathPoints:";

/// Serialize `path` as `pathPoints:<csv>`.
pub fn encode_annotation(path: &ResampledPath) -> String {
    let mut out = String::with_capacity(ANNOTATION_TAG.len() + path.len() * 24);
    out.push_str(ANNOTATION_TAG);
    for (i, v) in path.to_flat().into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{v}");
    }
    out
}

/// Extract the numeric payload following the tag, if any.
///
/// The tag may appear anywhere in the text; the payload ends at the first
/// character outside `[0-9.,-]`.
pub fn annotation_payload(text: &str) -> Option<&str> {
    let start = text.find(ANNOTATION_TAG)? + ANNOTATION_TAG.len();
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ',' || c == '-'))
        .unwrap_or(rest.len());
    let payload = &rest[..end];
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

/// Parse the point list out of annotation text.
pub fn parse_annotation_points(text: &str) -> FlowResult<Vec<Point>> {
    let payload = annotation_payload(text)
        .ok_or_else(|| FlowError::serde(format!("no '{ANNOTATION_TAG}' payload in annotation")))?;

    let values = payload
        .split(',')
        .map(|s| {
            s.parse::<f64>()
                .map_err(|e| FlowError::serde(format!("bad annotation number '{s}': {e}")))
        })
        .collect::<FlowResult<Vec<f64>>>()?;

    if values.len() % 2 != 0 {
        return Err(FlowError::serde(format!(
            "annotation has an odd number of coordinates ({})",
            values.len()
        )));
    }

    Ok(values
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect())
}

/// Parse annotation text back into a [`ResampledPath`].
pub fn decode_annotation(text: &str) -> FlowResult<ResampledPath> {
    ResampledPath::from_points(parse_annotation_points(text)?)
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/marker.rs"]
mod tests;
