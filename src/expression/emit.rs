//! Host expression text for a scattered object.
//!
//! The host evaluates one expression per animated property every frame. The
//! generated text re-reads the resampled path from the annotation on the path
//! layer and reproduces [`crate::MotionField::sample`] with the object's
//! seeded parameters baked in as literals, so nothing depends on host-side
//! random state or on layer order.

use crate::annotation::marker::ANNOTATION_TAG;
use crate::motion::field::{MIN_TANGENT_LENGTH, MotionField};
use crate::motion::placement::ScatteredObject;

/// Position and rotation expressions for one object.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct HostExpressions {
    /// Evaluates to `[x, y]`; `[0, 0]` on any failure.
    pub position: String,
    /// Evaluates to degrees; `0` on any failure.
    pub rotation: String,
}

/// Build both expressions for `object`, reading the annotation on `path_layer`.
pub fn emit_expressions(
    path_layer: &str,
    field: &MotionField,
    object: &ScatteredObject,
) -> HostExpressions {
    let preamble = preamble(path_layer, field, object);

    let position = format!(
        "try {{\n{preamble}\
         \x20 var lateral = {offset} + Math.sin(time * {freq} * 2 * Math.PI + {wphase}) * {amp};\n\
         \x20 var x = pts[i0][0] + (pts[i1][0] - pts[i0][0]) * frac - (ty / norm) * lateral;\n\
         \x20 var y = pts[i0][1] + (pts[i1][1] - pts[i0][1]) * frac + (tx / norm) * lateral;\n\
         \x20 if (isNaN(x) || isNaN(y)) throw \"NaN result\";\n\
         \x20 [x, y];\n\
         }} catch (err) {{ [0, 0]; }}",
        offset = object.static_lateral_offset,
        freq = object.wiggle_frequency_hz,
        wphase = object.wiggle_phase,
        amp = field.band().wiggle_amplitude,
    );

    let rotation = format!(
        "try {{\n{preamble}\
         \x20 var deg = radiansToDegrees(Math.atan2(ty, tx));\n\
         \x20 if (isNaN(deg)) throw \"NaN result\";\n\
         \x20 deg;\n\
         }} catch (err) {{ 0; }}"
    );

    HostExpressions { position, rotation }
}

fn preamble(path_layer: &str, field: &MotionField, object: &ScatteredObject) -> String {
    format!(
        "\x20 var comment = thisComp.layer(\"{layer}\").marker.key(1).comment;\n\
         \x20 var m = comment.match(/{tag}([\\d\\.,-]+)/);\n\
         \x20 if (!m) throw \"no path points\";\n\
         \x20 var arr = m[1].split(\",\");\n\
         \x20 var pts = [];\n\
         \x20 for (var j = 0; j + 1 < arr.length; j += 2) {{ pts.push([parseFloat(arr[j]), parseFloat(arr[j + 1])]); }}\n\
         \x20 if (pts.length < 2) throw \"not enough points\";\n\
         \x20 var dur = {dur};\n\
         \x20 var ph = ((time / dur + {offset}) % 1 + 1) % 1;\n\
         \x20 var p = ph * (pts.length - 1);\n\
         \x20 var i0 = Math.min(Math.floor(p), pts.length - 1);\n\
         \x20 var i1 = Math.min(Math.ceil(p), pts.length - 1);\n\
         \x20 var frac = p - i0;\n\
         \x20 var k = Math.min(i0, pts.length - 2);\n\
         \x20 var tx = pts[k + 1][0] - pts[k][0];\n\
         \x20 var ty = pts[k + 1][1] - pts[k][1];\n\
         \x20 var norm = Math.sqrt(tx * tx + ty * ty);\n\
         \x20 if (norm < {min_tangent}) throw \"zero tangent\";\n",
        layer = escape_js_string(path_layer),
        tag = ANNOTATION_TAG,
        dur = field.loop_duration_secs(),
        offset = object.phase_offset,
        min_tangent = MIN_TANGENT_LENGTH,
    )
}

fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/expression/emit.rs"]
mod tests;
