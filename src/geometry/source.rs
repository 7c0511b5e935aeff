//! Path geometry sources.
//!
//! The batch only ever talks to [`PathSource`]. Two concrete sources ship with
//! the crate: [`ShapeLayer`] (a vertex/tangent path on a named layer of a JSON
//! [`ShapeDocument`]) and [`SvgPath`] (the first subpath of an SVG `d` string).

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Affine, BezPath, Point, Vec2};
use crate::foundation::error::{FlowError, FlowResult};

/// Stroke width assumed when the source carries none.
pub const DEFAULT_STROKE_WIDTH_PX: f64 = 8.0;

/// Read-only view of a piecewise cubic-Bezier path in its local space.
///
/// Tangents are offsets relative to their vertex, in the same local space as
/// the vertices. [`PathSource::local_to_common`] maps that space into the
/// common (composition) space all sampling happens in.
pub trait PathSource {
    /// Ordered vertex positions.
    fn vertices(&self) -> &[Point];
    /// Incoming tangent handle offsets, one per vertex.
    fn in_tangents(&self) -> &[Vec2];
    /// Outgoing tangent handle offsets, one per vertex.
    fn out_tangents(&self) -> &[Vec2];
    /// Whether the last vertex connects back to the first.
    fn is_closed(&self) -> bool;
    /// Transform from local path space to the common space.
    fn local_to_common(&self) -> Affine {
        Affine::IDENTITY
    }
    /// Stroke width drawn on the source path, if known.
    fn stroke_width(&self) -> Option<f64> {
        None
    }
}

/// Vertex/tangent path data, as stored on a shape or mask.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapePath {
    /// Ordered vertex positions.
    pub vertices: Vec<Point>,
    /// Incoming tangent offsets; empty means all zero.
    #[serde(default)]
    pub in_tangents: Vec<Vec2>,
    /// Outgoing tangent offsets; empty means all zero.
    #[serde(default)]
    pub out_tangents: Vec<Vec2>,
    /// Closed flag.
    #[serde(default)]
    pub closed: bool,
}

impl ShapePath {
    /// Polyline path with flat (zero) handles.
    pub fn polyline(vertices: Vec<Point>, closed: bool) -> Self {
        let n = vertices.len();
        Self {
            vertices,
            in_tangents: vec![Vec2::ZERO; n],
            out_tangents: vec![Vec2::ZERO; n],
            closed,
        }
    }

    /// Fill omitted tangent lists with zero handles and check list lengths.
    pub fn normalized(mut self) -> FlowResult<Self> {
        let n = self.vertices.len();
        if self.in_tangents.is_empty() {
            self.in_tangents = vec![Vec2::ZERO; n];
        }
        if self.out_tangents.is_empty() {
            self.out_tangents = vec![Vec2::ZERO; n];
        }
        if self.in_tangents.len() != n || self.out_tangents.len() != n {
            return Err(FlowError::validation(format!(
                "tangent count mismatch: {n} vertices, {} in tangents, {} out tangents",
                self.in_tangents.len(),
                self.out_tangents.len()
            )));
        }
        Ok(self)
    }
}

impl PathSource for ShapePath {
    fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    fn in_tangents(&self) -> &[Vec2] {
        &self.in_tangents
    }

    fn out_tangents(&self) -> &[Vec2] {
        &self.out_tangents
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// First subpath of an SVG path `d` string, converted to vertices and handles.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgPath {
    shape: ShapePath,
}

impl SvgPath {
    /// Parse an SVG `d` attribute.
    ///
    /// Only the first subpath is used. Quadratic segments are raised to cubic.
    /// A `Z` whose last vertex coincides with the first merges the two.
    pub fn parse(d: &str) -> FlowResult<Self> {
        let bez = BezPath::from_svg(d)
            .map_err(|e| FlowError::validation(format!("invalid svg path: {e}")))?;
        Ok(Self {
            shape: shape_from_bez(&bez)?,
        })
    }

    /// The converted vertex/tangent data.
    pub fn shape(&self) -> &ShapePath {
        &self.shape
    }
}

impl PathSource for SvgPath {
    fn vertices(&self) -> &[Point] {
        &self.shape.vertices
    }

    fn in_tangents(&self) -> &[Vec2] {
        &self.shape.in_tangents
    }

    fn out_tangents(&self) -> &[Vec2] {
        &self.shape.out_tangents
    }

    fn is_closed(&self) -> bool {
        self.shape.closed
    }
}

fn shape_from_bez(bez: &BezPath) -> FlowResult<ShapePath> {
    use kurbo::PathEl;

    let mut vertices: Vec<Point> = Vec::new();
    let mut in_tangents: Vec<Vec2> = Vec::new();
    let mut out_tangents: Vec<Vec2> = Vec::new();
    let mut closed = false;
    let mut subpaths = 0usize;

    for el in bez.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                subpaths += 1;
                if subpaths > 1 {
                    break;
                }
                vertices.push(p);
                in_tangents.push(Vec2::ZERO);
                out_tangents.push(Vec2::ZERO);
            }
            PathEl::LineTo(p) => {
                vertices.push(p);
                in_tangents.push(Vec2::ZERO);
                out_tangents.push(Vec2::ZERO);
            }
            PathEl::QuadTo(c, p) => {
                let Some(&prev) = vertices.last() else {
                    return Err(FlowError::validation("svg path segment before moveto"));
                };
                let c1 = prev + (c - prev) * (2.0 / 3.0);
                let c2 = p + (c - p) * (2.0 / 3.0);
                if let Some(out) = out_tangents.last_mut() {
                    *out = c1 - prev;
                }
                vertices.push(p);
                in_tangents.push(c2 - p);
                out_tangents.push(Vec2::ZERO);
            }
            PathEl::CurveTo(c1, c2, p) => {
                let Some(&prev) = vertices.last() else {
                    return Err(FlowError::validation("svg path segment before moveto"));
                };
                if let Some(out) = out_tangents.last_mut() {
                    *out = c1 - prev;
                }
                vertices.push(p);
                in_tangents.push(c2 - p);
                out_tangents.push(Vec2::ZERO);
            }
            PathEl::ClosePath => {
                closed = true;
                break;
            }
        }
    }

    if subpaths > 1 {
        tracing::warn!("svg path has several subpaths; only the first is used");
    }

    if closed && vertices.len() > 1 && vertices.first() == vertices.last() {
        // The explicit return segment is implied by the closed flag.
        let last_in = in_tangents.pop().unwrap_or(Vec2::ZERO);
        vertices.pop();
        out_tangents.pop();
        in_tangents[0] = last_in;
    }

    if vertices.is_empty() {
        return Err(FlowError::missing_geometry("svg path has no subpath"));
    }

    Ok(ShapePath {
        vertices,
        in_tangents,
        out_tangents,
        closed,
    })
}

/// Path geometry attached to a layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerPath {
    /// Vertex/tangent data.
    Bezier(ShapePath),
    /// SVG path data.
    Svg {
        /// SVG `d` attribute.
        d: String,
    },
}

/// A named layer of a [`ShapeDocument`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeLayer {
    /// Layer name, used for lookup and in generated expressions.
    pub name: String,
    /// Layer position in the common space.
    #[serde(default)]
    pub position: Vec2,
    /// Position of the shape group holding the path, relative to the layer.
    #[serde(default)]
    pub group_position: Vec2,
    /// Stroke width drawn on the path, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width_px: Option<f64>,
    /// Path geometry; `None` for layers without a path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<LayerPath>,
}

impl ShapeLayer {
    /// Resolve this layer's path into a ready [`LayerSource`].
    pub fn source(&self) -> FlowResult<LayerSource> {
        let shape = match &self.path {
            None => {
                return Err(FlowError::missing_geometry(format!(
                    "layer '{}' has no path",
                    self.name
                )));
            }
            Some(LayerPath::Bezier(shape)) => shape.clone().normalized()?,
            Some(LayerPath::Svg { d }) => SvgPath::parse(d)?.shape,
        };
        Ok(LayerSource {
            shape,
            transform: Affine::translate(self.position + self.group_position),
            stroke_width_px: self.stroke_width_px,
        })
    }
}

/// A layer path placed in the common space, ready for sampling.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSource {
    shape: ShapePath,
    transform: Affine,
    stroke_width_px: Option<f64>,
}

impl PathSource for LayerSource {
    fn vertices(&self) -> &[Point] {
        &self.shape.vertices
    }

    fn in_tangents(&self) -> &[Vec2] {
        &self.shape.in_tangents
    }

    fn out_tangents(&self) -> &[Vec2] {
        &self.shape.out_tangents
    }

    fn is_closed(&self) -> bool {
        self.shape.closed
    }

    fn local_to_common(&self) -> Affine {
        self.transform
    }

    fn stroke_width(&self) -> Option<f64> {
        self.stroke_width_px
    }
}

/// A minimal document: a list of named layers.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeDocument {
    /// Layers in document order.
    pub layers: Vec<ShapeLayer>,
}

impl ShapeDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(s: &str) -> FlowResult<Self> {
        serde_json::from_str(s).map_err(|e| FlowError::serde(format!("shape document: {e}")))
    }

    /// Load a document from a JSON file.
    pub fn from_path(path: &Path) -> FlowResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read shape document '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Select a layer by name, or the first layer when `name` is `None`.
    pub fn layer(&self, name: Option<&str>) -> FlowResult<&ShapeLayer> {
        match name {
            Some(name) => self
                .layers
                .iter()
                .find(|l| l.name == name)
                .ok_or_else(|| FlowError::missing_geometry(format!("no layer named '{name}'"))),
            None => self
                .layers
                .first()
                .ok_or_else(|| FlowError::missing_geometry("document has no layers")),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/source.rs"]
mod tests;
