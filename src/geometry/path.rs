use crate::foundation::core::{CubicBez, Point};
use crate::foundation::error::{FlowError, FlowResult};
use crate::geometry::source::PathSource;

/// Piecewise cubic-Bezier path in the common coordinate space.
#[derive(Clone, Debug, PartialEq)]
pub struct BezierPath {
    segments: Vec<CubicBez>,
    closed: bool,
    vertex_count: usize,
}

impl BezierPath {
    /// Build segments from a source, applying its local-to-common transform.
    ///
    /// A closed path with `n` vertices has `n` segments, an open one `n - 1`.
    pub fn from_source(source: &dyn PathSource) -> FlowResult<Self> {
        let vertices = source.vertices();
        let ins = source.in_tangents();
        let outs = source.out_tangents();
        let n = vertices.len();

        if n == 0 {
            return Err(FlowError::missing_geometry("path has no vertices"));
        }
        if n < 2 {
            return Err(FlowError::InsufficientGeometry { vertices: n });
        }
        if ins.len() != n || outs.len() != n {
            return Err(FlowError::validation(format!(
                "tangent count mismatch: {n} vertices, {} in tangents, {} out tangents",
                ins.len(),
                outs.len()
            )));
        }
        if vertices.iter().any(|v| !v.is_finite())
            || ins.iter().chain(outs).any(|t| !t.is_finite())
        {
            return Err(FlowError::validation("path contains non-finite coordinates"));
        }

        let closed = source.is_closed();
        let xf = source.local_to_common();
        let segment_count = if closed { n } else { n - 1 };

        let segments = (0..segment_count)
            .map(|i| {
                let j = (i + 1) % n;
                CubicBez::new(
                    xf * vertices[i],
                    xf * (vertices[i] + outs[i]),
                    xf * (vertices[j] + ins[j]),
                    xf * vertices[j],
                )
            })
            .collect();

        Ok(Self {
            segments,
            closed,
            vertex_count: n,
        })
    }

    /// Segments in path order.
    pub fn segments(&self) -> &[CubicBez] {
        &self.segments
    }

    /// Whether the path is closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of source vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// First point of the path.
    pub fn start(&self) -> Point {
        self.segments[0].p0
    }

    /// Last point of the path (equal to [`Self::start`] when closed).
    pub fn end(&self) -> Point {
        self.segments[self.segments.len() - 1].p3
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/path.rs"]
mod tests;
