//! Source entities handed to the engine by the drawing and hole subsystems.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::geometry::Point3;

/// Where a raw point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    HoleCollar,
    BreaklineVertex,
    RawPoint,
}

/// A single tagged 3D point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub position: Point3,
    pub tag: SourceTag,
    /// Opaque identifier of the originating entity, kept for diagnostics.
    #[serde(default)]
    pub source_ref: String,
}

impl RawPoint {
    pub fn new(position: Point3, tag: SourceTag, source_ref: impl Into<String>) -> Self {
        Self {
            position,
            tag,
            source_ref: source_ref.into(),
        }
    }
}

/// Classification for breaklines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BreaklineKind {
    /// Hard breaklines enforce triangle edges exactly.
    #[default]
    Hard,
    /// Soft breaklines only contribute their vertices.
    Soft,
}

/// Whether a breakline wraps from its last vertex back to the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreaklineShape {
    Open,
    Closed,
}

/// Ordered vertex sequence whose segments should become mesh edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakline {
    #[serde(default)]
    pub source_ref: String,
    pub shape: BreaklineShape,
    #[serde(default)]
    pub kind: BreaklineKind,
    pub vertices: Vec<Point3>,
}

impl Breakline {
    /// Creates a hard open polyline.
    pub fn open(vertices: Vec<Point3>) -> Self {
        Self {
            source_ref: String::new(),
            shape: BreaklineShape::Open,
            kind: BreaklineKind::Hard,
            vertices,
        }
    }

    /// Creates a hard closed polygon. A repeated closing vertex is allowed.
    pub fn closed(vertices: Vec<Point3>) -> Self {
        Self {
            shape: BreaklineShape::Closed,
            ..Self::open(vertices)
        }
    }

    pub fn with_kind(mut self, kind: BreaklineKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = source_ref.into();
        self
    }
}

/// Entities the collaborating subsystems can contribute to a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceEntity {
    HoleCollar {
        id: String,
        collar: Point3,
    },
    SurveyPoint {
        id: String,
        point: Point3,
    },
    Polyline {
        id: String,
        vertices: Vec<Point3>,
        #[serde(default)]
        kind: BreaklineKind,
    },
    Polygon {
        id: String,
        vertices: Vec<Point3>,
        #[serde(default)]
        kind: BreaklineKind,
    },
}

/// Everything the engine triangulates: loose points plus breaklines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceInput {
    #[serde(default)]
    pub points: Vec<RawPoint>,
    #[serde(default)]
    pub breaklines: Vec<Breakline>,
}

/// A breakline resolved to its slice of the flattened raw point list.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBreakline {
    /// Position of the breakline in [`SurfaceInput::breaklines`].
    pub index: usize,
    pub shape: BreaklineShape,
    pub kind: BreaklineKind,
    pub raw: Range<usize>,
}

impl SurfaceInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an input from untagged survey points.
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Self {
        Self {
            points: points
                .into_iter()
                .map(|p| RawPoint::new(p, SourceTag::RawPoint, ""))
                .collect(),
            breaklines: Vec::new(),
        }
    }

    /// Builds an input from source entities, preserving their order.
    pub fn from_entities(entities: impl IntoIterator<Item = SourceEntity>) -> Self {
        let mut input = Self::new();
        for entity in entities {
            input.add_entity(entity);
        }
        input
    }

    pub fn add_entity(&mut self, entity: SourceEntity) {
        match entity {
            SourceEntity::HoleCollar { id, collar } => {
                self.points
                    .push(RawPoint::new(collar, SourceTag::HoleCollar, id));
            }
            SourceEntity::SurveyPoint { id, point } => {
                self.points.push(RawPoint::new(point, SourceTag::RawPoint, id));
            }
            SourceEntity::Polyline { id, vertices, kind } => {
                self.breaklines.push(
                    Breakline::open(vertices)
                        .with_kind(kind)
                        .with_source_ref(id),
                );
            }
            SourceEntity::Polygon { id, vertices, kind } => {
                self.breaklines.push(
                    Breakline::closed(vertices)
                        .with_kind(kind)
                        .with_source_ref(id),
                );
            }
        }
    }

    pub fn with_breakline(mut self, breakline: Breakline) -> Self {
        self.breaklines.push(breakline);
        self
    }

    /// Number of raw points including breakline vertices.
    pub fn raw_len(&self) -> usize {
        self.points.len()
            + self
                .breaklines
                .iter()
                .map(|b| b.vertices.len())
                .sum::<usize>()
    }

    /// Flattens loose points followed by every breakline vertex into one raw
    /// list, returning where each breakline landed in it.
    pub fn flatten(&self) -> (Vec<RawPoint>, Vec<RawBreakline>) {
        let mut raw = Vec::with_capacity(self.raw_len());
        raw.extend(self.points.iter().cloned());
        let mut lines = Vec::with_capacity(self.breaklines.len());
        for (index, line) in self.breaklines.iter().enumerate() {
            let start = raw.len();
            raw.extend(line.vertices.iter().map(|&p| {
                RawPoint::new(p, SourceTag::BreaklineVertex, line.source_ref.clone())
            }));
            lines.push(RawBreakline {
                index,
                shape: line.shape,
                kind: line.kind,
                raw: start..raw.len(),
            });
        }
        (raw, lines)
    }
}
