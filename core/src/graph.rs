use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::distance::Weight;
use crate::error::ValidationError;

/// Opaque vertex label supplied by the caller.
pub type Vertex = String;

/// Position of a vertex in declaration order. Internal maps are indexed by it.
pub type VertexIndex = usize;

/// One edge as submitted: `{source, destination, weight}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    pub source: String,
    pub destination: String,
    pub weight: Weight,
}

impl EdgeInput {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, weight: Weight) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            weight,
        }
    }
}

/// Unvalidated request body: `{vertices, edges, source}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
    pub vertices: Vec<String>,
    pub edges: Vec<EdgeInput>,
    pub source: String,
}

impl GraphInput {
    pub fn new<V, E>(vertices: V, edges: E, source: impl Into<String>) -> Self
    where
        V: IntoIterator,
        V::Item: Into<String>,
        E: IntoIterator<Item = EdgeInput>,
    {
        Self {
            vertices: vertices.into_iter().map(Into::into).collect(),
            edges: edges.into_iter().collect(),
            source: source.into(),
        }
    }

    /// Parse a loosely-typed JSON request.
    ///
    /// Shape problems map onto validation codes rather than a generic
    /// deserialization failure: absent or non-array `vertices`/`edges` and an
    /// absent `source` are `missing_fields`; a source that is present but not
    /// a string is `source_not_in_vertices`. Weights may be JSON numbers or
    /// numeric strings.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or(ValidationError::MissingFields)?;

        let raw_vertices = obj
            .get("vertices")
            .and_then(Value::as_array)
            .ok_or(ValidationError::MissingFields)?;
        let raw_edges = obj
            .get("edges")
            .and_then(Value::as_array)
            .ok_or(ValidationError::MissingFields)?;
        let source = match obj.get("source") {
            None | Some(Value::Null) => return Err(ValidationError::MissingFields),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(ValidationError::SourceNotInVertices),
        };

        let vertices = raw_vertices
            .iter()
            .enumerate()
            .map(|(index, v)| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or(ValidationError::MalformedVertex { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let edges = raw_edges
            .iter()
            .enumerate()
            .map(|(index, e)| parse_edge(index, e))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            vertices,
            edges,
            source,
        })
    }
}

fn parse_edge(index: usize, value: &Value) -> Result<EdgeInput, ValidationError> {
    let malformed = |reason: &str| ValidationError::MalformedEdge {
        index,
        reason: reason.to_string(),
    };

    let obj = value.as_object().ok_or_else(|| malformed("expected an object"))?;
    let source = obj
        .get("source")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("source must be a string"))?;
    let destination = obj
        .get("destination")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("destination must be a string"))?;
    let weight = match obj.get("weight") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| malformed("weight must be a number"))?;

    Ok(EdgeInput::new(source, destination, weight))
}

/// What to do with an edge whose endpoint is not a declared vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownVertexPolicy {
    /// Keep the edge; it can never relax.
    #[default]
    Ignore,
    /// Fail validation with `unknown_vertex`.
    Reject,
}

/// Knobs for graph validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    pub unknown_vertices: UnknownVertexPolicy,
    pub max_vertices: Option<usize>,
    pub max_edges: Option<usize>,
}

/// A validated directed edge.
///
/// Labels are kept for reporting. `endpoints` is None when either label is
/// not a declared vertex, which makes the edge inert.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: Vertex,
    pub to: Vertex,
    pub weight: Weight,
    endpoints: Option<(VertexIndex, VertexIndex)>,
}

impl Edge {
    pub fn endpoints(&self) -> Option<(VertexIndex, VertexIndex)> {
        self.endpoints
    }
}

/// Immutable graph model: declared vertices, ordered edges, source vertex.
///
/// Duplicate vertex labels collapse onto their first occurrence. Edge order
/// is preserved exactly as declared; it fixes relaxation order within a round.
#[derive(Debug, Clone)]
pub struct Graph {
    vertices: Vec<Vertex>,
    index: HashMap<Vertex, VertexIndex>,
    edges: Vec<Edge>,
    source: VertexIndex,
}

impl Graph {
    /// Validate raw input into a graph model.
    ///
    /// Checks run in a fixed order: source membership first, then size
    /// limits, then per-edge weight and endpoint checks in edge order.
    pub fn validate(
        input: GraphInput,
        options: &ValidationOptions,
    ) -> Result<Self, ValidationError> {
        let GraphInput {
            vertices: raw_vertices,
            edges: raw_edges,
            source,
        } = input;

        if source.is_empty() || !raw_vertices.iter().any(|v| *v == source) {
            return Err(ValidationError::SourceNotInVertices);
        }

        let mut vertices = Vec::with_capacity(raw_vertices.len());
        let mut index = HashMap::with_capacity(raw_vertices.len());
        for label in raw_vertices {
            if !index.contains_key(&label) {
                index.insert(label.clone(), vertices.len());
                vertices.push(label);
            }
        }

        check_limit("vertices", vertices.len(), options.max_vertices)?;
        check_limit("edges", raw_edges.len(), options.max_edges)?;

        let mut edges = Vec::with_capacity(raw_edges.len());
        for (i, e) in raw_edges.into_iter().enumerate() {
            if !e.weight.is_finite() {
                return Err(ValidationError::InvalidWeight {
                    index: i,
                    weight: e.weight,
                });
            }

            let from = index.get(&e.source).copied();
            let to = index.get(&e.destination).copied();

            if options.unknown_vertices == UnknownVertexPolicy::Reject {
                let missing = if from.is_none() {
                    Some(&e.source)
                } else if to.is_none() {
                    Some(&e.destination)
                } else {
                    None
                };
                if let Some(vertex) = missing {
                    return Err(ValidationError::UnknownVertex {
                        index: i,
                        vertex: vertex.clone(),
                    });
                }
            }

            edges.push(Edge {
                endpoints: from.zip(to),
                from: e.source,
                to: e.destination,
                weight: e.weight,
            });
        }

        let source = index[&source];
        Ok(Self {
            vertices,
            index,
            edges,
            source,
        })
    }

    /// Convenience constructor with default options, mostly for tests and
    /// generated graphs.
    pub fn from_edges<V, E, S>(vertices: V, edges: E, source: &str) -> Result<Self, ValidationError>
    where
        V: IntoIterator,
        V::Item: Into<String>,
        E: IntoIterator<Item = (S, S, Weight)>,
        S: Into<String>,
    {
        let input = GraphInput::new(
            vertices,
            edges
                .into_iter()
                .map(|(from, to, w)| EdgeInput::new(from, to, w)),
            source,
        );
        Self::validate(input, &ValidationOptions::default())
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex(&self, idx: VertexIndex) -> &str {
        &self.vertices[idx]
    }

    pub fn index_of(&self, label: &str) -> Option<VertexIndex> {
        self.index.get(label).copied()
    }

    pub fn source(&self) -> &str {
        &self.vertices[self.source]
    }

    pub fn source_index(&self) -> VertexIndex {
        self.source
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges that can participate in relaxation (both endpoints declared).
    pub fn live_edges(&self) -> impl Iterator<Item = (VertexIndex, VertexIndex, Weight)> + '_ {
        self.edges
            .iter()
            .filter_map(|e| e.endpoints.map(|(u, v)| (u, v, e.weight)))
    }
}

fn check_limit(
    what: &'static str,
    count: usize,
    limit: Option<usize>,
) -> Result<(), ValidationError> {
    match limit {
        Some(limit) if count > limit => Err(ValidationError::GraphTooLarge { what, count, limit }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_basic() {
        let g = Graph::from_edges(["A", "B"], [("A", "B", 1.0)], "A").unwrap();
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.source(), "A");
        assert_eq!(g.edges()[0].endpoints(), Some((0, 1)));
    }

    #[test]
    fn test_source_not_in_vertices() {
        let err = Graph::from_edges(["A", "B"], Vec::<(&str, &str, f64)>::new(), "Z").unwrap_err();
        assert_eq!(err, ValidationError::SourceNotInVertices);
        assert_eq!(err.code(), "source_not_in_vertices");
    }

    #[test]
    fn test_empty_source_rejected() {
        let err = Graph::from_edges(["", "B"], Vec::<(&str, &str, f64)>::new(), "").unwrap_err();
        assert_eq!(err.code(), "source_not_in_vertices");
    }

    #[test]
    fn test_duplicate_vertices_collapse() {
        let g = Graph::from_edges(["A", "B", "A"], [("A", "B", 1.0)], "A").unwrap();
        assert_eq!(g.vertices(), &["A".to_string(), "B".to_string()]);
        assert_eq!(g.index_of("A"), Some(0));
    }

    #[test]
    fn test_unknown_vertex_inert_by_default() {
        let g = Graph::from_edges(["A", "B"], [("A", "Q", 1.0), ("A", "B", 2.0)], "A").unwrap();
        assert_eq!(g.edges()[0].endpoints(), None);
        assert_eq!(g.live_edges().count(), 1);
    }

    #[test]
    fn test_unknown_vertex_rejected_when_configured() {
        let input = GraphInput::new(["A", "B"], [EdgeInput::new("Q", "B", 1.0)], "A");
        let opts = ValidationOptions {
            unknown_vertices: UnknownVertexPolicy::Reject,
            ..Default::default()
        };
        let err = Graph::validate(input, &opts).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownVertex {
                index: 0,
                vertex: "Q".to_string()
            }
        );
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let err = Graph::from_edges(["A", "B"], [("A", "B", f64::NAN)], "A").unwrap_err();
        assert_eq!(err.code(), "invalid_weight");
    }

    #[test]
    fn test_size_limits() {
        let input = GraphInput::new(["A", "B", "C"], [], "A");
        let opts = ValidationOptions {
            max_vertices: Some(2),
            ..Default::default()
        };
        let err = Graph::validate(input, &opts).unwrap_err();
        assert_eq!(err.code(), "graph_too_large");
    }

    #[test]
    fn test_from_json_missing_fields() {
        for body in [
            json!({"edges": [], "source": "A"}),
            json!({"vertices": ["A"], "source": "A"}),
            json!({"vertices": "A", "edges": [], "source": "A"}),
            json!({"vertices": ["A"], "edges": {}, "source": "A"}),
            json!({"vertices": ["A"], "edges": []}),
            json!([1, 2, 3]),
        ] {
            assert_eq!(
                GraphInput::from_json(&body),
                Err(ValidationError::MissingFields),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn test_from_json_non_string_source() {
        let body = json!({"vertices": ["A"], "edges": [], "source": 7});
        assert_eq!(
            GraphInput::from_json(&body),
            Err(ValidationError::SourceNotInVertices)
        );
    }

    #[test]
    fn test_from_json_accepts_numeric_string_weight() {
        let body = json!({
            "vertices": ["A", "B"],
            "edges": [{"source": "A", "destination": "B", "weight": "-3"}],
            "source": "A"
        });
        let input = GraphInput::from_json(&body).unwrap();
        assert_eq!(input.edges[0].weight, -3.0);
    }

    #[test]
    fn test_from_json_malformed_edge() {
        let body = json!({
            "vertices": ["A", "B"],
            "edges": [
                {"source": "A", "destination": "B", "weight": 1},
                {"source": "A", "weight": 1}
            ],
            "source": "A"
        });
        match GraphInput::from_json(&body) {
            Err(ValidationError::MalformedEdge { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected malformed_edge, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_malformed_vertex() {
        let body = json!({"vertices": ["A", 2], "edges": [], "source": "A"});
        assert_eq!(
            GraphInput::from_json(&body),
            Err(ValidationError::MalformedVertex { index: 1 })
        );
    }

    #[test]
    fn test_edge_order_preserved() {
        let g = Graph::from_edges(
            ["A", "B", "C"],
            [("B", "C", 1.0), ("A", "B", 2.0), ("A", "C", 9.0)],
            "A",
        )
        .unwrap();
        let order: Vec<_> = g.edges().iter().map(|e| (e.from.as_str(), e.to.as_str())).collect();
        assert_eq!(order, vec![("B", "C"), ("A", "B"), ("A", "C")]);
    }
}
