//! JSON output contract.
//!
//! ```text
//! { distances, predecessors, hasNegativeCycle, negativeCycleInfo,
//!   negativeCycle, negativeCycleMessage,
//!   steps: [{ iteration, message, distances, predecessors, changed }],
//!   totalIterations, executionTime, source }
//! ```
//!
//! Maps are keyed by vertex label in declaration order. An unreached vertex
//! has distance `null`. `negativeCycle` is the closed loop as a list of
//! labels; it and `negativeCycleMessage` are `null` when there is no cycle.

use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::distance::Distance;
use crate::error::EngineError;
use crate::graph::{Vertex, VertexIndex};
use crate::relax::BellmanFordResult;
use crate::trace::Step;

struct DistanceMap<'a> {
    vertices: &'a [Vertex],
    distances: &'a [Distance],
}

impl Serialize for DistanceMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.vertices.len()))?;
        for (v, d) in self.vertices.iter().zip(self.distances) {
            map.serialize_entry(v, d)?;
        }
        map.end()
    }
}

struct PredecessorMap<'a> {
    vertices: &'a [Vertex],
    predecessors: &'a [Option<VertexIndex>],
}

impl Serialize for PredecessorMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.vertices.len()))?;
        for (v, p) in self.vertices.iter().zip(self.predecessors) {
            map.serialize_entry(v, &p.map(|i| self.vertices[i].as_str()))?;
        }
        map.end()
    }
}

struct StepView<'a> {
    vertices: &'a [Vertex],
    step: &'a Step,
}

impl Serialize for StepView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let changed: Vec<&str> = self
            .step
            .changed
            .iter()
            .map(|&i| self.vertices[i].as_str())
            .collect();

        let mut s = serializer.serialize_struct("Step", 5)?;
        s.serialize_field("iteration", &self.step.iteration)?;
        s.serialize_field("message", &self.step.message)?;
        s.serialize_field(
            "distances",
            &DistanceMap {
                vertices: self.vertices,
                distances: &self.step.distances,
            },
        )?;
        s.serialize_field(
            "predecessors",
            &PredecessorMap {
                vertices: self.vertices,
                predecessors: &self.step.predecessors,
            },
        )?;
        s.serialize_field("changed", &changed)?;
        s.end()
    }
}

struct StepList<'a> {
    vertices: &'a [Vertex],
    steps: &'a [Step],
}

impl Serialize for StepList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.steps.len()))?;
        for step in self.steps {
            seq.serialize_element(&StepView {
                vertices: self.vertices,
                step,
            })?;
        }
        seq.end()
    }
}

impl Serialize for BellmanFordResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let cycle = self.negative_cycle.as_ref().map(|info| &info.cycle);

        let mut s = serializer.serialize_struct("BellmanFordResult", 10)?;
        s.serialize_field(
            "distances",
            &DistanceMap {
                vertices: &self.vertices,
                distances: &self.distances,
            },
        )?;
        s.serialize_field(
            "predecessors",
            &PredecessorMap {
                vertices: &self.vertices,
                predecessors: &self.predecessors,
            },
        )?;
        s.serialize_field("hasNegativeCycle", &self.has_negative_cycle)?;
        s.serialize_field("negativeCycleInfo", &self.negative_cycle)?;
        s.serialize_field("negativeCycle", &cycle)?;
        s.serialize_field("negativeCycleMessage", &self.negative_cycle_message())?;
        s.serialize_field(
            "steps",
            &StepList {
                vertices: &self.vertices,
                steps: &self.steps,
            },
        )?;
        s.serialize_field("totalIterations", &self.total_iterations())?;
        s.serialize_field("executionTime", &self.execution_time_ms)?;
        s.serialize_field("source", self.source())?;
        s.end()
    }
}

impl BellmanFordResult {
    pub fn to_json(&self) -> Result<Value, EngineError> {
        Ok(serde_json::to_value(self)?)
    }

    /// JSON for a single step, in the same shape as the entries of `steps`.
    pub fn step_json(&self, step: &Step) -> Result<Value, EngineError> {
        Ok(serde_json::to_value(StepView {
            vertices: &self.vertices,
            step,
        })?)
    }
}
