//! Incident records: breakdowns, accidents, and roadworks.

use super::types::SegmentId;

/// A unique identifier for an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IncidentId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentKind {
    Breakdown,
    Accident,
    Construction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// An incident somewhere on the road network
///
/// An incident may close one road segment; closed segments are treated
/// as impassable by vehicle kinematics until the incident is resolved.
#[derive(Debug, Clone)]
pub struct Incident {
    pub id: IncidentId,
    pub kind: IncidentKind,
    pub x: f32,
    pub y: f32,
    pub description: String,
    pub severity: Severity,
    /// Tick at which the incident was raised
    pub tick: u64,
    pub blocks_segment: Option<SegmentId>,
}
