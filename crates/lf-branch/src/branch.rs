//! Series branches built from segments.

use crate::correlation::PressureDropCorrelation;
use crate::error::{CorrelationError, CorrelationResult};
use crate::segment::{Segment, SegmentKind};
use lf_core::units::{MassRate, Pressure, Temperature, pa};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three parallel branches of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    Heater,
    Ctah,
    Dhx,
}

impl BranchKind {
    pub const ALL: [BranchKind; 3] = [BranchKind::Heater, BranchKind::Ctah, BranchKind::Dhx];

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKind::Heater => "heater",
            BranchKind::Ctah => "ctah",
            BranchKind::Dhx => "dhx",
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segments in series between the shared top and bottom nodes.
///
/// Pressure change is the sum over segments, plus the pump boost when the
/// branch carries the pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBranch {
    pub name: String,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub pump_driven: bool,
}

impl SeriesBranch {
    pub fn new(name: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            name: name.into(),
            segments,
            pump_driven: false,
        }
    }

    pub fn with_pump(mut self) -> Self {
        self.pump_driven = true;
        self
    }

    /// Net vertical rise along positive flow (m).
    pub fn rise_m(&self) -> f64 {
        self.segments.iter().map(Segment::rise_m).sum()
    }

    /// True when any segment is a check valve.
    pub fn has_check_valve(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s.kind, SegmentKind::CheckValve { .. }))
    }

    pub fn validate(&self) -> CorrelationResult<()> {
        if self.segments.is_empty() {
            return Err(CorrelationError::InvalidArg {
                what: "branch needs at least one segment",
            });
        }
        self.segments.iter().try_for_each(Segment::validate)
    }
}

impl PressureDropCorrelation for SeriesBranch {
    fn name(&self) -> &str {
        &self.name
    }

    fn pressure_change(
        &self,
        mdot: MassRate,
        temperature: Temperature,
        pump: Pressure,
    ) -> CorrelationResult<Pressure> {
        let mut total = pa(0.0);
        for segment in &self.segments {
            total += segment.pressure_change(mdot, temperature)?;
        }
        if self.pump_driven {
            total += pump;
        }
        Ok(total)
    }

    fn hydrostatic_pressure_change(&self, temperature: Temperature) -> CorrelationResult<Pressure> {
        let mut total = pa(0.0);
        for segment in &self.segments {
            total += segment.hydrostatic_pressure_change(temperature)?;
        }
        Ok(total)
    }

    /// One entry per fitting segment; pipes and check valves have no
    /// empirical loss curve.
    fn correlated_losses(
        &self,
        mdot: MassRate,
        temperature: Temperature,
    ) -> CorrelationResult<Vec<Pressure>> {
        self.segments
            .iter()
            .filter(|s| matches!(s.kind, SegmentKind::Fitting { .. }))
            .map(|s| {
                Ok(s.pressure_change(mdot, temperature)?
                    - s.hydrostatic_pressure_change(temperature)?)
            })
            .collect()
    }
}
