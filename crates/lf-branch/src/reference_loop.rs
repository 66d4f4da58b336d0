//! Reference geometry for the three-branch test loop.
//!
//! Every branch drops 3.0 m between the shared top and bottom nodes, so with
//! no pump boost the loop is in hydrostatic equilibrium and all flows vanish.
//! The CTAH branch carries the pump; the DHX branch carries a check valve
//! that blocks upward flow.

use crate::branch::{BranchKind, SeriesBranch};
use crate::error::{CorrelationError, CorrelationResult};
use crate::segment::Segment;
use serde::{Deserialize, Serialize};

/// Hydraulic diameter shared by all loop segments (m).
pub const LOOP_DIAMETER_M: f64 = 2.79e-2;

/// Absolute roughness of the loop piping (m).
pub const LOOP_ROUGHNESS_M: f64 = 1.5e-5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopGeometry {
    pub heater: SeriesBranch,
    pub ctah: SeriesBranch,
    pub dhx: SeriesBranch,
}

impl LoopGeometry {
    pub fn branch(&self, kind: BranchKind) -> &SeriesBranch {
        match kind {
            BranchKind::Heater => &self.heater,
            BranchKind::Ctah => &self.ctah,
            BranchKind::Dhx => &self.dhx,
        }
    }

    pub fn validate(&self) -> CorrelationResult<()> {
        for kind in BranchKind::ALL {
            self.branch(kind).validate()?;
        }
        if !self.ctah.pump_driven {
            return Err(CorrelationError::InvalidArg {
                what: "ctah branch must carry the pump",
            });
        }
        Ok(())
    }
}

fn pipe(name: &str, length_m: f64, incline_deg: f64, form_loss_k: f64) -> Segment {
    Segment::pipe(
        name,
        length_m,
        LOOP_DIAMETER_M,
        incline_deg,
        LOOP_ROUGHNESS_M,
        form_loss_k,
    )
}

fn fitting(name: &str, length_m: f64, incline_deg: f64, a: f64, b: f64, exp: f64) -> Segment {
    Segment::fitting(name, length_m, LOOP_DIAMETER_M, incline_deg, a, b, exp)
}

pub fn heater_branch() -> SeriesBranch {
    SeriesBranch::new(
        "heater",
        vec![
            pipe("heater_top_riser", 0.36, -90.0, 0.0),
            pipe("heater_upper_pipe", 0.63, -90.0, 3.15),
            fitting("heater_static_mixer", 0.33, -90.0, 21.0, 4000.0, -1.0),
            fitting("heater_core", 1.68, -90.0, 18.0, 93000.0, -1.35),
            pipe("heater_bottom_leg", 1.63, 0.0, 5.15),
        ],
    )
}

pub fn ctah_branch() -> SeriesBranch {
    SeriesBranch::new(
        "ctah",
        vec![
            pipe("ctah_inlet_pipe", 0.40, 0.0, 5.05),
            fitting("ctah_vertical", 0.33, -90.0, 3.9, 0.0, -1.0),
            fitting("ctah_horizontal", 1.2, 0.0, 400.0, 52000.0, -1.0),
            pipe("ctah_outlet_drop", 0.7, -90.0, 0.0),
            pipe("ctah_pump", 0.36, 0.0, 0.0),
            pipe("ctah_return_drop", 1.97, -90.0, 0.0),
            pipe("ctah_return_leg", 0.69, 0.0, 2.4),
        ],
    )
    .with_pump()
}

pub fn dhx_branch() -> SeriesBranch {
    SeriesBranch::new(
        "dhx",
        vec![
            pipe("dhx_inlet_pipe", 0.22, 0.0, 1.75),
            fitting("dhx_shell_side", 1.18, -90.0, 23.9, 46000.0, -1.0),
            fitting("dhx_static_mixer", 0.33, -90.0, 21.0, 4000.0, -1.0),
            pipe("dhx_outlet_pipe", 0.96, -90.0, 1.9),
            Segment::check_valve(
                "dhx_flowmeter_check_valve",
                0.36,
                LOOP_DIAMETER_M,
                -90.0,
                18.0,
                1.0e6,
            ),
            pipe("dhx_bottom_drop", 0.17, -90.0, 0.0),
        ],
    )
}

impl Default for LoopGeometry {
    fn default() -> Self {
        Self {
            heater: heater_branch(),
            ctah: ctah_branch(),
            dhx: dhx_branch(),
        }
    }
}
