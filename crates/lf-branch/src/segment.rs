//! Flow segments that make up a series branch.

use crate::common::{EPSILON_MDOT, check_finite};
use crate::error::{CorrelationError, CorrelationResult};
use crate::fluid;
use crate::friction::fldk;
use lf_core::units::{MassRate, Pressure, Temperature, constants::G0_MPS2, pa, to_kgps};
use serde::{Deserialize, Serialize};

/// One segment of a branch: a pipe, a fitting with a custom loss curve, or a
/// check valve.
///
/// Pressure change along the flow direction:
///
/// ```text
/// dp = -sign(mdot) * fLDK * mdot^2 / (2 rho A^2) - rho g L sin(theta)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub length_m: f64,
    pub hydraulic_diameter_m: f64,
    /// Incline of the segment along positive flow; -90 is straight down.
    #[serde(default)]
    pub incline_deg: f64,
    pub kind: SegmentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentKind {
    /// Straight pipe with Churchill friction and lumped form losses.
    Pipe {
        roughness_m: f64,
        #[serde(default)]
        form_loss_k: f64,
    },
    /// Component with an empirical loss curve `fLDK = a + b Re^exp`.
    Fitting {
        fldk_a: f64,
        fldk_b: f64,
        fldk_exp: f64,
    },
    /// Check valve: `forward_k` for positive flow, `reverse_k` otherwise.
    CheckValve { forward_k: f64, reverse_k: f64 },
}

impl Segment {
    pub fn pipe(
        name: impl Into<String>,
        length_m: f64,
        hydraulic_diameter_m: f64,
        incline_deg: f64,
        roughness_m: f64,
        form_loss_k: f64,
    ) -> Self {
        Self {
            name: name.into(),
            length_m,
            hydraulic_diameter_m,
            incline_deg,
            kind: SegmentKind::Pipe {
                roughness_m,
                form_loss_k,
            },
        }
    }

    pub fn fitting(
        name: impl Into<String>,
        length_m: f64,
        hydraulic_diameter_m: f64,
        incline_deg: f64,
        fldk_a: f64,
        fldk_b: f64,
        fldk_exp: f64,
    ) -> Self {
        Self {
            name: name.into(),
            length_m,
            hydraulic_diameter_m,
            incline_deg,
            kind: SegmentKind::Fitting {
                fldk_a,
                fldk_b,
                fldk_exp,
            },
        }
    }

    pub fn check_valve(
        name: impl Into<String>,
        length_m: f64,
        hydraulic_diameter_m: f64,
        incline_deg: f64,
        forward_k: f64,
        reverse_k: f64,
    ) -> Self {
        Self {
            name: name.into(),
            length_m,
            hydraulic_diameter_m,
            incline_deg,
            kind: SegmentKind::CheckValve {
                forward_k,
                reverse_k,
            },
        }
    }

    /// Flow area (m²).
    pub fn area_m2(&self) -> f64 {
        std::f64::consts::PI * self.hydraulic_diameter_m.powi(2) / 4.0
    }

    /// Vertical rise along positive flow (m).
    pub fn rise_m(&self) -> f64 {
        self.length_m * self.incline_deg.to_radians().sin()
    }

    pub fn validate(&self) -> CorrelationResult<()> {
        if !(self.length_m > 0.0) {
            return Err(CorrelationError::InvalidArg {
                what: "segment length must be positive",
            });
        }
        if !(self.hydraulic_diameter_m > 0.0) {
            return Err(CorrelationError::InvalidArg {
                what: "segment hydraulic diameter must be positive",
            });
        }
        check_finite(self.incline_deg, "segment incline")?;
        match self.kind {
            SegmentKind::Pipe {
                roughness_m,
                form_loss_k,
            } => {
                if roughness_m < 0.0 || form_loss_k < 0.0 {
                    return Err(CorrelationError::InvalidArg {
                        what: "pipe roughness and form loss must be non-negative",
                    });
                }
            }
            SegmentKind::Fitting {
                fldk_a,
                fldk_b,
                fldk_exp,
            } => {
                check_finite(fldk_a, "fitting fldk_a")?;
                check_finite(fldk_b, "fitting fldk_b")?;
                check_finite(fldk_exp, "fitting fldk_exp")?;
            }
            SegmentKind::CheckValve {
                forward_k,
                reverse_k,
            } => {
                if forward_k < 0.0 || reverse_k < 0.0 {
                    return Err(CorrelationError::InvalidArg {
                        what: "check valve K must be non-negative",
                    });
                }
            }
        }
        Ok(())
    }

    /// Loss coefficient fLDK at `reynolds` for flow in the given direction.
    fn loss_coefficient(&self, reynolds: f64, forward: bool) -> CorrelationResult<f64> {
        let coeff = match self.kind {
            SegmentKind::Pipe {
                roughness_m,
                form_loss_k,
            } => fldk(
                reynolds,
                roughness_m / self.hydraulic_diameter_m,
                self.length_m / self.hydraulic_diameter_m,
                form_loss_k,
            )?,
            SegmentKind::Fitting {
                fldk_a,
                fldk_b,
                fldk_exp,
            } => fldk_a + fldk_b * reynolds.powf(fldk_exp),
            SegmentKind::CheckValve {
                forward_k,
                reverse_k,
            } => {
                if forward {
                    forward_k
                } else {
                    reverse_k
                }
            }
        };
        check_finite(coeff, "segment loss coefficient")
    }

    /// Hydrostatic pressure change at zero flow.
    pub fn hydrostatic_pressure_change(&self, temperature: Temperature) -> CorrelationResult<Pressure> {
        let rho = fluid::density(temperature)?.value;
        Ok(pa(-rho * G0_MPS2 * self.rise_m()))
    }

    /// Pressure change across the segment along positive flow.
    pub fn pressure_change(
        &self,
        mdot: MassRate,
        temperature: Temperature,
    ) -> CorrelationResult<Pressure> {
        let mdot = check_finite(to_kgps(mdot), "segment mass flow rate")?;
        let rho = fluid::density(temperature)?.value;
        let hydrostatic = -rho * G0_MPS2 * self.rise_m();

        if mdot.abs() < EPSILON_MDOT {
            return Ok(pa(hydrostatic));
        }

        let mu = fluid::viscosity(temperature)?.value;
        let area = self.area_m2();
        let reynolds = mdot.abs() * self.hydraulic_diameter_m / (area * mu);
        check_finite(reynolds, "Reynolds number")?;

        let coeff = self.loss_coefficient(reynolds, mdot > 0.0)?;
        let loss = coeff * mdot * mdot / (2.0 * rho * area * area);
        let dp = check_finite(-mdot.signum() * loss + hydrostatic, "segment pressure change")?;

        Ok(pa(dp))
    }
}
