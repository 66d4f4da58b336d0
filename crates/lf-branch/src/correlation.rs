//! Core trait for branch pressure-drop correlations.

use crate::error::CorrelationResult;
use lf_core::units::{MassRate, Pressure, Temperature, kgps, pa, to_degc, to_kgps, to_pa};

/// A branch pressure-change correlation.
///
/// Correlations are deterministic, stateless functions of mass flow rate,
/// temperature and pump boost, suitable for repeated evaluation inside a
/// root-finder.
///
/// Sign convention: positive mass flow runs from the shared top node down
/// through the branch; the returned pressure change is measured along that
/// same direction.
pub trait PressureDropCorrelation: Send + Sync {
    /// Correlation name for logging and errors.
    fn name(&self) -> &str;

    /// Pressure change across the branch at `mdot`, `temperature` and `pump`.
    ///
    /// Branches without a pump ignore `pump`.
    fn pressure_change(
        &self,
        mdot: MassRate,
        temperature: Temperature,
        pump: Pressure,
    ) -> CorrelationResult<Pressure>;

    /// Pressure change at zero flow with no pump boost.
    ///
    /// This is the hydrostatic head of the branch and is used to centre the
    /// balance solver's search bracket.
    fn hydrostatic_pressure_change(&self, temperature: Temperature) -> CorrelationResult<Pressure> {
        self.pressure_change(kgps(0.0), temperature, pa(0.0))
    }

    /// Frictional losses of the empirically correlated components at `mdot`,
    /// hydrostatic head excluded.
    ///
    /// Without finer detail the whole branch counts as one component.
    fn correlated_losses(
        &self,
        mdot: MassRate,
        temperature: Temperature,
    ) -> CorrelationResult<Vec<Pressure>> {
        let total = self.pressure_change(mdot, temperature, pa(0.0))?;
        let head = self.hydrostatic_pressure_change(temperature)?;
        Ok(vec![total - head])
    }
}

/// Adapter that turns a plain SI function into a correlation.
///
/// The function receives `(mdot_kg_per_s, temperature_degc, pump_pa)` and
/// returns the pressure change in pascal.
pub struct FnCorrelation<F> {
    name: String,
    func: F,
}

impl<F> FnCorrelation<F>
where
    F: Fn(f64, f64, f64) -> CorrelationResult<f64> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> PressureDropCorrelation for FnCorrelation<F>
where
    F: Fn(f64, f64, f64) -> CorrelationResult<f64> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn pressure_change(
        &self,
        mdot: MassRate,
        temperature: Temperature,
        pump: Pressure,
    ) -> CorrelationResult<Pressure> {
        let dp = (self.func)(to_kgps(mdot), to_degc(temperature), to_pa(pump))?;
        Ok(pa(dp))
    }
}

impl<T: PressureDropCorrelation + ?Sized> PressureDropCorrelation for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn pressure_change(
        &self,
        mdot: MassRate,
        temperature: Temperature,
        pump: Pressure,
    ) -> CorrelationResult<Pressure> {
        (**self).pressure_change(mdot, temperature, pump)
    }

    fn hydrostatic_pressure_change(&self, temperature: Temperature) -> CorrelationResult<Pressure> {
        (**self).hydrostatic_pressure_change(temperature)
    }

    fn correlated_losses(
        &self,
        mdot: MassRate,
        temperature: Temperature,
    ) -> CorrelationResult<Vec<Pressure>> {
        (**self).correlated_losses(mdot, temperature)
    }
}
