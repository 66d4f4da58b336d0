//! Therminol VP-1 liquid properties.
//!
//! Linear density and power-law viscosity fits in degrees Celsius, valid
//! between 20 °C and 180 °C. Evaluations outside that window fail with
//! `CorrelationError::OutOfRange` rather than extrapolating.

use crate::common::{check_finite, check_range};
use crate::error::CorrelationResult;
use lf_core::units::{Density, DynVisc, Temperature, to_degc};
use uom::si::dynamic_viscosity::pascal_second;
use uom::si::mass_density::kilogram_per_cubic_meter;

pub const MIN_TEMPERATURE_DEGC: f64 = 20.0;
pub const MAX_TEMPERATURE_DEGC: f64 = 180.0;

fn validated_degc(temperature: Temperature) -> CorrelationResult<f64> {
    check_range(
        to_degc(temperature),
        MIN_TEMPERATURE_DEGC,
        MAX_TEMPERATURE_DEGC,
        "therminol temperature_degc",
    )
}

/// Liquid density: `rho = 1078 - 0.85 T` (kg/m³, T in °C).
pub fn density(temperature: Temperature) -> CorrelationResult<Density> {
    let t = validated_degc(temperature)?;
    let rho = check_finite(1078.0 - 0.85 * t, "therminol density")?;
    Ok(Density::new::<kilogram_per_cubic_meter>(rho))
}

/// Dynamic viscosity: `mu = 0.130 / T^1.072` (Pa·s, T in °C).
pub fn viscosity(temperature: Temperature) -> CorrelationResult<DynVisc> {
    let t = validated_degc(temperature)?;
    let mu = check_finite(0.130 / t.powf(1.072), "therminol viscosity")?;
    Ok(DynVisc::new::<pascal_second>(mu))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorrelationError;
    use lf_core::units::degc;

    #[test]
    fn density_at_room_temperature() {
        let rho = density(degc(20.0)).unwrap();
        assert!((rho.value - 1061.0).abs() < 1e-9);
    }

    #[test]
    fn viscosity_decreases_with_temperature() {
        let cold = viscosity(degc(25.0)).unwrap().value;
        let hot = viscosity(degc(100.0)).unwrap().value;
        assert!(cold > hot);
        assert!(cold > 1e-3 && cold < 1e-2, "mu(25C) = {cold}");
    }

    #[test]
    fn out_of_range_is_rejected() {
        let err = density(degc(5.0)).unwrap_err();
        assert!(matches!(err, CorrelationError::OutOfRange { .. }));
        assert!(viscosity(degc(200.0)).is_err());
    }
}
