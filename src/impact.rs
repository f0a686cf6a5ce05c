//! Impact physics for a spherical asteroid striking the ground.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ASTEROID_DENSITY_KG_M3, DEFAULT_TARGET_POPULATION, JOULES_PER_MEGATON};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImpactError {
    #[error("{field} must be a finite number greater than zero")]
    InvalidInput { field: &'static str },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactInput {
    pub diameter_km: f64,
    pub velocity_km_s: f64,
    #[serde(default = "default_density")]
    pub density_kg_m3: f64,
    #[serde(default = "default_population")]
    pub target_population: u64,
}

fn default_density() -> f64 {
    DEFAULT_ASTEROID_DENSITY_KG_M3
}

fn default_population() -> u64 {
    DEFAULT_TARGET_POPULATION
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnergyRisk {
    Moderate,
    High,
    Extreme,
}

impl EnergyRisk {
    fn from_megatons(megatons: f64) -> Self {
        if megatons > 1000.0 {
            Self::Extreme
        } else if megatons > 100.0 {
            Self::High
        } else {
            Self::Moderate
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactCalculation {
    pub mass_kg: f64,
    pub energy_joules: f64,
    pub energy_megatons: f64,
    pub crater_diameter_km: f64,
    pub damage_radius_km: f64,
    pub estimated_casualties: u64,
    pub energy_risk: EnergyRisk,
}

pub fn calculate_impact(input: &ImpactInput) -> Result<ImpactCalculation, ImpactError> {
    ensure_positive("diameterKm", input.diameter_km)?;
    ensure_positive("velocityKmS", input.velocity_km_s)?;
    ensure_positive("densityKgM3", input.density_kg_m3)?;
    if input.target_population == 0 {
        return Err(ImpactError::InvalidInput {
            field: "targetPopulation",
        });
    }

    let radius_m = input.diameter_km * 1000.0 / 2.0;
    let volume_m3 = 4.0 / 3.0 * PI * radius_m.powi(3);
    let mass_kg = volume_m3 * input.density_kg_m3;

    let velocity_m_s = input.velocity_km_s * 1000.0;
    let energy_joules = 0.5 * mass_kg * velocity_m_s.powi(2);
    let energy_megatons = energy_joules / JOULES_PER_MEGATON;

    let crater_diameter_km = 1.8 * energy_megatons.powf(0.25);
    let damage_radius_km = 2.0 * energy_megatons.sqrt();

    // 1000 people per km² inside the damage radius, capped at 10% of the
    // target population.
    let exposed = PI * damage_radius_km.powi(2) * 1000.0;
    let cap = input.target_population as f64 * 0.1;
    let estimated_casualties = exposed.min(cap).round() as u64;

    Ok(ImpactCalculation {
        mass_kg,
        energy_joules,
        energy_megatons,
        crater_diameter_km,
        damage_radius_km,
        estimated_casualties,
        energy_risk: EnergyRisk::from_megatons(energy_megatons),
    })
}

fn ensure_positive(field: &'static str, value: f64) -> Result<(), ImpactError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ImpactError::InvalidInput { field })
    }
}
