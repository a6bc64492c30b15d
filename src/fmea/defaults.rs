//! Built-in FMEA tables.
//!
//! Dedicated tables exist for power transformers and circuit breakers; every
//! other asset type gets a generic list. Ratings and Weibull pairs come from
//! three risk levels and three failure patterns.

use crate::error::AppError;
use crate::fmea::{FailureMode, FailureModeSource, FmeaReport, OperatingCharacteristics};

#[derive(Debug, Clone, Copy)]
enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    /// `(severity, occurrence, detection)`.
    fn ratings(self) -> (u32, u32, u32) {
        match self {
            Risk::Low => (3, 2, 2),
            Risk::Medium => (5, 4, 4),
            Risk::High => (8, 6, 5),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Early,
    Random,
    WearOut,
}

impl Pattern {
    /// `(β, η hours, tabulated MTTF hours)`.
    fn weibull(self) -> (f64, f64, f64) {
        match self {
            Pattern::Early => (0.8, 15_000.0, 16_875.0),
            Pattern::Random => (1.0, 50_000.0, 50_000.0),
            Pattern::WearOut => (3.5, 80_000.0, 71_851.0),
        }
    }
}

type Row = (&'static str, &'static str, &'static str, Risk, Pattern, &'static str);

const POWER_TRANSFORMER: [Row; 5] = [
    (
        "Insulation Breakdown",
        "Aging, overheating, moisture ingress, or electrical stress",
        "Dielectric failure, internal arcing, potential fire or explosion",
        Risk::High,
        Pattern::WearOut,
        "Regular oil testing, dissolved gas analysis, and thermal imaging",
    ),
    (
        "Bushing Failure",
        "Contamination, cracking, or moisture ingress",
        "Flashover, loss of insulation, and transformer damage",
        Risk::Medium,
        Pattern::WearOut,
        "Regular inspections, power factor testing, and timely replacement",
    ),
    (
        "Cooling System Malfunction",
        "Fan failure, pump issues, radiator blockage",
        "Overheating, accelerated aging, potential winding damage",
        Risk::Medium,
        Pattern::Random,
        "Regular maintenance of cooling systems, temperature monitoring",
    ),
    (
        "Tap Changer Issues",
        "Contact wear, mechanism failure, or control issues",
        "Improper voltage regulation, arcing, or mechanism seizure",
        Risk::Medium,
        Pattern::WearOut,
        "Regular tap changer maintenance, oil filtration, and contact inspection",
    ),
    (
        "Core Failure",
        "Core lamination damage, grounding issues",
        "Increased losses, heating, noise, and vibration",
        Risk::Low,
        Pattern::WearOut,
        "Core ground testing, vibration monitoring",
    ),
];

const CIRCUIT_BREAKER: [Row; 4] = [
    (
        "Contact Wear",
        "Repeated operations, fault interruptions, and arcing",
        "Increased contact resistance, heating, and potential for failure to interrupt",
        Risk::Medium,
        Pattern::WearOut,
        "Contact resistance testing, travel timing analysis, and inspection",
    ),
    (
        "Operating Mechanism Failure",
        "Mechanical wear, lubrication issues, or component breakage",
        "Slow operation, failure to operate, or incomplete operation",
        Risk::High,
        Pattern::WearOut,
        "Regular mechanism maintenance, lubrication, and timing tests",
    ),
    (
        "Insulating Medium Degradation",
        "Contamination, moisture, or aging of oil/gas/vacuum",
        "Reduced dielectric strength, internal flashover",
        Risk::Medium,
        Pattern::WearOut,
        "Medium testing, monitoring, and scheduled replacement",
    ),
    (
        "Control Circuit Failure",
        "Faulty wiring, component failure, or relay malfunction",
        "Failure to trip/close or spurious operation",
        Risk::High,
        Pattern::Random,
        "Control circuit verification, component testing",
    ),
];

const GENERIC: [Row; 5] = [
    (
        "Insulation Failure",
        "Aging, environmental stress, or electrical overstress",
        "Short circuit, ground fault, or equipment damage",
        Risk::High,
        Pattern::WearOut,
        "Regular insulation testing and environmental protection",
    ),
    (
        "Mechanical Failure",
        "Wear, fatigue, or improper installation",
        "Structural damage, misalignment, or operational failure",
        Risk::Medium,
        Pattern::WearOut,
        "Regular mechanical inspections and preventive maintenance",
    ),
    (
        "Electrical Connection Failure",
        "Loose connections, corrosion, or thermal cycling",
        "High resistance connections, heating, and potential fire",
        Risk::Medium,
        Pattern::Random,
        "Thermographic inspection, connection torque verification",
    ),
    (
        "Environmental Damage",
        "Water ingress, contamination, or extreme temperatures",
        "Corrosion, reduced lifespan, or catastrophic failure",
        Risk::Medium,
        Pattern::Random,
        "Improved environmental protection, regular cleaning",
    ),
    (
        "Early-Life Component Defect",
        "Manufacturing defects, shipping damage, or commissioning errors",
        "Premature trips or outages shortly after energization",
        Risk::Low,
        Pattern::Early,
        "Factory acceptance testing, commissioning checks, and burn-in monitoring",
    ),
];

/// Offline FMEA source backed by the tables above.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFailureModes;

impl DefaultFailureModes {
    pub fn failure_modes(asset_type: &str) -> Vec<FailureMode> {
        let rows: &[Row] = match asset_type {
            "Power Transformer" => &POWER_TRANSFORMER,
            "Circuit Breaker" => &CIRCUIT_BREAKER,
            _ => &GENERIC,
        };
        rows.iter().map(to_mode).collect()
    }
}

impl FailureModeSource for DefaultFailureModes {
    fn name(&self) -> &str {
        "built-in defaults"
    }

    fn generate(
        &self,
        asset_type: &str,
        characteristics: &OperatingCharacteristics,
    ) -> Result<FmeaReport, AppError> {
        Ok(FmeaReport {
            asset_type: asset_type.to_string(),
            characteristics: characteristics.clone(),
            failure_modes: Self::failure_modes(asset_type),
            source: self.name().to_string(),
        })
    }
}

fn to_mode(row: &Row) -> FailureMode {
    let &(name, cause, effect, risk, pattern, recommendations) = row;
    let (severity, occurrence, detection) = risk.ratings();
    let (beta, eta, mttf) = pattern.weibull();
    FailureMode {
        failure_mode: name.to_string(),
        cause: cause.to_string(),
        effect: effect.to_string(),
        severity,
        occurrence,
        detection,
        rpn: severity * occurrence * detection,
        weibull_beta: beta,
        weibull_eta: eta,
        mttf,
        recommendations: recommendations.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpn_is_product_of_ratings() {
        for asset in ["Power Transformer", "Circuit Breaker", "Recloser"] {
            for mode in DefaultFailureModes::failure_modes(asset) {
                assert_eq!(mode.rpn, mode.severity * mode.occurrence * mode.detection);
                assert!(mode.parameters().is_ok());
            }
        }
    }

    #[test]
    fn unknown_assets_get_generic_modes() {
        let modes = DefaultFailureModes::failure_modes("Busbar");
        assert_eq!(modes[0].failure_mode, "Insulation Failure");
        assert_eq!(DefaultFailureModes::failure_modes("Power Transformer").len(), 5);
    }
}
