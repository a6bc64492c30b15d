//! Asset catalog: supported asset types and their operating characteristics.
//!
//! Every asset shares a few common characteristics (installation, age, duty
//! cycle, humidity); the listed asset types add their own. Each one is either
//! a fixed set of choices or a numeric range with a default.

use tracing::{debug, warn};

use crate::error::AppError;
use crate::fmea::OperatingCharacteristics;

/// Asset types with dedicated operating characteristics.
pub const ASSET_TYPES: [&str; 15] = [
    "Power Transformer",
    "Circuit Breaker",
    "Disconnect Switch",
    "Surge Arrester",
    "Recloser",
    "Capacitor Bank",
    "Current Transformer",
    "Voltage Transformer",
    "Transmission Line",
    "Distribution Line",
    "Busbar",
    "Underground Cable",
    "Insulator",
    "Lightning Arrester",
    "Load Tap Changer",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacteristicKind {
    /// First entry is the default.
    Choice(&'static [&'static str]),
    Range { min: f64, max: f64, default: f64, step: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Characteristic {
    pub name: &'static str,
    pub kind: CharacteristicKind,
}

impl Characteristic {
    pub fn default_value(&self) -> String {
        match self.kind {
            CharacteristicKind::Choice(options) => options.first().copied().unwrap_or_default().to_string(),
            CharacteristicKind::Range { default, .. } => format!("{default}"),
        }
    }

    /// Canonical spelling of `value`, or why it does not fit.
    pub fn check(&self, value: &str) -> Result<String, String> {
        match self.kind {
            CharacteristicKind::Choice(options) => options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(value))
                .map(|o| o.to_string())
                .ok_or_else(|| format!("expected one of: {}", options.join(", "))),
            CharacteristicKind::Range { min, max, .. } => {
                let v: f64 = value
                    .parse()
                    .map_err(|_| format!("expected a number between {min} and {max}"))?;
                if !(min..=max).contains(&v) {
                    return Err(format!("{v} is outside {min}..={max}"));
                }
                Ok(format!("{v}"))
            }
        }
    }
}

const fn choice(name: &'static str, options: &'static [&'static str]) -> Characteristic {
    Characteristic {
        name,
        kind: CharacteristicKind::Choice(options),
    }
}

const fn range(name: &'static str, min: f64, max: f64, default: f64, step: f64) -> Characteristic {
    Characteristic {
        name,
        kind: CharacteristicKind::Range { min, max, default, step },
    }
}

const COMMON: &[Characteristic] = &[
    choice("Installation Type", &["Outdoor", "Indoor", "Underground", "Substation", "Pole-mounted"]),
    range("Age (years)", 0.0, 50.0, 10.0, 1.0),
    choice("Duty Cycle", &["Continuous", "Intermittent", "Standby", "Peak load only"]),
    choice("Humidity Level", &["Medium", "Low", "High", "Variable"]),
];

const VOLTAGE_800: Characteristic = range("Voltage Rating (kV)", 1.0, 800.0, 138.0, 1.0);

fn asset_specific(asset_type: &str) -> &'static [Characteristic] {
    match asset_type {
        "Power Transformer" => const { &[
            choice("Cooling Type", &["ONAN", "ONAF", "OFAF", "ODAF"]),
            range("Rating (MVA)", 1.0, 1000.0, 100.0, 1.0),
            choice("Oil Type", &["Mineral Oil", "Synthetic Ester", "Natural Ester", "Silicone"]),
            choice("Tap Changer Type", &["On-load", "Off-load", "None"]),
            choice("Winding Configuration", &["Delta-Wye", "Wye-Wye", "Delta-Delta"]),
            choice("Overload Frequency", &["Rare", "Occasional", "Frequent"]),
        ] },
        "Circuit Breaker" => const { &[
            choice("Type", &["SF6", "Vacuum", "Air", "Oil"]),
            VOLTAGE_800,
            range("Current Rating (A)", 100.0, 5000.0, 1200.0, 100.0),
            range("Interrupting Capacity (kA)", 10.0, 100.0, 40.0, 5.0),
            choice("Operating Mechanism", &["Spring", "Hydraulic", "Pneumatic", "Magnetic"]),
        ] },
        "Disconnect Switch" => const { &[
            choice("Type", &["Vertical Break", "Center Break", "Double Break", "Pantograph"]),
            VOLTAGE_800,
            range("Current Rating (A)", 100.0, 4000.0, 1200.0, 100.0),
            choice("Operating Mechanism", &["Manual", "Motor Operated"]),
        ] },
        "Surge Arrester" => const { &[
            choice("Type", &["Metal Oxide", "Gapped Silicon Carbide", "Polymeric", "Porcelain"]),
            VOLTAGE_800,
            range("Energy Capability (kJ/kV)", 1.0, 20.0, 5.0, 0.5),
        ] },
        "Recloser" => const { &[
            choice("Type", &["Vacuum", "Oil", "SF6"]),
            range("Voltage Rating (kV)", 1.0, 40.0, 15.0, 1.0),
            choice("Control Type", &["Microprocessor", "Electronic", "Electromechanical"]),
            range("Operating Cycles", 1.0, 5.0, 3.0, 1.0),
        ] },
        "Capacitor Bank" => const { &[
            choice("Connection Type", &["Wye", "Delta"]),
            choice("Switching Type", &["Fixed", "Switched"]),
            range("Voltage Rating (kV)", 1.0, 40.0, 15.0, 1.0),
            range("kVAR Rating", 100.0, 10000.0, 1200.0, 100.0),
        ] },
        "Current Transformer" => const { &[
            choice("Type", &["Wound", "Bar", "Bushing", "Toroidal"]),
            choice(
                "Ratio",
                &["100:5", "200:5", "300:5", "400:5", "500:5", "600:5", "800:5", "1000:5", "1200:5", "2000:5"],
            ),
            choice("Accuracy Class", &["0.1", "0.2", "0.5", "1.0", "3.0", "5.0"]),
            range("Burden (VA)", 5.0, 100.0, 15.0, 5.0),
        ] },
        "Voltage Transformer" => const { &[
            choice("Type", &["Magnetic", "Capacitive"]),
            choice(
                "Ratio",
                &["66000:110", "110000:110", "132000:110", "220000:110", "400000:110", "765000:110"],
            ),
            choice("Accuracy Class", &["0.1", "0.2", "0.5", "1.0", "3.0"]),
            range("Burden (VA)", 10.0, 200.0, 50.0, 10.0),
        ] },
        "Transmission Line" => const { &[
            choice("Conductor Type", &["ACSR", "AAAC", "ACAR", "ACCC", "OPGW"]),
            range("Voltage Rating (kV)", 69.0, 765.0, 138.0, 1.0),
            choice("Structure Type", &["Lattice Tower", "Monopole", "H-Frame", "Guyed-V"]),
            range("Span Length (m)", 100.0, 1000.0, 300.0, 50.0),
            choice("Wind Exposure", &["Medium", "Low", "High", "Extreme"]),
        ] },
        "Distribution Line" => const { &[
            choice("Conductor Type", &["Bare", "Covered", "Insulated"]),
            range("Voltage Rating (kV)", 4.0, 35.0, 12.0, 1.0),
            choice("Structure Type", &["Wood Pole", "Concrete Pole", "Steel Pole", "Underground"]),
            range("Span Length (m)", 30.0, 300.0, 100.0, 10.0),
        ] },
        "Busbar" => const { &[
            choice("Material", &["Aluminum", "Copper", "Silver-plated"]),
            choice("Configuration", &["Single", "Double", "Ring", "Breaker-and-a-Half"]),
            VOLTAGE_800,
            range("Current Rating (A)", 1000.0, 10000.0, 3000.0, 500.0),
        ] },
        "Underground Cable" => const { &[
            choice("Insulation Type", &["XLPE", "EPR", "PILC", "HMWPE"]),
            range("Voltage Rating (kV)", 1.0, 500.0, 35.0, 1.0),
            choice("Installation Method", &["Direct Buried", "Duct Bank", "Tunnel", "Submarine"]),
            choice("Shielding", &["Tape Shield", "Wire Shield", "Lead Sheath", "None"]),
        ] },
        "Insulator" => const { &[
            choice("Type", &["Porcelain", "Glass", "Polymer/Composite", "Hybrid"]),
            choice("Configuration", &["Suspension", "Post", "Pin", "Line Post"]),
            range("Voltage Rating (kV)", 10.0, 800.0, 138.0, 1.0),
            choice("Pollution Level", &["Medium", "Light", "Heavy", "Very Heavy"]),
        ] },
        "Lightning Arrester" => const { &[
            choice("Type", &["Metal Oxide", "Silicon Carbide", "Expulsion"]),
            VOLTAGE_800,
            range("Discharge Current (kA)", 5.0, 100.0, 10.0, 5.0),
            choice("Housing Material", &["Polymer", "Porcelain"]),
        ] },
        "Load Tap Changer" => const { &[
            choice("Type", &["Vacuum", "Resistive", "Reactive", "Off-circuit"]),
            choice("Control Type", &["Automatic", "Manual", "Remote"]),
            range("Number of Taps", 3.0, 33.0, 17.0, 2.0),
            range("Voltage Range (%)", 5.0, 20.0, 10.0, 1.0),
            choice("Switching Frequency", &["Medium", "Low", "High"]),
        ] },
        _ => &[],
    }
}

/// Catalog spelling of a known asset type (case-insensitive).
pub fn canonical_asset_type(asset_type: &str) -> Option<&'static str> {
    let asset_type = asset_type.trim();
    ASSET_TYPES.iter().copied().find(|t| t.eq_ignore_ascii_case(asset_type))
}

/// Common characteristics followed by the asset-specific ones.
///
/// Unknown asset types get the common set only.
pub fn operating_characteristics(asset_type: &str) -> Vec<Characteristic> {
    let specific = canonical_asset_type(asset_type).map(asset_specific).unwrap_or_default();
    COMMON.iter().chain(specific).copied().collect()
}

/// Check user-supplied characteristics against the catalog and fill in defaults.
///
/// Keys are matched case-insensitively and rewritten to their catalog
/// spelling. Keys the catalog does not know are passed through unchanged.
pub fn resolve_characteristics(
    asset_type: &str,
    given: &OperatingCharacteristics,
) -> Result<OperatingCharacteristics, AppError> {
    let catalog = operating_characteristics(asset_type);
    let mut out = OperatingCharacteristics::new();

    for (key, value) in given {
        match catalog.iter().find(|c| c.name.eq_ignore_ascii_case(key.trim())) {
            Some(c) => {
                let value = c
                    .check(value)
                    .map_err(|why| AppError::new(2, format!("Invalid value '{value}' for '{}': {why}.", c.name)))?;
                out.insert(c.name.to_string(), value);
            }
            None => {
                debug!(key = %key, asset_type, "characteristic not in catalog, passing through");
                out.insert(key.clone(), value.clone());
            }
        }
    }

    for c in &catalog {
        out.entry(c.name.to_string()).or_insert_with(|| c.default_value());
    }

    if canonical_asset_type(asset_type).is_none() {
        warn!(asset_type, "asset type not in catalog, using common characteristics only");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_type_has_specific_characteristics() {
        for t in ASSET_TYPES {
            assert!(operating_characteristics(t).len() > COMMON.len(), "{t}");
        }
        assert_eq!(operating_characteristics("Wind Turbine").len(), COMMON.len());
    }

    #[test]
    fn asset_type_lookup_ignores_case() {
        assert_eq!(canonical_asset_type(" power transformer "), Some("Power Transformer"));
        assert_eq!(canonical_asset_type("Wind Turbine"), None);
    }

    #[test]
    fn resolve_fills_defaults_and_canonicalizes() {
        let mut given = OperatingCharacteristics::new();
        given.insert("cooling type".to_string(), "onaf".to_string());
        given.insert("Site".to_string(), "North yard".to_string());

        let out = resolve_characteristics("Power Transformer", &given).unwrap();
        assert_eq!(out.get("Cooling Type").map(String::as_str), Some("ONAF"));
        assert_eq!(out.get("Rating (MVA)").map(String::as_str), Some("100"));
        assert_eq!(out.get("Age (years)").map(String::as_str), Some("10"));
        assert_eq!(out.get("Site").map(String::as_str), Some("North yard"));
        assert!(!out.contains_key("cooling type"));
    }

    #[test]
    fn resolve_rejects_out_of_catalog_values() {
        let mut given = OperatingCharacteristics::new();
        given.insert("Rating (MVA)".to_string(), "5000".to_string());
        let err = resolve_characteristics("Power Transformer", &given).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let mut given = OperatingCharacteristics::new();
        given.insert("Type".to_string(), "Plasma".to_string());
        assert!(resolve_characteristics("Circuit Breaker", &given).is_err());
    }
}
