//! Water-quality warnings for readings that are unsafe to swim in or that
//! put surfaces and equipment at risk.

use super::balance::WaterBalance;
use poolchem_schemas::{
    pool::SanitizerType,
    reading::{Parameter, Readings},
};

const CHLORINE_HAZARD_LOW: f64 = 0.5;
const CHLORINE_HAZARD_HIGH: f64 = 5.0;
const BROMINE_HAZARD_LOW: f64 = 1.0;
const BROMINE_HAZARD_HIGH: f64 = 10.0;
/// Combined chlorine (total minus free) above this means chloramines.
const CHLORAMINE_THRESHOLD: f64 = 0.5;
const LSI_EXTREME: f64 = 1.0;

/// Warnings for one reading set, most serious first.
///
/// Free chlorine hazards apply to chlorine and salt-water pools, bromine
/// hazards only to bromine pools.
pub fn water_quality_warnings(
    readings: &Readings,
    sanitizer: SanitizerType,
    balance: Option<&WaterBalance>,
) -> Vec<String> {
    let mut hazards = Vec::new();
    let mut warnings = Vec::new();
    let reading = |p: Parameter| readings.get(&p).copied();

    if sanitizer != SanitizerType::Bromine {
        match reading(Parameter::FreeChlorine) {
            Some(fc) if fc < CHLORINE_HAZARD_LOW => hazards.push(format!(
                "HEALTH HAZARD: Free chlorine at {} ppm cannot keep the water sanitized. Do not swim until corrected.",
                fc
            )),
            Some(fc) if fc > CHLORINE_HAZARD_HIGH => hazards.push(format!(
                "HEALTH HAZARD: Free chlorine at {} ppm is above {} ppm. Do not swim until levels decrease.",
                fc, CHLORINE_HAZARD_HIGH
            )),
            _ => {}
        }
    }
    if sanitizer == SanitizerType::Bromine {
        match reading(Parameter::Bromine) {
            Some(br) if br < BROMINE_HAZARD_LOW => hazards.push(format!(
                "HEALTH HAZARD: Bromine at {} ppm cannot keep the water sanitized. Do not swim until corrected.",
                br
            )),
            Some(br) if br > BROMINE_HAZARD_HIGH => hazards.push(format!(
                "HEALTH HAZARD: Bromine at {} ppm is above {} ppm. Do not swim until levels decrease.",
                br, BROMINE_HAZARD_HIGH
            )),
            _ => {}
        }
    }

    if let (Some(total), Some(free)) = (reading(Parameter::TotalChlorine), reading(Parameter::FreeChlorine)) {
        let combined = total - free;
        if combined > CHLORAMINE_THRESHOLD {
            warnings.push(format!(
                "Combined chlorine of {:.1} ppm indicates chloramines, which cause a strong odor and eye irritation. Shock the pool to break them down.",
                combined
            ));
        }
    }

    match reading(Parameter::Ph) {
        Some(ph) if ph < 6.8 => warnings.push(format!(
            "Very low pH ({}) irritates eyes and skin and corrodes equipment and surfaces.",
            ph
        )),
        Some(ph) if ph > 8.0 => warnings.push(format!(
            "Very high pH ({}) clouds the water, forms scale and weakens chlorine.",
            ph
        )),
        _ => {}
    }

    match reading(Parameter::Alkalinity) {
        Some(ta) if ta < 60.0 => warnings.push(format!(
            "Very low alkalinity ({} ppm) lets pH swing and can cause corrosion and staining.",
            ta
        )),
        Some(ta) if ta > 180.0 => warnings.push(format!(
            "Very high alkalinity ({} ppm) makes pH hard to adjust and encourages scale.",
            ta
        )),
        _ => {}
    }

    match reading(Parameter::Hardness) {
        Some(ch) if ch < 150.0 => warnings.push(format!(
            "Very low calcium hardness ({} ppm) etches plaster and corrodes metal parts.",
            ch
        )),
        Some(ch) if ch > 500.0 => warnings.push(format!(
            "Very high calcium hardness ({} ppm) causes scaling and clogged filters.",
            ch
        )),
        _ => {}
    }

    if let Some(cya) = reading(Parameter::CyanuricAcid) {
        if cya > 100.0 {
            warnings.push(format!(
                "Cyanuric acid at {} ppm locks up chlorine. Only a partial drain and refill will lower it.",
                cya
            ));
        }
    }

    if let Some(balance) = balance {
        if balance.lsi < -LSI_EXTREME {
            warnings.push(format!(
                "LSI {:.2}: highly corrosive water damages surfaces and equipment. Address immediately.",
                balance.lsi
            ));
        } else if balance.lsi > LSI_EXTREME {
            warnings.push(format!(
                "LSI {:.2}: highly scale-forming water leaves deposits on surfaces and equipment. Address immediately.",
                balance.lsi
            ));
        }
    }

    hazards.extend(warnings);
    hazards
}
