//! Orders an assessment's adjustments into a step-by-step treatment plan.

use crate::{chemistry::engine::Assessment, safety::SafetyLookup};
use poolchem_schemas::{
    adjustment::{ChemicalAdjustment, Compound, Direction},
    reading::Parameter,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TreatmentStep {
    pub step: usize,
    pub parameter: Parameter,
    pub direction: Direction,
    pub compound: Compound,
    pub amount: f64,
    pub unit: String,
    pub priority: u8,
    pub capped: bool,
    pub instructions: String,
    pub safety_notes: String,
    /// Hours after the first addition at which this step may start.
    pub start_after_hours: u32,
    /// Hours to circulate before the next step.
    pub wait_hours: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreatmentPlan {
    pub pool: String,
    pub steps: Vec<TreatmentStep>,
    pub warnings: Vec<String>,
    pub total_hours: u32,
}

impl TreatmentPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn instructions(adjustment: &ChemicalAdjustment, compound: Compound) -> String {
    match compound {
        Compound::PartialWaterChange => format!(
            "Drain {:.1}% of the water and refill with fresh water to lower {}.",
            adjustment.amount,
            adjustment.parameter.display_name()
        ),
        Compound::MuriaticAcid => format!(
            "Pour {:.1} {} of {} slowly into the deep end with the pump running.",
            adjustment.amount, adjustment.unit, compound
        ),
        Compound::BakingSoda | Compound::CalciumChloride | Compound::SodaAsh => format!(
            "Pre-dissolve {:.1} {} of {} in a bucket of pool water and add around the perimeter.",
            adjustment.amount, adjustment.unit, compound
        ),
        Compound::Stabilizer => format!(
            "Add {:.1} {} of {} through the skimmer or in a sock in front of a return.",
            adjustment.amount, adjustment.unit, compound
        ),
        Compound::PoolSalt => format!(
            "Broadcast {:.1} {} of {} and brush until dissolved.",
            adjustment.amount, adjustment.unit, compound
        ),
        Compound::BromineTablets => format!(
            "Load {:.1} {} of {} into the feeder.",
            adjustment.amount, adjustment.unit, compound
        ),
        _ => format!(
            "Add {:.1} {} of {} in front of a return jet.",
            adjustment.amount, adjustment.unit, compound
        ),
    }
}

/// Builds the plan for every adjustment that needs action, most urgent
/// first, and warns about any pair of compounds that must not be mixed.
pub fn build_plan(assessment: &Assessment, safety: &SafetyLookup) -> TreatmentPlan {
    let mut actionable: Vec<&ChemicalAdjustment> = assessment
        .adjustments()
        .filter(|a| a.is_action_required())
        .collect();
    actionable.sort_by_key(|a| (a.priority, a.parameter));

    let mut steps = Vec::with_capacity(actionable.len());
    let mut elapsed = 0;
    for adjustment in actionable {
        let Some(compound) = adjustment.compound else {
            continue;
        };
        let wait_hours = compound.wait_hours();
        steps.push(TreatmentStep {
            step: steps.len() + 1,
            parameter: adjustment.parameter,
            direction: adjustment.direction,
            compound,
            amount: adjustment.amount,
            unit: adjustment.unit.clone(),
            priority: adjustment.priority,
            capped: adjustment.capped,
            instructions: instructions(adjustment, compound),
            safety_notes: adjustment.safety_notes.clone(),
            start_after_hours: elapsed,
            wait_hours,
        });
        elapsed += wait_hours;
    }

    let mut ids: Vec<&str> = steps.iter().filter_map(|s| s.compound.safety_id()).collect();
    ids.sort_unstable();
    ids.dedup();
    let warnings = safety
        .incompatible_pairs(&ids)
        .into_iter()
        .map(|(a, b)| {
            let name = |id: &str| safety.record(id).map_or(id.to_string(), |r| r.display_name.clone());
            format!("Never mix {} with {}; add them separately and let the water circulate in between.", name(&a), name(&b))
        })
        .collect();

    TreatmentPlan {
        pool: assessment.pool.clone(),
        steps,
        warnings,
        total_hours: elapsed,
    }
}
