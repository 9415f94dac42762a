use crate::error::PoolChemError;
use poolchem_schemas::safety::{ChemicalSafetyRecord, SafetyStore};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Chemical hazard data and pairwise compatibility.
///
/// Identifiers are matched case-insensitively. Compatibility fails closed:
/// a pair with no entry, or with entries that disagree, is incompatible.
#[derive(Debug, Clone)]
pub struct SafetyLookup {
    store: SafetyStore,
}

fn normalize(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

fn validate(id: &str, record: &ChemicalSafetyRecord) -> Result<(), PoolChemError> {
    if id.is_empty() {
        return Err(PoolChemError::Validation("chemical id must not be empty".to_string()));
    }
    if record.display_name.trim().is_empty() {
        return Err(PoolChemError::Validation(format!("chemical '{}' needs a name", id)));
    }
    if !(1..=4).contains(&record.hazard_rating) {
        return Err(PoolChemError::Validation(format!(
            "hazard rating for '{}' must be 1-4, got {}",
            id, record.hazard_rating
        )));
    }
    if record.safety_precautions.is_empty() {
        return Err(PoolChemError::Validation(format!(
            "chemical '{}' needs at least one safety precaution",
            id
        )));
    }
    Ok(())
}

impl SafetyLookup {
    /// Validates `store` and normalizes its identifiers.
    pub fn new(store: SafetyStore) -> Result<Self, PoolChemError> {
        let mut chemicals = BTreeMap::new();
        for (id, record) in store.chemicals {
            let id = normalize(&id);
            validate(&id, &record)?;
            chemicals.insert(id, record);
        }

        let mut compatibility: BTreeMap<String, BTreeMap<String, u8>> = BTreeMap::new();
        for (a, row) in store.compatibility {
            for (b, flag) in row {
                if flag > 1 {
                    return Err(PoolChemError::Validation(format!(
                        "compatibility of '{}' and '{}' must be 0 or 1, got {}",
                        a, b, flag
                    )));
                }
                compatibility.entry(normalize(&a)).or_default().insert(normalize(&b), flag);
            }
        }

        Ok(Self {
            store: SafetyStore {
                chemicals,
                compatibility,
            },
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PoolChemError> {
        Self::new(serde_json::from_str(raw)?)
    }

    pub fn load_json(path: &Path) -> Result<Self, PoolChemError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| PoolChemError::FileIO(path.display().to_string(), e))?;
        Self::from_json_str(&raw)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), PoolChemError> {
        let raw = serde_json::to_string_pretty(&self.store)?;
        fs::write(path, raw).map_err(|e| PoolChemError::FileIO(path.display().to_string(), e))
    }

    pub fn store(&self) -> &SafetyStore {
        &self.store
    }

    pub fn chemical_ids(&self) -> impl Iterator<Item = &str> {
        self.store.chemicals.keys().map(String::as_str)
    }

    // ---

    pub fn check_compatibility(&self, chemical1: &str, chemical2: &str) -> bool {
        let a = normalize(chemical1);
        let b = normalize(chemical2);
        if a == b {
            return true;
        }
        let forward = self.flag(&a, &b);
        let backward = self.flag(&b, &a);
        match (forward, backward) {
            (Some(0), _) | (_, Some(0)) => false,
            (Some(_), _) | (_, Some(_)) => true,
            (None, None) => false,
        }
    }

    fn flag(&self, a: &str, b: &str) -> Option<u8> {
        self.store.compatibility.get(a)?.get(b).copied()
    }

    /// Every unordered pair among `ids` that must not be mixed.
    pub fn incompatible_pairs(&self, ids: &[&str]) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                if normalize(a) != normalize(b) && !self.check_compatibility(a, b) {
                    pairs.push((normalize(a), normalize(b)));
                }
            }
        }
        pairs
    }

    /// Handling precautions, or an empty list for unknown chemicals.
    pub fn get_safety_guidelines(&self, chemical_id: &str) -> &[String] {
        self.record(chemical_id)
            .map(|r| r.safety_precautions.as_slice())
            .unwrap_or(&[])
    }

    pub fn record(&self, chemical_id: &str) -> Option<&ChemicalSafetyRecord> {
        self.store.chemicals.get(&normalize(chemical_id))
    }

    pub fn hazard_rating(&self, chemical_id: &str) -> Option<u8> {
        self.record(chemical_id).map(|r| r.hazard_rating)
    }

    pub fn storage_guidelines(&self, chemical_id: &str) -> Option<&str> {
        self.record(chemical_id).map(|r| r.storage_guidelines.as_str())
    }

    pub fn emergency_procedures(&self, chemical_id: &str) -> Option<&str> {
        self.record(chemical_id).map(|r| r.emergency_procedures.as_str())
    }

    // --- administrative updates

    pub fn add_chemical(&mut self, chemical_id: &str, record: ChemicalSafetyRecord) -> Result<(), PoolChemError> {
        let id = normalize(chemical_id);
        if self.store.chemicals.contains_key(&id) {
            return Err(PoolChemError::Validation(format!("chemical '{}' already exists", id)));
        }
        validate(&id, &record)?;
        self.store.chemicals.insert(id, record);
        Ok(())
    }

    pub fn update_chemical(&mut self, chemical_id: &str, record: ChemicalSafetyRecord) -> Result<(), PoolChemError> {
        let id = normalize(chemical_id);
        validate(&id, &record)?;
        match self.store.chemicals.get_mut(&id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(PoolChemError::InvalidParameter(id)),
        }
    }

    /// Records compatibility in both directions.
    pub fn set_compatibility(&mut self, chemical1: &str, chemical2: &str, compatible: bool) -> Result<(), PoolChemError> {
        let a = normalize(chemical1);
        let b = normalize(chemical2);
        for id in [&a, &b] {
            if !self.store.chemicals.contains_key(id) {
                return Err(PoolChemError::InvalidParameter(id.clone()));
            }
        }
        let flag = u8::from(compatible);
        self.store.compatibility.entry(a.clone()).or_default().insert(b.clone(), flag);
        self.store.compatibility.entry(b).or_default().insert(a, flag);
        Ok(())
    }
}

impl Default for SafetyLookup {
    fn default() -> Self {
        Self {
            store: default_store(),
        }
    }
}

fn record(
    name: &str,
    formula: &str,
    hazard_rating: u8,
    precautions: &[&str],
    storage: &str,
    emergency: &str,
) -> ChemicalSafetyRecord {
    ChemicalSafetyRecord {
        display_name: name.to_string(),
        chemical_formula: Some(formula.to_string()),
        hazard_rating,
        safety_precautions: precautions.iter().map(|p| p.to_string()).collect(),
        storage_guidelines: storage.to_string(),
        emergency_procedures: emergency.to_string(),
    }
}

/// Pairs that react dangerously. Every other pair of built-in chemicals is compatible.
const INCOMPATIBLE: [(&str, &str); 11] = [
    ("chlorine", "muriatic_acid"),
    ("muriatic_acid", "sodium_bicarbonate"),
    ("muriatic_acid", "calcium_hypochlorite"),
    ("muriatic_acid", "soda_ash"),
    ("muriatic_acid", "sodium_thiosulfate"),
    ("muriatic_acid", "bromine"),
    ("sodium_thiosulfate", "chlorine"),
    ("sodium_thiosulfate", "calcium_hypochlorite"),
    ("sodium_thiosulfate", "bromine"),
    ("bromine", "chlorine"),
    ("bromine", "calcium_hypochlorite"),
];

fn default_store() -> SafetyStore {
    let chemicals: BTreeMap<String, ChemicalSafetyRecord> = [
        (
            "chlorine",
            record(
                "Chlorine",
                "Cl₂",
                3,
                &[
                    "Wear chemical-resistant gloves and eye protection",
                    "Use in a well-ventilated area",
                    "Never mix with acids or other chemicals",
                    "Add chemical to water, never water to chemical",
                ],
                "Store in a cool, dry, ventilated place away from acids and direct sunlight",
                "Skin or eye contact: flush with water for 15 minutes. Inhalation: move to fresh air. Seek medical attention.",
            ),
        ),
        (
            "muriatic_acid",
            record(
                "Muriatic Acid (Hydrochloric Acid)",
                "HCl",
                3,
                &[
                    "Wear acid-resistant gloves, goggles and protective clothing",
                    "Pour slowly into the deep end with the pump running",
                    "Always add acid to water, never water to acid",
                    "Keep away from chlorine products",
                ],
                "Store upright in the original container in a ventilated area away from chlorine and bases",
                "Skin or eye contact: flush with water for at least 15 minutes. Do not induce vomiting if swallowed. Seek medical attention immediately.",
            ),
        ),
        (
            "sodium_bicarbonate",
            record(
                "Sodium Bicarbonate (Baking Soda)",
                "NaHCO₃",
                1,
                &[
                    "Avoid creating dust",
                    "Broadcast over the surface with the pump running",
                ],
                "Keep the container closed in a dry place",
                "Eye contact: rinse with water. Seek medical attention if irritation persists.",
            ),
        ),
        (
            "calcium_hypochlorite",
            record(
                "Calcium Hypochlorite",
                "Ca(ClO)₂",
                3,
                &[
                    "Wear gloves and eye protection",
                    "Pre-dissolve in a bucket of pool water before adding",
                    "Never mix with other chemicals, especially acids or organics",
                    "Keep away from heat and flame",
                ],
                "Store in a cool, dry place in the original container, away from acids, organics and other pool chemicals",
                "Skin or eye contact: flush with water for 15 minutes. Inhalation: move to fresh air. In case of fire, use large amounts of water.",
            ),
        ),
        (
            "cyanuric_acid",
            record(
                "Cyanuric Acid",
                "C₃H₃N₃O₃",
                1,
                &[
                    "Avoid inhaling dust",
                    "Dissolve slowly through the skimmer or a sock in front of a return",
                ],
                "Store in a dry place with the container closed",
                "Eye contact: rinse with water. Inhalation: move to fresh air.",
            ),
        ),
        (
            "soda_ash",
            record(
                "Soda Ash (Sodium Carbonate)",
                "Na₂CO₃",
                2,
                &[
                    "Wear gloves and eye protection",
                    "Pre-dissolve in water and add slowly to avoid clouding",
                    "Keep away from acids",
                ],
                "Store in a dry place away from acids",
                "Eye contact: flush with water for 15 minutes. Skin contact: wash with soap and water.",
            ),
        ),
        (
            "calcium_chloride",
            record(
                "Calcium Chloride",
                "CaCl₂",
                2,
                &[
                    "Wear gloves and eye protection",
                    "Pre-dissolve in a bucket of water; the solution gets hot",
                    "Add slowly around the pool perimeter",
                ],
                "Keep tightly closed in a dry place; the product absorbs moisture",
                "Eye contact: flush with water for 15 minutes. Skin contact: rinse with water.",
            ),
        ),
        (
            "sodium_thiosulfate",
            record(
                "Sodium Thiosulfate",
                "Na₂S₂O₃",
                1,
                &[
                    "Add small amounts and retest before adding more",
                    "Keep away from acids and chlorine products",
                ],
                "Store in a cool, dry place away from acids and oxidizers",
                "Eye contact: rinse with water. If swallowed, rinse mouth and drink water.",
            ),
        ),
        (
            "sodium_chloride",
            record(
                "Pool Salt (Sodium Chloride)",
                "NaCl",
                1,
                &[
                    "Broadcast over the surface and brush until dissolved",
                    "Turn off the salt cell until the salt has dissolved",
                ],
                "Store in a dry place",
                "Eye contact: rinse with water.",
            ),
        ),
        (
            "bromine",
            record(
                "Bromine Tablets (BCDMH)",
                "C₅H₆BrClN₂O₂",
                3,
                &[
                    "Wear gloves and eye protection",
                    "Use only in a bromine feeder or floater",
                    "Never mix with chlorine products or acids",
                ],
                "Store in a cool, dry, ventilated place away from chlorine products and acids",
                "Skin or eye contact: flush with water for 15 minutes. Inhalation: move to fresh air. Seek medical attention.",
            ),
        ),
    ]
    .into_iter()
    .map(|(id, r)| (id.to_string(), r))
    .collect();

    let mut compatibility: BTreeMap<String, BTreeMap<String, u8>> = BTreeMap::new();
    for a in chemicals.keys() {
        for b in chemicals.keys() {
            if a != b {
                compatibility.entry(a.clone()).or_default().insert(b.clone(), 1);
            }
        }
    }
    for (a, b) in INCOMPATIBLE {
        compatibility.entry(a.to_string()).or_default().insert(b.to_string(), 0);
        compatibility.entry(b.to_string()).or_default().insert(a.to_string(), 0);
    }

    SafetyStore {
        chemicals,
        compatibility,
    }
}
