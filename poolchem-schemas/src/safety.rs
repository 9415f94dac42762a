use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handling and hazard information for one treatment chemical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalSafetyRecord {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemical_formula: Option<String>,
    pub hazard_rating: u8,
    pub safety_precautions: Vec<String>,
    #[serde(default)]
    pub storage_guidelines: String,
    #[serde(default)]
    pub emergency_procedures: String,
}

/// On-disk shape of the chemical safety database.
///
/// `compatibility[a][b]` is `1` when the two chemicals may be handled
/// together and `0` when they must be kept apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyStore {
    pub chemicals: BTreeMap<String, ChemicalSafetyRecord>,
    #[serde(default)]
    pub compatibility: BTreeMap<String, BTreeMap<String, u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_store_layout() {
        let raw = r#"{
            "chemicals": {
                "chlorine": {
                    "name": "Chlorine",
                    "chemical_formula": "Cl2",
                    "hazard_rating": 3,
                    "safety_precautions": ["Wear gloves"],
                    "storage_guidelines": "Cool, dry place",
                    "emergency_procedures": "Flush with water"
                }
            },
            "compatibility": { "chlorine": { "muriatic_acid": 0 } }
        }"#;
        let store: SafetyStore = serde_json::from_str(raw).unwrap();
        let chlorine = &store.chemicals["chlorine"];
        assert_eq!(chlorine.display_name, "Chlorine");
        assert_eq!(chlorine.hazard_rating, 3);
        assert_eq!(store.compatibility["chlorine"]["muriatic_acid"], 0);
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let raw = r#"{"chemicals": {"salt": {"name": "Salt", "hazard_rating": 1, "safety_precautions": []}}}"#;
        let store: SafetyStore = serde_json::from_str(raw).unwrap();
        assert!(store.compatibility.is_empty());
        assert!(store.chemicals["salt"].chemical_formula.is_none());
        assert!(store.chemicals["salt"].storage_guidelines.is_empty());
    }
}
