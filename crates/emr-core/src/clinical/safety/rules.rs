use serde::{Deserialize, Serialize};

use super::domain::{ActivePrescription, SafetyAlert};

/// Default interaction rules: the keyed drug conflicts with each listed drug.
/// Direction matters; the reverse pairing only applies when listed separately.
const STANDARD_CONFLICT_RULES: &[(&str, &[&str])] = &[
    ("warfarin", &["aspirin", "ibuprofen", "naproxen"]),
    ("aspirin", &["warfarin", "heparin"]),
    ("metformin", &["alcohol"]),
    ("insulin", &["alcohol"]),
];

/// A single directed interaction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    pub drug: String,
    pub conflicts_with: Vec<String>,
}

/// Ordered set of interaction rules. Rule order decides nothing about the
/// reported conflicts, which follow prescription order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ConflictRule>", into = "Vec<ConflictRule>")]
pub struct ConflictTable {
    rules: Vec<ConflictRule>,
}

impl ConflictTable {
    pub fn new(rules: Vec<ConflictRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| ConflictRule {
                drug: rule.drug.to_lowercase(),
                conflicts_with: rule
                    .conflicts_with
                    .into_iter()
                    .map(|name| name.to_lowercase())
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn standard() -> Self {
        Self::new(
            STANDARD_CONFLICT_RULES
                .iter()
                .map(|(drug, conflicts)| ConflictRule {
                    drug: drug.to_string(),
                    conflicts_with: conflicts.iter().map(|name| name.to_string()).collect(),
                })
                .collect(),
        )
    }

    pub fn rules(&self) -> &[ConflictRule] {
        &self.rules
    }

    /// Conflicting names for every rule whose drug appears in `medication`.
    fn conflicts_for<'a>(&'a self, medication: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rules
            .iter()
            .filter(move |rule| medication.contains(rule.drug.as_str()))
            .flat_map(|rule| rule.conflicts_with.iter().map(String::as_str))
    }
}

impl From<Vec<ConflictRule>> for ConflictTable {
    fn from(rules: Vec<ConflictRule>) -> Self {
        Self::new(rules)
    }
}

impl From<ConflictTable> for Vec<ConflictRule> {
    fn from(table: ConflictTable) -> Self {
        table.rules
    }
}

impl Default for ConflictTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Only a missing or empty allergy text is clear. Blank comma entries survive the
/// split as empty strings, and an empty string is contained in every name.
pub(crate) fn allergy_alert(medication_name: &str, patient_allergies: Option<&str>) -> SafetyAlert {
    let Some(allergies) = patient_allergies.filter(|raw| !raw.is_empty()) else {
        return SafetyAlert::clear();
    };

    let medication = medication_name.to_lowercase();
    let matched = allergies
        .split(',')
        .map(|entry| entry.trim().to_lowercase())
        .find(|allergy| medication.contains(allergy.as_str()) || allergy.contains(&medication));

    match matched {
        Some(allergy) => SafetyAlert::raised(
            format!("WARNING: Patient is allergic to {allergy}!"),
            vec![allergy],
        ),
        None => SafetyAlert::clear(),
    }
}

pub(crate) fn conflict_alert(
    table: &ConflictTable,
    medication_name: &str,
    others: &[ActivePrescription],
) -> SafetyAlert {
    let medication = medication_name.to_lowercase();
    let mut conflicts: Vec<String> = Vec::new();

    for other in others.iter().filter(|prescription| prescription.is_active) {
        let other_name = other.medication_name.to_lowercase();
        let interacts = table
            .conflicts_for(&medication)
            .any(|conflicting| other_name.contains(conflicting));
        if interacts && !conflicts.contains(&other.medication_name) {
            conflicts.push(other.medication_name.clone());
        }
    }

    if conflicts.is_empty() {
        return SafetyAlert::clear();
    }

    SafetyAlert::raised(
        format!("WARNING: Potential conflict with: {}", conflicts.join(", ")),
        conflicts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_lowercased_and_ordered() {
        let table = ConflictTable::standard();
        let drugs: Vec<&str> = table.rules().iter().map(|rule| rule.drug.as_str()).collect();
        assert_eq!(drugs, ["warfarin", "aspirin", "metformin", "insulin"]);
    }

    #[test]
    fn custom_rules_are_normalized() {
        let table = ConflictTable::new(vec![ConflictRule {
            drug: "Clopidogrel".to_string(),
            conflicts_with: vec!["Omeprazole".to_string()],
        }]);
        let alert = conflict_alert(
            &table,
            "clopidogrel 75mg",
            &[ActivePrescription::active("OMEPRAZOLE 20mg")],
        );
        assert!(alert.has_alert());
        assert_eq!(alert.matches(), ["OMEPRAZOLE 20mg"]);
    }

    #[test]
    fn blank_allergy_entry_matches_any_medication() {
        let alert = allergy_alert("Ibuprofen", Some("penicillin,"));
        assert!(alert.has_alert());
        assert_eq!(alert.message(), "WARNING: Patient is allergic to !");
        assert_eq!(alert.matches(), [""]);
    }

    #[test]
    fn blank_medication_matches_first_allergy() {
        let alert = allergy_alert("", Some("aspirin, latex"));
        assert!(alert.has_alert());
        assert_eq!(alert.message(), "WARNING: Patient is allergic to aspirin!");
    }

    #[test]
    fn medication_name_is_lowercased_but_not_trimmed() {
        let alert = allergy_alert(" Aspirin ", Some("aspirin 81mg"));
        assert!(!alert.has_alert());
        assert!(allergy_alert(" Aspirin ", Some("aspirin")).has_alert());
    }

    #[test]
    fn table_loads_from_json_rule_list() {
        let table: ConflictTable = serde_json::from_str(
            r#"[{"drug": "Warfarin", "conflicts_with": ["Aspirin", "Ibuprofen", "Naproxen"]}]"#,
        )
        .expect("deserializes");
        assert_eq!(table.rules()[0].drug, "warfarin");
        assert_eq!(table.rules()[0].conflicts_with[2], "naproxen");
    }
}
