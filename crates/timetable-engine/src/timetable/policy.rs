//! Deadline policy table
//!
//! Maps (case-type family, procedure type) to named business-day offsets.
//! Built once from configuration; every malformed entry is reported at
//! load time so the engine never computes with a bad row.

use shared_types::{AppError, FamilyConfig, PolicyConfig};
use std::collections::{BTreeMap, HashMap};

/// One resolved row: deadline name -> business days from case start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRow {
    pub family: String,
    /// `None` for expedited families, whose row ignores procedure type.
    pub procedure: Option<String>,
    pub deadlines: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FamilyPolicy {
    Expedited(PolicyRow),
    ByProcedure(BTreeMap<String, PolicyRow>),
}

/// Immutable, validated deadline policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlinePolicyTable {
    default_procedure: String,
    case_types: BTreeMap<String, String>,
    families: BTreeMap<String, FamilyPolicy>,
}

impl DeadlinePolicyTable {
    /// Validate a raw policy config. Field error paths are relative to the
    /// `[policy]` section.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, AppError> {
        let mut errors = HashMap::new();

        if config.default_procedure.trim().is_empty() {
            errors.insert(
                "default_procedure".to_string(),
                "Default procedure type is required".to_string(),
            );
        }

        for (case_type, family) in &config.case_types {
            if !config.families.contains_key(family) {
                errors.insert(
                    format!("case_types.{case_type}"),
                    format!("Case type refers to unknown family '{family}'"),
                );
            }
        }

        let mut families = BTreeMap::new();
        for (name, family) in &config.families {
            if let Some(policy) = build_family(name, family, &mut errors) {
                families.insert(name.clone(), policy);
            }
        }

        if !errors.is_empty() {
            return Err(AppError::invalid_configuration(
                "Invalid deadline policy table",
                errors,
            ));
        }

        Ok(Self {
            default_procedure: config.default_procedure.clone(),
            case_types: config.case_types.clone(),
            families,
        })
    }

    /// Find the row that applies to a case.
    ///
    /// Expedited families ignore `procedure_type`. Otherwise a missing or
    /// blank procedure falls back to the default procedure. `None` means no
    /// timetable applies, which is not an error.
    pub fn resolve(&self, case_type: &str, procedure_type: Option<&str>) -> Option<&PolicyRow> {
        let family = self.case_types.get(case_type)?;
        match self.families.get(family)? {
            FamilyPolicy::Expedited(row) => Some(row),
            FamilyPolicy::ByProcedure(rows) => {
                let procedure = procedure_type
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .unwrap_or(&self.default_procedure);
                rows.get(procedure)
            }
        }
    }

    pub fn family_of(&self, case_type: &str) -> Option<&str> {
        self.case_types.get(case_type).map(String::as_str)
    }

    pub fn is_expedited(&self, case_type: &str) -> bool {
        self.family_of(case_type)
            .and_then(|f| self.families.get(f))
            .is_some_and(|p| matches!(p, FamilyPolicy::Expedited(_)))
    }

    /// Case type -> family, in case type order.
    pub fn case_types(&self) -> impl Iterator<Item = (&str, &str)> {
        self.case_types
            .iter()
            .map(|(case_type, family)| (case_type.as_str(), family.as_str()))
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    pub fn default_procedure(&self) -> &str {
        &self.default_procedure
    }
}

fn build_family(
    name: &str,
    family: &FamilyConfig,
    errors: &mut HashMap<String, String>,
) -> Option<FamilyPolicy> {
    let path = format!("families.{name}");

    if family.expedited {
        if !family.procedures.is_empty() {
            errors.insert(
                format!("{path}.procedures"),
                "Expedited families use a single deadlines row, not per-procedure rows"
                    .to_string(),
            );
        }
        let row = build_row(&format!("{path}.deadlines"), &family.deadlines, errors)?;
        return Some(FamilyPolicy::Expedited(PolicyRow {
            family: name.to_string(),
            procedure: None,
            deadlines: row,
        }));
    }

    if !family.deadlines.is_empty() {
        errors.insert(
            format!("{path}.deadlines"),
            "Only expedited families may define a procedure-independent row".to_string(),
        );
    }
    if family.procedures.is_empty() {
        errors.insert(
            format!("{path}.procedures"),
            "Family defines no procedure rows".to_string(),
        );
        return None;
    }

    let mut rows = BTreeMap::new();
    let mut valid = true;
    for (procedure, offsets) in &family.procedures {
        match build_row(&format!("{path}.procedures.{procedure}"), offsets, errors) {
            Some(deadlines) => {
                rows.insert(
                    procedure.clone(),
                    PolicyRow {
                        family: name.to_string(),
                        procedure: Some(procedure.clone()),
                        deadlines,
                    },
                );
            }
            None => valid = false,
        }
    }
    valid.then_some(FamilyPolicy::ByProcedure(rows))
}

fn build_row(
    path: &str,
    offsets: &BTreeMap<String, i64>,
    errors: &mut HashMap<String, String>,
) -> Option<BTreeMap<String, u32>> {
    if offsets.is_empty() {
        errors.insert(path.to_string(), "Row defines no deadlines".to_string());
        return None;
    }

    let mut row = BTreeMap::new();
    let mut valid = true;
    for (deadline, &offset) in offsets {
        match positive_offset(offset) {
            Some(days) => {
                row.insert(deadline.clone(), days);
            }
            None => {
                errors.insert(
                    format!("{path}.{deadline}"),
                    format!(
                        "Offset must be between 1 and {MAX_OFFSET_DAYS} business days, got {offset}"
                    ),
                );
                valid = false;
            }
        }
    }
    valid.then_some(row)
}

/// Largest accepted offset, roughly ten years of business days.
pub const MAX_OFFSET_DAYS: u32 = 2_600;

/// Offsets are strictly positive and at most [`MAX_OFFSET_DAYS`].
fn positive_offset(offset: i64) -> Option<u32> {
    u32::try_from(offset)
        .ok()
        .filter(|days| (1..=MAX_OFFSET_DAYS).contains(days))
}
