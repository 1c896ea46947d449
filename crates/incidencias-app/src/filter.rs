// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{Incident, IncidentPriority, IncidentStatus};

/// Search/filter inputs for the incident list view. `None` means the
/// "all" option of the corresponding dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterCriteria {
    pub search_term: String,
    pub status: Option<IncidentStatus>,
    pub priority: Option<IncidentPriority>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.status.is_none() && self.priority.is_none()
    }
}

/// Applies the three predicates conjunctively, preserving the relative
/// order of surviving records. Pure; the input is never mutated.
pub fn filter_incidents(records: &[Incident], criteria: &FilterCriteria) -> Vec<Incident> {
    records
        .iter()
        .filter(|record| matches(record, criteria))
        .cloned()
        .collect()
}

pub fn matches(record: &Incident, criteria: &FilterCriteria) -> bool {
    if !criteria.search_term.is_empty() && !matches_search(record, &criteria.search_term) {
        return false;
    }
    if let Some(status) = criteria.status
        && record.status != status
    {
        return false;
    }
    if let Some(priority) = criteria.priority
        && record.priority != priority
    {
        return false;
    }
    true
}

fn matches_search(record: &Incident, term: &str) -> bool {
    let needle = term.to_lowercase();
    if record.title.to_lowercase().contains(&needle) {
        return true;
    }
    if record.description.to_lowercase().contains(&needle) {
        return true;
    }
    // A record without a student never matches on student name.
    record
        .student_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(&needle))
}
