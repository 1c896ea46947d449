// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    FilterCriteria, Incident, IncidentPriority, IncidentStatus, StatusCounts, filter_incidents,
};

/// View-local state for the incident list: the loaded records plus the
/// active criteria. One instance per session; nothing is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    records: Vec<Incident>,
    criteria: FilterCriteria,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    SetSearch(String),
    SetStatusFilter(Option<IncidentStatus>),
    SetPriorityFilter(Option<IncidentPriority>),
    ClearFilters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    CriteriaChanged(FilterCriteria),
    FiltersCleared,
}

impl ListState {
    pub fn new(records: Vec<Incident>) -> Self {
        Self {
            records,
            criteria: FilterCriteria::default(),
        }
    }

    pub fn records(&self) -> &[Incident] {
        &self.records
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// The filtered view, recomputed synchronously on every call.
    pub fn visible(&self) -> Vec<Incident> {
        filter_incidents(&self.records, &self.criteria)
    }

    /// Tile counts come from the full set, not the filtered view.
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.records)
    }

    pub fn dispatch(&mut self, command: ListCommand) -> Vec<ListEvent> {
        match command {
            ListCommand::SetSearch(term) => {
                self.criteria.search_term = term;
                vec![ListEvent::CriteriaChanged(self.criteria.clone())]
            }
            ListCommand::SetStatusFilter(status) => {
                self.criteria.status = status;
                vec![ListEvent::CriteriaChanged(self.criteria.clone())]
            }
            ListCommand::SetPriorityFilter(priority) => {
                self.criteria.priority = priority;
                vec![ListEvent::CriteriaChanged(self.criteria.clone())]
            }
            ListCommand::ClearFilters => {
                self.criteria = FilterCriteria::default();
                vec![
                    ListEvent::CriteriaChanged(self.criteria.clone()),
                    ListEvent::FiltersCleared,
                ]
            }
        }
    }
}
