// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentKind {
    Academic,
    Disciplinary,
    Infrastructure,
    Administrative,
    Security,
}

impl IncidentKind {
    pub const ALL: [Self; 5] = [
        Self::Academic,
        Self::Disciplinary,
        Self::Infrastructure,
        Self::Administrative,
        Self::Security,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Disciplinary => "disciplinary",
            Self::Infrastructure => "infrastructure",
            Self::Administrative => "administrative",
            Self::Security => "security",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "academic" => Some(Self::Academic),
            "disciplinary" => Some(Self::Disciplinary),
            "infrastructure" => Some(Self::Infrastructure),
            "administrative" => Some(Self::Administrative),
            "security" => Some(Self::Security),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Academic => "Académica",
            Self::Disciplinary => "Disciplinaria",
            Self::Infrastructure => "Infraestructura",
            Self::Administrative => "Administrativa",
            Self::Security => "Seguridad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentPriority {
    Low,
    Medium,
    High,
}

impl IncidentPriority {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Baja",
            Self::Medium => "Media",
            Self::High => "Alta",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentStatus {
    Pending,
    InProgress,
    Resolved,
    Cancelled,
}

impl IncidentStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Resolved,
        Self::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::InProgress => "En Proceso",
            Self::Resolved => "Resuelta",
            Self::Cancelled => "Cancelada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Teacher,
    Coordinator,
    Director,
    Supervisor,
}

impl UserRole {
    pub const ALL: [Self; 4] = [
        Self::Teacher,
        Self::Coordinator,
        Self::Director,
        Self::Supervisor,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Coordinator => "coordinator",
            Self::Director => "director",
            Self::Supervisor => "supervisor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "teacher" => Some(Self::Teacher),
            "coordinator" => Some(Self::Coordinator),
            "director" => Some(Self::Director),
            "supervisor" => Some(Self::Supervisor),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Teacher => "Docente",
            Self::Coordinator => "Coordinador",
            Self::Director => "Director",
            Self::Supervisor => "Supervisor",
        }
    }
}

/// One reported school incident. Pure value type: the list view reads
/// it, nothing mutates it, and there is no deletion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub title: String,
    pub description: String,
    pub kind: IncidentKind,
    pub priority: IncidentPriority,
    pub status: IncidentStatus,
    pub student_name: Option<String>,
    pub reporter_name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Incident {
    /// Builds a record, rejecting an update timestamp earlier than creation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: IncidentId,
        title: impl Into<String>,
        description: impl Into<String>,
        kind: IncidentKind,
        priority: IncidentPriority,
        status: IncidentStatus,
        student_name: Option<String>,
        reporter_name: impl Into<String>,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Result<Self> {
        if updated_at < created_at {
            bail!(
                "incident {} updated_at precedes created_at",
                id.as_str()
            );
        }
        Ok(Self {
            id,
            title: title.into(),
            description: description.into(),
            kind,
            priority,
            status,
            student_name,
            reporter_name: reporter_name.into(),
            created_at,
            updated_at,
        })
    }
}

/// Profile shape returned by the Identity Service for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    pub role: UserRole,
    pub school_id: SchoolId,
}

/// Summary tile counts. Always tallied from the full record set, never
/// from a filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub high_priority: usize,
}

impl StatusCounts {
    pub fn tally(records: &[Incident]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.status {
                IncidentStatus::Pending => counts.pending += 1,
                IncidentStatus::InProgress => counts.in_progress += 1,
                IncidentStatus::Resolved => counts.resolved += 1,
                IncidentStatus::Cancelled => {}
            }
            if record.priority == IncidentPriority::High {
                counts.high_priority += 1;
            }
        }
        counts
    }
}

/// The three demonstration records the list page ships with. Creation
/// is simulated, so these are the whole data set in demo mode.
pub fn sample_incidents(now: OffsetDateTime) -> Vec<Incident> {
    vec![
        Incident {
            id: IncidentId::new("2024-001"),
            title: "Estudiante se lastimó en el patio".to_owned(),
            description: "Durante el recreo, un estudiante se cayó y se lastimó la rodilla."
                .to_owned(),
            kind: IncidentKind::Security,
            priority: IncidentPriority::High,
            status: IncidentStatus::InProgress,
            student_name: Some("Juan Pérez García".to_owned()),
            reporter_name: "María López".to_owned(),
            created_at: now - Duration::hours(2),
            updated_at: now - Duration::hours(1),
        },
        Incident {
            id: IncidentId::new("2024-002"),
            title: "Problema con proyector del aula 201".to_owned(),
            description: "El proyector del aula 201 no enciende y está afectando las clases."
                .to_owned(),
            kind: IncidentKind::Infrastructure,
            priority: IncidentPriority::Medium,
            status: IncidentStatus::Pending,
            student_name: None,
            reporter_name: "Carlos Rodríguez".to_owned(),
            created_at: now - Duration::days(1),
            updated_at: now - Duration::days(1),
        },
        Incident {
            id: IncidentId::new("2024-003"),
            title: "Bullying reportado en 3er grado".to_owned(),
            description: "Padres de familia reportan situación de acoso escolar.".to_owned(),
            kind: IncidentKind::Disciplinary,
            priority: IncidentPriority::High,
            status: IncidentStatus::Resolved,
            student_name: Some("Ana Martínez".to_owned()),
            reporter_name: "Directora Sandra".to_owned(),
            created_at: now - Duration::days(3),
            updated_at: now - Duration::days(1),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        Incident, IncidentKind, IncidentPriority, IncidentStatus, StatusCounts, UserRole,
        sample_incidents,
    };
    use crate::ids::IncidentId;
    use time::OffsetDateTime;

    #[test]
    fn status_wire_values_round_trip() {
        for status in IncidentStatus::ALL {
            assert_eq!(IncidentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(IncidentStatus::parse("archived"), None);
    }

    #[test]
    fn kind_and_priority_and_role_round_trip() {
        for kind in IncidentKind::ALL {
            assert_eq!(IncidentKind::parse(kind.as_str()), Some(kind));
        }
        for priority in IncidentPriority::ALL {
            assert_eq!(IncidentPriority::parse(priority.as_str()), Some(priority));
        }
        for role in UserRole::ALL {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn labels_are_spanish_display_strings() {
        assert_eq!(IncidentStatus::InProgress.label(), "En Proceso");
        assert_eq!(IncidentKind::Disciplinary.label(), "Disciplinaria");
        assert_eq!(IncidentPriority::High.label(), "Alta");
        assert_eq!(UserRole::Teacher.label(), "Docente");
    }

    #[test]
    fn incident_rejects_update_before_creation() {
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        let result = Incident::new(
            IncidentId::new("x-1"),
            "Vidrio roto",
            "",
            IncidentKind::Infrastructure,
            IncidentPriority::Low,
            IncidentStatus::Pending,
            None,
            "Conserje",
            now,
            now - time::Duration::minutes(5),
        );
        assert!(result.is_err());
    }

    #[test]
    fn sample_incidents_match_demonstration_set() {
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(30);
        let records = sample_incidents(now);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, IncidentId::new("2024-001"));
        assert_eq!(records[2].status, IncidentStatus::Resolved);
        for record in &records {
            assert!(record.updated_at >= record.created_at);
        }
    }

    #[test]
    fn tally_counts_statuses_and_high_priority() {
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(30);
        let counts = StatusCounts::tally(&sample_incidents(now));
        assert_eq!(
            counts,
            StatusCounts {
                pending: 1,
                in_progress: 1,
                resolved: 1,
                high_priority: 2,
            }
        );
    }
}
