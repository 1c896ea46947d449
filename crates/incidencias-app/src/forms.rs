// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use time::OffsetDateTime;

use crate::{Incident, IncidentId, IncidentKind, IncidentPriority, IncidentStatus};

/// The single-page report form. Kind and priority start unselected, so
/// they stay `None` until the user picks a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncidentFormInput {
    pub title: String,
    pub description: String,
    pub kind: Option<IncidentKind>,
    pub priority: Option<IncidentPriority>,
    pub student_name: String,
    pub student_grade: String,
    pub student_group: String,
    pub location: String,
    pub witnesses: String,
    pub immediate_actions: String,
}

impl IncidentFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            bail!("El título es requerido");
        }
        if self.description.trim().is_empty() {
            bail!("La descripción es requerida");
        }
        if self.kind.is_none() {
            bail!("El tipo de incidencia es requerido");
        }
        if self.priority.is_none() {
            bail!("La prioridad es requerida");
        }
        if self.location.trim().is_empty() {
            bail!("La ubicación es requerida");
        }
        Ok(())
    }

    /// Materializes the new record. Submission is simulated, so the
    /// caller owns the result; nothing is persisted.
    pub fn into_incident(
        self,
        id: IncidentId,
        reporter_name: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<Incident> {
        self.validate()?;
        let kind = self.kind.unwrap_or(IncidentKind::Administrative);
        let priority = self.priority.unwrap_or(IncidentPriority::Low);
        let student_name = match self.student_name.trim() {
            "" => None,
            name => Some(name.to_owned()),
        };
        Incident::new(
            id,
            self.title.trim(),
            self.description.trim(),
            kind,
            priority,
            IncidentStatus::Pending,
            student_name,
            reporter_name,
            now,
            now,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginFormInput {
    pub email: String,
    pub password: String,
}

impl LoginFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            bail!("Por favor completa todos los campos");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{IncidentFormInput, LoginFormInput};
    use crate::{IncidentId, IncidentKind, IncidentPriority, IncidentStatus};
    use time::OffsetDateTime;

    fn valid_form() -> IncidentFormInput {
        IncidentFormInput {
            title: "Fuga de agua en baños".to_owned(),
            description: "Fuga constante en el baño de segundo piso.".to_owned(),
            kind: Some(IncidentKind::Infrastructure),
            priority: Some(IncidentPriority::Medium),
            location: "Edificio B".to_owned(),
            ..IncidentFormInput::default()
        }
    }

    #[test]
    fn incident_form_requires_title_description_kind_priority_location() {
        let mut form = valid_form();
        form.title = "  ".to_owned();
        assert!(form.validate().is_err());

        let mut form = valid_form();
        form.description.clear();
        assert!(form.validate().is_err());

        let mut form = valid_form();
        form.kind = None;
        assert!(
            form.validate()
                .expect_err("missing kind")
                .to_string()
                .contains("tipo de incidencia")
        );

        let mut form = valid_form();
        form.priority = None;
        assert!(form.validate().is_err());

        let mut form = valid_form();
        form.location.clear();
        assert!(form.validate().is_err());

        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn into_incident_builds_a_pending_record() {
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(30);
        let mut form = valid_form();
        form.student_name = "  ".to_owned();
        let incident = form
            .into_incident(IncidentId::new("2024-010"), "Prof. Gómez", now)
            .expect("valid form should convert");

        assert_eq!(incident.status, IncidentStatus::Pending);
        assert_eq!(incident.student_name, None);
        assert_eq!(incident.reporter_name, "Prof. Gómez");
        assert_eq!(incident.created_at, incident.updated_at);
    }

    #[test]
    fn into_incident_keeps_a_named_student() {
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(30);
        let mut form = valid_form();
        form.student_name = "Luis Hernández".to_owned();
        let incident = form
            .into_incident(IncidentId::new("2024-011"), "Prof. Gómez", now)
            .expect("valid form should convert");
        assert_eq!(incident.student_name.as_deref(), Some("Luis Hernández"));
    }

    #[test]
    fn login_form_requires_both_fields() {
        assert!(LoginFormInput::default().validate().is_err());
        let form = LoginFormInput {
            email: "x@sep.gob.mx".to_owned(),
            password: "secreta123".to_owned(),
        };
        assert!(form.validate().is_ok());
    }
}
