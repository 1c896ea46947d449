// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use incidencias_app::{
    CompletionBackend, IdentityGateway, Incident, IncidentId, IncidentKind, IncidentPriority,
    IncidentStatus, Profile, SignUpRequest,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const INCIDENT_TITLES: [(&str, IncidentKind); 10] = [
    ("Bajo rendimiento en matemáticas", IncidentKind::Academic),
    ("Tareas incompletas recurrentes", IncidentKind::Academic),
    ("Conflicto entre alumnos en el recreo", IncidentKind::Disciplinary),
    ("Uso de celular durante clase", IncidentKind::Disciplinary),
    ("Fuga de agua en los sanitarios", IncidentKind::Infrastructure),
    ("Ventana rota en el aula 3B", IncidentKind::Infrastructure),
    ("Documentación de inscripción faltante", IncidentKind::Administrative),
    ("Retraso en entrega de boletas", IncidentKind::Administrative),
    ("Persona ajena en el perímetro escolar", IncidentKind::Security),
    ("Portón de acceso sin candado", IncidentKind::Security),
];

const STUDENT_NAMES: [&str; 8] = [
    "Juan Pérez García",
    "Ana Martínez",
    "Luis Hernández Cruz",
    "Sofía Ramírez",
    "Diego Torres Luna",
    "Valentina Flores",
    "Mateo Sánchez Ríos",
    "Camila Ortiz",
];

const REPORTER_NAMES: [&str; 6] = [
    "Prof. Roberto Sánchez",
    "Prof. Carmen López",
    "Mtra. Gabriela Ruiz",
    "Mtro. Andrés Castillo",
    "Dir. Patricia Mendoza",
    "Coord. Felipe Aguilar",
];

const DESCRIPTION_PHRASES: [&str; 8] = [
    "Se detectó durante la jornada escolar",
    "Reportado por el personal docente",
    "Requiere seguimiento con los padres de familia",
    "Se notificó a la dirección del plantel",
    "Pendiente de dictamen por parte de la supervisión",
    "El área quedó acordonada como medida preventiva",
    "Se levantó acta informativa",
    "Se canalizó al departamento correspondiente",
];

const PRIORITIES: [IncidentPriority; 3] = [
    IncidentPriority::Low,
    IncidentPriority::Medium,
    IncidentPriority::High,
];

const STATUSES: [IncidentStatus; 4] = [
    IncidentStatus::Pending,
    IncidentStatus::InProgress,
    IncidentStatus::Resolved,
    IncidentStatus::Cancelled,
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic generator of plausible school incident records.
#[derive(Debug, Clone)]
pub struct IncidentFaker {
    rng: DeterministicRng,
    sequence: u32,
}

impl IncidentFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            sequence: 0,
        }
    }

    pub fn incident(&mut self) -> Incident {
        self.sequence += 1;
        let (title, kind) = INCIDENT_TITLES[self.rng.int_n(INCIDENT_TITLES.len())];
        let priority = PRIORITIES[self.rng.int_n(PRIORITIES.len())];
        let status = STATUSES[self.rng.int_n(STATUSES.len())];

        // Administrative and infrastructure records usually have no
        // student attached.
        let student_name = match kind {
            IncidentKind::Infrastructure | IncidentKind::Administrative => None,
            _ => Some(STUDENT_NAMES[self.rng.int_n(STUDENT_NAMES.len())].to_owned()),
        };

        let created_at = self.datetime_between(
            reference_now() - Duration::days(180),
            reference_now() - Duration::days(1),
        );
        let updated_at = self.datetime_between(created_at, reference_now());

        Incident::new(
            IncidentId::new(format!("{REFERENCE_YEAR}-{:03}", self.sequence)),
            title,
            self.description(),
            kind,
            priority,
            status,
            student_name,
            REPORTER_NAMES[self.rng.int_n(REPORTER_NAMES.len())],
            created_at,
            updated_at,
        )
        .expect("generated timestamps are ordered")
    }

    pub fn incidents(&mut self, count: usize) -> Vec<Incident> {
        (0..count).map(|_| self.incident()).collect()
    }

    fn description(&mut self) -> String {
        let first = DESCRIPTION_PHRASES[self.rng.int_n(DESCRIPTION_PHRASES.len())];
        let second = DESCRIPTION_PHRASES[self.rng.int_n(DESCRIPTION_PHRASES.len())];
        format!("{first}. {second}.")
    }

    fn datetime_between(&mut self, start: OffsetDateTime, end: OffsetDateTime) -> OffsetDateTime {
        let start_ts = start.unix_timestamp();
        let end_ts = end.unix_timestamp();
        if end_ts <= start_ts {
            return start;
        }
        let span = (end_ts - start_ts) as u64;
        let offset = self.rng.next_u64() % (span + 1);
        OffsetDateTime::from_unix_timestamp(start_ts + offset as i64).expect("valid unix timestamp")
    }
}

/// In-memory stand-in for the identity service. Records sign-up and
/// sign-in calls, tracks one session, and fails with a scripted
/// message when configured to.
#[derive(Debug, Default)]
pub struct FakeIdentity {
    requests: Vec<SignUpRequest>,
    logins: Vec<(String, String)>,
    profile: Option<Profile>,
    signed_in: bool,
    failure: Option<String>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_owned()),
            ..Self::default()
        }
    }

    /// The profile `current_profile` serves once signed in.
    pub fn with_profile(profile: Profile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> &[SignUpRequest] {
        &self.requests
    }

    pub fn logins(&self) -> &[(String, String)] {
        &self.logins
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }
}

impl IdentityGateway for FakeIdentity {
    fn sign_up(&mut self, request: &SignUpRequest) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(anyhow!("{message}"));
        }
        self.requests.push(request.clone());
        Ok(())
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(anyhow!("{message}"));
        }
        self.logins.push((email.to_owned(), password.to_owned()));
        self.signed_in = true;
        Ok(())
    }

    fn sign_out(&mut self) -> Result<()> {
        self.signed_in = false;
        Ok(())
    }

    fn current_profile(&self) -> Result<Option<Profile>> {
        if !self.signed_in {
            return Ok(None);
        }
        Ok(self.profile.clone())
    }
}

enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// Scripted completion backend. Replies are consumed in order; an
/// exhausted script fails, which keeps tests honest about how many
/// exchanges they expect.
#[derive(Default)]
pub struct FakeAssistant {
    script: RefCell<VecDeque<ScriptedReply>>,
    prompts: RefCell<Vec<String>>,
}

impl FakeAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_with(self, text: &str) -> Self {
        self.script
            .borrow_mut()
            .push_back(ScriptedReply::Text(text.to_owned()));
        self
    }

    pub fn fail_with(self, message: &str) -> Self {
        self.script
            .borrow_mut()
            .push_back(ScriptedReply::Failure(message.to_owned()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl CompletionBackend for FakeAssistant {
    fn complete(&self, message: &str) -> Result<String> {
        self.prompts.borrow_mut().push(message.to_owned());
        match self.script.borrow_mut().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(message)) => Err(anyhow!("{message}")),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}

pub fn fixture_datetime() -> OffsetDateTime {
    midnight_utc(REFERENCE_YEAR, Month::February, 19)
}

fn reference_now() -> OffsetDateTime {
    midnight_utc(REFERENCE_YEAR, Month::June, 1)
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).expect("valid calendar date");
    let midnight = Time::from_hms(0, 0, 0).expect("valid midnight");
    date.with_time(midnight).assume_utc()
}

#[cfg(test)]
mod tests {
    use super::{FakeAssistant, FakeIdentity, IncidentFaker};
    use incidencias_app::{
        CompletionBackend, IdentityGateway, IncidentKind, Profile, ProfileMetadata, SchoolId,
        SignUpRequest, UserRole,
    };
    use std::collections::BTreeSet;

    fn sample_request() -> SignUpRequest {
        SignUpRequest {
            email: "maestra@sep.gob.mx".to_owned(),
            password: "contrasena-larga".to_owned(),
            metadata: ProfileMetadata {
                full_name: "María García López".to_owned(),
                role: UserRole::Teacher,
                school_cct: "09DPR1234X".to_owned(),
                school_name: "Escuela Primaria Benito Juárez".to_owned(),
            },
        }
    }

    #[test]
    fn same_seed_generates_the_same_records() {
        let mut left = IncidentFaker::new(42);
        let mut right = IncidentFaker::new(42);
        assert_eq!(left.incident(), right.incident());
    }

    #[test]
    fn generated_records_are_well_formed() {
        let mut faker = IncidentFaker::new(7);
        for record in faker.incidents(25) {
            assert!(!record.title.is_empty());
            assert!(!record.description.is_empty());
            assert!(!record.reporter_name.is_empty());
            assert!(record.created_at <= record.updated_at);
            if matches!(
                record.kind,
                IncidentKind::Infrastructure | IncidentKind::Administrative
            ) {
                assert_eq!(record.student_name, None);
            }
        }
    }

    #[test]
    fn ids_are_sequential_and_unique() {
        let mut faker = IncidentFaker::new(3);
        let ids: BTreeSet<String> = faker
            .incidents(10)
            .into_iter()
            .map(|record| record.id.as_str().to_owned())
            .collect();
        assert_eq!(ids.len(), 10);
        assert!(ids.contains("2026-001"));
        assert!(ids.contains("2026-010"));
    }

    #[test]
    fn fake_identity_records_requests() {
        let mut gateway = FakeIdentity::new();
        gateway.sign_up(&sample_request()).expect("should accept");
        assert_eq!(gateway.requests().len(), 1);
        assert_eq!(gateway.requests()[0].email, "maestra@sep.gob.mx");
    }

    #[test]
    fn fake_identity_fails_with_the_scripted_message() {
        let mut gateway = FakeIdentity::failing("User already registered");
        let error = gateway
            .sign_up(&sample_request())
            .expect_err("scripted failure expected");
        assert_eq!(error.to_string(), "User already registered");
        assert!(gateway.requests().is_empty());
    }

    #[test]
    fn fake_identity_tracks_one_session() {
        let mut gateway = FakeIdentity::with_profile(Profile {
            full_name: "María García López".to_owned(),
            role: UserRole::Coordinator,
            school_id: SchoolId::new("09DPR1234X"),
        });
        assert_eq!(gateway.current_profile().expect("no failure"), None);

        gateway
            .sign_in("maestra@sep.gob.mx", "contrasena-larga")
            .expect("should accept");
        assert!(gateway.is_signed_in());
        assert_eq!(gateway.logins().len(), 1);
        let profile = gateway
            .current_profile()
            .expect("no failure")
            .expect("signed in");
        assert_eq!(profile.full_name, "María García López");

        gateway.sign_out().expect("sign out always passes");
        assert_eq!(gateway.current_profile().expect("no failure"), None);
    }

    #[test]
    fn fake_assistant_consumes_the_script_in_order() {
        let assistant = FakeAssistant::new()
            .reply_with("Primera respuesta")
            .fail_with("se cayó el servicio");

        assert_eq!(
            assistant.complete("hola").expect("first reply scripted"),
            "Primera respuesta"
        );
        assert!(assistant.complete("sigues ahí?").is_err());
        assert!(assistant.complete("?").is_err());
        assert_eq!(assistant.prompts().len(), 3);
    }
}
