// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::{Profile, UserRole};

/// Only official addresses may register an account.
pub const OFFICIAL_EMAIL_DOMAIN: &str = "@sep.gob.mx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    PersonalInfo,
    Credentials,
    Institution,
}

impl WizardStep {
    pub const fn number(self) -> u8 {
        match self {
            Self::PersonalInfo => 1,
            Self::Credentials => 2,
            Self::Institution => 3,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::PersonalInfo => "Información Personal",
            Self::Credentials => "Configuración de Acceso",
            Self::Institution => "Información Institucional",
        }
    }
}

/// Non-credential profile fields attached to the sign-up call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileMetadata {
    pub full_name: String,
    pub role: UserRole,
    pub school_cct: String,
    pub school_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub metadata: ProfileMetadata,
}

/// Seam to the external Identity Service. The HTTP client and the
/// in-memory test fake both implement it. Covers the full account
/// lifecycle: the wizard only calls `sign_up`, the session commands
/// use the rest.
pub trait IdentityGateway {
    fn sign_up(&mut self, request: &SignUpRequest) -> Result<()>;
    fn sign_in(&mut self, email: &str, password: &str) -> Result<()>;
    fn sign_out(&mut self) -> Result<()>;
    fn current_profile(&self) -> Result<Option<Profile>>;
}

/// In-progress registration. Nothing leaves the process until
/// `submit` succeeds; until then the draft only lives in this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub role: UserRole,
    pub school_cct: String,
    pub school_name: String,
    step: WizardStep,
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            full_name: String::new(),
            role: UserRole::Teacher,
            school_cct: String::new(),
            school_name: String::new(),
            step: WizardStep::PersonalInfo,
        }
    }
}

impl RegistrationDraft {
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Moves forward one step after the current step's validator
    /// passes. A violation leaves the draft on the same step.
    pub fn advance(&mut self) -> Result<()> {
        match self.step {
            WizardStep::PersonalInfo => {
                self.validate_personal_info()?;
                self.step = WizardStep::Credentials;
            }
            WizardStep::Credentials => {
                self.validate_credentials()?;
                self.step = WizardStep::Institution;
            }
            WizardStep::Institution => {
                bail!("el último paso se confirma con enviar, no con continuar");
            }
        }
        Ok(())
    }

    /// Back navigation is unconditional and retains every field.
    pub fn back(&mut self) {
        self.step = match self.step {
            WizardStep::PersonalInfo => WizardStep::PersonalInfo,
            WizardStep::Credentials => WizardStep::PersonalInfo,
            WizardStep::Institution => WizardStep::Credentials,
        };
    }

    /// Final submission: institution fields validate locally, then the
    /// full draft goes to the Identity Service. On failure the service
    /// error surfaces verbatim and the draft stays on the last step.
    pub fn submit(&mut self, gateway: &mut dyn IdentityGateway) -> Result<()> {
        self.validate_institution()?;
        gateway.sign_up(&SignUpRequest {
            email: self.email.clone(),
            password: self.password.clone(),
            metadata: ProfileMetadata {
                full_name: self.full_name.clone(),
                role: self.role,
                school_cct: self.school_cct.clone(),
                school_name: self.school_name.clone(),
            },
        })
    }

    fn validate_personal_info(&self) -> Result<()> {
        if self.full_name.trim().is_empty() || self.email.trim().is_empty() {
            bail!("Por favor completa todos los campos");
        }
        if !self.email.ends_with(OFFICIAL_EMAIL_DOMAIN) {
            bail!("Debes usar un correo oficial de la SEP ({OFFICIAL_EMAIL_DOMAIN})");
        }
        Ok(())
    }

    fn validate_credentials(&self) -> Result<()> {
        if self.password.is_empty() || self.confirm_password.is_empty() {
            bail!("Por favor completa todos los campos");
        }
        // Character count, not byte length.
        if self.password.chars().count() < 8 {
            bail!("La contraseña debe tener al menos 8 caracteres");
        }
        if self.password != self.confirm_password {
            bail!("Las contraseñas no coinciden");
        }
        Ok(())
    }

    fn validate_institution(&self) -> Result<()> {
        if self.school_cct.trim().is_empty() || self.school_name.trim().is_empty() {
            bail!("Por favor completa todos los campos");
        }
        Ok(())
    }
}
