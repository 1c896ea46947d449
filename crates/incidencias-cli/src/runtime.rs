// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use incidencias_app::{
    ChatSession, CompletionBackend, IdentityGateway, Incident, IncidentFormInput, IncidentId,
    IncidentKind, IncidentPriority, IncidentStatus, ListCommand, ListState, LoginFormInput,
    RegistrationDraft, UserRole, WizardStep,
};
use std::io::{BufRead, Lines, Write};
use time::OffsetDateTime;

enum Flow {
    Continue,
    Quit,
}

/// Line-oriented console over the incident list and the assistant
/// chat. All state is session-local; quitting discards everything.
pub struct Shell<'a> {
    state: ListState,
    chat: ChatSession,
    assistant: &'a dyn CompletionBackend,
    identity: Option<&'a mut dyn IdentityGateway>,
}

impl<'a> Shell<'a> {
    pub fn new(
        records: Vec<Incident>,
        assistant: &'a dyn CompletionBackend,
        identity: Option<&'a mut dyn IdentityGateway>,
    ) -> Self {
        Self {
            state: ListState::new(records),
            chat: ChatSession::new(OffsetDateTime::now_utc()),
            assistant,
            identity,
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<()> {
        writeln!(
            output,
            "Sistema de Incidencias SEP. Escribe `help` para ver los comandos."
        )?;
        let mut lines = input.lines();
        loop {
            write!(output, "> ")?;
            output.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            match self.execute(line.trim(), &mut lines, output)? {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }
        Ok(())
    }

    fn execute<R: BufRead, W: Write>(
        &mut self,
        line: &str,
        lines: &mut Lines<R>,
        output: &mut W,
    ) -> Result<Flow> {
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match command {
            "" => {}
            "help" => print_help(output)?,
            "quit" | "exit" => return Ok(Flow::Quit),
            "list" => self.print_list(output)?,
            "search" => {
                self.state.dispatch(ListCommand::SetSearch(rest.to_owned()));
                self.print_list(output)?;
            }
            "status" => match parse_status(rest) {
                Ok(status) => {
                    self.state.dispatch(ListCommand::SetStatusFilter(status));
                    self.print_list(output)?;
                }
                Err(error) => writeln!(output, "{error}")?,
            },
            "priority" => match parse_priority(rest) {
                Ok(priority) => {
                    self.state
                        .dispatch(ListCommand::SetPriorityFilter(priority));
                    self.print_list(output)?;
                }
                Err(error) => writeln!(output, "{error}")?,
            },
            "clear" => {
                self.state.dispatch(ListCommand::ClearFilters);
                self.print_list(output)?;
            }
            "counts" => self.print_counts(output)?,
            "chat" => self.chat_command(rest, output)?,
            "reset" => {
                self.chat.clear(OffsetDateTime::now_utc());
                let transcript = self.chat.transcript();
                writeln!(output, "asistente: {}", transcript[0].content)?;
            }
            "new" => self.new_incident(lines, output)?,
            "register" => self.register(lines, output)?,
            "login" => self.login(lines, output)?,
            "logout" => self.logout(output)?,
            unknown => writeln!(output, "comando desconocido {unknown:?}; escribe `help`")?,
        }
        Ok(Flow::Continue)
    }

    fn print_list<W: Write>(&self, output: &mut W) -> Result<()> {
        let visible = self.state.visible();
        if visible.is_empty() {
            writeln!(output, "Sin resultados.")?;
            return Ok(());
        }
        for record in &visible {
            writeln!(
                output,
                "{}  [{}] [{}] {}",
                record.id,
                record.status.label(),
                record.priority.label(),
                record.title,
            )?;
            if let Some(student) = &record.student_name {
                writeln!(output, "          Alumno: {student}")?;
            }
        }
        writeln!(
            output,
            "{} de {} incidencias",
            visible.len(),
            self.state.records().len()
        )?;
        Ok(())
    }

    pub fn print_counts<W: Write>(&self, output: &mut W) -> Result<()> {
        let counts = self.state.counts();
        writeln!(output, "Pendientes: {}", counts.pending)?;
        writeln!(output, "En proceso: {}", counts.in_progress)?;
        writeln!(output, "Resueltas: {}", counts.resolved)?;
        writeln!(output, "Alta prioridad: {}", counts.high_priority)?;
        Ok(())
    }

    /// `chat <mensaje>` runs one exchange; bare `chat` prints the
    /// transcript so far, greeting included.
    fn chat_command<W: Write>(&mut self, message: &str, output: &mut W) -> Result<()> {
        if message.is_empty() {
            for entry in self.chat.transcript() {
                let speaker = if entry.is_user { "tú" } else { "asistente" };
                writeln!(output, "{speaker}: {}", entry.content)?;
            }
            return Ok(());
        }

        let before = self.chat.transcript().len();
        self.chat
            .send(message, self.assistant, OffsetDateTime::now_utc());
        for entry in &self.chat.transcript()[before..] {
            let speaker = if entry.is_user { "tú" } else { "asistente" };
            writeln!(output, "{speaker}: {}", entry.content)?;
        }
        Ok(())
    }

    /// Signs in against the identity service and greets with the
    /// fetched profile. Service errors print verbatim.
    fn login<R: BufRead, W: Write>(&mut self, lines: &mut Lines<R>, output: &mut W) -> Result<()> {
        let Some(identity) = self.identity.as_deref_mut() else {
            return identity_unavailable(output);
        };
        let Some(email) = prompt(lines, output, "Correo")? else {
            return Ok(());
        };
        let Some(password) = prompt(lines, output, "Contraseña")? else {
            return Ok(());
        };
        let form = LoginFormInput { email, password };
        if let Err(error) = form.validate() {
            writeln!(output, "{error}")?;
            return Ok(());
        }
        if let Err(error) = identity.sign_in(&form.email, &form.password) {
            writeln!(output, "{error}")?;
            return Ok(());
        }
        match identity.current_profile() {
            Ok(Some(profile)) => writeln!(
                output,
                "Sesión iniciada. Bienvenido, {} ({}, CCT {})",
                profile.full_name,
                profile.role.label(),
                profile.school_id,
            )?,
            Ok(None) => writeln!(output, "Sesión iniciada.")?,
            Err(error) => writeln!(output, "Sesión iniciada; perfil no disponible: {error}")?,
        }
        Ok(())
    }

    fn logout<W: Write>(&mut self, output: &mut W) -> Result<()> {
        let Some(identity) = self.identity.as_deref_mut() else {
            return identity_unavailable(output);
        };
        match identity.sign_out() {
            Ok(()) => writeln!(output, "Sesión cerrada.")?,
            Err(error) => writeln!(output, "{error}")?,
        }
        Ok(())
    }

    /// Captures a new report. Submission is simulated: the record is
    /// validated and echoed back, nothing joins the list.
    fn new_incident<R: BufRead, W: Write>(
        &mut self,
        lines: &mut Lines<R>,
        output: &mut W,
    ) -> Result<()> {
        let mut form = IncidentFormInput::default();
        let fields: [(&str, fn(&mut IncidentFormInput, String)); 4] = [
            ("Título", |form, value| form.title = value),
            ("Descripción", |form, value| form.description = value),
            ("Ubicación", |form, value| form.location = value),
            ("Alumno involucrado (opcional)", |form, value| {
                form.student_name = value;
            }),
        ];
        for (label, assign) in fields {
            let Some(value) = prompt(lines, output, label)? else {
                writeln!(output, "captura cancelada")?;
                return Ok(());
            };
            assign(&mut form, value);
        }
        let Some(kind) = prompt(
            lines,
            output,
            "Tipo (academic/disciplinary/infrastructure/administrative/security)",
        )?
        else {
            writeln!(output, "captura cancelada")?;
            return Ok(());
        };
        form.kind = IncidentKind::parse(&kind);
        let Some(priority) = prompt(lines, output, "Prioridad (low/medium/high)")? else {
            writeln!(output, "captura cancelada")?;
            return Ok(());
        };
        form.priority = IncidentPriority::parse(&priority);
        let Some(reporter) = prompt(lines, output, "Reportado por")? else {
            writeln!(output, "captura cancelada")?;
            return Ok(());
        };

        let now = OffsetDateTime::now_utc();
        let id = IncidentId::new(format!(
            "{}-{:03}",
            now.year(),
            self.state.records().len() + 1
        ));
        match form.into_incident(id, reporter, now) {
            Ok(record) => writeln!(
                output,
                "Incidencia {} registrada exitosamente: [{}] [{}] {}",
                record.id,
                record.kind.label(),
                record.priority.label(),
                record.title,
            )?,
            Err(error) => writeln!(output, "{error}")?,
        }
        Ok(())
    }

    /// Interactive three-step registration. Validation failures keep
    /// the draft on the same step and prompt again; `back` returns to
    /// the previous step with every field intact, `cancel` aborts.
    fn register<R: BufRead, W: Write>(
        &mut self,
        lines: &mut Lines<R>,
        output: &mut W,
    ) -> Result<()> {
        let Some(identity) = self.identity.as_deref_mut() else {
            writeln!(
                output,
                "registro no disponible: configura [identity].anon_key en el archivo de configuración"
            )?;
            return Ok(());
        };

        let mut draft = RegistrationDraft::default();
        loop {
            writeln!(
                output,
                "Paso {} de 3: {}",
                draft.step().number(),
                draft.step().title()
            )?;
            match draft.step() {
                WizardStep::PersonalInfo => {
                    let Some(full_name) = prompt(lines, output, "Nombre completo")? else {
                        return cancelled(output);
                    };
                    if full_name == "cancel" {
                        return cancelled(output);
                    }
                    draft.full_name = full_name;
                    let Some(email) = prompt(lines, output, "Correo oficial")? else {
                        return cancelled(output);
                    };
                    draft.email = email;
                    let Some(role) = prompt(
                        lines,
                        output,
                        "Rol (teacher/coordinator/director/supervisor)",
                    )?
                    else {
                        return cancelled(output);
                    };
                    if !role.is_empty() {
                        match UserRole::parse(&role) {
                            Some(parsed) => draft.role = parsed,
                            None => {
                                writeln!(output, "rol desconocido {role:?}")?;
                                continue;
                            }
                        }
                    }
                    if let Err(error) = draft.advance() {
                        writeln!(output, "{error}")?;
                    }
                }
                WizardStep::Credentials => {
                    let Some(password) = prompt(lines, output, "Contraseña (o `back`)")? else {
                        return cancelled(output);
                    };
                    if password == "cancel" {
                        return cancelled(output);
                    }
                    if password == "back" {
                        draft.back();
                        continue;
                    }
                    draft.password = password;
                    let Some(confirm) = prompt(lines, output, "Confirmar contraseña")? else {
                        return cancelled(output);
                    };
                    draft.confirm_password = confirm;
                    if let Err(error) = draft.advance() {
                        writeln!(output, "{error}")?;
                    }
                }
                WizardStep::Institution => {
                    let Some(cct) = prompt(lines, output, "CCT de la escuela (o `back`)")? else {
                        return cancelled(output);
                    };
                    if cct == "cancel" {
                        return cancelled(output);
                    }
                    if cct == "back" {
                        draft.back();
                        continue;
                    }
                    draft.school_cct = cct;
                    let Some(school_name) = prompt(lines, output, "Nombre de la escuela")? else {
                        return cancelled(output);
                    };
                    draft.school_name = school_name;
                    match draft.submit(identity) {
                        Ok(()) => {
                            writeln!(output, "Cuenta registrada para {}.", draft.email)?;
                            return Ok(());
                        }
                        Err(error) => writeln!(output, "{error}")?,
                    }
                }
            }
        }
    }
}

fn prompt<R: BufRead, W: Write>(
    lines: &mut Lines<R>,
    output: &mut W,
    label: &str,
) -> Result<Option<String>> {
    write!(output, "{label}: ")?;
    output.flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?.trim().to_owned())),
        None => Ok(None),
    }
}

fn cancelled<W: Write>(output: &mut W) -> Result<()> {
    writeln!(output, "registro cancelado")?;
    Ok(())
}

fn identity_unavailable<W: Write>(output: &mut W) -> Result<()> {
    writeln!(
        output,
        "sesión no disponible: configura [identity].anon_key en el archivo de configuración"
    )?;
    Ok(())
}

fn parse_status(value: &str) -> Result<Option<IncidentStatus>> {
    if value == "all" {
        return Ok(None);
    }
    IncidentStatus::parse(value).map(Some).ok_or_else(|| {
        anyhow!("estado desconocido {value:?}; usa pending, in_progress, resolved, cancelled o all")
    })
}

fn parse_priority(value: &str) -> Result<Option<IncidentPriority>> {
    if value == "all" {
        return Ok(None);
    }
    IncidentPriority::parse(value)
        .map(Some)
        .ok_or_else(|| anyhow!("prioridad desconocida {value:?}; usa low, medium, high o all"))
}

fn print_help<W: Write>(output: &mut W) -> Result<()> {
    writeln!(output, "Comandos:")?;
    writeln!(output, "  list                 Lista las incidencias visibles")?;
    writeln!(output, "  search <texto>       Filtra por texto (vacío lo quita)")?;
    writeln!(output, "  status <valor|all>   Filtra por estado")?;
    writeln!(output, "  priority <valor|all> Filtra por prioridad")?;
    writeln!(output, "  clear                Quita todos los filtros")?;
    writeln!(output, "  counts               Resumen por estado y prioridad")?;
    writeln!(output, "  chat <mensaje>       Pregunta al asistente")?;
    writeln!(output, "  reset                Reinicia la conversación")?;
    writeln!(output, "  new                  Captura una incidencia nueva")?;
    writeln!(output, "  register             Registra una cuenta nueva")?;
    writeln!(output, "  login                Inicia sesión")?;
    writeln!(output, "  logout               Cierra la sesión")?;
    writeln!(output, "  quit                 Salir")?;
    Ok(())
}
