// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::MessageId;

pub const WELCOME_MESSAGE: &str = "¡Hola! Soy tu asistente especializado en el Sistema de Incidencias de la SEP.

Puedo ayudarte con:
• Registro y seguimiento de incidencias
• Información sobre políticas educativas
• Orientación sobre procedimientos administrativos
• Consultas sobre el sistema

¿En qué puedo asistirte hoy?";

pub const RESET_MESSAGE: &str = "¡Chat reiniciado! ¿En qué puedo ayudarte?";

pub const FALLBACK_MESSAGE: &str =
    "Lo siento, ocurrió un error al procesar tu mensaje. Por favor intenta nuevamente.";

/// Seam to the external Completion Service: raw prompt in, reply text
/// out. Context enrichment happens on the service side.
pub trait CompletionBackend {
    fn complete(&self, message: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub content: String,
    pub is_user: bool,
    pub timestamp: OffsetDateTime,
}

/// Handle for the single in-flight exchange, tagged with the session
/// generation it was started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReply {
    generation: u64,
}

/// One conversation with the assistant: an append-only transcript plus
/// the bookkeeping for at most one outstanding exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    busy: bool,
    generation: u64,
    next_id: u64,
}

impl ChatSession {
    /// Every session opens with exactly one assistant greeting.
    pub fn new(now: OffsetDateTime) -> Self {
        let mut session = Self {
            transcript: Vec::new(),
            busy: false,
            generation: 0,
            next_id: 0,
        };
        session.push(WELCOME_MESSAGE, false, now);
        session
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Optimistically appends the user message and marks the session
    /// busy. Returns `None` (no transcript change) for blank input or
    /// while an exchange is already outstanding.
    pub fn begin_send(&mut self, text: &str, now: OffsetDateTime) -> Option<PendingReply> {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.busy {
            return None;
        }
        self.push(trimmed, true, now);
        self.busy = true;
        Some(PendingReply {
            generation: self.generation,
        })
    }

    /// Resolves an exchange started by `begin_send`. A failure becomes
    /// the fixed fallback apology; the preceding user message always
    /// stays. A reply whose session was cleared in the meantime is
    /// dropped instead of appended after the fresh greeting.
    pub fn complete_send(
        &mut self,
        pending: PendingReply,
        outcome: Result<String>,
        now: OffsetDateTime,
    ) {
        self.busy = false;
        if pending.generation != self.generation {
            return;
        }
        match outcome {
            Ok(reply) => self.push(&reply, false, now),
            Err(_) => self.push(FALLBACK_MESSAGE, false, now),
        }
    }

    /// Runs one full exchange against the backend. Returns `false`
    /// when the input was rejected (blank or busy), `true` when a
    /// user/assistant message pair was appended.
    pub fn send(
        &mut self,
        text: &str,
        backend: &dyn CompletionBackend,
        now: OffsetDateTime,
    ) -> bool {
        let Some(pending) = self.begin_send(text, now) else {
            return false;
        };
        let outcome = backend.complete(text.trim());
        self.complete_send(pending, outcome, now);
        true
    }

    /// Replaces the transcript with a single fresh greeting. An
    /// outstanding exchange is not aborted; its reply is discarded on
    /// arrival via the generation check in `complete_send`.
    pub fn clear(&mut self, now: OffsetDateTime) {
        self.generation += 1;
        self.transcript.clear();
        self.push(RESET_MESSAGE, false, now);
    }

    fn push(&mut self, content: &str, is_user: bool, now: OffsetDateTime) {
        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        self.transcript.push(ChatMessage {
            id,
            content: content.to_owned(),
            is_user,
            timestamp: now,
        });
    }
}
