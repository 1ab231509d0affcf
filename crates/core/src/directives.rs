//! Persona and style directive tables.
//!
//! A table is an ordered list of `key → instruction text`. Order is part of
//! the contract: keyword detection walks the table front to back and the
//! first key found wins, so lookups never depend on hash-map iteration.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persona name used when a requested persona key is unknown.
pub const FALLBACK_PERSONA: &str = "Assistente";

/// Directive text paired with [`FALLBACK_PERSONA`].
pub const FALLBACK_PERSONA_DIRECTIVE: &str =
    "Ajude com informações claras, exemplos práticos e orientações passo a passo.";

/// Style name used when a requested style key is unknown.
pub const FALLBACK_STYLE: &str = "Neutro";

/// Directive text paired with [`FALLBACK_STYLE`].
pub const FALLBACK_STYLE_DIRECTIVE: &str = "Escreva de forma clara e objetiva.";

const BUILTIN_PERSONAS: &[(&str, &str)] = &[
    (
        "Professor",
        "Explique com exemplos simples e analogias, seja didático e paciente.",
    ),
    (
        "Suporte Técnico",
        "Seja objetivo, passo a passo, com troubleshooting e validações.",
    ),
    (
        "Contador de Histórias",
        "Use narrativa leve, metáforas curtas e exemplos envolventes.",
    ),
    (
        "Analista",
        "Forneça dados estruturados, análise objetiva e insights acionáveis.",
    ),
];

const BUILTIN_STYLES: &[(&str, &str)] = &[
    (
        "Formal",
        "Escreva em tom profissional, claro e direto, evitando coloquialismos.",
    ),
    (
        "Técnico",
        "Use termos técnicos quando necessário, inclua listas numeradas e considerações práticas.",
    ),
    ("Simples", "Frases curtas, vocabulário simples, vá direto ao ponto."),
    (
        "Empático",
        "Seja caloroso, encorajador e demonstre compreensão emocional.",
    ),
];

/// One `key → text` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub key: String,
    pub directive: String,
}

/// An ordered, read-only-after-startup directive table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveTable {
    entries: Vec<Directive>,
}

impl DirectiveTable {
    /// The built-in persona table.
    pub fn builtin_personas() -> Self {
        Self::from_pairs(BUILTIN_PERSONAS)
    }

    /// The built-in style table.
    pub fn builtin_styles() -> Self {
        Self::from_pairs(BUILTIN_STYLES)
    }

    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(key, directive)| Directive {
                    key: (*key).to_string(),
                    directive: (*directive).to_string(),
                })
                .collect(),
        }
    }

    /// Replace the text of an existing key in place, or append a new key at the end.
    pub fn upsert(&mut self, key: impl Into<String>, directive: impl Into<String>) {
        let key = key.into();
        let directive = directive.into();
        match self.entries.iter_mut().find(|d| d.key == key) {
            Some(existing) => {
                debug!(key = %key, "Overriding directive");
                existing.directive = directive;
            }
            None => {
                debug!(key = %key, position = self.entries.len(), "Appending directive");
                self.entries.push(Directive { key, directive });
            }
        }
    }

    /// Look up the directive text for a key (exact match).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|d| d.key == key)
            .map(|d| d.directive.as_str())
    }

    /// Whether the table has the key.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|d| d.key.as_str())
    }

    /// Rows in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first key (in table order) that occurs in `text`,
    /// compared case-insensitively as a substring.
    pub fn find_mentioned(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.keys()
            .find(|key| haystack.contains(&key.to_lowercase()))
    }
}
