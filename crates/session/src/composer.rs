//! System directive composition.

use personachat_core::DirectiveTable;
use personachat_core::directives::{
    FALLBACK_PERSONA, FALLBACK_PERSONA_DIRECTIVE, FALLBACK_STYLE, FALLBACK_STYLE_DIRECTIVE,
};
use tracing::warn;

/// Guardrail clauses appended to every directive, in this order.
pub const GUARDRAILS: &[&str] = &[
    "Responda em PT-BR.",
    "Seja útil, claro e honesto sobre limitações.",
    "Quando apropriado, proponha próximos passos práticos.",
    "Se a pergunta for ambígua, peça uma clarificação curta.",
    "Nunca invente números ou políticas internas.",
];

/// Builds the system directive from persona and style keys.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    personas: DirectiveTable,
    styles: DirectiveTable,
}

impl PromptComposer {
    pub fn new(personas: DirectiveTable, styles: DirectiveTable) -> Self {
        Self { personas, styles }
    }

    /// Composer over the built-in persona and style tables.
    pub fn builtin() -> Self {
        Self::new(
            DirectiveTable::builtin_personas(),
            DirectiveTable::builtin_styles(),
        )
    }

    pub fn personas(&self) -> &DirectiveTable {
        &self.personas
    }

    pub fn styles(&self) -> &DirectiveTable {
        &self.styles
    }

    /// Persona name and directive, substituting the generic assistant for
    /// unknown keys.
    pub fn resolve_persona<'a>(&'a self, key: &'a str) -> (&'a str, &'a str) {
        match self.personas.get(key) {
            Some(text) => (key, text),
            None => {
                warn!(persona = key, "Unknown persona, using {FALLBACK_PERSONA}");
                (FALLBACK_PERSONA, FALLBACK_PERSONA_DIRECTIVE)
            }
        }
    }

    /// Style name and directive, substituting the neutral style for unknown keys.
    pub fn resolve_style<'a>(&'a self, key: &'a str) -> (&'a str, &'a str) {
        match self.styles.get(key) {
            Some(text) => (key, text),
            None => {
                warn!(style = key, "Unknown style, using {FALLBACK_STYLE}");
                (FALLBACK_STYLE, FALLBACK_STYLE_DIRECTIVE)
            }
        }
    }

    /// Compose the system directive. Deterministic and never fails.
    pub fn compose(&self, persona: &str, style: &str) -> String {
        let (persona_name, persona_text) = self.resolve_persona(persona);
        let (style_name, style_text) = self.resolve_style(style);

        format!(
            "Você é um assistente especializado com foco em {persona_name}.\n\
             Persona: {persona_text}\n\
             Estilo: {style_name}. {style_text}\n\
             Regras: {}",
            GUARDRAILS.join(" ")
        )
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_pair_has_both_directives_and_each_guardrail_once() {
        let composer = PromptComposer::builtin();
        for persona in composer.personas().iter() {
            for style in composer.styles().iter() {
                let text = composer.compose(&persona.key, &style.key);
                assert!(text.contains(&persona.directive), "{}", persona.key);
                assert!(text.contains(&style.directive), "{}", style.key);
                for clause in GUARDRAILS {
                    assert_eq!(text.matches(clause).count(), 1, "{clause}");
                }
            }
        }
    }

    #[test]
    fn professor_formal_layout() {
        let text = PromptComposer::builtin().compose("Professor", "Formal");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "Você é um assistente especializado com foco em Professor."
        );
        assert!(lines[1].starts_with("Persona: Explique com exemplos simples"));
        assert!(lines[2].starts_with("Estilo: Formal. "));
        assert!(lines[3].starts_with("Regras: Responda em PT-BR."));
    }

    #[test]
    fn unknown_keys_fall_back_independently() {
        let composer = PromptComposer::builtin();

        let text = composer.compose("Astronauta", "Técnico");
        assert!(text.contains("foco em Assistente."));
        assert!(text.contains(FALLBACK_PERSONA_DIRECTIVE));
        assert!(text.contains("Estilo: Técnico."));

        let text = composer.compose("Analista", "Barroco");
        assert!(text.contains("foco em Analista."));
        assert!(text.contains(&format!("Estilo: Neutro. {FALLBACK_STYLE_DIRECTIVE}")));
    }

    #[test]
    fn compose_is_deterministic() {
        let composer = PromptComposer::builtin();
        assert_eq!(
            composer.compose("Suporte Técnico", "Simples"),
            composer.compose("Suporte Técnico", "Simples")
        );
    }

    #[test]
    fn custom_table_entries_are_used() {
        let mut personas = DirectiveTable::builtin_personas();
        personas.upsert("Chef", "Fale como um chef de cozinha.");
        let composer = PromptComposer::new(personas, DirectiveTable::builtin_styles());

        let text = composer.compose("Chef", "Empático");
        assert!(text.contains("foco em Chef."));
        assert!(text.contains("Fale como um chef de cozinha."));
    }
}
