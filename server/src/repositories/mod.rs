//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Questo modulo organizza i repository in sotto-moduli separati per una migliore manutenibilità.
//! Ogni repository gestisce le operazioni di database per una specifica entità.
//!
//! Le query sono scritte con `sqlx::query_as` / `QueryBuilder` (verifica a run-time):
//! i filtri delle liste admin sono dinamici e non si prestano alle macro `query!`.

pub mod coach_message;
pub mod moderation;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Read, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use coach_message::CoachMessageRepository;
pub use moderation::{ModerationFilter, ModerationRepository};
pub use user::{UserFilter, UserRepository};

/// Costruisce un pattern `LIKE` case-insensitive per la ricerca per sottostringa.
///
/// I caratteri speciali di `LIKE` nell'input vengono escapati con `\`,
/// quindi la query deve usare `ESCAPE '\'`.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn pattern_is_lowercased_and_wrapped() {
        assert_eq!(contains_pattern("Ann"), "%ann%");
    }

    #[test]
    fn wildcards_in_input_are_escaped() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
