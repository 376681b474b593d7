use crate::dtos::HistoryEntryDTO;
use crate::entities::MessageRole;
use futures::stream::{self, BoxStream, StreamExt};
use std::time::Duration;

/// Sorgente delle risposte del coach.
///
/// L'implementazione restituisce la risposta come sequenza ordinata di frammenti di testo;
/// la concatenazione dei frammenti è la risposta completa.
pub trait CoachEngine: Send + Sync {
    fn reply(&self, message: &str, history: &[HistoryEntryDTO]) -> BoxStream<'static, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Training,
    Nutrition,
    Recovery,
    Mental,
    General,
}

const TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
    (Topic::Recovery, &["recover", "sore", "sleep", "injur", "tired", "rest", "pain"]),
    (Topic::Mental, &["nervous", "focus", "confiden", "pressure", "anxi", "motivat", "mental"]),
    (Topic::Nutrition, &["eat", "diet", "protein", "nutrition", "meal", "hydrat", "food"]),
    (Topic::Training, &["train", "workout", "drill", "plan", "session", "practice", "exercise"]),
];

fn classify(message: &str) -> Topic {
    let lower = message.to_lowercase();
    TOPIC_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::General)
}

fn advice(topic: Topic) -> &'static str {
    match topic {
        Topic::Training => {
            "Let's build your next session around quality, not volume. Start with a ten minute \
             dynamic warm-up, then run three focused blocks of drills with full recovery between \
             them, and finish with light mobility work. Log how each block felt so we can adjust \
             next week."
        }
        Topic::Nutrition => {
            "Fuel the work you are doing. Aim for a balanced plate with a palm of protein at every \
             meal, keep carbohydrates higher on heavy training days, and sip water steadily \
             through the day instead of catching up at night."
        }
        Topic::Recovery => {
            "Recovery is part of the plan. Protect seven to nine hours of sleep, keep tomorrow \
             light with an easy aerobic session, and if the soreness is sharp or lasts more than \
             a few days, get it checked before you load it again."
        }
        Topic::Mental => {
            "Pressure means the moment matters to you. Before your next match, pick one simple \
             cue to focus on, use slow breathing between points, and judge yourself on the \
             process you control rather than the scoreboard."
        }
        Topic::General => {
            "Thanks for checking in. Tell me which part of your game you want to sharpen this \
             week and I will put together a focused plan for it."
        }
    }
}

/// Motore di risposta a regole: sceglie un consiglio per argomento e lo emette parola per parola.
pub struct ScriptedCoach {
    fragment_delay: Duration,
}

impl ScriptedCoach {
    pub fn new(fragment_delay: Duration) -> Self {
        Self { fragment_delay }
    }

    /// Testo completo della risposta, prima della suddivisione in frammenti
    pub fn compose(&self, message: &str, history: &[HistoryEntryDTO]) -> String {
        let follow_up = history.iter().any(|m| m.role == MessageRole::Assistant);
        let opener = format!("You asked: \"{}\".", quote_question(message));
        let body = advice(classify(message));
        if follow_up {
            format!("Picking up from where we left off. {opener} {body}")
        } else {
            format!("{opener} {body}")
        }
    }
}

const QUOTE_MAX_CHARS: usize = 80;

/// Domanda con gli spazi normalizzati, troncata a `QUOTE_MAX_CHARS` caratteri
fn quote_question(message: &str) -> String {
    let normalized = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= QUOTE_MAX_CHARS {
        return normalized;
    }
    let cut: String = normalized.chars().take(QUOTE_MAX_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// Divide il testo in frammenti che, concatenati, lo ricostruiscono esattamente
fn split_fragments(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}

impl CoachEngine for ScriptedCoach {
    fn reply(&self, message: &str, history: &[HistoryEntryDTO]) -> BoxStream<'static, String> {
        let fragments = split_fragments(&self.compose(message, history));
        let delay = self.fragment_delay;

        if delay.is_zero() {
            stream::iter(fragments).boxed()
        } else {
            stream::iter(fragments)
                .then(move |fragment| async move {
                    tokio::time::sleep(delay).await;
                    fragment
                })
                .boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_picks_topic_from_keywords() {
        assert_eq!(classify("Can you plan my workout?"), Topic::Training);
        assert_eq!(classify("I feel SORE after yesterday"), Topic::Recovery);
        assert_eq!(classify("How much protein should I eat"), Topic::Nutrition);
        assert_eq!(classify("I get nervous before games"), Topic::Mental);
        assert_eq!(classify("Hello"), Topic::General);
    }

    #[test]
    fn fragments_concatenate_to_the_full_reply() {
        let text = "one two  three";
        assert_eq!(split_fragments(text).concat(), text);
    }

    #[test]
    fn follow_up_is_acknowledged() {
        let coach = ScriptedCoach::new(Duration::ZERO);
        let history = vec![HistoryEntryDTO {
            role: MessageRole::Assistant,
            content: "Earlier advice".into(),
        }];
        assert!(coach.compose("Hello", &history).starts_with("Picking up"));
        assert!(!coach.compose("Hello", &[]).starts_with("Picking up"));
    }

    #[test]
    fn reply_quotes_the_question() {
        let coach = ScriptedCoach::new(Duration::ZERO);
        let reply = coach.compose("  How should I   recover after a match? ", &[]);
        assert!(reply.starts_with("You asked: \"How should I recover after a match?\". "));
        assert!(reply.ends_with(advice(Topic::Recovery)));
    }

    #[test]
    fn long_questions_are_truncated() {
        let question = "è".repeat(200);
        let quoted = quote_question(&question);
        assert_eq!(quoted.chars().count(), QUOTE_MAX_CHARS + 3);
        assert!(quoted.ends_with("..."));
    }

    #[tokio::test]
    async fn reply_stream_yields_the_composed_text() {
        let coach = ScriptedCoach::new(Duration::ZERO);
        let fragments: Vec<String> = coach.reply("Hello", &[]).collect().await;
        assert!(fragments.len() > 1);
        assert_eq!(fragments.concat(), coach.compose("Hello", &[]));
    }
}
