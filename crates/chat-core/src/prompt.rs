//! Prompt template and sampling settings for the Mistral-instruct chat format.

use std::fmt::Write;

use llm::SamplingParams;

use crate::session::{Message, Role};

/// Number of most recent transcript messages rendered into the prompt.
pub const HISTORY_WINDOW: usize = 5;

pub const SYSTEM_PROMPT: &str = "Sen bilgili, yardımsever ve nazik bir yapay zekâ asistanısın. \
Kullanıcıların sorularına kısa, anlaşılır ve doğru yanıtlar ver. \
Türkçe konuş ve kullanıcıyı yormayan yanıtlar ver. \
Komutları anlayabilir ve yerine getirebilirsin. \
Eğer bir konuda emin değilsen, dürüstçe belirt.";

pub const USER_LABEL: &str = "Kullanıcı:";
pub const ASSISTANT_LABEL: &str = "Asistan:";
pub const END_OF_TURN: &str = "</s>";

pub const MAX_NEW_TOKENS: u32 = 512;
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.95;

/// Generation halts at the end-of-turn marker or when the model starts writing
/// the next user line (Turkish or English label).
pub const STOP_SEQUENCES: [&str; 3] = [END_OF_TURN, USER_LABEL, "User:"];

pub fn sampling_params() -> SamplingParams {
    SamplingParams {
        max_tokens: MAX_NEW_TOKENS,
        temperature: TEMPERATURE,
        top_p: TOP_P,
        stop: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Last [`HISTORY_WINDOW`] messages of `history`, oldest first.
pub fn window(history: &[Message]) -> &[Message] {
    &history[history.len().saturating_sub(HISTORY_WINDOW)..]
}

/// Render the system block, the windowed transcript, the new user line and an
/// open assistant turn.
pub fn build_prompt(history: &[Message], user_text: &str) -> String {
    let mut context = String::new();
    for msg in window(history) {
        let label = match msg.role() {
            Role::User => USER_LABEL,
            Role::Bot => ASSISTANT_LABEL,
        };
        let _ = writeln!(context, "{} {}", label, msg.text());
    }
    let _ = writeln!(context, "{} {}", USER_LABEL, user_text);

    format!(
        "<s>[INST] <<SYS>>\n{}\n<</SYS>>\n\n{}{} [/INST]",
        SYSTEM_PROMPT, context, ASSISTANT_LABEL
    )
}

/// Trim raw model output and drop an echoed assistant label.
/// Returns `None` when nothing usable is left.
pub fn clean_output(raw: &str) -> Option<String> {
    let text = raw.trim();
    let text = text
        .strip_prefix(ASSISTANT_LABEL)
        .map(str::trim)
        .unwrap_or(text);
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_without_history() {
        let prompt = build_prompt(&[], "Merhaba");
        let expected = format!(
            "<s>[INST] <<SYS>>\n{}\n<</SYS>>\n\nKullanıcı: Merhaba\nAsistan: [/INST]",
            SYSTEM_PROMPT
        );
        assert_eq!(prompt, expected);
    }

    #[test]
    fn prompt_renders_alternating_labels() {
        let history = vec![Message::user("Selam"), Message::bot("Merhaba, nasılsın?")];
        let prompt = build_prompt(&history, "İyiyim");
        assert!(prompt.ends_with(
            "Kullanıcı: Selam\nAsistan: Merhaba, nasılsın?\nKullanıcı: İyiyim\nAsistan: [/INST]"
        ));
    }

    #[test]
    fn window_keeps_latest_five_in_order() {
        let history: Vec<Message> = (1..=8).map(|i| Message::user(format!("m{}", i))).collect();
        let texts: Vec<&str> = window(&history).iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["m4", "m5", "m6", "m7", "m8"]);

        let short = vec![Message::user("only")];
        assert_eq!(window(&short).len(), 1);
    }

    #[test]
    fn clean_output_strips_label_and_whitespace() {
        assert_eq!(clean_output("  Asistan:  Tabii! \n").as_deref(), Some("Tabii!"));
        assert_eq!(clean_output("Merhaba").as_deref(), Some("Merhaba"));
        assert_eq!(clean_output("   "), None);
        assert_eq!(clean_output("Asistan:   "), None);
    }

    #[test]
    fn sampling_params_are_fixed() {
        let p = sampling_params();
        assert_eq!(p.max_tokens, 512);
        assert_eq!(p.temperature, 0.7);
        assert_eq!(p.top_p, 0.95);
        assert_eq!(p.stop, vec!["</s>", "Kullanıcı:", "User:"]);
    }
}
