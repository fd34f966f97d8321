use regex::Regex;
use slack_morphism::prelude::*;
use std::sync::LazyLock;

/// Posted as soon as a message is accepted
pub const THINKING_MESSAGE: &str = "Let me think about that...";

static LEADING_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<@[A-Z0-9]+(\|[^>]*)?>\s*").expect("LEADING_MENTION is a compile-time constant")
});

/// Drop a leading `<@U123>` mention
#[must_use]
pub fn strip_leading_mention(text: &str) -> String {
    LEADING_MENTION.replace(text, "").into_owned()
}

/// Whether `text` mentions `user_id` anywhere
#[must_use]
pub fn mentions_user(text: &str, user_id: &str) -> bool {
    text.contains(&format!("<@{}>", user_id)) || text.contains(&format!("<@{}|", user_id))
}

/// Progress line for one tool step
#[must_use]
pub fn format_step(log: &str, observation: &str) -> String {
    format!("{}\nAnswer: {}", log, observation)
}

/// One markdown section block per section
pub fn section_blocks(sections: &[String]) -> Vec<SlackBlock> {
    sections
        .iter()
        .map(|section| {
            SlackBlock::Section(SlackSectionBlock::new().with_text(SlackBlockText::MarkDown(
                SlackBlockMarkDownText::new(section.clone()),
            )))
        })
        .collect()
}
