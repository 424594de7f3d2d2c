use tracing::debug;

use crate::platform::Reply;
use crate::update::{Update, User};

const COMMAND_MARKER: char = '/';

pub const HELP_TEXT: &str = "This bot should now respond to every message.";

/// What a message's text amounts to, before any handler is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    /// Command name without the marker or `@botname` suffix
    Command(&'a str),
    PlainText(&'a str),
    Empty,
}

/// Split message text into a command, plain text or nothing.
///
/// `/cmd@name` is only treated as `cmd` when `name` matches `bot_username`
/// (case-insensitively). Commands addressed to another bot classify as a
/// command with an empty name, which no handler accepts.
pub fn classify<'a>(text: Option<&'a str>, bot_username: Option<&str>) -> Classified<'a> {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return Classified::Empty,
    };

    let Some(rest) = text.strip_prefix(COMMAND_MARKER) else {
        return Classified::PlainText(text);
    };

    // The name starts right after the marker; "/ start" is not a command name.
    let token = rest.split(char::is_whitespace).next().unwrap_or("");
    match token.split_once('@') {
        Some((name, addressee)) => {
            let ours = bot_username.is_some_and(|me| me.eq_ignore_ascii_case(addressee));
            Classified::Command(if ours { name } else { "" })
        }
        None => Classified::Command(token),
    }
}

/// Pick the handler for an update and build its reply.
///
/// Exactly one handler fires, or none: `/start` greets, `/help` sends the
/// help text, non-command text is echoed back, and everything else is
/// ignored.
pub fn route(update: &Update, bot_username: Option<&str>) -> Option<Reply> {
    let msg = update.effective_message()?;

    match classify(msg.text.as_deref(), bot_username) {
        Classified::Command("start") => Some(greet(msg.from.as_ref())),
        Classified::Command("help") => Some(help()),
        Classified::PlainText(text) => Some(echo(text)),
        Classified::Command(name) => {
            debug!("Ignoring unrecognized command: /{}", name);
            None
        }
        Classified::Empty => None,
    }
}

fn greet(sender: Option<&User>) -> Reply {
    let mention = sender
        .map(User::mention_html)
        .unwrap_or_else(|| "there".to_string());
    Reply::html(format!("Hi {}! I am up and relaying your messages.", mention))
}

fn help() -> Reply {
    Reply::plain(HELP_TEXT)
}

fn echo(text: &str) -> Reply {
    Reply::plain(format!("You said: {}", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ReplyFormat;

    fn update(json: &str) -> Update {
        Update::from_json_slice(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_classify_plain_text() {
        assert_eq!(
            classify(Some("hello there"), None),
            Classified::PlainText("hello there")
        );
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(None, None), Classified::Empty);
        assert_eq!(classify(Some(""), None), Classified::Empty);
    }

    #[test]
    fn test_classify_command_with_arguments() {
        assert_eq!(
            classify(Some("/start deep-link"), None),
            Classified::Command("start")
        );
    }

    #[test]
    fn test_classify_command_for_this_bot() {
        assert_eq!(
            classify(Some("/help@HookBot"), Some("hookbot")),
            Classified::Command("help")
        );
    }

    #[test]
    fn test_classify_command_for_other_bot() {
        assert_eq!(
            classify(Some("/help@otherbot"), Some("hookbot")),
            Classified::Command("")
        );
        assert_eq!(classify(Some("/help@hookbot"), None), Classified::Command(""));
    }

    #[test]
    fn test_classify_space_after_marker() {
        assert_eq!(classify(Some("/ start"), None), Classified::Command(""));
        assert_eq!(classify(Some("/\nhelp"), None), Classified::Command(""));
        assert!(route(&update(r#"{"message": {"text": "/ start"}}"#), None).is_none());
        assert!(route(&update(r#"{"message": {"text": "/\nhelp"}}"#), None).is_none());
    }

    #[test]
    fn test_classify_command_names_are_case_sensitive() {
        assert_eq!(classify(Some("/START"), None), Classified::Command("START"));
        assert!(route(&update(r#"{"message": {"text": "/START"}}"#), None).is_none());
    }

    #[test]
    fn test_classify_text_with_slash_later_is_plain() {
        assert_eq!(
            classify(Some("and/or /start"), None),
            Classified::PlainText("and/or /start")
        );
    }

    #[test]
    fn test_start_selects_greeting_only() {
        let reply = route(
            &update(r#"{"message": {"text": "/start", "from": {"id": 5, "first_name": "Ada", "last_name": "Lovelace"}}}"#),
            None,
        )
        .unwrap();
        assert_eq!(reply.format, ReplyFormat::Html);
        assert_eq!(
            reply.text,
            "Hi <a href=\"tg://user?id=5\">Ada Lovelace</a>! I am up and relaying your messages."
        );
    }

    #[test]
    fn test_start_without_sender() {
        let reply = route(&update(r#"{"message": {"text": "/start"}}"#), None).unwrap();
        assert_eq!(reply.text, "Hi there! I am up and relaying your messages.");
    }

    #[test]
    fn test_help_reply() {
        let reply = route(
            &update(r#"{"message": {"text": "/help", "from": {"id": 1, "first_name": "A"}}}"#),
            None,
        )
        .unwrap();
        assert_eq!(reply, Reply::plain("This bot should now respond to every message."));
    }

    #[test]
    fn test_echo_reply() {
        let reply = route(&update(r#"{"message": {"text": "hello"}}"#), None).unwrap();
        assert_eq!(reply, Reply::plain("You said: hello"));
    }

    #[test]
    fn test_echo_is_literal_concatenation() {
        for text in ["hi", "  spaced  ", "<b>not html</b>", "multi\nline", "ünïcödé"] {
            let json = serde_json::json!({ "message": { "text": text } }).to_string();
            let reply = route(&update(&json), None).unwrap();
            assert_eq!(reply.text, format!("You said: {}", text));
            assert_eq!(reply.format, ReplyFormat::Plain);
        }
    }

    #[test]
    fn test_unrecognized_command_is_ignored() {
        assert!(route(&update(r#"{"message": {"text": "/clear"}}"#), None).is_none());
        assert!(route(&update(r#"{"message": {"text": "/"}}"#), None).is_none());
    }

    #[test]
    fn test_non_text_update_is_ignored() {
        assert!(route(&update(r#"{"message": {"chat": {"id": 1}}}"#), None).is_none());
        assert!(route(&update(r#"{"update_id": 10}"#), None).is_none());
    }

    #[test]
    fn test_edited_message_is_echoed() {
        let reply = route(&update(r#"{"edited_message": {"text": "fixed"}}"#), None).unwrap();
        assert_eq!(reply.text, "You said: fixed");
    }
}
