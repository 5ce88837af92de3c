/// What an incoming chat message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`, `/start@botname` or `/start <payload>`
    Start,
    /// Trigger prefix found; holds the trimmed remainder (possibly empty)
    Generate(String),
    Unrecognized,
}

impl Command {
    /// The trigger match is case-insensitive and needs no word boundary:
    /// `Veo3cat` yields a prompt of `cat`.
    pub fn parse(text: &str, trigger: &str) -> Self {
        let text = text.trim();

        if is_start(text) {
            return Command::Start;
        }

        match strip_trigger(text, trigger) {
            Some(rest) => Command::Generate(rest.trim().to_string()),
            None => Command::Unrecognized,
        }
    }
}

fn is_start(text: &str) -> bool {
    let head = text.split_whitespace().next().unwrap_or("");
    head == "/start" || head.starts_with("/start@")
}

fn strip_trigger<'a>(text: &'a str, trigger: &str) -> Option<&'a str> {
    if trigger.is_empty() {
        return None;
    }
    let head = text.get(..trigger.len())?;
    if head.to_lowercase() == trigger.to_lowercase() {
        Some(&text[trigger.len()..])
    } else {
        None
    }
}
