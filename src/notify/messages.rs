use std::time::Duration;
use crate::config::Settings;
use crate::notify::FailureReason;
use crate::runtime::task::ArtifactRef;

/// User-facing texts. None of them carry internal error detail.
#[derive(Debug, Clone)]
pub struct Messages {
    trigger: String,
    min_prompt_chars: usize,
    wait_hint: Duration,
}

impl Messages {
    pub fn new(trigger: impl Into<String>, min_prompt_chars: usize, wait_hint: Duration) -> Self {
        Self {
            trigger: trigger.into(),
            min_prompt_chars,
            wait_hint,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.bot.trigger.clone(),
            settings.bot.min_prompt_chars,
            settings.polling.initial_wait(),
        )
    }

    pub fn welcome(&self) -> String {
        format!(
            "👋 Welcome to the Veo3 Video Generator Bot!\n\n\
             I can turn your prompt into a video.\n\n\
             To generate one, write {trigger} followed by your prompt.\n\n\
             Example:\n{trigger} A cinematic shot of a lion roaring in the savanna during sunset.",
            trigger = self.trigger
        )
    }

    pub fn usage(&self) -> String {
        format!(
            "I did not recognise a command. To create a video write {trigger} followed by your prompt. \
             Example: {trigger} space ship landing on mars",
            trigger = self.trigger
        )
    }

    pub fn too_short(&self) -> String {
        format!(
            "The prompt is too short. Please describe it in more detail (minimum {} characters).",
            self.min_prompt_chars
        )
    }

    pub fn already_active(&self) -> String {
        "A video is already being generated for you. Please wait for it to finish.".to_string()
    }

    pub fn started(&self, prompt: &str) -> String {
        format!("Generating video for: {}", prompt)
    }

    pub fn waiting(&self) -> String {
        format!(
            "Please wait about {}. Generation runs in the background and I will send the video once it is ready. ⏳",
            describe_wait(self.wait_hint)
        )
    }

    pub fn success(&self, prompt: &str, artifact: &ArtifactRef) -> String {
        format!("✅ Your Veo3 video is ready!\nPrompt: {}\n{}", prompt, artifact)
    }

    pub fn failure(&self, prompt: &str, reason: FailureReason) -> String {
        match reason {
            FailureReason::SubmissionFailed => format!(
                "❌ Sorry, the video task for \"{}\" could not be started. Please try again later.",
                prompt
            ),
            FailureReason::TimedOut => format!(
                "😔 Sorry, video generation for \"{}\" failed or took too long. Please try again later.",
                prompt
            ),
        }
    }
}

fn describe_wait(wait: Duration) -> String {
    let secs = wait.as_secs();
    match secs {
        0..=59 => format!("{} seconds", secs),
        60..=119 => "1 minute".to_string(),
        _ => format!("{} minutes", secs / 60),
    }
}
