//! Outbound prompt texts for the collection flow.

pub const WELCOME: &str = "Hi dear friends and family!\n\n\
Together with my friend Daniel, I\u{2019}m working on a fun little science project where we want to compare the \
real sound a rooster makes with how people say a rooster sounds in different languages.\n\n\
To do this, I\u{2019}m collecting short voice messages of people saying their version of something like \
\"cock-a-doodle-doo\" in their native language. We\u{2019}ve set a goal of at least 20 voices per language to include it in the analysis.\n\n\
Could you help me by recording yourself saying the rooster sound in your native language? \
Just one normal human voice saying it once \u{2014} no need to imitate an actual rooster!\n\n\
Please send your voice message below \u{1f413}\u{2728}";

pub const ASK_PERMISSION: &str = "Thanks! Got your voice message.\n\n\
1\u{fe0f}\u{20e3} May we make your recording public at the end of the project?\n\
It would be named with a name or pseudonym you provide, like: Kikeriki_German_Anna.wav\n\n\
Please reply with 'Yes' or 'No'.";

pub const ASK_LANGUAGE: &str = "2\u{fe0f}\u{20e3} What language is this sound from?";

pub const ASK_NAME: &str = "3\u{fe0f}\u{20e3} What is your name or pseudonym?";

pub const DONE: &str = "Thank you! \u{1f389} Your answers have been saved to the project.\n\
You can type /start to send another voice.";

pub const CANCELLED: &str = "Cancelled.";

pub const NOT_STARTED: &str = "Type /start to begin recording your rooster sound.";

pub const EXPECTED_VOICE: &str = "Please send a voice message to continue (or /cancel to stop).";

pub const EXPECTED_TEXT: &str = "Please answer with a text message (or /cancel to stop).";

pub const SAVE_FAILED: &str = "Sorry, something went wrong while saving your answers. \
Please send your name or pseudonym again to retry.";

pub const RESTART_NEEDED: &str = "Sorry, something went wrong with this conversation. \
Please type /start to begin again.";

pub fn voice_too_long(limit_secs: u32) -> String {
    format!("Please send a voice message shorter than {limit_secs} seconds.")
}
