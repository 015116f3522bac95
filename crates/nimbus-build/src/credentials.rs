//! Apple credential resolution for publishing
//!
//! Credentials come from positional arguments first, then from interactive
//! prompts. A base64-encoded Apple session replaces the interactive login
//! entirely. Nothing resolved here is ever written to disk.

use std::fmt;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tracing::debug;

use crate::error::{BuildError, Result};
use crate::options::BuildOptions;

const APPLE_ID_PROMPT: &str = "Apple ID";
const APPLE_PASSWORD_PROMPT: &str = "Apple ID password";

/// Session tokens are accepted with or without padding.
const SESSION_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Source of interactive user input
pub trait Prompter: Send + Sync {
    /// Whether the session can prompt the user
    fn is_interactive(&self) -> bool;

    /// Ask for a line of text
    fn get_string(&self, prompt: &str, allow_empty: bool) -> Result<String>;

    /// Ask for a secret without echoing it
    fn get_password(&self, prompt: &str) -> Result<String>;
}

/// Apple ID username and password
#[derive(Clone, PartialEq, Eq)]
pub struct AppleCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AppleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppleCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Credentials used when publishing to the App Store
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PublishCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub app_specific_password: Option<String>,
    /// Decoded Apple session
    pub session: Option<String>,
}

impl fmt::Debug for PublishCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "app_specific_password",
                &self.app_specific_password.as_ref().map(|_| "<redacted>"),
            )
            .field("session", &self.session.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolve Apple ID credentials from `args`, prompting for whatever is missing
pub fn apple_credentials(args: &[String], prompter: &dyn Prompter) -> Result<AppleCredentials> {
    let (username, password) = credentials_from_args(args);

    let username = match username {
        Some(username) => username,
        None => {
            require_interactive(prompter, APPLE_ID_PROMPT)?;
            prompter.get_string(APPLE_ID_PROMPT, false)?
        }
    };

    let password = match password {
        Some(password) => password,
        None => {
            require_interactive(prompter, APPLE_PASSWORD_PROMPT)?;
            prompter.get_password(APPLE_PASSWORD_PROMPT)?
        }
    };

    Ok(AppleCredentials { username, password })
}

/// Resolve publishing credentials.
///
/// Without a session token this behaves like [`apple_credentials`]. With a
/// session token nothing is prompted; a non-interactive session must then
/// still supply both username and password as arguments.
pub fn extended_apple_credentials(
    args: &[String],
    options: &BuildOptions,
    prompter: &dyn Prompter,
) -> Result<PublishCredentials> {
    let app_specific_password = options.apple_application_specific_password.clone();

    let Some(encoded) = options
        .apple_session_base64
        .as_deref()
        .filter(|s| !s.is_empty())
    else {
        let credentials = apple_credentials(args, prompter)?;
        return Ok(PublishCredentials {
            username: Some(credentials.username),
            password: Some(credentials.password),
            app_specific_password,
            session: None,
        });
    };

    let session = decode_session(encoded)?;
    let (username, password) = credentials_from_args(args);

    if !prompter.is_interactive() && (username.is_none() || password.is_none()) {
        return Err(BuildError::interactive_input_required(
            "Please provide Apple ID and Apple ID password",
        ));
    }

    debug!(has_username = username.is_some(), "using Apple session credentials");
    Ok(PublishCredentials {
        username,
        password,
        app_specific_password,
        session: Some(session),
    })
}

fn credentials_from_args(args: &[String]) -> (Option<String>, Option<String>) {
    let non_empty = |index: usize| args.get(index).filter(|s| !s.is_empty()).cloned();
    (non_empty(0), non_empty(1))
}

fn require_interactive(prompter: &dyn Prompter, what: &str) -> Result<()> {
    if prompter.is_interactive() {
        Ok(())
    } else {
        Err(BuildError::interactive_input_required(format!(
            "{} is required but the session is not interactive; pass it as an argument",
            what
        )))
    }
}

fn decode_session(encoded: &str) -> Result<String> {
    let bytes = SESSION_ENGINE
        .decode(encoded.trim())
        .map_err(|e| BuildError::InvalidSession {
            message: e.to_string(),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted prompter recording every prompt it was asked
    pub(crate) struct ScriptedPrompter {
        interactive: bool,
        answers: Mutex<VecDeque<String>>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl ScriptedPrompter {
        pub(crate) fn interactive(answers: &[&str]) -> Self {
            Self {
                interactive: true,
                answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn non_interactive() -> Self {
            Self {
                interactive: false,
                answers: Mutex::new(VecDeque::new()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn answer(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BuildError::Prompt(format!("no answer scripted for '{}'", prompt)))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn is_interactive(&self) -> bool {
            self.interactive
        }

        fn get_string(&self, prompt: &str, _allow_empty: bool) -> Result<String> {
            self.answer(prompt)
        }

        fn get_password(&self, prompt: &str) -> Result<String> {
            self.answer(prompt)
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn encode(raw: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(raw)
    }

    #[test]
    fn test_args_used_without_prompting() {
        let prompter = ScriptedPrompter::non_interactive();
        let credentials = apple_credentials(&args(&["u", "p"]), &prompter).unwrap();

        assert_eq!(credentials.username, "u");
        assert_eq!(credentials.password, "p");
        assert!(prompter.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_prompts_for_missing_password() {
        let prompter = ScriptedPrompter::interactive(&["hunter2"]);
        let credentials = apple_credentials(&args(&["dev@example.com"]), &prompter).unwrap();

        assert_eq!(credentials.password, "hunter2");
        assert_eq!(*prompter.prompts.lock().unwrap(), vec![APPLE_PASSWORD_PROMPT]);
    }

    #[test]
    fn test_prompts_for_both_in_order() {
        let prompter = ScriptedPrompter::interactive(&["dev@example.com", "hunter2"]);
        let credentials = apple_credentials(&[], &prompter).unwrap();

        assert_eq!(credentials.username, "dev@example.com");
        assert_eq!(
            *prompter.prompts.lock().unwrap(),
            vec![APPLE_ID_PROMPT, APPLE_PASSWORD_PROMPT]
        );
    }

    #[test]
    fn test_non_interactive_without_args_fails() {
        let prompter = ScriptedPrompter::non_interactive();
        let err = apple_credentials(&[], &prompter).unwrap_err();
        assert!(matches!(err, BuildError::InteractiveInputRequired { .. }));
    }

    #[test]
    fn test_extended_args_without_session() {
        let prompter = ScriptedPrompter::non_interactive();
        let mut options = BuildOptions::new();
        options.apple_application_specific_password = Some("abcd-efgh".to_string());

        let credentials =
            extended_apple_credentials(&args(&["u", "p"]), &options, &prompter).unwrap();

        assert_eq!(credentials.username.as_deref(), Some("u"));
        assert_eq!(credentials.password.as_deref(), Some("p"));
        assert_eq!(credentials.app_specific_password.as_deref(), Some("abcd-efgh"));
        assert_eq!(credentials.session, None);
        assert!(prompter.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_session_is_treated_as_absent() {
        let prompter = ScriptedPrompter::non_interactive();
        let options = BuildOptions::new().with_apple_session(encode(""));

        let err = extended_apple_credentials(&[], &options, &prompter).unwrap_err();
        assert!(matches!(err, BuildError::InteractiveInputRequired { .. }));
    }

    #[test]
    fn test_session_is_decoded_and_merged() {
        let prompter = ScriptedPrompter::non_interactive();
        let mut options = BuildOptions::new().with_apple_session(encode("session-cookie"));
        options.apple_application_specific_password = Some("abcd-efgh".to_string());

        let credentials =
            extended_apple_credentials(&args(&["u", "p"]), &options, &prompter).unwrap();

        assert_eq!(credentials.username.as_deref(), Some("u"));
        assert_eq!(credentials.password.as_deref(), Some("p"));
        assert_eq!(credentials.session.as_deref(), Some("session-cookie"));
        assert_eq!(credentials.app_specific_password.as_deref(), Some("abcd-efgh"));
        assert!(prompter.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_session_without_args_in_ci_fails() {
        let prompter = ScriptedPrompter::non_interactive();
        let options = BuildOptions::new().with_apple_session(encode("session-cookie"));

        let err = extended_apple_credentials(&args(&["u"]), &options, &prompter).unwrap_err();
        assert_eq!(err.to_string(), "Please provide Apple ID and Apple ID password");
    }

    #[test]
    fn test_session_interactive_does_not_prompt() {
        let prompter = ScriptedPrompter::interactive(&[]);
        let options = BuildOptions::new().with_apple_session(encode("session-cookie"));

        let credentials = extended_apple_credentials(&[], &options, &prompter).unwrap();
        assert_eq!(credentials.username, None);
        assert_eq!(credentials.session.as_deref(), Some("session-cookie"));
        assert!(prompter.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unpadded_session_is_accepted() {
        let prompter = ScriptedPrompter::non_interactive();
        let encoded = encode("ab").trim_end_matches('=').to_string();
        let options = BuildOptions::new().with_apple_session(encoded);

        let credentials =
            extended_apple_credentials(&args(&["u", "p"]), &options, &prompter).unwrap();
        assert_eq!(credentials.session.as_deref(), Some("ab"));
    }

    #[test]
    fn test_invalid_session_is_rejected() {
        let prompter = ScriptedPrompter::non_interactive();
        let options = BuildOptions::new().with_apple_session("%%%");

        let err = extended_apple_credentials(&args(&["u", "p"]), &options, &prompter).unwrap_err();
        assert!(matches!(err, BuildError::InvalidSession { .. }));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = AppleCredentials {
            username: "u".to_string(),
            password: "super-secret".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("super-secret"));
    }
}
