//! Credential negotiation for a selected access point.
//!
//! Negotiation is a small state machine driven by operator answers:
//!
//! ```text
//! Start ──open network──────────────────────────────▶ Done (reuse)
//!   │
//!   ├──profile stored──▶ CheckProfile ──"y"─────────▶ Done (reuse)
//!   │                        │
//!   │                        └──other──┐
//!   └──no profile──────────────────────┴▶ CollectCredentials ──▶ Done
//! ```

use log::debug;

use crate::Result;
use crate::api::adapters::InputSource;
use crate::api::models::{AccessPoint, CredentialRequest, SecurityFlags, WifiError};
use crate::util::utils::is_affirmative;

pub(crate) const REUSE_PROFILE_PROMPT: &str =
    "A network profile already exist, do you want to use it (y/n)? ";
pub(crate) const USERNAME_PROMPT: &str = "Please enter a username: ";
pub(crate) const PASSWORD_PROMPT: &str = "Please enter the wifi password: ";
pub(crate) const INVALID_PASSWORD: &str = "Password is not valid for this network type.";
pub(crate) const DOMAIN_PROMPT: &str = "Please enter a domain: ";

enum NegotiationState {
    Start,
    CheckProfile,
    CollectCredentials,
    Done(CredentialRequest),
}

/// Produces the credentials for connecting to `ap`.
///
/// # Errors
///
/// Returns `WifiError::EndOfInput` if input ends while a required answer
/// (profile reuse, username or password) is pending.
pub(crate) fn negotiate(ap: &AccessPoint, input: &mut dyn InputSource) -> Result<CredentialRequest> {
    let mut state = NegotiationState::Start;

    loop {
        state = match state {
            NegotiationState::Start => {
                if !ap.requires_password() {
                    debug!("'{}' is open, no credentials needed", ap.name);
                    NegotiationState::Done(CredentialRequest::reuse_profile())
                } else if ap.has_profile {
                    NegotiationState::CheckProfile
                } else {
                    NegotiationState::CollectCredentials
                }
            }
            NegotiationState::CheckProfile => {
                let answer = required(input, REUSE_PROFILE_PROMPT)?;
                if is_affirmative(&answer) {
                    debug!("Reusing stored profile for '{}'", ap.name);
                    NegotiationState::Done(CredentialRequest::reuse_profile())
                } else {
                    NegotiationState::CollectCredentials
                }
            }
            NegotiationState::CollectCredentials => {
                NegotiationState::Done(collect_credentials(ap, input)?)
            }
            NegotiationState::Done(creds) => return Ok(creds),
        };
    }
}

fn collect_credentials(ap: &AccessPoint, input: &mut dyn InputSource) -> Result<CredentialRequest> {
    let caps = ap.capabilities();
    let mut creds = CredentialRequest::default();

    if caps.contains(SecurityFlags::REQUIRES_USERNAME) {
        creds.username = Some(required(input, USERNAME_PROMPT)?);
    }

    creds.password = Some(read_password(ap, input)?);

    if caps.contains(SecurityFlags::SUPPORTS_DOMAIN) {
        creds.domain = input
            .prompt(DOMAIN_PROMPT)?
            .filter(|domain| !domain.trim().is_empty());
    }

    debug!(
        "Collected credentials for '{}' | username={} domain={}",
        ap.name,
        creds.username.is_some(),
        creds.domain.is_some()
    );
    Ok(creds)
}

/// Prompts until the password satisfies the access point's format rule.
fn read_password(ap: &AccessPoint, input: &mut dyn InputSource) -> Result<String> {
    loop {
        let password = required(input, PASSWORD_PROMPT)?;
        if ap.is_valid_password(&password) {
            return Ok(password);
        }
        input.notify(INVALID_PASSWORD)?;
    }
}

fn required(input: &mut dyn InputSource, message: &str) -> Result<String> {
    input.prompt(message)?.ok_or(WifiError::EndOfInput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::adapters::LineInput;
    use crate::api::models::SecurityKind;
    use std::io::Cursor;

    fn script(answers: &str) -> LineInput<Cursor<String>, Vec<u8>> {
        LineInput::new(Cursor::new(answers.to_string()), Vec::new())
    }

    fn shown(input: LineInput<Cursor<String>, Vec<u8>>) -> String {
        String::from_utf8(input.into_writer()).unwrap()
    }

    #[test]
    fn open_network_needs_no_prompts() {
        let ap = AccessPoint::new("Cafe", 60, SecurityKind::Open);
        let mut input = script("");

        let creds = negotiate(&ap, &mut input).unwrap();

        assert!(creds.reuse_existing_profile);
        assert_eq!(creds.password, None);
        assert_eq!(shown(input), "");
    }

    #[test]
    fn stored_profile_reused_on_yes() {
        let ap = AccessPoint::new("Home", 80, SecurityKind::WpaPsk).with_profile(true);
        let mut input = script("Y\n");

        let creds = negotiate(&ap, &mut input).unwrap();

        assert_eq!(creds, CredentialRequest::reuse_profile());
        assert_eq!(shown(input), REUSE_PROFILE_PROMPT);
    }

    #[test]
    fn declining_profile_collects_password() {
        let ap = AccessPoint::new("Home", 80, SecurityKind::WpaPsk).with_profile(true);
        let mut input = script("n\nhunter22\n");

        let creds = negotiate(&ap, &mut input).unwrap();

        assert!(!creds.reuse_existing_profile);
        assert_eq!(creds.password.as_deref(), Some("hunter22"));
        assert_eq!(creds.username, None);
    }

    #[test]
    fn invalid_password_is_prompted_again() {
        let ap = AccessPoint::new("Home", 80, SecurityKind::WpaPsk);
        let mut input = script("short\nlong enough\n");

        let creds = negotiate(&ap, &mut input).unwrap();

        assert_eq!(creds.password.as_deref(), Some("long enough"));
        assert_eq!(
            shown(input),
            format!("{PASSWORD_PROMPT}{INVALID_PASSWORD}\n{PASSWORD_PROMPT}")
        );
    }

    #[test]
    fn enterprise_collects_username_password_domain() {
        let ap = AccessPoint::new("Corp", 70, SecurityKind::WpaEap);
        let mut input = script("alice\nsecret\ncorp.example\n");

        let creds = negotiate(&ap, &mut input).unwrap();

        assert_eq!(creds.username.as_deref(), Some("alice"));
        assert_eq!(creds.password.as_deref(), Some("secret"));
        assert_eq!(creds.domain.as_deref(), Some("corp.example"));
    }

    #[test]
    fn empty_domain_is_omitted() {
        let ap = AccessPoint::new("Corp", 70, SecurityKind::WpaEap);
        let mut input = script("alice\nsecret\n\n");

        let creds = negotiate(&ap, &mut input).unwrap();
        assert_eq!(creds.domain, None);

        let mut ended = script("alice\nsecret\n");
        let creds = negotiate(&ap, &mut ended).unwrap();
        assert_eq!(creds.domain, None);
    }

    #[test]
    fn end_of_input_during_password() {
        let ap = AccessPoint::new("Home", 80, SecurityKind::WpaPsk);
        let mut input = script("short\n");

        assert!(matches!(
            negotiate(&ap, &mut input),
            Err(WifiError::EndOfInput)
        ));
    }

    #[test]
    fn end_of_input_at_profile_question() {
        let ap = AccessPoint::new("Home", 80, SecurityKind::Wep).with_profile(true);
        let mut input = script("");

        assert!(matches!(
            negotiate(&ap, &mut input),
            Err(WifiError::EndOfInput)
        ));
    }
}
