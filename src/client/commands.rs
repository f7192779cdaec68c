//! Command interpreter - turn a completed input line into protocol actions

use crate::client::app::App;
use crate::protocol::Request;

/// Lines starting with this are commands; everything else is chat
pub const COMMAND_PREFIX: char = '/';

/// A parsed `/`-prefixed command
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Exit,
    Join(String),
    Leave(String),
    List,
    Who(String),
    Switch(String),
    Unknown,
}

/// Everything one completed line asks the I/O loop to do
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LineAction {
    /// Requests to transmit, in order
    pub requests: Vec<Request>,

    /// Local messages to print; never sent anywhere
    pub notices: Vec<String>,

    /// Terminate the client loop after transmitting
    pub exit: bool,
}

/// Channel arguments may carry a leading `#`, which is cosmetic
fn channel_arg(arg: &str) -> String {
    arg.strip_prefix('#').unwrap_or(arg).to_string()
}

/// A command needing an argument but lacking one parses as Unknown, as
/// does an unrecognized command word.
fn parse_command(line: &str) -> Command {
    let rest = &line[COMMAND_PREFIX.len_utf8()..];
    let mut split = rest.splitn(2, ' ');
    let word = split.next().unwrap_or("");
    let arg = split.next().map(str::trim).filter(|a| !a.is_empty());

    match (word, arg) {
        ("exit", _) => Command::Exit,
        ("list", _) => Command::List,
        ("join", Some(arg)) => Command::Join(channel_arg(arg)),
        ("leave", Some(arg)) => Command::Leave(channel_arg(arg)),
        ("who", Some(arg)) => Command::Who(channel_arg(arg)),
        ("switch", Some(arg)) => Command::Switch(channel_arg(arg)),
        _ => Command::Unknown,
    }
}

/// Interpret one completed line against the local state.
///
/// Pure with respect to I/O: the caller prints the notices and transmits
/// the requests.
pub fn apply_line(line: &str, app: &mut App) -> LineAction {
    let mut action = LineAction::default();

    if !line.starts_with(COMMAND_PREFIX) {
        // Plain chat line: dropped silently when empty or no channel is
        // active.
        if !line.is_empty() {
            if let Some(active) = app.active_channel() {
                action.requests.push(Request::Say {
                    channel: active.to_string(),
                    text: line.to_string(),
                });
            }
        }
        return action;
    }

    match parse_command(line) {
        Command::Exit => {
            action.requests.push(Request::Logout);
            action.exit = true;
        }
        Command::Join(channel) => {
            // The request is sent even when the saturated cache declines
            // to record the join.
            app.record_join(&channel);
            action.requests.push(Request::Join { channel });
        }
        Command::Leave(channel) => {
            app.record_leave(&channel);
            action.notices.push(format!("You left channel: {}", channel));
            action.requests.push(Request::Leave { channel });
        }
        Command::List => action.requests.push(Request::List),
        Command::Who(channel) => action.requests.push(Request::Who { channel }),
        Command::Switch(channel) => {
            if !app.switch_to(&channel) {
                action.notices.push(format!(
                    "Error: You are not subscribed to the channel: {}. \
                     Use /join command to subscribe to the channel",
                    channel
                ));
            }
        }
        Command::Unknown => action.notices.push("Unknown command".to_string()),
    }

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_is_say_on_active_channel() {
        let mut app = App::new("Common");
        let action = apply_line("hello there", &mut app);
        assert_eq!(
            action.requests,
            vec![Request::Say {
                channel: "Common".to_string(),
                text: "hello there".to_string(),
            }]
        );
        assert!(!action.exit);
    }

    #[test]
    fn plain_line_without_active_channel_is_dropped() {
        let mut app = App::new("Common");
        apply_line("/leave Common", &mut app);
        let action = apply_line("anyone here?", &mut app);
        assert!(action.requests.is_empty());
    }

    #[test]
    fn empty_line_is_dropped() {
        let mut app = App::new("Common");
        let action = apply_line("", &mut app);
        assert!(action.requests.is_empty());
        assert!(action.notices.is_empty());
    }

    #[test]
    fn join_strips_hash_and_activates() {
        let mut app = App::new("Common");
        let action = apply_line("/join #dev", &mut app);
        assert_eq!(
            action.requests,
            vec![Request::Join {
                channel: "dev".to_string(),
            }]
        );
        assert_eq!(app.active_channel(), Some("dev"));
    }

    #[test]
    fn switch_to_unknown_channel_is_local_error() {
        let mut app = App::new("Common");
        let action = apply_line("/switch #unknown", &mut app);
        assert!(action.requests.is_empty());
        assert_eq!(action.notices.len(), 1);
        assert!(action.notices[0].contains("not subscribed"));
        assert_eq!(app.active_channel(), Some("Common"));
    }

    #[test]
    fn exit_sends_logout_and_terminates() {
        let mut app = App::new("Common");
        let action = apply_line("/exit", &mut app);
        assert_eq!(action.requests, vec![Request::Logout]);
        assert!(action.exit);
    }

    #[test]
    fn leave_clears_cache_and_notifies() {
        let mut app = App::new("Common");
        app.record_join("dev");
        let action = apply_line("/leave dev", &mut app);
        assert_eq!(
            action.requests,
            vec![Request::Leave {
                channel: "dev".to_string(),
            }]
        );
        assert_eq!(action.notices, vec!["You left channel: dev".to_string()]);
        assert!(!app.is_subscribed("dev"));
    }

    #[test]
    fn command_without_required_argument_is_unknown() {
        let mut app = App::new("Common");
        let action = apply_line("/join", &mut app);
        assert!(action.requests.is_empty());
        assert_eq!(action.notices, vec!["Unknown command".to_string()]);
    }

    #[test]
    fn unrecognized_command_is_local_only() {
        let mut app = App::new("Common");
        let action = apply_line("/frobnicate now", &mut app);
        assert!(action.requests.is_empty());
        assert_eq!(action.notices, vec!["Unknown command".to_string()]);
    }

    #[test]
    fn saturated_cache_still_sends_join() {
        let mut app = App::new("Common");
        for i in 1..crate::client::app::SUBSCRIPTION_SLOTS {
            apply_line(&format!("/join ch{}", i), &mut app);
        }
        let action = apply_line("/join overflow", &mut app);
        assert_eq!(
            action.requests,
            vec![Request::Join {
                channel: "overflow".to_string(),
            }]
        );
        assert!(!app.is_subscribed("overflow"));
    }
}
