//! Integration tests for the routing dispatcher
//!
//! The dispatcher is a pure state transition over the session registry
//! and channel directory, so full protocol scenarios run without any
//! socket.

use std::net::SocketAddr;

use parley::protocol::{Reply, Request};
use parley::server::{Dispatcher, Outbound};

fn endpoint(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new("Common", 64)
}

fn login(d: &mut Dispatcher, name: &str, from: SocketAddr) {
    let replies = d.dispatch(
        Request::Login {
            username: name.to_string(),
        },
        from,
    );
    assert!(replies.is_empty(), "login is fire-and-forget");
}

fn join(d: &mut Dispatcher, channel: &str, from: SocketAddr) {
    let replies = d.dispatch(
        Request::Join {
            channel: channel.to_string(),
        },
        from,
    );
    assert!(replies.is_empty(), "join sends no reply");
}

fn say_recipients(outbound: &[Outbound]) -> Vec<SocketAddr> {
    outbound
        .iter()
        .filter(|o| matches!(o.reply, Reply::Say { .. }))
        .map(|o| o.dest)
        .collect()
}

#[test]
fn double_join_is_idempotent() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));
    join(&mut d, "dev", endpoint(2000));
    join(&mut d, "dev", endpoint(2000));

    let replies = d.dispatch(
        Request::Who {
            channel: "dev".to_string(),
        },
        endpoint(2000),
    );
    assert_eq!(replies.len(), 1);
    assert_eq!(
        replies[0].reply,
        Reply::UserList {
            channel: "dev".to_string(),
            users: vec!["alice".to_string()],
        }
    );
}

#[test]
fn say_reaches_every_subscriber_exactly_once() {
    let mut d = dispatcher();
    for (name, port) in [("alice", 2000), ("bob", 2001), ("carol", 2002)] {
        login(&mut d, name, endpoint(port));
        join(&mut d, "dev", endpoint(port));
    }
    // dave is logged in but not on the channel
    login(&mut d, "dave", endpoint(2003));

    let outbound = d.dispatch(
        Request::Say {
            channel: "dev".to_string(),
            text: "hi".to_string(),
        },
        endpoint(2000),
    );

    let mut recipients = say_recipients(&outbound);
    recipients.sort();
    assert_eq!(
        recipients,
        vec![endpoint(2000), endpoint(2001), endpoint(2002)]
    );
    for o in &outbound {
        assert_eq!(
            o.reply,
            Reply::Say {
                channel: "dev".to_string(),
                username: "alice".to_string(),
                text: "hi".to_string(),
            }
        );
    }
}

#[test]
fn login_join_say_scenario() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));
    join(&mut d, "Common", endpoint(2000));
    join(&mut d, "dev", endpoint(2000));

    let outbound = d.dispatch(
        Request::Say {
            channel: "dev".to_string(),
            text: "hi".to_string(),
        },
        endpoint(2000),
    );

    assert_eq!(say_recipients(&outbound), vec![endpoint(2000)]);
    assert_eq!(
        outbound[0].reply,
        Reply::Say {
            channel: "dev".to_string(),
            username: "alice".to_string(),
            text: "hi".to_string(),
        }
    );
}

#[test]
fn say_from_unknown_session_is_dropped() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));
    join(&mut d, "dev", endpoint(2000));

    let outbound = d.dispatch(
        Request::Say {
            channel: "dev".to_string(),
            text: "hi".to_string(),
        },
        endpoint(9999),
    );
    assert!(outbound.is_empty());
}

#[test]
fn say_on_unknown_channel_is_dropped() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));

    let outbound = d.dispatch(
        Request::Say {
            channel: "ghost".to_string(),
            text: "hi".to_string(),
        },
        endpoint(2000),
    );
    assert!(outbound.is_empty());
}

#[test]
fn sender_membership_is_not_checked() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));
    join(&mut d, "dev", endpoint(2000));
    login(&mut d, "mallory", endpoint(2001));

    // mallory never joined dev, but the claimed channel is trusted
    let outbound = d.dispatch(
        Request::Say {
            channel: "dev".to_string(),
            text: "hello".to_string(),
        },
        endpoint(2001),
    );
    assert_eq!(say_recipients(&outbound), vec![endpoint(2000)]);
}

#[test]
fn channel_persists_until_last_subscriber_leaves() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));
    login(&mut d, "bob", endpoint(2001));
    join(&mut d, "dev", endpoint(2000));
    join(&mut d, "dev", endpoint(2001));

    let replies = d.dispatch(
        Request::Leave {
            channel: "dev".to_string(),
        },
        endpoint(2000),
    );
    assert!(replies.is_empty());
    assert!(d.directory().contains("dev"));

    d.dispatch(
        Request::Leave {
            channel: "dev".to_string(),
        },
        endpoint(2001),
    );
    assert!(!d.directory().contains("dev"));

    let replies = d.dispatch(Request::List, endpoint(2000));
    assert_eq!(replies.len(), 1);
    let Reply::ChannelList { channels } = &replies[0].reply else {
        panic!("expected channel list");
    };
    assert!(!channels.contains(&"dev".to_string()));
}

#[test]
fn default_channel_is_always_listed() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));

    let replies = d.dispatch(Request::List, endpoint(2000));
    let Reply::ChannelList { channels } = &replies[0].reply else {
        panic!("expected channel list");
    };
    assert!(channels.contains(&"Common".to_string()));
}

#[test]
fn who_on_unknown_channel_is_one_error() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));

    let replies = d.dispatch(
        Request::Who {
            channel: "ghost".to_string(),
        },
        endpoint(2000),
    );
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].dest, endpoint(2000));
    assert!(matches!(replies[0].reply, Reply::Error { .. }));
}

#[test]
fn leave_unknown_channel_is_one_error() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));

    let replies = d.dispatch(
        Request::Leave {
            channel: "ghost".to_string(),
        },
        endpoint(2000),
    );
    assert_eq!(replies.len(), 1);
    assert!(matches!(replies[0].reply, Reply::Error { .. }));
}

#[test]
fn logout_cascades_channel_cleanup() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));
    join(&mut d, "dev", endpoint(2000));
    join(&mut d, "ops", endpoint(2000));

    let replies = d.dispatch(Request::Logout, endpoint(2000));
    assert!(replies.is_empty());
    assert!(d.registry().lookup(endpoint(2000)).is_none());
    assert!(!d.directory().contains("dev"));
    assert!(!d.directory().contains("ops"));
    assert!(d.directory().contains("Common"));
}

#[test]
fn login_at_capacity_is_rejected_with_error() {
    let mut d = Dispatcher::new("Common", 2);
    login(&mut d, "alice", endpoint(2000));
    login(&mut d, "bob", endpoint(2001));

    let replies = d.dispatch(
        Request::Login {
            username: "carol".to_string(),
        },
        endpoint(2002),
    );
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].dest, endpoint(2002));
    assert_eq!(
        replies[0].reply,
        Reply::Error {
            message: "Failed to log into the server.".to_string(),
        }
    );
    assert!(d.registry().lookup(endpoint(2002)).is_none());
}

#[test]
fn relogin_replaces_session_and_cleans_channels() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));
    join(&mut d, "dev", endpoint(2000));

    login(&mut d, "alice2", endpoint(2000));

    // the old membership was cascaded away with the old session
    assert!(!d.directory().contains("dev"));
    let session = d.registry().lookup(endpoint(2000)).unwrap();
    assert_eq!(session.username(), "alice2");
    assert!(session.channels().is_empty());
}

#[test]
fn requests_from_unknown_sessions_are_dropped() {
    let mut d = dispatcher();

    assert!(d
        .dispatch(
            Request::Join {
                channel: "dev".to_string(),
            },
            endpoint(9999),
        )
        .is_empty());
    assert!(!d.directory().contains("dev"));

    assert!(d.dispatch(Request::List, endpoint(9999)).is_empty());
    assert!(d.dispatch(Request::Logout, endpoint(9999)).is_empty());
}

#[test]
fn overlong_channel_name_is_truncated_consistently() {
    let mut d = dispatcher();
    login(&mut d, "alice", endpoint(2000));

    let long_name = "c".repeat(100);
    join(&mut d, &long_name, endpoint(2000));

    let truncated: String = "c".repeat(31);
    assert!(d.directory().contains(&truncated));

    // say with the same overlong name reaches the truncated channel
    let outbound = d.dispatch(
        Request::Say {
            channel: long_name,
            text: "hi".to_string(),
        },
        endpoint(2000),
    );
    assert_eq!(say_recipients(&outbound), vec![endpoint(2000)]);
}
