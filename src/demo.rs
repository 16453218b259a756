// Demo mode: mock chat traffic to showcase the chat screen
//
// A scripted opening (joins, topics, a short conversation with a highlight)
// is followed by random chatter until shutdown. Events go to the UI loop
// over a channel; the loop decides how to render them.

use chatview::ui::Member;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;

pub const NET_ID: &str = "demo";
pub const NET_NAME: &str = "demonet";
/// Our own nickname on the demo network
pub const SELF_NICK: &str = "me";

const CHANNELS: [&str; 3] = ["#ratatui", "#rust", "#offtopic"];

const NICKS: [&str; 8] = [
    "alice", "bob", "carol", "dave", "erin", "ferris", "mallory", "trent",
];

const CHATTER: [&str; 16] = [
    "anyone tried the new release yet?",
    "the borrow checker and I have reached an understanding",
    "cargo build --release takes forever on this laptop",
    "has anyone seen my lifetimes",
    "just use an arena",
    "that is a job for a channel, not a mutex",
    "works on my machine",
    "me: can you take a look at the PR when you have a minute?",
    "brb coffee",
    "is it unsafe if nobody sees it",
    "half-block images in the terminal are surprisingly good",
    "the wide chars in that nick broke my layout again",
    "rebased, CI is green",
    "did the meeting move?",
    "me, you around?",
    "TIL about OSC 777",
];

/// Something that happened on the demo network
#[derive(Debug, Clone, PartialEq)]
pub enum DemoEvent {
    /// We joined a channel
    Join {
        channel: String,
        topic: String,
        members: Vec<Member>,
    },
    Message {
        channel: String,
        nick: String,
        text: String,
    },
    /// Someone else joined
    MemberJoin { channel: String, nick: String },
    Away { nick: String, away: bool },
}

/// Small xorshift generator; the demo only needs variety, not quality
pub struct Chatter {
    state: u64,
}

impl Chatter {
    pub fn new(seed: u64) -> Self {
        Self { state: seed | 1 }
    }

    /// Seed from the process' random hasher keys
    pub fn from_entropy() -> Self {
        use std::collections::hash_map::RandomState;
        use std::hash::{BuildHasher, Hasher};

        Self::new(RandomState::new().build_hasher().finish())
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Next random event and the delay before it
    pub fn next_event(&mut self) -> (DemoEvent, Duration) {
        let delay = Duration::from_millis(800 + self.next_u64() % 2500);
        let nick = self.pick(&NICKS).to_string();
        let event = match self.next_u64() % 20 {
            0 => DemoEvent::Away {
                nick,
                away: self.next_u64() % 2 == 0,
            },
            1 => DemoEvent::MemberJoin {
                channel: self.pick(&CHANNELS).to_string(),
                nick: format!("guest{}", self.next_u64() % 100),
            },
            _ => DemoEvent::Message {
                channel: self.pick(&CHANNELS).to_string(),
                nick,
                text: self.pick(&CHATTER).to_string(),
            },
        };
        (event, delay)
    }
}

fn member(name: &str) -> Member {
    Member {
        name: name.to_string(),
        is_self: name == SELF_NICK,
        ..Default::default()
    }
}

fn message(channel: &str, nick: &str, text: &str) -> DemoEvent {
    DemoEvent::Message {
        channel: channel.to_string(),
        nick: nick.to_string(),
        text: text.to_string(),
    }
}

/// Opening sequence with the delay (ms) after each event
pub fn generate_demo_sequence() -> Vec<(DemoEvent, u64)> {
    let mut ops = vec![member("ferris"), member("alice")];
    ops[0].power_level = "@".to_string();
    ops[1].power_level = "+".to_string();

    let mut ratatui: Vec<Member> = ops;
    ratatui.extend(["bob", "carol", SELF_NICK, "trent"].map(member));
    let mut gone = member("dave");
    gone.disconnected = true;
    ratatui.push(gone);

    let rust: Vec<Member> = ["alice", "erin", "ferris", "mallory", SELF_NICK]
        .map(member)
        .into();
    let offtopic: Vec<Member> = NICKS.map(member).into_iter().chain([member(SELF_NICK)]).collect();

    vec![
        (
            DemoEvent::Join {
                channel: "#ratatui".to_string(),
                topic: "Cooking terminal UIs | be nice".to_string(),
                members: ratatui,
            },
            300,
        ),
        (
            DemoEvent::Join {
                channel: "#rust".to_string(),
                topic: "https://www.rust-lang.org | ask away".to_string(),
                members: rust,
            },
            300,
        ),
        (
            DemoEvent::Join {
                channel: "#offtopic".to_string(),
                topic: String::new(),
                members: offtopic,
            },
            600,
        ),
        (message("#ratatui", "alice", "morning all"), 900),
        (message("#ratatui", "ferris", "o/"), 700),
        (
            message("#ratatui", "bob", "how do I keep a list scrolled to the selection?"),
            1500,
        ),
        (
            message(
                "#ratatui",
                "alice",
                "keep an offset and only move it when the selection leaves the window",
            ),
            1200,
        ),
        (message("#rust", "erin", "me: did you push the fix?"), 1000),
        (
            DemoEvent::Away {
                nick: "mallory".to_string(),
                away: true,
            },
            500,
        ),
    ]
}

/// Feed demo events until shutdown or until the receiver goes away
pub async fn run_demo(tx: mpsc::Sender<DemoEvent>, mut shutdown_rx: oneshot::Receiver<()>) {
    let script = generate_demo_sequence()
        .into_iter()
        .map(|(event, ms)| (event, Duration::from_millis(ms)));
    let mut chatter = Chatter::from_entropy();
    let random = std::iter::from_fn(move || Some(chatter.next_event()));

    for (event, delay) in script.chain(random) {
        if tx.send(event).await.is_err() {
            tracing::debug!("Demo receiver dropped");
            return;
        }
        tokio::select! {
            _ = &mut shutdown_rx => {
                tracing::info!("Demo received shutdown signal");
                return;
            }
            _ = sleep(delay) => {}
        }
    }
}
