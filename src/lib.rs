// chatview - terminal chat screen
//
// The library draws a chat client's screen: buffer lists, a scrolling
// timeline, member list, status line and input prompt. It owns the terminal
// session and turns mouse input into logical clicks; everything a chat client
// decides (what a buffer contains, what a key does) stays with the caller.

pub mod config;
pub mod logging;
pub mod ui;
