// Scripted stand-in for the adb binary shared by the integration tests

#![allow(dead_code)]

use adb_wireless::{CommandOutput, ToolRunner, WirelessConfig, WirelessConfigBuilder};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct Script {
    responses: HashMap<String, VecDeque<CommandOutput>>,
    calls: Vec<(String, Duration)>,
    pauses: Vec<Duration>,
}

/// Responses are keyed by the space-joined argument list. The last queued
/// response for a command is repeated; unknown commands fail.
#[derive(Clone, Default)]
pub struct FakeAdb {
    script: Rc<RefCell<Script>>,
}

impl FakeAdb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, args: &str, output: CommandOutput) -> &Self {
        self.script
            .borrow_mut()
            .responses
            .entry(args.to_string())
            .or_default()
            .push_back(output);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.borrow().calls.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn timeouts(&self) -> Vec<(String, Duration)> {
        self.script.borrow().calls.clone()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.script.borrow().pauses.clone()
    }
}

impl ToolRunner for FakeAdb {
    fn run(&self, args: &[&str], timeout: Duration) -> CommandOutput {
        let key = args.join(" ");
        let mut script = self.script.borrow_mut();
        script.calls.push((key.clone(), timeout));

        match script.responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => CommandOutput::failed(&format!("unexpected command: {}", key)),
        }
    }

    fn pause(&self, duration: Duration) {
        self.script.borrow_mut().pauses.push(duration);
    }
}

pub fn config() -> WirelessConfig {
    WirelessConfigBuilder::default().build()
}

pub const VERSION: &str = "Android Debug Bridge version 1.0.41\nVersion 34.0.5-10900879";
pub const WLAN0_ADDR: &str = "30: wlan0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500\n    inet 192.168.1.10/24 brd 192.168.1.255 scope global wlan0";
