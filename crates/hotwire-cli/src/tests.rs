use super::*;

use std::cell::RefCell;
use std::net::UdpSocket;
use std::time::Duration;

use hotwire_config::{Config, ListenerEndpoint};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

struct FakeDaemon {
    socket: UdpSocket,
}

impl FakeDaemon {
    fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("bind fake daemon");
        socket
            .set_read_timeout(Some(Duration::from_millis(500)))
            .expect("set read timeout");
        Self { socket }
    }

    fn port(&self) -> u16 {
        self.socket.local_addr().expect("local addr").port()
    }

    fn receive(&self) -> Option<Value> {
        let mut buffer = [0_u8; 4096];
        let (length, _) = self.socket.recv_from(&mut buffer).ok()?;
        serde_json::from_slice(buffer.get(..length)?).ok()
    }
}

#[derive(Default)]
struct TestWorld {
    config: Config,
    daemon: Option<FakeDaemon>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_code: Option<ExitCode>,
}

impl TestWorld {
    fn start_daemon(&mut self) {
        let daemon = FakeDaemon::bind();
        self.config.listener = ListenerEndpoint::datagram("127.0.0.1", daemon.port());
        self.daemon = Some(daemon);
    }

    fn run(&mut self, command: &str) {
        self.stdout.clear();
        self.stderr.clear();
        let args = std::iter::once(OsString::from("hotwire"))
            .chain(command.split_whitespace().map(OsString::from))
            .collect::<Vec<_>>();
        let loader = StaticConfigLoader {
            config: self.config.clone(),
        };
        let exit = run_with_loader(args, &mut self.stdout, &mut self.stderr, &loader);
        self.exit_code = Some(exit);
    }

    fn received(&self) -> Option<Value> {
        self.daemon.as_ref()?.receive()
    }

    fn stdout_text(&self) -> String {
        String::from_utf8(self.stdout.clone()).expect("stdout utf8")
    }

    fn stderr_text(&self) -> String {
        String::from_utf8(self.stderr.clone()).expect("stderr utf8")
    }
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

#[given("a fake daemon listening for datagrams")]
fn given_fake_daemon(world: &RefCell<TestWorld>) {
    world.borrow_mut().start_daemon();
}

#[when("the operator runs \"{command}\"")]
fn when_operator_runs(world: &RefCell<TestWorld>, command: String) {
    world.borrow_mut().run(&command);
}

#[then("the daemon receives '{payload}'")]
fn then_daemon_receives(world: &RefCell<TestWorld>, payload: String) {
    let world = world.borrow();
    let expected: Value = serde_json::from_str(&payload).expect("expected payload is JSON");
    assert_eq!(world.received(), Some(expected));
}

#[then("the daemon receives nothing")]
fn then_daemon_receives_nothing(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().received(), None);
}

#[then("stdout contains \"{snippet}\"")]
fn then_stdout_contains(world: &RefCell<TestWorld>, snippet: String) {
    let stdout = world.borrow().stdout_text();
    assert!(stdout.contains(&snippet), "stdout {stdout:?} lacks {snippet:?}");
}

#[then("stderr contains \"{snippet}\"")]
fn then_stderr_contains(world: &RefCell<TestWorld>, snippet: String) {
    let stderr = world.borrow().stderr_text();
    assert!(stderr.contains(&snippet), "stderr {stderr:?} lacks {snippet:?}");
}

#[then("the CLI succeeds")]
fn then_cli_succeeds(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().exit_code, Some(ExitCode::SUCCESS));
}

#[then("the CLI fails")]
fn then_cli_fails(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().exit_code, Some(ExitCode::FAILURE));
}

#[scenario(path = "tests/features/hotwire_cli.feature")]
fn hotwire_cli_behaviour(world: RefCell<TestWorld>) {
    let _ = world;
}
