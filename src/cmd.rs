use crate::device::Connector;
use crate::error::{WirelessError, WirelessResult};
use log::{debug, trace, warn};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 子进程状态轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 超时时写入 stderr 的固定文本
pub const TIMED_OUT: &str = "Command timed out";

/// 一次 ADB 调用的结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandOutput {
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.trim().to_string(),
            stderr: String::new(),
            success: true,
        }
    }

    pub fn failed(stderr: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.trim().to_string(),
            success: false,
        }
    }

    pub fn timed_out() -> Self {
        Self::failed(TIMED_OUT)
    }

    /// 非零退出或超时转换为 `ToolInvocationFailed`
    pub fn into_result(self, args: &[&str]) -> WirelessResult<String> {
        if self.success {
            Ok(self.stdout)
        } else {
            Err(WirelessError::ToolInvocationFailed {
                command: args.join(" "),
                stderr: self.stderr,
            })
        }
    }
}

/// ADB 子进程接口
///
/// 实现者从不返回错误：无法启动、非零退出和超时都体现在
/// [`CommandOutput::success`] 上，由调用方决定如何处理。
pub trait ToolRunner {
    /// 执行一次 ADB 调用，参数按原样传递，不经过 shell
    fn run(&self, args: &[&str], timeout: Duration) -> CommandOutput;

    /// 两次调用之间的阻塞等待
    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// 基于真实 ADB 可执行文件的实现
#[derive(Debug, Clone)]
pub struct AdbRunner {
    path: PathBuf,
}

impl AdbRunner {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ToolRunner for AdbRunner {
    fn run(&self, args: &[&str], timeout: Duration) -> CommandOutput {
        debug!("Running {} {}", self.path.display(), args.join(" "));

        let mut child = match Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return CommandOutput::failed(&e.to_string()),
        };

        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let finished = crate::utils::wait_with_polling(timeout, POLL_INTERVAL, || {
            Ok(child.try_wait()?.is_some())
        });

        match finished {
            Ok(true) => {}
            Ok(false) => {
                warn!("adb {} timed out after {:?}", args.join(" "), timeout);
                terminate(&mut child);
                return CommandOutput::timed_out();
            }
            Err(e) => {
                terminate(&mut child);
                return CommandOutput::failed(&e.to_string());
            }
        }

        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => return CommandOutput::failed(&e.to_string()),
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();
        trace!("adb {} -> {:?}\nstdout: {}\nstderr: {}", args.join(" "), status, stdout, stderr);

        CommandOutput {
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
            success: status.success(),
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("Failed to kill adb process: {}", e);
    }
    let _ = child.wait();
}

impl<R: ToolRunner> Connector<R> {
    /// 以普通超时执行命令，失败转换为错误
    pub(crate) fn exec(&self, args: &[&str]) -> WirelessResult<String> {
        self.runner
            .run(args, self.config.command_timeout())
            .into_result(args)
    }

    /// 在指定设备上执行 shell 命令
    pub(crate) fn shell(&self, serial: &str, command: &[&str]) -> WirelessResult<String> {
        let mut args = vec!["-s", serial, "shell"];
        args.extend_from_slice(command);
        self.exec(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_output_maps_to_invocation_error() {
        let err = CommandOutput::timed_out()
            .into_result(&["tcpip", "5555"])
            .unwrap_err();
        match err {
            WirelessError::ToolInvocationFailed { command, stderr } => {
                assert_eq!(command, "tcpip 5555");
                assert_eq!(stderr, "Command timed out");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_binary_is_reported_as_failure() {
        let runner = AdbRunner::new(PathBuf::from("/nonexistent/adb-wireless-test/adb"));
        let output = runner.run(&["version"], Duration::from_secs(1));
        assert!(!output.success);
        assert!(!output.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_times_out() {
        let runner = AdbRunner::new(PathBuf::from("sleep"));
        let output = runner.run(&["5"], Duration::from_millis(100));
        assert_eq!(output, CommandOutput::timed_out());
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_and_exit_status() {
        let runner = AdbRunner::new(PathBuf::from("echo"));
        let output = runner.run(&["List of devices attached"], Duration::from_secs(5));
        assert!(output.success);
        assert_eq!(output.stdout, "List of devices attached");
    }
}
