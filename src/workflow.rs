use crate::cmd::ToolRunner;
use crate::config::WirelessConfig;
use crate::device::Connector;
use crate::discovery::{resolve_device_state, resolve_usb_devices, DeviceCheck};
use crate::error::{WirelessError, WirelessResult};
use crate::locate::Platform;
use crate::prompt::{Console, UserChoice};
use crate::remote::{ConnectOutcome, DisconnectReport};
use log::info;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// 一次运行的最终结果
#[derive(Debug)]
pub enum WorkflowResult {
    /// 设备可以通过 `address` 访问
    Success { address: String },
    Failure(WirelessError),
    /// 用户选择保留或断开现有连接后退出
    UserDeferred(UserChoice),
}

impl WorkflowResult {
    pub fn exit_code(&self) -> u8 {
        match self {
            WorkflowResult::Success { .. } | WorkflowResult::UserDeferred(_) => 0,
            WorkflowResult::Failure(_) => 1,
        }
    }
}

/// 完整流程：工具检查、设备检查、IP 查询、tcpip、connect、验证
///
/// `tool` 是 [`crate::locate_tool`] 的结果。找不到工具时不会创建 runner，
/// 也不会执行任何命令。中途失败不做回滚，已开启的 tcpip 监听保持开启。
pub fn run<R, F, I, W>(
    tool: WirelessResult<PathBuf>,
    platform: Platform,
    make_runner: F,
    config: WirelessConfig,
    console: &mut Console<I, W>,
) -> WorkflowResult
where
    R: ToolRunner,
    F: FnOnce(PathBuf) -> R,
    I: BufRead,
    W: Write,
{
    console.say("[*] Checking ADB setup...");

    let path = match tool {
        Ok(path) => path,
        Err(e) => {
            console.say("[-] ADB not found in PATH or common locations.");
            console.say("");
            console.say("[!] Please install ADB:");
            for line in platform.install_instructions() {
                console.say(format!("    - {}", line));
            }
            return WorkflowResult::Failure(e);
        }
    };

    console.say(format!("[+] ADB found at: {}", path.display()));
    let connector = Connector::new(make_runner(path), Some(config));

    match drive(&connector, console) {
        Ok(result) => result,
        Err(e) => {
            report_failure(console, &e);
            WorkflowResult::Failure(e)
        }
    }
}

fn drive<R, I, W>(connector: &Connector<R>, console: &mut Console<I, W>) -> WirelessResult<WorkflowResult>
where
    R: ToolRunner,
    I: BufRead,
    W: Write,
{
    let version = connector.check_tool()?;
    console.say(format!(
        "[+] ADB version: {}",
        version.as_deref().unwrap_or("Unknown")
    ));

    console.say("[*] Checking for connected devices...");
    let records = connector.list_devices()?;

    let usb = match resolve_device_state(&records)? {
        DeviceCheck::Ready(usb) => usb,
        DeviceCheck::NeedsUserChoice { wireless } => {
            console.say(format!(
                "[+] Already connected wirelessly to {} device(s):",
                wireless.len()
            ));
            for device in &wireless {
                console.say(format!("    {}", device.id));
            }

            match console.prompt_choice()? {
                UserChoice::Reconnect => {
                    console.say("[*] Disconnecting existing wireless connections...");
                    let report = connector.disconnect_all_wireless()?;
                    print_disconnects(console, &report);
                    if let Some((id, stderr)) = report.failed.into_iter().next() {
                        return Err(WirelessError::ToolInvocationFailed {
                            command: format!("disconnect {}", id),
                            stderr,
                        });
                    }
                    console.say("[+] All wireless connections disconnected");
                    resolve_usb_devices(&records)?
                }
                UserChoice::Keep => {
                    console.say("[*] Keeping existing wireless connection(s)");
                    return Ok(WorkflowResult::UserDeferred(UserChoice::Keep));
                }
                UserChoice::DisconnectAndExit => {
                    console.say("[*] Disconnecting all wireless connections...");
                    match connector.disconnect_all_wireless() {
                        Ok(report) => {
                            print_disconnects(console, &report);
                            if report.all_succeeded() {
                                console.say("[+] All wireless connections disconnected");
                            } else {
                                console.say("[-] Failed to disconnect some connections");
                            }
                        }
                        Err(e) => console.say(format!("[-] {}", e)),
                    }
                    console.say("[*] Exiting as requested");
                    return Ok(WorkflowResult::UserDeferred(UserChoice::DisconnectAndExit));
                }
            }
        }
    };

    console.say(format!("[+] Found {} authorized USB device(s):", usb.len()));
    for device in &usb {
        console.say(format!("    {}", device.id));
    }
    let target = &usb[0];
    if usb.len() > 1 {
        console.say(format!("[*] Using {}", target.id));
    }

    console.say("[*] Getting device IP address...");
    let address = connector.query_device_ip(&target.id)?;
    console.say(format!("[+] Found IP via {}: {}", address.source, address.ip));

    let port = connector.config.port;
    console.say(format!("[*] Enabling TCP/IP mode on port {}...", port));
    connector.enable_network_listener(&target.id)?;
    console.say("[+] TCP/IP mode enabled");

    let endpoint = format!("{}:{}", address.ip, port);
    console.say(format!("[*] Connecting to {}...", endpoint));
    match connector.connect(address.ip, port)? {
        ConnectOutcome::AlreadyConnected => console.say(format!("[+] Already connected to {}", endpoint)),
        ConnectOutcome::Connected => console.say(format!("[+] Successfully connected to {}", endpoint)),
    }

    console.say("[*] Verifying wireless connection...");
    let sessions = connector.verify()?;
    console.say("[+] Wireless connection verified!");
    for device in &sessions {
        console.say(format!("    Connected: {}", device.id));
    }

    console.say("");
    console.say("[+] Setup complete! You can now disconnect the USB cable.");
    console.say(format!("[+] Your device is accessible at {}", endpoint));
    console.say("");
    console.say("To disconnect later, use: adb disconnect, or re-run this tool");
    info!("Wireless debugging ready at {}", endpoint);

    Ok(WorkflowResult::Success { address: endpoint })
}

fn print_disconnects<I: BufRead, W: Write>(console: &mut Console<I, W>, report: &DisconnectReport) {
    if report.disconnected.is_empty() && report.failed.is_empty() {
        console.say("[*] No wireless connections to disconnect");
    }
    for id in &report.disconnected {
        console.say(format!("[+] Disconnected {}", id));
    }
    for (id, stderr) in &report.failed {
        console.say(format!("[-] Failed to disconnect {}: {}", id, stderr));
    }
}

fn report_failure<I: BufRead, W: Write>(console: &mut Console<I, W>, error: &WirelessError) {
    match error {
        WirelessError::NoDevicesAttached => {
            console.say("[-] No devices found.");
            console.say("[!] Please:");
            console.say("    1. Connect your device via USB");
            console.say("    2. Enable USB debugging in Developer Options");
            console.say("    3. Authorize the connection on your device");
            console.say("    4. Make sure your device is unlocked");
        }
        WirelessError::UnauthorizedDevice(ids) => {
            console.say(format!("[-] Found {} unauthorized device(s):", ids.len()));
            for id in ids {
                console.say(format!("    {}", id));
            }
            console.say("[!] Please authorize the connection on your device(s) and re-run");
        }
        WirelessError::IpNotFound => {
            console.say("[-] Failed to get device IP address.");
            console.say("[!] Make sure your device is connected to WiFi");
        }
        WirelessError::ConnectFailed {
            attempts,
            stdout,
            stderr,
            ..
        } => {
            console.say(format!("[-] Failed to connect after {} attempts", attempts));
            if !stderr.is_empty() {
                console.say(format!("    Error: {}", stderr));
            }
            if !stdout.is_empty() {
                console.say(format!("    Output: {}", stdout));
            }
        }
        WirelessError::UserCancelled => console.say("[!] Operation cancelled"),
        other => console.say(format!("[-] {}", other)),
    }
}
