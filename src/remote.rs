use crate::cmd::{CommandOutput, ToolRunner};
use crate::device::{Connector, DeviceRecord};
use crate::error::{WirelessError, WirelessResult};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::net::Ipv4Addr;

static INET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"inet (\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})/\d+").expect("valid inet pattern")
});

/// 设备 IP 的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpSource {
    Interface(String),
    Property(String),
}

impl fmt::Display for IpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpSource::Interface(name) => write!(f, "interface {}", name),
            IpSource::Property(name) => write!(f, "property {}", name),
        }
    }
}

/// 查询到的设备地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAddress {
    pub ip: Ipv4Addr,
    pub source: IpSource,
}

/// connect 成功的两种情况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    AlreadyConnected,
}

/// 一次断开全部无线连接的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectReport {
    pub disconnected: Vec<String>,
    /// (设备标识, stderr)
    pub failed: Vec<(String, String)>,
}

impl DisconnectReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 从 `ip -f inet addr show` 输出中找出第一个非回环 IPv4 地址
pub fn parse_inet_address(output: &str) -> Option<Ipv4Addr> {
    INET_RE
        .captures_iter(output)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<Ipv4Addr>().ok())
        .find(|ip| !ip.is_loopback())
}

/// 判断 connect 输出是否表示成功
fn classify_connect(output: &CommandOutput) -> Option<ConnectOutcome> {
    if !output.success {
        return None;
    }

    let stdout = output.stdout.to_lowercase();
    if !stdout.contains("connected") {
        None
    } else if stdout.contains("already connected") {
        Some(ConnectOutcome::AlreadyConnected)
    } else {
        Some(ConnectOutcome::Connected)
    }
}

impl<R: ToolRunner> Connector<R> {
    /// 按接口顺序查询设备 IP，全部失败后回退到 DHCP 属性
    pub fn query_device_ip(&self, serial: &str) -> WirelessResult<DeviceAddress> {
        for interface in &self.config.interfaces {
            match self.shell(serial, &["ip", "-f", "inet", "addr", "show", interface.as_str()]) {
                Ok(output) => {
                    if let Some(ip) = parse_inet_address(&output) {
                        info!("Found IP {} on {}", ip, interface);
                        return Ok(DeviceAddress {
                            ip,
                            source: IpSource::Interface(interface.clone()),
                        });
                    }
                    debug!("No usable address on {}", interface);
                }
                Err(e) => debug!("Probing {} failed: {}", interface, e),
            }
        }

        // wlan0 已经探测过，这里只是兼容旧设备的属性
        let property = &self.config.fallback_ip_property;
        match self.shell(serial, &["getprop", property.as_str()]) {
            Ok(output) => match output.trim().parse::<Ipv4Addr>() {
                Ok(ip) if !ip.is_loopback() => {
                    info!("Found IP {} via getprop {}", ip, property);
                    return Ok(DeviceAddress {
                        ip,
                        source: IpSource::Property(property.clone()),
                    });
                }
                _ => debug!("getprop {} returned {:?}", property, output),
            },
            Err(e) => debug!("getprop {} failed: {}", property, e),
        }

        Err(WirelessError::IpNotFound)
    }

    /// 让设备进入 TCP/IP 监听模式，成功后等待设备完成切换
    pub fn enable_network_listener(&self, serial: &str) -> WirelessResult<()> {
        let port = self.config.port.to_string();
        let output = self
            .runner
            .run(&["-s", serial, "tcpip", port.as_str()], self.config.command_timeout());

        if !output.success {
            return Err(WirelessError::ListenerEnableFailed(output.stderr));
        }

        info!("TCP/IP mode enabled on port {}", port);
        self.runner.pause(self.config.listener_settle());
        Ok(())
    }

    /// 连接到 `ip:port`，失败时按固定间隔重试
    pub fn connect(&self, ip: Ipv4Addr, port: u16) -> WirelessResult<ConnectOutcome> {
        let target = format!("{}:{}", ip, port);
        let attempts = self.config.max_connect_attempts.max(1);
        let mut last = CommandOutput::default();

        for attempt in 1..=attempts {
            let output = self
                .runner
                .run(&["connect", target.as_str()], self.config.connect_timeout());

            if let Some(outcome) = classify_connect(&output) {
                match outcome {
                    ConnectOutcome::AlreadyConnected => info!("Already connected to {}", target),
                    ConnectOutcome::Connected => info!("Connected to {}", target),
                }
                return Ok(outcome);
            }

            last = output;
            if attempt < attempts {
                warn!(
                    "Connection attempt {}/{} to {} failed, retrying in {:?}",
                    attempt,
                    attempts,
                    target,
                    self.config.retry_delay()
                );
                self.runner.pause(self.config.retry_delay());
            }
        }

        Err(WirelessError::ConnectFailed {
            target,
            attempts,
            stdout: last.stdout,
            stderr: last.stderr,
        })
    }

    /// 当前所有已就绪的无线连接
    pub fn wireless_sessions(&self) -> WirelessResult<Vec<DeviceRecord>> {
        Ok(self
            .list_devices()?
            .into_iter()
            .filter(|d| d.is_wireless() && d.is_ready())
            .collect())
    }

    /// 确认至少存在一个无线连接
    pub fn verify(&self) -> WirelessResult<Vec<DeviceRecord>> {
        let sessions = self.wireless_sessions()?;
        if sessions.is_empty() {
            return Err(WirelessError::VerifyFailed);
        }
        Ok(sessions)
    }

    /// 逐个断开无线连接，单个失败不会中断循环
    pub fn disconnect_all_wireless(&self) -> WirelessResult<DisconnectReport> {
        let mut report = DisconnectReport::default();

        for device in self.wireless_sessions()? {
            let output = self
                .runner
                .run(&["disconnect", device.id.as_str()], self.config.command_timeout());

            if output.success {
                info!("Disconnected {}", device.id);
                report.disconnected.push(device.id);
            } else {
                warn!("Failed to disconnect {}: {}", device.id, output.stderr);
                report.failed.push((device.id, output.stderr));
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wlan_address() {
        let output = "30: wlan0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc mq state UP group default qlen 3000\n    inet 192.168.1.42/24 brd 192.168.1.255 scope global wlan0\n       valid_lft forever preferred_lft forever";
        assert_eq!(parse_inet_address(output), Some(Ipv4Addr::new(192, 168, 1, 42)));
    }

    #[test]
    fn loopback_only_yields_nothing() {
        assert_eq!(parse_inet_address("1: lo: <LOOPBACK,UP>\n    inet 127.0.0.1/8 scope host lo"), None);
        assert_eq!(parse_inet_address("Device \"wlan1\" does not exist."), None);
    }

    #[test]
    fn rejects_out_of_range_octets() {
        assert_eq!(parse_inet_address("inet 300.1.2.3/24"), None);
    }

    #[test]
    fn classifies_connect_responses() {
        assert_eq!(
            classify_connect(&CommandOutput::ok("connected to 10.0.0.5:5555")),
            Some(ConnectOutcome::Connected)
        );
        assert_eq!(
            classify_connect(&CommandOutput::ok("Already connected to 10.0.0.5:5555")),
            Some(ConnectOutcome::AlreadyConnected)
        );
        assert_eq!(
            classify_connect(&CommandOutput::ok("failed to connect to 10.0.0.5:5555")),
            None
        );
        assert_eq!(classify_connect(&CommandOutput::failed("connected")), None);
    }
}
