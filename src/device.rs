use std::fmt;

use crate::cmd::ToolRunner;
use crate::config::WirelessConfig;

/// 设备状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    /// 已授权，可用
    Device,
    Unauthorized,
    /// offline、recovery 等其他状态
    Other(String),
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Device => write!(f, "device"),
            DeviceState::Unauthorized => write!(f, "unauthorized"),
            DeviceState::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for DeviceState {
    fn from(s: &str) -> Self {
        match s {
            "device" => DeviceState::Device,
            "unauthorized" => DeviceState::Unauthorized,
            _ => DeviceState::Other(s.to_string()),
        }
    }
}

/// 连接方式，由设备标识推导
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Usb,
    Wireless,
}

/// `adb devices` 输出中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub id: String,
    pub state: DeviceState,
}

impl DeviceRecord {
    pub fn new(id: &str, state: impl Into<DeviceState>) -> Self {
        Self {
            id: id.to_string(),
            state: state.into(),
        }
    }

    /// 标识中带 `:` 的视为 `ip:port` 无线连接
    pub fn kind(&self) -> ConnectionKind {
        if self.id.contains(':') {
            ConnectionKind::Wireless
        } else {
            ConnectionKind::Usb
        }
    }

    pub fn is_wireless(&self) -> bool {
        self.kind() == ConnectionKind::Wireless
    }

    pub fn is_ready(&self) -> bool {
        self.state == DeviceState::Device
    }
}

/// 解析 `adb devices` 输出
///
/// 跳过标题行和 `* daemon ...` 提示行。没有设备时返回空列表。
/// 同一快照中的重复标识会原样保留。
pub fn parse_devices(output: &str) -> Vec<DeviceRecord> {
    let mut devices = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('*') || line.starts_with("List of devices") {
            continue;
        }

        let mut parts = line.split_whitespace();
        if let (Some(id), Some(state)) = (parts.next(), parts.next()) {
            devices.push(DeviceRecord::new(id, state));
        }
    }

    devices
}

/// 持有已解析的 ADB 路径（在 runner 中）和流程配置
pub struct Connector<R: ToolRunner> {
    pub config: WirelessConfig,
    pub(crate) runner: R,
}

impl<R: ToolRunner> Connector<R> {
    pub fn new(runner: R, config: Option<WirelessConfig>) -> Self {
        Self {
            config: config.unwrap_or_default(),
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}
