use crate::cmd::ToolRunner;
use crate::device::{parse_devices, Connector, DeviceRecord, DeviceState};
use crate::error::{WirelessError, WirelessResult};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Android Debug Bridge version (\d+\.\d+\.\d+)").expect("valid version pattern")
});

/// 设备检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCheck {
    /// 已存在无线连接，需要用户决定如何处理
    NeedsUserChoice { wireless: Vec<DeviceRecord> },
    /// 可以继续，附带已授权的 USB 设备
    Ready(Vec<DeviceRecord>),
}

/// 从 `adb version` 输出中提取版本号
pub fn parse_version(output: &str) -> Option<String> {
    VERSION_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 按优先级对设备快照分类
///
/// 已就绪的无线连接优先于一切，其次是未授权设备，最后要求至少一个
/// 已授权的 USB 设备。
pub fn resolve_device_state(records: &[DeviceRecord]) -> WirelessResult<DeviceCheck> {
    if records.is_empty() {
        return Err(WirelessError::NoDevicesAttached);
    }

    let wireless: Vec<DeviceRecord> = records
        .iter()
        .filter(|d| d.is_wireless() && d.is_ready())
        .cloned()
        .collect();

    if !wireless.is_empty() {
        return Ok(DeviceCheck::NeedsUserChoice { wireless });
    }

    resolve_usb_devices(records).map(DeviceCheck::Ready)
}

/// 未授权检查和 USB 设备筛选，不考虑无线连接
pub fn resolve_usb_devices(records: &[DeviceRecord]) -> WirelessResult<Vec<DeviceRecord>> {
    let unauthorized: Vec<String> = records
        .iter()
        .filter(|d| d.state == DeviceState::Unauthorized)
        .map(|d| d.id.clone())
        .collect();

    if !unauthorized.is_empty() {
        return Err(WirelessError::UnauthorizedDevice(unauthorized));
    }

    let usb: Vec<DeviceRecord> = records
        .iter()
        .filter(|d| !d.is_wireless() && d.is_ready())
        .cloned()
        .collect();

    if usb.is_empty() {
        return Err(WirelessError::NoAuthorizedDevice);
    }

    Ok(usb)
}

impl<R: ToolRunner> Connector<R> {
    /// 确认 ADB 可以运行，返回版本号（可能无法解析）
    pub fn check_tool(&self) -> WirelessResult<Option<String>> {
        let output = self.exec(&["version"])?;
        let version = parse_version(&output);
        debug!("ADB version check: {:?}", version);
        Ok(version)
    }

    /// 列出设备，没有设备时返回空列表
    pub fn list_devices(&self) -> WirelessResult<Vec<DeviceRecord>> {
        let output = self.exec(&["devices"])?;
        let devices = parse_devices(&output);
        info!("Found {} adb device(s)", devices.len());
        Ok(devices)
    }
}
