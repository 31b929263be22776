use thiserror::Error;

/// 无线连接流程中的错误类型
#[derive(Debug, Error)]
pub enum WirelessError {
    /// 找不到 ADB 可执行文件
    #[error("ADB not found in PATH or common install locations")]
    ToolNotFound,

    /// ADB 命令返回非零状态或超时
    #[error("`adb {command}` failed: {stderr}")]
    ToolInvocationFailed { command: String, stderr: String },

    /// 没有任何设备连接
    #[error("no devices found")]
    NoDevicesAttached,

    /// 存在未授权设备
    #[error("found {} unauthorized device(s): {}", .0.len(), .0.join(", "))]
    UnauthorizedDevice(Vec<String>),

    /// 没有已授权的 USB 设备
    #[error("no authorized USB devices found")]
    NoAuthorizedDevice,

    /// 无法获取设备 IP 地址
    #[error("failed to get device IP address")]
    IpNotFound,

    /// tcpip 模式切换失败
    #[error("failed to enable TCP/IP mode: {0}")]
    ListenerEnableFailed(String),

    /// 多次尝试后仍然无法连接
    #[error("failed to connect to {target} after {attempts} attempts")]
    ConnectFailed {
        target: String,
        attempts: u32,
        stdout: String,
        stderr: String,
    },

    /// 连接后在设备列表中找不到无线设备
    #[error("no wireless devices found after connecting")]
    VerifyFailed,

    /// 用户取消
    #[error("operation cancelled")]
    UserCancelled,

    /// 控制台读写错误
    #[error("console I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for WirelessError {
    fn from(error: std::io::Error) -> Self {
        WirelessError::Io(error.to_string())
    }
}

pub type WirelessResult<T> = Result<T, WirelessError>;
