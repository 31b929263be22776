use std::time::Duration;

/// 默认依次探测的网络接口
pub const DEFAULT_INTERFACES: [&str; 4] = ["wlan0", "wlan1", "eth0", "rmnet_data0"];

/// 无线连接配置
#[derive(Debug, Clone)]
pub struct WirelessConfig {
    /// 设备监听端口
    pub port: u16,
    /// 连接最大尝试次数
    pub max_connect_attempts: u32,
    /// 连接重试间隔（毫秒）
    pub retry_delay: u64,
    /// tcpip 切换后的等待时间（毫秒）
    pub listener_settle: u64,
    /// 普通命令超时（毫秒）
    pub command_timeout: u64,
    /// connect 命令超时（毫秒）
    pub connect_timeout: u64,
    /// IP 探测的接口顺序
    pub interfaces: Vec<String>,
    /// 接口探测全部失败后查询的属性
    pub fallback_ip_property: String,
}

impl Default for WirelessConfig {
    fn default() -> Self {
        WirelessConfig {
            port: 5555,
            max_connect_attempts: 3,
            retry_delay: 2000,
            listener_settle: 2000,
            command_timeout: 10000,
            connect_timeout: 15000,
            interfaces: DEFAULT_INTERFACES.iter().map(|s| s.to_string()).collect(),
            fallback_ip_property: "dhcp.wlan0.ipaddress".to_string(),
        }
    }
}

impl WirelessConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }

    pub fn listener_settle(&self) -> Duration {
        Duration::from_millis(self.listener_settle)
    }
}

/// 配置构建器
#[derive(Default)]
pub struct WirelessConfigBuilder {
    port: Option<u16>,
    max_connect_attempts: Option<u32>,
    retry_delay: Option<u64>,
    listener_settle: Option<u64>,
    command_timeout: Option<u64>,
    connect_timeout: Option<u64>,
    interfaces: Option<Vec<String>>,
    fallback_ip_property: Option<String>,
}

impl WirelessConfigBuilder {
    /// 设置监听端口
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// 设置连接最大尝试次数
    pub fn max_connect_attempts(mut self, attempts: u32) -> Self {
        self.max_connect_attempts = Some(attempts);
        self
    }

    pub fn retry_delay(mut self, delay: u64) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn listener_settle(mut self, delay: u64) -> Self {
        self.listener_settle = Some(delay);
        self
    }

    /// 设置普通命令超时
    pub fn command_timeout(mut self, timeout: u64) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// 设置 connect 命令超时
    pub fn connect_timeout(mut self, timeout: u64) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// 追加一个探测接口
    pub fn add_interface(mut self, interface: &str) -> Self {
        self.interfaces
            .get_or_insert_with(Vec::new)
            .push(interface.to_string());
        self
    }

    pub fn fallback_ip_property(mut self, property: &str) -> Self {
        self.fallback_ip_property = Some(property.to_string());
        self
    }

    /// 构建配置
    pub fn build(self) -> WirelessConfig {
        let default = WirelessConfig::default();

        WirelessConfig {
            port: self.port.unwrap_or(default.port),
            max_connect_attempts: self
                .max_connect_attempts
                .unwrap_or(default.max_connect_attempts)
                .max(1),
            retry_delay: self.retry_delay.unwrap_or(default.retry_delay),
            listener_settle: self.listener_settle.unwrap_or(default.listener_settle),
            command_timeout: self.command_timeout.unwrap_or(default.command_timeout),
            connect_timeout: self.connect_timeout.unwrap_or(default.connect_timeout),
            interfaces: self.interfaces.unwrap_or(default.interfaces),
            fallback_ip_property: self
                .fallback_ip_property
                .unwrap_or(default.fallback_ip_property),
        }
    }
}
