mod error;
mod config;
mod device;
mod cmd;

// 流程各步骤
pub mod discovery;
pub mod remote;
pub mod locate;
pub mod prompt;
pub mod workflow;
pub mod utils;

// 导出主要类型
pub use cmd::{AdbRunner, CommandOutput, ToolRunner, TIMED_OUT};
pub use config::{WirelessConfig, WirelessConfigBuilder, DEFAULT_INTERFACES};
pub use device::{parse_devices, ConnectionKind, Connector, DeviceRecord, DeviceState};
pub use error::{WirelessError, WirelessResult};
pub use locate::{locate_tool, Platform};
pub use workflow::WorkflowResult;

// 便利的预导出模块
pub mod prelude {
    pub use super::{
        AdbRunner, Connector, DeviceRecord, ToolRunner, WirelessConfig, WirelessConfigBuilder,
        WirelessError, WirelessResult, WorkflowResult,
    };
    pub use super::discovery::DeviceCheck;
    pub use super::prompt::{Console, UserChoice};
}
