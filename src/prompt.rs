use crate::error::{WirelessError, WirelessResult};
use log::debug;
use std::fmt::Display;
use std::io::{BufRead, Write};

/// 已存在无线连接时用户的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserChoice {
    /// 断开现有连接后重新建立
    Reconnect,
    /// 保留现有连接并退出
    Keep,
    /// 断开全部连接并退出
    DisconnectAndExit,
}

impl UserChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(UserChoice::Reconnect),
            "2" => Some(UserChoice::Keep),
            "3" => Some(UserChoice::DisconnectAndExit),
            _ => None,
        }
    }
}

/// 行式控制台：进度输出和交互选择
pub struct Console<I, W> {
    input: I,
    output: W,
}

impl<I: BufRead, W: Write> Console<I, W> {
    pub fn new(input: I, output: W) -> Self {
        Self { input, output }
    }

    /// 输出一行，写失败只记录日志
    pub fn say(&mut self, line: impl Display) {
        if let Err(e) = writeln!(self.output, "{}", line) {
            debug!("Console write failed: {}", e);
        }
    }

    /// 阻塞等待用户选择，输入无效时重复提示，输入结束视为取消
    pub fn prompt_choice(&mut self) -> WirelessResult<UserChoice> {
        self.say("");
        self.say("What would you like to do?");
        self.say("1. Create new connection (disconnect existing)");
        self.say("2. Keep existing connection(s)");
        self.say("3. Disconnect all and exit");

        loop {
            write!(self.output, "\nEnter your choice (1/2/3): ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                self.say("");
                return Err(WirelessError::UserCancelled);
            }

            match UserChoice::parse(&line) {
                Some(choice) => return Ok(choice),
                None => self.say("Please enter 1, 2, or 3"),
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
