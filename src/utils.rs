use crate::error::WirelessResult;
use log::warn;
use std::time::{Duration, Instant};

/// 根据条件轮询等待，超时返回 `Ok(false)`
pub fn wait_with_polling<F>(
    timeout: Duration,
    poll_interval: Duration,
    mut condition_fn: F,
) -> WirelessResult<bool>
where
    F: FnMut() -> WirelessResult<bool>,
{
    let start = Instant::now();

    loop {
        match condition_fn() {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(e) => {
                warn!("Error while polling: {}", e);
                return Err(e);
            }
        }

        if start.elapsed() >= timeout {
            return Ok(false);
        }

        std::thread::sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WirelessError;

    #[test]
    fn returns_true_once_condition_holds() {
        let mut calls = 0;
        let done = wait_with_polling(Duration::from_secs(1), Duration::from_millis(1), || {
            calls += 1;
            Ok(calls == 3)
        })
        .unwrap();
        assert!(done);
        assert_eq!(calls, 3);
    }

    #[test]
    fn returns_false_after_timeout() {
        let done = wait_with_polling(Duration::from_millis(20), Duration::from_millis(5), || {
            Ok(false)
        })
        .unwrap();
        assert!(!done);
    }

    #[test]
    fn propagates_condition_errors() {
        let result = wait_with_polling(Duration::from_secs(1), Duration::from_millis(1), || {
            Err(WirelessError::Io("broken pipe".to_string()))
        });
        assert!(matches!(result, Err(WirelessError::Io(_))));
    }
}
