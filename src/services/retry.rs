//! 固定间隔重试
//! 有限次数地执行可失败的异步操作，两次尝试之间等待固定时长，不做指数增长

use futures_retry_policies::retry_policies::RetryPolicies;
use futures_retry_policies::tokio::RetryFutureExt;
use futures_retry_policies::ShouldRetry;
use log::warn;
use retry_policies::policies::ExponentialBackoff;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(800);

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// 上下界相同的退避即固定间隔
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .retry_bounds(self.delay, self.delay)
            .build_with_max_retries(self.max_attempts.max(1) - 1)
    }
}

/// 次数用尽，携带最后一次的错误
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// 执行 `operation` 直到成功、次数用尽或错误不可重试
///
/// `operation` 接收当前尝试序号（从 1 开始）。`max_attempts` 为 0 时按 1 次处理。
pub async fn retry_fixed<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + ShouldRetry,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    let do_attempt = || {
        attempt += 1;
        let current = attempt;
        let fut = operation(current);
        async move {
            let result = fut.await;
            if let Err(e) = &result {
                warn!("Attempt {}/{} failed: {}", current, max_attempts, e);
            }
            result
        }
    };

    let result = do_attempt.retry(RetryPolicies::new(policy.backoff())).await;

    result.map_err(|last| Exhausted { attempts: attempt, last })
}
