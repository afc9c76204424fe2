//! 待機処理
//!
//! 条件待ちのポーリングとページ遷移間のランダム待機はすべてここに集約する。

use std::future::Future;
use std::time::{Duration, Instant};

use rand::distr::{Distribution, Uniform};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::DelayRange;
use crate::error::ScraperError;
use crate::traits::Lookup;

/// `probe` が `Found` を返すまでポーリングする
///
/// - `NotFound` は待機継続
/// - `Error` は即座に呼び出し元へ返す
/// - `timeout` を過ぎたら `ScraperError::Timeout`
pub async fn wait_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Lookup<T>> + Send,
    T: Send,
{
    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match probe().await {
            Lookup::Found(value) => {
                debug!("{} 検出 ({:?}, {}回目)", what, start.elapsed(), attempts);
                return Ok(value);
            }
            Lookup::NotFound => {}
            Lookup::Error(e) => return Err(e),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(ScraperError::Timeout(format!(
                "{} が{:?}以内に見つかりませんでした",
                what, timeout
            )));
        }

        sleep(poll_interval.min(timeout - elapsed)).await;
    }
}

/// 範囲内でランダムな待機時間を決める
pub fn jitter(range: DelayRange) -> Duration {
    if range.max <= range.min {
        return range.min;
    }
    let mut rng = rand::rng();
    Uniform::new_inclusive(range.min, range.max)
        .map(|dist| dist.sample(&mut rng))
        .unwrap_or(range.min)
}

/// ページ遷移間のペーシング待機
pub async fn pause(range: DelayRange) {
    let delay = jitter(range);
    if delay.is_zero() {
        return;
    }
    info!("{:.2}秒待機中...", delay.as_secs_f64());
    sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_jitter_within_range() {
        let range = DelayRange {
            min: Duration::from_millis(100),
            max: Duration::from_millis(200),
        };
        for _ in 0..50 {
            let d = jitter(range);
            assert!(d >= range.min && d <= range.max, "{:?} out of range", d);
        }
    }

    #[test]
    fn test_jitter_fixed_and_inverted() {
        assert_eq!(jitter(DelayRange::ZERO), Duration::ZERO);
        let inverted = DelayRange {
            min: Duration::from_secs(3),
            max: Duration::from_secs(1),
        };
        assert_eq!(jitter(inverted), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_wait_until_found_after_retries() {
        let calls = AtomicU32::new(0);
        let result = wait_until(
            "counter",
            Duration::from_secs(1),
            Duration::from_millis(1),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n >= 2 {
                        Lookup::Found(n)
                    } else {
                        Lookup::NotFound
                    }
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let result: Result<(), _> = wait_until(
            "never",
            Duration::from_millis(20),
            Duration::from_millis(5),
            || async { Lookup::NotFound },
        )
        .await;

        assert!(matches!(result, Err(ScraperError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_wait_until_propagates_error() {
        let result: Result<(), _> = wait_until(
            "broken",
            Duration::from_secs(5),
            Duration::from_millis(5),
            || async { Lookup::Error(ScraperError::JavaScript("detached".into())) },
        )
        .await;

        assert!(matches!(result, Err(ScraperError::JavaScript(_))));
    }
}
