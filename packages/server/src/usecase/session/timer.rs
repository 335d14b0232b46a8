//! 中断可能なフェーズタイマー

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// 各フェーズの長さ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTiming {
    /// 出題前の準備時間
    pub prepare: Duration,
    /// 回答受付時間
    pub question: Duration,
    /// 結果表示のバッファ
    pub results: Duration,
}

impl PhaseTiming {
    pub fn from_secs(prepare: u64, question: u64, results: u64) -> Self {
        Self {
            prepare: Duration::from_secs(prepare),
            question: Duration::from_secs(question),
            results: Duration::from_secs(results),
        }
    }
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self::from_secs(3, 10, 3)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// 1 セッションぶんのタイマー
///
/// `cancel` は待機中の `wait` を即座に終わらせ、以後の `wait` もすぐに `Cancelled` を返す。
#[derive(Debug, Clone, Default)]
pub struct PhaseTimer {
    token: CancellationToken,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn wait(&self, duration: Duration) -> WaitOutcome {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => WaitOutcome::Cancelled,
            _ = tokio::time::sleep(duration) => WaitOutcome::Elapsed,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_elapses() {
        // テスト項目: 中断されなければ指定時間後に Elapsed
        // given (前提条件):
        let timer = PhaseTimer::new();
        let started = tokio::time::Instant::now();

        // when (操作):
        let outcome = timer.wait(Duration::from_secs(10)).await;

        // then (期待する結果):
        assert_eq!(outcome, WaitOutcome::Elapsed);
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_wait_in_progress() {
        // テスト項目: 待機中に cancel すると残り時間を待たずに Cancelled
        // given (前提条件):
        let timer = PhaseTimer::new();
        let canceller = timer.clone();
        let started = tokio::time::Instant::now();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            canceller.cancel();
        });

        // when (操作):
        let outcome = timer.wait(Duration::from_secs(10)).await;

        // then (期待する結果):
        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_after_cancel_returns_immediately() {
        // テスト項目: cancel 済みのタイマーは待たずに Cancelled
        // given (前提条件):
        let timer = PhaseTimer::new();
        timer.cancel();

        // when (操作):
        let outcome = timer.wait(Duration::from_secs(3)).await;

        // then (期待する結果):
        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(timer.is_cancelled());
    }
}
