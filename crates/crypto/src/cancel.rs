//! # キャンセル通知
//!
//! リクエスト単位のキャンセル状態。ハンドラ側が `cancel()` を呼び、
//! ブロッキングスレッド上の署名処理が署名呼び出しの前後で確認する。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 複製可能なキャンセルフラグ。複製間で状態を共有する。
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// キャンセルを通知する。冪等。
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
