//! # ヘルパーエンドポイント
//!
//! - `ANY /generate-payloads` — 署名素材の生成
//! - `POST /get-timestamp` — TSAへのタイムスタンプ要求の中継

pub mod generate_payloads;
pub mod get_timestamp;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use generate_payloads::handle_generate_payloads;
pub use get_timestamp::handle_get_timestamp;
