//! # フィードバック受付サービス ライブラリ
//!
//! パートナー満足度フォームの送信を受け付け、通知メールとして転送する
//! HTTP サーバーのコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: ルーターとミドルウェアの組み立て
//! - `config`: 環境変数からの設定読み込み
//! - `error`: エラー定義と HTTP レスポンスへの変換
//! - `handler`: HTTP ハンドラ
//! - `usecase`: 正規化済みフィードバックの送信ロジック

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
