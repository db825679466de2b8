//! # API サーバー設定
//!
//! 環境変数から API サーバーの設定を読み込む。
//!
//! 必須の変数が欠けている場合や値が不正な場合は [`ConfigError`] を返す。
//! 起動時に `main` がエラーとして扱う。

use std::{env, str::FromStr, time::Duration};

use thiserror::Error;
use txosteo_infra::RateLimitPolicy;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が設定されていない
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値を解釈できない
    #[error("{key} の値が不正です: {value}")]
    Invalid { key: &'static str, value: String },
}

/// API サーバーの設定
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// Redis 接続 URL（セッション、レート制限）
    pub redis_url: String,
    /// S3 エンドポイント URL（MinIO 使用時に設定、未設定で AWS S3 デフォルト）
    pub s3_endpoint_url: Option<String>,
    /// 画像バケット名
    pub images_bucket_name: String,
    /// 起動時にマイグレーションを実行するか
    pub run_migrations: bool,
    /// 通知設定
    pub notification: NotificationConfig,
    /// レポートメールのレート制限
    pub email_rate_limit: RateLimitPolicy,
}

/// メール送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationBackend {
    /// Mailpit（開発）/ SMTP サーバー経由で送信
    Smtp,
    /// Amazon SES v2 経由で送信（本番）
    Ses,
    /// 送信しない（ログ出力のみ）
    Noop,
}

impl FromStr for NotificationBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smtp" => Ok(Self::Smtp),
            "ses" => Ok(Self::Ses),
            "noop" => Ok(Self::Noop),
            other => Err(ConfigError::Invalid {
                key:   "NOTIFICATION_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// 通知機能の設定
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub backend:      NotificationBackend,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:    String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:    u16,
    /// 送信元メールアドレス
    pub from_address: String,
}

impl ApiConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の取得関数から設定を読み込む
    ///
    /// テストでは `HashMap` を渡してプロセス環境変数に触れずに検証する。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let max_requests = parse("EMAIL_RATE_LIMIT_MAX", or_default("EMAIL_RATE_LIMIT_MAX", "5"))?;
        let window_secs: u64 = parse(
            "EMAIL_RATE_LIMIT_WINDOW_SECONDS",
            or_default("EMAIL_RATE_LIMIT_WINDOW_SECONDS", "3600"),
        )?;
        if window_secs == 0 {
            return Err(ConfigError::Invalid {
                key:   "EMAIL_RATE_LIMIT_WINDOW_SECONDS",
                value: window_secs.to_string(),
            });
        }

        Ok(Self {
            host: or_default("API_HOST", "0.0.0.0"),
            port: parse("API_PORT", required("API_PORT")?)?,
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            s3_endpoint_url: lookup("S3_ENDPOINT_URL").filter(|v| !v.is_empty()),
            images_bucket_name: or_default("IMAGES_BUCKET_NAME", "images"),
            run_migrations: parse("RUN_MIGRATIONS", or_default("RUN_MIGRATIONS", "false"))?,
            notification: NotificationConfig {
                backend:      parse("NOTIFICATION_BACKEND", or_default("NOTIFICATION_BACKEND", "noop"))?,
                smtp_host:    or_default("SMTP_HOST", "localhost"),
                smtp_port:    parse("SMTP_PORT", or_default("SMTP_PORT", "1025"))?,
                from_address: or_default("NOTIFICATION_FROM_ADDRESS", "noreply@txosteo.example.com"),
            },
            email_rate_limit: RateLimitPolicy {
                max_requests,
                window: Duration::from_secs(window_secs),
            },
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
