//! # トレーシング初期化
//!
//! `LOG_FORMAT=json` で 1 行 1 JSON、それ以外は人間向けの整形出力。
//! `RUST_LOG` が未設定なら [`DEFAULT_FILTER`] を使う。

use std::str::FromStr;

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,txosteo=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 本番（ログ収集基盤向け）
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(other.to_string()),
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub service_name: &'static str,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn from_env(service_name: &'static str) -> Self {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// 任意の取得関数から読み込む
    ///
    /// 解釈できない `LOG_FORMAT` は Pretty にする。トレーシング初期化前なので警告は stderr に出す。
    pub fn from_lookup(
        service_name: &'static str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let log_format = match lookup("LOG_FORMAT").map(|v| v.parse::<LogFormat>()) {
            None => LogFormat::default(),
            Some(Ok(format)) => format,
            Some(Err(value)) => {
                eprintln!("LOG_FORMAT={value:?} は解釈できないため pretty で出力します");
                LogFormat::Pretty
            }
        };

        Self {
            service_name,
            log_format,
        }
    }
}

/// グローバルなトレーシングサブスクライバを登録する
///
/// `ErrorLayer` も登録し、`InfraError` の `SpanTrace` にスパンが残るようにする。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::info!(
        service = config.service_name,
        log_format = ?config.log_format,
        "トレーシング開始"
    );
}
