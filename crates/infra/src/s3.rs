//! # 画像ストレージ（S3）
//!
//! 画像バケットへの接続管理とオブジェクト削除を行う。
//!
//! - **ローカル開発**: MinIO を使用（`S3_ENDPOINT_URL` で接続先を指定）
//! - **本番環境**: IAM ロールによる認証で Amazon S3 に接続（`S3_ENDPOINT_URL` 未設定）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use txosteo_infra::s3;
//!
//! async fn setup() {
//!     let client = s3::create_client(Some("http://localhost:19000")).await;
//!     let storage = s3::S3ImageStorage::new(client, "images".to_string());
//! }
//! ```

use async_trait::async_trait;
use aws_sdk_s3::Client;
use txosteo_domain::value_objects::ImageName;

use crate::InfraError;

/// 画像ストレージのインターフェース
///
/// テスト時はモックに差し替え可能。
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// 画像を削除する
    ///
    /// 存在しないオブジェクトの削除も成功として扱う（S3 の DeleteObject と同じ）。
    async fn delete_image(&self, name: &ImageName) -> Result<(), InfraError>;
}

/// S3 実装の画像ストレージ
///
/// MinIO とも互換動作する。
pub struct S3ImageStorage {
    client:      Client,
    bucket_name: String,
}

impl S3ImageStorage {
    pub fn new(client: Client, bucket_name: String) -> Self {
        Self {
            client,
            bucket_name,
        }
    }
}

#[async_trait]
impl ImageStorage for S3ImageStorage {
    #[tracing::instrument(skip_all, level = "debug", fields(bucket = %self.bucket_name, %name))]
    async fn delete_image(&self, name: &ImageName) -> Result<(), InfraError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(name.as_str())
            .send()
            .await
            .map_err(|e| InfraError::s3(format!("DeleteObject の実行に失敗: {e}")))?;

        Ok(())
    }
}

/// S3 クライアントを作成する
///
/// `endpoint` が `Some` の場合は MinIO 等のカスタムエンドポイントに接続する。
/// `None` の場合は AWS S3 のデフォルトエンドポイントを使用する。
///
/// 認証情報は SDK のデフォルト認証チェーンで解決する:
/// - ローカル: 環境変数 `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`
/// - 本番: IAM ロール
pub async fn create_client(endpoint: Option<&str>) -> Client {
    let mut config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new("us-east-2"));

    if let Some(endpoint_url) = endpoint {
        config_builder = config_builder.endpoint_url(endpoint_url);
    }

    let config = config_builder.load().await;

    // MinIO はパススタイルが必要
    let s3_config_builder = aws_sdk_s3::config::Builder::from(&config);
    let s3_config = if endpoint.is_some() {
        s3_config_builder.force_path_style(true).build()
    } else {
        s3_config_builder.build()
    };

    Client::from_conf(s3_config)
}
