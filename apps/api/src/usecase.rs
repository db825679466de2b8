//! # ユースケース層
//!
//! ハンドラから呼ばれるアプリケーションロジックを定義する。
//! リポジトリや外部サービスはトレイトオブジェクトで受け取り、テストではモックに差し替える。

pub mod image;
pub mod registration;
pub mod report;
pub mod template_renderer;
pub mod user;

pub use image::ImageUseCaseImpl;
pub use registration::{RegisterInput, RegistrationUseCaseImpl};
pub use report::{ReportInput, ReportUseCaseImpl};
pub use template_renderer::TemplateRenderer;
pub use user::UserUseCaseImpl;
