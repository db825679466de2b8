//! # 画像削除ユースケース
//!
//! 画像バケットからオブジェクトを削除する。管理者のみ実行できる。

use std::sync::Arc;

use txosteo_domain::value_objects::ImageName;
use txosteo_infra::s3::ImageStorage;
use txosteo_shared::{event_log::event, log_business_event};

use crate::{error::ApiError, middleware::AuthenticatedUser};

pub struct ImageUseCaseImpl {
    image_storage: Arc<dyn ImageStorage>,
}

impl ImageUseCaseImpl {
    pub fn new(image_storage: Arc<dyn ImageStorage>) -> Self {
        Self { image_storage }
    }

    /// 画像を削除し、削除したオブジェクト名を返す
    ///
    /// 権限の確認を ID の検証より先に行う。
    pub async fn delete_image(
        &self,
        actor: &AuthenticatedUser,
        raw_id: &str,
    ) -> Result<ImageName, ApiError> {
        if !actor.is_admin {
            return Err(ApiError::Forbidden(
                "画像を削除するには管理者権限が必要です".to_string(),
            ));
        }

        let name = ImageName::new(raw_id)?;
        self.image_storage.delete_image(&name).await?;

        log_business_event!(
            event.category = event::category::IMAGE,
            event.action = event::action::IMAGE_DELETED,
            event.entity_type = event::entity_type::IMAGE,
            event.entity_id = %name,
            event.actor_id = %actor.user_id,
            event.result = event::result::SUCCESS,
            "画像を削除"
        );

        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use txosteo_domain::user::{Subject, UserId};
    use txosteo_infra::mock::MockImageStorage;

    use super::*;

    fn actor(is_admin: bool) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: UserId::new(),
            subject: Subject::new("auth0|actor").unwrap(),
            is_admin,
        }
    }

    #[tokio::test]
    async fn test_管理者は画像を削除できる() {
        let storage = MockImageStorage::new();
        let sut = ImageUseCaseImpl::new(Arc::new(storage.clone()));

        let name = sut.delete_image(&actor(true), "events/banner.png").await.unwrap();

        assert_eq!(name.as_str(), "events/banner.png");
        assert_eq!(storage.deleted(), vec!["events/banner.png"]);
    }

    #[rstest]
    #[case("events/banner.png")]
    #[case("")]
    #[tokio::test]
    async fn test_一般ユーザーはidに関係なくforbidden(#[case] raw_id: &str) {
        let storage = MockImageStorage::new();
        let sut = ImageUseCaseImpl::new(Arc::new(storage.clone()));

        let result = sut.delete_image(&actor(false), raw_id).await;

        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        assert!(storage.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_空のidはbad_request() {
        let storage = MockImageStorage::new();
        let sut = ImageUseCaseImpl::new(Arc::new(storage.clone()));

        let result = sut.delete_image(&actor(true), "  ").await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        assert!(storage.deleted().is_empty());
    }
}
