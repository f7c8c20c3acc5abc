use crate::auth::resolve;
use crate::draft::Confirm;
use crate::gateway::types::User;
use crate::gateway::{GatewayError, HttpGateway};
use crate::render::templates::render_dashboard;
use crate::routes::Route;
use crate::survey::SurveyDefinition;

use super::{require_session, CommandError};

pub const DELETE_PROMPT: &str = "Ви впевнені? Це видалить опитування та всі відповіді.";

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub user: Option<User>,
    pub surveys: Vec<SurveyDefinition>,
}

impl Dashboard {
    pub fn active_count(&self) -> usize {
        self.surveys.iter().filter(|s| s.is_active).count()
    }

    pub fn total_responses(&self) -> u64 {
        self.surveys.iter().map(|s| s.response_count).sum()
    }

    pub fn render(&self) -> Result<String, String> {
        render_dashboard(
            self.user.as_ref(),
            &self.surveys,
            self.active_count(),
            self.total_responses(),
        )
    }
}

/// Current user first, then their surveys. An unauthorized answer from
/// either call ends the session.
pub async fn load(gateway: &HttpGateway) -> Result<Dashboard, CommandError> {
    require_session(Route::Dashboard, gateway.session())?;
    let fetched = async {
        let user = gateway.me().await?;
        let surveys = gateway.list_surveys().await?;
        Ok::<_, GatewayError>((user, surveys))
    }
    .await;
    match fetched {
        Ok((user, surveys)) => {
            tracing::info!(surveys = surveys.len(), "dashboard loaded");
            Ok(Dashboard {
                user: Some(user),
                surveys,
            })
        }
        Err(err) => {
            let resolution = resolve(&err, gateway.session());
            if resolution.forced_logout {
                tracing::warn!("session rejected by server, signed out");
            }
            Err(CommandError::Gateway(err))
        }
    }
}

pub async fn delete_survey(
    gateway: &HttpGateway,
    dashboard: &mut Dashboard,
    id: &str,
    confirm: &dyn Confirm,
) -> Result<bool, CommandError> {
    if !confirm.confirm(DELETE_PROMPT) {
        return Ok(false);
    }
    gateway.delete_survey(id).await?;
    dashboard.surveys.retain(|s| s.id != id);
    tracing::info!(survey_id = id, "survey deleted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{delete_survey, load};
    use crate::commands::testing::gateway;
    use crate::commands::CommandError;

    const SURVEYS: &str = r#"{"data":[
        {"_id":"s1","title":"A","isActive":true,"responseCount":3},
        {"_id":"s2","title":"B","isActive":false,"responseCount":4},
        {"_id":"s3","title":"C","isActive":true}
    ]}"#;

    #[tokio::test]
    async fn totals_are_computed_from_the_list() {
        let mut server = mockito::Server::new_async().await;
        let _me = server
            .mock("GET", "/auth/me")
            .with_status(200)
            .with_body(r#"{"user":{"_id":"u1","username":"olena","email":"olena@example.com","isVerified":true}}"#)
            .create_async()
            .await;
        let _list = server
            .mock("GET", "/surveys")
            .with_status(200)
            .with_body(SURVEYS)
            .create_async()
            .await;

        let api = gateway(&server.url(), true);
        let dashboard = load(&api).await.expect("load");
        assert_eq!(dashboard.active_count(), 2);
        assert_eq!(dashboard.total_responses(), 7);
        let text = dashboard.render().expect("render");
        assert!(text.contains("Вітаємо, olena!"));
    }

    #[tokio::test]
    async fn unauthorized_forces_logout() {
        let mut server = mockito::Server::new_async().await;
        let _me = server
            .mock("GET", "/auth/me")
            .with_status(401)
            .with_body(r#"{"message":"Не авторизовано"}"#)
            .create_async()
            .await;

        let api = gateway(&server.url(), true);
        let err = load(&api).await.expect_err("unauthorized");
        assert_eq!(err.to_string(), "Не авторизовано");
        assert!(!api.session().is_authenticated());
    }

    #[tokio::test]
    async fn requires_a_session() {
        let api = gateway("http://127.0.0.1:9", false);
        assert!(matches!(load(&api).await, Err(CommandError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn delete_needs_confirmation_and_updates_the_list() {
        let mut server = mockito::Server::new_async().await;
        let _list = server
            .mock("GET", "/surveys")
            .with_status(200)
            .with_body(SURVEYS)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/surveys/s2")
            .with_status(200)
            .with_body(r#"{"message":"deleted"}"#)
            .expect(1)
            .create_async()
            .await;

        let api = gateway(&server.url(), true);
        let mut dashboard = super::Dashboard {
            user: None,
            surveys: api.list_surveys().await.expect("list"),
        };
        assert!(!delete_survey(&api, &mut dashboard, "s2", &|_: &str| false)
            .await
            .expect("declined"));
        assert_eq!(dashboard.surveys.len(), 3);

        assert!(delete_survey(&api, &mut dashboard, "s2", &|_: &str| true)
            .await
            .expect("deleted"));
        assert_eq!(dashboard.surveys.len(), 2);
        assert_eq!(dashboard.total_responses(), 3);
        delete.assert_async().await;
    }
}
