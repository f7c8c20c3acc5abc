use serde_json::Value;

use crate::draft::Confirm;
use crate::gateway::types::SurveyUpdate;
use crate::gateway::{HttpGateway, SurveyAnalytics};
use crate::render::helpers::public_link;
use crate::render::templates::render_survey_report;
use crate::routes::Route;
use crate::survey::SurveyDefinition;

use super::{require_session, CommandError};

pub const REGENERATE_PROMPT: &str = "Згенерувати нове посилання? Старе посилання перестане працювати.";
pub const DELETE_PROMPT: &str = "Видалити опитування та всі відповіді? Це не можна буде скасувати.";

#[derive(Debug, Clone)]
pub struct SurveyDetail {
    pub survey: SurveyDefinition,
    pub analytics: Option<SurveyAnalytics>,
}

impl SurveyDetail {
    pub fn public_link(&self, origin: &str) -> Result<String, String> {
        public_link(origin, &self.survey.unique_link)
    }

    pub fn render(&self, origin: &str) -> Result<String, String> {
        let link = self.public_link(origin)?;
        render_survey_report(&self.survey, self.analytics.as_ref(), &link)
    }
}

fn survey_id(id: &str) -> Result<&str, CommandError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CommandError::Invalid("ID опитування не знайдено".to_string()));
    }
    Ok(id)
}

/// Fetches the survey and its analytics together. Analytics are optional:
/// their failure leaves `analytics` empty instead of failing the page.
pub async fn load(gateway: &HttpGateway, id: &str) -> Result<SurveyDetail, CommandError> {
    let id = survey_id(id)?;
    require_session(
        Route::SurveyDetail {
            id: Some(id.to_string()),
        },
        gateway.session(),
    )?;
    let (survey, analytics) = tokio::join!(gateway.get_survey(id), gateway.survey_analytics(id));
    let analytics = match analytics {
        Ok(analytics) => Some(analytics),
        Err(err) => {
            tracing::warn!(survey_id = id, error = %err, "analytics unavailable");
            None
        }
    };
    Ok(SurveyDetail {
        survey: survey?,
        analytics,
    })
}

/// Flips `isActive` and returns the confirmation shown to the author.
pub async fn toggle_active(gateway: &HttpGateway, detail: &mut SurveyDetail) -> Result<String, CommandError> {
    let next = !detail.survey.is_active;
    let update = SurveyUpdate {
        is_active: Some(next),
        ..SurveyUpdate::default()
    };
    gateway.update_survey(&detail.survey.id, &update).await?;
    detail.survey.is_active = next;
    Ok(if next {
        "Опитування активовано".to_string()
    } else {
        "Опитування призупинено".to_string()
    })
}

pub async fn regenerate_link(
    gateway: &HttpGateway,
    detail: &mut SurveyDetail,
    confirm: &dyn Confirm,
) -> Result<Option<String>, CommandError> {
    if !confirm.confirm(REGENERATE_PROMPT) {
        return Ok(None);
    }
    let link = gateway.regenerate_link(&detail.survey.id).await?;
    tracing::info!(survey_id = %detail.survey.id, "public link regenerated");
    detail.survey.unique_link = link.clone();
    Ok(Some(link))
}

pub async fn delete(gateway: &HttpGateway, id: &str, confirm: &dyn Confirm) -> Result<bool, CommandError> {
    let id = survey_id(id)?;
    if !confirm.confirm(DELETE_PROMPT) {
        return Ok(false);
    }
    gateway.delete_survey(id).await?;
    Ok(true)
}

pub async fn stats(gateway: &HttpGateway, id: &str) -> Result<Value, CommandError> {
    Ok(gateway.survey_stats(survey_id(id)?).await?)
}

pub async fn remove_cover(gateway: &HttpGateway, id: &str) -> Result<(), CommandError> {
    Ok(gateway.delete_survey_cover(survey_id(id)?).await?)
}

#[cfg(test)]
mod tests {
    use super::{load, regenerate_link, toggle_active};
    use crate::commands::testing::gateway;
    use crate::commands::CommandError;
    use mockito::Matcher;

    const SURVEY: &str = r#"{"data":{"_id":"s1","title":"Настрій","uniqueLink":"old","isActive":true,"questions":[]}}"#;

    #[tokio::test]
    async fn analytics_failure_still_shows_the_survey() {
        let mut server = mockito::Server::new_async().await;
        let _s = server
            .mock("GET", "/surveys/s1")
            .with_status(200)
            .with_body(SURVEY)
            .create_async()
            .await;
        let _a = server
            .mock("GET", "/surveys/s1/analytics")
            .with_status(500)
            .with_body(r#"{"message":"boom"}"#)
            .create_async()
            .await;

        let api = gateway(&server.url(), true);
        let detail = load(&api, "s1").await.expect("load");
        assert_eq!(detail.survey.title, "Настрій");
        assert!(detail.analytics.is_none());
        assert_eq!(
            detail.public_link("http://localhost:5173").expect("link"),
            "http://localhost:5173/pages/take-survey.html?link=old"
        );
        assert!(detail.render("http://localhost:5173").expect("render").contains("Немає даних для аналітики"));
    }

    #[tokio::test]
    async fn missing_id_is_rejected_locally() {
        let api = gateway("http://127.0.0.1:9", true);
        let err = load(&api, " ").await.expect_err("no id");
        assert_eq!(err.to_string(), "ID опитування не знайдено");
        assert!(matches!(err, CommandError::Invalid(_)));
    }

    #[tokio::test]
    async fn toggle_and_regenerate() {
        let mut server = mockito::Server::new_async().await;
        let _s = server
            .mock("GET", "/surveys/s1")
            .with_status(200)
            .with_body(SURVEY)
            .create_async()
            .await;
        let _a = server
            .mock("GET", "/surveys/s1/analytics")
            .with_status(200)
            .with_body(r#"{"data":null}"#)
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/surveys/s1")
            .match_body(Matcher::Json(serde_json::json!({ "isActive": false })))
            .with_status(200)
            .with_body(r#"{"data":{}}"#)
            .create_async()
            .await;
        let regen = server
            .mock("POST", "/surveys/s1/regenerate-link")
            .with_status(200)
            .with_body(r#"{"data":{"uniqueLink":"fresh"}}"#)
            .expect(1)
            .create_async()
            .await;

        let api = gateway(&server.url(), true);
        let mut detail = load(&api, "s1").await.expect("load");
        assert_eq!(toggle_active(&api, &mut detail).await.expect("toggle"), "Опитування призупинено");
        assert!(!detail.survey.is_active);
        put.assert_async().await;

        assert_eq!(regenerate_link(&api, &mut detail, &|_: &str| false).await.expect("declined"), None);
        assert_eq!(detail.survey.unique_link, "old");
        let link = regenerate_link(&api, &mut detail, &|_: &str| true).await.expect("regen");
        assert_eq!(link.as_deref(), Some("fresh"));
        assert_eq!(detail.survey.unique_link, "fresh");
        regen.assert_async().await;
    }
}
