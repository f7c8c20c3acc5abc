use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::auth::session::Session;
use crate::settings::Settings;
use crate::survey::{ImageRef, SurveyDefinition, SurveyDraft};

use super::error::GatewayError;
use super::types::{
    Envelope, FileUpload, LinkResponse, LoginRequest, LoginResponse, MeResponse, MessageResponse,
    RegisterRequest, ResponseSubmission, SurveyAnalytics, SurveyUpdate, User,
};
use super::{PublicGateway, SurveyGateway};

#[derive(Debug, serde::Deserialize)]
struct AvatarResponse {
    #[serde(default)]
    avatar: Option<ImageRef>,
}

/// JSON-over-HTTP client for the survey API. Attaches the session's bearer
/// token to every request when one is stored.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    session: Session,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Session,
    ) -> Result<Self, GatewayError> {
        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| GatewayError::InvalidUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(raw));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn from_settings(settings: &Settings, session: Session) -> Result<Self, GatewayError> {
        Self::new(
            settings.api_base_url.clone(),
            Duration::from_secs(settings.request_timeout_secs.max(1)),
            session,
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Appends `path` to the base URL one segment at a time, so ids and
    /// link tokens are percent-encoded and cannot change the route.
    fn url(&self, path: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path);
        }
        url
    }

    fn builder(&self, method: Method, path: &[&str]) -> RequestBuilder {
        let url = self.url(path);
        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        match self.session.token() {
            Ok(Some(token)) => request = request.bearer_auth(token),
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "unable to read session token"),
        }
        request
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &[&str],
    ) -> Result<T, GatewayError> {
        let endpoint = format!("/{}", path.join("/"));
        let endpoint = endpoint.as_str();
        let response = request.send().await.map_err(|err| {
            tracing::error!(endpoint, error = %err, "API request failed");
            GatewayError::from(err)
        })?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = GatewayError::from_response(status.as_u16(), &body);
            tracing::warn!(endpoint, status = status.as_u16(), kind = ?err.kind(), "API error: {err}");
            return Err(err);
        }
        tracing::debug!(endpoint, status = status.as_u16(), "API response");
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(format!("{endpoint}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, GatewayError> {
        self.execute(self.builder(Method::GET, path), path).await
    }

    async fn send<B, T>(&self, method: Method, path: &[&str], body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute(self.builder(method, path).json(body), path)
            .await
    }

    async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
    ) -> Result<T, GatewayError> {
        self.execute(self.builder(method, path), path).await
    }

    async fn upload<T: DeserializeOwned>(
        &self,
        path: &[&str],
        field: &'static str,
        file: &FileUpload,
    ) -> Result<T, GatewayError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part(field, part);
        self.execute(self.builder(Method::POST, path).multipart(form), path)
            .await
    }

    // Auth

    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, GatewayError> {
        self.send(Method::POST, &["auth", "register"], request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, GatewayError> {
        self.send(Method::POST, &["auth", "login"], request).await
    }

    pub async fn me(&self) -> Result<User, GatewayError> {
        let response: MeResponse = self.get(&["auth", "me"]).await?;
        Ok(response.user)
    }

    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse, GatewayError> {
        self.send_empty(Method::PUT, &["auth", "verify-email", token])
            .await
    }

    pub async fn resend_verification(&self, email: &str) -> Result<MessageResponse, GatewayError> {
        self.send(
            Method::POST,
            &["auth", "resend-verification"],
            &serde_json::json!({ "email": email }),
        )
        .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, GatewayError> {
        self.send(
            Method::POST,
            &["auth", "forgot-password"],
            &serde_json::json!({ "email": email }),
        )
        .await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
    ) -> Result<MessageResponse, GatewayError> {
        self.send(
            Method::PUT,
            &["auth", "reset-password", token],
            &serde_json::json!({ "password": password }),
        )
        .await
    }

    // Surveys

    pub async fn list_surveys(&self) -> Result<Vec<SurveyDefinition>, GatewayError> {
        let envelope: Envelope<Option<Vec<SurveyDefinition>>> = self.get(&["surveys"]).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn get_survey(&self, id: &str) -> Result<SurveyDefinition, GatewayError> {
        let envelope: Envelope<SurveyDefinition> = self.get(&["surveys", id]).await?;
        Ok(envelope.data)
    }

    pub async fn update_survey(&self, id: &str, update: &SurveyUpdate) -> Result<(), GatewayError> {
        let _: IgnoredAny = self
            .send(Method::PUT, &["surveys", id], update)
            .await?;
        Ok(())
    }

    pub async fn delete_survey(&self, id: &str) -> Result<(), GatewayError> {
        let _: IgnoredAny = self
            .send_empty(Method::DELETE, &["surveys", id])
            .await?;
        Ok(())
    }

    /// Issues a fresh public token; the previous link stops working.
    pub async fn regenerate_link(&self, id: &str) -> Result<String, GatewayError> {
        let envelope: Envelope<LinkResponse> = self
            .send_empty(Method::POST, &["surveys", id, "regenerate-link"])
            .await?;
        Ok(envelope.data.unique_link)
    }

    pub async fn survey_stats(&self, id: &str) -> Result<Value, GatewayError> {
        self.get(&["surveys", id, "stats"]).await
    }

    pub async fn survey_analytics(&self, id: &str) -> Result<SurveyAnalytics, GatewayError> {
        let envelope: Envelope<Option<SurveyAnalytics>> =
            self.get(&["surveys", id, "analytics"]).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn public_results(&self, unique_link: &str) -> Result<Value, GatewayError> {
        self.get(&["public", "survey", unique_link, "results"])
            .await
    }

    // Uploads

    pub async fn upload_avatar(&self, file: &FileUpload) -> Result<Option<ImageRef>, GatewayError> {
        let envelope: Envelope<AvatarResponse> =
            self.upload(&["upload", "avatar"], "avatar", file).await?;
        Ok(envelope.data.avatar)
    }

    pub async fn delete_avatar(&self) -> Result<(), GatewayError> {
        let _: IgnoredAny = self.send_empty(Method::DELETE, &["upload", "avatar"]).await?;
        Ok(())
    }

    pub async fn delete_survey_cover(&self, survey_id: &str) -> Result<(), GatewayError> {
        let _: IgnoredAny = self
            .send_empty(Method::DELETE, &["upload", "survey", survey_id, "cover"])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SurveyGateway for HttpGateway {
    async fn create_survey(&self, draft: &SurveyDraft) -> Result<SurveyDefinition, GatewayError> {
        let envelope: Envelope<SurveyDefinition> =
            self.send(Method::POST, &["surveys"], draft).await?;
        tracing::info!(survey_id = %envelope.data.id, "survey created");
        Ok(envelope.data)
    }

    async fn upload_survey_cover(
        &self,
        survey_id: &str,
        cover: &FileUpload,
    ) -> Result<(), GatewayError> {
        let _: IgnoredAny = self
            .upload(&["upload", "survey", survey_id, "cover"], "cover", cover)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PublicGateway for HttpGateway {
    async fn get_public_survey(&self, unique_link: &str) -> Result<SurveyDefinition, GatewayError> {
        let envelope: Envelope<SurveyDefinition> =
            self.get(&["public", "survey", unique_link]).await?;
        Ok(envelope.data)
    }

    async fn submit_response(
        &self,
        unique_link: &str,
        submission: &ResponseSubmission,
    ) -> Result<(), GatewayError> {
        let _: IgnoredAny = self
            .send(
                Method::POST,
                &["public", "survey", unique_link, "submit"],
                submission,
            )
            .await?;
        tracing::info!(unique_link, answers = submission.answers.len(), "response submitted");
        Ok(())
    }
}
