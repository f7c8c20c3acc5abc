//! Remote API access.
//!
//! [`HttpGateway`] speaks the REST contract. The draft editor and the
//! response collector only see the narrow async traits below, so their state
//! machines can be driven by in-process fakes.

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpGateway;
pub use error::{ErrorKind, GatewayError};
pub use types::{FileUpload, ResponseSubmission, SurveyAnalytics, User};

use async_trait::async_trait;

use crate::survey::{SurveyDefinition, SurveyDraft};

/// Authoring side: create a survey, then attach its cover.
#[async_trait]
pub trait SurveyGateway: Send + Sync {
    async fn create_survey(&self, draft: &SurveyDraft) -> Result<SurveyDefinition, GatewayError>;

    async fn upload_survey_cover(
        &self,
        survey_id: &str,
        cover: &FileUpload,
    ) -> Result<(), GatewayError>;
}

/// Respondent side, addressed by the public link token.
#[async_trait]
pub trait PublicGateway: Send + Sync {
    async fn get_public_survey(&self, unique_link: &str) -> Result<SurveyDefinition, GatewayError>;

    async fn submit_response(
        &self,
        unique_link: &str,
        submission: &ResponseSubmission,
    ) -> Result<(), GatewayError>;
}
