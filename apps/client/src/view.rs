//! State behind the three-tab search screen.
//!
//! [`ImageSearchView`] owns everything the screen shows and the session it
//! acts under. Network work happens through [`SearchApi`] and
//! [`SimilarityService`], so the same view drives the CLI and the tests.
//!
//! Uploading is a linear pipeline, each step awaited before the next:
//!
//! ```text
//! find_similar ──► show results ──► (signed in?) save ──► history ──► recommendations
//! ```
//!
//! The first failing step ends the pipeline and is recorded in
//! [`ImageSearchView::failed_step`]. Results already shown stay on screen.

use std::fmt;

use tracing::{info, warn};

use crate::api::{HistoryEntry, SaveSearch, SearchApi};
use crate::error::ClientError;
use crate::image::ImageFile;
use crate::session::Session;
use crate::similarity::SimilarityService;

pub const INVALID_FILE_MESSAGE: &str = "Please select a valid image file";
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to save your search history";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Search,
    History,
    ForYou,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tab::Search => "SEARCH",
            Tab::History => "HISTORY",
            Tab::ForYou => "FOR YOU",
        })
    }
}

/// Steps of the upload pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    FindSimilar,
    Save,
    RefreshHistory,
    RefreshRecommendations,
}

struct StepFailure {
    step: UploadStep,
    source: ClientError,
}

trait AtStep<T> {
    fn at(self, step: UploadStep) -> Result<T, StepFailure>;
}

impl<T> AtStep<T> for Result<T, ClientError> {
    fn at(self, step: UploadStep) -> Result<T, StepFailure> {
        self.map_err(|source| StepFailure { step, source })
    }
}

pub struct ImageSearchView<A, S> {
    api: A,
    similarity: S,
    session: Session,
    selected_file: Option<ImageFile>,
    preview: Option<String>,
    similar_images: Vec<String>,
    loading: bool,
    error: Option<String>,
    failed_step: Option<UploadStep>,
    tab: Tab,
    history: Vec<HistoryEntry>,
    recommendations: Vec<String>,
}

impl<A: SearchApi, S: SimilarityService> ImageSearchView<A, S> {
    pub fn new(api: A, similarity: S, session: Session) -> Self {
        Self {
            api,
            similarity,
            session,
            selected_file: None,
            preview: None,
            similar_images: Vec::new(),
            loading: false,
            error: None,
            failed_step: None,
            tab: Tab::default(),
            history: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selected_file(&self) -> Option<&ImageFile> {
        self.selected_file.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn similar_images(&self) -> &[String] {
        &self.similar_images
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn failed_step(&self) -> Option<UploadStep> {
        self.failed_step
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn login(&mut self, token: impl Into<String>) {
        self.session.login(token);
    }

    /// Initial load: pull history and recommendations when signed in.
    ///
    /// A rejected credential signs the session out; nothing is shown as an error.
    pub async fn mount(&mut self) {
        let Some(authorization) = self.session.authorization() else {
            return;
        };
        if let Err(err) = self.fetch_history(&authorization).await {
            self.note_fetch_failure("history", err);
        }

        // History may have signed us out.
        let Some(authorization) = self.session.authorization() else {
            return;
        };
        if let Err(err) = self.fetch_recommendations(&authorization).await {
            self.note_fetch_failure("recommendations", err);
        }
    }

    /// Pick the file to search with. Anything that is not an image is refused
    /// and leaves the current preview alone.
    pub fn select_file(&mut self, file: ImageFile) {
        if !file.is_image() {
            self.error = Some(INVALID_FILE_MESSAGE.to_string());
            return;
        }

        self.preview = Some(file.preview());
        self.selected_file = Some(file);
        self.error = None;
    }

    /// Run the upload pipeline for the selected file. Does nothing without one.
    pub async fn upload(&mut self) {
        let Some(file) = self.selected_file.clone() else {
            return;
        };

        self.loading = true;
        self.error = None;
        self.failed_step = None;

        if let Err(failure) = self.run_upload(&file).await {
            self.report(failure);
        }

        self.loading = false;
    }

    async fn run_upload(&mut self, file: &ImageFile) -> Result<(), StepFailure> {
        let result = self
            .similarity
            .find_similar(file)
            .await
            .at(UploadStep::FindSimilar)?;

        let Some(similar_images) = result.similar_images else {
            return Ok(());
        };
        self.similar_images = similar_images.clone();
        info!(count = similar_images.len(), "Received similar images");

        let Some(authorization) = self.session.authorization() else {
            return Ok(());
        };

        // The service does not always echo the upload back; store what was sent.
        let search = SaveSearch {
            original_image: result.original_image.unwrap_or_else(|| file.encoded()),
            similar_images,
        };
        self.api
            .save(&authorization, &search)
            .await
            .at(UploadStep::Save)?;

        self.fetch_history(&authorization)
            .await
            .at(UploadStep::RefreshHistory)?;
        self.fetch_recommendations(&authorization)
            .await
            .at(UploadStep::RefreshRecommendations)?;

        Ok(())
    }

    fn report(&mut self, failure: StepFailure) {
        warn!(step = ?failure.step, error = %failure.source, "Upload failed");
        self.failed_step = Some(failure.step);

        if failure.source.is_credential_rejection() {
            self.session.clear();
            self.error = Some(LOGIN_REQUIRED_MESSAGE.to_string());
        } else {
            self.error = Some(failure.source.user_message());
        }
    }

    async fn fetch_history(&mut self, authorization: &str) -> Result<(), ClientError> {
        self.history = self.api.history(authorization).await?;
        Ok(())
    }

    async fn fetch_recommendations(&mut self, authorization: &str) -> Result<(), ClientError> {
        self.recommendations = self.api.recommendations(authorization).await?;
        Ok(())
    }

    fn note_fetch_failure(&mut self, what: &str, err: ClientError) {
        warn!("Error fetching {}: {}", what, err);
        if err.is_credential_rejection() {
            self.session.clear();
        }
    }
}
