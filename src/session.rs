//! Admin edit session
//!
//! An explicit session object replaces page-global state: it owns the token,
//! the last committed pricing document and the working copy being edited.
//! The backend decides where login, load and save go: in-process
//! ([`LocalAdmin`]) or over the HTTP API ([`HttpAdmin`]).

use reqwest::{Client, StatusCode};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::PasswordAuthenticator;
use crate::models::api::{AuthResponse, PricingResponse, SavePricingResponse};
use crate::pricing::{parse_price_input, PricePath, PricingModel};
use crate::store::{PricingStore, SaveOutcome};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("login failed: {0}")]
    Login(String),
    #[error("failed to load pricing: {0}")]
    Load(String),
    #[error("save rejected: {0}")]
    SaveRejected(String),
    #[error("operation requires an active edit session (state: {0:?})")]
    NotEditing(SessionState),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Where an edit session logs in, loads and saves
#[allow(async_fn_in_trait)]
pub trait AdminBackend {
    /// Exchange the password for a session token
    async fn login(&self, password: &str) -> Result<String, SessionError>;

    /// Fetch the current pricing document
    async fn load(&self) -> Result<PricingModel, SessionError>;

    /// Submit a document; store-level refusals come back as `SaveOutcome::Rejected`
    async fn save(&self, model: &PricingModel, token: &str) -> Result<SaveOutcome, SessionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Editing,
    Saving,
}

pub struct AdminEditSession<B> {
    backend: B,
    state: SessionState,
    token: Option<String>,
    original: Option<PricingModel>,
    working: Option<PricingModel>,
}

impl<B: AdminBackend> AdminEditSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: SessionState::LoggedOut,
            token: None,
            original: None,
            working: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// The document being edited
    pub fn working_copy(&self) -> Option<&PricingModel> {
        self.working.as_ref()
    }

    /// The last loaded or committed document
    pub fn original(&self) -> Option<&PricingModel> {
        self.original.as_ref()
    }

    /// Whether the working copy differs from the last committed document
    pub fn is_dirty(&self) -> bool {
        self.working != self.original
    }

    /// Load the document from the backend, replacing both copies
    pub async fn load(&mut self) -> Result<&PricingModel, SessionError> {
        let model = self.backend.load().await?;
        debug!(prices = model.price_paths().len(), "Pricing loaded into session");
        self.original = Some(model.clone());
        Ok(self.working.insert(model))
    }

    /// Log in and start editing
    ///
    /// The document is loaded first if the session has none yet; when that
    /// fails the session stays logged out.
    pub async fn login(&mut self, password: &str) -> Result<(), SessionError> {
        let token = self.backend.login(password).await?;

        if self.original.is_none() {
            self.load().await?;
        }

        self.token = Some(token);
        self.state = SessionState::Editing;
        info!("Admin session started");
        Ok(())
    }

    /// Set one price in the working copy from raw form input
    ///
    /// Returns the value actually stored; unparseable input becomes 0.
    pub fn edit(&mut self, path: &PricePath, raw: &str) -> Result<f64, SessionError> {
        self.require_editing()?;
        let value = parse_price_input(raw);
        if let Some(working) = self.working.as_mut() {
            working.set(path, value);
        }
        Ok(value)
    }

    /// Discard all edits since the last load or commit
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.require_editing()?;
        self.working = self.original.clone();
        Ok(())
    }

    /// Save the working copy
    ///
    /// An accepted save (persisted or not) becomes the new baseline for
    /// `reset`; a rejected one leaves the working copy untouched.
    pub async fn save(&mut self) -> Result<SaveOutcome, SessionError> {
        self.require_editing()?;
        let (Some(working), Some(token)) = (self.working.as_ref(), self.token.as_deref()) else {
            return Err(SessionError::NotEditing(self.state));
        };

        self.state = SessionState::Saving;
        let result = self.backend.save(working, token).await;
        self.state = SessionState::Editing;

        match result? {
            SaveOutcome::Rejected(reason) => {
                warn!(reason = %reason, "Save rejected, keeping edits");
                Err(SessionError::SaveRejected(reason))
            }
            outcome => {
                self.original = self.working.clone();
                info!(outcome = outcome.as_str(), "Pricing committed");
                Ok(outcome)
            }
        }
    }

    /// End the session; unsaved edits are dropped
    pub fn logout(&mut self) {
        self.token = None;
        self.working = self.original.clone();
        self.state = SessionState::LoggedOut;
    }

    fn require_editing(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Editing => Ok(()),
            other => Err(SessionError::NotEditing(other)),
        }
    }
}

/// In-process backend: password check and store calls without HTTP
pub struct LocalAdmin {
    authenticator: PasswordAuthenticator,
    store: Arc<PricingStore>,
}

impl LocalAdmin {
    pub fn new(authenticator: PasswordAuthenticator, store: Arc<PricingStore>) -> Self {
        Self {
            authenticator,
            store,
        }
    }
}

impl AdminBackend for LocalAdmin {
    async fn login(&self, password: &str) -> Result<String, SessionError> {
        self.authenticator
            .login(Some(password))
            .map_err(|e| SessionError::Login(e.message()))
    }

    async fn load(&self) -> Result<PricingModel, SessionError> {
        self.store
            .load()
            .await
            .map(|loaded| loaded.model)
            .map_err(|e| SessionError::Load(e.to_string()))
    }

    async fn save(&self, model: &PricingModel, token: &str) -> Result<SaveOutcome, SessionError> {
        Ok(self.store.save(model, Some(token)).await)
    }
}

/// Backend that talks to a running server, as the admin page does
pub struct HttpAdmin {
    client: Client,
    base_url: String,
}

impl HttpAdmin {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Pull `error` out of a JSON error body, falling back to the status line
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.to_string())
}

impl AdminBackend for HttpAdmin {
    async fn login(&self, password: &str) -> Result<String, SessionError> {
        let response = self
            .client
            .post(format!("{}/auth", self.base_url))
            .json(&json!({ "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SessionError::Login(error_message(response).await));
        }

        let body: AuthResponse = response.json().await?;
        match body.token {
            Some(token) if body.success => Ok(token),
            _ => Err(SessionError::Login(
                body.error.unwrap_or_else(|| "no token in response".to_string()),
            )),
        }
    }

    async fn load(&self) -> Result<PricingModel, SessionError> {
        let response = self
            .client
            .get(format!("{}/pricing", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SessionError::Load(error_message(response).await));
        }

        let body: PricingResponse = response.json().await?;
        let pricing = body
            .pricing
            .ok_or_else(|| SessionError::Load("no pricing configuration available".to_string()))?;

        PricingModel::from_value(pricing).map_err(|e| SessionError::Load(e.to_string()))
    }

    async fn save(&self, model: &PricingModel, token: &str) -> Result<SaveOutcome, SessionError> {
        let pricing = model
            .to_value()
            .map_err(|e| SessionError::SaveRejected(e.to_string()))?;

        let response = self
            .client
            .post(format!("{}/pricing", self.base_url))
            .bearer_auth(token)
            .json(&json!({ "pricing": pricing }))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(SaveOutcome::Rejected(error_message(response).await));
        }

        let body: SavePricingResponse = response.json().await?;
        Ok(if body.persisted {
            SaveOutcome::Persisted
        } else {
            SaveOutcome::AcceptedNotPersisted(body.message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use std::sync::Mutex;

    const PRICING: &str = r#"{
        "scanToBIM": {"standaard": 10.0, "technisch": 45.0},
        "scanOnly": {"technisch": {"overdag": 2.0, "nachtwerk": 3.0}, "dak-buiten": 1.25},
        "modelOnly": {"standaard": 8.0}
    }"#;

    fn path(s: &str) -> PricePath {
        s.parse().unwrap()
    }

    fn local_session(password: &str) -> (AdminEditSession<LocalAdmin>, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PRICING.as_bytes()).unwrap();
        let store = Arc::new(PricingStore::new(None, file.path()));
        let backend = LocalAdmin::new(PasswordAuthenticator::new(password), store);
        (AdminEditSession::new(backend), file)
    }

    /// Backend with a scripted save outcome that records what it was sent
    struct ScriptedBackend {
        outcome: SaveOutcome,
        saved: Mutex<Vec<PricingModel>>,
    }

    impl AdminBackend for ScriptedBackend {
        async fn login(&self, _password: &str) -> Result<String, SessionError> {
            Ok("token".to_string())
        }

        async fn load(&self) -> Result<PricingModel, SessionError> {
            Ok(serde_json::from_str(PRICING).unwrap())
        }

        async fn save(&self, model: &PricingModel, _token: &str) -> Result<SaveOutcome, SessionError> {
            self.saved.lock().unwrap().push(model.clone());
            Ok(self.outcome.clone())
        }
    }

    fn scripted(outcome: SaveOutcome) -> AdminEditSession<ScriptedBackend> {
        AdminEditSession::new(ScriptedBackend {
            outcome,
            saved: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_login_loads_and_starts_editing() {
        let (mut session, _file) = local_session("admin123");
        assert_eq!(session.state(), SessionState::LoggedOut);

        session.login("admin123").await.unwrap();
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.is_logged_in());
        assert_eq!(session.working_copy().unwrap().scan_to_bim["technisch"], 45.0);
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_wrong_password_stays_logged_out() {
        let (mut session, _file) = local_session("admin123");
        let err = session.login("nope").await.unwrap_err();
        assert!(matches!(err, SessionError::Login(msg) if msg == "Invalid password"));
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_edits_require_login() {
        let (mut session, _file) = local_session("admin123");
        session.load().await.unwrap();

        assert!(matches!(
            session.edit(&path("scanToBIM.standaard"), "12"),
            Err(SessionError::NotEditing(SessionState::LoggedOut))
        ));
        assert!(session.reset().is_err());
        assert!(session.save().await.is_err());
    }

    #[tokio::test]
    async fn test_edit_parses_like_number_input() {
        let (mut session, _file) = local_session("admin123");
        session.login("admin123").await.unwrap();

        assert_eq!(session.edit(&path("scanToBIM.standaard"), "12.5").unwrap(), 12.5);
        assert_eq!(session.edit(&path("modelOnly.standaard"), "abc").unwrap(), 0.0);
        assert_eq!(session.edit(&path("scanOnly.technisch.nachtwerk"), "4.75").unwrap(), 4.75);

        let working = session.working_copy().unwrap();
        assert_eq!(working.scan_to_bim["standaard"], 12.5);
        assert_eq!(working.model_only["standaard"], 0.0);
        assert_eq!(working.get(&path("scanOnly.technisch.nachtwerk")), Some(4.75));
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn test_reset_restores_loaded_values_exactly() {
        let (mut session, _file) = local_session("admin123");
        session.login("admin123").await.unwrap();
        let loaded = session.original().unwrap().clone();

        session.edit(&path("scanToBIM.technisch"), "99").unwrap();
        session.edit(&path("scanOnly.dak-buiten"), "7").unwrap();
        session.edit(&path("modelOnly.nieuw"), "3").unwrap();
        session.reset().unwrap();

        assert_eq!(session.working_copy(), Some(&loaded));
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_accepted_save_becomes_reset_baseline() {
        let (mut session, _file) = local_session("admin123");
        session.login("admin123").await.unwrap();

        session.edit(&path("scanToBIM.standaard"), "20").unwrap();
        let outcome = session.save().await.unwrap();
        assert!(matches!(outcome, SaveOutcome::AcceptedNotPersisted(_)));
        assert_eq!(session.state(), SessionState::Editing);

        session.edit(&path("scanToBIM.standaard"), "30").unwrap();
        session.reset().unwrap();
        assert_eq!(session.working_copy().unwrap().scan_to_bim["standaard"], 20.0);
    }

    #[tokio::test]
    async fn test_rejected_save_keeps_edits() {
        let mut session = scripted(SaveOutcome::Rejected("KV down".to_string()));
        session.login("x").await.unwrap();
        session.edit(&path("scanToBIM.standaard"), "55").unwrap();

        let err = session.save().await.unwrap_err();
        assert!(matches!(err, SessionError::SaveRejected(reason) if reason == "KV down"));
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.working_copy().unwrap().scan_to_bim["standaard"], 55.0);
        assert_eq!(session.original().unwrap().scan_to_bim["standaard"], 10.0);
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn test_persisted_save_sends_working_copy() {
        let mut session = scripted(SaveOutcome::Persisted);
        session.login("x").await.unwrap();
        session.edit(&path("scanOnly.technisch.overdag"), "2.5").unwrap();

        assert_eq!(session.save().await.unwrap(), SaveOutcome::Persisted);
        let saved = session.backend.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].get(&path("scanOnly.technisch.overdag")), Some(2.5));
    }

    #[tokio::test]
    async fn test_logout_drops_token_and_edits() {
        let (mut session, _file) = local_session("admin123");
        session.login("admin123").await.unwrap();
        session.edit(&path("scanToBIM.standaard"), "77").unwrap();

        session.logout();
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(!session.is_logged_in());
        assert_eq!(session.working_copy().unwrap().scan_to_bim["standaard"], 10.0);
    }

    #[tokio::test]
    async fn test_http_admin_round_trip() {
        let server = MockServer::start_async().await;
        let auth = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth").json_body(json!({ "password": "admin123" }));
                then.status(200).json_body(json!({ "success": true, "token": "tok" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/pricing");
                then.status(200).json_body(json!({
                    "pricing": serde_json::from_str::<serde_json::Value>(PRICING).unwrap(),
                    "source": "kv"
                }));
            })
            .await;
        let save = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/pricing")
                    .header("authorization", "Bearer tok");
                then.status(200).json_body(json!({
                    "success": true,
                    "message": "Pricing saved",
                    "persisted": true
                }));
            })
            .await;

        let mut session = AdminEditSession::new(HttpAdmin::new(Client::new(), server.base_url()));
        session.login("admin123").await.unwrap();
        session.edit(&path("scanToBIM.standaard"), "11").unwrap();
        assert_eq!(session.save().await.unwrap(), SaveOutcome::Persisted);

        auth.assert_async().await;
        save.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_admin_surfaces_server_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth");
                then.status(401)
                    .json_body(json!({ "success": false, "error": "Invalid password" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/pricing");
                then.status(500)
                    .json_body(json!({ "success": false, "error": "store responded with 503" }));
            })
            .await;

        let backend = HttpAdmin::new(Client::new(), format!("{}/", server.base_url()));
        let err = backend.login("guess").await.unwrap_err();
        assert!(matches!(err, SessionError::Login(msg) if msg == "Invalid password"));

        let outcome = backend.save(&PricingModel::default(), "tok").await.unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Rejected("store responded with 503".to_string())
        );
    }
}
