//! Scripted browser session against the destination admin UI.
//!
//! The destination has no API for adding emoji, so the tool signs in through
//! the HTML login form and drives the customize page like a user would. The
//! markup it relies on is captured in [`DestinationUi`]; the transport is
//! behind the [`BrowserSession`] trait.

use tracing::{info, warn};
use url::Url;

use crate::error::AppError;
use crate::models::ExistingSet;
use crate::scan::{extract_names, ScanMode};

/// A file attached to a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileField {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Stateful, single-owner browser: login, navigate, submit, inspect.
///
/// Every state change takes `&mut self`; the page being inspected is always
/// the response to the last `open` or `submit_form`.
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    /// Loads `url` and makes it the current page.
    async fn open(&mut self, url: &Url) -> Result<(), AppError>;

    /// Submits the form matching the CSS selector `form` on the current page.
    ///
    /// `fields` override (or add to) the form's own inputs. The response
    /// becomes the current page.
    async fn submit_form(
        &mut self,
        form: &str,
        fields: &[(&str, &str)],
        file: Option<FileField>,
    ) -> Result<(), AppError>;

    /// Visible text of the whole current page.
    fn current_page_text(&self) -> String;

    /// Text of every element matching the CSS selector on the current page.
    fn select_text(&self, selector: &str) -> Vec<String>;
}

/// Markup and wording the destination UI is expected to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationUi {
    pub signin_form: &'static str,
    pub email_field: &'static str,
    pub password_field: &'static str,
    pub login_error_selector: &'static str,
    pub login_failure_message: &'static str,
    /// Customize page, relative to the workspace root.
    pub customize_path: &'static str,
    pub name_cell_selector: &'static str,
    pub add_form: &'static str,
    pub name_field: &'static str,
    pub image_field: &'static str,
    pub mode_field: &'static str,
    pub mode_value: &'static str,
    pub success_selector: &'static str,
    pub success_message: &'static str,
}

/// The Slack admin UI.
pub const SLACK_UI: DestinationUi = DestinationUi {
    signin_form: "form#signin_form",
    email_field: "email",
    password_field: "password",
    login_error_selector: "p.alert_error",
    login_failure_message: "Sorry, you entered an incorrect email address or password.",
    customize_path: "customize/emoji",
    name_cell_selector: "td.align_middle",
    add_form: "form#addemoji",
    name_field: "name",
    image_field: "img",
    mode_field: "mode",
    mode_value: "data",
    success_selector: "p.alert_success",
    success_message: "Your new emoji has been saved",
};

impl Default for DestinationUi {
    fn default() -> Self {
        SLACK_UI
    }
}

impl DestinationUi {
    /// Absolute URL of the customize page for `workspace`.
    pub fn customize_url(&self, workspace: &Url) -> Result<Url, AppError> {
        workspace
            .join(self.customize_path)
            .map_err(|e| AppError::InvalidUrl(format!("{}{}: {}", workspace, self.customize_path, e)))
    }

    /// True when the current page shows the success message.
    pub fn upload_confirmed<S: BrowserSession>(&self, session: &S) -> bool {
        session
            .select_text(self.success_selector)
            .iter()
            .any(|text| text.trim().contains(self.success_message))
    }
}

/// Opens the workspace and signs in with email and password.
///
/// # Errors
///
/// - `AppError::WorkspaceUnreachable` if the root page cannot be loaded
/// - `AppError::AuthenticationFailed` if the form cannot be submitted or the
///   response carries the login failure message
pub async fn sign_in<S: BrowserSession>(
    session: &mut S,
    ui: &DestinationUi,
    workspace: &Url,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    info!("Opening workspace page {}...", workspace);
    session.open(workspace).await.map_err(|e| {
        warn!("Workspace open failed: {}", e);
        AppError::WorkspaceUnreachable(workspace.to_string())
    })?;

    info!("Trying to sign in...");
    session
        .submit_form(
            ui.signin_form,
            &[(ui.email_field, email), (ui.password_field, password)],
            None,
        )
        .await
        .map_err(|e| AppError::AuthenticationFailed(e.to_string()))?;

    let rejected = session
        .select_text(ui.login_error_selector)
        .iter()
        .any(|text| text.trim() == ui.login_failure_message);
    if rejected {
        return Err(AppError::AuthenticationFailed(
            ui.login_failure_message.to_string(),
        ));
    }

    info!("Signed in as {}", email);
    Ok(())
}

/// Navigates to the customize page.
pub async fn open_customize_page<S: BrowserSession>(
    session: &mut S,
    ui: &DestinationUi,
    workspace: &Url,
) -> Result<(), AppError> {
    let url = ui.customize_url(workspace)?;
    session.open(&url).await.map_err(|e| {
        warn!("Customize page open failed: {}", e);
        AppError::PageUnreachable(url.to_string())
    })
}

/// Opens the customize page and collects the emoji names it lists.
///
/// The result is a snapshot taken once per run.
pub async fn scan_existing<S: BrowserSession>(
    session: &mut S,
    ui: &DestinationUi,
    workspace: &Url,
    mode: ScanMode,
) -> Result<ExistingSet, AppError> {
    info!("Accessing customize page...");
    open_customize_page(session, ui, workspace).await?;

    let existing = extract_names(session.select_text(ui.name_cell_selector), mode);
    info!("Found {} emoji already on the destination", existing.len());
    Ok(existing)
}
