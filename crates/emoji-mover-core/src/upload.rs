//! Upload step: one add-emoji form submission per downloaded image.

use tracing::{error, info};
use url::Url;

use crate::error::AppError;
use crate::models::DownloadedImage;
use crate::pacing::Pacer;
use crate::session::{open_customize_page, BrowserSession, DestinationUi, FileField};
use crate::sync::{ItemOutcome, MigrationStats};

/// Result of the whole upload step.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failures: Vec<(String, AppError)>,
    pub stats: MigrationStats,
}

/// Submits one emoji through the add-emoji form on the current page.
///
/// Succeeds only when the response page shows the success message.
pub async fn upload_one<S: BrowserSession>(
    session: &mut S,
    ui: &DestinationUi,
    image: &DownloadedImage,
) -> Result<(), AppError> {
    let bytes = tokio::fs::read(&image.path).await?;
    let file_name = image
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| image.name.clone());

    let file = FileField {
        field: ui.image_field.to_string(),
        file_name,
        bytes,
    };
    session
        .submit_form(
            ui.add_form,
            &[(ui.name_field, image.name.as_str()), (ui.mode_field, ui.mode_value)],
            Some(file),
        )
        .await?;

    if ui.upload_confirmed(&*session) {
        Ok(())
    } else {
        Err(AppError::UploadRejected(image.name.clone()))
    }
}

/// Uploads every image in turn, each exactly once.
///
/// Per-item failures are logged and collected. After each attempt the
/// customize page is reopened and the pacer pauses, whatever the outcome.
///
/// # Errors
///
/// Returns `AppError::PageUnreachable` if the customize page cannot be
/// reopened; the remaining items are not attempted.
pub async fn upload_all<S: BrowserSession>(
    session: &mut S,
    ui: &DestinationUi,
    workspace: &Url,
    images: &[DownloadedImage],
    pacer: &Pacer,
) -> Result<UploadReport, AppError> {
    let mut report = UploadReport::default();
    let total = images.len();

    info!("Uploading {} emoji...", total);
    for (i, image) in images.iter().enumerate() {
        match upload_one(session, ui, image).await {
            Ok(()) => {
                info!("[{}/{}] {} successfully added.", i + 1, total, image.name);
                report.stats.record(ItemOutcome::Uploaded);
                report.uploaded.push(image.name.clone());
            }
            Err(e) => {
                error!("[{}/{}] {} could not be added: {}", i + 1, total, image.name, e);
                report.stats.record(ItemOutcome::UploadFailed);
                report.failures.push((image.name.clone(), e));
            }
        }

        open_customize_page(session, ui, workspace).await?;
        pacer.pause().await;
    }

    Ok(report)
}
