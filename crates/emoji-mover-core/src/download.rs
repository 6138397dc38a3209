//! Image download step.
//!
//! Images land in a local directory under the final path segment of their
//! URL. A file that is already there counts as downloaded, so re-running the
//! tool after a partial failure only fetches what is missing.

use std::path::PathBuf;

use tracing::{error, info};

use crate::error::AppError;
use crate::models::{DownloadedImage, EmojiRecord};
use crate::pacing::Pacer;
use crate::sync::{ItemOutcome, MigrationStats};

/// Something that can fetch an image body by URL.
#[allow(async_fn_in_trait)]
pub trait ImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError>;
}

/// Successful result of fetching one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// File was already on disk, no request made
    AlreadyPresent,
    /// File fetched and written
    Downloaded,
}

impl From<DownloadOutcome> for ItemOutcome {
    fn from(outcome: DownloadOutcome) -> Self {
        match outcome {
            DownloadOutcome::AlreadyPresent => ItemOutcome::AlreadyPresent,
            DownloadOutcome::Downloaded => ItemOutcome::Downloaded,
        }
    }
}

/// Result of the whole download step.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Images available for upload, in processing order.
    pub downloaded: Vec<DownloadedImage>,
    /// Emoji that could not be downloaded, with the reason.
    pub failures: Vec<(String, AppError)>,
    pub stats: MigrationStats,
}

/// Downloads emoji images into a directory, skipping ones already there.
pub struct ImageFetcher<S> {
    source: S,
    dir: PathBuf,
}

impl<S: ImageSource> ImageFetcher<S> {
    pub fn new(source: S, dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            dir: dir.into(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Local path the image of `record` is stored under.
    pub fn local_path(&self, record: &EmojiRecord) -> Result<PathBuf, AppError> {
        record
            .file_name()
            .map(|name| self.dir.join(name))
            .ok_or_else(|| {
                AppError::InvalidUrl(format!("no file name in {}", record.image_ref))
            })
    }

    /// Makes the image of one emoji available locally.
    ///
    /// Writes to a `.part` file first and renames it into place, so an
    /// interrupted write does not leave a file that a later run would take
    /// as complete.
    pub async fn fetch_one(
        &self,
        record: &EmojiRecord,
    ) -> Result<(DownloadOutcome, PathBuf), AppError> {
        let path = self.local_path(record)?;
        if tokio::fs::try_exists(&path).await? {
            return Ok((DownloadOutcome::AlreadyPresent, path));
        }

        let bytes = self.source.fetch(&record.image_ref).await?;

        let mut partial = path.clone().into_os_string();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        if let Err(e) = tokio::fs::write(&partial, &bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        Ok((DownloadOutcome::Downloaded, path))
    }

    /// Downloads every record in turn.
    ///
    /// A failure is logged and recorded for that emoji only; the rest of the
    /// batch continues. The pacer pauses after each new download.
    pub async fn download_all(&self, work: &[EmojiRecord], pacer: &Pacer) -> DownloadReport {
        let mut report = DownloadReport::default();
        let total = work.len();

        for (i, record) in work.iter().enumerate() {
            match self.fetch_one(record).await {
                Ok((outcome, path)) => {
                    report.stats.record(outcome.into());
                    report.downloaded.push(DownloadedImage {
                        name: record.name.clone(),
                        path,
                    });
                    match outcome {
                        DownloadOutcome::AlreadyPresent => {
                            info!("[{}/{}] {} already exists...", i + 1, total, record.name);
                        }
                        DownloadOutcome::Downloaded => {
                            info!("[{}/{}] {} downloaded...", i + 1, total, record.name);
                            pacer.pause().await;
                        }
                    }
                }
                Err(e) => {
                    error!(
                        "[{}/{}] Error while downloading {}: {}",
                        i + 1,
                        total,
                        record.name,
                        e
                    );
                    report.stats.record(ItemOutcome::DownloadFailed);
                    report.failures.push((record.name.clone(), e));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeImageSource;
    use std::time::Duration;

    fn no_pause() -> Pacer {
        Pacer::new(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_fetch_one_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeImageSource::new().serve("http://x/f.png", b"PNGDATA");
        let fetcher = ImageFetcher::new(source, dir.path());

        let (outcome, path) = fetcher
            .fetch_one(&EmojiRecord::new("foo", "http://x/f.png"))
            .await
            .unwrap();

        assert_eq!(outcome, DownloadOutcome::Downloaded);
        assert_eq!(path, dir.path().join("f.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"PNGDATA");
        assert!(!dir.path().join("f.png.part").exists());
    }

    #[tokio::test]
    async fn test_fetch_one_skips_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.png"), b"cached").unwrap();
        let fetcher = ImageFetcher::new(FakeImageSource::new(), dir.path());

        let (outcome, _) = fetcher
            .fetch_one(&EmojiRecord::new("foo", "http://x/f.png"))
            .await
            .unwrap();

        assert_eq!(outcome, DownloadOutcome::AlreadyPresent);
        assert_eq!(fetcher.source().fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_one_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeImageSource::new().fail("http://x/f.png");
        let fetcher = ImageFetcher::new(source, dir.path());

        let err = fetcher
            .fetch_one(&EmojiRecord::new("foo", "http://x/f.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NetworkError(_)));
        assert!(!dir.path().join("f.png").exists());
        assert!(!dir.path().join("f.png.part").exists());
    }

    #[tokio::test]
    async fn test_fetch_one_without_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ImageFetcher::new(FakeImageSource::new(), dir.path());

        let err = fetcher
            .fetch_one(&EmojiRecord::new("foo", "http://x/"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl(_)));
        assert_eq!(fetcher.source().fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_download_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let work = vec![
            EmojiRecord::new("foo", "http://x/f.png"),
            EmojiRecord::new("bar", "http://x/b.gif"),
        ];
        let source = FakeImageSource::new()
            .serve("http://x/f.png", b"f")
            .serve("http://x/b.gif", b"b");
        let fetcher = ImageFetcher::new(source, dir.path());

        let first = fetcher.download_all(&work, &no_pause()).await;
        assert_eq!(first.stats.downloaded, 2);
        assert_eq!(fetcher.source().fetch_count(), 2);

        let second = fetcher.download_all(&work, &no_pause()).await;
        assert_eq!(fetcher.source().fetch_count(), 2);
        assert_eq!(second.stats.already_present, 2);
        assert_eq!(second.stats.downloaded, 0);
        assert_eq!(second.downloaded.len(), 2);
        assert!(second.failures.is_empty());
    }

    #[tokio::test]
    async fn test_download_all_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let work = vec![
            EmojiRecord::new("a", "http://x/a.png"),
            EmojiRecord::new("x", "http://x/x.png"),
            EmojiRecord::new("c", "http://x/c.png"),
        ];
        let source = FakeImageSource::new()
            .serve("http://x/a.png", b"a")
            .fail("http://x/x.png")
            .serve("http://x/c.png", b"c");
        let fetcher = ImageFetcher::new(source, dir.path());

        let report = fetcher.download_all(&work, &no_pause()).await;

        let names: Vec<&str> = report.downloaded.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "x");
        assert_eq!(report.stats.download_failed, 1);
        assert_eq!(fetcher.source().fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_all_paces_only_new_downloads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"cached").unwrap();
        let work = vec![
            EmojiRecord::new("a", "http://x/a.png"),
            EmojiRecord::new("b", "http://x/b.png"),
        ];
        let source = FakeImageSource::new().serve("http://x/b.png", b"b");
        let fetcher = ImageFetcher::new(source, dir.path());

        let start = tokio::time::Instant::now();
        fetcher
            .download_all(&work, &Pacer::new(Duration::from_secs(3)))
            .await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(6));
    }
}
