//! In-memory fakes for the browser session and image source.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use url::Url;

use crate::download::ImageSource;
use crate::error::AppError;
use crate::session::{BrowserSession, FileField};

/// Texts keyed by the CSS selector that would match them.
#[derive(Debug, Clone, Default)]
pub struct Page {
    texts: HashMap<String, Vec<String>>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, text: &str) -> Self {
        self.texts
            .entry(selector.to_string())
            .or_default()
            .push(text.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub form: String,
    pub fields: Vec<(String, String)>,
    pub file: Option<FileField>,
}

impl Submission {
    pub fn has_field(&self, name: &str, value: &str) -> bool {
        self.fields.iter().any(|(n, v)| n == name && v == value)
    }
}

type SubmitHandler =
    Box<dyn FnMut(&str, &[(String, String)], Option<&FileField>) -> Result<Page, AppError>>;

#[derive(Default)]
pub struct FakeSession {
    pages: HashMap<String, Page>,
    current: Page,
    handler: Option<SubmitHandler>,
    /// Number of `open` calls that may still succeed; unlimited when `None`.
    pub open_budget: Option<usize>,
    pub opened: Vec<String>,
    pub submissions: Vec<Submission>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, url: &str, page: Page) {
        self.pages.insert(url.to_string(), page);
    }

    pub fn on_submit<F>(&mut self, handler: F)
    where
        F: FnMut(&str, &[(String, String)], Option<&FileField>) -> Result<Page, AppError> + 'static,
    {
        self.handler = Some(Box::new(handler));
    }
}

impl BrowserSession for FakeSession {
    async fn open(&mut self, url: &Url) -> Result<(), AppError> {
        if let Some(budget) = self.open_budget.as_mut() {
            if *budget == 0 {
                return Err(AppError::NetworkError(format!("{} refused", url)));
            }
            *budget -= 1;
        }
        let page = self
            .pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| AppError::NetworkError(format!("{} unreachable", url)))?;
        self.opened.push(url.to_string());
        self.current = page;
        Ok(())
    }

    async fn submit_form(
        &mut self,
        form: &str,
        fields: &[(&str, &str)],
        file: Option<FileField>,
    ) -> Result<(), AppError> {
        let fields: Vec<(String, String)> = fields
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        self.submissions.push(Submission {
            form: form.to_string(),
            fields: fields.clone(),
            file: file.clone(),
        });

        let page = match self.handler.as_mut() {
            Some(handler) => handler(form, &fields, file.as_ref())?,
            None => Page::new(),
        };
        self.current = page;
        Ok(())
    }

    fn current_page_text(&self) -> String {
        self.current
            .texts
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn select_text(&self, selector: &str) -> Vec<String> {
        self.current.texts.get(selector).cloned().unwrap_or_default()
    }
}

/// Serves fixed bytes per URL and records every fetch.
#[derive(Default)]
pub struct FakeImageSource {
    images: HashMap<String, Vec<u8>>,
    broken: HashSet<String>,
    pub fetched: RefCell<Vec<String>>,
}

impl FakeImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn fail(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.borrow().len()
    }
}

impl ImageSource for FakeImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        self.fetched.borrow_mut().push(url.to_string());
        if self.broken.contains(url) {
            return Err(AppError::NetworkError("Connection failed: reset by peer".to_string()));
        }
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::ClientError(format!("HTTP 404 from {}", url)))
    }
}
