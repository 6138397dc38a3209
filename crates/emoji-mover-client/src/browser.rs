//! Cookie-backed HTML browser session.
//!
//! Just enough of a browser to sign in and post forms: a cookie jar, the
//! last loaded page, and form serialization (hidden inputs included, so CSRF
//! tokens travel with the submission).

use emoji_mover_core::error::AppError;
use emoji_mover_core::session::{BrowserSession, FileField};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::http::{build_client, check_status, request_error};

/// Input types never serialized with a form.
const SKIPPED_INPUT_TYPES: [&str; 5] = ["submit", "button", "image", "reset", "file"];

#[derive(Debug, Clone)]
struct LoadedPage {
    url: Url,
    body: String,
}

/// [`BrowserSession`] over reqwest with a cookie jar and scraper for HTML.
pub struct HttpBrowser {
    client: Client,
    page: Option<LoadedPage>,
}

impl HttpBrowser {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(true)?,
            page: None,
        })
    }

    async fn load(&mut self, request: RequestBuilder) -> Result<(), AppError> {
        let resp: Response = request.send().await.map_err(request_error)?;
        let resp = check_status(resp)?;
        let url = resp.url().clone();
        let body = resp.text().await.map_err(request_error)?;
        debug!("Loaded {} ({} bytes)", url, body.len());
        self.page = Some(LoadedPage { url, body });
        Ok(())
    }
}

impl BrowserSession for HttpBrowser {
    async fn open(&mut self, url: &Url) -> Result<(), AppError> {
        let request = self.client.get(url.clone());
        self.load(request).await
    }

    async fn submit_form(
        &mut self,
        form: &str,
        fields: &[(&str, &str)],
        file: Option<FileField>,
    ) -> Result<(), AppError> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| AppError::Generic("No page loaded".to_string()))?;

        let mut spec = FormSpec::extract(&page.body, &page.url, form)?;
        spec.set_fields(fields);
        debug!("Submitting {} to {}", form, spec.action);

        let request = spec.into_request(&self.client, file);
        self.load(request).await
    }

    fn current_page_text(&self) -> String {
        match &self.page {
            Some(page) => {
                let doc = Html::parse_document(&page.body);
                let text = doc.root_element().text().collect::<Vec<_>>().join(" ");
                text.split_whitespace().collect::<Vec<_>>().join(" ")
            }
            None => String::new(),
        }
    }

    fn select_text(&self, selector: &str) -> Vec<String> {
        match &self.page {
            Some(page) => select_text_in(&page.body, selector),
            None => Vec::new(),
        }
    }
}

/// Text of every element matching `selector` in `html`.
pub fn select_text_in(html: &str, selector: &str) -> Vec<String> {
    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid selector {}: {}", selector, e);
            return Vec::new();
        }
    };
    Html::parse_document(html)
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect()
}

fn parse_selector(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::Generic(format!("Invalid selector {}: {}", selector, e)))
}

/// A form as found on a page: where and how it submits, and its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    pub action: Url,
    pub post: bool,
    pub multipart: bool,
    pub fields: Vec<(String, String)>,
}

impl FormSpec {
    /// Finds the first form matching `selector` in `html`.
    ///
    /// The action is resolved against `page_url`; a missing or empty action
    /// submits to the page itself.
    pub fn extract(html: &str, page_url: &Url, selector: &str) -> Result<Self, AppError> {
        let doc = Html::parse_document(html);
        let form_selector = parse_selector(selector)?;
        let form = doc
            .select(&form_selector)
            .next()
            .ok_or_else(|| AppError::FormNotFound(selector.to_string()))?;

        let action = match form.value().attr("action").map(str::trim) {
            Some(action) if !action.is_empty() => page_url
                .join(action)
                .map_err(|e| AppError::InvalidUrl(format!("{}: {}", action, e)))?,
            _ => page_url.clone(),
        };
        let post = form
            .value()
            .attr("method")
            .is_some_and(|m| m.eq_ignore_ascii_case("post"));
        let multipart = form
            .value()
            .attr("enctype")
            .is_some_and(|e| e.eq_ignore_ascii_case("multipart/form-data"));

        Ok(Self {
            action,
            post,
            multipart,
            fields: form_fields(form)?,
        })
    }

    /// Sets each field, replacing any value the form already carried.
    pub fn set_fields(&mut self, fields: &[(&str, &str)]) {
        for (name, value) in fields {
            match self.fields.iter().position(|(n, _)| n == name) {
                Some(i) => self.fields[i].1 = value.to_string(),
                None => self.fields.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Builds the submission request. A file always forces a multipart POST.
    fn into_request(self, client: &Client, file: Option<FileField>) -> RequestBuilder {
        if file.is_some() || self.multipart {
            let mut form = Form::new();
            for (name, value) in self.fields {
                form = form.text(name, value);
            }
            if let Some(file) = file {
                form = form.part(file.field, Part::bytes(file.bytes).file_name(file.file_name));
            }
            client.post(self.action).multipart(form)
        } else if self.post {
            client.post(self.action).form(&self.fields)
        } else {
            let mut url = self.action;
            url.query_pairs_mut().extend_pairs(&self.fields);
            client.get(url)
        }
    }
}

/// Successful controls of a form: named inputs (checked ones only for
/// checkboxes and radios), textareas and selects. Buttons are left out, as
/// no submitter is clicked.
fn form_fields(form: ElementRef<'_>) -> Result<Vec<(String, String)>, AppError> {
    let controls = parse_selector("input[name], textarea[name], select[name]")?;
    let options = parse_selector("option")?;
    let mut fields = Vec::new();

    for control in form.select(&controls) {
        let el = control.value();
        let Some(name) = el.attr("name") else {
            continue;
        };
        if el.attr("disabled").is_some() {
            continue;
        }

        match el.name() {
            "textarea" => fields.push((name.to_string(), control.text().collect::<String>())),
            "select" => {
                let all: Vec<ElementRef<'_>> = control.select(&options).collect();
                let selected: Vec<ElementRef<'_>> = all
                    .iter()
                    .copied()
                    .filter(|o| o.value().attr("selected").is_some())
                    .collect();
                let chosen = if !selected.is_empty() {
                    selected
                } else if el.attr("multiple").is_none() {
                    all.into_iter().take(1).collect()
                } else {
                    Vec::new()
                };
                for option in chosen {
                    fields.push((name.to_string(), option_value(option)));
                }
            }
            _ => {
                let kind = el.attr("type").unwrap_or("text").to_ascii_lowercase();
                if SKIPPED_INPUT_TYPES.contains(&kind.as_str()) {
                    continue;
                }
                if (kind == "checkbox" || kind == "radio") && el.attr("checked").is_none() {
                    continue;
                }
                fields.push((name.to_string(), el.attr("value").unwrap_or_default().to_string()));
            }
        }
    }

    Ok(fields)
}

/// Value an option submits: its `value` attribute, else its trimmed text.
fn option_value(option: ElementRef<'_>) -> String {
    match option.value().attr("value") {
        Some(value) => value.to_string(),
        None => option.text().collect::<String>().trim().to_string(),
    }
}
