use axum::response::Html;
use minijinja::{context, Environment};
use once_cell::sync::Lazy;

use crate::error::{AppError, Result, MISSING_TOKEN_MESSAGE};
use crate::service::Summary;

pub const PAGE_TITLE: &str = "Summarize Text From YT or Website";
pub const SUBHEADER: &str = "Summarize the URL";
pub const BUTTON_LABEL: &str = "Summarize the Content from YT or Website";
pub const LOADING_TEXT: &str = "Waiting...";

/// What the result region shows after a render.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Idle,
    Success(String),
    ValidationError(String),
    Exception(String),
}

impl Outcome {
    pub fn from_result(result: &Result<Summary>) -> Self {
        match result {
            Ok(summary) => Outcome::Success(summary.text.clone()),
            Err(err) if err.is_validation() => Outcome::ValidationError(err.to_string()),
            Err(err) => Outcome::Exception(exception_text(err)),
        }
    }

    /// CSS class and text of the result region, if any.
    fn region(&self) -> Option<(&'static str, &str)> {
        match self {
            Outcome::Idle => None,
            Outcome::Success(summary) => Some(("success", summary)),
            Outcome::ValidationError(message) => Some(("error", message)),
            Outcome::Exception(message) => Some(("exception", message)),
        }
    }
}

pub fn exception_text(err: &AppError) -> String {
    format!("Exception: {}", err)
}

pub struct PageView<'a> {
    pub url: &'a str,
    pub outcome: Outcome,
    pub credential_configured: bool,
    pub ssl_verify: bool,
}

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    // `.html` names get HTML auto-escaping from the default callback.
    let mut env = Environment::new();
    env.add_template(PAGE_TEMPLATE, include_str!("templates/page.html"))
        .expect("page template must compile");
    env
});

const PAGE_TEMPLATE: &str = "page.html";

pub fn render(view: &PageView<'_>) -> Result<Html<String>> {
    // The missing token is reported on every render, before any submission.
    let repeats_token_error = matches!(
        view.outcome,
        Outcome::ValidationError(ref message) if message == MISSING_TOKEN_MESSAGE
    );
    let token_notice = (!view.credential_configured && !repeats_token_error)
        .then_some(MISSING_TOKEN_MESSAGE);
    let (result_class, result_text) = view.outcome.region().unzip();

    let html = TEMPLATES
        .get_template(PAGE_TEMPLATE)
        .and_then(|template| {
            template.render(context! {
                title => PAGE_TITLE,
                subheader => SUBHEADER,
                button => BUTTON_LABEL,
                loading => LOADING_TEXT,
                url => view.url,
                token_notice => token_notice,
                result_class => result_class,
                result_text => result_text,
                ssl_verify => view.ssl_verify,
            })
        })
        .map_err(|e| AppError::Config(format!("Failed to render page: {}", e)))?;

    Ok(Html(html))
}
