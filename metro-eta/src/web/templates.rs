//! Askama templates for the web frontend.
//!
//! With `askama_axum` in the dependency tree the derive also implements
//! axum's `IntoResponse`, so handlers return templates directly.

use askama::Template;

/// Home page with the journey form.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;
