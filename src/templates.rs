// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML templates compiled into the binary and rendered with Tera.

use crate::error::{AppError, Result};
use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("polls/index.html", include_str!("../templates/polls/index.html")),
    ("polls/detail.html", include_str!("../templates/polls/detail.html")),
    ("polls/results.html", include_str!("../templates/polls/results.html")),
    ("admin/base_admin.html", include_str!("../templates/admin/base_admin.html")),
    ("admin/login.html", include_str!("../templates/admin/login.html")),
    ("admin/change_list.html", include_str!("../templates/admin/change_list.html")),
    ("admin/change_form.html", include_str!("../templates/admin/change_form.html")),
];

/// Template engine holding every page of the site.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Parse all embedded templates. Fails on a syntax error.
    pub fn new() -> std::result::Result<Self, tera::Error> {
        let mut tera = Tera::default();
        // Names end in `.html`, so Tera's default autoescaping applies.
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Render `name` with a serializable context.
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<Html<String>> {
        let context = Context::from_serialize(context)
            .map_err(|e| AppError::Template(format!("{}: {}", name, e)))?;

        self.tera
            .render(name, &context)
            .map(Html)
            .map_err(|e| AppError::Template(format!("{}: {:?}", name, e)))
    }
}
