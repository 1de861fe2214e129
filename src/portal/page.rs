//! Parsed portal pages

use crate::portal::form::{element_text, selector, Form};
use crate::types::ExportError;
use reqwest::Url;
use scraper::Html;
use std::collections::HashMap;

/// An HTML page together with the URL it was served from
///
/// Relative links and form actions are resolved against that URL.
#[derive(Debug)]
pub struct Page {
    url: Url,
    document: Html,
}

impl Page {
    pub fn parse(url: Url, html: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// All forms of the page, in document order
    pub fn forms(&self) -> Result<Vec<Form>, ExportError> {
        let labels = self.labels()?;
        let forms = selector("form")?;
        self.document
            .select(&forms)
            .map(|element| Form::from_element(element, &self.url, &labels))
            .collect()
    }

    /// First form that has a field with the given name
    pub fn form_with_field(&self, name: &str) -> Result<Form, ExportError> {
        self.find_form(|form| form.has_field(name))?
            .ok_or_else(|| ExportError::portal_format(format!("no form with field '{}'", name)))
    }

    /// First form accepted by `predicate`
    pub fn find_form<F>(&self, predicate: F) -> Result<Option<Form>, ExportError>
    where
        F: Fn(&Form) -> bool,
    {
        Ok(self.forms()?.into_iter().find(|form| predicate(form)))
    }

    /// Resolved URL of the first link whose `href` is accepted by `predicate`
    pub fn find_link<F>(&self, predicate: F) -> Result<Option<Url>, ExportError>
    where
        F: Fn(&str) -> bool,
    {
        let links = selector("a[href]")?;
        let href = self
            .document
            .select(&links)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| predicate(href));

        href.map(|href| self.resolve(href)).transpose()
    }

    /// Non-empty texts of all elements matching `css`
    pub fn texts(&self, css: &str) -> Result<Vec<String>, ExportError> {
        let matcher = selector(css)?;
        Ok(self
            .document
            .select(&matcher)
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty())
            .collect())
    }

    /// Resolve a possibly relative reference against the page URL
    pub fn resolve(&self, href: &str) -> Result<Url, ExportError> {
        self.url
            .join(href.trim())
            .map_err(|e| ExportError::portal_format(format!("invalid link '{}': {}", href, e)))
    }

    /// Texts of `<label for=...>` elements keyed by the id they refer to
    fn labels(&self) -> Result<HashMap<String, String>, ExportError> {
        let labels = selector("label[for]")?;
        Ok(self
            .document
            .select(&labels)
            .filter_map(|label| {
                let id = label.value().attr("for")?;
                Some((id.to_string(), element_text(&label)))
            })
            .collect())
    }
}
