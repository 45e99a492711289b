// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML clean-up applied to every retrieved page
//!
//! Rewrites relative resource references to absolute URLs against the
//! original target, promotes lazy-loaded image attributes, and strips
//! `<script>` and `<aside>` elements. Running the rewrite twice yields the
//! same attribute values as running it once.

pub mod document;
pub mod resolve;

use tracing::debug;
use url::Url;

pub use document::{Document, ParseError};
pub use resolve::{is_absolute, resolve_reference, resolve_srcset};

use document::{get_attr, set_attr, take_attr};
use resolve::{first_srcset_candidate, srcset_is_absolute};

/// Lazy-load attribute and the standard attribute it stands in for
const LAZY_IMAGE_ATTRS: &[(&str, &str)] = &[("data-gl-src", "src"), ("data-gl-srcset", "srcset")];

/// Elements dropped from every page
const STRIPPED_ELEMENTS: &[&str] = &["script", "aside"];

/// Anchor prefix that site galleries link with
const GALLERY_PREFIX: &str = "/picture-gallery";

/// Rewrite a document in place against the page's base URL
pub fn rewrite(document: &mut Document, base: &Url) {
    promote_image_sources(document, base);
    promote_figure_sources(document, base);
    for name in STRIPPED_ELEMENTS {
        strip_elements(document, name);
    }
    absolutize_gallery_links(document, base);
}

/// Lazy attributes win over the standard ones; otherwise relative
/// `src`/`srcset` values are made absolute.
fn promote_image_sources(document: &mut Document, base: &Url) {
    for id in document.select_ids("img") {
        document.edit_attrs(id, |attrs| {
            for (lazy, standard) in LAZY_IMAGE_ATTRS {
                if let Some(value) = take_attr(attrs, lazy) {
                    set_attr(attrs, standard, resolve_attr(base, standard, &value));
                    continue;
                }

                let relative = match get_attr(attrs, standard) {
                    Some(value) if *standard == "srcset" => {
                        (!srcset_is_absolute(value)).then(|| value.to_string())
                    }
                    Some(value) => (!is_absolute(value)).then(|| value.to_string()),
                    None => None,
                };
                if let Some(value) = relative {
                    set_attr(attrs, standard, resolve_attr(base, standard, &value));
                }
            }
        });
    }
}

fn resolve_attr(base: &Url, name: &str, value: &str) -> String {
    if name == "srcset" {
        resolve_srcset(base, value)
    } else {
        resolve_reference(base, value)
    }
}

/// Figures that only carry `<picture><source srcset>` get a usable `<img src>`
fn promote_figure_sources(document: &mut Document, base: &Url) {
    for figure in document.select_ids("figure") {
        let candidate = document
            .select_within(figure, "source[srcset]")
            .into_iter()
            .find_map(|source| {
                document
                    .attr(source, "srcset")
                    .and_then(|srcset| first_srcset_candidate(&srcset).map(str::to_string))
            });

        let Some(candidate) = candidate else {
            continue;
        };
        let src = resolve_reference(base, &candidate);

        let images = document.select_within(figure, "img");
        if images.is_empty() {
            document.append_element(figure, "img", &[("src".to_string(), src)]);
        } else {
            for img in images {
                let src = src.clone();
                document.edit_attrs(img, move |attrs| set_attr(attrs, "src", src));
            }
        }
    }
}

fn strip_elements(document: &mut Document, name: &str) {
    let ids = document.select_ids(name);
    if !ids.is_empty() {
        debug!("Removing {} <{}> elements", ids.len(), name);
    }
    for id in ids {
        document.remove(id);
    }
}

fn absolutize_gallery_links(document: &mut Document, base: &Url) {
    for id in document.select_ids("a[href]") {
        document.edit_attrs(id, |attrs| {
            let href = match get_attr(attrs, "href") {
                Some(href) if href.starts_with(GALLERY_PREFIX) => href.to_string(),
                _ => return,
            };
            set_attr(attrs, "href", resolve_reference(base, &href));
        });
    }
}
