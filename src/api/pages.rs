// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Built-in HTML pages: error pages and fallbacks for missing assets

use ammonia::clean_text;

const URL_BOX: &str = r#"<div style="background: rgba(0,0,0,0.2); padding: 20px; border-radius: 5px; margin: 20px 0; border-left: 4px solid #00ade6;">
    <strong style="color: #00ade6;">URL:</strong> <span style="font-family: monospace; word-break: break-all;">{url}</span>
</div>"#;

/// Render the shared error page layout
///
/// Both arguments are inserted as-is; callers escape any user input.
pub fn error_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title} - Hidewall</title>
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <link rel="stylesheet" href="/static/css/style.css">
    <meta name="robots" content="noindex, follow">
    <style>
        .error-content {{ margin-top: 30px; }}
        .error-content ul li {{ margin-bottom: 8px; }}
        .error-content a {{ color: #00ade6; text-decoration: none; }}
        .back-form {{ margin-top: 40px; }}
    </style>
</head>
<body>
    <div class="wrapper">
        <div class="inner">
            <h3>{title}</h3>
            <div class="error-content">
                {body}
            </div>
            <form method="GET" action="/" class="back-form">
                <button type="submit">&larr; Try Another URL</button>
            </form>
        </div>
    </div>
</body>
</html>"#
    )
}

fn url_box(url: &str) -> String {
    URL_BOX.replace("{url}", &clean_text(url))
}

pub fn invalid_request_body(message: &str) -> String {
    format!("<p>{}</p>", clean_text(message))
}

pub fn bypass_failed_body(url: &str) -> String {
    format!(
        r#"<p>Unfortunately, we couldn't bypass the paywall for this site right now.</p>
{}
<p>We tried multiple methods including archive services, but none were successful. This could be because:</p>
<ul style="text-align: left; padding-left: 20px; margin: 20px 0;">
    <li>The site has a very strong paywall</li>
    <li>The article is too new to be archived</li>
    <li>Archive services are currently rate-limiting us</li>
    <li>The site has updated their paywall detection</li>
</ul>
<p>You might try:</p>
<ul style="text-align: left; padding-left: 20px; margin: 20px 0;">
    <li>Waiting a few minutes and trying again</li>
    <li>Checking if the article is available on <a href="https://archive.today" target="_blank">archive.today</a> manually</li>
    <li>Looking for the article on the <a href="https://web.archive.org" target="_blank">Wayback Machine</a></li>
    <li>Using your browser's reading mode if available</li>
</ul>"#,
        url_box(url)
    )
}

pub fn site_error_body(url: &str) -> String {
    format!(
        "<p>We couldn't access the website you requested.</p>\n{}\n<p>The site returned an error when we tried to fetch it. Please check that the URL is correct and the site is accessible.</p>",
        url_box(url)
    )
}

pub fn timeout_body(url: &str) -> String {
    format!(
        "<p>The request to fetch the content took too long.</p>\n{}\n<p>This might be a temporary issue. Please try again in a few moments.</p>",
        url_box(url)
    )
}

pub fn unexpected_error_body(url: &str) -> String {
    format!(
        "<p>An unexpected error occurred while processing your request.</p>\n{}\n<p>Please try again, or contact support if the problem persists.</p>",
        url_box(url)
    )
}

/// Served at `/` when the index template is missing
pub const FALLBACK_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hidewall - Paywall Bypass</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
        .container { text-align: center; }
        input[type="url"] { width: 60%; padding: 10px; margin: 10px; }
        button { padding: 10px 20px; background: #007cba; color: white; border: none; cursor: pointer; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Hidewall</h1>
        <p>Bypass soft paywalls on websites</p>
        <form action="/yeet" method="get">
            <input type="url" name="y" placeholder="Enter URL to bypass paywall..." required>
            <br>
            <button type="submit">Bypass Paywall</button>
        </form>
    </div>
</body>
</html>"#;

/// Served at `/service-worker.js` when the script file is missing
pub const FALLBACK_SERVICE_WORKER: &str = r#"// Simple service worker for Hidewall
self.addEventListener('install', function(event) {
    console.log('Service Worker installing');
});

self.addEventListener('activate', function(event) {
    console.log('Service Worker activating');
});"#;
