//! HTML rendering for circle and event share pages.
//!
//! One template serves both kinds. Everything sourced from the preview API or
//! the request path goes through `html_escape::encode_quoted_attribute` before
//! it is written out, in attributes and text nodes alike, so none of
//! `& < > " '` ever appears raw.

pub mod script;

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use html_escape::encode_quoted_attribute as escape;
use serde::Serialize;

use crate::config::Config;
use crate::models::{CircleDetails, EventDetails, KindDetails, PreviewResult};
use crate::redirect::ShareLinks;

/// Inline CSS for share pages.
pub const PAGE_CSS: &str = r#"
*{box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,Oxygen,Ubuntu,Cantarell,sans-serif;margin:0;padding:0 0 96px;background:#f5f5f5;color:#333;min-height:100vh}
.container{background:#fff;max-width:600px;width:100%;margin:0 auto;min-height:calc(100vh - 96px);padding:20px}
.preview-image{width:calc(100% + 40px);max-height:300px;object-fit:cover;margin:-20px -20px 20px;display:block}
.preview-emoji{font-size:48px;margin-bottom:12px;text-align:center}
.preview-title{font-size:24px;font-weight:700;color:#222;margin:0 0 12px;line-height:1.3}
.preview-description{font-size:15px;color:#555;line-height:23px;margin:0 0 20px}
.preview-details{display:flex;flex-direction:column;gap:12px;margin-bottom:16px;padding:12px;background:#f7f7f7;border-radius:8px;border:1px solid #e0e0e0}
.preview-detail{display:flex;align-items:flex-start;gap:12px;font-size:16px;line-height:22px}
.preview-count{font-size:16px;color:#9b111e;font-weight:500;padding:12px;background:#f7f7f7;border-radius:8px;border:1px solid #e0e0e0}
.message{font-size:1.1em;text-align:center;margin:20px 0}
.error-message{background:#fdecea;color:#e74c3c;border-radius:8px;padding:10px;margin:15px 0}
.sticky-footer{position:fixed;bottom:0;left:0;right:0;background:#fff;border-top:1px solid #e0e0e0;padding:12px 20px calc(12px + env(safe-area-inset-bottom));box-shadow:0 -2px 10px rgba(0,0,0,.1)}
.button-container{display:flex;gap:12px;max-width:600px;margin:0 auto}
.footer-button{flex:1;padding:16px;border:none;border-radius:8px;font-size:17px;font-weight:600;cursor:pointer}
.footer-button.primary{background:#9b111e;color:#fff}
.footer-button.secondary{background:#f5f5f5;color:#333;border:1px solid #e0e0e0}
.footer-button.highlight{background:#9b111e;color:#fff;border:none}
"#;

// ── Event copy ─────────────────────────────────────────────────────────────

/// Parse an upstream timestamp. Zone-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `Saturday, March 15, 2025 at 7:00 PM`, or a start–end range when the end
/// differs from the start. `None` when the start date is missing or invalid.
pub fn format_event_dates(start: &str, end: &str) -> Option<String> {
    let start = parse_timestamp(start)?;
    match parse_timestamp(end) {
        Some(end) if end != start => Some(format!(
            "{} - {}",
            start.format("%A, %B %-d at %-I:%M %p"),
            end.format("%B %-d at %-I:%M %p")
        )),
        _ => Some(start.format("%A, %B %-d, %Y at %-I:%M %p").to_string()),
    }
}

pub fn attendee_line(details: &EventDetails) -> String {
    let n = details.attendee_count;
    if n == 0 {
        return "Be the first to join!".to_string();
    }
    let (noun, verb) = if n == 1 { ("person", "is") } else { ("people", "are") };
    let state = if details.open_invite { "going" } else { "invited" };
    format!("{n} {noun} {verb} {state}")
}

pub fn member_line(count: u64) -> String {
    if count == 1 {
        "1 member".to_string()
    } else {
        format!("{count} members")
    }
}

// ── Page ───────────────────────────────────────────────────────────────────

/// Data handed to the inline script through an escaped data attribute.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientConfig<'a> {
    #[serde(flatten)]
    links: &'a ShareLinks,
    noun: &'static str,
}

/// Render the complete share page for `result`.
pub fn render_share_page(result: &PreviewResult, links: &ShareLinks, config: &Config) -> String {
    let profile = links.kind.profile();
    let title = escape(&result.title);
    let description = escape(&result.description);
    let image = escape(&result.image_url);
    let page_url = escape(&links.universal_link);
    let site_name = escape(&config.site_name);

    let client_config = serde_json::to_string(&ClientConfig {
        links,
        noun: profile.noun,
    })
    .unwrap_or_else(|_| "{}".to_string());

    let mut html = String::with_capacity(8 * 1024);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />

    <title>{title}</title>
    <meta name="description" content="{description}" />
    <link rel="canonical" href="{page_url}" />

    <meta property="og:title" content="{title}" />
    <meta property="og:description" content="{description}" />
    <meta property="og:image" content="{image}" />
    <meta property="og:url" content="{page_url}" />
    <meta property="og:type" content="website" />
    <meta property="og:site_name" content="{site_name}" />

    <meta name="twitter:card" content="summary_large_image" />
    <meta name="twitter:title" content="{title}" />
    <meta name="twitter:description" content="{description}" />
    <meta name="twitter:image" content="{image}" />

    <style>{PAGE_CSS}</style>
  </head>
  <body>
    <main class="container">
"#
    );

    let populated = result.title != profile.default_title;
    render_preview_card(&mut html, result, config, populated);

    let generic = if populated {
        String::new()
    } else {
        format!(
            "Open this {} in the {} app.",
            profile.segment,
            escape(&config.site_name)
        )
    };

    let _ = write!(
        html,
        r#"      <p class="message" id="message">{generic}</p>
      <div class="error-message" id="errorMessage" hidden></div>
    </main>

    <div class="sticky-footer" id="appButtons">
      <div class="button-container">
        <button class="footer-button primary" id="openAppButton">Open in {site_name}</button>
        <button class="footer-button secondary" id="downloadButton">Download</button>
      </div>
    </div>

    <div id="shareConfig" data-config="{config_attr}" hidden></div>
    <script>{script}</script>
  </body>
</html>
"#,
        config_attr = escape(&client_config),
        script = script::client_script(),
    );

    html
}

fn render_preview_card(html: &mut String, result: &PreviewResult, config: &Config, populated: bool) {
    let hidden = if populated { "" } else { " hidden" };
    let _ = writeln!(
        html,
        r#"      <section id="preview" class="preview" data-populated="{populated}"{hidden}>"#
    );

    if result.image_url != config.default_image_url {
        let _ = writeln!(
            html,
            r#"        <img class="preview-image" src="{}" alt="" />"#,
            escape(&result.image_url)
        );
    }

    if let KindDetails::Event(event) = &result.details {
        if !event.emoji.is_empty() {
            let _ = writeln!(
                html,
                r#"        <div class="preview-emoji">{}</div>"#,
                escape(&event.emoji)
            );
        }
    }

    let _ = writeln!(
        html,
        r#"        <h1 class="preview-title" id="previewTitle">{}</h1>
        <p class="preview-description">{}</p>"#,
        escape(&result.title),
        escape(&result.description)
    );

    match &result.details {
        KindDetails::Event(event) => render_event_details(html, event),
        KindDetails::Circle(circle) => render_circle_details(html, circle),
    }

    html.push_str("      </section>\n");
}

fn render_event_details(html: &mut String, event: &EventDetails) {
    let date = format_event_dates(&event.start_date, &event.end_date);
    let place = event.place();

    if date.is_some() || !place.is_empty() {
        html.push_str("        <div class=\"preview-details\">\n");
        if let Some(date) = date {
            let _ = writeln!(
                html,
                r#"          <div class="preview-detail"><span class="icon">📅</span><span id="eventDate">{}</span></div>"#,
                escape(&date)
            );
        }
        if !place.is_empty() {
            let _ = writeln!(
                html,
                r#"          <div class="preview-detail"><span class="icon">📍</span><span id="eventLocation">{}</span></div>"#,
                escape(place)
            );
        }
        html.push_str("        </div>\n");
    }

    let _ = writeln!(
        html,
        r#"        <div class="preview-count" id="attendeeCount">{}</div>"#,
        escape(&attendee_line(event))
    );
}

fn render_circle_details(html: &mut String, circle: &CircleDetails) {
    if let Some(count) = circle.member_count {
        let _ = writeln!(
            html,
            r#"        <div class="preview-count" id="memberCount">{}</div>"#,
            member_line(count)
        );
    }
}
