// src/templates/cover_letter.rs
use crate::templates::html::Html;
use crate::templates::layouts::{contact_line, css_font};
use crate::types::documents::CoverLetter;
use crate::types::resume::{PersonalInfo, ResumeSettings};

/// Letter body as paragraphs: blank lines split, single newlines become `<br>`
fn paragraphs(content: &str) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for line in content.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Standalone HTML for a cover letter, with the sender block taken from the
/// linked resume when one is available
pub fn render_cover_letter(
    letter: &CoverLetter,
    sender: Option<&PersonalInfo>,
    settings: &ResumeSettings,
) -> String {
    let mut html = Html::new();
    html.raw("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.open("title", "").text(&letter.title).close("title");
    html.raw(&format!(
        "<style>body{{margin:0;font-family:{},sans-serif;font-size:{}px;line-height:{};color:#222}}\
         .letter{{max-width:720px;margin:0 auto;padding:48px}}\
         .sender{{margin-bottom:32px}}.recipient{{margin-bottom:24px;color:#444}}\
         .contact a{{color:inherit}}.sep{{margin:0 6px}}</style>",
        css_font(&settings.font_family),
        settings.font_size,
        settings.line_height,
    ));
    html.raw("</head><body class=\"cover-letter\"><main class=\"letter\">");

    if let Some(info) = sender {
        html.open("header", "sender");
        html.element("h1", "name", info.name.as_deref());
        contact_line(&mut html, info, "contact", "|");
        html.close("header");
    }

    let recipient = match (letter.job_title.as_deref(), letter.company.as_deref()) {
        (Some(role), Some(company)) => Some(format!("{} at {}", role, company)),
        (Some(role), None) => Some(role.to_string()),
        (None, Some(company)) => Some(company.to_string()),
        (None, None) => None,
    };
    html.element("p", "recipient", recipient.as_deref());

    html.open("article", "body");
    for paragraph in paragraphs(&letter.content) {
        html.open("p", "");
        for (i, line) in paragraph.iter().enumerate() {
            if i > 0 {
                html.raw("<br>");
            }
            html.text(line);
        }
        html.close("p");
    }
    html.close("article");

    html.raw("</main></body></html>");
    html.into_string()
}
