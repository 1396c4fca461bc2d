// src/templates/layouts.rs
//! Layout components. Each layout walks the visible sections in order and
//! wraps the section components in its own markup.

use std::fmt::Write;

use crate::templates::html::{escape, Html};
use crate::templates::registry::{visible_sections, Template};
use crate::templates::sections::render_section;
use crate::types::resume::{PersonalInfo, ResumeMetaData, SectionKey};

pub trait ResumeLayout: Sync {
    fn template(&self) -> Template;

    fn header(&self, html: &mut Html, info: &PersonalInfo);

    fn heading(&self, html: &mut Html, _index: usize, key: &SectionKey) {
        html.element("h2", "section-title", Some(key.heading()));
    }

    fn styles(&self) -> &'static str;
}

struct Classic;
struct Modern;
struct Minimal;
struct Professional;
struct Creative;

pub fn layout_for(template: Template) -> &'static dyn ResumeLayout {
    match template {
        Template::Classic => &Classic,
        Template::Modern => &Modern,
        Template::Minimal => &Minimal,
        Template::Professional => &Professional,
        Template::Creative => &Creative,
    }
}

/// Render with the layout named in the settings (fallback for unknown names)
pub fn render(meta: &ResumeMetaData) -> String {
    render_with(Template::select(&meta.resume_settings.template), meta)
}

pub fn render_with(template: Template, meta: &ResumeMetaData) -> String {
    let layout = layout_for(template);
    let settings = &meta.resume_settings;
    let mut html = Html::new();

    html.raw("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.open("title", "").text(&settings.resume_title).close("title");
    html.raw("<style>");
    html.raw(&base_styles(meta));
    html.raw(layout.styles());
    html.raw("</style></head>");
    html.raw(&format!(
        "<body class=\"resume template-{}\"><main class=\"page\">",
        layout.template().id()
    ));

    if let Some(info) = meta.resume_data.personal_info.as_ref() {
        layout.header(&mut html, info);
    }

    let mut index = 0;
    for descriptor in visible_sections(settings) {
        let key = descriptor.section_key();
        let Some(body) = render_section(&key, &meta.resume_data) else {
            continue;
        };
        html.raw(&format!(
            "<section class=\"section section-{}\" data-section=\"{}\">",
            css_ident(key.as_str()),
            escape(&descriptor.key)
        ));
        layout.heading(&mut html, index, &key);
        html.raw(&body);
        html.close("section");
        index += 1;
    }

    html.raw("</main></body></html>");
    html.into_string()
}

fn base_styles(meta: &ResumeMetaData) -> String {
    let settings = &meta.resume_settings;
    let mut css = String::new();
    let _ = write!(
        css,
        "body{{margin:0;font-family:{},sans-serif;font-size:{}px;line-height:{};color:#222}}\
         .page{{max-width:800px;margin:0 auto;padding:40px}}\
         .entry{{margin-bottom:12px}}\
         .entry-header{{display:flex;flex-wrap:wrap;gap:8px;align-items:baseline}}\
         .entry-dates{{margin-left:auto;color:#666}}\
         ul{{margin:4px 0;padding-left:18px}}",
        css_font(&settings.font_family),
        sanitize_number(settings.font_size, 14.0),
        sanitize_number(settings.line_height, 1.5),
    );
    if meta.downloading {
        css.push_str(".page{padding:0}");
    }
    css
}

pub(crate) fn css_font(family: &str) -> String {
    let cleaned: String = family
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .collect();
    if cleaned.trim().is_empty() {
        "Inter".to_string()
    } else {
        format!("'{}'", cleaned.trim())
    }
}

fn sanitize_number(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn css_ident(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

struct ContactItem<'a> {
    label: &'a str,
    href: Option<String>,
}

fn contact_items(info: &PersonalInfo) -> Vec<ContactItem<'_>> {
    let fields: [(&Option<String>, fn(&str) -> Option<String>); 6] = [
        (&info.email, |v| Some(format!("mailto:{}", v))),
        (&info.phone, |v| Some(format!("tel:{}", v.replace(' ', "")))),
        (&info.location, |_| None),
        (&info.website, |v| Some(v.to_string())),
        (&info.linkedin, |v| Some(v.to_string())),
        (&info.github, |v| Some(v.to_string())),
    ];

    fields
        .into_iter()
        .filter_map(|(value, href)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| ContactItem {
                    label: v,
                    href: href(v),
                })
        })
        .collect()
}

pub(crate) fn contact_line(html: &mut Html, info: &PersonalInfo, class: &str, separator: &str) {
    let items = contact_items(info);
    if items.is_empty() {
        return;
    }
    html.open("div", class);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            html.open("span", "sep").text(separator).close("span");
        }
        match &item.href {
            Some(href) => html.link(href, item.label),
            None => html.open("span", "").text(item.label).close("span"),
        };
    }
    html.close("div");
}

impl ResumeLayout for Classic {
    fn template(&self) -> Template {
        Template::Classic
    }

    fn header(&self, html: &mut Html, info: &PersonalInfo) {
        html.open("header", "header centered");
        html.element("h1", "name", info.name.as_deref());
        html.element("p", "headline", info.title.as_deref());
        contact_line(html, info, "contact", " | ");
        html.close("header");
    }

    fn styles(&self) -> &'static str {
        ".centered{text-align:center}\
         .section-title{text-transform:uppercase;border-bottom:1px solid #222;font-size:1.1em}"
    }
}

impl ResumeLayout for Modern {
    fn template(&self) -> Template {
        Template::Modern
    }

    fn header(&self, html: &mut Html, info: &PersonalInfo) {
        html.open("header", "header split");
        html.open("div", "identity");
        html.element("h1", "name", info.name.as_deref());
        html.element("p", "headline accent", info.title.as_deref());
        html.close("div");
        contact_line(html, info, "contact stacked", " ");
        html.close("header");
    }

    fn heading(&self, html: &mut Html, _index: usize, key: &SectionKey) {
        html.open("h2", "section-title");
        html.raw("<span class=\"accent-bar\"></span>");
        html.text(key.heading());
        html.close("h2");
    }

    fn styles(&self) -> &'static str {
        ".split{display:flex;justify-content:space-between;gap:24px}\
         .stacked{display:flex;flex-direction:column;text-align:right}.stacked .sep{display:none}\
         .accent{color:#14A4E6}\
         .accent-bar{display:inline-block;width:4px;height:1em;background:#14A4E6;margin-right:8px}"
    }
}

impl ResumeLayout for Minimal {
    fn template(&self) -> Template {
        Template::Minimal
    }

    fn header(&self, html: &mut Html, info: &PersonalInfo) {
        html.open("header", "header");
        html.element("h1", "name", info.name.as_deref());
        contact_line(html, info, "contact muted", " / ");
        html.close("header");
    }

    fn heading(&self, html: &mut Html, _index: usize, key: &SectionKey) {
        html.element("h2", "section-title small", Some(key.heading()));
    }

    fn styles(&self) -> &'static str {
        ".muted{color:#777}.small{font-size:.85em;letter-spacing:.08em;color:#555;font-weight:400}"
    }
}

impl ResumeLayout for Professional {
    fn template(&self) -> Template {
        Template::Professional
    }

    fn header(&self, html: &mut Html, info: &PersonalInfo) {
        html.open("header", "header banded");
        html.element("h1", "name", info.name.as_deref());
        html.element("p", "headline", info.title.as_deref());
        html.close("header");
        contact_line(html, info, "contact bar", " • ");
    }

    fn heading(&self, html: &mut Html, _index: usize, key: &SectionKey) {
        html.element("h2", "section-title", Some(key.heading()));
        html.raw("<hr>");
    }

    fn styles(&self) -> &'static str {
        ".banded{background:#1f2d3d;color:#fff;padding:16px}\
         .bar{background:#eef1f4;padding:6px 16px;margin-bottom:16px}\
         hr{border:0;border-top:2px solid #1f2d3d;margin:2px 0 8px}"
    }
}

impl ResumeLayout for Creative {
    fn template(&self) -> Template {
        Template::Creative
    }

    fn header(&self, html: &mut Html, info: &PersonalInfo) {
        html.open("header", "header creative");
        if let Some(initials) = info.name.as_deref().map(initials).filter(|i| !i.is_empty()) {
            html.open("div", "badge").text(&initials).close("div");
        }
        html.open("div", "identity");
        html.element("h1", "name", info.name.as_deref());
        html.element("p", "headline", info.title.as_deref());
        contact_line(html, info, "contact", " · ");
        html.close("div");
        html.close("header");
    }

    fn heading(&self, html: &mut Html, index: usize, key: &SectionKey) {
        html.open("h2", "section-title");
        html.open("span", "section-number")
            .text(&format!("{:02}", index + 1))
            .close("span");
        html.text(key.heading());
        html.close("h2");
    }

    fn styles(&self) -> &'static str {
        ".creative{display:flex;gap:16px;align-items:center}\
         .badge{width:64px;height:64px;border-radius:50%;background:#ff6f61;color:#fff;\
         display:flex;align-items:center;justify-content:center;font-size:1.6em}\
         .section-number{color:#ff6f61;margin-right:8px}"
    }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}
