// src/templates/html.rs
//! Small HTML writing helpers shared by the layouts

use std::fmt::Write;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Accumulates markup. Text passed to `text`/`element` is escaped,
/// `raw` is not.
#[derive(Debug, Default)]
pub struct Html {
    buf: String,
}

impl Html {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&mut self, markup: &str) -> &mut Self {
        self.buf.push_str(markup);
        self
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(&escape(text));
        self
    }

    pub fn open(&mut self, tag: &str, class: &str) -> &mut Self {
        if class.is_empty() {
            let _ = write!(self.buf, "<{}>", tag);
        } else {
            let _ = write!(self.buf, "<{} class=\"{}\">", tag, escape(class));
        }
        self
    }

    pub fn close(&mut self, tag: &str) -> &mut Self {
        let _ = write!(self.buf, "</{}>", tag);
        self
    }

    /// `<tag class="..">text</tag>`, skipped entirely when `text` is blank
    pub fn element(&mut self, tag: &str, class: &str, text: Option<&str>) -> &mut Self {
        if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
            self.open(tag, class).text(text).close(tag);
        }
        self
    }

    /// Anchor for `href`, or just the label when the URL uses a scheme other
    /// than http, https, mailto or tel
    pub fn link(&mut self, href: &str, label: &str) -> &mut Self {
        match normalize_href(href) {
            Some(href) => {
                let _ = write!(self.buf, "<a href=\"{}\">{}</a>", escape(&href), escape(label));
            }
            None => {
                self.text(label);
            }
        }
        self
    }

    pub fn list(&mut self, class: &str, items: &[String]) -> &mut Self {
        let items: Vec<&String> = items.iter().filter(|i| !i.trim().is_empty()).collect();
        if items.is_empty() {
            return self;
        }
        self.open("ul", class);
        for item in items {
            self.element("li", "", Some(item));
        }
        self.close("ul")
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

fn normalize_href(href: &str) -> Option<String> {
    let href = href.trim();
    match url_scheme(href) {
        Some(scheme) if ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) => {
            Some(href.to_string())
        }
        Some(_) => None,
        None if href.contains('@') && !href.contains('/') => Some(format!("mailto:{}", href)),
        None => Some(format!("https://{}", href)),
    }
}

/// Scheme of an absolute URL. `host:8080/path` has a port, not a scheme.
fn url_scheme(href: &str) -> Option<&str> {
    let (scheme, rest) = href.split_once(':')?;
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let is_port = rest.starts_with(|c: char| c.is_ascii_digit());
    (starts_alpha && valid && !is_port).then_some(scheme)
}

/// "start - end", "start - Present", or whichever side exists
pub fn date_range(start: Option<&str>, end: Option<&str>, current: bool) -> Option<String> {
    let start = start.filter(|s| !s.trim().is_empty());
    let end = if current {
        Some("Present")
    } else {
        end.filter(|s| !s.trim().is_empty())
    };

    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{} - {}", s, e)),
        (Some(s), None) => Some(s.to_string()),
        (None, Some(e)) => Some(e.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"R&D" & 'ops'</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot; &amp; &#39;ops&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_element_skips_blank_text() {
        let mut html = Html::new();
        html.element("p", "x", Some("  ")).element("p", "", None);
        assert!(html.is_empty());
    }

    #[test]
    fn test_link_normalizes_href() {
        let mut html = Html::new();
        html.link("github.com/alex", "GitHub").link("a@b.io", "mail");
        let out = html.into_string();
        assert!(out.contains("href=\"https://github.com/alex\""));
        assert!(out.contains("href=\"mailto:a@b.io\""));
    }

    #[test]
    fn test_link_drops_script_urls() {
        let mut html = Html::new();
        html.link("javascript://%0Aalert(document.cookie)", "site")
            .link(" JavaScript:alert(1)", "x")
            .link("data:text/html;base64,PHNjcmlwdD4=", "<b>data</b>");
        assert_eq!(html.into_string(), "sitex&lt;b&gt;data&lt;/b&gt;");

        let mut html = Html::new();
        html.link("HTTPS://alex.dev", "site")
            .link("tel:+41 79 000 00 00", "call")
            .link("localhost:8080/cv", "local");
        let out = html.into_string();
        assert!(out.contains("href=\"HTTPS://alex.dev\""));
        assert!(out.contains("href=\"tel:+41 79 000 00 00\""));
        assert!(out.contains("href=\"https://localhost:8080/cv\""));
    }

    #[test]
    fn test_date_range() {
        assert_eq!(
            date_range(Some("2020"), Some("2022"), false).as_deref(),
            Some("2020 - 2022")
        );
        assert_eq!(
            date_range(Some("2020"), Some("2022"), true).as_deref(),
            Some("2020 - Present")
        );
        assert_eq!(date_range(None, Some(""), false), None);
    }
}
