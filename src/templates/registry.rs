// src/templates/registry.rs
//! Fixed template set and the name -> layout selection

use std::fmt;

use crate::types::resume::{ResumeSettings, SectionDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    Classic,
    Modern,
    Minimal,
    Professional,
    Creative,
}

pub const FALLBACK_TEMPLATE: Template = Template::Classic;

impl Template {
    pub const ALL: [Template; 5] = [
        Template::Classic,
        Template::Modern,
        Template::Minimal,
        Template::Professional,
        Template::Creative,
    ];

    /// Pick the layout for a template name. Unknown names get the fallback.
    pub fn select(name: &str) -> Self {
        Self::lookup(name).unwrap_or(FALLBACK_TEMPLATE)
    }

    pub fn lookup(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.id().eq_ignore_ascii_case(name))
    }

    pub fn id(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Modern => "modern",
            Template::Minimal => "minimal",
            Template::Professional => "professional",
            Template::Creative => "creative",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Sections to render: ascending by `order` (stable on ties), visible only
pub fn visible_sections(settings: &ResumeSettings) -> Vec<&SectionDescriptor> {
    let mut sections: Vec<&SectionDescriptor> =
        settings.sections.iter().filter(|s| s.visible).collect();
    sections.sort_by_key(|s| s.order);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::resume::SectionDescriptor;

    #[test]
    fn test_select_known_names_case_insensitive() {
        assert_eq!(Template::select("modern"), Template::Modern);
        assert_eq!(Template::select(" Professional "), Template::Professional);
        for template in Template::ALL {
            assert_eq!(Template::select(template.id()), template);
        }
    }

    #[test]
    fn test_unknown_names_fall_back() {
        for name in ["", "fancy", "classic-v2", "🦀"] {
            assert_eq!(Template::select(name), FALLBACK_TEMPLATE);
        }
    }

    #[test]
    fn test_visible_sections_sorted_and_filtered() {
        let settings = ResumeSettings {
            sections: vec![
                SectionDescriptor::new("skills", 3, true),
                SectionDescriptor::new("education", 1, false),
                SectionDescriptor::new("experience", 2, true),
                SectionDescriptor::new("summary", 0, true),
                SectionDescriptor::new("projects", 2, true),
            ],
            ..Default::default()
        };
        let keys: Vec<&str> = visible_sections(&settings)
            .iter()
            .map(|s| s.key.as_str())
            .collect();
        assert_eq!(keys, vec!["summary", "experience", "projects", "skills"]);
    }
}
