// src/templates/catalog.rs
//! Display metadata for the template picker, loaded from an embedded TOML manifest
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::templates::registry::Template;

const CATALOG_TOML: &str = include_str!("../../templates/catalog.toml");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateManifest {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub fonts: Vec<String>,
    #[serde(default)]
    pub premium: bool,
}

impl TemplateManifest {
    fn fallback(template: Template) -> Self {
        let id = template.id();
        let mut name = id.to_string();
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Self {
            id: id.to_string(),
            description: format!("{} resume template", name),
            name,
            fonts: vec!["Inter".to_string()],
            premium: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "template")]
    templates: Vec<TemplateManifest>,
}

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    entries: Vec<(Template, TemplateManifest)>,
}

impl TemplateCatalog {
    /// Catalog shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml(CATALOG_TOML)
    }

    /// Parse a manifest. Entries naming an unknown layout are skipped, and
    /// every layout without an entry gets a generated one so the catalog
    /// always lists the full template set in picker order.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(content).context("Failed to parse template catalog")?;

        let mut entries = Vec::with_capacity(Template::ALL.len());
        for template in Template::ALL {
            let manifest = file
                .templates
                .iter()
                .find(|m| Template::lookup(&m.id) == Some(template))
                .cloned()
                .unwrap_or_else(|| TemplateManifest::fallback(template));
            entries.push((template, manifest));
        }

        for manifest in &file.templates {
            if Template::lookup(&manifest.id).is_none() {
                warn!("Ignoring catalog entry for unknown template '{}'", manifest.id);
            }
        }

        Ok(Self { entries })
    }

    pub fn list(&self) -> impl Iterator<Item = &TemplateManifest> {
        self.entries.iter().map(|(_, m)| m)
    }

    pub fn get(&self, template: Template) -> Option<&TemplateManifest> {
        self.entries
            .iter()
            .find(|(t, _)| *t == template)
            .map(|(_, m)| m)
    }

    /// Fonts recommended for a template name, falling back like `Template::select`
    pub fn recommended_fonts(&self, template_name: &str) -> &[String] {
        self.get(Template::select(template_name))
            .map(|m| m.fonts.as_slice())
            .unwrap_or(&[])
    }
}
