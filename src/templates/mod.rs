// src/templates/mod.rs
pub mod catalog;
pub mod cover_letter;
pub mod html;
pub mod layouts;
pub mod registry;
pub mod sections;

pub use catalog::{TemplateCatalog, TemplateManifest};
pub use cover_letter::render_cover_letter;
pub use layouts::{layout_for, render, render_with, ResumeLayout};
pub use registry::{visible_sections, Template, FALLBACK_TEMPLATE};
