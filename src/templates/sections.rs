// src/templates/sections.rs
//! Section components, selected by section key

use crate::templates::html::{date_range, Html};
use crate::types::resume::{
    Certification, CustomSection, Education, Experience, PersonalInfo, Project, Reference,
    ResumeData, SectionKey, Skill,
};

/// Render the body of one section, or `None` when it has nothing to show
pub fn render_section(key: &SectionKey, data: &ResumeData) -> Option<String> {
    let mut html = Html::new();

    match key {
        SectionKey::Summary => summary(&mut html, data.personal_info.as_ref()),
        SectionKey::Experience => each(&mut html, data.experience.as_deref(), experience),
        SectionKey::Education => each(&mut html, data.education.as_deref(), education),
        SectionKey::Projects => each(&mut html, data.projects.as_deref(), project),
        SectionKey::Skills => skills(&mut html, data.skills.as_deref().unwrap_or(&[])),
        SectionKey::Certifications => {
            each(&mut html, data.certifications.as_deref(), certification)
        }
        SectionKey::References => each(&mut html, data.references.as_deref(), reference),
        SectionKey::Interests => {
            html.list("interests", data.interests.as_deref().unwrap_or(&[]));
        }
        SectionKey::Custom(title) => {
            if let Some(section) = data
                .custom_sections
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .find(|s| s.title.eq_ignore_ascii_case(title))
            {
                custom(&mut html, section);
            }
        }
    }

    if html.is_empty() {
        None
    } else {
        Some(html.into_string())
    }
}

fn each<T>(html: &mut Html, items: Option<&[T]>, render: fn(&mut Html, &T)) {
    for item in items.unwrap_or(&[]) {
        render(html, item);
    }
}

fn summary(html: &mut Html, info: Option<&PersonalInfo>) {
    html.element("p", "summary", info.and_then(|i| i.summary.as_deref()));
}

fn entry_header(html: &mut Html, title: Option<&str>, subtitle: Option<&str>, dates: Option<String>) {
    html.open("div", "entry-header");
    html.element("h3", "entry-title", title);
    html.element("span", "entry-subtitle", subtitle);
    html.element("span", "entry-dates", dates.as_deref());
    html.close("div");
}

fn experience(html: &mut Html, exp: &Experience) {
    html.open("div", "entry experience");
    entry_header(
        html,
        exp.position.as_deref(),
        join_parts(&[exp.company.as_deref(), exp.location.as_deref()]).as_deref(),
        date_range(
            exp.start_date.as_deref(),
            exp.end_date.as_deref(),
            exp.current.unwrap_or(false),
        ),
    );
    html.element("p", "entry-description", exp.description.as_deref());
    html.list("highlights", exp.highlights.as_deref().unwrap_or(&[]));
    html.close("div");
}

fn education(html: &mut Html, edu: &Education) {
    let degree = join_with(&[edu.degree.as_deref(), edu.field.as_deref()], " in ");
    html.open("div", "entry education");
    entry_header(
        html,
        degree.as_deref().or(edu.institution.as_deref()),
        join_parts(&[edu.institution.as_deref(), edu.location.as_deref()]).as_deref(),
        date_range(edu.start_date.as_deref(), edu.end_date.as_deref(), false),
    );
    html.element(
        "span",
        "gpa",
        edu.gpa.as_ref().map(|g| format!("GPA: {}", g)).as_deref(),
    );
    html.element("p", "entry-description", edu.description.as_deref());
    html.close("div");
}

fn project(html: &mut Html, project: &Project) {
    html.open("div", "entry project");
    entry_header(
        html,
        project.name.as_deref(),
        project
            .technologies
            .as_ref()
            .map(|t| t.join(", "))
            .as_deref(),
        date_range(project.start_date.as_deref(), project.end_date.as_deref(), false),
    );
    html.element("p", "entry-description", project.description.as_deref());
    if let Some(url) = project.url.as_deref().filter(|u| !u.is_empty()) {
        html.link(url, url);
    }
    html.close("div");
}

/// Skills grouped by category, in first-seen category order
fn skills(html: &mut Html, skills: &[Skill]) {
    let mut groups: Vec<(Option<&str>, Vec<String>)> = Vec::new();
    for skill in skills {
        let Some(name) = skill.name.as_deref().filter(|n| !n.trim().is_empty()) else {
            continue;
        };
        let label = match skill.level.as_deref() {
            Some(level) if !level.is_empty() => format!("{} ({})", name, level),
            _ => name.to_string(),
        };
        let category = skill.category.as_deref();
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, names)) => names.push(label),
            None => groups.push((category, vec![label])),
        }
    }

    for (category, names) in groups {
        html.open("div", "skill-group");
        html.element("span", "skill-category", category);
        html.list("skills", &names);
        html.close("div");
    }
}

fn certification(html: &mut Html, cert: &Certification) {
    html.open("div", "entry certification");
    entry_header(html, cert.name.as_deref(), cert.issuer.as_deref(), cert.date.clone());
    html.close("div");
}

fn reference(html: &mut Html, reference: &Reference) {
    html.open("div", "entry reference");
    entry_header(
        html,
        reference.name.as_deref(),
        join_parts(&[reference.position.as_deref(), reference.company.as_deref()]).as_deref(),
        None,
    );
    html.element(
        "p",
        "reference-contact",
        join_parts(&[reference.email.as_deref(), reference.phone.as_deref()]).as_deref(),
    );
    html.close("div");
}

fn custom(html: &mut Html, section: &CustomSection) {
    html.element("p", "custom-content", section.content.as_deref());
    html.list("custom-items", section.items.as_deref().unwrap_or(&[]));
}

fn join_with(parts: &[Option<&str>], sep: &str) -> Option<String> {
    let present: Vec<&str> = parts
        .iter()
        .flatten()
        .copied()
        .filter(|p| !p.trim().is_empty())
        .collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(sep))
    }
}

pub(crate) fn join_parts(parts: &[Option<&str>]) -> Option<String> {
    join_with(parts, " · ")
}
