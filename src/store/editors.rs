// src/store/editors.rs
//! Per-field section editors. Each edit reads the current state and
//! produces a whole-field replacement action for the store.

use anyhow::Result;

use crate::store::reducer::ResumeAction;
use crate::types::resume::{
    Certification, CustomSection, Education, Experience, PersonalInfo, Project, Reference,
    ResumeData, ResumeMetaData, ResumeSettingsPatch, SectionDescriptor, Skill,
};

/// A positionally indexed list inside `ResumeData`
pub trait SectionList: Clone + Sized {
    const NAME: &'static str;

    fn items(data: &ResumeData) -> &[Self];

    /// A patch that replaces only this list
    fn patch(items: Vec<Self>) -> ResumeData;
}

macro_rules! section_list {
    ($ty:ty, $field:ident, $name:literal) => {
        impl SectionList for $ty {
            const NAME: &'static str = $name;

            fn items(data: &ResumeData) -> &[Self] {
                data.$field.as_deref().unwrap_or(&[])
            }

            fn patch(items: Vec<Self>) -> ResumeData {
                ResumeData {
                    $field: Some(items),
                    ..Default::default()
                }
            }
        }
    };
}

section_list!(Education, education, "education");
section_list!(Experience, experience, "experience");
section_list!(Project, projects, "projects");
section_list!(Skill, skills, "skills");
section_list!(Certification, certifications, "certifications");
section_list!(Reference, references, "references");
section_list!(String, interests, "interests");
section_list!(CustomSection, custom_sections, "customSections");

fn check_index<T: SectionList>(len: usize, index: usize) -> Result<()> {
    if index >= len {
        anyhow::bail!(
            "{} index {} out of range (section has {} entries)",
            T::NAME,
            index,
            len
        );
    }
    Ok(())
}

/// Replace the entry at `index`
pub fn update_entry<T: SectionList>(state: &ResumeMetaData, index: usize, value: T) -> Result<ResumeAction> {
    let mut items = T::items(&state.resume_data).to_vec();
    check_index::<T>(items.len(), index)?;
    items[index] = value;
    Ok(ResumeAction::ResumeData(T::patch(items)))
}

/// Append an entry
pub fn add_entry<T: SectionList>(state: &ResumeMetaData, value: T) -> ResumeAction {
    let mut items = T::items(&state.resume_data).to_vec();
    items.push(value);
    ResumeAction::ResumeData(T::patch(items))
}

/// Splice out the entry at `index`
pub fn remove_entry<T: SectionList>(state: &ResumeMetaData, index: usize) -> Result<ResumeAction> {
    let mut items = T::items(&state.resume_data).to_vec();
    check_index::<T>(items.len(), index)?;
    items.remove(index);
    Ok(ResumeAction::ResumeData(T::patch(items)))
}

/// Move the entry at `from` so that it ends up at `to`
pub fn move_entry<T: SectionList>(state: &ResumeMetaData, from: usize, to: usize) -> Result<ResumeAction> {
    let mut items = T::items(&state.resume_data).to_vec();
    check_index::<T>(items.len(), from)?;
    check_index::<T>(items.len(), to)?;
    let item = items.remove(from);
    items.insert(to, item);
    Ok(ResumeAction::ResumeData(T::patch(items)))
}

/// Structural edit on a list chosen by name at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEdit {
    Remove(usize),
    Move { from: usize, to: usize },
}

pub fn edit_named_list(state: &ResumeMetaData, section: &str, edit: ListEdit) -> Result<ResumeAction> {
    fn apply<T: SectionList>(state: &ResumeMetaData, edit: ListEdit) -> Result<ResumeAction> {
        match edit {
            ListEdit::Remove(index) => remove_entry::<T>(state, index),
            ListEdit::Move { from, to } => move_entry::<T>(state, from, to),
        }
    }

    match section.to_ascii_lowercase().as_str() {
        "education" => apply::<Education>(state, edit),
        "experience" => apply::<Experience>(state, edit),
        "projects" => apply::<Project>(state, edit),
        "skills" => apply::<Skill>(state, edit),
        "certifications" => apply::<Certification>(state, edit),
        "references" => apply::<Reference>(state, edit),
        "interests" => apply::<String>(state, edit),
        "custom" | "customsections" => apply::<CustomSection>(state, edit),
        other => anyhow::bail!("Unknown list section: {}", other),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    Name,
    Title,
    Email,
    Phone,
    Location,
    Website,
    Linkedin,
    Github,
    Summary,
}

impl PersonalField {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "title" => Some(Self::Title),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "location" => Some(Self::Location),
            "website" => Some(Self::Website),
            "linkedin" => Some(Self::Linkedin),
            "github" => Some(Self::Github),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

/// Set one personal-info field. An empty value clears it.
pub fn set_personal_field(state: &ResumeMetaData, field: PersonalField, value: &str) -> ResumeAction {
    let mut info: PersonalInfo = state.resume_data.personal_info.clone().unwrap_or_default();
    let value = if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    };

    let slot = match field {
        PersonalField::Name => &mut info.name,
        PersonalField::Title => &mut info.title,
        PersonalField::Email => &mut info.email,
        PersonalField::Phone => &mut info.phone,
        PersonalField::Location => &mut info.location,
        PersonalField::Website => &mut info.website,
        PersonalField::Linkedin => &mut info.linkedin,
        PersonalField::Github => &mut info.github,
        PersonalField::Summary => &mut info.summary,
    };
    *slot = value;

    ResumeAction::ResumeData(ResumeData {
        personal_info: Some(info),
        ..Default::default()
    })
}

fn sections_patch(sections: Vec<SectionDescriptor>) -> ResumeAction {
    ResumeAction::ResumeSettings(ResumeSettingsPatch {
        sections: Some(sections),
        ..Default::default()
    })
}

/// Show or hide a section. Keys not yet listed are appended after the last one.
pub fn set_section_visibility(state: &ResumeMetaData, key: &str, visible: bool) -> ResumeAction {
    let mut sections = state.resume_settings.sections.clone();
    match sections.iter_mut().find(|s| s.key == key) {
        Some(section) => section.visible = visible,
        None => {
            let order = sections.iter().map(|s| s.order).max().map_or(0, |m| m + 1);
            sections.push(SectionDescriptor::new(key, order, visible));
        }
    }
    sections_patch(sections)
}

/// Move a section to `position` in render order and renumber orders densely
pub fn reorder_section(state: &ResumeMetaData, key: &str, position: usize) -> Result<ResumeAction> {
    let mut sections = state.resume_settings.sections.clone();
    sections.sort_by_key(|s| s.order);

    let from = sections
        .iter()
        .position(|s| s.key == key)
        .ok_or_else(|| anyhow::anyhow!("Unknown section: {}", key))?;
    let position = position.min(sections.len() - 1);

    let section = sections.remove(from);
    sections.insert(position, section);
    for (i, section) in sections.iter_mut().enumerate() {
        section.order = i as i32;
    }
    Ok(sections_patch(sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ResumeStore;
    use pretty_assertions::assert_eq;

    fn companies(store: &ResumeStore) -> Vec<String> {
        Experience::items(&store.state().resume_data)
            .iter()
            .map(|e| e.company.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_update_add_remove_move_entries() {
        let mut store = ResumeStore::demo();
        assert_eq!(companies(&store), vec!["Helvetic Cloud", "Datapoint"]);

        let action = add_entry(
            store.state(),
            Experience {
                company: Some("Startup".to_string()),
                ..Default::default()
            },
        );
        store.dispatch(action);
        assert_eq!(companies(&store), vec!["Helvetic Cloud", "Datapoint", "Startup"]);

        let action = move_entry::<Experience>(store.state(), 2, 0).unwrap();
        store.dispatch(action);
        assert_eq!(companies(&store), vec!["Startup", "Helvetic Cloud", "Datapoint"]);

        let mut edited = Experience::items(&store.state().resume_data)[1].clone();
        edited.company = Some("Helvetic".to_string());
        let action = update_entry(store.state(), 1, edited).unwrap();
        store.dispatch(action);

        let action = remove_entry::<Experience>(store.state(), 2).unwrap();
        store.dispatch(action);
        assert_eq!(companies(&store), vec!["Startup", "Helvetic"]);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let store = ResumeStore::demo();
        assert!(remove_entry::<Education>(store.state(), 5).is_err());
        assert!(update_entry(store.state(), 9, "x".to_string()).is_err());
    }

    #[test]
    fn test_edit_named_list() {
        let mut store = ResumeStore::demo();
        let action = edit_named_list(store.state(), "Experience", ListEdit::Move { from: 1, to: 0 }).unwrap();
        store.dispatch(action);
        assert_eq!(companies(&store), vec!["Datapoint", "Helvetic Cloud"]);

        let action = edit_named_list(store.state(), "interests", ListEdit::Remove(0)).unwrap();
        store.dispatch(action);
        assert_eq!(store.state().resume_data.interests, Some(vec!["Chess".to_string()]));

        assert!(edit_named_list(store.state(), "hobbies", ListEdit::Remove(0)).is_err());
        assert!(edit_named_list(store.state(), "skills", ListEdit::Remove(40)).is_err());
    }

    #[test]
    fn test_add_to_absent_section() {
        let mut store = ResumeStore::default();
        let action = add_entry(store.state(), "Sailing".to_string());
        store.dispatch(action);
        assert_eq!(
            store.state().resume_data.interests,
            Some(vec!["Sailing".to_string()])
        );
    }

    #[test]
    fn test_set_personal_field_keeps_other_fields() {
        let mut store = ResumeStore::demo();
        let action = set_personal_field(store.state(), PersonalField::Title, "Staff Engineer");
        store.dispatch(action);
        let action = set_personal_field(store.state(), PersonalField::Github, "  ");
        store.dispatch(action);

        let info = store.state().resume_data.personal_info.clone().unwrap();
        assert_eq!(info.title.as_deref(), Some("Staff Engineer"));
        assert_eq!(info.name.as_deref(), Some("Alex Morgan"));
        assert_eq!(info.github, None);
    }

    #[test]
    fn test_section_visibility_and_reorder() {
        let mut store = ResumeStore::demo();

        let action = set_section_visibility(store.state(), "references", true);
        store.dispatch(action);
        let action = set_section_visibility(store.state(), "Volunteering", true);
        store.dispatch(action);
        let action = reorder_section(store.state(), "skills", 0).unwrap();
        store.dispatch(action);

        let sections = &store.state().resume_settings.sections;
        let mut sorted = sections.clone();
        sorted.sort_by_key(|s| s.order);
        assert_eq!(sorted[0].key, "skills");
        assert_eq!(sorted.last().unwrap().key, "Volunteering");
        assert!(sections.iter().find(|s| s.key == "references").unwrap().visible);
        assert!(reorder_section(store.state(), "missing", 0).is_err());
    }
}
