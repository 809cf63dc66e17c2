//! Ordered template candidate names handed to the rendering layer.
//!
//! The first name that exists on the renderer's side wins, so the lists run
//! from most to least specific.

use crate::domain::target::entity::TypeTag;

pub fn list_templates(tag: &TypeTag) -> Vec<String> {
    vec![
        format!("comments/{}/{}/list.html", tag.namespace, tag.kind),
        format!("comments/{}/list.html", tag.namespace),
        "comments/list.html".to_string(),
    ]
}

/// Underscore names come first for older template layouts.
pub fn preview_templates(tag: &TypeTag) -> Vec<String> {
    vec![
        format!("comments/{}_{}_preview.html", tag.namespace, tag.kind),
        format!("comments/{}_preview.html", tag.namespace),
        format!("comments/{}/{}/preview.html", tag.namespace, tag.kind),
        format!("comments/{}/preview.html", tag.namespace),
        "comments/preview.html".to_string(),
    ]
}

pub fn edit_form_templates(tag: &TypeTag, is_ajax: bool) -> Vec<String> {
    let suffix = if is_ajax { "_ajax" } else { "" };
    vec![
        format!("comments/{}_{}_edit_form{}.html", tag.namespace, tag.kind, suffix),
        format!("comments/{}_edit_form{}.html", tag.namespace, suffix),
        format!("comments/edit_form{}.html", suffix),
    ]
}

pub fn posted_templates() -> Vec<String> {
    vec!["comments/posted.html".to_string()]
}
