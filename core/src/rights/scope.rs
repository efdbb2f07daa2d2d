use super::catalog::RightsCatalog;
use crate::securitydescriptor::ace::{
    CONTAINER_INHERIT_ACE, INHERIT_ONLY_ACE, NO_PROPAGATE_INHERIT_ACE,
};

/// Describe which objects an ACE applies to, based on its inheritance flags.
/// `inherited_object_type` limits inheritance to one class when present
pub fn describe_flags(ace_flags: u8, inherited_object_type: &str, catalog: &RightsCatalog) -> String {
    if (ace_flags & CONTAINER_INHERIT_ACE) != CONTAINER_INHERIT_ACE {
        return String::from("This object only");
    }

    let mut scope = String::new();
    if (ace_flags & INHERIT_ONLY_ACE) != INHERIT_ONLY_ACE {
        scope.push_str("this object and ");
    }
    if (ace_flags & NO_PROPAGATE_INHERIT_ACE) == NO_PROPAGATE_INHERIT_ACE {
        scope.push_str("descendant ");
    } else {
        scope.push_str("all descendant ");
    }

    let guid = inherited_object_type.trim();
    if !guid.is_empty() {
        scope.push_str(catalog.class_name(guid).unwrap_or(guid));
        scope.push(' ');
    }
    scope.push_str("objects");

    capitalize(&scope)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
