//! Polymorphic ("choice type") element matching.
//!
//! Three rules, run as ordered passes over the element sequence so a real
//! element with a narrowed id always beats suffix narrowing of its `[x]`
//! head: direct id match, canonical-suffix narrowing (`valueString`), and
//! the bracket form (`value[CodeableConcept]`, `value[x]`).

use crate::path::{initcap, last_path_segment};
use crate::types::{ElementDefinition, ElementType};

/// A matched element, plus the concrete type when the search path narrowed a
/// choice element.
#[derive(Debug)]
pub(crate) struct ChoiceMatch<'a> {
    pub element: &'a ElementDefinition,
    pub narrowed: Option<&'a ElementType>,
}

pub(crate) fn match_element<'a>(
    elements: &'a [ElementDefinition],
    search_path: &str,
) -> Option<ChoiceMatch<'a>> {
    let choice_id = format!("{search_path}[x]");
    if let Some(element) = elements
        .iter()
        .find(|e| e.id == search_path || e.id == choice_id)
    {
        return Some(ChoiceMatch {
            element,
            narrowed: None,
        });
    }

    for element in elements {
        if !element.is_choice() {
            continue;
        }
        let base = &element.id[..element.id.len() - 3];
        for element_type in element.types.as_deref().unwrap_or_default() {
            if format!("{base}{}", initcap(&element_type.code)) == search_path {
                return Some(ChoiceMatch {
                    element,
                    narrowed: Some(element_type),
                });
            }
        }
    }

    let (outer, inner) = split_bracket(search_path)?;
    let head_id = format!("{outer}[x]");
    let element = elements.iter().find(|e| e.id == head_id)?;
    if inner == "x" {
        return Some(ChoiceMatch {
            element,
            narrowed: None,
        });
    }
    let outer_name = last_path_segment(outer);
    for element_type in element.types.as_deref().unwrap_or_default() {
        let capitalized = initcap(&element_type.code);
        if inner == capitalized || inner == format!("{outer_name}{capitalized}") {
            return Some(ChoiceMatch {
                element,
                narrowed: Some(element_type),
            });
        }
    }

    None
}

/// `^(.+)\[([^\]]+)\]$` without the regex machinery.
fn split_bracket(path: &str) -> Option<(&str, &str)> {
    let stripped = path.strip_suffix(']')?;
    let open = stripped.rfind('[')?;
    if open == 0 {
        return None;
    }
    let inner = &stripped[open + 1..];
    if inner.is_empty() || inner.contains(']') {
        return None;
    }
    Some((&stripped[..open], inner))
}
