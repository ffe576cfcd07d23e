//! Cross-reference resolver: links each reference to its target
//! declaration and named context anchors by identifier.
//!
//! Declarations and context anchors live in separate namespaces. Each
//! namespace is indexed once, so resolving a reference is O(1) per lookup.

use crate::error::MarkError;
use crate::marker::Marker;
use facet::Facet;
use std::collections::HashMap;

/// A reference linked to its declaration and context anchors.
///
/// All indices point into the global highlight sequence produced by the
/// remap step (annotations claim no slot there, so these are highlight
/// indices, not raw marker indices).
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ResolvedReference {
    /// Highlight index of the reference marker itself.
    pub reference_index: usize,
    /// Highlight index of the target declaration.
    pub declaration_index: usize,
    /// Highlight indices of the context anchors, in declared order.
    pub context_indexes: Vec<usize>,
    /// The reference's literal input text.
    pub input_text: String,
}

/// Resolve every reference among `markers`, in encounter order.
///
/// Duplicate declaration or context identifiers within one text are an
/// integrity error; an identifier with no matching marker is a reference
/// error naming the identifier.
pub fn resolve(markers: &[Marker]) -> Result<Vec<ResolvedReference>, MarkError> {
    // Highlight indices skip annotations, mirroring the remap step.
    let indexed: Vec<(usize, &Marker)> = markers
        .iter()
        .filter(|marker| !marker.is_annotation())
        .enumerate()
        .collect();

    let mut declarations: HashMap<&str, usize> = HashMap::new();
    let mut anchors: HashMap<&str, usize> = HashMap::new();

    for (index, marker) in &indexed {
        match marker {
            Marker::Declaration { id, .. } => {
                if declarations.insert(id.as_str(), *index).is_some() {
                    return Err(MarkError::DuplicateDeclaration { id: id.clone() });
                }
            }
            Marker::ContextAnchor { id, .. } => {
                if anchors.insert(id.as_str(), *index).is_some() {
                    return Err(MarkError::DuplicateContext { id: id.clone() });
                }
            }
            Marker::Reference { .. } | Marker::Annotation { .. } => {}
        }
    }

    let mut resolved = Vec::new();
    for (index, marker) in &indexed {
        let Marker::Reference {
            target_id,
            context_ids,
            input_text,
            ..
        } = marker
        else {
            continue;
        };

        let declaration_index =
            *declarations
                .get(target_id.as_str())
                .ok_or_else(|| MarkError::UnresolvedDeclaration {
                    id: target_id.clone(),
                    known: sorted_ids(&declarations),
                })?;

        let mut context_indexes = Vec::with_capacity(context_ids.len());
        for context_id in context_ids {
            let anchor_index = *anchors.get(context_id.as_str()).ok_or_else(|| {
                MarkError::UnresolvedContext {
                    id: context_id.clone(),
                    known: sorted_ids(&anchors),
                }
            })?;
            context_indexes.push(anchor_index);
        }

        resolved.push(ResolvedReference {
            reference_index: *index,
            declaration_index,
            context_indexes,
            input_text: input_text.clone(),
        });
    }

    Ok(resolved)
}

fn sorted_ids(index: &HashMap<&str, usize>) -> Vec<String> {
    let mut ids: Vec<String> = index.keys().map(|id| id.to_string()).collect();
    ids.sort();
    ids
}
