//! Path re-templating.
//!
//! API gateway hands us the concrete path together with the parameter values
//! it extracted. Routes are registered by template, so the concrete path is
//! turned back into its template before lookup:
//!
//! ```text
//! resource:       /items/42/parts/7
//! pathParameters: {"id": "42", "part": "7"}
//!     → /items/{id}/parts/{part}
//! ```
//!
//! # Design Decisions
//! - Only the first literal occurrence of each value is replaced
//! - Values not found in the path are ignored
//! - Longest value first, then key name, so the result never depends on the
//!   order the event happened to list its parameters in

/// Rebuild the route template for a concrete resource path.
pub fn canonicalize(resource: &str, params: &[(&str, &str)]) -> String {
    let mut ordered: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    ordered.sort_by(|(ka, va), (kb, vb)| vb.len().cmp(&va.len()).then_with(|| ka.cmp(kb)));

    let mut template = resource.to_string();
    for (key, value) in ordered {
        if let Some(start) = template.find(value) {
            template.replace_range(start..start + value.len(), &format!("{{{key}}}"));
        }
    }
    template
}
