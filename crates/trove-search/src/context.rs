//! Assembles retrieved items into a plain-text context block for a
//! downstream language model.
//!
//! The block is prompt material, not a wire format: stable section headers,
//! one item per numbered section, content excerpted so a single long item
//! cannot crowd out the rest.

use trove_core::defaults::CONTEXT_EXCERPT_CHARS;
use trove_core::{excerpt, Item};

/// Render retrieved items as a context block.
///
/// `total_count` is the size of the user's whole knowledge base, reported in
/// the preamble so the model knows how much was filtered out. Empty `items`
/// produces an explanatory sentence instead of an empty block.
pub fn build_context(items: &[Item], total_count: usize) -> String {
    if items.is_empty() {
        return if total_count > 0 {
            format!(
                "The user has {} total items in their knowledge base, but no items are relevant to this query.",
                total_count
            )
        } else {
            "No relevant content found in knowledge base.".to_string()
        };
    }

    let mut context = String::new();
    if total_count > 0 {
        context.push_str(&format!(
            "The user has {} total items in their knowledge base. You are provided with the {} most relevant items for this conversation.\n\n",
            total_count,
            items.len()
        ));
    }
    context.push_str("Here is relevant content from the user's knowledge base:\n\n");

    for (idx, item) in items.iter().enumerate() {
        context.push_str(&format!("[Item {}: {}]\n", idx + 1, item.content_type));
        context.push_str(&format!("Title: {}\n", item.title));
        if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
            context.push_str(&format!("Description: {}\n", description));
        }
        if let Some(content) = item.content.as_deref().filter(|c| !c.is_empty()) {
            context.push_str(&format!(
                "Content: {}\n",
                excerpt(content, CONTEXT_EXCERPT_CHARS)
            ));
        }
        context.push('\n');
    }

    context
}
