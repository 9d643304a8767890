use crate::core::{NodeId, Page, ScrollOptions};

/// Click listener for `a[href^="#"]`. Returns true when the default navigation was
/// replaced by a smooth scroll.
pub fn handle_click<P: Page>(page: &P, link: NodeId) -> bool {
    let href = page.attribute(link, "href").unwrap_or_default();
    if href.is_empty() || href == "#" {
        return false;
    }

    let Some(target) = href.strip_prefix('#').and_then(|id| page.element_by_id(id)) else {
        tracing::debug!("No element for {}, leaving navigation to the page", href);
        return false;
    };

    page.scroll_into_view(target, ScrollOptions::SMOOTH_TO_START);
    page.push_history(&href);
    true
}
