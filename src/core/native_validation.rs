use crate::core::{NodeId, Page};

/// What the overlay listener did to the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayEffect {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

/// Defers to the page's built-in constraint validation and always marks the form so the
/// native validity styling shows.
pub fn handle_submit<P: Page>(page: &P, form: NodeId, validated_class: &str) -> OverlayEffect {
    let effect = if page.check_validity(form) {
        OverlayEffect::default()
    } else {
        tracing::debug!("Form {:?} failed built-in validation", form);
        OverlayEffect {
            prevent_default: true,
            stop_propagation: true,
        }
    };

    page.add_class(form, validated_class);
    effect
}
