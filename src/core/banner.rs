use crate::config::settings::FormSettings;
use crate::core::{Adjacent, BannerKind, NewElement, NodeId, Page, Query};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Creates status banners and schedules their fade-out and removal.
pub struct Banners<P: Page> {
    page: Arc<P>,
    settings: Arc<FormSettings>,
    shutdown: CancellationToken,
}

impl<P: Page> Clone for Banners<P> {
    fn clone(&self) -> Self {
        Self {
            page: Arc::clone(&self.page),
            settings: Arc::clone(&self.settings),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<P: Page> Banners<P> {
    pub fn new(page: Arc<P>, settings: Arc<FormSettings>, shutdown: CancellationToken) -> Self {
        Self {
            page,
            settings,
            shutdown,
        }
    }

    /// Replaces any alert already next to the form and inserts the new one right after it.
    pub fn show_after_form(&self, form: NodeId, kind: BannerKind, message: &str) -> NodeId {
        if let Some(parent) = self.page.parent(form) {
            if let Some(existing) = self
                .page
                .query_first(parent, Query::Class(&self.settings.classes.alert))
            {
                tracing::debug!("Removing previous banner {:?}", existing);
                self.page.remove(existing);
            }
        }

        let banner = self.build(kind, message, Some("mt-3"));
        self.page.insert_adjacent(form, Adjacent::AfterEnd, banner);
        self.schedule_dismiss(banner);
        banner
    }

    /// Inserts the banner just before the page footer. Without a footer nothing is shown.
    pub fn show_before_footer(&self, kind: BannerKind, message: &str) -> Option<NodeId> {
        let Some(footer) = self.page.query_first(self.page.document(), Query::Footer) else {
            tracing::debug!("No footer on the page, skipping {} banner", kind.as_str());
            return None;
        };

        let banner = self.build(kind, message, None);
        self.page.insert_adjacent(footer, Adjacent::BeforeBegin, banner);
        self.schedule_dismiss(banner);
        Some(banner)
    }

    fn build(&self, kind: BannerKind, message: &str, spacing: Option<&str>) -> NodeId {
        let classes = &self.settings.classes;
        let mut element = NewElement::new("div")
            .class(classes.alert.as_str())
            .class(format!("{}-{}", classes.alert, kind.as_str()))
            .class(format!("{}-dismissible", classes.alert))
            .class("fade")
            .class(classes.show.as_str())
            .attr("role", "alert")
            .text(message);
        if let Some(spacing) = spacing {
            element = element.class(spacing);
        }
        let banner = self.page.create_element(element);

        let close = self.page.create_element(
            NewElement::new("button")
                .class("btn-close")
                .attr("type", "button")
                .attr("data-bs-dismiss", classes.alert.as_str())
                .attr("aria-label", "Close"),
        );
        self.page.append_child(banner, close);
        banner
    }

    fn schedule_dismiss(&self, banner: NodeId) {
        let page = Arc::clone(&self.page);
        let show_class = self.settings.classes.show.clone();
        let visible = self.settings.banner.visible();
        let fade = self.settings.banner.fade();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(visible) => {}
            }
            page.remove_class(banner, &show_class);

            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(fade) => {}
            }
            page.remove(banner);
            tracing::debug!("Banner {:?} dismissed", banner);
        });
    }
}
