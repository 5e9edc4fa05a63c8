use ratatui::layout::Rect;
use crate::api::{ChatResponse, ComparisonResult, ManualsClient, Product};
use crate::catalog::Catalog;
use crate::chat::{ChatSession, LoadingToken};
use crate::compare::ComparisonPanel;
use crate::error::ClientError;
use crate::tui::EventSender;

/// Focusable controls, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    ProductSelect,
    Question,
    AskButton,
    ComparisonHeader,
    ProductA,
    ProductB,
    Specification,
    CompareButton,
}

impl Focus {
    const ORDER: [Focus; 8] = [
        Focus::ProductSelect,
        Focus::Question,
        Focus::AskButton,
        Focus::ComparisonHeader,
        Focus::ProductA,
        Focus::ProductB,
        Focus::Specification,
        Focus::CompareButton,
    ];

    /// Controls inside the collapsible comparison content.
    pub fn in_comparison_content(self) -> bool {
        matches!(
            self,
            Focus::ProductA | Focus::ProductB | Focus::Specification | Focus::CompareButton
        )
    }

    pub fn is_text_field(self) -> bool {
        matches!(self, Focus::Question | Focus::Specification)
    }

    fn step(self, forward: bool, comparison_expanded: bool) -> Focus {
        let len = Self::ORDER.len();
        let mut i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        loop {
            i = if forward { (i + 1) % len } else { (i + len - 1) % len };
            let next = Self::ORDER[i];
            if comparison_expanded || !next.in_comparison_content() {
                return next;
            }
        }
    }
}

/// All UI state, built once at startup and handed to every controller.
pub struct App {
    pub should_quit: bool,
    pub focus: Focus,
    pub catalog: Catalog,
    pub chat: ChatSession,
    pub comparison: ComparisonPanel,

    /// Blocking alert; while set, input only dismisses it.
    pub alert: Option<String>,

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    client: ManualsClient,
    events: EventSender,
}

impl App {
    pub fn new(client: ManualsClient, events: EventSender) -> Self {
        Self {
            should_quit: false,
            focus: Focus::ProductSelect,
            catalog: Catalog::default(),
            chat: ChatSession::default(),
            comparison: ComparisonPanel::default(),
            alert: None,
            chat_area: None,
            client,
            events,
        }
    }

    pub fn load_products(&mut self) {
        self.catalog.load(&self.client, &self.events);
    }

    pub fn apply_catalog(&mut self, result: Result<Vec<Product>, ClientError>) {
        self.catalog.apply(result);
    }

    pub fn submit_question(&mut self) {
        let product = self.catalog.chat_product.value().to_string();
        match self.chat.submit(&product) {
            Ok(pending) => pending.dispatch(&self.client, &self.events),
            Err(e) => self.show_alert(e.to_string()),
        }
    }

    pub fn resolve_question(
        &mut self,
        token: LoadingToken,
        result: Result<ChatResponse, ClientError>,
    ) {
        self.chat.resolve(token, result);
    }

    pub fn submit_comparison(&mut self) {
        let product_a = self.catalog.product_a.value().to_string();
        let product_b = self.catalog.product_b.value().to_string();
        match self.comparison.submit(&product_a, &product_b) {
            Ok(pending) => pending.dispatch(&self.client, &self.events),
            Err(e) => self.show_alert(e.to_string()),
        }
    }

    pub fn resolve_comparison(
        &mut self,
        generation: u64,
        result: Result<ComparisonResult, ClientError>,
    ) {
        if let Some(alert) = self.comparison.resolve(generation, result) {
            self.show_alert(alert);
        }
    }

    /// Collapse or expand the comparison content. Focus inside the content
    /// moves back to the header when it collapses.
    pub fn toggle_comparison(&mut self) {
        self.comparison.toggle();
        if !self.comparison.expanded && self.focus.in_comparison_content() {
            self.focus = Focus::ComparisonHeader;
        }
    }

    pub fn show_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.step(true, self.comparison.expanded);
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.step(false, self.comparison.expanded);
    }

    pub fn tick_animation(&mut self) {
        self.chat.log.tick_animation();
    }
}
