//! Product catalog: the three product selectors and how a catalog response
//! is applied to them.

use crate::api::{ManualsClient, Product};
use crate::error::ClientError;
use crate::tui::{AppEvent, EventSender};

pub const CHAT_PLACEHOLDER: &str = "Choose a product...";
pub const PRODUCT_A_PLACEHOLDER: &str = "Choose product A...";
pub const PRODUCT_B_PLACEHOLDER: &str = "Choose product B...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// A drop-down style selector. Option 0 is always the placeholder, whose
/// value is the empty string.
#[derive(Debug, Clone)]
pub struct ProductSelect {
    options: Vec<SelectOption>,
    selected: usize,
}

impl ProductSelect {
    pub fn new(placeholder: &str) -> Self {
        Self {
            options: vec![SelectOption {
                value: String::new(),
                label: placeholder.to_string(),
            }],
            selected: 0,
        }
    }

    /// Replace all options with the placeholder plus one option per product,
    /// in input order. The current selection survives if its id is still
    /// offered.
    pub fn populate(&mut self, products: &[Product]) {
        let previous = self.value().to_string();
        let placeholder = self.options[0].label.clone();

        self.options = std::iter::once(SelectOption {
            value: String::new(),
            label: placeholder,
        })
        .chain(products.iter().map(|p| SelectOption {
            value: p.id.clone(),
            label: p.name.clone(),
        }))
        .collect();

        self.selected = if previous.is_empty() {
            0
        } else {
            self.options
                .iter()
                .position(|o| o.value == previous)
                .unwrap_or(0)
        };
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Value of the selected option; empty while the placeholder is shown.
    pub fn value(&self) -> &str {
        &self.options[self.selected].value
    }

    pub fn label(&self) -> &str {
        &self.options[self.selected].label
    }

    pub fn is_placeholder(&self) -> bool {
        self.selected == 0
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1).min(self.options.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Select the option with the given value, if present.
    pub fn select_value(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o.value == value) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }
}

/// The three independent product selectors fed by one catalog request.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub chat_product: ProductSelect,
    pub product_a: ProductSelect,
    pub product_b: ProductSelect,
    pub loading: bool,
    /// Set when the last load failed; the selectors keep their old contents.
    pub load_error: Option<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            chat_product: ProductSelect::new(CHAT_PLACEHOLDER),
            product_a: ProductSelect::new(PRODUCT_A_PLACEHOLDER),
            product_b: ProductSelect::new(PRODUCT_B_PLACEHOLDER),
            loading: false,
            load_error: None,
        }
    }
}

impl Catalog {
    /// Issue the catalog request. The result comes back as
    /// `AppEvent::CatalogLoaded`.
    pub fn load(&mut self, client: &ManualsClient, events: &EventSender) {
        self.loading = true;
        let client = client.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let result = client.list_products().await;
            // Receiver gone means the app is shutting down.
            let _ = events.send(AppEvent::CatalogLoaded(result));
        });
    }

    pub fn apply(&mut self, result: Result<Vec<Product>, ClientError>) {
        self.loading = false;
        match result {
            Ok(products) => {
                tracing::info!(count = products.len(), "product catalog loaded");
                self.chat_product.populate(&products);
                self.product_a.populate(&products);
                self.product_b.populate(&products);
                self.load_error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, url = e.url(), "failed to load products");
                self.load_error = Some("Could not load products".to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn products(n: usize) -> Vec<Product> {
        (1..=n)
            .map(|i| Product {
                id: format!("p{i}"),
                name: format!("Product {i}"),
            })
            .collect()
    }

    #[test]
    fn test_populate_has_placeholder_plus_products() {
        for n in [0, 1, 5] {
            let mut select = ProductSelect::new(CHAT_PLACEHOLDER);
            let list = products(n);
            select.populate(&list);

            let options = select.options();
            assert_eq!(options.len(), 1 + n);
            assert_eq!(options[0].value, "");
            assert_eq!(options[0].label, CHAT_PLACEHOLDER);
            for (option, product) in options[1..].iter().zip(&list) {
                assert_eq!(option.value, product.id);
                assert_eq!(option.label, product.name);
            }
        }
    }

    #[test]
    fn test_populate_replaces_previous_options() {
        let mut select = ProductSelect::new(PRODUCT_A_PLACEHOLDER);
        select.populate(&products(4));
        select.populate(&products(2));
        assert_eq!(select.options().len(), 3);
    }

    #[test]
    fn test_selection_survives_repopulate_when_still_present() {
        let mut select = ProductSelect::new(CHAT_PLACEHOLDER);
        select.populate(&products(3));
        assert!(select.select_value("p2"));

        select.populate(&products(5));
        assert_eq!(select.value(), "p2");

        select.populate(&products(1));
        assert_eq!(select.value(), "");
        assert!(select.is_placeholder());
    }

    #[test]
    fn test_navigation_clamps() {
        let mut select = ProductSelect::new(CHAT_PLACEHOLDER);
        select.select_prev();
        assert_eq!(select.selected_index(), 0);
        select.select_next();
        assert_eq!(select.selected_index(), 0);

        select.populate(&products(2));
        select.select_next();
        select.select_next();
        select.select_next();
        assert_eq!(select.value(), "p2");
        assert_eq!(select.label(), "Product 2");
    }

    #[test]
    fn test_apply_success_fills_all_three() {
        let mut catalog = Catalog::default();
        catalog.loading = true;
        catalog.apply(Ok(products(3)));

        assert!(!catalog.loading);
        assert!(catalog.load_error.is_none());
        assert_eq!(catalog.chat_product.options().len(), 4);
        assert_eq!(catalog.product_a.options().len(), 4);
        assert_eq!(catalog.product_b.options().len(), 4);
        assert_eq!(catalog.product_b.options()[0].label, PRODUCT_B_PLACEHOLDER);
    }

    #[test]
    fn test_apply_failure_keeps_prior_state() {
        let mut catalog = Catalog::default();
        catalog.apply(Ok(products(2)));
        catalog.product_a.select_value("p1");

        catalog.apply(Err(ClientError::Status {
            url: "http://localhost/api/products".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }));

        assert_eq!(catalog.load_error.as_deref(), Some("Could not load products"));
        assert_eq!(catalog.chat_product.options().len(), 3);
        assert_eq!(catalog.product_a.value(), "p1");
    }
}
