use crate::domain::book::{BookId, CatalogItem};
use crate::domain::cart::Cart;
use crate::errors::DomainError;
use crate::session::states::{next_state, SessionEvent, SessionState, TransitionOutcome};
use crate::storefront::catalog::Catalog;
use crate::storefront::pricing::{Discount, FlatDiscountPricing, PricingEngine, PricingSummary};

/// All per-session state of the storefront. The presentation layer borrows it
/// for rendering and routes every shopper action through it.
#[derive(Clone, Debug)]
pub struct Session {
    state: SessionState,
    catalog: Catalog,
    cart: Cart,
    discount_applied: bool,
    pricing: FlatDiscountPricing,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Discount::STANDARD)
    }
}

impl Session {
    pub fn new(discount: Discount) -> Self {
        Self {
            state: SessionState::Loading,
            catalog: Catalog::empty(),
            cart: Cart::new(),
            discount_applied: false,
            pricing: FlatDiscountPricing::new(discount),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn discount(&self) -> Discount {
        self.pricing.discount()
    }

    pub fn discount_applied(&self) -> bool {
        self.discount_applied
    }

    pub fn quantity_of(&self, id: &BookId) -> u32 {
        self.cart.quantity_of(id)
    }

    pub fn summary(&self) -> PricingSummary {
        self.pricing.price(&self.cart, self.discount_applied)
    }

    /// Installs the loaded catalog, empty on failure, and leaves the loading state.
    pub fn settle(&mut self, catalog: Catalog) -> Result<TransitionOutcome, DomainError> {
        let event = SessionEvent::CatalogSettled { item_count: catalog.len() };
        let outcome = self.advance(event)?;
        self.catalog = catalog;
        Ok(outcome)
    }

    pub fn add_one(&mut self, item: &CatalogItem) -> Result<TransitionOutcome, DomainError> {
        let outcome = self.advance(SessionEvent::ItemAdded(item.id.clone()))?;
        self.cart.add_one(item);
        Ok(outcome)
    }

    /// Adds the catalog entry at a zero-based position.
    pub fn add_at(&mut self, position: usize) -> Result<TransitionOutcome, DomainError> {
        let item = self.item_at(position)?.clone();
        self.add_one(&item)
    }

    pub fn remove_one(&mut self, id: &BookId) -> Result<TransitionOutcome, DomainError> {
        let outcome = self.advance(SessionEvent::ItemRemoved(id.clone()))?;
        self.cart.remove_one(id)?;
        Ok(outcome)
    }

    pub fn remove_at(&mut self, position: usize) -> Result<TransitionOutcome, DomainError> {
        let id = self.item_at(position)?.id.clone();
        self.remove_one(&id)
    }

    pub fn toggle_discount(&mut self) -> Result<TransitionOutcome, DomainError> {
        let applied = !self.discount_applied;
        let outcome = self.advance(SessionEvent::DiscountToggled { applied })?;
        self.discount_applied = applied;
        Ok(outcome)
    }

    fn item_at(&self, position: usize) -> Result<&CatalogItem, DomainError> {
        self.catalog
            .get(position)
            .ok_or(DomainError::UnknownPosition { position, len: self.catalog.len() })
    }

    fn advance(&mut self, event: SessionEvent) -> Result<TransitionOutcome, DomainError> {
        let from = self.state;
        let to = next_state(from, &event)
            .ok_or_else(|| DomainError::InvalidSessionTransition { from, event: event.clone() })?;
        self.state = to;
        Ok(TransitionOutcome { from, to, event })
    }
}
