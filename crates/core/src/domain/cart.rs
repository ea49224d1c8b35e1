use serde::{Deserialize, Serialize};

use crate::domain::book::{BookId, CatalogItem};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: CatalogItem,
    pub quantity: u32,
}

/// Cart lines keyed by book id, kept in the order they were first added.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, id: &BookId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.item.id == id)
    }

    pub fn quantity_of(&self, id: &BookId) -> u32 {
        self.line(id).map(|line| line.quantity).unwrap_or(0)
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Adds one unit, opening a line at quantity 1 if none exists. Returns the new quantity.
    pub fn add_one(&mut self, item: &CatalogItem) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item.id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }

        self.lines.push(CartLine { item: item.clone(), quantity: 1 });
        1
    }

    /// Removes one unit. A line that would drop to zero is removed outright.
    /// Returns the remaining quantity, 0 when the line was removed.
    pub fn remove_one(&mut self, id: &BookId) -> Result<u32, DomainError> {
        let position = self
            .lines
            .iter()
            .position(|line| &line.item.id == id)
            .ok_or_else(|| DomainError::MissingCartLine(id.clone()))?;

        let line = &mut self.lines[position];
        if line.quantity > 1 {
            line.quantity -= 1;
            return Ok(line.quantity);
        }

        self.lines.remove(position);
        Ok(0)
    }
}
