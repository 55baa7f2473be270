use crate::menu::{ItemSize, MenuItem};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OrderError {
    #[error("Size '{size}' is not available for {item}")]
    InvalidSize { item: String, size: String },

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("The order has already been checked out")]
    OrderClosed,

    #[error("Cannot check out an empty order")]
    EmptyOrder,

    #[error("The order was already checked out")]
    AlreadyCheckedOut,

    #[error("No order line #{0}")]
    LineNotFound(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Open,
    CheckedOut,
}

/// One line of an order: a menu item with its resolved size, quantity and
/// any special instructions.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub id: u32,
    pub item: MenuItem,
    pub size: Option<ItemSize>,
    pub quantity: u32,
    pub instructions: Option<String>,
}

impl OrderLine {
    /// Line total in cents: (base price + size delta) × quantity.
    pub fn line_total(&self) -> u32 {
        self.item.price_for(self.size) * self.quantity
    }
}

/// Plain-data view of an order, for rendering and confirmation display.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub lines: Vec<LineSummary>,
    pub total: u32,
    pub status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct LineSummary {
    pub id: u32,
    pub name: String,
    pub size: Option<ItemSize>,
    pub quantity: u32,
    pub instructions: Option<String>,
    pub line_total: u32,
}

impl OrderSummary {
    /// Plain-text rendering, one line per order line plus the total.
    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return "Your order is currently empty.".to_string();
        }

        let mut out = String::from("Your current order:\n");
        for line in &self.lines {
            out.push_str(&format!("  #{} {}x {}", line.id, line.quantity, line.name));
            if let Some(size) = line.size {
                out.push_str(&format!(" ({})", size));
            }
            if let Some(instructions) = &line.instructions {
                out.push_str(&format!(" - {}", instructions));
            }
            out.push_str(&format!(": {}\n", crate::menu::format_price(line.line_total)));
        }
        out.push_str(&format!("Total: {}", crate::menu::format_price(self.total)));
        if self.status == OrderStatus::CheckedOut {
            out.push_str(" (checked out)");
        }
        out
    }
}

/// A single customer's order. Created empty at session start, mutated
/// through the tool surface, and closed exactly once by checkout.
#[derive(Debug, Default)]
pub struct Order {
    lines: Vec<OrderLine>,
    status: OrderStatus,
    next_line_id: u32,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Open
    }
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Total in cents across all lines.
    pub fn total(&self) -> u32 {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    fn guard_open(&self) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Open => Ok(()),
            OrderStatus::CheckedOut => Err(OrderError::OrderClosed),
        }
    }

    /// Validates the requested size against the item. A sized item with no
    /// explicit size falls back to the item's default; an explicit size
    /// must be one the item offers.
    fn resolve_size(
        item: &MenuItem,
        size: Option<ItemSize>,
    ) -> Result<Option<ItemSize>, OrderError> {
        match size {
            Some(s) => {
                if item.size_option(s).is_some() {
                    Ok(Some(s))
                } else {
                    Err(OrderError::InvalidSize {
                        item: item.name.clone(),
                        size: s.to_string(),
                    })
                }
            }
            None => Ok(item.default_size()),
        }
    }

    /// Appends a line for `item` and returns it for confirmation display.
    pub fn add_item(
        &mut self,
        item: &MenuItem,
        size: Option<ItemSize>,
        quantity: u32,
        instructions: Option<String>,
    ) -> Result<&OrderLine, OrderError> {
        self.guard_open()?;
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }
        let size = Self::resolve_size(item, size)?;

        self.next_line_id += 1;
        self.lines.push(OrderLine {
            id: self.next_line_id,
            item: item.clone(),
            size,
            quantity,
            instructions,
        });

        Ok(self.lines.last().expect("line just pushed"))
    }

    /// Changes the quantity and/or size of an existing line. The order is
    /// left untouched when validation fails.
    pub fn update_line(
        &mut self,
        id: u32,
        new_quantity: Option<u32>,
        new_size: Option<ItemSize>,
    ) -> Result<&OrderLine, OrderError> {
        self.guard_open()?;

        let index = self
            .lines
            .iter()
            .position(|line| line.id == id)
            .ok_or(OrderError::LineNotFound(id))?;

        if new_quantity == Some(0) {
            return Err(OrderError::InvalidQuantity);
        }
        let resolved_size = match new_size {
            Some(s) => Self::resolve_size(&self.lines[index].item, Some(s))?,
            None => self.lines[index].size,
        };

        let line = &mut self.lines[index];
        if let Some(quantity) = new_quantity {
            line.quantity = quantity;
        }
        line.size = resolved_size;

        Ok(&self.lines[index])
    }

    /// Removes a line and returns it.
    pub fn remove_line(&mut self, id: u32) -> Result<OrderLine, OrderError> {
        self.guard_open()?;

        let index = self
            .lines
            .iter()
            .position(|line| line.id == id)
            .ok_or(OrderError::LineNotFound(id))?;

        Ok(self.lines.remove(index))
    }

    /// Pure read of the order's lines and running total.
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            lines: self
                .lines
                .iter()
                .map(|line| LineSummary {
                    id: line.id,
                    name: line.item.name.clone(),
                    size: line.size,
                    quantity: line.quantity,
                    instructions: line.instructions.clone(),
                    line_total: line.line_total(),
                })
                .collect(),
            total: self.total(),
            status: self.status,
        }
    }

    /// Finalizes the order. Fails on an empty order (status stays OPEN)
    /// and on a second call; otherwise returns the final total.
    pub fn checkout(&mut self) -> Result<u32, OrderError> {
        if self.status == OrderStatus::CheckedOut {
            return Err(OrderError::AlreadyCheckedOut);
        }
        if self.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        self.status = OrderStatus::CheckedOut;
        Ok(self.total())
    }
}
