use std::collections::BTreeMap;

use murphy_web::{HandlerError, HttpContext, bad_request};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    body: &'static str,
}

impl TestCase {
    pub const fn new(name: &'static str, group: TestGroup, body: &'static str) -> Self {
        Self { name, group, body }
    }

    pub const fn small(name: &'static str, body: &'static str) -> Self {
        Self::new(name, TestGroup::Small, body)
    }

    pub const fn large(name: &'static str, body: &'static str) -> Self {
        Self::new(name, TestGroup::Large, body)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn body(&self) -> &'static [u8] {
        self.body.as_bytes()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Order {
    pub customer: String,
    pub lines: Vec<OrderLine>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub notes: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OrderTotal {
    pub customer: String,
    pub line_count: usize,
    pub total: u64,
}

/// The handler every benchmark drives.
pub fn price_order(_ctx: &mut HttpContext<'_>, order: &Order, total: &mut OrderTotal) -> Result<(), HandlerError> {
    if order.lines.is_empty() {
        return Err(bad_request!("order {} has no lines", order.customer));
    }

    total.customer.clone_from(&order.customer);
    total.line_count = order.lines.len();
    total.total = order.lines.iter().map(|line| u64::from(line.quantity) * line.unit_price).sum();
    Ok(())
}
