use crate::api::types::{OptionQuote, PricingResponse};
use crate::errors::AppResult;
use crate::payoff::{self, OptionParameters, PayoffCurve};

/// Inputs that trigger an asynchronous lookup. Each one is sequenced on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupField {
    MarketData,
    RiskFreeRate,
    Price,
}

impl LookupField {
    #[inline]
    fn slot(self) -> usize {
        match self {
            Self::MarketData => 0,
            Self::RiskFreeRate => 1,
            Self::Price => 2,
        }
    }
}

/// Handle for one in-flight lookup. Only the newest ticket of a field may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    field: LookupField,
    seq: u64,
}

impl Ticket {
    pub fn field(&self) -> LookupField {
        self.field
    }
}

/// Caller-owned form state for one pricing screen.
///
/// Lookups resolve in any order; a response is applied only if no newer
/// request for the same field was started since (last request wins).
#[derive(Debug, Clone)]
pub struct FormSession {
    params: OptionParameters,
    risk_free_rate: Option<f64>,
    quotes: Vec<OptionQuote>,
    price: Option<PricingResponse>,
    latest: [u64; 3],
}

impl FormSession {
    pub fn new(params: OptionParameters) -> Self {
        Self {
            params,
            risk_free_rate: None,
            quotes: Vec::new(),
            price: None,
            latest: [0; 3],
        }
    }

    pub fn params(&self) -> &OptionParameters {
        &self.params
    }

    /// Replace the draft. A model price computed for the old draft no longer applies.
    pub fn set_params(&mut self, params: OptionParameters) {
        if params != self.params {
            self.price = None;
        }
        self.params = params;
    }

    pub fn risk_free_rate(&self) -> Option<f64> {
        self.risk_free_rate
    }

    pub fn quotes(&self) -> &[OptionQuote] {
        &self.quotes
    }

    pub fn price(&self) -> Option<&PricingResponse> {
        self.price.as_ref()
    }

    /// Start a lookup for `field`, superseding any still in flight.
    pub fn begin(&mut self, field: LookupField) -> Ticket {
        let slot = &mut self.latest[field.slot()];
        *slot += 1;
        Ticket { field, seq: *slot }
    }

    #[inline]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest[ticket.field.slot()] == ticket.seq
    }

    fn accept(&self, ticket: Ticket, expected: LookupField) -> bool {
        if ticket.field != expected {
            tracing::warn!(ticket = ?ticket.field, expected = ?expected, "ticket used for wrong field");
            return false;
        }
        if !self.is_current(ticket) {
            tracing::debug!(field = ?ticket.field, seq = ticket.seq, "dropping stale response");
            return false;
        }
        true
    }

    pub fn apply_risk_free_rate(&mut self, ticket: Ticket, value: f64) -> bool {
        if !self.accept(ticket, LookupField::RiskFreeRate) {
            return false;
        }
        self.risk_free_rate = Some(value);
        true
    }

    pub fn apply_quotes(&mut self, ticket: Ticket, quotes: Vec<OptionQuote>) -> bool {
        if !self.accept(ticket, LookupField::MarketData) {
            return false;
        }
        self.quotes = quotes;
        true
    }

    pub fn apply_price(&mut self, ticket: Ticket, price: PricingResponse) -> bool {
        if !self.accept(ticket, LookupField::Price) {
            return false;
        }
        self.price = Some(price);
        true
    }

    /// Fill the draft from a listed contract.
    pub fn autofill(&mut self, quote: &OptionQuote) {
        self.set_params(quote.to_parameters());
    }

    /// Parameters the payoff diagram is drawn with: the draft's own premium
    /// (a traded price), else the model price, else the placeholder estimate.
    pub fn payoff_parameters(&self) -> OptionParameters {
        let mut p = self.params;
        let has_premium = p.premium.is_some_and(|x| x != 0.0);
        if !has_premium {
            p.premium = self.price.as_ref().map(|r| r.price);
        }
        p
    }

    pub fn payoff_curve(&self, step_count: usize) -> AppResult<PayoffCurve> {
        payoff::generate(&self.payoff_parameters(), step_count)
    }
}
