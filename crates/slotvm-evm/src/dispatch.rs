//! Selector-based handler routing

use crate::context::ExecutionContext;
use crate::error::{VmError, VmResult};
use bytes::Bytes;
use slotvm_primitives::{Address, Selector};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// What a handler produces: return data, or the reason the frame aborts
pub type HandlerResult = VmResult<Bytes>;

/// Handler body.
///
/// Registered handlers receive the input after the selector; the fallback
/// receives the whole input.
pub type Handler = Box<dyn Fn(&mut ExecutionContext<'_>, &[u8]) -> HandlerResult + Send + Sync>;

/// Contract code: a table from selector to handler plus an optional fallback
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<Selector, Handler>,
    fallback: Option<Handler>,
}

impl Dispatcher {
    /// Empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `selector`, replacing any previous one
    pub fn register<F>(&mut self, selector: impl Into<Selector>, handler: F)
    where
        F: Fn(&mut ExecutionContext<'_>, &[u8]) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.insert(selector.into(), Box::new(handler));
    }

    /// Register the handler used when no selector matches
    pub fn register_fallback<F>(&mut self, handler: F)
    where
        F: Fn(&mut ExecutionContext<'_>, &[u8]) -> HandlerResult + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(handler));
    }

    /// Builder form of [`Dispatcher::register`]
    pub fn with_handler<F>(mut self, selector: impl Into<Selector>, handler: F) -> Self
    where
        F: Fn(&mut ExecutionContext<'_>, &[u8]) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(selector, handler);
        self
    }

    /// Builder form of [`Dispatcher::register_fallback`]
    pub fn with_fallback<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ExecutionContext<'_>, &[u8]) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_fallback(handler);
        self
    }

    /// Whether `selector` has a dedicated handler
    pub fn contains(&self, selector: &Selector) -> bool {
        self.handlers.contains_key(selector)
    }

    /// Whether a fallback is registered
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Registered selectors in ascending order
    pub fn selectors(&self) -> Vec<Selector> {
        let mut selectors: Vec<Selector> = self.handlers.keys().copied().collect();
        selectors.sort();
        selectors
    }

    /// Pick the handler for `selector` and the slice of `input` it receives
    pub fn resolve<'d, 'i>(
        &'d self,
        selector: Selector,
        input: &'i [u8],
    ) -> VmResult<(&'d Handler, &'i [u8])> {
        if let Some(handler) = self.handlers.get(&selector) {
            tracing::debug!(%selector, "dispatching");
            return Ok((handler, &input[Selector::LEN..]));
        }
        match &self.fallback {
            Some(fallback) => {
                tracing::debug!(%selector, "dispatching to fallback");
                Ok((fallback, input))
            }
            None => Err(VmError::UnknownSelector(selector)),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("selectors", &self.selectors())
            .field("fallback", &self.has_fallback())
            .finish()
    }
}

/// Deployed contracts by address
#[derive(Debug, Default)]
pub struct ContractRegistry {
    contracts: BTreeMap<Address, Dispatcher>,
}

impl ContractRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `dispatcher` as the code of `address`
    pub fn deploy(&mut self, address: Address, dispatcher: Dispatcher) {
        self.contracts.insert(address, dispatcher);
    }

    /// Builder form of [`ContractRegistry::deploy`]
    pub fn with_contract(mut self, address: Address, dispatcher: Dispatcher) -> Self {
        self.deploy(address, dispatcher);
        self
    }

    /// Code of `address`, if any
    pub fn get(&self, address: &Address) -> Option<&Dispatcher> {
        self.contracts.get(address)
    }

    /// Whether `address` has code
    pub fn contains(&self, address: &Address) -> bool {
        self.contracts.contains_key(address)
    }

    /// Number of deployed contracts
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether nothing is deployed
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
