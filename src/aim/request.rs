use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::aim::taxonomy::{Addr, BankClass, OpKind};

/// Clock cycle as stamped by the memory system.
pub type Clk = u64;

/// Invoked by the memory system when a request retires.
pub type Callback = Arc<dyn Fn(&Request) + Send + Sync>;

/// Type-erased extension slot for whichever downstream consumer attaches data to a request.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Decoded position of an address inside the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AddrHierarchy {
    pub channel: u32,
    pub pseudo_channel: u32,
    pub rank: u32,
    pub bank_group: u32,
    pub bank: u32,
    pub row: u32,
    pub column: u32,
}

/// Unit of work handed to the memory system.
///
/// Operation id and bank class are fixed at construction; only the memory system touches the
/// lifecycle stamps and fires the callback.  The id is kept as the raw numeric value so that
/// requests injected with an id outside [`OpKind`] still travel as plain requests.
#[derive(Clone)]
pub struct Request {
    pub addr: Addr,
    pub addr_h: Option<AddrHierarchy>,
    type_id: i32,
    is_aim: bool,
    bank_class: BankClass,
    /// where the request came from, e.g. which core; -1 when unknown
    pub source_id: i32,
    pub arrive: Option<Clk>,
    pub issue: Option<Clk>,
    pub depart: Option<Clk>,
    pub scratchpad: [i32; 4],
    pub payload: Option<Payload>,
    callback: Option<Callback>,
}

impl Request {
    fn blank(type_id: i32, bank_class: BankClass) -> Self {
        Self {
            addr: -1,
            addr_h: None,
            type_id,
            is_aim: bank_class.is_compute(),
            bank_class,
            source_id: -1,
            arrive: None,
            issue: None,
            depart: None,
            scratchpad: [0; 4],
            payload: None,
            callback: None,
        }
    }

    /// Plain request at a flat address.
    pub fn new(addr: Addr, kind: OpKind) -> Self {
        Self {
            addr,
            ..Self::blank(kind.id(), BankClass::Plain)
        }
    }

    /// Plain request addressed by hierarchy instead of a flat address.
    pub fn with_hierarchy(addr_h: AddrHierarchy, kind: OpKind) -> Self {
        Self {
            addr_h: Some(addr_h),
            ..Self::blank(kind.id(), BankClass::Plain)
        }
    }

    /// Plain request from an external source that wants to hear back on completion.
    pub fn with_callback(addr: Addr, kind: OpKind, source_id: i32, callback: Callback) -> Self {
        Self {
            addr,
            source_id,
            callback: Some(callback),
            ..Self::blank(kind.id(), BankClass::Plain)
        }
    }

    /// Address-less compute template tagged with the bank class of `kind`.  Kinds that are not
    /// compute operations yield a non-compute request.
    pub fn compute(kind: OpKind) -> Self {
        Self::blank(kind.id(), kind.bank_class())
    }

    /// Plain request carrying a numeric operation id as given, known or not.
    pub fn raw(addr: Addr, type_id: i32) -> Self {
        Self {
            addr,
            ..Self::blank(type_id, BankClass::Plain)
        }
    }

    /// Copy of this request retargeted at `addr`.
    pub fn with_addr(&self, addr: Addr) -> Self {
        Self {
            addr,
            ..self.clone()
        }
    }

    pub fn on_complete(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// `None` when the request was built from an id outside the taxonomy.
    pub fn kind(&self) -> Option<OpKind> {
        OpKind::from_id(self.type_id)
    }

    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    pub fn is_aim(&self) -> bool {
        self.is_aim
    }

    pub fn bank_class(&self) -> BankClass {
        self.bank_class
    }

    /// Bank-count hint: -1 for non-compute, otherwise 0, 1, 4 or 16.
    pub fn num_banks(&self) -> i32 {
        self.bank_class.value()
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Fire the completion callback, if any.  Called by the memory system on retirement.
    pub fn notify_complete(&self) {
        if let Some(callback) = &self.callback {
            callback(self);
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("addr", &self.addr)
            .field("addr_h", &self.addr_h)
            .field("type_id", &self.type_id)
            .field("kind", &self.kind())
            .field("is_aim", &self.is_aim)
            .field("num_banks", &self.num_banks())
            .field("source_id", &self.source_id)
            .field("arrive", &self.arrive)
            .field("issue", &self.issue)
            .field("depart", &self.depart)
            .field("scratchpad", &self.scratchpad)
            .field("has_payload", &self.payload.is_some())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
