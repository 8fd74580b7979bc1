use crate::aim::addr_mapper::AddressTranslator;
use crate::aim::request::Request;
use crate::aim::trace::{Trace, TraceFields};

/// Turn one trace record into the batch of requests that must be submitted together.
///
/// Plain reads/writes map to a single request.  Compute records are translated into per-bank
/// addresses and every request is cloned from one template, so kind and bank class are shared
/// and only the address differs.
pub fn expand<T>(trace: &Trace, translator: &T) -> Vec<Request>
where
    T: AddressTranslator + ?Sized,
{
    if let TraceFields::Plain { addr } = trace.fields() {
        return vec![Request::new(*addr, trace.kind())];
    }

    let class = trace.bank_class();
    let addrs = translator.translate(trace);
    assert_eq!(
        addrs.len(),
        class.expansion_len(),
        "translator returned {} addresses for {} (bank class {})",
        addrs.len(),
        trace.kind(),
        class.value()
    );

    let template = Request::compute(trace.kind());
    addrs.into_iter().map(|addr| template.with_addr(addr)).collect()
}
