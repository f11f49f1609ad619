//! hickory-server request handler for the views.
//!
//! [`ViewsHandler`] sits in front of another [`RequestHandler`]. Queries the
//! views can answer get an authoritative single-record response; everything
//! else, including malformed requests, is passed to the next handler as is.

use async_trait::async_trait;
use hickory_proto::op::{Header, OpCode, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, TXT};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::records::RecordKind;
use crate::resolver::{Answer, Resolution};
use crate::snapshot::ResolverState;

/// Longest character-string a TXT record can carry.
const TXT_CHUNK_LEN: usize = 255;

/// Answers from the views, delegating declined queries to `next`.
pub struct ViewsHandler<N> {
    state: Arc<ResolverState>,
    next: N,
}

impl<N: RequestHandler> ViewsHandler<N> {
    pub fn new(state: Arc<ResolverState>, next: N) -> Self {
        Self { state, next }
    }

    /// Build the answer record for `request`, if the views handle it.
    fn answer_record(&self, request: &Request) -> Option<Record> {
        let info = request.request_info().ok()?;
        if info.header.op_code() != OpCode::Query {
            return None;
        }

        let query = info.query;
        if query.query_class() != DNSClass::IN {
            return None;
        }

        let client = request.src().ip();
        let name = query.name().to_string();
        let kind = record_kind(query.query_type());
        let Resolution::Answered(answer) = self.state.resolve(client, &name, kind) else {
            return None;
        };

        debug!(client = %client, name = %name, kind = %answer.kind, "answering from view");
        to_record(Name::from(query.name()), &answer)
    }
}

#[async_trait]
impl<N: RequestHandler> RequestHandler for ViewsHandler<N> {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let Some(record) = self.answer_record(request) else {
            return self.next.handle_request(request, response_handle).await;
        };

        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);

        let answers = [record];
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(
            header,
            answers.iter(),
            std::iter::empty(),
            std::iter::empty(),
            std::iter::empty(),
        );

        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "failed to send view answer");
                let mut header = Header::response_from_request(request.header());
                header.set_response_code(ResponseCode::ServFail);
                ResponseInfo::from(header)
            }
        }
    }
}

/// Map a wire query type onto the kinds a view can serve.
pub const fn record_kind(record_type: RecordType) -> RecordKind {
    match record_type {
        RecordType::A => RecordKind::A,
        RecordType::AAAA => RecordKind::Aaaa,
        RecordType::CNAME => RecordKind::Cname,
        RecordType::TXT => RecordKind::Txt,
        _ => RecordKind::Unknown,
    }
}

/// Render an answer as a resource record owned by `owner`.
///
/// Returns `None` (with a warning) when the stored value cannot be encoded,
/// so the query falls through to the next handler.
pub fn to_record(owner: Name, answer: &Answer) -> Option<Record> {
    let rdata = match answer.kind {
        RecordKind::A => answer.value.parse::<Ipv4Addr>().ok().map(|ip| RData::A(A::from(ip))),
        RecordKind::Aaaa => answer
            .value
            .parse::<Ipv6Addr>()
            .ok()
            .map(|ip| RData::AAAA(AAAA::from(ip))),
        RecordKind::Cname => Name::from_ascii(&answer.value)
            .ok()
            .map(|target| RData::CNAME(CNAME(target))),
        RecordKind::Txt => Some(RData::TXT(TXT::new(txt_chunks(&answer.value)))),
        RecordKind::Unknown => None,
    };

    let Some(rdata) = rdata else {
        warn!(name = %answer.name, kind = %answer.kind, value = %answer.value, "view record value cannot be encoded");
        return None;
    };

    Some(Record::from_rdata(owner, answer.ttl, rdata))
}

/// Split a TXT value into character-strings of at most 255 bytes.
fn txt_chunks(value: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for c in value.chars() {
        if current.len() + c.len_utf8() > TXT_CHUNK_LEN {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}
