//! A single DNSSEC-aware question/answer exchange with a nameserver.
//!
//! The query goes out over UDP first. A truncated reply is retried exactly
//! once over TCP and whatever TCP returns is final:
//!
//! ```text
//! Idle -> UdpSent -> Received
//!                 -> Truncated -> TcpSent -> Received
//! (any step may end in Failed)
//! ```

use std::net::SocketAddr;

use tracing::{debug, trace, warn};

use crate::config::Nsec3HashConfig;
use crate::dns::{
    DNSPacket,
    enums::{DNSResourceClass, DNSResourceType, ResponseCode},
    header::DNSHeader,
    question::DNSQuestion,
    resource::DNSResource,
};
use crate::error::{Nsec3Error, Result};
use crate::name::DomainName;
use crate::transport::{DnsTransport, TcpTransport, UdpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    UdpSent,
    Truncated,
    TcpSent,
    Received,
    Failed,
}

impl TransactionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionState::Received | TransactionState::Failed)
    }
}

/// One outbound query and the identifier its reply must carry.
#[derive(Debug)]
pub struct QueryTransaction {
    id: u16,
    query: DNSPacket,
    state: TransactionState,
    /// Every state entered after `Idle`, in order
    transitions: Vec<TransactionState>,
}

impl QueryTransaction {
    pub fn new(id: u16, qname: &DomainName, qtype: DNSResourceType, udp_payload_size: u16) -> Result<Self> {
        // Rejects over-long names before anything is sent
        qname.to_canonical_wire()?;

        let mut query = DNSPacket {
            header: DNSHeader {
                id,
                opcode: 0,
                rd: true,
                qdcount: 1,
                ..Default::default()
            },
            questions: vec![DNSQuestion {
                labels: qname.to_wire_labels(),
                qtype,
                qclass: DNSResourceClass::IN,
            }],
            ..Default::default()
        };
        query.add_edns(udp_payload_size, true);

        Ok(Self {
            id,
            query,
            state: TransactionState::Idle,
            transitions: Vec::new(),
        })
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn query(&self) -> &DNSPacket {
        &self.query
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn transitions(&self) -> &[TransactionState] {
        &self.transitions
    }

    /// Drive the transaction to a terminal state and return the reply used.
    ///
    /// # Panics
    ///
    /// If the transaction has already been run.
    pub async fn run(
        &mut self,
        udp: &dyn DnsTransport,
        tcp: &dyn DnsTransport,
        server: SocketAddr,
    ) -> Result<DNSPacket> {
        let query_bytes = self.query.serialize()?;
        trace!("Query {} serialized to {} bytes", self.id, query_bytes.len());

        let result = self.advance(udp, tcp, &query_bytes, server).await;
        if let Err(e) = &result {
            debug!("Transaction {} failed in state {:?}: {}", self.id, self.state, e);
            self.transition(TransactionState::Failed);
        }
        result
    }

    async fn advance(
        &mut self,
        udp: &dyn DnsTransport,
        tcp: &dyn DnsTransport,
        query_bytes: &[u8],
        server: SocketAddr,
    ) -> Result<DNSPacket> {
        loop {
            match self.state {
                TransactionState::Idle => {
                    self.transition(TransactionState::UdpSent);
                    let reply = self.attempt(udp, query_bytes, server).await?;
                    if !reply.header.tc {
                        self.transition(TransactionState::Received);
                        return Ok(reply);
                    }
                    debug!("UDP response truncated, retrying with TCP");
                    self.transition(TransactionState::Truncated);
                }
                TransactionState::Truncated => {
                    self.transition(TransactionState::TcpSent);
                    let reply = self.attempt(tcp, query_bytes, server).await?;
                    if reply.header.tc {
                        warn!("TCP response from {} is also truncated, using it as is", server);
                    }
                    self.transition(TransactionState::Received);
                    return Ok(reply);
                }
                state => panic!("transaction {} already ran and ended {:?}", self.id, state),
            }
        }
    }

    async fn attempt(
        &self,
        transport: &dyn DnsTransport,
        query_bytes: &[u8],
        server: SocketAddr,
    ) -> Result<DNSPacket> {
        let raw = transport.send(query_bytes, server).await?;

        // Checked on the raw bytes so stray garbage is not reported as a parse error
        if raw.len() >= 2 {
            let received = u16::from_be_bytes([raw[0], raw[1]]);
            if received != self.id {
                warn!("Id mismatch from {}: sent {}, received {}", server, self.id, received);
                return Err(Nsec3Error::IdentityMismatch {
                    sent: self.id,
                    received,
                });
            }
        }

        let reply = DNSPacket::parse(&raw).map_err(|e| {
            debug!("Failed to parse {} response from {}: {}", transport.protocol(), server, e);
            Nsec3Error::from(e)
        })?;

        log_response_details(&reply, raw.len(), transport);
        Ok(reply)
    }

    fn transition(&mut self, next: TransactionState) {
        trace!("Transaction {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
        self.transitions.push(next);
    }
}

fn log_response_details(response: &DNSPacket, response_len: usize, transport: &dyn DnsTransport) {
    debug!(
        "Parsed {} response: {} bytes, answers={}, authorities={}, additional={}, tc={}",
        transport.protocol(),
        response_len,
        response.answers.len(),
        response.authorities.len(),
        response.resources.len(),
        response.header.tc
    );

    let rcode = ResponseCode::from_u8(response.header.rcode);
    if rcode != ResponseCode::NoError {
        warn!("Nameserver answered with {:?}", rcode);
    }

    for (i, answer) in response.answers.iter().enumerate() {
        trace!(
            "Answer {}: type={:?}, class={:?}, ttl={}, rdlength={}",
            i, answer.rtype, answer.rclass, answer.ttl, answer.rdlength
        );
    }
}

/// Sends DNSSEC-OK queries, one transaction at a time.
pub struct DnssecClient {
    config: Nsec3HashConfig,
    udp: Box<dyn DnsTransport>,
    tcp: Box<dyn DnsTransport>,
}

impl DnssecClient {
    pub fn new(config: Nsec3HashConfig) -> Self {
        let udp = UdpTransport::new(config.timeout, config.udp_payload_size);
        let tcp = TcpTransport::new(config.timeout);
        Self::with_transports(config, udp, tcp)
    }

    pub fn with_transports(
        config: Nsec3HashConfig,
        udp: impl DnsTransport + 'static,
        tcp: impl DnsTransport + 'static,
    ) -> Self {
        Self {
            config,
            udp: Box::new(udp),
            tcp: Box::new(tcp),
        }
    }

    /// Ask `server` for `qname`/`qtype` and return the answer section.
    pub async fn exchange(
        &self,
        server: SocketAddr,
        qname: &DomainName,
        qtype: DNSResourceType,
    ) -> Result<Vec<DNSResource>> {
        let mut transaction = QueryTransaction::new(
            rand::random::<u16>(),
            qname,
            qtype,
            self.config.udp_payload_size,
        )?;
        debug!(
            "Querying {} for {} {:?} (id {})",
            server,
            qname,
            qtype,
            transaction.id()
        );

        let response = transaction.run(&*self.udp, &*self.tcp, server).await?;
        Ok(response.answers)
    }
}
