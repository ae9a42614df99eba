//! Loopback nameserver used by the integration tests.

#![allow(dead_code)] // Not every test file uses every helper

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nsec3hash::Nsec3HashConfig;
use nsec3hash::dns::{DNSPacket, rdata::Nsec3ParamData, resource::DNSResource};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

/// How the mock answers on one transport.
#[derive(Clone, Debug, Default)]
pub struct Behavior {
    pub answers: Vec<DNSResource>,
    pub truncated: bool,
    /// Added to the query id in the reply
    pub id_offset: u16,
    /// Swallow the query and never answer
    pub silent: bool,
}

pub struct MockNameserver {
    pub addr: SocketAddr,
    pub udp_queries: Arc<AtomicUsize>,
    pub tcp_queries: Arc<AtomicUsize>,
    /// Every query received, in order
    pub seen: Arc<Mutex<Vec<DNSPacket>>>,
}

impl MockNameserver {
    pub async fn start(udp: Behavior, tcp: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let socket = UdpSocket::bind(addr).await.unwrap();

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        {
            let counter = udp_queries.clone();
            let seen = seen.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                loop {
                    let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                        return;
                    };
                    counter.fetch_add(1, Ordering::SeqCst);
                    let query = DNSPacket::parse(&buf[..len]).unwrap();
                    seen.lock().unwrap().push(query.clone());
                    if udp.silent {
                        continue;
                    }
                    let reply = build_reply(&query, &udp);
                    let _ = socket.send_to(&reply, peer).await;
                }
            });
        }

        {
            let counter = tcp_queries.clone();
            let seen = seen.clone();
            tokio::spawn(async move {
                loop {
                    let Ok((mut stream, _)) = listener.accept().await else {
                        return;
                    };
                    counter.fetch_add(1, Ordering::SeqCst);
                    let mut len = [0u8; 2];
                    stream.read_exact(&mut len).await.unwrap();
                    let mut msg = vec![0u8; u16::from_be_bytes(len) as usize];
                    stream.read_exact(&mut msg).await.unwrap();
                    let query = DNSPacket::parse(&msg).unwrap();
                    seen.lock().unwrap().push(query.clone());
                    if tcp.silent {
                        continue;
                    }
                    let reply = build_reply(&query, &tcp);
                    stream.write_all(&(reply.len() as u16).to_be_bytes()).await.unwrap();
                    stream.write_all(&reply).await.unwrap();
                }
            });
        }

        Self {
            addr,
            udp_queries,
            tcp_queries,
            seen,
        }
    }

    pub fn udp_count(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_count(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    /// Config pointing at this server through an `@127.0.0.1` nameserver.
    pub fn config(&self) -> Nsec3HashConfig {
        Nsec3HashConfig {
            port: self.addr.port(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        }
    }
}

fn build_reply(query: &DNSPacket, behavior: &Behavior) -> Vec<u8> {
    let mut reply = DNSPacket {
        header: query.header.clone(),
        questions: query.questions.clone(),
        answers: behavior.answers.clone(),
        ..Default::default()
    };
    reply.header.id = query.header.id.wrapping_add(behavior.id_offset);
    reply.header.qr = true;
    reply.header.ra = true;
    reply.header.tc = behavior.truncated;
    reply.add_edns(4096, true);
    reply.serialize().unwrap()
}

pub fn nsec3param(zone: &str, algorithm: u8, iterations: u16, salt: &[u8]) -> DNSResource {
    let labels = zone.split('.').map(|s| s.to_string()).collect();
    DNSResource::nsec3param(
        labels,
        3600,
        &Nsec3ParamData {
            algorithm,
            flags: 0,
            iterations,
            salt: salt.to_vec(),
        },
    )
}
