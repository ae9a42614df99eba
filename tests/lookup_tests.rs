mod common;

use std::io::Write;
use std::time::Duration;

use common::{Behavior, MockNameserver, nsec3param};
use nsec3hash::dns::enums::DNSResourceType;
use nsec3hash::error::Protocol;
use nsec3hash::{ConfigError, HashParameters, HashRequest, Nsec3Error, Nsec3HashConfig, hash_name};

const EXPECTED: &str = "RI72U906MVE1UTFJ44UVJULNHGT4GFF1";

fn discover(domain: &str) -> HashRequest {
    HashRequest {
        domain: domain.to_string(),
        parameters: None,
        nameserver: Some("@127.0.0.1".to_string()),
    }
}

#[tokio::test]
async fn test_parameters_discovered_over_udp() {
    let server = MockNameserver::start(
        Behavior {
            answers: vec![nsec3param("example.com.", 1, 3, &[0xAB, 0xCD])],
            ..Default::default()
        },
        Behavior::default(),
    )
    .await;

    let hash = hash_name(&discover("WWW.Example.COM"), &server.config())
        .await
        .unwrap();

    assert_eq!(hash, EXPECTED);
    assert_eq!(server.udp_count(), 1);
    assert_eq!(server.tcp_count(), 0);

    let seen = server.seen.lock().unwrap();
    let question = &seen[0].questions[0];
    assert_eq!(question.labels, vec!["Example", "COM", ""]);
    assert_eq!(question.qtype, DNSResourceType::NSEC3PARAM);
    assert!(seen[0].header.rd);
    assert!(seen[0].dnssec_requested());
}

#[tokio::test]
async fn test_truncated_reply_falls_back_to_tcp() {
    let server = MockNameserver::start(
        Behavior {
            truncated: true,
            ..Default::default()
        },
        Behavior {
            answers: vec![nsec3param("example.com.", 1, 3, &[0xAB, 0xCD])],
            ..Default::default()
        },
    )
    .await;

    let hash = hash_name(&discover("www.example.com"), &server.config())
        .await
        .unwrap();

    assert_eq!(hash, EXPECTED);
    assert_eq!(server.udp_count(), 1);
    assert_eq!(server.tcp_count(), 1);

    // The TCP retry repeats the identical question and id
    let seen = server.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].header.id, seen[1].header.id);
    assert_eq!(seen[0].questions, seen[1].questions);
}

#[tokio::test]
async fn test_truncated_tcp_reply_is_not_retried() {
    let server = MockNameserver::start(
        Behavior {
            truncated: true,
            ..Default::default()
        },
        Behavior {
            truncated: true,
            ..Default::default()
        },
    )
    .await;

    let err = hash_name(&discover("www.example.com"), &server.config())
        .await
        .unwrap_err();

    assert_eq!(err, Nsec3Error::NoNsec3Param("example.com.".to_string()));
    assert_eq!(server.udp_count(), 1);
    assert_eq!(server.tcp_count(), 1);
}

#[tokio::test]
async fn test_missing_nsec3param() {
    let server = MockNameserver::start(Behavior::default(), Behavior::default()).await;

    let err = hash_name(&discover("www.example.com"), &server.config())
        .await
        .unwrap_err();

    assert_eq!(err, Nsec3Error::NoNsec3Param("example.com.".to_string()));
    assert_eq!(err.to_string(), "No NSEC3PARAM Record for 'example.com.'");
}

#[tokio::test]
async fn test_id_mismatch_aborts() {
    let server = MockNameserver::start(
        Behavior {
            id_offset: 1,
            truncated: true,
            ..Default::default()
        },
        Behavior {
            answers: vec![nsec3param("example.com.", 1, 3, &[0xAB, 0xCD])],
            ..Default::default()
        },
    )
    .await;

    let err = hash_name(&discover("www.example.com"), &server.config())
        .await
        .unwrap_err();

    assert!(matches!(err, Nsec3Error::IdentityMismatch { .. }));
    assert_eq!(server.tcp_count(), 0);
}

#[tokio::test]
async fn test_discovered_unsupported_algorithm() {
    let server = MockNameserver::start(
        Behavior {
            answers: vec![nsec3param("example.com.", 2, 0, &[])],
            ..Default::default()
        },
        Behavior::default(),
    )
    .await;

    let err = hash_name(&discover("www.example.com"), &server.config())
        .await
        .unwrap_err();
    assert_eq!(err, Nsec3Error::UnsupportedAlgorithm(2));
}

#[tokio::test]
async fn test_udp_timeout() {
    let server = MockNameserver::start(
        Behavior {
            silent: true,
            ..Default::default()
        },
        Behavior::default(),
    )
    .await;
    let config = Nsec3HashConfig {
        timeout: Duration::from_millis(200),
        ..server.config()
    };

    let err = hash_name(&discover("www.example.com"), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, Nsec3Error::Transport { protocol: Protocol::Udp, .. }));
    assert_eq!(server.tcp_count(), 0);
}

#[tokio::test]
async fn test_nameserver_from_resolv_conf() {
    let server = MockNameserver::start(
        Behavior {
            answers: vec![nsec3param("example.com.", 1, 3, &[0xAB, 0xCD])],
            ..Default::default()
        },
        Behavior::default(),
    )
    .await;

    let mut resolv_conf = tempfile::NamedTempFile::new().unwrap();
    writeln!(resolv_conf, "# test\nsearch example.net\nnameserver 127.0.0.1").unwrap();
    let config = Nsec3HashConfig {
        resolv_conf: resolv_conf.path().to_path_buf(),
        ..server.config()
    };

    let request = HashRequest {
        domain: "www.example.com".to_string(),
        ..Default::default()
    };
    assert_eq!(hash_name(&request, &config).await.unwrap(), EXPECTED);
}

#[tokio::test]
async fn test_missing_resolv_conf() {
    let config = Nsec3HashConfig {
        resolv_conf: "/nonexistent/resolv.conf".into(),
        ..Default::default()
    };
    let request = HashRequest {
        domain: "www.example.com".to_string(),
        ..Default::default()
    };

    let err = hash_name(&request, &config).await.unwrap_err();
    assert!(matches!(err, Nsec3Error::Config(ConfigError::ResolvConf { .. })));
}

#[tokio::test]
async fn test_explicit_parameters_skip_the_network() {
    // Nothing listens here; a lookup would fail
    let config = Nsec3HashConfig {
        resolv_conf: "/nonexistent/resolv.conf".into(),
        ..Default::default()
    };
    let request = HashRequest {
        domain: "WWW.Example.COM".to_string(),
        parameters: Some(HashParameters::from_presentation("ABCD", 1, 3).unwrap()),
        nameserver: None,
    };

    assert_eq!(hash_name(&request, &config).await.unwrap(), EXPECTED);
    // Stable across runs
    assert_eq!(hash_name(&request, &config).await.unwrap(), EXPECTED);
}

#[tokio::test]
async fn test_explicit_unsupported_algorithm() {
    let request = HashRequest {
        domain: "example.".to_string(),
        parameters: Some(HashParameters::new(3, 0, vec![])),
        nameserver: None,
    };
    let err = hash_name(&request, &Nsec3HashConfig::default()).await.unwrap_err();
    assert_eq!(err, Nsec3Error::UnsupportedAlgorithm(3));
    assert_eq!(err.to_string(), "Unknown hash algorithm: 3");
}

#[tokio::test]
async fn test_root_has_no_parent() {
    let request = HashRequest {
        domain: "...".to_string(),
        nameserver: Some("127.0.0.1".to_string()),
        ..Default::default()
    };
    let err = hash_name(&request, &Nsec3HashConfig::default()).await.unwrap_err();
    assert!(matches!(err, Nsec3Error::InvalidName(_)));
}
