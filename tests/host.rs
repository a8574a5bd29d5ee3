use std::path::Path;

use drone_stack::Host;
use drone_stack::error::DeployError;
use drone_stack::host::{SshTarget, Transport};

#[test]
fn empty_is_local() {
    assert_eq!(Transport::parse("").unwrap(), Transport::Local);
    assert_eq!(Transport::parse("  ").unwrap(), Transport::Local);
}

#[test]
fn tcp_host() {
    let transport = Transport::parse("tcp://swarm.example.com:2376").unwrap();

    assert_eq!(
        transport,
        Transport::Tcp("tcp://swarm.example.com:2376".into())
    );
}

#[test]
fn tcp_without_hostname_is_rejected() {
    let err = Transport::parse("tcp://").unwrap_err();

    assert!(matches!(err, DeployError::Configuration(_)));
}

#[test]
fn ssh_host_with_user_and_port() {
    let transport = Transport::parse("ssh://deploy@swarm.example.com:2222").unwrap();

    assert_eq!(
        transport,
        Transport::Ssh(SshTarget {
            hostname: "swarm.example.com".into(),
            user: Some("deploy".into()),
            port: Some(2222),
        })
    );
}

#[test]
fn ssh_host_bare() {
    let transport = Transport::parse("ssh://10.1.2.3").unwrap();

    assert_eq!(
        transport,
        Transport::Ssh(SshTarget {
            hostname: "10.1.2.3".into(),
            user: None,
            port: None,
        })
    );
}

#[test]
fn ssh_malformed_port_is_rejected() {
    let err = Transport::parse("ssh://host:notaport").unwrap_err();

    assert!(matches!(err, DeployError::Configuration(_)));
}

#[test]
fn other_scheme_passes_through() {
    let transport = Transport::parse("unix:///var/run/docker.sock").unwrap();

    assert_eq!(
        transport,
        Transport::Other("unix:///var/run/docker.sock".into())
    );
}

#[test]
fn env_for_tls_verify() {
    let host = Host::new("tcp://h:2376").tls().tls_verify();
    let transport = Transport::parse(&host.uri).unwrap();

    let env = transport.docker_env(&host, Some(Path::new("/root/.docker/certs")));

    assert_eq!(env.get("DOCKER_HOST").map(String::as_str), Some("tcp://h:2376"));
    assert_eq!(
        env.get("DOCKER_CERT_PATH").map(String::as_str),
        Some("/root/.docker/certs")
    );
    assert_eq!(env.get("DOCKER_TLS_VERIFY").map(String::as_str), Some("1"));
    assert!(!env.contains_key("DOCKER_TLS"));
}

#[test]
fn env_for_tls_only() {
    let host = Host::new("tcp://h:2376").tls();
    let transport = Transport::parse(&host.uri).unwrap();

    let env = transport.docker_env(&host, None);

    assert_eq!(env.get("DOCKER_TLS").map(String::as_str), Some("1"));
    assert!(!env.contains_key("DOCKER_TLS_VERIFY"));
    assert!(!env.contains_key("DOCKER_CERT_PATH"));
}

#[test]
fn env_for_ssh_uses_alias() {
    let host = Host::new("ssh://deploy@h");
    let transport = Transport::parse(&host.uri).unwrap();

    let env = transport.docker_env(&host, None);

    assert_eq!(env.get("DOCKER_HOST").map(String::as_str), Some("ssh://remote"));
    assert_eq!(env.len(), 1);
}

#[test]
fn env_for_local_is_empty() {
    let env = Transport::Local.docker_env(&Host::default(), None);

    assert!(env.is_empty());
}
