//! # brokerform-types: Descriptor model for `Brokerform`
//!
//! This crate contains the in-memory representation of a broker descriptor,
//! the declarative document that configures a message-broker deployment:
//! - Identity ([`Identity`])
//! - Network entry points ([`Endpoint`], [`EndpointRole`], [`FactoryKind`])
//! - Management console ([`Console`], [`ExposeMode`])
//! - Certificate automation records ([`CertTemplate`])
//! - The root document ([`Descriptor`])
//!
//! Types here carry data only. Every edit goes through the transition engine
//! in `brokerform-kernel`, which keeps the denormalized views consistent.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub mod text;

pub use text::{TextError, TextFormat};

// ============================================================================
// Endpoint Roles
// ============================================================================

/// Which collection an endpoint lives in.
///
/// Acceptors and connectors are independent namespaces: names and ports are
/// only unique within one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointRole {
    /// Inbound entry point.
    Acceptor,
    /// Outbound entry point.
    Connector,
}

impl EndpointRole {
    /// Both roles, in document order.
    pub const ALL: [EndpointRole; 2] = [EndpointRole::Acceptor, EndpointRole::Connector];

    /// Key prefix used for this role's entries in `rawProperties`.
    pub fn properties_prefix(self) -> &'static str {
        match self {
            EndpointRole::Acceptor => "acceptorConfigurations",
            EndpointRole::Connector => "connectorConfigurations",
        }
    }

    /// Prefix for freshly allocated endpoint names (`acceptors0`, `connectors3`).
    pub fn name_prefix(self) -> &'static str {
        match self {
            EndpointRole::Acceptor => "acceptors",
            EndpointRole::Connector => "connectors",
        }
    }

    /// Fully qualified factory class for this role and factory kind.
    pub fn factory_class_name(self, kind: FactoryKind) -> &'static str {
        match (self, kind) {
            (EndpointRole::Acceptor, FactoryKind::Network) => {
                "org.apache.activemq.artemis.core.remoting.impl.netty.NettyAcceptorFactory"
            }
            (EndpointRole::Acceptor, FactoryKind::InProcess) => {
                "org.apache.activemq.artemis.core.remoting.impl.invm.InVMAcceptorFactory"
            }
            (EndpointRole::Connector, FactoryKind::Network) => {
                "org.apache.activemq.artemis.core.remoting.impl.netty.NettyConnectorFactory"
            }
            (EndpointRole::Connector, FactoryKind::InProcess) => {
                "org.apache.activemq.artemis.core.remoting.impl.invm.InVMConnectorFactory"
            }
        }
    }
}

impl Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRole::Acceptor => write!(f, "acceptor"),
            EndpointRole::Connector => write!(f, "connector"),
        }
    }
}

/// Transport implementation behind an endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum FactoryKind {
    /// TCP transport. `host` is only meaningful for this kind.
    #[default]
    Network,
    /// Transport within the broker's own process.
    InProcess,
}

impl FactoryKind {
    /// Recognizes a factory class name for the given role.
    ///
    /// Anything other than the role's in-process class resolves to
    /// [`FactoryKind::Network`].
    pub fn from_class_name(role: EndpointRole, class_name: &str) -> Self {
        if class_name == role.factory_class_name(FactoryKind::InProcess) {
            FactoryKind::InProcess
        } else {
            FactoryKind::Network
        }
    }
}

/// How an endpoint or the console is published outside the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposeMode {
    Route,
    Ingress,
}

impl Display for ExposeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExposeMode::Route => write!(f, "route"),
            ExposeMode::Ingress => write!(f, "ingress"),
        }
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// An acceptor or connector.
///
/// `factory` and `other_params` are the authoritative structured view of the
/// endpoint's `rawProperties` entries. They are not part of the wire document
/// and are rebuilt from `rawProperties` when a descriptor is hydrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoint {
    pub name: String,
    pub port: u32,
    pub protocols: String,
    /// Connectors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_to_all_interfaces: Option<bool>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ssl_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need_client_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub want_client_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expose: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expose_mode: Option<ExposeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_host: Option<String>,
    #[serde(skip)]
    pub factory: FactoryKind,
    #[serde(skip)]
    pub other_params: BTreeMap<String, String>,
}

impl Endpoint {
    /// Creates a default endpoint for the given role.
    ///
    /// Connectors start pointing at `localhost`; acceptors carry no host.
    pub fn new(role: EndpointRole, name: impl Into<String>, port: u32) -> Self {
        Self {
            name: name.into(),
            port,
            protocols: "ALL".to_string(),
            host: match role {
                EndpointRole::Acceptor => None,
                EndpointRole::Connector => Some("localhost".to_string()),
            },
            ..Self::default()
        }
    }

    /// Disables SSL and removes every SSL-dependent field.
    pub fn clear_ssl(&mut self) {
        self.ssl_enabled = false;
        self.ssl_secret = None;
        self.clear_trust();
    }

    /// Removes the trust secret and the client-auth flags that depend on it.
    pub fn clear_trust(&mut self) {
        self.trust_secret = None;
        self.need_client_auth = None;
        self.want_client_auth = None;
    }

    /// Removes the expose bundle set by certificate automation.
    pub fn clear_exposure(&mut self) {
        self.expose = None;
        self.expose_mode = None;
        self.ingress_host = None;
    }

    /// Returns true if any SSL-dependent field is populated.
    pub fn has_ssl_fields(&self) -> bool {
        self.ssl_secret.is_some()
            || self.trust_secret.is_some()
            || self.need_client_auth.is_some()
            || self.want_client_auth.is_some()
    }
}

// ============================================================================
// Console
// ============================================================================

/// The management console, configured like an endpoint but singular.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Console {
    pub expose: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expose_mode: Option<ExposeMode>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ssl_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_client_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
}

impl Default for Console {
    fn default() -> Self {
        Self {
            expose: true,
            expose_mode: Some(ExposeMode::Route),
            ssl_enabled: false,
            ssl_secret: None,
            trust_secret: None,
            use_client_auth: None,
            admin_user: None,
            admin_password: None,
        }
    }
}

impl Console {
    /// Disables SSL and removes every SSL-dependent field.
    pub fn clear_ssl(&mut self) {
        self.ssl_enabled = false;
        self.ssl_secret = None;
        self.trust_secret = None;
        self.use_client_auth = None;
    }
}

// ============================================================================
// Certificate Templates
// ============================================================================

/// Generated sub-resource that automates TLS issuance for one acceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CertTemplate {
    pub selector_name: String,
    pub issuer_name: String,
    /// One host per replica ordinal.
    pub tls_hosts: Vec<String>,
    /// Mirrors the owning acceptor's `ssl_secret`.
    pub secret_name: String,
}

// ============================================================================
// Descriptor
// ============================================================================

/// Name and namespace of the broker deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub namespace: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// The root broker descriptor.
///
/// Missing collections deserialize as empty, and a missing `certTemplates`
/// stays absent. An empty descriptor is the new-broker default: one
/// replica, console exposed, no endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Descriptor {
    pub identity: Identity,
    pub replica_count: u32,
    pub ingress_domain: String,
    pub acceptors: Vec<Endpoint>,
    pub connectors: Vec<Endpoint>,
    pub console: Console,
    pub raw_properties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_templates: Option<Vec<CertTemplate>>,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            replica_count: 1,
            ingress_domain: String::new(),
            acceptors: Vec::new(),
            connectors: Vec::new(),
            console: Console::default(),
            raw_properties: Vec::new(),
            cert_templates: None,
        }
    }
}

impl Descriptor {
    /// Creates an empty new-broker descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty descriptor with the given identity.
    pub fn with_identity(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            identity: Identity::new(name, namespace),
            ..Self::default()
        }
    }

    pub fn broker_name(&self) -> &str {
        &self.identity.name
    }

    pub fn namespace(&self) -> &str {
        &self.identity.namespace
    }

    /// Returns the endpoints of one role, in document order.
    pub fn endpoints(&self, role: EndpointRole) -> &[Endpoint] {
        match role {
            EndpointRole::Acceptor => &self.acceptors,
            EndpointRole::Connector => &self.connectors,
        }
    }

    pub fn endpoints_mut(&mut self, role: EndpointRole) -> &mut Vec<Endpoint> {
        match role {
            EndpointRole::Acceptor => &mut self.acceptors,
            EndpointRole::Connector => &mut self.connectors,
        }
    }

    /// Returns the endpoint with the given name, if it exists.
    pub fn endpoint(&self, role: EndpointRole, name: &str) -> Option<&Endpoint> {
        self.endpoints(role).iter().find(|e| e.name == name)
    }

    pub fn endpoint_mut(&mut self, role: EndpointRole, name: &str) -> Option<&mut Endpoint> {
        self.endpoints_mut(role).iter_mut().find(|e| e.name == name)
    }

    /// Returns true if an endpoint with the given name exists in `role`.
    pub fn endpoint_exists(&self, role: EndpointRole, name: &str) -> bool {
        self.endpoint(role, name).is_some()
    }

    /// Names currently taken in one role.
    pub fn endpoint_names(&self, role: EndpointRole) -> BTreeSet<&str> {
        self.endpoints(role).iter().map(|e| e.name.as_str()).collect()
    }

    /// Ports currently taken in one role.
    pub fn endpoint_ports(&self, role: EndpointRole) -> BTreeSet<u32> {
        self.endpoints(role).iter().map(|e| e.port).collect()
    }

    /// Certificate templates, treating an absent collection as empty.
    pub fn cert_templates(&self) -> &[CertTemplate] {
        self.cert_templates.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn new_descriptor_has_new_broker_defaults() {
        let descriptor = Descriptor::new();

        assert_eq!(descriptor.replica_count, 1);
        assert!(descriptor.console.expose);
        assert!(descriptor.acceptors.is_empty());
        assert!(descriptor.connectors.is_empty());
        assert!(descriptor.cert_templates.is_none());
        assert!(descriptor.cert_templates().is_empty());
    }

    #[test_case(EndpointRole::Acceptor, "acceptorConfigurations", "acceptors"; "acceptor")]
    #[test_case(EndpointRole::Connector, "connectorConfigurations", "connectors"; "connector")]
    fn role_prefixes(role: EndpointRole, properties: &str, names: &str) {
        assert_eq!(role.properties_prefix(), properties);
        assert_eq!(role.name_prefix(), names);
    }

    #[test_case(EndpointRole::Acceptor, FactoryKind::Network; "acceptor network")]
    #[test_case(EndpointRole::Acceptor, FactoryKind::InProcess; "acceptor in process")]
    #[test_case(EndpointRole::Connector, FactoryKind::Network; "connector network")]
    #[test_case(EndpointRole::Connector, FactoryKind::InProcess; "connector in process")]
    fn factory_class_names_resolve_back(role: EndpointRole, kind: FactoryKind) {
        let class = role.factory_class_name(kind);
        assert_eq!(FactoryKind::from_class_name(role, class), kind);
    }

    #[test]
    fn unknown_factory_class_is_network() {
        assert_eq!(
            FactoryKind::from_class_name(EndpointRole::Acceptor, "com.example.CustomFactory"),
            FactoryKind::Network
        );
    }

    #[test]
    fn new_connector_points_at_localhost() {
        let connector = Endpoint::new(EndpointRole::Connector, "connectors0", 5555);
        let acceptor = Endpoint::new(EndpointRole::Acceptor, "acceptors0", 5555);

        assert_eq!(connector.host.as_deref(), Some("localhost"));
        assert_eq!(connector.protocols, "ALL");
        assert!(acceptor.host.is_none());
    }

    #[test]
    fn clear_ssl_removes_dependent_fields() {
        let mut endpoint = Endpoint {
            ssl_enabled: true,
            ssl_secret: Some("tls".to_string()),
            trust_secret: Some("ca".to_string()),
            need_client_auth: Some(true),
            want_client_auth: Some(false),
            ..Endpoint::new(EndpointRole::Acceptor, "a", 1)
        };

        endpoint.clear_ssl();

        assert!(!endpoint.ssl_enabled);
        assert!(!endpoint.has_ssl_fields());
    }

    #[test]
    fn endpoint_lookup_is_per_role() {
        let mut descriptor = Descriptor::new();
        descriptor
            .acceptors
            .push(Endpoint::new(EndpointRole::Acceptor, "shared", 5555));

        assert!(descriptor.endpoint_exists(EndpointRole::Acceptor, "shared"));
        assert!(!descriptor.endpoint_exists(EndpointRole::Connector, "shared"));
        assert_eq!(
            descriptor.endpoint_ports(EndpointRole::Acceptor),
            BTreeSet::from([5555])
        );
        assert!(descriptor.endpoint_ports(EndpointRole::Connector).is_empty());
    }
}
