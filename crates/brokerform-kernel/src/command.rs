//! Commands accepted by the transition engine.
//!
//! The set is closed: [`crate::kernel::apply`] matches it exhaustively, and
//! decoding a command with an unknown `op` tag fails.

use std::collections::BTreeMap;

use brokerform_types::{Descriptor, EndpointRole, ExposeMode, FactoryKind};
use serde::{Deserialize, Serialize};

/// Who triggered a wholesale descriptor replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceOrigin {
    /// Remote fetch or reload. Does not dirty the form.
    System,
    /// Raw-text commit by the user. Dirties the form.
    User,
}

impl ReplaceOrigin {
    pub fn marks_changes(self) -> bool {
        matches!(self, ReplaceOrigin::User)
    }
}

/// An edit to a broker form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Command {
    // ========================================================================
    // Endpoint Lifecycle
    // ========================================================================
    /// Appends an endpoint with a fresh name and port.
    AddEndpoint { role: EndpointRole },

    /// Removes an endpoint, its properties and its certificate template.
    DeleteEndpoint { role: EndpointRole, name: String },

    /// Renames an endpoint. A name already taken in the role is refused.
    RenameEndpoint {
        role: EndpointRole,
        name: String,
        new_name: String,
    },

    // ========================================================================
    // Endpoint Settings
    // ========================================================================
    /// Sets the port. A port already taken in the role is refused.
    SetPort {
        role: EndpointRole,
        name: String,
        port: u32,
    },

    SetProtocols {
        role: EndpointRole,
        name: String,
        protocols: String,
    },

    /// Connectors only.
    SetHost {
        role: EndpointRole,
        name: String,
        host: Option<String>,
    },

    SetBindToAllInterfaces {
        role: EndpointRole,
        name: String,
        bind: bool,
    },

    SetFactory {
        role: EndpointRole,
        name: String,
        factory: FactoryKind,
    },

    /// Replaces the endpoint's other parameters.
    SetOtherParams {
        role: EndpointRole,
        name: String,
        params: BTreeMap<String, String>,
    },

    SetSslEnabled {
        role: EndpointRole,
        name: String,
        enabled: bool,
    },

    /// Sets or clears the TLS secret (`is_ca = false`) or trust secret.
    SetSecret {
        role: EndpointRole,
        name: String,
        is_ca: bool,
        secret: Option<String>,
    },

    /// Only takes effect while a trust secret is present.
    SetClientAuth {
        role: EndpointRole,
        name: String,
        need: Option<bool>,
        want: Option<bool>,
    },

    // ========================================================================
    // Console
    // ========================================================================
    SetConsoleExpose { expose: bool },

    SetConsoleExposeMode { mode: ExposeMode },

    SetConsoleSslEnabled { enabled: bool },

    SetConsoleCredentials {
        admin_user: Option<String>,
        admin_password: Option<String>,
    },

    SetConsoleSecret { is_ca: bool, secret: Option<String> },

    /// Only takes effect while a trust secret is present.
    SetConsoleClientAuth { enabled: bool },

    // ========================================================================
    // Deployment
    // ========================================================================
    /// Sets the replica count, clamped at zero.
    SetReplicaCount { count: i64 },

    IncrementReplicas,

    /// Decrements the replica count, stopping at zero.
    DecrementReplicas,

    SetBrokerName { name: String },

    SetNamespace { namespace: String },

    SetIngressDomain { domain: String },

    // ========================================================================
    // Certificate Automation
    // ========================================================================
    ActivateCertAutomation { acceptor: String, issuer: String },

    DeactivateCertAutomation { acceptor: String },

    UpdateCertIssuer { acceptor: String, issuer: String },

    // ========================================================================
    // Whole Document and Bookkeeping
    // ========================================================================
    /// Replaces the descriptor wholesale after a fetch or a raw-text commit.
    ReplaceDescriptor {
        descriptor: Box<Descriptor>,
        origin: ReplaceOrigin,
    },

    /// Records whether raw text has diverged from the structured descriptor.
    SetYamlUnsaved { unsaved: bool },

    /// Clears the dirty flags after a successful submission.
    MarkSaved,
}

impl Command {
    pub fn add_endpoint(role: EndpointRole) -> Self {
        Command::AddEndpoint { role }
    }

    pub fn delete_endpoint(role: EndpointRole, name: impl Into<String>) -> Self {
        Command::DeleteEndpoint {
            role,
            name: name.into(),
        }
    }

    pub fn rename_endpoint(
        role: EndpointRole,
        name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Command::RenameEndpoint {
            role,
            name: name.into(),
            new_name: new_name.into(),
        }
    }

    pub fn set_port(role: EndpointRole, name: impl Into<String>, port: u32) -> Self {
        Command::SetPort {
            role,
            name: name.into(),
            port,
        }
    }

    pub fn set_secret(
        role: EndpointRole,
        name: impl Into<String>,
        is_ca: bool,
        secret: Option<&str>,
    ) -> Self {
        Command::SetSecret {
            role,
            name: name.into(),
            is_ca,
            secret: secret.map(str::to_string),
        }
    }

    pub fn set_ssl_enabled(role: EndpointRole, name: impl Into<String>, enabled: bool) -> Self {
        Command::SetSslEnabled {
            role,
            name: name.into(),
            enabled,
        }
    }

    pub fn activate_cert_automation(
        acceptor: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Command::ActivateCertAutomation {
            acceptor: acceptor.into(),
            issuer: issuer.into(),
        }
    }

    pub fn deactivate_cert_automation(acceptor: impl Into<String>) -> Self {
        Command::DeactivateCertAutomation {
            acceptor: acceptor.into(),
        }
    }

    pub fn replace_descriptor(descriptor: Descriptor, origin: ReplaceOrigin) -> Self {
        Command::ReplaceDescriptor {
            descriptor: Box::new(descriptor),
            origin,
        }
    }

    /// Returns true for the bookkeeping commands that never dirty the form.
    pub fn is_bookkeeping(&self) -> bool {
        matches!(self, Command::SetYamlUnsaved { .. } | Command::MarkSaved)
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::AddEndpoint { .. } => "add-endpoint",
            Command::DeleteEndpoint { .. } => "delete-endpoint",
            Command::RenameEndpoint { .. } => "rename-endpoint",
            Command::SetPort { .. } => "set-port",
            Command::SetProtocols { .. } => "set-protocols",
            Command::SetHost { .. } => "set-host",
            Command::SetBindToAllInterfaces { .. } => "set-bind-to-all-interfaces",
            Command::SetFactory { .. } => "set-factory",
            Command::SetOtherParams { .. } => "set-other-params",
            Command::SetSslEnabled { .. } => "set-ssl-enabled",
            Command::SetSecret { .. } => "set-secret",
            Command::SetClientAuth { .. } => "set-client-auth",
            Command::SetConsoleExpose { .. } => "set-console-expose",
            Command::SetConsoleExposeMode { .. } => "set-console-expose-mode",
            Command::SetConsoleSslEnabled { .. } => "set-console-ssl-enabled",
            Command::SetConsoleCredentials { .. } => "set-console-credentials",
            Command::SetConsoleSecret { .. } => "set-console-secret",
            Command::SetConsoleClientAuth { .. } => "set-console-client-auth",
            Command::SetReplicaCount { .. } => "set-replica-count",
            Command::IncrementReplicas => "increment-replicas",
            Command::DecrementReplicas => "decrement-replicas",
            Command::SetBrokerName { .. } => "set-broker-name",
            Command::SetNamespace { .. } => "set-namespace",
            Command::SetIngressDomain { .. } => "set-ingress-domain",
            Command::ActivateCertAutomation { .. } => "activate-cert-automation",
            Command::DeactivateCertAutomation { .. } => "deactivate-cert-automation",
            Command::UpdateCertIssuer { .. } => "update-cert-issuer",
            Command::ReplaceDescriptor { .. } => "replace-descriptor",
            Command::SetYamlUnsaved { .. } => "set-yaml-unsaved",
            Command::MarkSaved => "mark-saved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_decode_from_tagged_json() {
        let json = r#"[
            {"op": "add-endpoint", "role": "acceptor"},
            {"op": "rename-endpoint", "role": "acceptor", "name": "acceptors0", "newName": "amqp"},
            {"op": "set-replica-count", "count": -3},
            {"op": "increment-replicas"},
            {"op": "activate-cert-automation", "acceptor": "amqp", "issuer": "letsencrypt"}
        ]"#;

        let commands: Vec<Command> = serde_json::from_str(json).expect("commands should decode");

        assert_eq!(
            commands,
            vec![
                Command::add_endpoint(EndpointRole::Acceptor),
                Command::rename_endpoint(EndpointRole::Acceptor, "acceptors0", "amqp"),
                Command::SetReplicaCount { count: -3 },
                Command::IncrementReplicas,
                Command::activate_cert_automation("amqp", "letsencrypt"),
            ]
        );
    }

    #[test]
    fn unknown_command_is_rejected_at_decode() {
        let result: Result<Command, _> = serde_json::from_str(r#"{"op": "launch-missiles"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn kind_matches_wire_tag() {
        let command = Command::set_port(EndpointRole::Connector, "c0", 6000);
        let json = serde_json::to_value(&command).expect("encode");

        assert_eq!(json["op"], command.kind());
        assert_eq!(json["port"], 6000);
    }

    #[test]
    fn only_bookkeeping_commands_are_flagged() {
        assert!(Command::MarkSaved.is_bookkeeping());
        assert!(Command::SetYamlUnsaved { unsaved: true }.is_bookkeeping());
        assert!(!Command::IncrementReplicas.is_bookkeeping());
        assert!(!Command::replace_descriptor(Descriptor::new(), ReplaceOrigin::System).is_bookkeeping());
    }
}
