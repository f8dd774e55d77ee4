//! # opcflow-resources
//!
//! Typed clients for the resource families opcflow manages. Each module binds
//! a [`ResourceDescriptor`](opcflow_core::ResourceDescriptor) to request and
//! response types, a state enum, and the classifiers that drive its
//! reconciliation waits.
//!
//! | Module | Resource | Waits on |
//! |--------|----------|----------|
//! | [`load_balancer`] | LBaaS virtual load balancer | `HEALTHY` / `DELETED` |
//! | [`listener`] | Load balancer listener | `HEALTHY` / `DELETED` |
//! | [`policy`] | Load balancer policy | `HEALTHY` / `DELETED` |
//! | [`database`] | Database service instance | `Running` / absent |
//! | [`access_rule`] | Database access rule | listed / unlisted |
//! | [`ssh_key`] | Instance SSH key | job `SUCCEEDED` |

pub mod access_rule;
pub mod database;
pub mod lbaas;
pub mod listener;
pub mod load_balancer;
pub mod policy;
pub mod ssh_key;

// Re-exports
pub use access_rule::{AccessRule, AccessRuleInput, AccessRules, RuleStatus};
pub use database::{CreateDatabaseInput, DatabaseInstance, DatabaseState, Databases};
pub use lbaas::{LbaasResource, LbaasState};
pub use listener::{ListenerInfo, ListenerInput, Listeners};
pub use load_balancer::{
    CreateLoadBalancerInput, LoadBalancerInfo, LoadBalancers, UpdateLoadBalancerInput,
};
pub use policy::{Policies, PolicyInfo, PolicyInput};
pub use ssh_key::{Job, JobStatus, SshKeyInfo, SshKeys};

pub use opcflow_core::{Client, ClientConfig, Credentials, OpcError, Result};
