#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod context;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod instantiator;
pub(crate) mod key;
pub(crate) mod lazy;
pub(crate) mod lock;
pub(crate) mod metadata;
pub(crate) mod module;
pub(crate) mod provider;
pub(crate) mod registry;
pub(crate) mod scope;
pub(crate) mod service;

#[cfg(feature = "async")]
pub mod async_impl;

pub use any::TypeInfo;
pub use config::{Config, ContainerConfig};
pub use container::Container;
pub use context::ResolveContext;
pub use dependency_resolver::DependencyResolver;
pub use errors::{InjectionErrorKind, InstantiateErrorKind, InstantiatorErrorKind, InstantiatorResult, ResolveErrorKind};
pub use inject::{Inject, InjectContext, InjectLazy, InjectProvider};
pub use instantiator::{instance, Instantiator};
pub use key::{BindingKey, Qualifier};
pub use lazy::Lazy;
pub use metadata::{Injectable, TypeMetadata, TypeMetadataBuilder};
pub use module::{Module, ModuleInstaller};
pub use provider::Provider;
pub use scope::Scope;

#[cfg(feature = "async")]
pub use async_impl::AsyncProvider;
