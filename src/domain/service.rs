//! Service registry
//!
//! A service is one receiver value plus a table of methods callable on it.
//! Methods are registered through [`ServiceBuilder`] with the uniform calling
//! convention `fn(&R, &RequestContext, &Args, &mut Reply) -> anyhow::Result<()>`.
//! The table is immutable once built and is shared read-only by all requests.

use serde::de::{DeserializeOwned, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;
use tracing::debug;

use crate::domain::context::RequestContext;
use crate::domain::rpc::RpcError;

/// Errors raised while building a service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("rpc: no usable service name for type \"{0}\"")]
    InvalidServiceName(String),

    #[error("rpc: \"{0}\" has no exported methods of suitable type")]
    NoEligibleMethods(String),
}

/// Errors raised while resolving a qualified `Service.Method` name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("rpc: service/method request ill-formed: \"{0}\"")]
    MalformedMethodName(String),

    #[error("rpc: can't find service \"{0}\"")]
    UnknownService(String),

    #[error("rpc: can't find method \"{0}\"")]
    UnknownMethod(String),
}

/// Failure of a single method invocation
#[derive(Error, Debug)]
pub enum CallError {
    /// Parameters could not be bound into the argument type.
    #[error("{0}")]
    Bind(RpcError),

    /// The method itself returned an error.
    #[error("{0}")]
    Method(anyhow::Error),

    /// The populated result value could not be serialized.
    #[error("result encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Identity of an argument or result type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMarker {
    id: TypeId,
    name: &'static str,
}

impl TypeMarker {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Destination for bound parameters
///
/// Codecs see the argument value only through this trait, which lets one
/// codec implementation fill argument types it knows nothing about.
pub trait ArgsSlot {
    /// Rust type name of the argument
    fn type_name(&self) -> &'static str;

    /// Decode the payload directly into the argument (by-name binding).
    fn decode_by_name(&mut self, raw: &RawValue) -> Result<(), serde_json::Error>;

    /// Decode the payload as an array whose first element is the argument
    /// (by-position binding).
    fn decode_by_position(&mut self, raw: &RawValue) -> Result<(), serde_json::Error>;
}

/// [`ArgsSlot`] over a concrete argument value
pub struct TypedSlot<'a, A> {
    value: &'a mut A,
}

impl<'a, A> TypedSlot<'a, A> {
    pub fn new(value: &'a mut A) -> Self {
        Self { value }
    }
}

impl<A: DeserializeOwned> ArgsSlot for TypedSlot<'_, A> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<A>()
    }

    fn decode_by_name(&mut self, raw: &RawValue) -> Result<(), serde_json::Error> {
        *self.value = serde_json::from_str(raw.get())?;
        Ok(())
    }

    fn decode_by_position(&mut self, raw: &RawValue) -> Result<(), serde_json::Error> {
        let Positional(first) = serde_json::from_str::<Positional<A>>(raw.get())?;
        if let Some(value) = first {
            *self.value = value;
        }
        Ok(())
    }
}

/// First element of a JSON array; the remaining elements are skipped.
struct Positional<A>(Option<A>);

impl<'de, A: Deserialize<'de>> Deserialize<'de> for Positional<A> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PositionalVisitor<A>(PhantomData<A>);

        impl<'de, A: Deserialize<'de>> Visitor<'de> for PositionalVisitor<A> {
            type Value = Positional<A>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an array holding the argument record")
            }

            fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
            where
                S: SeqAccess<'de>,
            {
                let first = seq.next_element::<A>()?;
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(Positional(first))
            }
        }

        deserializer.deserialize_seq(PositionalVisitor(PhantomData))
    }
}

type Invoker<R> = dyn Fn(&R, &RequestContext, &dyn Fn(&mut dyn ArgsSlot) -> Result<(), RpcError>) -> Result<Value, CallError>
    + Send
    + Sync;

/// A callable method with its argument and result types
pub struct MethodDescriptor<R> {
    name: String,
    args_type: TypeMarker,
    reply_type: TypeMarker,
    invoker: Box<Invoker<R>>,
}

impl<R> MethodDescriptor<R> {
    fn new<A, Rp, F>(name: &str, method: F) -> Self
    where
        A: DeserializeOwned + Default + 'static,
        Rp: Serialize + Default + 'static,
        F: Fn(&R, &RequestContext, &A, &mut Rp) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let invoker = move |receiver: &R,
                            context: &RequestContext,
                            bind: &dyn Fn(&mut dyn ArgsSlot) -> Result<(), RpcError>|
              -> Result<Value, CallError> {
            let mut args = A::default();
            bind(&mut TypedSlot::new(&mut args)).map_err(CallError::Bind)?;

            let mut reply = Rp::default();
            method(receiver, context, &args, &mut reply).map_err(CallError::Method)?;

            serde_json::to_value(&reply).map_err(CallError::Encode)
        };

        Self {
            name: name.to_string(),
            args_type: TypeMarker::of::<A>(),
            reply_type: TypeMarker::of::<Rp>(),
            invoker: Box::new(invoker),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args_type(&self) -> TypeMarker {
        self.args_type
    }

    pub fn reply_type(&self) -> TypeMarker {
        self.reply_type
    }

    /// Call the method with a fresh argument filled by `bind` and a fresh
    /// result value, returning the serialized result.
    pub fn invoke(
        &self,
        receiver: &R,
        context: &RequestContext,
        bind: &dyn Fn(&mut dyn ArgsSlot) -> Result<(), RpcError>,
    ) -> Result<Value, CallError> {
        (self.invoker)(receiver, context, bind)
    }
}

impl<R> fmt::Debug for MethodDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("args_type", &self.args_type.name())
            .field("reply_type", &self.reply_type.name())
            .finish()
    }
}

/// A receiver and its method table
pub struct ServiceDescriptor<R> {
    name: String,
    receiver: R,
    methods: HashMap<String, MethodDescriptor<R>>,
}

impl<R> ServiceDescriptor<R> {
    pub fn builder(receiver: R) -> ServiceBuilder<R> {
        ServiceBuilder::new(receiver)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    /// Registered method names, sorted
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a method by its `Service.Method` name.
    pub fn resolve(&self, qualified: &str) -> Result<&MethodDescriptor<R>, LookupError> {
        let (service, method) = qualified
            .split_once('.')
            .filter(|(service, method)| !service.is_empty() && !method.is_empty() && !method.contains('.'))
            .ok_or_else(|| LookupError::MalformedMethodName(qualified.to_string()))?;

        if service != self.name {
            return Err(LookupError::UnknownService(qualified.to_string()));
        }

        self.methods
            .get(method)
            .ok_or_else(|| LookupError::UnknownMethod(qualified.to_string()))
    }

    /// Qualify a bare method name with this service's name.
    pub fn qualify(&self, method: &str) -> String {
        if method.contains('.') {
            method.to_string()
        } else {
            format!("{}.{}", self.name, method)
        }
    }
}

impl<R> fmt::Debug for ServiceDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Builder collecting the eligible methods of a receiver
pub struct ServiceBuilder<R> {
    receiver: R,
    name: Option<String>,
    methods: HashMap<String, MethodDescriptor<R>>,
}

impl<R> ServiceBuilder<R> {
    pub fn new(receiver: R) -> Self {
        Self {
            receiver,
            name: None,
            methods: HashMap::new(),
        }
    }

    /// Override the service name derived from the receiver type.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register a method. Names that are not exported, contain `.` or `/`,
    /// or repeat an earlier registration are skipped.
    pub fn method<A, Rp, F>(mut self, name: &str, method: F) -> Self
    where
        A: DeserializeOwned + Default + 'static,
        Rp: Serialize + Default + 'static,
        F: Fn(&R, &RequestContext, &A, &mut Rp) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        if !is_eligible_method_name(name) {
            debug!(method = %name, "skipping method with non-exported name");
            return self;
        }
        if self.methods.contains_key(name) {
            debug!(method = %name, "skipping duplicate method registration");
            return self;
        }

        self.methods
            .insert(name.to_string(), MethodDescriptor::new::<A, Rp, F>(name, method));
        self
    }

    pub fn build(self) -> Result<ServiceDescriptor<R>, RegistrationError> {
        let name = match self.name.filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => {
                let type_name = std::any::type_name::<R>();
                let derived = short_type_name(type_name);
                if !is_exported(derived) {
                    return Err(RegistrationError::InvalidServiceName(type_name.to_string()));
                }
                derived.to_string()
            }
        };

        if self.methods.is_empty() {
            return Err(RegistrationError::NoEligibleMethods(name));
        }

        debug!(service = %name, methods = self.methods.len(), "service registered");
        Ok(ServiceDescriptor {
            name,
            receiver: self.receiver,
            methods: self.methods,
        })
    }
}

/// True when `name` starts with an uppercase letter
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn is_eligible_method_name(name: &str) -> bool {
    is_exported(name) && !name.contains(['.', '/'])
}

/// Bare type name: module path and generic arguments removed, smart
/// pointer wrappers looked through.
fn short_type_name(type_name: &str) -> &str {
    const WRAPPERS: [&str; 3] = ["alloc::sync::Arc<", "alloc::boxed::Box<", "alloc::rc::Rc<"];

    let mut inner = type_name;
    while let Some(rest) = WRAPPERS.iter().find_map(|wrapper| inner.strip_prefix(wrapper)) {
        inner = rest;
    }

    let base = inner.split(['<', '>', ',']).next().unwrap_or(inner);
    base.rsplit("::").next().unwrap_or(base)
}
