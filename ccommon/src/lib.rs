//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use ccommon::{GenerationOptions, InvocationId, MetadataMap, TraceId};
//!
//! let invocation = InvocationId::from("inv-1");
//! let trace = TraceId::new("trace-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("school".to_string(), "oak".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.3);
//! assert_eq!(invocation.as_str(), "inv-1");
//! assert_eq!(trace.to_string(), "trace-1");
//! assert_eq!(options.temperature, Some(0.3));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use ccommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Invocation identifiers and metadata shared across crates.
    //!
    //! ```rust
    //! use ccommon::{InvocationId, TraceId};
    //!
    //! let generated = InvocationId::generate();
    //! assert!(generated.as_str().starts_with("inv-"));
    //!
    //! let trace = TraceId::from("trace-42");
    //! assert_eq!(trace.as_str(), "trace-42");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub type MetadataMap = HashMap<String, String>;

    static NEXT_INVOCATION: AtomicU64 = AtomicU64::new(1);

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct InvocationId(String);

    impl InvocationId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        /// Process-unique id of the form `inv-<millis>-<sequence>`.
        pub fn generate() -> Self {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis())
                .unwrap_or_default();
            let sequence = NEXT_INVOCATION.fetch_add(1, Ordering::Relaxed);
            Self(format!("inv-{millis}-{sequence}"))
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for InvocationId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for InvocationId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for InvocationId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct TraceId(String);

    impl TraceId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for TraceId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for TraceId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for TraceId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Shared generation settings used by request types.
    //!
    //! ```rust
    //! use ccommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! Iteration follows insertion order so tool and flow listings stay stable.
    //!
    //! ```rust
    //! use ccommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
        order: Vec<K>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
                order: Vec::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash + Clone,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            let previous = self.items.insert(key.clone(), value);
            if previous.is_none() {
                self.order.push(key);
            }
            previous
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            let removed = self.items.remove(key)?;
            self.order
                .retain(|candidate| <K as Borrow<Q>>::borrow(candidate) != key);
            Some(removed)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.order.iter()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.order.iter().filter_map(|key| self.items.get(key))
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{InvocationId, MetadataMap, TraceId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;
