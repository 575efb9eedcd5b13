//! Explicit, immutable collection bindings.
//!
//! A [`Bindings`] value maps collection names to schema markers and hands out
//! [`Collection`] handles sharing one client and one [`QuarryConfig`]. There is no
//! process-wide registry: bindings are built once with [`bind`] and passed around.

use crate::collection::Collection;
use crate::common::Document;
use crate::config::QuarryConfig;
use crate::driver::Driver;
use crate::errors::{ErrorKind, QuarryError, QuarryResult};
use indexmap::IndexMap;
use std::any::{type_name, TypeId};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Marks a type as the schema of a collection.
///
/// The marker exists only at compile time: it ties a [`Collection`] handle to the
/// documents it holds. Nothing is validated against it at runtime. [`Document`] is
/// the untyped marker.
///
/// ```rust
/// use quarry::bindings::Schema;
///
/// struct Order;
/// impl Schema for Order {}
/// ```
pub trait Schema: Send + Sync + 'static {}

impl Schema for Document {}

/// Starts building bindings for `client`.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::bindings::bind;
///
/// let bindings = bind(driver)
///     .max_time_ms(2_000)
///     .collection::<Order>("orders")
///     .collection::<Customer>("customers")
///     .build()?;
///
/// let orders = bindings.collection::<Order>()?;
/// ```
pub fn bind<D: Driver>(client: D) -> BindingsBuilder<D> {
    BindingsBuilder::new(Arc::new(client))
}

#[derive(Clone, Copy)]
struct Binding {
    schema: TypeId,
    schema_name: &'static str,
}

/// Builder for [`Bindings`].
///
/// Registration errors are captured and reported by [`BindingsBuilder::build`];
/// the first one wins.
pub struct BindingsBuilder<D> {
    client: Arc<D>,
    config: QuarryConfig,
    bindings: IndexMap<String, Binding>,
    error: Option<QuarryError>,
}

impl<D: Driver> BindingsBuilder<D> {
    /// Starts building bindings for an already shared client.
    pub fn new(client: Arc<D>) -> Self {
        BindingsBuilder {
            client,
            config: QuarryConfig::new(),
            bindings: IndexMap::new(),
            error: None,
        }
    }

    /// Binds the collection `name` to the schema marker `T`.
    ///
    /// An empty name, a name bound twice, or a typed marker bound to two names is an
    /// error reported by `build`. The untyped [`Document`] marker may be bound to any
    /// number of collections.
    pub fn collection<T: Schema>(mut self, name: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        if name.trim().is_empty() {
            log::error!("Collection name cannot be empty");
            self.error = Some(QuarryError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidCollectionName,
            ));
            return self;
        }

        if self.bindings.contains_key(name) {
            log::error!("Collection {} is already bound", name);
            self.error = Some(QuarryError::new(
                &format!("Collection {} is already bound", name),
                ErrorKind::DuplicateCollection,
            ));
            return self;
        }

        let schema = TypeId::of::<T>();
        if schema != TypeId::of::<Document>() {
            if let Some((existing, _)) = self.bindings.iter().find(|(_, b)| b.schema == schema) {
                log::error!("Schema {} is already bound to {}", type_name::<T>(), existing);
                self.error = Some(QuarryError::new(
                    &format!("Schema {} is already bound to {}", type_name::<T>(), existing),
                    ErrorKind::DuplicateCollection,
                ));
                return self;
            }
        }

        self.bindings.insert(
            name.to_string(),
            Binding {
                schema,
                schema_name: type_name::<T>(),
            },
        );
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: QuarryConfig) -> Self {
        self.config = config;
        self
    }

    /// Default server-side time limit, in milliseconds.
    pub fn max_time_ms(mut self, max_time_ms: u64) -> Self {
        self.config = self.config.with_max_time_ms(max_time_ms);
        self
    }

    /// Default comment attached to every command.
    pub fn comment(mut self, comment: &str) -> Self {
        self.config = self.config.with_comment(comment);
        self
    }

    pub fn allow_disk_use(mut self, allow_disk_use: bool) -> Self {
        self.config = self.config.with_allow_disk_use(allow_disk_use);
        self
    }

    /// Logs every triggered command at `info` level instead of `debug`.
    pub fn log_commands(mut self, log_commands: bool) -> Self {
        self.config = self.config.with_log_commands(log_commands);
        self
    }

    /// Finishes the bindings, or returns the first registration error.
    pub fn build(self) -> QuarryResult<Bindings<D>> {
        if let Some(error) = self.error {
            return Err(error);
        }

        log::debug!("Bound {} collection(s)", self.bindings.len());
        Ok(Bindings {
            inner: Arc::new(BindingsInner {
                client: self.client,
                config: self.config,
                bindings: self.bindings,
            }),
        })
    }
}

/// An immutable set of collection bindings sharing one client and configuration.
///
/// Cloning is cheap.
pub struct Bindings<D> {
    /// The pointer to implementation.
    inner: Arc<BindingsInner<D>>,
}

struct BindingsInner<D> {
    client: Arc<D>,
    config: QuarryConfig,
    bindings: IndexMap<String, Binding>,
}

impl<D: Driver> Bindings<D> {
    /// The collection bound to the schema marker `T`.
    ///
    /// Untyped collections are looked up with [`Bindings::collection_named`]; asking
    /// for [`Document`] here only succeeds when exactly one collection is untyped.
    pub fn collection<T: Schema>(&self) -> QuarryResult<Collection<T, D>> {
        let schema = TypeId::of::<T>();
        let mut matches = self
            .inner
            .bindings
            .iter()
            .filter(|(_, binding)| binding.schema == schema)
            .map(|(name, _)| name);

        match (matches.next(), matches.next()) {
            (Some(name), None) => Ok(self.handle(name)),
            (Some(_), Some(_)) => {
                log::error!("Schema {} is bound to several collections", type_name::<T>());
                Err(QuarryError::new(
                    &format!(
                        "Schema {} is bound to several collections, look it up by name",
                        type_name::<T>()
                    ),
                    ErrorKind::DuplicateCollection,
                ))
            }
            (None, _) => {
                log::error!("No collection is bound to schema {}", type_name::<T>());
                Err(QuarryError::new(
                    &format!("No collection is bound to schema {}", type_name::<T>()),
                    ErrorKind::CollectionNotFound,
                ))
            }
        }
    }

    /// The collection bound under `name`, viewed with schema `T`.
    ///
    /// `T` must be the marker the collection was bound with, or [`Document`], which
    /// views any collection untyped.
    pub fn collection_named<T: Schema>(&self, name: &str) -> QuarryResult<Collection<T, D>> {
        let binding = match self.inner.bindings.get(name) {
            Some(binding) => binding,
            None => {
                log::error!("Collection {} is not bound", name);
                return Err(QuarryError::new(
                    &format!("Collection {} is not bound", name),
                    ErrorKind::CollectionNotFound,
                ));
            }
        };

        let schema = TypeId::of::<T>();
        if schema != binding.schema && schema != TypeId::of::<Document>() {
            log::error!(
                "Collection {} is bound to {}, not {}",
                name,
                binding.schema_name,
                type_name::<T>()
            );
            return Err(QuarryError::new(
                &format!(
                    "Collection {} is bound to {}, not {}",
                    name,
                    binding.schema_name,
                    type_name::<T>()
                ),
                ErrorKind::SchemaMismatch,
            ));
        }
        Ok(self.handle(name))
    }

    /// Bound collection names, in registration order.
    pub fn collection_names(&self) -> Vec<String> {
        self.inner.bindings.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.bindings.contains_key(name)
    }

    pub fn config(&self) -> &QuarryConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &Arc<D> {
        &self.inner.client
    }

    fn handle<T: Schema>(&self, name: &str) -> Collection<T, D> {
        Collection::with_config(self.inner.client.clone(), name, self.inner.config.clone())
    }
}

impl<D> Clone for Bindings<D> {
    fn clone(&self) -> Self {
        Bindings {
            inner: self.inner.clone(),
        }
    }
}

impl<D> Debug for Bindings<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.inner
                    .bindings
                    .iter()
                    .map(|(name, binding)| (name, binding.schema_name)),
            )
            .finish()
    }
}
