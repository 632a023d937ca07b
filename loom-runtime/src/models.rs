//! Name-keyed registry resolving model descriptors into cached adapters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use loom_adapters::gemini::{GeminiAdapter, GeminiConfig};
use loom_adapters::openai::{OpenAiAdapter, OpenAiConfig};
use loom_adapters::replicate::{ReplicateAdapter, ReplicateConfig};
use loom_adapters::traits::ModelAdapter;
use loom_config::{ModelDescriptor, ProviderKind};
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};

/// Builds a live adapter from a model descriptor.
///
/// The registry dispatches construction through this trait so tests can
/// substitute scripted adapters for the provider-backed ones.
pub trait AdapterFactory: Send + Sync {
    /// Constructs an adapter for the supplied descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider client cannot be constructed, for
    /// example when required credentials are absent.
    fn build(&self, descriptor: &ModelDescriptor) -> RuntimeResult<Arc<dyn ModelAdapter>>;
}

/// Factory constructing provider adapters configured from the environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvAdapterFactory;

impl AdapterFactory for EnvAdapterFactory {
    fn build(&self, descriptor: &ModelDescriptor) -> RuntimeResult<Arc<dyn ModelAdapter>> {
        let adapter: Arc<dyn ModelAdapter> = match descriptor.provider {
            ProviderKind::OpenAi => {
                let mut config = OpenAiConfig::from_env(descriptor.model.as_str());
                if let Some(temperature) = descriptor.temperature {
                    config = config.with_default_temperature(temperature);
                }
                Arc::new(OpenAiAdapter::new(config)?)
            }
            ProviderKind::Google => {
                let mut config = GeminiConfig::from_env(descriptor.model.as_str());
                if let Some(temperature) = descriptor.temperature {
                    config = config.with_default_temperature(temperature);
                }
                Arc::new(GeminiAdapter::new(config)?)
            }
            ProviderKind::Replicate => {
                let mut config = ReplicateConfig::from_env(descriptor.model.as_str());
                if let Some(temperature) = descriptor.temperature {
                    config = config.with_default_temperature(temperature);
                }
                Arc::new(ReplicateAdapter::new(config)?)
            }
        };
        Ok(adapter)
    }
}

/// Registry that lazily constructs model adapters and caches them by name.
///
/// Once a name resolves, every later call returns the identical handle;
/// construction parameters are fixed at first resolution.
pub struct ModelRegistry {
    descriptors: Vec<ModelDescriptor>,
    factory: Box<dyn AdapterFactory>,
    cache: Mutex<HashMap<String, Arc<dyn ModelAdapter>>>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.lock().expect("model cache poisoned");
        let constructed: Vec<_> = cache.keys().cloned().collect();
        f.debug_struct("ModelRegistry")
            .field("declared", &self.descriptors.len())
            .field("constructed", &constructed)
            .finish()
    }
}

impl ModelRegistry {
    /// Creates a registry backed by the environment-configured factory.
    #[must_use]
    pub fn new(descriptors: Vec<ModelDescriptor>) -> Self {
        Self::with_factory(descriptors, Box::new(EnvAdapterFactory))
    }

    /// Creates a registry with a custom adapter factory.
    #[must_use]
    pub fn with_factory(descriptors: Vec<ModelDescriptor>, factory: Box<dyn AdapterFactory>) -> Self {
        Self {
            descriptors,
            factory,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the declared model descriptors in document order.
    #[must_use]
    pub fn catalog(&self) -> &[ModelDescriptor] {
        &self.descriptors
    }

    /// Resolves a model name to a live adapter, constructing it on first use.
    ///
    /// When `name` is `None` the registry resolves the first descriptor
    /// flagged as default, in load order.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ModelNotFound`] when the name matches no
    /// descriptor, [`RuntimeError::MissingDefault`] when no name is given and
    /// no descriptor is flagged default, or the factory's error when
    /// construction fails.
    ///
    /// # Panics
    ///
    /// Panics if the internal cache lock is poisoned.
    pub fn get(&self, name: Option<&str>) -> RuntimeResult<Arc<dyn ModelAdapter>> {
        let descriptor = match name {
            Some(name) => self
                .descriptors
                .iter()
                .find(|descriptor| descriptor.name == name)
                .ok_or_else(|| RuntimeError::model_not_found(name))?,
            None => self
                .descriptors
                .iter()
                .find(|descriptor| descriptor.default)
                .ok_or(RuntimeError::MissingDefault)?,
        };

        let mut cache = self.cache.lock().expect("model cache poisoned");
        if let Some(adapter) = cache.get(&descriptor.name) {
            return Ok(Arc::clone(adapter));
        }

        let adapter = self.factory.build(descriptor)?;
        debug!(
            model = %descriptor.name,
            provider = %descriptor.provider,
            "model adapter constructed and cached"
        );
        cache.insert(descriptor.name.clone(), Arc::clone(&adapter));
        Ok(adapter)
    }
}
