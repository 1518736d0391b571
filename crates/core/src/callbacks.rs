//! Migration lifecycle events
//!
//! The engine dispatches named events to externally registered callbacks,
//! passing the database handle, configuration and parsing context. A
//! callback failure is treated like any other migration failure.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::MigrateConfig;
use crate::database::{Database, ParsingContext};
use crate::error::CoreResult;

/// Lifecycle event dispatched around individual migrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    BeforeEachMigrate,
    AfterEachMigrate,
}

impl Event {
    /// Wire name of the event
    pub fn id(&self) -> &'static str {
        match self {
            Event::BeforeEachMigrate => "beforeEachMigrate",
            Event::AfterEachMigrate => "afterEachMigrate",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Externally provided event handler
#[async_trait]
pub trait Callback: Send + Sync {
    fn supports(&self, event: Event) -> bool;

    async fn handle(
        &self,
        event: Event,
        database: &mut dyn Database,
        config: &MigrateConfig,
        context: &ParsingContext,
    ) -> CoreResult<()>;
}

/// Dispatches events to every supporting callback in registration order
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Arc<dyn Callback>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, callback: Arc<dyn Callback>) {
        self.callbacks.push(callback);
    }

    pub async fn handle_event(
        &self,
        event: Event,
        database: &mut dyn Database,
        config: &MigrateConfig,
        context: &ParsingContext,
    ) -> CoreResult<()> {
        for callback in &self.callbacks {
            if callback.supports(event) {
                callback.handle(event, database, config, context).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::test_support::MockDatabase;
    use std::sync::Mutex;

    struct RecordingCallback {
        events: Arc<Mutex<Vec<String>>>,
        supported: Event,
    }

    #[async_trait]
    impl Callback for RecordingCallback {
        fn supports(&self, event: Event) -> bool {
            event == self.supported
        }

        async fn handle(
            &self,
            event: Event,
            _database: &mut dyn Database,
            _config: &MigrateConfig,
            _context: &ParsingContext,
        ) -> CoreResult<()> {
            self.events.lock().unwrap().push(event.id().to_string());
            Ok(())
        }
    }

    struct FailingCallback;

    #[async_trait]
    impl Callback for FailingCallback {
        fn supports(&self, _event: Event) -> bool {
            true
        }

        async fn handle(
            &self,
            _event: Event,
            _database: &mut dyn Database,
            _config: &MigrateConfig,
            _context: &ParsingContext,
        ) -> CoreResult<()> {
            Err(CoreError::Callback("handler refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_only_supporting_callbacks_fire() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut manager = CallbackManager::new();
        manager.register(Arc::new(RecordingCallback {
            events: events.clone(),
            supported: Event::BeforeEachMigrate,
        }));
        manager.register(Arc::new(RecordingCallback {
            events: events.clone(),
            supported: Event::AfterEachMigrate,
        }));

        let mut database = MockDatabase::new();
        let config = MigrateConfig::default();
        let context = ParsingContext::new();

        manager
            .handle_event(Event::BeforeEachMigrate, &mut database, &config, &context)
            .await
            .unwrap();

        assert_eq!(*events.lock().unwrap(), vec!["beforeEachMigrate"]);
    }

    #[tokio::test]
    async fn test_callback_failure_propagates() {
        let mut manager = CallbackManager::new();
        manager.register(Arc::new(FailingCallback));

        let mut database = MockDatabase::new();
        let config = MigrateConfig::default();
        let context = ParsingContext::new();

        let err = manager
            .handle_event(Event::AfterEachMigrate, &mut database, &config, &context)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("handler refused"));
    }
}
