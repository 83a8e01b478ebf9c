//! HookRegistry - 名前付き拡張ポイントへのハンドラ登録
//!
//! ホストの「グローバルな hook テーブル」の代わりに、起動時に明示的に登録する。
//! - 初期化時に構築（mutable）
//! - 実行時は共有（immutable, Arc）

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ExpiryError, HookName, ScheduledEvent};

/// A handler for deferred events delivered to one hook.
#[async_trait]
pub trait HookHandler: Send + Sync {
    async fn handle(&self, event: &ScheduledEvent) -> Result<(), ExpiryError>;
}

#[derive(Default)]
pub struct HookRegistry {
    handlers: HashMap<HookName, Arc<dyn HookHandler>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a hook. A hook has at most one handler.
    pub fn register(
        &mut self,
        hook: HookName,
        handler: Arc<dyn HookHandler>,
    ) -> Result<(), ExpiryError> {
        if self.handlers.contains_key(&hook) {
            return Err(ExpiryError::DuplicateHook(hook));
        }
        self.handlers.insert(hook, handler);
        Ok(())
    }

    pub fn get(&self, hook: &HookName) -> Option<&Arc<dyn HookHandler>> {
        self.handlers.get(hook)
    }

    pub fn hooks(&self) -> Vec<HookName> {
        let mut hooks: Vec<HookName> = self.handlers.keys().cloned().collect();
        hooks.sort();
        hooks
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler registered for the event's hook.
    pub async fn dispatch(&self, event: &ScheduledEvent) -> Result<(), ExpiryError> {
        let handler = self
            .get(&event.hook)
            .ok_or_else(|| ExpiryError::HookNotFound(event.hook.clone()))?;

        handler.handle(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemId, Timestamp};

    struct OkHandler;

    #[async_trait]
    impl HookHandler for OkHandler {
        async fn handle(&self, _event: &ScheduledEvent) -> Result<(), ExpiryError> {
            Ok(())
        }
    }

    fn event(hook: &str) -> ScheduledEvent {
        ScheduledEvent::new(Timestamp::from_secs(1), HookName::new(hook), ItemId::new(1))
    }

    #[tokio::test]
    async fn dispatches_to_registered_handler() {
        let mut registry = HookRegistry::new();
        registry
            .register(HookName::new("post_expiry"), Arc::new(OkHandler))
            .unwrap();

        registry.dispatch(&event("post_expiry")).await.unwrap();
    }

    #[tokio::test]
    async fn errors_when_handler_missing() {
        let registry = HookRegistry::new();
        assert!(registry.is_empty());
        let err = registry.dispatch(&event("missing")).await.unwrap_err();
        assert!(matches!(err, ExpiryError::HookNotFound(hook) if hook.as_str() == "missing"));
    }

    #[test]
    fn double_registration_is_rejected() {
        let mut registry = HookRegistry::new();
        registry
            .register(HookName::new("post_expiry"), Arc::new(OkHandler))
            .unwrap();
        let result = registry.register(HookName::new("post_expiry"), Arc::new(OkHandler));
        assert!(matches!(result, Err(ExpiryError::DuplicateHook(_))));
        assert_eq!(registry.len(), 1);
    }
}
