use std::collections::HashMap;
use std::sync::RwLock;

use super::{StoreError, TokenStore};
use crate::models::TokenKind;

/// Tokens held in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<TokenKind, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.tokens
            .read()
            .expect("token store lock poisoned")
            .get(&kind)
            .cloned()
    }

    fn set(&self, kind: TokenKind, value: &str) -> Result<(), StoreError> {
        self.tokens
            .write()
            .expect("token store lock poisoned")
            .insert(kind, value.to_string());
        Ok(())
    }

    fn remove(&self, kind: TokenKind) -> Result<(), StoreError> {
        self.tokens
            .write()
            .expect("token store lock poisoned")
            .remove(&kind);
        Ok(())
    }

    fn backend(&self) -> &str {
        "memory"
    }
}
