//! Platform credential store backend: macOS Keychain, Windows Credential
//! Manager, and on Linux the Secret Service (GNOME Keyring, KWallet) with a
//! kernel keyutils cache in front. Entries survive logout and reboot.

use super::{SecureStore, StoreResult};
use keyring::Entry;
use log::debug;

/// Secure store writing one credential entry per key under a fixed service.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> StoreResult<Entry> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl SecureStore for KeyringStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => {
                debug!(
                    "event=store_get module=store status=ok backend=keyring key={} value_len={}",
                    key,
                    value.len()
                );
                Ok(Some(value))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("event=store_get module=store status=ok backend=keyring key={key} found=false");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }
}
