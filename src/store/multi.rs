//! Multi-store cache checking
//!
//! An ordered list of store bindings; the first is primary. The primary
//! sees the full hash set, remaining bindings race over whatever it did
//! not report cached.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

use super::{CheckMagnetParams, MagnetStatus, Store, StoreError};

/// A resolved store client plus its auth credential
#[derive(Clone)]
pub struct StoreBinding {
    pub store: Arc<dyn Store>,
    pub token: String,
}

impl StoreBinding {
    pub fn code(&self) -> String {
        self.store.name().code().to_uppercase()
    }
}

/// Result of a multi-store cache check: hash → reporting store code,
/// plus one error slot per queried binding
pub struct CacheCheckOutcome {
    pub by_hash: HashMap<String, String>,
    pub errors: Vec<Option<StoreError>>,
    pub has_error: bool,
}

impl CacheCheckOutcome {
    pub fn store_code(&self, hash: &str) -> Option<&str> {
        self.by_hash.get(hash).map(String::as_str)
    }
}

/// Check which hashes are instantly playable, and from which backend.
///
/// Primary-binding failure is absorbed only when fallback bindings exist
/// (its whole hash set is then redistributed); with a single binding it
/// fails the check. Secondary failures are recorded, never fatal.
pub async fn check_magnets(
    bindings: &[StoreBinding],
    hashes: &[String],
    client_ip: Option<&str>,
    sid: Option<&str>,
) -> Result<CacheCheckOutcome, StoreError> {
    let Some(primary) = bindings.first() else {
        return Err(StoreError::NotConfigured("no store bindings".to_string()));
    };

    let mut outcome = CacheCheckOutcome {
        by_hash: HashMap::new(),
        errors: (0..bindings.len()).map(|_| None).collect(),
        has_error: false,
    };

    let params = CheckMagnetParams {
        api_key: primary.token.clone(),
        magnets: hashes.to_vec(),
        client_ip: client_ip.map(str::to_string),
        sid: sid.map(str::to_string),
    };

    let mut missing: Vec<String> = Vec::new();
    match primary.store.check_magnet(&params).await {
        Ok(data) => {
            let code = primary.code();
            for item in data.items {
                if item.status == MagnetStatus::Cached {
                    outcome.by_hash.insert(item.hash, code.clone());
                } else if bindings.len() > 1 {
                    missing.push(item.hash);
                }
            }
        }
        Err(err) => {
            if bindings.len() == 1 {
                error!(store = %primary.store.name(), error = %err, "cache check failed");
                return Err(err);
            }
            warn!(
                store = %primary.store.name(),
                error = %err,
                "primary cache check failed, redistributing to fallbacks"
            );
            outcome.errors[0] = Some(err);
            outcome.has_error = true;
            missing = hashes.to_vec();
        }
    }

    if bindings.len() == 1 || missing.is_empty() {
        return Ok(outcome);
    }

    // first reporter wins; the mutex guards only the shared map
    let by_hash = Arc::new(Mutex::new(std::mem::take(&mut outcome.by_hash)));

    let checks = bindings.iter().enumerate().skip(1).map(|(idx, binding)| {
        let params = CheckMagnetParams {
            api_key: binding.token.clone(),
            magnets: missing.clone(),
            client_ip: client_ip.map(str::to_string),
            sid: sid.map(str::to_string),
        };
        let by_hash = Arc::clone(&by_hash);
        async move {
            match binding.store.check_magnet(&params).await {
                Ok(data) => {
                    let code = binding.code();
                    let mut map = by_hash.lock().unwrap();
                    for item in data.items {
                        if item.status == MagnetStatus::Cached {
                            map.entry(item.hash).or_insert_with(|| code.clone());
                        }
                    }
                    (idx, None)
                }
                Err(err) => {
                    warn!(store = %binding.store.name(), error = %err, "fallback cache check failed");
                    (idx, Some(err))
                }
            }
        }
    });

    for (idx, err) in join_all(checks).await {
        if err.is_some() {
            outcome.has_error = true;
            outcome.errors[idx] = err;
        }
    }

    outcome.by_hash = std::mem::take(&mut *by_hash.lock().unwrap());

    Ok(outcome)
}
