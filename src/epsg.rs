//! EPSG code resolution with a shared, single-flight cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};

use crate::crs::CrsDefinition;
use crate::error::{CrsError, Result};
use crate::projjson::{parse_projjson, to_proj_string};

/// The raw answer of a lookup service: an HTTP-like status and the body as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub status: u16,
    pub body: String,
}

impl LookupResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        LookupResponse {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        LookupResponse {
            status,
            body: String::new(),
        }
    }
}

/// A source of PROJJSON documents keyed by EPSG code.
///
/// Implementations return [`CrsError::Transport`] when the service cannot be reached, and
/// a non-200 [`LookupResponse`] when it answers without a definition.
pub trait EpsgLookup: Send + Sync {
    /// Fetch the PROJJSON document for `code`, given as bare digits.
    fn fetch(&self, code: &str) -> Result<LookupResponse>;
}

impl<F> EpsgLookup for F
where
    F: Fn(&str) -> Result<LookupResponse> + Send + Sync,
{
    fn fetch(&self, code: &str) -> Result<LookupResponse> {
        self(code)
    }
}

type Slot = Arc<OnceLock<Result<CrsDefinition>>>;

/// Resolves EPSG codes to CRS definitions, remembering every successful resolution.
///
/// A handful of well-known codes (see [`builtin`]) never touch the lookup or the cache.
/// Everything else is fetched at most once at a time: concurrent callers asking for the
/// same code wait for the first caller's fetch and share its outcome. Failures are not
/// cached, so a later call tries again.
///
/// ```
/// use proj_crs::{CrsError, EpsgCache, LookupResponse};
///
/// let cache = EpsgCache::new(|_code: &str| -> proj_crs::Result<LookupResponse> {
///     Ok(LookupResponse::status(404))
/// });
/// let utm = cache.resolve("EPSG:32633").unwrap();
/// assert_eq!(utm.authority_code.as_deref(), Some("EPSG:32633"));
/// assert!(matches!(cache.resolve("2154"), Err(CrsError::NotFound { status: 404, .. })));
/// assert!(cache.is_empty());
/// ```
pub struct EpsgCache {
    lookup: Box<dyn EpsgLookup>,
    entries: RwLock<HashMap<String, CrsDefinition>>,
    in_flight: Mutex<HashMap<String, Slot>>,
}

impl fmt::Debug for EpsgCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `resolve` takes `in_flight` before `entries`; never hold both here.
        let entries = self.entries.read().len();
        let in_flight = self.in_flight.lock().len();
        f.debug_struct("EpsgCache")
            .field("entries", &entries)
            .field("in_flight", &in_flight)
            .finish()
    }
}

impl EpsgCache {
    /// An empty cache backed by `lookup`.
    pub fn new(lookup: impl EpsgLookup + 'static) -> Self {
        EpsgCache {
            lookup: Box::new(lookup),
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// An empty cache backed by [`HttpLookup`](crate::HttpLookup) with its default settings.
    #[cfg(feature = "network")]
    pub fn with_default_lookup() -> Self {
        EpsgCache::new(crate::network::HttpLookup::default())
    }

    /// Resolve `code`, with or without an `EPSG:` prefix.
    pub fn resolve(&self, code: &str) -> Result<CrsDefinition> {
        let code = normalize_code(code)?;
        if let Some(def) = builtin(&code) {
            return Ok(def);
        }
        if let Some(def) = self.entries.read().get(&code) {
            log::debug!("EPSG:{code} cache hit");
            return Ok(def.clone());
        }

        let slot = {
            let mut in_flight = self.in_flight.lock();
            // An entry may have landed while we were waiting for the lock. Lock order is
            // `in_flight`, then `entries`.
            if let Some(def) = self.entries.read().get(&code) {
                log::debug!("EPSG:{code} cache hit");
                return Ok(def.clone());
            }
            match in_flight.get(&code) {
                Some(slot) => {
                    log::debug!("EPSG:{code} joining in-flight lookup");
                    Arc::clone(slot)
                }
                None => {
                    log::debug!("EPSG:{code} cache miss");
                    let slot = Slot::default();
                    in_flight.insert(code.clone(), Arc::clone(&slot));
                    slot
                }
            }
        };

        let result = slot
            .get_or_init(|| {
                let fetched = self.fetch(&code);
                if let Ok(def) = &fetched {
                    self.entries.write().insert(code.clone(), def.clone());
                }
                fetched
            })
            .clone();

        let mut in_flight = self.in_flight.lock();
        if in_flight.get(&code).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
            in_flight.remove(&code);
        }
        result
    }

    /// Resolve `code` and render it as a PROJ string.
    pub fn resolve_proj_string(&self, code: &str) -> Result<String> {
        to_proj_string(&self.resolve(code)?)
    }

    pub fn is_cached(&self, code: &str) -> bool {
        normalize_code(code).is_ok_and(|code| self.entries.read().contains_key(&code))
    }

    /// Evict one entry, returning whether it was present.
    pub fn remove(&self, code: &str) -> bool {
        let Ok(code) = normalize_code(code) else {
            return false;
        };
        let removed = self.entries.write().remove(&code).is_some();
        if removed {
            log::debug!("EPSG:{code} evicted");
        }
        removed
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        log::debug!("clearing {} cached EPSG definitions", entries.len());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Cached codes as bare digits, in ascending order.
    pub fn cached_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.entries.read().keys().cloned().collect();
        codes.sort_by_key(|c| (c.len(), c.clone()));
        codes
    }

    fn fetch(&self, code: &str) -> Result<CrsDefinition> {
        log::debug!("fetching EPSG:{code}");
        let response = self.lookup.fetch(code).inspect_err(|e| {
            log::debug!("lookup of EPSG:{code} failed: {e}");
        })?;
        if response.status != 200 {
            log::debug!("lookup of EPSG:{code} answered {}", response.status);
            return Err(CrsError::NotFound {
                code: code.to_string(),
                status: response.status,
            });
        }
        let mut def = parse_projjson(&response.body)?;
        if def.authority_code.is_none() {
            def.authority_code = Some(format!("EPSG:{code}"));
        }
        log::debug!("resolved EPSG:{code} as `{}`", def.name);
        Ok(def)
    }
}

/// Strip an optional `EPSG:` prefix and check that what remains is a numeric code.
pub fn normalize_code(code: &str) -> Result<String> {
    let trimmed = code.trim();
    let digits = match trimmed.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("epsg:") => &trimmed[5..],
        _ => trimmed,
    }
    .trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CrsError::InvalidInput(format!(
            "`{code}` is not an EPSG code"
        )));
    }
    Ok(digits.to_string())
}

/// Definitions available without any lookup: 4326, 3857, 4269 and the WGS84 UTM zones
/// (32601–32660 north, 32701–32760 south).
pub fn builtin(code: &str) -> Option<CrsDefinition> {
    let code: u32 = normalize_code(code).ok()?.parse().ok()?;
    match code {
        4326 => Some(CrsDefinition::wgs84()),
        3857 => Some(CrsDefinition::web_mercator()),
        4269 => Some(CrsDefinition::nad83()),
        32601..=32660 => CrsDefinition::utm(u8::try_from(code - 32600).ok()?, false).ok(),
        32701..=32760 => CrsDefinition::utm(u8::try_from(code - 32700).ok()?, true).ok(),
        _ => None,
    }
}
