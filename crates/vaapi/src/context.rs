//! Negotiation context: the per-family capability cache.
//!
//! One lazily computed cell per [`CodecFamily`]. The first reader of a family
//! runs the probe; concurrent first readers block on the same cell and observe
//! the finished [`Capability`], so device I/O happens once per family.

use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{debug, info};

use hwcaps_common::{CodecFamily, NegotiationConfig};

use crate::backend::VaBackend;
use crate::capability::Capability;
use crate::prober::ProfileProber;
use crate::scanner::DeviceScanner;

/// Owned by the transcode coordinator and passed to every query.
pub struct NegotiationContext {
    config: NegotiationConfig,
    backend: OnceLock<Option<Arc<dyn VaBackend>>>,
    families: [OnceLock<Capability>; 3],
    overall: OnceLock<bool>,
}

impl NegotiationContext {
    /// Context using the system VA-API libraries, loaded on first probe.
    pub fn new(config: NegotiationConfig) -> Self {
        Self {
            config,
            backend: OnceLock::new(),
            families: Default::default(),
            overall: OnceLock::new(),
        }
    }

    /// Context probing through `backend` instead of the system libraries.
    pub fn with_backend(config: NegotiationConfig, backend: Arc<dyn VaBackend>) -> Self {
        let ctx = Self::new(config);
        let _ = ctx.backend.set(Some(backend));
        ctx
    }

    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Capability for `family`, probing on first access.
    pub fn capability(&self, family: CodecFamily) -> &Capability {
        self.families[family.index()].get_or_init(|| self.compute(family))
    }

    /// Whether `family` has already been probed.
    pub fn is_probed(&self, family: CodecFamily) -> bool {
        self.families[family.index()].get().is_some()
    }

    /// Overall hardware availability: any family available. Cached once computed.
    pub fn available(&self) -> bool {
        *self.overall.get_or_init(|| {
            let available = CodecFamily::ALL
                .into_iter()
                .any(|family| self.capability(family).is_available());
            info!(available, "VA-API hardware availability");
            available
        })
    }

    /// Forget every cached answer. The backend is kept.
    pub fn reset(&mut self) {
        for cell in &mut self.families {
            cell.take();
        }
        self.overall.take();
        debug!("Capability cache reset");
    }

    /// Snapshot of every family, probing as needed.
    pub fn report(&self) -> CapabilityReport {
        CapabilityReport {
            compiled_in: crate::COMPILED_IN,
            hardware_disabled: self.config.hardware_disabled,
            available: self.available(),
            families: CodecFamily::ALL
                .into_iter()
                .map(|family| self.capability(family).clone())
                .collect(),
        }
    }

    fn compute(&self, family: CodecFamily) -> Capability {
        if !crate::COMPILED_IN {
            debug!(family = %family, "VA-API support not compiled in");
            return Capability::unavailable(family);
        }
        if self.config.hardware_disabled {
            info!(family = %family, "Hardware acceleration disabled");
            return Capability::unavailable(family);
        }
        let Some(backend) = self.backend() else {
            return Capability::unavailable(family);
        };

        let scanner = DeviceScanner::new(&**backend, &self.config);
        let capability = ProfileProber::new(scanner).probe_family(family);
        info!(
            family = %family,
            available = capability.is_available(),
            max_width = capability.max_width,
            max_height = capability.max_height,
            rc_modes = ?capability.rate_control_modes.names(),
            "Probed hardware encoder"
        );
        capability
    }

    fn backend(&self) -> Option<&Arc<dyn VaBackend>> {
        self.backend.get_or_init(load_native_backend).as_ref()
    }
}

impl std::fmt::Debug for NegotiationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NegotiationContext")
            .field("config", &self.config)
            .field("families", &self.families)
            .field("overall", &self.overall)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "vaapi")]
fn load_native_backend() -> Option<Arc<dyn VaBackend>> {
    match crate::native::NativeBackend::load() {
        Ok(backend) => Some(Arc::new(backend)),
        Err(e) => {
            tracing::warn!(error = %e, "VA-API libraries unavailable");
            None
        }
    }
}

#[cfg(not(feature = "vaapi"))]
fn load_native_backend() -> Option<Arc<dyn VaBackend>> {
    None
}

/// Serializable summary of every family's capability.
#[derive(Clone, Debug, Serialize)]
pub struct CapabilityReport {
    pub compiled_in: bool,
    pub hardware_disabled: bool,
    pub available: bool,
    pub families: Vec<Capability>,
}
