// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host bridge facade: the operations the application layer calls.

use std::sync::{Arc, Mutex, PoisonError};

use image::DynamicImage;
use tracing::{debug, info, instrument, warn};

use labelbridge_core::config::{BridgeConfig, ProviderKind};
use labelbridge_core::relay::{StatusListener, StatusRelay, SubscriptionId};
use labelbridge_core::types::PrinterSelection;
use labelbridge_print::{
    CallbackReply, PrintProvider, PrintServiceProvider, ServiceCallback, TempImageStore,
    WifiLabelProvider,
};

use crate::journal::EventJournal;
use crate::platform::PlatformServices;
use crate::resolver::ImageResolver;

/// Single entry point for the host application.
///
/// Owns the active provider for its whole lifetime; the provider is chosen
/// once at construction and never switched. The host holds at most one
/// status binding at a time.
pub struct PrinterBridge {
    provider: Box<dyn PrintProvider>,
    relay: Arc<StatusRelay>,
    resolver: Box<dyn ImageResolver>,
    host_binding: Mutex<Option<SubscriptionId>>,
}

impl PrinterBridge {
    pub fn new(
        provider: Box<dyn PrintProvider>,
        relay: Arc<StatusRelay>,
        resolver: Box<dyn ImageResolver>,
    ) -> Self {
        Self {
            provider,
            relay,
            resolver,
            host_binding: Mutex::new(None),
        }
    }

    /// Build the provider named by `config.provider` from the platform's
    /// collaborators.
    ///
    /// A journal that cannot be opened is logged and skipped; the bridge
    /// still comes up.
    #[instrument(skip_all, fields(provider = ?config.provider))]
    pub fn from_config(config: &BridgeConfig, platform: PlatformServices) -> Self {
        let relay = Arc::new(StatusRelay::new());
        for sink in platform.sinks {
            relay.add_sink(sink);
        }
        if let Some(path) = &config.journal_path {
            match EventJournal::open(path) {
                Ok(journal) => relay.add_sink(Arc::new(journal)),
                Err(e) => warn!(error = %e, path = %path.display(), "event journal disabled"),
            }
        }

        let provider: Box<dyn PrintProvider> = match config.provider {
            ProviderKind::WifiLabel => {
                let mut wifi = config.wifi.clone();
                if wifi.work_dir.is_none() {
                    wifi.work_dir = platform.files_dir;
                }
                Box::new(WifiLabelProvider::new(
                    platform.label_printer,
                    Arc::clone(&relay),
                    wifi,
                ))
            }
            ProviderKind::PrintService => {
                let store = TempImageStore::new(
                    &platform.cache_dir,
                    &config.service.temp_subdir,
                    config.service.jpeg_quality,
                );
                Box::new(PrintServiceProvider::new(
                    platform.print_service,
                    Arc::clone(&relay),
                    config.service.clone(),
                    store,
                    platform.scheduler,
                ))
            }
        };
        info!(provider = provider.name(), "printer bridge ready");

        Self::new(provider, relay, platform.resolver)
    }

    pub fn relay(&self) -> &Arc<StatusRelay> {
        &self.relay
    }

    /// Name of the active provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Discovered printers joined with `,`; empty when none were found.
    pub fn scan(&self) -> String {
        self.provider.scan().join(",")
    }

    pub fn check_init(&self, address: &str, model: &str) {
        self.provider
            .check_init(&PrinterSelection::new(address, model));
    }

    /// Resolve a comma-separated URI list and print whatever resolves.
    ///
    /// Unresolvable entries are skipped. The provider is not called when
    /// nothing resolves.
    #[instrument(skip(self))]
    pub fn print_uris(&self, uris: &str) {
        let images: Vec<DynamicImage> = uris
            .split(',')
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .filter_map(|uri| match self.resolver.resolve(uri) {
                Ok(image) => {
                    debug!(uri, "image resolved for printing");
                    Some(image)
                }
                Err(e) => {
                    warn!(uri, error = %e, "skipping unresolvable image");
                    None
                }
            })
            .collect();

        if images.is_empty() {
            info!("no printable images in request");
            return;
        }
        self.provider.print_bitmaps(&images);
    }

    pub fn configure(&self) {
        self.provider.configure();
    }

    /// Current status text.
    pub fn status(&self) -> String {
        self.relay.status_text()
    }

    /// Deliver the current status text to `callback`.
    pub fn get_status(&self, callback: impl FnOnce(&str)) {
        callback(&self.relay.status_text());
    }

    /// Bind the host's status listener, replacing any earlier binding. The
    /// current status is delivered once immediately.
    pub fn bind(&self, listener: StatusListener) {
        let mut binding = self
            .host_binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = binding.take() {
            self.relay.unsubscribe(previous);
            debug!("replacing host status listener");
        }
        *binding = Some(self.relay.subscribe_and_notify(listener));
    }

    /// Drop the host's status listener. Returns `false` if none was bound.
    pub fn unbind(&self) -> bool {
        let previous = self
            .host_binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        previous.is_some_and(|id| self.relay.unsubscribe(id))
    }

    /// Forward a vendor callback to the active provider.
    pub fn handle_callback(&self, callback: ServiceCallback) -> CallbackReply {
        self.provider.handle_callback(callback)
    }

    /// Release vendor sessions held by the provider.
    pub fn shutdown(&self) {
        info!(provider = self.provider.name(), "printer bridge shutting down");
        self.provider.detach();
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::RgbImage;
    use labelbridge_core::StatusKind;
    use labelbridge_core::error::{LabelBridgeError, Result};

    use crate::stub;

    /// Everything the facade asked the provider to do.
    #[derive(Default)]
    struct Calls {
        batches: Mutex<Vec<Vec<(u32, u32)>>>,
        selections: Mutex<Vec<PrinterSelection>>,
        configured: Mutex<u32>,
        detached: Mutex<u32>,
    }

    struct RecordingProvider {
        calls: Arc<Calls>,
        discovered: Vec<String>,
    }

    impl PrintProvider for RecordingProvider {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn check_init(&self, selection: &PrinterSelection) {
            self.calls.selections.lock().unwrap().push(selection.clone());
        }

        fn configure(&self) {
            *self.calls.configured.lock().unwrap() += 1;
        }

        fn print_bitmaps(&self, images: &[DynamicImage]) {
            let sizes = images.iter().map(|i| (i.width(), i.height())).collect();
            self.calls.batches.lock().unwrap().push(sizes);
        }

        fn scan(&self) -> Vec<String> {
            self.discovered.clone()
        }

        fn detach(&self) {
            *self.calls.detached.lock().unwrap() += 1;
        }
    }

    /// Resolves `img:<w>x<h>` to a blank image of that size.
    struct SizeResolver;

    impl ImageResolver for SizeResolver {
        fn resolve(&self, uri: &str) -> Result<DynamicImage> {
            let fail = || LabelBridgeError::ImageResolve {
                uri: uri.to_owned(),
                reason: "not a test image".into(),
            };
            let (w, h) = uri
                .strip_prefix("img:")
                .and_then(|dims| dims.split_once('x'))
                .ok_or_else(fail)?;
            let w = w.parse().map_err(|_| fail())?;
            let h = h.parse().map_err(|_| fail())?;
            Ok(DynamicImage::new_rgb8(w, h))
        }
    }

    fn harness(discovered: Vec<String>) -> (PrinterBridge, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let provider = RecordingProvider {
            calls: Arc::clone(&calls),
            discovered,
        };
        let bridge = PrinterBridge::new(
            Box::new(provider),
            Arc::new(StatusRelay::new()),
            Box::new(SizeResolver),
        );
        (bridge, calls)
    }

    #[test]
    fn print_uris_passes_only_resolved_images() {
        let (bridge, calls) = harness(Vec::new());
        bridge.print_uris("img:10x5, content://gone ,,img:3x4,bogus");

        let batches = calls.batches.lock().unwrap();
        assert_eq!(batches.as_slice(), &[vec![(10, 5), (3, 4)]]);
    }

    #[test]
    fn print_uris_skips_provider_when_nothing_resolves() {
        let (bridge, calls) = harness(Vec::new());
        bridge.print_uris("content://a,content://b");
        bridge.print_uris("");
        bridge.print_uris(" , ");

        assert!(calls.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn scan_joins_descriptors() {
        let (bridge, _) = harness(vec!["QL-800~10.0.0.2".into(), "QL-810W~10.0.0.3".into()]);
        assert_eq!(bridge.scan(), "QL-800~10.0.0.2,QL-810W~10.0.0.3");

        let (empty, _) = harness(Vec::new());
        assert_eq!(empty.scan(), "");
    }

    #[test]
    fn check_init_and_configure_reach_provider() {
        let (bridge, calls) = harness(Vec::new());
        bridge.check_init("192.168.1.20", "Brother QL-800");
        bridge.configure();
        bridge.configure();

        let selections = calls.selections.lock().unwrap();
        assert_eq!(
            selections.as_slice(),
            &[PrinterSelection::new("192.168.1.20", "Brother QL-800")]
        );
        assert_eq!(*calls.configured.lock().unwrap(), 2);
    }

    #[test]
    fn bind_delivers_current_status_before_changes() {
        let (bridge, _) = harness(Vec::new());
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&seen);
        bridge.bind(Arc::new(move |status: &str| {
            sink.lock().unwrap().push(status.to_owned());
        }));

        assert_eq!(seen.lock().unwrap().as_slice(), &["Pending init".to_owned()]);

        bridge.relay().set_status(StatusKind::NoPrinter);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &["Pending init".to_owned(), "No Printer".to_owned()]
        );
    }

    #[test]
    fn rebinding_replaces_host_listener() {
        let (bridge, _) = harness(Vec::new());
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let listener: StatusListener = {
            let sink = Arc::clone(&seen);
            Arc::new(move |status: &str| sink.lock().unwrap().push(status.to_owned()))
        };
        bridge.bind(Arc::clone(&listener));
        bridge.bind(listener);
        assert_eq!(bridge.relay().listener_count(), 1);

        seen.lock().unwrap().clear();
        bridge.relay().set_status(StatusKind::NoPrinter);
        assert_eq!(seen.lock().unwrap().as_slice(), &["No Printer".to_owned()]);

        assert!(bridge.unbind());
        assert!(!bridge.unbind());
        bridge.relay().set_status(StatusKind::PendingInit);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn status_queries_return_current_text() {
        let (bridge, _) = harness(Vec::new());
        bridge
            .relay()
            .set_status(StatusKind::PrinterAddress("10.0.0.9".into()));

        assert_eq!(bridge.status(), "10.0.0.9");
        let mut delivered = String::new();
        bridge.get_status(|s| delivered = s.to_owned());
        assert_eq!(delivered, "10.0.0.9");
    }

    #[test]
    fn shutdown_detaches_provider() {
        let (bridge, calls) = harness(Vec::new());
        bridge.bind(Arc::new(|_: &str| {}));
        bridge.shutdown();
        assert_eq!(*calls.detached.lock().unwrap(), 1);
        assert_eq!(bridge.relay().listener_count(), 0);
    }

    #[test]
    fn from_config_selects_provider_and_journal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal_path = dir.path().join("journal.db");

        let config = BridgeConfig {
            journal_path: Some(journal_path.clone()),
            ..BridgeConfig::default()
        };
        let wifi = PrinterBridge::from_config(&config, stub::services());
        assert_eq!(wifi.provider_name(), "wifi_label");

        // Stub discovery finds nothing but still logs a scan event.
        assert_eq!(wifi.scan(), "");
        let journal = EventJournal::open(&journal_path).unwrap();
        assert_eq!(journal.recent(1).unwrap()[0].message, "Scan - 0");

        let config = BridgeConfig {
            provider: ProviderKind::PrintService,
            ..BridgeConfig::default()
        };
        let mut services = stub::services();
        services.cache_dir = dir.path().to_path_buf();
        let service = PrinterBridge::from_config(&config, services);
        assert_eq!(service.provider_name(), "print_service");
        assert_eq!(service.scan(), "Scan unavailable");
    }

    #[test]
    fn from_config_resolves_files_end_to_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("label.png");
        RgbImage::new(8, 8).save(&path).expect("save");

        let bridge = PrinterBridge::from_config(&BridgeConfig::default(), stub::services());
        bridge.check_init("192.168.1.20", "Brother QL-800");

        // The stub channel cannot open; the failure is contained.
        bridge.print_uris(&format!("file://{}", path.display()));
        assert_eq!(bridge.status(), "192.168.1.20");
    }
}
