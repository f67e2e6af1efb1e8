// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print-service provider.
//
// Printing is delegated to an installed third-party print service. Nothing
// here polls: every transition is driven by a host call or by a vendor
// callback delivered through `handle_callback`.
//
//   Detached --check_init--> Initializing --SdkConnected/RecentPrinters-->
//   Initialized --attach--> Attaching --Connected--> paper negotiation -->
//   Ready | NotConfigured                          (--detach--> Detached)
//
//   Initializing --library missing / start failure--> Unavailable
//
// Label images are written to temp JPEG files and their URIs pushed onto a
// LIFO `PendingImageQueue`; one is submitted immediately and the next each
// time the service reports a job finishing (or a short delay after a job
// starts). Images are only staged while `Ready`; losing the session drops
// whatever is still queued.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use image::DynamicImage;
use tracing::{debug, info, instrument, warn};

use labelbridge_core::config::ServiceConfig;
use labelbridge_core::error::{LabelBridgeError, Result};
use labelbridge_core::relay::StatusRelay;
use labelbridge_core::status::StatusKind;
use labelbridge_core::types::{BatchId, BitmapSize, PrinterSelection};

use crate::provider::{PrintProvider, SCAN_UNAVAILABLE};
use crate::queue::PendingImageQueue;
use crate::schedule::Scheduler;
use crate::sdk::{CallbackReply, PrintServiceSdk, ServiceCallback, ServiceOption};
use crate::temp_image::TempImageStore;

const SOURCE: &str = "print_service";

/// Lifecycle of the print-service session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceState {
    /// No SDK connection and no print session.
    #[default]
    Detached,
    /// SDK service starting / recent printers loading.
    Initializing,
    /// SDK ready, print session not yet opened.
    Initialized,
    /// The print service or its library pack is missing.
    Unavailable,
    /// Print session requested, waiting for `Connected`.
    Attaching,
    /// Session connected but the service has no current printer.
    NotConfigured,
    /// Paper negotiated; images are rendered at `bitmap`.
    Ready { printer: String, bitmap: BitmapSize },
}

impl ServiceState {
    fn has_session(&self) -> bool {
        matches!(
            self,
            Self::Attaching | Self::NotConfigured | Self::Ready { .. }
        )
    }
}

#[derive(Debug, Default)]
struct Session {
    state: ServiceState,
    queue: PendingImageQueue,
    job_active: bool,
}

/// State shared with delayed tasks.
struct Shared {
    sdk: Arc<dyn PrintServiceSdk>,
    relay: Arc<StatusRelay>,
    config: ServiceConfig,
    session: Mutex<Session>,
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ServiceState) {
        debug!(?state, "print service state");
        self.session().state = state;
    }

    /// Forget queued images and any job in flight.
    fn discard_pending(&self) {
        let dropped = {
            let mut session = self.session();
            session.job_active = false;
            session.queue.clear()
        };
        if dropped > 0 {
            warn!(dropped, "discarding label images queued for a lost session");
        }
    }

    /// Submit the most recently queued image, if any.
    fn dispatch_next(&self) {
        // The lock is released before calling into the SDK.
        let next = self.session().queue.pop();
        let Some(uri) = next else {
            debug!("no pending label images");
            return;
        };

        info!(%uri, "submitting label image to print service");
        if let Err(e) = self
            .sdk
            .print_uri(&self.config.job_title, &self.config.mime_type, &uri)
        {
            warn!(%uri, error = %e, "print service rejected label image");
            self.relay.log_error(SOURCE, &e.to_string());
        }
    }
}

/// Provider delegating to an installed print service.
pub struct PrintServiceProvider {
    shared: Arc<Shared>,
    store: TempImageStore,
    scheduler: Arc<dyn Scheduler>,
}

impl PrintServiceProvider {
    pub fn new(
        sdk: Arc<dyn PrintServiceSdk>,
        relay: Arc<StatusRelay>,
        config: ServiceConfig,
        store: TempImageStore,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                sdk,
                relay,
                config,
                session: Mutex::new(Session::default()),
            }),
            store,
            scheduler,
        }
    }

    pub fn state(&self) -> ServiceState {
        self.shared.session().state.clone()
    }

    /// Whether paper has been negotiated with a configured printer.
    pub fn is_ready(&self) -> bool {
        self.target_bitmap_size().is_some_and(|size| size.width > 0)
    }

    /// Bitmap size labels should be rendered at, once negotiated.
    pub fn target_bitmap_size(&self) -> Option<BitmapSize> {
        match self.shared.session().state {
            ServiceState::Ready { bitmap, .. } => Some(bitmap),
            _ => None,
        }
    }

    /// Number of label images waiting for the service.
    pub fn pending_images(&self) -> usize {
        self.shared.session().queue.len()
    }

    /// Whether the service reported a job in progress.
    pub fn is_printing(&self) -> bool {
        self.shared.session().job_active
    }

    fn publish(&self, status: StatusKind) {
        self.shared.relay.set_status(status);
    }

    fn start_sdk(&self) {
        self.shared.set_state(ServiceState::Initializing);
        self.publish(StatusKind::InitializingService);
        if let Err(e) = self.shared.sdk.start_sdk() {
            warn!(error = %e, "print service SDK failed to start");
            self.mark_unavailable();
        }
    }

    fn mark_unavailable(&self) {
        self.shared.set_state(ServiceState::Unavailable);
        self.publish(StatusKind::ServiceNotInstalled);
    }

    /// Open the print session and register both callback sets.
    fn attach(&self) {
        self.shared.set_state(ServiceState::Attaching);
        self.publish(StatusKind::DetectingPrinter);

        if let Err(e) = self.shared.sdk.run_service() {
            warn!(error = %e, "failed to start print service session");
            self.shared.set_state(ServiceState::Initialized);
            self.publish(StatusKind::ServiceError(e.to_string()));
            return;
        }
        if let Err(e) = self.shared.sdk.register_print_callbacks() {
            warn!(error = %e, "failed to register print callbacks");
        }
    }

    /// Read the current printer's paper and apply the layout policy.
    fn negotiate_paper(&self) {
        let printer = match self.shared.sdk.current_printer() {
            Ok(Some(printer)) => printer,
            Ok(None) => {
                self.shared.set_state(ServiceState::NotConfigured);
                self.publish(StatusKind::PrinterNotConfigured);
                return;
            }
            Err(e) => {
                self.publish(StatusKind::ServiceError(e.to_string()));
                return;
            }
        };

        let bitmap = self
            .shared
            .config
            .bitmap_override
            .unwrap_or_else(|| printer.geometry.rotated_bitmap_size());

        if let Err(e) = self.apply_image_options() {
            warn!(error = %e, "failed to apply image options");
            self.publish(StatusKind::ServiceError(e.to_string()));
            return;
        }

        info!(printer = %printer.name, ?bitmap, "print service printer ready");
        self.shared.set_state(ServiceState::Ready {
            printer: printer.name.clone(),
            bitmap,
        });
        self.publish(StatusKind::PrinterReady { name: printer.name });
    }

    fn apply_image_options(&self) -> Result<()> {
        let overrides = &self.shared.config.image_options;
        let mut options = self.shared.sdk.image_options()?;
        for option in &mut options {
            let index = overrides.index_for(&option.id);
            apply_override(option, index);
        }
        self.shared.sdk.set_image_options(&options)
    }

    fn schedule_nudge(&self) {
        let shared = Arc::clone(&self.shared);
        let delay = Duration::from_millis(self.shared.config.queue_nudge_delay_ms);
        self.scheduler
            .schedule_once(delay, Box::new(move || shared.dispatch_next()));
    }
}

fn apply_override(option: &mut ServiceOption, index: Option<usize>) {
    let Some(index) = index else { return };
    match option.values.get(index) {
        Some(value) => option.value = Some(value.clone()),
        None => warn!(
            option = %option.id,
            index,
            choices = option.values.len(),
            "image option choice out of range; left unchanged"
        ),
    }
}

impl PrintProvider for PrintServiceProvider {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn check_init(&self, _selection: &PrinterSelection) {
        // The print service owns printer selection; address and model are
        // not used.
        match self.state() {
            ServiceState::Detached => self.start_sdk(),
            ServiceState::Unavailable => self.publish(StatusKind::ServiceNotInstalled),
            ServiceState::Initialized => self.attach(),
            state => debug!(?state, "print service already initialising or attached"),
        }
    }

    fn configure(&self) {
        if let Err(e) = self.shared.sdk.setup_current_printer() {
            warn!(error = %e, "print service setup unavailable");
            self.publish(StatusKind::InstallServiceRequired);
        }
    }

    #[instrument(skip_all, fields(images = images.len()))]
    fn print_bitmaps(&self, images: &[DynamicImage]) {
        let state = self.state();
        if !matches!(state, ServiceState::Ready { .. }) {
            let reason = match state {
                ServiceState::Unavailable => LabelBridgeError::ServiceNotInstalled,
                _ => LabelBridgeError::NoPrinterConfigured,
            };
            warn!(?state, error = %reason, "print service not ready; labels not printed");
            self.shared.relay.log_error(SOURCE, &reason.to_string());
            return;
        }

        let batch = BatchId::new();
        for (index, image) in images.iter().enumerate() {
            match self.store.persist_uri(image, index) {
                Ok(uri) => self.shared.session().queue.push(uri),
                Err(e) => {
                    warn!(%batch, index, error = %e, "could not stage label image; skipped");
                    self.shared.relay.log_error(SOURCE, &e.to_string());
                }
            }
        }
        info!(%batch, pending = self.pending_images(), "label images queued");

        if let Err(e) = self.shared.sdk.register_print_callbacks() {
            warn!(error = %e, "failed to re-register print callbacks");
        }
        self.shared.dispatch_next();
    }

    fn scan(&self) -> Vec<String> {
        vec![SCAN_UNAVAILABLE.to_owned()]
    }

    fn handle_callback(&self, callback: ServiceCallback) -> CallbackReply {
        match callback {
            // -- SDK bootstrap --
            ServiceCallback::SdkConnected => {
                if let Err(e) = self.shared.sdk.init_recent_printers() {
                    warn!(error = %e, "failed to load recent printers");
                    self.publish(StatusKind::ServiceError(e.to_string()));
                }
            }
            ServiceCallback::SdkDisconnected => {
                if self.state() == ServiceState::Initialized {
                    self.shared.set_state(ServiceState::Detached);
                }
            }
            ServiceCallback::RecentPrintersInitialized { library_installed } => {
                if library_installed {
                    self.shared.set_state(ServiceState::Initialized);
                    self.publish(StatusKind::ServiceInitialized);
                    self.attach();
                } else {
                    self.mark_unavailable();
                }
            }

            // -- Service lifecycle --
            ServiceCallback::Connected => {
                self.publish(StatusKind::ServiceConnected);
                self.negotiate_paper();
            }
            ServiceCallback::Disconnected => {
                self.shared.discard_pending();
                self.shared.set_state(ServiceState::Initialized);
                self.publish(StatusKind::ServiceDisconnected);
            }
            ServiceCallback::FileOpen { progress, finished } => {
                debug!(progress, finished, "print service file open");
            }
            ServiceCallback::LibraryDownload { progress } => {
                debug!(progress, "print service library download");
            }
            ServiceCallback::RenderLibraryCheck {
                render_library,
                font_library,
            } => {
                debug!(render_library, font_library, "print service library check");
                return CallbackReply::Flag(true);
            }
            ServiceCallback::PasswordRequired => {
                debug!("print service password prompt");
                return CallbackReply::Password(self.shared.config.service_password.clone());
            }
            ServiceCallback::Error(message) => {
                self.shared.relay.log_error(SOURCE, &message);
                self.publish(StatusKind::ServiceError(message));
            }

            // -- Print job --
            ServiceCallback::StartingJob => {
                self.shared.session().job_active = true;
                debug!("print job starting");
            }
            ServiceCallback::Started => {
                self.shared.session().job_active = true;
                debug!("print job started");
                self.schedule_nudge();
            }
            ServiceCallback::SendingPage { page, progress } => {
                debug!(page, progress, "sending page");
            }
            ServiceCallback::PreparingPage { page } => {
                debug!(page, "preparing page");
            }
            ServiceCallback::NeedCancel => return CallbackReply::Flag(false),
            ServiceCallback::FinishingJob => self.shared.dispatch_next(),
            ServiceCallback::Finished {
                result,
                pages_printed,
            } => {
                self.shared.session().job_active = false;
                info!(%result, pages_printed, "print job finished");
                self.shared.dispatch_next();
            }
        }
        CallbackReply::Done
    }

    fn detach(&self) {
        self.shared.discard_pending();
        if !self.state().has_session() {
            debug!("print service not attached; nothing to detach");
            return;
        }
        let sdk = &self.shared.sdk;
        if let Err(e) = sdk.stop_service() {
            warn!(error = %e, "failed to stop print service");
        }
        if let Err(e) = sdk.clear_service_callbacks() {
            warn!(error = %e, "failed to clear service callbacks");
        }
        if let Err(e) = sdk.clear_print_callbacks() {
            warn!(error = %e, "failed to clear print callbacks");
        }
        self.shared.set_state(ServiceState::Detached);
        info!("print service detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::ServicePrinter;
    use image::RgbImage;
    use labelbridge_core::events::{BridgeEvent, EventSink};
    use labelbridge_core::types::PaperGeometry;

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
        printed: Vec<String>,
        applied: Vec<ServiceOption>,
    }

    #[derive(Default)]
    struct FakeService {
        log: Mutex<Log>,
        fail_start: bool,
        fail_setup: bool,
        printer: Option<ServicePrinter>,
    }

    impl FakeService {
        fn record(&self, call: &str) {
            self.log.lock().unwrap().calls.push(call.to_owned());
        }

        fn calls(&self) -> Vec<String> {
            self.log.lock().unwrap().calls.clone()
        }

        fn printed(&self) -> Vec<String> {
            self.log.lock().unwrap().printed.clone()
        }
    }

    impl PrintServiceSdk for FakeService {
        fn start_sdk(&self) -> Result<()> {
            self.record("start_sdk");
            if self.fail_start {
                Err(LabelBridgeError::ServiceNotInstalled)
            } else {
                Ok(())
            }
        }

        fn init_recent_printers(&self) -> Result<()> {
            self.record("init_recent_printers");
            Ok(())
        }

        fn run_service(&self) -> Result<()> {
            self.record("run_service");
            Ok(())
        }

        fn register_print_callbacks(&self) -> Result<()> {
            self.record("register_print_callbacks");
            Ok(())
        }

        fn current_printer(&self) -> Result<Option<ServicePrinter>> {
            Ok(self.printer.clone())
        }

        fn image_options(&self) -> Result<Vec<ServiceOption>> {
            let option = |id: &str, values: &[&str]| ServiceOption {
                id: id.into(),
                values: values.iter().map(|v| v.to_string()).collect(),
                value: None,
            };
            Ok(vec![
                option("size", &["fit", "fill", "original"]),
                option("orientation", &["auto", "portrait", "landscape"]),
                option("margins", &["none", "minimal"]),
                option("align", &["top", "center"]),
                option("crop", &["no", "yes"]),
                option("copies", &["1", "2"]),
            ])
        }

        fn set_image_options(&self, options: &[ServiceOption]) -> Result<()> {
            self.log.lock().unwrap().applied = options.to_vec();
            Ok(())
        }

        fn print_uri(&self, title: &str, mime_type: &str, uri: &str) -> Result<()> {
            assert_eq!(title, "label 1");
            assert_eq!(mime_type, "image/jpg");
            self.log.lock().unwrap().printed.push(uri.to_owned());
            Ok(())
        }

        fn setup_current_printer(&self) -> Result<()> {
            self.record("setup_current_printer");
            if self.fail_setup {
                Err(LabelBridgeError::PrintService("service missing".into()))
            } else {
                Ok(())
            }
        }

        fn stop_service(&self) -> Result<()> {
            self.record("stop_service");
            Ok(())
        }

        fn clear_service_callbacks(&self) -> Result<()> {
            self.record("clear_service_callbacks");
            Ok(())
        }

        fn clear_print_callbacks(&self) -> Result<()> {
            self.record("clear_print_callbacks");
            Ok(())
        }
    }

    #[derive(Default)]
    struct ErrorSink(Mutex<Vec<String>>);

    impl EventSink for ErrorSink {
        fn emit(&self, event: &BridgeEvent) {
            if let BridgeEvent::Error { message, .. } = event {
                self.0.lock().unwrap().push(message.clone());
            }
        }
    }

    /// Holds scheduled tasks until the test runs them.
    #[derive(Default)]
    struct ManualScheduler {
        tasks: Mutex<Vec<(Duration, Box<dyn FnOnce() + Send>)>>,
    }

    impl Scheduler for ManualScheduler {
        fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce() + Send + 'static>) {
            self.tasks.lock().unwrap().push((delay, task));
        }
    }

    impl ManualScheduler {
        fn run_all(&self) -> Vec<Duration> {
            let tasks: Vec<_> = self.tasks.lock().unwrap().drain(..).collect();
            tasks
                .into_iter()
                .map(|(delay, task)| {
                    task();
                    delay
                })
                .collect()
        }
    }

    struct Harness {
        provider: PrintServiceProvider,
        sdk: Arc<FakeService>,
        relay: Arc<StatusRelay>,
        scheduler: Arc<ManualScheduler>,
        _cache: tempfile::TempDir,
    }

    fn lobby_printer() -> ServicePrinter {
        ServicePrinter {
            name: "Lobby QL".into(),
            geometry: PaperGeometry {
                width: 252,
                height: 82,
                h_dpi: 300,
                v_dpi: 300,
            },
        }
    }

    fn harness_with(sdk: FakeService, config: ServiceConfig) -> Harness {
        let cache = tempfile::tempdir().expect("tempdir");
        let sdk = Arc::new(sdk);
        let relay = Arc::new(StatusRelay::new());
        let scheduler = Arc::new(ManualScheduler::default());
        let store = TempImageStore::new(cache.path(), &config.temp_subdir, config.jpeg_quality);
        let provider = PrintServiceProvider::new(
            sdk.clone(),
            Arc::clone(&relay),
            config,
            store,
            scheduler.clone(),
        );
        Harness {
            provider,
            sdk,
            relay,
            scheduler,
            _cache: cache,
        }
    }

    fn harness() -> Harness {
        harness_with(
            FakeService {
                printer: Some(lobby_printer()),
                ..FakeService::default()
            },
            ServiceConfig::default(),
        )
    }

    /// Drive the provider through bootstrap and attach to `Ready`.
    fn bring_up(h: &Harness) {
        h.provider.check_init(&PrinterSelection::default());
        h.provider.handle_callback(ServiceCallback::SdkConnected);
        h.provider
            .handle_callback(ServiceCallback::RecentPrintersInitialized {
                library_installed: true,
            });
        h.provider.handle_callback(ServiceCallback::Connected);
    }

    fn labels(n: usize) -> Vec<DynamicImage> {
        (0..n)
            .map(|i| DynamicImage::ImageRgb8(RgbImage::new(10 + i as u32, 10)))
            .collect()
    }

    #[test]
    fn first_check_init_starts_sdk() {
        let h = harness();
        h.provider.check_init(&PrinterSelection::new("ignored", "ignored"));

        assert_eq!(h.provider.state(), ServiceState::Initializing);
        assert_eq!(h.relay.status_text(), "Initializing print service.");
        assert_eq!(h.sdk.calls(), vec!["start_sdk"]);
    }

    #[test]
    fn bootstrap_reaches_ready_with_override_size() {
        let h = harness();
        bring_up(&h);

        assert_eq!(h.relay.status_text(), "Printer ready: Lobby QL");
        assert!(h.provider.is_ready());
        assert_eq!(
            h.provider.target_bitmap_size(),
            Some(BitmapSize::check_in_label())
        );
        assert_eq!(
            h.sdk.calls(),
            vec![
                "start_sdk",
                "init_recent_printers",
                "run_service",
                "register_print_callbacks"
            ]
        );
    }

    #[test]
    fn geometry_size_used_without_override() {
        let config = ServiceConfig {
            bitmap_override: None,
            ..ServiceConfig::default()
        };
        let h = harness_with(
            FakeService {
                printer: Some(lobby_printer()),
                ..FakeService::default()
            },
            config,
        );
        bring_up(&h);

        assert_eq!(
            h.provider.target_bitmap_size(),
            Some(BitmapSize {
                width: 82 * 300 / 72,
                height: 252 * 300 / 72
            })
        );
    }

    #[test]
    fn layout_overrides_applied_by_index() {
        let h = harness();
        bring_up(&h);

        let applied = h.sdk.log.lock().unwrap().applied.clone();
        let value = |id: &str| {
            applied
                .iter()
                .find(|o| o.id == id)
                .and_then(|o| o.value.clone())
        };
        assert_eq!(value("size").as_deref(), Some("fill"));
        assert_eq!(value("orientation").as_deref(), Some("landscape"));
        assert_eq!(value("margins").as_deref(), Some("none"));
        assert_eq!(value("align").as_deref(), Some("center"));
        assert_eq!(value("crop").as_deref(), Some("yes"));
        assert_eq!(value("copies"), None);
    }

    #[test]
    fn no_current_printer_is_not_configured() {
        let h = harness_with(FakeService::default(), ServiceConfig::default());
        bring_up(&h);

        assert_eq!(h.provider.state(), ServiceState::NotConfigured);
        assert_eq!(h.relay.status(), StatusKind::PrinterNotConfigured);
        assert!(!h.provider.is_ready());
        assert_eq!(h.provider.target_bitmap_size(), None);
    }

    #[test]
    fn missing_library_pack_degrades_to_advisory() {
        let h = harness();
        h.provider.check_init(&PrinterSelection::default());
        h.provider.handle_callback(ServiceCallback::SdkConnected);
        h.provider
            .handle_callback(ServiceCallback::RecentPrintersInitialized {
                library_installed: false,
            });

        assert_eq!(h.provider.state(), ServiceState::Unavailable);
        assert_eq!(
            h.relay.status_text(),
            "Print service required to enable printing.  You may still check in."
        );

        // Checking in again repeats the advisory without restarting the SDK.
        h.relay.set_status(StatusKind::PendingInit);
        h.provider.check_init(&PrinterSelection::default());
        assert_eq!(h.relay.status(), StatusKind::ServiceNotInstalled);
        assert_eq!(
            h.sdk.calls().iter().filter(|c| *c == "start_sdk").count(),
            1
        );
    }

    #[test]
    fn sdk_start_failure_is_unavailable() {
        let h = harness_with(
            FakeService {
                fail_start: true,
                ..FakeService::default()
            },
            ServiceConfig::default(),
        );
        h.provider.check_init(&PrinterSelection::default());
        assert_eq!(h.provider.state(), ServiceState::Unavailable);
        assert_eq!(h.relay.status(), StatusKind::ServiceNotInstalled);
    }

    #[test]
    fn queued_images_are_served_last_in_first_out() {
        let h = harness();
        bring_up(&h);

        h.provider.print_bitmaps(&labels(3));

        // The newest image goes out immediately.
        let printed = h.sdk.printed();
        assert_eq!(printed.len(), 1);
        assert!(printed[0].contains("image2_"), "{printed:?}");
        assert_eq!(h.provider.pending_images(), 2);

        h.provider.handle_callback(ServiceCallback::FinishingJob);
        h.provider.handle_callback(ServiceCallback::Finished {
            result: "OK".into(),
            pages_printed: 1,
        });

        let printed = h.sdk.printed();
        assert_eq!(printed.len(), 3);
        assert!(printed[1].contains("image1_"), "{printed:?}");
        assert!(printed[2].contains("image0_"), "{printed:?}");
        assert_eq!(h.provider.pending_images(), 0);
    }

    #[test]
    fn printing_before_ready_stages_nothing() {
        let h = harness();
        let errors = Arc::new(ErrorSink::default());
        h.relay.add_sink(errors.clone());

        h.provider.print_bitmaps(&labels(3));
        assert_eq!(h.provider.pending_images(), 0);
        assert!(h.sdk.printed().is_empty());
        assert_eq!(
            *errors.0.lock().unwrap(),
            vec!["no printer configured in the print service"]
        );

        bring_up(&h);
        h.provider.print_bitmaps(&labels(1));
        h.provider.handle_callback(ServiceCallback::FinishingJob);
        h.provider.handle_callback(ServiceCallback::Finished {
            result: "OK".into(),
            pages_printed: 1,
        });

        let printed = h.sdk.printed();
        assert_eq!(printed.len(), 1, "{printed:?}");
        assert!(printed[0].contains("image0_"), "{printed:?}");
    }

    #[test]
    fn printing_while_unavailable_reports_missing_service() {
        let h = harness_with(
            FakeService {
                fail_start: true,
                ..FakeService::default()
            },
            ServiceConfig::default(),
        );
        let errors = Arc::new(ErrorSink::default());
        h.relay.add_sink(errors.clone());
        h.provider.check_init(&PrinterSelection::default());

        h.provider.print_bitmaps(&labels(2));
        assert_eq!(h.provider.pending_images(), 0);
        assert!(h.sdk.printed().is_empty());
        assert_eq!(
            *errors.0.lock().unwrap(),
            vec!["print service is not installed"]
        );
        assert_eq!(h.relay.status(), StatusKind::ServiceNotInstalled);
    }

    #[test]
    fn lost_session_drops_queued_images() {
        let h = harness();
        bring_up(&h);
        h.provider.print_bitmaps(&labels(3));
        h.provider.handle_callback(ServiceCallback::Started);
        assert_eq!(h.provider.pending_images(), 2);

        h.provider.detach();
        assert_eq!(h.provider.pending_images(), 0);
        assert!(!h.provider.is_printing());

        // A nudge scheduled before detaching finds nothing to send.
        h.scheduler.run_all();
        assert_eq!(h.sdk.printed().len(), 1);

        let h = harness();
        bring_up(&h);
        h.provider.print_bitmaps(&labels(2));
        h.provider.handle_callback(ServiceCallback::Disconnected);
        assert_eq!(h.provider.pending_images(), 0);
        h.provider.handle_callback(ServiceCallback::Finished {
            result: "OK".into(),
            pages_printed: 1,
        });
        assert_eq!(h.sdk.printed().len(), 1);
    }

    #[test]
    fn job_start_schedules_one_nudge() {
        let h = harness();
        bring_up(&h);
        h.provider.print_bitmaps(&labels(2));
        assert_eq!(h.sdk.printed().len(), 1);

        h.provider.handle_callback(ServiceCallback::Started);
        assert!(h.provider.is_printing());
        assert_eq!(h.sdk.printed().len(), 1);

        let delays = h.scheduler.run_all();
        assert_eq!(delays, vec![Duration::from_millis(3000)]);
        assert_eq!(h.sdk.printed().len(), 2);

        // Nudging an empty queue is a silent no-op.
        h.provider.handle_callback(ServiceCallback::Started);
        h.scheduler.run_all();
        assert_eq!(h.sdk.printed().len(), 2);
    }

    #[test]
    fn staged_images_are_jpeg_files() {
        let h = harness();
        bring_up(&h);
        h.provider.print_bitmaps(&labels(1));

        let uri = h.sdk.printed().remove(0);
        let path = uri.strip_prefix("file://").expect("file uri");
        assert!(path.ends_with(".jpg"));
        assert!(std::path::Path::new(path).exists());
        assert!(path.contains("/.temp/"));
    }

    #[test]
    fn callbacks_needing_replies() {
        let h = harness();
        assert_eq!(
            h.provider.handle_callback(ServiceCallback::PasswordRequired),
            CallbackReply::Password("password".into())
        );
        assert_eq!(
            h.provider.handle_callback(ServiceCallback::RenderLibraryCheck {
                render_library: false,
                font_library: true
            }),
            CallbackReply::Flag(true)
        );
        assert_eq!(
            h.provider.handle_callback(ServiceCallback::NeedCancel),
            CallbackReply::Flag(false)
        );
        assert_eq!(
            h.provider
                .handle_callback(ServiceCallback::SendingPage { page: 1, progress: 50 }),
            CallbackReply::Done
        );
    }

    #[test]
    fn service_error_becomes_status() {
        let h = harness();
        h.provider
            .handle_callback(ServiceCallback::Error("RemoteException".into()));
        assert_eq!(h.relay.status_text(), "error, RemoteException");
    }

    #[test]
    fn configure_failure_asks_for_install() {
        let h = harness_with(
            FakeService {
                fail_setup: true,
                ..FakeService::default()
            },
            ServiceConfig::default(),
        );
        h.provider.configure();
        assert_eq!(h.relay.status(), StatusKind::InstallServiceRequired);

        let ok = harness();
        ok.provider.configure();
        ok.provider.configure();
        assert_eq!(ok.relay.status(), StatusKind::PendingInit);
    }

    #[test]
    fn scan_is_unavailable() {
        let h = harness();
        assert_eq!(h.provider.scan(), vec![SCAN_UNAVAILABLE]);
    }

    #[test]
    fn detach_is_safe_when_never_attached() {
        let h = harness();
        h.provider.detach();
        assert!(h.sdk.calls().is_empty());
        assert_eq!(h.provider.state(), ServiceState::Detached);
    }

    #[test]
    fn detach_tears_down_session_once() {
        let h = harness();
        bring_up(&h);
        h.provider.detach();
        h.provider.detach();

        let calls = h.sdk.calls();
        assert_eq!(calls.iter().filter(|c| *c == "stop_service").count(), 1);
        assert!(calls.contains(&"clear_service_callbacks".to_owned()));
        assert!(calls.contains(&"clear_print_callbacks".to_owned()));
        assert_eq!(h.provider.state(), ServiceState::Detached);
    }

    #[test]
    fn disconnect_then_check_init_reattaches() {
        let h = harness();
        bring_up(&h);
        h.provider.handle_callback(ServiceCallback::Disconnected);
        assert_eq!(h.relay.status(), StatusKind::ServiceDisconnected);
        assert_eq!(h.provider.state(), ServiceState::Initialized);

        h.provider.check_init(&PrinterSelection::default());
        assert_eq!(h.provider.state(), ServiceState::Attaching);
        assert_eq!(h.relay.status(), StatusKind::DetectingPrinter);
    }
}
