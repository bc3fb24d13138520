//! The content factory and the process-wide runtime state.
//!
//! [`ContentRuntime`] owns the library registry, the live instances, the
//! asset cache, the DOM surface and the window event source. It is empty
//! at start and returns to empty on [`ContentRuntime::teardown`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use serde_json::{json, Value};

use crate::assets::{AssetFetcher, AssetLoader, LoadReport};
use crate::config::RuntimeConfig;
use crate::content::{Attachment, ContentId, ContentSettings};
use crate::dom::{DomSurface, NodeId};
use crate::error::{AssetLoadError, DomError, RuntimeError, RuntimeResult};
use crate::events::{Event, EventDispatcher, EventKind};
use crate::instances::{ContentInstance, InstanceRegistry};
use crate::integration::{ContentIndex, NOT_FOUND_MESSAGE};
use crate::library::{LibraryReference, LibraryRegistry};

/// Attribute carrying the content id on a boot container.
pub const CONTENT_ID_ATTRIBUTE: &str = "data-content-id";

/// Class of the element rendered when there is nothing to show.
pub const NOT_FOUND_CLASS: &str = "h5p-content-not-found";

/// Work unblocked by an asset batch, run by the runtime after the loader
/// returns.
enum Ready {
    Create {
        id: ContentId,
        container: NodeId,
        library: LibraryReference,
        params: Value,
        metadata: Option<Value>,
        report: LoadReport,
    },
    Assets {
        id: ContentId,
        instance: Weak<ContentInstance>,
        report: LoadReport,
    },
}

type ReadyQueue = Rc<RefCell<VecDeque<Ready>>>;

/// A boot item that could not be turned into an instance.
#[derive(Debug)]
pub struct BootFailure {
    pub container: NodeId,
    pub content_id: Option<ContentId>,
    pub error: RuntimeError,
}

/// Outcome of [`ContentRuntime::boot`] and of asset completions that
/// unblocked boot items.
#[derive(Debug, Default)]
pub struct BootReport {
    /// Instances created, in creation order.
    pub created: Vec<ContentId>,
    /// Items waiting for their library scripts.
    pub pending: Vec<ContentId>,
    pub failures: Vec<BootFailure>,
    /// Containers that received the "not found" message.
    pub not_found: Vec<NodeId>,
    /// Per-path asset failures met along the way.
    pub asset_failures: Vec<AssetLoadError>,
}

impl BootReport {
    fn merge(&mut self, other: BootReport) {
        self.created.extend(other.created);
        let created = &self.created;
        self.pending.retain(|id| !created.contains(id));
        self.failures.extend(other.failures);
        self.not_found.extend(other.not_found);
        self.asset_failures.extend(other.asset_failures);
    }
}

/// Instantiates content and mediates between instances and the host.
pub struct ContentRuntime<D: DomSurface> {
    libraries: LibraryRegistry,
    instances: InstanceRegistry,
    assets: AssetLoader,
    dom: D,
    window: EventDispatcher,
    config: RuntimeConfig,
    ready: ReadyQueue,
}

impl<D: DomSurface> ContentRuntime<D> {
    /// Create a runtime over a DOM surface.
    pub fn new(
        dom: D,
        libraries: LibraryRegistry,
        fetcher: Box<dyn AssetFetcher>,
        config: RuntimeConfig,
    ) -> Self {
        let assets = AssetLoader::new(fetcher, Box::new(config.clone()))
            .with_external_prefixes(config.external_prefixes.clone());
        Self {
            libraries,
            instances: InstanceRegistry::new(),
            assets,
            dom,
            window: EventDispatcher::new(),
            config,
            ready: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn libraries(&self) -> &LibraryRegistry {
        &self.libraries
    }

    pub fn libraries_mut(&mut self) -> &mut LibraryRegistry {
        &mut self.libraries
    }

    pub fn instances(&self) -> &InstanceRegistry {
        &self.instances
    }

    pub fn assets(&self) -> &AssetLoader {
        &self.assets
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Event source for window-level notifications (resize).
    pub fn window(&self) -> &EventDispatcher {
        &self.window
    }

    /// Instantiate a content and register it.
    ///
    /// Steps, in order: resolve the library, construct, attach to `region`
    /// (or append the pre-built container), dispatch `attach`, bind window
    /// resize unless `skip_resize`, dispatch `init`, register.
    ///
    /// A live instance with the same id makes this fail with
    /// [`RuntimeError::DuplicateInstance`]; the existing one is untouched.
    pub fn create(
        &mut self,
        library: &LibraryReference,
        id: ContentId,
        region: Option<NodeId>,
        params: Value,
        metadata: Option<Value>,
        skip_resize: bool,
    ) -> RuntimeResult<Rc<ContentInstance>> {
        if self.instances.contains(id) {
            return Err(RuntimeError::DuplicateInstance(id));
        }
        let constructor = self.libraries.resolve(library)?.constructor;

        let events = Rc::new(EventDispatcher::for_content(id));
        let settings = ContentSettings {
            parent: None,
            library: library.clone(),
            metadata,
            events: Rc::clone(&events),
        };
        let content = constructor(params, id, settings, &mut self.dom)
            .map_err(|source| RuntimeError::Parameters { content_id: id, source })?;
        let instance = Rc::new(ContentInstance::new(
            id,
            library.clone(),
            Rc::clone(&events),
            content,
        ));

        if let Some(region) = region {
            if let Err(source) = self.attach(&instance, region) {
                tracing::warn!(content_id = %id, error = %source, "attaching content failed");
                self.detach(&instance);
                return Err(RuntimeError::Attach { content_id: id, source });
            }
            instance.set_region(Some(region));
            events.dispatch(Event::with_data(EventKind::Attach, json!({ "container": region.0 })));
        }

        if !skip_resize {
            let target = Rc::downgrade(&events);
            let binding = self.window.subscribe(EventKind::Resize, move |_| {
                if let Some(events) = target.upgrade() {
                    events.dispatch(EventKind::Resize);
                }
            });
            instance.set_resize_binding(Some(binding));
        }

        events.dispatch(EventKind::Init);
        self.instances.register(Rc::clone(&instance));
        tracing::info!(content_id = %id, library = %library, "content instance created");
        Ok(instance)
    }

    fn attach(&mut self, instance: &ContentInstance, region: NodeId) -> Result<(), DomError> {
        let attachment = held(instance, || instance.content_mut().attach(&mut self.dom, region))?;
        if attachment == Attachment::Unsupported {
            if let Some(container) = instance.content().container() {
                self.dom.append_child(region, container)?;
            }
        }
        Ok(())
    }

    /// Undo DOM wiring and the resize binding of an instance.
    fn detach(&mut self, instance: &ContentInstance) {
        if let Some(binding) = instance.take_resize_binding() {
            self.window.unsubscribe(binding);
        }
        let container = held(instance, || {
            let mut content = instance.content_mut();
            content.detach(&mut self.dom);
            content.container()
        });
        if let Some(container) = container {
            if let Some(parent) = self.dom.parent(container) {
                if let Err(err) = self.dom.remove_child(parent, container) {
                    tracing::warn!(
                        content_id = %instance.id,
                        error = %err,
                        "removing content container failed"
                    );
                }
            }
        }
        instance.set_region(None);
    }

    /// Remove a live instance: unbind resize, detach from the DOM and
    /// unregister. The returned handle still owns the content and its
    /// parameters.
    pub fn remove(&mut self, id: ContentId) -> RuntimeResult<Rc<ContentInstance>> {
        let instance = self.instances.find_by_id(id).ok_or(RuntimeError::NotFound(id))?;
        self.detach(&instance);
        self.instances.unregister(&instance);
        tracing::info!(content_id = %id, "content instance removed");
        Ok(instance)
    }

    /// Dispatch an event on a live instance from outside.
    pub fn trigger(&self, id: ContentId, event: impl Into<Event>) -> RuntimeResult<Event> {
        let instance = self.instances.find_by_id(id).ok_or(RuntimeError::NotFound(id))?;
        Ok(instance.events().dispatch(event))
    }

    /// Route a click on `node` to the instance owning the nearest binding.
    ///
    /// Returns `false` if nothing handled it.
    pub fn click(&mut self, node: NodeId) -> bool {
        let Some((bound, binding)) = self.dom.closest_binding(node) else {
            return false;
        };
        let Some(instance) = self.instances.find_by_id(binding.owner) else {
            tracing::warn!(
                node = %bound,
                owner = %binding.owner,
                "input bound to an unknown instance"
            );
            return false;
        };

        tracing::debug!(content_id = %instance.id, action = ?binding.action, "routing input");
        held(&instance, || instance.content_mut().handle_input(&mut self.dom, &binding.action));
        true
    }

    /// Notify every instance with a live resize binding.
    pub fn resize_window(&self) {
        self.window.dispatch(EventKind::Resize);
    }

    /// Run `f` on the concrete content of a live instance.
    pub fn with_instance_mut<T, R>(
        &mut self,
        id: ContentId,
        f: impl FnOnce(&mut T, &mut D) -> R,
    ) -> Option<R>
    where
        T: crate::content::Content,
    {
        let instance = self.instances.find_by_id(id)?;
        held(&instance, || {
            let mut content = instance.downcast_mut::<T>()?;
            Some(f(&mut *content, &mut self.dom))
        })
    }

    /// Scan the DOM for content containers and instantiate each of them.
    ///
    /// Every container selected by the configured selector must carry a
    /// `data-content-id`. Library styles and scripts are requested first;
    /// the instance is created once its scripts completed, which may be
    /// immediately or on a later [`Self::asset_completed`]. One failing
    /// item never stops the others.
    pub fn boot(&mut self, index: &dyn ContentIndex) -> BootReport {
        let mut report = BootReport::default();
        let root = self.dom.root();
        let containers = self.dom.query_selector_all(root, &self.config.content_selector);

        if index.entries().is_empty() {
            let targets = if containers.is_empty() { vec![root] } else { containers };
            for container in targets {
                self.render_not_found(container, &mut report);
            }
            tracing::info!("content index is empty");
            return report;
        }

        for container in containers {
            let id = match self
                .dom
                .attribute(container, CONTENT_ID_ATTRIBUTE)
                .map(str::parse::<ContentId>)
            {
                Some(Ok(id)) => id,
                _ => {
                    tracing::warn!(container = %container, "content container without a valid id");
                    report.failures.push(BootFailure {
                        container,
                        content_id: None,
                        error: RuntimeError::MissingContentId(container),
                    });
                    continue;
                }
            };

            let Some(bundle) = index.bundle(id) else {
                tracing::warn!(content_id = %id, "no bundle for content");
                self.render_not_found(container, &mut report);
                report.failures.push(BootFailure {
                    container,
                    content_id: Some(id),
                    error: RuntimeError::MissingBundle(id),
                });
                continue;
            };

            let (scripts, styles) = match self.libraries.resolve(&bundle.library) {
                Ok(definition) => (definition.scripts.clone(), definition.styles.clone()),
                Err(err) => {
                    tracing::warn!(content_id = %id, error = %err, "library resolution failed");
                    report.failures.push(BootFailure {
                        container,
                        content_id: Some(id),
                        error: err.into(),
                    });
                    continue;
                }
            };

            report
                .asset_failures
                .extend(self.assets.load_styles(&styles, Some(&bundle.library)));

            report.pending.push(id);
            let ready = Rc::clone(&self.ready);
            let library = bundle.library.clone();
            self.assets.load_scripts(
                &scripts,
                move |loaded| {
                    ready.borrow_mut().push_back(Ready::Create {
                        id,
                        container,
                        library,
                        params: bundle.params,
                        metadata: bundle.metadata,
                        report: loaded,
                    });
                },
                Some(&bundle.library),
            );
            report.merge(self.drain_ready());
        }

        tracing::info!(
            created = report.created.len(),
            pending = report.pending.len(),
            failed = report.failures.len(),
            "boot finished"
        );
        report
    }

    fn render_not_found(&mut self, container: NodeId, report: &mut BootReport) {
        let rendered = self
            .dom
            .create_with_classes("p", &[NOT_FOUND_CLASS])
            .and_then(|node| {
                self.dom.set_text(node, NOT_FOUND_MESSAGE)?;
                self.dom.append_child(container, node)
            });
        match rendered {
            Ok(()) => report.not_found.push(container),
            Err(err) => tracing::warn!(
                container = %container,
                error = %err,
                "could not render not-found state"
            ),
        }
    }

    /// Report a finished fetch to the asset cache and run whatever it
    /// unblocked. A failed fetch, script or style, shows up in
    /// [`BootReport::asset_failures`].
    pub fn asset_completed(&mut self, url: &str, result: Result<(), String>) -> BootReport {
        let completion = self.assets.complete(url, result);
        let mut report = self.drain_ready();
        report.asset_failures.extend(completion.failures);
        report
    }

    /// Load extra assets on behalf of a live instance. Once the scripts
    /// completed, `assets-loaded` is dispatched on the instance, but only if
    /// it is still registered by then.
    pub fn load_instance_assets(
        &mut self,
        id: ContentId,
        scripts: &[String],
        styles: &[String],
    ) -> RuntimeResult<()> {
        let instance = self.instances.find_by_id(id).ok_or(RuntimeError::NotFound(id))?;
        let library = instance.library.clone();

        let style_failures = self.assets.load_styles(styles, Some(&library));
        let ready = Rc::clone(&self.ready);
        let target = Rc::downgrade(&instance);
        self.assets.load_scripts(
            scripts,
            move |mut loaded| {
                loaded.failures.extend(style_failures);
                ready.borrow_mut().push_back(Ready::Assets {
                    id,
                    instance: target,
                    report: loaded,
                });
            },
            Some(&library),
        );
        self.drain_ready();
        Ok(())
    }

    fn drain_ready(&mut self) -> BootReport {
        let mut report = BootReport::default();
        loop {
            let next = self.ready.borrow_mut().pop_front();
            let Some(item) = next else {
                break;
            };

            match item {
                Ready::Create {
                    id,
                    container,
                    library,
                    params,
                    metadata,
                    report: loaded,
                } => {
                    if !loaded.is_success() {
                        tracing::warn!(
                            content_id = %id,
                            failures = loaded.failures.len(),
                            "library scripts failed to load"
                        );
                    }
                    report.asset_failures.extend(loaded.failures);
                    let skip_resize = !self.config.bind_resize;
                    let created =
                        self.create(&library, id, Some(container), params, metadata, skip_resize);
                    match created {
                        Ok(_) => report.created.push(id),
                        Err(error) => {
                            tracing::warn!(
                                content_id = %id,
                                error = %error,
                                "content creation failed"
                            );
                            report.failures.push(BootFailure {
                                container,
                                content_id: Some(id),
                                error,
                            });
                        }
                    }
                }
                Ready::Assets {
                    id,
                    instance,
                    report: loaded,
                } => {
                    let live = instance.upgrade().filter(|i| {
                        self.instances
                            .find_by_id(id)
                            .is_some_and(|r| Rc::ptr_eq(&r, i))
                    });
                    let Some(instance) = live else {
                        tracing::debug!(content_id = %id, "instance gone before its assets loaded");
                        continue;
                    };
                    let failed: Vec<String> = loaded
                        .failures
                        .iter()
                        .map(|f| f.url().to_string())
                        .collect();
                    instance.events().dispatch(Event::with_data(
                        EventKind::AssetsLoaded,
                        json!({ "urls": loaded.urls, "failed": failed }),
                    ));
                    report.asset_failures.extend(loaded.failures);
                }
            }
        }
        report
    }

    /// Remove every instance and reset the asset cache and window bindings.
    pub fn teardown(&mut self) {
        let instances = self.instances.clear();
        for instance in &instances {
            self.detach(instance);
        }
        self.window.clear();
        self.assets.clear();
        self.ready.borrow_mut().clear();
        tracing::info!(removed = instances.len(), "runtime torn down");
    }
}

/// Run `f` with the instance's events held. Events the content dispatches
/// while borrowed reach their handlers after `f` returned, so handlers can
/// read the instance.
fn held<R>(instance: &ContentInstance, f: impl FnOnce() -> R) -> R {
    instance.events().hold();
    let result = f();
    instance.events().release();
    result
}

impl<D: DomSurface + std::fmt::Debug> std::fmt::Debug for ContentRuntime<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRuntime")
            .field("libraries", &self.libraries)
            .field("instances", &self.instances)
            .field("assets", &self.assets)
            .field("dom", &self.dom)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryFetcher;
    use crate::content::Content;
    use crate::dom::{Action, InputBinding, MemoryDom};
    use crate::error::{ParameterError, ResolutionError};
    use crate::integration::{ContentBundle, MemoryIndex};
    use crate::library::LibraryDefinition;
    use std::any::Any;
    use std::cell::Cell;

    /// Renders a button; each click adds one point.
    struct Tally {
        id: ContentId,
        events: Rc<EventDispatcher>,
        points: u32,
        button: Option<NodeId>,
        lifecycle: Rc<RefCell<Vec<String>>>,
    }

    impl Content for Tally {
        fn attach(
            &mut self,
            dom: &mut dyn DomSurface,
            region: NodeId,
        ) -> Result<Attachment, DomError> {
            let button = dom.create_with_classes("button", &["tally"])?;
            dom.bind(button, InputBinding::new(self.id, Action::control("tally")))?;
            self.button = Some(button);
            dom.append_child(region, button)?;
            Ok(Attachment::Rendered)
        }

        fn detach(&mut self, dom: &mut dyn DomSurface) {
            if let Some(button) = self.button.take() {
                dom.unbind(button);
                if let Some(parent) = dom.parent(button) {
                    dom.remove_child(parent, button).unwrap();
                }
            }
        }

        fn handle_input(&mut self, _dom: &mut dyn DomSurface, action: &Action) {
            if action.is_control("tally") {
                self.points += 1;
                self.events.dispatch(EventKind::Interacted);
            }
        }

        fn score(&self) -> u32 {
            self.points
        }

        fn title(&self) -> String {
            "Tally".to_string()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn build_tally(
        params: Value,
        id: ContentId,
        settings: ContentSettings,
        _dom: &mut dyn DomSurface,
    ) -> Result<Box<dyn Content>, ParameterError> {
        let points: u32 = serde_json::from_value(params.get("start").cloned().unwrap_or(json!(0)))?;
        let lifecycle = Rc::new(RefCell::new(Vec::new()));
        for kind in [EventKind::Attach, EventKind::Init] {
            let lifecycle = Rc::clone(&lifecycle);
            settings.events.subscribe(kind, move |event| {
                let entry = match event.get("container") {
                    Some(container) => format!("{}:{}", event.kind, container),
                    None => event.kind.to_string(),
                };
                lifecycle.borrow_mut().push(entry);
            });
        }
        Ok(Box::new(Tally {
            id,
            events: settings.events,
            points,
            button: None,
            lifecycle,
        }))
    }

    /// No attach capability; builds its container up front.
    struct Banner {
        container: NodeId,
    }

    impl Content for Banner {
        fn container(&self) -> Option<NodeId> {
            Some(self.container)
        }

        fn title(&self) -> String {
            "Banner".to_string()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn build_banner(
        _params: Value,
        _id: ContentId,
        _settings: ContentSettings,
        dom: &mut dyn DomSurface,
    ) -> Result<Box<dyn Content>, ParameterError> {
        let container = dom.create_element("div");
        Ok(Box::new(Banner { container }))
    }

    fn tally_ref() -> LibraryReference {
        LibraryReference::new("Test.Tally", 1, 0)
    }

    fn banner_ref() -> LibraryReference {
        LibraryReference::new("Test.Banner", 1, 0)
    }

    fn runtime_with(config: RuntimeConfig) -> (ContentRuntime<MemoryDom>, MemoryFetcher) {
        let mut libraries = LibraryRegistry::new();
        libraries.register(
            LibraryDefinition::new(tally_ref(), build_tally).with_scripts(["tally.js"]),
        );
        libraries.register(
            LibraryDefinition::new(banner_ref(), build_banner).with_styles(["banner.css"]),
        );
        let fetcher = MemoryFetcher::new();
        let config = config
            .with_library(&tally_ref(), "Test.Tally-1.0")
            .with_library(&banner_ref(), "Test.Banner-1.0");
        (
            ContentRuntime::new(MemoryDom::new(), libraries, Box::new(fetcher.clone()), config),
            fetcher,
        )
    }

    fn runtime() -> (ContentRuntime<MemoryDom>, MemoryFetcher) {
        runtime_with(RuntimeConfig::default())
    }

    fn region(runtime: &mut ContentRuntime<MemoryDom>) -> NodeId {
        let dom = runtime.dom_mut();
        let region = dom.create_element("div");
        let root = dom.root();
        dom.append_child(root, region).unwrap();
        region
    }

    #[test]
    fn test_unknown_library_registers_nothing() {
        let (mut runtime, _) = runtime();
        let library = LibraryReference::parse("Foo.Bar 1.0").unwrap();

        let err = runtime
            .create(&library, ContentId(1), None, json!({}), None, false)
            .unwrap_err();

        assert!(matches!(
            err,
            RuntimeError::Resolution(ResolutionError::UnknownLibrary(ref name)) if name == "Foo.Bar"
        ));
        assert!(runtime.instances().is_empty());
    }

    #[test]
    fn test_unknown_version() {
        let (mut runtime, _) = runtime();
        let library = LibraryReference::new("Test.Tally", 2, 0);
        let err = runtime
            .create(&library, ContentId(1), None, json!({}), None, false)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Resolution(ResolutionError::UnknownVersion { .. })));
    }

    #[test]
    fn test_create_attaches_and_registers() {
        let (mut runtime, _) = runtime();
        let region = region(&mut runtime);

        let instance = runtime
            .create(&tally_ref(), ContentId(1), Some(region), json!({ "start": 2 }), None, false)
            .unwrap();

        assert_eq!(instance.region(), Some(region));
        assert_eq!(instance.score(), 2);
        assert_eq!(runtime.dom().query_selector_all(region, ".tally").len(), 1);
        assert!(runtime.instances().contains(ContentId(1)));
        assert_eq!(runtime.window().subscriber_count(), 1);
    }

    #[test]
    fn test_invalid_parameters() {
        let (mut runtime, _) = runtime();
        let err = runtime
            .create(&tally_ref(), ContentId(1), None, json!({ "start": "many" }), None, false)
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Parameters { content_id: ContentId(1), .. }));
        assert!(runtime.instances().is_empty());
    }

    #[test]
    fn test_container_fallback_without_attach_capability() {
        let (mut runtime, _) = runtime();
        let region = region(&mut runtime);

        let instance = runtime
            .create(&banner_ref(), ContentId(4), Some(region), Value::Null, None, true)
            .unwrap();

        let container = instance.content().container().unwrap();
        assert_eq!(runtime.dom().parent(container), Some(region));
        assert_eq!(runtime.window().subscriber_count(), 0);

        runtime.remove(ContentId(4)).unwrap();
        assert_eq!(runtime.dom().parent(container), None);
    }

    #[test]
    fn test_duplicate_id_keeps_existing_instance() {
        let (mut runtime, _) = runtime();
        let first = runtime
            .create(&tally_ref(), ContentId(1), None, json!({ "start": 1 }), None, false)
            .unwrap();

        let err = runtime
            .create(&tally_ref(), ContentId(1), None, json!({}), None, false)
            .unwrap_err();

        assert!(matches!(err, RuntimeError::DuplicateInstance(ContentId(1))));
        assert_eq!(runtime.instances().len(), 1);
        assert!(Rc::ptr_eq(&runtime.instances().find_by_id(ContentId(1)).unwrap(), &first));
    }

    #[test]
    fn test_attach_failure_leaves_nothing_behind() {
        let (mut runtime, _) = runtime();
        let err = runtime
            .create(&tally_ref(), ContentId(1), Some(NodeId(999)), json!({}), None, false)
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Attach { .. }));
        assert!(runtime.instances().is_empty());
        assert_eq!(runtime.window().subscriber_count(), 0);
        assert_eq!(runtime.dom().binding_count(runtime.dom().root()), 0);
    }

    #[test]
    fn test_click_routes_to_owner() {
        let (mut runtime, _) = runtime();
        let region = region(&mut runtime);
        let instance = runtime
            .create(&tally_ref(), ContentId(1), Some(region), json!({}), None, false)
            .unwrap();
        let interactions = Rc::new(Cell::new(0));
        {
            let interactions = Rc::clone(&interactions);
            instance.events().subscribe(EventKind::Interacted, move |_| {
                interactions.set(interactions.get() + 1)
            });
        }

        let button = runtime.dom().query_selector(region, ".tally").unwrap();
        assert!(runtime.click(button));
        assert!(runtime.click(button));
        assert!(!runtime.click(region));

        assert_eq!(instance.score(), 2);
        assert_eq!(interactions.get(), 2);
    }

    #[test]
    fn test_handlers_read_instance_during_input() {
        let (mut runtime, _) = runtime();
        let region = region(&mut runtime);
        let instance = runtime
            .create(&tally_ref(), ContentId(1), Some(region), json!({}), None, false)
            .unwrap();
        let scores = Rc::new(RefCell::new(Vec::new()));
        {
            let scores = Rc::clone(&scores);
            let weak = Rc::downgrade(&instance);
            instance.events().subscribe(EventKind::Interacted, move |_| {
                if let Some(instance) = weak.upgrade() {
                    scores.borrow_mut().push(instance.score());
                }
            });
        }

        let button = runtime.dom().query_selector(region, ".tally").unwrap();
        runtime.click(button);
        runtime.with_instance_mut::<Tally, _>(ContentId(1), |tally, dom| {
            tally.handle_input(dom, &Action::control("tally"));
        });

        assert_eq!(*scores.borrow(), vec![1, 2]);
        assert_eq!(instance.events().deferred_count(), 0);
    }

    #[test]
    fn test_orphaned_binding_is_ignored() {
        let (mut runtime, _) = runtime();
        let node = runtime.dom_mut().create_element("button");
        runtime
            .dom_mut()
            .bind(node, InputBinding::new(ContentId(77), Action::control("tally")))
            .unwrap();

        assert!(!runtime.click(node));
    }

    #[test]
    fn test_attach_then_init_events() {
        let (mut runtime, _) = runtime();
        let region = region(&mut runtime);
        runtime
            .create(&tally_ref(), ContentId(1), Some(region), json!({}), None, false)
            .unwrap();
        runtime
            .create(&tally_ref(), ContentId(2), None, json!({}), None, false)
            .unwrap();

        let lifecycle = |t: &mut Tally, _: &mut MemoryDom| t.lifecycle.borrow().clone();
        let first = runtime.with_instance_mut(ContentId(1), lifecycle);
        let second = runtime.with_instance_mut(ContentId(2), lifecycle);
        assert_eq!(first, Some(vec![format!("attach:{}", region.0), "init".to_string()]));
        assert_eq!(second, Some(vec!["init".to_string()]));
    }

    #[test]
    fn test_resize_and_trigger_stamp_target() {
        let (mut runtime, _) = runtime();
        let instance = runtime
            .create(&tally_ref(), ContentId(3), None, json!({}), None, false)
            .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            instance.events().subscribe(EventKind::Resize, move |event| {
                seen.borrow_mut().push(event.target);
            });
        }
        runtime.resize_window();
        runtime.trigger(ContentId(3), EventKind::Resize).unwrap();

        assert_eq!(*seen.borrow(), vec![Some(ContentId(3)), Some(ContentId(3))]);
        assert!(matches!(
            runtime.trigger(ContentId(9), EventKind::Resize),
            Err(RuntimeError::NotFound(ContentId(9)))
        ));
    }

    #[test]
    fn test_remove_unbinds_resize_and_detaches() {
        let (mut runtime, _) = runtime();
        let region = region(&mut runtime);
        runtime
            .create(&tally_ref(), ContentId(1), Some(region), json!({}), None, false)
            .unwrap();

        let removed = runtime.remove(ContentId(1)).unwrap();

        assert_eq!(runtime.window().subscriber_count(), 0);
        assert!(runtime.dom().children(region).is_empty());
        assert_eq!(runtime.dom().binding_count(runtime.dom().root()), 0);
        assert!(runtime.instances().is_empty());
        assert_eq!(removed.title(), "Tally");
        assert!(matches!(runtime.remove(ContentId(1)), Err(RuntimeError::NotFound(_))));
    }

    #[test]
    fn test_resize_is_not_forwarded_after_remove() {
        let (mut runtime, _) = runtime();
        let instance = runtime
            .create(&tally_ref(), ContentId(1), None, json!({}), None, false)
            .unwrap();
        let resizes = Rc::new(Cell::new(0));
        {
            let resizes = Rc::clone(&resizes);
            instance
                .events()
                .subscribe(EventKind::Resize, move |_| resizes.set(resizes.get() + 1));
        }

        runtime.resize_window();
        runtime.remove(ContentId(1)).unwrap();
        runtime.resize_window();

        assert_eq!(resizes.get(), 1);
    }

    #[test]
    fn test_with_instance_mut() {
        let (mut runtime, _) = runtime();
        runtime
            .create(&tally_ref(), ContentId(1), None, json!({}), None, true)
            .unwrap();

        let points = runtime.with_instance_mut::<Tally, _>(ContentId(1), |tally, _dom| {
            tally.points = 5;
            tally.points
        });

        assert_eq!(points, Some(5));
        assert!(runtime.with_instance_mut::<Banner, _>(ContentId(1), |_, _| ()).is_none());
        assert!(runtime.with_instance_mut::<Tally, _>(ContentId(2), |_, _| ()).is_none());
    }

    fn add_container(runtime: &mut ContentRuntime<MemoryDom>, id: &str) -> NodeId {
        let dom = runtime.dom_mut();
        let container = dom.create_with_classes("div", &["h5p-content"]).unwrap();
        dom.set_attribute(container, CONTENT_ID_ATTRIBUTE, id).unwrap();
        let root = dom.root();
        dom.append_child(root, container).unwrap();
        container
    }

    #[test]
    fn test_boot_with_empty_index_renders_not_found() {
        let (mut runtime, _) = runtime();
        let container = add_container(&mut runtime, "1");

        let report = runtime.boot(&MemoryIndex::new());

        assert_eq!(report.not_found, vec![container]);
        let message = runtime.dom().query_selector(container, ".h5p-content-not-found").unwrap();
        assert_eq!(runtime.dom().text(message), Some(NOT_FOUND_MESSAGE));
        assert!(runtime.instances().is_empty());
    }

    #[test]
    fn test_boot_waits_for_library_scripts() {
        let (mut runtime, fetcher) = runtime();
        let mut index = MemoryIndex::new();
        let id = index.insert("tally", ContentBundle::new(tally_ref(), json!({ "start": 1 })));
        let container = add_container(&mut runtime, &id.to_string());

        let report = runtime.boot(&index);
        assert_eq!(report.pending, vec![id]);
        assert!(report.created.is_empty());
        assert_eq!(fetcher.count("/h5p/libraries/Test.Tally-1.0/tally.js"), 1);

        let report = runtime.asset_completed("/h5p/libraries/Test.Tally-1.0/tally.js", Ok(()));
        assert_eq!(report.created, vec![id]);
        assert_eq!(runtime.instances().find_by_id(id).unwrap().region(), Some(container));
    }

    #[test]
    fn test_style_failure_reaches_the_report() {
        let (mut runtime, _) = runtime();
        let mut index = MemoryIndex::new();
        let id = index.insert("banner", ContentBundle::new(banner_ref(), Value::Null));
        add_container(&mut runtime, &id.to_string());

        let report = runtime.boot(&index);
        assert_eq!(report.created, vec![id]);
        assert!(report.asset_failures.is_empty());

        let url = "/h5p/libraries/Test.Banner-1.0/banner.css";
        let report = runtime.asset_completed(url, Err("404".to_string()));
        assert_eq!(report.asset_failures.len(), 1);
        assert_eq!(report.asset_failures[0].url(), url);
        assert!(report.created.is_empty());
    }

    #[test]
    fn test_boot_isolates_failing_items() {
        let (mut runtime, fetcher) = runtime_with(RuntimeConfig {
            bind_resize: false,
            ..RuntimeConfig::default()
        });
        let mut index = MemoryIndex::new();
        let unknown = index.insert(
            "broken",
            ContentBundle::new(LibraryReference::new("Foo.Bar", 1, 0), Value::Null),
        );
        let banner = index.insert("banner", ContentBundle::new(banner_ref(), Value::Null));

        add_container(&mut runtime, "abc");
        add_container(&mut runtime, &unknown.to_string());
        let missing = add_container(&mut runtime, "42");
        add_container(&mut runtime, &banner.to_string());

        let report = runtime.boot(&index);

        assert_eq!(report.created, vec![banner]);
        assert_eq!(report.failures.len(), 3);
        assert!(matches!(report.failures[0].error, RuntimeError::MissingContentId(_)));
        assert!(matches!(report.failures[1].error, RuntimeError::Resolution(_)));
        assert!(matches!(report.failures[2].error, RuntimeError::MissingBundle(ContentId(42))));
        assert_eq!(report.not_found, vec![missing]);
        assert_eq!(runtime.window().subscriber_count(), 0);
        assert_eq!(fetcher.count("/h5p/libraries/Test.Banner-1.0/banner.css"), 1);
    }

    #[test]
    fn test_instance_assets_dispatch_only_while_registered() {
        let (mut runtime, _) = runtime();
        let instance = runtime
            .create(&tally_ref(), ContentId(1), None, json!({}), None, true)
            .unwrap();
        let loaded = Rc::new(RefCell::new(Vec::new()));
        {
            let loaded = Rc::clone(&loaded);
            instance.events().subscribe(EventKind::AssetsLoaded, move |event| {
                loaded.borrow_mut().push(event.get("failed").cloned());
            });
        }

        runtime
            .load_instance_assets(ContentId(1), &["extra.js".to_string()], &[])
            .unwrap();
        runtime.asset_completed("/h5p/libraries/Test.Tally-1.0/extra.js", Err("404".to_string()));
        assert_eq!(*loaded.borrow(), vec![Some(json!(["/h5p/libraries/Test.Tally-1.0/extra.js"]))]);

        runtime
            .load_instance_assets(ContentId(1), &["late.js".to_string()], &[])
            .unwrap();
        runtime.remove(ContentId(1)).unwrap();
        runtime.asset_completed("/h5p/libraries/Test.Tally-1.0/late.js", Ok(()));
        assert_eq!(loaded.borrow().len(), 1);
    }

    #[test]
    fn test_teardown_returns_to_empty() {
        let (mut runtime, fetcher) = runtime();
        let region = region(&mut runtime);
        runtime
            .create(&tally_ref(), ContentId(1), Some(region), json!({}), None, false)
            .unwrap();
        runtime
            .create(&tally_ref(), ContentId(2), None, json!({}), None, false)
            .unwrap();
        runtime
            .load_instance_assets(ContentId(2), &["a.js".to_string()], &[])
            .unwrap();

        runtime.teardown();

        assert!(runtime.instances().is_empty());
        assert_eq!(runtime.window().subscriber_count(), 0);
        assert_eq!(runtime.assets().pending_batches(), 0);
        assert!(runtime.dom().children(region).is_empty());

        // The cache was reset, so the script is fetched again.
        runtime
            .create(&tally_ref(), ContentId(1), None, json!({}), None, true)
            .unwrap();
        runtime
            .load_instance_assets(ContentId(1), &["a.js".to_string()], &[])
            .unwrap();
        assert_eq!(fetcher.count("/h5p/libraries/Test.Tally-1.0/a.js"), 2);
    }
}
