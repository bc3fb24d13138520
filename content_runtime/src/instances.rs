//! Live content instances and the registry that tracks them.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::content::{Content, ContentId};
use crate::dom::NodeId;
use crate::events::{EventDispatcher, SubscriptionId};
use crate::library::LibraryReference;

/// A constructed content bound to its id, library and DOM region.
pub struct ContentInstance {
    pub id: ContentId,
    pub library: LibraryReference,
    region: Cell<Option<NodeId>>,
    events: Rc<EventDispatcher>,
    content: RefCell<Box<dyn Content>>,
    /// Subscription on the window dispatcher that forwards resizes.
    resize_binding: Cell<Option<SubscriptionId>>,
}

impl ContentInstance {
    pub fn new(
        id: ContentId,
        library: LibraryReference,
        events: Rc<EventDispatcher>,
        content: Box<dyn Content>,
    ) -> Self {
        Self {
            id,
            library,
            region: Cell::new(None),
            events,
            content: RefCell::new(content),
            resize_binding: Cell::new(None),
        }
    }

    /// The instance's own dispatcher.
    pub fn events(&self) -> &Rc<EventDispatcher> {
        &self.events
    }

    /// The region the instance was attached to, if any.
    pub fn region(&self) -> Option<NodeId> {
        self.region.get()
    }

    pub fn set_region(&self, region: Option<NodeId>) {
        self.region.set(region);
    }

    pub fn resize_binding(&self) -> Option<SubscriptionId> {
        self.resize_binding.get()
    }

    pub fn set_resize_binding(&self, binding: Option<SubscriptionId>) {
        self.resize_binding.set(binding);
    }

    /// Take the resize binding, leaving none.
    pub fn take_resize_binding(&self) -> Option<SubscriptionId> {
        self.resize_binding.take()
    }

    pub fn content(&self) -> Ref<'_, Box<dyn Content>> {
        self.content.borrow()
    }

    pub fn content_mut(&self) -> RefMut<'_, Box<dyn Content>> {
        self.content.borrow_mut()
    }

    /// Borrow the content as its concrete type.
    pub fn downcast_ref<T: Content>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.content.borrow(), |c| c.as_any().downcast_ref::<T>()).ok()
    }

    /// Mutably borrow the content as its concrete type.
    pub fn downcast_mut<T: Content>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.content.borrow_mut(), |c| c.as_any_mut().downcast_mut::<T>()).ok()
    }

    pub fn score(&self) -> u32 {
        self.content.borrow().score()
    }

    pub fn max_score(&self) -> u32 {
        self.content.borrow().max_score()
    }

    pub fn title(&self) -> String {
        self.content.borrow().title()
    }
}

impl std::fmt::Debug for ContentInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentInstance")
            .field("id", &self.id)
            .field("library", &self.library)
            .field("region", &self.region.get())
            .field("resize_binding", &self.resize_binding.get())
            .finish_non_exhaustive()
    }
}

/// Ordered collection of live instances.
///
/// Traversal goes through [`InstanceRegistry::all`], which returns an owned
/// snapshot: it can be iterated any number of times and is unaffected by
/// registrations or removals made while iterating.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: Vec<Rc<ContentInstance>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instance.
    pub fn register(&mut self, instance: Rc<ContentInstance>) {
        tracing::debug!(content_id = %instance.id, "instance registered");
        self.instances.push(instance);
    }

    /// Remove the first entry that is this exact instance. Returns whether
    /// anything was removed.
    pub fn unregister(&mut self, instance: &Rc<ContentInstance>) -> bool {
        match self.instances.iter().position(|i| Rc::ptr_eq(i, instance)) {
            Some(index) => {
                self.instances.remove(index);
                tracing::debug!(content_id = %instance.id, "instance unregistered");
                true
            }
            None => false,
        }
    }

    pub fn find_by_id(&self, id: ContentId) -> Option<Rc<ContentInstance>> {
        self.instances.iter().find(|i| i.id == id).cloned()
    }

    pub fn contains(&self, id: ContentId) -> bool {
        self.instances.iter().any(|i| i.id == id)
    }

    /// Snapshot of the live instances in registration order.
    pub fn all(&self) -> Vec<Rc<ContentInstance>> {
        self.instances.clone()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Drop every instance, returning them in registration order.
    pub fn clear(&mut self) -> Vec<Rc<ContentInstance>> {
        std::mem::take(&mut self.instances)
    }
}
