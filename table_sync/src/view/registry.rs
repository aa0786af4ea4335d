use log::debug;
use std::collections::{BTreeMap, btree_map::Entry};

use super::{
    entity::{EntityKey, EntityProps},
    presenter::Presenter,
};

struct Slot<H> {
    handle: H,
    props: EntityProps,
}

/// Keyed store of live presenter handles.
///
/// Holds at most one handle per key. Updates go through
/// [`Presenter::update_entity`] on the existing handle; a handle is only
/// ever released by [`EntityRegistry::destroy`] or [`EntityRegistry::clear`].
pub struct EntityRegistry<H> {
    slots: BTreeMap<EntityKey, Slot<H>>,
}

impl<H> Default for EntityRegistry<H> {
    fn default() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }
}

impl<H> EntityRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entity for `key` or update it in place. Returns `false`
    /// when `props` already match what is shown and nothing was done.
    pub fn upsert<P>(&mut self, presenter: &mut P, key: EntityKey, props: EntityProps) -> bool
    where
        P: Presenter<Handle = H>,
    {
        match self.slots.entry(key) {
            Entry::Occupied(mut entry) => {
                let slot = entry.get_mut();
                if slot.props == props {
                    return false;
                }
                presenter.update_entity(&mut slot.handle, &props);
                slot.props = props;
            }
            Entry::Vacant(entry) => {
                debug!("creating entity {}", entry.key());
                let handle = presenter.create_entity(props.kind(), &props);
                entry.insert(Slot { handle, props });
            }
        }
        true
    }

    /// Release the entity for `key`. Unknown keys are ignored.
    pub fn destroy<P>(&mut self, presenter: &mut P, key: &EntityKey) -> bool
    where
        P: Presenter<Handle = H>,
    {
        match self.slots.remove(key) {
            Some(slot) => {
                debug!("destroying entity {key}");
                presenter.destroy_entity(slot.handle);
                true
            }
            None => false,
        }
    }

    /// Release every entity.
    pub fn clear<P>(&mut self, presenter: &mut P)
    where
        P: Presenter<Handle = H>,
    {
        for (_, slot) in std::mem::take(&mut self.slots) {
            presenter.destroy_entity(slot.handle);
        }
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn props(&self, key: &EntityKey) -> Option<&EntityProps> {
        self.slots.get(key).map(|slot| &slot.props)
    }

    /// What is currently shown for keys matching `filter`.
    pub fn rendered(
        &self,
        filter: impl Fn(&EntityKey) -> bool,
    ) -> BTreeMap<EntityKey, EntityProps> {
        self.slots
            .iter()
            .filter(|(key, _)| filter(key))
            .map(|(key, slot)| (key.clone(), slot.props.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
