//! Small observer helpers for UI-facing state.
//!
//! - [`Observable`]: a listener list that can be told its owner changed.
//! - [`Property`]: a value with change notification.
//! - [`SingleAssign`]: a value that may be set exactly once.

use crate::error::{Error, Result};

/// Handle returned by `add_listener`, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// List of invalidation listeners.
///
/// Owners call [`invalidate`](Observable::invalidate) whenever their state
/// changed in some way; every listener is then called in registration order.
#[derive(Default)]
pub struct Observable {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn FnMut()>)>,
}

impl Observable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn invalidate(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

type ChangeListener<T> = Box<dyn FnMut(&T, &T)>;

/// A value that notifies listeners when it is replaced.
pub struct Property<T> {
    value: T,
    change_listeners: Vec<ChangeListener<T>>,
    observable: Observable,
}

impl<T> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            change_listeners: Vec::new(),
            observable: Observable::new(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Replaces the value. Change listeners receive `(old, new)`, then the
    /// invalidation listeners run.
    pub fn set(&mut self, value: T) {
        let old = std::mem::replace(&mut self.value, value);
        for listener in &mut self.change_listeners {
            listener(&old, &self.value);
        }
        self.observable.invalidate();
    }

    pub fn on_change(&mut self, listener: impl FnMut(&T, &T) + 'static) {
        self.change_listeners.push(Box::new(listener));
    }

    /// Invalidation listeners of this property.
    pub fn observable(&mut self) -> &mut Observable {
        &mut self.observable
    }
}

impl<T: Clone> Property<T> {
    pub fn get(&self) -> T {
        self.value.clone()
    }
}

impl<T: Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// A value that can be assigned once and read any number of times.
#[derive(Debug)]
pub struct SingleAssign<T> {
    name: String,
    value: Option<T>,
}

impl<T> SingleAssign<T> {
    /// `name` identifies the value in error messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn get(&self) -> Result<&T> {
        self.value.as_ref().ok_or(Error::Unassigned)
    }

    pub fn set(&mut self, value: T) -> Result<()> {
        if self.value.is_some() {
            return Err(Error::AlreadyAssigned {
                name: self.name.clone(),
            });
        }
        self.value = Some(value);
        Ok(())
    }

    pub fn is_assigned(&self) -> bool {
        self.value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_invalidate_calls_listeners_in_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut observable = Observable::new();

        let c = calls.clone();
        observable.add_listener(move || c.borrow_mut().push(1));
        let c = calls.clone();
        observable.add_listener(move || c.borrow_mut().push(2));

        observable.invalidate();
        assert_eq!(*calls.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_removed_listener_is_not_called() {
        let calls = Rc::new(RefCell::new(0));
        let mut observable = Observable::new();

        let c = calls.clone();
        let id = observable.add_listener(move || *c.borrow_mut() += 1);
        assert!(observable.remove_listener(id));
        assert!(!observable.remove_listener(id));

        observable.invalidate();
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(observable.listener_count(), 0);
    }

    #[test]
    fn test_property_notifies_old_and_new() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let invalidated = Rc::new(RefCell::new(0));
        let mut name = Property::new(String::from("initial value"));

        let s = seen.clone();
        name.on_change(move |old: &String, new: &String| {
            s.borrow_mut().push((old.clone(), new.clone()))
        });
        let i = invalidated.clone();
        name.observable().add_listener(move || *i.borrow_mut() += 1);

        assert_eq!(name.get(), "initial value");
        name.set("new value".to_string());

        assert_eq!(name.value(), "new value");
        assert_eq!(
            *seen.borrow(),
            vec![("initial value".to_string(), "new value".to_string())]
        );
        assert_eq!(*invalidated.borrow(), 1);
    }

    #[test]
    fn test_single_assign() {
        let mut port = SingleAssign::new("port");
        assert!(matches!(port.get(), Err(Error::Unassigned)));
        assert!(!port.is_assigned());

        port.set(8080).unwrap();
        assert_eq!(*port.get().unwrap(), 8080);

        match port.set(9090) {
            Err(Error::AlreadyAssigned { name }) => assert_eq!(name, "port"),
            other => panic!("expected AlreadyAssigned, got {other:?}"),
        }
        assert_eq!(*port.get().unwrap(), 8080);
    }
}
