//! An immutable singly-linked list with O(1) `cons`/`head`/`tail` and
//! structural sharing, used as the conjunction and disjunction stacks.
//!
//! Two lists may share any tail suffix, which is exactly what lets a
//! [`crate::machine::choice_point::ChoicePoint`] capture "the machine at
//! this point" cheaply: cloning a `PList` is a single `Arc` bump.

use std::sync::Arc;

struct Node<T> {
    head: T,
    tail: PList<T>,
}

/// A persistent LIFO stack.
pub struct PList<T>(Option<Arc<Node<T>>>);

impl<T> Clone for PList<T> {
    fn clone(&self) -> Self {
        PList(self.0.clone())
    }
}

impl<T> Default for PList<T> {
    fn default() -> Self {
        PList::nil()
    }
}

impl<T> PList<T> {
    /// The empty list.
    pub fn nil() -> Self {
        PList(None)
    }

    /// True iff this is the empty list.
    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    /// Prepends `value`, returning a new list; `self` is unchanged.
    pub fn cons(&self, value: T) -> Self {
        PList(Some(Arc::new(Node { head: value, tail: self.clone() })))
    }

    /// The element at the top of the stack, if any.
    pub fn head(&self) -> Option<&T> {
        self.0.as_ref().map(|n| &n.head)
    }

    /// Everything below the top element.
    pub fn tail(&self) -> Option<PList<T>> {
        self.0.as_ref().map(|n| n.tail.clone())
    }

    /// Splits off the top element and the rest of the list in one call.
    pub fn uncons(&self) -> Option<(&T, PList<T>)> {
        self.0.as_ref().map(|n| (&n.head, n.tail.clone()))
    }

    /// Iterates from the top of the stack downward.
    pub fn iter(&self) -> PListIter<'_, T> {
        PListIter { node: self.0.as_deref() }
    }

    /// Number of elements. O(n).
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.is_nil()
    }
}

pub struct PListIter<'a, T> {
    node: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for PListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.tail.0.as_deref();
        Some(&node.head)
    }
}
