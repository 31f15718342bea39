//! A double-ended queue backed by a doubly linked list.

use std::ptr::NonNull;

/// A double-ended FIFO queue backed by a doubly linked list.
///
/// Both ends support O(1) push and pop. The queue owns its list elements
/// but is oblivious to what the payload refers to; level-order tree
/// traversal instantiates it with non-owning node handles.
pub struct Queue<T> {
    head: ElementLink<T>,
    tail: ElementLink<T>,
    len: usize,
}

struct Element<T> {
    item: T,
    next: ElementLink<T>,
    prev: ElementLink<T>,
}

type ElementPtr<T> = NonNull<Element<T>>;
type ElementLink<T> = Option<ElementPtr<T>>;

impl<T> Queue<T> {
    /// Creates an empty queue.
    /// No memory is allocated until the first item is pushed.
    pub fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns true if the queue contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements in the queue.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns a reference to the item at the head without removing it.
    pub fn front(&self) -> Option<&T> {
        self.head.map(|head_ptr| &unsafe { &*head_ptr.as_ptr() }.item)
    }

    /// Inserts an item as the new head of the queue.
    pub fn push_front(&mut self, item: T) {
        let mut element_ptr = Element::create(item);
        match self.head {
            None => {
                self.head = Some(element_ptr);
                self.tail = Some(element_ptr);
            }
            Some(mut head_ptr) => unsafe {
                element_ptr.as_mut().next = Some(head_ptr);
                head_ptr.as_mut().prev = Some(element_ptr);
                self.head = Some(element_ptr);
            },
        }
        self.len += 1;
    }

    /// Inserts an item as the new tail of the queue.
    pub fn push_back(&mut self, item: T) {
        let mut element_ptr = Element::create(item);
        match self.tail {
            None => {
                self.head = Some(element_ptr);
                self.tail = Some(element_ptr);
            }
            Some(mut tail_ptr) => unsafe {
                element_ptr.as_mut().prev = Some(tail_ptr);
                tail_ptr.as_mut().next = Some(element_ptr);
                self.tail = Some(element_ptr);
            },
        }
        self.len += 1;
    }

    /// Removes the head element and returns its item.
    /// Returns `None` on an empty queue.
    pub fn pop_front(&mut self) -> Option<T> {
        let head_ptr = self.head?;
        unsafe {
            self.head = head_ptr.as_ref().next;
            match self.head {
                None => self.tail = None,
                Some(mut new_head_ptr) => new_head_ptr.as_mut().prev = None,
            }
            self.len -= 1;
            Some(Element::destroy(head_ptr))
        }
    }

    /// Removes the tail element and returns its item.
    /// Returns `None` on an empty queue.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail_ptr = self.tail?;
        unsafe {
            self.tail = tail_ptr.as_ref().prev;
            match self.tail {
                None => self.head = None,
                Some(mut new_tail_ptr) => new_tail_ptr.as_mut().next = None,
            }
            self.len -= 1;
            Some(Element::destroy(tail_ptr))
        }
    }

    /// Clears the queue, deallocating all elements.
    /// The payloads are dropped; whatever they refer to is left alone.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        unsafe {
            assert_eq!(self.len == 0, self.head.is_none());
            assert_eq!(self.len == 0, self.tail.is_none());

            if let Some(head_ptr) = self.head {
                assert!(head_ptr.as_ref().prev.is_none());
            }
            if let Some(tail_ptr) = self.tail {
                assert!(tail_ptr.as_ref().next.is_none());
            }

            // Walk the chain and check mutual linkage
            let mut num_elements = 0;
            let mut current = self.head;
            while let Some(element_ptr) = current {
                if let Some(next_ptr) = element_ptr.as_ref().next {
                    assert!(next_ptr.as_ref().prev == Some(element_ptr));
                } else {
                    assert!(self.tail == Some(element_ptr));
                }
                num_elements += 1;
                assert!(num_elements <= self.len);
                current = element_ptr.as_ref().next;
            }
            assert_eq!(num_elements, self.len);
        }
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Element<T> {
    fn create(item: T) -> ElementPtr<T> {
        let boxed = Box::new(Element {
            item,
            next: None,
            prev: None,
        });
        unsafe { ElementPtr::new_unchecked(Box::into_raw(boxed)) }
    }

    unsafe fn destroy(element_ptr: ElementPtr<T>) -> T {
        Box::from_raw(element_ptr.as_ptr()).item
    }
}
